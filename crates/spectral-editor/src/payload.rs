//! Result payloads returned by the backend.
//!
//! The wire shapes (`Raw*`) are lenient about absent keys: a missing matrix
//! kind or layer gradient decodes as empty. They are then validated into
//! the typed shapes the result panel renders, which guarantees rectangular
//! matrices and consistent counts.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PayloadError {
    #[error("{what}: row {row} has {found} entries, expected {expected}")]
    Ragged {
        what: String,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("{what}: {values} eigenvalues but {vectors} eigenvector columns")]
    CountMismatch {
        what: String,
        values: usize,
        vectors: usize,
    },
    #[error("{what}: expected a {expected}x{expected} matrix, got {rows}x{cols}")]
    NotSquare {
        what: String,
        expected: usize,
        rows: usize,
        cols: usize,
    },
}

// ------------------------------------------------------------------
// Spectrum
// ------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixKind {
    Adjacency,
    Laplacian,
    NormalizedLaplacian,
}

impl MatrixKind {
    pub const ALL: [MatrixKind; 3] = [
        MatrixKind::Adjacency,
        MatrixKind::Laplacian,
        MatrixKind::NormalizedLaplacian,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MatrixKind::Adjacency => "Adjacency",
            MatrixKind::Laplacian => "Laplacian",
            MatrixKind::NormalizedLaplacian => "Normalized Laplacian",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            MatrixKind::Adjacency => "adjacency",
            MatrixKind::Laplacian => "laplacian",
            MatrixKind::NormalizedLaplacian => "normalized_laplacian",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSpectrum {
    pub eigenvalues: Vec<f64>,
    pub eigenvectors: Vec<Vec<f64>>,
    pub matrix: Option<Vec<Vec<f64>>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSpectrumPayload {
    pub adjacency: RawSpectrum,
    pub laplacian: RawSpectrum,
    pub normalized_laplacian: RawSpectrum,
}

/// Eigen-decomposition of one graph matrix. Eigenvector rows are indexed by
/// node, columns by eigenvalue.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    pub eigenvalues: Vec<f64>,
    pub eigenvectors: Array2<f64>,
    pub matrix: Option<Array2<f64>>,
}

impl Default for Spectrum {
    fn default() -> Self {
        Self {
            eigenvalues: Vec::new(),
            eigenvectors: Array2::zeros((0, 0)),
            matrix: None,
        }
    }
}

impl Spectrum {
    pub fn is_empty(&self) -> bool {
        self.eigenvalues.is_empty() && self.eigenvectors.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.eigenvectors.nrows()
    }

    /// Per-node coordinates taken from two 1-based eigenvector columns.
    /// Columns past the end read as 0.
    pub fn embedding(&self, x_index: usize, y_index: usize) -> Vec<[f64; 2]> {
        let component = |row: usize, index: usize| {
            index
                .checked_sub(1)
                .and_then(|col| self.eigenvectors.get((row, col)))
                .copied()
                .unwrap_or(0.0)
        };
        (0..self.eigenvectors.nrows())
            .map(|row| [component(row, x_index), component(row, y_index)])
            .collect()
    }
}

impl TryFrom<(MatrixKind, RawSpectrum)> for Spectrum {
    type Error = PayloadError;

    fn try_from((kind, raw): (MatrixKind, RawSpectrum)) -> Result<Self, Self::Error> {
        let what = format!("{} eigenvectors", kind.key());
        let eigenvectors = to_matrix(raw.eigenvectors, &what)?;
        if eigenvectors.nrows() > 0 && eigenvectors.ncols() != raw.eigenvalues.len() {
            return Err(PayloadError::CountMismatch {
                what: kind.key().to_string(),
                values: raw.eigenvalues.len(),
                vectors: eigenvectors.ncols(),
            });
        }

        let matrix = raw
            .matrix
            .map(|rows| {
                let what = format!("{} matrix", kind.key());
                let m = to_matrix(rows, &what)?;
                ensure_square(&m, m.nrows(), &what)?;
                Ok(m)
            })
            .transpose()?;

        Ok(Self {
            eigenvalues: raw.eigenvalues,
            eigenvectors,
            matrix,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpectrumPayload {
    pub adjacency: Spectrum,
    pub laplacian: Spectrum,
    pub normalized_laplacian: Spectrum,
}

impl SpectrumPayload {
    /// One empty entry per matrix kind.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: MatrixKind) -> &Spectrum {
        match kind {
            MatrixKind::Adjacency => &self.adjacency,
            MatrixKind::Laplacian => &self.laplacian,
            MatrixKind::NormalizedLaplacian => &self.normalized_laplacian,
        }
    }

    pub fn is_empty(&self) -> bool {
        MatrixKind::ALL.iter().all(|k| self.get(*k).is_empty())
    }
}

impl RawSpectrumPayload {
    pub fn validate(self) -> Result<SpectrumPayload, PayloadError> {
        Ok(SpectrumPayload {
            adjacency: Spectrum::try_from((MatrixKind::Adjacency, self.adjacency))?,
            laplacian: Spectrum::try_from((MatrixKind::Laplacian, self.laplacian))?,
            normalized_laplacian: Spectrum::try_from((
                MatrixKind::NormalizedLaplacian,
                self.normalized_laplacian,
            ))?,
        })
    }
}

// ------------------------------------------------------------------
// Attention
// ------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawLayer {
    pub attention: Vec<Vec<f64>>,
    pub gradient: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawAttentionPayload {
    pub tokens: Vec<String>,
    pub layers: Vec<RawLayer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerMatrices {
    pub attention: Array2<f64>,
    /// Absent when the backend skipped the backward pass.
    pub gradient: Option<Array2<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttentionPayload {
    pub tokens: Vec<String>,
    pub layers: Vec<LayerMatrices>,
}

impl RawAttentionPayload {
    pub fn validate(self) -> Result<AttentionPayload, PayloadError> {
        let side = self.tokens.len();
        let layers = self
            .layers
            .into_iter()
            .enumerate()
            .map(|(i, layer)| {
                let what = format!("layer {} attention", i + 1);
                let attention = to_matrix(layer.attention, &what)?;
                ensure_square(&attention, side, &what)?;

                let gradient = if layer.gradient.is_empty() {
                    None
                } else {
                    let what = format!("layer {} gradient", i + 1);
                    let gradient = to_matrix(layer.gradient, &what)?;
                    ensure_square(&gradient, side, &what)?;
                    Some(gradient)
                };

                Ok(LayerMatrices {
                    attention,
                    gradient,
                })
            })
            .collect::<Result<Vec<_>, PayloadError>>()?;

        Ok(AttentionPayload {
            tokens: self.tokens,
            layers,
        })
    }
}

// ------------------------------------------------------------------
// Whatever the panel currently shows
// ------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ResultPayload {
    Spectrum(SpectrumPayload),
    Attention(AttentionPayload),
}

impl Default for ResultPayload {
    fn default() -> Self {
        ResultPayload::Spectrum(SpectrumPayload::empty())
    }
}

// ------------------------------------------------------------------
// Helpers
// ------------------------------------------------------------------

fn to_matrix(rows: Vec<Vec<f64>>, what: &str) -> Result<Array2<f64>, PayloadError> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    if let Some((row, bad)) = rows.iter().enumerate().find(|(_, r)| r.len() != ncols) {
        return Err(PayloadError::Ragged {
            what: what.to_string(),
            row,
            expected: ncols,
            found: bad.len(),
        });
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    // Shape matches the row scan above.
    Array2::from_shape_vec((nrows, ncols), flat).map_err(|_| PayloadError::Ragged {
        what: what.to_string(),
        row: 0,
        expected: ncols,
        found: 0,
    })
}

fn ensure_square(m: &Array2<f64>, side: usize, what: &str) -> Result<(), PayloadError> {
    if m.nrows() != side || m.ncols() != side {
        return Err(PayloadError::NotSquare {
            what: what.to_string(),
            expected: side,
            rows: m.nrows(),
            cols: m.ncols(),
        });
    }
    Ok(())
}
