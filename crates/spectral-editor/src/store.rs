use graph_edit::{CanvasBounds, EditError, Graph, Selection};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;

use crate::api::AttentionTask;
use crate::payload::{MatrixKind, ResultPayload};
use crate::serialization::{self, PersistError, SavedProject};
use crate::settings::EditorSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Spectrum,
    Embedding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttentionView {
    Attention,
    Gradient,
}

/// Inline warning slots, one per group of controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Warnings {
    pub node: Option<String>,
    pub edge: Option<String>,
    pub generate: Option<String>,
}

impl Warnings {
    pub fn set(slot: &mut Option<String>, result: Result<(), EditError>) {
        *slot = result.err().map(|e| e.to_string());
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// How the result panel projects the current payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub matrix: MatrixKind,
    pub mode: ViewMode,
    /// 1-based eigenvector columns for the embedding axes.
    pub x_index: usize,
    pub y_index: usize,
    pub layer: usize,
    pub attention_view: AttentionView,
    pub heatmap_hovered_cell: Option<(usize, usize)>,
}

impl Default for ResultView {
    fn default() -> Self {
        Self {
            matrix: MatrixKind::Adjacency,
            mode: ViewMode::Spectrum,
            x_index: 1,
            y_index: 2,
            layer: 0,
            attention_view: AttentionView::Attention,
            heatmap_hovered_cell: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorInput {
    /// Raw text of the node count field, coerced when generating.
    pub count_text: String,
    pub edge_probability: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformerInput {
    pub model: String,
    pub task: AttentionTask,
    pub sentence: String,
    /// Optional word to mask, only sent for masked-LM runs.
    pub mask_word: String,
}

pub struct Store {
    pub graph: Graph,
    pub selection: Selection,
    pub bounds: CanvasBounds,
    pub warnings: Warnings,
    pub result: ResultPayload,
    pub view: ResultView,
    pub generator: GeneratorInput,
    pub transformer: TransformerInput,
    pub settings: EditorSettings,
    /// Epoch of the latest outbound request. Responses carrying any other
    /// epoch are dropped.
    pub request_epoch: u64,
    pub awaiting: Option<u64>,
    /// Last backend failure, shown under the result panel.
    pub status: Option<String>,
    pub error_message: Option<String>,
    pub rng: StdRng,
}

impl Store {
    pub fn new(settings: EditorSettings) -> Self {
        Self::with_rng(settings, StdRng::from_os_rng())
    }

    pub fn with_seed(settings: EditorSettings, seed: u64) -> Self {
        Self::with_rng(settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(mut settings: EditorSettings, rng: StdRng) -> Self {
        settings.canvas = settings.canvas.sanitized();
        let bounds = CanvasBounds::new(
            CanvasBounds::default().width,
            CanvasBounds::default().height,
            settings.canvas.padding,
        );
        Self {
            graph: Graph::triangle(),
            selection: Selection::new(),
            bounds,
            warnings: Warnings::default(),
            result: ResultPayload::default(),
            view: ResultView::default(),
            generator: GeneratorInput {
                count_text: settings.generator.default_count.to_string(),
                edge_probability: settings.generator.default_edge_probability,
            },
            transformer: TransformerInput {
                model: settings.transformer.models.first().cloned().unwrap_or_default(),
                task: settings.transformer.default_task,
                sentence: String::new(),
                mask_word: String::new(),
            },
            settings,
            request_epoch: 0,
            awaiting: None,
            status: None,
            error_message: None,
            rng,
        }
    }

    /// Start a new request generation and return its epoch.
    pub fn next_epoch(&mut self) -> u64 {
        self.request_epoch += 1;
        self.awaiting = Some(self.request_epoch);
        self.request_epoch
    }

    pub fn is_current(&self, epoch: u64) -> bool {
        epoch == self.request_epoch
    }

    /// Abandon any in-flight request.
    fn invalidate_requests(&mut self) {
        self.request_epoch += 1;
        self.awaiting = None;
    }

    /// Empty graph, no selection, no warnings, empty payload for every
    /// matrix kind. In-flight responses are discarded.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.selection.clear();
        self.warnings.clear();
        self.result = ResultPayload::default();
        self.view = ResultView {
            matrix: self.view.matrix,
            mode: self.view.mode,
            ..ResultView::default()
        };
        self.status = None;
        self.invalidate_requests();
    }

    pub fn set_padding(&mut self, padding: f32) {
        self.bounds = CanvasBounds::new(self.bounds.width, self.bounds.height, padding);
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    pub fn project(&self) -> SavedProject {
        SavedProject {
            graph: serialization::graph_to_serializable(&self.graph),
            settings: self.settings.clone(),
        }
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), PersistError> {
        serialization::save_to_file(&self.project(), path)
    }

    pub fn load_from_file(&mut self, path: &Path) -> Result<(), PersistError> {
        let project = serialization::load_from_file(path)?;
        self.apply_project(project)
    }

    /// Replace graph and settings. The previous payload described a
    /// different graph, so it is reset as well.
    pub fn apply_project(&mut self, project: SavedProject) -> Result<(), PersistError> {
        let graph = serialization::serializable_to_graph(&project.graph)?;
        self.clear();
        self.graph = graph;
        self.settings = project.settings;
        self.settings.canvas = self.settings.canvas.sanitized();
        self.set_padding(self.settings.canvas.padding);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::SpectrumPayload;

    #[test]
    fn test_new_store_opens_with_triangle() {
        let store = Store::with_seed(EditorSettings::default(), 1);

        assert_eq!(store.graph, Graph::triangle());
        assert!(store.selection.is_empty());
        assert_eq!(store.generator.count_text, "3");
        assert_eq!(store.transformer.model, "bert-base-uncased");
        assert_eq!(store.result, ResultPayload::Spectrum(SpectrumPayload::empty()));
    }

    #[test]
    fn test_store_sanitizes_hand_edited_settings() {
        let settings: EditorSettings = serde_json::from_str(
            r#"{ "canvas": { "node_radius": -5.0, "edge_hit_width": -1.0 } }"#,
        )
        .unwrap();
        let store = Store::with_seed(settings, 1);

        assert_eq!(store.settings.canvas.node_radius, 4.0);
        assert_eq!(store.settings.canvas.edge_hit_width, 2.0);
    }

    #[test]
    fn test_epochs_are_monotonic() {
        let mut store = Store::with_seed(EditorSettings::default(), 1);

        let first = store.next_epoch();
        let second = store.next_epoch();

        assert!(second > first);
        assert!(store.is_current(second));
        assert!(!store.is_current(first));
        assert_eq!(store.awaiting, Some(second));
    }

    #[test]
    fn test_clear_invalidates_in_flight_request() {
        let mut store = Store::with_seed(EditorSettings::default(), 1);
        let epoch = store.next_epoch();
        store.selection.click_node(0);
        store.warnings.edge = Some(String::from("x"));

        store.clear();

        assert!(!store.is_current(epoch));
        assert_eq!(store.awaiting, None);
        assert!(store.graph.is_empty());
        assert!(store.selection.is_empty());
        assert_eq!(store.warnings, Warnings::default());
    }

    #[test]
    fn test_apply_project_replaces_graph_and_settings() {
        let mut other = Graph::new();
        other.add_nodes_bulk(4, 1.0, &CanvasBounds::default(), &mut StdRng::seed_from_u64(3))
            .unwrap();
        let mut settings = EditorSettings::default();
        settings.canvas.padding = 30.0;

        let mut store = Store::with_seed(EditorSettings::default(), 1);
        store.selection.click_node(2);
        store
            .apply_project(SavedProject {
                graph: serialization::graph_to_serializable(&other),
                settings,
            })
            .unwrap();

        assert_eq!(store.graph.node_count(), 4);
        assert_eq!(store.graph.edge_count(), 6);
        assert!(store.selection.is_empty());
        assert_eq!(store.bounds.padding, 30.0);
    }
}
