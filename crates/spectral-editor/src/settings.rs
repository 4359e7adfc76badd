use crate::api::AttentionTask;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Common slider metadata so bounds live in one place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl SliderRange {
    pub const fn new(min: f32, max: f32, step: f32) -> Self {
        Self { min, max, step }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

// Canvas ranges
pub const PADDING_RANGE: SliderRange = SliderRange::new(0.0, 60.0, 1.0);
pub const NODE_RADIUS_RANGE: SliderRange = SliderRange::new(4.0, 32.0, 0.5);
pub const EDGE_HIT_WIDTH_RANGE: SliderRange = SliderRange::new(2.0, 30.0, 1.0);
pub const EDGE_WIDTH_RANGE: SliderRange = SliderRange::new(0.5, 6.0, 0.1);

// Generator ranges
pub const EDGE_PROBABILITY_RANGE: SliderRange = SliderRange::new(0.0, 1.0, 0.01);

/// Environment variable overriding the backend URL.
pub const BACKEND_ENV: &str = "SPECTRAL_EDITOR_BACKEND";
pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EditorSettings {
    pub backend: BackendSettings,
    pub canvas: CanvasSettings,
    pub generator: GeneratorSettings,
    pub transformer: TransformerSettings,
}

impl EditorSettings {
    /// Read `path` when it exists, falling back to defaults on any error.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|json| serde_json::from_str(&json).map_err(|e| e.to_string()))
        {
            Ok(settings) => {
                log::info!("loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("error loading {}: {}. Using default settings.", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn with_backend_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            log::info!("backend overridden to {}", url);
            self.backend.url = url;
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            url: String::from("http://localhost:8000"),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    pub padding: f32,
    pub node_radius: f32,
    /// Width of the invisible click band around each edge.
    pub edge_hit_width: f32,
    pub edge_width: f32,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            padding: graph_edit::canvas::DEFAULT_PADDING,
            node_radius: 12.0,
            edge_hit_width: 12.0,
            edge_width: 1.5,
        }
    }
}

impl CanvasSettings {
    pub fn sanitized(&self) -> Self {
        Self {
            padding: PADDING_RANGE.clamp(self.padding),
            node_radius: NODE_RADIUS_RANGE.clamp(self.node_radius),
            edge_hit_width: EDGE_HIT_WIDTH_RANGE.clamp(self.edge_hit_width),
            edge_width: EDGE_WIDTH_RANGE.clamp(self.edge_width),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub default_count: usize,
    pub default_edge_probability: f64,
    pub max_count: usize,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            default_count: 3,
            default_edge_probability: 0.3,
            max_count: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformerSettings {
    pub models: Vec<String>,
    pub default_task: AttentionTask,
    pub max_words: usize,
}

impl Default for TransformerSettings {
    fn default() -> Self {
        Self {
            models: vec![
                String::from("bert-base-uncased"),
                String::from("roberta-base"),
                String::from("distilbert-base-uncased"),
            ],
            default_task: AttentionTask::Mlm,
            max_words: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: EditorSettings =
            serde_json::from_str(r#"{ "backend": { "url": "http://spectra:9000" } }"#).unwrap();

        assert_eq!(settings.backend.url, "http://spectra:9000");
        assert_eq!(settings.backend.timeout_secs, 30);
        assert_eq!(settings.canvas, CanvasSettings::default());
        assert_eq!(settings.transformer.max_words, 200);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("spectral_editor_no_such_settings.json");
        assert_eq!(EditorSettings::load_or_default(&path), EditorSettings::default());
    }

    #[test]
    fn test_backend_override_ignores_blank() {
        let settings = EditorSettings::default().with_backend_override(Some(String::from("  ")));
        assert_eq!(settings.backend.url, BackendSettings::default().url);

        let settings =
            EditorSettings::default().with_backend_override(Some(String::from("http://x:1")));
        assert_eq!(settings.backend.url, "http://x:1");
    }

    #[test]
    fn test_sanitized_canvas_clamps_to_slider_ranges() {
        let canvas = CanvasSettings {
            padding: -3.0,
            node_radius: 100.0,
            edge_hit_width: 12.0,
            edge_width: 0.0,
        }
        .sanitized();

        assert_eq!(canvas.padding, 0.0);
        assert_eq!(canvas.node_radius, 32.0);
        assert_eq!(canvas.edge_width, 0.5);
    }
}
