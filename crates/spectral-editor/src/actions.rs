use crate::api::{ApiError, AttentionRequest, AttentionTask, GraphRequest};
use crate::effects::Effect;
use crate::payload::{AttentionPayload, MatrixKind, ResultPayload, SpectrumPayload};
use crate::serialization::SavedProject;
use crate::settings::{CanvasSettings, EDGE_PROBABILITY_RANGE};
use crate::store::{AttentionView, Store, ViewMode, Warnings};
use graph_edit::{CanvasBounds, Point, SurfaceEvent};
use std::path::PathBuf;

/// Actions that can be dispatched to modify the editor state
#[derive(Debug, Clone)]
pub enum Action {
    // Graph editing
    /// Add one node near the last node and connect it
    AddNode,
    DeleteSelectedNodes,
    /// Connect every unconnected pair among the selected nodes
    AddEdgesBetweenSelected,
    DeleteSelectedEdge,
    /// Bulk-generate nodes using the generator inputs
    GenerateNodes,
    SetGeneratorCount { text: String },
    SetEdgeProbability { p: f64 },
    ClearAll,

    // Surface interaction
    ClickNode { id: usize },
    ClickEdge { index: usize },
    MoveNode { id: usize, x: f32, y: f32 },
    /// Re-measured canvas size, sent whenever the surface changes size
    SetCanvasSize { width: f32, height: f32 },

    // Backend
    RequestSpectrum,
    RequestAttention,
    SetModel { model: String },
    SetSentence { sentence: String },
    SetTask { task: AttentionTask },
    /// Word to mask in the sentence, blank for none
    SetMaskWord { word: String },
    SpectrumReceived {
        epoch: u64,
        result: Result<SpectrumPayload, ApiError>,
    },
    AttentionReceived {
        epoch: u64,
        result: Result<AttentionPayload, ApiError>,
    },

    // Result panel
    SetMatrixKind { kind: MatrixKind },
    SetViewMode { mode: ViewMode },
    /// Pick eigenvector columns (1-based) for the embedding axes
    SetEmbeddingAxes { x: usize, y: usize },
    SetLayer { layer: usize },
    SetAttentionView { view: AttentionView },
    SetHeatmapHoveredCell { cell: Option<(usize, usize)> },

    // Settings
    UpdateCanvasSettings { canvas: CanvasSettings },

    // File Operations
    /// Save current project to file
    SaveToFile { path: PathBuf },
    /// Load project from file
    LoadFromFile { path: PathBuf },
    /// A project read outside the reducer (browser file picker)
    ProjectLoaded { result: Result<SavedProject, String> },
    /// Clear any error message
    ClearErrorMessage,
}

impl From<SurfaceEvent> for Action {
    fn from(event: SurfaceEvent) -> Self {
        match event {
            SurfaceEvent::NodeClicked(id) => Action::ClickNode { id },
            SurfaceEvent::EdgeClicked(index) => Action::ClickEdge { index },
            SurfaceEvent::NodeMoved { id, x, y } => Action::MoveNode { id, x, y },
        }
    }
}

/// Parse the node count field. Unparsable text counts as 1, negative as 0.
pub fn coerce_count(text: &str, max: usize) -> usize {
    match text.trim().parse::<i64>() {
        Ok(n) if n <= 0 => 0,
        Ok(n) => usize::try_from(n).unwrap_or(max).min(max),
        Err(_) => 1,
    }
}

/// Clamp a 1-based component index into `[1, n]`.
pub fn clamp_axis_index(index: usize, n: usize) -> usize {
    index.clamp(1, n.max(1))
}

/// Apply a single action to modify the store state
pub fn update(store: &mut Store, action: Action) -> Vec<Effect> {
    match action {
        // Graph editing
        Action::AddNode => {
            let id = store.graph.add_node(&store.bounds, &mut store.rng);
            log::debug!("added node {}", id);
            store.warnings.node = None;
            vec![]
        }
        Action::DeleteSelectedNodes => {
            let ids = store.selection.nodes().to_vec();
            let result = store.graph.delete_nodes(&ids).map(|map| {
                log::debug!("deleted {} nodes, {} remain", ids.len(), map.len());
                // Ids were renumbered, so the old selection is meaningless.
                store.selection.clear();
            });
            Warnings::set(&mut store.warnings.node, result);
            vec![]
        }
        Action::AddEdgesBetweenSelected => {
            let result = store
                .graph
                .add_edges(store.selection.nodes())
                .map(|added| log::debug!("added {} edges", added));
            Warnings::set(&mut store.warnings.edge, result);
            vec![]
        }
        Action::DeleteSelectedEdge => {
            let result = store
                .graph
                .delete_edge(store.selection.edge())
                .map(|removed| {
                    log::debug!("removed {} edges", removed);
                    store.selection.clear_edge();
                });
            Warnings::set(&mut store.warnings.edge, result);
            vec![]
        }
        Action::GenerateNodes => {
            let count = coerce_count(
                &store.generator.count_text,
                store.settings.generator.max_count,
            );
            let result = store
                .graph
                .add_nodes_bulk(
                    count,
                    store.generator.edge_probability,
                    &store.bounds,
                    &mut store.rng,
                )
                .map(|_| ());
            Warnings::set(&mut store.warnings.generate, result);
            vec![]
        }
        Action::SetGeneratorCount { text } => {
            store.generator.count_text = text;
            vec![]
        }
        Action::SetEdgeProbability { p } => {
            store.generator.edge_probability = if p.is_nan() {
                0.0
            } else {
                p.clamp(
                    EDGE_PROBABILITY_RANGE.min as f64,
                    EDGE_PROBABILITY_RANGE.max as f64,
                )
            };
            vec![]
        }
        Action::ClearAll => {
            store.clear();
            vec![]
        }

        // Surface interaction
        Action::ClickNode { id } => {
            if store.graph.node(id).is_some() {
                store.selection.click_node(id);
            }
            vec![]
        }
        Action::ClickEdge { index } => {
            if index < store.graph.edge_count() {
                store.selection.click_edge(index);
            }
            vec![]
        }
        Action::MoveNode { id, x, y } => {
            store
                .graph
                .set_node_position(id, Point::new(x, y), &store.bounds);
            vec![]
        }
        Action::SetCanvasSize { width, height } => {
            store.bounds = CanvasBounds::new(width, height, store.settings.canvas.padding);
            vec![]
        }

        // Backend
        Action::RequestSpectrum => {
            let epoch = store.next_epoch();
            store.status = None;
            let request = GraphRequest::from(&store.graph);
            log::info!(
                "requesting spectrum #{} for {} nodes, {} edges",
                epoch,
                request.nodes.len(),
                request.edges.len()
            );
            vec![Effect::FetchSpectrum { epoch, request }]
        }
        Action::RequestAttention => {
            if store.transformer.sentence.trim().is_empty() {
                store.status = Some(String::from("Enter a sentence first"));
                return vec![];
            }
            let request = match AttentionRequest::new(
                &store.transformer.model,
                store.transformer.task,
                &store.transformer.sentence,
                store.settings.transformer.max_words,
            )
            .with_mask(&store.transformer.mask_word)
            {
                Ok(request) => request,
                Err(e) => {
                    store.status = Some(e.to_string());
                    return vec![];
                }
            };
            let epoch = store.next_epoch();
            store.status = None;
            log::info!("requesting attention #{} from {}", epoch, request.model);
            vec![Effect::FetchAttention { epoch, request }]
        }
        Action::SetModel { model } => {
            store.transformer.model = model;
            vec![]
        }
        Action::SetSentence { sentence } => {
            store.transformer.sentence = sentence;
            vec![]
        }
        Action::SetTask { task } => {
            store.transformer.task = task;
            vec![]
        }
        Action::SetMaskWord { word } => {
            store.transformer.mask_word = word;
            vec![]
        }
        Action::SpectrumReceived { epoch, result } => {
            if !store.is_current(epoch) {
                log::debug!("dropping stale spectrum #{} (latest #{})", epoch, store.request_epoch);
                return vec![];
            }
            store.awaiting = None;
            match result {
                Ok(payload) => {
                    store.result = ResultPayload::Spectrum(payload);
                    store.status = None;
                    let n = store.graph.node_count();
                    store.view.x_index = clamp_axis_index(store.view.x_index, n);
                    store.view.y_index = clamp_axis_index(store.view.y_index, n);
                }
                Err(e) => {
                    log::warn!("spectrum request #{} failed: {}", epoch, e);
                    store.status = Some(format!("Spectrum request failed: {}", e));
                }
            }
            vec![]
        }
        Action::AttentionReceived { epoch, result } => {
            if !store.is_current(epoch) {
                log::debug!(
                    "dropping stale attention #{} (latest #{})",
                    epoch,
                    store.request_epoch
                );
                return vec![];
            }
            store.awaiting = None;
            match result {
                Ok(payload) => {
                    store.result = ResultPayload::Attention(payload);
                    store.status = None;
                    store.view.layer = 0;
                    store.view.heatmap_hovered_cell = None;
                }
                Err(e) => {
                    log::warn!("attention request #{} failed: {}", epoch, e);
                    store.status = Some(format!("Attention request failed: {}", e));
                }
            }
            vec![]
        }

        // Result panel
        Action::SetMatrixKind { kind } => {
            store.view.matrix = kind;
            vec![]
        }
        Action::SetViewMode { mode } => {
            store.view.mode = mode;
            vec![]
        }
        Action::SetEmbeddingAxes { x, y } => {
            let n = store.graph.node_count();
            store.view.x_index = clamp_axis_index(x, n);
            store.view.y_index = clamp_axis_index(y, n);
            vec![]
        }
        Action::SetLayer { layer } => {
            let layers = match &store.result {
                ResultPayload::Attention(payload) => payload.layers.len(),
                ResultPayload::Spectrum(_) => 0,
            };
            store.view.layer = layer.min(layers.saturating_sub(1));
            store.view.heatmap_hovered_cell = None;
            vec![]
        }
        Action::SetAttentionView { view } => {
            store.view.attention_view = view;
            vec![]
        }
        Action::SetHeatmapHoveredCell { cell } => {
            store.view.heatmap_hovered_cell = cell;
            vec![]
        }

        // Settings
        Action::UpdateCanvasSettings { canvas } => {
            store.settings.canvas = canvas.sanitized();
            store.set_padding(store.settings.canvas.padding);
            vec![]
        }

        // File Operations
        Action::SaveToFile { path } => {
            vec![Effect::SaveToFile { path }]
        }
        Action::LoadFromFile { path } => {
            vec![Effect::LoadFromFile { path }]
        }
        Action::ProjectLoaded { result } => {
            let applied = result.and_then(|project| {
                store.apply_project(project).map_err(|e| e.to_string())
            });
            if let Err(e) = applied {
                log::warn!("failed to load project: {}", e);
                store.error_message = Some(e);
            }
            vec![]
        }
        Action::ClearErrorMessage => {
            store.error_message = None;
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{RawSpectrum, RawSpectrumPayload};
    use crate::settings::EditorSettings;
    use graph_edit::{Edge, Graph};

    fn store() -> Store {
        Store::with_seed(EditorSettings::default(), 7)
    }

    fn dispatch(store: &mut Store, actions: impl IntoIterator<Item = Action>) -> Vec<Effect> {
        actions
            .into_iter()
            .flat_map(|a| update(store, a))
            .collect()
    }

    fn spectrum(eigenvalues: Vec<f64>) -> SpectrumPayload {
        let n = eigenvalues.len();
        let eigenvectors = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
            .collect();
        RawSpectrumPayload {
            adjacency: RawSpectrum {
                eigenvalues,
                eigenvectors,
                matrix: None,
            },
            ..RawSpectrumPayload::default()
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_delete_middle_node_of_triangle() {
        let mut store = store();

        dispatch(
            &mut store,
            [Action::ClickNode { id: 1 }, Action::DeleteSelectedNodes],
        );

        let ids: Vec<usize> = store.graph.nodes().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(store.graph.edges(), &[Edge::new(1, 0)]);
        assert!(store.selection.is_empty());
        assert_eq!(store.warnings.node, None);
    }

    #[test]
    fn test_add_edges_after_deletion_reports_connected() {
        let mut store = store();
        dispatch(
            &mut store,
            [
                Action::ClickNode { id: 1 },
                Action::DeleteSelectedNodes,
                Action::ClickNode { id: 0 },
                Action::ClickNode { id: 1 },
                Action::AddEdgesBetweenSelected,
            ],
        );

        assert_eq!(
            store.warnings.edge.as_deref(),
            Some("All selected pairs already connected")
        );
        assert_eq!(store.graph.edge_count(), 1);
    }

    #[test]
    fn test_add_edges_inserts_missing_pair() {
        let mut store = store();
        store.graph = Graph::from_parts(
            [Point::new(50.0, 50.0), Point::new(90.0, 50.0), Point::new(70.0, 90.0)],
            vec![Edge::new(0, 1)],
        )
        .unwrap();

        dispatch(
            &mut store,
            [
                Action::ClickNode { id: 2 },
                Action::ClickNode { id: 0 },
                Action::AddEdgesBetweenSelected,
            ],
        );

        assert!(store.graph.has_edge(0, 2));
        assert_eq!(store.graph.edges().last(), Some(&Edge::new(2, 0)));
        assert_eq!(store.warnings.edge, None);
    }

    #[test]
    fn test_missing_selection_warnings_leave_graph_untouched() {
        let mut store = store();
        let before = store.graph.clone();

        dispatch(
            &mut store,
            [
                Action::DeleteSelectedNodes,
                Action::DeleteSelectedEdge,
                Action::ClickNode { id: 0 },
                Action::AddEdgesBetweenSelected,
            ],
        );

        assert_eq!(store.graph, before);
        assert_eq!(store.warnings.node.as_deref(), Some("Select node(s) to delete"));
        assert_eq!(store.warnings.edge.as_deref(), Some("Select two nodes"));
    }

    #[test]
    fn test_success_clears_warning() {
        let mut store = store();
        update(&mut store, Action::DeleteSelectedEdge);
        assert!(store.warnings.edge.is_some());

        dispatch(
            &mut store,
            [Action::ClickEdge { index: 1 }, Action::DeleteSelectedEdge],
        );

        assert_eq!(store.warnings.edge, None);
        assert_eq!(store.selection.edge(), None);
        assert_eq!(store.graph.edges(), &[Edge::new(0, 1), Edge::new(2, 0)]);
    }

    #[test]
    fn test_clicks_on_unknown_targets_are_ignored() {
        let mut store = store();
        dispatch(
            &mut store,
            [Action::ClickNode { id: 9 }, Action::ClickEdge { index: 9 }],
        );
        assert!(store.selection.is_empty());
    }

    #[test]
    fn test_generate_coerces_count() {
        let mut store = store();

        dispatch(
            &mut store,
            [
                Action::SetGeneratorCount { text: String::from("abc") },
                Action::SetEdgeProbability { p: 0.0 },
                Action::GenerateNodes,
            ],
        );
        assert_eq!(store.graph.node_count(), 4);
        // Only the bridge to the previous last node.
        assert_eq!(store.graph.edges().last(), Some(&Edge::new(2, 3)));

        dispatch(
            &mut store,
            [
                Action::SetGeneratorCount { text: String::from("-2") },
                Action::GenerateNodes,
            ],
        );
        assert_eq!(store.graph.node_count(), 4);
        assert_eq!(
            store.warnings.generate.as_deref(),
            Some("Enter a positive number of nodes")
        );
    }

    #[test]
    fn test_coerce_count() {
        assert_eq!(coerce_count("5", 500), 5);
        assert_eq!(coerce_count(" 12 ", 500), 12);
        assert_eq!(coerce_count("", 500), 1);
        assert_eq!(coerce_count("0", 500), 0);
        assert_eq!(coerce_count("-4", 500), 0);
        assert_eq!(coerce_count("100000", 500), 500);
    }

    #[test]
    fn test_edge_probability_is_clamped() {
        let mut store = store();
        update(&mut store, Action::SetEdgeProbability { p: 3.0 });
        assert_eq!(store.generator.edge_probability, 1.0);
        update(&mut store, Action::SetEdgeProbability { p: f64::NAN });
        assert_eq!(store.generator.edge_probability, 0.0);
    }

    #[test]
    fn test_drag_moves_and_clamps_node() {
        let mut store = store();
        dispatch(
            &mut store,
            [
                Action::SetCanvasSize { width: 400.0, height: 300.0 },
                Action::MoveNode { id: 2, x: 500.0, y: 150.0 },
            ],
        );
        let node = store.graph.node(2).unwrap();
        assert_eq!((node.x, node.y), (380.0, 150.0));
    }

    #[test]
    fn test_surface_events_become_actions() {
        let mut store = store();
        update(&mut store, Action::from(SurfaceEvent::NodeClicked(2)));
        assert!(store.selection.is_node_selected(2));

        update(&mut store, SurfaceEvent::EdgeClicked(0).into());
        assert!(store.selection.is_edge_selected(0));
        assert!(store.selection.nodes().is_empty());
    }

    #[test]
    fn test_request_spectrum_emits_fetch_with_graph() {
        let mut store = store();

        let effects = update(&mut store, Action::RequestSpectrum);

        match effects.as_slice() {
            [Effect::FetchSpectrum { epoch, request }] => {
                assert_eq!(*epoch, store.request_epoch);
                assert_eq!(request.nodes, vec![0, 1, 2]);
                assert_eq!(request.edges, vec![[0, 1], [1, 2], [2, 0]]);
            }
            other => panic!("unexpected effects: {:?}", other),
        }
        assert_eq!(store.awaiting, Some(store.request_epoch));
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut store = store();
        update(&mut store, Action::RequestSpectrum);
        let first = store.request_epoch;
        update(&mut store, Action::RequestSpectrum);
        let second = store.request_epoch;

        // The newer request answers first, then the older one arrives late.
        update(
            &mut store,
            Action::SpectrumReceived {
                epoch: second,
                result: Ok(spectrum(vec![2.0, 1.0, -1.0])),
            },
        );
        update(
            &mut store,
            Action::SpectrumReceived {
                epoch: first,
                result: Ok(spectrum(vec![9.0])),
            },
        );

        match &store.result {
            ResultPayload::Spectrum(payload) => {
                assert_eq!(payload.get(MatrixKind::Adjacency).eigenvalues, vec![2.0, 1.0, -1.0]);
            }
            other => panic!("unexpected payload: {:?}", other),
        }
        assert_eq!(store.awaiting, None);
    }

    #[test]
    fn test_failed_request_keeps_previous_payload() {
        let mut store = store();
        update(&mut store, Action::RequestSpectrum);
        let epoch = store.request_epoch;
        update(
            &mut store,
            Action::SpectrumReceived {
                epoch,
                result: Ok(spectrum(vec![1.0])),
            },
        );
        let shown = store.result.clone();

        update(&mut store, Action::RequestSpectrum);
        let epoch = store.request_epoch;
        update(
            &mut store,
            Action::SpectrumReceived {
                epoch,
                result: Err(ApiError::Status(500)),
            },
        );

        assert_eq!(store.result, shown);
        assert_eq!(
            store.status.as_deref(),
            Some("Spectrum request failed: backend returned HTTP 500")
        );
    }

    #[test]
    fn test_clear_resets_everything_and_drops_in_flight() {
        let mut store = store();
        update(&mut store, Action::RequestSpectrum);
        let in_flight = store.request_epoch;
        dispatch(
            &mut store,
            [
                Action::ClickNode { id: 0 },
                Action::DeleteSelectedEdge,
                Action::ClearAll,
                Action::SpectrumReceived {
                    epoch: in_flight,
                    result: Ok(spectrum(vec![1.0, 2.0])),
                },
            ],
        );

        assert!(store.graph.nodes().is_empty());
        assert!(store.graph.edges().is_empty());
        assert!(store.selection.is_empty());
        assert_eq!(store.warnings, Warnings::default());
        match &store.result {
            ResultPayload::Spectrum(payload) => {
                for kind in MatrixKind::ALL {
                    assert!(payload.get(kind).eigenvalues.is_empty());
                    assert_eq!(payload.get(kind).eigenvectors.nrows(), 0);
                }
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_embedding_axes_clamp_to_node_count() {
        let mut store = store();
        update(&mut store, Action::SetEmbeddingAxes { x: 0, y: 10 });
        assert_eq!((store.view.x_index, store.view.y_index), (1, 3));

        store.clear();
        update(&mut store, Action::SetEmbeddingAxes { x: 4, y: 2 });
        assert_eq!((store.view.x_index, store.view.y_index), (1, 1));
    }

    #[test]
    fn test_attention_request_needs_sentence() {
        let mut store = store();
        assert!(update(&mut store, Action::RequestAttention).is_empty());
        assert!(store.status.is_some());

        update(
            &mut store,
            Action::SetSentence { sentence: String::from("the cat sat") },
        );
        let effects = update(&mut store, Action::RequestAttention);
        match effects.as_slice() {
            [Effect::FetchAttention { request, .. }] => {
                assert_eq!(request.model, "bert-base-uncased");
                assert_eq!(request.sentence, "the cat sat");
                assert_eq!(request.task, AttentionTask::Mlm);
                assert_eq!(request.masked_word, None);
            }
            other => panic!("unexpected effects: {:?}", other),
        }
    }

    #[test]
    fn test_attention_request_carries_task_and_mask() {
        let mut store = store();
        dispatch(
            &mut store,
            vec![
                Action::SetSentence { sentence: String::from("the cat sat") },
                Action::SetMaskWord { word: String::from("cat") },
            ],
        );

        let effects = update(&mut store, Action::RequestAttention);
        match effects.as_slice() {
            [Effect::FetchAttention { request, .. }] => {
                assert_eq!(request.masked_word.as_deref(), Some("cat"));
                assert_eq!(request.masked_index, Some(1));
            }
            other => panic!("unexpected effects: {:?}", other),
        }

        update(&mut store, Action::SetTask { task: AttentionTask::Classification });
        let effects = update(&mut store, Action::RequestAttention);
        match effects.as_slice() {
            [Effect::FetchAttention { request, .. }] => {
                assert_eq!(request.task, AttentionTask::Classification);
                assert_eq!(request.masked_word, None);
            }
            other => panic!("unexpected effects: {:?}", other),
        }
    }

    #[test]
    fn test_missing_mask_word_blocks_request() {
        let mut store = store();
        dispatch(
            &mut store,
            vec![
                Action::SetSentence { sentence: String::from("the cat sat") },
                Action::SetMaskWord { word: String::from("dog") },
            ],
        );
        let epoch = store.request_epoch;

        assert!(update(&mut store, Action::RequestAttention).is_empty());
        assert_eq!(store.request_epoch, epoch);
        assert_eq!(store.awaiting, None);
        assert!(store.status.as_deref().is_some_and(|s| s.contains("dog")));
    }

    #[test]
    fn test_layer_selection_is_clamped() {
        let mut store = store();
        let epoch = store.next_epoch();
        let payload = crate::payload::RawAttentionPayload {
            tokens: vec![String::from("a")],
            layers: vec![
                crate::payload::RawLayer {
                    attention: vec![vec![1.0]],
                    gradient: vec![],
                };
                2
            ],
        }
        .validate()
        .unwrap();
        update(&mut store, Action::AttentionReceived { epoch, result: Ok(payload) });

        update(&mut store, Action::SetLayer { layer: 5 });
        assert_eq!(store.view.layer, 1);
    }

    #[test]
    fn test_project_loaded_error_goes_to_modal() {
        let mut store = store();
        update(
            &mut store,
            Action::ProjectLoaded { result: Err(String::from("bad file")) },
        );
        assert_eq!(store.error_message.as_deref(), Some("bad file"));

        update(&mut store, Action::ClearErrorMessage);
        assert_eq!(store.error_message, None);
    }

    #[test]
    fn test_file_actions_become_effects() {
        let mut store = store();
        let path = PathBuf::from("graph.json");
        let effects = update(&mut store, Action::SaveToFile { path: path.clone() });
        assert!(matches!(effects.as_slice(), [Effect::SaveToFile { path: p }] if *p == path));
    }
}
