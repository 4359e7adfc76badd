use crate::actions::Action;
use crate::api::{
    ATTENTION_PATH, ApiClient, ApiError, AttentionRequest, GraphRequest, SPECTRUM_PATH,
};
use crate::payload::{RawAttentionPayload, RawSpectrumPayload};
use crate::store::Store;
use eframe::egui;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::time::Duration;

/// Deferred effects that must run outside the main reducer (file IO,
/// backend requests)
#[derive(Debug, Clone)]
pub enum Effect {
    /// Save current project to disk
    SaveToFile { path: PathBuf },
    /// Load a project from disk
    LoadFromFile { path: PathBuf },
    /// POST the graph to the spectrum endpoint
    FetchSpectrum { epoch: u64, request: GraphRequest },
    /// POST a sentence to the attention endpoint
    FetchAttention {
        epoch: u64,
        request: AttentionRequest,
    },
}

/// Where asynchronous results go once they arrive.
pub struct EffectEnv<'a> {
    pub inbox: &'a Sender<Action>,
    pub repaint: Option<&'a egui::Context>,
}

/// Execute a single effect against the store
pub fn run(store: &mut Store, env: &EffectEnv, effect: Effect) {
    match effect {
        Effect::SaveToFile { path } => {
            if let Err(e) = store.save_to_file(&path) {
                log::warn!("failed to save {}: {}", path.display(), e);
                store.error_message = Some(e.to_string());
            } else {
                log::info!("saved project to {}", path.display());
            }
        }
        Effect::LoadFromFile { path } => {
            if let Err(e) = store.load_from_file(&path) {
                log::warn!("failed to load {}: {}", path.display(), e);
                store.error_message = Some(e.to_string());
            } else {
                log::info!("loaded project from {}", path.display());
            }
        }
        Effect::FetchSpectrum { epoch, request } => {
            let deliver = deliverer(env);
            client(store).spawn_post(
                SPECTRUM_PATH,
                request,
                move |result: Result<RawSpectrumPayload, ApiError>| {
                    let result = result.and_then(|raw| raw.validate().map_err(ApiError::from));
                    deliver(Action::SpectrumReceived { epoch, result });
                },
            );
        }
        Effect::FetchAttention { epoch, request } => {
            let deliver = deliverer(env);
            client(store).spawn_post(
                ATTENTION_PATH,
                request,
                move |result: Result<RawAttentionPayload, ApiError>| {
                    let result = result.and_then(|raw| raw.validate().map_err(ApiError::from));
                    deliver(Action::AttentionReceived { epoch, result });
                },
            );
        }
    }
}

// Built per request so a loaded project's backend takes effect immediately.
fn client(store: &Store) -> ApiClient {
    ApiClient::new(
        &store.settings.backend.url,
        Duration::from_secs(store.settings.backend.timeout_secs),
    )
}

fn deliverer(env: &EffectEnv) -> impl FnOnce(Action) + Send + 'static {
    let inbox = env.inbox.clone();
    let repaint = env.repaint.cloned();
    move |action| {
        if inbox.send(action).is_err() {
            log::debug!("inbox closed, dropping backend response");
        }
        if let Some(ctx) = repaint {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::EditorSettings;
    use graph_edit::Graph;
    use std::sync::mpsc;

    #[test]
    fn test_save_then_load_effect_restores_graph() {
        let (tx, _rx) = mpsc::channel();
        let env = EffectEnv {
            inbox: &tx,
            repaint: None,
        };
        let path = std::env::temp_dir().join("spectral_editor_effect_test.json");

        let mut store = Store::with_seed(EditorSettings::default(), 1);
        run(&mut store, &env, Effect::SaveToFile { path: path.clone() });
        store.clear();
        assert!(store.graph.is_empty());

        run(&mut store, &env, Effect::LoadFromFile { path: path.clone() });
        assert_eq!(store.graph, Graph::triangle());
        assert_eq!(store.error_message, None);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_failure_sets_error_message() {
        let (tx, _rx) = mpsc::channel();
        let env = EffectEnv {
            inbox: &tx,
            repaint: None,
        };
        let mut store = Store::with_seed(EditorSettings::default(), 1);

        run(
            &mut store,
            &env,
            Effect::LoadFromFile {
                path: std::env::temp_dir().join("spectral_editor_missing_effect.json"),
            },
        );

        assert!(store.error_message.is_some());
        assert_eq!(store.graph, Graph::triangle());
    }

    #[test]
    fn test_deliverer_forwards_to_inbox() {
        let (tx, rx) = mpsc::channel();
        let env = EffectEnv {
            inbox: &tx,
            repaint: None,
        };

        deliverer(&env)(Action::ClearErrorMessage);

        assert!(matches!(rx.try_recv(), Ok(Action::ClearErrorMessage)));
    }
}
