//! HTTP client for the spectrum / attention backend.
//!
//! Requests run off the UI thread: a spawned thread with the blocking
//! client on native, a local future on wasm. Either way the caller gets its
//! result through the `on_done` callback.

use crate::payload::PayloadError;
use graph_edit::Graph;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const SPECTRUM_PATH: &str = "/get_spectrum";
pub const ATTENTION_PATH: &str = "/get_attention";

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("backend returned HTTP {0}")]
    Status(u16),
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("invalid payload: {0}")]
    Payload(#[from] PayloadError),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            ApiError::Status(status.as_u16())
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

/// Body of the spectrum request: node ids and edges as id pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRequest {
    pub nodes: Vec<usize>,
    pub edges: Vec<[usize; 2]>,
}

impl From<&Graph> for GraphRequest {
    fn from(graph: &Graph) -> Self {
        Self {
            nodes: graph.nodes().iter().map(|n| n.id).collect(),
            edges: graph
                .edges()
                .iter()
                .map(|e| [e.source, e.target])
                .collect(),
        }
    }
}

/// What the model is run for. Masking only applies to `Mlm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttentionTask {
    #[default]
    Mlm,
    Classification,
}

impl AttentionTask {
    pub const ALL: [AttentionTask; 2] = [AttentionTask::Mlm, AttentionTask::Classification];

    pub fn label(&self) -> &'static str {
        match self {
            AttentionTask::Mlm => "Masked LM",
            AttentionTask::Classification => "Classification",
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("masked word \"{0}\" is not in the sentence")]
pub struct MaskError(pub String);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionRequest {
    pub model: String,
    pub task: AttentionTask,
    pub sentence: String,
    /// Word replaced by the model's mask token, with its 0-based position
    /// among the words of `sentence`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masked_word: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masked_index: Option<usize>,
}

impl AttentionRequest {
    /// Keeps only the first `max_words` whitespace-separated words.
    pub fn new(model: &str, task: AttentionTask, sentence: &str, max_words: usize) -> Self {
        let sentence = sentence
            .split_whitespace()
            .take(max_words)
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            model: model.to_string(),
            task,
            sentence,
            masked_word: None,
            masked_index: None,
        }
    }

    /// Mask the first occurrence of `word`, ignoring case and surrounding
    /// punctuation. A blank word, or any task other than `Mlm`, leaves the
    /// request unmasked.
    pub fn with_mask(mut self, word: &str) -> Result<Self, MaskError> {
        let word = word.trim();
        if word.is_empty() || self.task != AttentionTask::Mlm {
            return Ok(self);
        }
        let wanted = normalize_word(word);
        let index = self
            .sentence
            .split(' ')
            .position(|w| normalize_word(w) == wanted)
            .ok_or_else(|| MaskError(word.to_string()))?;
        self.masked_word = Some(word.to_string());
        self.masked_index = Some(index);
        Ok(self)
    }
}

fn normalize_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    #[cfg_attr(target_arch = "wasm32", allow(dead_code))]
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn spawn_post<Req, Resp, F>(&self, path: &str, body: Req, on_done: F)
    where
        Req: Serialize + Send + 'static,
        Resp: DeserializeOwned + Send + 'static,
        F: FnOnce(Result<Resp, ApiError>) + Send + 'static,
    {
        let url = self.url(path);
        log::info!("POST {}", url);

        #[cfg(not(target_arch = "wasm32"))]
        {
            let timeout = self.timeout;
            std::thread::spawn(move || on_done(post_blocking(&url, timeout, &body)));
        }

        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(async move {
                on_done(post_async(&url, &body).await);
            });
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn post_blocking<Req: Serialize, Resp: DeserializeOwned>(
    url: &str,
    timeout: Duration,
    body: &Req,
) -> Result<Resp, ApiError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()?;
    let response = client.post(url).json(body).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status(status.as_u16()));
    }
    let text = response.text()?;
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}

// The browser enforces its own timeouts.
#[cfg(target_arch = "wasm32")]
async fn post_async<Req: Serialize, Resp: DeserializeOwned>(
    url: &str,
    body: &Req,
) -> Result<Resp, ApiError> {
    let response = reqwest::Client::new().post(url).json(body).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status(status.as_u16()));
    }
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}
