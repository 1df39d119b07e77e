//! HTTP client for the ingestion/chat backend service.
//!
//! Provides a trait-based abstraction over the two backend operations
//! (repository ingestion and question answering), a `reqwest`-backed
//! implementation of the real wire protocol, and a scriptable mock for
//! testing the session controller without a network.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use repovox_core::error::RepovoxError;
use repovox_core::types::RepoContext;

// =============================================================================
// Wire types
// =============================================================================

/// Request body for `POST /api/ingest`.
#[derive(Debug, Clone, Serialize)]
pub struct IngestRequest {
    pub url: String,
}

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub repo_url: String,
}

/// Response body for `POST /api/chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponseBody {
    pub success: bool,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub error: Option<String>,
}

// =============================================================================
// Trait
// =============================================================================

/// The ingestion/chat backend, seen from the session controller.
///
/// Both operations are single-shot request/response calls. The backend is
/// responsible for validating repository existence; callers only guarantee
/// that `url` is syntactically well-formed.
pub trait ChatBackend: Send + Sync {
    /// Ingest one repository and return its prepared context.
    ///
    /// A network error, a non-2xx status, or a `success: false` payload all
    /// count as failure.
    fn ingest(&self, url: &str)
        -> impl Future<Output = Result<RepoContext, RepovoxError>> + Send;

    /// Ask a question about a previously ingested repository.
    ///
    /// Returns the assistant's answer text on success.
    fn chat(
        &self,
        message: &str,
        repo_url: &str,
    ) -> impl Future<Output = Result<String, RepovoxError>> + Send;
}

// =============================================================================
// HTTP implementation
// =============================================================================

/// `reqwest`-backed client for the backend HTTP service.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a client for the given base URL with the given request timeout.
    ///
    /// The timeout applies to both ingest and chat calls; ingesting a large
    /// repository can take a while.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RepovoxError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RepovoxError::Http(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl ChatBackend for HttpBackend {
    async fn ingest(&self, url: &str) -> Result<RepoContext, RepovoxError> {
        // Syntactic check only; repository existence is the backend's problem.
        reqwest::Url::parse(url)
            .map_err(|e| RepovoxError::Ingestion(format!("invalid repository URL: {}", e)))?;

        let endpoint = format!("{}/api/ingest", self.base_url);
        tracing::debug!(endpoint = %endpoint, repo_url = %url, "Sending ingest request");

        let response = self
            .client
            .post(&endpoint)
            .json(&IngestRequest {
                url: url.to_string(),
            })
            .send()
            .await
            .map_err(|e| RepovoxError::Http(e.to_string()))?;

        let status_ok = response.status().is_success();
        let status = response.status();
        let ctx: RepoContext = response
            .json()
            .await
            .map_err(|_| RepovoxError::Ingestion(format!("backend returned {}", status)))?;

        interpret_ingest(status_ok, ctx)
    }

    async fn chat(&self, message: &str, repo_url: &str) -> Result<String, RepovoxError> {
        let endpoint = format!("{}/api/chat", self.base_url);
        tracing::debug!(endpoint = %endpoint, repo_url = %repo_url, "Sending chat request");

        let response = self
            .client
            .post(&endpoint)
            .json(&ChatRequest {
                message: message.to_string(),
                repo_url: repo_url.to_string(),
            })
            .send()
            .await
            .map_err(|e| RepovoxError::Http(e.to_string()))?;

        let status_ok = response.status().is_success();
        let status = response.status();
        let body: ChatResponseBody = response
            .json()
            .await
            .map_err(|_| RepovoxError::Chat(format!("backend returned {}", status)))?;

        interpret_chat(status_ok, body)
    }
}

/// Apply the "non-2xx or success:false is a failure" rule to an ingest reply.
fn interpret_ingest(status_ok: bool, ctx: RepoContext) -> Result<RepoContext, RepovoxError> {
    if !status_ok || !ctx.success {
        let reason = ctx
            .error
            .unwrap_or_else(|| "Failed to ingest repository".to_string());
        return Err(RepovoxError::Ingestion(reason));
    }
    Ok(ctx)
}

/// Apply the "non-2xx or success:false is a failure" rule to a chat reply.
fn interpret_chat(status_ok: bool, body: ChatResponseBody) -> Result<String, RepovoxError> {
    if !status_ok {
        let reason = body
            .error
            .unwrap_or_else(|| "Failed to send message".to_string());
        return Err(RepovoxError::Chat(reason));
    }
    if !body.success {
        let reason = body
            .error
            .unwrap_or_else(|| "Failed to get response".to_string());
        return Err(RepovoxError::Chat(reason));
    }
    Ok(body.response)
}

// =============================================================================
// Mock implementation
// =============================================================================

/// Scriptable backend for testing session behavior without a network.
///
/// Outcomes are queued per operation and consumed in order; when the queue
/// is empty a canned success is returned. Calls are recorded so tests can
/// assert what was sent.
#[derive(Debug, Default)]
pub struct MockBackend {
    ingest_outcomes: Mutex<VecDeque<Result<RepoContext, String>>>,
    chat_outcomes: Mutex<VecDeque<Result<String, String>>>,
    ingest_calls: Mutex<Vec<String>>,
    chat_calls: Mutex<Vec<(String, String)>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next ingest outcome. `Err(reason)` becomes an
    /// `RepovoxError::Ingestion`.
    pub fn push_ingest(&self, outcome: Result<RepoContext, String>) {
        self.ingest_outcomes
            .lock()
            .expect("outcome lock poisoned")
            .push_back(outcome);
    }

    /// Queue the next chat outcome. `Err(reason)` becomes an
    /// `RepovoxError::Chat`.
    pub fn push_chat(&self, outcome: Result<String, String>) {
        self.chat_outcomes
            .lock()
            .expect("outcome lock poisoned")
            .push_back(outcome);
    }

    /// URLs passed to `ingest`, in call order.
    pub fn ingest_calls(&self) -> Vec<String> {
        self.ingest_calls.lock().expect("call lock poisoned").clone()
    }

    /// `(message, repo_url)` pairs passed to `chat`, in call order.
    pub fn chat_calls(&self) -> Vec<(String, String)> {
        self.chat_calls.lock().expect("call lock poisoned").clone()
    }

    /// A minimal successful context for tests.
    pub fn sample_context() -> RepoContext {
        RepoContext {
            success: true,
            content: "[mock repository content]".to_string(),
            tree: "src/\n  lib.rs".to_string(),
            error: None,
        }
    }
}

impl ChatBackend for MockBackend {
    async fn ingest(&self, url: &str) -> Result<RepoContext, RepovoxError> {
        self.ingest_calls
            .lock()
            .expect("call lock poisoned")
            .push(url.to_string());

        let next = self
            .ingest_outcomes
            .lock()
            .expect("outcome lock poisoned")
            .pop_front();
        match next {
            Some(Ok(ctx)) => Ok(ctx),
            Some(Err(reason)) => Err(RepovoxError::Ingestion(reason)),
            None => Ok(Self::sample_context()),
        }
    }

    async fn chat(&self, message: &str, repo_url: &str) -> Result<String, RepovoxError> {
        self.chat_calls
            .lock()
            .expect("call lock poisoned")
            .push((message.to_string(), repo_url.to_string()));

        let next = self
            .chat_outcomes
            .lock()
            .expect("outcome lock poisoned")
            .pop_front();
        match next {
            Some(Ok(answer)) => Ok(answer),
            Some(Err(reason)) => Err(RepovoxError::Chat(reason)),
            None => Ok("[mock answer]".to_string()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
