//! Reqwest-based client for the Pony Playground evaluation service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Body of an evaluation-by-submission request, serialized verbatim
/// as the playground's `evaluate.json` endpoint expects it.
#[derive(Debug, Clone, Serialize)]
pub struct EvalRequest {
    pub code: String,
    pub separate_output: bool,
    pub color: bool,
    pub branch: String,
}

/// Wire shape shared by both evaluation endpoints. The service omits
/// whichever of `stdout`/`compiler` does not apply.
#[derive(Debug, Clone, Deserialize)]
pub struct EvalResponse {
    pub success: bool,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub compiler: String,
}

/// Tagged outcome of one evaluation: the program's output, or the
/// compiler's message when the snippet did not build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalOutcome {
    Success { stdout: String },
    Failure { compiler: String },
}

impl EvalOutcome {
    /// The text a caller renders, whichever side it came from.
    pub fn text(&self) -> &str {
        match self {
            EvalOutcome::Success { stdout } => stdout,
            EvalOutcome::Failure { compiler } => compiler,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, EvalOutcome::Success { .. })
    }
}

impl From<EvalResponse> for EvalOutcome {
    fn from(resp: EvalResponse) -> Self {
        if resp.success {
            EvalOutcome::Success { stdout: resp.stdout }
        } else {
            EvalOutcome::Failure { compiler: resp.compiler }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PlaygroundError {
    #[error("network failure: {detail}")]
    Network { detail: String },

    #[error("malformed response: {detail}")]
    Parse { detail: String },

    #[error("snippet identifier must not be empty")]
    EmptyIdentifier,
}

impl From<reqwest::Error> for PlaygroundError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PlaygroundError::Parse { detail: err.to_string() }
        } else {
            PlaygroundError::Network { detail: err.to_string() }
        }
    }
}

/// Seam between the runner and the network. The HTTP client below is
/// the production implementation; tests substitute an in-memory one.
#[async_trait]
pub trait Evaluate: Send + Sync {
    /// Evaluation-by-reference: the service resolves and runs the
    /// snippet from its identifier alone.
    async fn evaluate_snippet(&self, id: &str) -> Result<EvalOutcome, PlaygroundError>;

    /// Fetch a snippet's raw source text from the content host.
    async fn fetch_source(&self, id: &str) -> Result<String, PlaygroundError>;

    /// Evaluation-by-submission: run code carried in the request body.
    async fn evaluate_code(&self, req: &EvalRequest) -> Result<EvalOutcome, PlaygroundError>;
}

pub struct PlaygroundClient {
    client: reqwest::Client,
    playground_url: String,
    snippet_base_url: String,
}

impl PlaygroundClient {
    pub fn from_config(cfg: &Config) -> Result<Self, PlaygroundError> {
        let timeout_secs = cfg.get_u64("REQUEST_TIMEOUT").unwrap_or(60);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            playground_url: cfg.playground_url().trim_end_matches('/').to_string(),
            snippet_base_url: cfg.snippet_base_url().trim_end_matches('/').to_string(),
        })
    }

    async fn parse_outcome(resp: reqwest::Response) -> Result<EvalOutcome, PlaygroundError> {
        match resp.status() {
            StatusCode::OK => {
                let body = resp.text().await?;
                let parsed: EvalResponse = serde_json::from_str(&body)
                    .map_err(|e| PlaygroundError::Parse { detail: e.to_string() })?;
                Ok(parsed.into())
            }
            status => {
                let text = resp.text().await.unwrap_or_default();
                Err(PlaygroundError::Network {
                    detail: format!("{} - {}", status, text),
                })
            }
        }
    }

    fn check_id(id: &str) -> Result<(), PlaygroundError> {
        if id.trim().is_empty() {
            return Err(PlaygroundError::EmptyIdentifier);
        }
        Ok(())
    }
}

#[async_trait]
impl Evaluate for PlaygroundClient {
    async fn evaluate_snippet(&self, id: &str) -> Result<EvalOutcome, PlaygroundError> {
        Self::check_id(id)?;
        let resp = self
            .client
            .get(format!("{}/", self.playground_url))
            .query(&[("snippet", id)])
            .send()
            .await?;
        Self::parse_outcome(resp).await
    }

    async fn fetch_source(&self, id: &str) -> Result<String, PlaygroundError> {
        Self::check_id(id)?;
        let resp = self
            .client
            .get(format!("{}/{}", self.snippet_base_url, id))
            .send()
            .await?;
        match resp.status() {
            StatusCode::OK => Ok(resp.text().await?),
            status => {
                let text = resp.text().await.unwrap_or_default();
                Err(PlaygroundError::Network {
                    detail: format!("{} - {}", status, text),
                })
            }
        }
    }

    async fn evaluate_code(&self, req: &EvalRequest) -> Result<EvalOutcome, PlaygroundError> {
        let resp = self
            .client
            .post(format!("{}/evaluate.json", self.playground_url))
            .json(req)
            .send()
            .await?;
        Self::parse_outcome(resp).await
    }
}
