//! Generative answer engines.
//!
//! An engine receives the corpus text as an opaque blob plus an
//! [`Instruction`] telling it what to do with it. Failures are reported to
//! the caller and never retried here.

use crate::config::OllamaConfig;
use crate::error::{CoreError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Text wrapped around the corpus when building a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Placed before the corpus
    pub preamble: String,
    /// Placed after the corpus
    pub closing: String,
}

impl Instruction {
    pub fn new(preamble: impl Into<String>, closing: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
            closing: closing.into(),
        }
    }

    pub fn render(&self, corpus: &str) -> String {
        format!("{}\nContent:\n{}\n\n{}", self.preamble, corpus, self.closing)
    }
}

#[async_trait]
pub trait AnswerEngine: Send + Sync {
    async fn generate(&self, corpus: &str, instruction: &Instruction) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Engine backed by an Ollama server's `/api/generate` endpoint.
pub struct OllamaEngine {
    client: Client,
    config: OllamaConfig,
}

impl OllamaEngine {
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/generate", self.config.host.trim_end_matches('/'))
    }
}

#[async_trait]
impl AnswerEngine for OllamaEngine {
    async fn generate(&self, corpus: &str, instruction: &Instruction) -> Result<String> {
        let prompt = instruction.render(corpus);
        let endpoint = self.endpoint();
        info!(
            "Requesting completion from {} ({} prompt chars)",
            self.config.model,
            prompt.chars().count()
        );

        let request = GenerateRequest {
            model: &self.config.model,
            prompt: &prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&endpoint)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: GenerateResponse = response.json().await.map_err(|e| {
            CoreError::Engine(format!("unexpected response from {}: {}", endpoint, e))
        })?;
        debug!("Engine returned {} chars", body.response.len());

        Ok(body.response.trim().to_string())
    }
}
