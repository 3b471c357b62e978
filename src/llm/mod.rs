//! Language-model collaborator.
//!
//! The pipeline never depends on a model being reachable: every call here
//! makes a single attempt and returns [`LlmError`] on failure, which callers
//! turn into "report without narrative".
//!
//! - [`ChatModel`]: the provider seam
//! - [`OpenAiClient`]: OpenAI-compatible chat completions over blocking HTTP
//! - [`MockModel`]: deterministic stand-in for tests and offline runs

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::report::Report;

pub mod mock;
#[cfg(feature = "http")]
pub mod openai;
pub mod prompt;

pub use mock::MockModel;
#[cfg(feature = "http")]
pub use openai::OpenAiClient;

/// Sampling temperature for the report summary and chat answers
pub const SUMMARY_TEMPERATURE: f32 = 0.7;

/// Sampling temperature for the lifestyle plan
pub const PLAN_TEMPERATURE: f32 = 0.6;

/// Errors raised at the model boundary
#[derive(Error, Debug)]
pub enum LlmError {
    /// No API key in the configured environment variable
    #[error("API key not set (expected in ${0})")]
    MissingApiKey(String),

    /// Network or transport failure
    #[error("Communication error: {0}")]
    Communication(String),

    /// Provider answered with a non-success status
    #[error("Provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Response did not contain a usable completion
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A chat completion request: ordered messages plus sampling temperature
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// A hosted or local chat model.
///
/// Implementations make exactly one attempt per call.
pub trait ChatModel: Send + Sync {
    fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;
}

impl<M: ChatModel + ?Sized> ChatModel for Box<M> {
    fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        (**self).complete(request)
    }
}

/// Ask the model for a friendly, non-medical narrative of the report.
pub fn summarize(model: &dyn ChatModel, report: &Report) -> Result<String, LlmError> {
    let request = ChatRequest {
        messages: prompt::summary_messages(report)?,
        temperature: SUMMARY_TEMPERATURE,
    };
    complete_trimmed(model, &request)
}

/// Like [`summarize`], but logs a failure and returns `None`. A blank
/// reply also counts as no summary.
pub fn try_summarize(model: &dyn ChatModel, report: &Report) -> Option<String> {
    match summarize(model, report) {
        Ok(summary) if summary.is_empty() => {
            warn!("AI generation returned an empty summary");
            None
        }
        Ok(summary) => Some(summary),
        Err(e) => {
            warn!("AI generation failed: {}", e);
            None
        }
    }
}

/// Ask the model for a short lifestyle plan grounded on the report and its
/// summary.
pub fn lifestyle_plan(
    model: &dyn ChatModel,
    report: &Report,
    summary: Option<&str>,
) -> Result<String, LlmError> {
    let request = ChatRequest {
        messages: prompt::plan_messages(report, summary)?,
        temperature: PLAN_TEMPERATURE,
    };
    complete_trimmed(model, &request)
}

/// Answer a follow-up question about the report. `history` holds earlier
/// turns of the same conversation, oldest first.
pub fn answer_question(
    model: &dyn ChatModel,
    report: &Report,
    summary: Option<&str>,
    history: &[ChatMessage],
    question: &str,
) -> Result<String, LlmError> {
    let request = ChatRequest {
        messages: prompt::chat_messages(report, summary, history, question)?,
        temperature: SUMMARY_TEMPERATURE,
    };
    complete_trimmed(model, &request)
}

fn complete_trimmed(model: &dyn ChatModel, request: &ChatRequest) -> Result<String, LlmError> {
    let text = model.complete(request)?;
    Ok(text.trim().to_string())
}
