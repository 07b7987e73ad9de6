//! Language-model client.
//!
//! [`OpenAiClient`] talks to an OpenAI-compatible `/chat/completions`
//! endpoint. It rates candidate relationships through a forced
//! `rate_matches` function call and writes short table descriptions.
//!
//! The client's own methods return [`LlmResult`]; its
//! [`crate::discovery::RelationshipRater`] and
//! [`crate::discovery::TableDescriber`] impls absorb failures.

mod openai;
pub mod prompts;

pub use openai::{OpenAiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};

use thiserror::Error;

/// Result type for language-model calls.
pub type LlmResult<T> = Result<T, LlmError>;

/// Errors from the language-model endpoint.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Transport failure.
    #[error("LLM API call failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("LLM API error ({status}): {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("failed to parse LLM response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The reply had no usable choice, function call or content.
    #[error("unexpected LLM response: {0}")]
    UnexpectedResponse(String),

    /// A rating label outside the five known strengths.
    #[error("unknown strength rating '{0}'")]
    InvalidRating(String),

    /// No API key was configured.
    #[error("missing API key")]
    MissingApiKey,
}
