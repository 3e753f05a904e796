// src/generation/mod.rs

//! AI content-generation collaborator.
//!
//! The rest of the application only sees the [`QuizGenerator`] trait; the concrete
//! client is chosen once in `main` and injected through `AppState`.

pub mod gemini;
pub mod mock;
pub mod parse;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::generation::{Difficulty, GeneratedQuestion};

pub use gemini::GeminiGenerator;
pub use mock::MockGenerator;

/// Errors that can occur while talking to the AI collaborator.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No API key or endpoint is configured.
    #[error("AI generation is not configured: {0}")]
    NotConfigured(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The API returned a non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The API answered but not in the documented envelope.
    #[error("unexpected API response structure: {0}")]
    UnexpectedResponse(String),

    /// The generated text is not a valid list of questions.
    #[error("malformed generated content: {0}")]
    Malformed(String),
}

/// Input contract of the generator.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub subject: String,
    pub topic: String,
    pub question_count: u32,
    pub difficulty: Difficulty,
}

#[async_trait]
pub trait QuizGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Produces validated questions: each has text, exactly four options and a
    /// correct index in range.
    async fn generate_questions(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<GeneratedQuestion>, GenerationError>;

    /// Explains to a student why `correct_answer_text` answers `question_text`.
    async fn explain(
        &self,
        question_text: &str,
        correct_answer_text: &str,
    ) -> Result<String, GenerationError>;
}
