// src/generation/mock.rs

//! Mock generator for exercising the generation flow without real API calls.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use crate::generation::{
    GenerationError, GenerationRequest, QuizGenerator, parse::parse_generated_questions,
};
use crate::models::generation::GeneratedQuestion;

/// Returns a fixed raw reply, decoded through the same strict parser as the real client.
pub struct MockGenerator {
    /// Raw text the "model" answers with; `None` simulates an unconfigured service.
    reply: Option<String>,
    explanation: String,
    call_count: AtomicU32,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl MockGenerator {
    pub fn with_reply(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            explanation: "Because it is correct.".to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// A generator that fails every call as if no API key were set.
    pub fn unavailable() -> Self {
        Self {
            reply: None,
            ..Self::with_reply("")
        }
    }

    pub fn with_explanation(mut self, explanation: &str) -> Self {
        self.explanation = explanation.to_string();
        self
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().ok().and_then(|guard| guard.clone())
    }

    fn reply(&self) -> Result<&str, GenerationError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.reply
            .as_deref()
            .ok_or_else(|| GenerationError::NotConfigured("mock generator is unavailable".to_string()))
    }
}

#[async_trait]
impl QuizGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate_questions(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<GeneratedQuestion>, GenerationError> {
        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some(request.clone());
        }
        parse_generated_questions(self.reply()?)
    }

    async fn explain(
        &self,
        _question_text: &str,
        _correct_answer_text: &str,
    ) -> Result<String, GenerationError> {
        self.reply()?;
        Ok(self.explanation.clone())
    }
}
