// src/generation/gemini.rs

//! Google Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::Config;
use crate::generation::{
    GenerationError, GenerationRequest, QuizGenerator,
    parse::{explanation_prompt, parse_generated_questions, quiz_prompt},
};
use crate::models::generation::GeneratedQuestion;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiGenerator {
    api_key: Option<String>,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiGenerator {
    pub fn new(
        api_key: Option<String>,
        base_url: &str,
        model: &str,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        Ok(Self {
            api_key: api_key.filter(|k| !k.is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, GenerationError> {
        Self::new(
            config.google_api_key.clone(),
            &config.gemini_base_url,
            &config.gemini_model,
        )
    }

    /// Sends one prompt and returns the first text part of the first candidate.
    async fn generate_text(&self, prompt: String) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            tracing::error!("GOOGLE_API_KEY is not set.");
            GenerationError::NotConfigured("GOOGLE_API_KEY is not set".to_string())
        })?;

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    // The URL is dropped so nothing request-specific reaches callers.
                    GenerationError::Network(e.without_url().to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            let message = response.text().await.unwrap_or_default();
            tracing::error!("Gemini API Error: Status {} - Body: {}", status, message);
            return Err(GenerationError::Api { status, message });
        }

        let api_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::UnexpectedResponse(e.to_string()))?;

        api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| {
                tracing::error!("Gemini response carried no text candidate");
                GenerationError::UnexpectedResponse("no text candidate".to_string())
            })
    }
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize, Deserialize, Default)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
}

#[async_trait]
impl QuizGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, request), fields(subject = %request.subject, count = request.question_count))]
    async fn generate_questions(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<GeneratedQuestion>, GenerationError> {
        let text = self.generate_text(quiz_prompt(request)).await?;
        let questions = parse_generated_questions(&text)?;

        if questions.len() != request.question_count as usize {
            tracing::warn!(
                "Requested {} questions, generator returned {}",
                request.question_count,
                questions.len()
            );
        }
        Ok(questions)
    }

    #[instrument(skip_all)]
    async fn explain(
        &self,
        question_text: &str,
        correct_answer_text: &str,
    ) -> Result<String, GenerationError> {
        let text = self
            .generate_text(explanation_prompt(question_text, correct_answer_text))
            .await?;
        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::generation::Difficulty;
    use axum::response::IntoResponse;
    use wiremock::matchers::{header, method, path};

    use crate::error::AppError;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL: &str = "gemini-1.5-flash-001";
    const ENDPOINT: &str = "/v1beta/models/gemini-1.5-flash-001:generateContent";

    fn request() -> GenerationRequest {
        GenerationRequest {
            subject: "Physics".to_string(),
            topic: "Newton's laws".to_string(),
            question_count: 1,
            difficulty: Difficulty::Easy,
        }
    }

    fn envelope(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": text}], "role": "model"}}]
        })
    }

    #[tokio::test]
    async fn successful_generation() {
        let server = MockServer::start().await;
        let text = "```json\n[{\"text\": \"F = ?\", \"options\": [\"ma\", \"mv\", \"m/a\", \"a/m\"], \"correct_index\": 0, \"rationale\": \"Second law.\"}]\n```";

        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(text)))
            .mount(&server)
            .await;

        let generator =
            GeminiGenerator::new(Some("test-key".to_string()), &server.uri(), MODEL).unwrap();
        let questions = generator.generate_questions(&request()).await.unwrap();

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].options[0], "ma");
        assert_eq!(questions[0].correct_index, 0);
    }

    #[tokio::test]
    async fn api_error_status_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let generator =
            GeminiGenerator::new(Some("bad-key".to_string()), &server.uri(), MODEL).unwrap();
        let err = generator.generate_questions(&request()).await.unwrap_err();

        assert!(matches!(err, GenerationError::Api { status: 403, .. }));
        assert!(err.to_string().contains("API key not valid"));
    }

    #[tokio::test]
    async fn malformed_content_is_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(envelope("Here are some questions!")),
            )
            .mount(&server)
            .await;

        let generator =
            GeminiGenerator::new(Some("test-key".to_string()), &server.uri(), MODEL).unwrap();
        let err = generator.generate_questions(&request()).await.unwrap_err();

        assert!(matches!(err, GenerationError::Malformed(_)));
    }

    #[tokio::test]
    async fn missing_candidates_is_unexpected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let generator =
            GeminiGenerator::new(Some("test-key".to_string()), &server.uri(), MODEL).unwrap();
        let err = generator.explain("Why?", "Because").await.unwrap_err();

        assert!(matches!(err, GenerationError::UnexpectedResponse(_)));
    }

    #[tokio::test]
    async fn explanation_is_trimmed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(envelope("  Force equals mass times acceleration.\n")),
            )
            .mount(&server)
            .await;

        let generator =
            GeminiGenerator::new(Some("test-key".to_string()), &server.uri(), MODEL).unwrap();
        let text = generator.explain("F = ?", "ma").await.unwrap();

        assert_eq!(text, "Force equals mass times acceleration.");
    }

    #[tokio::test]
    async fn key_is_sent_as_header_not_in_url() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope("Because.")))
            .mount(&server)
            .await;

        let generator =
            GeminiGenerator::new(Some("test-key".to_string()), &server.uri(), MODEL).unwrap();
        generator.explain("Why?", "Because").await.unwrap();

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
        assert!(received[0].url.query().is_none());
    }

    #[tokio::test]
    async fn unreachable_service_does_not_expose_key() {
        // Nothing listens on the discard port.
        let generator =
            GeminiGenerator::new(Some("SUPER-SECRET-KEY".to_string()), "http://127.0.0.1:9", MODEL)
                .unwrap();
        let err = generator.explain("Why?", "Because").await.unwrap_err();
        assert!(matches!(err, GenerationError::Network(_)));
        assert!(!err.to_string().contains("SUPER-SECRET-KEY"));

        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), axum::http::StatusCode::BAD_GATEWAY);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(!body.contains("SUPER-SECRET-KEY"));
        assert!(!body.contains("127.0.0.1"));
    }

    #[tokio::test]
    async fn upstream_error_body_stays_out_of_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(
                ResponseTemplate::new(400).set_body_string("quota exceeded for project 1234"),
            )
            .mount(&server)
            .await;

        let generator =
            GeminiGenerator::new(Some("test-key".to_string()), &server.uri(), MODEL).unwrap();
        let err = generator.explain("Why?", "Because").await.unwrap_err();

        let response = AppError::from(err).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(!body.contains("project 1234"));
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let generator = GeminiGenerator::new(None, "http://127.0.0.1:9", MODEL).unwrap();
        let err = generator.generate_questions(&request()).await.unwrap_err();

        assert!(matches!(err, GenerationError::NotConfigured(_)));
    }
}
