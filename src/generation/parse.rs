// src/generation/parse.rs

//! Prompt construction and strict decoding of generated quiz content.

use std::sync::LazyLock;

use regex::Regex;
use validator::Validate;

use crate::generation::{GenerationError, GenerationRequest};
use crate::models::generation::GeneratedQuestion;

/// Matches a reply wrapped in a single markdown code fence, e.g. ```` ```json ... ``` ````.
static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[A-Za-z]*[ \t]*\r?\n?(.*?)\r?\n?```$").expect("valid code fence regex")
});

pub fn quiz_prompt(request: &GenerationRequest) -> String {
    format!(
        "Create a multiple-choice quiz for the subject '{subject}' on the topic '{topic}'.\n\
         Difficulty: {difficulty}.\n\
         Number of questions: {count}.\n\
         \n\
         Return ONLY a raw JSON array (no markdown code blocks) where each object has:\n\
         - \"text\": The question string.\n\
         - \"options\": An array of 4 strings (assignments for A, B, C, D).\n\
         - \"correct_index\": Integer 0-3 indicating which option is correct.\n\
         - \"rationale\": A brief explanation of the answer.\n",
        subject = request.subject,
        topic = request.topic,
        difficulty = request.difficulty.as_str(),
        count = request.question_count,
    )
}

pub fn explanation_prompt(question_text: &str, correct_answer_text: &str) -> String {
    format!(
        "Explain why '{correct_answer_text}' is the correct answer to the question: \
         '{question_text}'.\n\
         Provide a concise, helpful explanation for a student.\n"
    )
}

/// Removes one enclosing code fence if the whole reply is fenced.
/// Anything else is returned trimmed and left for the JSON decoder to judge.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match CODE_FENCE.captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => trimmed,
    }
}

/// Decodes the generator's reply into validated questions.
///
/// The reply must be a JSON array of question objects, optionally wrapped in one
/// code fence. Prose around the JSON, missing keys, wrong field types, an empty
/// array, or a question that breaks the shape rules are all rejected.
pub fn parse_generated_questions(text: &str) -> Result<Vec<GeneratedQuestion>, GenerationError> {
    let body = strip_code_fence(text);

    let questions: Vec<GeneratedQuestion> = serde_json::from_str(body).map_err(|e| {
        tracing::warn!("Rejected generated content: {}", e);
        GenerationError::Malformed(format!("JSON decode error: {e}"))
    })?;

    if questions.is_empty() {
        return Err(GenerationError::Malformed("no questions returned".to_string()));
    }

    for (i, q) in questions.iter().enumerate() {
        q.validate()
            .map_err(|e| GenerationError::Malformed(format!("question {}: {}", i + 1, e)))?;
    }

    Ok(questions)
}
