// src/config.rs

use std::env;
use dotenvy::dotenv;
use url::Url;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-001";

/// Quizzes per page on the teacher dashboard.
pub const DASHBOARD_PAGE_SIZE: i64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub bind_addr: String,
    pub google_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub seed_teacher_username: Option<String>,
    pub seed_teacher_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://prep_cbt.db?mode=rwc".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let gemini_base_url = gemini_base_url(non_empty_var("GEMINI_BASE_URL"))
            .expect("GEMINI_BASE_URL must be a valid URL");

        let gemini_model = env::var("GEMINI_MODEL")
            .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            bind_addr,
            google_api_key: non_empty_var("GOOGLE_API_KEY"),
            gemini_base_url,
            gemini_model,
            seed_teacher_username: non_empty_var("SEED_TEACHER_USERNAME"),
            seed_teacher_password: non_empty_var("SEED_TEACHER_PASSWORD"),
        }
    }

    /// Configuration for tests: in-memory database, no AI key.
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "test_secret_for_integration_tests".to_string(),
            jwt_expiration: 600,
            rust_log: "error".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            google_api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            seed_teacher_username: None,
            seed_teacher_password: None,
        }
    }
}

/// Falls back to the public endpoint only when the variable is unset.
fn gemini_base_url(raw: Option<String>) -> Result<String, url::ParseError> {
    match raw {
        Some(raw) => Url::parse(raw.trim()).map(|_| raw.trim().to_string()),
        None => Ok(DEFAULT_GEMINI_BASE_URL.to_string()),
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
