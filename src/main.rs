// src/main.rs

use prep_cbt::config::Config;
use prep_cbt::generation::{GeminiGenerator, QuizGenerator};
use prep_cbt::routes;
use prep_cbt::state::AppState;
use prep_cbt::utils::hash::hash_password;
use dotenvy::dotenv;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Initialize Database Pool with Retry
    let mut retry_count = 0;
    let pool = loop {
        match SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    panic!("Failed to connect to database after 5 retries: {}", e);
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected...");

    tracing::info!("Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations applied successfully.");

    if let Err(e) = seed_teacher_user(&pool, &config).await {
        tracing::error!("Failed to seed teacher user: {:?}", e);
    }

    let generator = GeminiGenerator::from_config(&config)
        .expect("Failed to build the Gemini HTTP client");
    if config.google_api_key.is_none() {
        tracing::warn!("GOOGLE_API_KEY is not set; AI generation and explanations will fail with 502.");
    }
    let generator: Arc<dyn QuizGenerator> = Arc::new(generator);

    let state = AppState {
        pool: pool.clone(),
        config: config.clone(),
        generator,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listening address");
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}

async fn seed_teacher_user(
    pool: &SqlitePool,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    if let (Some(username), Some(password)) =
        (&config.seed_teacher_username, &config.seed_teacher_password)
    {
        let user_exists = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await?;

        if user_exists.is_none() {
            tracing::info!("Seeding teacher user: {}", username);
            let hashed_password = hash_password(password)?;

            sqlx::query(
                "INSERT INTO users (username, email, password, role, created_at) VALUES (?, '', ?, 'teacher', ?)",
            )
            .bind(username)
            .bind(hashed_password)
            .bind(chrono::Utc::now())
            .execute(pool)
            .await?;
            tracing::info!("Teacher user created successfully.");
        }
    }
    Ok(())
}
