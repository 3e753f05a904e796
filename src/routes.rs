// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, student, teacher},
    state::AppState,
    utils::jwt::{auth_middleware, student_middleware, teacher_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, teacher, student).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (pool, config, quiz generator).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::LOCATION]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let teacher_routes = Router::new()
        .route(
            "/quizzes",
            get(teacher::dashboard).post(teacher::create_quiz),
        )
        .route("/quizzes/search", get(teacher::search_quizzes))
        .route(
            "/quizzes/{id}",
            get(teacher::get_quiz).delete(teacher::delete_quiz),
        )
        .route("/quizzes/{id}/questions", post(teacher::add_question))
        .route("/quizzes/{id}/generate", post(teacher::generate_questions))
        .route("/quizzes/{id}/results", get(teacher::quiz_results))
        .route("/questions/{id}", put(teacher::update_question))
        // Auth first, then the role check
        .layer(middleware::from_fn(teacher_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let student_routes = Router::new()
        .route("/quizzes", get(student::dashboard))
        .route("/quizzes/{id}", get(student::take_quiz))
        .route("/quizzes/{id}/submit", post(student::submit_form))
        .route("/quizzes/{id}/answers", post(student::submit_json))
        .route("/quizzes/{id}/review", get(student::review_quiz))
        .route("/results", get(student::my_results))
        .route("/results/{id}", get(student::view_result))
        .route("/questions/{id}/explanation", get(student::explain_question))
        .layer(middleware::from_fn(student_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/teacher", teacher_routes)
        .nest("/api/student", student_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::Config,
        generation::MockGenerator,
        models::user::Role,
        store::test_support,
        utils::jwt::sign_jwt,
    };

    async fn app() -> (Router, Config) {
        let config = Config::for_tests();
        let state = AppState {
            pool: test_support::pool().await,
            config: config.clone(),
            generator: Arc::new(MockGenerator::unavailable()),
        };
        (create_router(state), config)
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn missing_or_garbage_token_is_unauthorized() {
        let (app, _) = app().await;

        let response = app.clone().oneshot(get("/api/teacher/quizzes", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(get("/api/teacher/quizzes", Some("not-a-jwt")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn role_mismatch_is_forbidden() {
        let (app, config) = app().await;
        let token = sign_jwt(1, Role::Teacher, &config.jwt_secret, 60).unwrap();

        let response = app
            .oneshot(get("/api/student/results", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unknown_quiz_is_not_found() {
        let (app, config) = app().await;
        let token = sign_jwt(1, Role::Student, &config.jwt_secret, 60).unwrap();

        let response = app
            .oneshot(get("/api/student/quizzes/404", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn allowed_origin_gets_cors_headers() {
        let (app, _) = app().await;

        let request = Request::builder()
            .uri("/api/student/quizzes")
            .header(header::ORIGIN, "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
    }
}
