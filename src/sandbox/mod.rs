//! Portal Sandbox API
//!
//! An in-memory implementation of the portal REST contract, built with Axum.
//! It backs local development of the web client and the controller tests.
//! Risk comes from the mood slider bucket and the chat bot only acknowledges;
//! nothing here scores text.
//!
//! # Endpoints (under `/api`)
//!
//! ## Auth
//! - `POST /auth/register`, `POST /auth/login`, `GET /auth/me`
//!
//! ## Mood
//! - `POST /mood`, `GET /mood`, `GET /mood/analytics`
//! - `GET /analytics/chart-data?range=N`
//!
//! ## Support
//! - `POST /chat`, `GET /chat/history`, `GET /recommendations`
//!
//! ## Care
//! - `POST /bookings`, `POST /bookings/auto`, `GET /bookings`, `PATCH /bookings/:id`
//! - `POST /sessions`, `GET /sessions`
//! - `GET /therapist/patients`, `GET /therapist/patient/:id`
//!
//! ## Privacy
//! - `GET /export/csv`, `DELETE /account`
//!
//! ## Health
//! - `GET /health`

pub mod error;
pub mod routes;
pub mod state;

pub use error::{SandboxError, SandboxResult};
pub use state::SandboxState;

use axum::{
    http::HeaderValue,
    routing::{get, patch, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SandboxConfig;

fn cors_layer(config: &SandboxConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the sandbox router with all routes and middleware
pub fn build_router(state: SandboxState) -> Router {
    let cors = cors_layer(&state.config);

    let api_routes = Router::new()
        .route("/health", get(routes::account::health))
        // Auth
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/me", get(routes::auth::me))
        // Mood
        .route(
            "/mood",
            post(routes::mood::create_mood).get(routes::mood::list_moods),
        )
        .route("/mood/analytics", get(routes::mood::mood_analytics))
        .route("/analytics/chart-data", get(routes::mood::chart_data))
        // Chat and suggestions
        .route("/chat", post(routes::chat::post_chat))
        .route("/chat/history", get(routes::chat::chat_history))
        .route("/recommendations", get(routes::chat::recommendations))
        // Bookings and sessions
        .route(
            "/bookings",
            post(routes::bookings::create_booking).get(routes::bookings::list_bookings),
        )
        .route("/bookings/auto", post(routes::bookings::auto_booking))
        .route("/bookings/:id", patch(routes::bookings::update_booking))
        .route(
            "/sessions",
            post(routes::bookings::create_session).get(routes::bookings::list_sessions),
        )
        // Therapist dashboard
        .route("/therapist/patients", get(routes::therapist::list_patients))
        .route("/therapist/patient/:id", get(routes::therapist::patient_detail))
        // Privacy
        .route("/export/csv", get(routes::account::export_csv))
        .route("/account", axum::routing::delete(routes::account::delete_account));

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Bind `addr` and serve in a background task, returning the bound address.
///
/// Binding port 0 picks a free port.
pub async fn spawn(state: SandboxState, addr: &str) -> SandboxResult<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    let router = build_router(state);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("Sandbox server stopped: {}", e);
        }
    });

    tracing::debug!("Sandbox listening on {}", local);
    Ok(local)
}

/// Start the sandbox and run until Ctrl+C or SIGTERM
pub async fn serve(config: SandboxConfig) -> SandboxResult<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let router = build_router(SandboxState::new(config));

    tracing::info!("Portal sandbox listening on http://{}/api", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| SandboxError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Portal sandbox shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn app() -> Router {
        build_router(SandboxState::new(SandboxConfig::default()))
    }

    fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn sign_up(app: &Router, email: &str, role: &str) -> String {
        let (status, _) = send(
            app,
            request(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({"name": "Test User", "email": email, "password": "secret1", "role": role})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            app,
            request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({"email": email, "password": "secret1"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["access_token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app();
        let (status, body) = send(&app, request(Method::GET, "/api/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_me_requires_token() {
        let app = app();
        let (status, body) = send(&app, request(Method::GET, "/api/auth/me", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Missing authorization header");

        let (status, body) =
            send(&app, request(Method::GET, "/api/auth/me", Some("bogus"), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Invalid token");
    }

    #[tokio::test]
    async fn test_mood_risk_follows_slider() {
        let app = app();
        let token = sign_up(&app, "pat@example.com", "patient").await;

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/mood",
                Some(&token),
                Some(json!({"text": "awful", "mood_value": 2})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["risk"], "HIGH");

        let (status, _) = send(
            &app,
            request(
                Method::POST,
                "/api/mood",
                Some(&token),
                Some(json!({"text": "x", "mood_value": 11})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, body) = send(&app, request(Method::GET, "/api/mood/analytics", Some(&token), None)).await;
        assert_eq!(body["avg_7_days"], 2.0);

        let (_, body) = send(
            &app,
            request(Method::GET, "/api/analytics/chart-data?range=3", Some(&token), None),
        )
        .await;
        let points = body.as_array().unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[2]["high"], 1);
    }

    #[tokio::test]
    async fn test_role_guards() {
        let app = app();
        let patient = sign_up(&app, "pat@example.com", "patient").await;

        let (status, body) = send(
            &app,
            request(Method::GET, "/api/therapist/patients", Some(&patient), None),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["detail"], "Forbidden");

        // No therapist registered yet
        let (status, _) = send(
            &app,
            request(Method::POST, "/api/bookings/auto", Some(&patient), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let therapist = sign_up(&app, "doc@example.com", "therapist").await;
        let (status, body) = send(
            &app,
            request(Method::POST, "/api/bookings/auto", Some(&patient), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "scheduled");

        let (_, body) = send(
            &app,
            request(Method::GET, "/api/bookings?status=scheduled", Some(&therapist), None),
        )
        .await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_account_checks_password() {
        let app = app();
        let token = sign_up(&app, "pat@example.com", "patient").await;

        let (status, body) = send(
            &app,
            request(Method::DELETE, "/api/account", Some(&token), Some(json!({"password": "nope"}))),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Invalid password");

        let (status, _) = send(
            &app,
            request(Method::DELETE, "/api/account", Some(&token), Some(json!({"password": "secret1"}))),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, request(Method::GET, "/api/auth/me", Some(&token), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
