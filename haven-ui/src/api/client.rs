//! HTTP API Client
//!
//! Functions for calling the portal REST API from the browser.
//! The bearer token and API base URL live in local storage.

use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::fmt;

use crate::models::{
    Booking, BookingPatch, BookingStatus, ChartPoint, ChatReply, HealthStatus, MoodAnalytics,
    MoodEntry, NewBooking, NewMoodEntry, NewSession, PatientDetail, PatientSummary,
    Recommendation, RecommendationPayload, Role, Session, TokenResponse, User,
};

/// Default API base URL
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000/api";

const TOKEN_KEY: &str = "mh_token";
const API_URL_KEY: &str = "mh_api_url";

fn storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// API base URL from local storage, or the default
pub fn get_api_base() -> String {
    let url = storage()
        .and_then(|s| s.get_item(API_URL_KEY).ok().flatten())
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    url.trim_end_matches('/').to_string()
}

pub fn set_api_base(url: &str) {
    if let Some(storage) = storage() {
        let _ = storage.set_item(API_URL_KEY, url);
    }
}

pub fn get_token() -> Option<String> {
    storage()
        .and_then(|s| s.get_item(TOKEN_KEY).ok().flatten())
        .filter(|t| !t.trim().is_empty())
}

pub fn set_token(token: &str) {
    if let Some(storage) = storage() {
        let _ = storage.set_item(TOKEN_KEY, token);
    }
}

pub fn clear_token() {
    if let Some(storage) = storage() {
        let _ = storage.remove_item(TOKEN_KEY);
    }
}

// ============ Errors ============

/// A failed call: HTTP status (0 for network failures) and a readable message
#[derive(Clone, Debug, PartialEq)]
pub struct ApiError {
    pub status: u16,
    pub detail: String,
}

impl ApiError {
    fn network(e: impl fmt::Display) -> Self {
        Self {
            status: 0,
            detail: format!("Network error: {}", e),
        }
    }

    fn parse(e: impl fmt::Display) -> Self {
        Self {
            status: 0,
            detail: format!("Parse error: {}", e),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.detail)
    }
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Pull a message out of an error body: `{detail}` string, field error list, or raw text
fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(s),
        }) => s,
        Ok(ErrorBody {
            detail: serde_json::Value::Array(items),
        }) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if msgs.is_empty() {
                body.trim().to_string()
            } else {
                msgs.join("; ")
            }
        }
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => format!("Request failed ({})", status),
    }
}

// ============ Plumbing ============

fn url(path: &str) -> String {
    format!("{}{}", get_api_base(), path)
}

fn authed(builder: RequestBuilder) -> RequestBuilder {
    match get_token() {
        Some(token) => builder.header("Authorization", &format!("Bearer {}", token)),
        None => builder,
    }
}

async fn check(response: Response) -> Result<Response, ApiError> {
    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = error_message(status, &body);
    web_sys::console::warn_1(&format!("API {} -> {}: {}", response.url(), status, detail).into());
    Err(ApiError { status, detail })
}

async fn send(builder: RequestBuilder) -> Result<Response, ApiError> {
    let response = builder.send().await.map_err(ApiError::network)?;
    check(response).await
}

async fn send_json<B: serde::Serialize>(
    builder: RequestBuilder,
    body: &B,
) -> Result<Response, ApiError> {
    let request = builder
        .json(body)
        .map_err(|e| ApiError::parse(format!("Request build error: {}", e)))?;
    let response = request.send().await.map_err(ApiError::network)?;
    check(response).await
}

async fn read<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response.json().await.map_err(ApiError::parse)
}

// ============ Auth ============

pub async fn check_health() -> Result<HealthStatus, ApiError> {
    read(send(Request::get(&url("/health"))).await?).await
}

pub async fn register(name: &str, email: &str, password: &str, role: Role) -> Result<User, ApiError> {
    #[derive(serde::Serialize)]
    struct RegisterRequest<'a> {
        name: &'a str,
        email: &'a str,
        password: &'a str,
        role: Role,
    }

    let body = RegisterRequest {
        name,
        email,
        password,
        role,
    };
    read(send_json(Request::post(&url("/auth/register")), &body).await?).await
}

/// Log in and store the token
pub async fn login(email: &str, password: &str) -> Result<String, ApiError> {
    #[derive(serde::Serialize)]
    struct LoginRequest<'a> {
        email: &'a str,
        password: &'a str,
    }

    let response = send_json(Request::post(&url("/auth/login")), &LoginRequest { email, password }).await?;
    let token: TokenResponse = read(response).await?;
    set_token(&token.access_token);
    Ok(token.access_token)
}

pub async fn me() -> Result<User, ApiError> {
    read(send(authed(Request::get(&url("/auth/me")))).await?).await
}

// ============ Mood ============

pub async fn create_mood(entry: &NewMoodEntry) -> Result<MoodEntry, ApiError> {
    read(send_json(authed(Request::post(&url("/mood"))), entry).await?).await
}

pub async fn list_moods() -> Result<Vec<MoodEntry>, ApiError> {
    read(send(authed(Request::get(&url("/mood")))).await?).await
}

pub async fn mood_analytics() -> Result<MoodAnalytics, ApiError> {
    read(send(authed(Request::get(&url("/mood/analytics")))).await?).await
}

pub async fn chart_data(range_days: u32) -> Result<Vec<ChartPoint>, ApiError> {
    let range = range_days.to_string();
    let builder = Request::get(&url("/analytics/chart-data")).query([("range", range.as_str())]);
    read(send(authed(builder)).await?).await
}

// ============ Support ============

pub async fn chat(message: &str) -> Result<ChatReply, ApiError> {
    #[derive(serde::Serialize)]
    struct ChatRequest<'a> {
        message: &'a str,
    }

    read(send_json(authed(Request::post(&url("/chat"))), &ChatRequest { message }).await?).await
}

pub async fn recommendations() -> Result<Vec<Recommendation>, ApiError> {
    let payload: RecommendationPayload =
        read(send(authed(Request::get(&url("/recommendations")))).await?).await?;
    Ok(payload.into_items())
}

// ============ Bookings and sessions ============

pub async fn create_booking(booking: &NewBooking) -> Result<Booking, ApiError> {
    read(send_json(authed(Request::post(&url("/bookings"))), booking).await?).await
}

pub async fn auto_booking() -> Result<Booking, ApiError> {
    read(send(authed(Request::post(&url("/bookings/auto")))).await?).await
}

pub async fn list_bookings(status: Option<BookingStatus>) -> Result<Vec<Booking>, ApiError> {
    let mut builder = Request::get(&url("/bookings"));
    if let Some(status) = status {
        builder = builder.query([("status", status.as_str())]);
    }
    read(send(authed(builder)).await?).await
}

pub async fn update_booking(id: i64, patch: &BookingPatch) -> Result<Booking, ApiError> {
    let builder = authed(Request::patch(&url(&format!("/bookings/{}", id))));
    read(send_json(builder, patch).await?).await
}

pub async fn create_session(session: &NewSession) -> Result<Session, ApiError> {
    read(send_json(authed(Request::post(&url("/sessions"))), session).await?).await
}

pub async fn list_sessions() -> Result<Vec<Session>, ApiError> {
    read(send(authed(Request::get(&url("/sessions")))).await?).await
}

pub async fn patients() -> Result<Vec<PatientSummary>, ApiError> {
    read(send(authed(Request::get(&url("/therapist/patients")))).await?).await
}

pub async fn patient_detail(id: i64) -> Result<PatientDetail, ApiError> {
    read(send(authed(Request::get(&url(&format!("/therapist/patient/{}", id))))).await?).await
}

// ============ Privacy ============

pub async fn export_csv() -> Result<String, ApiError> {
    let response = send(authed(Request::get(&url("/export/csv")))).await?;
    response.text().await.map_err(ApiError::parse)
}

pub async fn delete_account(password: &str) -> Result<(), ApiError> {
    #[derive(serde::Serialize)]
    struct DeleteRequest<'a> {
        password: &'a str,
    }

    send_json(authed(Request::delete(&url("/account"))), &DeleteRequest { password }).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_detail() {
        assert_eq!(error_message(400, r#"{"detail":"Email already registered"}"#), "Email already registered");
        assert_eq!(error_message(502, "Bad gateway"), "Bad gateway");
        assert_eq!(error_message(500, ""), "Request failed (500)");
    }

    #[test]
    fn test_field_errors_are_joined() {
        let msg = error_message(
            422,
            r#"{"detail":[{"loc":["body","mood_value"],"msg":"field required"},{"msg":"too long"}]}"#,
        );
        assert_eq!(msg, "field required; too long");
    }

    #[test]
    fn test_unauthorized() {
        let err = ApiError {
            status: 401,
            detail: "Invalid token".into(),
        };
        assert!(err.is_unauthorized());
        assert!(!ApiError::network("offline").is_unauthorized());
    }
}
