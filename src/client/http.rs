//! reqwest implementation of [`PortalApi`]

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::{ClientError, ClientResult, PortalApi};
use crate::models::{
    Booking, BookingFilter, BookingPatch, ChartPoint, ChatMessage, ChatReply, ChatRequest,
    DeleteAccountRequest, HealthStatus, LoginRequest, MoodAnalytics, MoodEntry,
    NewBooking, NewMoodEntry, NewSession, PatientDetail, PatientSummary, Recommendation,
    RecommendationPayload, RegisterRequest, Session, SessionFilter, TokenResponse, User,
};

/// Configuration for the portal client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL including the `/api` prefix (e.g. "http://127.0.0.1:8000/api")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
            request_timeout_ms: 30_000,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

impl From<&crate::config::ApiConfig> for ClientConfig {
    fn from(config: &crate::config::ApiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            request_timeout_ms: config.request_timeout_secs * 1000,
        }
    }
}

/// HTTP client for the portal REST API
#[derive(Clone)]
pub struct PortalClient {
    client: Client,
    base_url: String,
}

impl PortalClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder.bearer_auth(token)
    }

    async fn send(&self, builder: RequestBuilder) -> ClientResult<Response> {
        let response = builder.send().await.map_err(ClientError::from_transport)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let detail = error_detail(status, &text);

        tracing::warn!(status = status.as_u16(), detail = %detail, "Portal API request failed");

        if status == StatusCode::UNAUTHORIZED {
            Err(ClientError::Unauthorized(detail))
        } else {
            Err(ClientError::Api {
                status: status.as_u16(),
                detail,
            })
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let response = self.send(builder).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// Error body as sent by the API; `detail` is a string or a list of field errors
#[derive(Deserialize)]
struct ErrorBody {
    detail: Value,
}

/// Message to show for a failed response body
fn error_detail(status: StatusCode, text: &str) -> String {
    match serde_json::from_str::<ErrorBody>(text) {
        Ok(body) => detail_text(&body.detail),
        Err(_) if !text.trim().is_empty() => text.trim().to_string(),
        Err(_) => status.canonical_reason().unwrap_or("Unknown error").to_string(),
    }
}

fn detail_text(detail: &Value) -> String {
    match detail {
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if msgs.is_empty() {
                detail.to_string()
            } else {
                msgs.join("; ")
            }
        }
        other => other.to_string(),
    }
}

fn query_string(pairs: &[(&str, Option<String>)]) -> String {
    let parts: Vec<String> = pairs
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_ref()
                .map(|v| format!("{}={}", key, urlencoding::encode(v)))
        })
        .collect();

    if parts.is_empty() {
        String::new()
    } else {
        format!("?{}", parts.join("&"))
    }
}

fn booking_query(filter: &BookingFilter) -> String {
    query_string(&[
        ("patient_id", filter.patient_id.map(|id| id.to_string())),
        ("therapist_id", filter.therapist_id.map(|id| id.to_string())),
        ("status", filter.status.map(|s| s.to_string())),
    ])
}

fn session_query(filter: &SessionFilter) -> String {
    query_string(&[
        ("patient_id", filter.patient_id.map(|id| id.to_string())),
        ("therapist_id", filter.therapist_id.map(|id| id.to_string())),
    ])
}

#[async_trait]
impl PortalApi for PortalClient {
    async fn health(&self) -> ClientResult<HealthStatus> {
        self.send_json(self.client.get(self.url("/health"))).await
    }

    async fn register(&self, request: &RegisterRequest) -> ClientResult<User> {
        self.send_json(self.client.post(self.url("/auth/register")).json(request))
            .await
    }

    async fn login(&self, request: &LoginRequest) -> ClientResult<TokenResponse> {
        self.send_json(self.client.post(self.url("/auth/login")).json(request))
            .await
    }

    async fn me(&self, token: &str) -> ClientResult<User> {
        self.send_json(self.authed(self.client.get(self.url("/auth/me")), token))
            .await
    }

    async fn create_mood(&self, token: &str, entry: &NewMoodEntry) -> ClientResult<MoodEntry> {
        let builder = self.authed(self.client.post(self.url("/mood")), token).json(entry);
        self.send_json(builder).await
    }

    async fn list_moods(&self, token: &str) -> ClientResult<Vec<MoodEntry>> {
        self.send_json(self.authed(self.client.get(self.url("/mood")), token))
            .await
    }

    async fn mood_analytics(&self, token: &str) -> ClientResult<MoodAnalytics> {
        self.send_json(self.authed(self.client.get(self.url("/mood/analytics")), token))
            .await
    }

    async fn chart_data(&self, token: &str, range_days: u32) -> ClientResult<Vec<ChartPoint>> {
        let url = self.url(&format!("/analytics/chart-data?range={}", range_days));
        self.send_json(self.authed(self.client.get(url), token)).await
    }

    async fn chat(&self, token: &str, request: &ChatRequest) -> ClientResult<ChatReply> {
        let builder = self.authed(self.client.post(self.url("/chat")), token).json(request);
        self.send_json(builder).await
    }

    async fn chat_history(&self, token: &str) -> ClientResult<Vec<ChatMessage>> {
        self.send_json(self.authed(self.client.get(self.url("/chat/history")), token))
            .await
    }

    async fn recommendations(&self, token: &str) -> ClientResult<Vec<Recommendation>> {
        let payload: RecommendationPayload = self
            .send_json(self.authed(self.client.get(self.url("/recommendations")), token))
            .await?;
        Ok(payload.into_items())
    }

    async fn create_booking(&self, token: &str, booking: &NewBooking) -> ClientResult<Booking> {
        let builder = self
            .authed(self.client.post(self.url("/bookings")), token)
            .json(booking);
        self.send_json(builder).await
    }

    async fn auto_booking(&self, token: &str) -> ClientResult<Booking> {
        self.send_json(self.authed(self.client.post(self.url("/bookings/auto")), token))
            .await
    }

    async fn list_bookings(&self, token: &str, filter: &BookingFilter) -> ClientResult<Vec<Booking>> {
        let url = self.url(&format!("/bookings{}", booking_query(filter)));
        self.send_json(self.authed(self.client.get(url), token)).await
    }

    async fn update_booking(
        &self,
        token: &str,
        booking_id: i64,
        patch: &BookingPatch,
    ) -> ClientResult<Booking> {
        let url = self.url(&format!("/bookings/{}", booking_id));
        self.send_json(self.authed(self.client.patch(url), token).json(patch))
            .await
    }

    async fn create_session(&self, token: &str, session: &NewSession) -> ClientResult<Session> {
        let builder = self
            .authed(self.client.post(self.url("/sessions")), token)
            .json(session);
        self.send_json(builder).await
    }

    async fn list_sessions(&self, token: &str, filter: &SessionFilter) -> ClientResult<Vec<Session>> {
        let url = self.url(&format!("/sessions{}", session_query(filter)));
        self.send_json(self.authed(self.client.get(url), token)).await
    }

    async fn therapist_patients(&self, token: &str) -> ClientResult<Vec<PatientSummary>> {
        self.send_json(self.authed(self.client.get(self.url("/therapist/patients")), token))
            .await
    }

    async fn patient_detail(&self, token: &str, patient_id: i64) -> ClientResult<PatientDetail> {
        let url = self.url(&format!("/therapist/patient/{}", patient_id));
        self.send_json(self.authed(self.client.get(url), token)).await
    }

    async fn export_csv(&self, token: &str) -> ClientResult<Vec<u8>> {
        let response = self
            .send(self.authed(self.client.get(self.url("/export/csv")), token))
            .await?;
        let bytes = response.bytes().await.map_err(ClientError::from_transport)?;
        Ok(bytes.to_vec())
    }

    async fn delete_account(&self, token: &str, request: &DeleteAccountRequest) -> ClientResult<()> {
        let builder = self
            .authed(self.client.delete(self.url("/account")), token)
            .json(request);
        self.send(builder).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingStatus;

    #[test]
    fn test_base_url_is_normalised() {
        let client = PortalClient::new(ClientConfig::new("http://localhost:8000/api/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(client.url("/mood"), "http://localhost:8000/api/mood");
    }

    #[test]
    fn test_filters_build_query_strings() {
        assert_eq!(booking_query(&BookingFilter::default()), "");

        let filter = BookingFilter {
            patient_id: Some(3),
            therapist_id: None,
            status: Some(BookingStatus::Scheduled),
        };
        assert_eq!(booking_query(&filter), "?patient_id=3&status=scheduled");

        let filter = SessionFilter {
            patient_id: None,
            therapist_id: Some(8),
        };
        assert_eq!(session_query(&filter), "?therapist_id=8");
    }

    #[test]
    fn test_error_detail_shapes() {
        let status = StatusCode::UNPROCESSABLE_ENTITY;
        assert_eq!(error_detail(status, r#"{"detail":"Invalid date"}"#), "Invalid date");
        assert_eq!(
            error_detail(
                status,
                r#"{"detail":[{"loc":["body","mood_value"],"msg":"field required"},{"loc":["body","text"],"msg":"str type expected"}]}"#
            ),
            "field required; str type expected"
        );
        assert_eq!(error_detail(StatusCode::BAD_GATEWAY, " Bad gateway\n"), "Bad gateway");
        assert_eq!(error_detail(StatusCode::NOT_FOUND, ""), "Not Found");
    }

    #[tokio::test]
    async fn test_validation_errors_become_readable_messages() {
        use axum::{http::StatusCode as AxumStatus, routing::post, Json, Router};

        let router = Router::new().route(
            "/api/mood",
            post(|| async {
                (
                    AxumStatus::UNPROCESSABLE_ENTITY,
                    Json(serde_json::json!({
                        "detail": [{
                            "loc": ["body", "mood_value"],
                            "msg": "field required",
                            "type": "value_error.missing"
                        }]
                    })),
                )
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = PortalClient::new(ClientConfig::new(format!("http://{}/api", addr))).unwrap();
        let entry = NewMoodEntry {
            text: "tired".to_string(),
            mood_value: None,
            date: None,
        };
        let err = client.create_mood("token", &entry).await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 422, .. }));
        assert_eq!(err.user_message(), "field required");
    }

    #[test]
    fn test_query_values_are_encoded() {
        let q = query_string(&[("q", Some("a b&c".to_string()))]);
        assert_eq!(q, "?q=a%20b%26c");
    }
}
