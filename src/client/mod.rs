//! Portal REST API Client
//!
//! Typed access to the portal backend. Every authenticated call takes the
//! bearer token explicitly; the client itself holds no session state.
//!
//! # Endpoints
//!
//! - `GET /health`
//! - `POST /auth/register`, `POST /auth/login`, `GET /auth/me`
//! - `POST /mood`, `GET /mood`, `GET /mood/analytics`
//! - `GET /analytics/chart-data?range=N`
//! - `POST /chat`, `GET /chat/history`
//! - `GET /recommendations`
//! - `POST /bookings`, `POST /bookings/auto`, `GET /bookings`, `PATCH /bookings/:id`
//! - `POST /sessions`, `GET /sessions`
//! - `GET /therapist/patients`, `GET /therapist/patient/:id`
//! - `GET /export/csv`
//! - `DELETE /account`

mod error;
mod http;

pub use error::{ClientError, ClientResult};
pub use http::{ClientConfig, PortalClient};

use async_trait::async_trait;

use crate::models::{
    Booking, BookingFilter, BookingPatch, ChartPoint, ChatMessage, ChatReply, ChatRequest,
    DeleteAccountRequest, HealthStatus, LoginRequest, MoodAnalytics, MoodEntry, NewBooking,
    NewMoodEntry, NewSession, PatientDetail, PatientSummary, Recommendation, RegisterRequest,
    Session, SessionFilter, TokenResponse, User,
};

/// The portal API surface used by the controller
#[async_trait]
pub trait PortalApi: Send + Sync {
    async fn health(&self) -> ClientResult<HealthStatus>;

    async fn register(&self, request: &RegisterRequest) -> ClientResult<User>;

    async fn login(&self, request: &LoginRequest) -> ClientResult<TokenResponse>;

    async fn me(&self, token: &str) -> ClientResult<User>;

    async fn create_mood(&self, token: &str, entry: &NewMoodEntry) -> ClientResult<MoodEntry>;

    async fn list_moods(&self, token: &str) -> ClientResult<Vec<MoodEntry>>;

    async fn mood_analytics(&self, token: &str) -> ClientResult<MoodAnalytics>;

    async fn chart_data(&self, token: &str, range_days: u32) -> ClientResult<Vec<ChartPoint>>;

    async fn chat(&self, token: &str, request: &ChatRequest) -> ClientResult<ChatReply>;

    async fn chat_history(&self, token: &str) -> ClientResult<Vec<ChatMessage>>;

    async fn recommendations(&self, token: &str) -> ClientResult<Vec<Recommendation>>;

    async fn create_booking(&self, token: &str, booking: &NewBooking) -> ClientResult<Booking>;

    /// Ask the server to pick a therapist and time
    async fn auto_booking(&self, token: &str) -> ClientResult<Booking>;

    async fn list_bookings(&self, token: &str, filter: &BookingFilter) -> ClientResult<Vec<Booking>>;

    async fn update_booking(
        &self,
        token: &str,
        booking_id: i64,
        patch: &BookingPatch,
    ) -> ClientResult<Booking>;

    async fn create_session(&self, token: &str, session: &NewSession) -> ClientResult<Session>;

    async fn list_sessions(&self, token: &str, filter: &SessionFilter) -> ClientResult<Vec<Session>>;

    async fn therapist_patients(&self, token: &str) -> ClientResult<Vec<PatientSummary>>;

    async fn patient_detail(&self, token: &str, patient_id: i64) -> ClientResult<PatientDetail>;

    /// Raw CSV produced by the server
    async fn export_csv(&self, token: &str) -> ClientResult<Vec<u8>>;

    async fn delete_account(&self, token: &str, request: &DeleteAccountRequest) -> ClientResult<()>;
}
