//! Portal Controller
//!
//! The top-level container of the portal without any rendering: it owns the
//! token, the signed-in user, which view and dialogs are showing, the mood
//! draft and the chat transcript. Every failure becomes a [`Notice`] instead
//! of an error so a front end only has to display them.

use chrono::{NaiveDate, Utc};
use std::path::{Path, PathBuf};

use crate::client::{ClientError, PortalApi};
use crate::export::{export_filename, mood_entries_to_csv, save_export};
use crate::models::{
    Booking, BookingFilter, BookingPatch, ChartPoint, ChatReply, ChatRequest, ChatSender,
    DeleteAccountRequest, HealthStatus, MoodAnalytics, MoodEntry, PatientDetail, PatientSummary,
    Recommendation, RiskLevel, Role, Session, SessionFilter, User,
};
use crate::token::TokenStore;
use crate::validation::{
    BookingForm, LoginForm, MoodForm, RegisterForm, SessionForm, ValidationError,
};

pub const MSG_LOGIN_REQUIRED: &str = "Please log in first";
pub const MSG_SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";
pub const MSG_AUTO_LOGIN_FAILED: &str =
    "Registered but failed to log in automatically. Try logging in.";
pub const MSG_CHAT_UNAVAILABLE: &str =
    "Sorry, I'm having trouble responding right now. Please try again.";
pub const MSG_CHAT_OFFLINE: &str = "Network error. Please check your connection.";
pub const MSG_NO_EXPORT_DATA: &str = "No data to export";

/// 401 detail for a wrong confirmation password; the session stays valid
const DETAIL_WRONG_PASSWORD: &str = "Invalid password";

/// Which top-level page is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Landing,
    Patient,
    Therapist,
}

impl View {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Patient => View::Patient,
            Role::Therapist => View::Therapist,
        }
    }
}

/// Tab of the authentication dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

/// What the portal opens after a mood entry is saved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    None,
    OpenChat,
    OpenBooking,
}

impl FollowUp {
    pub fn for_risk(risk: Option<RiskLevel>) -> Self {
        match risk {
            Some(RiskLevel::Medium) => FollowUp::OpenChat,
            Some(RiskLevel::High) => FollowUp::OpenBooking,
            _ => FollowUp::None,
        }
    }
}

/// Result of a saved mood entry
#[derive(Debug, Clone)]
pub struct MoodOutcome {
    pub entry: MoodEntry,
    pub follow_up: FollowUp,
}

/// One line of the chat transcript
#[derive(Debug, Clone, PartialEq)]
pub struct ChatLine {
    pub sender: ChatSender,
    pub text: String,
}

/// UI-agnostic portal state machine
pub struct Portal<A: PortalApi, T: TokenStore> {
    api: A,
    tokens: T,
    status: Option<HealthStatus>,
    user: Option<User>,
    view: View,
    auth_open: bool,
    auth_mode: AuthMode,
    chat_open: bool,
    booking_open: bool,
    mood_draft: String,
    transcript: Vec<ChatLine>,
    patients: Vec<PatientSummary>,
    selected_patient: Option<PatientDetail>,
    bookings: Vec<Booking>,
    sessions: Vec<Session>,
    notices: Vec<Notice>,
}

impl<A: PortalApi, T: TokenStore> Portal<A, T> {
    pub fn new(api: A, tokens: T) -> Self {
        Self {
            api,
            tokens,
            status: None,
            user: None,
            view: View::Landing,
            auth_open: false,
            auth_mode: AuthMode::Login,
            chat_open: false,
            booking_open: false,
            mood_draft: String::new(),
            transcript: Vec::new(),
            patients: Vec::new(),
            selected_patient: None,
            bookings: Vec::new(),
            sessions: Vec::new(),
            notices: Vec::new(),
        }
    }

    // ============================================
    // ACCESSORS
    // ============================================

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn server_status(&self) -> Option<&HealthStatus> {
        self.status.as_ref()
    }

    pub fn auth_open(&self) -> bool {
        self.auth_open
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.auth_mode
    }

    pub fn chat_open(&self) -> bool {
        self.chat_open
    }

    pub fn booking_open(&self) -> bool {
        self.booking_open
    }

    pub fn mood_draft(&self) -> &str {
        &self.mood_draft
    }

    pub fn set_mood_draft(&mut self, text: impl Into<String>) {
        self.mood_draft = text.into();
    }

    pub fn transcript(&self) -> &[ChatLine] {
        &self.transcript
    }

    pub fn patients(&self) -> &[PatientSummary] {
        &self.patients
    }

    pub fn selected_patient(&self) -> Option<&PatientDetail> {
        self.selected_patient.as_ref()
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Hand pending notices to the caller
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Whether a token is currently stored
    pub fn has_token(&self) -> bool {
        matches!(self.tokens.load(), Ok(Some(_)))
    }

    // ============================================
    // DIALOGS
    // ============================================

    pub fn open_auth(&mut self, mode: AuthMode) {
        self.auth_mode = mode;
        self.auth_open = true;
    }

    pub fn close_auth(&mut self) {
        self.auth_open = false;
    }

    pub fn open_chat(&mut self) {
        self.chat_open = true;
    }

    pub fn close_chat(&mut self) {
        self.chat_open = false;
    }

    pub fn open_booking(&mut self) {
        self.booking_open = true;
    }

    pub fn close_booking(&mut self) {
        self.booking_open = false;
    }

    /// The chat did not help: swap it for the booking dialog
    pub fn not_satisfied(&mut self) {
        self.chat_open = false;
        self.booking_open = true;
    }

    // ============================================
    // INTERNALS
    // ============================================

    fn notify(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => tracing::warn!(message = %notice.message, "Portal notice"),
            _ => tracing::debug!(message = %notice.message, "Portal notice"),
        }
        self.notices.push(notice);
    }

    fn invalid(&mut self, err: ValidationError) {
        self.notify(Notice::error(err.to_string()));
    }

    /// Current token, or a login notice when signed out
    fn require_token(&mut self) -> Option<String> {
        match self.tokens.load() {
            Ok(Some(token)) => Some(token),
            Ok(None) => {
                self.notify(Notice::error(MSG_LOGIN_REQUIRED));
                None
            }
            Err(e) => {
                tracing::error!("Token store unreadable: {}", e);
                self.notify(Notice::error(MSG_LOGIN_REQUIRED));
                None
            }
        }
    }

    fn forget_session(&mut self) {
        if let Err(e) = self.tokens.clear() {
            tracing::error!("Failed to clear token: {}", e);
        }
        self.user = None;
        self.view = View::Landing;
        self.chat_open = false;
        self.booking_open = false;
        self.transcript.clear();
        self.patients.clear();
        self.selected_patient = None;
        self.bookings.clear();
        self.sessions.clear();
    }

    /// Report an API failure; auth failures also end the session
    fn fail(&mut self, action: &str, err: ClientError) {
        tracing::warn!(action, error = %err, "Portal request failed");
        if err.is_auth_failure() {
            self.forget_session();
            self.notify(Notice::error(MSG_SESSION_EXPIRED));
        } else {
            self.notify(Notice::error(err.user_message()));
        }
    }

    async fn sign_in_with(&mut self, access_token: String) -> bool {
        if let Err(e) = self.tokens.save(&access_token) {
            tracing::error!("Failed to store token: {}", e);
        }

        match self.api.me(&access_token).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, role = %user.role, "Signed in");
                self.view = View::for_role(user.role);
                self.user = Some(user);
                self.auth_open = false;
                true
            }
            Err(e) => {
                self.fail("me", e);
                false
            }
        }
    }

    // ============================================
    // SESSION
    // ============================================

    /// Probe the server, then resume a stored session if it is still valid
    pub async fn restore(&mut self) -> View {
        match self.api.health().await {
            Ok(status) => self.status = Some(status),
            Err(e) => tracing::debug!("Health probe failed: {}", e),
        }

        let token = match self.tokens.load() {
            Ok(Some(token)) => token,
            Ok(None) => {
                self.user = None;
                self.view = View::Landing;
                return self.view;
            }
            Err(e) => {
                tracing::warn!("Token store unreadable: {}", e);
                self.forget_session();
                return self.view;
            }
        };

        match self.api.me(&token).await {
            Ok(user) => {
                self.view = View::for_role(user.role);
                self.user = Some(user);
            }
            Err(e) => {
                tracing::info!("Stored token rejected: {}", e);
                self.forget_session();
            }
        }
        self.view
    }

    pub async fn login(&mut self, form: LoginForm) -> bool {
        let request = match form.validate() {
            Ok(request) => request,
            Err(e) => {
                self.invalid(e);
                return false;
            }
        };

        match self.api.login(&request).await {
            Ok(token) => self.sign_in_with(token.access_token).await,
            Err(e) => {
                tracing::warn!(error = %e, "Login failed");
                self.notify(Notice::error(e.user_message()));
                false
            }
        }
    }

    /// Create the account and sign straight in
    pub async fn register(&mut self, form: RegisterForm) -> bool {
        let request = match form.validate() {
            Ok(request) => request,
            Err(e) => {
                self.invalid(e);
                return false;
            }
        };

        if let Err(e) = self.api.register(&request).await {
            tracing::warn!(error = %e, "Registration failed");
            self.notify(Notice::error(e.user_message()));
            return false;
        }

        let login = match form.login_form().validate() {
            Ok(login) => login,
            Err(e) => {
                self.invalid(e);
                return false;
            }
        };

        match self.api.login(&login).await {
            Ok(token) => self.sign_in_with(token.access_token).await,
            Err(e) => {
                tracing::warn!(error = %e, "Automatic login after registration failed");
                self.auth_mode = AuthMode::Login;
                self.notify(Notice::info(MSG_AUTO_LOGIN_FAILED));
                false
            }
        }
    }

    pub fn logout(&mut self) {
        self.forget_session();
        self.auth_open = false;
        tracing::info!("Signed out");
    }

    // ============================================
    // PATIENT
    // ============================================

    /// Save the mood draft, then open chat or booking based on the risk
    pub async fn submit_mood(&mut self, mood_value: Option<u8>) -> Option<MoodOutcome> {
        let token = self.require_token()?;

        let mut form = MoodForm::new(self.mood_draft.clone());
        form.mood_value = mood_value;
        let entry = match form.validate() {
            Ok(entry) => entry,
            Err(e) => {
                self.invalid(e);
                return None;
            }
        };

        match self.api.create_mood(&token, &entry).await {
            Ok(saved) => {
                let follow_up = FollowUp::for_risk(saved.risk);
                match follow_up {
                    FollowUp::OpenChat => self.chat_open = true,
                    FollowUp::OpenBooking => self.booking_open = true,
                    FollowUp::None => {}
                }
                self.mood_draft.clear();
                self.notify(Notice::success("Mood entry recorded successfully!"));
                Some(MoodOutcome {
                    entry: saved,
                    follow_up,
                })
            }
            Err(e) => {
                self.fail("create_mood", e);
                None
            }
        }
    }

    pub async fn load_history(&mut self) -> Option<Vec<MoodEntry>> {
        let token = self.require_token()?;
        match self.api.list_moods(&token).await {
            Ok(moods) => Some(moods),
            Err(e) => {
                self.fail("list_moods", e);
                None
            }
        }
    }

    /// Averages plus the per-day chart for `range_days`
    pub async fn load_analytics(&mut self, range_days: u32) -> Option<(MoodAnalytics, Vec<ChartPoint>)> {
        let token = self.require_token()?;

        let summary = match self.api.mood_analytics(&token).await {
            Ok(summary) => summary,
            Err(e) => {
                self.fail("mood_analytics", e);
                return None;
            }
        };

        match self.api.chart_data(&token, range_days).await {
            Ok(points) => Some((summary, points)),
            Err(e) => {
                self.fail("chart_data", e);
                None
            }
        }
    }

    pub async fn load_recommendations(&mut self) -> Option<Vec<Recommendation>> {
        let token = self.require_token()?;
        match self.api.recommendations(&token).await {
            Ok(items) => Some(items),
            Err(e) => {
                self.fail("recommendations", e);
                None
            }
        }
    }

    /// Client-side CSV of the mood history
    pub async fn history_csv(&mut self) -> Option<String> {
        let moods = self.load_history().await?;
        match mood_entries_to_csv(&moods) {
            Ok(csv) if csv.is_empty() => {
                self.notify(Notice::info(MSG_NO_EXPORT_DATA));
                None
            }
            Ok(csv) => Some(csv),
            Err(e) => {
                self.notify(Notice::error(e.to_string()));
                None
            }
        }
    }

    /// Send a chat message; the transcript gets both sides
    pub async fn send_chat(&mut self, text: &str) -> Option<ChatReply> {
        let message = text.trim();
        if message.is_empty() {
            self.invalid(ValidationError::EmptyMessage);
            return None;
        }
        let token = self.require_token()?;

        self.transcript.push(ChatLine {
            sender: ChatSender::User,
            text: message.to_string(),
        });

        let request = ChatRequest {
            message: message.to_string(),
            context: None,
        };
        match self.api.chat(&token, &request).await {
            Ok(reply) => {
                self.transcript.push(ChatLine {
                    sender: ChatSender::Bot,
                    text: reply.reply.clone(),
                });
                if reply.escalate {
                    self.booking_open = true;
                }
                Some(reply)
            }
            Err(e) => {
                let apology = match &e {
                    ClientError::Unavailable(_) | ClientError::Timeout | ClientError::Request(_) => {
                        MSG_CHAT_OFFLINE
                    }
                    _ => MSG_CHAT_UNAVAILABLE,
                };
                self.transcript.push(ChatLine {
                    sender: ChatSender::Bot,
                    text: apology.to_string(),
                });
                if e.is_auth_failure() {
                    self.fail("chat", e);
                } else {
                    tracing::warn!(error = %e, "Chat request failed");
                }
                None
            }
        }
    }

    /// Patient booking request, falling back to automatic assignment
    pub async fn request_booking(&mut self, form: BookingForm) -> Option<Booking> {
        let token = self.require_token()?;
        let request = match form.validate() {
            Ok(request) => request,
            Err(e) => {
                self.invalid(e);
                return None;
            }
        };

        let booked = match self.api.create_booking(&token, &request).await {
            Ok(booking) => Ok(booking),
            Err(e) if e.is_auth_failure() => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "Booking request rejected, falling back to automatic booking");
                self.api.auto_booking(&token).await
            }
        };

        match booked {
            Ok(booking) => {
                self.booking_open = false;
                self.notify(Notice::success(format!(
                    "Session booked for {}",
                    booking.datetime.format("%Y-%m-%d %H:%M")
                )));
                Some(booking)
            }
            Err(e) => {
                self.fail("request_booking", e);
                None
            }
        }
    }

    // ============================================
    // THERAPIST
    // ============================================

    pub async fn load_patients(&mut self) -> Option<&[PatientSummary]> {
        let token = self.require_token()?;
        match self.api.therapist_patients(&token).await {
            Ok(patients) => {
                self.patients = patients;
                Some(&self.patients)
            }
            Err(e) => {
                self.fail("therapist_patients", e);
                None
            }
        }
    }

    pub async fn open_patient(&mut self, patient_id: i64) -> Option<&PatientDetail> {
        let token = self.require_token()?;
        match self.api.patient_detail(&token, patient_id).await {
            Ok(detail) => {
                self.selected_patient = Some(detail);
                self.selected_patient.as_ref()
            }
            Err(e) => {
                self.fail("patient_detail", e);
                None
            }
        }
    }

    pub fn close_patient(&mut self) {
        self.selected_patient = None;
    }

    /// Therapist books a session for a patient
    pub async fn create_booking(&mut self, form: BookingForm) -> Option<Booking> {
        let token = self.require_token()?;
        let mut request = match form.validate_for_therapist() {
            Ok(request) => request,
            Err(e) => {
                self.invalid(e);
                return None;
            }
        };
        if request.therapist_id.is_none() {
            request.therapist_id = self.user.as_ref().map(|u| u.id);
        }

        match self.api.create_booking(&token, &request).await {
            Ok(booking) => {
                if let Some(detail) = self.selected_patient.as_mut() {
                    if detail.id == booking.patient_id {
                        detail.bookings.push(booking.clone());
                    }
                }
                self.bookings.push(booking.clone());
                self.notify(Notice::success("Booking created"));
                Some(booking)
            }
            Err(e) => {
                self.fail("create_booking", e);
                None
            }
        }
    }

    pub async fn record_session(&mut self, mut form: SessionForm) -> Option<Session> {
        let token = self.require_token()?;
        if form.therapist_id.is_none() {
            form.therapist_id = self.user.as_ref().map(|u| u.id);
        }
        let request = match form.validate() {
            Ok(request) => request,
            Err(e) => {
                self.invalid(e);
                return None;
            }
        };

        match self.api.create_session(&token, &request).await {
            Ok(session) => {
                if let Some(detail) = self.selected_patient.as_mut() {
                    if detail.id == session.patient_id {
                        detail.sessions.push(session.clone());
                    }
                }
                self.sessions.push(session.clone());
                self.notify(Notice::success("Session recorded"));
                Some(session)
            }
            Err(e) => {
                self.fail("create_session", e);
                None
            }
        }
    }

    pub async fn list_bookings(&mut self, filter: BookingFilter) -> Option<&[Booking]> {
        let token = self.require_token()?;
        match self.api.list_bookings(&token, &filter).await {
            Ok(bookings) => {
                self.bookings = bookings;
                Some(&self.bookings)
            }
            Err(e) => {
                self.fail("list_bookings", e);
                None
            }
        }
    }

    pub async fn list_sessions(&mut self, filter: SessionFilter) -> Option<&[Session]> {
        let token = self.require_token()?;
        match self.api.list_sessions(&token, &filter).await {
            Ok(sessions) => {
                self.sessions = sessions;
                Some(&self.sessions)
            }
            Err(e) => {
                self.fail("list_sessions", e);
                None
            }
        }
    }

    pub async fn update_booking(&mut self, booking_id: i64, patch: BookingPatch) -> Option<Booking> {
        let token = self.require_token()?;
        match self.api.update_booking(&token, booking_id, &patch).await {
            Ok(updated) => {
                if let Some(existing) = self.bookings.iter_mut().find(|b| b.id == updated.id) {
                    *existing = updated.clone();
                }
                self.notify(Notice::success("Booking updated"));
                Some(updated)
            }
            Err(e) => {
                self.fail("update_booking", e);
                None
            }
        }
    }

    // ============================================
    // PRIVACY
    // ============================================

    /// Download the server export into `dir` under today's file name
    pub async fn export_csv(&mut self, dir: &Path) -> Option<PathBuf> {
        let token = self.require_token()?;
        let bytes = match self.api.export_csv(&token).await {
            Ok(bytes) => bytes,
            Err(e) => {
                self.fail("export_csv", e);
                return None;
            }
        };

        let today: NaiveDate = Utc::now().date_naive();
        let path = dir.join(export_filename(today));
        match save_export(&path, &bytes) {
            Ok(()) => {
                self.notify(Notice::success(format!("Export saved to {}", path.display())));
                Some(path)
            }
            Err(e) => {
                self.notify(Notice::error(format!("Export failed: {}", e)));
                None
            }
        }
    }

    /// Delete the account after confirming the password
    pub async fn delete_account(&mut self, password: &str) -> bool {
        if password.is_empty() {
            self.invalid(ValidationError::MissingConfirmation);
            return false;
        }
        let Some(token) = self.require_token() else {
            return false;
        };

        let request = DeleteAccountRequest {
            password: password.to_string(),
        };
        match self.api.delete_account(&token, &request).await {
            Ok(()) => {
                tracing::info!("Account deleted");
                self.forget_session();
                self.notify(Notice::success("Account has been deleted"));
                true
            }
            Err(ClientError::Unauthorized(detail)) if detail == DETAIL_WRONG_PASSWORD => {
                tracing::warn!("Account deletion refused: wrong password");
                self.notify(Notice::error(detail));
                false
            }
            Err(e) => {
                self.fail("delete account", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientConfig, ClientResult, PortalClient};
    use crate::config::SandboxConfig;
    use crate::models::{
        Booking, BookingFilter, BookingPatch, BookingStatus, ChartPoint, ChatMessage, ChatReply,
        ChatRequest, ChatSender, DeleteAccountRequest, HealthStatus, LoginRequest, MoodAnalytics,
        MoodEntry, NewBooking, NewMoodEntry, NewSession, PatientDetail, PatientSummary,
        Recommendation, RegisterRequest, Session, SessionFilter, TokenResponse, User,
    };
    use crate::sandbox::{self, SandboxState};
    use crate::token::MemoryTokenStore;
    use tempfile::tempdir;

    async fn start_sandbox() -> String {
        let addr = sandbox::spawn(SandboxState::new(SandboxConfig::default()), "127.0.0.1:0")
            .await
            .unwrap();
        format!("http://{}/api", addr)
    }

    fn portal(base_url: &str) -> Portal<PortalClient, MemoryTokenStore> {
        let client = PortalClient::new(ClientConfig::new(base_url)).unwrap();
        Portal::new(client, MemoryTokenStore::new())
    }

    fn registration(name: &str, email: &str, role: Role) -> RegisterForm {
        RegisterForm {
            name: name.to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            role,
        }
    }

    async fn signed_in(base_url: &str, email: &str, role: Role) -> Portal<PortalClient, MemoryTokenStore> {
        let mut p = portal(base_url);
        assert!(p.register(registration("Test User", email, role)).await);
        p
    }

    #[tokio::test]
    async fn test_register_signs_in_to_role_view() {
        let base = start_sandbox().await;

        let patient = signed_in(&base, "pat@example.com", Role::Patient).await;
        assert_eq!(patient.view(), View::Patient);
        assert!(patient.has_token());

        let therapist = signed_in(&base, "doc@example.com", Role::Therapist).await;
        assert_eq!(therapist.view(), View::Therapist);

        let mut dup = portal(&base);
        assert!(!dup.register(registration("Again", "pat@example.com", Role::Patient)).await);
        assert_eq!(dup.notices()[0].message, "Email already registered");
        assert_eq!(dup.view(), View::Landing);
    }

    #[tokio::test]
    async fn test_login_validation_and_credentials() {
        let base = start_sandbox().await;
        signed_in(&base, "pat@example.com", Role::Patient).await;

        let mut p = portal(&base);
        assert!(!p.login(LoginForm::new("not-an-email", "secret1")).await);
        assert_eq!(p.notices()[0].message, "Please enter a valid email address.");

        assert!(!p.login(LoginForm::new("pat@example.com", "wrong-pass")).await);
        assert_eq!(p.notices()[1].message, "Invalid credentials");

        assert!(p.login(LoginForm::new("pat@example.com", "secret1")).await);
        assert_eq!(p.user().map(|u| u.email.as_str()), Some("pat@example.com"));
    }

    #[tokio::test]
    async fn test_submit_mood_clears_draft() {
        let base = start_sandbox().await;
        let mut p = signed_in(&base, "pat@example.com", Role::Patient).await;

        p.set_mood_draft("A calm and steady day");
        let outcome = p.submit_mood(Some(8)).await.unwrap();
        assert_eq!(outcome.entry.risk, Some(RiskLevel::Low));
        assert_eq!(outcome.follow_up, FollowUp::None);
        assert_eq!(p.mood_draft(), "");
        assert!(!p.chat_open());
        assert!(!p.booking_open());

        assert_eq!(p.load_history().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_mood_is_not_sent() {
        let base = start_sandbox().await;
        let mut p = signed_in(&base, "pat@example.com", Role::Patient).await;
        p.take_notices();

        p.set_mood_draft("   ");
        assert!(p.submit_mood(Some(5)).await.is_none());
        assert_eq!(
            p.take_notices(),
            vec![Notice::error("Please write something about how you're feeling")]
        );
        assert_eq!(p.mood_draft(), "   ");
        assert!(p.load_history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mood_risk_opens_follow_up() {
        let base = start_sandbox().await;
        let mut p = signed_in(&base, "pat@example.com", Role::Patient).await;

        p.set_mood_draft("so-so");
        let outcome = p.submit_mood(Some(5)).await.unwrap();
        assert_eq!(outcome.follow_up, FollowUp::OpenChat);
        assert!(p.chat_open());

        p.set_mood_draft("really struggling");
        let outcome = p.submit_mood(Some(2)).await.unwrap();
        assert_eq!(outcome.follow_up, FollowUp::OpenBooking);
        assert!(p.booking_open());
    }

    #[tokio::test]
    async fn test_submit_mood_requires_login() {
        let base = start_sandbox().await;
        let mut p = portal(&base);
        p.set_mood_draft("hello");
        assert!(p.submit_mood(None).await.is_none());
        assert_eq!(p.notices()[0].message, MSG_LOGIN_REQUIRED);
    }

    #[tokio::test]
    async fn test_restore_with_invalid_token_goes_to_landing() {
        let base = start_sandbox().await;
        let client = PortalClient::new(ClientConfig::new(&base)).unwrap();
        let mut p = Portal::new(client, MemoryTokenStore::with_token("stale-token"));

        assert_eq!(p.restore().await, View::Landing);
        assert!(!p.has_token());
        assert!(p.user().is_none());
        assert_eq!(p.server_status().map(|s| s.status.as_str()), Some("ok"));
    }

    #[tokio::test]
    async fn test_restore_resumes_valid_session() {
        let base = start_sandbox().await;
        let first = signed_in(&base, "doc@example.com", Role::Therapist).await;
        let token = first.tokens.load().unwrap().unwrap();

        let client = PortalClient::new(ClientConfig::new(&base)).unwrap();
        let mut p = Portal::new(client, MemoryTokenStore::with_token(token));
        assert_eq!(p.restore().await, View::Therapist);
    }

    #[tokio::test]
    async fn test_chat_and_not_satisfied() {
        let base = start_sandbox().await;
        let mut p = signed_in(&base, "pat@example.com", Role::Patient).await;
        p.open_chat();

        assert!(p.send_chat("  ").await.is_none());
        assert!(p.transcript().is_empty());

        let reply = p.send_chat("I can't sleep").await.unwrap();
        assert!(!reply.escalate);
        assert_eq!(p.transcript().len(), 2);
        assert_eq!(p.transcript()[0].sender, ChatSender::User);
        assert_eq!(p.transcript()[1].text, reply.reply);

        p.not_satisfied();
        assert!(!p.chat_open());
        assert!(p.booking_open());
    }

    #[tokio::test]
    async fn test_patient_booking_falls_back_to_auto() {
        let base = start_sandbox().await;
        let therapist = signed_in(&base, "doc@example.com", Role::Therapist).await;
        let mut p = signed_in(&base, "pat@example.com", Role::Patient).await;
        p.open_booking();

        let booking = p
            .request_booking(BookingForm::for_patient("2030-01-02T10:00", "evening please"))
            .await
            .unwrap();
        assert_eq!(booking.therapist_id, therapist.user().unwrap().id);
        assert_eq!(booking.status, BookingStatus::Scheduled);
        assert!(!p.booking_open());

        assert!(p
            .request_booking(BookingForm::for_patient("", ""))
            .await
            .is_none());
        assert_eq!(
            p.notices().last().map(|n| n.message.as_str()),
            Some("Please choose date & time")
        );
    }

    #[tokio::test]
    async fn test_therapist_workflow() {
        let base = start_sandbox().await;
        let mut patient = signed_in(&base, "pat@example.com", Role::Patient).await;
        patient.set_mood_draft("tired");
        patient.submit_mood(Some(3)).await.unwrap();
        let patient_id = patient.user().unwrap().id;

        let mut t = signed_in(&base, "doc@example.com", Role::Therapist).await;
        let patients = t.load_patients().await.unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].latest_mood_risk, Some(RiskLevel::High));

        let detail = t.open_patient(patient_id).await.unwrap();
        assert_eq!(detail.moods.len(), 1);

        assert!(t
            .create_booking(BookingForm::for_patient("2030-01-02T10:00", ""))
            .await
            .is_none());

        let booking = t
            .create_booking(BookingForm::for_therapist(patient_id, "2030-01-02T10:00", "intake"))
            .await
            .unwrap();
        assert_eq!(t.selected_patient().unwrap().bookings.len(), 1);

        let session = t
            .record_session(SessionForm {
                booking_id: Some(booking.id),
                patient_id: Some(patient_id),
                notes: "Talked about sleep".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(session.therapist_id, t.user().unwrap().id);

        let bookings = t
            .list_bookings(BookingFilter {
                patient_id: Some(patient_id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(bookings[0].status, BookingStatus::Completed);

        let updated = t
            .update_booking(
                booking.id,
                BookingPatch {
                    status: Some(BookingStatus::Cancelled),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, BookingStatus::Cancelled);

        let sessions = t.list_sessions(SessionFilter::default()).await.unwrap();
        assert_eq!(sessions.len(), 1);
    }

    #[tokio::test]
    async fn test_patient_cannot_open_dashboard_data() {
        let base = start_sandbox().await;
        let mut p = signed_in(&base, "pat@example.com", Role::Patient).await;
        assert!(p.load_patients().await.is_none());
        assert_eq!(p.notices().last().unwrap().message, "Forbidden");
        assert!(p.has_token());
    }

    #[tokio::test]
    async fn test_export_and_delete_account() {
        let base = start_sandbox().await;
        let mut p = signed_in(&base, "pat@example.com", Role::Patient).await;
        p.set_mood_draft("journal");
        p.submit_mood(Some(6)).await.unwrap();

        let dir = tempdir().unwrap();
        let path = p.export_csv(dir.path()).await.unwrap();
        let csv = std::fs::read_to_string(&path).unwrap();
        assert!(csv.starts_with("type,id,date,mood_value,risk,text"));
        assert!(csv.contains("MEDIUM,journal"));

        let history = p.history_csv().await.unwrap();
        assert!(history.starts_with("id,date,sentiment,risk,text,created_at\n"));

        assert!(!p.delete_account("").await);
        assert!(!p.delete_account("wrong-pass").await);
        assert_eq!(p.notices().last().unwrap().message, "Invalid password");
        assert!(p.has_token());

        assert!(p.delete_account("secret1").await);
        assert!(!p.has_token());
        assert_eq!(p.view(), View::Landing);
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let base = start_sandbox().await;
        let mut p = signed_in(&base, "pat@example.com", Role::Patient).await;
        p.open_chat();
        p.logout();
        assert!(!p.has_token());
        assert_eq!(p.view(), View::Landing);
        assert!(!p.chat_open());
    }

    /// Registration succeeds; every other call fails with the configured error
    struct FailingApi {
        failure: fn() -> ClientError,
    }

    #[async_trait::async_trait]
    impl PortalApi for FailingApi {
        async fn health(&self) -> ClientResult<HealthStatus> {
            Err((self.failure)())
        }

        async fn register(&self, request: &RegisterRequest) -> ClientResult<User> {
            Ok(User {
                id: 1,
                name: request.name.clone(),
                email: request.email.clone(),
                role: request.role,
            })
        }

        async fn login(&self, _: &LoginRequest) -> ClientResult<TokenResponse> {
            Err((self.failure)())
        }

        async fn me(&self, _: &str) -> ClientResult<User> {
            Err((self.failure)())
        }

        async fn create_mood(&self, _: &str, _: &NewMoodEntry) -> ClientResult<MoodEntry> {
            Err((self.failure)())
        }

        async fn list_moods(&self, _: &str) -> ClientResult<Vec<MoodEntry>> {
            Err((self.failure)())
        }

        async fn mood_analytics(&self, _: &str) -> ClientResult<MoodAnalytics> {
            Err((self.failure)())
        }

        async fn chart_data(&self, _: &str, _: u32) -> ClientResult<Vec<ChartPoint>> {
            Err((self.failure)())
        }

        async fn chat(&self, _: &str, _: &ChatRequest) -> ClientResult<ChatReply> {
            Err((self.failure)())
        }

        async fn chat_history(&self, _: &str) -> ClientResult<Vec<ChatMessage>> {
            Err((self.failure)())
        }

        async fn recommendations(&self, _: &str) -> ClientResult<Vec<Recommendation>> {
            Err((self.failure)())
        }

        async fn create_booking(&self, _: &str, _: &NewBooking) -> ClientResult<Booking> {
            Err((self.failure)())
        }

        async fn auto_booking(&self, _: &str) -> ClientResult<Booking> {
            Err((self.failure)())
        }

        async fn list_bookings(&self, _: &str, _: &BookingFilter) -> ClientResult<Vec<Booking>> {
            Err((self.failure)())
        }

        async fn update_booking(&self, _: &str, _: i64, _: &BookingPatch) -> ClientResult<Booking> {
            Err((self.failure)())
        }

        async fn create_session(&self, _: &str, _: &NewSession) -> ClientResult<Session> {
            Err((self.failure)())
        }

        async fn list_sessions(&self, _: &str, _: &SessionFilter) -> ClientResult<Vec<Session>> {
            Err((self.failure)())
        }

        async fn therapist_patients(&self, _: &str) -> ClientResult<Vec<PatientSummary>> {
            Err((self.failure)())
        }

        async fn patient_detail(&self, _: &str, _: i64) -> ClientResult<PatientDetail> {
            Err((self.failure)())
        }

        async fn export_csv(&self, _: &str) -> ClientResult<Vec<u8>> {
            Err((self.failure)())
        }

        async fn delete_account(&self, _: &str, _: &DeleteAccountRequest) -> ClientResult<()> {
            Err((self.failure)())
        }
    }

    fn failing_portal(
        failure: fn() -> ClientError,
        token: Option<&str>,
    ) -> Portal<FailingApi, MemoryTokenStore> {
        let tokens = token.map(MemoryTokenStore::with_token).unwrap_or_default();
        Portal::new(FailingApi { failure }, tokens)
    }

    fn server_error() -> ClientError {
        ClientError::Api {
            status: 500,
            detail: "Internal error".to_string(),
        }
    }

    fn offline() -> ClientError {
        ClientError::Unavailable("connection refused".to_string())
    }

    fn expired() -> ClientError {
        ClientError::Unauthorized("Could not validate credentials".to_string())
    }

    #[tokio::test]
    async fn test_register_falls_back_to_login_mode() {
        let mut p = failing_portal(server_error, None);
        p.open_auth(AuthMode::Register);

        assert!(!p.register(registration("Ana Silva", "ana@example.com", Role::Patient)).await);
        assert_eq!(p.auth_mode(), AuthMode::Login);
        assert_eq!(p.notices().last().unwrap().message, MSG_AUTO_LOGIN_FAILED);
        assert_eq!(p.view(), View::Landing);
        assert!(!p.has_token());
    }

    #[tokio::test]
    async fn test_chat_failure_appends_apology() {
        let mut p = failing_portal(server_error, Some("tok"));
        assert!(p.send_chat("hello").await.is_none());
        let lines = p.transcript();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "hello");
        assert_eq!(lines[1].sender, ChatSender::Bot);
        assert_eq!(lines[1].text, MSG_CHAT_UNAVAILABLE);

        let mut p = failing_portal(offline, Some("tok"));
        p.send_chat("anyone there?").await;
        assert_eq!(p.transcript().last().unwrap().text, MSG_CHAT_OFFLINE);
        assert!(p.has_token());
    }

    #[tokio::test]
    async fn test_delete_account_with_expired_token_ends_session() {
        let mut p = failing_portal(expired, Some("stale"));
        assert!(!p.delete_account("secret1").await);
        assert!(!p.has_token());
        assert_eq!(p.view(), View::Landing);
        assert_eq!(p.notices().last().unwrap().message, MSG_SESSION_EXPIRED);
    }
}
