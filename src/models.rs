//! Portal Data Model
//!
//! Wire types exchanged with the portal REST API. Every entity here is
//! server-authoritative; the client only keeps transient copies.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ============================================
// USERS & AUTH
// ============================================

/// Account role, decides which view the portal renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Patient,
    Therapist,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Therapist => "therapist",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "patient" => Ok(Role::Patient),
            "therapist" => Ok(Role::Therapist),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// A portal account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

/// Registration request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

/// Login request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Access token returned by a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Account deletion confirmation body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAccountRequest {
    pub password: String,
}

/// GET /health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

// ============================================
// MOOD
// ============================================

/// Risk classification attached to a mood entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }

    /// Human label used in history lists
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Medium => "Medium Risk",
            RiskLevel::High => "High Risk",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LOW" => Ok(RiskLevel::Low),
            "MEDIUM" => Ok(RiskLevel::Medium),
            "HIGH" => Ok(RiskLevel::High),
            other => Err(format!("Unknown risk level: {}", other)),
        }
    }
}

impl Serialize for RiskLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RiskLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A stored mood entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub text: Option<String>,
    pub mood_value: u8,
    #[serde(default)]
    pub risk: Option<RiskLevel>,
    #[serde(default)]
    pub sentiment: Option<f64>,
}

/// POST /mood body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMoodEntry {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_value: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDateTime>,
}

/// GET /mood/analytics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoodAnalytics {
    pub avg_7_days: Option<f64>,
    pub avg_30_days: Option<f64>,
}

/// One day of GET /analytics/chart-data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Day in `YYYY-MM-DD`
    pub date: String,
    #[serde(default)]
    pub avg: Option<f64>,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub high: u32,
    #[serde(default)]
    pub medium: u32,
    #[serde(default)]
    pub low: u32,
}

// ============================================
// CHAT & RECOMMENDATIONS
// ============================================

/// POST /chat body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// POST /chat response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(default)]
    pub escalate: bool,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub response_id: Option<String>,
}

/// Who wrote a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatSender {
    User,
    Bot,
}

/// A stored chat message from GET /chat/history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub sender: ChatSender,
    pub text: String,
    pub created_at: NaiveDateTime,
}

/// A self-help suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub text: String,
}

/// Inputs the server used to rank recommendations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationContext {
    #[serde(default)]
    pub latest_mood_value: Option<u8>,
    #[serde(default)]
    pub latest_risk: Option<RiskLevel>,
    #[serde(default)]
    pub avg_7_days: Option<f64>,
    #[serde(default)]
    pub avg_30_days: Option<f64>,
}

/// GET /recommendations
///
/// Older servers answer with a bare array, newer ones wrap it with the
/// ranking context. Both are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecommendationPayload {
    WithContext {
        #[serde(default)]
        context: RecommendationContext,
        recommendations: Vec<Recommendation>,
    },
    Bare(Vec<Recommendation>),
}

impl RecommendationPayload {
    pub fn into_items(self) -> Vec<Recommendation> {
        match self {
            RecommendationPayload::WithContext {
                recommendations, ..
            } => recommendations,
            RecommendationPayload::Bare(items) => items,
        }
    }
}

// ============================================
// BOOKINGS & SESSIONS
// ============================================

/// Booking lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Scheduled,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Scheduled => "scheduled",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" => Ok(BookingStatus::Scheduled),
            "cancelled" | "canceled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(format!("Unknown booking status: {}", other)),
        }
    }
}

/// A scheduled therapist session request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub patient_id: i64,
    pub therapist_id: i64,
    pub datetime: NaiveDateTime,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
}

/// POST /bookings body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBooking {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub therapist_id: Option<i64>,
    pub datetime: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// PATCH /bookings/{id} body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// GET /bookings filters
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub patient_id: Option<i64>,
    pub therapist_id: Option<i64>,
    pub status: Option<BookingStatus>,
}

/// A completed therapist-patient meeting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    #[serde(default)]
    pub booking_id: Option<i64>,
    pub patient_id: i64,
    pub therapist_id: i64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub outcome: Option<String>,
    pub session_at: NaiveDateTime,
}

/// POST /sessions body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSession {
    #[serde(default)]
    pub booking_id: Option<i64>,
    pub patient_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub therapist_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
}

/// GET /sessions filters
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub patient_id: Option<i64>,
    pub therapist_id: Option<i64>,
}

// ============================================
// THERAPIST VIEWS
// ============================================

/// Row of GET /therapist/patients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub latest_mood_sentiment: Option<f64>,
    #[serde(default)]
    pub latest_mood_risk: Option<RiskLevel>,
    #[serde(default)]
    pub avg_7_days: Option<f64>,
    #[serde(default)]
    pub avg_30_days: Option<f64>,
}

/// GET /therapist/patient/{id}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientDetail {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub moods: Vec<MoodEntry>,
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

/// Error body returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_parses_any_case() {
        assert_eq!("high".parse::<RiskLevel>().unwrap(), RiskLevel::High);
        assert_eq!(" Medium ".parse::<RiskLevel>().unwrap(), RiskLevel::Medium);
        assert!("severe".parse::<RiskLevel>().is_err());

        let entry: MoodEntry = serde_json::from_str(
            r#"{"id": 1, "date": "2024-03-01T09:30:00", "mood_value": 4, "risk": "medium"}"#,
        )
        .unwrap();
        assert_eq!(entry.risk, Some(RiskLevel::Medium));
        assert_eq!(serde_json::to_string(&RiskLevel::Low).unwrap(), "\"LOW\"");
    }

    #[test]
    fn test_mood_entry_accepts_fractional_seconds() {
        let entry: MoodEntry = serde_json::from_str(
            r#"{"id": 7, "user_id": 2, "date": "2024-03-01T09:30:00.123456",
                "text": "ok", "mood_value": 6, "risk": null, "sentiment": 0.25}"#,
        )
        .unwrap();
        assert_eq!(entry.user_id, Some(2));
        assert_eq!(entry.risk, None);
        assert_eq!(entry.sentiment, Some(0.25));
    }

    #[test]
    fn test_recommendations_both_shapes() {
        let wrapped: RecommendationPayload = serde_json::from_str(
            r#"{"context": {"latest_risk": "HIGH"}, "recommendations": [{"title": "Walk", "text": "Go outside"}]}"#,
        )
        .unwrap();
        assert_eq!(wrapped.into_items().len(), 1);

        let bare: RecommendationPayload =
            serde_json::from_str(r#"[{"id": "sleep", "title": "Sleep", "text": "Rest"}]"#).unwrap();
        let items = bare.into_items();
        assert_eq!(items[0].id.as_deref(), Some("sleep"));
    }

    #[test]
    fn test_booking_defaults() {
        let booking: Booking = serde_json::from_str(
            r#"{"id": 3, "patient_id": 1, "therapist_id": 2, "datetime": "2024-05-01T10:00:00"}"#,
        )
        .unwrap();
        assert_eq!(booking.status, BookingStatus::Scheduled);
        assert!(booking.notes.is_none());
        assert_eq!("canceled".parse::<BookingStatus>().unwrap(), BookingStatus::Cancelled);
    }

    #[test]
    fn test_new_mood_skips_empty_fields() {
        let body = serde_json::to_value(NewMoodEntry {
            text: "tired".to_string(),
            mood_value: None,
            date: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"text": "tired"}));
    }

    #[test]
    fn test_role_round_trip_lowercase() {
        let user: User =
            serde_json::from_str(r#"{"id": 1, "name": "Ana", "email": "a@b.co", "role": "therapist"}"#)
                .unwrap();
        assert_eq!(user.role, Role::Therapist);
        assert_eq!("Patient".parse::<Role>().unwrap(), Role::Patient);
    }
}
