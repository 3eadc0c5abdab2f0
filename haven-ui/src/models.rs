//! Wire Types
//!
//! Portal API payloads as the browser sees them, plus the small pure helpers
//! the views need (risk bucket, CSV rendering).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Account role
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Patient,
    Therapist,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl User {
    pub fn role_label(&self) -> &'static str {
        match self.role {
            Role::Patient => "Patient",
            Role::Therapist => "Therapist",
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
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

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Medium => "Medium Risk",
            RiskLevel::High => "High Risk",
        }
    }

    /// Badge classes for history lists
    pub fn badge_class(&self) -> &'static str {
        match self {
            RiskLevel::Low => "bg-green-700 text-green-100",
            RiskLevel::Medium => "bg-yellow-700 text-yellow-100",
            RiskLevel::High => "bg-red-700 text-red-100",
        }
    }
}

/// 1-3 HIGH, 4-6 MEDIUM, 7-10 LOW; out-of-range values are clamped
pub fn risk_for_slider(value: u8) -> RiskLevel {
    match value.clamp(1, 10) {
        1..=3 => RiskLevel::High,
        4..=6 => RiskLevel::Medium,
        _ => RiskLevel::Low,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: i64,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub text: Option<String>,
    pub mood_value: u8,
    #[serde(default)]
    pub risk: Option<RiskLevel>,
    #[serde(default)]
    pub sentiment: Option<f64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct NewMoodEntry {
    pub text: String,
    pub mood_value: u8,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MoodAnalytics {
    pub avg_7_days: Option<f64>,
    pub avg_30_days: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ChartPoint {
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

#[derive(Clone, Debug, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(default)]
    pub escalate: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub text: String,
}

/// GET /recommendations answers either a bare list or a list with context
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RecommendationPayload {
    WithContext { recommendations: Vec<Recommendation> },
    Bare(Vec<Recommendation>),
}

impl RecommendationPayload {
    pub fn into_items(self) -> Vec<Recommendation> {
        match self {
            RecommendationPayload::WithContext { recommendations } => recommendations,
            RecommendationPayload::Bare(items) => items,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Scheduled => "scheduled",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub patient_id: i64,
    pub therapist_id: i64,
    pub datetime: NaiveDateTime,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub patient_name: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct NewBooking {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<i64>,
    pub datetime: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct BookingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Session {
    pub id: i64,
    #[serde(default)]
    pub booking_id: Option<i64>,
    pub patient_id: i64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub outcome: Option<String>,
    pub session_at: NaiveDateTime,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct NewSession {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<i64>,
    pub patient_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PatientSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub latest_mood_risk: Option<RiskLevel>,
    #[serde(default)]
    pub avg_7_days: Option<f64>,
    #[serde(default)]
    pub avg_30_days: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
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

/// Parse a `datetime-local` input value (`YYYY-MM-DDTHH:MM`, seconds optional)
pub fn parse_local_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

const MOOD_CSV_HEADER: &str = "id,date,sentiment,risk,text,created_at";

/// Mood history as CSV; every field quoted, empty history gives an empty string
pub fn moods_to_csv(entries: &[MoodEntry]) -> Result<String, String> {
    if entries.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for e in entries {
        writer
            .write_record([
                e.id.to_string(),
                e.date.format("%Y-%m-%dT%H:%M:%S").to_string(),
                e.sentiment.map(|s| s.to_string()).unwrap_or_default(),
                e.risk.map(|r| r.as_str().to_string()).unwrap_or_default(),
                e.text.clone().unwrap_or_default(),
                String::new(),
            ])
            .map_err(|e| format!("CSV error: {}", e))?;
    }

    let body = writer
        .into_inner()
        .map_err(|e| format!("CSV error: {}", e.error()))?;

    let mut out = format!("{}\n", MOOD_CSV_HEADER);
    out.push_str(&String::from_utf8_lossy(&body));
    Ok(out)
}

/// Sum of chart bucket counts
pub fn total_entries(points: &[ChartPoint]) -> u32 {
    points.iter().map(|p| p.count).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, text: &str, risk: Option<RiskLevel>) -> MoodEntry {
        MoodEntry {
            id,
            date: parse_local_datetime("2024-03-01T09:30").unwrap(),
            text: Some(text.to_string()),
            mood_value: 5,
            risk,
            sentiment: None,
        }
    }

    #[test]
    fn test_risk_buckets() {
        assert_eq!(risk_for_slider(1), RiskLevel::High);
        assert_eq!(risk_for_slider(3), RiskLevel::High);
        assert_eq!(risk_for_slider(4), RiskLevel::Medium);
        assert_eq!(risk_for_slider(6), RiskLevel::Medium);
        assert_eq!(risk_for_slider(7), RiskLevel::Low);
        assert_eq!(risk_for_slider(0), RiskLevel::High);
        assert_eq!(risk_for_slider(42), RiskLevel::Low);
    }

    #[test]
    fn test_csv_quotes_every_field() {
        let csv = moods_to_csv(&[
            entry(1, "said \"hi\", then left", Some(RiskLevel::Medium)),
            entry(2, "two\nlines", None),
        ])
        .unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("id,date,sentiment,risk,text,created_at"));
        assert_eq!(
            lines.next(),
            Some("\"1\",\"2024-03-01T09:30:00\",\"\",\"MEDIUM\",\"said \"\"hi\"\", then left\",\"\"")
        );
        assert!(csv.ends_with("\"\",\"two\nlines\",\"\"\n"));
        assert_eq!(moods_to_csv(&[]).unwrap(), "");
    }

    #[test]
    fn test_parse_local_datetime() {
        assert!(parse_local_datetime("2024-05-01T10:00").is_some());
        assert!(parse_local_datetime("2024-05-01T10:00:30").is_some());
        assert!(parse_local_datetime("tomorrow").is_none());
    }

    #[test]
    fn test_recommendations_accept_both_shapes() {
        let bare: RecommendationPayload =
            serde_json::from_str(r#"[{"title":"Walk","text":"Ten minutes outside"}]"#).unwrap();
        assert_eq!(bare.into_items().len(), 1);

        let wrapped: RecommendationPayload = serde_json::from_str(
            r#"{"context":{"latest_risk":"HIGH"},"recommendations":[{"title":"Breathe","text":"4-7-8"}]}"#,
        )
        .unwrap();
        assert_eq!(wrapped.into_items()[0].title, "Breathe");
    }
}
