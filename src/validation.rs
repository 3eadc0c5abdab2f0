//! Form Validation
//!
//! The only checks the portal performs before calling the API. Each form
//! reports the first failing field with the message shown to the user.

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use crate::models::{
    LoginRequest, NewBooking, NewMoodEntry, NewSession, RegisterRequest, Role,
};

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// Minimum accepted display name length
pub const MIN_NAME_LEN: usize = 2;

/// Mood slider bounds
pub const MOOD_MIN: u8 = 1;
pub const MOOD_MAX: u8 = 10;

/// Validation failures, displayed verbatim
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Password must be at least 6 characters.")]
    PasswordTooShort,

    #[error("Please enter your full name.")]
    NameTooShort,

    #[error("Please write something about how you're feeling")]
    EmptyMoodText,

    #[error("Mood value must be between 1 and 10")]
    MoodOutOfRange(u8),

    #[error("Please choose date & time")]
    MissingDateTime,

    #[error("Invalid date & time: {0}")]
    InvalidDateTime(String),

    #[error("Missing patient id")]
    MissingPatient,

    #[error("Please type your password to confirm")]
    MissingConfirmation,

    #[error("Please type a message")]
    EmptyMessage,
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"))
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email_regex().is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(ValidationError::PasswordTooShort)
    }
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().chars().count() >= MIN_NAME_LEN {
        Ok(())
    } else {
        Err(ValidationError::NameTooShort)
    }
}

pub fn validate_mood_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        Err(ValidationError::EmptyMoodText)
    } else {
        Ok(())
    }
}

pub fn validate_mood_value(value: u8) -> Result<(), ValidationError> {
    if (MOOD_MIN..=MOOD_MAX).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::MoodOutOfRange(value))
    }
}

/// Parse the value of a date-time picker.
///
/// Accepts `datetime-local` input (`2024-05-01T10:00`), full ISO timestamps
/// with or without seconds, a space separator, or a bare date (noon).
pub fn parse_booking_datetime(raw: &str) -> Result<NaiveDateTime, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::MissingDateTime);
    }

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_utc());
    }

    let formats = [
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
    ];
    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(dt);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(12, 0, 0) {
            return Ok(dt);
        }
    }

    Err(ValidationError::InvalidDateTime(raw.to_string()))
}

pub fn validate_booking_datetime(raw: &str) -> Result<(), ValidationError> {
    parse_booking_datetime(raw).map(|_| ())
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ============================================
// FORMS
// ============================================

/// Sign-in form
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<LoginRequest, ValidationError> {
        let email = self.email.trim();
        validate_email(email)?;
        validate_password(&self.password)?;
        Ok(LoginRequest {
            email: email.to_string(),
            password: self.password.clone(),
        })
    }
}

/// Account creation form
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<RegisterRequest, ValidationError> {
        validate_name(&self.name)?;
        let email = self.email.trim();
        validate_email(email)?;
        validate_password(&self.password)?;
        Ok(RegisterRequest {
            name: self.name.trim().to_string(),
            email: email.to_string(),
            password: self.password.clone(),
            role: self.role,
        })
    }

    /// Credentials for the automatic sign-in after registering
    pub fn login_form(&self) -> LoginForm {
        LoginForm::new(self.email.trim(), self.password.clone())
    }
}

/// Journal entry form
#[derive(Debug, Clone, Default)]
pub struct MoodForm {
    pub text: String,
    pub mood_value: Option<u8>,
    pub date: Option<NaiveDateTime>,
}

impl MoodForm {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: u8) -> Self {
        self.mood_value = Some(value);
        self
    }

    pub fn validate(&self) -> Result<NewMoodEntry, ValidationError> {
        validate_mood_text(&self.text)?;
        if let Some(value) = self.mood_value {
            validate_mood_value(value)?;
        }
        Ok(NewMoodEntry {
            text: self.text.trim().to_string(),
            mood_value: self.mood_value,
            date: self.date,
        })
    }
}

/// Booking request form, used by patients and therapists
#[derive(Debug, Clone, Default)]
pub struct BookingForm {
    pub patient_id: Option<i64>,
    pub therapist_id: Option<i64>,
    pub datetime: String,
    pub notes: String,
}

impl BookingForm {
    /// Patient-side request: the server fills in both ids
    pub fn for_patient(datetime: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            datetime: datetime.into(),
            notes: notes.into(),
            ..Default::default()
        }
    }

    /// Therapist-side booking for a given patient
    pub fn for_therapist(
        patient_id: i64,
        datetime: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            patient_id: Some(patient_id),
            datetime: datetime.into(),
            notes: notes.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<NewBooking, ValidationError> {
        let datetime = parse_booking_datetime(&self.datetime)?;
        Ok(NewBooking {
            patient_id: self.patient_id,
            therapist_id: self.therapist_id,
            datetime,
            notes: non_blank(&self.notes),
        })
    }

    /// Same as [`validate`](Self::validate) but the patient id is mandatory
    pub fn validate_for_therapist(&self) -> Result<NewBooking, ValidationError> {
        if self.patient_id.is_none() {
            return Err(ValidationError::MissingPatient);
        }
        self.validate()
    }
}

/// Session recorder form
#[derive(Debug, Clone, Default)]
pub struct SessionForm {
    pub booking_id: Option<i64>,
    pub patient_id: Option<i64>,
    pub therapist_id: Option<i64>,
    pub notes: String,
    pub outcome: String,
}

impl SessionForm {
    pub fn validate(&self) -> Result<NewSession, ValidationError> {
        let patient_id = self.patient_id.ok_or(ValidationError::MissingPatient)?;
        Ok(NewSession {
            booking_id: self.booking_id,
            patient_id,
            therapist_id: self.therapist_id,
            notes: non_blank(&self.notes),
            outcome: non_blank(&self.outcome),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_rules() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("a@b.c").is_ok());
        assert_eq!(validate_email("ana@example"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("ana example@x.io"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email(""), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn test_login_form_checks_email_before_password() {
        let err = LoginForm::new("nope", "123").validate().unwrap_err();
        assert_eq!(err, ValidationError::InvalidEmail);

        let err = LoginForm::new("ana@example.com", "12345").validate().unwrap_err();
        assert_eq!(err.to_string(), "Password must be at least 6 characters.");

        let req = LoginForm::new("  ana@example.com ", "123456").validate().unwrap();
        assert_eq!(req.email, "ana@example.com");
    }

    #[test]
    fn test_register_form_name_first() {
        let form = RegisterForm {
            name: "A".to_string(),
            email: "bad".to_string(),
            password: "x".to_string(),
            role: Role::Therapist,
        };
        assert_eq!(form.validate().unwrap_err(), ValidationError::NameTooShort);

        let form = RegisterForm {
            name: " Ana ".to_string(),
            email: "ana@example.com".to_string(),
            password: "secret1".to_string(),
            role: Role::Therapist,
        };
        let req = form.validate().unwrap();
        assert_eq!(req.name, "Ana");
        assert_eq!(req.role, Role::Therapist);
    }

    #[test]
    fn test_mood_form() {
        assert_eq!(
            MoodForm::new("   ").validate().unwrap_err(),
            ValidationError::EmptyMoodText
        );
        assert_eq!(
            MoodForm::new("fine").with_value(11).validate().unwrap_err(),
            ValidationError::MoodOutOfRange(11)
        );
        let entry = MoodForm::new(" calm day ").with_value(7).validate().unwrap();
        assert_eq!(entry.text, "calm day");
        assert_eq!(entry.mood_value, Some(7));
    }

    #[test]
    fn test_parse_booking_datetime_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(parse_booking_datetime("2024-05-01T10:00").unwrap(), expected);
        assert_eq!(parse_booking_datetime("2024-05-01 10:00:00").unwrap(), expected);
        assert_eq!(parse_booking_datetime("2024-05-01T10:00:00Z").unwrap(), expected);
        assert_eq!(parse_booking_datetime("").unwrap_err(), ValidationError::MissingDateTime);
        assert!(matches!(
            parse_booking_datetime("tomorrow"),
            Err(ValidationError::InvalidDateTime(_))
        ));
    }

    #[test]
    fn test_booking_forms() {
        let booking = BookingForm::for_patient("2024-05-01T10:00", "  ").validate().unwrap();
        assert!(booking.notes.is_none());
        assert!(booking.patient_id.is_none());

        let missing = BookingForm::for_patient("2024-05-01T10:00", "")
            .validate_for_therapist()
            .unwrap_err();
        assert_eq!(missing, ValidationError::MissingPatient);

        let booking = BookingForm::for_therapist(4, "2024-05-01T10:00", "intake")
            .validate_for_therapist()
            .unwrap();
        assert_eq!(booking.patient_id, Some(4));
        assert_eq!(booking.notes.as_deref(), Some("intake"));
    }

    #[test]
    fn test_session_form_requires_patient() {
        let form = SessionForm::default();
        assert_eq!(form.validate().unwrap_err(), ValidationError::MissingPatient);

        let form = SessionForm {
            patient_id: Some(9),
            notes: "Discussed sleep".to_string(),
            ..Default::default()
        };
        let session = form.validate().unwrap();
        assert_eq!(session.patient_id, 9);
        assert!(session.outcome.is_none());
    }
}
