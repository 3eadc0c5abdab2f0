//! # Haven
//!
//! Client core of a mental health portal: patients journal their mood, see
//! analytics, chat with a support bot and book therapist sessions; therapists
//! follow their patients, bookings and sessions.
//!
//! ## Modules
//!
//! - [`models`]: Wire types of the portal REST API
//! - [`validation`]: Form checks performed before any request
//! - [`analytics`]: Slider risk buckets and rolling averages
//! - [`export`]: CSV rendering and saving exports
//! - [`client`]: Typed REST client
//! - [`token`]: Bearer token persistence
//! - [`portal`]: UI-agnostic portal controller
//! - [`sandbox`]: In-memory portal API for development and tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use haven::client::{ClientConfig, PortalClient};
//! use haven::portal::Portal;
//! use haven::token::FileTokenStore;
//! use haven::validation::LoginForm;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PortalClient::new(ClientConfig::new("http://127.0.0.1:8000/api"))?;
//!     let mut portal = Portal::new(client, FileTokenStore::default_location());
//!
//!     portal.restore().await;
//!     if portal.user().is_none() {
//!         portal.login(LoginForm::new("ana@example.com", "secret1")).await;
//!     }
//!
//!     portal.set_mood_draft("Slept well, feeling okay");
//!     if let Some(outcome) = portal.submit_mood(Some(7)).await {
//!         println!("Saved with follow-up {:?}", outcome.follow_up);
//!     }
//!
//!     for notice in portal.take_notices() {
//!         println!("{}", notice.message);
//!     }
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod client;
pub mod config;
pub mod export;
pub mod models;
pub mod portal;
pub mod sandbox;
pub mod token;
pub mod validation;

pub use client::{ClientConfig, ClientError, ClientResult, PortalApi, PortalClient};

pub use config::{ApiConfig, Config, ConfigError, LoggingConfig, SandboxConfig};

pub use models::{
    Booking, BookingStatus, MoodEntry, PatientDetail, PatientSummary, Recommendation, RiskLevel,
    Role, Session, User,
};

pub use portal::{FollowUp, Notice, NoticeLevel, Portal, View};

pub use token::{FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreError};

pub use validation::ValidationError;
