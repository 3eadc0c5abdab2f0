//! Pages
//!
//! Top-level views switched by the session's role.

pub mod landing;
pub mod patient;
pub mod therapist;

pub use landing::Landing;
pub use patient::PatientPage;
pub use therapist::TherapistPage;
