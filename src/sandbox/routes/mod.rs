//! Sandbox route handlers

pub mod account;
pub mod auth;
pub mod bookings;
pub mod chat;
pub mod mood;
pub mod therapist;
