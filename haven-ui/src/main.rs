//! Haven Web Client
//!
//! Mental health portal single-page app built with Leptos (WASM).
//!
//! # Features
//!
//! - Mood journal with risk feedback, history and CSV export
//! - 7/30-day averages and a daily mood chart
//! - Support chat and self-help recommendations
//! - Session booking for patients
//! - Therapist dashboard: patients, bookings, sessions
//!
//! # Architecture
//!
//! A client-side rendered (CSR) Leptos application compiled to WebAssembly.
//! It talks to the portal REST API over HTTP with a bearer token kept in
//! local storage.

use leptos::*;

mod api;
mod app;
mod components;
mod models;
mod pages;
mod state;

fn main() {
    console_error_panic_hook::set_once();

    mount_to_body(|| view! { <app::App /> });
}
