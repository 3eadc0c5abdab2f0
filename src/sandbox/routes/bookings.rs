//! Booking and Session Routes
//!
//! - POST /api/bookings - Therapist books a patient
//! - POST /api/bookings/auto - Patient gets the first therapist, one hour out
//! - GET /api/bookings - Therapist listing with filters
//! - PATCH /api/bookings/:id - Reschedule, change status or notes
//! - POST /api/sessions - Record a session
//! - GET /api/sessions - Session listing with filters

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::Duration;
use serde::Deserialize;
use std::sync::Arc;

use crate::models::{
    Booking, BookingPatch, BookingStatus, NewBooking, NewSession, Role, Session,
};
use crate::sandbox::error::{SandboxError, SandboxResult};
use crate::sandbox::state::{now, SandboxState, Store};

const AUTO_BOOKING_NOTE: &str = "Auto-assigned due to high-risk mood entry";

fn require_patient(store: &Store, patient_id: i64) -> SandboxResult<String> {
    match store.user(patient_id) {
        Some(user) if user.role == Role::Patient => Ok(user.name.clone()),
        _ => Err(SandboxError::NotFound("Patient not found".to_string())),
    }
}

/// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<SandboxState>>,
    headers: HeaderMap,
    Json(req): Json<NewBooking>,
) -> SandboxResult<Json<Booking>> {
    let therapist = state.require_role(&headers, Role::Therapist).await?;

    let patient_id = req
        .patient_id
        .ok_or_else(|| SandboxError::Unprocessable("patient_id is required".to_string()))?;

    let mut store = state.write().await;
    let patient_name = require_patient(&store, patient_id)?;

    let booking = Booking {
        id: store.next_id(),
        patient_id,
        therapist_id: req.therapist_id.unwrap_or(therapist.id),
        datetime: req.datetime,
        status: BookingStatus::Scheduled,
        notes: req.notes,
        patient_name: Some(patient_name),
    };
    store.bookings.push(booking.clone());

    tracing::info!(booking_id = booking.id, patient_id, "Booking created");
    Ok(Json(booking))
}

/// POST /api/bookings/auto
pub async fn auto_booking(
    State(state): State<Arc<SandboxState>>,
    headers: HeaderMap,
) -> SandboxResult<Json<Booking>> {
    let patient = state.authenticate(&headers).await?;
    if patient.role != Role::Patient {
        return Err(SandboxError::Forbidden(
            "Only patients may request an automatic booking".to_string(),
        ));
    }

    let mut store = state.write().await;
    let therapist_id = store
        .first_therapist()
        .map(|t| t.id)
        .ok_or_else(|| SandboxError::NotFound("No therapists available".to_string()))?;

    let booking = Booking {
        id: store.next_id(),
        patient_id: patient.id,
        therapist_id,
        datetime: now() + Duration::hours(1),
        status: BookingStatus::Scheduled,
        notes: Some(AUTO_BOOKING_NOTE.to_string()),
        patient_name: Some(patient.name.clone()),
    };
    store.bookings.push(booking.clone());

    tracing::info!(booking_id = booking.id, patient_id = patient.id, therapist_id, "Automatic booking created");
    Ok(Json(booking))
}

#[derive(Debug, Default, Deserialize)]
pub struct BookingParams {
    pub patient_id: Option<i64>,
    pub therapist_id: Option<i64>,
    pub status: Option<String>,
}

/// GET /api/bookings
pub async fn list_bookings(
    State(state): State<Arc<SandboxState>>,
    headers: HeaderMap,
    Query(params): Query<BookingParams>,
) -> SandboxResult<Json<Vec<Booking>>> {
    state.require_role(&headers, Role::Therapist).await?;

    let status = params
        .status
        .as_deref()
        .map(str::parse::<BookingStatus>)
        .transpose()
        .map_err(SandboxError::Unprocessable)?;

    let mut bookings: Vec<Booking> = state
        .read()
        .await
        .bookings
        .iter()
        .filter(|b| params.patient_id.map_or(true, |id| b.patient_id == id))
        .filter(|b| params.therapist_id.map_or(true, |id| b.therapist_id == id))
        .filter(|b| status.map_or(true, |s| b.status == s))
        .cloned()
        .collect();
    bookings.sort_by(|a, b| a.datetime.cmp(&b.datetime));

    Ok(Json(bookings))
}

/// PATCH /api/bookings/:id
pub async fn update_booking(
    State(state): State<Arc<SandboxState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(patch): Json<BookingPatch>,
) -> SandboxResult<Json<Booking>> {
    state.require_role(&headers, Role::Therapist).await?;

    let mut store = state.write().await;
    let booking = store
        .bookings
        .iter_mut()
        .find(|b| b.id == id)
        .ok_or_else(|| SandboxError::NotFound("Booking not found".to_string()))?;

    if let Some(datetime) = patch.datetime {
        booking.datetime = datetime;
    }
    if let Some(status) = patch.status {
        booking.status = status;
    }
    if let Some(notes) = patch.notes {
        booking.notes = Some(notes);
    }

    tracing::info!(booking_id = id, status = %booking.status, "Booking updated");
    Ok(Json(booking.clone()))
}

/// POST /api/sessions
pub async fn create_session(
    State(state): State<Arc<SandboxState>>,
    headers: HeaderMap,
    Json(req): Json<NewSession>,
) -> SandboxResult<Json<Session>> {
    let therapist = state.require_role(&headers, Role::Therapist).await?;

    let mut store = state.write().await;
    require_patient(&store, req.patient_id)?;

    if let Some(booking_id) = req.booking_id {
        let booking = store
            .bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| SandboxError::NotFound("Booking not found".to_string()))?;
        booking.status = BookingStatus::Completed;
    }

    let session = Session {
        id: store.next_id(),
        booking_id: req.booking_id,
        patient_id: req.patient_id,
        therapist_id: req.therapist_id.unwrap_or(therapist.id),
        notes: req.notes,
        outcome: req.outcome,
        session_at: now(),
    };
    store.sessions.push(session.clone());

    tracing::info!(session_id = session.id, patient_id = session.patient_id, "Session recorded");
    Ok(Json(session))
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionParams {
    pub patient_id: Option<i64>,
    pub therapist_id: Option<i64>,
}

/// GET /api/sessions
pub async fn list_sessions(
    State(state): State<Arc<SandboxState>>,
    headers: HeaderMap,
    Query(params): Query<SessionParams>,
) -> SandboxResult<Json<Vec<Session>>> {
    state.require_role(&headers, Role::Therapist).await?;

    let sessions = state
        .read()
        .await
        .sessions
        .iter()
        .filter(|s| params.patient_id.map_or(true, |id| s.patient_id == id))
        .filter(|s| params.therapist_id.map_or(true, |id| s.therapist_id == id))
        .cloned()
        .collect();

    Ok(Json(sessions))
}
