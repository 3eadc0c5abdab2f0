//! Therapist Routes
//!
//! - GET /api/therapist/patients - Every patient with latest mood and averages
//! - GET /api/therapist/patient/:id - One patient with moods, sessions and bookings

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use std::sync::Arc;

use crate::analytics::summarize;
use crate::models::{PatientDetail, PatientSummary, Role};
use crate::sandbox::error::{SandboxError, SandboxResult};
use crate::sandbox::state::{now, SandboxState};

/// GET /api/therapist/patients
pub async fn list_patients(
    State(state): State<Arc<SandboxState>>,
    headers: HeaderMap,
) -> SandboxResult<Json<Vec<PatientSummary>>> {
    state.require_role(&headers, Role::Therapist).await?;

    let store = state.read().await;
    let today = now();
    let patients = store
        .accounts
        .iter()
        .map(|a| &a.user)
        .filter(|u| u.role == Role::Patient)
        .map(|patient| {
            let moods = store.moods_for(patient.id);
            let latest = moods.first();
            let summary = summarize(&moods, today);
            PatientSummary {
                id: patient.id,
                name: patient.name.clone(),
                email: patient.email.clone(),
                latest_mood_sentiment: latest.and_then(|m| m.sentiment),
                latest_mood_risk: latest.and_then(|m| m.risk),
                avg_7_days: summary.avg_7_days,
                avg_30_days: summary.avg_30_days,
            }
        })
        .collect();

    Ok(Json(patients))
}

/// GET /api/therapist/patient/:id
pub async fn patient_detail(
    State(state): State<Arc<SandboxState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> SandboxResult<Json<PatientDetail>> {
    state.require_role(&headers, Role::Therapist).await?;

    let store = state.read().await;
    let patient = store
        .user(id)
        .filter(|u| u.role == Role::Patient)
        .ok_or_else(|| SandboxError::NotFound("Patient not found".to_string()))?;

    Ok(Json(PatientDetail {
        id: patient.id,
        name: patient.name.clone(),
        email: patient.email.clone(),
        moods: store.moods_for(id),
        sessions: store
            .sessions
            .iter()
            .filter(|s| s.patient_id == id)
            .cloned()
            .collect(),
        bookings: store
            .bookings
            .iter()
            .filter(|b| b.patient_id == id)
            .cloned()
            .collect(),
    }))
}
