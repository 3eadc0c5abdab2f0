//! Mood Routes
//!
//! - POST /api/mood - Store a journal entry
//! - GET /api/mood - Entries of the caller, newest first
//! - GET /api/mood/analytics - 7- and 30-day averages
//! - GET /api/analytics/chart-data?range=N - Per-day buckets

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::analytics::{daily_chart, risk_for_slider, summarize, MAX_CHART_DAYS};
use crate::models::{ChartPoint, MoodAnalytics, MoodEntry, NewMoodEntry};
use crate::sandbox::error::{SandboxError, SandboxResult};
use crate::sandbox::state::{now, SandboxState};
use crate::validation::validate_mood_value;

/// Mood value assumed when an entry carries only text
const NEUTRAL_MOOD: u8 = 5;

/// Entries returned by the list endpoint
const MOOD_LIST_LIMIT: usize = 500;

/// POST /api/mood
pub async fn create_mood(
    State(state): State<Arc<SandboxState>>,
    headers: HeaderMap,
    Json(req): Json<NewMoodEntry>,
) -> SandboxResult<Json<MoodEntry>> {
    let user = state.authenticate(&headers).await?;

    let mood_value = req.mood_value.unwrap_or(NEUTRAL_MOOD);
    validate_mood_value(mood_value).map_err(|e| SandboxError::Unprocessable(e.to_string()))?;

    let text = req.text.trim();
    let mut store = state.write().await;
    let entry = MoodEntry {
        id: store.next_id(),
        user_id: Some(user.id),
        date: req.date.unwrap_or_else(now),
        text: if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        },
        mood_value,
        risk: Some(risk_for_slider(mood_value)),
        sentiment: None,
    };
    store.moods.push(entry.clone());

    tracing::info!(user_id = user.id, mood_id = entry.id, risk = ?entry.risk, "Mood entry stored");
    Ok(Json(entry))
}

/// GET /api/mood
pub async fn list_moods(
    State(state): State<Arc<SandboxState>>,
    headers: HeaderMap,
) -> SandboxResult<Json<Vec<MoodEntry>>> {
    let user = state.authenticate(&headers).await?;
    let mut moods = state.read().await.moods_for(user.id);
    moods.truncate(MOOD_LIST_LIMIT);
    Ok(Json(moods))
}

/// GET /api/mood/analytics
pub async fn mood_analytics(
    State(state): State<Arc<SandboxState>>,
    headers: HeaderMap,
) -> SandboxResult<Json<MoodAnalytics>> {
    let user = state.authenticate(&headers).await?;
    let moods = state.read().await.moods_for(user.id);
    Ok(Json(summarize(&moods, now())))
}

#[derive(Debug, Deserialize)]
pub struct ChartParams {
    #[serde(default = "default_range")]
    pub range: u32,
}

fn default_range() -> u32 {
    7
}

/// GET /api/analytics/chart-data
pub async fn chart_data(
    State(state): State<Arc<SandboxState>>,
    headers: HeaderMap,
    Query(params): Query<ChartParams>,
) -> SandboxResult<Json<Vec<ChartPoint>>> {
    let user = state.authenticate(&headers).await?;

    if !(1..=MAX_CHART_DAYS).contains(&params.range) {
        return Err(SandboxError::Unprocessable(format!(
            "range must be between 1 and {}",
            MAX_CHART_DAYS
        )));
    }

    let moods = state.read().await.moods_for(user.id);
    Ok(Json(daily_chart(&moods, now(), params.range)))
}
