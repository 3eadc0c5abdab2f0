//! Chat and Recommendation Routes
//!
//! - POST /api/chat - Store a message and answer it
//! - GET /api/chat/history - Conversation of the caller, oldest first
//! - GET /api/recommendations - Self-help suggestions with their ranking context

use axum::{extract::State, http::HeaderMap, Json};
use std::sync::Arc;

use crate::analytics::{latest_entry, summarize};
use crate::models::{
    ChatMessage, ChatReply, ChatRequest, ChatSender, Recommendation, RecommendationContext,
    RecommendationPayload, RiskLevel,
};
use crate::sandbox::error::{SandboxError, SandboxResult};
use crate::sandbox::state::{now, ChatRecord, SandboxState};

const ACKNOWLEDGEMENT: &str =
    "I hear you. Can you say a bit more about how that made you feel? I'm listening.";

const MAX_RECOMMENDATIONS: usize = 12;

/// (id, title, text)
const POOL: [(&str, &str, &str); 12] = [
    ("breathing", "4-4-6 Breathing", "Breathe in for 4 seconds, hold for 4, breathe out for 6. Repeat five times."),
    ("grounding", "Grounding Exercise", "Name 5 things you see, 4 you can touch, 3 you hear, 2 you smell and 1 you taste."),
    ("short_walk", "Take a Short Walk", "Ten to fifteen minutes outside, paying attention to your steps and surroundings."),
    ("seek_professional", "Consider Professional Support", "If these feelings persist or get in the way of daily life, book a session with a therapist."),
    ("tiny_task", "Break Tasks Into Tiny Steps", "Pick one small next step and give it ten minutes. Small wins add up."),
    ("connect", "Reach Out to Someone", "Send a short message to someone you trust or plan a quick call."),
    ("sleep_hygiene", "Improve Your Sleep Routine", "Wind down for 30 minutes before bed with dim lights and no screens."),
    ("daily_routine", "Create a Small Daily Routine", "A short morning routine and an evening wind-down help keep mood steady."),
    ("journaling", "Structured Journaling", "Write what happened, what you felt and one small next step."),
    ("gratitude", "Gratitude Listing", "Write down three specific things you are grateful for today."),
    ("mindful", "Short Mindfulness", "Sit quietly for a few minutes and notice your breath without judging your thoughts."),
    ("box_breathing", "Box Breathing", "Inhale 4s, hold 4s, exhale 4s, hold 4s. Keep going for three to five minutes."),
];

/// POST /api/chat
pub async fn post_chat(
    State(state): State<Arc<SandboxState>>,
    headers: HeaderMap,
    Json(req): Json<ChatRequest>,
) -> SandboxResult<Json<ChatReply>> {
    let user = state.authenticate(&headers).await?;

    let text = req.message.trim();
    if text.is_empty() {
        return Err(SandboxError::Unprocessable("Message must not be empty".to_string()));
    }

    let mut store = state.write().await;
    for (sender, body) in [(ChatSender::User, text), (ChatSender::Bot, ACKNOWLEDGEMENT)] {
        let message = ChatMessage {
            id: store.next_id(),
            sender,
            text: body.to_string(),
            created_at: now(),
        };
        store.chats.push(ChatRecord {
            user_id: user.id,
            message,
        });
    }

    Ok(Json(ChatReply {
        reply: ACKNOWLEDGEMENT.to_string(),
        escalate: false,
        reason: None,
        response_id: Some("fallback_emp".to_string()),
    }))
}

/// GET /api/chat/history
pub async fn chat_history(
    State(state): State<Arc<SandboxState>>,
    headers: HeaderMap,
) -> SandboxResult<Json<Vec<ChatMessage>>> {
    let user = state.authenticate(&headers).await?;
    let history = state
        .read()
        .await
        .chats
        .iter()
        .filter(|c| c.user_id == user.id)
        .map(|c| c.message.clone())
        .collect();
    Ok(Json(history))
}

/// GET /api/recommendations
pub async fn recommendations(
    State(state): State<Arc<SandboxState>>,
    headers: HeaderMap,
) -> SandboxResult<Json<RecommendationPayload>> {
    let user = state.authenticate(&headers).await?;
    let moods = state.read().await.moods_for(user.id);

    let latest = latest_entry(&moods);
    let summary = summarize(&moods, now());
    let context = RecommendationContext {
        latest_mood_value: latest.map(|m| m.mood_value),
        latest_risk: latest.and_then(|m| m.risk),
        avg_7_days: summary.avg_7_days,
        avg_30_days: summary.avg_30_days,
    };

    let recommendations = rank(&context);
    Ok(Json(RecommendationPayload::WithContext {
        context,
        recommendations,
    }))
}

/// Priority items for the context first, then the rest of the pool
fn rank(context: &RecommendationContext) -> Vec<Recommendation> {
    let priority: &[&str] = if context.latest_risk == Some(RiskLevel::High) {
        &["breathing", "seek_professional", "grounding", "short_walk"]
    } else {
        match context.avg_7_days {
            Some(avg) if avg <= 4.0 => &["daily_routine", "sleep_hygiene", "tiny_task", "connect"],
            Some(avg) if avg <= 6.0 => &["grounding", "breathing", "short_walk", "journaling"],
            _ => &[],
        }
    };

    let first = POOL.iter().filter(|(id, _, _)| priority.contains(id));
    let rest = POOL.iter().filter(|(id, _, _)| !priority.contains(id));

    first
        .chain(rest)
        .take(MAX_RECOMMENDATIONS)
        .map(|(id, title, text)| Recommendation {
            id: Some(id.to_string()),
            title: title.to_string(),
            text: text.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_risk_puts_professional_support_first() {
        let context = RecommendationContext {
            latest_risk: Some(RiskLevel::High),
            ..Default::default()
        };
        let recs = rank(&context);
        assert_eq!(recs.len(), MAX_RECOMMENDATIONS);
        let top: Vec<_> = recs.iter().take(4).filter_map(|r| r.id.as_deref()).collect();
        assert!(top.contains(&"seek_professional"));
    }

    #[test]
    fn test_low_average_prefers_routine() {
        let context = RecommendationContext {
            avg_7_days: Some(3.5),
            ..Default::default()
        };
        assert_eq!(rank(&context)[0].id.as_deref(), Some("tiny_task"));

        let neutral = rank(&RecommendationContext::default());
        assert_eq!(neutral[0].id.as_deref(), Some("breathing"));
    }
}
