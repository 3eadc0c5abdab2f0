//! Account, Export and Health Routes
//!
//! - GET /api/health - Liveness with server time
//! - GET /api/export/csv - Mood and chat history as CSV
//! - DELETE /api/account - Delete the caller and everything they own

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::models::{ChatMessage, ChatSender, DeleteAccountRequest, HealthStatus, MoodEntry};
use crate::sandbox::error::{SandboxError, SandboxResult};
use crate::sandbox::state::{now, SandboxState};

/// GET /api/health
pub async fn health(State(state): State<Arc<SandboxState>>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        message: Some(format!(
            "Portal sandbox v{} up {}s",
            env!("CARGO_PKG_VERSION"),
            state.uptime_seconds()
        )),
        time: Some(now().format("%Y-%m-%dT%H:%M:%S").to_string()),
    })
}

fn iso(dt: &chrono::NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

fn one_line(text: &str) -> String {
    text.replace('\n', " ")
}

/// Two CSV sections: moods oldest first, then chat messages
pub fn render_export(moods: &[MoodEntry], chats: &[ChatMessage]) -> Result<String, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(["type", "id", "date", "mood_value", "risk", "text"])?;
    let mut ordered: Vec<&MoodEntry> = moods.iter().collect();
    ordered.sort_by_key(|m| m.date);
    for m in ordered {
        writer.write_record([
            "mood".to_string(),
            m.id.to_string(),
            iso(&m.date),
            m.mood_value.to_string(),
            m.risk.map(|r| r.to_string()).unwrap_or_default(),
            one_line(m.text.as_deref().unwrap_or_default()),
        ])?;
    }

    writer.write_record(["type", "id", "date", "sender", "text"])?;
    let mut ordered: Vec<&ChatMessage> = chats.iter().collect();
    ordered.sort_by_key(|c| c.created_at);
    for c in ordered {
        let sender = match c.sender {
            ChatSender::User => "user",
            ChatSender::Bot => "bot",
        };
        writer.write_record([
            "chat".to_string(),
            c.id.to_string(),
            iso(&c.created_at),
            sender.to_string(),
            one_line(&c.text),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// GET /api/export/csv
pub async fn export_csv(
    State(state): State<Arc<SandboxState>>,
    headers: HeaderMap,
) -> SandboxResult<impl IntoResponse> {
    let user = state.authenticate(&headers).await?;

    let (moods, chats) = {
        let store = state.read().await;
        let chats: Vec<ChatMessage> = store
            .chats
            .iter()
            .filter(|c| c.user_id == user.id)
            .map(|c| c.message.clone())
            .collect();
        (store.moods_for(user.id), chats)
    };

    let body = render_export(&moods, &chats)
        .map_err(|e| SandboxError::Internal(format!("Export failed: {}", e)))?;

    tracing::info!(user_id = user.id, moods = moods.len(), chats = chats.len(), "Export generated");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=mh_export_{}.csv", user.id),
            ),
        ],
        body,
    ))
}

/// DELETE /api/account
pub async fn delete_account(
    State(state): State<Arc<SandboxState>>,
    headers: HeaderMap,
    Json(req): Json<DeleteAccountRequest>,
) -> SandboxResult<StatusCode> {
    let user = state.authenticate(&headers).await?;

    if !state.check_password(user.id, &req.password).await? {
        return Err(SandboxError::Unauthorized("Invalid password".to_string()));
    }

    state.write().await.purge_user(user.id);

    tracing::info!(user_id = user.id, "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskLevel;
    use chrono::NaiveDate;

    #[test]
    fn test_export_sections() {
        let day = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
        let moods = vec![MoodEntry {
            id: 3,
            user_id: Some(1),
            date: day.and_hms_opt(9, 0, 0).unwrap(),
            text: Some("rough,\nday".to_string()),
            mood_value: 2,
            risk: Some(RiskLevel::High),
            sentiment: None,
        }];
        let chats = vec![ChatMessage {
            id: 4,
            sender: ChatSender::Bot,
            text: "hello".to_string(),
            created_at: day.and_hms_opt(9, 5, 0).unwrap(),
        }];

        let csv = render_export(&moods, &chats).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "type,id,date,mood_value,risk,text",
                "mood,3,2024-04-02T09:00:00,2,HIGH,\"rough, day\"",
                "type,id,date,sender,text",
                "chat,4,2024-04-02T09:05:00,bot,hello",
            ]
        );
    }
}
