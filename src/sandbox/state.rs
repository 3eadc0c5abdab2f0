//! Sandbox State
//!
//! The whole portal backend held in memory behind one `RwLock`. Ids are
//! allocated from a single counter, tokens are random UUIDs.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::{NaiveDateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use super::error::{SandboxError, SandboxResult};
use crate::config::SandboxConfig;
use crate::models::{Booking, ChatMessage, MoodEntry, Role, Session, User};

/// A registered account
#[derive(Debug, Clone)]
pub struct Account {
    pub user: User,
    password_hash: String,
}

/// A chat message and its owner
#[derive(Debug, Clone)]
pub struct ChatRecord {
    pub user_id: i64,
    pub message: ChatMessage,
}

/// In-memory tables
#[derive(Debug, Default)]
pub struct Store {
    next_id: i64,
    pub accounts: Vec<Account>,
    tokens: HashMap<String, i64>,
    pub moods: Vec<MoodEntry>,
    pub chats: Vec<ChatRecord>,
    pub bookings: Vec<Booking>,
    pub sessions: Vec<Session>,
}

impl Store {
    pub fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn user(&self, id: i64) -> Option<&User> {
        self.accounts.iter().find(|a| a.user.id == id).map(|a| &a.user)
    }

    pub fn account_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|a| a.user.email.eq_ignore_ascii_case(email))
    }

    pub fn issue_token(&mut self, user_id: i64) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        self.tokens.insert(token.clone(), user_id);
        token
    }

    /// Mood entries of one user, newest first
    pub fn moods_for(&self, user_id: i64) -> Vec<MoodEntry> {
        let mut moods: Vec<MoodEntry> = self
            .moods
            .iter()
            .filter(|m| m.user_id == Some(user_id))
            .cloned()
            .collect();
        moods.sort_by(|a, b| b.date.cmp(&a.date));
        moods
    }

    pub fn first_therapist(&self) -> Option<&User> {
        self.accounts
            .iter()
            .map(|a| &a.user)
            .find(|u| u.role == Role::Therapist)
    }

    /// Remove an account and everything it owns
    pub fn purge_user(&mut self, user_id: i64) {
        self.moods.retain(|m| m.user_id != Some(user_id));
        self.chats.retain(|c| c.user_id != user_id);
        self.bookings
            .retain(|b| b.patient_id != user_id && b.therapist_id != user_id);
        self.sessions
            .retain(|s| s.patient_id != user_id && s.therapist_id != user_id);
        self.tokens.retain(|_, owner| *owner != user_id);
        self.accounts.retain(|a| a.user.id != user_id);
    }
}

/// Shared sandbox state for all handlers
pub struct SandboxState {
    store: RwLock<Store>,
    pub config: Arc<SandboxConfig>,
    pub start_time: Instant,
}

impl SandboxState {
    pub fn new(config: SandboxConfig) -> Self {
        Self {
            store: RwLock::new(Store::default()),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    pub async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, Store> {
        self.store.read().await
    }

    pub async fn write(&self) -> tokio::sync::RwLockWriteGuard<'_, Store> {
        self.store.write().await
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Create an account, rejecting duplicate emails
    pub async fn create_account(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> SandboxResult<User> {
        let password_hash = hash_password(password)?;

        let mut store = self.write().await;
        if store.account_by_email(email).is_some() {
            return Err(SandboxError::BadRequest("Email already registered".to_string()));
        }

        let user = User {
            id: store.next_id(),
            name: name.to_string(),
            email: email.to_string(),
            role,
        };
        store.accounts.push(Account {
            user: user.clone(),
            password_hash,
        });

        tracing::info!(user_id = user.id, role = %user.role, "Account registered");
        Ok(user)
    }

    /// Check credentials and issue a new token
    pub async fn login(&self, email: &str, password: &str) -> SandboxResult<String> {
        let account = self.read().await.account_by_email(email).cloned();
        let invalid = || SandboxError::Unauthorized("Invalid credentials".to_string());

        let account = account.ok_or_else(invalid)?;
        if !verify_password(password, &account.password_hash)? {
            return Err(invalid());
        }

        let token = self.write().await.issue_token(account.user.id);
        tracing::info!(user_id = account.user.id, "Login succeeded");
        Ok(token)
    }

    /// Whether `password` belongs to `user_id`
    pub async fn check_password(&self, user_id: i64, password: &str) -> SandboxResult<bool> {
        let hash = self
            .read()
            .await
            .accounts
            .iter()
            .find(|a| a.user.id == user_id)
            .map(|a| a.password_hash.clone());

        match hash {
            Some(hash) => verify_password(password, &hash),
            None => Ok(false),
        }
    }

    /// Resolve the bearer token of a request to its user
    pub async fn authenticate(&self, headers: &HeaderMap) -> SandboxResult<User> {
        let header = headers
            .get(AUTHORIZATION)
            .ok_or_else(|| SandboxError::Unauthorized("Missing authorization header".to_string()))?
            .to_str()
            .map_err(|_| SandboxError::Unauthorized("Invalid auth header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| SandboxError::Unauthorized("Invalid auth header".to_string()))?;

        let store = self.read().await;
        let user_id = store
            .tokens
            .get(token.trim())
            .copied()
            .ok_or_else(|| SandboxError::Unauthorized("Invalid token".to_string()))?;

        store
            .user(user_id)
            .cloned()
            .ok_or_else(|| SandboxError::Unauthorized("User not found".to_string()))
    }

    /// Authenticate and require a role
    pub async fn require_role(&self, headers: &HeaderMap, role: Role) -> SandboxResult<User> {
        let user = self.authenticate(headers).await?;
        if user.role != role {
            return Err(SandboxError::forbidden());
        }
        Ok(user)
    }
}

/// Current server time
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn hasher() -> SandboxResult<Argon2<'static>> {
    // Light parameters, accounts here are throwaway.
    let params = Params::new(8 * 1024, 1, 1, None)
        .map_err(|e| SandboxError::Internal(format!("Invalid hash parameters: {}", e)))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

fn hash_password(password: &str) -> SandboxResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| SandboxError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> SandboxResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| SandboxError::Internal(format!("Invalid password hash: {}", e)))?;
    Ok(hasher()?.verify_password(password.as_bytes(), &parsed).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_accounts_and_tokens() {
        let state = SandboxState::new(SandboxConfig::default());
        let user = state
            .create_account("Ana", "ana@example.com", "secret1", Role::Patient)
            .await
            .unwrap();

        let dup = state
            .create_account("Ana", "ANA@example.com", "secret1", Role::Patient)
            .await
            .unwrap_err();
        assert_eq!(dup.to_string(), "Email already registered");

        assert!(state.login("ana@example.com", "wrong!").await.is_err());
        let token = state.login("ana@example.com", "secret1").await.unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, format!("Bearer {}", token).parse().unwrap());
        assert_eq!(state.authenticate(&headers).await.unwrap(), user);

        let err = state.require_role(&headers, Role::Therapist).await.unwrap_err();
        assert_eq!(err.to_string(), "Forbidden");
    }

    #[tokio::test]
    async fn test_purge_removes_tokens() {
        let state = SandboxState::new(SandboxConfig::default());
        let user = state
            .create_account("Ben", "ben@example.com", "secret1", Role::Patient)
            .await
            .unwrap();
        let token = state.login("ben@example.com", "secret1").await.unwrap();

        state.write().await.purge_user(user.id);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, format!("Bearer {}", token).parse().unwrap());
        assert!(matches!(
            state.authenticate(&headers).await,
            Err(SandboxError::Unauthorized(_))
        ));
    }
}
