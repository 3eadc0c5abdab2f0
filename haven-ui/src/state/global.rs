//! Global Application State
//!
//! Reactive state for the portal using Leptos signals: the signed-in user,
//! which view is shown, open dialogs and toast messages.

use leptos::*;

use crate::api::{self, ApiError};
use crate::models::{MoodEntry, RiskLevel, Role, User};

pub const MSG_SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";
pub const MSG_LOGIN_REQUIRED: &str = "Please log in first";

/// Top-level page
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Landing,
    Patient,
    Therapist,
}

impl View {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Patient => View::Patient,
            Role::Therapist => View::Therapist,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

/// What to open after a mood entry is saved
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FollowUp {
    None,
    OpenChat,
    OpenBooking,
}

impl FollowUp {
    pub fn for_risk(risk: Option<RiskLevel>) -> Self {
        match risk {
            Some(RiskLevel::Medium) => FollowUp::OpenChat,
            Some(RiskLevel::High) => FollowUp::OpenBooking,
            _ => FollowUp::None,
        }
    }
}

/// Global application state provided to all components
#[derive(Clone, Copy)]
pub struct GlobalState {
    pub user: RwSignal<Option<User>>,
    pub view: RwSignal<View>,
    /// Open auth dialog, if any
    pub auth_modal: RwSignal<Option<AuthMode>>,
    pub chat_open: RwSignal<bool>,
    pub booking_open: RwSignal<bool>,
    /// Health line from the API, `None` while unreachable
    pub server_status: RwSignal<Option<String>>,
    /// Patient mood history, newest first
    pub moods: RwSignal<Vec<MoodEntry>>,
    /// Bumped after every saved entry so analytics and suggestions refetch
    pub mood_revision: RwSignal<u32>,
    pub loading: RwSignal<bool>,
    pub error: RwSignal<Option<String>>,
    pub success: RwSignal<Option<String>>,
}

/// Provide global state to the component tree
pub fn provide_global_state() {
    let state = GlobalState {
        user: create_rw_signal(None),
        view: create_rw_signal(View::Landing),
        auth_modal: create_rw_signal(None),
        chat_open: create_rw_signal(false),
        booking_open: create_rw_signal(false),
        server_status: create_rw_signal(None),
        moods: create_rw_signal(Vec::new()),
        mood_revision: create_rw_signal(0),
        loading: create_rw_signal(false),
        error: create_rw_signal(None),
        success: create_rw_signal(None),
    };

    provide_context(state);
}

pub fn use_global_state() -> GlobalState {
    expect_context::<GlobalState>()
}

impl GlobalState {
    /// Probe the API, then resume a stored session if the token is still valid
    pub async fn restore(self) {
        match api::check_health().await {
            Ok(health) => self
                .server_status
                .set(Some(health.message.unwrap_or(health.status))),
            Err(e) => {
                web_sys::console::warn_1(&format!("Health check failed: {}", e).into());
                self.server_status.set(None);
            }
        }

        if api::get_token().is_none() {
            return;
        }

        self.loading.set(true);
        match api::me().await {
            Ok(user) => self.sign_in(user),
            Err(e) => {
                web_sys::console::warn_1(&format!("Stored token rejected: {}", e).into());
                self.sign_out();
            }
        }
        self.loading.set(false);
    }

    pub fn sign_in(&self, user: User) {
        self.view.set(View::for_role(user.role));
        self.user.set(Some(user));
        self.auth_modal.set(None);
    }

    /// Drop the token and every per-user piece of state
    pub fn sign_out(&self) {
        api::clear_token();
        self.user.set(None);
        self.view.set(View::Landing);
        self.chat_open.set(false);
        self.booking_open.set(false);
        self.moods.set(Vec::new());
    }

    /// Show a failed call; an auth failure also ends the session
    pub fn handle_error(&self, context: &str, error: &ApiError) {
        web_sys::console::error_1(&format!("{}: {}", context, error).into());
        if error.is_unauthorized() {
            self.sign_out();
            self.show_error(MSG_SESSION_EXPIRED);
        } else {
            self.show_error(&format!("{}: {}", context, error));
        }
    }

    pub fn apply_follow_up(&self, follow_up: FollowUp) {
        match follow_up {
            FollowUp::OpenChat => self.chat_open.set(true),
            FollowUp::OpenBooking => self.booking_open.set(true),
            FollowUp::None => {}
        }
    }

    /// Show a success message (auto-clears after timeout)
    pub fn show_success(&self, message: &str) {
        self.success.set(Some(message.to_string()));

        let success_signal = self.success;
        gloo_timers::callback::Timeout::new(3000, move || {
            success_signal.set(None);
        })
        .forget();
    }

    /// Show an error message (auto-clears after timeout)
    pub fn show_error(&self, message: &str) {
        self.error.set(Some(message.to_string()));

        let error_signal = self.error;
        gloo_timers::callback::Timeout::new(5000, move || {
            error_signal.set(None);
        })
        .forget();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_for_role() {
        assert_eq!(View::for_role(Role::Patient), View::Patient);
        assert_eq!(View::for_role(Role::Therapist), View::Therapist);
    }

    #[test]
    fn test_follow_up_for_risk() {
        assert_eq!(FollowUp::for_risk(Some(RiskLevel::Medium)), FollowUp::OpenChat);
        assert_eq!(FollowUp::for_risk(Some(RiskLevel::High)), FollowUp::OpenBooking);
        assert_eq!(FollowUp::for_risk(Some(RiskLevel::Low)), FollowUp::None);
        assert_eq!(FollowUp::for_risk(None), FollowUp::None);
    }
}
