//! Auth Modal
//!
//! Login and registration dialog. Registration signs the new account in
//! straight away; if that second step fails the dialog switches to login.

use std::sync::OnceLock;

use leptos::*;
use regex::Regex;

use crate::api;
use crate::components::Modal;
use crate::models::Role;
use crate::state::global::{use_global_state, AuthMode, GlobalState};

const MIN_PASSWORD_LEN: usize = 6;
const MIN_NAME_LEN: usize = 2;

const MSG_NAME: &str = "Please enter your full name.";
const MSG_EMAIL: &str = "Please enter a valid email address.";
const MSG_PASSWORD: &str = "Password must be at least 6 characters.";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"))
}

/// Client-side checks before any request
fn check_form(mode: AuthMode, name: &str, email: &str, password: &str) -> Result<(), &'static str> {
    if mode == AuthMode::Register && name.trim().chars().count() < MIN_NAME_LEN {
        return Err(MSG_NAME);
    }
    if !email_regex().is_match(email.trim()) {
        return Err(MSG_EMAIL);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(MSG_PASSWORD);
    }
    Ok(())
}

#[component]
pub fn AuthModal() -> impl IntoView {
    let state = use_global_state();

    move || {
        state.auth_modal.get().map(|mode| {
            let title = match mode {
                AuthMode::Login => "Login",
                AuthMode::Register => "Create account",
            };
            view! {
                <Modal title=title on_close=Callback::new(move |_| state.auth_modal.set(None))>
                    <AuthForm mode=mode />
                </Modal>
            }
        })
    }
}

#[component]
fn AuthForm(mode: AuthMode) -> impl IntoView {
    let state = use_global_state();

    let (name, set_name) = create_signal(String::new());
    let (email, set_email) = create_signal(String::new());
    let (password, set_password) = create_signal(String::new());
    let (role, set_role) = create_signal(Role::Patient);
    let (submitting, set_submitting) = create_signal(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let (n, e, p, r) = (name.get(), email.get(), password.get(), role.get());
        if let Err(msg) = check_form(mode, &n, &e, &p) {
            state.show_error(msg);
            return;
        }

        set_submitting.set(true);
        spawn_local(async move {
            match mode {
                AuthMode::Login => {
                    sign_in(state, &e, &p).await;
                }
                AuthMode::Register => match api::register(n.trim(), e.trim(), &p, r).await {
                    Ok(_) => {
                        if !sign_in(state, &e, &p).await {
                            state.auth_modal.set(Some(AuthMode::Login));
                            state.show_error("Registered, but automatic login failed. Please log in.");
                        }
                    }
                    Err(err) => state.show_error(&format!("Registration failed: {}", err)),
                },
            }
            set_submitting.set(false);
        });
    };

    view! {
        <form on:submit=on_submit class="space-y-4">
            {(mode == AuthMode::Register).then(|| view! {
                <TextField label="Name" kind="text" value=name set_value=set_name />
            })}
            <TextField label="Email" kind="email" value=email set_value=set_email />
            <TextField label="Password" kind="password" value=password set_value=set_password />

            {(mode == AuthMode::Register).then(|| view! {
                <div>
                    <label class="block text-sm text-gray-400 mb-2">"I am a"</label>
                    <select
                        on:change=move |ev| {
                            let role = if event_target_value(&ev) == "therapist" {
                                Role::Therapist
                            } else {
                                Role::Patient
                            };
                            set_role.set(role);
                        }
                        class="w-full bg-gray-700 rounded-lg px-4 py-3 border border-gray-600"
                    >
                        <option value="patient">"Patient"</option>
                        <option value="therapist">"Therapist"</option>
                    </select>
                </div>
            })}

            <button
                type="submit"
                disabled=move || submitting.get()
                class="w-full bg-primary-600 hover:bg-primary-700 disabled:bg-gray-600 rounded-lg py-3 font-semibold"
            >
                {move || match (submitting.get(), mode) {
                    (true, _) => "Please wait...",
                    (false, AuthMode::Login) => "Login",
                    (false, AuthMode::Register) => "Register",
                }}
            </button>

            <p class="text-sm text-gray-400 text-center">
                {match mode {
                    AuthMode::Login => view! {
                        "No account? "
                        <a href="#" class="text-primary-400"
                            on:click=move |ev| { ev.prevent_default(); state.auth_modal.set(Some(AuthMode::Register)); }>
                            "Register"
                        </a>
                    }.into_view(),
                    AuthMode::Register => view! {
                        "Already registered? "
                        <a href="#" class="text-primary-400"
                            on:click=move |ev| { ev.prevent_default(); state.auth_modal.set(Some(AuthMode::Login)); }>
                            "Login"
                        </a>
                    }.into_view(),
                }}
            </p>
        </form>
    }
}

/// Log in, load the account and switch view; false on any failure
async fn sign_in(state: GlobalState, email: &str, password: &str) -> bool {
    if let Err(e) = api::login(email.trim(), password).await {
        state.show_error(&format!("Login failed: {}", e));
        return false;
    }
    match api::me().await {
        Ok(user) => {
            state.show_success(&format!("Welcome, {}", user.name));
            state.sign_in(user);
            true
        }
        Err(e) => {
            state.handle_error("Could not load your account", &e);
            false
        }
    }
}

#[component]
fn TextField(
    label: &'static str,
    kind: &'static str,
    value: ReadSignal<String>,
    set_value: WriteSignal<String>,
) -> impl IntoView {
    view! {
        <div>
            <label class="block text-sm text-gray-400 mb-2">{label}</label>
            <input
                type=kind
                prop:value=move || value.get()
                on:input=move |ev| set_value.set(event_target_value(&ev))
                class="w-full bg-gray-700 rounded-lg px-4 py-3 border border-gray-600 focus:border-primary-500 focus:outline-none"
            />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_form() {
        assert!(check_form(AuthMode::Login, "", "ana@example.com", "secret1").is_ok());
        assert!(check_form(AuthMode::Register, "Ana", " a@b.c ", "secret1").is_ok());
        assert_eq!(check_form(AuthMode::Register, " ", "ana@example.com", "secret1"), Err(MSG_NAME));
        assert_eq!(check_form(AuthMode::Login, "", "ana", "secret1"), Err(MSG_EMAIL));
        assert_eq!(check_form(AuthMode::Login, "", "ana@example.com", "123"), Err(MSG_PASSWORD));
    }

    #[test]
    fn test_check_form_matches_native_rules() {
        for email in ["@b.c", "a b@c.d", "a@b.", "a@b", "a@@b.c"] {
            assert_eq!(
                check_form(AuthMode::Register, "Ana", email, "secret1"),
                Err(MSG_EMAIL),
                "{email}"
            );
        }
        assert_eq!(check_form(AuthMode::Register, "A", "a@b.c", "secret1"), Err(MSG_NAME));
        assert_eq!(check_form(AuthMode::Register, " A ", "a@b.c", "secret1"), Err(MSG_NAME));
        assert!(check_form(AuthMode::Login, "A", "a@b.c", "secret1").is_ok());
    }
}
