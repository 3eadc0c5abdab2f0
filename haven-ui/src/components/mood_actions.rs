//! Mood Actions Bar
//!
//! Shortcuts from the patient page to the support chat and booking.

use leptos::*;

use crate::state::global::use_global_state;

#[component]
pub fn MoodActionsBar() -> impl IntoView {
    let state = use_global_state();

    view! {
        <div class="flex flex-wrap gap-3">
            <ActionButton
                label="Talk to support"
                active=Signal::derive(move || state.chat_open.get())
                on_click=move |_| state.chat_open.update(|open| *open = !*open)
            />
            <ActionButton
                label="Book a session"
                active=Signal::derive(move || state.booking_open.get())
                on_click=move |_| state.booking_open.update(|open| *open = !*open)
            />
        </div>
    }
}

#[component]
fn ActionButton(
    label: &'static str,
    active: Signal<bool>,
    on_click: impl Fn(web_sys::MouseEvent) + 'static,
) -> impl IntoView {
    view! {
        <button
            type="button"
            on:click=on_click
            class=move || {
                let base = "px-4 py-2 rounded-lg text-sm font-medium transition-colors";
                if active.get() {
                    format!("{} bg-primary-600 text-white", base)
                } else {
                    format!("{} bg-gray-700 text-gray-300 hover:bg-gray-600", base)
                }
            }
        >
            {label}
        </button>
    }
}
