//! Toasts
//!
//! The portal's notices: a green line for success, a red one for errors.
//! Each clears itself after a few seconds or on click.

use leptos::*;

use crate::state::global::use_global_state;

#[component]
pub fn Toast() -> impl IntoView {
    let state = use_global_state();

    view! {
        <div class="fixed bottom-20 right-4 z-50 space-y-2" aria-live="polite">
            {move || state.success.get().map(|text| view! {
                <Notice text=text tone="bg-green-600" on_dismiss=Callback::new(move |_| state.success.set(None)) />
            })}
            {move || state.error.get().map(|text| view! {
                <Notice text=text tone="bg-red-600" on_dismiss=Callback::new(move |_| state.error.set(None)) />
            })}
        </div>
    }
}

#[component]
fn Notice(text: String, tone: &'static str, on_dismiss: Callback<()>) -> impl IntoView {
    view! {
        <button
            role="status"
            on:click=move |_| on_dismiss.call(())
            class=format!("block max-w-sm text-left {} text-white text-sm px-4 py-3 rounded-lg shadow-lg", tone)
        >
            {text}
        </button>
    }
}
