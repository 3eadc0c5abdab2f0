//! Mood Entry Component
//!
//! Journal text plus a 1-10 slider. The saved entry's risk decides what
//! opens next: MEDIUM opens the chat, HIGH opens booking.

use leptos::*;

use crate::api;
use crate::models::{risk_for_slider, NewMoodEntry};
use crate::state::global::{use_global_state, FollowUp, MSG_LOGIN_REQUIRED};

const DEFAULT_MOOD: u8 = 5;

#[component]
pub fn MoodEntryForm() -> impl IntoView {
    let state = use_global_state();

    let (text, set_text) = create_signal(String::new());
    let (value, set_value) = create_signal(DEFAULT_MOOD);
    let (submitting, set_submitting) = create_signal(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        if api::get_token().is_none() {
            state.show_error(MSG_LOGIN_REQUIRED);
            return;
        }
        let body = text.get();
        if body.trim().is_empty() {
            state.show_error("Please write a few words about how you feel");
            return;
        }

        let entry = NewMoodEntry {
            text: body.trim().to_string(),
            mood_value: value.get(),
        };

        set_submitting.set(true);
        spawn_local(async move {
            match api::create_mood(&entry).await {
                Ok(saved) => {
                    set_text.set(String::new());
                    set_value.set(DEFAULT_MOOD);
                    let label = saved.risk.map(|r| r.label()).unwrap_or("saved");
                    state.show_success(&format!("Mood saved ({})", label));
                    state.apply_follow_up(FollowUp::for_risk(saved.risk));
                    state.moods.update(|moods| moods.insert(0, saved));
                    state.mood_revision.update(|r| *r += 1);
                }
                Err(e) => state.handle_error("Could not save your mood", &e),
            }
            set_submitting.set(false);
        });
    };

    view! {
        <form on:submit=on_submit class="space-y-4">
            <textarea
                rows="4"
                placeholder="How are you feeling today?"
                prop:value=move || text.get()
                on:input=move |ev| set_text.set(event_target_value(&ev))
                class="w-full bg-gray-700 rounded-lg px-4 py-3 border border-gray-600 focus:border-primary-500 focus:outline-none"
            />

            <div>
                <label class="block text-sm text-gray-400 mb-2">
                    "Mood: "
                    <span class="text-white font-medium">{move || value.get()}</span>
                    <span class="ml-2 text-xs text-gray-500">
                        {move || risk_for_slider(value.get()).label()}
                    </span>
                </label>
                <input
                    type="range"
                    min="1"
                    max="10"
                    step="1"
                    prop:value=move || value.get().to_string()
                    on:input=move |ev| {
                        if let Ok(v) = event_target_value(&ev).parse() {
                            set_value.set(v);
                        }
                    }
                    class="w-full"
                />
            </div>

            <button
                type="submit"
                disabled=move || submitting.get()
                class="w-full bg-primary-600 hover:bg-primary-700 disabled:bg-gray-600
                       disabled:cursor-not-allowed rounded-lg py-3 font-semibold
                       transition-colors flex items-center justify-center space-x-2"
            >
                {move || if submitting.get() {
                    view! {
                        <div class="loading-spinner w-5 h-5" />
                        <span>"Saving..."</span>
                    }.into_view()
                } else {
                    view! { <span>"Save entry"</span> }.into_view()
                }}
            </button>
        </form>
    }
}
