//! Booking Form
//!
//! Patient session request. A rejected request falls back to automatic
//! assignment of the first available therapist.

use leptos::*;

use crate::api;
use crate::models::{parse_local_datetime, NewBooking};
use crate::state::global::use_global_state;

#[component]
pub fn BookingForm() -> impl IntoView {
    let state = use_global_state();

    let (when, set_when) = create_signal(String::new());
    let (notes, set_notes) = create_signal(String::new());
    let (submitting, set_submitting) = create_signal(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let Some(datetime) = parse_local_datetime(&when.get()) else {
            state.show_error("Please pick a date and time");
            return;
        };
        let notes = notes.get().trim().to_string();
        let booking = NewBooking {
            patient_id: None,
            datetime,
            notes: (!notes.is_empty()).then_some(notes),
        };

        set_submitting.set(true);
        spawn_local(async move {
            let result = match api::create_booking(&booking).await {
                Err(e) if !e.is_unauthorized() => {
                    web_sys::console::warn_1(&format!("Booking rejected ({}), trying auto-assign", e).into());
                    api::auto_booking().await
                }
                other => other,
            };
            match result {
                Ok(b) => {
                    state.show_success(&format!(
                        "Session requested for {}",
                        b.datetime.format("%Y-%m-%d %H:%M")
                    ));
                    state.booking_open.set(false);
                    set_when.set(String::new());
                    set_notes.set(String::new());
                }
                Err(e) => state.handle_error("Could not book a session", &e),
            }
            set_submitting.set(false);
        });
    };

    view! {
        <form on:submit=on_submit class="space-y-4">
            <div class="flex items-center justify-between">
                <h2 class="text-xl font-semibold">"Book a session"</h2>
                <button type="button" on:click=move |_| state.booking_open.set(false)
                    class="text-gray-400 hover:text-white">
                    "Close"
                </button>
            </div>
            <input
                type="datetime-local"
                prop:value=move || when.get()
                on:input=move |ev| set_when.set(event_target_value(&ev))
                class="w-full bg-gray-700 rounded-lg px-4 py-3 border border-gray-600"
            />
            <textarea
                rows="2"
                placeholder="Anything your therapist should know (optional)"
                prop:value=move || notes.get()
                on:input=move |ev| set_notes.set(event_target_value(&ev))
                class="w-full bg-gray-700 rounded-lg px-4 py-3 border border-gray-600"
            />
            <button type="submit" disabled=move || submitting.get()
                class="w-full bg-primary-600 hover:bg-primary-700 disabled:bg-gray-600 rounded-lg py-3 font-semibold">
                {move || if submitting.get() { "Booking..." } else { "Request session" }}
            </button>
        </form>
    }
}
