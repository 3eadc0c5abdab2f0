//! Patient Page
//!
//! Mood journal, history, analytics, suggestions, chat, booking and privacy.

use leptos::*;

use crate::components::{
    Analytics, BookingForm, Chat, MoodActionsBar, MoodEntryForm, MoodHistory, PrivacyPanel,
    Recommendations,
};
use crate::state::global::use_global_state;

#[component]
pub fn PatientPage() -> impl IntoView {
    let state = use_global_state();

    view! {
        <div class="space-y-8">
            <div class="flex items-center justify-between flex-wrap gap-4">
                <div>
                    <h1 class="text-3xl font-bold">
                        {move || state.user.get().map(|u| format!("Hi, {}", u.name)).unwrap_or_default()}
                    </h1>
                    <p class="text-gray-400 mt-1">"How are you today?"</p>
                </div>
                <MoodActionsBar />
            </div>

            <div class="grid md:grid-cols-2 gap-8">
                <section class="bg-gray-800 rounded-xl p-6">
                    <h2 class="text-xl font-semibold mb-4">"New entry"</h2>
                    <MoodEntryForm />
                </section>

                <section class="bg-gray-800 rounded-xl p-6 space-y-6">
                    {move || state.chat_open.get().then(|| view! { <Chat /> })}
                    {move || state.booking_open.get().then(|| view! { <BookingForm /> })}
                    {move || (!state.chat_open.get() && !state.booking_open.get()).then(|| view! { <Recommendations /> })}
                </section>
            </div>

            <section class="bg-gray-800 rounded-xl p-6">
                <Analytics />
            </section>

            <section class="bg-gray-800 rounded-xl p-6">
                <MoodHistory />
            </section>

            <section class="bg-gray-800 rounded-xl p-6">
                <PrivacyPanel />
            </section>
        </div>
    }
}
