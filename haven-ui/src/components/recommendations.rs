//! Recommendations Component

use leptos::*;

use crate::api;
use crate::components::Loading;
use crate::state::global::use_global_state;

/// Self-help suggestions, refetched after every saved mood entry
#[component]
pub fn Recommendations() -> impl IntoView {
    let state = use_global_state();

    let items = create_local_resource(
        move || state.mood_revision.get(),
        |_| async move { api::recommendations().await },
    );

    create_effect(move |_| {
        if let Some(Err(e)) = items.get() {
            state.handle_error("Could not load recommendations", &e);
        }
    });

    view! {
        <div class="space-y-3">
            <h2 class="text-xl font-semibold">"Recommendations"</h2>
            {move || match items.get() {
                None => view! { <Loading caption="Finding suggestions" /> }.into_view(),
                Some(Err(_)) => view! {
                    <p class="text-gray-400">"Suggestions are unavailable right now."</p>
                }.into_view(),
                Some(Ok(list)) => list.into_iter().map(|r| view! {
                    <div class="bg-gray-700 rounded-lg px-4 py-3">
                        <h3 class="font-medium">{r.title}</h3>
                        <p class="text-sm text-gray-300 mt-1">{r.text}</p>
                    </div>
                }).collect_view(),
            }}
        </div>
    }
}
