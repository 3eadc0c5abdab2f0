//! Mood History Component
//!
//! The patient's entries, newest first, with a client-side CSV download.

use leptos::*;

use crate::api;
use crate::components::{download_csv, export_filename, ListSkeleton};
use crate::models::moods_to_csv;
use crate::state::global::use_global_state;

#[component]
pub fn MoodHistory() -> impl IntoView {
    let state = use_global_state();
    let (loaded, set_loaded) = create_signal(false);

    spawn_local(async move {
        match api::list_moods().await {
            Ok(moods) => state.moods.set(moods),
            Err(e) => state.handle_error("Could not load your history", &e),
        }
        set_loaded.set(true);
    });

    let export = move |_| {
        let csv = match moods_to_csv(&state.moods.get_untracked()) {
            Ok(csv) => csv,
            Err(e) => {
                state.show_error(&e);
                return;
            }
        };
        if csv.is_empty() {
            state.show_error("No data to export");
            return;
        }
        match download_csv(&export_filename(), &csv) {
            Ok(()) => state.show_success("History exported"),
            Err(e) => state.show_error(&e),
        }
    };

    view! {
        <div class="space-y-4">
            <div class="flex items-center justify-between">
                <h2 class="text-xl font-semibold">"History"</h2>
                <button
                    on:click=export
                    class="px-3 py-1 bg-gray-700 hover:bg-gray-600 rounded text-sm transition-colors"
                >
                    "Export CSV"
                </button>
            </div>

            {move || {
                if !loaded.get() {
                    return view! { <ListSkeleton count=3 /> }.into_view();
                }
                let moods = state.moods.get();
                if moods.is_empty() {
                    return view! {
                        <p class="text-gray-400">"No entries yet. Your first one will show up here."</p>
                    }.into_view();
                }
                view! {
                    <ul class="space-y-2">
                        {moods.into_iter().map(|m| view! {
                            <li class="bg-gray-700 rounded-lg px-4 py-3">
                                <div class="flex items-center justify-between text-sm">
                                    <span class="text-gray-400">{m.date.format("%Y-%m-%d %H:%M").to_string()}</span>
                                    <span class="flex items-center space-x-2">
                                        <span class="font-medium">{m.mood_value}"/10"</span>
                                        {m.risk.map(|r| view! {
                                            <span class=format!("px-2 py-0.5 rounded text-xs {}", r.badge_class())>
                                                {r.label()}
                                            </span>
                                        })}
                                    </span>
                                </div>
                                <p class="mt-1">{m.text.unwrap_or_default()}</p>
                            </li>
                        }).collect_view()}
                    </ul>
                }.into_view()
            }}
        </div>
    }
}
