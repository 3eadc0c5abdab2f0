//! Landing Page

use leptos::*;

use crate::api;
use crate::state::global::{use_global_state, AuthMode};

#[component]
pub fn Landing() -> impl IntoView {
    let state = use_global_state();

    view! {
        <div class="flex flex-col items-center justify-center min-h-[60vh] text-center space-y-6">
            <h1 class="text-4xl font-bold">"A calmer place to check in with yourself"</h1>
            <p class="text-gray-400 max-w-xl">
                "Journal how you feel, follow your mood over time, talk to our support bot \
                 and book a session with a therapist when you need one."
            </p>
            <div class="flex space-x-4">
                <button
                    on:click=move |_| state.auth_modal.set(Some(AuthMode::Register))
                    class="px-6 py-3 bg-primary-600 hover:bg-primary-700 rounded-lg font-medium"
                >
                    "Get started"
                </button>
                <button
                    on:click=move |_| state.auth_modal.set(Some(AuthMode::Login))
                    class="px-6 py-3 bg-gray-700 hover:bg-gray-600 rounded-lg font-medium"
                >
                    "I have an account"
                </button>
            </div>
            <ServerSetting />
        </div>
    }
}

/// API base URL, kept in local storage
#[component]
fn ServerSetting() -> impl IntoView {
    let state = use_global_state();
    let (url, set_url) = create_signal(api::get_api_base());

    let save = move |_| {
        api::set_api_base(url.get().trim());
        state.show_success("API URL saved");
        spawn_local(state.restore());
    };

    view! {
        <details class="text-sm text-gray-400">
            <summary class="cursor-pointer">"Server"</summary>
            <div class="flex space-x-2 mt-2">
                <input
                    type="url"
                    prop:value=move || url.get()
                    on:input=move |ev| set_url.set(event_target_value(&ev))
                    class="bg-gray-700 rounded px-3 py-1 border border-gray-600 w-72"
                />
                <button on:click=save class="px-3 py-1 bg-gray-700 hover:bg-gray-600 rounded">"Save"</button>
            </div>
        </details>
    }
}
