//! Privacy Panel
//!
//! Full data export and permanent account deletion.

use leptos::*;

use crate::api;
use crate::components::{download_csv, export_filename};
use crate::state::global::use_global_state;

#[component]
pub fn PrivacyPanel() -> impl IntoView {
    let state = use_global_state();

    let (password, set_password) = create_signal(String::new());
    let (busy, set_busy) = create_signal(false);

    let export = move |_| {
        set_busy.set(true);
        spawn_local(async move {
            match api::export_csv().await {
                Ok(csv) if csv.trim().is_empty() => state.show_error("No data to export"),
                Ok(csv) => match download_csv(&export_filename(), &csv) {
                    Ok(()) => state.show_success("Export downloaded"),
                    Err(e) => state.show_error(&e),
                },
                Err(e) => state.handle_error("Export failed", &e),
            }
            set_busy.set(false);
        });
    };

    let delete = move |_| {
        let pw = password.get();
        if pw.is_empty() {
            state.show_error("Enter your password to confirm");
            return;
        }
        let confirmed = web_sys::window()
            .and_then(|w| w.confirm_with_message("Delete your account and all data? This cannot be undone.").ok())
            .unwrap_or(false);
        if !confirmed {
            return;
        }

        set_busy.set(true);
        spawn_local(async move {
            match api::delete_account(&pw).await {
                Ok(()) => {
                    state.sign_out();
                    state.show_success("Your account has been deleted");
                }
                // Wrong password; the session itself is still valid
                Err(e) if e.is_unauthorized() && e.detail == "Invalid password" => {
                    state.show_error(&e.detail)
                }
                Err(e) => state.handle_error("Could not delete account", &e),
            }
            set_password.set(String::new());
            set_busy.set(false);
        });
    };

    view! {
        <div class="space-y-4">
            <h2 class="text-xl font-semibold">"Privacy"</h2>

            <button on:click=export disabled=move || busy.get()
                class="px-4 py-2 bg-gray-700 hover:bg-gray-600 rounded-lg text-sm">
                "Download all my data (CSV)"
            </button>

            <div class="border border-red-800 rounded-lg p-4 space-y-3">
                <h3 class="font-medium text-red-400">"Delete account"</h3>
                <input
                    type="password"
                    placeholder="Password"
                    prop:value=move || password.get()
                    on:input=move |ev| set_password.set(event_target_value(&ev))
                    class="w-full bg-gray-700 rounded-lg px-4 py-2 border border-gray-600"
                />
                <button on:click=delete disabled=move || busy.get()
                    class="px-4 py-2 bg-red-700 hover:bg-red-600 disabled:bg-gray-600 rounded-lg text-sm">
                    "Delete permanently"
                </button>
            </div>
        </div>
    }
}
