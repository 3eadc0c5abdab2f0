//! UI Components
//!
//! Reusable Leptos components for the portal pages.

pub mod analytics;
pub mod auth_modal;
pub mod booking_form;
pub mod chat;
pub mod loading;
pub mod modal;
pub mod mood_actions;
pub mod mood_entry;
pub mod mood_history;
pub mod nav;
pub mod privacy_panel;
pub mod recommendations;
pub mod toast;

pub use analytics::Analytics;
pub use auth_modal::AuthModal;
pub use booking_form::BookingForm;
pub use chat::Chat;
pub use loading::{ListSkeleton, Loading};
pub use modal::Modal;
pub use mood_actions::MoodActionsBar;
pub use mood_entry::MoodEntryForm;
pub use mood_history::MoodHistory;
pub use nav::Nav;
pub use privacy_panel::PrivacyPanel;
pub use recommendations::Recommendations;
pub use toast::Toast;

/// Trigger a browser download of `content` as a CSV file
pub fn download_csv(filename: &str, content: &str) -> Result<(), String> {
    use wasm_bindgen::JsCast;

    let window = web_sys::window().ok_or("No window")?;
    let document = window.document().ok_or("No document")?;

    let parts = js_sys::Array::of1(&content.into());
    let blob = web_sys::Blob::new_with_str_sequence(&parts).map_err(|_| "Cannot create file")?;
    let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(|_| "Cannot create link")?;

    let anchor = document
        .create_element("a")
        .map_err(|_| "Cannot create link")?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|_| "Cannot create link")?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();

    let _ = web_sys::Url::revoke_object_url(&url);
    Ok(())
}

/// `mh_export_YYYY-MM-DD.csv` for today
pub fn export_filename() -> String {
    format!("mh_export_{}.csv", chrono::Local::now().format("%Y-%m-%d"))
}
