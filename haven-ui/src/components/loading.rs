//! Loading placeholders

use leptos::*;

/// Centered spinner with an optional caption
#[component]
pub fn Loading(#[prop(optional)] caption: Option<&'static str>) -> impl IntoView {
    view! {
        <div class="flex flex-col items-center justify-center py-8 space-y-2 text-gray-400" aria-busy="true">
            <div class="loading-spinner w-6 h-6" />
            {caption.map(|c| view! { <span class="text-sm">{c}</span> })}
        </div>
    }
}

/// Grey rows standing in for a list that is still being fetched
#[component]
pub fn ListSkeleton(#[prop(default = 3)] count: usize) -> impl IntoView {
    view! {
        <ul class="space-y-2 animate-pulse" aria-hidden="true">
            {(0..count).map(|i| {
                let width = ["w-full", "w-5/6", "w-2/3"][i % 3];
                view! { <li class=format!("bg-gray-700 rounded h-10 {}", width) /> }
            }).collect_view()}
        </ul>
    }
}
