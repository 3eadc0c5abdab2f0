//! Modal Component
//!
//! Overlay dialog with a title bar and close button. Clicking the backdrop
//! closes it.

use leptos::*;

#[component]
pub fn Modal(
    #[prop(into)]
    title: String,
    on_close: Callback<()>,
    children: Children,
) -> impl IntoView {
    view! {
        <div
            class="fixed inset-0 z-40 bg-black/60 flex items-center justify-center p-4"
            on:click=move |_| on_close.call(())
        >
            <div
                role="dialog"
                aria-modal="true"
                class="bg-gray-800 rounded-xl shadow-xl w-full max-w-lg"
                on:click=|ev| ev.stop_propagation()
            >
                <div class="flex items-center justify-between border-b border-gray-700 px-6 py-4">
                    <h2 class="text-lg font-semibold">{title}</h2>
                    <button
                        aria-label="Close"
                        on:click=move |_| on_close.call(())
                        class="text-gray-400 hover:text-white text-xl"
                    >
                        "×"
                    </button>
                </div>
                <div class="p-6">{children()}</div>
            </div>
        </div>
    }
}
