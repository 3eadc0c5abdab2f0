//! Navigation Component
//!
//! Header bar with the brand, the signed-in user and auth buttons.

use leptos::*;
use leptos_router::*;

use crate::state::global::{use_global_state, AuthMode};

#[component]
pub fn Nav() -> impl IntoView {
    let state = use_global_state();

    let logout = move |_| {
        state.sign_out();
        state.show_success("Signed out");
    };

    view! {
        <nav class="bg-gray-800 border-b border-gray-700">
            <div class="container mx-auto px-4">
                <div class="flex items-center justify-between h-16">
                    <A href="/" class="flex items-center space-x-3">
                        <span class="text-xl font-bold text-white">"Haven"</span>
                        <span class="text-sm text-gray-400 hidden md:inline">"Mental Health Portal"</span>
                    </A>

                    <div class="flex items-center space-x-2">
                        {move || match state.user.get() {
                            Some(user) => view! {
                                <span class="text-gray-300 text-sm">
                                    {format!("{} ({})", user.name, user.role_label())}
                                </span>
                                <NavButton label="Logout" on_click=logout />
                            }.into_view(),
                            None => view! {
                                <NavButton
                                    label="Login"
                                    on_click=move |_| state.auth_modal.set(Some(AuthMode::Login))
                                />
                                <NavButton
                                    label="Register"
                                    on_click=move |_| state.auth_modal.set(Some(AuthMode::Register))
                                />
                            }.into_view(),
                        }}
                    </div>
                </div>
            </div>
        </nav>
    }
}

#[component]
fn NavButton(
    label: &'static str,
    on_click: impl Fn(web_sys::MouseEvent) + 'static,
) -> impl IntoView {
    view! {
        <button
            on:click=on_click
            class="px-4 py-2 rounded-lg text-gray-300 hover:text-white hover:bg-gray-700 transition-colors"
        >
            {label}
        </button>
    }
}
