//! App Root Component
//!
//! Routing, global state and the view switch between landing, patient and
//! therapist pages.

use leptos::*;
use leptos_router::*;

use crate::components::{AuthModal, Nav, Toast};
use crate::pages::{Landing, PatientPage, TherapistPage};
use crate::state::global::{provide_global_state, use_global_state, View};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    provide_global_state();

    let state = use_global_state();
    spawn_local(state.restore());

    view! {
        <Router>
            <div class="min-h-screen bg-gray-900 text-white flex flex-col">
                <Nav />

                <main class="flex-1 container mx-auto px-4 py-8 pb-24">
                    <Routes>
                        <Route path="/" view=Home />
                        <Route path="/*any" view=NotFound />
                    </Routes>
                </main>

                <Footer />
                <AuthModal />
                <Toast />
            </div>
        </Router>
    }
}

/// Shows the page for the current session
#[component]
fn Home() -> impl IntoView {
    let state = use_global_state();

    move || match state.view.get() {
        View::Landing => view! { <Landing /> }.into_view(),
        View::Patient => view! { <PatientPage /> }.into_view(),
        View::Therapist => view! { <TherapistPage /> }.into_view(),
    }
}

/// Status bar: API reachability, a crisis line reminder, pending requests
#[component]
fn Footer() -> impl IntoView {
    let state = use_global_state();

    let status = move || match state.server_status.get() {
        Some(line) => ("text-green-400", line),
        None => ("text-red-400", "API unreachable".to_string()),
    };

    view! {
        <footer class="fixed bottom-0 inset-x-0 bg-gray-800 border-t border-gray-700 py-2 px-4 text-sm">
            <div class="container mx-auto flex items-center justify-between gap-4">
                <span class=move || status().0>{move || status().1}</span>
                <span class="text-gray-400 hidden md:inline">
                    "If you are in crisis, contact your local emergency number."
                </span>
                <span class="w-4 h-4">
                    {move || state.loading.get().then(|| view! { <div class="loading-spinner w-4 h-4" /> })}
                </span>
            </div>
        </footer>
    }
}

#[component]
fn NotFound() -> impl IntoView {
    view! {
        <div class="text-center py-24 space-y-4">
            <h1 class="text-2xl font-bold">"Nothing here"</h1>
            <A href="/" class="text-primary-400 hover:underline">"Back to Haven"</A>
        </div>
    }
}
