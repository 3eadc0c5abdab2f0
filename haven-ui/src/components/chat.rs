//! Support Chat
//!
//! A simple exchange with the support bot. When the reply asks to escalate,
//! or the patient is not satisfied, the booking form opens.

use leptos::*;

use crate::api;
use crate::state::global::use_global_state;

const MSG_CHAT_OFFLINE: &str = "Sorry, I couldn't reach the support service. Please try again shortly.";

#[derive(Clone, Copy, PartialEq)]
enum Sender {
    User,
    Bot,
}

#[component]
pub fn Chat() -> impl IntoView {
    let state = use_global_state();

    let (lines, set_lines) = create_signal(Vec::<(Sender, String)>::new());
    let (draft, set_draft) = create_signal(String::new());
    let (waiting, set_waiting) = create_signal(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let message = draft.get().trim().to_string();
        if message.is_empty() {
            return;
        }
        set_draft.set(String::new());
        set_lines.update(|l| l.push((Sender::User, message.clone())));

        set_waiting.set(true);
        spawn_local(async move {
            match api::chat(&message).await {
                Ok(reply) => {
                    set_lines.update(|l| l.push((Sender::Bot, reply.reply)));
                    if reply.escalate {
                        state.booking_open.set(true);
                    }
                }
                Err(e) if e.is_unauthorized() => state.handle_error("Chat", &e),
                Err(e) => {
                    web_sys::console::warn_1(&format!("Chat failed: {}", e).into());
                    set_lines.update(|l| l.push((Sender::Bot, MSG_CHAT_OFFLINE.to_string())));
                }
            }
            set_waiting.set(false);
        });
    };

    let not_satisfied = move |_| {
        state.chat_open.set(false);
        state.booking_open.set(true);
    };

    view! {
        <div class="space-y-3">
            <div class="flex items-center justify-between">
                <h2 class="text-xl font-semibold">"Support chat"</h2>
                <button on:click=move |_| state.chat_open.set(false) class="text-gray-400 hover:text-white">
                    "Close"
                </button>
            </div>

            <div class="bg-gray-900 rounded-lg p-3 h-64 overflow-y-auto space-y-2">
                {move || lines.get().into_iter().map(|(sender, text)| {
                    let class = match sender {
                        Sender::User => "ml-auto bg-primary-600",
                        Sender::Bot => "mr-auto bg-gray-700",
                    };
                    view! {
                        <div class=format!("max-w-[80%] w-fit rounded-lg px-3 py-2 text-sm {}", class)>{text}</div>
                    }
                }).collect_view()}
                {move || waiting.get().then(|| view! { <div class="text-gray-500 text-sm">"..."</div> })}
            </div>

            <form on:submit=on_submit class="flex space-x-2">
                <input
                    type="text"
                    placeholder="Type a message"
                    prop:value=move || draft.get()
                    on:input=move |ev| set_draft.set(event_target_value(&ev))
                    class="flex-1 bg-gray-700 rounded-lg px-3 py-2 border border-gray-600 focus:outline-none"
                />
                <button type="submit" disabled=move || waiting.get()
                    class="px-4 py-2 bg-primary-600 hover:bg-primary-700 disabled:bg-gray-600 rounded-lg">
                    "Send"
                </button>
            </form>

            <button on:click=not_satisfied class="text-sm text-primary-400 hover:underline">
                "Not satisfied? Book a session with a therapist"
            </button>
        </div>
    }
}
