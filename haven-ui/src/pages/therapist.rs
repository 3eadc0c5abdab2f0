//! Therapist Page
//!
//! Patient list with detail, booking list with status changes, and forms to
//! book a session or record one.

use leptos::*;

use crate::api;
use crate::components::{ListSkeleton, Modal};
use crate::models::{
    parse_local_datetime, Booking, BookingPatch, BookingStatus, NewBooking, NewSession,
    PatientDetail,
};
use crate::state::global::use_global_state;

#[component]
pub fn TherapistPage() -> impl IntoView {
    let state = use_global_state();

    // Bumped after any write so the lists refetch
    let (revision, set_revision) = create_signal(0u32);
    let (selected, set_selected) = create_signal(None::<PatientDetail>);

    let patients = create_local_resource(move || revision.get(), |_| async move { api::patients().await });
    let (status_filter, set_status_filter) = create_signal(None::<BookingStatus>);
    let bookings = create_local_resource(
        move || (revision.get(), status_filter.get()),
        |(_, status)| async move { api::list_bookings(status).await },
    );

    let sessions = create_local_resource(move || revision.get(), |_| async move { api::list_sessions().await });

    create_effect(move |_| {
        if let Some(Err(e)) = patients.get() {
            state.handle_error("Could not load patients", &e);
        }
    });
    create_effect(move |_| {
        if let Some(Err(e)) = bookings.get() {
            state.handle_error("Could not load bookings", &e);
        }
    });

    let open_patient = move |id: i64| {
        spawn_local(async move {
            match api::patient_detail(id).await {
                Ok(detail) => set_selected.set(Some(detail)),
                Err(e) => state.handle_error("Could not open patient", &e),
            }
        });
    };

    let refresh = Callback::new(move |_| set_revision.update(|r| *r += 1));

    view! {
        <div class="space-y-8">
            <div>
                <h1 class="text-3xl font-bold">"Therapist dashboard"</h1>
                <p class="text-gray-400 mt-1">"Your patients, bookings and sessions"</p>
            </div>

            <div class="grid md:grid-cols-2 gap-8">
                <section class="bg-gray-800 rounded-xl p-6">
                    <h2 class="text-xl font-semibold mb-4">"Patients"</h2>
                    {move || match patients.get() {
                        None => view! { <ListSkeleton count=4 /> }.into_view(),
                        Some(Err(_)) => view! { <p class="text-gray-400">"Unavailable"</p> }.into_view(),
                        Some(Ok(list)) if list.is_empty() => view! {
                            <p class="text-gray-400">"No patients yet."</p>
                        }.into_view(),
                        Some(Ok(list)) => view! {
                            <table class="w-full text-sm">
                                <thead class="text-gray-400 text-left">
                                    <tr><th>"Name"</th><th>"Latest risk"</th><th>"7d"</th><th>"30d"</th></tr>
                                </thead>
                                <tbody>
                                    {list.into_iter().map(|p| {
                                        let id = p.id;
                                        view! {
                                            <tr class="hover:bg-gray-700 cursor-pointer" on:click=move |_| open_patient(id)>
                                                <td class="py-2">{p.name}</td>
                                                <td>{p.latest_mood_risk.map(|r| r.as_str()).unwrap_or("-")}</td>
                                                <td>{fmt_avg(p.avg_7_days)}</td>
                                                <td>{fmt_avg(p.avg_30_days)}</td>
                                            </tr>
                                        }
                                    }).collect_view()}
                                </tbody>
                            </table>
                        }.into_view(),
                    }}
                </section>

                <section class="bg-gray-800 rounded-xl p-6 space-y-6">
                    <TherapistBookingForm on_saved=refresh />
                    <SessionForm on_saved=refresh />
                </section>
            </div>

            <section class="bg-gray-800 rounded-xl p-6">
                <div class="flex items-center justify-between mb-4">
                    <h2 class="text-xl font-semibold">"Bookings"</h2>
                    <select
                        on:change=move |ev| {
                            let status = match event_target_value(&ev).as_str() {
                                "scheduled" => Some(BookingStatus::Scheduled),
                                "completed" => Some(BookingStatus::Completed),
                                "cancelled" => Some(BookingStatus::Cancelled),
                                _ => None,
                            };
                            set_status_filter.set(status);
                        }
                        class="bg-gray-700 rounded px-3 py-1 text-sm border border-gray-600"
                    >
                        <option value="">"All"</option>
                        <option value="scheduled">"Scheduled"</option>
                        <option value="completed">"Completed"</option>
                        <option value="cancelled">"Cancelled"</option>
                    </select>
                </div>
                {move || match bookings.get() {
                    None => view! { <ListSkeleton count=3 /> }.into_view(),
                    Some(Err(_)) => view! { <p class="text-gray-400">"Unavailable"</p> }.into_view(),
                    Some(Ok(list)) => view! { <BookingList bookings=list on_saved=refresh /> }.into_view(),
                }}
            </section>

            <section class="bg-gray-800 rounded-xl p-6">
                <h2 class="text-xl font-semibold mb-4">"Sessions"</h2>
                {move || match sessions.get() {
                    None => view! { <ListSkeleton count=2 /> }.into_view(),
                    Some(Err(_)) => view! { <p class="text-gray-400">"Unavailable"</p> }.into_view(),
                    Some(Ok(list)) if list.is_empty() => view! {
                        <p class="text-gray-400">"No sessions recorded yet."</p>
                    }.into_view(),
                    Some(Ok(list)) => list.into_iter().map(|s| view! {
                        <div class="border-b border-gray-700 py-2 text-sm">
                            <span class="text-gray-400">{s.session_at.format("%Y-%m-%d %H:%M").to_string()}</span>
                            " · patient #"{s.patient_id}
                            {s.booking_id.map(|b| format!(" · booking #{}", b))}
                            <p>{s.outcome.or(s.notes).unwrap_or_default()}</p>
                        </div>
                    }).collect_view(),
                }}
            </section>

            {move || selected.get().map(|detail| view! {
                <Modal title=detail.name.clone() on_close=Callback::new(move |_| set_selected.set(None))>
                    <PatientDetailView detail=detail />
                </Modal>
            })}
        </div>
    }
}

fn fmt_avg(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

#[component]
fn PatientDetailView(detail: PatientDetail) -> impl IntoView {
    view! {
        <div class="space-y-4 text-sm">
            <p class="text-gray-400">{detail.email}</p>

            <div>
                <h3 class="font-medium mb-2">"Recent moods"</h3>
                <ul class="space-y-1 max-h-48 overflow-y-auto">
                    {detail.moods.into_iter().take(10).map(|m| view! {
                        <li class="flex justify-between">
                            <span>{m.date.format("%Y-%m-%d").to_string()}</span>
                            <span>{m.mood_value}"/10 "{m.risk.map(|r| r.label()).unwrap_or("")}</span>
                        </li>
                    }).collect_view()}
                </ul>
            </div>

            <div>
                <h3 class="font-medium mb-2">"Sessions"</h3>
                <ul class="space-y-1">
                    {detail.sessions.into_iter().map(|s| view! {
                        <li>
                            {s.session_at.format("%Y-%m-%d").to_string()}": "
                            {s.outcome.or(s.notes).unwrap_or_default()}
                        </li>
                    }).collect_view()}
                </ul>
            </div>

            <p class="text-gray-400">{format!("{} bookings", detail.bookings.len())}</p>
        </div>
    }
}

#[component]
fn BookingList(bookings: Vec<Booking>, on_saved: Callback<()>) -> impl IntoView {
    let state = use_global_state();

    if bookings.is_empty() {
        return view! { <p class="text-gray-400">"No bookings."</p> }.into_view();
    }

    let set_status = move |id: i64, status: BookingStatus| {
        spawn_local(async move {
            let patch = BookingPatch { status: Some(status) };
            match api::update_booking(id, &patch).await {
                Ok(_) => {
                    state.show_success(&format!("Booking marked {}", status.as_str()));
                    on_saved.call(());
                }
                Err(e) => state.handle_error("Could not update booking", &e),
            }
        });
    };

    view! {
        <ul class="space-y-2">
            {bookings.into_iter().map(|b| {
                let id = b.id;
                let scheduled = b.status == BookingStatus::Scheduled;
                view! {
                    <li class="bg-gray-700 rounded-lg px-4 py-3 flex items-center justify-between">
                        <div>
                            <div class="font-medium">
                                {b.patient_name.unwrap_or_else(|| format!("Patient #{}", b.patient_id))}
                            </div>
                            <div class="text-sm text-gray-400">
                                {b.datetime.format("%Y-%m-%d %H:%M").to_string()}" · "{b.status.as_str()}
                            </div>
                        </div>
                        {scheduled.then(|| view! {
                            <div class="flex space-x-2">
                                <button class="px-3 py-1 bg-green-700 hover:bg-green-600 rounded text-sm"
                                    on:click=move |_| set_status(id, BookingStatus::Completed)>
                                    "Complete"
                                </button>
                                <button class="px-3 py-1 bg-gray-600 hover:bg-gray-500 rounded text-sm"
                                    on:click=move |_| set_status(id, BookingStatus::Cancelled)>
                                    "Cancel"
                                </button>
                            </div>
                        })}
                    </li>
                }
            }).collect_view()}
        </ul>
    }
    .into_view()
}

#[component]
fn TherapistBookingForm(on_saved: Callback<()>) -> impl IntoView {
    let state = use_global_state();

    let (patient, set_patient) = create_signal(String::new());
    let (when, set_when) = create_signal(String::new());
    let (notes, set_notes) = create_signal(String::new());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let Ok(patient_id) = patient.get().trim().parse::<i64>() else {
            state.show_error("Patient ID is required");
            return;
        };
        let Some(datetime) = parse_local_datetime(&when.get()) else {
            state.show_error("Please pick a date and time");
            return;
        };
        let notes = notes.get().trim().to_string();
        let booking = NewBooking {
            patient_id: Some(patient_id),
            datetime,
            notes: (!notes.is_empty()).then_some(notes),
        };

        spawn_local(async move {
            match api::create_booking(&booking).await {
                Ok(_) => {
                    state.show_success("Booking created");
                    set_patient.set(String::new());
                    set_when.set(String::new());
                    set_notes.set(String::new());
                    on_saved.call(());
                }
                Err(e) => state.handle_error("Could not create booking", &e),
            }
        });
    };

    view! {
        <form on:submit=on_submit class="space-y-3">
            <h2 class="text-xl font-semibold">"Book a session"</h2>
            <Field placeholder="Patient ID" kind="number" value=patient set_value=set_patient />
            <Field placeholder="" kind="datetime-local" value=when set_value=set_when />
            <Field placeholder="Notes (optional)" kind="text" value=notes set_value=set_notes />
            <button type="submit" class="w-full bg-primary-600 hover:bg-primary-700 rounded-lg py-2 font-semibold">
                "Create booking"
            </button>
        </form>
    }
}

#[component]
fn SessionForm(on_saved: Callback<()>) -> impl IntoView {
    let state = use_global_state();

    let (patient, set_patient) = create_signal(String::new());
    let (booking, set_booking) = create_signal(String::new());
    let (notes, set_notes) = create_signal(String::new());
    let (outcome, set_outcome) = create_signal(String::new());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let Ok(patient_id) = patient.get().trim().parse::<i64>() else {
            state.show_error("Patient ID is required");
            return;
        };
        let non_blank = |s: String| {
            let s = s.trim().to_string();
            (!s.is_empty()).then_some(s)
        };
        let session = NewSession {
            booking_id: booking.get().trim().parse().ok(),
            patient_id,
            notes: non_blank(notes.get()),
            outcome: non_blank(outcome.get()),
        };

        spawn_local(async move {
            match api::create_session(&session).await {
                Ok(_) => {
                    state.show_success("Session recorded");
                    for set in [set_patient, set_booking, set_notes, set_outcome] {
                        set.set(String::new());
                    }
                    on_saved.call(());
                }
                Err(e) => state.handle_error("Could not record session", &e),
            }
        });
    };

    view! {
        <form on:submit=on_submit class="space-y-3">
            <h2 class="text-xl font-semibold">"Record a session"</h2>
            <Field placeholder="Patient ID" kind="number" value=patient set_value=set_patient />
            <Field placeholder="Booking ID (optional)" kind="number" value=booking set_value=set_booking />
            <Field placeholder="Notes" kind="text" value=notes set_value=set_notes />
            <Field placeholder="Outcome" kind="text" value=outcome set_value=set_outcome />
            <button type="submit" class="w-full bg-primary-600 hover:bg-primary-700 rounded-lg py-2 font-semibold">
                "Save session"
            </button>
        </form>
    }
}

#[component]
fn Field(
    placeholder: &'static str,
    kind: &'static str,
    value: ReadSignal<String>,
    set_value: WriteSignal<String>,
) -> impl IntoView {
    view! {
        <input
            type=kind
            placeholder=placeholder
            prop:value=move || value.get()
            on:input=move |ev| set_value.set(event_target_value(&ev))
            class="w-full bg-gray-700 rounded-lg px-4 py-2 border border-gray-600 focus:outline-none"
        />
    }
}
