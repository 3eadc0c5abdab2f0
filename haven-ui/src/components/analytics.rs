//! Analytics Component
//!
//! 7/30-day averages and a daily mood chart drawn on an HTML5 canvas.

use leptos::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::api;
use crate::models::{total_entries, ChartPoint};
use crate::state::global::use_global_state;

const LINE_COLOR: &str = "#FF9800";
const RISK_COLORS: [&str; 3] = ["#F44336", "#FFC107", "#4CAF50"];

#[component]
pub fn Analytics() -> impl IntoView {
    let state = use_global_state();
    let (range, set_range) = create_signal(7u32);
    let canvas_ref = create_node_ref::<html::Canvas>();

    let data = create_local_resource(
        move || (range.get(), state.mood_revision.get()),
        |(days, _)| async move {
            let summary = api::mood_analytics().await?;
            let points = api::chart_data(days).await?;
            Ok::<_, api::ApiError>((summary, points))
        },
    );

    create_effect(move |_| match data.get() {
        Some(Ok((_, points))) => {
            if let Some(canvas) = canvas_ref.get() {
                draw_chart(&canvas, &points);
            }
        }
        Some(Err(e)) => state.handle_error("Could not load analytics", &e),
        None => {}
    });

    let summary = move || {
        data.get()
            .and_then(|r| r.ok())
            .map(|(s, _)| s)
            .unwrap_or_default()
    };
    let is_empty = move || {
        data.get()
            .and_then(|r| r.ok())
            .map(|(_, points)| total_entries(&points) == 0)
            .unwrap_or(false)
    };

    view! {
        <div class="space-y-4">
            <h2 class="text-xl font-semibold">"Analytics"</h2>

            <div class="grid grid-cols-2 gap-4">
                <Average label="7-day average" value=Signal::derive(move || summary().avg_7_days) />
                <Average label="30-day average" value=Signal::derive(move || summary().avg_30_days) />
            </div>

            <div class="relative">
                <canvas node_ref=canvas_ref width="800" height="300" class="w-full h-48 md:h-72 rounded-lg" />
                {move || is_empty().then(|| view! {
                    <p class="absolute inset-0 flex items-center justify-center text-gray-400">
                        "No entries in this range yet"
                    </p>
                })}
            </div>

            <div class="flex justify-center space-x-2">
                {[7u32, 30, 90].into_iter().map(|days| view! {
                    <button
                        on:click=move |_| set_range.set(days)
                        class=move || {
                            let base = "px-4 py-2 rounded-lg text-sm font-medium transition-colors";
                            if range.get() == days {
                                format!("{} bg-primary-600 text-white", base)
                            } else {
                                format!("{} bg-gray-700 text-gray-300 hover:bg-gray-600", base)
                            }
                        }
                    >
                        {format!("{}D", days)}
                    </button>
                }).collect_view()}
            </div>
        </div>
    }
}

#[component]
fn Average(label: &'static str, value: Signal<Option<f64>>) -> impl IntoView {
    view! {
        <div class="bg-gray-700 rounded-lg p-4">
            <div class="text-sm text-gray-400">{label}</div>
            <div class="text-2xl font-bold">
                {move || value.get().map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())}
            </div>
        </div>
    }
}

/// Daily average as a line on a 1-10 axis, risk counts as stacked bars
fn draw_chart(canvas: &HtmlCanvasElement, points: &[ChartPoint]) {
    let ctx = match canvas.get_context("2d") {
        Ok(Some(ctx)) => match ctx.dyn_into::<CanvasRenderingContext2d>() {
            Ok(ctx) => ctx,
            Err(_) => return,
        },
        _ => return,
    };

    let width = canvas.width() as f64;
    let height = canvas.height() as f64;

    let margin_left = 40.0;
    let margin_right = 20.0;
    let margin_top = 20.0;
    let margin_bottom = 40.0;

    let chart_width = width - margin_left - margin_right;
    let chart_height = height - margin_top - margin_bottom;

    ctx.set_fill_style(&"#1f2937".into());
    ctx.fill_rect(0.0, 0.0, width, height);

    ctx.set_stroke_style(&"#374151".into());
    ctx.set_line_width(1.0);
    ctx.set_font("12px sans-serif");
    for value in [1.0, 4.0, 7.0, 10.0] {
        let y = margin_top + ((10.0 - value) / 9.0) * chart_height;
        ctx.begin_path();
        ctx.move_to(margin_left, y);
        ctx.line_to(width - margin_right, y);
        ctx.stroke();

        ctx.set_fill_style(&"#9ca3af".into());
        let _ = ctx.fill_text(&format!("{}", value), 10.0, y + 4.0);
    }

    if points.is_empty() {
        return;
    }

    let step = chart_width / points.len() as f64;
    let x_of = |i: usize| margin_left + step * (i as f64 + 0.5);
    let y_of = |avg: f64| margin_top + ((10.0 - avg.clamp(1.0, 10.0)) / 9.0) * chart_height;

    // Risk counts along the bottom, one bar per day
    let max_count = points.iter().map(|p| p.count).max().unwrap_or(0).max(1) as f64;
    let bar_height = chart_height * 0.25;
    for (i, p) in points.iter().enumerate() {
        let mut base = margin_top + chart_height;
        for (count, color) in [p.high, p.medium, p.low].into_iter().zip(RISK_COLORS) {
            let h = count as f64 / max_count * bar_height;
            ctx.set_fill_style(&color.into());
            ctx.fill_rect(x_of(i) - step * 0.3, base - h, step * 0.6, h);
            base -= h;
        }
    }

    // Average line, broken on days without entries
    ctx.set_stroke_style(&LINE_COLOR.into());
    ctx.set_line_width(2.0);
    ctx.begin_path();
    let mut pen_down = false;
    for (i, p) in points.iter().enumerate() {
        match p.avg {
            Some(avg) if pen_down => ctx.line_to(x_of(i), y_of(avg)),
            Some(avg) => {
                ctx.move_to(x_of(i), y_of(avg));
                pen_down = true;
            }
            None => pen_down = false,
        }
    }
    ctx.stroke();

    ctx.set_fill_style(&LINE_COLOR.into());
    for (i, p) in points.iter().enumerate() {
        if let Some(avg) = p.avg {
            ctx.begin_path();
            let _ = ctx.arc(x_of(i), y_of(avg), 3.0, 0.0, std::f64::consts::PI * 2.0);
            ctx.fill();
        }
    }

    ctx.set_fill_style(&"#9ca3af".into());
    let label_every = (points.len() / 7).max(1);
    for (i, p) in points.iter().enumerate().step_by(label_every) {
        // `YYYY-MM-DD` -> `MM-DD`
        let label = p.date.get(5..).unwrap_or(&p.date);
        let _ = ctx.fill_text(label, x_of(i) - 15.0, height - 10.0);
    }
}

