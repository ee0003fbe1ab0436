//! Result summary and error banner

use gazette_matcher_common::{ResultSummary, NOT_AVAILABLE};
use leptos::prelude::*;

fn count(value: Option<u64>) -> String {
    value.map(|n| n.to_string()).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[component]
pub fn SummaryPanel(summary: Signal<Option<ResultSummary>>) -> impl IntoView {
    move || {
        summary.get().map(|s| {
            let threshold = s
                .threshold
                .map(|t| format!("{:.2}", t))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            view! {
                <div class="summary-panel">
                    <p>
                        <b>"Mode: "</b> {s.mode.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())}
                        " " <b>"Threshold: "</b> {threshold}
                    </p>
                    <p>
                        <b>"Gazette: "</b> {count(s.total_gazette)}
                        " " <b>"Excel: "</b> {count(s.total_excel)}
                    </p>
                    <p>
                        <b>"Matched: "</b> {count(s.matched_count)}
                        " " <b>"Inserted: "</b> {count(s.inserted_count)}
                    </p>
                </div>
            }
        })
    }
}

#[component]
pub fn ErrorBanner<F>(error: Signal<Option<String>>, on_dismiss: F) -> impl IntoView
where
    F: Fn(()) + Send + Sync + 'static + Clone,
{
    move || {
        let on_dismiss = on_dismiss.clone();
        error.get().map(|message| {
            view! {
                <div class="error-banner" role="alert">
                    <span>{message}</span>
                    <button class="btn-close" on:click=move |_| on_dismiss(())>"×"</button>
                </div>
            }
        })
    }
}
