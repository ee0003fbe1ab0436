//! Main application component

use crate::api::matcher;
use crate::components::{
    header::Header,
    progress_bar::ProgressBar,
    results_table::ResultsTable,
    summary_panel::{ErrorBanner, SummaryPanel},
    toolbar::Toolbar,
    upload_form::UploadForm,
};
use crate::export::download_artifact;
use gazette_matcher_common::error::FETCH_FAILED_MESSAGE;
use gazette_matcher_common::{ExportFormat, MatchMode, Session, SubmissionParameters, Threshold};
use gloo::timers::callback::Timeout;
use leptos::html::Input;
use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::File;

/// How long the bar stays at 100% after a submission ends.
const PROGRESS_GRACE_MS: u32 = 1000;

/// Prompt shown before a destructive clear.
const CLEAR_PROMPT: &str = "Clear ALL stored matches?";

fn log(message: &str) {
    web_sys::console::log_1(&message.into());
}

fn selected_file(input: NodeRef<Input>) -> Option<File> {
    input.get_untracked()?.files()?.get(0)
}

fn reset_input(input: NodeRef<Input>) {
    if let Some(el) = input.get_untracked() {
        el.set_value("");
    }
}

#[component]
pub fn App() -> impl IntoView {
    // Single writer for everything the user sees
    let session = RwSignal::new(Session::new());

    let mode = RwSignal::new(MatchMode::default());
    let threshold = RwSignal::new(Threshold::default());
    let pdf_ref = NodeRef::<Input>::new();
    let excel_ref = NodeRef::<Input>::new();

    let is_submitting = Signal::derive(move || session.with(|s| s.is_submitting()));
    let progress = Signal::derive(move || session.with(|s| s.progress()));
    let summary = Signal::derive(move || session.with(|s| s.summary().cloned()));
    let error = Signal::derive(move || session.with(|s| s.error().map(str::to_string)));
    let search = Signal::derive(move || session.with(|s| s.view_state().search.clone()));
    let can_export = Signal::derive(move || session.with(|s| s.can_export()));

    // Initial list from the server
    spawn_local(async move {
        match matcher::fetch_records().await {
            Ok(records) => session.update(|s| s.replace_records(records)),
            Err(e) => {
                log(&format!("Error fetching records: {}", e));
                session.update(|s| s.set_error(FETCH_FAILED_MESSAGE));
            }
        }
    });

    let on_submit = move |_| {
        let pdf = selected_file(pdf_ref);
        let excel = selected_file(excel_ref);
        let params = SubmissionParameters::new(mode.get_untracked(), threshold.get_untracked());

        let begun = session.try_update(|s| s.begin_submission(pdf.is_some(), excel.is_some(), params));
        let ticket = match begun {
            Some(Ok(ticket)) => ticket,
            Some(Err(e)) => {
                log(&e.to_string());
                return;
            }
            None => return,
        };
        let Some((pdf, excel)) = pdf.zip(excel) else {
            return;
        };

        spawn_local(async move {
            let result = matcher::submit_match(&pdf, &excel, &ticket.params, move |event| {
                session.update(|s| s.record_transfer(event));
            })
            .await;

            let token = match result {
                Ok(response) => {
                    let token = session
                        .try_update(|s| s.complete_submission(ticket, response));
                    reset_input(pdf_ref);
                    reset_input(excel_ref);
                    token
                }
                Err(e) => {
                    log(&format!("Upload error: {}", e));
                    session.try_update(|s| s.fail_submission(ticket, &e))
                }
            };

            if let Some(token) = token {
                Timeout::new(PROGRESS_GRACE_MS, move || {
                    session.update(|s| s.settle_progress(token));
                })
                .forget();
            }
        });
    };

    let on_clear = move |_| {
        let confirmed = web_sys::window()
            .and_then(|w| w.confirm_with_message(CLEAR_PROMPT).ok())
            .unwrap_or(false);
        if !confirmed {
            return;
        }

        spawn_local(async move {
            match matcher::clear_records().await {
                Ok(()) => session.update(|s| s.apply_clear()),
                Err(e) => {
                    log(&format!("Clear error: {}", e));
                    let err = gazette_matcher_common::Error::Clear(Box::new(e));
                    // reconcile with whatever the server still holds
                    if let Ok(records) = matcher::fetch_records().await {
                        session.update(|s| s.replace_records(records));
                    }
                    session.update(|s| s.fail_clear(&err));
                }
            }
        });
    };

    let on_search = move |value: String| session.update(|s| s.set_search(value));

    let on_export = move |_| {
        let now = js_sys::Date::now() as i64;
        match session.with_untracked(|s| s.export(ExportFormat::Csv, now)) {
            Ok(artifact) => {
                if let Err(e) = download_artifact(&artifact) {
                    log(&format!("Export error: {:?}", e));
                }
            }
            Err(e) => log(&e.to_string()),
        }
    };

    let on_dismiss = move |_| session.update(|s| s.dismiss_error());

    view! {
        <div class="container">
            <Header />

            <UploadForm
                pdf_ref=pdf_ref
                excel_ref=excel_ref
                mode=mode
                threshold=threshold
                is_submitting=is_submitting
                on_submit=on_submit
                on_clear=on_clear
            />

            <Show when=move || is_submitting.get() || progress.get() > 0>
                <ProgressBar progress=progress />
            </Show>

            <SummaryPanel summary=summary />
            <ErrorBanner error=error on_dismiss=on_dismiss />

            <Toolbar
                search=search
                can_export=can_export
                on_search=on_search
                on_export=on_export
            />

            <ResultsTable session=session />
        </div>
    }
}
