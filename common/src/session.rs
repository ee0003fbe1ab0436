//! Session store
//!
//! Holds the raw record list, the latest result summary, view state and the
//! submission state machine. Front ends own exactly one `Session` and are
//! its only writer; transports feed it events, renderers read derived views.
//!
//! ```text
//! Idle ──begin──▶ Submitting ──complete──▶ Idle (outcome: Success)
//!                            └─fail──────▶ Idle (outcome: Error)
//! ```

use crate::error::{Error, Result};
use crate::export::{export_file_name, export_records, ExportFormat};
use crate::params::{MatchResponse, ResultSummary, SubmissionParameters};
use crate::pipeline::{self, DatasetView, SortConfig, PAGE_SIZE};
use crate::progress::{TransferEvent, TransferProgress};
use crate::record::{Record, RecordField};
use std::collections::HashMap;

/// Message shown when a file input is missing.
pub const MISSING_FILES_MESSAGE: &str = "Upload both PDF & Excel files.";

/// Client-only view state. `Default` is the initial state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub search: String,
    pub sort: SortConfig,
    pub expanded: HashMap<String, bool>,
    pub pages: HashMap<String, usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
}

/// How the most recent submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Error,
}

/// Issued by `begin_submission`; proves a submission is in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubmissionTicket {
    generation: u64,
    pub params: SubmissionParameters,
}

/// Handed out when a submission ends; settling it returns the bar to 0
/// unless a newer submission has started since.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct SettleToken {
    generation: u64,
}

/// Ready-to-save export artifact.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
    pub rows: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    records: Vec<Record>,
    summary: Option<ResultSummary>,
    view: ViewState,
    error: Option<String>,
    state: SubmissionState,
    progress: TransferProgress,
    last_outcome: Option<Outcome>,
    generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    // =============================================
    // Accessors
    // =============================================

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn summary(&self) -> Option<&ResultSummary> {
        self.summary.as_ref()
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    /// Whether the submit control should be disabled.
    pub fn is_submitting(&self) -> bool {
        self.state == SubmissionState::Submitting
    }

    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    pub fn progress(&self) -> u8 {
        self.progress.percent()
    }

    pub fn transfer(&self) -> &TransferProgress {
        &self.progress
    }

    // =============================================
    // Submission lifecycle
    // =============================================

    /// Validate inputs and enter `Submitting`.
    ///
    /// A missing file fails before anything else changes except the error
    /// banner; the caller must not touch the network on `Err`.
    pub fn begin_submission(
        &mut self,
        pdf_present: bool,
        excel_present: bool,
        params: SubmissionParameters,
    ) -> Result<SubmissionTicket> {
        if self.is_submitting() {
            return Err(Error::Busy);
        }
        if !pdf_present || !excel_present {
            self.error = Some(MISSING_FILES_MESSAGE.to_string());
            return Err(Error::Validation(MISSING_FILES_MESSAGE.to_string()));
        }

        self.generation += 1;
        self.error = None;
        self.state = SubmissionState::Submitting;
        self.progress.reset();

        Ok(SubmissionTicket {
            generation: self.generation,
            params,
        })
    }

    /// Apply a transport progress event. Ignored outside `Submitting`.
    pub fn record_transfer(&mut self, event: TransferEvent) {
        if self.is_submitting() {
            self.progress.apply(event);
        }
    }

    /// Replace records and summary with the response and reset view state.
    pub fn complete_submission(&mut self, ticket: SubmissionTicket, response: MatchResponse) -> SettleToken {
        self.ensure_current(ticket);
        self.records = response.matched_rows;
        self.summary = Some(response.summary);
        self.view = ViewState::default();
        self.error = None;
        self.progress.complete();
        self.finish(Outcome::Success)
    }

    /// Record the failure message. Records and summary stay as they were.
    pub fn fail_submission(&mut self, ticket: SubmissionTicket, error: &Error) -> SettleToken {
        self.ensure_current(ticket);
        self.error = Some(error.user_message());
        self.finish(Outcome::Error)
    }

    /// Grace period over: drop the bar back to 0.
    pub fn settle_progress(&mut self, token: SettleToken) {
        if token.generation == self.generation && !self.is_submitting() {
            self.progress.reset();
        }
    }

    fn ensure_current(&self, ticket: SubmissionTicket) {
        debug_assert_eq!(ticket.generation, self.generation, "stale submission ticket");
    }

    fn finish(&mut self, outcome: Outcome) -> SettleToken {
        self.state = SubmissionState::Idle;
        self.last_outcome = Some(outcome);
        SettleToken {
            generation: self.generation,
        }
    }

    // =============================================
    // List refresh / clear
    // =============================================

    /// Replace the raw list from `GET /records`. Summary is kept.
    pub fn replace_records(&mut self, records: Vec<Record>) {
        self.records = records;
        self.view = ViewState::default();
    }

    /// Confirmed clear succeeded: back to a fresh session.
    pub fn apply_clear(&mut self) {
        self.records.clear();
        self.summary = None;
        self.view = ViewState::default();
        self.error = None;
    }

    /// Clear failed: only the banner changes.
    pub fn fail_clear(&mut self, error: &Error) {
        self.error = Some(error.user_message());
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    // =============================================
    // View state
    // =============================================

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.view.search = search.into();
    }

    pub fn toggle_sort(&mut self, key: RecordField) {
        self.view.sort = self.view.sort.toggle(key);
    }

    pub fn toggle_group(&mut self, key: &str) {
        let entry = self.view.expanded.entry(key.to_string()).or_insert(false);
        *entry = !*entry;
    }

    /// Expand every group in the current view.
    pub fn expand_all(&mut self) {
        let keys: Vec<String> = self.view().groups.into_iter().map(|g| g.key).collect();
        for key in keys {
            self.view.expanded.insert(key, true);
        }
    }

    /// Move a group's cursor. The value is clamped against the group as it
    /// is now; later filtering clamps again inside the pipeline.
    pub fn set_page(&mut self, key: &str, page: usize) {
        let len = pipeline::filter(&self.records, &self.view.search)
            .iter()
            .filter(|r| r.group_key() == key)
            .count();
        let page = pipeline::clamp_page(page, len, PAGE_SIZE);
        self.view.pages.insert(key.to_string(), page);
    }

    pub fn next_page(&mut self, key: &str) {
        let current = self.current_page(key);
        self.set_page(key, current + 1);
    }

    pub fn prev_page(&mut self, key: &str) {
        let current = self.current_page(key);
        self.set_page(key, current.saturating_sub(1));
    }

    /// Clamped page currently shown for a group (1 for unknown groups).
    pub fn current_page(&self, key: &str) -> usize {
        self.view().group(key).map(|g| g.page).unwrap_or(1)
    }

    /// Derive the displayed view from the current snapshot.
    pub fn view(&self) -> DatasetView<'_> {
        pipeline::derive_view(
            &self.records,
            &self.view.search,
            self.view.sort,
            &self.view.pages,
            &self.view.expanded,
        )
    }

    /// Search-applied records in raw order.
    pub fn filtered(&self) -> Vec<&Record> {
        pipeline::filter(&self.records, &self.view.search)
    }

    /// Export the complete filtered set. Unavailable with an empty raw list.
    pub fn export(&self, format: ExportFormat, timestamp_ms: i64) -> Result<ExportArtifact> {
        if self.records.is_empty() {
            return Err(Error::NothingToExport);
        }
        let filtered = self.filtered();
        let bytes = export_records(&filtered, format)?;
        Ok(ExportArtifact {
            file_name: export_file_name(format, timestamp_ms),
            format,
            rows: filtered.len(),
            bytes,
        })
    }

    pub fn can_export(&self) -> bool {
        !self.records.is_empty()
    }
}
