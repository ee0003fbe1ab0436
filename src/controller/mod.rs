//! Submission and reset controllers.
//!
//! The controller is the only writer of its [`Session`]. Transfer events from
//! the client arrive over a channel and are applied here, in between polls of
//! the request future.

mod confirm;

pub use confirm::{AssumeNo, AssumeYes, Confirm, DialoguerConfirm};

use crate::client::{MatchService, UploadFile};
use crate::config::{ClearFailurePolicy, Config};
use gazette_matcher_common::error::FETCH_FAILED_MESSAGE;
use gazette_matcher_common::session::MISSING_FILES_MESSAGE;
use gazette_matcher_common::{Error, Result, Session, SettleToken, SubmissionParameters};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Prompt shown before a destructive clear.
pub const CLEAR_PROMPT: &str = "Clear ALL stored matches?";

/// How a clear request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Cleared,
    Declined,
}

pub struct Controller<S: MatchService> {
    service: S,
    session: Session,
    timeout: Duration,
    grace: Duration,
    clear_failure: ClearFailurePolicy,
    pending_settle: Option<(Instant, SettleToken)>,
}

impl<S: MatchService> Controller<S> {
    pub fn new(service: S, config: &Config) -> Self {
        Self {
            service,
            session: Session::new(),
            timeout: config.timeout(),
            grace: config.progress_grace(),
            clear_failure: config.clear_failure,
            pending_settle: None,
        }
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Current bar value. Applies the post-submission grace reset once due.
    pub fn progress(&mut self) -> u8 {
        self.settle_if_due();
        self.session.progress()
    }

    fn settle_if_due(&mut self) {
        if let Some((due, token)) = self.pending_settle {
            if Instant::now() >= due {
                self.session.settle_progress(token);
                self.pending_settle = None;
            }
        }
    }

    // =============================================
    // Submission
    // =============================================

    /// Run one submission to completion.
    ///
    /// `on_progress` is called with the bar value after every transfer event
    /// and once more when the submission settles.
    pub async fn submit(
        &mut self,
        pdf: Option<UploadFile>,
        excel: Option<UploadFile>,
        params: SubmissionParameters,
        mut on_progress: impl FnMut(u8),
    ) -> Result<()> {
        self.settle_if_due();

        let ticket = self.session.begin_submission(pdf.is_some(), excel.is_some(), params)?;
        let (Some(pdf), Some(excel)) = (pdf, excel) else {
            return Err(Error::Validation(MISSING_FILES_MESSAGE.to_string()));
        };
        self.pending_settle = None;
        on_progress(self.session.progress());

        let (tx, mut rx) = mpsc::unbounded_channel();
        let outcome = {
            let request = tokio::time::timeout(
                self.timeout,
                self.service.submit_match(&pdf, &excel, &ticket.params, tx),
            );
            tokio::pin!(request);

            loop {
                tokio::select! {
                    result = &mut request => break result,
                    Some(event) = rx.recv() => {
                        self.session.record_transfer(event);
                        on_progress(self.session.progress());
                    }
                }
            }
        };
        while let Ok(event) = rx.try_recv() {
            self.session.record_transfer(event);
            on_progress(self.session.progress());
        }

        let result = outcome.unwrap_or_else(|_| Err(Error::Timeout(self.timeout.as_secs())));
        let (token, result) = match result {
            Ok(response) => {
                info!(rows = response.matched_rows.len(), "submission succeeded");
                (self.session.complete_submission(ticket, response), Ok(()))
            }
            Err(err) => {
                warn!(error = %err, "submission failed");
                (self.session.fail_submission(ticket, &err), Err(err))
            }
        };
        on_progress(self.session.progress());

        self.pending_settle = Some((Instant::now() + self.grace, token));
        self.settle_if_due();
        result
    }

    // =============================================
    // Refresh / clear
    // =============================================

    /// Replace the list with what the server currently stores.
    pub async fn refresh(&mut self) -> Result<usize> {
        match self.service.fetch_records().await {
            Ok(records) => {
                let count = records.len();
                self.session.replace_records(records);
                debug!(count, "records refreshed");
                Ok(count)
            }
            Err(err) => {
                warn!(error = %err, "refresh failed");
                self.session.set_error(FETCH_FAILED_MESSAGE);
                Err(err)
            }
        }
    }

    /// Ask, then delete everything stored remotely and reset the session.
    ///
    /// Declining does nothing. On failure the banner is set and the local
    /// list is reconciled according to the configured policy.
    pub async fn clear(&mut self, confirm: &dyn Confirm) -> Result<ClearOutcome> {
        if !confirm.confirm(CLEAR_PROMPT) {
            debug!("clear declined");
            return Ok(ClearOutcome::Declined);
        }

        match self.service.clear_records().await {
            Ok(()) => {
                info!("records cleared");
                self.session.apply_clear();
                Ok(ClearOutcome::Cleared)
            }
            Err(err) => {
                let err = Error::Clear(Box::new(err));
                warn!(error = %err, "clear failed");
                if self.clear_failure == ClearFailurePolicy::Refetch {
                    match self.service.fetch_records().await {
                        Ok(records) => self.session.replace_records(records),
                        Err(refetch) => debug!(error = %refetch, "reconcile after failed clear also failed"),
                    }
                }
                self.session.fail_clear(&err);
                Err(err)
            }
        }
    }
}
