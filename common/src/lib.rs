//! Gazette Matcher Common Library
//!
//! Record model, dataset pipeline and session store shared by the CLI and
//! the Web (WASM) client.

pub mod record;
pub mod params;
pub mod collate;
pub mod pipeline;
pub mod highlight;
pub mod progress;
pub mod session;
pub mod export;
pub mod error;

pub use record::{Record, RecordField, UNKNOWN_DATE};
pub use params::{MatchMode, MatchResponse, RemoteErrorBody, ResultSummary, SubmissionParameters, Threshold};
pub use pipeline::{derive_view, DatasetView, GroupPage, SortConfig, SortDirection, PAGE_SIZE};
pub use highlight::{render_cell, Cell, Segment, NOT_AVAILABLE};
pub use progress::{TransferEvent, TransferPhase, TransferProgress};
pub use session::{ExportArtifact, Outcome, Session, SettleToken, SubmissionState, SubmissionTicket, ViewState};
pub use export::{export_file_name, ExportFormat};
pub use error::{Error, Result};
