//! Two-phase transfer progress
//!
//! Upload and response transfer are tracked by independent counters. A
//! single weighting function maps each phase's fraction onto its share of
//! the 0–100 scale:
//!
//! | phase    | range     |
//! |----------|-----------|
//! | Upload   | 0 .. 30   |
//! | Download | 30 .. 100 |
//!
//! The reported percentage never decreases while a submission runs.

use serde::{Deserialize, Serialize};

/// Share of the bar given to the upload phase.
pub const UPLOAD_WEIGHT: f64 = 30.0;
/// Share of the bar given to the response phase.
pub const DOWNLOAD_WEIGHT: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferPhase {
    Upload,
    Download,
}

/// One progress notification from a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEvent {
    pub phase: TransferPhase,
    pub loaded: u64,
    /// `None` when the transport does not know the size.
    pub total: Option<u64>,
}

impl TransferEvent {
    pub fn upload(loaded: u64, total: Option<u64>) -> Self {
        Self { phase: TransferPhase::Upload, loaded, total }
    }

    pub fn download(loaded: u64, total: Option<u64>) -> Self {
        Self { phase: TransferPhase::Download, loaded, total }
    }
}

/// Bytes moved in one phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseCounter {
    pub loaded: u64,
    pub total: Option<u64>,
}

impl PhaseCounter {
    /// Completed fraction, or `None` if the size is unknown.
    pub fn fraction(&self) -> Option<f64> {
        match self.total {
            Some(total) if total > 0 => Some((self.loaded as f64 / total as f64).clamp(0.0, 1.0)),
            _ => None,
        }
    }
}

/// Weighting function: position on the 0–100 scale for a phase fraction.
pub fn phase_percent(phase: TransferPhase, fraction: f64) -> f64 {
    let fraction = fraction.clamp(0.0, 1.0);
    match phase {
        TransferPhase::Upload => fraction * UPLOAD_WEIGHT,
        TransferPhase::Download => UPLOAD_WEIGHT + fraction * DOWNLOAD_WEIGHT,
    }
}

/// Blended progress of a single submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferProgress {
    upload: PhaseCounter,
    download: PhaseCounter,
    percent: f64,
}

impl TransferProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upload(&self) -> PhaseCounter {
        self.upload
    }

    pub fn download(&self) -> PhaseCounter {
        self.download
    }

    /// Apply an event. Events without a known total update the counter but
    /// not the percentage.
    pub fn apply(&mut self, event: TransferEvent) {
        let counter = PhaseCounter { loaded: event.loaded, total: event.total };
        match event.phase {
            TransferPhase::Upload => self.upload = counter,
            TransferPhase::Download => self.download = counter,
        }
        if let Some(fraction) = counter.fraction() {
            self.percent = self.percent.max(phase_percent(event.phase, fraction));
        }
    }

    /// Current percentage as shown on the bar.
    pub fn percent(&self) -> u8 {
        self.percent.clamp(0.0, 100.0).floor() as u8
    }

    pub fn percent_f64(&self) -> f64 {
        self.percent
    }

    pub fn complete(&mut self) {
        self.percent = 100.0;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
