//! Gazette Matcher
//!
//! Command-line client for the gazette/registry matching service: submits
//! the two source documents, then searches, pages and exports the matched
//! records.

pub mod cli;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod logging;
pub mod render;
