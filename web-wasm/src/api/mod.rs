//! Remote service access

pub mod matcher;
