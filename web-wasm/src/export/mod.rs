//! Export (WASM)

pub mod download;

pub use download::download_artifact;
