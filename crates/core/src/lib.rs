//! Message record extraction from rendered pages with unstable markup.
//!
//! A scan runs the selector cascade first, falls back to timestamp anchors
//! when it yields too little, classifies each candidate container into a
//! `Record`, and drops repeated `(sender, content)` pairs.

pub mod anchor;
pub mod application;
pub mod classifier;
pub mod config;
pub mod dedup;
pub mod domain;
pub mod error;
pub mod extractor;
pub mod node_selector;
pub mod observer;
pub mod ports;
pub mod selector;
pub mod snapshot;
pub mod utils;

pub use config::ExtractorConfig;
pub use domain::{Record, ScanResponse};
pub use extractor::{Extractor, ScanOutcome};
pub use ports::TreeNode;
