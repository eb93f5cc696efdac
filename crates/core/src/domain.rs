use serde::{Deserialize, Serialize};

pub const UNKNOWN_SENDER: &str = "Unknown Sender";
pub const DIRECT_MESSAGE: &str = "Direct Message";

/// One message pulled out of a candidate container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub sender: String,
    pub context: String,
    pub content: String,
    /// Raw timestamp token, only filled when time capture is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

/// Response handed back to the caller of a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<Record>,
}

impl ScanResponse {
    pub fn from_records(data: Vec<Record>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// Rendered box size of a node in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderedBox {
    pub width: u32,
    pub height: u32,
}

/// Which strategy produced the candidate containers of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// A match rule returned the candidates.
    Selector { rule: String },
    /// Candidates were located through timestamp anchors.
    Anchor,
    /// Nothing structured was found.
    None,
}

/// Why a candidate container produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    TooFewLines,
    EmptyContent,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::TooFewLines => f.write_str("too few lines"),
            SkipReason::EmptyContent => f.write_str("no content"),
        }
    }
}
