//! Static extraction tables.
//!
//! Everything that tends to change when the host page ships a new layout
//! lives here as data: the selector cascade, the timestamp grammar, the
//! sender/context lookups and the action-phrase filter. A JSON file with the
//! same shape can replace any part of it; omitted fields keep their defaults.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One entry of the selector cascade. Lower `priority` runs first; equal
/// priorities keep their listed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRule {
    pub selector: String,
    #[serde(default)]
    pub priority: u32,
}

impl MatchRule {
    pub fn new(selector: &str, priority: u32) -> Self {
        Self {
            selector: selector.to_string(),
            priority,
        }
    }
}

/// Alternatives a short leaf text must fully match to count as a timestamp.
/// Each entry is a regex fragment; matching is anchored and case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestampGrammar {
    pub alternatives: Vec<String>,
}

impl Default for TimestampGrammar {
    fn default() -> Self {
        let alternatives = [
            r"\d{1,2}:\d{2}\s?(?:AM|PM)",
            "Yesterday",
            "Today",
            "Mon",
            "Tue",
            "Wed",
            "Thu",
            "Fri",
            "Sat",
            "Sun",
            r"\d{1,2}/\d{1,2}",
        ];
        Self {
            alternatives: alternatives.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TimestampGrammar {
    pub fn to_pattern(&self) -> String {
        format!("(?i)^(?:{})$", self.alternatives.join("|"))
    }
}

/// Limits for the timestamp-anchor walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorLimits {
    /// Anchor text must be shorter than this (trimmed, in chars).
    pub max_anchor_len: usize,
    /// How many ancestors are inspected per anchor.
    pub max_depth: usize,
    pub min_container_text: usize,
    pub min_width: u32,
    pub max_height: u32,
}

impl Default for AnchorLimits {
    fn default() -> Self {
        Self {
            max_anchor_len: 15,
            max_depth: 8,
            min_container_text: 30,
            min_width: 200,
            max_height: 600,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierLimits {
    pub min_lines: usize,
    /// Content lines shorter than this are treated as metadata.
    pub min_content_line: usize,
    pub max_content: usize,
    /// Full-text fallback needs this many chars beyond the sender.
    pub fallback_extra: usize,
}

impl Default for ClassifierLimits {
    fn default() -> Self {
        Self {
            min_lines: 2,
            min_content_line: 6,
            max_content: 500,
            fallback_extra: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub match_rules: Vec<MatchRule>,
    pub timestamp_grammar: TimestampGrammar,
    pub sender_markers: String,
    pub group_links: String,
    pub action_phrases: Vec<String>,
    pub day_markers: Vec<String>,
    /// Restricts which leaves may act as anchors; every leaf when unset.
    pub anchor_scope: Option<String>,
    /// Direct matches below this count trigger the anchor fallback.
    pub fallback_threshold: usize,
    pub anchor: AnchorLimits,
    pub classifier: ClassifierLimits,
    pub capture_time: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        let match_rules = [
            r#"div[role="listitem"]"#,
            r#"div[data-test-id="message-item"]"#,
            r#"div[data-test-id^="mention-"]"#,
            ".MentionItem",
            r#"div[class*="styles-item"]"#,
            r#"div[class*="MessageItem"]"#,
        ]
        .iter()
        .enumerate()
        .map(|(rank, selector)| MatchRule::new(selector, rank as u32))
        .collect();

        Self {
            match_rules,
            timestamp_grammar: TimestampGrammar::default(),
            sender_markers: r#"span[class*="sender"], strong, [data-test-id="message-sender"]"#
                .to_string(),
            group_links: r#"a[href*="/teams/"], a[href*="/glip/groups"]"#.to_string(),
            action_phrases: ["replied to", "shared a", "added", "pinned"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            day_markers: vec!["Today".to_string(), "Yesterday".to_string()],
            anchor_scope: None,
            fallback_threshold: 2,
            anchor: AnchorLimits::default(),
            classifier: ClassifierLimits::default(),
            capture_time: false,
        }
    }
}

impl ExtractorConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }
}
