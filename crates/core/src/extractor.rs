//! The scan pipeline: selector cascade, anchor fallback, per-node
//! classification and deduplication.

use regex::Regex;

use crate::anchor::AnchorLocator;
use crate::classifier::{Classification, FieldClassifier};
use crate::config::ExtractorConfig;
use crate::dedup::dedup_records;
use crate::domain::{Record, ScanResponse, Strategy};
use crate::error::ConfigError;
use crate::node_selector::NodeSelector;
use crate::observer::TracingObserver;
use crate::ports::{ScanObserver, TreeNode};
use crate::selector::Selector;

/// Everything a single scan produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub records: Vec<Record>,
    pub strategy: Strategy,
    /// Number of candidate containers handed to the classifier.
    pub candidates: usize,
}

impl ScanOutcome {
    pub fn into_response(self) -> ScanResponse {
        ScanResponse::from_records(self.records)
    }
}

/// Compiled form of an `ExtractorConfig`. Cheap to share; a scan never
/// mutates it or the tree it reads.
#[derive(Debug, Clone)]
pub struct Extractor {
    selector: NodeSelector,
    anchors: AnchorLocator,
    classifier: FieldClassifier,
    fallback_threshold: usize,
}

impl Extractor {
    pub fn new(config: &ExtractorConfig) -> Result<Self, ConfigError> {
        if config.timestamp_grammar.alternatives.is_empty() {
            return Err(ConfigError::EmptyTable("timestamp_grammar"));
        }
        let timestamps = compile_regex("timestamp_grammar", &config.timestamp_grammar.to_pattern())?;

        let anchor_scope = config
            .anchor_scope
            .as_deref()
            .map(|scope| parse_selector("anchor_scope", scope))
            .transpose()?;

        let classifier = FieldClassifier {
            sender_markers: parse_selector("sender_markers", &config.sender_markers)?,
            group_links: parse_selector("group_links", &config.group_links)?,
            actions: phrase_regex("action_phrases", &config.action_phrases, false)?,
            day_markers: phrase_regex("day_markers", &config.day_markers, true)?,
            timestamps: timestamps.clone(),
            limits: config.classifier,
            capture_time: config.capture_time,
        };

        Ok(Self {
            selector: NodeSelector::new(&config.match_rules)?,
            anchors: AnchorLocator::new(timestamps, anchor_scope, config.anchor),
            classifier,
            fallback_threshold: config.fallback_threshold,
        })
    }

    pub fn classifier(&self) -> &FieldClassifier {
        &self.classifier
    }

    pub fn scan<N: TreeNode>(&self, root: &N) -> ScanOutcome {
        self.scan_with(root, &TracingObserver)
    }

    pub fn scan_with<N: TreeNode>(&self, root: &N, observer: &dyn ScanObserver) -> ScanOutcome {
        let direct = self.selector.select(root, observer);
        let mut strategy = match direct.rule {
            Some(rule) => Strategy::Selector { rule },
            None => Strategy::None,
        };
        let mut candidates = direct.nodes;

        // A lone hit usually means the layout changed, not that there is one message.
        if candidates.len() < self.fallback_threshold {
            observer.anchor_fallback_started(candidates.len());
            let located = self.anchors.locate(root, observer);
            if !located.is_empty() {
                candidates = located;
                strategy = Strategy::Anchor;
            }
        }

        let mut records = Vec::new();
        for (index, node) in candidates.iter().enumerate() {
            match self.classifier.classify(node) {
                Ok(Classification::Record(record)) => records.push(record),
                Ok(Classification::Skipped(reason)) => observer.candidate_skipped(index, reason),
                Err(e) => observer.candidate_failed(index, &e),
            }
        }

        let produced = records.len();
        let records = dedup_records(records);
        if records.len() < produced {
            observer.duplicates_removed(produced - records.len());
        }
        observer.scan_completed(records.len());

        ScanOutcome {
            records,
            strategy,
            candidates: candidates.len(),
        }
    }
}

fn parse_selector(field: &str, source: &str) -> Result<Selector, ConfigError> {
    Selector::parse(source).map_err(|source| ConfigError::Selector {
        field: field.to_string(),
        source,
    })
}

fn compile_regex(field: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::Pattern {
        field: field.to_string(),
        source,
    })
}

/// Case-insensitive alternation of literal phrases. `leading` anchors the
/// phrases at the start of the line as whole words.
fn phrase_regex(field: &'static str, phrases: &[String], leading: bool) -> Result<Regex, ConfigError> {
    if phrases.is_empty() {
        return Err(ConfigError::EmptyTable(field));
    }
    let alternation = phrases
        .iter()
        .map(|phrase| regex::escape(phrase))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = if leading {
        format!(r"(?i)^(?:{alternation})\b")
    } else {
        format!("(?i)(?:{alternation})")
    };
    compile_regex(field, &pattern)
}
