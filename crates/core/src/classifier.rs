//! Turns one candidate container into at most one `Record`.

use regex::Regex;

use crate::config::ClassifierLimits;
use crate::domain::{Record, SkipReason, DIRECT_MESSAGE, UNKNOWN_SENDER};
use crate::error::ProbeError;
use crate::ports::TreeNode;
use crate::selector::Selector;
use crate::utils::{char_len, strip_colons, text_lines, truncate_chars};

/// Marks a line that carries only the group label, e.g. "in Team Sync".
const CONTEXT_PREFIX: &str = "in ";
const CONTEXT_DELIMITER: &str = " in ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Record(Record),
    Skipped(SkipReason),
}

#[derive(Debug, Clone)]
pub struct FieldClassifier {
    pub(crate) sender_markers: Selector,
    pub(crate) group_links: Selector,
    pub(crate) actions: Regex,
    pub(crate) day_markers: Regex,
    pub(crate) timestamps: Regex,
    pub(crate) limits: ClassifierLimits,
    pub(crate) capture_time: bool,
}

impl FieldClassifier {
    pub fn classify<N: TreeNode>(&self, node: &N) -> Result<Classification, ProbeError> {
        let full_text = node.visible_text();
        let lines = text_lines(&full_text);
        if lines.len() < self.limits.min_lines {
            return Ok(Classification::Skipped(SkipReason::TooFewLines));
        }

        let sender = self.sender(node, &lines)?;
        let context = self.context(node, &lines)?;

        let mut content = self.content(&lines, &sender);
        if content.is_empty() && char_len(&full_text) > char_len(&sender) + self.limits.fallback_extra
        {
            content = full_text.replacen(&sender, "", 1).trim().to_string();
        }

        let content = truncate_chars(content.trim(), self.limits.max_content)
            .trim_end()
            .to_string();
        if content.is_empty() {
            return Ok(Classification::Skipped(SkipReason::EmptyContent));
        }

        let sender = strip_colons(&sender).trim().to_string();
        let time = if self.capture_time {
            lines.iter().find(|line| self.timestamps.is_match(line)).cloned()
        } else {
            None
        };

        Ok(Classification::Record(Record {
            sender: non_empty_or(sender, UNKNOWN_SENDER),
            context: non_empty_or(context, DIRECT_MESSAGE),
            content,
            time,
        }))
    }

    /// Explicit sender markup first, then the first line unless it is a day
    /// divider.
    fn sender<N: TreeNode>(&self, node: &N, lines: &[String]) -> Result<String, ProbeError> {
        if let Some(marked) = node.select_first(&self.sender_markers)? {
            let text = text_lines(&marked.visible_text()).join(" ");
            if !text.is_empty() {
                return Ok(text);
            }
        }

        match lines.first() {
            Some(first) if !self.day_markers.is_match(first) => Ok(first.clone()),
            _ => Ok(UNKNOWN_SENDER.to_string()),
        }
    }

    fn context<N: TreeNode>(&self, node: &N, lines: &[String]) -> Result<String, ProbeError> {
        for line in lines {
            if let Some(rest) = line.strip_prefix(CONTEXT_PREFIX) {
                return Ok(rest.trim().to_string());
            }
            if let Some((_, rest)) = line.split_once(CONTEXT_DELIMITER) {
                return Ok(rest.trim().to_string());
            }
        }

        if let Some(link) = node.select_first(&self.group_links)? {
            let text = link.visible_text().trim().to_string();
            if !text.is_empty() {
                return Ok(text);
            }
        }
        Ok(DIRECT_MESSAGE.to_string())
    }

    fn content(&self, lines: &[String], sender: &str) -> String {
        lines
            .iter()
            .filter(|line| !line.contains(sender))
            .filter(|line| !line.starts_with(CONTEXT_PREFIX))
            .filter(|line| !self.actions.is_match(line))
            .filter(|line| !self.timestamps.is_match(line))
            .filter(|line| char_len(line) >= self.limits.min_content_line)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use crate::extractor::Extractor;
    use crate::snapshot::SnapshotTree;

    fn classifier(capture_time: bool) -> FieldClassifier {
        let config = ExtractorConfig {
            capture_time,
            ..ExtractorConfig::default()
        };
        Extractor::new(&config).unwrap().classifier().clone()
    }

    /// Card whose children are one leaf per line.
    fn card(lines: &[&str]) -> (SnapshotTree, usize) {
        let mut tree = SnapshotTree::new();
        let root = tree.root_id();
        let card = tree.append(root, "div").size(400, 100).id();
        for line in lines {
            tree.append(card, "div").text(line);
        }
        (tree, card)
    }

    fn classify(lines: &[&str]) -> Classification {
        let (tree, id) = card(lines);
        classifier(false).classify(&tree.node(id)).unwrap()
    }

    fn record(lines: &[&str]) -> Record {
        match classify(lines) {
            Classification::Record(record) => record,
            other => panic!("expected a record, got {other:?}"),
        }
    }

    #[test]
    fn test_sender_context_and_content() {
        let record = record(&["Alice", "in Team Sync", "Please review the PR today"]);
        assert_eq!(record.sender, "Alice");
        assert_eq!(record.context, "Team Sync");
        assert_eq!(record.content, "Please review the PR today");
        assert_eq!(record.time, None);
    }

    #[test]
    fn test_action_and_sender_lines_filtered() {
        let record = record(&[
            "Bob",
            "Bob replied to a thread",
            "Here is the update you asked for",
        ]);
        assert_eq!(record.sender, "Bob");
        assert_eq!(record.context, "Direct Message");
        assert_eq!(record.content, "Here is the update you asked for");
    }

    #[test]
    fn test_day_marker_only_card_is_dropped() {
        assert_eq!(
            classify(&["Carol", "Yesterday"]),
            Classification::Skipped(SkipReason::EmptyContent)
        );
    }

    #[test]
    fn test_single_line_card_is_dropped() {
        assert_eq!(
            classify(&["Just one line of text that is fairly long"]),
            Classification::Skipped(SkipReason::TooFewLines)
        );
    }

    #[test]
    fn test_day_marker_first_line_keeps_default_sender() {
        let record = record(&["Yesterday", "Deploy window moved to Friday"]);
        assert_eq!(record.sender, UNKNOWN_SENDER);
        assert_eq!(record.content, "Deploy window moved to Friday");
    }

    #[test]
    fn test_short_and_timestamp_lines_filtered() {
        let record = record(&["Dan", "ok", "10:31 AM", "Mon", "Lunch at noon works for me"]);
        assert_eq!(record.content, "Lunch at noon works for me");
    }

    #[test]
    fn test_inline_delimiter_context() {
        let record = record(&["Eve", "Eve mentioned you in Platform Team", "Can you check the alerts?"]);
        assert_eq!(record.context, "Platform Team");
        assert_eq!(record.content, "Can you check the alerts?");
    }

    #[test]
    fn test_sender_marker_and_colon_cleanup() {
        let mut tree = SnapshotTree::new();
        let root = tree.root_id();
        let card = tree.append(root, "div").size(400, 100).id();
        tree.append(card, "strong").text("Frank：");
        tree.append(card, "p").text("The build is green again");

        let result = classifier(false).classify(&tree.node(card)).unwrap();
        let Classification::Record(record) = result else {
            panic!("expected a record");
        };
        assert_eq!(record.sender, "Frank");
        assert_eq!(record.content, "The build is green again");
    }

    #[test]
    fn test_group_link_context() {
        let mut tree = SnapshotTree::new();
        let root = tree.root_id();
        let card = tree.append(root, "div").size(400, 100).id();
        tree.append(card, "div").text("Grace");
        tree.append(card, "a")
            .attr("href", "https://app.example.com/glip/groups/123")
            .text("Release Crew");
        tree.append(card, "p").text("Tagging the release now");

        let result = classifier(false).classify(&tree.node(card)).unwrap();
        let Classification::Record(record) = result else {
            panic!("expected a record");
        };
        assert_eq!(record.context, "Release Crew");
        assert_eq!(record.content, "Release Crew Tagging the release now");
    }

    #[test]
    fn test_content_truncated_to_limit() {
        let long = "x".repeat(700);
        let record = record(&["Heidi", long.as_str()]);
        assert_eq!(record.content.chars().count(), 500);
    }

    #[test]
    fn test_capture_time_extension() {
        let (tree, id) = card(&["Ivan", "Yesterday", "Sprint review notes are up"]);
        let result = classifier(true).classify(&tree.node(id)).unwrap();
        let Classification::Record(record) = result else {
            panic!("expected a record");
        };
        assert_eq!(record.time.as_deref(), Some("Yesterday"));
        assert_eq!(record.content, "Sprint review notes are up");
    }

    #[test]
    fn test_fallback_uses_full_text() {
        let record = record(&[
            "Judy",
            "Judy pinned a message",
            "Judy added Ken to the conversation",
        ]);
        assert_eq!(
            record.content,
            "Judy pinned a message\nJudy added Ken to the conversation"
        );
    }
}
