//! Timestamp-anchored container lookup.
//!
//! Timestamps are short and structurally stable even when the container
//! markup changes, so when the selector cascade comes up short we find the
//! timestamp leaves and climb to the nearest ancestor that looks like a
//! single message card.

use std::collections::HashSet;

use regex::Regex;

use crate::config::AnchorLimits;
use crate::ports::{ScanObserver, TreeNode};
use crate::selector::Selector;
use crate::utils::char_len;

#[derive(Debug, Clone)]
pub struct AnchorLocator {
    grammar: Regex,
    scope: Option<Selector>,
    limits: AnchorLimits,
}

impl AnchorLocator {
    pub fn new(grammar: Regex, scope: Option<Selector>, limits: AnchorLimits) -> Self {
        Self {
            grammar,
            scope,
            limits,
        }
    }

    /// True when the trimmed text is a short, complete timestamp token.
    pub fn is_anchor_text(&self, text: &str) -> bool {
        let text = text.trim();
        !text.is_empty()
            && char_len(text) < self.limits.max_anchor_len
            && self.grammar.is_match(text)
    }

    /// Leaf nodes whose text is a timestamp token, in document order.
    pub fn find_anchors<N: TreeNode>(&self, root: &N) -> Vec<N> {
        root.descendants()
            .into_iter()
            .filter(|node| node.child_count() == 0)
            .filter(|node| self.scope.as_ref().map_or(true, |scope| scope.matches(node)))
            .filter(|node| self.is_anchor_text(&node.visible_text()))
            .collect()
    }

    /// Distinct message containers above the anchors, in anchor order.
    pub fn locate<N: TreeNode>(&self, root: &N, observer: &dyn ScanObserver) -> Vec<N> {
        let anchors = self.find_anchors(root);
        observer.anchors_found(anchors.len());

        let mut seen = HashSet::new();
        let mut containers = Vec::new();
        for anchor in &anchors {
            match self.container_for(anchor, observer) {
                Some(container) => {
                    if seen.insert(container.id()) {
                        containers.push(container);
                    }
                }
                None => observer.anchor_discarded(anchor.visible_text().trim()),
            }
        }

        observer.containers_located(containers.len());
        containers
    }

    /// Climbs at most `max_depth` ancestors looking for a node with enough
    /// text that is wide enough and not taller than a single card. An
    /// ancestor without geometry does not qualify; the walk goes on above it.
    fn container_for<N: TreeNode>(&self, anchor: &N, observer: &dyn ScanObserver) -> Option<N> {
        let limits = &self.limits;
        let mut current = anchor.parent();
        let mut depth = 0;

        while let Some(node) = current {
            if depth >= limits.max_depth {
                break;
            }
            if char_len(&node.visible_text()) > limits.min_container_text {
                match node.rendered_box() {
                    Ok(rendered) => {
                        if rendered.width > limits.min_width && rendered.height < limits.max_height {
                            return Some(node);
                        }
                    }
                    Err(e) => observer.probe_failed("anchor walk", &e),
                }
            }
            current = node.parent();
            depth += 1;
        }
        None
    }
}
