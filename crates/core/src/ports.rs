use std::error::Error;
use std::fmt::Debug;
use std::hash::Hash;

use crate::domain::{RenderedBox, ScanResponse, SkipReason};
use crate::error::ProbeError;
use crate::selector::Selector;
use crate::snapshot::SnapshotTree;

pub type Result<T> = std::result::Result<T, Box<dyn Error + Send + Sync>>;

/// Read-only view of a rendered document node.
///
/// Implementations only need the primitive accessors; the structural queries
/// default to a pre-order walk over descendants (the node itself excluded).
/// A host backed by a live layout engine may override them.
pub trait TreeNode: Clone {
    type Id: Copy + Eq + Hash + Debug;

    fn id(&self) -> Self::Id;

    fn tag_name(&self) -> &str;

    /// Attribute lookup; names are compared lowercase.
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Rendered text of the node, line breaks included.
    fn visible_text(&self) -> String;

    fn children(&self) -> Vec<Self>;

    fn child_count(&self) -> usize {
        self.children().len()
    }

    fn parent(&self) -> Option<Self>;

    fn rendered_box(&self) -> std::result::Result<RenderedBox, ProbeError>;

    fn select_all(&self, selector: &Selector) -> std::result::Result<Vec<Self>, ProbeError> {
        let mut found = Vec::new();
        let mut stack: Vec<Self> = self.children().into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if selector.matches(&node) {
                found.push(node.clone());
            }
            stack.extend(node.children().into_iter().rev());
        }
        Ok(found)
    }

    fn select_first(&self, selector: &Selector) -> std::result::Result<Option<Self>, ProbeError> {
        let mut stack: Vec<Self> = self.children().into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if selector.matches(&node) {
                return Ok(Some(node));
            }
            stack.extend(node.children().into_iter().rev());
        }
        Ok(None)
    }

    /// All descendants in document order.
    fn descendants(&self) -> Vec<Self> {
        let mut out = Vec::new();
        let mut stack: Vec<Self> = self.children().into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            stack.extend(node.children().into_iter().rev());
            out.push(node);
        }
        out
    }
}

/// Diagnostic sink for a scan. Every method defaults to a no-op; none of them
/// can change what the scan returns.
pub trait ScanObserver {
    fn rule_matched(&self, _rule: &str, _count: usize) {}

    fn selectors_exhausted(&self) {}

    fn anchor_fallback_started(&self, _direct_count: usize) {}

    fn anchors_found(&self, _count: usize) {}

    fn anchor_discarded(&self, _anchor_text: &str) {}

    fn containers_located(&self, _count: usize) {}

    fn probe_failed(&self, _stage: &str, _error: &ProbeError) {}

    fn candidate_skipped(&self, _index: usize, _reason: SkipReason) {}

    fn candidate_failed(&self, _index: usize, _error: &ProbeError) {}

    fn duplicates_removed(&self, _count: usize) {}

    fn scan_completed(&self, _count: usize) {}
}

/// Loads a captured page into an in-memory tree.
pub trait DocumentSource: Send + Sync {
    fn load(&self) -> Result<SnapshotTree>;
}

/// Trait for delivering a scan response
/// This is a port (interface) that defines how the core communicates with output adapters
pub trait RecordWriter: Send + Sync {
    fn write(&self, response: &ScanResponse) -> Result<()>;
}
