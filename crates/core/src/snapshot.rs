//! In-memory capture of a rendered page.
//!
//! A `SnapshotNode` is the serialized form (nested, serde friendly). A
//! `SnapshotTree` flattens it into an arena with parent links so that the
//! extractor can walk both down and up the tree through `SnapshotRef`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::RenderedBox;
use crate::error::ProbeError;
use crate::ports::TreeNode;

pub const DOCUMENT_TAG: &str = "#document";

/// Serialized node of a captured page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotNode {
    #[serde(default)]
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Rendered text as captured. When absent the children's texts are used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SnapshotNode>,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    tag: String,
    attributes: BTreeMap<String, String>,
    text: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    parent: Option<usize>,
    children: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct SnapshotTree {
    slots: Vec<Slot>,
}

impl Default for SnapshotTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotTree {
    /// Empty tree holding only a `#document` root.
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                tag: DOCUMENT_TAG.to_string(),
                ..Slot::default()
            }],
        }
    }

    pub fn from_root(root: SnapshotNode) -> Self {
        let mut tree = Self { slots: Vec::new() };
        tree.insert(None, root);
        tree
    }

    fn insert(&mut self, parent: Option<usize>, node: SnapshotNode) -> usize {
        let index = self.slots.len();
        self.slots.push(Slot {
            tag: node.tag,
            attributes: node
                .attributes
                .into_iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value))
                .collect(),
            text: node.text,
            width: node.width,
            height: node.height,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.slots[parent].children.push(index);
        }
        for child in node.children {
            self.insert(Some(index), child);
        }
        index
    }

    pub fn root_id(&self) -> usize {
        0
    }

    pub fn root(&self) -> SnapshotRef<'_> {
        self.node(self.root_id())
    }

    /// Handle to the node at `id`. Ids come from `append` or from a
    /// `SnapshotRef`; an id from another tree is a caller bug.
    pub fn node(&self, id: usize) -> SnapshotRef<'_> {
        assert!(id < self.slots.len(), "node id {id} out of range");
        SnapshotRef {
            tree: self,
            index: id,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Appends a child element under `parent` and returns a builder for it.
    pub fn append(&mut self, parent: usize, tag: &str) -> NodeMut<'_> {
        let id = self.insert(
            Some(parent),
            SnapshotNode {
                tag: tag.to_string(),
                ..SnapshotNode::default()
            },
        );
        NodeMut { tree: self, id }
    }

    pub fn node_mut(&mut self, id: usize) -> NodeMut<'_> {
        assert!(id < self.slots.len(), "node id {id} out of range");
        NodeMut { tree: self, id }
    }

    fn text_of(&self, index: usize) -> String {
        let slot = &self.slots[index];
        if let Some(text) = &slot.text {
            return text.clone();
        }
        slot.children
            .iter()
            .map(|&child| self.text_of(child))
            .filter(|text| !text.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Builder handle returned by `SnapshotTree::append`.
pub struct NodeMut<'a> {
    tree: &'a mut SnapshotTree,
    id: usize,
}

impl NodeMut<'_> {
    pub fn attr(self, name: &str, value: &str) -> Self {
        self.tree.slots[self.id]
            .attributes
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn text(self, text: &str) -> Self {
        self.tree.slots[self.id].text = Some(text.to_string());
        self
    }

    pub fn size(self, width: u32, height: u32) -> Self {
        let slot = &mut self.tree.slots[self.id];
        slot.width = Some(width);
        slot.height = Some(height);
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }
}

/// Cheap handle to one node of a `SnapshotTree`.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotRef<'a> {
    tree: &'a SnapshotTree,
    index: usize,
}

impl<'a> SnapshotRef<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    fn slot(&self) -> &'a Slot {
        &self.tree.slots[self.index]
    }
}

impl<'a> TreeNode for SnapshotRef<'a> {
    type Id = usize;

    fn id(&self) -> usize {
        self.index
    }

    fn tag_name(&self) -> &str {
        &self.slot().tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.slot()
            .attributes
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    fn visible_text(&self) -> String {
        self.tree.text_of(self.index)
    }

    fn children(&self) -> Vec<Self> {
        self.slot()
            .children
            .iter()
            .map(|&index| SnapshotRef {
                tree: self.tree,
                index,
            })
            .collect()
    }

    fn child_count(&self) -> usize {
        self.slot().children.len()
    }

    fn parent(&self) -> Option<Self> {
        self.slot().parent.map(|index| SnapshotRef {
            tree: self.tree,
            index,
        })
    }

    fn rendered_box(&self) -> Result<RenderedBox, ProbeError> {
        let slot = self.slot();
        match (slot.width, slot.height) {
            (Some(width), Some(height)) => Ok(RenderedBox { width, height }),
            _ => Err(ProbeError::GeometryUnavailable {
                tag: slot.tag.clone(),
            }),
        }
    }
}
