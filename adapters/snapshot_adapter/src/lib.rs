use std::fs;
use std::path::{Path, PathBuf};

use mention_core::ports::{DocumentSource, Result};
use mention_core::snapshot::{SnapshotNode, SnapshotTree};
use mention_core::utils::text_lines;
use scraper::{ElementRef, Html, Node};
use thiserror::Error;
use tracing::debug;

/// Attributes a capture script writes with each element's bounding box.
pub const WIDTH_ATTR: &str = "data-rendered-width";
pub const HEIGHT_ATTR: &str = "data-rendered-height";

const SKIPPED_TAGS: &[&str] = &["head", "script", "style", "noscript", "template"];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tr", "ul",
];

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported snapshot format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Html,
}

impl SnapshotFormat {
    pub fn from_path(path: &Path) -> std::result::Result<Self, SnapshotError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "json" => Ok(SnapshotFormat::Json),
            "html" | "htm" => Ok(SnapshotFormat::Html),
            _ => Err(SnapshotError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// File-backed implementation of the DocumentSource trait
pub struct SnapshotFileSource {
    path: PathBuf,
}

impl SnapshotFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn read(&self) -> std::result::Result<SnapshotTree, SnapshotError> {
        let format = SnapshotFormat::from_path(&self.path)?;
        let raw = fs::read_to_string(&self.path).map_err(|source| SnapshotError::Io {
            path: self.path.clone(),
            source,
        })?;

        let tree = match format {
            SnapshotFormat::Json => json_to_tree(&raw)?,
            SnapshotFormat::Html => html_to_tree(&raw),
        };
        debug!(path = %self.path.display(), nodes = tree.len(), "Loaded snapshot");
        Ok(tree)
    }
}

impl DocumentSource for SnapshotFileSource {
    fn load(&self) -> Result<SnapshotTree> {
        Ok(self.read()?)
    }
}

pub fn json_to_tree(raw: &str) -> std::result::Result<SnapshotTree, SnapshotError> {
    let root: SnapshotNode = serde_json::from_str(raw)?;
    Ok(SnapshotTree::from_root(root))
}

/// Builds a tree from an HTML capture. Each element's visible text is
/// derived from its content and geometry comes from the rendered-size
/// attributes; elements without them report no geometry.
pub fn html_to_tree(html: &str) -> SnapshotTree {
    let document = Html::parse_document(html);
    let mut tree = SnapshotTree::new();
    let root = tree.root_id();
    append_element(&mut tree, root, document.root_element());
    tree
}

fn append_element(tree: &mut SnapshotTree, parent: usize, element: ElementRef<'_>) -> usize {
    let value = element.value();
    let mut node = tree.append(parent, value.name());
    for (name, attr_value) in value.attrs() {
        node = node.attr(name, attr_value);
    }
    if let (Some(width), Some(height)) = (
        pixel_attr(value.attr(WIDTH_ATTR)),
        pixel_attr(value.attr(HEIGHT_ATTR)),
    ) {
        node = node.size(width, height);
    }
    let id = node.id();

    for child in element.children() {
        if let Some(child) = ElementRef::wrap(child) {
            if !SKIPPED_TAGS.contains(&child.value().name()) {
                append_element(tree, id, child);
            }
        }
    }

    let text = rendered_text(element);
    tree.node_mut(id).text(&text);
    id
}

fn pixel_attr(raw: Option<&str>) -> Option<u32> {
    let value: f64 = raw?.trim().trim_end_matches("px").parse().ok()?;
    (value.is_finite() && value >= 0.0).then(|| value.round() as u32)
}

/// Approximates rendered text: block elements and `<br>` break lines,
/// whitespace runs collapse to one space.
fn rendered_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    text_lines(&out).join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_collapsed(out, text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_TAGS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push('\n');
                }
                collect_text(child, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

fn push_collapsed(out: &mut String, text: &str) {
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use mention_core::{Extractor, ExtractorConfig, TreeNode};

    const CAPTURE: &str = r#"<!DOCTYPE html>
<html>
  <head><title>Mentions</title><style>.x { color: red }</style></head>
  <body data-rendered-width="1280" data-rendered-height="4000">
    <div class="list" data-rendered-width="900" data-rendered-height="3600">
      <div class="card-x9" data-rendered-width="320" data-rendered-height="110.4">
        <div class="row"><span>Dave Wilson</span> <span>10:31 AM</span></div>
        <p>Can we move the standup<br>to 10?</p>
      </div>
      <script>console.log("ignored")</script>
    </div>
  </body>
</html>"#;

    #[test]
    fn test_html_capture_text_and_geometry() {
        let tree = html_to_tree(CAPTURE);
        let card = tree
            .root()
            .descendants()
            .into_iter()
            .find(|n| n.attribute("class") == Some("card-x9"))
            .unwrap();

        assert_eq!(
            card.visible_text(),
            "Dave Wilson 10:31 AM\nCan we move the standup\nto 10?"
        );
        let rendered = card.rendered_box().unwrap();
        assert_eq!((rendered.width, rendered.height), (320, 110));
        assert!(tree
            .root()
            .descendants()
            .iter()
            .all(|n| n.tag_name() != "script" && n.tag_name() != "head"));
    }

    #[test]
    fn test_html_capture_feeds_anchor_fallback() {
        let html = r#"<html><body>
            <section data-rendered-width="900" data-rendered-height="3000">
              <div data-rendered-width="300" data-rendered-height="120">
                <div>Mallory</div>
                <div><span>Yesterday</span></div>
                <p>Release notes are ready for review</p>
              </div>
            </section>
        </body></html>"#;
        let tree = html_to_tree(html);
        let extractor = Extractor::new(&ExtractorConfig::default()).unwrap();
        let records = extractor.scan(&tree.root()).records;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sender, "Mallory");
        assert_eq!(records[0].content, "Release notes are ready for review");
    }

    #[test]
    fn test_unmeasured_meta_row_inside_card() {
        let html = r#"<html><body>
            <div class="card" data-rendered-width="320" data-rendered-height="110"><div class="row"><span>Dave Wilson mentioned you</span> <span>10:31 AM</span></div><p>Can we move the standup to ten?</p></div>
        </body></html>"#;
        let tree = html_to_tree(html);
        let extractor = Extractor::new(&ExtractorConfig::default()).unwrap();
        let records = extractor.scan(&tree.root()).records;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "Can we move the standup to ten?");
    }

    #[test]
    fn test_pixel_attr_parsing() {
        assert_eq!(pixel_attr(Some("300")), Some(300));
        assert_eq!(pixel_attr(Some(" 199.6px ")), Some(200));
        assert_eq!(pixel_attr(Some("-4")), None);
        assert_eq!(pixel_attr(Some("wide")), None);
        assert_eq!(pixel_attr(None), None);
    }

    #[test]
    fn test_json_file_source() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"tag":"body","children":[{{"tag":"div","attributes":{{"role":"listitem"}},"text":"Alice\nin Team Sync\nPlease review the PR today"}}]}}"#
        )
        .unwrap();

        let tree = SnapshotFileSource::new(file.path()).load().unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.root().children()[0].attribute("role"), Some("listitem"));
    }

    #[test]
    fn test_html_file_source() {
        let mut file = tempfile::Builder::new().suffix(".HTML").tempfile().unwrap();
        write!(file, "<html><body><p>hello</p></body></html>").unwrap();

        let tree = SnapshotFileSource::new(file.path()).read().unwrap();
        assert_eq!(tree.root().visible_text(), "hello");
    }

    #[test]
    fn test_source_errors() {
        assert!(matches!(
            SnapshotFileSource::new("page.txt").read(),
            Err(SnapshotError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            SnapshotFileSource::new("/nonexistent/page.json").read(),
            Err(SnapshotError::Io { .. })
        ));
        assert!(matches!(json_to_tree("[1, 2]"), Err(SnapshotError::Json(_))));
    }
}
