//! YAML frontmatter parsing and rendering.
//!
//! A note may open with a `---`-delimited YAML block. We pull out the
//! keys Grove understands and keep every other scalar key verbatim so
//! that writing the note back doesn't lose anything. Broken YAML is
//! treated as "no frontmatter", never as an error.

use crate::error::Result;
use crate::node::{FrontmatterValue, NodeId, Point};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use tracing::debug;

const NODE_ID_KEY: &str = "node_id";
const TITLE_KEY: &str = "title";
const SUMMARY_KEY: &str = "summary";
const COLOR_KEY: &str = "color";
const POSITION_KEY: &str = "position";
const IS_CONTEXT_NODE_KEY: &str = "isContextNode";
const CONTAINED_NODE_IDS_KEY: &str = "containedNodeIds";

/// Parsed frontmatter of a note.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    pub node_id: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub color: Option<String>,
    pub position: Option<Point>,
    pub is_context_node: Option<bool>,
    pub contained_node_ids: Option<Vec<NodeId>>,
    /// Everything else, scalars only.
    pub extra: BTreeMap<String, FrontmatterValue>,
}

impl Frontmatter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Renders the frontmatter as a `---`-delimited block, ending in a
    /// newline. Returns an empty string when there is nothing to write.
    pub fn render(&self) -> Result<String> {
        if self.is_empty() {
            return Ok(String::new());
        }

        let mut map = Mapping::new();
        let mut put = |key: &str, value: Value| {
            map.insert(Value::String(key.to_string()), value);
        };

        if let Some(id) = &self.node_id {
            put(NODE_ID_KEY, Value::String(id.clone()));
        }
        if let Some(title) = &self.title {
            put(TITLE_KEY, Value::String(title.clone()));
        }
        if let Some(summary) = &self.summary {
            put(SUMMARY_KEY, Value::String(summary.clone()));
        }
        if let Some(color) = &self.color {
            put(COLOR_KEY, Value::String(color.clone()));
        }
        if let Some(position) = self.position {
            let mut p = Mapping::new();
            p.insert(Value::String("x".into()), Value::Number(position.x.into()));
            p.insert(Value::String("y".into()), Value::Number(position.y.into()));
            put(POSITION_KEY, Value::Mapping(p));
        }
        if let Some(flag) = self.is_context_node {
            put(IS_CONTEXT_NODE_KEY, Value::Bool(flag));
        }
        if let Some(ids) = &self.contained_node_ids {
            let seq = ids
                .iter()
                .map(|id| Value::String(id.as_str().to_string()))
                .collect();
            put(CONTAINED_NODE_IDS_KEY, Value::Sequence(seq));
        }
        for (key, value) in &self.extra {
            put(key, scalar_to_yaml(value));
        }

        let yaml = serde_yaml::to_string(&Value::Mapping(map))?;
        Ok(format!("---\n{}---\n", yaml))
    }
}

/// Splits raw note text into its YAML block (if any) and the body.
///
/// The opening `---` must be the very first line. Without a closing
/// `---` line the whole text is body.
pub fn split_frontmatter(content: &str) -> (Option<&str>, &str) {
    let text = content.strip_prefix('\u{feff}').unwrap_or(content);

    let rest = match text.strip_prefix("---") {
        Some(rest) => rest,
        None => return (None, content),
    };
    let rest = match rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')) {
        Some(rest) => rest,
        None => return (None, content),
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }

    (None, content)
}

/// Returns the body of a note with any frontmatter removed.
pub fn strip_frontmatter(content: &str) -> &str {
    split_frontmatter(content).1
}

/// Parses the frontmatter of a note. Missing or malformed frontmatter
/// yields `Frontmatter::default()`.
pub fn extract_frontmatter(content: &str) -> Frontmatter {
    let yaml = match split_frontmatter(content).0 {
        Some(yaml) => yaml,
        None => return Frontmatter::default(),
    };

    let mapping = match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Mapping(mapping)) => mapping,
        Ok(_) => return Frontmatter::default(),
        Err(e) => {
            debug!("Ignoring malformed frontmatter: {}", e);
            return Frontmatter::default();
        }
    };

    let mut fm = Frontmatter::default();

    for (key, value) in mapping {
        let key = match key {
            Value::String(key) => key,
            other => match yaml_to_scalar(&other) {
                Some(scalar) => scalar.to_string(),
                None => continue,
            },
        };
        let value = untag(value);

        match key.as_str() {
            NODE_ID_KEY => fm.node_id = yaml_to_string(&value),
            TITLE_KEY => fm.title = yaml_to_string(&value),
            SUMMARY_KEY => fm.summary = yaml_to_string(&value),
            COLOR_KEY => fm.color = yaml_to_string(&value),
            POSITION_KEY => fm.position = yaml_to_point(&value),
            IS_CONTEXT_NODE_KEY => fm.is_context_node = value.as_bool(),
            CONTAINED_NODE_IDS_KEY => {
                if let Value::Sequence(items) = &value {
                    fm.contained_node_ids = Some(
                        items
                            .iter()
                            .filter_map(yaml_to_string)
                            .map(NodeId::new)
                            .collect(),
                    );
                }
            }
            _ => match yaml_to_scalar(&value) {
                Some(scalar) => {
                    fm.extra.insert(key, scalar);
                }
                None => debug!("Dropping non-scalar frontmatter key '{}'", key),
            },
        }
    }

    fm
}

fn untag(value: Value) -> Value {
    match value {
        Value::Tagged(tagged) => untag(tagged.value),
        other => other,
    }
}

fn yaml_to_scalar(value: &Value) -> Option<FrontmatterValue> {
    match value {
        Value::Null => Some(FrontmatterValue::Null),
        Value::Bool(b) => Some(FrontmatterValue::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(FrontmatterValue::Integer(i)),
            None => n.as_f64().map(FrontmatterValue::Float),
        },
        Value::String(s) => Some(FrontmatterValue::String(s.clone())),
        Value::Tagged(tagged) => yaml_to_scalar(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Scalar as text; `None` for null and non-scalars.
fn yaml_to_string(value: &Value) -> Option<String> {
    match yaml_to_scalar(value)? {
        FrontmatterValue::Null => None,
        scalar => Some(scalar.to_string()),
    }
}

fn yaml_to_point(value: &Value) -> Option<Point> {
    let map = value.as_mapping()?;
    let x = map.get("x")?.as_f64()?;
    let y = map.get("y")?.as_f64()?;
    Some(Point { x, y })
}

fn scalar_to_yaml(value: &FrontmatterValue) -> Value {
    match value {
        FrontmatterValue::Null => Value::Null,
        FrontmatterValue::Bool(b) => Value::Bool(*b),
        FrontmatterValue::Integer(i) => Value::Number((*i).into()),
        FrontmatterValue::Float(x) => Value::Number((*x).into()),
        FrontmatterValue::String(s) => Value::String(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_known_and_extra_keys() {
        let content = "---\nnode_id: 42\ntitle: Roses\nsummary: \"About roses\"\ncolor: '#ff0000'\nmood: calm\nweight: 1.5\npinned: true\n---\n# Heading\nbody\n";
        let fm = extract_frontmatter(content);

        assert_eq!(fm.node_id.as_deref(), Some("42"));
        assert_eq!(fm.title.as_deref(), Some("Roses"));
        assert_eq!(fm.summary.as_deref(), Some("About roses"));
        assert_eq!(fm.color.as_deref(), Some("#ff0000"));
        assert_eq!(
            fm.extra.get("mood"),
            Some(&FrontmatterValue::String("calm".into()))
        );
        assert_eq!(fm.extra.get("weight"), Some(&FrontmatterValue::Float(1.5)));
        assert_eq!(fm.extra.get("pinned"), Some(&FrontmatterValue::Bool(true)));
        assert_eq!(fm.extra.len(), 3);
    }

    #[test]
    fn test_missing_frontmatter_is_empty() {
        assert!(extract_frontmatter("# Just a heading\n\ntext").is_empty());
        assert!(extract_frontmatter("").is_empty());
    }

    #[test]
    fn test_malformed_frontmatter_is_empty() {
        // Unclosed block
        assert!(extract_frontmatter("---\ntitle: x\nno closing").is_empty());
        // Broken YAML
        assert!(extract_frontmatter("---\ntitle: [unterminated\n---\nbody").is_empty());
        // Not a mapping
        assert!(extract_frontmatter("---\n- a\n- b\n---\nbody").is_empty());
    }

    #[test]
    fn test_nested_extras_are_dropped() {
        let fm = extract_frontmatter("---\ntags:\n  - a\n  - b\nkeep: yes\n---\n");
        assert!(!fm.extra.contains_key("tags"));
        assert!(fm.extra.contains_key("keep"));
    }

    #[test]
    fn test_context_node_keys() {
        let content = "---\nisContextNode: true\ncontainedNodeIds:\n  - a\n  - b/c\nposition:\n  x: 10\n  y: -2.5\n---\n";
        let fm = extract_frontmatter(content);

        assert_eq!(fm.is_context_node, Some(true));
        assert_eq!(
            fm.contained_node_ids,
            Some(vec![NodeId::new("a"), NodeId::new("b/c")])
        );
        assert_eq!(fm.position, Some(Point { x: 10.0, y: -2.5 }));
    }

    #[test]
    fn test_split_frontmatter_body() {
        let (yaml, body) = split_frontmatter("---\na: 1\n---\nhello\n");
        assert_eq!(yaml, Some("a: 1\n"));
        assert_eq!(body, "hello\n");

        let (yaml, body) = split_frontmatter("no fm");
        assert!(yaml.is_none());
        assert_eq!(body, "no fm");

        // A horizontal rule later in the file isn't frontmatter
        let (yaml, _) = split_frontmatter("text\n---\nmore\n---\n");
        assert!(yaml.is_none());
    }

    #[test]
    fn test_render_preserves_extras() {
        let content = "---\nnode_id: abc\ncolor: blue\nrating: 4\nnote: 'true'\nempty: null\n---\nbody";
        let fm = extract_frontmatter(content);

        let rendered = fm.render().unwrap();
        assert!(rendered.starts_with("---\n"));
        assert!(rendered.ends_with("---\n"));
        assert_eq!(extract_frontmatter(&rendered), fm);
        assert_eq!(
            fm.extra.get("note"),
            Some(&FrontmatterValue::String("true".into()))
        );
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(Frontmatter::default().render().unwrap(), "");
    }
}
