//! Delta operation model and block extraction.
//!
//! A "delta" is an ordered list of insert operations representing rich text,
//! in the style of operational-transform document formats:
//!
//! ```text
//! [
//!   { "insert": "Title text" },
//!   { "insert": "\n", "attributes": { "header": 1 } },
//!   { "insert": "Body paragraph.\n" },
//!   { "insert": { "image": { "source": "https://..." } } }
//! ]
//! ```
//!
//! Source APIs hand deltas over in several shapes: a bare operation array,
//! an object wrapping the array under `ops`, a JSON-encoded string of either,
//! or nothing at all. [`to_operations`] pattern-matches those shapes once at
//! the boundary so the extraction pass only ever sees a flat operation list.
//!
//! ## Best-Effort Extraction
//!
//! Malformed input never raises. A string that fails to parse as JSON is a
//! plain paragraph; an operation with no usable `insert` is skipped; an
//! object insert that is not a recognized image becomes a generic embed
//! placeholder. The goal is to salvage as much text as possible from
//! whatever the source API returns.

use serde_json::Value;

/// A list marker style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListType {
    /// Unordered, rendered with a `-` marker.
    Bullet,
    /// Ordered, rendered with a `1.`-style counter.
    Ordered,
}

/// One semantic unit of content extracted from a delta.
///
/// Blocks are produced in document order and are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    /// A heading with its outline level (1-based).
    Heading {
        /// Outline level; 1 is the outermost.
        level: usize,
        /// Heading text, trimmed. May be empty when the source carries a
        /// heading attribute with no text before the newline.
        text: String,
        /// Optional anchor id carried by the source (`header-id` attribute).
        id: Option<String>,
    },
    /// A plain paragraph.
    Paragraph {
        /// Paragraph text, trimmed.
        text: String,
    },
    /// One list item.
    ListItem {
        /// Item text, trimmed.
        text: String,
        /// Marker style.
        list_type: ListType,
    },
    /// An embedded image, reduced to a caption placeholder.
    Image {
        /// Placeholder of the form `[Image: {source}]`.
        caption: String,
    },
    /// Any other embedded object.
    Embed {
        /// Placeholder text, `[Embedded content]`.
        placeholder: String,
    },
}

impl ContentBlock {
    /// The block's display text (caption/placeholder for non-text blocks).
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Heading { text, .. } | Self::Paragraph { text } | Self::ListItem { text, .. } => {
                text
            }
            Self::Image { caption } => caption,
            Self::Embed { placeholder } => placeholder,
        }
    }

    /// The heading level, if this block is a heading.
    #[must_use]
    pub fn heading_level(&self) -> Option<usize> {
        match self {
            Self::Heading { level, .. } => Some(*level),
            _ => None,
        }
    }
}

/// Block-level attributes attached to a delta operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    /// Heading level, if the operation closes a heading line.
    pub header: Option<usize>,
    /// Anchor id for the heading (`header-id` in the wire shape).
    pub header_id: Option<String>,
    /// List marker style, if the operation closes a list item line.
    pub list: Option<ListType>,
}

impl Attributes {
    fn is_empty(&self) -> bool {
        self.header.is_none() && self.list.is_none()
    }

    fn from_value(value: Option<&Value>) -> Self {
        let Some(Value::Object(map)) = value else {
            return Self::default();
        };

        let header = map.get("header").and_then(header_level);
        let header_id = map
            .get("header-id")
            .and_then(Value::as_str)
            .map(str::to_string);
        let list = map.get("list").and_then(list_type);

        Self {
            header,
            header_id,
            list,
        }
    }
}

/// The payload of a delta insert operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Insert {
    /// A text run, possibly spanning multiple lines.
    Text(String),
    /// A non-text embed (image, video, attachment, ...), kept as raw JSON
    /// until block extraction decides what it is.
    Object(Value),
}

/// One normalized delta operation.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaOp {
    /// What the operation inserts.
    pub insert: Insert,
    /// Block-level attributes, applied when a newline in this operation
    /// closes a line.
    pub attributes: Attributes,
}

/// Heading levels below 1 are clamped; a truthy non-numeric value means
/// "heading, level unknown" and defaults to 1, matching source semantics.
fn header_level(value: &Value) -> Option<usize> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some(1),
        Value::Number(n) => {
            let level = n.as_f64().unwrap_or(0.0);
            if level == 0.0 {
                None
            } else {
                Some(level.max(1.0) as usize)
            }
        }
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.parse::<usize>().unwrap_or(1).max(1)),
        _ => Some(1),
    }
}

fn list_type(value: &Value) -> Option<ListType> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if s == "ordered" => Some(ListType::Ordered),
        _ => Some(ListType::Bullet),
    }
}

fn op_from_value(value: &Value) -> Option<DeltaOp> {
    let obj = value.as_object()?;
    let insert = match obj.get("insert")? {
        Value::String(s) => Insert::Text(s.clone()),
        embed @ (Value::Object(_) | Value::Array(_)) => Insert::Object(embed.clone()),
        // retain/delete ops and null inserts carry no content
        _ => return None,
    };
    Some(DeltaOp {
        insert,
        attributes: Attributes::from_value(obj.get("attributes")),
    })
}

/// Normalize any of the accepted delta shapes into a flat operation list.
///
/// Accepted shapes:
///
/// - an array of operation objects
/// - an object with an `ops` array
/// - a JSON-encoded string of either
/// - `null` / anything else, yielding an empty list
///
/// A string that does not parse as JSON becomes a single plain-text insert.
/// Never fails.
#[must_use]
pub fn to_operations(delta: &Value) -> Vec<DeltaOp> {
    match delta {
        Value::Null => Vec::new(),
        Value::Array(items) => {
            if items.iter().all(Value::is_object) {
                items.iter().filter_map(op_from_value).collect()
            } else {
                Vec::new()
            }
        }
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(parsed) => to_operations(&parsed),
            Err(_) => vec![DeltaOp {
                insert: Insert::Text(raw.clone()),
                attributes: Attributes::default(),
            }],
        },
        Value::Object(map) => match map.get("ops") {
            Some(Value::Array(items)) => items.iter().filter_map(op_from_value).collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Extract the ordered block sequence from a delta.
///
/// Walks the operation list once, accumulating a text buffer. Every newline
/// inside a text insert flushes the buffer as one block, typed by the
/// operation's attributes: heading when `header` is present, list item when
/// `list` is present, paragraph otherwise. An empty flush with neither
/// attribute is discarded, but a heading or list attribute preserves the
/// block even with empty text (the source emits such lines).
///
/// An object insert terminates any in-progress text run (flushed as a plain
/// paragraph when non-empty) and yields an [`ContentBlock::Image`] per image
/// reference, or a generic [`ContentBlock::Embed`] when the payload is not
/// recognized as an image.
///
/// Trailing unterminated text is flushed as a final paragraph: with no
/// closing newline there is no operation whose attributes could type it.
#[must_use]
pub fn extract_blocks(delta: &Value) -> Vec<ContentBlock> {
    let ops = to_operations(delta);
    let mut blocks = Vec::new();
    let mut buffer = String::new();

    for op in &ops {
        match &op.insert {
            Insert::Text(text) => {
                let mut remaining = text.as_str();
                while let Some(newline) = remaining.find('\n') {
                    buffer.push_str(&remaining[..newline]);
                    flush_block(&mut buffer, &op.attributes, &mut blocks);
                    remaining = &remaining[newline + 1..];
                }
                buffer.push_str(remaining);
            }
            Insert::Object(embed) => {
                if buffer.trim().is_empty() {
                    buffer.clear();
                } else {
                    flush_block(&mut buffer, &Attributes::default(), &mut blocks);
                }
                push_embed_blocks(embed, &mut blocks);
            }
        }
    }

    if !buffer.trim().is_empty() {
        flush_block(&mut buffer, &Attributes::default(), &mut blocks);
    }

    blocks
}

fn flush_block(buffer: &mut String, attributes: &Attributes, blocks: &mut Vec<ContentBlock>) {
    let text = buffer.trim().to_string();
    buffer.clear();
    if text.is_empty() && attributes.is_empty() {
        return;
    }

    if let Some(level) = attributes.header {
        blocks.push(ContentBlock::Heading {
            level,
            text,
            id: attributes.header_id.clone(),
        });
    } else if let Some(list_type) = attributes.list {
        blocks.push(ContentBlock::ListItem { text, list_type });
    } else {
        blocks.push(ContentBlock::Paragraph { text });
    }
}

fn push_embed_blocks(embed: &Value, blocks: &mut Vec<ContentBlock>) {
    let image = embed.get("image").filter(|v| !v.is_null());
    if let Some(image) = image {
        let entries: Vec<&Value> = match image {
            Value::Array(items) => items.iter().collect(),
            single => vec![single],
        };
        for entry in entries {
            let source = match entry {
                Value::String(s) => s.as_str(),
                other => other
                    .get("source")
                    .and_then(Value::as_str)
                    .unwrap_or("image"),
            };
            blocks.push(ContentBlock::Image {
                caption: format!("[Image: {source}]"),
            });
        }
    } else {
        blocks.push(ContentBlock::Embed {
            placeholder: "[Embedded content]".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_delta_yields_no_blocks() {
        assert!(extract_blocks(&Value::Null).is_empty());
    }

    #[test]
    fn test_ops_wrapper_and_bare_array_agree() {
        let bare = json!([{ "insert": "hello\n" }]);
        let wrapped = json!({ "ops": [{ "insert": "hello\n" }] });
        assert_eq!(extract_blocks(&bare), extract_blocks(&wrapped));
    }

    #[test]
    fn test_json_string_delta() {
        let delta = json!("[{\"insert\": \"hello\\n\"}]");
        let blocks = extract_blocks(&delta);
        assert_eq!(
            blocks,
            vec![ContentBlock::Paragraph {
                text: "hello".to_string()
            }]
        );
    }

    #[test]
    fn test_unparseable_string_is_plain_text() {
        let delta = json!("just some prose, not JSON");
        let blocks = extract_blocks(&delta);
        assert_eq!(
            blocks,
            vec![ContentBlock::Paragraph {
                text: "just some prose, not JSON".to_string()
            }]
        );
    }

    #[test]
    fn test_heading_attribute_types_the_line() {
        let delta = json!([
            { "insert": "Intro" },
            { "insert": "\n", "attributes": { "header": 2, "header-id": "intro" } },
        ]);
        let blocks = extract_blocks(&delta);
        assert_eq!(
            blocks,
            vec![ContentBlock::Heading {
                level: 2,
                text: "Intro".to_string(),
                id: Some("intro".to_string()),
            }]
        );
    }

    #[test]
    fn test_empty_heading_is_preserved() {
        // A lone header attribute with no text still yields a block.
        let delta = json!([{ "insert": "\n", "attributes": { "header": 2 } }]);
        let blocks = extract_blocks(&delta);
        assert_eq!(
            blocks,
            vec![ContentBlock::Heading {
                level: 2,
                text: String::new(),
                id: None,
            }]
        );
    }

    #[test]
    fn test_empty_untyped_line_is_discarded() {
        let delta = json!([{ "insert": "\n\n\n" }]);
        assert!(extract_blocks(&delta).is_empty());
    }

    #[test]
    fn test_list_attribute_maps_to_list_items() {
        let delta = json!([
            { "insert": "one" },
            { "insert": "\n", "attributes": { "list": "ordered" } },
            { "insert": "two" },
            { "insert": "\n", "attributes": { "list": "bullet" } },
            { "insert": "three" },
            { "insert": "\n", "attributes": { "list": "checked" } },
        ]);
        let blocks = extract_blocks(&delta);
        assert_eq!(blocks.len(), 3);
        assert_eq!(
            blocks[0],
            ContentBlock::ListItem {
                text: "one".to_string(),
                list_type: ListType::Ordered
            }
        );
        // Anything other than "ordered" maps to bullet
        assert_eq!(
            blocks[2],
            ContentBlock::ListItem {
                text: "three".to_string(),
                list_type: ListType::Bullet
            }
        );
    }

    #[test]
    fn test_image_single_and_array() {
        let delta = json!([
            { "insert": { "image": "https://cdn.example/a.png" } },
            { "insert": { "image": [{ "source": "b.png" }, { "source": "c.png" }] } },
        ]);
        let blocks = extract_blocks(&delta);
        assert_eq!(
            blocks,
            vec![
                ContentBlock::Image {
                    caption: "[Image: https://cdn.example/a.png]".to_string()
                },
                ContentBlock::Image {
                    caption: "[Image: b.png]".to_string()
                },
                ContentBlock::Image {
                    caption: "[Image: c.png]".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_image_without_source_gets_fallback_caption() {
        let delta = json!([{ "insert": { "image": { "width": 640 } } }]);
        let blocks = extract_blocks(&delta);
        assert_eq!(
            blocks,
            vec![ContentBlock::Image {
                caption: "[Image: image]".to_string()
            }]
        );
    }

    #[test]
    fn test_unrecognized_object_insert_is_embed() {
        let delta = json!([{ "insert": { "video": "https://example/v" } }]);
        let blocks = extract_blocks(&delta);
        assert_eq!(
            blocks,
            vec![ContentBlock::Embed {
                placeholder: "[Embedded content]".to_string()
            }]
        );
    }

    #[test]
    fn test_object_insert_flushes_pending_text() {
        let delta = json!([
            { "insert": "before the image" },
            { "insert": { "image": "a.png" } },
        ]);
        let blocks = extract_blocks(&delta);
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[0],
            ContentBlock::Paragraph {
                text: "before the image".to_string()
            }
        );
    }

    #[test]
    fn test_trailing_unterminated_text_is_a_paragraph() {
        // The closing newline carries the attributes; without one, the
        // trailing run is an attribute-less paragraph.
        let delta = json!([{ "insert": "no newline here" }]);
        let blocks = extract_blocks(&delta);
        assert_eq!(
            blocks,
            vec![ContentBlock::Paragraph {
                text: "no newline here".to_string()
            }]
        );
    }

    #[test]
    fn test_multiline_insert_flushes_per_newline() {
        let delta = json!([{ "insert": "first\nsecond\nthird" }]);
        let blocks = extract_blocks(&delta);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].text(), "first");
        assert_eq!(blocks[2].text(), "third");
    }

    #[test]
    fn test_array_with_non_object_members_is_empty() {
        let delta = json!([{ "insert": "a\n" }, 42]);
        assert!(to_operations(&delta).is_empty());
    }

    #[test]
    fn test_retain_and_delete_ops_are_skipped() {
        let delta = json!([
            { "retain": 5 },
            { "delete": 2 },
            { "insert": "kept\n" },
        ]);
        let blocks = extract_blocks(&delta);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text(), "kept");
    }
}
