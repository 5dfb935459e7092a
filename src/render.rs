//! Block rendering: display text and byte accounting.
//!
//! Each [`ContentBlock`] renders to its final display text, and the renderer
//! records the text's UTF-8 byte length. All downstream size math (chunk
//! ceilings, overlap budgets, upload batch limits) works on these byte
//! lengths, so they must reflect the true encoded size: a 3-byte CJK
//! character counts as 3, not 1.
//!
//! ## Rendering Rules
//!
//! ```text
//! Heading      ->  "{text}\n"
//! ListItem(o)  ->  "{n}. {text}\n"    n counts consecutive ordered items
//! ListItem(b)  ->  "- {text}\n"
//! Image/Embed  ->  "{placeholder}\n"
//! Paragraph    ->  "{text}\n\n"
//! ```
//!
//! Ordered-list numbering is stateful across the sequence: the counter
//! starts at 1 and increments only while every preceding rendered block was
//! also an ordered item. Any other block kind resets it.

use crate::delta::{ContentBlock, ListType};

/// A [`ContentBlock`] paired with its rendered display text and UTF-8 byte
/// length.
///
/// Segments are the unit the chunk assembler packs. They keep the same order
/// as the block sequence they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockSegment {
    /// The source block.
    pub block: ContentBlock,
    /// Final display text, markers and trailing newline(s) applied.
    pub text: String,
    /// Byte length of `text` under UTF-8.
    pub byte_length: usize,
}

impl BlockSegment {
    fn new(block: ContentBlock, text: String) -> Self {
        let byte_length = text.len();
        Self {
            block,
            text,
            byte_length,
        }
    }
}

/// List-numbering state threaded through one render pass.
#[derive(Debug, Default)]
struct ListState {
    ordered_counter: usize,
    previous: Option<ListType>,
}

impl ListState {
    fn reset(&mut self) {
        self.ordered_counter = 0;
        self.previous = None;
    }

    fn next_ordered(&mut self) -> usize {
        if self.previous != Some(ListType::Ordered) {
            self.ordered_counter = 0;
        }
        self.ordered_counter += 1;
        self.previous = Some(ListType::Ordered);
        self.ordered_counter
    }
}

/// Render a block sequence into segments with byte lengths.
///
/// ```rust
/// use mortar::{render_blocks, ContentBlock, ListType};
///
/// let blocks = vec![
///     ContentBlock::ListItem { text: "a".into(), list_type: ListType::Ordered },
///     ContentBlock::ListItem { text: "b".into(), list_type: ListType::Ordered },
/// ];
/// let segments = render_blocks(blocks);
/// assert_eq!(segments[0].text, "1. a\n");
/// assert_eq!(segments[1].text, "2. b\n");
/// ```
#[must_use]
pub fn render_blocks(blocks: Vec<ContentBlock>) -> Vec<BlockSegment> {
    let mut segments = Vec::with_capacity(blocks.len());
    let mut list = ListState::default();

    for block in blocks {
        let text = match &block {
            ContentBlock::Heading { text, .. } => {
                list.reset();
                format!("{text}\n")
            }
            ContentBlock::ListItem { text, list_type } => match list_type {
                ListType::Ordered => {
                    let n = list.next_ordered();
                    format!("{n}. {text}\n")
                }
                ListType::Bullet => {
                    list.previous = Some(ListType::Bullet);
                    format!("- {text}\n")
                }
            },
            ContentBlock::Image { caption } => {
                list.reset();
                format!("{caption}\n")
            }
            ContentBlock::Embed { placeholder } => {
                list.reset();
                format!("{placeholder}\n")
            }
            ContentBlock::Paragraph { text } => {
                list.reset();
                format!("{text}\n\n")
            }
        };
        segments.push(BlockSegment::new(block, text));
    }

    segments
}
