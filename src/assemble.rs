//! Greedy chunk assembly with heading context and overlap.
//!
//! The assembler packs consecutive [`BlockSegment`]s into chunks bounded by
//! a maximum byte size, attaching the heading context computed by
//! [`Outline`], and threading a byte-overlap of trailing segments into the
//! start of the next chunk.
//!
//! ## Packing
//!
//! ```text
//! max_size = 10
//!
//! Segments:  [ "aaaa" | "bbbb" | "cccc" | "dd" ]
//! Chunk 0:   "aaaabbbb"          <- "cccc" would overflow, stops here
//! Chunk 1:   "ccccdd"
//! ```
//!
//! A single segment larger than `max_size` is split at byte boundaries; the
//! consumed prefix fills the current chunk and the remainder replaces the
//! segment in place, to be reconsidered on the next iteration (repeating
//! across as many chunks as needed).
//!
//! ## Overlap
//!
//! ```text
//! max_size = 10, overlap = 4
//!
//! Chunk 0:   [ s0 | s1 | s2 ]
//! Chunk 1:        [ s2 | s3 | ... ]   <- walks back ~4 bytes from the end
//! ```
//!
//! The overlap budget is capped at `max_size / 2` so an overlapping chunk
//! always has room for new content. When walking back would stall at the
//! current chunk's start, the next chunk begins with no overlap instead.
//!
//! ## UTF-8 at Split Points
//!
//! Oversized-segment splits are floored to a char boundary, so output is
//! always valid UTF-8. When the chunk is empty and flooring would consume
//! nothing, one full char is taken to guarantee progress; consequently a
//! chunk can exceed `max_size` only when `max_size < 4` bytes.

use serde_json::Value;

use crate::delta::extract_blocks;
use crate::error::{Error, Result};
use crate::outline::{segment_positions, Heading, Outline};
use crate::render::{render_blocks, BlockSegment};

/// A packed chunk with the heading context in effect at its boundaries.
///
/// Created once per chunk and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkWithContext {
    /// The chunk's rendered text.
    pub content: String,
    /// First heading inside the chunk, or the nearest heading open before
    /// its start.
    pub start_heading: Option<Heading>,
    /// Last heading inside the chunk, or the nearest heading open at (then
    /// before) its boundaries.
    pub end_heading: Option<Heading>,
    /// Ancestor heading texts open at the chunk's start, outermost first.
    pub heading_path: Vec<String>,
}

/// Split a delta document into bounded chunks with heading context.
///
/// This is the front door: delta in, chunks out. Equivalent to
/// [`extract_blocks`] + [`render_blocks`] + [`chunk_segments`].
///
/// # Errors
///
/// Returns [`Error::InvalidChunkSize`] when `max_size` is zero. An empty or
/// unparseable delta is not an error: it yields an empty chunk list.
pub fn split_content(
    delta: &Value,
    max_size: usize,
    overlap: usize,
) -> Result<Vec<ChunkWithContext>> {
    let blocks = extract_blocks(delta);
    if blocks.is_empty() {
        // Still validate configuration for consistent caller behavior.
        if max_size == 0 {
            return Err(Error::InvalidChunkSize(0));
        }
        return Ok(Vec::new());
    }
    chunk_segments(render_blocks(blocks), max_size, overlap)
}

/// Pack rendered segments into chunks of at most `max_size` bytes.
///
/// Takes the segment vector by value: oversized-segment splitting shrinks a
/// segment's text in place as bytes are peeled off into chunks, and owning
/// the vector keeps that mutation local to this call.
///
/// # Errors
///
/// Returns [`Error::InvalidChunkSize`] when `max_size` is zero.
pub fn chunk_segments(
    mut segments: Vec<BlockSegment>,
    max_size: usize,
    overlap: usize,
) -> Result<Vec<ChunkWithContext>> {
    if max_size == 0 {
        return Err(Error::InvalidChunkSize(0));
    }
    let total = segments.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    // Positions and outline reflect the original rendering; packing only
    // mutates segment text, never block identity.
    let positions = segment_positions(&segments);
    let outline = Outline::build(&segments, &positions);

    let overlap_bytes = overlap.min(max_size / 2);
    let mut chunks = Vec::new();
    let mut start_idx = 0;

    while start_idx < total {
        let mut end_idx = start_idx;
        let mut chunk_bytes = 0;
        let mut content = String::new();
        let mut packed_any = false;

        while end_idx < total {
            let next_length = segments[end_idx].byte_length;

            // Stop if this segment would overflow a chunk that already has
            // content; it becomes the start of the next chunk.
            if chunk_bytes + next_length > max_size && chunk_bytes > 0 {
                break;
            }

            if next_length > max_size {
                // Oversized segment: peel off as much as fits.
                let remaining = max_size - chunk_bytes;
                let split_size = if remaining > 0 { remaining } else { max_size };
                let text_len = segments[end_idx].text.len();

                let mut boundary = split_size.min(text_len);
                while boundary > 0 && !segments[end_idx].text.is_char_boundary(boundary) {
                    boundary -= 1;
                }
                if boundary == 0 {
                    if chunk_bytes > 0 {
                        break;
                    }
                    // Empty chunk and the first char alone exceeds the
                    // capacity: take it whole so the loop progresses.
                    boundary = segments[end_idx]
                        .text
                        .chars()
                        .next()
                        .map_or(0, char::len_utf8);
                    if boundary == 0 {
                        end_idx += 1;
                        continue;
                    }
                }

                content.push_str(&segments[end_idx].text[..boundary]);
                chunk_bytes += boundary;
                packed_any = true;

                if boundary == text_len {
                    end_idx += 1;
                } else {
                    segments[end_idx].text.drain(..boundary);
                    segments[end_idx].byte_length = segments[end_idx].text.len();
                }
                continue;
            }

            content.push_str(&segments[end_idx].text);
            chunk_bytes += next_length;
            packed_any = true;
            end_idx += 1;

            if chunk_bytes >= max_size {
                break;
            }
        }

        if !packed_any {
            start_idx = end_idx;
            continue;
        }

        let start_heading = find_heading(&segments, &positions, start_idx, end_idx, true)
            .or_else(|| outline.previous_before(start_idx).cloned());
        let end_heading = find_heading(&segments, &positions, start_idx, end_idx, false)
            .or_else(|| outline.previous_before(end_idx).cloned())
            .or_else(|| outline.previous_before(start_idx).cloned());
        let heading_path = outline.path_before(start_idx).to_vec();

        chunks.push(ChunkWithContext {
            content,
            start_heading,
            end_heading,
            heading_path,
        });

        if end_idx >= total {
            break;
        }

        if overlap_bytes == 0 {
            start_idx = end_idx;
            continue;
        }

        // Walk backwards from the chunk end until ~overlap_bytes of trailing
        // content is re-included, without crossing the chunk's own start.
        let mut bytes_to_keep = overlap_bytes;
        let mut new_start = end_idx;
        while new_start > start_idx && bytes_to_keep > 0 {
            new_start -= 1;
            bytes_to_keep = bytes_to_keep.saturating_sub(segments[new_start].byte_length);
        }

        start_idx = if new_start <= start_idx { end_idx } else { new_start };
    }

    Ok(chunks)
}

/// First (or last) heading block inside `[start, end)`.
fn find_heading(
    segments: &[BlockSegment],
    positions: &[usize],
    start: usize,
    end: usize,
    from_start: bool,
) -> Option<Heading> {
    let snapshot = |i: usize| {
        segments[i].block.heading_level().map(|level| Heading {
            level,
            text: segments[i].block.text().to_string(),
            position: positions[i],
        })
    };
    if from_start {
        (start..end).find_map(snapshot)
    } else {
        (start..end).rev().find_map(snapshot)
    }
}
