//! Boundary-aware plain-text splitting.
//!
//! Some sources hand over flat text with no block structure: extracted PDF
//! text, rendered HTML, metadata fallbacks. There is nothing to build an
//! outline from, so those documents take the simple path: fixed-size parts
//! with a preference for breaking at whitespace.
//!
//! ## How It Works
//!
//! ```text
//! max_size = 20, overlap = 5
//!
//! "The quick brown fox jumps over the lazy dog"
//!  |-- part 0 ------->|
//!                 |-- part 1 ------>|         <- starts 5 bytes back
//! ```
//!
//! A tentative cut at `start + max_size` slides back to the last space or
//! newline, but only when that break sits past 80% of the span; otherwise a
//! mid-word cut beats a tiny part. Each iteration advances by at least
//! `max_size / 2` so pathological overlap settings cannot stall the loop.

use crate::error::{Error, Result};

/// Split flat text into parts of at most `max_size` bytes.
///
/// Text no longer than `max_size` comes back as a single part, unsplit.
/// An `overlap` of `max_size` or more is clamped to `max_size / 2`.
///
/// All cuts land on char boundaries; when flooring a cut would make no
/// progress (a multi-byte char wider than the remaining budget), the char
/// is taken whole, so a part can exceed `max_size` only when
/// `max_size < 4` bytes.
///
/// # Errors
///
/// Returns [`Error::InvalidChunkSize`] when `max_size` is zero.
///
/// ```rust
/// use mortar::split_plain_text;
///
/// let parts = split_plain_text("hello world, again and again", 16, 4).unwrap();
/// assert!(parts.len() > 1);
/// for part in &parts {
///     assert!(part.len() <= 16);
/// }
/// ```
pub fn split_plain_text(text: &str, max_size: usize, overlap: usize) -> Result<Vec<String>> {
    if max_size == 0 {
        return Err(Error::InvalidChunkSize(0));
    }
    if text.len() <= max_size {
        return Ok(vec![text.to_string()]);
    }

    let overlap = if overlap >= max_size {
        max_size / 2
    } else {
        overlap
    };

    let mut parts = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + max_size).min(text.len());
        while end > start && !text.is_char_boundary(end) {
            end -= 1;
        }
        if end == start {
            // A single char wider than the budget; take it whole.
            end = start + 1;
            while end < text.len() && !text.is_char_boundary(end) {
                end += 1;
            }
        }

        if end < text.len() {
            // Prefer a whitespace break, but only in the last 20% of the
            // span; a tiny part is worse than a mid-word cut.
            if let Some(offset) = text[start..end].rfind([' ', '\n']) {
                let break_point = start + offset;
                if break_point > start + max_size * 4 / 5 {
                    end = break_point;
                }
            }
        }

        parts.push(text[start..end].to_string());

        if end >= text.len() {
            break;
        }

        // Advance by at least half a chunk regardless of overlap.
        let mut next = end.saturating_sub(overlap).max(start + max_size / 2);
        while next < text.len() && !text.is_char_boundary(next) {
            next += 1;
        }
        if next <= start {
            next = end;
        }
        start = next;
    }

    Ok(parts)
}
