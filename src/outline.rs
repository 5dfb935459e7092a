//! Heading hierarchy tracking.
//!
//! A single left-to-right pass over the segment sequence maintains a stack
//! of open headings indexed by level, recording for every position the
//! heading path (ordered ancestor texts) and the nearest preceding heading.
//!
//! Standard document-outline nesting applies: a level-2 heading closes any
//! open heading at level 2 or deeper but leaves level-1 ancestors open.
//!
//! ```text
//! H1 "Intro"            stack: [Intro]
//!   paragraph           path before: [Intro]
//!   H2 "Setup"          stack: [Intro, Setup]
//!     paragraph         path before: [Intro, Setup]
//!   H2 "Usage"          stack: [Intro, Usage]   <- closed "Setup"
//! H1 "Appendix"         stack: [Appendix]       <- closed both
//! ```
//!
//! The stack may contain gaps: a level-3 heading directly under a level-1
//! parent leaves level 2 unoccupied. Paths skip the gaps.

use crate::render::BlockSegment;

/// A snapshot of an ancestor heading, valid at a given block position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Outline level, 1-based.
    pub level: usize,
    /// Heading text.
    pub text: String,
    /// Cumulative byte offset of the heading's segment in the rendered
    /// document.
    pub position: usize,
}

/// Per-position heading context for a segment sequence of length `N`.
///
/// Holds `N + 1` "nearest preceding heading" entries (one per boundary,
/// including the end of the document) and `N` heading paths (one per
/// segment).
#[derive(Debug, Clone)]
pub struct Outline {
    previous_before: Vec<Option<Heading>>,
    path_before: Vec<Vec<String>>,
}

impl Outline {
    /// Build the outline for a segment sequence.
    ///
    /// `positions[i]` must be the cumulative byte offset of segment `i`
    /// (prefix sum of byte lengths), as produced by [`segment_positions`].
    #[must_use]
    pub fn build(segments: &[BlockSegment], positions: &[usize]) -> Self {
        let total = segments.len();
        let mut previous_before = Vec::with_capacity(total + 1);
        let mut path_before = Vec::with_capacity(total);

        // Indexed by level - 1; a slot is None when that level is skipped
        // (e.g. an H3 directly under an H1).
        let mut stack: Vec<Option<Heading>> = Vec::new();

        for (i, segment) in segments.iter().enumerate() {
            path_before.push(
                stack
                    .iter()
                    .flatten()
                    .map(|h| h.text.clone())
                    .collect::<Vec<_>>(),
            );
            previous_before.push(stack.iter().flatten().last().cloned());

            if let Some(level) = segment.block.heading_level() {
                let level = level.max(1);
                stack.truncate(level - 1);
                stack.resize(level, None);
                stack[level - 1] = Some(Heading {
                    level,
                    text: segment.block.text().to_string(),
                    position: positions[i],
                });
            }
        }

        previous_before.push(stack.iter().flatten().last().cloned());

        Self {
            previous_before,
            path_before,
        }
    }

    /// The nearest heading open before boundary `i` (`0..=N`).
    #[must_use]
    pub fn previous_before(&self, i: usize) -> Option<&Heading> {
        self.previous_before.get(i).and_then(Option::as_ref)
    }

    /// The heading path open before segment `i` (`0..N`), outermost first.
    #[must_use]
    pub fn path_before(&self, i: usize) -> &[String] {
        self.path_before.get(i).map_or(&[], Vec::as_slice)
    }
}

/// Cumulative byte offsets for a segment sequence (prefix sum of lengths).
#[must_use]
pub fn segment_positions(segments: &[BlockSegment]) -> Vec<usize> {
    let mut positions = Vec::with_capacity(segments.len());
    let mut cumulative = 0;
    for segment in segments {
        positions.push(cumulative);
        cumulative += segment.byte_length;
    }
    positions
}
