//! Section trees and upload batch packing.
//!
//! The platform ingests one document per upload call, shaped as a tree of
//! sections: a leaf carries text, an internal node carries children. Every
//! upload payload must stay under a hard byte ceiling once serialized, so
//! chunks are prefixed with a metadata header, wrapped into leaf sections,
//! and grouped into batches that are measured in serialized form before
//! being emitted.
//!
//! ```text
//! chunks:   [ c1 | c2 | c3 | c4 | c5 ]
//!                 |
//!                 v   (each prefixed with metadata + part suffix)
//! leaves:   [ s1 | s2 | s3 | s4 | s5 ]
//!                 |
//!                 v   (serialized batch must fit the ceiling)
//! uploads:  part 1: {s1, s2}   part 2: {s3, s4}   part 3: {s5}
//! ```
//!
//! Part numbering is 1-based and monotonic. Part 1 keeps the base document
//! id and, when it is the only part, the unmodified title; further parts
//! derive `{id}-part{N}` / `{title} (Part {N})`.

use serde::Serialize;
use serde_json::Value;

use crate::assemble::{split_content, ChunkWithContext};
use crate::error::{Error, Result};

/// Default platform ceiling for one uploaded document payload: 1 MiB.
pub const MAX_DOCUMENT_SIZE: usize = 1024 * 1024;

/// Default byte-overlap threaded between adjacent chunks.
pub const DEFAULT_OVERLAP: usize = 200;

/// Reserved margin for the per-chunk hierarchy path line, whose exact size
/// is unknown when the budget is computed.
const HIERARCHY_OVERHEAD: usize = 300;

/// Worst-case part suffix, reserved up front for every chunk.
const WORST_CASE_PART_SUFFIX: &str = "\n(Part 999 of 999)";

/// A node in the platform's upload payload tree.
///
/// In valid output exactly one of `content` or a non-empty `sections` is
/// populated: a leaf carries text, an internal node carries children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    /// Short label for the node (heading text, document title, "Part N").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Leaf text; `None` for internal nodes.
    pub content: Option<String>,
    /// Child sections; empty for leaves.
    pub sections: Vec<Section>,
}

impl Section {
    /// A leaf section carrying text.
    #[must_use]
    pub fn leaf(prefix: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            content: Some(content.into()),
            sections: Vec::new(),
        }
    }
}

/// Identity of a source document, as the packer needs it.
#[derive(Debug, Clone)]
pub struct DocumentMeta {
    /// Base document id; parts beyond the first derive `{id}-part{N}`.
    pub id: String,
    /// Document title.
    pub title: String,
    /// Creation timestamp, already formatted by the connector.
    pub created_at: String,
    /// Last-update timestamp, already formatted by the connector.
    pub updated_at: String,
    /// Canonical URL back to the source system.
    pub source_url: Option<String>,
    /// Topic / folder hierarchy path in the source system, if any.
    pub topic_path: Option<String>,
}

impl DocumentMeta {
    fn base_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Title: {}", self.title),
            format!("Document ID: {}", self.id),
            format!("Created At: {}", self.created_at),
            format!("Updated At: {}", self.updated_at),
        ];
        if let Some(path) = &self.topic_path {
            lines.push(format!("Topic Path: {path}"));
        }
        lines
    }

    fn header(&self, extra_lines: &[String]) -> String {
        let mut lines = self.base_lines();
        lines.extend_from_slice(extra_lines);
        format!("---\n{}\n---\n\n", lines.join("\n"))
    }
}

/// One upload call: a section tree with its derived id, title, and part
/// number.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPart {
    /// Derived document id (`baseId`, then `baseId-part{N}`).
    pub document_id: String,
    /// Derived title (plain for a single part, suffixed otherwise).
    pub title: String,
    /// The upload payload tree.
    pub section: Section,
    /// 1-based, monotonically increasing part index.
    pub part_number: usize,
}

/// The serialized shape whose byte size the ceiling applies to.
#[derive(Serialize)]
struct UploadPayload<'a> {
    section: &'a Section,
    title: &'a str,
    source_url: Option<&'a str>,
}

/// The chunk byte budget left under `ceiling` once metadata is reserved.
///
/// Reserves the fixed header, the worst-case part suffix, and a margin for
/// the per-chunk hierarchy path line. Feed the result into
/// [`split_content`] as `max_size`.
///
/// # Errors
///
/// Returns [`Error::MetadataOverhead`] when the reservation alone meets or
/// exceeds the ceiling: the document cannot be represented at any split
/// granularity.
pub fn usable_chunk_size(meta: &DocumentMeta, ceiling: usize) -> Result<usize> {
    let overhead = meta.header(&[]).len() + WORST_CASE_PART_SUFFIX.len() + HIERARCHY_OVERHEAD;
    if overhead >= ceiling {
        return Err(Error::MetadataOverhead {
            title: meta.title.clone(),
            overhead,
            ceiling,
        });
    }
    Ok(ceiling - overhead)
}

/// Group chunks into upload batches that respect the ceiling.
///
/// Each chunk becomes a leaf section carrying its metadata header, body,
/// and part suffix. Leaves accumulate into a batch until the serialized
/// upload payload would exceed `ceiling`, at which point the batch is
/// flushed as its own part and a new batch starts with the leaf that
/// overflowed. Zero chunks still produce exactly one metadata-only part.
///
/// A leaf that exceeds the ceiling on its own (prevented upstream by
/// [`usable_chunk_size`], re-checked here defensively) is logged and
/// dropped; a partial document beats no document.
///
/// # Errors
///
/// Returns [`Error::Serialize`] if a payload cannot be serialized for size
/// measurement.
pub fn build_upload_batches(
    meta: &DocumentMeta,
    chunks: &[ChunkWithContext],
    ceiling: usize,
) -> Result<Vec<DocumentPart>> {
    if chunks.is_empty() {
        return Ok(vec![DocumentPart {
            document_id: meta.id.clone(),
            title: meta.title.clone(),
            section: Section::leaf(meta.title.clone(), meta.header(&[])),
            part_number: 1,
        }]);
    }

    let total_chunks = chunks.len();
    let mut batches: Vec<Vec<Section>> = Vec::new();
    let mut current: Vec<Section> = Vec::new();

    for (i, chunk) in chunks.iter().enumerate() {
        let mut extra_lines = Vec::new();
        if !chunk.heading_path.is_empty() {
            extra_lines.push(format!("Section Path: {}", chunk.heading_path.join(" > ")));
        }
        extra_lines.push(format!("Part: {} of {}", i + 1, total_chunks));

        let part_suffix = format!("\n(Part {} of {})", i + 1, total_chunks);
        let content = format!("{}{}{}", meta.header(&extra_lines), chunk.content, part_suffix);

        // Defensive re-check; usable_chunk_size should have made this
        // impossible.
        if content.len() > ceiling {
            tracing::warn!(
                title = %meta.title,
                part = i + 1,
                size = content.len(),
                ceiling,
                "assembled part exceeds ceiling, dropping"
            );
            continue;
        }

        let prefix = chunk
            .heading_path
            .last()
            .cloned()
            .or_else(|| chunk.start_heading.as_ref().map(|h| h.text.clone()))
            .unwrap_or_else(|| format!("Part {}", i + 1));
        let leaf = Section::leaf(prefix, content);

        let mut tentative = current.clone();
        tentative.push(leaf.clone());
        let tentative_title = format!("{} (Part {})", meta.title, batches.len() + 1);
        let payload_size = serialized_size(meta, &tentative, &tentative_title)?;

        if payload_size > ceiling && !current.is_empty() {
            batches.push(std::mem::take(&mut current));
            current.push(leaf);
        } else {
            current.push(leaf);
        }
    }

    if !current.is_empty() {
        batches.push(current);
    }

    let total_parts = batches.len();
    let parts = batches
        .into_iter()
        .enumerate()
        .map(|(idx, batch)| {
            let part_number = idx + 1;
            let document_id = if part_number == 1 {
                meta.id.clone()
            } else {
                format!("{}-part{part_number}", meta.id)
            };
            let title = if total_parts == 1 {
                meta.title.clone()
            } else {
                format!("{} (Part {part_number})", meta.title)
            };
            DocumentPart {
                document_id,
                title,
                section: wrap_batch(&meta.title, batch),
                part_number,
            }
        })
        .collect();

    Ok(parts)
}

/// Split and batch in one call, reserving the metadata budget first.
///
/// # Errors
///
/// Propagates [`Error::MetadataOverhead`] from the budget reservation and
/// any error from [`split_content`] or [`build_upload_batches`].
pub fn plan_document(
    meta: &DocumentMeta,
    delta: &Value,
    ceiling: usize,
    overlap: usize,
) -> Result<Vec<DocumentPart>> {
    let max_content = usable_chunk_size(meta, ceiling)?;
    let chunks = split_content(delta, max_content, overlap)?;
    build_upload_batches(meta, &chunks, ceiling)
}

/// A single-leaf batch hoists the leaf's text to the root; a larger batch
/// nests the leaves under a title-prefixed parent.
fn wrap_batch(title: &str, batch: Vec<Section>) -> Section {
    if batch.len() == 1 {
        let leaf = batch.into_iter().next().unwrap_or_else(|| Section {
            prefix: None,
            content: None,
            sections: Vec::new(),
        });
        Section {
            prefix: Some(title.to_string()),
            content: leaf.content,
            sections: Vec::new(),
        }
    } else {
        Section {
            prefix: Some(title.to_string()),
            content: None,
            sections: batch,
        }
    }
}

fn serialized_size(meta: &DocumentMeta, batch: &[Section], title: &str) -> Result<usize> {
    let section = wrap_batch(&meta.title, batch.to_vec());
    let payload = UploadPayload {
        section: &section,
        title,
        source_url: meta.source_url.as_deref(),
    };
    Ok(serde_json::to_string(&payload)?.len())
}
