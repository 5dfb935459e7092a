//! # mortar
//!
//! Delta-document chunking and section packing for ingestion pipelines.
//!
//! ## The Problem
//!
//! Document-ingestion platforms enforce a hard byte ceiling per uploaded
//! document. Knowledge-base sources (wikis, content libraries) hand over
//! rich-text "deltas" of arbitrary size. Between the two sits real work:
//!
//! - A delta is an operation stream, not text—it must become blocks first
//! - Size limits are in *encoded bytes*; character counts lie for CJK text
//! - A naive split loses the heading a paragraph lives under
//! - Chunks need overlap for context, but overlap eats the size budget
//! - Upload payloads carry metadata envelopes that count against the
//!   ceiling too
//!
//! ## The Pipeline
//!
//! ```text
//! raw delta
//!    |  extract_blocks       blocks (heading / paragraph / list / image)
//!    v
//! render_blocks              segments (display text + UTF-8 byte length)
//!    |                         + Outline (heading paths per position)
//!    v
//! chunk_segments             chunks <= max_size bytes, heading context,
//!    |                         configurable byte-overlap
//!    v
//! build_upload_batches       parts: section trees measured against the
//!                              ceiling in serialized form
//! ```
//!
//! Every stage is a pure function: no I/O, no shared state, safe to run
//! concurrently for independent documents. The actual upload call is the
//! caller's problem.
//!
//! ## Quick Start
//!
//! ```rust
//! use mortar::{split_content, build_upload_batches, DocumentMeta};
//! use serde_json::json;
//!
//! let delta = json!([
//!     { "insert": "Setup" },
//!     { "insert": "\n", "attributes": { "header": 1 } },
//!     { "insert": "Install the agent and restart.\n" },
//! ]);
//!
//! let chunks = split_content(&delta, 1024 * 1024, 200)?;
//! assert_eq!(chunks[0].start_heading.as_ref().unwrap().text, "Setup");
//!
//! let meta = DocumentMeta {
//!     id: "kb-42".into(),
//!     title: "Install Guide".into(),
//!     created_at: "2024-01-01T00:00:00Z".into(),
//!     updated_at: "2024-06-01T00:00:00Z".into(),
//!     source_url: None,
//!     topic_path: None,
//! };
//! let parts = build_upload_batches(&meta, &chunks, mortar::MAX_DOCUMENT_SIZE)?;
//! assert_eq!(parts[0].part_number, 1);
//! # Ok::<(), mortar::Error>(())
//! ```
//!
//! For flat text with no block structure (PDF extractions, metadata
//! fallbacks), [`split_plain_text`] does fixed-size splitting with a
//! whitespace-break preference instead.
//!
//! ## Guarantees
//!
//! - **Size bound**: every chunk's byte length is at most `max_size`
//!   (barring `max_size < 4` with multi-byte text, where one char is taken
//!   whole to guarantee progress).
//! - **Reconstruction**: with zero overlap, concatenating chunk contents in
//!   order reproduces the rendered document text exactly.
//! - **Heading paths**: a chunk's path is exactly the stack of headings
//!   open at its start, outermost first.
//! - **Valid UTF-8**: splits are floored to char boundaries; no chunk ever
//!   carries a torn multi-byte sequence.

mod assemble;
mod delta;
mod error;
mod outline;
mod plain;
mod render;
mod section;

pub use assemble::{chunk_segments, split_content, ChunkWithContext};
pub use delta::{extract_blocks, to_operations, Attributes, ContentBlock, DeltaOp, Insert, ListType};
pub use error::{Error, Result};
pub use outline::{segment_positions, Heading, Outline};
pub use plain::split_plain_text;
pub use render::{render_blocks, BlockSegment};
pub use section::{
    build_upload_batches, plan_document, usable_chunk_size, DocumentMeta, DocumentPart, Section,
    DEFAULT_OVERLAP, MAX_DOCUMENT_SIZE,
};
