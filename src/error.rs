//! Error types for mortar.

/// Errors that can occur during chunking and batch packing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid chunk size (must be > 0).
    #[error("invalid chunk size: {0} (must be > 0)")]
    InvalidChunkSize(usize),

    /// The fixed metadata header leaves no room for content under the ceiling.
    ///
    /// Fatal for the affected document: it cannot be represented at any
    /// split granularity, so the caller should skip it rather than retry.
    #[error("metadata overhead {overhead} bytes leaves no room under ceiling {ceiling} for \"{title}\"")]
    MetadataOverhead {
        /// Title of the document that cannot be packed.
        title: String,
        /// Reserved byte budget for metadata, part suffix, and hierarchy path.
        overhead: usize,
        /// The platform's maximum document byte size.
        ceiling: usize,
    },

    /// An upload payload could not be serialized for size measurement.
    #[error("payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for mortar operations.
pub type Result<T> = std::result::Result<T, Error>;
