//! Error types for the backing key/value store.

/// Error type for storage operations.
///
/// The caches built on top of a store swallow these; they only surface to
/// callers that talk to a [`KeyValueStore`](crate::KeyValueStore) directly.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store refused a write because it is full.
    #[error("Storage quota exceeded ({limit} entries)")]
    QuotaExceeded { limit: usize },

    /// Error from the SQLite backend.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to create the directory holding the database file.
    #[error("Failed to prepare storage path '{path}': {source}")]
    Path {
        path: String,
        source: std::io::Error,
    },

    /// Failed to serialize an entry.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;
