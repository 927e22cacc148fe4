//! Error types for the storybook core.

use thiserror::Error;

/// Result type alias using StorybookError.
pub type Result<T> = std::result::Result<T, StorybookError>;

/// Main error type for storybook operations.
///
/// Nothing on the per-frame path returns this type; frames always complete.
#[derive(Error, Debug)]
pub enum StorybookError {
    /// A requested page index or page number outside the book.
    #[error("Page index {index} out of range (book has {page_count} pages)")]
    OutOfRangeIndex { index: usize, page_count: usize },

    /// A texture id the asset provider has no handle for.
    #[error("Missing texture asset: {0}")]
    MissingAsset(String),

    /// Book configuration that cannot produce a valid book.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to parse JSON configuration.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while reading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to export a page.
    #[error("Export error: {0}")]
    Export(String),
}
