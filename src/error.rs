//! Error types for okurimono.
//!
//! All fallible operations return [`Result`], whose error type is
//! [`OkurimonoError`]. Two variants are fatal to a request
//! ([`OkurimonoError::Configuration`] and [`OkurimonoError::InvalidArticle`]);
//! [`OkurimonoError::ProductRecord`] is only ever produced for a single catalog
//! row and is absorbed by the engine, which logs it and skips the product.
//!
//! # Examples
//!
//! ```
//! use okurimono::error::{OkurimonoError, Result};
//!
//! fn load() -> Result<()> {
//!     Err(OkurimonoError::invalid_article("article-1 has no target_keywords"))
//! }
//!
//! match load() {
//!     Ok(_) => println!("loaded"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for okurimono operations.
#[derive(Error, Debug)]
pub enum OkurimonoError {
    /// Factor weights or other settings failed validation at construction time.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The article cannot be scored (missing keywords, unparseable budget).
    #[error("Invalid article: {0}")]
    InvalidArticle(String),

    /// A single product row is malformed.
    #[error("Invalid product record: {0}")]
    ProductRecord(String),

    /// A call argument is out of its accepted range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Lookup of an article or product id failed.
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O errors (catalog and config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration parse errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Internal failures (thread pool construction and the like)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with OkurimonoError.
pub type Result<T> = std::result::Result<T, OkurimonoError>;

impl OkurimonoError {
    /// Create a new configuration error.
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        OkurimonoError::Configuration(msg.into())
    }

    /// Create a new invalid article error.
    pub fn invalid_article<S: Into<String>>(msg: S) -> Self {
        OkurimonoError::InvalidArticle(msg.into())
    }

    /// Create a new product record error.
    pub fn product_record<S: Into<String>>(msg: S) -> Self {
        OkurimonoError::ProductRecord(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        OkurimonoError::InvalidArgument(msg.into())
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        OkurimonoError::NotFound(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        OkurimonoError::Internal(msg.into())
    }
}
