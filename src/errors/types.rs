//! Error type definitions for the catalog sync application
//!
//! This module defines all error types used throughout the application,
//! providing a hierarchical error system that makes debugging and error
//! handling more straightforward.

use thiserror::Error;

/// Top-level application error type
///
/// This enum represents all possible errors that can occur in the application.
/// It uses `thiserror` to provide automatic error trait implementations and
/// proper error chaining.
#[derive(Error, Debug)]
pub enum AppError {
    /// Upstream catalog errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Entity/asset store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Detail-page enrichment errors
    #[error("Enrichment error: {0}")]
    Enrich(#[from] EnrichError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Upstream catalog and media download errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// HTTP transport failures (connect, timeout, body read)
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status from the upstream
    #[error("Upstream returned HTTP {status}: {url}")]
    Status { status: u16, url: String },

    /// Response body did not match the expected shape
    #[error("Decode failed: {message}")]
    Decode { message: String },
}

/// Entity store and asset store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// HTTP transport failures against the store
    #[error("Store request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status from the store
    #[error("Store returned HTTP {status} for {operation}")]
    Status { status: u16, operation: String },

    /// Store response was missing an expected field
    #[error("Malformed store response: missing {field}")]
    MalformedResponse { field: String },

    /// Asset upload failures
    #[error("Upload failed: {filename} - {message}")]
    Upload { filename: String, message: String },
}

/// Detail-page fetch and parse errors
#[derive(Error, Debug)]
pub enum EnrichError {
    /// HTTP transport failures against the detail page
    #[error("Detail page request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status for the detail page
    #[error("Detail page returned HTTP {status}: {url}")]
    Status { status: u16, url: String },

    /// The page markup had no description container
    #[error("Detail page has no description container")]
    MissingDescription,

    /// A CSS selector failed to compile
    #[error("Invalid selector: {selector}")]
    Selector { selector: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl StoreError {
    /// Create a status error for a named store operation
    pub fn status<O: Into<String>>(status: u16, operation: O) -> Self {
        Self::Status {
            status,
            operation: operation.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed<F: Into<String>>(field: F) -> Self {
        Self::MalformedResponse {
            field: field.into(),
        }
    }
}

impl CatalogError {
    /// Create a decode error
    pub fn decode<M: Into<String>>(message: M) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}
