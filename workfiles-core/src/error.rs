use std::path::PathBuf;

use thiserror::Error;
use workfiles_model::ModelError;

/// Local side of a search failed: a location could not be read or the
/// templates could not be resolved for the context.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template resolution failed: {0}")]
    Template(String),
}

/// Tracking-service side of a search failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("tracking service unreachable: {0}")]
    Unreachable(String),

    #[error("tracking service rejected credentials: {0}")]
    Auth(String),

    #[error("malformed tracking service response: {0}")]
    Malformed(String),
}

/// A thumbnail could not be produced. Always logged and swallowed.
#[derive(Error, Debug)]
pub enum ThumbnailFetchError {
    #[error("thumbnail download failed: {0}")]
    Download(String),

    #[error("thumbnail IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("thumbnail missing: {0}")]
    Missing(String),
}

/// Why one search failed. Confined to that search's group.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("search task aborted: {0}")]
    Aborted(String),
}

#[derive(Error, Debug)]
pub enum WorkfilesError {
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Thumbnail error: {0}")]
    Thumbnail(#[from] ThumbnailFetchError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, WorkfilesError>;
