//! Contracts for the external collaborators the engine consumes.
//!
//! The template engine, the filesystem walker, the tracking-service client
//! and the thumbnail downloader all live outside this crate; the finder and
//! aggregator only ever talk to them through these traits.

pub mod filesystem;
pub mod templates;
pub mod thumbnails;
pub mod tracking;

pub use filesystem::{FilesystemScanner, LocalFileRecord};
pub use templates::{
    ResolvedCandidate, TemplateResolver, TemplateRole, TemplateSet,
};
pub use thumbnails::{
    ThumbnailDownloader, ThumbnailEvent, ThumbnailRequest, ThumbnailSource,
};
pub use tracking::{
    LoggingPublishQuery, PublishFilter, PublishQuery, PublishedFileRecord,
};
