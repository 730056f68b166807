//! Core data model definitions shared across the work-file crates.
#![allow(missing_docs)]

pub use ::chrono;

pub mod entity;
pub mod error;
pub mod file_key;
pub mod ids;
pub mod search;
pub mod versioned_file;

// Intentionally curated re-exports for downstream consumers.
pub use entity::{ChildBreakdown, EntityRef, UserRef, WorkContext};
pub use error::{ModelError, Result as ModelResult};
pub use file_key::{FieldValue, FileKey, TemplateFields, TemplateName};
pub use ids::{PublishedFileId, SearchId, ThumbnailRequestId};
pub use search::{
    SearchEnvironment, SearchFilters, SearchRequest, SearchStatus,
};
pub use versioned_file::{
    Activity, LocalInfo, PublishInfo, Thumbnail, VersionedFile,
};
