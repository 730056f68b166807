//! # Workfiles Core
//!
//! Asynchronous discovery of an artist's work files and published files for
//! one or more entity contexts, merged into a single version history per
//! logical file.
//!
//! ## Overview
//!
//! - **Finder**: runs each search as a cancellable task; the local
//!   filesystem scan and the tracking-service query run concurrently and are
//!   merged by [`workfiles_model::FileKey`] before one result is delivered
//! - **Aggregator**: the single consumer of search and thumbnail
//!   completions; owns the group → folder → file tree and the per-key
//!   version cache, and rejects anything belonging to a superseded refresh
//! - **Thumbnails**: published thumbnails are fetched on demand and shared
//!   with older local versions of the same file
//! - **Ports**: the template engine, filesystem walker, tracking-service
//!   client and thumbnail source are traits implemented by the host
//!
//! ## Architecture
//!
//! - [`finder`]: search orchestration, merge and filter rules
//! - [`model`]: result tree, cache, aggregator, event bus and views
//! - [`ports`]: external collaborator contracts
//! - [`thumbnails`]: scoped thumbnail downloader
//! - [`startup`]: launch-at-startup decision
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tokio::runtime::Handle;
//! use workfiles_core::finder::{FileFinder, FinderConfig, SearchBackends};
//! use workfiles_core::model::{FileModelDriver, ModelConfig, ResultAggregator};
//! use workfiles_model::{SearchFilters, SearchRequest, WorkContext};
//!
//! async fn list(backends: SearchBackends) -> workfiles_core::Result<()> {
//!     let (finder, finder_events) =
//!         FileFinder::channel(backends, FinderConfig::default(), Handle::current())?;
//!     let aggregator = ResultAggregator::new(Arc::new(finder), ModelConfig::default());
//!     let mut driver = FileModelDriver::new(aggregator, finder_events);
//!
//!     driver.aggregator_mut().refresh(&[SearchRequest::new(
//!         "Shot 010",
//!         WorkContext::default(),
//!         SearchFilters::work_and_publishes(),
//!     )]);
//!     driver.process_until_idle().await;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]

pub mod error;
pub mod finder;
pub mod model;
pub mod ports;
pub mod startup;
pub mod thumbnails;

pub use error::{
    QueryError, Result, ScanError, SearchError, ThumbnailFetchError,
    WorkfilesError,
};
pub use finder::{FileFinder, Finder, FinderConfig, FinderEvent, SearchBackends};
pub use model::{
    FileModelDriver, FileView, ModelConfig, ModelEvent, ModelEventReceiver,
    NodeId, NodeKind, ResultAggregator, ResultTree,
};
pub use startup::{HostInfo, StartupDecision, StartupSettings, StartupState};
pub use thumbnails::ScopedThumbnailFetcher;
