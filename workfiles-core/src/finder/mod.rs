//! Concurrent file discovery across the local filesystem and the tracking
//! service.
//!
//! Every search runs as its own task on the background runtime. Within a
//! search the filesystem scan and the publish query run concurrently, and
//! their results are merged by file identity before a single
//! [`FinderEvent`] is delivered for the search id.

pub mod builder;
pub mod config;
pub mod merge;

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use workfiles_model::{
    SearchEnvironment, SearchId, SearchRequest, VersionedFile,
};

use crate::error::{Result, SearchError};
use crate::ports::{
    FilesystemScanner, PublishFilter, PublishQuery, TemplateResolver,
    TemplateRole,
};
use builder::VersionBuilder;
pub use config::FinderConfig;
pub use merge::{VersionMerge, apply_filters};

/// Outcome of one search. Exactly one is delivered per search id, and none
/// after the id has been stopped.
#[derive(Debug)]
pub enum FinderEvent {
    FilesFound {
        search_id: SearchId,
        files: Vec<VersionedFile>,
        environment: Arc<SearchEnvironment>,
    },
    SearchFailed {
        search_id: SearchId,
        error: SearchError,
    },
}

impl FinderEvent {
    pub fn search_id(&self) -> SearchId {
        match self {
            FinderEvent::FilesFound { search_id, .. }
            | FinderEvent::SearchFailed { search_id, .. } => *search_id,
        }
    }
}

/// Starts and stops asynchronous searches.
pub trait Finder: Send + Sync {
    /// Start a search and return its id immediately.
    fn begin_search(&self, request: &SearchRequest) -> SearchId;

    /// Stop tracking a search. Advisory: in-flight work may finish, but no
    /// event is delivered for `search_id` once this returns.
    fn stop_search(&self, search_id: SearchId);
}

/// The external collaborators a search talks to.
#[derive(Clone)]
pub struct SearchBackends {
    pub resolver: Arc<dyn TemplateResolver>,
    pub scanner: Arc<dyn FilesystemScanner>,
    pub query: Arc<dyn PublishQuery>,
}

impl fmt::Debug for SearchBackends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchBackends").finish_non_exhaustive()
    }
}

type ActiveSearches = Arc<Mutex<HashMap<SearchId, CancellationToken>>>;

/// [`Finder`] running searches on a tokio runtime.
pub struct FileFinder {
    backends: SearchBackends,
    config: Arc<FinderConfig>,
    runtime: Handle,
    events: mpsc::UnboundedSender<FinderEvent>,
    active: ActiveSearches,
    next_id: AtomicU64,
}

impl fmt::Debug for FileFinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileFinder")
            .field("config", &self.config)
            .field("active_searches", &self.active_count())
            .finish_non_exhaustive()
    }
}

impl FileFinder {
    pub fn new(
        backends: SearchBackends,
        config: FinderConfig,
        runtime: Handle,
        events: mpsc::UnboundedSender<FinderEvent>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            backends,
            config: Arc::new(config),
            runtime,
            events,
            active: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        })
    }

    /// Convenience constructor returning the finder and its event receiver.
    pub fn channel(
        backends: SearchBackends,
        config: FinderConfig,
        runtime: Handle,
    ) -> Result<(Self, mpsc::UnboundedReceiver<FinderEvent>)> {
        let (tx, rx) = mpsc::unbounded_channel();
        Ok((Self::new(backends, config, runtime, tx)?, rx))
    }

    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Number of searches that have neither delivered nor been stopped.
    pub fn active_count(&self) -> usize {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Finder for FileFinder {
    fn begin_search(&self, request: &SearchRequest) -> SearchId {
        let search_id = SearchId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let token = CancellationToken::new();
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(search_id, token.clone());

        info!(%search_id, group = %request.name, context = %request.context, "search started");

        let backends = self.backends.clone();
        let config = Arc::clone(&self.config);
        let request = request.clone();
        let active = Arc::clone(&self.active);
        let events = self.events.clone();

        self.runtime.spawn(async move {
            let started = Instant::now();
            let mut work =
                tokio::spawn(run_search(backends, config, request));

            let joined = tokio::select! {
                _ = token.cancelled() => None,
                joined = &mut work => Some(joined),
            };
            let Some(joined) = joined else {
                work.abort();
                debug!(%search_id, "search cancelled");
                return;
            };

            let event = match joined {
                Ok(Ok((files, environment))) => {
                    info!(
                        %search_id,
                        files = files.len(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "search completed"
                    );
                    FinderEvent::FilesFound {
                        search_id,
                        files,
                        environment: Arc::new(environment),
                    }
                }
                Ok(Err(error)) => {
                    warn!(%search_id, %error, "search failed");
                    FinderEvent::SearchFailed { search_id, error }
                }
                Err(join_error) => {
                    warn!(%search_id, error = %join_error, "search task aborted");
                    FinderEvent::SearchFailed {
                        search_id,
                        error: SearchError::Aborted(join_error.to_string()),
                    }
                }
            };
            deliver(&active, &events, event);
        });

        search_id
    }

    fn stop_search(&self, search_id: SearchId) {
        let token = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&search_id);
        if let Some(token) = token {
            debug!(%search_id, "stopping search");
            token.cancel();
        }
    }
}

/// Send `event` only if its search is still tracked. The removal and the
/// send happen under one lock so a concurrent `stop_search` either wins
/// outright or observes the event as already delivered.
fn deliver(
    active: &Mutex<HashMap<SearchId, CancellationToken>>,
    events: &mpsc::UnboundedSender<FinderEvent>,
    event: FinderEvent,
) {
    let search_id = event.search_id();
    let mut active = active.lock().unwrap_or_else(PoisonError::into_inner);
    if active.remove(&search_id).is_none() {
        debug!(%search_id, "search stopped before delivery; dropping result");
        return;
    }
    if events.send(event).is_err() {
        debug!(%search_id, "finder receiver dropped; discarding result");
    }
}

async fn run_search(
    backends: SearchBackends,
    config: Arc<FinderConfig>,
    request: SearchRequest,
) -> std::result::Result<(Vec<VersionedFile>, SearchEnvironment), SearchError>
{
    let templates = config.template_set();
    let candidates = backends
        .resolver
        .resolve_candidates(&request.context, &templates)
        .await?;
    let work_candidates: Vec<_> = candidates
        .into_iter()
        .filter(|candidate| candidate.role == TemplateRole::Work)
        .collect();

    let filter =
        PublishFilter::for_context(&request.context, templates.publish.clone());

    let (local, remote) = tokio::try_join!(
        async {
            backends
                .scanner
                .scan(&work_candidates)
                .await
                .map_err(SearchError::from)
        },
        async {
            backends
                .query
                .find(&filter, &config.publish_fields)
                .await
                .map_err(SearchError::from)
        },
    )?;

    let builder = VersionBuilder::new(
        &config,
        backends.resolver.template_keys(&templates.work),
        request.context.entity.clone(),
    );

    let mut merge = VersionMerge::new();
    for record in local {
        builder.add_local(&mut merge, record);
    }
    for record in remote {
        builder.add_publish(
            &mut merge,
            backends.resolver.as_ref(),
            &templates.publish,
            record,
        );
    }

    let files = apply_filters(merge.into_files(), request.filters);
    let environment = SearchEnvironment {
        context: request.context,
        work_template: templates.work,
        publish_template: templates.publish,
    };
    Ok((files, environment))
}
