//! Scoped thumbnail downloads run on the background runtime.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::debug;
use workfiles_model::{Thumbnail, ThumbnailRequestId};

use crate::ports::{
    ThumbnailDownloader, ThumbnailEvent, ThumbnailRequest, ThumbnailSource,
};

/// [`ThumbnailDownloader`] backed by an async [`ThumbnailSource`].
///
/// Every request gets a fresh id and its own task; the outcome is posted to
/// the event channel whether or not anyone still cares about it. Consumers
/// drop completions for ids they no longer track.
pub struct ScopedThumbnailFetcher {
    source: Arc<dyn ThumbnailSource>,
    runtime: Handle,
    events: mpsc::UnboundedSender<ThumbnailEvent>,
    next_id: AtomicU64,
}

impl fmt::Debug for ScopedThumbnailFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedThumbnailFetcher")
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl ScopedThumbnailFetcher {
    pub fn new(
        source: Arc<dyn ThumbnailSource>,
        runtime: Handle,
        events: mpsc::UnboundedSender<ThumbnailEvent>,
    ) -> Self {
        Self {
            source,
            runtime,
            events,
            next_id: AtomicU64::new(1),
        }
    }

    /// Convenience constructor returning the fetcher and its event receiver.
    pub fn channel(
        source: Arc<dyn ThumbnailSource>,
        runtime: Handle,
    ) -> (Self, mpsc::UnboundedReceiver<ThumbnailEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(source, runtime, tx), rx)
    }
}

impl ThumbnailDownloader for ScopedThumbnailFetcher {
    fn request(&self, request: ThumbnailRequest) -> ThumbnailRequestId {
        let uid =
            ThumbnailRequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let source = Arc::clone(&self.source);
        let events = self.events.clone();

        self.runtime.spawn(async move {
            let event = match source.download(&request).await {
                Ok(path) => ThumbnailEvent::Completed {
                    uid,
                    image: Thumbnail::new(path),
                },
                Err(error) => ThumbnailEvent::Failed { uid, error },
            };
            if events.send(event).is_err() {
                debug!(%uid, "thumbnail receiver dropped; discarding result");
            }
        });

        uid
    }
}
