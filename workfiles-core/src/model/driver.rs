use tokio::sync::mpsc;
use tracing::debug;

use super::aggregator::ResultAggregator;
use crate::finder::FinderEvent;
use crate::ports::ThumbnailEvent;

/// Pumps finder and thumbnail completions into one [`ResultAggregator`].
///
/// This is the single consumer: whoever owns the driver is the only place
/// results are applied, so the aggregator never sees concurrent mutation.
#[derive(Debug)]
pub struct FileModelDriver {
    aggregator: ResultAggregator,
    finder_events: mpsc::UnboundedReceiver<FinderEvent>,
    thumbnail_events: Option<mpsc::UnboundedReceiver<ThumbnailEvent>>,
}

impl FileModelDriver {
    pub fn new(
        aggregator: ResultAggregator,
        finder_events: mpsc::UnboundedReceiver<FinderEvent>,
    ) -> Self {
        Self {
            aggregator,
            finder_events,
            thumbnail_events: None,
        }
    }

    pub fn with_thumbnail_events(
        mut self,
        events: mpsc::UnboundedReceiver<ThumbnailEvent>,
    ) -> Self {
        self.thumbnail_events = Some(events);
        self
    }

    pub fn aggregator(&self) -> &ResultAggregator {
        &self.aggregator
    }

    pub fn aggregator_mut(&mut self) -> &mut ResultAggregator {
        &mut self.aggregator
    }

    pub fn into_aggregator(self) -> ResultAggregator {
        self.aggregator
    }

    /// Wait for the next completion of either kind and apply it. Returns
    /// false once every channel is closed.
    pub async fn process_next(&mut self) -> bool {
        let Self {
            aggregator,
            finder_events,
            thumbnail_events,
        } = self;
        let thumbnail = async {
            match thumbnail_events.as_mut() {
                Some(events) => events.recv().await,
                None => None,
            }
        };

        tokio::select! {
            Some(event) = finder_events.recv() => {
                aggregator.handle_finder_event(event);
                true
            }
            Some(event) = thumbnail => {
                aggregator.handle_thumbnail_event(event);
                true
            }
            else => false,
        }
    }

    /// Apply everything already queued without waiting. Returns the number
    /// of events applied.
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.finder_events.try_recv() {
            self.aggregator.handle_finder_event(event);
            applied += 1;
        }
        if let Some(events) = self.thumbnail_events.as_mut() {
            while let Ok(event) = events.try_recv() {
                self.aggregator.handle_thumbnail_event(event);
                applied += 1;
            }
        }
        applied
    }

    /// Keep applying completions until no tracked search or thumbnail is
    /// outstanding. Thumbnails are only waited for when their channel is
    /// attached.
    pub async fn process_until_idle(&mut self) -> usize {
        let mut applied = self.process_pending();
        while self.has_outstanding_work() {
            if !self.process_next().await {
                debug!("completion channels closed with work outstanding");
                break;
            }
            applied += 1;
        }
        applied
    }

    fn has_outstanding_work(&self) -> bool {
        self.aggregator.in_progress_count() > 0
            || (self.thumbnail_events.is_some()
                && self.aggregator.pending_thumbnail_count() > 0)
    }
}
