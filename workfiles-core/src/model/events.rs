use std::fmt;
use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc;

use super::tree::NodeId;

/// Notifications the aggregator publishes to the consuming UI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelEvent {
    /// All nodes were dropped by a refresh.
    Reset,
    /// A group was created and its search issued.
    SearchStarted { group: NodeId },
    /// File nodes were appended below `parent`.
    ChildrenAdded { parent: NodeId, nodes: Vec<NodeId> },
    /// A group's search finished; its files are in place.
    SearchCompleted { group: NodeId },
    /// A group's search failed with `message`.
    SearchFailed { group: NodeId, message: String },
    /// Displayed data of `node` changed (e.g. a thumbnail arrived).
    NodeChanged { node: NodeId },
}

pub type ModelEventReceiver = mpsc::UnboundedReceiver<ModelEvent>;

/// In-process fan-out of [`ModelEvent`]s to any number of subscribers.
///
/// Every subscriber owns an unbounded queue, so a burst never overwrites
/// undelivered events. Subscribers whose receiver was dropped are pruned on
/// the next publish.
#[derive(Default)]
pub struct ModelEventBus {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<ModelEvent>>>,
}

impl fmt::Debug for ModelEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelEventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl ModelEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> ModelEventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Publishing with no subscribers is not an error.
    pub fn publish(&self, event: ModelEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
