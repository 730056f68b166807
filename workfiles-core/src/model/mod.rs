//! Consumer side of the engine: the result tree, the per-key version cache
//! and the aggregator that feeds both from finder and thumbnail completions.

mod aggregator;
pub mod cache;
mod config;
mod driver;
pub mod events;
pub mod tree;
mod view;

pub use aggregator::ResultAggregator;
pub use cache::{CacheEntry, FileCache};
pub use config::ModelConfig;
pub use driver::FileModelDriver;
pub use events::{ModelEvent, ModelEventBus, ModelEventReceiver};
pub use tree::{
    FileNode, FolderNode, GroupNode, Node, NodeId, NodeKind, ResultTree,
    StatusTransitionError,
};
pub use view::FileView;
