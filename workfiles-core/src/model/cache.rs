use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use workfiles_model::{FileKey, SearchEnvironment, VersionedFile};

use super::tree::NodeId;

/// Everything known about one logical file.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub versions: BTreeMap<u32, VersionedFile>,
    pub items: BTreeMap<u32, NodeId>,
    pub environment: Arc<SearchEnvironment>,
}

/// Versions and their owning nodes, keyed by [`FileKey`].
///
/// Only the consumer mutates this, in response to completion events. It is
/// cleared wholesale on every refresh.
#[derive(Debug, Default)]
pub struct FileCache {
    entries: HashMap<FileKey, CacheEntry>,
}

impl FileCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace the version and its node, and record the
    /// environment it was found under.
    pub fn upsert(
        &mut self,
        file: VersionedFile,
        node: NodeId,
        environment: &Arc<SearchEnvironment>,
    ) {
        let version = file.version;
        match self.entries.get_mut(&file.key) {
            Some(entry) => {
                entry.environment = Arc::clone(environment);
                entry.items.insert(version, node);
                entry.versions.insert(version, file);
            }
            None => {
                let key = file.key.clone();
                self.entries.insert(
                    key,
                    CacheEntry {
                        versions: BTreeMap::from([(version, file)]),
                        items: BTreeMap::from([(version, node)]),
                        environment: Arc::clone(environment),
                    },
                );
            }
        }
    }

    pub fn entry(&self, key: &FileKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn entry_mut(&mut self, key: &FileKey) -> Option<&mut CacheEntry> {
        self.entries.get_mut(key)
    }

    pub fn file(&self, key: &FileKey, version: u32) -> Option<&VersionedFile> {
        self.entries.get(key)?.versions.get(&version)
    }
}
