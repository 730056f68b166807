//! Identity-based merging of local and published versions, and the request
//! filters applied to the merged set.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use workfiles_model::{
    FileKey, LocalInfo, PublishInfo, SearchFilters, VersionedFile,
};

/// Accumulates scan results keyed by `(FileKey, version)`.
///
/// Inserting data for a pair that already exists updates the existing
/// version in place, so feeding the same results twice changes nothing.
#[derive(Debug, Default)]
pub struct VersionMerge {
    entries: BTreeMap<(FileKey, u32), VersionedFile>,
}

impl VersionMerge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_local(
        &mut self,
        key: FileKey,
        name: String,
        version: u32,
        local: LocalInfo,
    ) {
        match self.entries.entry((key, version)) {
            Entry::Occupied(mut existing) => existing.get_mut().attach_local(local),
            Entry::Vacant(slot) => {
                let key = slot.key().0.clone();
                slot.insert(VersionedFile::from_local(key, name, version, local));
            }
        }
    }

    pub fn insert_publish(
        &mut self,
        key: FileKey,
        name: String,
        version: u32,
        publish: PublishInfo,
    ) {
        match self.entries.entry((key, version)) {
            Entry::Occupied(mut existing) => {
                existing.get_mut().attach_publish(publish)
            }
            Entry::Vacant(slot) => {
                let key = slot.key().0.clone();
                slot.insert(VersionedFile::from_publish(
                    key, name, version, publish,
                ));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merged versions ordered by key, then ascending version.
    pub fn into_files(self) -> Vec<VersionedFile> {
        self.entries.into_values().collect()
    }
}

/// Apply a request's filters to merged versions.
///
/// Entries failing both the work-file and publish switches are dropped.
/// Without `show_all_versions` only the highest remaining version per key
/// survives; a published entry beats a local-only one at the same version.
pub fn apply_filters(
    files: Vec<VersionedFile>,
    filters: SearchFilters,
) -> Vec<VersionedFile> {
    let visible = files
        .into_iter()
        .filter(|file| filters.accepts(file.is_local, file.is_published));

    if filters.show_all_versions {
        return visible.collect();
    }

    let mut latest: BTreeMap<FileKey, VersionedFile> = BTreeMap::new();
    for file in visible {
        match latest.entry(file.key.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(file);
            }
            Entry::Occupied(mut current) => {
                if outranks(&file, current.get()) {
                    current.insert(file);
                }
            }
        }
    }
    latest.into_values().collect()
}

fn outranks(candidate: &VersionedFile, current: &VersionedFile) -> bool {
    (candidate.version, candidate.is_published)
        > (current.version, current.is_published)
}
