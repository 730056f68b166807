use std::cmp::Reverse;
use std::collections::HashMap;

use workfiles_model::{FileKey, SearchFilters, VersionedFile};

use super::aggregator::ResultAggregator;
use super::tree::NodeId;

/// Display-side filter and ordering over one group's file nodes.
///
/// Independent of the filters the search ran with: a view can narrow an
/// all-versions search down to latest versions without searching again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileView {
    pub filters: SearchFilters,
    search_text: Option<String>,
}

impl FileView {
    pub fn new(filters: SearchFilters) -> Self {
        Self {
            filters,
            search_text: None,
        }
    }

    /// Case-insensitive substring matched against the file label. Blank
    /// text clears the filter.
    pub fn set_search_text(&mut self, text: &str) {
        let text = text.trim();
        self.search_text = (!text.is_empty()).then(|| text.to_lowercase());
    }

    pub fn search_text(&self) -> Option<&str> {
        self.search_text.as_deref()
    }

    fn matches(&self, file: &VersionedFile) -> bool {
        if !self.filters.accepts(file.is_local, file.is_published) {
            return false;
        }
        match &self.search_text {
            Some(text) => file.label().to_lowercase().contains(text.as_str()),
            None => true,
        }
    }

    /// Visible file nodes below `group`, sorted by name then version, both
    /// descending.
    pub fn rows(
        &self,
        aggregator: &ResultAggregator,
        group: NodeId,
    ) -> Vec<NodeId> {
        let mut visible: Vec<(NodeId, &VersionedFile)> = aggregator
            .tree()
            .file_descendants(group)
            .into_iter()
            .filter_map(|node| aggregator.file_for(node).map(|f| (node, f)))
            .filter(|(_, file)| self.matches(file))
            .collect();

        if !self.filters.show_all_versions {
            let mut latest: HashMap<&FileKey, u32> = HashMap::new();
            for &(_, file) in &visible {
                let best = latest.entry(&file.key).or_insert(file.version);
                *best = (*best).max(file.version);
            }
            visible.retain(|(_, file)| {
                latest.get(&file.key) == Some(&file.version)
            });
        }

        visible.sort_by_key(|(_, file)| {
            Reverse((file.name.clone(), file.version))
        });
        visible.into_iter().map(|(node, _)| node).collect()
    }
}
