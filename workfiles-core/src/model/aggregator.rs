use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};
use workfiles_model::{
    FileKey, SearchEnvironment, SearchId, SearchRequest, SearchStatus,
    Thumbnail, ThumbnailRequestId, VersionedFile,
};

use super::cache::FileCache;
use super::config::ModelConfig;
use super::events::{ModelEvent, ModelEventBus, ModelEventReceiver};
use super::tree::{Node, NodeId, NodeKind, ResultTree};
use crate::finder::{Finder, FinderEvent};
use crate::ports::{ThumbnailDownloader, ThumbnailEvent, ThumbnailRequest};

const SEARCHING_MESSAGE: &str = "Searching for files...";
const NO_FILES_MESSAGE: &str = "No files found!";

/// Single consumer of finder and thumbnail completions.
///
/// Owns the [`ResultTree`] and the [`FileCache`]; every mutation happens on
/// the caller's thread through `&mut self`, so neither needs locking. Search
/// ids and thumbnail request ids are only honoured while they are tracked:
/// [`ResultAggregator::refresh`] forgets all of them before it clears state,
/// and anything arriving for a forgotten id is dropped without effect.
pub struct ResultAggregator {
    finder: Arc<dyn Finder>,
    thumbnails: Option<Arc<dyn ThumbnailDownloader>>,
    config: ModelConfig,
    tree: ResultTree,
    cache: FileCache,
    in_progress: HashMap<SearchId, NodeId>,
    pending_thumbnails: HashMap<ThumbnailRequestId, NodeId>,
    events: ModelEventBus,
}

impl fmt::Debug for ResultAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultAggregator")
            .field("config", &self.config)
            .field("nodes", &self.tree.len())
            .field("keys", &self.cache.len())
            .field("in_progress", &self.in_progress.len())
            .field("pending_thumbnails", &self.pending_thumbnails.len())
            .finish_non_exhaustive()
    }
}

impl ResultAggregator {
    pub fn new(finder: Arc<dyn Finder>, config: ModelConfig) -> Self {
        Self {
            finder,
            thumbnails: None,
            config,
            tree: ResultTree::new(),
            cache: FileCache::new(),
            in_progress: HashMap::new(),
            pending_thumbnails: HashMap::new(),
            events: ModelEventBus::new(),
        }
    }

    pub fn with_thumbnails(
        mut self,
        downloader: Arc<dyn ThumbnailDownloader>,
    ) -> Self {
        self.thumbnails = Some(downloader);
        self
    }

    /// Every event published after this call is queued for the returned
    /// receiver until it is read or dropped.
    pub fn subscribe(&self) -> ModelEventReceiver {
        self.events.subscribe()
    }

    pub fn tree(&self) -> &ResultTree {
        &self.tree
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Searches issued by the last refresh that have not reported yet.
    pub fn in_progress_count(&self) -> usize {
        self.in_progress.len()
    }

    pub fn pending_thumbnail_count(&self) -> usize {
        self.pending_thumbnails.len()
    }

    /// Replace everything with one group per request and start a search for
    /// each. Returns the new group nodes in request order.
    pub fn refresh(&mut self, requests: &[SearchRequest]) -> Vec<NodeId> {
        for (search_id, _) in self.in_progress.drain() {
            self.finder.stop_search(search_id);
        }
        self.pending_thumbnails.clear();

        self.tree.clear();
        self.cache.clear();
        self.events.publish(ModelEvent::Reset);

        let mut groups = Vec::with_capacity(requests.len());
        for request in requests {
            let group = self.tree.add_group(request.name.clone());
            for child in &request.child_entities {
                self.tree.add_folder(group, child);
            }

            let search_id = self.finder.begin_search(request);
            if self.in_progress.insert(search_id, group).is_some() {
                warn!(%search_id, "finder reused a search id within one refresh");
            }
            debug!(%search_id, %group, name = %request.name, "group created");
            self.events.publish(ModelEvent::SearchStarted { group });
            groups.push(group);
        }

        info!(groups = groups.len(), "refresh issued");
        groups
    }

    /// Apply one finder completion. Returns false when it was stale.
    pub fn handle_finder_event(&mut self, event: FinderEvent) -> bool {
        match event {
            FinderEvent::FilesFound {
                search_id,
                files,
                environment,
            } => self.on_files_found(search_id, files, environment),
            FinderEvent::SearchFailed { search_id, error } => {
                self.on_search_failed(search_id, error.to_string())
            }
        }
    }

    fn on_files_found(
        &mut self,
        search_id: SearchId,
        files: Vec<VersionedFile>,
        environment: Arc<SearchEnvironment>,
    ) -> bool {
        let Some(group) = self.in_progress.remove(&search_id) else {
            debug!(%search_id, "discarding results for untracked search");
            return false;
        };

        let mut added: Vec<(NodeId, Vec<NodeId>)> = Vec::new();
        for file in files {
            let parent = file
                .entity()
                .and_then(|entity| self.tree.folder_for_entity(group, entity))
                .unwrap_or(group);
            let Some(node) =
                self.tree.add_file(parent, file.key.clone(), file.version)
            else {
                continue;
            };

            if let Some(uid) = self.request_thumbnail(&file) {
                self.pending_thumbnails.insert(uid, node);
            }
            self.cache.upsert(file, node, &environment);

            match added.iter_mut().find(|(p, _)| *p == parent) {
                Some((_, nodes)) => nodes.push(node),
                None => added.push((parent, vec![node])),
            }
        }

        if let Err(error) =
            self.tree.set_group_status(group, SearchStatus::Completed, None)
        {
            debug!(%search_id, %group, ?error, "group status not updated");
        }

        for (parent, nodes) in added {
            self.events.publish(ModelEvent::ChildrenAdded { parent, nodes });
        }
        self.events.publish(ModelEvent::SearchCompleted { group });
        true
    }

    fn on_search_failed(&mut self, search_id: SearchId, message: String) -> bool {
        let Some(group) = self.in_progress.remove(&search_id) else {
            debug!(%search_id, "discarding failure for untracked search");
            return false;
        };

        if let Err(error) = self.tree.set_group_status(
            group,
            SearchStatus::Failed,
            Some(message.clone()),
        ) {
            debug!(%search_id, %group, ?error, "group status not updated");
        }
        self.events
            .publish(ModelEvent::SearchFailed { group, message });
        true
    }

    fn request_thumbnail(
        &self,
        file: &VersionedFile,
    ) -> Option<ThumbnailRequestId> {
        if !self.config.request_thumbnails
            || !file.is_published
            || file.thumbnail.is_some()
        {
            return None;
        }
        let downloader = self.thumbnails.as_ref()?;
        let url = file.thumbnail_path.clone()?;
        let publish_id = file.published_file_id?;

        let uid = downloader.request(ThumbnailRequest {
            url,
            entity_type: "PublishedFile".to_string(),
            entity_id: publish_id.0,
            field: "image".to_string(),
        });
        debug!(%uid, %publish_id, "thumbnail requested");
        Some(uid)
    }

    /// Apply one thumbnail completion. Returns false when it was stale or
    /// failed.
    pub fn handle_thumbnail_event(&mut self, event: ThumbnailEvent) -> bool {
        match event {
            ThumbnailEvent::Completed { uid, image } => {
                self.on_thumbnail_ready(uid, image)
            }
            ThumbnailEvent::Failed { uid, error } => {
                if self.pending_thumbnails.remove(&uid).is_some() {
                    warn!(%uid, %error, "thumbnail fetch failed");
                } else {
                    debug!(%uid, %error, "ignoring failure of untracked thumbnail");
                }
                false
            }
        }
    }

    fn on_thumbnail_ready(
        &mut self,
        uid: ThumbnailRequestId,
        image: Thumbnail,
    ) -> bool {
        let Some(node) = self.pending_thumbnails.remove(&uid) else {
            debug!(%uid, "ignoring untracked thumbnail");
            return false;
        };
        let Some((key, version)) = self
            .tree
            .file(node)
            .map(|file| (file.key.clone(), file.version))
        else {
            return false;
        };
        let Some(entry) = self.cache.entry_mut(&key) else {
            return false;
        };
        let Some(owner) = entry.versions.get_mut(&version) else {
            return false;
        };
        owner.thumbnail = Some(image.clone());

        let mut changed = vec![node];
        // A later search of this refresh may have re-listed the version.
        if let Some(&current) =
            entry.items.get(&version).filter(|&&current| current != node)
        {
            changed.push(current);
        }
        for (other, file) in entry.versions.iter_mut().rev() {
            if *other == version
                || file.thumbnail.is_some()
                || file.thumbnail_path.is_some()
                || file.is_published
                || !file.is_local
            {
                continue;
            }
            file.thumbnail = Some(image.clone());
            if let Some(&item) = entry.items.get(other) {
                changed.push(item);
            }
        }

        debug!(%uid, %node, changed = changed.len(), "thumbnail applied");
        for node in changed {
            self.events.publish(ModelEvent::NodeChanged { node });
        }
        true
    }

    pub fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.tree.kind(node)
    }

    /// Payload of a file node; `None` for groups, folders and stale ids.
    pub fn file_for(&self, node: NodeId) -> Option<&VersionedFile> {
        let file = self.tree.file(node)?;
        self.cache.file(&file.key, file.version)
    }

    /// Text a view shows for `node`.
    pub fn label(&self, node: NodeId) -> Option<String> {
        match self.tree.get(node)? {
            Node::Group(group) => Some(group.label.clone()),
            Node::Folder(folder) => Some(folder.label.clone()),
            Node::File(_) => self.file_for(node).map(VersionedFile::label),
        }
    }

    pub fn group_status(&self, node: NodeId) -> Option<SearchStatus> {
        self.tree.group(node).map(|group| group.status())
    }

    /// Placeholder text for a group with nothing to list yet.
    pub fn group_message(&self, node: NodeId) -> Option<String> {
        let group = self.tree.group(node)?;
        match group.status() {
            SearchStatus::Searching => Some(SEARCHING_MESSAGE.to_string()),
            SearchStatus::Completed => self
                .tree
                .file_descendants(node)
                .is_empty()
                .then(|| NO_FILES_MESSAGE.to_string()),
            SearchStatus::Failed => group.message().map(str::to_string),
        }
    }

    /// Every known version of `key`.
    pub fn get_file_versions(
        &self,
        key: &FileKey,
    ) -> Option<&BTreeMap<u32, VersionedFile>> {
        self.cache.entry(key).map(|entry| &entry.versions)
    }

    /// Every known version of `key` with the environment it was found in.
    pub fn get_file_info(
        &self,
        key: &FileKey,
    ) -> Option<(&BTreeMap<u32, VersionedFile>, &SearchEnvironment)> {
        self.cache
            .entry(key)
            .map(|entry| (&entry.versions, entry.environment.as_ref()))
    }
}
