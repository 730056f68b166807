//! In-memory collaborators shared by the integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::watch;
use workfiles_core::error::{QueryError, ScanError};
use workfiles_core::finder::{Finder, FinderEvent};
use workfiles_core::model::{ModelEvent, ModelEventReceiver};
use workfiles_core::ports::{
    FilesystemScanner, LocalFileRecord, PublishFilter, PublishQuery,
    PublishedFileRecord, ResolvedCandidate, TemplateResolver, TemplateRole,
    TemplateSet, ThumbnailDownloader, ThumbnailRequest,
};
use workfiles_core::SearchBackends;
use workfiles_model::{
    Activity, EntityRef, FieldValue, FileKey, LocalInfo, PublishInfo,
    PublishedFileId, SearchEnvironment, SearchFilters, SearchId,
    SearchRequest, TemplateFields, TemplateName, ThumbnailRequestId,
    UserRef, VersionedFile, WorkContext,
};

pub const SETTLE: Duration = Duration::from_millis(100);

pub fn project() -> EntityRef {
    EntityRef::new("Project", 1).with_name("Big Buck")
}

pub fn shot(id: i64) -> EntityRef {
    EntityRef::new("Shot", id).with_name(format!("{id:03}"))
}

pub fn context(entity: &EntityRef) -> WorkContext {
    WorkContext::for_entity(project(), entity.clone())
}

pub fn request(name: &str, entity: &EntityRef) -> SearchRequest {
    SearchRequest::new(
        name,
        context(entity),
        SearchFilters::work_and_publishes(),
    )
}

/// `{name}.v{version:03}.{ext}` → name / version / extension.
pub fn parse_file_name(path: &Path) -> Option<TemplateFields> {
    let file_name = path.file_name()?.to_str()?;
    let mut parts = file_name.split('.');
    let name = parts.next()?;
    let version = parts.next()?;
    let extension = parts.next()?;
    if parts.next().is_some() || !version.starts_with('v') {
        return None;
    }
    let mut fields = TemplateFields::new();
    fields.insert("name".into(), FieldValue::from(name));
    fields.insert("version".into(), FieldValue::from(version));
    fields.insert("extension".into(), FieldValue::from(extension));
    Some(fields)
}

fn work_path(entity: &EntityRef, name: &str, version: u32) -> PathBuf {
    PathBuf::from(format!(
        "/projects/bb/shots/{}/work/{name}.v{version:03}.nk",
        entity.id
    ))
}

fn publish_path(entity: &EntityRef, name: &str, version: u32) -> PathBuf {
    PathBuf::from(format!(
        "/projects/bb/shots/{}/publish/{name}.v{version:03}.nk",
        entity.id
    ))
}

pub fn local_record(
    entity: &EntityRef,
    name: &str,
    version: u32,
) -> LocalFileRecord {
    let path = work_path(entity, name, version);
    LocalFileRecord {
        fields: parse_file_name(&path).unwrap_or_default(),
        path,
        template: TemplateName::new("work_file"),
        entity: Some(entity.clone()),
        modified: Activity::new(
            Some(UserRef::new(7, "Robin")),
            Utc.with_ymd_and_hms(2024, 3, 1, 14, 5, 0).single(),
        ),
    }
}

pub fn publish_record(
    id: i64,
    entity: &EntityRef,
    name: &str,
    version: u32,
    image: Option<&str>,
) -> PublishedFileRecord {
    PublishedFileRecord {
        id: PublishedFileId(id),
        path: publish_path(entity, name, version),
        name: Some(name.to_string()),
        version_number: Some(version),
        image: image.map(str::to_string),
        entity: Some(entity.clone()),
        created_by: Some(UserRef::new(3, "Sam")),
        created_at: Utc.with_ymd_and_hms(2024, 3, 2, 9, 30, 0).single(),
        description: Some("Final comp".to_string()),
    }
}

pub fn key(entity: &EntityRef, name: &str) -> FileKey {
    FileKey::new(
        Some(entity.clone()),
        [("name", name), ("extension", "nk")],
    )
    .expect("valid key")
}

pub fn local_file(entity: &EntityRef, name: &str, version: u32) -> VersionedFile {
    VersionedFile::from_local(
        key(entity, name),
        name,
        version,
        LocalInfo {
            path: work_path(entity, name, version),
            modified: Activity::default(),
        },
    )
}

pub fn published_file(
    entity: &EntityRef,
    name: &str,
    version: u32,
    image: Option<&str>,
) -> VersionedFile {
    VersionedFile::from_publish(
        key(entity, name),
        name,
        version,
        PublishInfo {
            id: PublishedFileId(1000 + i64::from(version)),
            path: publish_path(entity, name, version),
            thumbnail_path: image.map(str::to_string),
            published: Activity::default(),
            description: None,
        },
    )
}

pub fn environment(entity: &EntityRef) -> Arc<SearchEnvironment> {
    Arc::new(SearchEnvironment {
        context: context(entity),
        work_template: TemplateName::new("work_file"),
        publish_template: TemplateName::new("publish_file"),
    })
}

/// Holds a fake backend call until opened.
#[derive(Debug)]
pub struct Gate(watch::Sender<bool>);

impl Gate {
    pub fn closed() -> Self {
        Self(watch::channel(false).0)
    }

    pub fn open(&self) {
        self.0.send_replace(true);
    }

    fn waiter(&self) -> watch::Receiver<bool> {
        self.0.subscribe()
    }
}

async fn pass(gate: Option<watch::Receiver<bool>>) {
    if let Some(mut gate) = gate {
        let _ = gate.wait_for(|open| *open).await;
    }
}

/// Resolves one work and one publish location per context entity.
#[derive(Debug, Default)]
pub struct FakeResolver {
    failing: Mutex<HashSet<i64>>,
}

impl FakeResolver {
    pub fn fail_for(&self, entity: &EntityRef) {
        self.failing.lock().unwrap().insert(entity.id);
    }
}

#[async_trait]
impl TemplateResolver for FakeResolver {
    async fn resolve_candidates(
        &self,
        context: &WorkContext,
        templates: &TemplateSet,
    ) -> Result<Vec<ResolvedCandidate>, ScanError> {
        let entity = context.entity.clone().ok_or_else(|| {
            ScanError::Template("context has no entity".into())
        })?;
        if self.failing.lock().unwrap().contains(&entity.id) {
            return Err(ScanError::Template(format!(
                "no work area configured for {}",
                entity.display_name()
            )));
        }
        let root = format!("/projects/bb/shots/{}", entity.id);
        Ok(vec![
            ResolvedCandidate {
                role: TemplateRole::Work,
                template: templates.work.clone(),
                path: PathBuf::from(format!("{root}/work")),
                fields: TemplateFields::new(),
                entity: Some(entity.clone()),
            },
            ResolvedCandidate {
                role: TemplateRole::Publish,
                template: templates.publish.clone(),
                path: PathBuf::from(format!("{root}/publish")),
                fields: TemplateFields::new(),
                entity: Some(entity),
            },
        ])
    }

    fn parse_fields(
        &self,
        _template: &TemplateName,
        path: &Path,
    ) -> Option<TemplateFields> {
        parse_file_name(path)
    }

    fn template_keys(&self, _template: &TemplateName) -> Vec<String> {
        vec!["name".into(), "version".into(), "extension".into()]
    }
}

/// Serves local records per entity id.
#[derive(Debug, Default)]
pub struct FakeScanner {
    files: Mutex<HashMap<i64, Vec<LocalFileRecord>>>,
    failing: Mutex<HashSet<i64>>,
    gates: Mutex<HashMap<i64, watch::Receiver<bool>>>,
    calls: AtomicU64,
}

impl FakeScanner {
    pub fn add(&self, record: LocalFileRecord) {
        let id = record.entity.as_ref().map_or(0, |e| e.id);
        self.files.lock().unwrap().entry(id).or_default().push(record);
    }

    pub fn fail_for(&self, entity: &EntityRef) {
        self.failing.lock().unwrap().insert(entity.id);
    }

    pub fn gate(&self, entity: &EntityRef) -> Gate {
        let gate = Gate::closed();
        self.gates.lock().unwrap().insert(entity.id, gate.waiter());
        gate
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FilesystemScanner for FakeScanner {
    async fn scan(
        &self,
        candidates: &[ResolvedCandidate],
    ) -> Result<Vec<LocalFileRecord>, ScanError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let Some(candidate) = candidates.first() else {
            return Ok(Vec::new());
        };
        let id = candidate.entity.as_ref().map_or(0, |e| e.id);
        let gate = self.gates.lock().unwrap().get(&id).cloned();
        pass(gate).await;

        if self.failing.lock().unwrap().contains(&id) {
            return Err(ScanError::Io {
                path: candidate.path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "permission denied",
                ),
            });
        }
        Ok(self
            .files
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Serves publish records per entity id.
#[derive(Debug, Default)]
pub struct FakeQuery {
    records: Mutex<HashMap<i64, Vec<PublishedFileRecord>>>,
    failing: Mutex<HashMap<i64, QueryError>>,
    gates: Mutex<HashMap<i64, watch::Receiver<bool>>>,
}

impl FakeQuery {
    pub fn add(&self, record: PublishedFileRecord) {
        let id = record.entity.as_ref().map_or(0, |e| e.id);
        self.records.lock().unwrap().entry(id).or_default().push(record);
    }

    pub fn fail_for(&self, entity: &EntityRef, error: QueryError) {
        self.failing.lock().unwrap().insert(entity.id, error);
    }

    pub fn gate(&self, entity: &EntityRef) -> Gate {
        let gate = Gate::closed();
        self.gates.lock().unwrap().insert(entity.id, gate.waiter());
        gate
    }
}

#[async_trait]
impl PublishQuery for FakeQuery {
    async fn find(
        &self,
        filter: &PublishFilter,
        _fields: &[String],
    ) -> Result<Vec<PublishedFileRecord>, QueryError> {
        let id = filter.entity.as_ref().map_or(0, |e| e.id);
        let gate = self.gates.lock().unwrap().get(&id).cloned();
        pass(gate).await;

        if let Some(error) = self.failing.lock().unwrap().get(&id) {
            return Err(error.clone());
        }
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeBackends {
    pub resolver: Arc<FakeResolver>,
    pub scanner: Arc<FakeScanner>,
    pub query: Arc<FakeQuery>,
}

impl FakeBackends {
    pub fn backends(&self) -> SearchBackends {
        SearchBackends {
            resolver: self.resolver.clone(),
            scanner: self.scanner.clone(),
            query: self.query.clone(),
        }
    }
}

/// Finder that only records calls; tests deliver events by hand.
#[derive(Debug, Default)]
pub struct RecordingFinder {
    next: AtomicU64,
    pub begun: Mutex<Vec<(SearchId, String)>>,
    pub stopped: Mutex<Vec<SearchId>>,
}

impl RecordingFinder {
    pub fn last_id(&self) -> SearchId {
        self.begun.lock().unwrap().last().expect("a search").0
    }

    pub fn stopped(&self) -> Vec<SearchId> {
        self.stopped.lock().unwrap().clone()
    }
}

impl Finder for RecordingFinder {
    fn begin_search(&self, request: &SearchRequest) -> SearchId {
        let id = SearchId(self.next.fetch_add(1, Ordering::SeqCst) + 1);
        self.begun.lock().unwrap().push((id, request.name.clone()));
        id
    }

    fn stop_search(&self, search_id: SearchId) {
        self.stopped.lock().unwrap().push(search_id);
    }
}

pub fn files_found(
    search_id: SearchId,
    entity: &EntityRef,
    files: Vec<VersionedFile>,
) -> FinderEvent {
    FinderEvent::FilesFound {
        search_id,
        files,
        environment: environment(entity),
    }
}

/// Downloader that records requests and never completes on its own.
#[derive(Debug, Default)]
pub struct RecordingDownloader {
    next: AtomicU64,
    pub requests: Mutex<Vec<(ThumbnailRequestId, ThumbnailRequest)>>,
}

impl RecordingDownloader {
    pub fn requests(&self) -> Vec<(ThumbnailRequestId, ThumbnailRequest)> {
        self.requests.lock().unwrap().clone()
    }
}

impl ThumbnailDownloader for RecordingDownloader {
    fn request(&self, request: ThumbnailRequest) -> ThumbnailRequestId {
        let uid =
            ThumbnailRequestId(self.next.fetch_add(1, Ordering::SeqCst) + 1);
        self.requests.lock().unwrap().push((uid, request));
        uid
    }
}

/// Everything currently buffered on a model subscription.
pub fn drain(rx: &mut ModelEventReceiver) -> Vec<ModelEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
