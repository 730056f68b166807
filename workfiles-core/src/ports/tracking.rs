use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;
use workfiles_model::{
    EntityRef, PublishedFileId, TemplateName, UserRef, WorkContext,
};

use crate::error::QueryError;

/// Scope of a published-file query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishFilter {
    pub project: Option<EntityRef>,
    pub entity: Option<EntityRef>,
    pub task: Option<EntityRef>,
    pub template: TemplateName,
}

impl PublishFilter {
    pub fn for_context(context: &WorkContext, template: TemplateName) -> Self {
        Self {
            project: context.project.clone(),
            entity: context.entity.clone(),
            task: context.task.clone(),
            template,
        }
    }
}

/// A published-file record as returned by the tracking service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedFileRecord {
    pub id: PublishedFileId,
    pub path: PathBuf,
    pub name: Option<String>,
    pub version_number: Option<u32>,
    pub image: Option<String>,
    pub entity: Option<EntityRef>,
    pub created_by: Option<UserRef>,
    pub created_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PublishQuery: Send + Sync {
    /// Find published-file records inside `filter`, requesting `fields`.
    async fn find(
        &self,
        filter: &PublishFilter,
        fields: &[String],
    ) -> Result<Vec<PublishedFileRecord>, QueryError>;
}

/// Wraps a query client and logs the start and end of every call.
pub struct LoggingPublishQuery<Q> {
    inner: Q,
}

impl<Q> LoggingPublishQuery<Q> {
    pub fn new(inner: Q) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> Q {
        self.inner
    }
}

impl<Q> fmt::Debug for LoggingPublishQuery<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingPublishQuery").finish_non_exhaustive()
    }
}

#[async_trait]
impl<Q> PublishQuery for LoggingPublishQuery<Q>
where
    Q: PublishQuery,
{
    async fn find(
        &self,
        filter: &PublishFilter,
        fields: &[String],
    ) -> Result<Vec<PublishedFileRecord>, QueryError> {
        debug!(?filter, ?fields, "publish query start");
        let started = Instant::now();
        let result = self.inner.find(filter, fields).await;
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            records = result.as_ref().map(Vec::len).unwrap_or(0),
            ok = result.is_ok(),
            "publish query end"
        );
        result
    }
}
