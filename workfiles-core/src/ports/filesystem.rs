use std::path::PathBuf;

use async_trait::async_trait;
use workfiles_model::{Activity, EntityRef, TemplateFields, TemplateName};

use super::templates::ResolvedCandidate;
use crate::error::ScanError;

/// One file found on disk that matched a work template.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalFileRecord {
    pub path: PathBuf,
    pub template: TemplateName,
    pub fields: TemplateFields,
    pub entity: Option<EntityRef>,
    pub modified: Activity,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FilesystemScanner: Send + Sync {
    /// Enumerate the files matching the resolved work-template candidates.
    /// Fails with [`ScanError::Io`] when a location cannot be read.
    async fn scan(
        &self,
        candidates: &[ResolvedCandidate],
    ) -> Result<Vec<LocalFileRecord>, ScanError>;
}
