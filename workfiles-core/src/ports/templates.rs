use std::path::{Path, PathBuf};

use async_trait::async_trait;
use workfiles_model::{EntityRef, TemplateFields, TemplateName, WorkContext};

use crate::error::ScanError;

/// Which side of the pipeline a template describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateRole {
    Work,
    Publish,
}

/// The pair of templates a search resolves against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSet {
    pub work: TemplateName,
    pub publish: TemplateName,
}

/// A template resolved for a concrete context: where to look, and the
/// field values the context already pins down.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCandidate {
    pub role: TemplateRole,
    pub template: TemplateName,
    pub path: PathBuf,
    pub fields: TemplateFields,
    pub entity: Option<EntityRef>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TemplateResolver: Send + Sync {
    /// Resolve the templates of `templates` for `context` into concrete
    /// search locations.
    async fn resolve_candidates(
        &self,
        context: &WorkContext,
        templates: &TemplateSet,
    ) -> Result<Vec<ResolvedCandidate>, ScanError>;

    /// Parse a path against a template. `None` when the path does not match.
    fn parse_fields(
        &self,
        template: &TemplateName,
        path: &Path,
    ) -> Option<TemplateFields>;

    /// Field names a template defines. An empty list means "unknown", in
    /// which case every parsed field participates in file identity.
    fn template_keys(&self, template: &TemplateName) -> Vec<String>;
}
