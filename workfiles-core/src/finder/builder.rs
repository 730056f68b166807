use std::collections::HashSet;
use std::path::Path;

use tracing::debug;
use workfiles_model::{
    Activity, EntityRef, FileKey, LocalInfo, PublishInfo, TemplateFields,
    TemplateName,
};

use super::config::FinderConfig;
use super::merge::VersionMerge;
use crate::ports::{LocalFileRecord, PublishedFileRecord, TemplateResolver};

/// Turns raw scan records into merge inserts, deriving name, version and
/// [`FileKey`] the same way for both sources.
pub(crate) struct VersionBuilder<'a> {
    config: &'a FinderConfig,
    key_fields: HashSet<String>,
    fallback_entity: Option<EntityRef>,
}

impl<'a> VersionBuilder<'a> {
    pub(crate) fn new(
        config: &'a FinderConfig,
        key_fields: Vec<String>,
        fallback_entity: Option<EntityRef>,
    ) -> Self {
        Self {
            config,
            key_fields: key_fields.into_iter().collect(),
            fallback_entity,
        }
    }

    fn includes(&self, field: &str) -> bool {
        self.config.is_key_field(field)
            && (self.key_fields.is_empty() || self.key_fields.contains(field))
    }

    fn key_for(
        &self,
        fields: &TemplateFields,
        entity: Option<EntityRef>,
    ) -> Option<FileKey> {
        let entity = entity.or_else(|| self.fallback_entity.clone());
        FileKey::from_fields(entity, fields, |name| self.includes(name)).ok()
    }

    fn version_from(&self, fields: &TemplateFields) -> Option<u32> {
        fields
            .get(&self.config.version_field)
            .and_then(|value| value.as_version())
    }

    fn name_for(
        &self,
        fields: &TemplateFields,
        fallback: Option<&str>,
        path: &Path,
    ) -> String {
        fields
            .get(&self.config.name_field)
            .and_then(|value| value.as_str())
            .map(str::to_string)
            .or_else(|| fallback.map(str::to_string))
            .or_else(|| {
                path.file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
            })
            .unwrap_or_default()
    }

    /// Returns false when the record cannot be identified and was skipped.
    pub(crate) fn add_local(
        &self,
        merge: &mut VersionMerge,
        record: LocalFileRecord,
    ) -> bool {
        let Some(version) = self.version_from(&record.fields) else {
            debug!(path = %record.path.display(), "work file has no version; skipping");
            return false;
        };
        let Some(key) = self.key_for(&record.fields, record.entity) else {
            debug!(path = %record.path.display(), "work file fields cannot form a key; skipping");
            return false;
        };
        let name = self.name_for(&record.fields, None, &record.path);
        merge.insert_local(
            key,
            name,
            version,
            LocalInfo {
                path: record.path,
                modified: record.modified,
            },
        );
        true
    }

    /// Returns false when the publish does not parse against `template`.
    pub(crate) fn add_publish(
        &self,
        merge: &mut VersionMerge,
        resolver: &dyn TemplateResolver,
        template: &TemplateName,
        record: PublishedFileRecord,
    ) -> bool {
        let Some(fields) = resolver.parse_fields(template, &record.path) else {
            debug!(
                publish_id = %record.id,
                path = %record.path.display(),
                %template,
                "publish does not match template; skipping"
            );
            return false;
        };
        let Some(version) =
            record.version_number.or_else(|| self.version_from(&fields))
        else {
            debug!(publish_id = %record.id, "publish has no version; skipping");
            return false;
        };
        let Some(key) = self.key_for(&fields, record.entity) else {
            debug!(publish_id = %record.id, "publish fields cannot form a key; skipping");
            return false;
        };
        let name = self.name_for(&fields, record.name.as_deref(), &record.path);
        merge.insert_publish(
            key,
            name,
            version,
            PublishInfo {
                id: record.id,
                path: record.path,
                thumbnail_path: record.image,
                published: Activity::new(record.created_by, record.created_at),
                description: record.description,
            },
        );
        true
    }
}
