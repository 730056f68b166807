use serde::{Deserialize, Serialize};
use workfiles_model::TemplateName;

use crate::error::{Result, WorkfilesError};
use crate::ports::TemplateSet;

fn default_publish_fields() -> Vec<String> {
    [
        "id",
        "path",
        "name",
        "version_number",
        "image",
        "entity",
        "task",
        "created_by",
        "created_at",
        "description",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// How the finder resolves, identifies and queries files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FinderConfig {
    /// Template local work files are matched against. Its fields define
    /// file identity.
    pub work_template: String,
    /// Template publish paths are parsed with.
    pub publish_template: String,
    /// Field holding the version number; never part of file identity.
    pub version_field: String,
    /// Field holding the display name. Falls back to the file stem.
    pub name_field: String,
    /// Additional fields that vary between versions of one logical file
    /// (e.g. an artist initials field) and must not split identity.
    pub key_ignore_fields: Vec<String>,
    /// Fields requested from the tracking service for publish records.
    #[serde(default = "default_publish_fields")]
    pub publish_fields: Vec<String>,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            work_template: "work_file".to_string(),
            publish_template: "publish_file".to_string(),
            version_field: "version".to_string(),
            name_field: "name".to_string(),
            key_ignore_fields: Vec::new(),
            publish_fields: default_publish_fields(),
        }
    }
}

impl FinderConfig {
    pub fn template_set(&self) -> TemplateSet {
        TemplateSet {
            work: TemplateName::new(self.work_template.clone()),
            publish: TemplateName::new(self.publish_template.clone()),
        }
    }

    /// True when `field` participates in file identity.
    pub fn is_key_field(&self, field: &str) -> bool {
        field != self.version_field
            && !self.key_ignore_fields.iter().any(|f| f == field)
    }

    pub fn validate(&self) -> Result<()> {
        if self.work_template.trim().is_empty() {
            return Err(WorkfilesError::Config(
                "work_template cannot be empty".into(),
            ));
        }
        if self.publish_template.trim().is_empty() {
            return Err(WorkfilesError::Config(
                "publish_template cannot be empty".into(),
            ));
        }
        if self.version_field.trim().is_empty() {
            return Err(WorkfilesError::Config(
                "version_field cannot be empty".into(),
            ));
        }
        if self.name_field.trim().is_empty() {
            return Err(WorkfilesError::Config(
                "name_field cannot be empty".into(),
            ));
        }
        if self.key_ignore_fields.iter().any(|f| f == &self.name_field) {
            return Err(WorkfilesError::Config(format!(
                "name field `{}` cannot be ignored for file identity",
                self.name_field
            )));
        }
        Ok(())
    }
}
