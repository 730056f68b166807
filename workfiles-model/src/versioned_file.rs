use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::entity::{EntityRef, UserRef};
use crate::file_key::FileKey;
use crate::ids::PublishedFileId;

const PUBLISH_READ_ONLY_REASON: &str =
    "Published files are read-only; open a copy to continue working";

/// A resolved thumbnail image, shared by reference between every version
/// that displays it.
#[derive(Clone)]
pub struct Thumbnail(Arc<PathBuf>);

impl Thumbnail {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(Arc::new(path.into()))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// True when both handles point at the same shared image.
    pub fn ptr_eq(&self, other: &Thumbnail) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Thumbnail").field(&self.0).finish()
    }
}

/// Who touched a file and when.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Activity {
    pub by: Option<UserRef>,
    pub at: Option<DateTime<Utc>>,
}

impl Activity {
    pub fn new(by: Option<UserRef>, at: Option<DateTime<Utc>>) -> Self {
        Self { by, at }
    }

    fn describe(&self, verb: &str) -> String {
        let who = self
            .by
            .as_ref()
            .map(|user| user.name.as_str())
            .unwrap_or("Unknown");
        match self.at {
            Some(at) => {
                format!("{verb} by {who} on {}", at.format("%Y-%m-%d %H:%M"))
            }
            None => format!("{verb} by {who}"),
        }
    }
}

/// Data a local filesystem scan contributes to a file version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalInfo {
    pub path: PathBuf,
    pub modified: Activity,
}

/// Data a tracking-service publish record contributes to a file version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishInfo {
    pub id: PublishedFileId,
    pub path: PathBuf,
    pub thumbnail_path: Option<String>,
    pub published: Activity,
    pub description: Option<String>,
}

/// One version of a logical file, present locally, as a publish, or both.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VersionedFile {
    pub key: FileKey,
    pub name: String,
    pub version: u32,
    pub is_local: bool,
    pub is_published: bool,
    pub editable: bool,
    pub not_editable_reason: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub thumbnail: Option<Thumbnail>,
    pub thumbnail_path: Option<String>,
    pub published_file_id: Option<PublishedFileId>,
    pub path: Option<PathBuf>,
    pub publish_path: Option<PathBuf>,
    pub modified: Activity,
    pub published: Activity,
    pub publish_description: Option<String>,
}

impl VersionedFile {
    pub fn from_local(
        key: FileKey,
        name: impl Into<String>,
        version: u32,
        local: LocalInfo,
    ) -> Self {
        let mut file = Self::blank(key, name.into(), version);
        file.attach_local(local);
        file
    }

    pub fn from_publish(
        key: FileKey,
        name: impl Into<String>,
        version: u32,
        publish: PublishInfo,
    ) -> Self {
        let mut file = Self::blank(key, name.into(), version);
        file.attach_publish(publish);
        file
    }

    fn blank(key: FileKey, name: String, version: u32) -> Self {
        Self {
            key,
            name,
            version,
            is_local: false,
            is_published: false,
            editable: false,
            not_editable_reason: None,
            thumbnail: None,
            thumbnail_path: None,
            published_file_id: None,
            path: None,
            publish_path: None,
            modified: Activity::default(),
            published: Activity::default(),
            publish_description: None,
        }
    }

    /// Mark this version as present on disk. Local copies are editable.
    pub fn attach_local(&mut self, local: LocalInfo) {
        self.is_local = true;
        self.path = Some(local.path);
        self.modified = local.modified;
        self.editable = true;
        self.not_editable_reason = None;
    }

    /// Mark this version as published, keeping any local data already known.
    pub fn attach_publish(&mut self, publish: PublishInfo) {
        self.is_published = true;
        self.published_file_id = Some(publish.id);
        self.publish_path = Some(publish.path);
        self.thumbnail_path = publish.thumbnail_path;
        self.published = publish.published;
        self.publish_description = publish.description;
        if !self.is_local {
            self.editable = false;
            self.not_editable_reason =
                Some(PUBLISH_READ_ONLY_REASON.to_string());
        }
    }

    pub fn entity(&self) -> Option<&EntityRef> {
        self.key.entity()
    }

    /// Display label used by list views, e.g. `comp, v3`.
    pub fn label(&self) -> String {
        format!("{}, v{}", self.name, self.version)
    }

    pub fn format_modified_by_details(&self) -> String {
        self.modified.describe("Modified")
    }

    pub fn format_published_by_details(&self) -> String {
        let line = self.published.describe("Published");
        match self.publish_description.as_deref() {
            Some(desc) if !desc.trim().is_empty() => {
                format!("{line}\n{}", desc.trim())
            }
            _ => line,
        }
    }

    /// Secondary label line: publish details win over local details.
    pub fn details(&self) -> Option<String> {
        if self.is_published {
            Some(self.format_published_by_details())
        } else if self.is_local {
            Some(self.format_modified_by_details())
        } else {
            None
        }
    }
}
