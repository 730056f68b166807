use std::fmt;

use crate::entity::{ChildBreakdown, WorkContext};
use crate::file_key::TemplateName;

/// Which kinds of file versions a search should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchFilters {
    pub show_work_files: bool,
    pub show_publishes: bool,
    pub show_all_versions: bool,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            show_work_files: true,
            show_publishes: false,
            show_all_versions: false,
        }
    }
}

impl SearchFilters {
    pub fn new(
        show_work_files: bool,
        show_publishes: bool,
        show_all_versions: bool,
    ) -> Self {
        Self {
            show_work_files,
            show_publishes,
            show_all_versions,
        }
    }

    /// Work files and publishes, latest version only.
    pub fn work_and_publishes() -> Self {
        Self::new(true, true, false)
    }

    pub fn with_all_versions(mut self, show_all_versions: bool) -> Self {
        self.show_all_versions = show_all_versions;
        self
    }

    /// A version passes when it is local and work files are shown, or when
    /// it is published and publishes are shown.
    pub fn accepts(&self, is_local: bool, is_published: bool) -> bool {
        (self.show_work_files && is_local)
            || (self.show_publishes && is_published)
    }
}

/// What to search for: one group in the result tree per request.
///
/// Requests are immutable once handed to the finder.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchRequest {
    pub name: String,
    pub context: WorkContext,
    #[cfg_attr(feature = "serde", serde(default))]
    pub child_entities: Vec<ChildBreakdown>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub filters: SearchFilters,
}

impl SearchRequest {
    pub fn new(
        name: impl Into<String>,
        context: WorkContext,
        filters: SearchFilters,
    ) -> Self {
        Self {
            name: name.into(),
            context,
            child_entities: Vec::new(),
            filters,
        }
    }

    pub fn with_child(mut self, child: ChildBreakdown) -> Self {
        self.child_entities.push(child);
        self
    }
}

/// The resolved context a search's results were produced under. Needed to
/// resolve further versions of the same files later on.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchEnvironment {
    pub context: WorkContext,
    pub work_template: TemplateName,
    pub publish_template: TemplateName,
}

/// Lifecycle of a search group. `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchStatus {
    Searching,
    Completed,
    Failed,
}

impl SearchStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SearchStatus::Searching)
    }
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchStatus::Searching => f.write_str("searching"),
            SearchStatus::Completed => f.write_str("completed"),
            SearchStatus::Failed => f.write_str("failed"),
        }
    }
}
