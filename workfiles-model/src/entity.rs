use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Reference to an entity in the tracking service (a Shot, Asset, Task...).
///
/// Identity is `(entity_type, id)`; the display name is carried along for
/// labels only and does not participate in equality, ordering, or hashing.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityRef {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub entity_type: String,
    pub id: i64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
}

impl EntityRef {
    pub fn new(entity_type: impl Into<String>, id: i64) -> Self {
        Self {
            entity_type: entity_type.into(),
            id,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => format!("{} {}", self.entity_type, name),
            None => format!("{} {}", self.entity_type, self.id),
        }
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.entity_type == other.entity_type
    }
}

impl Eq for EntityRef {}

impl Hash for EntityRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entity_type.hash(state);
        self.id.hash(state);
    }
}

impl Ord for EntityRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.entity_type
            .cmp(&other.entity_type)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for EntityRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserRef {
    pub id: i64,
    pub name: String,
}

impl UserRef {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// The pipeline context a search runs in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorkContext {
    pub project: Option<EntityRef>,
    pub entity: Option<EntityRef>,
    pub step: Option<EntityRef>,
    pub task: Option<EntityRef>,
    pub user: Option<UserRef>,
}

impl WorkContext {
    pub fn for_entity(project: EntityRef, entity: EntityRef) -> Self {
        Self {
            project: Some(project),
            entity: Some(entity),
            ..Self::default()
        }
    }

    pub fn with_task(mut self, task: EntityRef) -> Self {
        self.task = Some(task);
        self
    }

    pub fn with_step(mut self, step: EntityRef) -> Self {
        self.step = Some(step);
        self
    }

    pub fn with_user(mut self, user: UserRef) -> Self {
        self.user = Some(user);
        self
    }
}

impl fmt::Display for WorkContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(3);
        if let Some(entity) = &self.entity {
            parts.push(entity.display_name());
        }
        if let Some(step) = &self.step {
            parts.push(step.display_name());
        }
        if let Some(task) = &self.task {
            parts.push(task.display_name());
        }
        if parts.is_empty() {
            if let Some(project) = &self.project {
                return f.write_str(&project.display_name());
            }
            return f.write_str("<empty context>");
        }
        f.write_str(&parts.join(", "))
    }
}

/// A child entity shown as an eager placeholder folder under a search group.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChildBreakdown {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub entity: Option<EntityRef>,
}

impl ChildBreakdown {
    pub fn new(name: impl Into<String>, entity: Option<EntityRef>) -> Self {
        Self {
            name: name.into(),
            entity,
        }
    }
}
