use std::collections::BTreeMap;
use std::fmt;

use crate::entity::EntityRef;
use crate::error::{ModelError, Result};

/// Name of a path template known to the template resolver.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TemplateName(String);

impl TemplateName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TemplateName").field(&self.0).finish()
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single value parsed out of a path by a template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FieldValue {
    Int(i64),
    Str(String),
}

impl FieldValue {
    /// Interpret the value as a file version (`3`, `"3"`, `"v003"`).
    pub fn as_version(&self) -> Option<u32> {
        match self {
            FieldValue::Int(value) => u32::try_from(*value).ok(),
            FieldValue::Str(raw) => {
                let raw = raw.trim();
                let digits = raw
                    .strip_prefix('v')
                    .or_else(|| raw.strip_prefix('V'))
                    .unwrap_or(raw);
                digits.parse().ok()
            }
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(value) => Some(value),
            FieldValue::Int(_) => None,
        }
    }

    fn normalized(&self) -> FieldValue {
        match self {
            FieldValue::Int(value) => FieldValue::Int(*value),
            FieldValue::Str(value) => FieldValue::Str(value.trim().to_string()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(value) => write!(f, "{value}"),
            FieldValue::Str(value) => f.write_str(value),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

/// Field values extracted from a path, keyed by template field name.
pub type TemplateFields = BTreeMap<String, FieldValue>;

/// Logical identity of a file across versions and sources.
///
/// Built from the normalized template fields minus the version (and any other
/// ignored fields) plus the entity the file belongs to, so a local work file
/// and its publish compare equal even though their versions, sources and
/// paths differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileKey {
    entity: Option<EntityRef>,
    fields: BTreeMap<String, FieldValue>,
}

impl FileKey {
    pub fn new<I, K, V>(entity: Option<EntityRef>, fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let mut normalized = BTreeMap::new();
        for (name, value) in fields {
            let name = name.into().trim().to_string();
            if name.is_empty() {
                return Err(ModelError::EmptyFieldName);
            }
            normalized.insert(name, value.into().normalized());
        }
        Ok(Self {
            entity,
            fields: normalized,
        })
    }

    /// Build a key from parsed template fields, keeping only the fields the
    /// `include` predicate accepts.
    pub fn from_fields(
        entity: Option<EntityRef>,
        fields: &TemplateFields,
        mut include: impl FnMut(&str) -> bool,
    ) -> Result<Self> {
        Self::new(
            entity,
            fields
                .iter()
                .filter(|(name, _)| include(name))
                .map(|(name, value)| (name.clone(), value.clone())),
        )
    }

    pub fn entity(&self) -> Option<&EntityRef> {
        self.entity.as_ref()
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(entity) = &self.entity {
            write!(f, "{}#{}:", entity.entity_type, entity.id)?;
        }
        let mut first = true;
        for (name, value) in &self.fields {
            if !first {
                f.write_str(",")?;
            }
            first = false;
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}
