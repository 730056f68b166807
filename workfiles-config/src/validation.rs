use thiserror::Error;

use super::models::WorkfilesConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("{field} cannot be empty")]
    EmptyField { field: &'static str },
    #[error("{field} `{value}` cannot also be listed in finder.key_ignore_fields")]
    IgnoredIdentityField { field: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Reject configurations the engine cannot run with and collect warnings
/// for ones that run but probably do not do what was meant.
pub fn validate_config(
    config: &WorkfilesConfig,
) -> Result<ConfigWarnings, ConfigValidationError> {
    let finder = &config.finder;
    for (field, value) in [
        ("finder.work_template", &finder.work_template),
        ("finder.publish_template", &finder.publish_template),
        ("finder.version_field", &finder.version_field),
        ("finder.name_field", &finder.name_field),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigValidationError::EmptyField { field });
        }
    }
    if finder.key_ignore_fields.contains(&finder.name_field) {
        return Err(ConfigValidationError::IgnoredIdentityField {
            field: "finder.name_field",
            value: finder.name_field.clone(),
        });
    }

    let mut warnings = ConfigWarnings::default();
    if finder.key_ignore_fields.contains(&finder.version_field) {
        warnings.push(format!(
            "finder.key_ignore_fields lists the version field `{}`, which is never part of file identity",
            finder.version_field
        ));
    }
    if config.model.request_thumbnails
        && !finder.publish_fields.iter().any(|field| field == "image")
    {
        warnings.push_with_hint(
            "thumbnails are enabled but `image` is not requested for publishes",
            "add \"image\" to finder.publish_fields or set model.request_thumbnails = false",
        );
    }
    if config.startup.launch_at_startup
        && config.startup.supported_hosts.is_empty()
    {
        warnings.push_with_hint(
            "launch_at_startup is enabled but no host is supported",
            "list host names in startup.supported_hosts",
        );
    }

    Ok(warnings)
}
