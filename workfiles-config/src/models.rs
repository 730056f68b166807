use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::debug;
use workfiles_core::{FinderConfig, ModelConfig, StartupSettings};

/// Environment variable naming a TOML or JSON config file.
pub const CONFIG_PATH_ENV: &str = "WORKFILES_CONFIG_PATH";
/// Environment variable holding the whole config as inline JSON.
pub const CONFIG_JSON_ENV: &str = "WORKFILES_CONFIG_JSON";

/// Source that produced the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkfilesConfigSource {
    #[default]
    Default,
    EnvPath(PathBuf),
    EnvInline,
    File(PathBuf),
}

/// Everything the host needs to wire up the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkfilesConfig {
    /// Template names and identity fields used by every search.
    pub finder: FinderConfig,
    /// Event buffering and thumbnail fetching for the result model.
    pub model: ModelConfig,
    /// Whether and when the file dialog opens as the host starts.
    pub startup: StartupSettings,
}

impl WorkfilesConfig {
    /// Load configuration using environment variables.
    /// Evaluation order:
    /// 1) `$WORKFILES_CONFIG_PATH` (TOML or JSON file),
    /// 2) `$WORKFILES_CONFIG_JSON` (inline JSON),
    /// 3) `workfiles.toml` / `workfiles.json` in the working directory,
    /// 4) defaults.
    pub fn load_from_env() -> anyhow::Result<(Self, WorkfilesConfigSource)> {
        if let Ok(path_str) = env::var(CONFIG_PATH_ENV)
            && !path_str.trim().is_empty()
        {
            let path = PathBuf::from(path_str);
            let config = Self::load_from_file(&path)?;
            return Ok((config, WorkfilesConfigSource::EnvPath(path)));
        }

        if let Ok(raw) = env::var(CONFIG_JSON_ENV)
            && !raw.trim().is_empty()
        {
            let parsed = Self::parse_json(&raw)
                .with_context(|| format!("failed to parse {CONFIG_JSON_ENV}"))?;
            return Ok((parsed, WorkfilesConfigSource::EnvInline));
        }

        if let Some(path) = Self::find_default_file(Path::new(".")) {
            let config = Self::load_from_file(&path)?;
            return Ok((config, WorkfilesConfigSource::File(path)));
        }

        debug!("no workfiles config found; using defaults");
        Ok((Self::default(), WorkfilesConfigSource::Default))
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| {
            format!("failed to read workfiles config from {}", path.display())
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::parse_json(&contents).with_context(|| {
                format!("invalid workfiles config {}", path.display())
            }),
            Some("toml") => toml::from_str(&contents).map_err(|err| {
                anyhow!("invalid workfiles config {}: {}", path.display(), err)
            }),
            _ => Self::parse_from_str(&contents, &path.display().to_string()),
        }
    }

    /// Parse a config of unknown format, trying TOML then JSON.
    pub fn parse_from_str(contents: &str, origin: &str) -> anyhow::Result<Self> {
        toml::from_str(contents).or_else(|toml_err| {
            serde_json::from_str(contents).map_err(|json_err| {
                anyhow!(
                    "failed to parse workfiles config {}: toml error: {}; json error: {}",
                    origin,
                    toml_err,
                    json_err
                )
            })
        })
    }

    pub fn parse_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw)
            .map_err(|err| anyhow!("invalid workfiles config json: {err}"))
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string(self).context("failed to render workfiles config")
    }

    pub(crate) fn find_default_file(dir: &Path) -> Option<PathBuf> {
        const CANDIDATES: &[&str] = &[
            "workfiles.toml",
            "workfiles.json",
            "config/workfiles.toml",
            "config/workfiles.json",
        ];

        CANDIDATES
            .iter()
            .map(|candidate| dir.join(candidate))
            .find(|path| path.exists())
    }
}
