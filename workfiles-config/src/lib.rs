//! Configuration loading for the workfiles engine.
//!
//! Collects the finder, model and startup settings into one
//! [`WorkfilesConfig`], loaded from the environment, a TOML or JSON file, or
//! defaults, and checks it before the engine is wired up. The
//! `workfiles-config-check` binary prints the effective configuration.

#![allow(missing_docs)]

pub mod models;
pub mod validation;

pub use models::{
    CONFIG_JSON_ENV, CONFIG_PATH_ENV, WorkfilesConfig, WorkfilesConfigSource,
};
pub use validation::{
    ConfigValidationError, ConfigWarning, ConfigWarnings, validate_config,
};
