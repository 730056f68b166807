//! Whether to open the file dialog when a host application starts.
//!
//! The "already launched" flag is explicit state owned by the caller rather
//! than a marker stashed on a shared platform object, so a process that
//! bootstraps the engine more than once still shows the dialog at most once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

fn default_supported_hosts() -> Vec<String> {
    ["nuke", "maya", "3dsmax"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartupSettings {
    pub launch_at_startup: bool,
    /// Hosts known to cope with a dialog opened during their own startup.
    #[serde(default = "default_supported_hosts")]
    pub supported_hosts: Vec<String>,
    /// Delay before showing, letting the host finish initialising.
    pub startup_delay_ms: u64,
}

impl Default for StartupSettings {
    fn default() -> Self {
        Self {
            launch_at_startup: false,
            supported_hosts: default_supported_hosts(),
            startup_delay_ms: 200,
        }
    }
}

impl StartupSettings {
    pub fn supports(&self, host: &str) -> bool {
        self.supported_hosts
            .iter()
            .any(|supported| supported.eq_ignore_ascii_case(host))
    }
}

/// The running host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostInfo<'a> {
    pub name: &'a str,
    pub has_ui: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupDecision {
    /// Open the dialog after `delay`.
    Show { delay: Duration },
    /// Startup launch requested, but the host is not supported.
    UnsupportedHost(String),
    /// Startup launch is switched off.
    Disabled,
    /// The host has no UI to show a dialog in.
    Headless,
    /// A decision was already made earlier in this process.
    AlreadyLaunched,
}

/// Per-process startup state.
#[derive(Debug, Default)]
pub struct StartupState {
    launched: AtomicBool,
}

impl StartupState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_launched(&self) -> bool {
        self.launched.load(Ordering::Acquire)
    }

    /// Decide what to do for this host. Only the first call for a UI host
    /// can return [`StartupDecision::Show`]; the flag is consumed even when
    /// startup launch is disabled.
    pub fn decide(
        &self,
        settings: &StartupSettings,
        host: HostInfo<'_>,
    ) -> StartupDecision {
        if !host.has_ui {
            return StartupDecision::Headless;
        }
        if self
            .launched
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return StartupDecision::AlreadyLaunched;
        }
        if !settings.launch_at_startup {
            return StartupDecision::Disabled;
        }
        if !settings.supports(host.name) {
            warn!(
                host = host.name,
                supported = %settings.supported_hosts.join(", "),
                "launch at startup is not supported for this host"
            );
            return StartupDecision::UnsupportedHost(host.name.to_string());
        }

        debug!(host = host.name, delay_ms = settings.startup_delay_ms, "showing file dialog at startup");
        StartupDecision::Show {
            delay: Duration::from_millis(settings.startup_delay_ms),
        }
    }
}
