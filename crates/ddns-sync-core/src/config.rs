//! Configuration types for the DDNS synchronizer
//!
//! The configuration is read once at startup from a JSON file and stays
//! immutable for the process lifetime. Validation failures are fatal:
//! the poll loop must never start with an unusable configuration.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

/// Main synchronizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Global IP source, used by profiles that don't define their own
    #[serde(default)]
    pub ip_source: Option<IpSourceConfig>,

    /// Seconds to sleep between polling cycles
    #[serde(default = "default_update_interval")]
    pub update_interval: u64,

    /// Verify TLS certificates on outbound HTTPS calls.
    /// Disabling this is an explicit operational opt-in for broken
    /// middleboxes or self-signed endpoints.
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,

    /// Localizable log message templates, keyed by event name
    #[serde(default)]
    pub messages: HashMap<String, String>,

    /// Profiles to synchronize, processed in this order every cycle
    pub profiles: Vec<ProfileConfig>,
}

impl SyncConfig {
    /// Load a configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            crate::Error::config(format!("cannot parse {}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.profiles.is_empty() {
            return Err(crate::Error::config("no profiles configured"));
        }

        if self.update_interval == 0 {
            return Err(crate::Error::config("update_interval must be > 0"));
        }

        if let Some(ref source) = self.ip_source {
            source.validate()?;
        }

        let mut seen = HashSet::new();
        for profile in &self.profiles {
            if profile.name.is_empty() {
                return Err(crate::Error::config("profile name cannot be empty"));
            }
            if !seen.insert(profile.name.as_str()) {
                return Err(crate::Error::config(format!(
                    "duplicate profile name: {}",
                    profile.name
                )));
            }
            profile.validate(self.ip_source.as_ref())?;
        }

        Ok(())
    }

    /// Sleep duration between polling cycles
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.update_interval)
    }
}

/// IP source descriptor
///
/// A closed set of source kinds; an unrecognized `type` tag fails at
/// deserialization, which makes it a startup configuration error rather
/// than a runtime surprise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpSourceConfig {
    /// HTTP GET against a what-is-my-ip style endpoint
    Url {
        /// URL returning the public IP as the response body
        url: String,
    },

    /// Shell command whose stdout is the IP
    Command {
        /// Command line, executed via `sh -c`
        command: String,
    },

    /// DNS A-record lookup of a hostname
    Resolve {
        /// Hostname to resolve
        hostname: String,
    },
}

impl IpSourceConfig {
    /// Validate the IP source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            IpSourceConfig::Url { url } => {
                if url.is_empty() {
                    return Err(crate::Error::config("ip_source url cannot be empty"));
                }
            }
            IpSourceConfig::Command { command } => {
                if command.trim().is_empty() {
                    return Err(crate::Error::config("ip_source command cannot be empty"));
                }
            }
            IpSourceConfig::Resolve { hostname } => {
                if hostname.is_empty() {
                    return Err(crate::Error::config("ip_source hostname cannot be empty"));
                }
            }
        }
        Ok(())
    }
}

/// One independently synchronized profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Unique profile name, used as the state key and in every log line
    pub name: String,

    /// Profile-level IP source; falls back to the global one when absent
    #[serde(default)]
    pub ip_source: Option<IpSourceConfig>,

    /// Whether provider updates are performed at all.
    /// With the API disabled the IP is still tracked, just never pushed.
    #[serde(default = "default_api_enabled")]
    pub api_enabled: bool,

    /// Provider credentials; optional so a profile can run in
    /// observe-only mode
    #[serde(default)]
    pub cloudflare: Option<CloudflareConfig>,

    /// Domain names this profile manages. Zone records outside this set
    /// are never read for mismatch and never written.
    #[serde(default)]
    pub domains: Vec<String>,
}

impl ProfileConfig {
    /// The IP source this profile actually uses
    pub fn effective_source<'a>(
        &'a self,
        global: Option<&'a IpSourceConfig>,
    ) -> Option<&'a IpSourceConfig> {
        self.ip_source.as_ref().or(global)
    }

    /// Whether usable provider credentials are present
    pub fn has_credentials(&self) -> bool {
        self.cloudflare
            .as_ref()
            .is_some_and(|cf| !cf.api_token.is_empty())
    }

    fn validate(&self, global_source: Option<&IpSourceConfig>) -> Result<(), crate::Error> {
        let source = self.effective_source(global_source).ok_or_else(|| {
            crate::Error::config(format!(
                "profile {} has no ip_source and no global ip_source is set",
                self.name
            ))
        })?;
        source.validate()?;

        if let Some(ref cf) = self.cloudflare {
            if cf.api_token.is_empty() {
                return Err(crate::Error::config(format!(
                    "profile {} has an empty cloudflare api_token",
                    self.name
                )));
            }
            if cf.zone_id.is_empty() {
                return Err(crate::Error::config(format!(
                    "profile {} has an empty cloudflare zone_id",
                    self.name
                )));
            }
            if self.api_enabled && self.domains.is_empty() {
                return Err(crate::Error::config(format!(
                    "profile {} has credentials and api_enabled but no domains",
                    self.name
                )));
            }
        }

        Ok(())
    }
}

/// Cloudflare credentials for one profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudflareConfig {
    /// API token with Zone:DNS:Edit permission
    pub api_token: String,

    /// Zone the profile's records live in
    pub zone_id: String,
}

fn default_update_interval() -> u64 {
    300
}

fn default_verify_tls() -> bool {
    true
}

fn default_api_enabled() -> bool {
    true
}
