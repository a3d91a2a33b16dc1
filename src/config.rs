//! Runtime configuration.
//!
//! Configuration comes from one of two providers, selected once at startup:
//! a compiled-in static default, or a TOML file on disk (`/etc/uamask.toml`
//! unless overridden on the command line). A missing file selects the static
//! provider; a file that exists but cannot be read or validated is a fatal
//! startup error.

use crate::error::{Result, UamaskError};
use log::info;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default path probed when no `--config` argument is given.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/uamask.toml";

/// Queue number the firewall rule is expected to target.
pub const DEFAULT_QUEUE_NUM: u16 = 10010;

/// Compiled-in substitute written when no custom User-Agent is configured.
pub const DEFAULT_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/119.0";

/// Upper bound on a configured replacement, in bytes.
pub const MAX_AGENT_LEN: usize = 256;

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Compiled-in defaults; no file was present.
    BuiltIn,
    /// Loaded from a TOML file.
    File(PathBuf),
}

/// On-disk configuration shape. Unknown keys are tolerated.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    /// Replacement User-Agent text. Absent means "use the built-in default".
    user_agent: Option<String>,
    /// Kernel queue number to bind.
    queue: Option<u16>,
}

/// Effective runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    queue_num: u16,
    replacement: String,
    custom: bool,
    source: ConfigSource,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            queue_num: DEFAULT_QUEUE_NUM,
            replacement: DEFAULT_AGENT.to_string(),
            custom: false,
            source: ConfigSource::BuiltIn,
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or from `DEFAULT_CONFIG_PATH` when
    /// no explicit path is given. An explicit path must exist; the default
    /// path is probed and silently skipped when absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(explicit) => explicit.to_path_buf(),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if !default.exists() {
                    info!("no configuration file, using built-in defaults");
                    return Ok(Self::default());
                }
                default.to_path_buf()
            }
        };

        let raw = std::fs::read_to_string(&path)
            .map_err(|e| UamaskError::config(format!("cannot read {}: {e}", path.display())))?;
        let file: FileConfig = toml::from_str(&raw)
            .map_err(|e| UamaskError::config(format!("cannot parse {}: {e}", path.display())))?;

        Self::from_file(file, path)
    }

    fn from_file(file: FileConfig, path: PathBuf) -> Result<Self> {
        let mut config = Self {
            source: ConfigSource::File(path),
            ..Self::default()
        };

        if let Some(queue) = file.queue {
            config.queue_num = queue;
        }

        if let Some(agent) = file.user_agent {
            validate_agent(&agent)?;
            config.replacement = agent;
            config.custom = true;
        }

        Ok(config)
    }

    /// The queue number the daemon binds.
    pub fn queue_num(&self) -> u16 {
        self.queue_num
    }

    /// The replacement User-Agent as raw bytes.
    pub fn replacement(&self) -> &[u8] {
        self.replacement.as_bytes()
    }

    /// Whether a custom User-Agent was configured (as opposed to the
    /// compiled-in default).
    pub fn has_custom_agent(&self) -> bool {
        self.custom
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }
}

/// A replacement must be non-empty, bounded, and must not be able to break
/// out of its header line.
fn validate_agent(agent: &str) -> Result<()> {
    if agent.is_empty() {
        return Err(UamaskError::config("user_agent must not be empty"));
    }
    if agent.len() > MAX_AGENT_LEN {
        return Err(UamaskError::config(format!(
            "user_agent exceeds {MAX_AGENT_LEN} bytes"
        )));
    }
    if agent.contains('\r') || agent.contains('\n') {
        return Err(UamaskError::config("user_agent must not contain CR or LF"));
    }
    Ok(())
}
