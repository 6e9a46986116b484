//! switchapid configuration file.
//!
//! Loaded from TOML; default location `/etc/switchapi/switchapi.toml`.
//! A missing file means defaults.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use switchapi_types::{ApiPortInfo, HandleType, ParseError, SwitchDevice, SwitchHandle};

use crate::port::{
    PortManagerConfig, DEFAULT_CPU_PORT, DEFAULT_MAX_PORTS, DEFAULT_NULL_PORT,
    STORM_CONTROL_DEFAULT_RATE,
};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/switchapi/switchapi.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("port {port}: {source}")]
    PortField {
        port: u32,
        #[source]
        source: ParseError,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Which hardware adapter the daemon drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HardwareMode {
    /// No hardware; table calls are skipped.
    None,
    /// In-memory ASIC model.
    #[default]
    Simulated,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    #[serde(default)]
    pub device_id: SwitchDevice,
}

/// Port table layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortsConfig {
    #[serde(default = "default_max_ports")]
    pub max_ports: u32,

    #[serde(default = "default_cpu_port")]
    pub cpu_port: u32,

    /// Reserved handle index of the null port
    #[serde(default = "default_null_port")]
    pub null_port: u32,

    /// Policing rate programmed with storm-control entries
    #[serde(default = "default_storm_control_rate")]
    pub storm_control_rate: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareConfig {
    #[serde(default)]
    pub mode: HardwareMode,
}

/// Initial configuration for one port, as field/value strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortEntryConfig {
    pub port: u32,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

/// Complete switchapid configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchApiConfig {
    #[serde(default)]
    pub device: DeviceConfig,

    #[serde(default)]
    pub ports: PortsConfig,

    #[serde(default)]
    pub hardware: HardwareConfig,

    #[serde(default, rename = "port")]
    pub port_entries: Vec<PortEntryConfig>,
}

fn default_max_ports() -> u32 {
    DEFAULT_MAX_PORTS
}

fn default_cpu_port() -> u32 {
    DEFAULT_CPU_PORT
}

fn default_null_port() -> u32 {
    DEFAULT_NULL_PORT
}

fn default_storm_control_rate() -> u32 {
    STORM_CONTROL_DEFAULT_RATE
}

impl Default for PortsConfig {
    fn default() -> Self {
        Self {
            max_ports: default_max_ports(),
            cpu_port: default_cpu_port(),
            null_port: default_null_port(),
            storm_control_rate: default_storm_control_rate(),
        }
    }
}

impl SwitchApiConfig {
    /// Loads configuration from `path`, falling back to defaults if the
    /// file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content).map_err(|e| match e {
                ConfigError::Parse { message, .. } => ConfigError::Parse {
                    path: path.to_path_buf(),
                    message,
                },
                other => other,
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_or_default(DEFAULT_CONFIG_PATH)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<string>"),
            message: e.to_string(),
        })
    }

    pub fn port_manager_config(&self) -> PortManagerConfig {
        PortManagerConfig {
            max_ports: self.ports.max_ports,
            cpu_port: self.ports.cpu_port,
            null_port: self.ports.null_port,
            storm_control_rate: self.ports.storm_control_rate,
        }
    }

    /// Builds the initial port configurations from the `[[port]]` tables.
    pub fn api_port_infos(&self) -> Result<Vec<ApiPortInfo>> {
        self.port_entries
            .iter()
            .map(|entry| {
                let mut info = ApiPortInfo::new(SwitchHandle::new(HandleType::Port, entry.port));
                info.parse_fields(entry.fields.iter().map(|(f, v)| (f.as_str(), v.as_str())))
                    .map_err(|source| ConfigError::PortField {
                        port: entry.port,
                        source,
                    })?;
                Ok(info)
            })
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        self.port_manager_config()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        for entry in &self.port_entries {
            if entry.port >= self.ports.max_ports {
                return Err(ConfigError::Invalid(format!(
                    "[[port]] {} out of range (max_ports {})",
                    entry.port, self.ports.max_ports
                )));
            }
        }

        self.api_port_infos().map(|_| ())
    }
}
