//! Deployer configuration
//!
//! This module holds the two configuration surfaces of the translation layer:
//!
//! - [`DeployerProperties`]: global defaults supplied by the platform operator
//!   (default environment variables, volume mounts, probe timing, resource
//!   quantities, entry point style, sidecars)
//! - [`DeploymentOverrides`]: the per-request deploy-time overrides, parsed
//!   once from the dotted `stevedore.kubernetes.*` property namespace into a
//!   strongly-typed struct so the rest of the core never does string-key
//!   lookups
//!
//! The dotted property keys are an external wire format; everything after
//! [`DeploymentOverrides::parse`] works with typed values.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cmdline;
use crate::container::{EnvVar, VolumeMount};
use crate::request::ArtifactReference;
use crate::{Error, Result};

// =============================================================================
// Deployment Property Keys
// =============================================================================
// The dotted-key namespace recognized in a request's deployment properties.
// These keys are the de facto API of this layer.

/// Prefix shared by all recognized deployment property keys
pub const PROPERTY_PREFIX: &str = "stevedore.kubernetes";

/// Overrides the entry point style (`exec` | `boot` | `shell`)
pub const ENTRY_POINT_STYLE_PROPERTY: &str = "stevedore.kubernetes.entryPointStyle";

/// App-level environment variable overrides, as a `KEY=VALUE` comma list
pub const ENVIRONMENT_VARIABLES_PROPERTY: &str = "stevedore.kubernetes.environmentVariables";

/// Request-level volume mounts, as a `name:path[:readOnly]` comma list
pub const VOLUME_MOUNTS_PROPERTY: &str = "stevedore.kubernetes.volumeMounts";

/// Full command string, shell-tokenized, replacing the image entrypoint
pub const CONTAINER_COMMAND_PROPERTY: &str = "stevedore.kubernetes.containerCommand";

/// Additional container ports, as a comma list of integers
pub const CONTAINER_PORTS_PROPERTY: &str = "stevedore.kubernetes.containerPorts";

/// Memory limit override quantity
pub const MEMORY_PROPERTY: &str = "stevedore.kubernetes.memory";

/// CPU limit override quantity
pub const CPU_PROPERTY: &str = "stevedore.kubernetes.cpu";

// =============================================================================
// Entry Point Style
// =============================================================================

/// Convention for how application properties reach the running process
///
/// Exactly one style is active per request: the deploy-time override when
/// present and recognized, else the deployer default.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryPointStyle {
    /// Properties become `--key=value` container arguments
    #[default]
    Exec,
    /// Properties become a single JSON document in a reserved environment
    /// variable, for images whose framework consumes a JSON config blob
    Boot,
    /// Each property becomes its own environment variable
    Shell,
}

impl std::str::FromStr for EntryPointStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "exec" => Ok(Self::Exec),
            "boot" => Ok(Self::Boot),
            "shell" => Ok(Self::Shell),
            _ => Err(Error::configuration_parse(format!(
                "invalid entry point style: {s}, expected one of: exec, boot, shell"
            ))),
        }
    }
}

impl std::fmt::Display for EntryPointStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exec => write!(f, "exec"),
            Self::Boot => write!(f, "boot"),
            Self::Shell => write!(f, "shell"),
        }
    }
}

// =============================================================================
// Probe Settings
// =============================================================================

/// HTTP probe configuration for one probe kind
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProbeSettings {
    /// Endpoint path probed on the container's primary port
    pub path: String,
    /// Probe timeout in seconds
    pub timeout_seconds: u32,
    /// Delay before the first probe in seconds
    pub initial_delay_seconds: u32,
    /// Interval between probes in seconds
    pub period_seconds: u32,
}

fn default_liveness_probe() -> ProbeSettings {
    ProbeSettings {
        path: "/health".to_string(),
        timeout_seconds: 2,
        initial_delay_seconds: 10,
        period_seconds: 60,
    }
}

fn default_readiness_probe() -> ProbeSettings {
    ProbeSettings {
        path: "/ready".to_string(),
        timeout_seconds: 2,
        initial_delay_seconds: 10,
        period_seconds: 10,
    }
}

fn default_memory() -> String {
    "512Mi".to_string()
}

fn default_cpu() -> String {
    "500m".to_string()
}

// =============================================================================
// Sidecars
// =============================================================================

/// Configuration for one auxiliary container co-located with the application
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SideCar {
    /// The artifact to run as the sidecar
    pub image: ArtifactReference,
    /// Sidecar environment variables, as `KEY=VALUE` entries
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment_variables: Vec<String>,
    /// Sidecar volume mounts, taken verbatim
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,
}

// =============================================================================
// Deployer Properties
// =============================================================================

/// Global deployer defaults, supplied by the platform operator
///
/// Consumed read-only by the container factories; per-request values from
/// [`DeploymentOverrides`] take precedence where both exist.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeployerProperties {
    /// Default environment variables for every container, as `KEY=VALUE` entries
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment_variables: Vec<String>,

    /// Default volume mounts for every container
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,

    /// Default entry point style
    #[serde(default)]
    pub entry_point_style: EntryPointStyle,

    /// Default memory limit quantity
    #[serde(default = "default_memory")]
    pub memory: String,

    /// Default CPU limit quantity
    #[serde(default = "default_cpu")]
    pub cpu: String,

    /// Liveness probe configuration
    #[serde(default = "default_liveness_probe")]
    pub liveness_probe: ProbeSettings,

    /// Readiness probe configuration
    #[serde(default = "default_readiness_probe")]
    pub readiness_probe: ProbeSettings,

    /// Named sidecar containers to run alongside every application
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub side_cars: BTreeMap<String, SideCar>,
}

impl Default for DeployerProperties {
    fn default() -> Self {
        Self {
            environment_variables: Vec::new(),
            volume_mounts: Vec::new(),
            entry_point_style: EntryPointStyle::default(),
            memory: default_memory(),
            cpu: default_cpu(),
            liveness_probe: default_liveness_probe(),
            readiness_probe: default_readiness_probe(),
            side_cars: BTreeMap::new(),
        }
    }
}

// =============================================================================
// Deployment Overrides
// =============================================================================

/// Deploy-time overrides parsed from the dotted property namespace
///
/// [`DeploymentOverrides::parse`] is the only place the string keys are
/// touched; malformed values surface here as
/// [`Error::ConfigurationParse`](crate::Error::ConfigurationParse) instead of
/// leaking into the translation steps.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeploymentOverrides {
    /// Entry point style override; `None` when absent or unrecognized
    pub entry_point_style: Option<EntryPointStyle>,
    /// App-level environment variables, overriding deployer defaults on key collision
    pub environment_variables: Vec<EnvVar>,
    /// Request-level volume mounts, unioned with deployer defaults
    pub volume_mounts: Vec<VolumeMount>,
    /// Tokenized command replacing the image entrypoint; empty when absent
    pub container_command: Vec<String>,
    /// Additional exposed ports, probe-less
    pub container_ports: Vec<u16>,
    /// Memory limit override quantity
    pub memory: Option<String>,
    /// CPU limit override quantity
    pub cpu: Option<String>,
}

impl DeploymentOverrides {
    /// Parse the recognized keys out of a request's deployment properties
    ///
    /// Unrecognized keys are ignored. An unrecognized entry point style value
    /// falls back to the deployer default rather than failing; every other
    /// malformed value is an error.
    pub fn parse(properties: &BTreeMap<String, String>) -> Result<Self> {
        let entry_point_style = match properties.get(ENTRY_POINT_STYLE_PROPERTY) {
            Some(raw) => match raw.parse::<EntryPointStyle>() {
                Ok(style) => Some(style),
                Err(_) => {
                    debug!(value = %raw, "unrecognized entry point style, using deployer default");
                    None
                }
            },
            None => None,
        };

        let environment_variables = match properties.get(ENVIRONMENT_VARIABLES_PROPERTY) {
            Some(raw) => raw
                .split(',')
                .map(EnvVar::parse)
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        let volume_mounts = match properties.get(VOLUME_MOUNTS_PROPERTY) {
            Some(raw) if !raw.is_empty() => raw
                .split(',')
                .map(|entry| entry.parse::<VolumeMount>())
                .collect::<Result<Vec<_>>>()?,
            _ => Vec::new(),
        };

        let container_command = properties
            .get(CONTAINER_COMMAND_PROPERTY)
            .map(|raw| cmdline::tokenize(raw))
            .unwrap_or_default();

        let container_ports = match properties.get(CONTAINER_PORTS_PROPERTY) {
            Some(raw) => raw
                .split(',')
                .map(|port| {
                    port.trim().parse::<u16>().map_err(|_| {
                        Error::configuration_parse(format!("invalid container port: '{port}'"))
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(Self {
            entry_point_style,
            environment_variables,
            volume_mounts,
            container_command,
            container_ports,
            memory: properties.get(MEMORY_PROPERTY).cloned(),
            cpu: properties.get(CPU_PROPERTY).cloned(),
        })
    }
}
