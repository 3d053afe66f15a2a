//! Container descriptor types and container factories
//!
//! This module defines the Kubernetes-shaped container types produced by the
//! translation layer and the two factories that build them:
//! - [`DefaultContainerFactory`]: builds the application container from an
//!   [`AppDeploymentRequest`](crate::request::AppDeploymentRequest)
//! - [`SideCarContainerFactory`]: builds an auxiliary container from a named
//!   [`SideCar`](crate::config::SideCar) configuration
//!
//! The types serialize to the camelCase JSON shape the cluster API expects;
//! assembling them into a pod and submitting that pod is the caller's job.

use std::collections::BTreeMap;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

mod factory;
mod sidecar;

pub use factory::DefaultContainerFactory;
pub use sidecar::SideCarContainerFactory;

// =============================================================================
// Container
// =============================================================================

/// Container spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    /// Container name
    pub name: String,
    /// Image
    pub image: String,
    /// Command, replacing the image's default entrypoint when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
    /// Args
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Environment variables
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,
    /// Ports
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ContainerPort>,
    /// Liveness probe
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liveness_probe: Option<Probe>,
    /// Readiness probe
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness_probe: Option<Probe>,
    /// Volume mounts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,
}

/// Environment variable
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnvVar {
    /// Variable name
    pub name: String,
    /// Variable value
    pub value: String,
}

impl EnvVar {
    /// Create an environment variable
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse a `KEY=VALUE` entry, splitting on the first `=`
    ///
    /// An entry without `=` is a configuration error, never silently dropped.
    pub fn parse(entry: &str) -> Result<Self> {
        match entry.split_once('=') {
            Some((name, value)) => Ok(Self::new(name, value)),
            None => Err(Error::configuration_parse(format!(
                "invalid environment variable declared: {entry}"
            ))),
        }
    }
}

/// Container port
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPort {
    /// Port name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Port number
    pub container_port: u16,
    /// Protocol
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

impl ContainerPort {
    /// Create an unnamed TCP port declaration
    pub fn new(container_port: u16) -> Self {
        Self {
            name: None,
            container_port,
            protocol: None,
        }
    }
}

// =============================================================================
// Probes
// =============================================================================

/// Probe specification
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
    /// HTTP GET probe
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_get: Option<HttpGetAction>,
    /// Timeout seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u32>,
    /// Initial delay seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_delay_seconds: Option<u32>,
    /// Period seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_seconds: Option<u32>,
}

/// HTTP GET action for probe
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HttpGetAction {
    /// Path
    pub path: String,
    /// Port
    pub port: u16,
    /// Scheme
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
}

// =============================================================================
// Volume Mounts
// =============================================================================

fn is_false(value: &bool) -> bool {
    !*value
}

/// Volume mount
///
/// Mounts are identified by the full (name, path, readOnly) tuple; two mounts
/// sharing a name but differing in path or flag are distinct mounts, not an
/// override of one another.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
    /// Volume name, matching a configured pod volume
    pub name: String,
    /// Mount path inside the container
    pub mount_path: String,
    /// Read only
    #[serde(default, skip_serializing_if = "is_false")]
    pub read_only: bool,
}

impl VolumeMount {
    /// Create a volume mount
    pub fn new(name: impl Into<String>, mount_path: impl Into<String>, read_only: bool) -> Self {
        Self {
            name: name.into(),
            mount_path: mount_path.into(),
            read_only,
        }
    }
}

impl FromStr for VolumeMount {
    type Err = Error;

    /// Parse a `name:path[:readOnly]` triple
    ///
    /// The readOnly flag defaults to `false` when omitted. More than three
    /// colon-separated fields, or a flag that is not a boolean token, is a
    /// configuration error.
    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.split(':').collect();
        match fields.as_slice() {
            [name, path] => Ok(Self::new(*name, *path, false)),
            [name, path, flag] => {
                let read_only = flag.parse::<bool>().map_err(|_| {
                    Error::configuration_parse(format!("invalid volume mount: '{s}'"))
                })?;
                Ok(Self::new(*name, *path, read_only))
            }
            _ => Err(Error::configuration_parse(format!(
                "invalid volume mount: '{s}'"
            ))),
        }
    }
}

// =============================================================================
// Resource Quantities
// =============================================================================

/// Kubernetes resource quantity string (e.g. `512Mi`, `500m`)
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(transparent)]
pub struct Quantity(String);

impl Quantity {
    /// Create a quantity from its string form
    pub fn new(quantity: impl Into<String>) -> Self {
        Self(quantity.into())
    }

    /// The quantity string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resource limits keyed by resource name (`memory`, `cpu`)
pub type ResourceLimits = BTreeMap<String, Quantity>;

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Story: Environment Entries Split on the First Equals Sign
    // =========================================================================

    #[test]
    fn story_env_entry_splits_on_first_equals() {
        let var = EnvVar::parse("JAVA_TOOL_OPTIONS=-Xmx512m -Ddebug=true").unwrap();
        assert_eq!(var.name, "JAVA_TOOL_OPTIONS");
        assert_eq!(var.value, "-Xmx512m -Ddebug=true");
    }

    #[test]
    fn story_env_entry_allows_empty_value() {
        let var = EnvVar::parse("FEATURE_FLAGS=").unwrap();
        assert_eq!(var.name, "FEATURE_FLAGS");
        assert_eq!(var.value, "");
    }

    #[test]
    fn story_env_entry_without_equals_is_rejected() {
        let err = EnvVar::parse("NOT_A_PAIR").unwrap_err();
        assert!(matches!(err, Error::ConfigurationParse(_)));
    }

    // =========================================================================
    // Story: Volume Mount Triples
    // =========================================================================

    #[test]
    fn story_mount_triple_with_read_only_flag() {
        let mount: VolumeMount = "data:/tmp/data:true".parse().unwrap();
        assert_eq!(mount, VolumeMount::new("data", "/tmp/data", true));
    }

    #[test]
    fn story_mount_pair_defaults_to_read_write() {
        let mount: VolumeMount = "data:/tmp/data".parse().unwrap();
        assert_eq!(mount, VolumeMount::new("data", "/tmp/data", false));
    }

    #[test]
    fn story_mount_with_four_fields_is_rejected() {
        let err = "data:/tmp/data:true:extra".parse::<VolumeMount>().unwrap_err();
        assert!(matches!(err, Error::ConfigurationParse(_)));
    }

    #[test]
    fn story_mount_with_non_boolean_flag_is_rejected() {
        let err = "data:/tmp/data:yes".parse::<VolumeMount>().unwrap_err();
        assert!(matches!(err, Error::ConfigurationParse(_)));
    }

    #[test]
    fn story_mount_with_single_field_is_rejected() {
        let err = "data".parse::<VolumeMount>().unwrap_err();
        assert!(matches!(err, Error::ConfigurationParse(_)));
    }

    // =========================================================================
    // Story: Wire Shape
    // =========================================================================

    #[test]
    fn story_read_only_false_is_omitted_from_json() {
        let json = serde_json::to_string(&VolumeMount::new("cache", "/cache", false)).unwrap();
        assert_eq!(json, r#"{"name":"cache","mountPath":"/cache"}"#);

        let json = serde_json::to_string(&VolumeMount::new("cache", "/cache", true)).unwrap();
        assert_eq!(json, r#"{"name":"cache","mountPath":"/cache","readOnly":true}"#);
    }
}
