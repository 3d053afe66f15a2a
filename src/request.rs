//! Deployment request model
//!
//! An [`AppDeploymentRequest`] is the read-only input to the translation layer:
//! the logical application definition (name plus configuration properties), the
//! artifact to run, deploy-time override properties, command-line arguments,
//! and environment properties carrying the optional group id.
//!
//! Requests are request-scoped value objects. The translation layer never
//! mutates or retains them.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Environment property key carrying the optional deployment group id
pub const GROUP_PROPERTY_KEY: &str = "stevedore.group";

/// Opaque locator for a runnable container image
///
/// References use a URI-style `<scheme>:<image>` form, e.g.
/// `docker:registry.example.com/team/app:1.4.2`. The scheme identifies the
/// artifact source; the scheme-specific part is the image identifier handed to
/// the container runtime.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(transparent)]
pub struct ArtifactReference(String);

impl ArtifactReference {
    /// Create an artifact reference from a URI-style locator
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Resolve the reference to a concrete container image identifier
    ///
    /// Resolution failure indicates a malformed request, not a transient
    /// condition; callers must propagate the error rather than retry.
    pub fn image(&self) -> Result<&str> {
        match self.0.split_once(':') {
            Some((scheme, image)) if !scheme.is_empty() && !image.is_empty() => Ok(image),
            _ => Err(Error::resource_resolution(format!(
                "unable to resolve image for '{}'",
                self.0
            ))),
        }
    }

    /// The raw locator string
    pub fn uri(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArtifactReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Logical application definition: a name plus its configuration properties
///
/// Properties are application-level configuration (e.g. `server.port`); how
/// they reach the running process is decided by the active
/// [`EntryPointStyle`](crate::config::EntryPointStyle). The map is ordered so
/// that derived argument lists and environment entries are deterministic.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppDefinition {
    /// Application name
    pub name: String,
    /// Application configuration properties
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl AppDefinition {
    /// Create a definition with no properties
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Add an application property
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// A request to deploy one application
///
/// Consumed read-only by the container factories and the identity deriver.
/// Deployment properties use the reserved dotted-key namespace documented in
/// [`config`](crate::config); environment properties carry cross-cutting
/// values such as the group id.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppDeploymentRequest {
    /// The logical application definition
    pub definition: AppDefinition,
    /// The artifact to run
    pub resource: ArtifactReference,
    /// Deploy-time override properties (`stevedore.kubernetes.*` namespace)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub deployment_properties: BTreeMap<String, String>,
    /// Environment properties (group id, platform-level values)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment_properties: BTreeMap<String, String>,
    /// Explicit command-line arguments, appended after derived arguments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command_line_args: Vec<String>,
}

impl AppDeploymentRequest {
    /// Create a request for the given definition and artifact
    pub fn new(definition: AppDefinition, resource: ArtifactReference) -> Self {
        Self {
            definition,
            resource,
            deployment_properties: BTreeMap::new(),
            environment_properties: BTreeMap::new(),
            command_line_args: Vec::new(),
        }
    }

    /// Add a deploy-time override property
    pub fn with_deployment_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.deployment_properties.insert(key.into(), value.into());
        self
    }

    /// Add an environment property
    pub fn with_environment_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.environment_properties.insert(key.into(), value.into());
        self
    }

    /// Append a command-line argument
    pub fn with_command_line_arg(mut self, arg: impl Into<String>) -> Self {
        self.command_line_args.push(arg.into());
        self
    }

    /// The deployment group id, if one was supplied
    pub fn group_id(&self) -> Option<&str> {
        self.environment_properties
            .get(GROUP_PROPERTY_KEY)
            .map(String::as_str)
    }
}
