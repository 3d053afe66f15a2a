//! Default container factory
//!
//! Translates one [`AppDeploymentRequest`] plus the deployer's global
//! configuration into one fully-populated [`Container`].
//!
//! # Translation order
//!
//! 1. Resolve the artifact reference to an image
//! 2. Resolve the entry point style (request override, else deployer default)
//! 3. Seed environment variables from deployer defaults, overlay app-level
//!    overrides
//! 4. Apply the entry point style semantics (args, JSON blob, or per-property
//!    variables)
//! 5. Materialize the environment list, instance index always last
//! 6. Name the container (`<appId>` or `<appId>-<instanceIndex>`)
//! 7. Merge volume mounts (request ∪ deployer defaults, full-tuple dedup)
//! 8. Wire the primary port with readiness and liveness probes
//! 9. Add probe-less additional ports
//! 10. Apply the entrypoint command override

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::config::{DeployerProperties, DeploymentOverrides, EntryPointStyle, ProbeSettings};
use crate::container::{Container, ContainerPort, EnvVar, HttpGetAction, Probe, VolumeMount};
use crate::request::AppDeploymentRequest;
use crate::{Error, Result, APPLICATION_JSON_ENV, INSTANCE_INDEX_ENV};

/// Factory for the application container of a deployment request
///
/// Holds the deployer's global configuration; each [`create`](Self::create)
/// call is an independent, pure translation of one request.
#[derive(Clone, Debug)]
pub struct DefaultContainerFactory {
    properties: DeployerProperties,
}

impl DefaultContainerFactory {
    /// Create a factory over the given deployer configuration
    pub fn new(properties: DeployerProperties) -> Self {
        Self { properties }
    }

    /// Translate a deployment request into a container
    ///
    /// `port` becomes the container's primary exposed port, probed for
    /// readiness and liveness. `instance_index` qualifies the container name
    /// and is exported to the process via the reserved instance index
    /// variable.
    pub fn create(
        &self,
        app_id: &str,
        request: &AppDeploymentRequest,
        port: Option<u16>,
        instance_index: Option<u32>,
    ) -> Result<Container> {
        let image = request.resource.image()?.to_string();
        info!(%image, "using container image");

        let overrides = DeploymentOverrides::parse(&request.deployment_properties)?;

        let entry_point_style = overrides
            .entry_point_style
            .unwrap_or(self.properties.entry_point_style);
        info!(%entry_point_style, "using container entry point style");

        let mut env_vars: BTreeMap<String, String> = BTreeMap::new();
        for entry in &self.properties.environment_variables {
            let var = EnvVar::parse(entry)?;
            env_vars.insert(var.name, var.value);
        }
        // App-level variables win over deployer defaults. This is how e.g.
        // JAVA_TOOL_OPTIONS gets set independently per app when the base
        // image supports it.
        for var in &overrides.environment_variables {
            env_vars.insert(var.name.clone(), var.value.clone());
        }

        let mut app_args = Vec::new();
        match entry_point_style {
            EntryPointStyle::Exec => {
                app_args = Self::command_args(request);
            }
            EntryPointStyle::Boot => {
                if env_vars.contains_key(APPLICATION_JSON_ENV) {
                    return Err(Error::conflicting_configuration(format!(
                        "cannot use the boot entry point style and also set \
                         {APPLICATION_JSON_ENV} for the app"
                    )));
                }
                let json = serde_json::to_string(&request.definition.properties).map_err(|e| {
                    Error::configuration_parse(format!(
                        "unable to serialize application properties: {e}"
                    ))
                })?;
                env_vars.insert(APPLICATION_JSON_ENV.to_string(), json);
            }
            EntryPointStyle::Shell => {
                for (key, value) in &request.definition.properties {
                    env_vars.insert(key.replace('.', "_").to_uppercase(), value.clone());
                }
            }
        }

        let mut env: Vec<EnvVar> = env_vars
            .into_iter()
            .map(|(name, value)| EnvVar { name, value })
            .collect();
        if let Some(index) = instance_index {
            env.push(EnvVar::new(INSTANCE_INDEX_ENV, index.to_string()));
        }

        let name = match instance_index {
            Some(index) => format!("{app_id}-{index}"),
            None => app_id.to_string(),
        };

        let volume_mounts = self.merged_volume_mounts(&overrides);

        let mut ports = Vec::new();
        let mut liveness_probe = None;
        let mut readiness_probe = None;
        if let Some(primary) = port {
            ports.push(ContainerPort::new(primary));
            readiness_probe = Some(Self::probe(primary, &self.properties.readiness_probe));
            liveness_probe = Some(Self::probe(primary, &self.properties.liveness_probe));
        }
        // Additional ports are exposed without probes.
        for additional in &overrides.container_ports {
            debug!(port = additional, "adding container port from deployment request");
            ports.push(ContainerPort::new(*additional));
        }

        // A configured command fully replaces the image's default entrypoint.
        let command = if overrides.container_command.is_empty() {
            None
        } else {
            Some(overrides.container_command)
        };

        Ok(Container {
            name,
            image,
            command,
            args: app_args,
            env,
            ports,
            liveness_probe,
            readiness_probe,
            volume_mounts,
        })
    }

    /// Build `--key=value` arguments from the application properties, then
    /// append the request's explicit command-line arguments in order
    fn command_args(request: &AppDeploymentRequest) -> Vec<String> {
        let mut args: Vec<String> = request
            .definition
            .properties
            .iter()
            .map(|(key, value)| format!("--{key}={value}"))
            .collect();
        args.extend(request.command_line_args.iter().cloned());
        debug!(?args, "using command args");
        args
    }

    /// HTTP GET probe against the configured endpoint on the primary port
    fn probe(port: u16, settings: &ProbeSettings) -> Probe {
        Probe {
            http_get: Some(HttpGetAction {
                path: settings.path.clone(),
                port,
                scheme: None,
            }),
            timeout_seconds: Some(settings.timeout_seconds),
            initial_delay_seconds: Some(settings.initial_delay_seconds),
            period_seconds: Some(settings.period_seconds),
        }
    }

    /// Union of request-level and deployer-default mounts
    ///
    /// Identical (name, path, readOnly) tuples collapse; a request mount
    /// sharing only a name with a default is kept as a distinct mount.
    fn merged_volume_mounts(&self, overrides: &DeploymentOverrides) -> Vec<VolumeMount> {
        let mut mounts: Vec<VolumeMount> = Vec::new();
        for mount in overrides
            .volume_mounts
            .iter()
            .chain(&self.properties.volume_mounts)
        {
            if !mounts.contains(mount) {
                mounts.push(mount.clone());
            }
        }
        mounts
    }
}
