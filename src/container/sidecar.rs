//! Sidecar container factory
//!
//! Builds the minimal container for an auxiliary workload co-located with an
//! application. Sidecars carry their own image, environment, and volume
//! mounts; they get no arguments, ports, probes, or entrypoint override, and
//! their mounts are taken verbatim without merging.

use tracing::debug;

use crate::config::SideCar;
use crate::container::{Container, EnvVar};
use crate::Result;

/// Factory for auxiliary (sidecar) containers
///
/// Stateless counterpart of
/// [`DefaultContainerFactory`](crate::container::DefaultContainerFactory);
/// the caller composes the two by invoking each per pod.
#[derive(Clone, Copy, Debug)]
pub struct SideCarContainerFactory;

impl SideCarContainerFactory {
    /// Translate a named sidecar configuration into a container
    ///
    /// Fails when the sidecar's artifact reference cannot be resolved or an
    /// environment entry is not a `KEY=VALUE` pair.
    pub fn create(name: &str, side_car: &SideCar) -> Result<Container> {
        let image = side_car.image.image()?.to_string();
        debug!(%name, %image, "creating sidecar container");

        let env = side_car
            .environment_variables
            .iter()
            .map(|entry| EnvVar::parse(entry))
            .collect::<Result<Vec<_>>>()?;

        Ok(Container {
            name: name.to_string(),
            image,
            command: None,
            args: Vec::new(),
            env,
            ports: Vec::new(),
            liveness_probe: None,
            readiness_probe: None,
            volume_mounts: side_car.volume_mounts.clone(),
        })
    }
}
