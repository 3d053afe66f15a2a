//! Identity, label, and resource-limit derivation
//!
//! Deterministic, pure functions over a deployment request: the deployment id
//! groups all instances of one logical deployment, and the label set lets
//! cluster services select the right pods. Selection and matching themselves
//! happen in the cluster, not here.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::{DeployerProperties, DeploymentOverrides};
use crate::container::{Quantity, ResourceLimits};
use crate::request::AppDeploymentRequest;
use crate::Result;

/// Label carrying the app id of a container's logical application
pub const APP_ID_LABEL: &str = "stevedore-app-id";

/// Label carrying the derived deployment id
pub const DEPLOYMENT_ID_LABEL: &str = "stevedore-deployment-id";

/// Label carrying the group id, set only when the request has one
pub const GROUP_ID_LABEL: &str = "stevedore-group-id";

/// Derive the stable deployment id for a request
///
/// `<group>-<name>` when the request carries a group id, else the definition
/// name alone. Kubernetes does not allow `.` in names, so dots become dashes.
pub fn deployment_id(request: &AppDeploymentRequest) -> String {
    let id = match request.group_id() {
        Some(group) => format!("{group}-{}", request.definition.name),
        None => request.definition.name.clone(),
    };
    id.replace('.', "-")
}

/// Create the label map for a given app id
///
/// The labels allow cluster services to select all pods belonging to one
/// logical application: the app id and deployment id are always present, the
/// group id only when the request carries one.
pub fn id_labels(app_id: &str, request: &AppDeploymentRequest) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert(APP_ID_LABEL.to_string(), app_id.to_string());
    if let Some(group_id) = request.group_id() {
        labels.insert(GROUP_ID_LABEL.to_string(), group_id.to_string());
    }
    labels.insert(DEPLOYMENT_ID_LABEL.to_string(), deployment_id(request));
    labels
}

/// Deduce the container resource limits for a request
///
/// Deploy-time `memory`/`cpu` overrides win over the deployer defaults; both
/// keys are always present in the result.
pub fn resource_limits(
    properties: &DeployerProperties,
    request: &AppDeploymentRequest,
) -> Result<ResourceLimits> {
    let overrides = DeploymentOverrides::parse(&request.deployment_properties)?;
    let memory = overrides.memory.unwrap_or_else(|| properties.memory.clone());
    let cpu = overrides.cpu.unwrap_or_else(|| properties.cpu.clone());
    debug!(%memory, %cpu, "using resource limits");

    let mut limits = ResourceLimits::new();
    limits.insert("memory".to_string(), Quantity::new(memory));
    limits.insert("cpu".to_string(), Quantity::new(cpu));
    Ok(limits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CPU_PROPERTY, MEMORY_PROPERTY};
    use crate::request::{AppDefinition, ArtifactReference, GROUP_PROPERTY_KEY};

    fn make_request(name: &str) -> AppDeploymentRequest {
        AppDeploymentRequest::new(
            AppDefinition::new(name),
            ArtifactReference::new("docker:test:latest"),
        )
    }

    // =========================================================================
    // Story: Deployment Id Derivation
    // =========================================================================

    #[test]
    fn story_deployment_id_without_group_is_the_definition_name() {
        let request = make_request("ticker");
        assert_eq!(deployment_id(&request), "ticker");
    }

    #[test]
    fn story_deployment_id_with_group_is_prefixed() {
        let request = make_request("ticker").with_environment_property(GROUP_PROPERTY_KEY, "stream");
        assert_eq!(deployment_id(&request), "stream-ticker");
    }

    #[test]
    fn story_deployment_id_replaces_dots_with_dashes() {
        let request = make_request("time.source");
        assert_eq!(deployment_id(&request), "time-source");

        let request =
            make_request("time.source").with_environment_property(GROUP_PROPERTY_KEY, "my.stream");
        assert_eq!(deployment_id(&request), "my-stream-time-source");
    }

    // =========================================================================
    // Story: Label Sets for Pod Selection
    // =========================================================================

    #[test]
    fn story_labels_without_group() {
        let request = make_request("ticker");
        let labels = id_labels("ticker-0", &request);

        assert_eq!(labels.get(APP_ID_LABEL), Some(&"ticker-0".to_string()));
        assert_eq!(labels.get(DEPLOYMENT_ID_LABEL), Some(&"ticker".to_string()));
        assert!(!labels.contains_key(GROUP_ID_LABEL));
    }

    #[test]
    fn story_labels_include_group_when_present() {
        let request = make_request("ticker").with_environment_property(GROUP_PROPERTY_KEY, "stream");
        let labels = id_labels("ticker", &request);

        assert_eq!(labels.get(GROUP_ID_LABEL), Some(&"stream".to_string()));
        assert_eq!(
            labels.get(DEPLOYMENT_ID_LABEL),
            Some(&"stream-ticker".to_string())
        );
    }

    // =========================================================================
    // Story: Resource Limit Deduction
    // =========================================================================

    #[test]
    fn story_limits_fall_back_to_deployer_defaults() {
        let properties = DeployerProperties::default();
        let limits = resource_limits(&properties, &make_request("ticker")).unwrap();

        assert_eq!(limits.get("memory"), Some(&Quantity::new("512Mi")));
        assert_eq!(limits.get("cpu"), Some(&Quantity::new("500m")));
    }

    #[test]
    fn story_request_overrides_win_over_defaults() {
        let properties = DeployerProperties::default();
        let request = make_request("ticker")
            .with_deployment_property(MEMORY_PROPERTY, "2Gi")
            .with_deployment_property(CPU_PROPERTY, "2");
        let limits = resource_limits(&properties, &request).unwrap();

        assert_eq!(limits.get("memory"), Some(&Quantity::new("2Gi")));
        assert_eq!(limits.get("cpu"), Some(&Quantity::new("2")));
    }
}
