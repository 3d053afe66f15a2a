//! Stevedore - translates application deployment requests into Kubernetes container specs
//!
//! Stevedore is the container-translation layer of a deployment platform: given a
//! logical application (an artifact reference, application properties, command-line
//! arguments, and deploy-time overrides) plus the deployer's global configuration,
//! it produces the Kubernetes-native container descriptor used to run that
//! application. Pod assembly and submission to the cluster API are the caller's
//! responsibility.
//!
//! # Architecture
//!
//! Three cooperating translators, no shared runtime state:
//! - [`deployer`] derives stable identifiers and label sets for a request
//! - [`container::DefaultContainerFactory`] turns one request into one container
//! - [`container::SideCarContainerFactory`] turns a named sidecar config into a
//!   minimal container
//!
//! All operations are synchronous, pure functions over immutable inputs and are
//! safe to invoke concurrently for independent requests.
//!
//! # Modules
//!
//! - [`request`] - Deployment request model (artifact reference, definition, overrides)
//! - [`config`] - Deployer configuration and the typed deployment-property boundary
//! - [`container`] - Container descriptor types and the two container factories
//! - [`deployer`] - Identity, label, and resource-limit derivation
//! - [`cmdline`] - Shell-style command line tokenizer
//! - [`error`] - Error types for the translation layer

#![deny(missing_docs)]

pub mod cmdline;
pub mod config;
pub mod container;
pub mod deployer;
pub mod error;
pub mod request;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Reserved Environment Variable Names
// =============================================================================
// These names are part of the contract between the deployer and the deployed
// application image. Centralizing them here keeps factories and tests in sync.

/// Environment variable receiving the full application properties map as a
/// single JSON document when the `boot` entry point style is active
pub const APPLICATION_JSON_ENV: &str = "APPLICATION_JSON";

/// Environment variable carrying the zero-based instance index of a container,
/// always appended last when an instance index is supplied
pub const INSTANCE_INDEX_ENV: &str = "INSTANCE_INDEX";
