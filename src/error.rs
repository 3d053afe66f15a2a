//! Error types for the container translation layer

use thiserror::Error;

/// Main error type for translation operations
///
/// No variant is retryable: every failure indicates a malformed request or
/// configuration, and all errors propagate synchronously to the caller, which
/// decides user-visible reporting.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Artifact reference could not be resolved to a container image
    #[error("resource resolution error: {0}")]
    ResourceResolution(String),

    /// Malformed configuration value (environment variable entry, port list,
    /// volume mount triple)
    #[error("configuration parse error: {0}")]
    ConfigurationParse(String),

    /// Two configuration mechanisms that are mutually exclusive by
    /// construction were both supplied
    #[error("conflicting configuration error: {0}")]
    ConflictingConfiguration(String),
}

impl Error {
    /// Create a resource resolution error with the given message
    pub fn resource_resolution(msg: impl Into<String>) -> Self {
        Self::ResourceResolution(msg.into())
    }

    /// Create a configuration parse error with the given message
    pub fn configuration_parse(msg: impl Into<String>) -> Self {
        Self::ConfigurationParse(msg.into())
    }

    /// Create a conflicting configuration error with the given message
    pub fn conflicting_configuration(msg: impl Into<String>) -> Self {
        Self::ConflictingConfiguration(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // Story Tests: Error Propagation During Request Translation
    // ==========================================================================
    //
    // These tests demonstrate how errors flow out of the translation layer.
    // Each error type represents a different failure category; none of them
    // is retryable, so categorization matters only for reporting.

    /// Story: unresolvable artifact references fail the whole translation
    ///
    /// When a deployment request carries an artifact reference that cannot be
    /// resolved to a container image, the request itself is malformed.
    #[test]
    fn story_resource_resolution_indicates_bad_request() {
        let err = Error::resource_resolution("unable to resolve image for 'my-app'");
        assert!(err.to_string().contains("resource resolution error"));
        assert!(err.to_string().contains("my-app"));

        match Error::resource_resolution("any message") {
            Error::ResourceResolution(msg) => assert_eq!(msg, "any message"),
            _ => panic!("Expected ResourceResolution variant"),
        }
    }

    /// Story: malformed configuration surfaces immediately
    ///
    /// Bad `KEY=VALUE` entries, unparseable port lists, and over-long volume
    /// mount triples are configuration bugs the user must fix; they are never
    /// silently ignored.
    #[test]
    fn story_configuration_parse_errors_surface_immediately() {
        // Scenario: environment variable without an equals sign
        let err = Error::configuration_parse("invalid environment variable declared: FOO");
        assert!(err.to_string().contains("configuration parse error"));
        assert!(err.to_string().contains("FOO"));

        // Scenario: a volume mount with too many fields
        let err = Error::configuration_parse("invalid volume mount: 'data:/tmp:true:extra'");
        assert!(err.to_string().contains("volume mount"));

        match Error::configuration_parse("parse issue") {
            Error::ConfigurationParse(msg) => assert_eq!(msg, "parse issue"),
            _ => panic!("Expected ConfigurationParse variant"),
        }
    }

    /// Story: mutually exclusive mechanisms are rejected
    ///
    /// The boot entry point style owns the reserved application-JSON variable;
    /// setting that variable explicitly alongside boot style is a conflict.
    #[test]
    fn story_conflicting_configuration_is_fatal() {
        let err = Error::conflicting_configuration(
            "boot entry point style cannot be combined with an explicit APPLICATION_JSON",
        );
        assert!(err.to_string().contains("conflicting configuration error"));
        assert!(err.to_string().contains("APPLICATION_JSON"));

        match Error::conflicting_configuration("conflict") {
            Error::ConflictingConfiguration(msg) => assert_eq!(msg, "conflict"),
            _ => panic!("Expected ConflictingConfiguration variant"),
        }
    }

    /// Story: error helper functions accept both String and &str
    #[test]
    fn story_error_construction_ergonomics() {
        let dynamic_msg = format!("unable to resolve image for '{}'", "ticker-app");
        let err = Error::resource_resolution(dynamic_msg);
        assert!(err.to_string().contains("ticker-app"));

        let err = Error::configuration_parse("static message");
        assert!(err.to_string().contains("static message"));
    }
}
