//! SDK configuration.

use coppice_core::{
    CollapsePolicy, ConfigValidationError, TraversalPolicy, ValidationPolicy,
};
use serde::{Deserialize, Serialize};

/// Configuration for a memory tree.
///
/// Policies are plain values: construct, adjust, pass. Two trees built from
/// different configs share nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdkConfig {
    /// Identity anchor name folded into the integrity key (default: "warden")
    pub anchor: String,

    /// Content of the fixed root node (default: "Coppice root node")
    pub root_label: String,

    /// Admission and scrubbing policy
    pub validation: ValidationPolicy,

    /// Seed-synthesis thresholds
    pub collapse: CollapsePolicy,

    /// Read-time traversal defenses
    pub traversal: TraversalPolicy,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            anchor: "warden".into(),
            root_label: "Coppice root node".into(),
            validation: ValidationPolicy::default(),
            collapse: CollapsePolicy::default(),
            traversal: TraversalPolicy::default(),
        }
    }
}

impl SdkConfig {
    /// Create a config with the given anchor name
    pub fn new(anchor: impl Into<String>) -> Self {
        Self {
            anchor: anchor.into(),
            ..Default::default()
        }
    }

    /// Set the validation policy
    pub fn with_validation(mut self, validation: ValidationPolicy) -> Self {
        self.validation = validation;
        self
    }

    /// Set the collapse policy
    pub fn with_collapse(mut self, collapse: CollapsePolicy) -> Self {
        self.collapse = collapse;
        self
    }

    /// Set the traversal policy
    pub fn with_traversal(mut self, traversal: TraversalPolicy) -> Self {
        self.traversal = traversal;
        self
    }

    /// Set the root node label
    pub fn with_root_label(mut self, label: impl Into<String>) -> Self {
        self.root_label = label.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.anchor.is_empty() {
            return Err(ConfigValidationError::Required("anchor".into()));
        }
        self.validation.validate()?;
        self.collapse.validate()?;
        self.traversal.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SdkConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.anchor, "warden");
        assert_eq!(config.validation.max_depth, 128);
    }

    #[test]
    fn test_config_builder() {
        let config = SdkConfig::new("keeper")
            .with_root_label("Archive root")
            .with_collapse(CollapsePolicy {
                priority_cutoff: 5,
                ..Default::default()
            });

        assert_eq!(config.anchor, "keeper");
        assert_eq!(config.root_label, "Archive root");
        assert_eq!(config.collapse.priority_cutoff, 5);
    }

    #[test]
    fn test_empty_anchor_rejected() {
        let config = SdkConfig::new("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nested_policy_validation_propagates() {
        let config = SdkConfig::default().with_traversal(TraversalPolicy { max_read_depth: 0 });
        assert!(config.validate().is_err());
    }
}
