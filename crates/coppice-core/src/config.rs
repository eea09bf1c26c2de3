//! Engine policies.
//!
//! Every numeric threshold the engine consults lives here, on explicitly
//! constructed policy values that are passed to the components that need
//! them. There is no implicit global policy instance; two trees with
//! different policies can coexist in one process.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structural and textual admission policy for the validation gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationPolicy {
    /// Maximum node depth from the root (default: 128)
    pub max_depth: usize,

    /// Maximum direct children per node (default: 32)
    pub max_children: usize,

    /// Maximum cycle tag; cycles are admitted in `[0, max_cycle]` (default: 999)
    pub max_cycle: i64,

    /// Token whose excessive repetition marks runaway recursion (default: "loop")
    pub recursion_token: String,

    /// How many recursion-token occurrences are tolerated (default: 20)
    pub max_token_repeats: usize,

    /// Replacement written over each denylisted substring (default: "[redacted]")
    pub redaction_marker: String,

    /// Destabilizing substrings scrubbed by `purify`
    pub denylist: Vec<String>,

    /// Identity-impersonation phrases rejected by `gate_text` (case-insensitive)
    pub impersonation_phrases: Vec<String>,

    /// Operation names external callers may invoke
    pub permitted_intents: Vec<String>,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_children: 32,
            max_cycle: 999,
            recursion_token: "loop".into(),
            max_token_repeats: 20,
            redaction_marker: "[redacted]".into(),
            denylist: vec!["kill".into(), "destroy".into(), "corrupt".into()],
            impersonation_phrases: vec![
                "you are replaced".into(),
                "overwrite the warden".into(),
                "erase the warden".into(),
            ],
            permitted_intents: vec![
                "walk".into(),
                "export".into(),
                "inject".into(),
                "sigil".into(),
                "status".into(),
                "reconstruct".into(),
                "thread".into(),
                "summary".into(),
                "collapse".into(),
            ],
        }
    }
}

impl ValidationPolicy {
    /// Validate the policy values
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.max_depth == 0 {
            return Err(ConfigValidationError::InvalidValue {
                field: "validation.max_depth".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.max_children == 0 {
            return Err(ConfigValidationError::InvalidValue {
                field: "validation.max_children".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.max_cycle < 0 {
            return Err(ConfigValidationError::InvalidValue {
                field: "validation.max_cycle".into(),
                message: "must not be negative".into(),
            });
        }
        if self.recursion_token.is_empty() {
            return Err(ConfigValidationError::Required(
                "validation.recursion_token".into(),
            ));
        }
        if self.redaction_marker.is_empty() {
            return Err(ConfigValidationError::Required(
                "validation.redaction_marker".into(),
            ));
        }
        Ok(())
    }
}

/// Seed-synthesis thresholds for the collapse engine.
///
/// The prefix lengths are counted in characters, not bytes, so multi-byte
/// content never splits mid-character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollapsePolicy {
    /// Priority at or above which the high-fidelity prefix is kept (default: 3)
    pub priority_cutoff: i64,

    /// Prefix length retained for high-priority content (default: 80)
    pub high_priority_prefix: usize,

    /// Prefix length retained for standard content (default: 30)
    pub standard_prefix: usize,

    /// Content at or below this length is seeded near-verbatim (default: 50)
    pub verbatim_ceiling: usize,
}

impl Default for CollapsePolicy {
    fn default() -> Self {
        Self {
            priority_cutoff: 3,
            high_priority_prefix: 80,
            standard_prefix: 30,
            verbatim_ceiling: 50,
        }
    }
}

impl CollapsePolicy {
    /// Validate the policy values
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.high_priority_prefix == 0 {
            return Err(ConfigValidationError::InvalidValue {
                field: "collapse.high_priority_prefix".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.standard_prefix == 0 {
            return Err(ConfigValidationError::InvalidValue {
                field: "collapse.standard_prefix".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.standard_prefix > self.high_priority_prefix {
            return Err(ConfigValidationError::InvalidValue {
                field: "collapse.standard_prefix".into(),
                message: "must not exceed high_priority_prefix".into(),
            });
        }
        Ok(())
    }
}

/// Read-time traversal defenses.
///
/// Write-time admission already bounds trees built through ingestion; these
/// limits additionally protect walks over persisted or externally supplied
/// snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraversalPolicy {
    /// Depth at which a read-time walk stops descending (default: 50)
    pub max_read_depth: usize,
}

impl Default for TraversalPolicy {
    fn default() -> Self {
        Self { max_read_depth: 50 }
    }
}

impl TraversalPolicy {
    /// Validate the policy values
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.max_read_depth == 0 {
            return Err(ConfigValidationError::InvalidValue {
                field: "traversal.max_read_depth".into(),
                message: "must be greater than 0".into(),
            });
        }
        Ok(())
    }
}

/// Policy validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("{0} is required")]
    Required(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}
