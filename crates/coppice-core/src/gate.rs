//! Validation gate.
//!
//! The gate is the single admission point for structural mutations and the
//! scrubber for incoming text. It is constructed from an explicit
//! [`ValidationPolicy`] and holds no other state, so gating is deterministic
//! and trees with different policies can coexist.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::ValidationPolicy;
use crate::error::RejectionReason;
use crate::node::Role;

/// Runs of the same sentence punctuation character
static PUNCT_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!{2,}|\?{2,}|\.{2,}|,{2,}").expect("static pattern"));

/// Admission and scrubbing policy layer.
#[derive(Debug, Clone)]
pub struct ValidationGate {
    policy: ValidationPolicy,
}

impl ValidationGate {
    /// Create a gate bound to the given policy
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    /// The policy this gate enforces
    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Deterministic, idempotent text scrub.
    ///
    /// Collapses repeated sentence-punctuation runs to a single character,
    /// strips control characters (newlines and tabs become spaces), and
    /// replaces each denylisted substring with the redaction marker.
    /// `purify(purify(x)) == purify(x)` for all inputs.
    pub fn purify(&self, text: &str) -> String {
        let stripped: String = text
            .chars()
            .filter_map(|c| match c {
                '\n' | '\t' | '\r' => Some(' '),
                c if c.is_control() => None,
                c => Some(c),
            })
            .collect();

        let collapsed = PUNCT_RUNS.replace_all(&stripped, |caps: &regex::Captures| {
            caps[0].chars().take(1).collect::<String>()
        });

        let mut purified = collapsed.into_owned();
        for term in &self.policy.denylist {
            if !term.is_empty() {
                purified = purified.replace(term.as_str(), &self.policy.redaction_marker);
            }
        }
        purified
    }

    /// Structural admission check.
    ///
    /// Rules are applied in fixed precedence order: unknown role, cycle out
    /// of range, depth limit, child limit. The first violated rule wins;
    /// `Ok(())` means all four passed.
    pub fn admit(
        &self,
        role: Role,
        cycle: i64,
        child_count: usize,
        depth: usize,
    ) -> Result<(), RejectionReason> {
        if !role.is_known() {
            return Err(RejectionReason::UnknownRole(role.to_string()));
        }
        if cycle < 0 || cycle > self.policy.max_cycle {
            return Err(RejectionReason::CycleOutOfRange(cycle));
        }
        if depth > self.policy.max_depth {
            return Err(RejectionReason::DepthLimitExceeded);
        }
        if child_count > self.policy.max_children {
            return Err(RejectionReason::ChildLimitExceeded);
        }
        Ok(())
    }

    /// Coarse text filter, independent of the structural gate.
    ///
    /// Rejects text repeating the recursion token past the policy ceiling
    /// or containing any impersonation phrase (case-insensitive).
    pub fn gate_text(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        if lower.matches(self.policy.recursion_token.as_str()).count()
            > self.policy.max_token_repeats
        {
            return false;
        }
        !self
            .policy
            .impersonation_phrases
            .iter()
            .any(|phrase| lower.contains(&phrase.to_lowercase()))
    }

    /// Whitelist membership check for externally invoked operation names
    pub fn validate_intent(&self, name: &str) -> bool {
        self.policy.permitted_intents.iter().any(|i| i == name)
    }
}

impl Default for ValidationGate {
    fn default() -> Self {
        Self::new(ValidationPolicy::default())
    }
}
