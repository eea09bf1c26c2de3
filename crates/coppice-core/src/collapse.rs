//! Collapse engine.
//!
//! Collapse is the one-way conversion of raw content into compact
//! structural seeds. Every node passes the validation gate before it is
//! touched; rejected nodes lose their entire subtree and keep only a fixed
//! blocked marker. A synthesized seed is authoritative: it is never
//! regenerated, so re-collapsing is a content-clearing no-op.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::config::CollapsePolicy;
use crate::gate::ValidationGate;
use crate::node::{MemoryNode, NodePayload};

/// Seed written over nodes the gate refused
pub const BLOCKED_SEED: &str = "[Blocked]";

static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static pattern"));

/// Gate-bound, priority-aware seed compression.
#[derive(Debug, Clone)]
pub struct CollapseEngine {
    gate: ValidationGate,
    policy: CollapsePolicy,
}

impl CollapseEngine {
    /// Create an engine bound to the given gate and thresholds
    pub fn new(gate: ValidationGate, policy: CollapsePolicy) -> Self {
        Self { gate, policy }
    }

    /// The thresholds this engine applies
    pub fn policy(&self) -> &CollapsePolicy {
        &self.policy
    }

    /// Collapse a node and its whole subtree, depth-first pre-order.
    ///
    /// `depth` is the node's distance from the tree root; children are
    /// collapsed at `depth + 1` in their original order. A node the gate
    /// rejects is replaced by a childless blocked-marker node, pruning the
    /// rejected subtree entirely.
    pub fn collapse(&self, node: MemoryNode, depth: usize) -> MemoryNode {
        if let Err(reason) = self
            .gate
            .admit(node.role, node.cycle, node.children.len(), depth)
        {
            warn!(node = %node.id, %reason, "collapse blocked; subtree pruned");
            return MemoryNode {
                priority: 0,
                payload: NodePayload::Seed {
                    seed: BLOCKED_SEED.into(),
                },
                children: Vec::new(),
                ..node
            };
        }

        let MemoryNode {
            id,
            created_at,
            role,
            cycle,
            priority,
            payload,
            children,
        } = node;

        let payload = match payload {
            // An existing seed is authoritative: drop retained content, never
            // touch the seed.
            NodePayload::Summary { seed, .. } => NodePayload::Seed { seed },
            seeded @ (NodePayload::Seed { .. } | NodePayload::SigilOnly) => seeded,
            NodePayload::Raw { content } => NodePayload::Seed {
                seed: self.synthesize(&content, cycle, priority),
            },
        };

        let children = children
            .into_iter()
            .map(|child| self.collapse(child, depth + 1))
            .collect();

        MemoryNode {
            id,
            created_at,
            role,
            cycle,
            priority,
            payload,
            children,
        }
    }

    /// Deterministic seed synthesis from normalized raw content.
    ///
    /// Fidelity is selected by priority and length: high-priority content
    /// keeps a long tagged prefix, long standard content a short tagged
    /// prefix, and short content survives near-verbatim.
    fn synthesize(&self, content: &str, cycle: i64, priority: i64) -> String {
        let normalized = normalize(content);

        if priority >= self.policy.priority_cutoff {
            let prefix = char_prefix(&normalized, self.policy.high_priority_prefix);
            return format!("[AC-{cycle}] {prefix}...");
        }
        if normalized.chars().count() > self.policy.verbatim_ceiling {
            let prefix = char_prefix(&normalized, self.policy.standard_prefix);
            return format!("[Seed AC-{cycle}]: {prefix}...");
        }
        normalized
    }
}

/// Whitespace-collapsing content normalizer
fn normalize(text: &str) -> String {
    WHITESPACE_RUNS.replace_all(text.trim(), " ").into_owned()
}

/// First `n` characters, never splitting a multi-byte character
fn char_prefix(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}
