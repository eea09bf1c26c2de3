//! The memory tree.
//!
//! `MemoryTree` owns the node hierarchy and wires the core components
//! together: incoming exchanges are scrubbed, gated, scored, collapsed and
//! appended under a fixed root, and the memory digest is restamped after
//! every successful ingestion. Persistence is whole-snapshot replace.
//!
//! The tree is a single-writer, fully synchronous structure: exactly one
//! ingestion mutates it at a time and no internal locking is provided.
//! Callers that share a tree across threads must serialize mutation
//! themselves (one tree per exclusive owner, or an external mutex or actor
//! boundary).

use std::fs;
use std::path::Path;

use coppice_core::{
    CollapseEngine, IdentitySignature, IntegrityHasher, IntegrityStatus, MemoryNode,
    ReconstructionEngine, RejectionReason, Role, SigilScorer, SnapshotFile, SnapshotNode,
    ValidationGate,
};
use tracing::{debug, warn};

use crate::config::SdkConfig;
use crate::error::SdkResult;

/// Cycle tag carried by the fixed root node
const ROOT_CYCLE: i64 = 1;

/// Receipt for a successfully ingested exchange
#[derive(Debug, Clone)]
pub struct IngestAck {
    pub user_node_id: String,
    pub ai_node_id: String,
    pub cycle: i64,
    pub memory_digest: String,
}

/// Append-only hierarchical memory of conversational exchanges.
pub struct MemoryTree {
    root: MemoryNode,
    gate: ValidationGate,
    scorer: SigilScorer,
    engine: CollapseEngine,
    reconstructor: ReconstructionEngine,
    hasher: IntegrityHasher,
}

impl MemoryTree {
    /// Create an empty tree from the given configuration
    pub fn new(config: SdkConfig) -> SdkResult<Self> {
        config.validate()?;

        let gate = ValidationGate::new(config.validation.clone());
        let engine = CollapseEngine::new(gate.clone(), config.collapse.clone());
        let reconstructor = ReconstructionEngine::new(config.traversal.clone());
        let hasher = IntegrityHasher::new(
            config.anchor.clone(),
            &config.validation,
            &config.collapse,
            &config.traversal,
        )?;
        let root = MemoryNode::new(Role::System, config.root_label.clone(), ROOT_CYCLE);

        Ok(Self {
            root,
            gate,
            scorer: SigilScorer::default(),
            engine,
            reconstructor,
            hasher,
        })
    }

    /// Create a tree with the default configuration
    pub fn with_defaults() -> SdkResult<Self> {
        Self::new(SdkConfig::default())
    }

    /// Rebuild a tree from a persisted snapshot.
    ///
    /// The snapshot is verified (advisory) against this configuration's
    /// digests, adopted as the live hierarchy, and restamped so subsequent
    /// ingestion continues from it.
    pub fn restore(config: SdkConfig, path: &Path) -> SdkResult<(Self, IntegrityStatus)> {
        let mut tree = Self::new(config)?;
        let (wire, status) = tree.load(path)?;
        tree.root = wire.to_node();
        tree.hasher.stamp_tree(&SnapshotNode::from(&tree.root))?;
        Ok((tree, status))
    }

    /// Ingest one user/ai exchange under the given cycle.
    ///
    /// Both texts are purified and coarse-gated; the new nodes and the
    /// root's grown fan-out are admitted; the pair is collapsed to seeds
    /// and appended; the memory digest is recomputed. Rejections are
    /// returned as the typed reason and leave the tree untouched.
    pub fn ingest(
        &mut self,
        user_text: &str,
        ai_text: &str,
        cycle: i64,
    ) -> SdkResult<IngestAck> {
        let clean_user = self.gate.purify(user_text);
        let clean_ai = self.gate.purify(ai_text);

        if !self.gate.gate_text(&clean_user) || !self.gate.gate_text(&clean_ai) {
            warn!(cycle, "exchange refused by text gate");
            return Err(RejectionReason::TextRejected.into());
        }

        // The user node arrives with one child (the ai reply); the root
        // grows by one. All three placements must pass the gate before
        // anything is linked.
        self.gate.admit(Role::User, cycle, 1, 1)?;
        self.gate.admit(Role::Ai, cycle, 0, 2)?;
        self.gate.admit(
            self.root.role,
            self.root.cycle,
            self.root.children.len() + 1,
            0,
        )?;

        let mut user_node = MemoryNode::new(Role::User, clean_user, cycle);
        let mut ai_node = MemoryNode::new(Role::Ai, clean_ai, cycle);
        user_node.score_priority(&self.scorer);
        ai_node.score_priority(&self.scorer);

        let user_id = user_node.id.clone();
        let ai_id = ai_node.id.clone();

        user_node.push_child(ai_node);
        let collapsed = self.engine.collapse(user_node, 1);
        self.root.push_child(collapsed);

        let memory_digest = self.hasher.stamp_tree(&SnapshotNode::from(&self.root))?;
        debug!(cycle, user = %user_id, ai = %ai_id, "exchange ingested");

        Ok(IngestAck {
            user_node_id: user_id,
            ai_node_id: ai_id,
            cycle,
            memory_digest,
        })
    }

    /// The root of the live hierarchy
    pub fn root(&self) -> &MemoryNode {
        &self.root
    }

    /// Number of ingested exchanges
    pub fn exchange_count(&self) -> usize {
        self.root.children.len()
    }

    /// Collapse an externally built subtree with this tree's policies
    pub fn collapse_subtree(&self, node: MemoryNode) -> MemoryNode {
        self.engine.collapse(node, 0)
    }

    /// The current snapshot: integrity record plus wire tree
    pub fn snapshot(&self) -> SnapshotFile {
        SnapshotFile {
            integrity: self.hasher.record(),
            tree: SnapshotNode::from(&self.root),
        }
    }

    /// Expand the entire tree into one readable block
    pub fn reconstruct_full(&self) -> String {
        self.reconstructor
            .reconstruct_full(&SnapshotNode::from(&self.root))
    }

    /// Expand every node tagged with the given cycle, in pre-order
    pub fn reconstruct_thread(&self, cycle: i64) -> Vec<String> {
        self.reconstructor
            .reconstruct_thread(&SnapshotNode::from(&self.root), cycle)
    }

    /// Expand a single wire node with this tree's traversal limits
    pub fn reconstruct_node(&self, node: &SnapshotNode) -> Vec<String> {
        self.reconstructor.reconstruct_node(node)
    }

    /// Write the current snapshot to disk, replacing any previous file
    pub fn save(&self, path: &Path) -> SdkResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        fs::write(path, json)?;
        debug!(path = %path.display(), "memory snapshot saved");
        Ok(())
    }

    /// Read a snapshot from disk and verify it (advisory).
    ///
    /// The returned tree is usable whatever the integrity status says;
    /// mismatches are annotated and logged, never raised.
    pub fn load(&self, path: &Path) -> SdkResult<(SnapshotNode, IntegrityStatus)> {
        let content = fs::read_to_string(path)?;
        let snapshot: SnapshotFile = serde_json::from_str(&content)?;

        let status = self
            .hasher
            .verify_snapshot(&snapshot.integrity, &snapshot.tree)?;

        if !status.is_ok() {
            warn!(path = %path.display(), %status, "snapshot integrity verification failed");
        } else {
            debug!(path = %path.display(), "memory snapshot loaded");
        }

        Ok((snapshot.tree, status))
    }

    /// Purify text with this tree's validation policy
    pub fn purify(&self, text: &str) -> String {
        self.gate.purify(text)
    }

    /// Structural admission check with this tree's validation policy
    pub fn admit(
        &self,
        role: Role,
        cycle: i64,
        child_count: usize,
        depth: usize,
    ) -> Result<(), RejectionReason> {
        self.gate.admit(role, cycle, child_count, depth)
    }

    /// Whitelist check for externally invoked operation names
    pub fn validate_intent(&self, name: &str) -> bool {
        self.gate.validate_intent(name)
    }

    /// Sigil priority score of the given text
    pub fn score(&self, text: &str) -> i64 {
        self.scorer.score(text)
    }

    /// Identity report for the anchor that stamps this tree
    pub fn signature(&self) -> IdentitySignature {
        self.hasher.signature()
    }
}
