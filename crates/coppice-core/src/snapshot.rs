//! Persisted snapshot types.
//!
//! The wire format is deliberately flat and forgiving: every field defaults
//! safely, so a malformed or hand-edited snapshot degrades instead of
//! failing to parse. Reconstruction operates directly on these types and
//! never needs the live tree. The legacy `collapsed` flag is written
//! alongside `tier` for snapshots produced by earlier iterations that had
//! no tier field.

use serde::{Deserialize, Serialize};

use crate::node::{CompressionTier, MemoryNode, NodePayload, Role};

/// One node of a persisted tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    #[serde(default)]
    pub id: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub cycle: i64,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub seed: Option<String>,
    #[serde(default)]
    pub priority: i64,
    #[serde(default = "default_tier")]
    pub tier: String,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default)]
    pub children: Vec<SnapshotNode>,
}

fn default_role() -> String {
    Role::Unknown.as_str().into()
}

fn default_tier() -> String {
    CompressionTier::Raw.as_str().into()
}

impl Default for SnapshotNode {
    fn default() -> Self {
        Self {
            id: String::new(),
            role: default_role(),
            cycle: 0,
            content: None,
            seed: None,
            priority: 0,
            tier: default_tier(),
            collapsed: false,
            children: Vec::new(),
        }
    }
}

impl SnapshotNode {
    /// The tier this node declares, if recognized
    pub fn compression_tier(&self) -> Option<CompressionTier> {
        CompressionTier::from_str(&self.tier)
    }

    /// Rebuild an owned in-memory node from this wire node.
    ///
    /// Unrecognized tier strings and legacy snapshots that carry only the
    /// `collapsed` flag are mapped from whichever of content/seed is
    /// actually present; nothing here can fail.
    pub fn to_node(&self) -> MemoryNode {
        let payload = match self.compression_tier() {
            Some(CompressionTier::Summary) => NodePayload::Summary {
                content: self.content.clone().unwrap_or_default(),
                seed: self.seed.clone().unwrap_or_default(),
            },
            Some(CompressionTier::Seed) => NodePayload::Seed {
                seed: self.seed.clone().unwrap_or_default(),
            },
            Some(CompressionTier::SigilOnly) => NodePayload::SigilOnly,
            Some(CompressionTier::Raw) | None => match (&self.content, &self.seed) {
                (Some(content), Some(seed)) if self.collapsed => NodePayload::Summary {
                    content: content.clone(),
                    seed: seed.clone(),
                },
                (None, Some(seed)) => NodePayload::Seed { seed: seed.clone() },
                _ => NodePayload::Raw {
                    content: self.content.clone().unwrap_or_default(),
                },
            },
        };

        let mut node = MemoryNode::new(Role::from_str(&self.role), "", self.cycle);
        if !self.id.is_empty() {
            node.id = self.id.clone();
        }
        node.priority = self.priority;
        node.payload = payload;
        node.children = self.children.iter().map(SnapshotNode::to_node).collect();
        node
    }
}

impl From<&MemoryNode> for SnapshotNode {
    fn from(node: &MemoryNode) -> Self {
        Self {
            id: node.id.clone(),
            role: node.role.as_str().into(),
            cycle: node.cycle,
            content: node.content().map(str::to_owned),
            seed: node.seed().map(str::to_owned),
            priority: node.priority,
            tier: node.tier().as_str().into(),
            collapsed: node.is_collapsed(),
            children: node.children.iter().map(SnapshotNode::from).collect(),
        }
    }
}

/// Integrity stamps written alongside every snapshot.
///
/// Advisory only: verification annotates the load, it never blocks it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegrityRecord {
    #[serde(default)]
    pub kernel_digest: String,
    #[serde(default)]
    pub memory_digest: Option<String>,
    #[serde(default)]
    pub identity_key: String,
    #[serde(default)]
    pub boot_timestamp: String,
}

/// A complete persisted snapshot: integrity stamps plus the wire tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotFile {
    #[serde(default)]
    pub integrity: IntegrityRecord,
    #[serde(default)]
    pub tree: SnapshotNode,
}
