//! Memory node model.
//!
//! A memory tree is built from [`MemoryNode`] values that exclusively own
//! their children; there are no shared pointers and no back-edges, so a tree
//! built through ingestion is acyclic by construction. What a node retains
//! is described by a closed per-tier payload union, which keeps
//! reconstruction dispatch exhaustive instead of branching on runtime-absent
//! fields.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::sigil::SigilScorer;

/// Speaker role of a memory node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    System,
    User,
    Ai,
    /// Fallback for malformed snapshots; never admitted by the gate.
    Unknown,
}

impl Role {
    /// Convert from string; unrecognized names map to `Unknown`
    pub fn from_str(s: &str) -> Self {
        match s {
            "system" => Self::System,
            "user" => Self::User,
            "ai" => Self::Ai,
            _ => Self::Unknown,
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Ai => "ai",
            Self::Unknown => "unknown",
        }
    }

    /// Whether this role belongs to the fixed admissible set
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compression tier, in strictly decreasing fidelity.
///
/// The derived order follows declaration order, so "tier only ever
/// advances" is expressible as `after >= before`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CompressionTier {
    Raw,
    Summary,
    Seed,
    SigilOnly,
}

impl CompressionTier {
    /// Convert from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "raw" => Some(Self::Raw),
            "summary" => Some(Self::Summary),
            "seed" => Some(Self::Seed),
            "sigil_only" => Some(Self::SigilOnly),
            _ => None,
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Summary => "summary",
            Self::Seed => "seed",
            Self::SigilOnly => "sigil_only",
        }
    }
}

impl std::fmt::Display for CompressionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a node retains at its current compression tier.
///
/// One fixed-shape variant per tier: raw text only, truncated text plus a
/// seed, seed only, or nothing at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodePayload {
    Raw { content: String },
    Summary { content: String, seed: String },
    Seed { seed: String },
    SigilOnly,
}

impl NodePayload {
    /// The tier this payload shape belongs to
    pub fn tier(&self) -> CompressionTier {
        match self {
            Self::Raw { .. } => CompressionTier::Raw,
            Self::Summary { .. } => CompressionTier::Summary,
            Self::Seed { .. } => CompressionTier::Seed,
            Self::SigilOnly => CompressionTier::SigilOnly,
        }
    }

    /// Retained raw or truncated content, if any
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Raw { content } | Self::Summary { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Synthesized structural seed, if any
    pub fn seed(&self) -> Option<&str> {
        match self {
            Self::Summary { seed, .. } | Self::Seed { seed } => Some(seed),
            _ => None,
        }
    }
}

/// One entry in the memory tree: a message or structural unit.
#[derive(Debug, Clone)]
pub struct MemoryNode {
    /// Stable node id (8-char uuid prefix)
    pub id: String,
    /// Creation time; not persisted
    pub created_at: DateTime<Utc>,
    pub role: Role,
    /// Cycle tag grouping nodes into a conversational epoch
    pub cycle: i64,
    /// Sigil-derived importance weight
    pub priority: i64,
    pub payload: NodePayload,
    /// Exclusively owned children, in insertion order
    pub children: Vec<MemoryNode>,
}

impl MemoryNode {
    /// Create a raw-tier node from freshly ingested content
    pub fn new(role: Role, content: impl Into<String>, cycle: i64) -> Self {
        Self {
            id: short_id(),
            created_at: Utc::now(),
            role,
            cycle,
            priority: 0,
            payload: NodePayload::Raw {
                content: content.into(),
            },
            children: Vec::new(),
        }
    }

    /// The node's current compression tier
    pub fn tier(&self) -> CompressionTier {
        self.payload.tier()
    }

    /// Retained content, if any
    pub fn content(&self) -> Option<&str> {
        self.payload.content()
    }

    /// Structural seed, if any
    pub fn seed(&self) -> Option<&str> {
        self.payload.seed()
    }

    /// Whether raw content has been irreversibly replaced by a seed
    pub fn is_collapsed(&self) -> bool {
        self.tier() >= CompressionTier::Seed
    }

    /// Append a child in insertion order
    pub fn push_child(&mut self, child: MemoryNode) {
        self.children.push(child);
    }

    /// Score this node's priority from its retained content
    pub fn score_priority(&mut self, scorer: &SigilScorer) -> i64 {
        self.priority = scorer.score(self.content().unwrap_or_default());
        self.priority
    }

    /// Count of nodes in this subtree, self included
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(MemoryNode::subtree_len).sum::<usize>()
    }
}

/// 8-char uuid prefix, the node id format used throughout
fn short_id() -> String {
    Uuid::new_v4().to_string().chars().take(8).collect()
}
