//! Coppice SDK - Embeddable Append-Only Conversational Memory
//!
//! Coppice keeps a hierarchical memory of conversational exchanges and
//! progressively replaces raw content with compact derived seeds under
//! policy control. Seeds re-expand deterministically into readable text
//! without access to the original content; collapse is one-way by design.
//!
//! # Core Modules (from coppice-core)
//!
//! - **node** - roles, compression tiers, per-tier payloads, the owned tree
//! - **gate** - admission policy and deterministic text scrubbing
//! - **sigil** - priority scoring from inline markers, marker telemetry
//! - **collapse** - one-way, gate-bound seed compression
//! - **reconstruct** - deterministic projection of seeds into text
//! - **integrity** - kernel/memory digests and advisory verification
//! - **snapshot** - persisted wire format with safe field defaults
//!
//! # SDK Modules
//!
//! - **tree** - the `MemoryTree` facade: ingest, save/load, reconstruction
//! - **config** - `SdkConfig` bundling the anchor name and engine policies
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use coppice_sdk::{MemoryTree, SdkConfig};
//!
//! fn example() -> anyhow::Result<()> {
//!     let mut tree = MemoryTree::new(SdkConfig::default())?;
//!
//!     // Ingest one exchange under cycle 3; it collapses to seeds on entry
//!     tree.ingest(
//!         "I feel overwhelmed. How do I stabilize?",
//!         "Stability is found through structured descent.",
//!         3,
//!     )?;
//!
//!     // Deterministic, read-only projection back into text
//!     println!("{}", tree.reconstruct_full());
//!     for line in tree.reconstruct_thread(3) {
//!         println!("{line}");
//!     }
//!
//!     tree.save(Path::new("coppice_memory.json"))?;
//!     Ok(())
//! }
//! ```
//!
//! There is no network surface and no internal locking: a tree has exactly
//! one writer, and callers serialize concurrent mutation themselves.

// ─────────────────────────────────────────────────────────────────────────────
// Re-export core modules from coppice-core
// ─────────────────────────────────────────────────────────────────────────────

/// One-way, gate-bound seed compression
pub use coppice_core::collapse;

/// Engine policies
pub use coppice_core::config as core_config;

/// Core error types
pub use coppice_core::error as core_error;

/// Admission policy and text scrubbing
pub use coppice_core::gate;

/// Integrity digests and advisory verification
pub use coppice_core::integrity;

/// Roles, tiers, payloads, the owned tree
pub use coppice_core::node;

/// Deterministic seed expansion
pub use coppice_core::reconstruct;

/// Priority scoring and marker telemetry
pub use coppice_core::sigil;

/// Persisted wire format
pub use coppice_core::snapshot;

// ─────────────────────────────────────────────────────────────────────────────
// SDK-specific modules
// ─────────────────────────────────────────────────────────────────────────────

mod config;
mod error;
mod tree;

// Re-export main SDK types
pub use config::SdkConfig;
pub use error::{SdkError, SdkResult};
pub use tree::{IngestAck, MemoryTree};

// Re-export the core surface external callers work with
pub use coppice_core::{
    BLOCKED_SEED, CollapseEngine, CollapsePolicy, CompressionTier, IdentitySignature,
    IntegrityHasher, IntegrityRecord, IntegrityStatus, MemoryNode, NodePayload,
    ReconstructionEngine, RejectionReason, Role, SIGIL_PLACEHOLDER, SigilClass,
    SigilRegistry, SigilScorer, SnapshotFile, SnapshotNode, TraversalPolicy,
    ValidationGate, ValidationPolicy,
};
