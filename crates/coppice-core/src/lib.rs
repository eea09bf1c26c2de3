//! coppice-core - Tree engine for append-only conversational memory
//!
//! This crate provides the structural machinery the Coppice SDK is built
//! on:
//!
//! - **node**: roles, compression tiers, per-tier payloads, the owned tree
//! - **gate**: admission policy and deterministic text scrubbing
//! - **sigil**: priority scoring from inline markers, plus marker telemetry
//! - **collapse**: one-way, gate-bound seed compression
//! - **reconstruct**: deterministic read-only projection of seeds into text
//! - **integrity**: kernel/memory digests and advisory verification
//! - **snapshot**: the persisted wire format with safe field defaults
//! - **config**: explicitly constructed, explicitly passed policies
//!
//! Everything here is synchronous and single-writer by design: no
//! operation suspends or blocks on I/O mid-traversal, and every traversal
//! is bounded by write-time admission limits plus read-time defenses.

pub mod collapse;
pub mod config;
pub mod error;
pub mod gate;
pub mod integrity;
pub mod node;
pub mod reconstruct;
pub mod sigil;
pub mod snapshot;

// Re-export commonly used types
pub use collapse::{BLOCKED_SEED, CollapseEngine};
pub use config::{
    CollapsePolicy, ConfigValidationError, TraversalPolicy, ValidationPolicy,
};
pub use error::{Error, RejectionReason, Result};
pub use gate::ValidationGate;
pub use integrity::{IdentitySignature, IntegrityHasher, IntegrityStatus};
pub use node::{CompressionTier, MemoryNode, NodePayload, Role};
pub use reconstruct::{ReconstructionEngine, SIGIL_PLACEHOLDER};
pub use sigil::{SigilClass, SigilRegistry, SigilScorer};
pub use snapshot::{IntegrityRecord, SnapshotFile, SnapshotNode};
