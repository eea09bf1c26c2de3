//! Integrity hashing and advisory verification.
//!
//! Two digests bind the engine and its memory together: the kernel digest
//! fingerprints the active policies (computed once at boot), the memory
//! digest fingerprints the serialized tree (recomputed after every
//! successful ingestion). Verification is advisory: a mismatch names the
//! component that failed and is annotated on the read, but never blocks it.

use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::{CollapsePolicy, TraversalPolicy, ValidationPolicy};
use crate::error::Result;
use crate::snapshot::{IntegrityRecord, SnapshotNode};

/// Engine version folded into the kernel digest
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// SHA-256 digest of the given bytes as a hex string
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Canonical, key-order-independent JSON for hashing.
///
/// Serializing through `serde_json::Value` sorts object keys, so two
/// snapshots that differ only in field order hash identically.
fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value)?;
    Ok(serde_json::to_string(&value)?)
}

/// The engine definition the kernel digest is computed over
#[derive(Serialize)]
struct KernelDefinition<'a> {
    engine_version: &'a str,
    validation: &'a ValidationPolicy,
    collapse: &'a CollapsePolicy,
    traversal: &'a TraversalPolicy,
}

/// Outcome of advisory integrity verification.
///
/// Only `Verified` is clean; every other variant is a warning, not an
/// error, and the tree stays fully usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityStatus {
    Verified,
    /// The snapshot carries no integrity stamps to compare against
    Unstamped,
    KernelMismatch,
    MemoryMismatch,
}

impl IntegrityStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Verified)
    }
}

impl std::fmt::Display for IntegrityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Verified => "OK",
            Self::Unstamped => "WARNING: no integrity stamps present",
            Self::KernelMismatch => "WARNING: kernel digest mismatch",
            Self::MemoryMismatch => "WARNING: memory digest mismatch",
        };
        write!(f, "{text}")
    }
}

/// Identity report proving which anchor stamped an archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentitySignature {
    pub anchor: String,
    pub identity_key: String,
    pub boot_timestamp: String,
}

/// Digest holder for one memory tree.
#[derive(Debug, Clone)]
pub struct IntegrityHasher {
    anchor: String,
    boot_timestamp: String,
    identity_key: String,
    kernel_digest: String,
    memory_digest: Option<String>,
}

impl IntegrityHasher {
    /// Create a hasher anchored to the given name, computing the kernel
    /// digest from the active policies once at boot.
    pub fn new(
        anchor: impl Into<String>,
        validation: &ValidationPolicy,
        collapse: &CollapsePolicy,
        traversal: &TraversalPolicy,
    ) -> Result<Self> {
        let anchor = anchor.into();
        let boot_timestamp = Utc::now().to_rfc3339();
        let identity_key = sha256_hex(format!("{anchor}:{boot_timestamp}").as_bytes());

        let definition = KernelDefinition {
            engine_version: ENGINE_VERSION,
            validation,
            collapse,
            traversal,
        };
        let kernel_digest = sha256_hex(canonical_json(&definition)?.as_bytes());

        Ok(Self {
            anchor,
            boot_timestamp,
            identity_key,
            kernel_digest,
            memory_digest: None,
        })
    }

    /// Recompute and hold the memory digest for the given tree
    pub fn stamp_tree(&mut self, tree: &SnapshotNode) -> Result<String> {
        let digest = sha256_hex(canonical_json(tree)?.as_bytes());
        self.memory_digest = Some(digest.clone());
        Ok(digest)
    }

    pub fn kernel_digest(&self) -> &str {
        &self.kernel_digest
    }

    pub fn memory_digest(&self) -> Option<&str> {
        self.memory_digest.as_deref()
    }

    pub fn identity_key(&self) -> &str {
        &self.identity_key
    }

    pub fn boot_timestamp(&self) -> &str {
        &self.boot_timestamp
    }

    /// Compare stored stamps against the held digests.
    ///
    /// The kernel digest is checked first, so a double mismatch names the
    /// kernel. Advisory only: callers annotate the result, nothing blocks.
    pub fn verify(
        &self,
        expected_kernel: Option<&str>,
        expected_memory: Option<&str>,
    ) -> IntegrityStatus {
        let (Some(kernel), Some(memory)) = (expected_kernel, expected_memory) else {
            return IntegrityStatus::Unstamped;
        };
        if kernel != self.kernel_digest {
            return IntegrityStatus::KernelMismatch;
        }
        if Some(memory) != self.memory_digest.as_deref() {
            return IntegrityStatus::MemoryMismatch;
        }
        IntegrityStatus::Verified
    }

    /// Verify a persisted snapshot against this hasher.
    ///
    /// The kernel stamp is compared against the held kernel digest; the
    /// memory stamp is compared against a digest recomputed from the
    /// snapshot's own tree, which detects tampering even in a process that
    /// has not ingested anything yet. Kernel is checked first.
    pub fn verify_snapshot(
        &self,
        record: &IntegrityRecord,
        tree: &SnapshotNode,
    ) -> Result<IntegrityStatus> {
        let expected_kernel =
            (!record.kernel_digest.is_empty()).then_some(record.kernel_digest.as_str());
        let (Some(kernel), Some(memory)) = (expected_kernel, record.memory_digest.as_deref())
        else {
            return Ok(IntegrityStatus::Unstamped);
        };
        if kernel != self.kernel_digest {
            return Ok(IntegrityStatus::KernelMismatch);
        }
        let recomputed = sha256_hex(canonical_json(tree)?.as_bytes());
        if memory != recomputed {
            return Ok(IntegrityStatus::MemoryMismatch);
        }
        Ok(IntegrityStatus::Verified)
    }

    /// Identity report for this hasher's anchor
    pub fn signature(&self) -> IdentitySignature {
        IdentitySignature {
            anchor: self.anchor.clone(),
            identity_key: self.identity_key.clone(),
            boot_timestamp: self.boot_timestamp.clone(),
        }
    }

    /// The integrity record written alongside a snapshot
    pub fn record(&self) -> IntegrityRecord {
        IntegrityRecord {
            kernel_digest: self.kernel_digest.clone(),
            memory_digest: self.memory_digest.clone(),
            identity_key: self.identity_key.clone(),
            boot_timestamp: self.boot_timestamp.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> IntegrityHasher {
        IntegrityHasher::new(
            "warden",
            &ValidationPolicy::default(),
            &CollapsePolicy::default(),
            &TraversalPolicy::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_sha256_hex_known_vector() {
        // Known SHA-256 hash for "hello"
        assert_eq!(
            sha256_hex(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(sha256_hex(b"hello").len(), 64);
    }

    #[test]
    fn test_kernel_digest_depends_on_policy() {
        let a = hasher();
        let b = IntegrityHasher::new(
            "warden",
            &ValidationPolicy {
                max_depth: 64,
                ..Default::default()
            },
            &CollapsePolicy::default(),
            &TraversalPolicy::default(),
        )
        .unwrap();

        assert_ne!(a.kernel_digest(), b.kernel_digest());
    }

    #[test]
    fn test_identity_key_binds_anchor_and_boot() {
        let h = hasher();
        let expected = sha256_hex(format!("warden:{}", h.boot_timestamp()).as_bytes());
        assert_eq!(h.identity_key(), expected);
    }

    #[test]
    fn test_stamp_tree_changes_with_content() {
        let mut h = hasher();
        let tree_a = SnapshotNode {
            id: "a".into(),
            content: Some("one".into()),
            ..Default::default()
        };
        let tree_b = SnapshotNode {
            id: "a".into(),
            content: Some("two".into()),
            ..Default::default()
        };

        let first = h.stamp_tree(&tree_a).unwrap().to_string();
        let second = h.stamp_tree(&tree_b).unwrap().to_string();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_ok_and_first_mismatch_named() {
        let mut h = hasher();
        h.stamp_tree(&SnapshotNode::default()).unwrap();

        let kernel = h.kernel_digest().to_string();
        let memory = h.memory_digest().unwrap().to_string();

        assert_eq!(
            h.verify(Some(&kernel), Some(&memory)),
            IntegrityStatus::Verified
        );
        assert_eq!(
            h.verify(Some("tampered"), Some(&memory)),
            IntegrityStatus::KernelMismatch
        );
        assert_eq!(
            h.verify(Some(&kernel), Some("tampered")),
            IntegrityStatus::MemoryMismatch
        );
        // Both wrong: kernel is named first
        assert_eq!(
            h.verify(Some("tampered"), Some("tampered")),
            IntegrityStatus::KernelMismatch
        );
        assert_eq!(h.verify(None, None), IntegrityStatus::Unstamped);
    }

    #[test]
    fn test_verify_is_advisory_data_not_error() {
        let h = hasher();
        let status = h.verify(Some("junk"), Some("junk"));
        assert!(!status.is_ok());
        assert!(status.to_string().starts_with("WARNING"));
    }

    #[test]
    fn test_verify_snapshot_detects_tree_tamper() {
        let mut h = hasher();
        let tree = SnapshotNode {
            id: "a".into(),
            content: Some("stored".into()),
            ..Default::default()
        };
        h.stamp_tree(&tree).unwrap();
        let record = h.record();

        assert_eq!(
            h.verify_snapshot(&record, &tree).unwrap(),
            IntegrityStatus::Verified
        );

        let edited = SnapshotNode {
            content: Some("edited".into()),
            ..tree.clone()
        };
        assert_eq!(
            h.verify_snapshot(&record, &edited).unwrap(),
            IntegrityStatus::MemoryMismatch
        );

        let foreign = IntegrityRecord {
            kernel_digest: "not-this-kernel".into(),
            ..record.clone()
        };
        assert_eq!(
            h.verify_snapshot(&foreign, &tree).unwrap(),
            IntegrityStatus::KernelMismatch
        );

        assert_eq!(
            h.verify_snapshot(&IntegrityRecord::default(), &tree).unwrap(),
            IntegrityStatus::Unstamped
        );
    }

    #[test]
    fn test_record_mirrors_held_digests() {
        let mut h = hasher();
        h.stamp_tree(&SnapshotNode::default()).unwrap();
        let record = h.record();

        assert_eq!(record.kernel_digest, h.kernel_digest());
        assert_eq!(record.memory_digest.as_deref(), h.memory_digest());
        assert_eq!(record.identity_key, h.identity_key());
    }
}
