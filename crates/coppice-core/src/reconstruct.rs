//! Reconstruction engine.
//!
//! Reconstruction is the read-only projection of stored seeds back into
//! readable text. It is purely structural: a seed expands by stripping its
//! recognized tag, never by inferring content. The engine operates on
//! snapshot nodes so it works identically on live trees, loaded files, and
//! untrusted input; walks over the latter are defended by a depth ceiling
//! and a visited-id set.

use std::collections::HashSet;

use tracing::warn;

use crate::config::TraversalPolicy;
use crate::node::CompressionTier;
use crate::snapshot::SnapshotNode;

/// Line rendered for sigil-only nodes, which retain no content at all
pub const SIGIL_PLACEHOLDER: &str = "[Sigil anchor: reconstruction required]";

/// Line rendered when a node declares a tier this engine does not know
pub const UNKNOWN_TIER_FALLBACK: &str = "[Unknown compression state]";

/// Rendered when a seed is absent
pub const NO_SEED: &str = "(no seed)";

/// Deterministic, stateless seed expansion and tree projection.
#[derive(Debug, Clone)]
pub struct ReconstructionEngine {
    policy: TraversalPolicy,
}

impl ReconstructionEngine {
    /// Create an engine with the given read-time limits
    pub fn new(policy: TraversalPolicy) -> Self {
        Self { policy }
    }

    /// Expand a seed into a readable statement.
    ///
    /// Recognized tag prefixes (`[AC-n]` and `[Seed AC-n]:`) are stripped
    /// and rendered as `(tag) -> body`; anything else is surfaced as-is
    /// behind an `(expanded)` marker. This never recreates original text,
    /// only restores structure.
    pub fn expand_seed(&self, seed: Option<&str>) -> String {
        let Some(seed) = seed else {
            return NO_SEED.into();
        };

        if seed.starts_with("[AC-") {
            if let Some(end) = seed.find(']') {
                let tag = &seed[1..end];
                let body = seed[end + 1..].trim_start();
                return format!("({tag}) -> {body}");
            }
        }

        if seed.starts_with("[Seed AC-") {
            if let Some(end) = seed.find("]:") {
                let tag = &seed[1..end];
                let body = seed[end + 2..].trim_start();
                return format!("({tag}) -> {body}");
            }
        }

        format!("(expanded) {seed}")
    }

    /// Expand a single node, dispatching on its compression tier.
    ///
    /// Raw and summary nodes expand with their whole subtree; seed nodes
    /// produce exactly one line; sigil-only nodes produce the fixed
    /// placeholder, revealing nothing. Unknown tiers fall back to a fixed
    /// defensive line and never fail.
    pub fn reconstruct_node(&self, node: &SnapshotNode) -> Vec<String> {
        let mut visited = HashSet::new();
        self.render(node, 0, &mut visited)
    }

    /// Expand the entire tree root-down into one readable block
    pub fn reconstruct_full(&self, tree: &SnapshotNode) -> String {
        self.reconstruct_node(tree).join("\n")
    }

    /// Expand every node tagged with the given cycle.
    ///
    /// The whole tree is walked regardless of shape; matches are collected
    /// in pre-order traversal order, not grouped or re-sorted, and each is
    /// expanded independently of its ancestors.
    pub fn reconstruct_thread(&self, tree: &SnapshotNode, cycle: i64) -> Vec<String> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        self.collect_thread(tree, cycle, 0, &mut visited, &mut out);
        out
    }

    fn render(
        &self,
        node: &SnapshotNode,
        depth: usize,
        visited: &mut HashSet<String>,
    ) -> Vec<String> {
        let indent = "  ".repeat(depth);

        if let Some(line) = self.guard(node, depth, visited, &indent) {
            return vec![line];
        }

        match node.compression_tier() {
            Some(CompressionTier::Raw) | Some(CompressionTier::Summary) => {
                let mut out = vec![self.node_line(node, &indent)];
                for child in &node.children {
                    out.extend(self.render(child, depth + 1, visited));
                }
                out
            }
            Some(CompressionTier::Seed) => {
                vec![format!(
                    "{indent}[AC-{}] {}: {}",
                    node.cycle,
                    node.role.to_uppercase(),
                    self.expand_seed(node.seed.as_deref())
                )]
            }
            Some(CompressionTier::SigilOnly) => {
                vec![format!(
                    "{indent}[AC-{}] {}: {SIGIL_PLACEHOLDER}",
                    node.cycle,
                    node.role.to_uppercase()
                )]
            }
            None => {
                vec![format!(
                    "{indent}[AC-{}] {}: {UNKNOWN_TIER_FALLBACK}",
                    node.cycle,
                    node.role.to_uppercase()
                )]
            }
        }
    }

    /// One indented line for a raw/summary node, expanding seed or content
    fn node_line(&self, node: &SnapshotNode, indent: &str) -> String {
        let source = node.seed.as_deref().or(node.content.as_deref());
        format!(
            "{indent}[AC-{}] {}: {}",
            node.cycle,
            node.role.to_uppercase(),
            self.expand_seed(source)
        )
    }

    /// Read-path defenses: repeated ids and the depth ceiling truncate the
    /// branch with a warning line instead of aborting or looping.
    fn guard(
        &self,
        node: &SnapshotNode,
        depth: usize,
        visited: &mut HashSet<String>,
        indent: &str,
    ) -> Option<String> {
        if !node.id.is_empty() && !visited.insert(node.id.clone()) {
            warn!(node = %node.id, "cycle detected during reconstruction; branch truncated");
            return Some(format!(
                "{indent}[Cycle detected at node {}; branch truncated]",
                node.id
            ));
        }
        if depth > self.policy.max_read_depth {
            warn!(
                limit = self.policy.max_read_depth,
                "traversal depth ceiling reached; branch truncated"
            );
            return Some(format!(
                "{indent}[Traversal halted: depth limit {} reached]",
                self.policy.max_read_depth
            ));
        }
        None
    }

    fn collect_thread(
        &self,
        node: &SnapshotNode,
        cycle: i64,
        depth: usize,
        visited: &mut HashSet<String>,
        out: &mut Vec<String>,
    ) {
        if self.guard(node, depth, visited, "").is_some() {
            return;
        }
        if node.cycle == cycle {
            out.extend(self.reconstruct_node(node));
        }
        for child in &node.children {
            self.collect_thread(child, cycle, depth + 1, visited, out);
        }
    }
}

impl Default for ReconstructionEngine {
    fn default() -> Self {
        Self::new(TraversalPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_node(id: &str, role: &str, cycle: i64, seed: &str) -> SnapshotNode {
        SnapshotNode {
            id: id.into(),
            role: role.into(),
            cycle,
            seed: Some(seed.into()),
            tier: "seed".into(),
            collapsed: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_expand_seed_variants() {
        let engine = ReconstructionEngine::default();

        assert_eq!(engine.expand_seed(None), "(no seed)");
        assert_eq!(
            engine.expand_seed(Some("[AC-3] descent holds...")),
            "(AC-3) -> descent holds..."
        );
        assert_eq!(
            engine.expand_seed(Some("[Seed AC-12]: early fragment...")),
            "(Seed AC-12) -> early fragment..."
        );
        assert_eq!(
            engine.expand_seed(Some("plain verbatim seed")),
            "(expanded) plain verbatim seed"
        );
        // Malformed tag without a closing bracket falls through
        assert_eq!(
            engine.expand_seed(Some("[AC-3 broken")),
            "(expanded) [AC-3 broken"
        );
    }

    #[test]
    fn test_seed_tier_is_single_line_without_recursion() {
        let mut node = seed_node("n1", "user", 4, "[AC-4] kept...");
        node.children.push(seed_node("n2", "ai", 4, "child"));

        let engine = ReconstructionEngine::default();
        let lines = engine.reconstruct_node(&node);
        assert_eq!(lines, vec!["[AC-4] USER: (AC-4) -> kept...".to_string()]);
    }

    #[test]
    fn test_sigil_only_reveals_nothing() {
        let node = SnapshotNode {
            id: "s1".into(),
            role: "ai".into(),
            cycle: 8,
            // Content smuggled into the wrong tier must never surface
            content: Some("must stay hidden".into()),
            seed: Some("also hidden".into()),
            tier: "sigil_only".into(),
            ..Default::default()
        };

        let lines = ReconstructionEngine::default().reconstruct_node(&node);
        assert_eq!(lines, vec![format!("[AC-8] AI: {SIGIL_PLACEHOLDER}")]);
    }

    #[test]
    fn test_unknown_tier_falls_back() {
        let node = SnapshotNode {
            role: "user".into(),
            cycle: 2,
            tier: "vapor".into(),
            ..Default::default()
        };

        let lines = ReconstructionEngine::default().reconstruct_node(&node);
        assert_eq!(lines, vec![format!("[AC-2] USER: {UNKNOWN_TIER_FALLBACK}")]);
    }

    #[test]
    fn test_raw_walk_indents_two_spaces_per_level() {
        let tree = SnapshotNode {
            id: "root".into(),
            role: "system".into(),
            cycle: 1,
            content: Some("root node".into()),
            children: vec![SnapshotNode {
                id: "c1".into(),
                role: "user".into(),
                cycle: 3,
                content: Some("a question".into()),
                children: vec![SnapshotNode {
                    id: "c2".into(),
                    role: "ai".into(),
                    cycle: 3,
                    content: Some("an answer".into()),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        };

        let text = ReconstructionEngine::default().reconstruct_full(&tree);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "[AC-1] SYSTEM: (expanded) root node");
        assert_eq!(lines[1], "  [AC-3] USER: (expanded) a question");
        assert_eq!(lines[2], "    [AC-3] AI: (expanded) an answer");
    }

    #[test]
    fn test_thread_collects_matches_in_preorder() {
        let tree = SnapshotNode {
            id: "root".into(),
            role: "system".into(),
            cycle: 1,
            tier: "seed".into(),
            seed: Some("root".into()),
            children: vec![
                seed_node("a", "user", 3, "first match"),
                seed_node("b", "user", 5, "not this one"),
                seed_node("c", "ai", 3, "second match"),
            ],
            ..Default::default()
        };

        let engine = ReconstructionEngine::default();
        let lines = engine.reconstruct_thread(&tree, 3);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("first match"));
        assert!(lines[1].contains("second match"));

        assert!(engine.reconstruct_thread(&tree, 7).is_empty());
    }

    #[test]
    fn test_duplicate_ids_truncate_with_warning_line() {
        let dup = seed_node("same-id", "user", 2, "twin");
        let tree = SnapshotNode {
            id: "root".into(),
            role: "system".into(),
            cycle: 1,
            content: Some("root".into()),
            children: vec![dup.clone(), dup],
            ..Default::default()
        };

        let lines = ReconstructionEngine::default().reconstruct_node(&tree);
        // Root, first twin, then the truncation notice for the second
        assert_eq!(lines.len(), 3);
        assert!(lines[2].contains("Cycle detected at node same-id"));
    }

    #[test]
    fn test_depth_ceiling_truncates_deep_chains() {
        // Chain of raw nodes deeper than the read ceiling
        let mut node = SnapshotNode {
            id: "leaf".into(),
            role: "user".into(),
            cycle: 1,
            content: Some("deepest".into()),
            ..Default::default()
        };
        for i in 0..60 {
            node = SnapshotNode {
                id: format!("n{i}"),
                role: "user".into(),
                cycle: 1,
                content: Some(format!("level {i}")),
                children: vec![node],
                ..Default::default()
            };
        }

        let engine = ReconstructionEngine::new(TraversalPolicy { max_read_depth: 50 });
        let text = engine.reconstruct_full(&node);
        assert!(text.contains("[Traversal halted: depth limit 50 reached]"));
        assert!(!text.contains("deepest"));
    }

    #[test]
    fn test_thread_walk_survives_duplicate_ids() {
        let dup = seed_node("same", "user", 9, "echo");
        let tree = SnapshotNode {
            id: "root".into(),
            role: "system".into(),
            cycle: 1,
            content: Some("root".into()),
            children: vec![dup.clone(), dup],
            ..Default::default()
        };

        // Second occurrence is truncated by the outer walk, so one match
        let lines = ReconstructionEngine::default().reconstruct_thread(&tree, 9);
        assert_eq!(lines.len(), 1);
    }
}
