//! Sigil priority scoring and marker telemetry.
//!
//! Sigils are inline markers (💠, ✨, •) that flag how much a message
//! matters. The scorer turns marker occurrences into a node priority; the
//! registry is a side channel for aggregate marker statistics and never
//! feeds back into collapse decisions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pure symbol-weight scorer.
///
/// `score` sums `occurrences(symbol) * weight` over the table, counting
/// repeats. The default table maps 💠 to 3, ✨ to 2 and • to 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigilScorer {
    /// Symbol-to-weight table consulted by `score`
    pub weights: Vec<(String, i64)>,
}

impl Default for SigilScorer {
    fn default() -> Self {
        Self {
            weights: vec![("💠".into(), 3), ("✨".into(), 2), ("•".into(), 1)],
        }
    }
}

impl SigilScorer {
    /// Importance score of the given text
    pub fn score(&self, text: &str) -> i64 {
        self.weights
            .iter()
            .map(|(symbol, weight)| text.matches(symbol.as_str()).count() as i64 * weight)
            .sum()
    }
}

/// Sigil significance class, P0 (critical) through P4 (ambient).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SigilClass {
    Critical,
    High,
    Medium,
    Low,
    Ambient,
}

impl SigilClass {
    /// Recall-gravity weight of this class
    pub fn weight(&self) -> f64 {
        match self {
            Self::Critical => 1.0,
            Self::High => 0.65,
            Self::Medium => 0.35,
            Self::Low => 0.15,
            Self::Ambient => 0.05,
        }
    }
}

/// One registered marker sighting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigilMark {
    pub symbol: String,
    pub class: SigilClass,
    pub seen_at: DateTime<Utc>,
}

/// Aggregate registry statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigilSummary {
    pub total_marks: usize,
    pub critical_count: usize,
    pub density: f64,
    pub retention_extension_days: f64,
    pub symbols: Vec<String>,
}

/// Marker telemetry across the whole memory structure.
///
/// Auxiliary only: collapse and reconstruction never read it.
#[derive(Debug, Clone, Default)]
pub struct SigilRegistry {
    marks: Vec<SigilMark>,
}

impl SigilRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a marker sighting
    pub fn register(&mut self, symbol: impl Into<String>, class: SigilClass) {
        self.marks.push(SigilMark {
            symbol: symbol.into(),
            class,
            seen_at: Utc::now(),
        });
    }

    /// Number of registered marks
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Mean recall-gravity weight of the registered marks, rounded to 4 dp
    pub fn density_score(&self) -> f64 {
        if self.marks.is_empty() {
            return 0.0;
        }
        let total: f64 = self.marks.iter().map(|m| m.class.weight()).sum();
        (total / self.marks.len() as f64 * 10_000.0).round() / 10_000.0
    }

    /// Retention window in days.
    ///
    /// Base window is one day; critical marks extend it by 2.5 days each,
    /// capped at +8 days.
    pub fn retention_extension_days(&self) -> f64 {
        let base = 1.0;
        let critical = self.critical_count();
        if critical == 0 {
            return base;
        }
        base + (critical as f64 * 2.5).min(8.0)
    }

    fn critical_count(&self) -> usize {
        self.marks
            .iter()
            .filter(|m| m.class == SigilClass::Critical)
            .count()
    }

    /// Aggregate statistics export
    pub fn summary(&self) -> SigilSummary {
        SigilSummary {
            total_marks: self.marks.len(),
            critical_count: self.critical_count(),
            density: self.density_score(),
            retention_extension_days: self.retention_extension_days(),
            symbols: self.marks.iter().map(|m| m.symbol.clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_counts_repeats() {
        let scorer = SigilScorer::default();
        assert_eq!(scorer.score("nothing here"), 0);
        assert_eq!(scorer.score("💠 important"), 3);
        assert_eq!(scorer.score("💠💠 twice"), 6);
        assert_eq!(scorer.score("💠 and ✨ and •"), 6);
    }

    #[test]
    fn test_score_empty_text() {
        assert_eq!(SigilScorer::default().score(""), 0);
    }

    #[test]
    fn test_class_weights_decrease() {
        let classes = [
            SigilClass::Critical,
            SigilClass::High,
            SigilClass::Medium,
            SigilClass::Low,
            SigilClass::Ambient,
        ];
        for pair in classes.windows(2) {
            assert!(pair[0].weight() > pair[1].weight());
        }
    }

    #[test]
    fn test_density_score() {
        let mut registry = SigilRegistry::new();
        assert_eq!(registry.density_score(), 0.0);

        registry.register("💠", SigilClass::Critical);
        registry.register("•", SigilClass::Low);
        // (1.0 + 0.15) / 2 = 0.575
        assert_eq!(registry.density_score(), 0.575);
    }

    #[test]
    fn test_retention_extension() {
        let mut registry = SigilRegistry::new();
        assert_eq!(registry.retention_extension_days(), 1.0);

        registry.register("💠", SigilClass::Critical);
        assert_eq!(registry.retention_extension_days(), 3.5);

        // Extension caps at +8 days regardless of critical count
        for _ in 0..10 {
            registry.register("💠", SigilClass::Critical);
        }
        assert_eq!(registry.retention_extension_days(), 9.0);
    }

    #[test]
    fn test_summary() {
        let mut registry = SigilRegistry::new();
        registry.register("💠", SigilClass::Critical);
        registry.register("✨", SigilClass::Medium);

        let summary = registry.summary();
        assert_eq!(summary.total_marks, 2);
        assert_eq!(summary.critical_count, 1);
        assert_eq!(summary.symbols, vec!["💠", "✨"]);
        assert_eq!(summary.retention_extension_days, 3.5);
    }
}
