use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use crate::core::error::Result;
use crate::core::types::Term;

/// Corpus-level frequency summary for a single term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermStatistics {
    pub doc_freq: u64,
    pub total_term_freq: u64,
}

/// Corpus-level summary for a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStatistics {
    pub doc_count: u64,
    pub sum_doc_freq: u64,
    pub sum_total_term_freq: u64,
}

impl FieldStatistics {
    pub fn avg_field_length(&self) -> f32 {
        if self.doc_count == 0 {
            0.0
        } else {
            self.sum_total_term_freq as f32 / self.doc_count as f32
        }
    }
}

/// Statistics lookup seam consulted while building score-bearing weights
pub trait StatsSource {
    fn term_statistics(&self, term: &Term) -> Result<TermStatistics>;
    fn field_statistics(&self, field: &str) -> Result<FieldStatistics>;
}

/// Precomputed statistics aggregated across corpus partitions.
///
/// Both maps are filled once, before query execution, and read-only after
/// that. A term or field missing from the maps was simply not part of the
/// aggregation pass; lookups fall back to local statistics in that case.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregatedStats {
    term_stats: HashMap<Term, TermStatistics>,
    field_stats: HashMap<String, FieldStatistics>,
}

impl AggregatedStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_term(&mut self, term: Term, stats: TermStatistics) {
        self.term_stats.insert(term, stats);
    }

    pub fn insert_field(&mut self, field: &str, stats: FieldStatistics) {
        self.field_stats.insert(field.to_string(), stats);
    }

    pub fn term_statistics(&self, term: &Term) -> Option<TermStatistics> {
        self.term_stats.get(term).copied()
    }

    pub fn field_statistics(&self, field: &str) -> Option<FieldStatistics> {
        self.field_stats.get(field).copied()
    }

    pub fn term_count(&self) -> usize {
        self.term_stats.len()
    }

    pub fn field_count(&self) -> usize {
        self.field_stats.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_hits_and_misses() {
        let mut stats = AggregatedStats::new();
        stats.insert_term(
            Term::new("body", "rust"),
            TermStatistics { doc_freq: 40, total_term_freq: 95 },
        );
        stats.insert_field(
            "body",
            FieldStatistics { doc_count: 100, sum_doc_freq: 400, sum_total_term_freq: 1200 },
        );

        let hit = stats.term_statistics(&Term::new("body", "rust")).unwrap();
        assert_eq!(hit.doc_freq, 40);
        assert!(stats.term_statistics(&Term::new("body", "unseen")).is_none());
        assert!(stats.field_statistics("title").is_none());
        assert_eq!(stats.term_count(), 1);
        assert_eq!(stats.field_count(), 1);
    }

    #[test]
    fn avg_field_length_handles_empty_field() {
        let empty = FieldStatistics { doc_count: 0, sum_doc_freq: 0, sum_total_term_freq: 0 };
        assert_eq!(empty.avg_field_length(), 0.0);

        let body = FieldStatistics { doc_count: 4, sum_doc_freq: 10, sum_total_term_freq: 20 };
        assert_eq!(body.avg_field_length(), 5.0);
    }
}
