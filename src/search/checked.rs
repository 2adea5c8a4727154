use crate::core::config::SearchConfig;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{DocId, Term};
use crate::query::ast::Query;
use crate::reader::snapshot::SnapshotReader;
use crate::scoring::stats::{FieldStatistics, StatsSource, TermStatistics};
use crate::search::base::SnapshotEngine;
use crate::search::engine::{SearchEngine, WeightSource};
use crate::search::results::ScoreExplanation;
use crate::search::weight::Weight;

/// SnapshotEngine plus runtime correctness checks.
///
/// The checks make this the preferred default path: query shape limits are
/// enforced before execution and statistics/normalization values are
/// sanity-checked on the way out.
pub struct CheckedEngine {
    inner: SnapshotEngine,
    pub max_query_depth: usize,
    pub max_bool_clauses: usize,
}

impl CheckedEngine {
    pub fn new() -> Self {
        Self::with_config(&SearchConfig::default())
    }

    pub fn with_config(config: &SearchConfig) -> Self {
        CheckedEngine {
            inner: SnapshotEngine::new(),
            max_query_depth: config.max_query_depth,
            max_bool_clauses: config.max_bool_clauses,
        }
    }

    fn validate(&self, query: &Query) -> Result<()> {
        self.validate_depth(query, 0)
    }

    fn validate_depth(&self, query: &Query, depth: usize) -> Result<()> {
        if depth > self.max_query_depth {
            return Err(Error::new(
                ErrorKind::InvalidQuery,
                format!("query depth {} exceeds maximum {}", depth, self.max_query_depth),
            ));
        }

        if let Query::Bool(bq) = query {
            let total_clauses = bq.must.len() + bq.should.len() + bq.must_not.len();
            if total_clauses > self.max_bool_clauses {
                return Err(Error::new(
                    ErrorKind::InvalidQuery,
                    format!("bool query has {} clauses, max is {}", total_clauses, self.max_bool_clauses),
                ));
            }
            for clause in bq.must.iter().chain(&bq.should).chain(&bq.must_not) {
                self.validate_depth(clause, depth + 1)?;
            }
        }

        Ok(())
    }
}

impl Default for CheckedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchEngine for CheckedEngine {
    fn rewrite(&self, reader: &SnapshotReader, query: &Query) -> Result<Query> {
        self.validate(query)?;
        let rewritten = self.inner.rewrite(reader, query)?;

        // A correct rewrite is a fixpoint
        let again = self.inner.rewrite(reader, &rewritten)?;
        if again != rewritten {
            return Err(Error::new(
                ErrorKind::Internal,
                format!("rewrite did not converge for {}", query),
            ));
        }
        Ok(rewritten)
    }

    fn weight(
        &self,
        reader: &SnapshotReader,
        query: &Query,
        needs_scores: bool,
        stats: &dyn StatsSource,
        nodes: &dyn WeightSource,
    ) -> Result<Box<dyn Weight>> {
        self.validate(query)?;
        self.inner.weight(reader, query, needs_scores, stats, nodes)
    }

    fn normalized_weight(
        &self,
        reader: &SnapshotReader,
        query: &Query,
        needs_scores: bool,
        stats: &dyn StatsSource,
        nodes: &dyn WeightSource,
    ) -> Result<Box<dyn Weight>> {
        self.validate(query)?;
        let weight = self.inner.normalized_weight(reader, query, needs_scores, stats, nodes)?;

        let value = weight.value_for_normalization();
        if !value.is_finite() {
            return Err(Error::new(
                ErrorKind::Internal,
                format!("non-finite normalization value for {}", query),
            ));
        }
        Ok(weight)
    }

    fn term_statistics(&self, reader: &SnapshotReader, term: &Term) -> Result<TermStatistics> {
        let stats = self.inner.term_statistics(reader, term)?;
        if stats.total_term_freq < stats.doc_freq {
            return Err(Error::new(
                ErrorKind::Internal,
                format!("term statistics out of range for {}:{}", term.field, term.text),
            ));
        }
        Ok(stats)
    }

    fn field_statistics(&self, reader: &SnapshotReader, field: &str) -> Result<FieldStatistics> {
        let stats = self.inner.field_statistics(reader, field)?;
        if stats.sum_total_term_freq < stats.sum_doc_freq {
            return Err(Error::new(
                ErrorKind::Internal,
                format!("field statistics out of range for {}", field),
            ));
        }
        Ok(stats)
    }

    fn explain(
        &self,
        reader: &SnapshotReader,
        query: &Query,
        doc_id: DocId,
        stats: &dyn StatsSource,
    ) -> Result<ScoreExplanation> {
        self.validate(query)?;
        let explanation = self.inner.explain(reader, query, doc_id, stats)?;
        if !explanation.value.is_finite() {
            return Err(Error::new(
                ErrorKind::Internal,
                format!("non-finite explanation score for {}", query),
            ));
        }
        Ok(explanation)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use super::*;
    use crate::core::types::DocId;
    use crate::index::inverted::InvertedIndex;
    use crate::reader::snapshot::Snapshot;

    fn reader() -> SnapshotReader {
        let mut index = InvertedIndex::new();
        index.add_document(DocId(0), "body", &["rust"]);
        SnapshotReader::open(Arc::new(Snapshot::new(1, Arc::new(index))))
    }

    fn nested(depth: usize) -> Query {
        let mut query = Query::term("body", "rust");
        for _ in 0..depth {
            query = Query::Bool(crate::query::ast::BoolQuery {
                must: vec![query],
                should: vec![Query::term("body", "filler")],
                must_not: vec![],
            });
        }
        query
    }

    #[test]
    fn rewrite_rejects_over_deep_queries() {
        let reader = reader();
        let engine = CheckedEngine::new();

        assert!(engine.rewrite(&reader, &nested(3)).is_ok());

        let err = engine.rewrite(&reader, &nested(40)).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidQuery));
    }

    #[test]
    fn statistics_pass_sanity_checks() {
        let reader = reader();
        let engine = CheckedEngine::new();

        let term = Term::new("body", "rust");
        let stats = engine.term_statistics(&reader, &term).unwrap();
        assert_eq!(stats.doc_freq, 1);

        let field = engine.field_statistics(&reader, "body").unwrap();
        assert_eq!(field.doc_count, 1);
    }

    #[test]
    fn rewrite_output_is_a_fixpoint() {
        let reader = reader();
        let engine = CheckedEngine::new();

        let query = Query::must(vec![Query::must(vec![Query::term("body", "rust")])]);
        let rewritten = engine.rewrite(&reader, &query).unwrap();
        assert_eq!(rewritten, Query::term("body", "rust"));
    }
}
