use std::sync::Arc;
use crate::core::error::Result;
use crate::core::types::DocId;
use crate::profile::breakdown::{Breakdown, TimingType};
use crate::query::ast::Query;
use crate::reader::snapshot::SnapshotReader;
use crate::search::results::ScoreExplanation;
use crate::search::weight::{DocScorer, Weight};

/// Weight decorator that reports scorer construction and per-document
/// scoring into the breakdown of the query node it wraps
pub struct ProfileWeight {
    query: Query,
    inner: Box<dyn Weight>,
    breakdown: Arc<Breakdown>,
}

impl ProfileWeight {
    pub fn new(query: Query, inner: Box<dyn Weight>, breakdown: Arc<Breakdown>) -> Self {
        ProfileWeight {
            query,
            inner,
            breakdown,
        }
    }

    pub fn breakdown(&self) -> &Arc<Breakdown> {
        &self.breakdown
    }
}

impl Weight for ProfileWeight {
    fn query(&self) -> &Query {
        &self.query
    }

    fn value_for_normalization(&self) -> f32 {
        self.inner.value_for_normalization()
    }

    fn normalize(&mut self, norm: f32) {
        self.inner.normalize(norm);
    }

    fn scorer(&self, reader: &SnapshotReader) -> Result<Option<Box<dyn DocScorer>>> {
        self.breakdown.start(TimingType::BuildScorer);
        let scorer = self.inner.scorer(reader);
        self.breakdown.stop(TimingType::BuildScorer);

        Ok(scorer?.map(|inner| {
            Box::new(ProfileScorer {
                inner,
                breakdown: self.breakdown.clone(),
            }) as Box<dyn DocScorer>
        }))
    }

    fn explain(&self, reader: &SnapshotReader, doc_id: DocId) -> Result<ScoreExplanation> {
        // Explanation is a diagnostic path; it is not timed
        self.inner.explain(reader, doc_id)
    }
}

/// Scorer decorator carrying the node breakdown through document iteration
pub struct ProfileScorer {
    inner: Box<dyn DocScorer>,
    breakdown: Arc<Breakdown>,
}

impl DocScorer for ProfileScorer {
    fn advance(&mut self) -> Option<DocId> {
        self.breakdown.start(TimingType::NextDoc);
        let doc = self.inner.advance();
        self.breakdown.stop(TimingType::NextDoc);
        doc
    }

    fn score(&mut self) -> f32 {
        self.breakdown.start(TimingType::Score);
        let score = self.inner.score();
        self.breakdown.stop(TimingType::Score);
        score
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use super::*;
    use crate::core::types::{DocId, Term};
    use crate::index::inverted::InvertedIndex;
    use crate::reader::snapshot::Snapshot;
    use crate::scoring::scorer::Bm25Similarity;
    use crate::scoring::stats::StatsSource;
    use crate::search::weight::{ScoreParams, TermWeight};

    fn reader() -> SnapshotReader {
        let mut index = InvertedIndex::new();
        index.add_document(DocId(0), "body", &["rust", "engine"]);
        index.add_document(DocId(1), "body", &["rust"]);
        SnapshotReader::open(Arc::new(Snapshot::new(1, Arc::new(index))))
    }

    #[test]
    fn scoring_through_the_decorator_lands_in_the_breakdown() {
        let reader = reader();
        let term = Term::new("body", "rust");
        let params = ScoreParams::new(
            Arc::new(Bm25Similarity::default()),
            &reader.term_statistics(&term).unwrap(),
            &reader.field_statistics("body").unwrap(),
        );
        let query = Query::term("body", "rust");
        let inner = TermWeight::new(query.clone(), term, Some(params));

        let breakdown = Arc::new(Breakdown::new());
        let profiled = ProfileWeight::new(query, Box::new(inner), breakdown.clone());

        let mut scorer = profiled.scorer(&reader).unwrap().unwrap();
        let mut scored = 0;
        while scorer.advance().is_some() {
            assert!(scorer.score() > 0.0);
            scored += 1;
        }

        assert_eq!(scored, 2);
        assert_eq!(breakdown.count(TimingType::BuildScorer), 1);
        assert_eq!(breakdown.count(TimingType::Score), 2);
        // advance() is also timed for the final miss
        assert_eq!(breakdown.count(TimingType::NextDoc), 3);
    }
}
