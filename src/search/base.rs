use std::sync::Arc;
use crate::core::error::Result;
use crate::core::types::{DocId, Term};
use crate::query::ast::Query;
use crate::query::rewrite::QueryRewriter;
use crate::reader::snapshot::SnapshotReader;
use crate::scoring::scorer::{Bm25Similarity, Similarity};
use crate::scoring::stats::{FieldStatistics, StatsSource, TermStatistics};
use crate::search::engine::{EngineWeightSource, SearchEngine, WeightSource};
use crate::search::results::ScoreExplanation;
use crate::search::weight::{AllWeight, BoolWeight, PhraseWeight, ScoreParams, TermWeight, Weight};

/// Standard execution algorithms over one snapshot
pub struct SnapshotEngine {
    pub rewriter: QueryRewriter,
    pub similarity: Arc<dyn Similarity>,
}

impl SnapshotEngine {
    pub fn new() -> Self {
        Self::with_similarity(Arc::new(Bm25Similarity::default()))
    }

    pub fn with_similarity(similarity: Arc<dyn Similarity>) -> Self {
        SnapshotEngine {
            rewriter: QueryRewriter::new(),
            similarity,
        }
    }
}

impl Default for SnapshotEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchEngine for SnapshotEngine {
    fn rewrite(&self, _reader: &SnapshotReader, query: &Query) -> Result<Query> {
        Ok(self.rewriter.rewrite(query))
    }

    fn weight(
        &self,
        _reader: &SnapshotReader,
        query: &Query,
        needs_scores: bool,
        stats: &dyn StatsSource,
        nodes: &dyn WeightSource,
    ) -> Result<Box<dyn Weight>> {
        match query {
            Query::MatchAll => Ok(Box::new(AllWeight::new(query.clone()))),
            Query::Term(tq) => {
                let term = Term::new(&tq.field, &tq.value);
                let params = if needs_scores {
                    let term_stats = stats.term_statistics(&term)?;
                    let field_stats = stats.field_statistics(&tq.field)?;
                    Some(ScoreParams::new(
                        self.similarity.clone(),
                        &term_stats,
                        &field_stats,
                    ))
                } else {
                    None
                };
                Ok(Box::new(TermWeight::new(query.clone(), term, params)))
            }
            Query::Phrase(pq) => {
                let terms: Vec<Term> = pq
                    .phrase
                    .iter()
                    .map(|text| Term::new(&pq.field, text))
                    .collect();
                let params = if needs_scores {
                    let term_stats: Vec<TermStatistics> = terms
                        .iter()
                        .map(|t| stats.term_statistics(t))
                        .collect::<Result<_>>()?;
                    let field_stats = stats.field_statistics(&pq.field)?;
                    Some(ScoreParams::for_phrase(
                        self.similarity.clone(),
                        &term_stats,
                        &field_stats,
                    ))
                } else {
                    None
                };
                Ok(Box::new(PhraseWeight::new(query.clone(), terms, params)))
            }
            Query::Bool(bq) => {
                let mut must = Vec::with_capacity(bq.must.len());
                for clause in &bq.must {
                    must.push(nodes.weight_for(clause, needs_scores)?);
                }
                let mut should = Vec::with_capacity(bq.should.len());
                for clause in &bq.should {
                    should.push(nodes.weight_for(clause, needs_scores)?);
                }
                // Prohibited clauses only filter; they never score
                let mut must_not = Vec::with_capacity(bq.must_not.len());
                for clause in &bq.must_not {
                    must_not.push(nodes.weight_for(clause, false)?);
                }
                Ok(Box::new(BoolWeight::new(query.clone(), must, should, must_not)))
            }
        }
    }

    fn normalized_weight(
        &self,
        _reader: &SnapshotReader,
        query: &Query,
        needs_scores: bool,
        _stats: &dyn StatsSource,
        nodes: &dyn WeightSource,
    ) -> Result<Box<dyn Weight>> {
        let mut weight = nodes.weight_for(query, needs_scores)?;
        if needs_scores {
            let value = weight.value_for_normalization();
            weight.normalize(self.similarity.query_norm(value));
        }
        Ok(weight)
    }

    fn term_statistics(&self, reader: &SnapshotReader, term: &Term) -> Result<TermStatistics> {
        Ok(reader.local_term_statistics(term))
    }

    fn field_statistics(&self, reader: &SnapshotReader, field: &str) -> Result<FieldStatistics> {
        Ok(reader.local_field_statistics(field))
    }

    fn explain(
        &self,
        reader: &SnapshotReader,
        query: &Query,
        doc_id: DocId,
        stats: &dyn StatsSource,
    ) -> Result<ScoreExplanation> {
        let nodes = EngineWeightSource {
            engine: self,
            reader,
            stats,
        };
        let weight = self.normalized_weight(reader, query, true, stats, &nodes)?;
        weight.explain(reader, doc_id)
    }
}
