use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use crate::core::config::SearchConfig;
use crate::core::error::Result;
use crate::core::types::{DocId, Term};
use crate::profile::breakdown::{Breakdown, TimingType};
use crate::profile::profiler::Profiler;
use crate::profile::weight::ProfileWeight;
use crate::query::ast::Query;
use crate::query::cache::{QueryCache, QueryKey};
use crate::reader::snapshot::SnapshotReader;
use crate::scoring::stats::{AggregatedStats, FieldStatistics, StatsSource, TermStatistics};
use crate::search::base::SnapshotEngine;
use crate::search::checked::CheckedEngine;
use crate::search::engine::{
    EngineWeightSource, SearchEngine, WeightPath, WeightSource, weight_path,
};
use crate::search::results::{ScoreExplanation, ScoredDocument, SearchResults, TopKCollector};
use crate::search::weight::Weight;

/// Context-aware searcher for one query execution.
///
/// Wraps a snapshot reader together with two engines and routes each
/// operation to one of them. Two optional attachments change what scoring
/// observes without changing what it computes:
///
/// - `AggregatedStats` substitutes corpus statistics gathered across
///   partitions, so this partition scores as if it were the whole corpus.
/// - `Profiler` records where time goes while the query tree is rewritten,
///   built, and scored.
///
/// Both are attached at most once, before any scoring call. One context
/// serves one query execution and is released exactly once afterwards; the
/// snapshot outlives it and is never touched by release.
pub struct ContextSearcher {
    reader: Arc<SnapshotReader>,
    base: SnapshotEngine,
    delegate: Box<dyn SearchEngine>,
    aggregated_stats: Option<AggregatedStats>,
    profiler: Option<Arc<Profiler>>,
    query_cache: Option<Arc<QueryCache>>,
    released: AtomicBool,
}

impl ContextSearcher {
    pub fn new(reader: Arc<SnapshotReader>, query_cache: Option<Arc<QueryCache>>) -> Self {
        Self::with_delegate(reader, query_cache, Box::new(CheckedEngine::new()))
    }

    /// Context with a shared result cache and a checked delegate sized
    /// from the configuration
    pub fn with_config(reader: Arc<SnapshotReader>, config: &SearchConfig) -> Self {
        Self::with_delegate(
            reader,
            Some(Arc::new(QueryCache::new(config.query_cache_size))),
            Box::new(CheckedEngine::with_config(config)),
        )
    }

    pub fn with_delegate(
        reader: Arc<SnapshotReader>,
        query_cache: Option<Arc<QueryCache>>,
        delegate: Box<dyn SearchEngine>,
    ) -> Self {
        ContextSearcher {
            reader,
            base: SnapshotEngine::new(),
            delegate,
            aggregated_stats: None,
            profiler: None,
            query_cache,
            released: AtomicBool::new(false),
        }
    }

    pub fn set_aggregated_stats(&mut self, stats: AggregatedStats) {
        self.aggregated_stats = Some(stats);
    }

    pub fn set_profiler(&mut self, profiler: Arc<Profiler>) {
        self.profiler = Some(profiler);
    }

    pub fn profiler(&self) -> Option<&Arc<Profiler>> {
        self.profiler.as_ref()
    }

    pub fn reader(&self) -> &SnapshotReader {
        &self.reader
    }

    /// Rewrite a query into its simplified executable form.
    ///
    /// The rewrite algorithm itself belongs to the delegate. When a
    /// profiler is attached the phase is timed on an unattached breakdown:
    /// rewriting happens before any tree node exists, so the breakdown is
    /// reported back retroactively, and only for a rewrite that produced a
    /// result. The timing stop runs whether the rewrite succeeds or fails.
    pub fn rewrite(&self, query: &Query) -> Result<Query> {
        let breakdown = self
            .profiler
            .as_ref()
            .map(|p| p.unattached_rewrite_breakdown());
        self.rewrite_with_breakdown(query, breakdown)
    }

    fn rewrite_with_breakdown(
        &self,
        query: &Query,
        breakdown: Option<Arc<Breakdown>>,
    ) -> Result<Query> {
        if let Some(b) = &breakdown {
            b.start(TimingType::Rewrite);
        }

        let result = self.delegate.rewrite(&self.reader, query);

        if let Some(b) = breakdown {
            b.stop(TimingType::Rewrite);
            if let (Some(profiler), Ok(rewritten)) = (&self.profiler, &result) {
                profiler.record_rewrite(query, rewritten, b);
            }
        }

        result
    }

    /// Build the normalized weight for the final, score-bearing execution
    pub fn create_normalized_weight(
        &self,
        query: &Query,
        needs_scores: bool,
    ) -> Result<Box<dyn Weight>> {
        let path = weight_path(
            self.aggregated_stats.is_some(),
            needs_scores,
            self.profiler.is_some(),
        );
        match path {
            WeightPath::Base => {
                // Base path: statistics resolve through this context, so
                // substituted values are visible, and node construction
                // funnels through create_weight for instrumentation
                self.base
                    .normalized_weight(&self.reader, query, needs_scores, self, self)
            }
            WeightPath::Delegate => {
                let nodes = EngineWeightSource {
                    engine: self.delegate.as_ref(),
                    reader: self.reader.as_ref(),
                    stats: self.reader.as_ref(),
                };
                self.delegate.normalized_weight(
                    &self.reader,
                    query,
                    needs_scores,
                    self.reader.as_ref(),
                    &nodes,
                )
            }
        }
    }

    /// Build the weight for one node of the query tree.
    ///
    /// With a profiler attached every node passes through here, which is
    /// what lets the profiler assemble its tree: open the node, time the
    /// construction, close the node, and hand back a weight that keeps
    /// reporting into the same breakdown during scoring.
    pub fn create_weight(&self, query: &Query, needs_scores: bool) -> Result<Box<dyn Weight>> {
        match &self.profiler {
            Some(profiler) => {
                let breakdown = profiler.query_breakdown(query);
                breakdown.start(TimingType::Weight);
                let built = self.base.weight(&self.reader, query, needs_scores, self, self);
                breakdown.stop(TimingType::Weight);
                profiler.finish_node();

                let weight = built?;
                Ok(Box::new(ProfileWeight::new(query.clone(), weight, breakdown)))
            }
            None => {
                let nodes = EngineWeightSource {
                    engine: self.delegate.as_ref(),
                    reader: self.reader.as_ref(),
                    stats: self,
                };
                self.delegate
                    .weight(&self.reader, query, needs_scores, self, &nodes)
            }
        }
    }

    /// Term statistics, preferring aggregated values when attached.
    ///
    /// A term missing from the aggregation (for example one synthesized
    /// from a clause excluded from term extraction) falls back to the
    /// local computation instead of failing.
    pub fn term_statistics(&self, term: &Term) -> Result<TermStatistics> {
        let Some(aggregated) = &self.aggregated_stats else {
            return self.base.term_statistics(&self.reader, term);
        };
        match aggregated.term_statistics(term) {
            Some(stats) => Ok(stats),
            None => self.base.term_statistics(&self.reader, term),
        }
    }

    /// Field statistics, with the same substitution and fallback rule as
    /// term statistics
    pub fn field_statistics(&self, field: &str) -> Result<FieldStatistics> {
        let Some(aggregated) = &self.aggregated_stats else {
            return self.base.field_statistics(&self.reader, field);
        };
        match aggregated.field_statistics(field) {
            Some(stats) => Ok(stats),
            None => self.base.field_statistics(&self.reader, field),
        }
    }

    /// Explain the score of one document. Always delegated; neither
    /// statistics substitution nor profiling applies to this path.
    pub fn explain(&self, query: &Query, doc_id: DocId) -> Result<ScoreExplanation> {
        self.delegate
            .explain(&self.reader, query, doc_id, self.reader.as_ref())
    }

    /// Drive the standard rewrite, weight construction, scoring sequence for one query
    pub fn search(&self, query: &Query, limit: usize) -> Result<SearchResults> {
        let key = QueryKey { query: query.clone(), limit };

        // Profiled queries always execute
        if self.profiler.is_none()
            && let Some(cache) = &self.query_cache
            && let Some(hit) = cache.get(&key)
        {
            return Ok(hit);
        }

        let start = Instant::now();
        let rewritten = self.rewrite(query)?;
        let weight = self.create_normalized_weight(&rewritten, true)?;

        let mut collector = TopKCollector::new(limit);
        if let Some(mut scorer) = weight.scorer(&self.reader)? {
            while let Some(doc_id) = scorer.advance() {
                let score = scorer.score();
                collector.collect(ScoredDocument {
                    doc_id,
                    score,
                    explanation: None,
                });
            }
        }

        let total_hits = collector.total_collected;
        let max_score = collector.max_score();
        let results = SearchResults {
            hits: collector.into_results(),
            total_hits,
            max_score,
            took_ms: start.elapsed().as_millis() as u64,
        };

        if self.profiler.is_none()
            && let Some(cache) = &self.query_cache
        {
            cache.put(key, results.clone());
        }

        Ok(results)
    }

    /// Release the context. The snapshot belongs to whoever supplied it,
    /// so this never closes or invalidates anything; it only marks the
    /// single release point. Safe to call more than once.
    pub fn close(&self) {
        self.released.store(true, Ordering::Release);
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

impl StatsSource for ContextSearcher {
    fn term_statistics(&self, term: &Term) -> Result<TermStatistics> {
        ContextSearcher::term_statistics(self, term)
    }

    fn field_statistics(&self, field: &str) -> Result<FieldStatistics> {
        ContextSearcher::field_statistics(self, field)
    }
}

impl WeightSource for ContextSearcher {
    fn weight_for(&self, query: &Query, needs_scores: bool) -> Result<Box<dyn Weight>> {
        self.create_weight(query, needs_scores)
    }
}
