use crate::core::error::Result;
use crate::core::types::{DocId, Term};
use crate::query::ast::Query;
use crate::reader::snapshot::SnapshotReader;
use crate::scoring::stats::{FieldStatistics, StatsSource, TermStatistics};
use crate::search::results::ScoreExplanation;
use crate::search::weight::Weight;

/// Which weight-construction path a searcher takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightPath {
    /// The searcher's own path: substituted statistics and per-node
    /// instrumentation are visible here
    Base,
    /// Hand everything to the delegate engine
    Delegate,
}

/// Path selection for normalized weight construction.
///
/// Priority order matters: substituted statistics only reach scoring
/// through the base path, and the profiler has to observe every node even
/// when no statistics were substituted. Only when neither concern applies
/// does the delegate get the whole construction, which is the cheapest
/// path and the one with extra runtime checks.
pub fn weight_path(has_aggregated: bool, needs_scores: bool, has_profiler: bool) -> WeightPath {
    if has_aggregated && needs_scores {
        WeightPath::Base
    } else if has_profiler {
        WeightPath::Base
    } else {
        WeightPath::Delegate
    }
}

/// Seam through which a weight tree descends into its child nodes.
/// A searcher implements this to observe every node as it is built.
pub trait WeightSource {
    fn weight_for(&self, query: &Query, needs_scores: bool) -> Result<Box<dyn Weight>>;
}

/// The operations a query execution engine provides.
///
/// Statistics flow through an explicit `StatsSource` so the caller decides
/// whether substituted or local corpus statistics are visible; node
/// recursion flows through `WeightSource` for the same reason.
pub trait SearchEngine: Send + Sync {
    fn rewrite(&self, reader: &SnapshotReader, query: &Query) -> Result<Query>;

    fn weight(
        &self,
        reader: &SnapshotReader,
        query: &Query,
        needs_scores: bool,
        stats: &dyn StatsSource,
        nodes: &dyn WeightSource,
    ) -> Result<Box<dyn Weight>>;

    fn normalized_weight(
        &self,
        reader: &SnapshotReader,
        query: &Query,
        needs_scores: bool,
        stats: &dyn StatsSource,
        nodes: &dyn WeightSource,
    ) -> Result<Box<dyn Weight>>;

    fn term_statistics(&self, reader: &SnapshotReader, term: &Term) -> Result<TermStatistics>;

    fn field_statistics(&self, reader: &SnapshotReader, field: &str) -> Result<FieldStatistics>;

    fn explain(
        &self,
        reader: &SnapshotReader,
        query: &Query,
        doc_id: DocId,
        stats: &dyn StatsSource,
    ) -> Result<ScoreExplanation>;
}

/// WeightSource that recurses within a single engine
pub struct EngineWeightSource<'a> {
    pub engine: &'a dyn SearchEngine,
    pub reader: &'a SnapshotReader,
    pub stats: &'a dyn StatsSource,
}

impl WeightSource for EngineWeightSource<'_> {
    fn weight_for(&self, query: &Query, needs_scores: bool) -> Result<Box<dyn Weight>> {
        self.engine
            .weight(self.reader, query, needs_scores, self.stats, self)
    }
}
