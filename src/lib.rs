pub mod core;
pub mod index;
pub mod reader;
pub mod scoring;
pub mod query;
pub mod profile;
pub mod search;

/*
┌──────────────────────────────────────────────────────────────────────────────┐
│                          SCORIX STRUCT ARCHITECTURE                          │
└──────────────────────────────────────────────────────────────────────────────┘

┌────────────────────────────── SEARCH LAYER ─────────────────────────────────┐
│                                                                              │
│  ┌────────────────────────────────────────────────────────────────────┐    │
│  │                     struct ContextSearcher                          │    │
│  │  ┌──────────────────────────────────────────────────────────────┐ │    │
│  │  │ reader: Arc<SnapshotReader>      // Snapshot for this query  │ │    │
│  │  │ base: SnapshotEngine             // Own execution algorithms │ │    │
│  │  │ delegate: Box<dyn SearchEngine>  // Default checked path     │ │    │
│  │  │ aggregated_stats: Option<AggregatedStats> // Stat overrides  │ │    │
│  │  │ profiler: Option<Arc<Profiler>>  // Timing breakdown tree    │ │    │
│  │  │ query_cache: Option<Arc<QueryCache>>                         │ │    │
│  │  │ released: AtomicBool             // Idempotent close()       │ │    │
│  │  └──────────────────────────────────────────────────────────────┘ │    │
│  └────────────────────────────────────────────────────────────────────┘    │
│                                                                              │
│  ┌──────────────────────┐  ┌─────────────────────┐  ┌──────────────────┐   │
│  │ trait SearchEngine   │  │ struct SnapshotEng. │  │ struct CheckedE. │   │
│  │ • rewrite()          │  │ • rewriter          │  │ • inner          │   │
│  │ • weight()           │  │ • similarity        │  │ • clause limits  │   │
│  │ • normalized_weight()│  └─────────────────────┘  └──────────────────┘   │
│  │ • term_statistics()  │                                                   │
│  │ • field_statistics() │  ┌─────────────────────┐  ┌──────────────────┐   │
│  │ • explain()          │  │ trait Weight        │  │ trait DocScorer  │   │
│  └──────────────────────┘  │ • scorer()          │  │ • advance()      │   │
│                            │ • normalize()       │  │ • score()        │   │
│  fn weight_path(..)        │ • explain()         │  └──────────────────┘   │
│    -> Base | Delegate      └─────────────────────┘                         │
└──────────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────── SCORING LAYER ─────────────────────────────────┐
│                                                                              │
│  ┌─────────────────────┐  ┌──────────────────────┐  ┌──────────────────┐   │
│  │ struct TermStats    │  │ struct AggregatedSt. │  │ trait Similarity │   │
│  │ • doc_freq          │  │ • term_stats: Map    │  │ • idf()          │   │
│  │ • total_term_freq   │  │ • field_stats: Map   │  │ • score()        │   │
│  └─────────────────────┘  └──────────────────────┘  │ • query_norm()   │   │
│  ┌─────────────────────┐  ┌──────────────────────┐  └──────────────────┘   │
│  │ struct FieldStats   │  │ trait StatsSource    │   Bm25Similarity        │
│  │ • doc_count         │  │ • term_statistics()  │   TfIdfSimilarity       │
│  │ • sum_doc_freq      │  │ • field_statistics() │                         │
│  │ • sum_total_tf      │  └──────────────────────┘                         │
│  └─────────────────────┘                                                    │
└──────────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────── PROFILE LAYER ─────────────────────────────────┐
│                                                                              │
│  ┌─────────────────────┐  ┌──────────────────────┐  ┌──────────────────┐   │
│  │ struct Profiler     │  │ struct Breakdown     │  │ ProfileWeight /  │   │
│  │ • stack-built tree  │  │ • start()/stop() per │  │ ProfileScorer    │   │
│  │ • rewrite reports   │  │   TimingType phase   │  │ (decorators)     │   │
│  │ • results() → JSON  │  └──────────────────────┘  └──────────────────┘   │
│  └─────────────────────┘                                                    │
└──────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────── INDEX / READER ─────────────────────────────────┐
│                                                                              │
│  ┌─────────────────────┐  ┌──────────────────────┐  ┌──────────────────┐   │
│  │ struct InvertedIdx  │  │ struct Snapshot      │  │ struct Snapshot- │   │
│  │ • postings: Map     │  │ • id / version / ts  │  │        Reader    │   │
│  │ • fields: Map       │  │ • index: Arc<..>     │  │ • local stats    │   │
│  │ • docs: BTreeSet    │  │ • deleted: Roaring   │  │ • live_docs()    │   │
│  └─────────────────────┘  └──────────────────────┘  └──────────────────┘   │
└──────────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────── RELATIONSHIPS ─────────────────────────────────┐
│                                                                              │
│  ContextSearcher ──rewrites_via──> delegate (CheckedEngine)                 │
│       │                                                                      │
│       ├──routes──> weight_path(aggregated?, needs_scores, profiler?)        │
│       │                │                                                     │
│       │                ├── Base ────> SnapshotEngine ──nodes──> create_weight│
│       │                └── Delegate > CheckedEngine  ──stats──> local        │
│       │                                                                      │
│       ├──stats──> AggregatedStats ──miss──> SnapshotReader (local)          │
│       │                                                                      │
│       └──profiles──> Profiler ──hands_out──> Breakdown ──rides──> Weight    │
│                                                                              │
│  Weight ──scorer()──> DocScorer ──collect──> TopKCollector ──> SearchResults│
└──────────────────────────────────────────────────────────────────────────────┘
*/
