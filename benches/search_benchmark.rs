use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use scorix::core::types::{DocId, Term};
use scorix::index::inverted::InvertedIndex;
use scorix::profile::profiler::Profiler;
use scorix::query::ast::Query;
use scorix::reader::snapshot::{Snapshot, SnapshotReader};
use scorix::scoring::stats::{AggregatedStats, FieldStatistics, TermStatistics};
use scorix::search::context::ContextSearcher;
use std::sync::Arc;
use rand::Rng;

const WORDS: [&str; 8] = ["the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog"];

/// Helper to build a random corpus snapshot
fn build_reader(doc_count: usize, tokens_per_doc: usize) -> Arc<SnapshotReader> {
    let mut rng = rand::thread_rng();
    let mut index = InvertedIndex::new();

    for id in 0..doc_count {
        let tokens: Vec<&str> = (0..tokens_per_doc)
            .map(|_| WORDS[rng.gen_range(0..WORDS.len())])
            .collect();
        index.add_document(DocId(id as u64), "body", &tokens);
    }

    Arc::new(SnapshotReader::open(Arc::new(Snapshot::new(1, Arc::new(index)))))
}

fn query() -> Query {
    Query::must(vec![Query::term("body", "quick"), Query::term("body", "fox")])
}

/// Baseline: no attachments, everything rides the delegate path
fn bench_plain_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("plain_search");

    for doc_count in [1_000, 10_000].iter() {
        let reader = build_reader(*doc_count, 20);
        group.bench_with_input(
            BenchmarkId::from_parameter(doc_count),
            doc_count,
            |b, _| {
                let searcher = ContextSearcher::new(reader.clone(), None);
                let query = query();
                b.iter(|| {
                    black_box(searcher.search(&query, 10).unwrap());
                });
            },
        );
    }
    group.finish();
}

/// Same search with a profiler attached, to measure instrumentation cost
fn bench_profiled_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("profiled_search");

    for doc_count in [1_000, 10_000].iter() {
        let reader = build_reader(*doc_count, 20);
        group.bench_with_input(
            BenchmarkId::from_parameter(doc_count),
            doc_count,
            |b, _| {
                let query = query();
                b.iter(|| {
                    let mut searcher = ContextSearcher::new(reader.clone(), None);
                    searcher.set_profiler(Arc::new(Profiler::new()));
                    black_box(searcher.search(&query, 10).unwrap());
                });
            },
        );
    }
    group.finish();
}

/// Same search scored against substituted corpus-wide statistics
fn bench_aggregated_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregated_search");

    for doc_count in [1_000, 10_000].iter() {
        let reader = build_reader(*doc_count, 20);

        let mut stats = AggregatedStats::new();
        for word in WORDS {
            stats.insert_term(
                Term::new("body", word),
                TermStatistics {
                    doc_freq: *doc_count as u64 * 4,
                    total_term_freq: *doc_count as u64 * 10,
                },
            );
        }
        stats.insert_field(
            "body",
            FieldStatistics {
                doc_count: *doc_count as u64 * 8,
                sum_doc_freq: *doc_count as u64 * 40,
                sum_total_term_freq: *doc_count as u64 * 160,
            },
        );

        group.bench_with_input(
            BenchmarkId::from_parameter(doc_count),
            doc_count,
            |b, _| {
                let mut searcher = ContextSearcher::new(reader.clone(), None);
                searcher.set_aggregated_stats(stats.clone());
                let query = query();
                b.iter(|| {
                    black_box(searcher.search(&query, 10).unwrap());
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_plain_search,
    bench_profiled_search,
    bench_aggregated_search
);
criterion_main!(benches);
