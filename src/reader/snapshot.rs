use std::sync::Arc;
use chrono::{DateTime, Utc};
use roaring::RoaringBitmap;
use uuid::Uuid;
use crate::core::error::Result;
use crate::core::types::{DocId, Term};
use crate::index::inverted::InvertedIndex;
use crate::index::posting::PostingList;
use crate::scoring::stats::{FieldStatistics, StatsSource, TermStatistics};

/// Point-in-time view of one index partition.
/// Ownership stays with whoever committed it; readers only borrow.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub id: Uuid,
    pub version: u64,
    pub timestamp: DateTime<Utc>,
    pub index: Arc<InvertedIndex>,
    pub deleted_docs: Arc<RoaringBitmap>,
}

impl Snapshot {
    pub fn new(version: u64, index: Arc<InvertedIndex>) -> Self {
        Self::with_deletes(version, index, Arc::new(RoaringBitmap::new()))
    }

    pub fn with_deletes(
        version: u64,
        index: Arc<InvertedIndex>,
        deleted_docs: Arc<RoaringBitmap>,
    ) -> Self {
        Snapshot {
            id: Uuid::new_v4(),
            version,
            timestamp: Utc::now(),
            index,
            deleted_docs,
        }
    }
}

/// Reader for a specific snapshot
pub struct SnapshotReader {
    pub snapshot: Arc<Snapshot>,
}

impl SnapshotReader {
    pub fn open(snapshot: Arc<Snapshot>) -> Self {
        SnapshotReader { snapshot }
    }

    pub fn postings(&self, term: &Term) -> Option<&PostingList> {
        self.snapshot.index.postings(term)
    }

    pub fn doc_count(&self) -> u64 {
        self.snapshot.index.doc_count()
    }

    pub fn live_docs(&self) -> impl Iterator<Item = DocId> + '_ {
        self.snapshot.index.docs.iter().copied().filter(|d| !self.is_deleted(*d))
    }

    pub fn is_deleted(&self, doc_id: DocId) -> bool {
        self.snapshot.deleted_docs.contains(doc_id.0 as u32)
    }

    /// Statistics computed from this partition alone.
    /// Deleted documents still count until they are merged away.
    pub fn local_term_statistics(&self, term: &Term) -> TermStatistics {
        match self.postings(term) {
            Some(list) => TermStatistics {
                doc_freq: list.doc_freq() as u64,
                total_term_freq: list.total_freq(),
            },
            None => TermStatistics { doc_freq: 0, total_term_freq: 0 },
        }
    }

    pub fn local_field_statistics(&self, field: &str) -> FieldStatistics {
        match self.snapshot.index.field_entry(field) {
            Some(entry) => FieldStatistics {
                doc_count: entry.doc_count,
                sum_doc_freq: entry.sum_doc_freq,
                sum_total_term_freq: entry.sum_total_term_freq,
            },
            None => FieldStatistics { doc_count: 0, sum_doc_freq: 0, sum_total_term_freq: 0 },
        }
    }
}

impl StatsSource for SnapshotReader {
    fn term_statistics(&self, term: &Term) -> Result<TermStatistics> {
        Ok(self.local_term_statistics(term))
    }

    fn field_statistics(&self, field: &str) -> Result<FieldStatistics> {
        Ok(self.local_field_statistics(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader_with_deletes(deleted: &[u64]) -> SnapshotReader {
        let mut index = InvertedIndex::new();
        index.add_document(DocId(0), "body", &["rust", "search"]);
        index.add_document(DocId(1), "body", &["rust"]);
        index.add_document(DocId(2), "body", &["engine"]);

        let mut bitmap = RoaringBitmap::new();
        for d in deleted {
            bitmap.insert(*d as u32);
        }
        SnapshotReader::open(Arc::new(Snapshot::with_deletes(
            1,
            Arc::new(index),
            Arc::new(bitmap),
        )))
    }

    #[test]
    fn local_statistics_from_postings() {
        let reader = reader_with_deletes(&[]);
        let stats = reader.local_term_statistics(&Term::new("body", "rust"));
        assert_eq!(stats.doc_freq, 2);
        assert_eq!(stats.total_term_freq, 2);

        let field = reader.local_field_statistics("body");
        assert_eq!(field.doc_count, 3);
        assert_eq!(field.sum_total_term_freq, 4);

        let absent = reader.local_term_statistics(&Term::new("body", "nothing"));
        assert_eq!(absent.doc_freq, 0);
    }

    #[test]
    fn deleted_docs_are_hidden_from_live_iteration_only() {
        let reader = reader_with_deletes(&[1]);
        assert!(reader.is_deleted(DocId(1)));

        let live: Vec<DocId> = reader.live_docs().collect();
        assert_eq!(live, vec![DocId(0), DocId(2)]);

        // Frequency statistics keep counting deleted docs until a merge
        let stats = reader.local_term_statistics(&Term::new("body", "rust"));
        assert_eq!(stats.doc_freq, 2);
    }
}
