use std::collections::{BTreeSet, HashMap};
use crate::core::types::{DocId, Term};
use crate::index::posting::{Posting, PostingList};

/// Per-field corpus aggregates, maintained incrementally
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldEntry {
    pub doc_count: u64,             // Documents with at least one token in this field
    pub sum_doc_freq: u64,          // Distinct (term, doc) pairs
    pub sum_total_term_freq: u64,   // Total tokens indexed into this field
}

/// In-memory inverted index over one corpus partition
#[derive(Debug, Clone)]
pub struct InvertedIndex {
    pub postings: HashMap<Term, PostingList>,
    pub fields: HashMap<String, FieldEntry>,
    pub docs: BTreeSet<DocId>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        InvertedIndex {
            postings: HashMap::new(),
            fields: HashMap::new(),
            docs: BTreeSet::new(),
        }
    }

    /// Index one document field from its already-analyzed token stream
    pub fn add_document(&mut self, doc_id: DocId, field: &str, tokens: &[&str]) {
        let mut term_positions: HashMap<Term, Vec<u32>> = HashMap::new();

        for (position, token) in tokens.iter().enumerate() {
            let term = Term::new(field, token);
            term_positions.entry(term)
                .or_default()
                .push(position as u32);
        }

        let distinct_terms = term_positions.len() as u64;
        for (term, positions) in term_positions {
            let posting = Posting {
                doc_id,
                term_freq: positions.len() as u32,
                positions,
                field_len: tokens.len() as u32,
            };

            self.postings.entry(term)
                .or_insert_with(PostingList::new)
                .add_posting(posting);
        }

        let entry = self.fields.entry(field.to_string()).or_default();
        entry.doc_count += 1;
        entry.sum_doc_freq += distinct_terms;
        entry.sum_total_term_freq += tokens.len() as u64;

        self.docs.insert(doc_id);
    }

    pub fn postings(&self, term: &Term) -> Option<&PostingList> {
        self.postings.get(term)
    }

    pub fn field_entry(&self, field: &str) -> Option<&FieldEntry> {
        self.fields.get(field)
    }

    pub fn doc_count(&self) -> u64 {
        self.docs.len() as u64
    }

    /// Iterator over all indexed terms
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.postings.keys()
    }
}

impl Default for InvertedIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_document_updates_postings_and_field_aggregates() {
        let mut index = InvertedIndex::new();
        index.add_document(DocId(0), "body", &["rust", "search", "rust"]);
        index.add_document(DocId(1), "body", &["search", "engine"]);

        let rust = index.postings(&Term::new("body", "rust")).unwrap();
        assert_eq!(rust.doc_freq(), 1);
        assert_eq!(rust.total_freq(), 2);
        assert_eq!(rust.postings[0].positions, vec![0, 2]);
        assert_eq!(rust.postings[0].field_len, 3);

        let search = index.postings(&Term::new("body", "search")).unwrap();
        assert_eq!(search.doc_freq(), 2);

        let entry = index.field_entry("body").unwrap();
        assert_eq!(entry.doc_count, 2);
        assert_eq!(entry.sum_total_term_freq, 5);
        assert_eq!(entry.sum_doc_freq, 4);
        assert_eq!(index.doc_count(), 2);
    }

    #[test]
    fn missing_term_has_no_postings() {
        let index = InvertedIndex::new();
        assert!(index.postings(&Term::new("body", "absent")).is_none());
        assert!(index.field_entry("body").is_none());
    }
}
