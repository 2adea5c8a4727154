use crate::core::types::DocId;

#[derive(Debug, Clone)]
pub struct Posting {
    pub doc_id: DocId,
    pub term_freq: u32,       // Term frequency in document
    pub positions: Vec<u32>,  // Token positions for phrase queries
    pub field_len: u32,       // Tokens in this document's field
}

/// Posting list for a term
/// Note: Sorted by doc_id for efficient merging
#[derive(Debug, Clone, Default)]
pub struct PostingList {
    pub postings: Vec<Posting>,  // Sorted by doc_id
}

impl PostingList {
    pub fn new() -> Self {
        PostingList {
            postings: Vec::new(),
        }
    }

    pub fn add_posting(&mut self, posting: Posting) {
        // Keep sorted by doc_id for efficient intersection
        match self.postings.binary_search_by_key(&posting.doc_id.0, |p| p.doc_id.0) {
            Ok(pos) => {
                self.postings[pos] = posting;
            }
            Err(pos) => {
                self.postings.insert(pos, posting);
            }
        }
    }

    pub fn get(&self, doc_id: DocId) -> Option<&Posting> {
        self.postings
            .binary_search_by_key(&doc_id.0, |p| p.doc_id.0)
            .ok()
            .map(|pos| &self.postings[pos])
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn doc_freq(&self) -> u32 {
        self.postings.len() as u32
    }

    pub fn total_freq(&self) -> u64 {
        self.postings.iter().map(|p| p.term_freq as u64).sum()
    }

    /// Intersect two posting lists (simple linear merge)
    pub fn intersect(&self, other: &PostingList) -> Vec<Posting> {
        let mut result = Vec::new();
        let mut i = 0;
        let mut j = 0;

        while i < self.postings.len() && j < other.postings.len() {
            let doc_id1 = self.postings[i].doc_id.0;
            let doc_id2 = other.postings[j].doc_id.0;

            if doc_id1 == doc_id2 {
                result.push(self.postings[i].clone());
                i += 1;
                j += 1;
            } else if doc_id1 < doc_id2 {
                i += 1;
            } else {
                j += 1;
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(doc: u64, tf: u32) -> Posting {
        Posting {
            doc_id: DocId(doc),
            term_freq: tf,
            positions: Vec::new(),
            field_len: 10,
        }
    }

    #[test]
    fn postings_stay_sorted() {
        let mut list = PostingList::new();
        list.add_posting(posting(5, 1));
        list.add_posting(posting(1, 2));
        list.add_posting(posting(3, 1));

        let ids: Vec<u64> = list.postings.iter().map(|p| p.doc_id.0).collect();
        assert_eq!(ids, vec![1, 3, 5]);
        assert_eq!(list.doc_freq(), 3);
        assert_eq!(list.total_freq(), 4);
    }

    #[test]
    fn intersect_keeps_common_docs() {
        let mut a = PostingList::new();
        let mut b = PostingList::new();
        for doc in [1, 2, 4, 7] {
            a.add_posting(posting(doc, 1));
        }
        for doc in [2, 3, 7, 9] {
            b.add_posting(posting(doc, 1));
        }

        let common: Vec<u64> = a.intersect(&b).iter().map(|p| p.doc_id.0).collect();
        assert_eq!(common, vec![2, 7]);
    }
}
