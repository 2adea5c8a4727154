use std::collections::BTreeMap;
use std::sync::Arc;
use crate::core::error::Result;
use crate::core::types::{DocId, Term};
use crate::index::posting::{Posting, PostingList};
use crate::query::ast::Query;
use crate::reader::snapshot::SnapshotReader;
use crate::scoring::scorer::Similarity;
use crate::scoring::stats::{FieldStatistics, TermStatistics};
use crate::search::results::ScoreExplanation;

/// Per-query scoring object, built once per node of the query tree
pub trait Weight {
    fn query(&self) -> &Query;

    /// Contribution to the query-level normalization value
    fn value_for_normalization(&self) -> f32;

    /// Apply the query-level normalization factor
    fn normalize(&mut self, norm: f32);

    /// Matching-document iterator for this weight, or None when nothing
    /// can match
    fn scorer(&self, reader: &SnapshotReader) -> Result<Option<Box<dyn DocScorer>>>;

    fn explain(&self, reader: &SnapshotReader, doc_id: DocId) -> Result<ScoreExplanation>;
}

/// Iterates matching documents in ascending doc id order
pub trait DocScorer {
    fn advance(&mut self) -> Option<DocId>;

    /// Score of the document most recently returned by advance
    fn score(&mut self) -> f32;
}

/// Scoring inputs resolved once at weight-construction time
#[derive(Clone)]
pub struct ScoreParams {
    pub similarity: Arc<dyn Similarity>,
    pub idf: f32,
    pub avg_field_len: f32,
}

impl ScoreParams {
    pub fn new(
        similarity: Arc<dyn Similarity>,
        term: &TermStatistics,
        field: &FieldStatistics,
    ) -> Self {
        let idf = similarity.idf(term, field);
        ScoreParams {
            similarity,
            idf,
            avg_field_len: field.avg_field_length(),
        }
    }

    /// Phrase idf is the sum over its terms
    pub fn for_phrase(
        similarity: Arc<dyn Similarity>,
        terms: &[TermStatistics],
        field: &FieldStatistics,
    ) -> Self {
        let idf: f32 = terms.iter().map(|t| similarity.idf(t, field)).sum();
        ScoreParams {
            similarity,
            idf,
            avg_field_len: field.avg_field_length(),
        }
    }
}

// ---------------------------------------------------------------- term

pub struct TermWeight {
    query: Query,
    term: Term,
    params: Option<ScoreParams>,  // None when scores are not required
    norm: f32,
}

impl TermWeight {
    pub fn new(query: Query, term: Term, params: Option<ScoreParams>) -> Self {
        TermWeight {
            query,
            term,
            params,
            norm: 1.0,
        }
    }

    fn posting_score(&self, posting: &Posting) -> f32 {
        match &self.params {
            Some(p) => {
                p.similarity
                    .score(posting.term_freq, posting.field_len, p.avg_field_len, p.idf)
                    * self.norm
            }
            None => self.norm,
        }
    }
}

impl Weight for TermWeight {
    fn query(&self) -> &Query {
        &self.query
    }

    fn value_for_normalization(&self) -> f32 {
        self.params.as_ref().map(|p| p.idf * p.idf).unwrap_or(0.0)
    }

    fn normalize(&mut self, norm: f32) {
        self.norm = norm;
    }

    fn scorer(&self, reader: &SnapshotReader) -> Result<Option<Box<dyn DocScorer>>> {
        let Some(list) = reader.postings(&self.term) else {
            return Ok(None);
        };
        let postings: Vec<Posting> = list
            .postings
            .iter()
            .filter(|p| !reader.is_deleted(p.doc_id))
            .cloned()
            .collect();
        if postings.is_empty() {
            return Ok(None);
        }
        Ok(Some(Box::new(TermScorer {
            postings,
            params: self.params.clone(),
            norm: self.norm,
            next: 0,
            current: None,
        })))
    }

    fn explain(&self, reader: &SnapshotReader, doc_id: DocId) -> Result<ScoreExplanation> {
        let posting = reader
            .postings(&self.term)
            .and_then(|list| list.get(doc_id))
            .filter(|_| !reader.is_deleted(doc_id));
        let Some(posting) = posting else {
            return Ok(ScoreExplanation::leaf(
                0.0,
                &format!("no match for {}:{}", self.term.field, self.term.text),
            ));
        };

        let value = self.posting_score(posting);
        let details = match &self.params {
            Some(p) => vec![
                ScoreExplanation::leaf(p.idf, "idf"),
                ScoreExplanation::leaf(posting.term_freq as f32, "termFreq"),
                ScoreExplanation::leaf(posting.field_len as f32, "fieldLength"),
                ScoreExplanation::leaf(self.norm, "queryNorm"),
            ],
            None => vec![ScoreExplanation::leaf(self.norm, "queryNorm")],
        };
        Ok(ScoreExplanation::with_details(
            value,
            &format!("weight({}:{})", self.term.field, self.term.text),
            details,
        ))
    }
}

struct TermScorer {
    postings: Vec<Posting>,
    params: Option<ScoreParams>,
    norm: f32,
    next: usize,
    current: Option<usize>,
}

impl DocScorer for TermScorer {
    fn advance(&mut self) -> Option<DocId> {
        if self.next < self.postings.len() {
            let i = self.next;
            self.next += 1;
            self.current = Some(i);
            Some(self.postings[i].doc_id)
        } else {
            self.current = None;
            None
        }
    }

    fn score(&mut self) -> f32 {
        let Some(i) = self.current else { return 0.0 };
        let posting = &self.postings[i];
        match &self.params {
            Some(p) => {
                p.similarity
                    .score(posting.term_freq, posting.field_len, p.avg_field_len, p.idf)
                    * self.norm
            }
            None => self.norm,
        }
    }
}

// -------------------------------------------------------------- phrase

pub struct PhraseWeight {
    query: Query,
    terms: Vec<Term>,
    params: Option<ScoreParams>,
    norm: f32,
}

impl PhraseWeight {
    pub fn new(query: Query, terms: Vec<Term>, params: Option<ScoreParams>) -> Self {
        PhraseWeight {
            query,
            terms,
            params,
            norm: 1.0,
        }
    }

    /// Number of positions where the full phrase starts in this document
    fn phrase_freq(&self, lists: &[&PostingList], doc_id: DocId) -> u32 {
        let Some(first) = lists[0].get(doc_id) else { return 0 };
        first
            .positions
            .iter()
            .filter(|&&start| {
                lists.iter().enumerate().skip(1).all(|(i, list)| {
                    list.get(doc_id)
                        .is_some_and(|p| p.positions.contains(&(start + i as u32)))
                })
            })
            .count() as u32
    }

    fn matches(&self, reader: &SnapshotReader) -> Option<Vec<(DocId, u32, u32)>> {
        if self.terms.is_empty() {
            return None;
        }
        let mut lists = Vec::with_capacity(self.terms.len());
        for term in &self.terms {
            lists.push(reader.postings(term)?);
        }

        // Narrow to docs containing every term, then verify adjacency
        let mut candidates = PostingList {
            postings: lists[0].postings.clone(),
        };
        for list in &lists[1..] {
            candidates = PostingList {
                postings: candidates.intersect(list),
            };
        }

        let matches: Vec<(DocId, u32, u32)> = candidates
            .postings
            .iter()
            .filter(|p| !reader.is_deleted(p.doc_id))
            .filter_map(|p| {
                let freq = self.phrase_freq(&lists, p.doc_id);
                (freq > 0).then_some((p.doc_id, freq, p.field_len))
            })
            .collect();
        Some(matches)
    }
}

impl Weight for PhraseWeight {
    fn query(&self) -> &Query {
        &self.query
    }

    fn value_for_normalization(&self) -> f32 {
        self.params.as_ref().map(|p| p.idf * p.idf).unwrap_or(0.0)
    }

    fn normalize(&mut self, norm: f32) {
        self.norm = norm;
    }

    fn scorer(&self, reader: &SnapshotReader) -> Result<Option<Box<dyn DocScorer>>> {
        let matches = match self.matches(reader) {
            Some(m) if !m.is_empty() => m,
            _ => return Ok(None),
        };
        Ok(Some(Box::new(PhraseScorer {
            matches,
            params: self.params.clone(),
            norm: self.norm,
            next: 0,
            current: None,
        })))
    }

    fn explain(&self, reader: &SnapshotReader, doc_id: DocId) -> Result<ScoreExplanation> {
        let found = self
            .matches(reader)
            .and_then(|m| m.into_iter().find(|(d, _, _)| *d == doc_id));
        let Some((_, freq, field_len)) = found else {
            return Ok(ScoreExplanation::leaf(0.0, &format!("no match for {}", self.query)));
        };

        let value = match &self.params {
            Some(p) => p.similarity.score(freq, field_len, p.avg_field_len, p.idf) * self.norm,
            None => self.norm,
        };
        Ok(ScoreExplanation::with_details(
            value,
            &format!("weight({})", self.query),
            vec![ScoreExplanation::leaf(freq as f32, "phraseFreq")],
        ))
    }
}

struct PhraseScorer {
    matches: Vec<(DocId, u32, u32)>,  // (doc, phrase freq, field length)
    params: Option<ScoreParams>,
    norm: f32,
    next: usize,
    current: Option<usize>,
}

impl DocScorer for PhraseScorer {
    fn advance(&mut self) -> Option<DocId> {
        if self.next < self.matches.len() {
            let i = self.next;
            self.next += 1;
            self.current = Some(i);
            Some(self.matches[i].0)
        } else {
            self.current = None;
            None
        }
    }

    fn score(&mut self) -> f32 {
        let Some(i) = self.current else { return 0.0 };
        let (_, freq, field_len) = self.matches[i];
        match &self.params {
            Some(p) => p.similarity.score(freq, field_len, p.avg_field_len, p.idf) * self.norm,
            None => self.norm,
        }
    }
}

// ---------------------------------------------------------------- bool

pub struct BoolWeight {
    query: Query,
    must: Vec<Box<dyn Weight>>,
    should: Vec<Box<dyn Weight>>,
    must_not: Vec<Box<dyn Weight>>,
}

impl BoolWeight {
    pub fn new(
        query: Query,
        must: Vec<Box<dyn Weight>>,
        should: Vec<Box<dyn Weight>>,
        must_not: Vec<Box<dyn Weight>>,
    ) -> Self {
        BoolWeight {
            query,
            must,
            should,
            must_not,
        }
    }
}

/// Exhaust a child scorer into a doc-to-score map
fn drain_scores(weight: &dyn Weight, reader: &SnapshotReader) -> Result<BTreeMap<DocId, f32>> {
    let mut docs = BTreeMap::new();
    if let Some(mut scorer) = weight.scorer(reader)? {
        while let Some(doc_id) = scorer.advance() {
            docs.insert(doc_id, scorer.score());
        }
    }
    Ok(docs)
}

impl Weight for BoolWeight {
    fn query(&self) -> &Query {
        &self.query
    }

    fn value_for_normalization(&self) -> f32 {
        self.must
            .iter()
            .chain(self.should.iter())
            .map(|w| w.value_for_normalization())
            .sum()
    }

    fn normalize(&mut self, norm: f32) {
        for w in self
            .must
            .iter_mut()
            .chain(self.should.iter_mut())
            .chain(self.must_not.iter_mut())
        {
            w.normalize(norm);
        }
    }

    fn scorer(&self, reader: &SnapshotReader) -> Result<Option<Box<dyn DocScorer>>> {
        // Must clauses: intersection, scores summed
        let mut candidates: Option<BTreeMap<DocId, f32>> = None;
        for weight in &self.must {
            let docs = drain_scores(weight.as_ref(), reader)?;
            candidates = Some(match candidates {
                None => docs,
                Some(prev) => prev
                    .into_iter()
                    .filter_map(|(doc, score)| docs.get(&doc).map(|s| (doc, score + s)))
                    .collect(),
            });
            if candidates.as_ref().is_some_and(|c| c.is_empty()) {
                return Ok(None);
            }
        }

        // Should clauses: union when standalone, score boost otherwise
        let mut candidates = candidates.unwrap_or_default();
        for weight in &self.should {
            let docs = drain_scores(weight.as_ref(), reader)?;
            if self.must.is_empty() {
                for (doc, score) in docs {
                    *candidates.entry(doc).or_insert(0.0) += score;
                }
            } else {
                for (doc, score) in docs {
                    if let Some(existing) = candidates.get_mut(&doc) {
                        *existing += score;
                    }
                }
            }
        }

        // Must-not clauses: exclusion
        for weight in &self.must_not {
            for doc in drain_scores(weight.as_ref(), reader)?.into_keys() {
                candidates.remove(&doc);
            }
        }

        if candidates.is_empty() {
            return Ok(None);
        }
        Ok(Some(Box::new(MapScorer {
            entries: candidates.into_iter().collect(),
            next: 0,
            current: None,
        })))
    }

    fn explain(&self, reader: &SnapshotReader, doc_id: DocId) -> Result<ScoreExplanation> {
        for weight in &self.must_not {
            if weight.explain(reader, doc_id)?.value > 0.0 {
                return Ok(ScoreExplanation::leaf(0.0, "doc matches a must_not clause"));
            }
        }

        let mut details = Vec::new();
        let mut value = 0.0;
        for weight in &self.must {
            let child = weight.explain(reader, doc_id)?;
            if child.value <= 0.0 {
                return Ok(ScoreExplanation::with_details(
                    0.0,
                    "doc fails a must clause",
                    vec![child],
                ));
            }
            value += child.value;
            details.push(child);
        }
        for weight in &self.should {
            let child = weight.explain(reader, doc_id)?;
            if child.value > 0.0 {
                value += child.value;
                details.push(child);
            }
        }

        if details.is_empty() {
            return Ok(ScoreExplanation::leaf(0.0, "no matching clauses"));
        }
        Ok(ScoreExplanation::with_details(value, "sum of clause scores", details))
    }
}

/// Scorer over a precomputed doc-to-score map
struct MapScorer {
    entries: Vec<(DocId, f32)>,  // Ascending doc id (BTreeMap order)
    next: usize,
    current: Option<usize>,
}

impl DocScorer for MapScorer {
    fn advance(&mut self) -> Option<DocId> {
        if self.next < self.entries.len() {
            let i = self.next;
            self.next += 1;
            self.current = Some(i);
            Some(self.entries[i].0)
        } else {
            self.current = None;
            None
        }
    }

    fn score(&mut self) -> f32 {
        self.current.map(|i| self.entries[i].1).unwrap_or(0.0)
    }
}

// ----------------------------------------------------------- match all

pub struct AllWeight {
    query: Query,
    norm: f32,
}

impl AllWeight {
    pub fn new(query: Query) -> Self {
        AllWeight { query, norm: 1.0 }
    }
}

impl Weight for AllWeight {
    fn query(&self) -> &Query {
        &self.query
    }

    fn value_for_normalization(&self) -> f32 {
        1.0
    }

    fn normalize(&mut self, norm: f32) {
        self.norm = norm;
    }

    fn scorer(&self, reader: &SnapshotReader) -> Result<Option<Box<dyn DocScorer>>> {
        let docs: Vec<DocId> = reader.live_docs().collect();
        if docs.is_empty() {
            return Ok(None);
        }
        Ok(Some(Box::new(MapScorer {
            entries: docs.into_iter().map(|d| (d, self.norm)).collect(),
            next: 0,
            current: None,
        })))
    }

    fn explain(&self, reader: &SnapshotReader, doc_id: DocId) -> Result<ScoreExplanation> {
        if reader.is_deleted(doc_id) || !reader.snapshot.index.docs.contains(&doc_id) {
            return Ok(ScoreExplanation::leaf(0.0, "doc not in index"));
        }
        Ok(ScoreExplanation::leaf(self.norm, "match_all"))
    }
}
