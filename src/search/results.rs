use std::collections::BinaryHeap;
use std::cmp::Ordering;
use crate::core::types::DocId;

/// Search results container
#[derive(Debug, Clone)]
pub struct SearchResults {
    pub hits: Vec<ScoredDocument>,
    pub total_hits: usize,
    pub max_score: f32,
    pub took_ms: u64,
}

/// Document with relevance score
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub doc_id: DocId,
    pub score: f32,
    pub explanation: Option<ScoreExplanation>,
}

// Implement ordering for heap
impl PartialEq for ScoredDocument {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score
    }
}

impl Eq for ScoredDocument {}

impl PartialOrd for ScoredDocument {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        // Reverse order for max-heap
        other.score.partial_cmp(&self.score)
    }
}

impl Ord for ScoredDocument {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

/// Score explanation for debugging
#[derive(Debug, Clone)]
pub struct ScoreExplanation {
    pub value: f32,
    pub description: String,
    pub details: Vec<ScoreExplanation>,
}

impl ScoreExplanation {
    pub fn leaf(value: f32, description: &str) -> Self {
        ScoreExplanation {
            value,
            description: description.to_string(),
            details: Vec::new(),
        }
    }

    pub fn with_details(value: f32, description: &str, details: Vec<ScoreExplanation>) -> Self {
        ScoreExplanation {
            value,
            description: description.to_string(),
            details,
        }
    }
}

/// Top-K collector for efficient result collection
pub struct TopKCollector {
    pub heap: BinaryHeap<ScoredDocument>,
    pub k: usize,
    pub min_score: f32,
    pub total_collected: usize,
}

impl TopKCollector {
    pub fn new(k: usize) -> Self {
        TopKCollector {
            heap: BinaryHeap::with_capacity(k + 1),
            k,
            min_score: 0.0,
            total_collected: 0,
        }
    }

    pub fn collect(&mut self, scored_doc: ScoredDocument) {
        self.total_collected += 1;

        if scored_doc.score > self.min_score || self.heap.len() < self.k {
            self.heap.push(scored_doc);

            if self.heap.len() > self.k {
                self.heap.pop();
                if let Some(min_doc) = self.heap.peek() {
                    self.min_score = min_doc.score;
                }
            }
        }
    }

    pub fn into_results(self) -> Vec<ScoredDocument> {
        let mut results: Vec<_> = self.heap.into_iter().collect();
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        results
    }

    pub fn max_score(&self) -> f32 {
        self.heap.iter().map(|doc| doc.score).fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: u64, score: f32) -> ScoredDocument {
        ScoredDocument { doc_id: DocId(id), score, explanation: None }
    }

    #[test]
    fn keeps_top_k_by_score() {
        let mut collector = TopKCollector::new(2);
        collector.collect(doc(0, 1.0));
        collector.collect(doc(1, 3.0));
        collector.collect(doc(2, 2.0));
        collector.collect(doc(3, 0.5));

        assert_eq!(collector.total_collected, 4);
        assert_eq!(collector.max_score(), 3.0);

        let results = collector.into_results();
        let ids: Vec<u64> = results.iter().map(|d| d.doc_id.0).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn results_sorted_descending() {
        let mut collector = TopKCollector::new(10);
        for (id, score) in [(0, 0.2), (1, 0.9), (2, 0.5)] {
            collector.collect(doc(id, score));
        }
        let scores: Vec<f32> = collector.into_results().iter().map(|d| d.score).collect();
        assert_eq!(scores, vec![0.9, 0.5, 0.2]);
    }
}
