use crate::scoring::stats::{FieldStatistics, TermStatistics};

/// Similarity trait
pub trait Similarity: Send + Sync {
    fn idf(&self, term: &TermStatistics, field: &FieldStatistics) -> f32;

    fn score(&self, term_freq: u32, field_len: u32, avg_field_len: f32, idf: f32) -> f32;

    /// Normalization factor applied to a weight tree after construction
    fn query_norm(&self, value_for_normalization: f32) -> f32 {
        if value_for_normalization > 0.0 && value_for_normalization.is_finite() {
            1.0 / value_for_normalization.sqrt()
        } else {
            1.0
        }
    }

    fn name(&self) -> &str;
}

/// BM25 Similarity
pub struct Bm25Similarity {
    pub k1: f32,  // Term frequency saturation (default: 1.2)
    pub b: f32,   // Length normalization strength (default: 0.75)
}

impl Default for Bm25Similarity {
    fn default() -> Self {
        Bm25Similarity {
            k1: 1.2,
            b: 0.75,
        }
    }
}

impl Similarity for Bm25Similarity {
    fn idf(&self, term: &TermStatistics, field: &FieldStatistics) -> f32 {
        let n = field.doc_count as f32;
        let df = term.doc_freq as f32;

        // BM25 IDF formula
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    fn score(&self, term_freq: u32, field_len: u32, avg_field_len: f32, idf: f32) -> f32 {
        let tf = term_freq as f32;
        let len = field_len as f32;
        let avg = if avg_field_len > 0.0 { avg_field_len } else { 1.0 };

        let numerator = idf * tf * (self.k1 + 1.0);
        let denominator = tf + self.k1 * (1.0 - self.b + self.b * (len / avg));

        numerator / denominator
    }

    /// BM25 scores are already bounded; no query-level normalization
    fn query_norm(&self, _value_for_normalization: f32) -> f32 {
        1.0
    }

    fn name(&self) -> &str {
        "bm25"
    }
}

/// TF-IDF Similarity
pub struct TfIdfSimilarity {
    pub normalize: bool,
}

impl TfIdfSimilarity {
    pub fn new(normalize: bool) -> Self {
        TfIdfSimilarity { normalize }
    }
}

impl Similarity for TfIdfSimilarity {
    fn idf(&self, term: &TermStatistics, field: &FieldStatistics) -> f32 {
        if term.doc_freq == 0 {
            return 0.0;
        }
        (field.doc_count as f32 / term.doc_freq as f32).ln().max(0.0)
    }

    fn score(&self, term_freq: u32, field_len: u32, _avg_field_len: f32, idf: f32) -> f32 {
        let tf = if self.normalize && field_len > 0 {
            term_freq as f32 / field_len as f32
        } else {
            term_freq as f32
        };

        tf * idf
    }

    fn name(&self) -> &str {
        "tfidf"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> FieldStatistics {
        FieldStatistics { doc_count: 1000, sum_doc_freq: 5000, sum_total_term_freq: 12000 }
    }

    #[test]
    fn rare_terms_get_higher_idf() {
        let bm25 = Bm25Similarity::default();
        let common = TermStatistics { doc_freq: 500, total_term_freq: 900 };
        let rare = TermStatistics { doc_freq: 5, total_term_freq: 6 };

        assert!(bm25.idf(&rare, &field()) > bm25.idf(&common, &field()));

        let tfidf = TfIdfSimilarity::new(false);
        assert!(tfidf.idf(&rare, &field()) > tfidf.idf(&common, &field()));
    }

    #[test]
    fn bm25_saturates_with_term_frequency() {
        let bm25 = Bm25Similarity::default();
        let stats = TermStatistics { doc_freq: 10, total_term_freq: 30 };
        let idf = bm25.idf(&stats, &field());
        let avg = field().avg_field_length();

        let one = bm25.score(1, 12, avg, idf);
        let five = bm25.score(5, 12, avg, idf);
        let fifty = bm25.score(50, 12, avg, idf);

        assert!(five > one);
        // Diminishing returns: ten times the frequency is far less than ten times the score
        assert!(fifty < five * 5.0);
    }

    #[test]
    fn bm25_skips_query_normalization() {
        let bm25 = Bm25Similarity::default();
        assert_eq!(bm25.query_norm(4.0), 1.0);

        let tfidf = TfIdfSimilarity::new(true);
        assert_eq!(tfidf.query_norm(4.0), 0.5);
        assert_eq!(tfidf.query_norm(0.0), 1.0);
    }
}
