use std::fmt;
use serde::{Serialize, Deserialize};

/// Main query enum representing all query types.
///
/// Queries are plain values: structural equality is their identity, which is
/// what the profiler keys its breakdown tree on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Query {
    Term(TermQuery),         // Single term search
    Phrase(PhraseQuery),     // Exact phrase match
    Bool(BoolQuery),         // Boolean combinations
    MatchAll,                // Match all documents
}

/// Single term query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermQuery {
    pub field: String,
    pub value: String,
}

/// Phrase query for exact phrase matching
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhraseQuery {
    pub field: String,
    pub phrase: Vec<String>,
}

/// Boolean query with must/should/must_not clauses
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoolQuery {
    pub must: Vec<Query>,      // All must match (AND)
    pub should: Vec<Query>,    // At least one must match (OR)
    pub must_not: Vec<Query>,  // None must match (NOT)
}

impl Query {
    pub fn term(field: &str, value: &str) -> Query {
        Query::Term(TermQuery {
            field: field.to_string(),
            value: value.to_string(),
        })
    }

    pub fn phrase(field: &str, phrase: &[&str]) -> Query {
        Query::Phrase(PhraseQuery {
            field: field.to_string(),
            phrase: phrase.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn must(clauses: Vec<Query>) -> Query {
        Query::Bool(BoolQuery {
            must: clauses,
            ..BoolQuery::default()
        })
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Query::MatchAll => write!(f, "*:*"),
            Query::Term(tq) => write!(f, "{}:{}", tq.field, tq.value),
            Query::Phrase(pq) => write!(f, "{}:\"{}\"", pq.field, pq.phrase.join(" ")),
            Query::Bool(bq) => {
                write!(f, "(")?;
                let mut first = true;
                for q in &bq.must {
                    if !first { write!(f, " ")?; }
                    write!(f, "+{}", q)?;
                    first = false;
                }
                for q in &bq.should {
                    if !first { write!(f, " ")?; }
                    write!(f, "{}", q)?;
                    first = false;
                }
                for q in &bq.must_not {
                    if !first { write!(f, " ")?; }
                    write!(f, "-{}", q)?;
                    first = false;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_clause_markers() {
        let query = Query::Bool(BoolQuery {
            must: vec![Query::term("body", "rust")],
            should: vec![Query::phrase("title", &["fast", "search"])],
            must_not: vec![Query::term("body", "java")],
        });

        assert_eq!(query.to_string(), "(+body:rust title:\"fast search\" -body:java)");
        assert_eq!(Query::MatchAll.to_string(), "*:*");
    }

    #[test]
    fn structural_identity_is_stable() {
        let a = Query::must(vec![Query::term("body", "rust")]);
        let b = Query::must(vec![Query::term("body", "rust")]);
        assert_eq!(a, b);
    }
}
