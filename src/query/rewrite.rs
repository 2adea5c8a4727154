use crate::query::ast::{BoolQuery, Query, TermQuery};

/// Trait for query rewrite rules
pub trait RewriteRule: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the rewritten node, or None if the rule does not apply
    fn apply(&self, query: &Query) -> Option<Query>;
}

/// Rule: a Bool with a single must clause and nothing else is that clause
pub struct CollapseSingleClauseBool;

impl RewriteRule for CollapseSingleClauseBool {
    fn name(&self) -> &str {
        "collapse_single_clause_bool"
    }

    fn apply(&self, query: &Query) -> Option<Query> {
        match query {
            Query::Bool(bq)
                if bq.must.len() == 1 && bq.should.is_empty() && bq.must_not.is_empty() =>
            {
                Some(bq.must[0].clone())
            }
            Query::Bool(bq)
                if bq.should.len() == 1 && bq.must.is_empty() && bq.must_not.is_empty() =>
            {
                Some(bq.should[0].clone())
            }
            _ => None,
        }
    }
}

/// Rule: a Bool with no clauses at all matches everything
pub struct EmptyBoolToMatchAll;

impl RewriteRule for EmptyBoolToMatchAll {
    fn name(&self) -> &str {
        "empty_bool_to_match_all"
    }

    fn apply(&self, query: &Query) -> Option<Query> {
        match query {
            Query::Bool(bq)
                if bq.must.is_empty() && bq.should.is_empty() && bq.must_not.is_empty() =>
            {
                Some(Query::MatchAll)
            }
            _ => None,
        }
    }
}

/// Rule: a one-word phrase is a term query
pub struct SingleTermPhrase;

impl RewriteRule for SingleTermPhrase {
    fn name(&self) -> &str {
        "single_term_phrase"
    }

    fn apply(&self, query: &Query) -> Option<Query> {
        match query {
            Query::Phrase(pq) if pq.phrase.len() == 1 => Some(Query::Term(TermQuery {
                field: pq.field.clone(),
                value: pq.phrase[0].clone(),
            })),
            _ => None,
        }
    }
}

/// Rule: hoist pure-must Bool children into the parent's must list
pub struct FlattenNestedMust;

impl RewriteRule for FlattenNestedMust {
    fn name(&self) -> &str {
        "flatten_nested_must"
    }

    fn apply(&self, query: &Query) -> Option<Query> {
        let Query::Bool(bq) = query else { return None };
        let nested = bq.must.iter().any(|q| {
            matches!(q, Query::Bool(inner) if inner.should.is_empty() && inner.must_not.is_empty())
        });
        if !nested {
            return None;
        }

        let mut must = Vec::with_capacity(bq.must.len());
        for clause in &bq.must {
            match clause {
                Query::Bool(inner) if inner.should.is_empty() && inner.must_not.is_empty() => {
                    must.extend(inner.must.iter().cloned());
                }
                other => must.push(other.clone()),
            }
        }

        Some(Query::Bool(BoolQuery {
            must,
            should: bq.should.clone(),
            must_not: bq.must_not.clone(),
        }))
    }
}

/// Rewrites queries into simpler equivalent forms
pub struct QueryRewriter {
    pub rules: Vec<Box<dyn RewriteRule>>,
    pub max_passes: usize,
}

impl QueryRewriter {
    pub fn new() -> Self {
        QueryRewriter {
            rules: vec![
                Box::new(FlattenNestedMust),
                Box::new(CollapseSingleClauseBool),
                Box::new(EmptyBoolToMatchAll),
                Box::new(SingleTermPhrase),
            ],
            max_passes: 8,
        }
    }

    /// Apply all rules bottom-up until a fixpoint (bounded by max_passes)
    pub fn rewrite(&self, query: &Query) -> Query {
        let mut current = query.clone();
        for _ in 0..self.max_passes {
            let (next, changed) = self.rewrite_once(&current);
            current = next;
            if !changed {
                break;
            }
        }
        current
    }

    fn rewrite_once(&self, query: &Query) -> (Query, bool) {
        // Children first, so parent-level rules see already-simplified clauses
        let (mut current, mut changed) = match query {
            Query::Bool(bq) => {
                let mut any = false;
                let mut rewrite_clauses = |clauses: &[Query]| -> Vec<Query> {
                    clauses
                        .iter()
                        .map(|q| {
                            let (next, child_changed) = self.rewrite_once(q);
                            any |= child_changed;
                            next
                        })
                        .collect()
                };
                let must = rewrite_clauses(&bq.must);
                let should = rewrite_clauses(&bq.should);
                let must_not = rewrite_clauses(&bq.must_not);
                (Query::Bool(BoolQuery { must, should, must_not }), any)
            }
            other => (other.clone(), false),
        };

        for rule in &self.rules {
            if let Some(next) = rule.apply(&current) {
                current = next;
                changed = true;
            }
        }

        (current, changed)
    }
}

impl Default for QueryRewriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_must_collapses_to_inner_query() {
        let rewriter = QueryRewriter::new();
        let query = Query::must(vec![Query::term("body", "rust")]);
        assert_eq!(rewriter.rewrite(&query), Query::term("body", "rust"));
    }

    #[test]
    fn empty_bool_becomes_match_all() {
        let rewriter = QueryRewriter::new();
        let query = Query::Bool(BoolQuery::default());
        assert_eq!(rewriter.rewrite(&query), Query::MatchAll);
    }

    #[test]
    fn one_word_phrase_becomes_term() {
        let rewriter = QueryRewriter::new();
        let query = Query::phrase("body", &["rust"]);
        assert_eq!(rewriter.rewrite(&query), Query::term("body", "rust"));
    }

    #[test]
    fn deeply_nested_must_flattens_to_fixpoint() {
        let rewriter = QueryRewriter::new();
        let query = Query::must(vec![
            Query::must(vec![
                Query::term("body", "rust"),
                Query::must(vec![Query::term("body", "search")]),
            ]),
            Query::term("body", "engine"),
        ]);

        let rewritten = rewriter.rewrite(&query);
        let expected = Query::must(vec![
            Query::term("body", "rust"),
            Query::term("body", "search"),
            Query::term("body", "engine"),
        ]);
        assert_eq!(rewritten, expected);

        // Fixpoint: rewriting again changes nothing
        assert_eq!(rewriter.rewrite(&rewritten), rewritten);
    }

    #[test]
    fn stable_queries_pass_through_unchanged() {
        let rewriter = QueryRewriter::new();
        let query = Query::Bool(BoolQuery {
            must: vec![Query::term("body", "rust"), Query::term("body", "fast")],
            should: vec![],
            must_not: vec![Query::term("body", "slow")],
        });
        assert_eq!(rewriter.rewrite(&query), query);
    }
}
