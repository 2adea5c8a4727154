#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub query_cache_size: usize,
    pub max_query_depth: usize,
    pub max_bool_clauses: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            query_cache_size: 1000,   // Cached query results
            max_query_depth: 10,
            max_bool_clauses: 1024,
        }
    }
}
