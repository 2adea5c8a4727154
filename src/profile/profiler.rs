use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::Mutex;
use serde::Serialize;
use crate::core::error::Result;
use crate::profile::breakdown::{Breakdown, BreakdownRecord, TimingType};
use crate::query::ast::Query;

/// Breakdown tree for one query execution.
///
/// Weight construction is call-stack shaped, so nodes attach under whatever
/// node is currently being built: `query_breakdown` pushes the tree-building
/// cursor and `finish_node` pops it. Rewriting happens before any node
/// exists and cannot use that model; rewrite breakdowns are handed out
/// unattached and reported back retroactively via `record_rewrite`.
pub struct Profiler {
    state: Mutex<ProfilerState>,
}

#[derive(Default)]
struct ProfilerState {
    nodes: Vec<ProfileNode>,
    roots: Vec<usize>,
    stack: Vec<usize>,
    by_query: HashMap<Query, usize>,
    rewrites: Vec<RewriteEntry>,
}

struct ProfileNode {
    query: Query,
    breakdown: Arc<Breakdown>,
    children: Vec<usize>,
}

struct RewriteEntry {
    original: Query,
    rewritten: Query,
    breakdown: Arc<Breakdown>,
}

impl Profiler {
    pub fn new() -> Self {
        Profiler {
            state: Mutex::new(ProfilerState::default()),
        }
    }

    /// Get or create the breakdown for a query node and make it the current
    /// attachment point. Must be paired with a later `finish_node`.
    pub fn query_breakdown(&self, query: &Query) -> Arc<Breakdown> {
        let mut state = self.state.lock();

        if let Some(&id) = state.by_query.get(query) {
            state.stack.push(id);
            return state.nodes[id].breakdown.clone();
        }

        let id = state.nodes.len();
        let breakdown = Arc::new(Breakdown::new());
        state.nodes.push(ProfileNode {
            query: query.clone(),
            breakdown: breakdown.clone(),
            children: Vec::new(),
        });

        match state.stack.last().copied() {
            Some(parent) => state.nodes[parent].children.push(id),
            None => state.roots.push(id),
        }
        state.by_query.insert(query.clone(), id);
        state.stack.push(id);

        breakdown
    }

    /// Pop the tree-building cursor after a node's weight is built
    pub fn finish_node(&self) {
        self.state.lock().stack.pop();
    }

    /// Breakdown that is not linked into the tree. Its timing is lost
    /// unless it comes back through `record_rewrite`.
    pub fn unattached_rewrite_breakdown(&self) -> Arc<Breakdown> {
        Arc::new(Breakdown::new())
    }

    /// Retroactive report of one completed rewrite
    pub fn record_rewrite(&self, original: &Query, rewritten: &Query, breakdown: Arc<Breakdown>) {
        self.state.lock().rewrites.push(RewriteEntry {
            original: original.clone(),
            rewritten: rewritten.clone(),
            breakdown,
        });
    }

    /// Snapshot the tree and rewrite reports for inspection
    pub fn results(&self) -> ProfileResults {
        let guard = self.state.lock();
        let state = &*guard;

        fn render(state: &ProfilerState, id: usize) -> ProfileResult {
            let node = &state.nodes[id];
            ProfileResult {
                query: node.query.to_string(),
                breakdown: node.breakdown.record(),
                children: node.children.iter().map(|&c| render(state, c)).collect(),
            }
        }

        let queries = state.roots.iter().map(|&r| render(state, r)).collect();
        let rewrites: Vec<RewriteResult> = state
            .rewrites
            .iter()
            .map(|entry| RewriteResult {
                original: entry.original.to_string(),
                rewritten: entry.rewritten.to_string(),
                nanos: entry.breakdown.elapsed(TimingType::Rewrite).as_nanos() as u64,
            })
            .collect();
        let total_rewrite_nanos = rewrites.iter().map(|r| r.nanos).sum();

        ProfileResults {
            queries,
            rewrites,
            total_rewrite_nanos,
        }
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResults {
    pub queries: Vec<ProfileResult>,
    pub rewrites: Vec<RewriteResult>,
    pub total_rewrite_nanos: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResult {
    pub query: String,
    pub breakdown: BreakdownRecord,
    pub children: Vec<ProfileResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RewriteResult {
    pub original: String,
    pub rewritten: String,
    pub nanos: u64,
}

impl ProfileResults {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
