// src/exec/report.rs

//! Per-run outcome aggregation.

use std::sync::Arc;

/// Terminal result of a single node within one run.
#[derive(Debug, Clone)]
pub enum NodeResult {
    Succeeded,
    /// The node's action returned an error or panicked.
    Failed(Arc<anyhow::Error>),
    /// Never ran: an upstream dependency failed, so its prerequisites can
    /// never be satisfied.
    Skipped,
}

/// Outcome of one full run over a dependency graph, indexed by node.
///
/// A run is a success only if every node succeeded; anything else is a
/// partial failure and the accessors enumerate exactly which nodes
/// completed, failed, or never ran.
#[derive(Debug)]
pub struct RunReport {
    results: Vec<NodeResult>,
}

impl RunReport {
    pub(super) fn new(results: Vec<NodeResult>) -> Self {
        Self { results }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn node(&self, index: usize) -> &NodeResult {
        &self.results[index]
    }

    pub fn results(&self) -> &[NodeResult] {
        &self.results
    }

    pub fn is_success(&self) -> bool {
        self.results
            .iter()
            .all(|result| matches!(result, NodeResult::Succeeded))
    }

    pub fn succeeded(&self) -> impl Iterator<Item = usize> {
        self.indices_where(|result| matches!(result, NodeResult::Succeeded))
    }

    pub fn failed(&self) -> impl Iterator<Item = (usize, &anyhow::Error)> {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(index, result)| match result {
                NodeResult::Failed(error) => Some((index, error.as_ref())),
                _ => None,
            })
    }

    /// Nodes that never ran because of an upstream failure.
    pub fn never_ran(&self) -> impl Iterator<Item = usize> {
        self.indices_where(|result| matches!(result, NodeResult::Skipped))
    }

    fn indices_where(&self, pred: impl Fn(&NodeResult) -> bool) -> impl Iterator<Item = usize> {
        self.results
            .iter()
            .enumerate()
            .filter_map(move |(index, result)| pred(result).then_some(index))
    }
}
