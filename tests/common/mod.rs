#![allow(dead_code)]

pub use dagrun_test_utils::builders;
pub use dagrun_test_utils::init_tracing;
pub use dagrun_test_utils::probe::{Probe, ProbeAction};

use std::sync::Arc;

use dagrun::graph::DependencyGraph;

/// Build a probe graph and keep one observer per node.
pub fn probe_graph(
    actions: Vec<ProbeAction>,
    edges: &[(usize, usize)],
) -> (Arc<DependencyGraph<ProbeAction>>, Vec<Probe>) {
    let probes = actions.iter().map(ProbeAction::probe).collect();
    let graph = DependencyGraph::build(actions, edges).expect("edges reference valid nodes");
    (Arc::new(graph), probes)
}
