// src/config/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::Manifest;
use crate::errors::{DagrunError, Result};

/// Semantic validation of a deserialized manifest.
pub fn validate(manifest: &Manifest) -> Result<()> {
    ensure_has_actions(manifest)?;
    validate_pool(manifest)?;
    validate_dependencies(manifest)?;
    validate_dag(manifest)?;
    Ok(())
}

fn ensure_has_actions(manifest: &Manifest) -> Result<()> {
    if manifest.action.is_empty() {
        return Err(DagrunError::ConfigError(
            "manifest must contain at least one [action.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_pool(manifest: &Manifest) -> Result<()> {
    if manifest.pool.workers == 0 {
        return Err(DagrunError::ConfigError(
            "[pool].workers must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_dependencies(manifest: &Manifest) -> Result<()> {
    for (name, action) in manifest.action.iter() {
        for dep in action.after.iter() {
            if !manifest.action.contains_key(dep) {
                return Err(DagrunError::ConfigError(format!(
                    "action '{}' has unknown dependency '{}' in `after`",
                    name, dep
                )));
            }
            if dep == name {
                return Err(DagrunError::ConfigError(format!(
                    "action '{}' cannot depend on itself in `after`",
                    name
                )));
            }
        }
    }
    Ok(())
}

fn validate_dag(manifest: &Manifest) -> Result<()> {
    // Build a petgraph graph from the actions and their dependencies.
    //
    // Edge direction: dep -> action
    // For:
    //   [action.B]
    //   after = ["A"]
    // we add edge A -> B.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in manifest.action.keys() {
        graph.add_node(name.as_str());
    }

    for (name, action) in manifest.action.iter() {
        for dep in action.after.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    // A topological sort will fail if there is a cycle.
    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(DagrunError::DagCycle(format!(
                "cycle detected in action DAG involving action '{}'",
                node
            )))
        }
    }
}
