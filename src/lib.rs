// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod graph;
pub mod logging;
pub mod pool;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::Manifest;
use crate::config::loader::load_and_validate;
use crate::exec::{NodeResult, ShellAction, run_parallel};
use crate::graph::DependencyGraph;
use crate::pool::{ShutdownMode, ThreadPool};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - manifest loading + validation
/// - dependency graph construction
/// - thread pool + parallel executor
/// - outcome reporting
pub fn run(args: CliArgs) -> Result<()> {
    let manifest_path = PathBuf::from(&args.manifest);
    let manifest = load_and_validate(&manifest_path)?;

    if args.dry_run {
        print_dry_run(&manifest);
        return Ok(());
    }

    let workers = args.workers.unwrap_or(manifest.pool.workers);
    let graph = Arc::new(build_graph(&manifest)?);
    let pool = ThreadPool::new(workers)?;

    info!(actions = graph.len(), workers, "running action DAG");
    let report = run_parallel(Arc::clone(&graph), &pool);
    pool.shutdown(ShutdownMode::Graceful);

    for (index, result) in report.results().iter().enumerate() {
        let name = graph.node(index).payload().name();
        match result {
            NodeResult::Succeeded => info!(action = %name, "action succeeded"),
            NodeResult::Failed(error) => warn!(action = %name, error = %error, "action failed"),
            NodeResult::Skipped => warn!(action = %name, "action never ran (upstream failure)"),
        }
    }

    if report.is_success() {
        Ok(())
    } else {
        anyhow::bail!(
            "{} of {} actions did not complete",
            report.len() - report.succeeded().count(),
            report.len()
        )
    }
}

/// Build the indexed dependency graph from a validated manifest.
///
/// Actions map to node indices in manifest key order; every `after` entry
/// becomes a dep -> action edge.
fn build_graph(manifest: &Manifest) -> Result<DependencyGraph<ShellAction>> {
    let names: Vec<&str> = manifest.action.keys().map(String::as_str).collect();
    let index_of: HashMap<&str, usize> = names
        .iter()
        .enumerate()
        .map(|(index, name)| (*name, index))
        .collect();

    let payloads = manifest
        .action
        .iter()
        .map(|(name, action)| ShellAction::new(name.as_str(), action.cmd.as_str(), action.dedicated))
        .collect();

    let mut edges = Vec::new();
    for (name, action) in manifest.action.iter() {
        for dep in action.after.iter() {
            edges.push((index_of[dep.as_str()], index_of[name.as_str()]));
        }
    }

    Ok(DependencyGraph::build(payloads, &edges)?)
}

/// Simple dry-run output: print actions, deps and commands.
fn print_dry_run(manifest: &Manifest) {
    println!("dagrun dry-run");
    println!("  pool.workers = {}", manifest.pool.workers);
    println!();

    println!("actions ({}):", manifest.action.len());
    for (name, action) in manifest.action.iter() {
        println!("  - {name}");
        println!("      cmd: {}", action.cmd);
        if !action.after.is_empty() {
            println!("      after: {:?}", action.after);
        }
        if action.dedicated {
            println!("      dedicated: true");
        }
    }

    debug!("dry-run complete (no execution)");
}
