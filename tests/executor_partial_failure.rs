mod common;
use crate::common::{ProbeAction, init_tracing, probe_graph};

use dagrun::exec::{NodeResult, run_parallel};
use dagrun::pool::{ShutdownMode, ThreadPool};

#[test]
fn failed_root_blocks_its_children_forever() {
    init_tracing();
    let pool = ThreadPool::new(4).expect("pool starts");

    // 0 -> 1, 0 -> 2; node 0 fails.
    let actions = vec![
        ProbeAction::new().failing(),
        ProbeAction::new(),
        ProbeAction::new(),
    ];
    let (graph, probes) = probe_graph(actions, &[(0, 1), (0, 2)]);

    let report = run_parallel(graph, &pool);
    assert!(!report.is_success());

    let failed: Vec<usize> = report.failed().map(|(index, _)| index).collect();
    assert_eq!(failed, vec![0]);

    let never_ran: Vec<usize> = report.never_ran().collect();
    assert_eq!(never_ran, vec![1, 2]);

    assert_eq!(probes[0].runs(), 1);
    assert_eq!(probes[1].runs(), 0);
    assert_eq!(probes[2].runs(), 0);

    pool.shutdown(ShutdownMode::Graceful);
}

#[test]
fn independent_roots_are_unaffected_by_a_failure() {
    init_tracing();
    let pool = ThreadPool::new(4).expect("pool starts");

    // Two independent roots; one fails, the other must still finish.
    let actions = vec![ProbeAction::new().failing(), ProbeAction::new()];
    let (graph, probes) = probe_graph(actions, &[]);

    let report = run_parallel(graph, &pool);
    assert!(!report.is_success());
    assert!(matches!(report.node(0), NodeResult::Failed(_)));
    assert!(matches!(report.node(1), NodeResult::Succeeded));
    assert_eq!(probes[1].runs(), 1);

    pool.shutdown(ShutdownMode::Graceful);
}

#[test]
fn failure_skips_descendants_transitively() {
    init_tracing();
    let pool = ThreadPool::new(2).expect("pool starts");

    // 0 (fails) -> 1 -> 2
    let actions = vec![
        ProbeAction::new().failing(),
        ProbeAction::new(),
        ProbeAction::new(),
    ];
    let (graph, probes) = probe_graph(actions, &[(0, 1), (1, 2)]);

    let report = run_parallel(graph, &pool);
    let never_ran: Vec<usize> = report.never_ran().collect();
    assert_eq!(never_ran, vec![1, 2]);
    assert_eq!(probes[1].runs(), 0);
    assert_eq!(probes[2].runs(), 0);

    pool.shutdown(ShutdownMode::Graceful);
}

#[test]
fn sibling_branch_of_a_failure_still_completes() {
    init_tracing();
    let pool = ThreadPool::new(4).expect("pool starts");

    // Diamond: 0 -> {1 (fails), 2} -> 3. Node 2's branch completes; node 3
    // can never run because one of its parents failed.
    let actions = vec![
        ProbeAction::new(),
        ProbeAction::new().failing(),
        ProbeAction::new(),
        ProbeAction::new(),
    ];
    let (graph, probes) = probe_graph(actions, &[(0, 1), (0, 2), (1, 3), (2, 3)]);

    let report = run_parallel(graph, &pool);
    assert!(!report.is_success());
    assert!(matches!(report.node(0), NodeResult::Succeeded));
    assert!(matches!(report.node(1), NodeResult::Failed(_)));
    assert!(matches!(report.node(2), NodeResult::Succeeded));
    assert!(matches!(report.node(3), NodeResult::Skipped));

    assert_eq!(probes[2].runs(), 1);
    assert_eq!(probes[3].runs(), 0);

    pool.shutdown(ShutdownMode::Graceful);
}

#[test]
fn panicking_action_is_a_node_failure_not_a_crash() {
    init_tracing();
    let pool = ThreadPool::new(2).expect("pool starts");

    let actions = vec![ProbeAction::new().panicking(), ProbeAction::new()];
    let (graph, _probes) = probe_graph(actions, &[(0, 1)]);

    let report = run_parallel(graph, &pool);
    assert!(matches!(report.node(0), NodeResult::Failed(_)));
    assert!(matches!(report.node(1), NodeResult::Skipped));

    // The pool survived the panic; a fresh run on the same pool succeeds.
    let (graph, probes) = probe_graph(vec![ProbeAction::new()], &[]);
    let report = run_parallel(graph, &pool);
    assert!(report.is_success());
    assert_eq!(probes[0].runs(), 1);

    pool.shutdown(ShutdownMode::Graceful);
}
