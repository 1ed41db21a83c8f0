mod common;
use crate::common::{ProbeAction, init_tracing, probe_graph};

use std::sync::Arc;
use std::time::{Duration, Instant};

use dagrun::exec::run_parallel;
use dagrun::graph::DependencyGraph;
use dagrun::pool::{ShutdownMode, ThreadPool};

#[test]
fn empty_graph_finishes_immediately() {
    init_tracing();
    let pool = ThreadPool::new(2).expect("pool starts");
    let graph = Arc::new(DependencyGraph::<ProbeAction>::build(vec![], &[]).expect("empty graph"));

    let report = run_parallel(graph, &pool);
    assert!(report.is_empty());
    assert!(report.is_success());

    pool.shutdown(ShutdownMode::Graceful);
}

#[test]
fn single_node_runs_once() {
    init_tracing();
    let pool = ThreadPool::new(2).expect("pool starts");
    let (graph, probes) = probe_graph(vec![ProbeAction::new()], &[]);

    let report = run_parallel(graph, &pool);
    assert!(report.is_success());
    assert_eq!(probes[0].runs(), 1);

    pool.shutdown(ShutdownMode::Graceful);
}

#[test]
fn every_node_runs_exactly_once() {
    init_tracing();
    let pool = ThreadPool::new(4).expect("pool starts");

    //     0     1
    //    /|\    |
    //   2 3 4   5
    //    \|/   /
    //     6---+
    let actions: Vec<ProbeAction> = (0..7).map(|_| ProbeAction::new()).collect();
    let edges = [(0, 2), (0, 3), (0, 4), (1, 5), (2, 6), (3, 6), (4, 6), (5, 6)];
    let (graph, probes) = probe_graph(actions, &edges);

    let report = run_parallel(graph, &pool);
    assert!(report.is_success());
    assert_eq!(report.succeeded().count(), 7);
    for probe in &probes {
        assert_eq!(probe.runs(), 1);
    }

    pool.shutdown(ShutdownMode::Graceful);
}

#[test]
fn parents_complete_before_children_start() {
    init_tracing();
    let pool = ThreadPool::new(4).expect("pool starts");

    // Diamond with a tail: 0 -> {1, 2} -> 3 -> 4
    let actions: Vec<ProbeAction> = (0..5)
        .map(|_| ProbeAction::new().with_delay(Duration::from_millis(10)))
        .collect();
    let edges = [(0, 1), (0, 2), (1, 3), (2, 3), (3, 4)];
    let (graph, probes) = probe_graph(actions, &edges);

    let report = run_parallel(graph, &pool);
    assert!(report.is_success());

    for (from, to) in edges {
        let finished = probes[from].finished_at().expect("parent ran");
        let started = probes[to].started_at().expect("child ran");
        assert!(
            finished <= started,
            "node {from} must finish before node {to} starts"
        );
    }

    pool.shutdown(ShutdownMode::Graceful);
}

#[test]
fn independent_children_run_concurrently_after_the_root() {
    init_tracing();
    let pool = ThreadPool::new(4).expect("pool starts");

    // Node 0 has no dependencies; nodes 1 and 2 each depend only on node 0.
    // Node 1 takes ~200ms, node 2 takes ~300ms. If they run concurrently the
    // whole run takes about max(200, 300)ms, not their sum.
    let actions = vec![
        ProbeAction::new(),
        ProbeAction::new().with_delay(Duration::from_millis(200)),
        ProbeAction::new().with_delay(Duration::from_millis(300)),
    ];
    let (graph, probes) = probe_graph(actions, &[(0, 1), (0, 2)]);

    let started = Instant::now();
    let report = run_parallel(graph, &pool);
    let elapsed = started.elapsed();

    assert!(report.is_success());
    for probe in &probes {
        assert_eq!(probe.runs(), 1);
    }

    let root_finished = probes[0].finished_at().expect("root ran");
    assert!(probes[1].started_at().expect("node 1 ran") >= root_finished);
    assert!(probes[2].started_at().expect("node 2 ran") >= root_finished);

    assert!(elapsed >= Duration::from_millis(300), "elapsed: {elapsed:?}");
    assert!(
        elapsed < Duration::from_millis(450),
        "children appear to have run sequentially: {elapsed:?}"
    );

    pool.shutdown(ShutdownMode::Graceful);
}

#[test]
fn dedicated_nodes_participate_in_the_run() {
    init_tracing();
    // A single pooled worker, but the long node runs on its own thread, so
    // the short pooled sibling is not starved behind it.
    let pool = ThreadPool::new(1).expect("pool starts");

    let actions = vec![
        ProbeAction::new(),
        ProbeAction::new()
            .dedicated()
            .with_delay(Duration::from_millis(150)),
        ProbeAction::new(),
    ];
    let (graph, probes) = probe_graph(actions, &[(0, 1), (0, 2)]);

    let report = run_parallel(graph, &pool);
    assert!(report.is_success());
    for probe in &probes {
        assert_eq!(probe.runs(), 1);
    }

    let short_finished = probes[2].finished_at().expect("node 2 ran");
    let long_finished = probes[1].finished_at().expect("node 1 ran");
    assert!(
        short_finished < long_finished,
        "pooled sibling should not wait for the dedicated node"
    );

    pool.shutdown(ShutdownMode::Graceful);
}
