// src/graph/graph.rs

use thiserror::Error;

use super::node::Node;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("edge ({from}, {to}) references a node outside 0..{len}")]
    InvalidEdge { from: usize, to: usize, len: usize },
}

/// Indexed adjacency representation of a directed acyclic dependency graph.
///
/// Built once from a payload list and an edge list, read-only afterwards:
/// no node or edge is ever added or removed, which makes unsynchronized
/// concurrent reads from multiple threads safe.
///
/// Acyclicity is a documented precondition, not enforced here. A cyclic
/// edge list stalls the executor on the nodes of the cycle; callers taking
/// untrusted input should validate upfront (the config layer does, via a
/// topological sort).
#[derive(Debug)]
pub struct DependencyGraph<T> {
    nodes: Vec<Node<T>>,
    children: Vec<Vec<usize>>,
    parents: Vec<Vec<usize>>,
}

impl<T> DependencyGraph<T> {
    /// Build the graph from payloads and `(from, to)` edges, where `from`
    /// must complete before `to` may start.
    pub fn build(payloads: Vec<T>, edges: &[(usize, usize)]) -> Result<Self, GraphError> {
        let len = payloads.len();
        let nodes = payloads
            .into_iter()
            .enumerate()
            .map(|(index, payload)| Node::new(index, payload))
            .collect();

        let mut children = vec![Vec::new(); len];
        let mut parents = vec![Vec::new(); len];

        for &(from, to) in edges {
            if from >= len || to >= len {
                return Err(GraphError::InvalidEdge { from, to, len });
            }
            children[from].push(to);
            parents[to].push(from);
        }

        Ok(Self {
            nodes,
            children,
            parents,
        })
    }

    /// Total node count.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> &Node<T> {
        &self.nodes[index]
    }

    /// Nodes that depend on `index` (its successors).
    pub fn children_of(&self, index: usize) -> impl Iterator<Item = &Node<T>> {
        self.children[index].iter().map(|&i| &self.nodes[i])
    }

    /// Nodes that `index` depends on (its predecessors).
    pub fn parents_of(&self, index: usize) -> impl Iterator<Item = &Node<T>> {
        self.parents[index].iter().map(|&i| &self.nodes[i])
    }

    pub fn parent_count(&self, index: usize) -> usize {
        self.parents[index].len()
    }

    /// Indices of nodes with no prerequisites; these are ready at load time.
    pub fn roots(&self) -> impl Iterator<Item = usize> {
        (0..self.len()).filter(|&i| self.parents[i].is_empty())
    }
}
