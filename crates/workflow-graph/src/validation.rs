//! Structural validation for workflow graphs
//!
//! Checks edge construction rules, whole-graph consistency, and computes the
//! execution order of nodes.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use crate::error::{GraphError, Result};
use crate::store::GraphPolicy;
use crate::types::{NodeId, WorkflowGraph};

/// A structural problem found in a whole graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphIssue {
    /// Two nodes share a display id
    DuplicateNodeId { node_id: String },
    /// Two edges share a display id
    DuplicateEdgeId { edge_id: String },
    /// An edge references a node that is not in the graph
    UnknownNode { edge_id: String, node_id: String },
    /// An edge starts and ends at the same node
    SelfLoop { edge_id: String },
    /// An edge enters a listener
    IncomingToListener { edge_id: String, node_id: String },
    /// An edge leaves an action
    OutgoingFromAction { edge_id: String, node_id: String },
}

impl fmt::Display for GraphIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateNodeId { node_id } => write!(f, "Duplicate node id '{}'", node_id),
            Self::DuplicateEdgeId { edge_id } => write!(f, "Duplicate edge id '{}'", edge_id),
            Self::UnknownNode { edge_id, node_id } => {
                write!(f, "Edge '{}' references unknown node '{}'", edge_id, node_id)
            }
            Self::SelfLoop { edge_id } => write!(f, "Edge '{}' connects a node to itself", edge_id),
            Self::IncomingToListener { edge_id, node_id } => {
                write!(f, "Edge '{}' enters listener '{}'", edge_id, node_id)
            }
            Self::OutgoingFromAction { edge_id, node_id } => {
                write!(f, "Edge '{}' leaves action '{}'", edge_id, node_id)
            }
        }
    }
}

/// Validate a whole graph
///
/// Returns all issues found (not just the first).
pub fn validate_workflow(graph: &WorkflowGraph) -> Vec<GraphIssue> {
    let mut issues = Vec::new();

    validate_unique_ids(graph, &mut issues);
    validate_edges(graph, &mut issues);

    issues
}

/// Check a prospective edge against the construction rules and the policy
///
/// Rules are checked in order: endpoints exist, no self loop, kind rules,
/// then the parallel-edge and cycle policies.
pub fn validate_connection(
    graph: &WorkflowGraph,
    from: &str,
    to: &str,
    policy: &GraphPolicy,
) -> Result<()> {
    let source = graph
        .find_node(from)
        .ok_or_else(|| GraphError::InvalidEndpoint(from.to_string()))?;
    let target = graph
        .find_node(to)
        .ok_or_else(|| GraphError::InvalidEndpoint(to.to_string()))?;

    if from == to {
        return Err(GraphError::SelfLoop(from.to_string()));
    }

    if !source.kind.allows_outgoing() || !target.kind.accepts_incoming() {
        return Err(GraphError::KindViolation {
            from: from.to_string(),
            from_kind: source.kind,
            to: to.to_string(),
            to_kind: target.kind,
        });
    }

    if !policy.allow_parallel_edges && graph.edges.iter().any(|e| e.from == from && e.to == to) {
        return Err(GraphError::DuplicateEdge {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    if !policy.allow_cycles && is_reachable(graph, to, from) {
        return Err(GraphError::CycleRejected {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    Ok(())
}

/// Order node ids so every edge points forward (Kahn's algorithm)
///
/// Nodes without dependencies keep their graph order, which makes the result
/// deterministic. Fails with `CycleDetected` if the graph has a cycle.
pub fn execution_order(graph: &WorkflowGraph) -> Result<Vec<NodeId>> {
    let mut in_degree: HashMap<&str, usize> = graph
        .nodes
        .iter()
        .map(|n| (n.display_id.as_str(), 0))
        .collect();
    for edge in &graph.edges {
        if let Some(deg) = in_degree.get_mut(edge.to.as_str()) {
            *deg += 1;
        }
    }

    let mut queue: VecDeque<&str> = graph
        .nodes
        .iter()
        .map(|n| n.display_id.as_str())
        .filter(|id| in_degree.get(id) == Some(&0))
        .collect();

    let mut order = Vec::with_capacity(graph.nodes.len());
    while let Some(node_id) = queue.pop_front() {
        order.push(node_id.to_string());
        for edge in graph.outgoing_edges(node_id) {
            if let Some(deg) = in_degree.get_mut(edge.to.as_str()) {
                *deg -= 1;
                if *deg == 0 {
                    queue.push_back(&edge.to);
                }
            }
        }
    }

    if order.len() < graph.nodes.len() {
        return Err(GraphError::CycleDetected);
    }
    Ok(order)
}

/// Whether `target` can be reached from `start` by following edges
fn is_reachable(graph: &WorkflowGraph, start: &str, target: &str) -> bool {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::from([start]);

    while let Some(node_id) = queue.pop_front() {
        if node_id == target {
            return true;
        }
        if !seen.insert(node_id) {
            continue;
        }
        queue.extend(graph.outgoing_edges(node_id).map(|e| e.to.as_str()));
    }
    false
}

fn validate_unique_ids(graph: &WorkflowGraph, issues: &mut Vec<GraphIssue>) {
    let mut node_ids = HashSet::new();
    for node in &graph.nodes {
        if !node_ids.insert(node.display_id.as_str()) {
            issues.push(GraphIssue::DuplicateNodeId {
                node_id: node.display_id.clone(),
            });
        }
    }

    let mut edge_ids = HashSet::new();
    for edge in &graph.edges {
        if !edge_ids.insert(edge.display_id.as_str()) {
            issues.push(GraphIssue::DuplicateEdgeId {
                edge_id: edge.display_id.clone(),
            });
        }
    }
}

/// Check endpoint references and the listener/action rules
fn validate_edges(graph: &WorkflowGraph, issues: &mut Vec<GraphIssue>) {
    for edge in &graph.edges {
        let source = graph.find_node(&edge.from);
        let target = graph.find_node(&edge.to);

        if source.is_none() {
            issues.push(GraphIssue::UnknownNode {
                edge_id: edge.display_id.clone(),
                node_id: edge.from.clone(),
            });
        }
        if target.is_none() {
            issues.push(GraphIssue::UnknownNode {
                edge_id: edge.display_id.clone(),
                node_id: edge.to.clone(),
            });
        }
        if edge.from == edge.to {
            issues.push(GraphIssue::SelfLoop {
                edge_id: edge.display_id.clone(),
            });
        }
        if let Some(source) = source {
            if !source.kind.allows_outgoing() {
                issues.push(GraphIssue::OutgoingFromAction {
                    edge_id: edge.display_id.clone(),
                    node_id: source.display_id.clone(),
                });
            }
        }
        if let Some(target) = target {
            if !target.kind.accepts_incoming() {
                issues.push(GraphIssue::IncomingToListener {
                    edge_id: edge.display_id.clone(),
                    node_id: target.display_id.clone(),
                });
            }
        }
    }
}
