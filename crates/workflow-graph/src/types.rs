//! Core types for workflow graphs
//!
//! These types define the editable representation of a workflow: nodes bound
//! to a (service, task) pair, directed edges between them, and the graph that
//! owns both.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Client-generated display identifier of a node
pub type NodeId = String;

/// Client-generated display identifier of an edge
pub type EdgeId = String;

/// Backend identifier of a persisted workflow
pub type WorkflowId = i64;

/// Backend identifier of a connected external account
pub type CredentialId = i32;

/// Task-specific node parameters, opaque to the graph model
pub type NodeConfig = serde_json::Map<String, serde_json::Value>;

/// Role of a node in the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Trigger, never has incoming edges
    Listener,
    /// Terminal effect, never has outgoing edges
    Action,
    /// Intermediate step, may have both
    Transformer,
}

impl NodeKind {
    /// Whether an edge may end at a node of this kind
    pub fn accepts_incoming(&self) -> bool {
        !matches!(self, NodeKind::Listener)
    }

    /// Whether an edge may start at a node of this kind
    pub fn allows_outgoing(&self) -> bool {
        !matches!(self, NodeKind::Action)
    }

    /// Wire name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Listener => "listener",
            NodeKind::Action => "action",
            NodeKind::Transformer => "transformer",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "listener" => Ok(NodeKind::Listener),
            "action" => Ok(NodeKind::Action),
            "transformer" => Ok(NodeKind::Transformer),
            other => Err(format!("unknown node kind '{}'", other)),
        }
    }
}

/// Position on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Replace NaN or infinite coordinates with 0
    pub fn finite(self) -> Self {
        let clamp = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self::new(clamp(self.x), clamp(self.y))
    }
}

/// A node instance in a workflow graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Unique identifier for this node within the editing session
    pub display_id: NodeId,
    /// Backend identifier, absent until the node has been saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persisted_id: Option<String>,
    /// Position on the canvas
    pub position: Position,
    /// Service the task belongs to (e.g. "gmail")
    pub service_name: String,
    /// Task within the service (e.g. "send-email")
    pub task_name: String,
    /// Role of the node
    pub kind: NodeKind,
    /// Task-specific configuration
    #[serde(default)]
    pub config: NodeConfig,
    /// Connected account used by the task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<CredentialId>,
}

/// A directed edge between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    /// Unique identifier for this edge within the editing session
    pub display_id: EdgeId,
    /// Backend identifier, absent until the edge has been saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persisted_id: Option<String>,
    /// Source node display id
    pub from: NodeId,
    /// Target node display id
    pub to: NodeId,
}

/// A complete workflow graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowGraph {
    /// Human-readable name
    pub name: String,
    /// Backend identifier, absent for workflows never saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persisted_id: Option<WorkflowId>,
    /// Nodes in the graph
    pub nodes: Vec<GraphNode>,
    /// Edges connecting nodes
    pub edges: Vec<GraphEdge>,
}

impl WorkflowGraph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Find a node by display id
    pub fn find_node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.display_id == id)
    }

    /// Find a node by display id (mutable)
    pub fn find_node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        self.nodes.iter_mut().find(|n| n.display_id == id)
    }

    /// Find an edge by display id
    pub fn find_edge(&self, id: &str) -> Option<&GraphEdge> {
        self.edges.iter().find(|e| e.display_id == id)
    }

    /// Get edges coming into a node
    pub fn incoming_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| e.to == node_id)
    }

    /// Get edges going out of a node
    pub fn outgoing_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| e.from == node_id)
    }

    /// Get the ids of nodes that feed into this node
    pub fn get_dependencies(&self, node_id: &str) -> Vec<NodeId> {
        self.incoming_edges(node_id).map(|e| e.from.clone()).collect()
    }

    /// Get the ids of nodes this node feeds into
    pub fn get_dependents(&self, node_id: &str) -> Vec<NodeId> {
        self.outgoing_edges(node_id).map(|e| e.to.clone()).collect()
    }

    /// Compare two graphs by display ids, ignoring ordering and backend ids
    ///
    /// Nodes must agree on binding, kind, position, config and credential;
    /// edges must agree on endpoints.
    pub fn is_isomorphic(&self, other: &WorkflowGraph) -> bool {
        if self.nodes.len() != other.nodes.len() || self.edges.len() != other.edges.len() {
            return false;
        }

        let nodes: HashMap<&str, &GraphNode> = other
            .nodes
            .iter()
            .map(|n| (n.display_id.as_str(), n))
            .collect();
        let nodes_match = self.nodes.iter().all(|n| match nodes.get(n.display_id.as_str()) {
            Some(o) => {
                n.service_name == o.service_name
                    && n.task_name == o.task_name
                    && n.kind == o.kind
                    && n.position == o.position
                    && n.config == o.config
                    && n.credential_id == o.credential_id
            }
            None => false,
        });

        let edges: HashMap<&str, &GraphEdge> = other
            .edges
            .iter()
            .map(|e| (e.display_id.as_str(), e))
            .collect();
        let edges_match = self.edges.iter().all(|e| match edges.get(e.display_id.as_str()) {
            Some(o) => e.from == o.from && e.to == o.to,
            None => false,
        });

        nodes_match && edges_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, kind: NodeKind) -> GraphNode {
        GraphNode {
            display_id: id.to_string(),
            persisted_id: None,
            position: Position::default(),
            service_name: "gmail".to_string(),
            task_name: "get-email".to_string(),
            kind,
            config: NodeConfig::new(),
            credential_id: None,
        }
    }

    #[test]
    fn test_kind_edge_rules() {
        assert!(!NodeKind::Listener.accepts_incoming());
        assert!(NodeKind::Listener.allows_outgoing());
        assert!(NodeKind::Action.accepts_incoming());
        assert!(!NodeKind::Action.allows_outgoing());
        assert!(NodeKind::Transformer.accepts_incoming());
        assert!(NodeKind::Transformer.allows_outgoing());
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("listener".parse::<NodeKind>().unwrap(), NodeKind::Listener);
        assert_eq!(NodeKind::Transformer.to_string(), "transformer");
        assert!("trigger".parse::<NodeKind>().is_err());
    }

    #[test]
    fn test_graph_edges() {
        let mut graph = WorkflowGraph::new("Test Graph");
        graph.nodes.push(node("node1", NodeKind::Listener));
        graph.nodes.push(node("node2", NodeKind::Action));
        graph.edges.push(GraphEdge {
            display_id: "edge1".to_string(),
            persisted_id: None,
            from: "node1".to_string(),
            to: "node2".to_string(),
        });

        assert_eq!(graph.get_dependencies("node2"), vec!["node1"]);
        assert_eq!(graph.get_dependents("node1"), vec!["node2"]);
        assert!(graph.find_edge("edge1").is_some());
    }

    #[test]
    fn test_isomorphic_ignores_order_and_backend_ids() {
        let mut a = WorkflowGraph::new("a");
        a.nodes.push(node("n1", NodeKind::Listener));
        a.nodes.push(node("n2", NodeKind::Action));

        let mut b = WorkflowGraph::new("b");
        let mut n2 = node("n2", NodeKind::Action);
        n2.persisted_id = Some("db-2".to_string());
        b.nodes.push(n2);
        b.nodes.push(node("n1", NodeKind::Listener));
        assert!(a.is_isomorphic(&b));

        b.nodes[0].position = Position::new(1.0, 0.0);
        assert!(!a.is_isomorphic(&b));
    }
}
