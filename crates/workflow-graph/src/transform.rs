//! Mapping between the editable graph and the backend's wire documents
//!
//! Both directions are pure. Positions and configs are encoded as compact
//! JSON text, and decoding that text must give back exactly the values that
//! were encoded.

use crate::dto::{EdgeRecord, LoadResponse, NodeRecord, SaveEdge, SaveNode, SavePayload, SaveWorkflow};
use crate::error::{GraphError, Result};
use crate::types::{GraphEdge, GraphNode, NodeConfig, Position, WorkflowGraph};
use crate::validation;

/// Build the create/update document for a graph
///
/// The payload carries the graph's persisted id when it has one, which the
/// backend treats as an update. Fails only if a node position is not finite,
/// since such a position cannot be written as JSON.
pub fn to_save_payload(graph: &WorkflowGraph, workflow_name: &str) -> Result<SavePayload> {
    let nodes = graph
        .nodes
        .iter()
        .map(encode_node)
        .collect::<Result<Vec<_>>>()?;

    let edges = graph
        .edges
        .iter()
        .map(|edge| SaveEdge {
            persisted_id: edge.persisted_id.clone(),
            display_id: edge.display_id.clone(),
            from: edge.from.clone(),
            to: edge.to.clone(),
        })
        .collect();

    Ok(SavePayload {
        workflow: SaveWorkflow {
            persisted_id: graph.persisted_id,
            name: workflow_name.to_string(),
        },
        nodes,
        edges,
    })
}

/// Decode a fetched workflow into an editable graph
///
/// Fails with `MalformedPayload` if a position or config does not parse, or
/// if the records do not form a valid graph (unknown edge endpoints,
/// duplicate ids, self loops, edges leaving an action or entering a listener).
pub fn from_load_response(response: &LoadResponse) -> Result<WorkflowGraph> {
    let nodes = response
        .nodes
        .iter()
        .map(decode_node)
        .collect::<Result<Vec<_>>>()?;

    let edges = response.edges.iter().map(decode_edge).collect();

    let graph = WorkflowGraph {
        name: response.workflow.name.clone(),
        persisted_id: Some(response.workflow.id),
        nodes,
        edges,
    };

    let issues = validation::validate_workflow(&graph);
    if !issues.is_empty() {
        let message = issues
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(GraphError::malformed(message));
    }

    Ok(graph)
}

/// Encode a position as compact JSON text
pub fn encode_position(position: &Position) -> Result<String> {
    if !position.x.is_finite() || !position.y.is_finite() {
        return Err(GraphError::malformed(format!(
            "position ({}, {}) is not finite",
            position.x, position.y
        )));
    }
    Ok(serde_json::to_string(position)?)
}

/// Decode position text written by `encode_position`
pub fn decode_position(text: &str) -> Result<Position> {
    serde_json::from_str(text)
        .map_err(|e| GraphError::malformed(format!("invalid position '{}': {}", text, e)))
}

/// Encode a config as compact JSON text (`{}` when empty)
pub fn encode_config(config: &NodeConfig) -> Result<String> {
    Ok(serde_json::to_string(config)?)
}

/// Decode config text; empty text and `null` give an empty config
pub fn decode_config(text: &str) -> Result<NodeConfig> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(NodeConfig::new());
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(serde_json::Value::Null) => Ok(NodeConfig::new()),
        Ok(other) => Err(GraphError::malformed(format!(
            "config must be a JSON object, got '{}'",
            other
        ))),
        Err(e) => Err(GraphError::malformed(format!("invalid config '{}': {}", text, e))),
    }
}

fn encode_node(node: &GraphNode) -> Result<SaveNode> {
    let position = encode_position(&node.position)
        .map_err(|e| GraphError::malformed(format!("node '{}': {}", node.display_id, e)))?;

    Ok(SaveNode {
        persisted_id: node.persisted_id.clone(),
        display_id: node.display_id.clone(),
        service_name: node.service_name.clone(),
        task_name: node.task_name.clone(),
        kind: node.kind,
        position,
        config: encode_config(&node.config)?,
        credential_id: node.credential_id,
    })
}

fn decode_node(record: &NodeRecord) -> Result<GraphNode> {
    let position = decode_position(&record.position_text)
        .map_err(|e| GraphError::malformed(format!("node '{}': {}", record.display_id, e)))?;
    let config = decode_config(&record.config_text)
        .map_err(|e| GraphError::malformed(format!("node '{}': {}", record.display_id, e)))?;

    Ok(GraphNode {
        display_id: record.display_id.clone(),
        persisted_id: Some(record.persisted_id.clone()),
        position,
        service_name: record.service_name.clone(),
        task_name: record.task_name.clone(),
        kind: record.kind,
        config,
        credential_id: record.credential_id,
    })
}

fn decode_edge(record: &EdgeRecord) -> GraphEdge {
    GraphEdge {
        display_id: record.display_id.clone(),
        persisted_id: Some(record.persisted_id.clone()),
        from: record.from_display_id.clone(),
        to: record.to_display_id.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NodeCatalog;
    use crate::dto::WorkflowSummary;
    use crate::store::GraphStore;
    use crate::types::NodeKind;
    use chrono::Utc;
    use serde_json::json;

    /// What a compliant backend does: assign ids, echo display ids
    fn server_echo(payload: &SavePayload, workflow_id: i64) -> LoadResponse {
        let now = Utc::now();
        LoadResponse {
            workflow: WorkflowSummary {
                id: payload.workflow.persisted_id.unwrap_or(workflow_id),
                name: payload.workflow.name.clone(),
                active: false,
                created_at: now,
                updated_at: now,
                user_id: None,
            },
            nodes: payload
                .nodes
                .iter()
                .enumerate()
                .map(|(i, n)| NodeRecord {
                    persisted_id: n.persisted_id.clone().unwrap_or(format!("node-{}", i)),
                    display_id: n.display_id.clone(),
                    service_name: n.service_name.clone(),
                    task_name: n.task_name.clone(),
                    kind: n.kind,
                    position_text: n.position.clone(),
                    config_text: n.config.clone(),
                    credential_id: n.credential_id,
                    workflow_id: Some(workflow_id),
                })
                .collect(),
            edges: payload
                .edges
                .iter()
                .enumerate()
                .map(|(i, e)| EdgeRecord {
                    persisted_id: e.persisted_id.clone().unwrap_or(format!("edge-{}", i)),
                    display_id: e.display_id.clone(),
                    from_display_id: e.from.clone(),
                    to_display_id: e.to.clone(),
                    workflow_id: Some(workflow_id),
                })
                .collect(),
        }
    }

    fn summary() -> WorkflowSummary {
        let now = Utc::now();
        WorkflowSummary {
            id: 1,
            name: "Loaded".to_string(),
            active: false,
            created_at: now,
            updated_at: now,
            user_id: Some(1),
        }
    }

    fn record(id: &str, kind: NodeKind, position: &str, config: &str) -> NodeRecord {
        NodeRecord {
            persisted_id: format!("db-{}", id),
            display_id: id.to_string(),
            service_name: "svc".to_string(),
            task_name: "task".to_string(),
            kind,
            position_text: position.to_string(),
            config_text: config.to_string(),
            credential_id: None,
            workflow_id: Some(1),
        }
    }

    fn edge(from: &str, to: &str) -> EdgeRecord {
        EdgeRecord {
            persisted_id: "db-e".to_string(),
            display_id: format!("{}-{}", from, to),
            from_display_id: from.to_string(),
            to_display_id: to.to_string(),
            workflow_id: Some(1),
        }
    }

    #[test]
    fn test_single_listener_payload() {
        let catalog = NodeCatalog::builtin();
        let mut store = GraphStore::new();
        store.add_node(catalog.find("gmail", "get-email").unwrap(), Position::new(0.0, 0.0));

        let payload = to_save_payload(&store.snapshot(), "My Flow").unwrap();

        assert_eq!(payload.workflow.name, "My Flow");
        assert_eq!(payload.workflow.persisted_id, None);
        assert_eq!(payload.nodes.len(), 1);
        assert_eq!(payload.nodes[0].kind, NodeKind::Listener);
        assert_eq!(payload.nodes[0].config, "{}");
        assert_eq!(payload.nodes[0].position, r#"{"x":0.0,"y":0.0}"#);
        assert!(payload.edges.is_empty());
    }

    #[test]
    fn test_round_trip_through_server_echo() {
        let mut store = GraphStore::new();
        let listener = store.add_node(
            &crate::NodeCatalogEntry::new("get-email", "gmail", NodeKind::Listener),
            Position::new(0.1, -250.333333333333),
        );
        let transformer = store.add_node(
            &crate::NodeCatalogEntry::new("summarize", "openai", NodeKind::Transformer),
            Position::new(1e-7, 3.0e12),
        );
        let action = store.add_node(
            &crate::NodeCatalogEntry::new("send-email", "gmail", NodeKind::Action),
            Position::new(420.5, 17.25),
        );

        let mut config = NodeConfig::new();
        config.insert("subject".to_string(), json!("Re: {{subject}}"));
        config.insert("retries".to_string(), json!(3));
        config.insert("ratio".to_string(), json!(0.30000000000000004));
        config.insert("nested".to_string(), json!({"cc": ["a@x.io", "b@x.io"], "html": false}));
        store.set_config(&action, config).unwrap();
        store.set_credential(&action, Some(12)).unwrap();

        store.connect(&listener, &transformer).unwrap();
        store.connect(&transformer, &action).unwrap();
        store.connect(&listener, &action).unwrap();
        store.connect(&listener, &action).unwrap();

        let original = store.snapshot();
        let payload = to_save_payload(&original, "Digest").unwrap();
        let decoded = from_load_response(&server_echo(&payload, 5)).unwrap();

        assert!(original.is_isomorphic(&decoded));
        assert_eq!(decoded.name, "Digest");
        assert_eq!(decoded.persisted_id, Some(5));
        assert!(decoded.nodes.iter().all(|n| n.persisted_id.is_some()));
    }

    #[test]
    fn test_update_payload_carries_ids() {
        let response = LoadResponse {
            workflow: summary(),
            nodes: vec![
                record("a", NodeKind::Listener, r#"{"x":1,"y":2}"#, "{}"),
                record("b", NodeKind::Action, r#"{"x":3,"y":4}"#, "{}"),
            ],
            edges: vec![edge("a", "b")],
        };
        let graph = from_load_response(&response).unwrap();
        let payload = to_save_payload(&graph, &graph.name).unwrap();

        assert!(payload.is_update());
        assert_eq!(payload.workflow.persisted_id, Some(1));
        assert_eq!(payload.nodes[0].persisted_id.as_deref(), Some("db-a"));
        assert_eq!(payload.edges[0].persisted_id.as_deref(), Some("db-e"));
    }

    #[test]
    fn test_unknown_edge_endpoint_is_malformed() {
        let response = LoadResponse {
            workflow: summary(),
            nodes: vec![record("b", NodeKind::Action, r#"{"x":0,"y":0}"#, "{}")],
            edges: vec![edge("ghost", "b")],
        };
        assert!(matches!(
            from_load_response(&response),
            Err(GraphError::MalformedPayload(msg)) if msg.contains("ghost")
        ));
    }

    #[test]
    fn test_bad_position_is_malformed() {
        let response = LoadResponse {
            workflow: summary(),
            nodes: vec![record("a", NodeKind::Listener, "{x: 1}", "{}")],
            edges: vec![],
        };
        assert!(matches!(
            from_load_response(&response),
            Err(GraphError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_bad_config_is_malformed() {
        for config in ["{\"a\":", "[1,2]", "\"text\""] {
            let response = LoadResponse {
                workflow: summary(),
                nodes: vec![record("a", NodeKind::Listener, r#"{"x":0,"y":0}"#, config)],
                edges: vec![],
            };
            assert!(
                matches!(from_load_response(&response), Err(GraphError::MalformedPayload(_))),
                "config {:?} should be rejected",
                config
            );
        }
    }

    #[test]
    fn test_empty_and_null_config_decode_to_empty() {
        assert!(decode_config("").unwrap().is_empty());
        assert!(decode_config("null").unwrap().is_empty());
        assert!(decode_config(" {} ").unwrap().is_empty());
    }

    #[test]
    fn test_kind_violation_in_response_is_malformed() {
        let response = LoadResponse {
            workflow: summary(),
            nodes: vec![
                record("a", NodeKind::Listener, r#"{"x":0,"y":0}"#, "{}"),
                record("b", NodeKind::Action, r#"{"x":0,"y":0}"#, "{}"),
            ],
            edges: vec![edge("b", "a")],
        };
        assert!(matches!(
            from_load_response(&response),
            Err(GraphError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_non_finite_position_cannot_be_saved() {
        let mut store = GraphStore::new();
        store.add_node(
            &crate::NodeCatalogEntry::new("t", "s", NodeKind::Listener),
            Position::new(f64::NAN, 0.0),
        );
        assert!(to_save_payload(&store.snapshot(), "x").is_err());
    }
}
