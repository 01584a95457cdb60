//! Canvas edit history
//!
//! Each entry is a zstd-compressed JSON checkpoint of the canvas (nodes and
//! edges) taken after one store mutation, tagged with the kind of edit that
//! produced it. Workflow metadata (name, backend id) is not part of a
//! checkpoint, so undo never touches it.
//!
//! Undo and redo decode the target checkpoint before moving the cursor: a
//! checkpoint that fails to decode leaves the history where it was.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::types::{GraphEdge, GraphNode};

/// Default number of checkpoints kept
pub const DEFAULT_HISTORY_DEPTH: usize = 100;

const ZSTD_LEVEL: i32 = 3;

/// Store mutation that produced a checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// Initial or freshly loaded canvas; never undone
    Baseline,
    AddNode,
    MoveNode,
    RemoveNode,
    Connect,
    Disconnect,
    SetConfig,
    SetCredential,
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Baseline => "open workflow",
            Self::AddNode => "add node",
            Self::MoveNode => "move node",
            Self::RemoveNode => "remove node",
            Self::Connect => "connect nodes",
            Self::Disconnect => "remove connection",
            Self::SetConfig => "edit configuration",
            Self::SetCredential => "change account",
        };
        f.write_str(label)
    }
}

/// Borrowed view written into a checkpoint
#[derive(Serialize)]
struct CanvasRef<'a> {
    nodes: &'a [GraphNode],
    edges: &'a [GraphEdge],
}

/// Canvas contents restored from a checkpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Canvas {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

struct Checkpoint {
    kind: EditKind,
    compressed: Vec<u8>,
}

impl Checkpoint {
    fn capture(kind: EditKind, nodes: &[GraphNode], edges: &[GraphEdge]) -> Result<Self> {
        let json = serde_json::to_vec(&CanvasRef { nodes, edges })?;
        let compressed = zstd::encode_all(&json[..], ZSTD_LEVEL)
            .map_err(|e| GraphError::Compression(e.to_string()))?;
        Ok(Self { kind, compressed })
    }

    fn restore(&self) -> Result<Canvas> {
        let json = zstd::decode_all(&self.compressed[..])
            .map_err(|e| GraphError::Compression(e.to_string()))?;
        Ok(serde_json::from_slice(&json)?)
    }
}

/// Bounded undo/redo history of canvas checkpoints
pub struct EditHistory {
    checkpoints: VecDeque<Checkpoint>,
    /// Index of the checkpoint matching the live canvas
    cursor: usize,
    depth: usize,
}

impl EditHistory {
    /// Create a history keeping at most `depth` checkpoints
    pub fn new(depth: usize) -> Self {
        Self {
            checkpoints: VecDeque::new(),
            cursor: 0,
            depth: depth.max(1),
        }
    }

    /// Drop everything and start over from `nodes`/`edges`
    pub fn reset(&mut self, nodes: &[GraphNode], edges: &[GraphEdge]) -> Result<()> {
        let baseline = Checkpoint::capture(EditKind::Baseline, nodes, edges)?;
        self.checkpoints.clear();
        self.checkpoints.push_back(baseline);
        self.cursor = 0;
        Ok(())
    }

    /// Record the canvas after an edit, discarding anything redoable
    pub fn record(&mut self, kind: EditKind, nodes: &[GraphNode], edges: &[GraphEdge]) -> Result<()> {
        let checkpoint = Checkpoint::capture(kind, nodes, edges)?;

        self.checkpoints.truncate(self.cursor + 1);
        self.checkpoints.push_back(checkpoint);

        if self.checkpoints.len() > self.depth {
            let excess = self.checkpoints.len() - self.depth;
            self.checkpoints.drain(..excess);
        }
        self.cursor = self.checkpoints.len() - 1;
        Ok(())
    }

    /// Canvas before the last edit, or None if nothing can be undone
    pub fn undo(&mut self) -> Result<Option<Canvas>> {
        if !self.can_undo() {
            return Ok(None);
        }
        let canvas = self.checkpoints[self.cursor - 1].restore()?;
        self.cursor -= 1;
        Ok(Some(canvas))
    }

    /// Canvas after the next undone edit, or None if nothing can be redone
    pub fn redo(&mut self) -> Result<Option<Canvas>> {
        if !self.can_redo() {
            return Ok(None);
        }
        let canvas = self.checkpoints[self.cursor + 1].restore()?;
        self.cursor += 1;
        Ok(Some(canvas))
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.checkpoints.len()
    }

    /// Edit that `undo` would revert, for "Undo add node" style labels
    pub fn undo_kind(&self) -> Option<EditKind> {
        self.can_undo().then(|| self.checkpoints[self.cursor].kind)
    }

    /// Edit that `redo` would reapply
    pub fn redo_kind(&self) -> Option<EditKind> {
        self.can_redo().then(|| self.checkpoints[self.cursor + 1].kind)
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NodeConfig, NodeKind, Position};

    fn node(id: &str) -> GraphNode {
        GraphNode {
            display_id: id.to_string(),
            persisted_id: None,
            position: Position::default(),
            service_name: "gmail".to_string(),
            task_name: "get-email".to_string(),
            kind: NodeKind::Listener,
            config: NodeConfig::new(),
            credential_id: None,
        }
    }

    fn ids(canvas: &Canvas) -> Vec<&str> {
        canvas.nodes.iter().map(|n| n.display_id.as_str()).collect()
    }

    fn history_with(count: usize, depth: usize) -> EditHistory {
        let mut history = EditHistory::new(depth);
        history.reset(&[], &[]).unwrap();
        let mut nodes = Vec::new();
        for i in 0..count {
            nodes.push(node(&format!("n{}", i)));
            history.record(EditKind::AddNode, &nodes, &[]).unwrap();
        }
        history
    }

    #[test]
    fn test_undo_walks_back_to_baseline() {
        let mut history = history_with(2, 10);

        assert_eq!(ids(&history.undo().unwrap().unwrap()), vec!["n0"]);
        assert!(history.undo().unwrap().unwrap().nodes.is_empty());
        assert!(history.undo().unwrap().is_none());
    }

    #[test]
    fn test_redo_and_truncation() {
        let mut history = history_with(2, 10);
        history.undo().unwrap();

        assert_eq!(history.redo_kind(), Some(EditKind::AddNode));
        assert_eq!(ids(&history.redo().unwrap().unwrap()), vec!["n0", "n1"]);
        assert!(history.redo().unwrap().is_none());

        history.undo().unwrap();
        history.record(EditKind::RemoveNode, &[], &[]).unwrap();
        assert!(!history.can_redo());
        assert_eq!(history.len(), 3);
        assert_eq!(history.undo_kind(), Some(EditKind::RemoveNode));
    }

    #[test]
    fn test_depth_drops_oldest() {
        let mut history = history_with(4, 3);
        assert_eq!(history.len(), 3);

        history.undo().unwrap();
        assert_eq!(ids(&history.undo().unwrap().unwrap()), vec!["n0", "n1"]);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_reset_forgets_edits() {
        let mut history = history_with(3, 10);
        history.reset(&[node("loaded")], &[]).unwrap();

        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert_eq!(history.undo_kind(), None);
    }

    #[test]
    fn test_undecodable_checkpoint_keeps_cursor() {
        let mut history = history_with(2, 10);
        history.checkpoints[1].compressed = b"not zstd".to_vec();

        assert!(matches!(history.undo(), Err(GraphError::Compression(_))));
        assert!(history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo_kind(), Some(EditKind::AddNode));
    }

    #[test]
    fn test_edit_kind_labels() {
        assert_eq!(EditKind::Connect.to_string(), "connect nodes");
        assert_eq!(EditKind::SetCredential.to_string(), "change account");
    }
}
