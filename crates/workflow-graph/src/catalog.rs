//! Catalog of node bindings offered in the add-node palette
//!
//! Each entry is a (service, task, kind) triple. The catalog is only used to
//! construct nodes; it is never persisted.
//!
//! # Usage
//!
//! ```
//! use workflow_graph::{NodeCatalog, NodeKind};
//!
//! let catalog = NodeCatalog::builtin();
//! let entry = catalog.find("github", "open-pr").unwrap();
//! assert_eq!(entry.kind, NodeKind::Action);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::NodeKind;

/// Built-in bindings: (task, service, kind)
const BUILTIN: &[(&str, &str, NodeKind)] = &[
    ("get-email", "gmail", NodeKind::Listener),
    ("send-email", "gmail", NodeKind::Action),
    ("open-pr", "github", NodeKind::Action),
    ("get-issue", "github", NodeKind::Listener),
    ("store-file", "drive", NodeKind::Action),
];

/// A selectable task/service binding
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeCatalogEntry {
    /// Task identifier, unique within its service
    pub task_name: String,
    /// Service identifier (e.g. "gmail", "github", "drive")
    pub service_name: String,
    /// Role nodes created from this entry take
    pub kind: NodeKind,
}

impl NodeCatalogEntry {
    pub fn new(task_name: impl Into<String>, service_name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            task_name: task_name.into(),
            service_name: service_name.into(),
            kind,
        }
    }
}

/// Ordered list of catalog entries
///
/// Entries keep insertion order so the palette renders in a stable order.
/// An entry registered for an existing (service, task) pair replaces it.
#[derive(Debug, Clone)]
pub struct NodeCatalog {
    entries: Vec<NodeCatalogEntry>,
}

impl NodeCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The hard-coded catalog shipped with the editor
    pub fn builtin() -> Self {
        Self::from_entries(
            BUILTIN
                .iter()
                .map(|(task, service, kind)| NodeCatalogEntry::new(*task, *service, *kind)),
        )
    }

    /// Build a catalog from entries supplied by an external catalog service
    pub fn from_entries(entries: impl IntoIterator<Item = NodeCatalogEntry>) -> Self {
        let mut catalog = Self::new();
        for entry in entries {
            catalog.register(entry);
        }
        catalog
    }

    /// Register an entry, replacing any entry for the same (service, task)
    pub fn register(&mut self, entry: NodeCatalogEntry) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.service_name == entry.service_name && e.task_name == entry.task_name)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// All selectable entries
    pub fn list_available(&self) -> &[NodeCatalogEntry] {
        &self.entries
    }

    /// Look up an entry by service and task
    pub fn find(&self, service_name: &str, task_name: &str) -> Option<&NodeCatalogEntry> {
        self.entries
            .iter()
            .find(|e| e.service_name == service_name && e.task_name == task_name)
    }

    /// Entries grouped by service for the palette
    pub fn by_service(&self) -> BTreeMap<&str, Vec<&NodeCatalogEntry>> {
        let mut grouped: BTreeMap<&str, Vec<&NodeCatalogEntry>> = BTreeMap::new();
        for entry in &self.entries {
            grouped
                .entry(entry.service_name.as_str())
                .or_default()
                .push(entry);
        }
        grouped
    }

    /// Merge another catalog into this one
    ///
    /// Entries from `other` override entries in `self` for the same pair.
    pub fn merge(&mut self, other: NodeCatalog) {
        for entry in other.entries {
            self.register(entry);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for NodeCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = NodeCatalog::builtin();
        assert_eq!(catalog.len(), 5);

        let get_email = catalog.find("gmail", "get-email").unwrap();
        assert_eq!(get_email.kind, NodeKind::Listener);
        assert!(catalog.find("gmail", "open-pr").is_none());
    }

    #[test]
    fn test_list_is_stable() {
        let first: Vec<_> = NodeCatalog::builtin().list_available().to_vec();
        let second: Vec<_> = NodeCatalog::builtin().list_available().to_vec();
        assert_eq!(first, second);
        assert_eq!(first[0].task_name, "get-email");
    }

    #[test]
    fn test_by_service() {
        let catalog = NodeCatalog::builtin();
        let grouped = catalog.by_service();

        assert_eq!(grouped["gmail"].len(), 2);
        assert_eq!(grouped["github"].len(), 2);
        assert_eq!(grouped["drive"].len(), 1);
    }

    #[test]
    fn test_register_replaces_same_pair() {
        let mut catalog = NodeCatalog::builtin();
        catalog.register(NodeCatalogEntry::new("store-file", "drive", NodeKind::Transformer));

        assert_eq!(catalog.len(), 5);
        assert_eq!(
            catalog.find("drive", "store-file").unwrap().kind,
            NodeKind::Transformer
        );
    }

    #[test]
    fn test_merge() {
        let mut catalog = NodeCatalog::new();
        catalog.merge(NodeCatalog::from_entries(vec![NodeCatalogEntry::new(
            "summarize",
            "openai",
            NodeKind::Transformer,
        )]));
        assert_eq!(catalog.len(), 1);
        assert!(catalog.find("openai", "summarize").is_some());
    }
}
