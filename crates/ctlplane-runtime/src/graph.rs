//! Per-session tool-call graph: an append-only DAG of invocations guarded
//! by a single mutex, per spec.md §5's locking discipline.

use ctlplane_core::error::{CoreError, CoreResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CallNode {
    pub invocation_id: Uuid,
    pub parent_call_id: Option<Uuid>,
    pub tool_name: String,
}

#[derive(Default)]
pub struct ToolCallGraph {
    nodes: Mutex<HashMap<Uuid, CallNode>>,
}

impl ToolCallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// `RegisterCall`: atomic, rejects a duplicate `invocationID` or a
    /// parent that isn't already registered (an orphan call).
    pub fn register(&self, invocation_id: Uuid, parent_call_id: Option<Uuid>, tool_name: &str) -> CoreResult<()> {
        let mut nodes = self.nodes.lock();
        if nodes.contains_key(&invocation_id) {
            return Err(CoreError::ToolGraphError(format!(
                "duplicate invocation id {invocation_id}"
            )));
        }
        if let Some(parent) = parent_call_id {
            if !nodes.contains_key(&parent) {
                return Err(CoreError::ToolGraphError(format!(
                    "orphan call: parent {parent} is not registered"
                )));
            }
        }
        nodes.insert(
            invocation_id,
            CallNode { invocation_id, parent_call_id, tool_name: tool_name.to_string() },
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_call_needs_no_parent() {
        let graph = ToolCallGraph::new();
        let id = Uuid::new_v4();
        assert!(graph.register(id, None, "restart-pod").is_ok());
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn duplicate_invocation_id_rejected() {
        let graph = ToolCallGraph::new();
        let id = Uuid::new_v4();
        graph.register(id, None, "a").unwrap();
        assert!(graph.register(id, None, "a").is_err());
    }

    #[test]
    fn orphan_call_rejected() {
        let graph = ToolCallGraph::new();
        let parent = Uuid::new_v4();
        let child = Uuid::new_v4();
        assert!(graph.register(child, Some(parent), "b").is_err());
    }

    #[test]
    fn chained_call_with_registered_parent_accepted() {
        let graph = ToolCallGraph::new();
        let parent = Uuid::new_v4();
        let child = Uuid::new_v4();
        graph.register(parent, None, "a").unwrap();
        assert!(graph.register(child, Some(parent), "b").is_ok());
    }
}
