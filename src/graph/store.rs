//! Single-writer, many-reader holder for the latest built graph.

use std::sync::{Arc, PoisonError, RwLock};

use super::KnowledgeGraph;

/// Holds the current graph as an `Arc` that is swapped wholesale on rebuild.
///
/// Readers take a [`snapshot`](GraphStore::snapshot) and keep using it even
/// if a rebuild replaces the stored value mid-request. The lock is held only
/// for the pointer clone or swap, never while building or querying.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    current: Arc<RwLock<Arc<KnowledgeGraph>>>,
}

impl GraphStore {
    pub fn new(graph: KnowledgeGraph) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(graph))),
        }
    }

    /// Returns the graph current at the time of the call.
    pub fn snapshot(&self) -> Arc<KnowledgeGraph> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swaps in a freshly built graph and returns the one it replaced.
    pub fn replace(&self, graph: KnowledgeGraph) -> Arc<KnowledgeGraph> {
        let fresh = Arc::new(graph);
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build;
    use crate::models::Record;

    #[test]
    fn test_snapshot_survives_replace() {
        let store = GraphStore::new(build(&[Record::new("1")]));
        let before = store.snapshot();

        let replaced = store.replace(build(&[Record::new("1"), Record::new("2")]));
        assert!(Arc::ptr_eq(&before, &replaced));

        // The earlier snapshot still sees the old graph.
        assert_eq!(before.node_count(), 2);
        assert_eq!(store.snapshot().node_count(), 3);
    }

    #[test]
    fn test_clones_share_state() {
        let store = GraphStore::default();
        let reader = store.clone();
        assert!(reader.snapshot().is_empty());
        store.replace(build(&[Record::new("1")]));
        assert!(!reader.snapshot().is_empty());
    }

    #[test]
    fn test_concurrent_readers_during_swap() {
        let store = GraphStore::new(build(&[Record::new("1")]));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let reader = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let graph = reader.snapshot();
                        assert!(graph.node_count() >= 2);
                    }
                })
            })
            .collect();
        for i in 0..10 {
            store.replace(build(&[Record::new(i.to_string())]));
        }
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
