//! The name registry: label ↔ `ProcessId`, one per node.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::id::ProcessId;

/// `label -> ProcessId`, plus the reverse index needed to garbage-collect a
/// dead process's registrations in one pass.
#[derive(Debug, Default)]
pub struct Registry {
    labels: DashMap<String, ProcessId>,
    owned_labels: DashMap<ProcessId, HashSet<String>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs or replaces the registration for `label`.
    pub fn register(&self, label: String, pid: ProcessId) {
        if let Some((_, previous)) = self.labels.remove(&label) {
            if let Some(mut owned) = self.owned_labels.get_mut(&previous) {
                owned.remove(&label);
            }
        }
        self.owned_labels
            .entry(pid)
            .or_default()
            .insert(label.clone());
        self.labels.insert(label, pid);
    }

    pub fn unregister(&self, label: &str) {
        if let Some((_, pid)) = self.labels.remove(label) {
            if let Some(mut owned) = self.owned_labels.get_mut(&pid) {
                owned.remove(label);
            }
        }
    }

    pub fn whereis(&self, label: &str) -> Option<ProcessId> {
        self.labels.get(label).map(|entry| *entry)
    }

    /// Removes every label owned by `pid`, returning them. Called by the
    /// controller on process death.
    pub fn remove_process(&self, pid: &ProcessId) -> Vec<String> {
        let labels = self
            .owned_labels
            .remove(pid)
            .map(|(_, set)| set.into_iter().collect::<Vec<_>>())
            .unwrap_or_default();
        for label in &labels {
            self.labels.remove(label);
        }
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{LocalProcessId, NodeId};

    fn pid(n: u64) -> ProcessId {
        ProcessId::new(NodeId(0), LocalProcessId(n))
    }

    #[test]
    fn register_then_whereis() {
        let registry = Registry::new();
        registry.register("logger".to_string(), pid(1));
        assert_eq!(registry.whereis("logger"), Some(pid(1)));
    }

    #[test]
    fn whereis_unknown_label_is_none() {
        let registry = Registry::new();
        assert_eq!(registry.whereis("nope"), None);
    }

    #[test]
    fn reregistering_replaces() {
        let registry = Registry::new();
        registry.register("svc".to_string(), pid(1));
        registry.register("svc".to_string(), pid(2));
        assert_eq!(registry.whereis("svc"), Some(pid(2)));
        // pid(1) no longer owns "svc": dying shouldn't remove pid(2)'s claim.
        assert!(registry.remove_process(&pid(1)).is_empty());
        assert_eq!(registry.whereis("svc"), Some(pid(2)));
    }

    #[test]
    fn process_death_clears_its_labels() {
        let registry = Registry::new();
        registry.register("a".to_string(), pid(1));
        registry.register("b".to_string(), pid(1));
        let mut removed = registry.remove_process(&pid(1));
        removed.sort();
        assert_eq!(removed, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(registry.whereis("a"), None);
        assert_eq!(registry.whereis("b"), None);
    }
}
