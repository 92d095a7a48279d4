//! The monitor/link supervision graph: tables of who watches whom and who
//! is linked to whom, mutated exclusively by the node controller.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::id::{Identifier, MonitorRef, ProcessId};

/// Tracks live `Monitor`/`Link` relations and answers "who do I notify when
/// `E` dies".
///
/// The sole mutator is the node controller; the map type only needs to be
/// `Sync`, not lock-free-under-concurrent-writers, because of that
/// single-writer discipline — `dashmap` is used here for the same reason
/// the registry uses it: cheap, lock-free reads from anywhere that wants to
/// peek without round-tripping through the controller.
#[derive(Debug, Default)]
pub struct SupervisionGraph {
    monitors: DashMap<Identifier, Vec<(MonitorRef, ProcessId)>>,
    links: DashMap<Identifier, HashSet<Identifier>>,
}

impl SupervisionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_monitor(&self, target: Identifier, watcher: ProcessId, mref: MonitorRef) {
        self.monitors.entry(target).or_default().push((mref, watcher));
    }

    /// Removes a single `(MonitorRef, watcher)` entry. Idempotent: a
    /// mismatched or already-removed `mref` is simply not found.
    pub fn remove_monitor(&self, target: Identifier, mref: MonitorRef) {
        if let Some(mut entries) = self.monitors.get_mut(&target) {
            entries.retain(|(existing, _)| *existing != mref);
        }
    }

    /// Removes and returns every monitor registered against `target` — used
    /// on death, since each produces exactly one notification.
    pub fn take_monitors_of(&self, target: &Identifier) -> Vec<(MonitorRef, ProcessId)> {
        self.monitors
            .remove(target)
            .map(|(_, v)| v)
            .unwrap_or_default()
    }

    /// Adds a symmetric link between `a` and `b`.
    pub fn add_link(&self, a: Identifier, b: Identifier) {
        self.links.entry(a).or_default().insert(b);
        self.links.entry(b).or_default().insert(a);
    }

    pub fn remove_link(&self, a: Identifier, b: Identifier) {
        if let Some(mut set) = self.links.get_mut(&a) {
            set.remove(&b);
        }
        if let Some(mut set) = self.links.get_mut(&b) {
            set.remove(&a);
        }
    }

    /// Removes and returns every entity linked to `target` — used on death
    /// to find who must be notified/terminated.
    pub fn take_links_of(&self, target: &Identifier) -> Vec<Identifier> {
        let others = self
            .links
            .remove(target)
            .map(|(_, v)| v.into_iter().collect::<Vec<_>>())
            .unwrap_or_default();
        for other in &others {
            if let Some(mut set) = self.links.get_mut(other) {
                set.remove(target);
            }
        }
        others
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{LocalProcessId, NodeId};
    use crate::tag::Tag;

    fn pid(n: u64) -> ProcessId {
        ProcessId::new(NodeId(0), LocalProcessId(n))
    }

    #[test]
    fn monitor_roundtrip() {
        let graph = SupervisionGraph::new();
        let target = Identifier::Process(pid(2));
        let mref = MonitorRef {
            target,
            tag: Tag::from_raw(1),
        };
        graph.add_monitor(target, pid(1), mref);
        let taken = graph.take_monitors_of(&target);
        assert_eq!(taken, vec![(mref, pid(1))]);
        assert!(graph.take_monitors_of(&target).is_empty());
    }

    #[test]
    fn unmonitor_is_idempotent() {
        let graph = SupervisionGraph::new();
        let target = Identifier::Process(pid(2));
        let mref = MonitorRef {
            target,
            tag: Tag::from_raw(1),
        };
        graph.add_monitor(target, pid(1), mref);
        graph.remove_monitor(target, mref);
        graph.remove_monitor(target, mref);
        assert!(graph.take_monitors_of(&target).is_empty());
    }

    #[test]
    fn link_is_symmetric_and_removable() {
        let graph = SupervisionGraph::new();
        let a = Identifier::Process(pid(1));
        let b = Identifier::Process(pid(2));
        graph.add_link(a, b);
        assert_eq!(graph.take_links_of(&a), vec![b]);
        // Taking a's links removed the reciprocal entry from b too.
        assert!(graph.take_links_of(&b).is_empty());
    }
}
