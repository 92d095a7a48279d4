//! Node-level configuration: a small, serde-derivable struct built through
//! chained setters, covering the handful of knobs a node actually needs.

use serde::{Deserialize, Serialize};

use crate::id::NodeId;

/// Configuration for one [`crate::node::NodeHandle`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub node_id: NodeId,
    /// The registry label `say()` named-sends to. "logger" is reserved by
    /// convention, not by hard constraint.
    pub logger_label: String,
    /// Purely diagnostic: logs a `warn!` when a mailbox's length crosses
    /// this watermark. Does not implement back-pressure — the mailbox stays
    /// unbounded by contract.
    pub mailbox_backpressure_warn_at: Option<usize>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_id: NodeId::next_local(),
            logger_label: "logger".to_string(),
            mailbox_backpressure_warn_at: None,
        }
    }
}

impl NodeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_id(mut self, node_id: NodeId) -> Self {
        self.node_id = node_id;
        self
    }

    pub fn logger_label(mut self, label: impl Into<String>) -> Self {
        self.logger_label = label.into();
        self
    }

    pub fn mailbox_backpressure_warn_at(mut self, watermark: usize) -> Self {
        self.mailbox_backpressure_warn_at = Some(watermark);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = NodeConfig::new()
            .logger_label("audit")
            .mailbox_backpressure_warn_at(1000);
        assert_eq!(config.logger_label, "audit");
        assert_eq!(config.mailbox_backpressure_warn_at, Some(1000));
    }
}
