//! Reified exit reasons: why a process stopped, as an enum rather than a
//! loose string threaded through the monitor/link machinery.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a process stopped running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    /// The process's computation returned normally.
    Normal,
    /// A monitor was installed against a target that was already dead (or
    /// never existed).
    UnknownEntity,
    /// The process called `terminate()`.
    KilledBySelf,
    /// A linked partner died and this process was brought down by that
    /// propagation.
    LinkedProcessDied,
    /// The process's computation panicked; the message is the panic
    /// payload, downcast to a string where possible.
    Custom(String),
}

/// Turns a caught panic payload into a human-readable message, for
/// [`ExitReason::Custom`]. Shared by `spawn` (whole-process panics) and
/// `catch` (panics caught inside a sub-computation).
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "process panicked".to_string()
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Normal => write!(f, "normal"),
            ExitReason::UnknownEntity => write!(f, "unknown entity"),
            ExitReason::KilledBySelf => write!(f, "killed by self"),
            ExitReason::LinkedProcessDied => write!(f, "linked process died"),
            ExitReason::Custom(reason) => write!(f, "{reason}"),
        }
    }
}
