//! The local process context: what a running process carries with it, and
//! how it starts and ends.
//!
//! Split across four files: [`context`] (per-process counters and the
//! ambient `task_local!` handle), [`handle`] (the cloneable `Process<M>`
//! handle), [`spawn`] (starting a process as a tokio task with its own
//! mailbox), and [`exit`] (reified exit reasons).

pub mod context;
pub mod exit;
pub mod handle;
pub mod spawn;

pub use exit::ExitReason;
pub use handle::Process;
pub use spawn::{spawn, spawn_link};
