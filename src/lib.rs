/*!
`strand` is the core of a distributed process (actor-model) runtime: an
Erlang/Cloud-Haskell-style layer of lightweight processes, each addressed by
a globally unique [`id::ProcessId`], communicating only by asynchronous
messages carried over in-process mailboxes (and, via a pluggable
[`node::transport::Transport`], inter-node wire links).

# Main concepts

Every process is a plain `tokio` task with its own unbounded mailbox
([`mailbox::Mailbox`]) and an ambient [`process::context::ProcessContext`]
(reachable through [`process::context::current_process`] without having to
thread it through every call). Processes exchange values of any
`serde`-serializable type through [`message::Envelope`]s, discriminated on
the wire by a type fingerprint ([`fingerprint::Fingerprint`]) rather than any
form of runtime reflection.

* **Mailboxes** support selective receive: a receive call supplies an
  ordered list of predicates and gets back the first message any of them
  accepts, leaving the rest of the queue untouched (see
  [`primitives::receive_wait`]/[`primitives::receive_timeout`], or the
  [`receive!`] macro for `match`-like arm syntax over the same predicate
  list).
* **Typed channels** ([`channel`]) are a second, narrower messaging
  primitive — a `SendPort`/`ReceivePort` pair for a single fixed type `T`,
  composable via biased or round-robin merge.
* **Monitors and links** track cross-process liveness: a monitor is a
  one-way death notification, a link is bidirectional termination
  propagation (see [`node::graph`]).
* **The registry** ([`node::registry`]) maps string labels to process ids,
  so processes can find each other without passing ids around by hand.

All of the above live under one [`node::NodeHandle`], whose dedicated
controller task ([`node::controller`]) is the sole mutator of the
supervision graph and the registry — see that module's docs for why a
single-writer design avoids the lock-ordering hazards a finer-grained
approach would invite.

# Spawning a process

```no_run
use std::sync::Arc;
use strand::config::NodeConfig;
use strand::node::NodeHandle;
use strand::{primitives, process};

# #[tokio::main]
# async fn main() {
let node: Arc<NodeHandle> = NodeHandle::new(NodeConfig::new());

process::spawn(node.clone(), || async {
    let who: String = primitives::expect().await;
    primitives::say(format!("hello, {who}"));
});
# }
```

# What this crate does not do

The transport layer (delivering opaque byte envelopes between nodes),
closure/static-symbol resolution for remote spawn, process bootstrap/CLI,
and persistence of mailboxes are all treated as external collaborators
consumed only through their contracts ([`node::transport::Transport`],
[`closure::ClosureResolver`]) — `strand` defines the seam, not a production
implementation of what sits behind it.
*/

pub mod channel;
pub mod closure;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod id;
pub mod mailbox;
mod macros;
pub mod message;
pub mod node;
pub mod primitives;
pub mod process;
mod tag;

pub use error::StrandError;
pub use id::{Identifier, LocalProcessId, MonitorRef, NodeId, ProcessId, SendPortId, SpawnRef};
pub use tag::Tag;
