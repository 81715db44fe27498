//! A priority-aware update queue for reconciling UI runtimes.
//!
//! Every stateful node in a host's tree owns a double buffer of [`FiberNode`]s: a committed side
//! and a work-in-progress side sharing an arena-indexed, append-only, singly-linked chain of
//! [`UpdateRecord`]s. [`enqueue_update`] attaches a new record to both sides while preserving
//! structural sharing of the chain's tail; [`process_queue`] folds that chain against a render
//! priority, skipping updates whose priority isn't sufficient and freezing `base_state` at the
//! first skip so later, lower-priority passes can still rebase deterministically; [`commit_queue`]
//! splices any captured (error-boundary) updates onto the committed chain and fires pending
//! callbacks exactly once.
//!
//! The crate never computes priorities itself, never owns a scheduler, and never touches a host's
//! tree-diffing logic — it only maintains the queue.

#![warn(missing_docs)]

mod arena;
mod commit;
mod context;
mod enqueue;
mod error;
mod merge;
mod node;
mod priority;
mod process;
mod queue;
mod update;

pub use arena::UpdateArena;
pub use commit::commit_queue;
pub use context::ProcessContext;
pub use enqueue::{enqueue_captured_update, enqueue_update};
pub use error::{ProcessError, UpdateError, UpdateQueueError};
pub use merge::MergeState;
pub use node::{EffectFlags, FiberNode, NodeId, NodeTag};
pub use priority::ExpirationTime;
pub use process::{apply_update, process_queue};
pub use queue::{Queue, QueueId};
pub use update::{Callback, Payload, Update, UpdateId, UpdateRecord, UpdateTag, Updater};
