//! Error types for the ambient failure modes named in `spec.md` §7.
//!
//! The teacher (`sycamore-reactive`) has almost no fallible public surface — its one error type,
//! `ScopeDestroyedError`, hand-rolls `Display`/`Error`. This crate has more error-shaped surface
//! because `spec.md` §7 names four distinct error classes, so it reaches for `thiserror` instead,
//! following the rest of the reference pool (`ffui`, `nucleus-fire`'s `ncc`, `ewe_platform`'s
//! backend crates) rather than hand-rolling each impl.

use thiserror::Error;

use crate::node::NodeId;

/// Misuse-class errors the crate can still observe at runtime.
///
/// Most of `spec.md`'s "Misuse" class (invalid payload shape, invalid callback) is eliminated by
/// the type system here — see `SPEC_FULL.md` §4.3. What remains are stale-handle mistakes a
/// caller can legitimately make and recover from.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum UpdateQueueError {
    /// `node` is not present in the arena (disposed, or never inserted).
    #[error("node {0:?} not found in the update arena")]
    UnknownNode(NodeId),
    /// `node` exists but has no queue header attached.
    #[error("no queue header attached to node {0:?}")]
    DetachedQueue(NodeId),
}

/// A user-supplied updater function failed. Propagated out of [`crate::process_queue`]
/// (`spec.md` §7, "Reducer exception").
#[derive(Debug, Error)]
#[error("updater function failed")]
pub struct UpdateError<E>(#[source] pub E);

/// Everything that can go wrong while processing a queue.
#[derive(Debug, Error)]
pub enum ProcessError<E> {
    /// See [`UpdateQueueError`].
    #[error(transparent)]
    Queue(#[from] UpdateQueueError),
    /// See [`UpdateError`].
    #[error(transparent)]
    Update(#[from] UpdateError<E>),
}
