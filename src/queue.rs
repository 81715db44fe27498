//! Queue headers: paired views over a shared singly-linked list of update records.

use crate::update::UpdateId;

/// A process-local identity stamp distinguishing distinct [`Queue`] *objects*, even when two
/// queues happen to be field-equal.
///
/// Used only to answer "is this the same header instance" (`spec.md` §4.3's `q1 == q2` check,
/// and §4.3's "fresh clone" precondition for captured updates). It carries no other meaning and
/// is never compared across arenas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueId(u64);

impl QueueId {
    pub(crate) fn new(raw: u64) -> Self {
        QueueId(raw)
    }
}

/// Paired headers over a shared singly-linked list of update records (`spec.md` §3).
pub struct Queue<S> {
    pub(crate) id: QueueId,
    /// The state against which the first remaining update is applied.
    pub base_state: S,
    /// Head of the normal insertion chain.
    pub first_update: Option<UpdateId>,
    /// Tail of the normal insertion chain.
    pub last_update: Option<UpdateId>,
    /// Head of the captured-update chain (error-boundary recovery). Only ever populated on the
    /// work-in-progress side (invariant 6).
    pub first_captured_update: Option<UpdateId>,
    /// Tail of the captured-update chain.
    pub last_captured_update: Option<UpdateId>,
    /// Head of the effects chain assembled during the most recent processing pass.
    pub first_effect: Option<UpdateId>,
    /// Tail of the effects chain.
    pub last_effect: Option<UpdateId>,
    /// Head of the captured-effects chain.
    pub first_captured_effect: Option<UpdateId>,
    /// Tail of the captured-effects chain.
    pub last_captured_effect: Option<UpdateId>,
}

impl<S> Queue<S> {
    pub(crate) fn new(id: QueueId, base_state: S) -> Self {
        Queue {
            id,
            base_state,
            first_update: None,
            last_update: None,
            first_captured_update: None,
            last_captured_update: None,
            first_effect: None,
            last_effect: None,
            first_captured_effect: None,
            last_captured_effect: None,
        }
    }

    /// Whether `self` and `other` are the same logical header (not merely field-equal).
    pub fn is_same_header(&self, other: &Queue<S>) -> bool {
        self.id == other.id
    }

    /// Returns `self`'s process-local identity stamp.
    pub fn id(&self) -> QueueId {
        self.id
    }

    /// Clone this header's `base_state` and insertion-chain tail/head under a fresh identity.
    /// Captured and effect fields reset to empty — cloning never copies the chain itself, nor
    /// any in-flight processing state (`spec.md` §4.2).
    pub(crate) fn clone_with_id(&self, id: QueueId) -> Self
    where
        S: Clone,
    {
        Queue {
            id,
            base_state: self.base_state.clone(),
            first_update: self.first_update,
            last_update: self.last_update,
            first_captured_update: None,
            last_captured_update: None,
            first_effect: None,
            last_effect: None,
            first_captured_effect: None,
            last_captured_effect: None,
        }
    }
}
