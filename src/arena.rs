//! The arena owning every [`FiberNode`] and [`UpdateRecord`] for one reconciler instance.
//!
//! Grounded on the teacher's [`Root`] (`sycamore-reactive/src/root.rs`): a `SlotMap`-keyed arena
//! behind a single owner, with `Cell`-based scalar bookkeeping (there, `current_node`/
//! `root_node`/`batching`; here, `next_queue_id`/`currently_processing`). The one structural
//! difference: the teacher leaks its `Root` to get a `'static` thread-local singleton, because a
//! UI runtime wants one global reactive graph for the life of the program. This crate has no such
//! requirement — `spec.md`'s design notes explicitly ask for mutable context to be passed in
//! rather than hidden behind global state — so `UpdateArena` is an ordinary owned value a host
//! threads `&mut` references to.

use slotmap::SlotMap;

use crate::error::UpdateQueueError;
use crate::node::{FiberNode, NodeId, NodeTag};
use crate::queue::{Queue, QueueId};
use crate::update::{UpdateId, UpdateRecord};

/// Owns every [`FiberNode`] and [`UpdateRecord`] for one reconciler instance.
pub struct UpdateArena<S, P, I, E> {
    pub(crate) nodes: SlotMap<NodeId, FiberNode<S>>,
    pub(crate) updates: SlotMap<UpdateId, UpdateRecord<S, P, I, E>>,
    next_queue_id: std::cell::Cell<u64>,
    /// Set for the duration of [`crate::process_queue`]; read by [`crate::enqueue_update`] to
    /// emit the advisory reducer-reentrancy warning (`spec.md` §6). See `SPEC_FULL.md` §6 for why
    /// this is largely vestigial in this API shape, and kept anyway for fidelity.
    currently_processing: std::cell::Cell<Option<NodeId>>,
}

impl<S, P, I, E> Default for UpdateArena<S, P, I, E> {
    fn default() -> Self {
        UpdateArena {
            nodes: SlotMap::with_key(),
            updates: SlotMap::with_key(),
            next_queue_id: std::cell::Cell::new(1),
            currently_processing: std::cell::Cell::new(None),
        }
    }
}

impl<S, P, I, E> UpdateArena<S, P, I, E> {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new, queueless node and return its id.
    pub fn create_node(&mut self, memoized_state: S, tag: NodeTag) -> NodeId {
        self.nodes.insert(FiberNode::new(memoized_state, tag))
    }

    /// Mark `a` and `b` as each other's alternate, forming a double buffer.
    ///
    /// # Errors
    /// Returns [`UpdateQueueError::UnknownNode`] if either id is not present in the arena.
    pub fn pair_with_alternate(&mut self, a: NodeId, b: NodeId) -> Result<(), UpdateQueueError> {
        if !self.nodes.contains_key(a) {
            return Err(UpdateQueueError::UnknownNode(a));
        }
        if !self.nodes.contains_key(b) {
            return Err(UpdateQueueError::UnknownNode(b));
        }
        self.nodes[a].alternate = Some(b);
        self.nodes[b].alternate = Some(a);
        Ok(())
    }

    /// Remove `node` from the arena. Does not touch its alternate's `alternate` pointer — a host
    /// that disposes one side of a double buffer is responsible for deciding what, if anything,
    /// the surviving side should point to next.
    pub fn remove_node(&mut self, node: NodeId) -> Option<FiberNode<S>> {
        self.nodes.remove(node)
    }

    /// Borrow a node by id.
    pub fn node(&self, node: NodeId) -> Result<&FiberNode<S>, UpdateQueueError> {
        self.nodes
            .get(node)
            .ok_or(UpdateQueueError::UnknownNode(node))
    }

    /// Mutably borrow a node by id.
    pub fn node_mut(&mut self, node: NodeId) -> Result<&mut FiberNode<S>, UpdateQueueError> {
        self.nodes
            .get_mut(node)
            .ok_or(UpdateQueueError::UnknownNode(node))
    }

    /// Borrow an update record by id.
    pub fn update(&self, update: UpdateId) -> Option<&UpdateRecord<S, P, I, E>> {
        self.updates.get(update)
    }

    /// The node currently inside [`crate::process_queue`], if any. Advisory only.
    pub fn is_processing(&self) -> Option<NodeId> {
        self.currently_processing.get()
    }

    pub(crate) fn mint_queue(&self, base_state: S) -> Queue<S> {
        Queue::new(self.fresh_queue_id(), base_state)
    }

    pub(crate) fn fresh_queue_id(&self) -> QueueId {
        let raw = self.next_queue_id.get();
        self.next_queue_id.set(raw + 1);
        QueueId::new(raw)
    }

    pub(crate) fn set_processing(&self, node: Option<NodeId>) {
        self.currently_processing.set(node);
    }
}
