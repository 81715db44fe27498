//! Per-node double-buffered bindings (`spec.md` §3, "Per-node binding").

use slotmap::new_key_type;

use crate::priority::ExpirationTime;
use crate::queue::Queue;

new_key_type! {
    /// A key into the arena's node slotmap. One `NodeId` is one side of a double buffer; a node
    /// and its [`FiberNode::alternate`] together form the `(current, alternate)` pair from
    /// `spec.md` §3.
    pub struct NodeId;
}

/// Discriminates node kinds. Only [`NodeTag::ClassComponent`] participates in the
/// reducer-reentrancy diagnostic hook (`spec.md` §6) — mirrors the source's "only classes warn"
/// carve-out for its dev-mode check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeTag {
    /// A class-style stateful component.
    ClassComponent,
    /// The root of the tree.
    HostRoot,
    /// Any other node kind that carries a queue without participating in diagnostics.
    Other,
}

/// Bit flags recording commit-phase obligations and error-boundary state for a node
/// (`spec.md` §6, `effectFlags`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EffectFlags(u8);

impl EffectFlags {
    /// The node has pending commit-phase callbacks to fire.
    pub const CALLBACK: EffectFlags = EffectFlags(0b001);
    /// An error boundary above this node should capture the in-flight error.
    pub const SHOULD_CAPTURE: EffectFlags = EffectFlags(0b010);
    /// This node captured an error during the most recent render.
    pub const DID_CAPTURE: EffectFlags = EffectFlags(0b100);

    /// The empty flag set.
    pub const fn empty() -> Self {
        EffectFlags(0)
    }

    /// Returns the union of `self` and `other`.
    #[must_use]
    pub const fn insert(self, other: EffectFlags) -> Self {
        EffectFlags(self.0 | other.0)
    }

    /// Returns `self` with `other`'s bits cleared.
    #[must_use]
    pub const fn remove(self, other: EffectFlags) -> Self {
        EffectFlags(self.0 & !other.0)
    }

    /// Whether all of `other`'s bits are set in `self`.
    pub const fn contains(self, other: EffectFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

/// A tree node's double-buffered state: its folded value, an optional queue header, and the
/// bookkeeping the processor reads and writes.
pub struct FiberNode<S> {
    /// The current folded state, as of the most recent successful
    /// [`process_queue`](crate::process_queue) call.
    pub memoized_state: S,
    /// The paired node viewing the same insertion chain, if any.
    pub alternate: Option<NodeId>,
    /// This side's queue header, created lazily on first enqueue.
    pub queue: Option<Queue<S>>,
    /// The highest priority still pending after the most recent processing pass.
    pub residual_priority: ExpirationTime,
    /// Commit-phase obligations and capture state.
    pub effect_flags: EffectFlags,
    /// Discriminates node kinds; see [`NodeTag`].
    pub tag: NodeTag,
}

impl<S> FiberNode<S> {
    /// Create a new, queueless node wrapping `memoized_state`.
    pub fn new(memoized_state: S, tag: NodeTag) -> Self {
        FiberNode {
            memoized_state,
            alternate: None,
            queue: None,
            residual_priority: ExpirationTime::NO_WORK,
            effect_flags: EffectFlags::empty(),
            tag,
        }
    }
}
