//! Update records: a single requested mutation, plus chain links once enqueued.

use std::rc::Rc;

use slotmap::new_key_type;

use crate::priority::ExpirationTime;

new_key_type! {
    /// A key into the arena's update-record slotmap.
    pub struct UpdateId;
}

/// Discriminates how a record's resolved payload should be applied to the previous state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateTag {
    /// Shallow-merge the resolved payload over the previous state.
    UpdateState,
    /// Fully replace the previous state with the resolved payload.
    ReplaceState,
    /// Ignore the payload; force a re-render of the previous state unchanged.
    ForceUpdate,
    /// Like [`UpdateTag::UpdateState`], but first clears `ShouldCapture` and sets `DidCapture` on
    /// the owning node.
    CaptureUpdate,
}

/// A reducer-style payload function: `(instance, prev_state, props) -> Option<new_state>`.
///
/// `None` means "no-op" for [`UpdateTag::UpdateState`] and [`UpdateTag::CaptureUpdate`]; see
/// [`crate::process::apply_update`] for the exact per-tag interpretation. `E` is the error type a
/// reducer can fail with (`spec.md` §7, "Reducer exception").
pub type Updater<S, P, I, E> = Rc<dyn Fn(&I, &S, &P) -> Result<Option<S>, E>>;

/// What an update carries to produce a new state.
pub enum Payload<S, P, I, E> {
    /// A plain value: the partial or full replacement state, depending on `tag`.
    Value(S),
    /// A reducer-style function computing the partial or full replacement state.
    Updater(Updater<S, P, I, E>),
}

impl<S: Clone, P, I, E> Clone for Payload<S, P, I, E> {
    fn clone(&self) -> Self {
        match self {
            Payload::Value(value) => Payload::Value(value.clone()),
            Payload::Updater(f) => Payload::Updater(Rc::clone(f)),
        }
    }
}

/// A commit-phase callback, invoked once with the host instance as receiver, then cleared.
pub type Callback<I> = Rc<dyn Fn(&I)>;

/// A floating update, not yet attached to any node's queue.
///
/// Returned by [`Update::new`]; callers set `tag`, `payload`, and `callback` with the builder
/// methods before handing it to [`crate::enqueue_update`] or [`crate::enqueue_captured_update`],
/// which is the point at which it is allocated into the arena and linked into a chain.
pub struct Update<S, P, I, E> {
    pub(crate) priority: ExpirationTime,
    pub(crate) tag: UpdateTag,
    pub(crate) payload: Option<Payload<S, P, I, E>>,
    pub(crate) callback: Option<Callback<I>>,
}

impl<S, P, I, E> Update<S, P, I, E> {
    /// Create a fresh update at `priority`, with no payload, no callback, and tag
    /// [`UpdateTag::UpdateState`].
    pub fn new(priority: ExpirationTime) -> Self {
        Update {
            priority,
            tag: UpdateTag::UpdateState,
            payload: None,
            callback: None,
        }
    }

    /// Set the tag discriminating how the payload is applied.
    pub fn with_tag(mut self, tag: UpdateTag) -> Self {
        self.tag = tag;
        self
    }

    /// Set the payload to a plain value.
    pub fn with_value(mut self, value: S) -> Self {
        self.payload = Some(Payload::Value(value));
        self
    }

    /// Set the payload to a reducer-style function.
    pub fn with_updater(mut self, f: impl Fn(&I, &S, &P) -> Result<Option<S>, E> + 'static) -> Self
    where
        S: 'static,
        P: 'static,
        I: 'static,
        E: 'static,
    {
        self.payload = Some(Payload::Updater(Rc::new(f)));
        self
    }

    /// Set a completion callback, invoked once after commit.
    pub fn with_callback(mut self, callback: impl Fn(&I) + 'static) -> Self
    where
        I: 'static,
    {
        self.callback = Some(Rc::new(callback));
        self
    }
}

/// A single requested mutation, plus forward links for the insertion chain and the effects
/// chain built during processing.
///
/// Append-only after creation except for `callback` (cleared after firing) and `next_effect`
/// (reset at the start of each processing pass).
pub struct UpdateRecord<S, P, I, E> {
    /// The expiration time at which this update should be applied.
    pub priority: ExpirationTime,
    /// How to apply `payload` to the previous state.
    pub tag: UpdateTag,
    /// The mutation itself.
    pub payload: Option<Payload<S, P, I, E>>,
    /// Invoked once after commit, then cleared.
    pub callback: Option<Callback<I>>,
    /// Forward link in the insertion chain.
    pub next: Option<UpdateId>,
    /// Forward link in the effects chain, rebuilt on every processing pass.
    pub next_effect: Option<UpdateId>,
}

impl<S, P, I, E> From<Update<S, P, I, E>> for UpdateRecord<S, P, I, E> {
    fn from(update: Update<S, P, I, E>) -> Self {
        UpdateRecord {
            priority: update.priority,
            tag: update.tag,
            payload: update.payload,
            callback: update.callback,
            next: None,
            next_effect: None,
        }
    }
}
