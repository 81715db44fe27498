//! The enqueue path (`spec.md` §4.3): attaching an update to both sides of a double buffer
//! while preserving structural sharing of the insertion chain's tail.

use crate::arena::UpdateArena;
use crate::error::UpdateQueueError;
use crate::node::NodeId;
use crate::queue::QueueId;
use crate::update::{Update, UpdateId, UpdateRecord};

/// Attach `update` to both sides of `node`'s double buffer, subject to the structural-sharing
/// rules in `spec.md` §4.3. Returns the id the update was stored under.
pub fn enqueue_update<S, P, I, E>(
    arena: &mut UpdateArena<S, P, I, E>,
    node: NodeId,
    update: Update<S, P, I, E>,
) -> Result<UpdateId, UpdateQueueError>
where
    S: Clone,
{
    #[cfg(feature = "trace")]
    if let Some(processing) = arena.is_processing() {
        tracing::warn!(
            ?processing,
            enqueued_on = ?node,
            "enqueue_update called while a queue is being processed; likely called from inside an \
             updater function"
        );
    }

    let update_id = arena.updates.insert(UpdateRecord::from(update));

    let alternate = arena.node(node)?.alternate;
    match alternate {
        None => {
            ensure_queue(arena, node)?;
            append_to_queue(arena, node, update_id)?;
        }
        Some(alt) => {
            let a_has_queue = arena.node(node)?.queue.is_some();
            let b_has_queue = arena.node(alt)?.queue.is_some();
            match (a_has_queue, b_has_queue) {
                (false, false) => {
                    ensure_queue(arena, node)?;
                    ensure_queue(arena, alt)?;
                }
                (false, true) => clone_queue_from(arena, alt, node)?,
                (true, false) => clone_queue_from(arena, node, alt)?,
                (true, true) => {}
            }

            let q1 = queue_id_of(arena, node)?;
            let q2 = queue_id_of(arena, alt)?;
            if q1 == q2 {
                append_to_queue(arena, node, update_id)?;
            } else {
                let q1_empty = is_chain_empty(arena, node)?;
                let q2_empty = is_chain_empty(arena, alt)?;
                if q1_empty || q2_empty {
                    append_to_queue(arena, node, update_id)?;
                    append_to_queue(arena, alt, update_id)?;
                } else {
                    // Both non-empty and (by invariant 1) sharing the same tail record: append
                    // once and fix up the other side's tail pointer, rather than appending twice
                    // and turning the new record into its own `next`.
                    append_to_queue(arena, node, update_id)?;
                    arena.node_mut(alt)?.queue.as_mut().unwrap().last_update = Some(update_id);
                }
            }
        }
    }

    debug_assert_eq!(
        arena.node(node)?.queue.as_ref().unwrap().first_update.is_none(),
        arena.node(node)?.queue.as_ref().unwrap().last_update.is_none(),
        "invariant 2: first_update and last_update must be null together"
    );

    Ok(update_id)
}

/// Append `update` to the work-in-progress-only captured chain (`spec.md` §4.3, "Captured
/// updates"). Ensures the work-in-progress queue is a fresh clone — not object-identical to the
/// committed queue — before appending, so captured updates never leak into the committed view.
pub fn enqueue_captured_update<S, P, I, E>(
    arena: &mut UpdateArena<S, P, I, E>,
    work_in_progress: NodeId,
    update: Update<S, P, I, E>,
) -> Result<UpdateId, UpdateQueueError>
where
    S: Clone,
{
    ensure_wip_clone(arena, work_in_progress)?;

    let update_id = arena.updates.insert(UpdateRecord::from(update));

    let fiber = arena.node_mut(work_in_progress)?;
    let queue = fiber.queue.as_mut().ok_or(UpdateQueueError::DetachedQueue(work_in_progress))?;
    let old_tail = queue.last_captured_update;
    queue.last_captured_update = Some(update_id);
    if queue.first_captured_update.is_none() {
        queue.first_captured_update = Some(update_id);
    }
    if let Some(old_tail) = old_tail {
        arena.updates[old_tail].next = Some(update_id);
    }

    Ok(update_id)
}

/// Ensure `node`'s queue exists and is not object-identical to its alternate's queue (if any).
/// Used both by [`enqueue_captured_update`] and by `process_queue`'s preamble (`spec.md` §4.4:
/// "ensure the queue is a work-in-progress clone").
pub(crate) fn ensure_wip_clone<S, P, I, E>(
    arena: &mut UpdateArena<S, P, I, E>,
    node: NodeId,
) -> Result<(), UpdateQueueError>
where
    S: Clone,
{
    if arena.node(node)?.queue.is_none() {
        ensure_queue(arena, node)?;
        return Ok(());
    }
    let shares_identity_with_committed = match arena.node(node)?.alternate {
        Some(committed) => match &arena.node(committed)?.queue {
            Some(committed_queue) => {
                committed_queue.id() == arena.node(node)?.queue.as_ref().unwrap().id()
            }
            None => false,
        },
        None => false,
    };
    if shares_identity_with_committed {
        refresh_queue_identity(arena, node)?;
    }
    Ok(())
}

fn ensure_queue<S, P, I, E>(
    arena: &mut UpdateArena<S, P, I, E>,
    node: NodeId,
) -> Result<(), UpdateQueueError>
where
    S: Clone,
{
    if arena.node(node)?.queue.is_some() {
        return Ok(());
    }
    let base_state = arena.node(node)?.memoized_state.clone();
    let queue = arena.mint_queue(base_state);
    arena.node_mut(node)?.queue = Some(queue);
    Ok(())
}

/// Clone `source`'s queue into `target`'s queue slot under a fresh identity.
fn clone_queue_from<S, P, I, E>(
    arena: &mut UpdateArena<S, P, I, E>,
    source: NodeId,
    target: NodeId,
) -> Result<(), UpdateQueueError>
where
    S: Clone,
{
    let fresh_id = arena.fresh_queue_id();
    let cloned = {
        let source_queue = arena
            .node(source)?
            .queue
            .as_ref()
            .ok_or(UpdateQueueError::DetachedQueue(source))?;
        source_queue.clone_with_id(fresh_id)
    };
    arena.node_mut(target)?.queue = Some(cloned);
    Ok(())
}

/// Re-stamp `node`'s own queue with a fresh identity in place, severing any identity sharing with
/// its alternate while keeping `base_state`/`first_update`/`last_update`.
fn refresh_queue_identity<S, P, I, E>(
    arena: &mut UpdateArena<S, P, I, E>,
    node: NodeId,
) -> Result<(), UpdateQueueError>
where
    S: Clone,
{
    let fresh_id = arena.fresh_queue_id();
    let fiber = arena.node_mut(node)?;
    let queue = fiber.queue.as_ref().ok_or(UpdateQueueError::DetachedQueue(node))?;
    let cloned = queue.clone_with_id(fresh_id);
    fiber.queue = Some(cloned);
    Ok(())
}

fn queue_id_of<S, P, I, E>(
    arena: &UpdateArena<S, P, I, E>,
    node: NodeId,
) -> Result<QueueId, UpdateQueueError> {
    Ok(arena
        .node(node)?
        .queue
        .as_ref()
        .ok_or(UpdateQueueError::DetachedQueue(node))?
        .id())
}

fn is_chain_empty<S, P, I, E>(
    arena: &UpdateArena<S, P, I, E>,
    node: NodeId,
) -> Result<bool, UpdateQueueError> {
    Ok(arena
        .node(node)?
        .queue
        .as_ref()
        .ok_or(UpdateQueueError::DetachedQueue(node))?
        .first_update
        .is_none())
}

fn append_to_queue<S, P, I, E>(
    arena: &mut UpdateArena<S, P, I, E>,
    node: NodeId,
    update_id: UpdateId,
) -> Result<(), UpdateQueueError> {
    let old_tail = {
        let fiber = arena.node_mut(node)?;
        let queue = fiber.queue.as_mut().ok_or(UpdateQueueError::DetachedQueue(node))?;
        let old_tail = queue.last_update;
        queue.last_update = Some(update_id);
        if queue.first_update.is_none() {
            queue.first_update = Some(update_id);
        }
        old_tail
    };
    if let Some(old_tail) = old_tail {
        arena.updates[old_tail].next = Some(update_id);
    }
    Ok(())
}
