//! The commit path (`spec.md` §4.6): splicing the captured chain onto the normal chain and
//! firing callbacks exactly once.

use crate::arena::UpdateArena;
use crate::error::UpdateQueueError;
use crate::node::NodeId;

/// Splice `node`'s captured chain onto the tail of its normal chain, then fire every pending
/// callback (normal effects first, then captured), clearing each callback slot as it fires so a
/// later commit can never invoke it twice.
pub fn commit_queue<S, P, I, E>(
    arena: &mut UpdateArena<S, P, I, E>,
    node: NodeId,
    instance: &I,
) -> Result<(), UpdateQueueError> {
    splice_captured_onto_normal(arena, node)?;
    fire_effect_chain(arena, node, instance, EffectChainKind::Normal)?;
    fire_effect_chain(arena, node, instance, EffectChainKind::Captured)?;
    Ok(())
}

enum EffectChainKind {
    Normal,
    Captured,
}

/// Append the captured insertion chain (if any) after the normal chain's tail, then clear the
/// captured chain pointers — committed state never carries a captured chain (invariant 6).
fn splice_captured_onto_normal<S, P, I, E>(
    arena: &mut UpdateArena<S, P, I, E>,
    node: NodeId,
) -> Result<(), UpdateQueueError> {
    let (first_captured, last_captured) = {
        let queue = arena
            .node(node)?
            .queue
            .as_ref()
            .ok_or(UpdateQueueError::DetachedQueue(node))?;
        (queue.first_captured_update, queue.last_captured_update)
    };

    let Some(first_captured) = first_captured else {
        return Ok(());
    };

    let old_tail = {
        let fiber = arena.nodes.get_mut(node).ok_or(UpdateQueueError::UnknownNode(node))?;
        let queue = fiber.queue.as_mut().ok_or(UpdateQueueError::DetachedQueue(node))?;
        let old_tail = queue.last_update;
        queue.last_update = last_captured;
        queue.first_captured_update = None;
        queue.last_captured_update = None;
        if old_tail.is_none() {
            queue.first_update = Some(first_captured);
        }
        old_tail
    };
    if let Some(old_tail) = old_tail {
        arena.updates[old_tail].next = Some(first_captured);
    }
    Ok(())
}

fn fire_effect_chain<S, P, I, E>(
    arena: &mut UpdateArena<S, P, I, E>,
    node: NodeId,
    instance: &I,
    kind: EffectChainKind,
) -> Result<(), UpdateQueueError> {
    let mut cursor = {
        let queue = arena
            .node(node)?
            .queue
            .as_ref()
            .ok_or(UpdateQueueError::DetachedQueue(node))?;
        match kind {
            EffectChainKind::Normal => queue.first_effect,
            EffectChainKind::Captured => queue.first_captured_effect,
        }
    };

    while let Some(update_id) = cursor {
        let callback = arena
            .updates
            .get_mut(update_id)
            .expect("effect chain points at a live update record")
            .callback
            .take();
        if let Some(callback) = callback {
            callback(instance);
        }
        cursor = arena.updates[update_id].next_effect;
    }

    let fiber = arena.node_mut(node)?;
    let queue = fiber.queue.as_mut().ok_or(UpdateQueueError::DetachedQueue(node))?;
    match kind {
        EffectChainKind::Normal => {
            queue.first_effect = None;
            queue.last_effect = None;
        }
        EffectChainKind::Captured => {
            queue.first_captured_effect = None;
            queue.last_captured_effect = None;
        }
    }
    Ok(())
}
