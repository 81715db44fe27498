//! The processor (`spec.md` §4.4, §4.5): folds a queue against a render priority threshold.

use crate::arena::UpdateArena;
use crate::context::ProcessContext;
use crate::enqueue::ensure_wip_clone;
use crate::error::{ProcessError, UpdateError};
use crate::merge::MergeState;
use crate::node::{EffectFlags, NodeId};
use crate::priority::ExpirationTime;
use crate::update::{Payload, UpdateId, UpdateTag};

/// Apply a single update's resolved payload to `prev_state`, per the table in `spec.md` §4.5.
///
/// `node` is passed so `CaptureUpdate` can flip `ShouldCapture`/`DidCapture`; `ctx` is passed so
/// `ForceUpdate` can record itself without touching a global.
pub fn apply_update<S, P, I, E>(
    tag: UpdateTag,
    payload: &Option<Payload<S, P, I, E>>,
    prev_state: &S,
    props: &P,
    instance: &I,
    node: &mut crate::node::FiberNode<S>,
    ctx: &mut ProcessContext,
) -> Result<S, UpdateError<E>>
where
    S: MergeState,
{
    match tag {
        UpdateTag::ForceUpdate => {
            ctx.mark_force_update();
            Ok(prev_state.clone())
        }
        UpdateTag::ReplaceState => {
            let resolved = resolve_payload(payload, prev_state, props, instance)?;
            Ok(resolved.unwrap_or_else(|| prev_state.clone()))
        }
        UpdateTag::UpdateState => {
            let resolved = resolve_payload(payload, prev_state, props, instance)?;
            Ok(match resolved {
                Some(partial) => prev_state.clone().merge(partial),
                None => prev_state.clone(),
            })
        }
        UpdateTag::CaptureUpdate => {
            node.effect_flags = node
                .effect_flags
                .remove(EffectFlags::SHOULD_CAPTURE)
                .insert(EffectFlags::DID_CAPTURE);
            let resolved = resolve_payload(payload, prev_state, props, instance)?;
            Ok(match resolved {
                Some(partial) => prev_state.clone().merge(partial),
                None => prev_state.clone(),
            })
        }
    }
}

fn resolve_payload<S, P, I, E>(
    payload: &Option<Payload<S, P, I, E>>,
    prev_state: &S,
    props: &P,
    instance: &I,
) -> Result<Option<S>, UpdateError<E>>
where
    S: Clone,
{
    match payload {
        None => Ok(None),
        Some(Payload::Value(value)) => Ok(Some(value.clone())),
        Some(Payload::Updater(f)) => f(instance, prev_state, props).map_err(UpdateError),
    }
}

/// Fold `work_in_progress`'s queue against `render_priority`, producing a new memoized state, a
/// new base state, a residual queue of skipped updates, a residual priority, and effect chains to
/// fire on commit (`spec.md` §4.4).
///
/// Never mutates the committed side: the queue is ensured to be a work-in-progress clone before
/// anything else happens, and the finalization step — the only place committed fields would be
/// touched if this *weren't* already a clone — only runs after both loops return successfully.
#[cfg_attr(feature = "trace", tracing::instrument(skip(arena, props, instance, ctx)))]
pub fn process_queue<S, P, I, E>(
    arena: &mut UpdateArena<S, P, I, E>,
    work_in_progress: NodeId,
    props: &P,
    instance: &I,
    render_priority: ExpirationTime,
    ctx: &mut ProcessContext,
) -> Result<(), ProcessError<E>>
where
    S: MergeState,
{
    ctx.reset_has_force_update();
    ensure_wip_clone(arena, work_in_progress)?;
    arena.set_processing(Some(work_in_progress));
    let result = process_queue_inner(arena, work_in_progress, props, instance, render_priority, ctx);
    arena.set_processing(None);
    result
}

fn process_queue_inner<S, P, I, E>(
    arena: &mut UpdateArena<S, P, I, E>,
    work_in_progress: NodeId,
    props: &P,
    instance: &I,
    render_priority: ExpirationTime,
    ctx: &mut ProcessContext,
) -> Result<(), ProcessError<E>>
where
    S: MergeState,
{
    let base_state = arena
        .node(work_in_progress)?
        .queue
        .as_ref()
        .expect("ensure_wip_clone just attached a queue")
        .base_state
        .clone();

    let mut result_state = base_state.clone();
    let mut new_base_state = base_state.clone();
    let mut new_first_update: Option<UpdateId> = None;
    let mut new_residual_priority = ExpirationTime::NO_WORK;
    let mut first_effect: Option<UpdateId> = None;
    let mut last_effect: Option<UpdateId> = None;
    let mut normal_skipped = false;

    let first_update = arena.node(work_in_progress)?.queue.as_ref().unwrap().first_update;
    let mut cursor = first_update;
    while let Some(update_id) = cursor {
        let (priority, tag) = {
            let record = arena
                .updates
                .get(update_id)
                .expect("chain points at a live update record");
            (record.priority, record.tag)
        };

        if !priority.is_sufficient_for(render_priority) {
            normal_skipped = true;
            if new_first_update.is_none() {
                new_first_update = Some(update_id);
                new_base_state = result_state.clone();
            }
            if priority > new_residual_priority {
                new_residual_priority = priority;
            }
        } else {
            let payload_snapshot = arena.updates[update_id].payload.clone();
            let node_mut = arena.node_mut(work_in_progress)?;
            result_state = apply_update(
                tag,
                &payload_snapshot,
                &result_state,
                props,
                instance,
                node_mut,
                ctx,
            )?;

            let has_callback = arena.updates[update_id].callback.is_some();
            if has_callback {
                let flags = arena.node(work_in_progress)?.effect_flags.insert(EffectFlags::CALLBACK);
                arena.node_mut(work_in_progress)?.effect_flags = flags;
                arena.updates.get_mut(update_id).unwrap().next_effect = None;
                match last_effect {
                    Some(last) => arena.updates.get_mut(last).unwrap().next_effect = Some(update_id),
                    None => first_effect = Some(update_id),
                }
                last_effect = Some(update_id);
            }
        }

        cursor = arena.updates[update_id].next;
    }

    let state_before_captured_loop = result_state.clone();

    let mut new_first_captured_update: Option<UpdateId> = None;
    let mut captured_skipped = false;
    let mut first_captured_effect: Option<UpdateId> = None;
    let mut last_captured_effect: Option<UpdateId> = None;

    let first_captured_update = arena
        .node(work_in_progress)?
        .queue
        .as_ref()
        .unwrap()
        .first_captured_update;
    let mut cursor = first_captured_update;
    while let Some(update_id) = cursor {
        let (priority, tag) = {
            let record = arena
                .updates
                .get(update_id)
                .expect("captured chain points at a live update record");
            (record.priority, record.tag)
        };

        if !priority.is_sufficient_for(render_priority) {
            captured_skipped = true;
            if new_first_captured_update.is_none() {
                new_first_captured_update = Some(update_id);
            }
        } else {
            let payload_snapshot = arena.updates[update_id].payload.clone();
            let node_mut = arena.node_mut(work_in_progress)?;
            result_state = apply_update(
                tag,
                &payload_snapshot,
                &result_state,
                props,
                instance,
                node_mut,
                ctx,
            )?;

            let has_callback = arena.updates[update_id].callback.is_some();
            if has_callback {
                arena.updates.get_mut(update_id).unwrap().next_effect = None;
                match last_captured_effect {
                    Some(last) => arena.updates.get_mut(last).unwrap().next_effect = Some(update_id),
                    None => first_captured_effect = Some(update_id),
                }
                last_captured_effect = Some(update_id);
            }
        }

        cursor = arena.updates[update_id].next;
    }

    // §4.4's resolved open question: `new_base_state` only advances to the final state when
    // *neither* loop skipped anything. If the normal loop skipped, its freeze point already won.
    // If only the captured loop skipped, freeze at the point captured processing started.
    if !normal_skipped && !captured_skipped {
        new_base_state = result_state.clone();
    } else if !normal_skipped {
        new_base_state = state_before_captured_loop;
    }

    if new_first_captured_update.is_some() || first_captured_effect.is_some() {
        let flags = arena.node(work_in_progress)?.effect_flags.insert(EffectFlags::CALLBACK);
        arena.node_mut(work_in_progress)?.effect_flags = flags;
    }

    let fiber = arena.node_mut(work_in_progress)?;
    let queue = fiber
        .queue
        .as_mut()
        .expect("ensure_wip_clone just attached a queue");
    if new_first_update.is_none() {
        queue.last_update = None;
    }
    if new_first_captured_update.is_none() {
        queue.last_captured_update = None;
    }
    queue.base_state = new_base_state;
    queue.first_update = new_first_update;
    queue.first_captured_update = new_first_captured_update;
    queue.first_effect = first_effect;
    queue.last_effect = last_effect;
    queue.first_captured_effect = first_captured_effect;
    queue.last_captured_effect = last_captured_effect;
    debug_assert_eq!(
        queue.first_update.is_none(),
        queue.last_update.is_none(),
        "invariant 2: first_update and last_update must be null together"
    );
    debug_assert_eq!(
        queue.first_captured_update.is_none(),
        queue.last_captured_update.is_none(),
        "invariant 2: first_captured_update and last_captured_update must be null together"
    );

    fiber.residual_priority = new_residual_priority;
    fiber.memoized_state = result_state;

    Ok(())
}
