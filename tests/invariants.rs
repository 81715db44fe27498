//! The eight quantified invariants from the processor's design notes.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use update_queue::{
    commit_queue, enqueue_captured_update, enqueue_update, process_queue, EffectFlags,
    ExpirationTime, NodeTag, ProcessContext, Update, UpdateArena, UpdateTag,
};

type Props = ();
type Instance = ();
type ReducerError = std::convert::Infallible;
type State = BTreeMap<String, i32>;

fn map(pairs: &[(&str, i32)]) -> State {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[test]
fn non_loss_skipped_update_survives_in_chain() {
    let mut arena: UpdateArena<State, Props, Instance, ReducerError> = UpdateArena::new();
    let node = arena.create_node(State::new(), NodeTag::Other);
    let lo = ExpirationTime::new(1);
    let hi = ExpirationTime::new(5);

    enqueue_update(&mut arena, node, Update::new(lo).with_value(map(&[("a", 1)]))).unwrap();

    let mut ctx = ProcessContext::new();
    process_queue(&mut arena, node, &(), &(), hi, &mut ctx).unwrap();

    // Not reflected in memoized_state yet...
    assert_eq!(arena.node(node).unwrap().memoized_state, State::new());
    // ...but still present in the chain, not lost.
    assert!(arena.node(node).unwrap().queue.as_ref().unwrap().first_update.is_some());
}

#[test]
fn determinism_regardless_of_priority_processing_order() {
    let build = |order: &[u64]| {
        let mut arena: UpdateArena<State, Props, Instance, ReducerError> = UpdateArena::new();
        let node = arena.create_node(State::new(), NodeTag::Other);
        enqueue_update(&mut arena, node, Update::new(ExpirationTime::new(1)).with_value(map(&[("a", 1)]))).unwrap();
        enqueue_update(&mut arena, node, Update::new(ExpirationTime::new(2)).with_value(map(&[("b", 2)]))).unwrap();
        enqueue_update(&mut arena, node, Update::new(ExpirationTime::new(1)).with_value(map(&[("c", 3)]))).unwrap();
        enqueue_update(&mut arena, node, Update::new(ExpirationTime::new(2)).with_value(map(&[("d", 4)]))).unwrap();

        let mut ctx = ProcessContext::new();
        for &priority in order {
            process_queue(&mut arena, node, &(), &(), ExpirationTime::new(priority), &mut ctx).unwrap();
        }
        arena.node(node).unwrap().memoized_state.clone()
    };

    let high_then_low = build(&[2, 1]);
    let low_then_high = build(&[1, 2]);
    assert_eq!(high_then_low, low_then_high);
    assert_eq!(high_then_low, map(&[("a", 1), ("b", 2), ("c", 3), ("d", 4)]));
}

#[test]
fn base_state_freeze_point() {
    let mut arena: UpdateArena<State, Props, Instance, ReducerError> = UpdateArena::new();
    let node = arena.create_node(State::new(), NodeTag::Other);
    let lo = ExpirationTime::new(1);
    let hi = ExpirationTime::new(5);

    enqueue_update(&mut arena, node, Update::new(hi).with_value(map(&[("a", 1)]))).unwrap();
    enqueue_update(&mut arena, node, Update::new(lo).with_value(map(&[("b", 2)]))).unwrap();
    enqueue_update(&mut arena, node, Update::new(hi).with_value(map(&[("c", 3)]))).unwrap();

    let mut ctx = ProcessContext::new();
    process_queue(&mut arena, node, &(), &(), hi, &mut ctx).unwrap();

    // The first record is sufficient and applies; the second is skipped and freezes base_state at
    // the result computed right before it; the third never runs because it's not reached.
    let queue = arena.node(node).unwrap().queue.as_ref().unwrap();
    assert_eq!(queue.base_state, map(&[("a", 1)]));
    assert_eq!(arena.node(node).unwrap().memoized_state, map(&[("a", 1)]));
}

#[test]
fn structural_sharing_of_last_update_across_double_buffer() {
    let mut arena: UpdateArena<State, Props, Instance, ReducerError> = UpdateArena::new();
    let current = arena.create_node(State::new(), NodeTag::Other);
    let alternate = arena.create_node(State::new(), NodeTag::Other);
    arena.pair_with_alternate(current, alternate).unwrap();

    enqueue_update(&mut arena, current, Update::new(ExpirationTime::new(1)).with_value(map(&[("a", 1)]))).unwrap();

    let current_last = arena.node(current).unwrap().queue.as_ref().unwrap().last_update;
    let alternate_last = arena.node(alternate).unwrap().queue.as_ref().unwrap().last_update;
    assert_eq!(current_last, alternate_last);
    assert!(current_last.is_some());
}

#[test]
fn clone_isolation_captured_updates_not_visible_on_committed_side() {
    let mut arena: UpdateArena<State, Props, Instance, ReducerError> = UpdateArena::new();
    let current = arena.create_node(State::new(), NodeTag::Other);
    let alternate = arena.create_node(State::new(), NodeTag::Other);
    arena.pair_with_alternate(current, alternate).unwrap();

    enqueue_update(&mut arena, current, Update::new(ExpirationTime::new(1)).with_value(map(&[("a", 1)]))).unwrap();

    enqueue_captured_update(
        &mut arena,
        alternate,
        Update::new(ExpirationTime::new(1))
            .with_tag(UpdateTag::CaptureUpdate)
            .with_value(map(&[("err", 1)])),
    )
    .unwrap();

    assert!(arena.node(current).unwrap().queue.as_ref().unwrap().first_captured_update.is_none());
    assert!(arena.node(alternate).unwrap().queue.as_ref().unwrap().first_captured_update.is_some());
}

#[test]
fn effect_ordering_normal_before_captured_each_at_most_once() {
    let mut arena: UpdateArena<State, Props, i32, ReducerError> = UpdateArena::new();
    let node = arena.create_node(State::new(), NodeTag::Other);
    let hi = ExpirationTime::new(5);

    let order = Rc::new(RefCell::new(Vec::new()));
    let normal_order = Rc::clone(&order);
    let captured_order = Rc::clone(&order);

    enqueue_update(
        &mut arena,
        node,
        Update::new(hi).with_value(map(&[("a", 1)])).with_callback(move |_: &i32| {
            normal_order.borrow_mut().push("normal");
        }),
    )
    .unwrap();
    enqueue_captured_update(
        &mut arena,
        node,
        Update::new(hi)
            .with_tag(UpdateTag::CaptureUpdate)
            .with_value(map(&[("err", 1)]))
            .with_callback(move |_: &i32| {
                captured_order.borrow_mut().push("captured");
            }),
    )
    .unwrap();

    let mut ctx = ProcessContext::new();
    process_queue(&mut arena, node, &(), &7, hi, &mut ctx).unwrap();
    commit_queue(&mut arena, node, &7).unwrap();
    commit_queue(&mut arena, node, &7).unwrap();

    assert_eq!(*order.borrow(), vec!["normal", "captured"]);
}

#[test]
fn force_update_flag_true_iff_force_update_processed() {
    let mut arena: UpdateArena<State, Props, Instance, ReducerError> = UpdateArena::new();
    let node = arena.create_node(State::new(), NodeTag::Other);
    let hi = ExpirationTime::new(5);

    enqueue_update(&mut arena, node, Update::new(hi).with_value(map(&[("a", 1)]))).unwrap();

    let mut ctx = ProcessContext::new();
    process_queue(&mut arena, node, &(), &(), hi, &mut ctx).unwrap();
    assert!(!ctx.consume_has_force_update());

    enqueue_update(&mut arena, node, Update::new(hi).with_tag(UpdateTag::ForceUpdate)).unwrap();
    process_queue(&mut arena, node, &(), &(), hi, &mut ctx).unwrap();
    assert!(ctx.consume_has_force_update());
}

#[test]
fn skipped_captured_update_splices_onto_normal_chain_on_commit() {
    let mut arena: UpdateArena<State, Props, Instance, ReducerError> = UpdateArena::new();
    let node = arena.create_node(State::new(), NodeTag::Other);
    let lo = ExpirationTime::new(1);
    let hi = ExpirationTime::new(5);

    enqueue_captured_update(
        &mut arena,
        node,
        Update::new(lo).with_tag(UpdateTag::CaptureUpdate).with_value(map(&[("err", 1)])),
    )
    .unwrap();

    let mut ctx = ProcessContext::new();
    // Processing at hi is higher than the captured update's priority, so it's skipped and
    // survives in first_captured_update rather than being applied.
    process_queue(&mut arena, node, &(), &(), hi, &mut ctx).unwrap();
    {
        let queue = arena.node(node).unwrap().queue.as_ref().unwrap();
        assert!(queue.first_captured_update.is_some());
        assert!(queue.first_update.is_none());
    }
    assert!(
        arena.node(node).unwrap().effect_flags.contains(EffectFlags::CALLBACK),
        "a skipped captured update must still mark the node effect-pending"
    );

    commit_queue(&mut arena, node, &()).unwrap();

    let queue = arena.node(node).unwrap().queue.as_ref().unwrap();
    assert!(queue.first_captured_update.is_none(), "captured chain pointers are cleared after splice");
    assert!(queue.first_update.is_some(), "the skipped captured update now lives on the normal chain");

    // A later pass at the captured update's own priority now picks it up from the normal chain.
    process_queue(&mut arena, node, &(), &(), lo, &mut ctx).unwrap();
    assert_eq!(arena.node(node).unwrap().memoized_state, map(&[("err", 1)]));
    assert!(arena.node(node).unwrap().effect_flags.contains(EffectFlags::DID_CAPTURE));
}
