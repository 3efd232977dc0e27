// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rstest::rstest;

use tracksmith::command::{
    ChangeTagsCommand, Command, CommandError, DeleteCommand, MoveCommand, RotateCommand,
    SequenceCommand,
};
use tracksmith::edit::{self, AbortReason, DeleteMode, TagPolicy};
use tracksmith::graph::{GraphBuilder, GraphStore};
use tracksmith::model::{HasBase, PointId, PrimitiveRef, Projection, SegmentId, TagMap, TrackId};
use tracksmith::selection::SelectionDispatcher;

fn tags(pairs: &[(&str, &str)]) -> TagMap {
    pairs.iter().copied().collect()
}

fn same_graph(a: &GraphStore, b: &GraphStore) -> bool {
    a.points().eq(b.points())
        && a.segments().eq(b.segments())
        && a.pending_segments().eq(b.pending_segments())
        && a.tracks().eq(b.tracks())
}

fn every_track_chains(store: &GraphStore) -> bool {
    store
        .tracks()
        .all(|(_, track)| store.check_chain(track.segments()).is_ok())
}

fn abort_reason(err: &CommandError) -> AbortReason {
    err.abort()
        .unwrap_or_else(|| panic!("expected an abort, got {err}"))
        .kind()
}

/// T1 = p0..p3 tagged highway, T2 = p3..p5, a pending spur p5 -> p6 and a lone point p7.
struct Network {
    store: GraphStore,
    p: Vec<PointId>,
    t1: TrackId,
    t2: TrackId,
    spur: SegmentId,
}

fn network() -> Network {
    let mut b = GraphBuilder::new(Projection::Epsg4326);
    let p: Vec<PointId> = (0..8).map(|i| b.point(46.0 + i as f64 * 0.01, 7.0)).collect();
    let t1 = b.polyline(&p[..4], tags(&[("highway", "track")])).expect("t1");
    let t2 = b.polyline(&p[3..6], tags(&[("surface", "gravel")])).expect("t2");
    let spur = b.segment(p[5], p[6]).expect("spur");
    Network {
        store: b.build(),
        p,
        t1,
        t2,
        spur,
    }
}

type Plan = fn(&mut Network) -> Command;

fn plan_cascade(n: &mut Network) -> Command {
    edit::delete(&n.store, [PrimitiveRef::Point(n.p[1])], DeleteMode::Cascade)
        .expect("plan")
        .expect("something to delete")
}

fn plan_delete_combine(n: &mut Network) -> Command {
    edit::delete(&n.store, [PrimitiveRef::Point(n.p[3])], DeleteMode::Combine)
        .expect("plan")
        .expect("something to delete")
}

fn plan_combine_tracks(n: &mut Network) -> Command {
    edit::combine(&n.store, n.t2.into(), n.t1.into(), TagPolicy::Strict).expect("plan")
}

fn plan_extend(n: &mut Network) -> Command {
    edit::combine(&n.store, n.spur.into(), n.t2.into(), TagPolicy::Strict).expect("plan")
}

fn plan_build(n: &mut Network) -> Command {
    let spur = n.spur;
    edit::build_track(&mut n.store, &[spur], TagMap::new())
        .expect("plan")
        .1
}

fn plan_split(n: &mut Network) -> Command {
    let (t1, at) = (n.t1, n.p[2]);
    edit::split_track(&mut n.store, t1, at).expect("plan").1
}

fn plan_reverse(n: &mut Network) -> Command {
    edit::reverse_track(&n.store, n.t2)
        .expect("plan")
        .expect("non-empty track")
}

fn plan_retag(n: &mut Network) -> Command {
    ChangeTagsCommand::new(
        [PrimitiveRef::Track(n.t1), PrimitiveRef::Segment(n.spur)],
        "highway",
        Some("path".into()),
    )
    .into()
}

fn plan_move(n: &mut Network) -> Command {
    MoveCommand::new(&n.store, &[n.t1.into()], 0.5, -0.25)
        .expect("move")
        .into()
}

fn plan_rotate(n: &mut Network) -> Command {
    RotateCommand::new(&n.store, &[n.t2.into(), n.p[7].into()], 0.3)
        .expect("rotate")
        .into()
}

#[rstest]
#[case::cascade(plan_cascade as Plan)]
#[case::delete_combine(plan_delete_combine as Plan)]
#[case::combine_tracks(plan_combine_tracks as Plan)]
#[case::extend(plan_extend as Plan)]
#[case::build(plan_build as Plan)]
#[case::split(plan_split as Plan)]
#[case::reverse(plan_reverse as Plan)]
#[case::retag(plan_retag as Plan)]
#[case::translate(plan_move as Plan)]
#[case::rotate(plan_rotate as Plan)]
fn undo_restores_every_affected_primitive(#[case] plan: Plan) {
    let mut n = network();
    let before = n.store.clone();
    let mut command = plan(&mut n);

    command.execute(&mut n.store).expect("execute");
    assert!(command.is_executed());
    assert!(!command.affected().is_empty());
    assert_eq!(n.store.check_invariants(), Ok(()));
    assert!(every_track_chains(&n.store));

    command.undo(&mut n.store).expect("undo");
    assert!(!command.is_executed());
    assert!(same_graph(&n.store, &before));
    for target in command.affected().all() {
        assert_eq!(n.store.get(target), before.get(target), "{target}");
    }
}

#[test]
fn history_unwinds_in_reverse_order() {
    let mut n = network();
    let before = n.store.clone();
    let plans: [Plan; 4] = [plan_extend, plan_delete_combine, plan_split, plan_retag];
    let mut history = Vec::new();
    for plan in plans {
        let mut command = plan(&mut n);
        command.execute(&mut n.store).expect("execute");
        assert!(every_track_chains(&n.store));
        history.push(command);
    }
    while let Some(mut command) = history.pop() {
        command.undo(&mut n.store).expect("undo");
    }
    assert!(same_graph(&n.store, &before));
}

#[test]
fn undo_before_execute_is_refused() {
    let mut n = network();
    let mut command = plan_retag(&mut n);
    assert_eq!(
        command.undo(&mut n.store),
        Err(CommandError::NotExecuted("set tag"))
    );
}

#[test]
fn joining_two_tracks_at_a_shared_point() {
    let mut n = network();
    let len_t1 = n.store.track(n.t1).expect("t1").len();
    let len_t2 = n.store.track(n.t2).expect("t2").len();

    let mut command = plan_delete_combine(&mut n);
    command.execute(&mut n.store).expect("execute");

    assert!(n.store.point(n.p[3]).is_none());
    assert!(n.store.track(n.t2).is_none());
    let joined = n.store.track(n.t1).expect("t1 kept");
    assert_eq!(joined.len(), len_t1 + len_t2 - 1);
    assert_eq!(n.store.track_count(), 1);
    assert_eq!(
        joined.tags(),
        &tags(&[("highway", "track"), ("surface", "gravel")])
    );
    let mut expected = n.p[..6].to_vec();
    expected.remove(3);
    assert_eq!(n.store.track_points(n.t1).expect("points"), expected);
    assert!(every_track_chains(&n.store));
}

#[test]
fn combined_tracks_chain() {
    let mut n = network();
    let mut command = plan_combine_tracks(&mut n);
    command.execute(&mut n.store).expect("execute");
    assert_eq!(n.store.track_count(), 1);
    assert_eq!(n.store.track_points(n.t1).expect("points"), n.p[..6].to_vec());
    assert!(every_track_chains(&n.store));
}

#[test]
fn deleting_a_point_used_three_times_by_one_track_aborts() {
    let mut b = GraphBuilder::new(Projection::Epsg4326);
    let p: Vec<PointId> = (0..5).map(|i| b.point(0.0, i as f64)).collect();
    // p1 is the start of the loop p1 -> p2 -> p3 -> p1 and continues to p4.
    b.polyline(&[p[0], p[1], p[2], p[3], p[1], p[4]], TagMap::new())
        .expect("looping track");
    let store = b.build();
    let before = store.clone();

    let err = edit::delete(&store, [PrimitiveRef::Point(p[1])], DeleteMode::Combine)
        .expect_err("abort");
    assert_eq!(abort_reason(&err), AbortReason::TooManySegments);
    assert!(err.to_string().contains("more than two segments"));
    assert_eq!(store, before);
}

#[rstest]
#[case::conflict(&[("a", "2")], None)]
#[case::disjoint(&[("b", "2")], Some(&[("a", "1"), ("b", "2")][..]))]
fn combining_tags(#[case] second: &[(&str, &str)], #[case] merged: Option<&[(&str, &str)]>) {
    let mut b = GraphBuilder::new(Projection::Epsg4326);
    let p: Vec<PointId> = (0..3).map(|i| b.point(0.0, i as f64)).collect();
    let t1 = b.polyline(&p[..2], tags(&[("a", "1")])).expect("t1");
    let t2 = b.polyline(&p[1..], tags(second)).expect("t2");
    let mut store = b.build();

    match (edit::combine(&store, t1.into(), t2.into(), TagPolicy::Strict), merged) {
        (Err(err), None) => {
            assert_eq!(abort_reason(&err), AbortReason::DifferentProperties);
            assert!(err.to_string().ends_with("different properties"));
        }
        (Ok(mut command), Some(expected)) => {
            command.execute(&mut store).expect("execute");
            assert_eq!(store.track(t1).expect("t1").tags(), &tags(expected));
        }
        (outcome, _) => panic!("unexpected outcome {outcome:?}"),
    }
}

fn bag_case(order: &[usize]) {
    let mut b = GraphBuilder::new(Projection::Epsg4326);
    let p: Vec<PointId> = (0..3).map(|i| b.point(1.0, i as f64)).collect();
    let segments = [
        b.segment(p[0], p[1]).expect("p1p2"),
        b.segment(p[1], p[2]).expect("p2p3"),
    ];
    let mut store = b.build();
    let bag: Vec<SegmentId> = order.iter().map(|i| segments[*i]).collect();

    let (track, mut command) = edit::build_track(&mut store, &bag, TagMap::new()).expect("plan");
    command.execute(&mut store).expect("execute");
    assert_eq!(store.track(track).expect("track").segments(), &segments);
    assert_eq!(store.track_points(track).expect("points"), p);
}

#[rstest]
#[case::ordered(&[0, 1])]
#[case::reversed(&[1, 0])]
#[case::duplicated(&[1, 0, 1])]
fn building_from_a_bag_yields_one_chain(#[case] order: &[usize]) {
    bag_case(order);
}

#[test]
fn building_from_a_shuffled_long_bag_yields_one_chain() {
    let mut b = GraphBuilder::new(Projection::Mercator);
    let p: Vec<PointId> = (0..40).map(|i| b.point(0.0, i as f64 * 0.001)).collect();
    let segments: Vec<SegmentId> = p
        .windows(2)
        .map(|w| b.segment(w[0], w[1]).expect("segment"))
        .collect();
    let baseline = b.build();

    let mut rng = StdRng::seed_from_u64(0x7a3c_5eed);
    for _ in 0..8 {
        let mut store = baseline.clone();
        let mut bag = segments.clone();
        bag.shuffle(&mut rng);
        let (track, mut command) =
            edit::build_track(&mut store, &bag, TagMap::new()).expect("plan");
        command.execute(&mut store).expect("execute");
        assert_eq!(store.track(track).expect("track").segments(), segments.as_slice());
    }
}

#[rstest]
fn deleting_an_isolated_point_is_immediate(
    #[values(DeleteMode::Cascade, DeleteMode::Combine)] mode: DeleteMode,
) {
    let mut n = network();
    let lone = n.p[7];
    let mut command = edit::delete(&n.store, [PrimitiveRef::Point(lone)], mode)
        .expect("plan")
        .expect("something to delete");
    assert!(matches!(command, Command::Delete(_)));
    command.execute(&mut n.store).expect("execute");
    assert!(n.store.point(lone).is_none());
    assert_eq!(
        command.affected().deleted,
        BTreeSet::from([PrimitiveRef::Point(lone)])
    );
}

#[test]
fn failing_sequence_leaves_store_untouched() {
    let mut n = network();
    let before = n.store.clone();
    let steps: Vec<Command> = vec![
        ChangeTagsCommand::new([PrimitiveRef::Track(n.t1)], "name", Some("Ridge".into())).into(),
        // p3 is still referenced by both tracks.
        DeleteCommand::new([PrimitiveRef::Point(n.p[3])]).into(),
    ];
    let mut sequence: Command = SequenceCommand::new("rename and prune", steps).into();

    let err = sequence.execute(&mut n.store).expect_err("second step fails");
    assert!(matches!(err, CommandError::SequenceStep { index: 1, .. }));
    assert!(!sequence.is_executed());
    assert!(same_graph(&n.store, &before));
}

#[test]
fn selection_changes_are_coalesced() {
    let mut n = network();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut dispatcher = SelectionDispatcher::new();
    let sink = Rc::clone(&seen);
    dispatcher.subscribe(move |selection| sink.borrow_mut().push(selection.clone()));

    n.store.set_selected(n.t1.into(), true).expect("select");
    n.store.set_selected(n.spur.into(), true).expect("select");
    n.store.set_selected(n.spur.into(), false).expect("deselect");
    assert!(dispatcher.flush(&mut n.store).is_some());
    assert!(dispatcher.flush(&mut n.store).is_none());

    assert_eq!(
        seen.borrow().as_slice(),
        &[BTreeSet::from([PrimitiveRef::Track(n.t1)])]
    );
}
