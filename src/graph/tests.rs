// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use rstest::{fixture, rstest};

use crate::model::{
    HasBase, PointId, PrimitiveRef, Projection, Segment, SegmentId, TagMap, TrackId,
};

use super::{GraphBuilder, GraphError, GraphStore};

struct Line {
    store: GraphStore,
    points: [PointId; 3],
    segments: [SegmentId; 2],
    track: TrackId,
    spur: SegmentId,
}

/// p0 -> p1 -> p2 as one track, plus a pending spur p2 -> p0.
#[fixture]
fn line() -> Line {
    let mut builder = GraphBuilder::new(Projection::Epsg4326);
    let p0 = builder.point(0.0, 0.0);
    let p1 = builder.point(0.0, 1.0);
    let p2 = builder.point(1.0, 1.0);
    let s0 = builder.segment(p0, p1).expect("s0");
    let s1 = builder.segment(p1, p2).expect("s1");
    let track = builder.track(vec![s0, s1], TagMap::new()).expect("track");
    let spur = builder.segment(p2, p0).expect("spur");
    Line {
        store: builder.build(),
        points: [p0, p1, p2],
        segments: [s0, s1],
        track,
        spur,
    }
}

#[rstest]
fn builder_partitions_segments(line: Line) {
    let store = &line.store;
    assert_eq!(store.check_invariants(), Ok(()));
    assert!(store.is_pending(line.spur));
    assert!(!store.is_pending(line.segments[0]));
    assert_eq!(store.track_of(line.segments[1]), Some(line.track));
    assert_eq!(store.track_of(line.spur), None);
    assert_eq!(store.pending_segments().collect::<Vec<_>>(), vec![line.spur]);
    assert!(store.points().all(|(_, p)| !p.base().is_modified()));
}

#[rstest]
fn back_references_are_scanned(line: Line) {
    let store = &line.store;
    let [p0, p1, p2] = line.points;
    assert_eq!(store.segments_referencing(p1).as_slice(), &line.segments[..]);
    assert_eq!(
        store.segments_referencing(p0).as_slice(),
        &[line.segments[0], line.spur]
    );
    assert_eq!(store.tracks_referencing_point(p2).as_slice(), &[line.track]);
    assert!(store.is_referenced(p0));
    assert_eq!(store.track_start(line.track), Some(p0));
    assert_eq!(store.track_end(line.track), Some(p2));
    assert_eq!(store.track_points(line.track).expect("points"), vec![p0, p1, p2]);
}

#[rstest]
fn builder_rejects_broken_chain_and_double_ownership(line: Line) {
    let mut builder = GraphBuilder::new(Projection::Epsg4326);
    let a = builder.point(0.0, 0.0);
    let b = builder.point(0.0, 1.0);
    let c = builder.point(1.0, 1.0);
    let ab = builder.segment(a, b).expect("ab");
    let ca = builder.segment(c, a).expect("ca");
    assert!(matches!(
        builder.track(vec![ab, ca], TagMap::new()),
        Err(GraphError::BrokenChain { .. })
    ));
    builder.track(vec![ab], TagMap::new()).expect("first owner");
    assert!(matches!(
        builder.track(vec![ab], TagMap::new()),
        Err(GraphError::SegmentOwned { .. })
    ));
    assert!(matches!(
        builder.segment(a, a),
        Err(GraphError::DegenerateSegment(_))
    ));
    // The fixture is unaffected by a separate builder.
    assert_eq!(line.store.check_invariants(), Ok(()));
}

#[rstest]
fn assign_requires_pending_segment(mut line: Line) {
    let err = line
        .store
        .assign_pending_segment(line.segments[0], line.track, true)
        .expect_err("owned segment");
    assert_eq!(
        err,
        GraphError::SegmentOwned {
            segment: line.segments[0],
            track: line.track
        }
    );

    line.store
        .assign_pending_segment(line.spur, line.track, true)
        .expect("spur chains at the end");
    assert!(!line.store.is_pending(line.spur));
    assert_eq!(line.store.track(line.track).expect("track").len(), 3);
    assert_eq!(line.store.check_invariants(), Ok(()));
}

#[rstest]
fn assign_rejects_broken_chain(mut line: Line) {
    let [_, p1, p2] = line.points;
    let parallel: SegmentId = line.store.allocate();
    line.store
        .add_pending_segment(parallel, Segment::new(p1, p2))
        .expect("parallel");
    // p1 -> p2 ends at p2, not at the track start p0.
    let err = line
        .store
        .assign_pending_segment(parallel, line.track, false)
        .expect_err("prepend does not chain");
    assert!(matches!(err, GraphError::BrokenChain { .. }));
    assert!(line.store.is_pending(parallel));
    assert_eq!(line.store.track(line.track).expect("track").len(), 2);
}

#[rstest]
fn assign_can_prepend_a_closing_segment(mut line: Line) {
    // The spur ends at the track start, so it chains in front and closes the loop.
    line.store
        .assign_pending_segment(line.spur, line.track, false)
        .expect("spur chains at the start");
    assert_eq!(line.store.track(line.track).expect("track").first_segment(), Some(line.spur));
    assert_eq!(line.store.check_invariants(), Ok(()));
}

#[rstest]
fn remove_point_fails_while_referenced(mut line: Line) {
    let err = line.store.remove_point(line.points[1]).expect_err("in use");
    assert_eq!(
        err,
        GraphError::PointInUse {
            point: line.points[1],
            segments: 2
        }
    );
}

#[rstest]
fn removing_a_track_releases_its_segments(mut line: Line) {
    line.store.remove_track(line.track).expect("remove");
    assert_eq!(line.store.pending_segments().count(), 3);
    assert_eq!(line.store.check_invariants(), Ok(()));
}

#[rstest]
fn snapshot_restore_brings_back_removed_and_drops_created(mut line: Line) {
    let before = line.store.clone();
    let snapshot = line.store.capture([
        PrimitiveRef::Track(line.track),
        PrimitiveRef::Segment(line.segments[0]),
        PrimitiveRef::Segment(line.segments[1]),
        PrimitiveRef::Segment(line.spur),
    ]);
    line.store.remove_track(line.track).expect("remove");
    line.store.destroy_pending_segment(line.spur).expect("destroy");
    line.store.restore(&snapshot);

    assert!(line.store.points().eq(before.points()));
    assert!(line.store.segments().eq(before.segments()));
    assert!(line.store.tracks().eq(before.tracks()));
    assert!(line.store.pending_segments().eq(before.pending_segments()));
}

#[test]
fn bounds_are_none_for_empty_or_nan() {
    assert!(GraphStore::default().bounds_projected().is_none());
    assert!(GraphStore::default().bounds_geographic().is_none());

    let mut builder = GraphBuilder::new(Projection::Epsg4326);
    builder.point(1.0, 2.0);
    builder.point(f64::NAN, 0.0);
    let store = builder.build();
    assert!(store.bounds_projected().is_none());
    assert!(store.bounds_geographic().is_none());
}

#[rstest]
fn bounds_cover_every_point(line: Line) {
    let geo = line.store.bounds_geographic().expect("bounds");
    assert_eq!((geo.min.lat, geo.min.lon), (0.0, 0.0));
    assert_eq!((geo.max.lat, geo.max.lon), (1.0, 1.0));
    let projected = line.store.bounds_projected().expect("bounds");
    assert_eq!(projected.center().east, 0.5);
}

#[rstest]
fn mercator_reprojects_points(mut line: Line) {
    line.store.set_projection(Projection::Mercator);
    let p1 = line.store.point(line.points[1]).expect("p1");
    assert!((p1.east_north().east - 1.0_f64.to_radians()).abs() < 1e-12);
    assert!(p1.east_north().north.abs() < 1e-12);
}

#[rstest]
fn selection_tracks_dirty_state(mut line: Line) {
    let target = PrimitiveRef::Segment(line.spur);
    line.store.set_selected(target, true).expect("select");
    assert!(line.store.is_selected(target));
    assert!(line.store.take_selection_dirty());
    // Re-selecting is not a change.
    line.store.set_selected(target, true).expect("select");
    assert!(!line.store.take_selection_dirty());

    line.store
        .select_only([PrimitiveRef::Track(line.track)])
        .expect("select only");
    assert_eq!(
        line.store.selected(),
        BTreeSet::from([PrimitiveRef::Track(line.track)])
    );

    let missing = PrimitiveRef::Point(PointId::from_raw(999));
    assert_eq!(
        line.store.select_only([missing]),
        Err(GraphError::UnknownPoint(PointId::from_raw(999)))
    );
    assert!(line.store.is_selected(PrimitiveRef::Track(line.track)));

    line.store.clear_selection();
    assert!(line.store.selected().is_empty());
}
