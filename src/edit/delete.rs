// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, BTreeSet};

use smallvec::SmallVec;
use tracing::{info, warn};

use crate::command::{
    CombineAndDeleteCommand, Command, CommandError, DeleteCommand, SequenceCommand, Splice,
    TrackJoin,
};
use crate::graph::GraphStore;
use crate::model::{HasBase, PointId, PrimitiveRef, Segment, SegmentId, TagMap, TrackId};

use super::{AbortReason, DeleteMode, EditAbort, EditAction};

/// Plans the deletion of `targets`.
///
/// With [`DeleteMode::Combine`] and only point targets, each point is removed and the tracks
/// through it are reconnected (several points become one sequence, and any abort refuses the
/// whole request). Inputs containing segments or tracks are deleted by cascade. Returns
/// `Ok(None)` when no target exists.
pub fn delete(
    store: &GraphStore,
    targets: impl IntoIterator<Item = PrimitiveRef>,
    mode: DeleteMode,
) -> Result<Option<Command>, CommandError> {
    let targets: BTreeSet<PrimitiveRef> = targets.into_iter().collect();
    if mode == DeleteMode::Combine {
        let points: Option<Vec<PointId>> = targets
            .iter()
            .map(|target| match target {
                PrimitiveRef::Point(point) => Some(*point),
                _ => None,
            })
            .collect();
        if let Some(points) = points {
            let existing: Vec<PointId> =
                points.into_iter().filter(|p| store.point(*p).is_some()).collect();
            return plan_combine_all(store, &existing);
        }
    }
    Ok(plan_cascade(store, &targets).map(Command::Delete))
}

fn refuse(point: PointId, refusal: EditAbort) -> CommandError {
    warn!(point = %point, reason = refusal.reason(), "delete aborted");
    CommandError::Abort(refusal)
}

/// Plans every point in turn; later points are planned against a scratch store that already has
/// the earlier steps applied.
fn plan_combine_all(
    store: &GraphStore,
    points: &[PointId],
) -> Result<Option<Command>, CommandError> {
    match points {
        [] => Ok(None),
        [point] => plan_combine(store, *point)
            .map(Some)
            .map_err(|refusal| refuse(*point, refusal)),
        _ => {
            let mut scratch = store.clone();
            let mut steps = Vec::with_capacity(points.len());
            for point in points {
                let step =
                    plan_combine(&scratch, *point).map_err(|refusal| refuse(*point, refusal))?;
                steps.push(step.clone());
                let mut trial = step;
                trial.execute(&mut scratch)?;
            }
            info!(points = points.len(), "planned delete with combine of several points");
            Ok(Some(SequenceCommand::new("delete", steps).into()))
        }
    }
}

fn plan_cascade(store: &GraphStore, targets: &BTreeSet<PrimitiveRef>) -> Option<DeleteCommand> {
    let mut doomed: BTreeSet<PrimitiveRef> = BTreeSet::new();
    let doom_segment = |doomed: &mut BTreeSet<PrimitiveRef>, segment: SegmentId| {
        doomed.insert(PrimitiveRef::Segment(segment));
        if let Some(track) = store.track_of(segment) {
            doomed.insert(PrimitiveRef::Track(track));
        }
    };
    for target in targets.iter().copied().filter(|t| store.contains(*t)) {
        match target {
            PrimitiveRef::Point(point) => {
                doomed.insert(target);
                for segment in store.segments_referencing(point) {
                    doom_segment(&mut doomed, segment);
                }
            }
            PrimitiveRef::Segment(segment) => doom_segment(&mut doomed, segment),
            PrimitiveRef::Track(_) => {
                doomed.insert(target);
            }
        }
    }
    if doomed.is_empty() {
        return None;
    }

    // Endpoints of removed segments that nothing else references go too.
    let deleted_segments: Vec<SegmentId> = doomed
        .iter()
        .filter_map(|t| match t {
            PrimitiveRef::Segment(id) => Some(*id),
            _ => None,
        })
        .collect();
    let mut candidates: BTreeSet<PointId> = BTreeSet::new();
    for id in &deleted_segments {
        if let Some(segment) = store.segment(*id) {
            candidates.insert(segment.start());
            candidates.insert(segment.end());
        }
    }
    for point in candidates {
        let still_used = store
            .segments_referencing(point)
            .iter()
            .any(|s| !deleted_segments.contains(s));
        if !still_used {
            doomed.insert(PrimitiveRef::Point(point));
        }
    }

    info!(targets = targets.len(), removed = doomed.len(), "planned cascade delete");
    Some(DeleteCommand::new(doomed))
}

fn abort(kind: AbortReason, point: PointId) -> EditAbort {
    EditAbort::new(EditAction::Delete, kind).on(point)
}

fn merged_tags(ours: &TagMap, theirs: &TagMap, point: PointId) -> Result<TagMap, EditAbort> {
    ours.merge_strict(theirs).map_err(|conflict| {
        warn!(point = %point, key = %conflict.key, "tag conflict while combining");
        abort(AbortReason::DifferentProperties, point)
    })
}

/// Finds the segment ending at `point` and the one starting there, or aborts.
fn head_to_tail<'a>(
    store: &'a GraphStore,
    pair: [SegmentId; 2],
    point: PointId,
) -> Result<(SegmentId, &'a Segment, SegmentId, &'a Segment), EditAbort> {
    let lookup = |id: SegmentId| {
        store
            .segment(id)
            .ok_or_else(|| abort(AbortReason::SegmentsPointTogether, point))
    };
    let (a, b) = (lookup(pair[0])?, lookup(pair[1])?);
    if a.end() == point && b.start() == point {
        Ok((pair[0], a, pair[1], b))
    } else if b.end() == point && a.start() == point {
        Ok((pair[1], b, pair[0], a))
    } else {
        Err(abort(AbortReason::SegmentsPointTogether, point))
    }
}

fn plan_combine(store: &GraphStore, point: PointId) -> Result<Command, EditAbort> {
    let users = store.segments_referencing(point);
    if users.is_empty() {
        info!(point = %point, "deleting isolated point");
        return Ok(DeleteCommand::new([PrimitiveRef::Point(point)]).into());
    }

    let mut by_track: BTreeMap<TrackId, SmallVec<[SegmentId; 2]>> = BTreeMap::new();
    for segment in &users {
        match store.track_of(*segment) {
            Some(track) => by_track.entry(track).or_default().push(*segment),
            None => return Err(abort(AbortReason::PendingSegment, point)),
        }
    }

    let mut splices = Vec::new();
    let mut ends: Vec<(TrackId, SegmentId)> = Vec::new();
    for (track, segments) in &by_track {
        match segments.as_slice() {
            [single] => ends.push((*track, *single)),
            [first, second] => {
                let (incoming, inc, outgoing, out) =
                    head_to_tail(store, [*first, *second], point)?;
                if inc.start() == out.end() {
                    return Err(abort(AbortReason::DegenerateSegment, point));
                }
                splices.push(Splice {
                    track: *track,
                    incoming,
                    outgoing,
                    new_end: out.end(),
                    tags: merged_tags(inc.tags(), out.tags(), point)?,
                });
            }
            _ => return Err(abort(AbortReason::TooManySegments, point)),
        }
    }

    let join = match ends.as_slice() {
        [] => None,
        [_] => return Err(abort(AbortReason::UsedByTrack, point)),
        [first, second] => Some(plan_join(store, *first, *second, point)?),
        _ => return Err(abort(AbortReason::TooManyTracks, point)),
    };

    info!(
        point = %point,
        splices = splices.len(),
        joined = join.is_some(),
        "planned delete with combine"
    );
    Ok(CombineAndDeleteCommand::new(point, splices, join).into())
}

fn plan_join(
    store: &GraphStore,
    first: (TrackId, SegmentId),
    second: (TrackId, SegmentId),
    point: PointId,
) -> Result<TrackJoin, EditAbort> {
    let (incoming, inc, outgoing, out) = head_to_tail(store, [first.1, second.1], point)?;
    let (survivor, consumed) = if incoming == first.1 {
        (first.0, second.0)
    } else {
        (second.0, first.0)
    };
    if inc.start() == out.end() {
        return Err(abort(AbortReason::DegenerateSegment, point));
    }
    let survivor_tags = store
        .track(survivor)
        .map(|t| t.tags().clone())
        .unwrap_or_default();
    let consumed_tags = store
        .track(consumed)
        .map(|t| t.tags().clone())
        .unwrap_or_default();
    Ok(TrackJoin {
        survivor,
        consumed,
        incoming,
        outgoing,
        new_end: out.end(),
        segment_tags: merged_tags(inc.tags(), out.tags(), point)?,
        track_tags: merged_tags(&survivor_tags, &consumed_tags, point)?,
    })
}
