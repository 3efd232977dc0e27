// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use tracing::{info, warn};

use crate::command::{Command, CommandError, CombineCommand};
use crate::graph::{GraphError, GraphStore};
use crate::model::{HasBase, PrimitiveRef, SegmentId, TrackId};

use super::{AbortReason, EditAbort, EditAction, TagPolicy};

/// Plans combining a pending segment with a track, or two tracks, into one track.
///
/// Orientation follows connectivity: a segment is prepended when it ends where the track starts and
/// appended when it starts where the track ends. Of two tracks, the one whose end meets the other's
/// start survives.
pub fn combine(
    store: &GraphStore,
    a: PrimitiveRef,
    b: PrimitiveRef,
    policy: TagPolicy,
) -> Result<Command, CommandError> {
    let planned = match (a, b) {
        (PrimitiveRef::Segment(segment), PrimitiveRef::Track(track))
        | (PrimitiveRef::Track(track), PrimitiveRef::Segment(segment)) => {
            segment_into_track(store, segment, track)
        }
        (PrimitiveRef::Track(first), PrimitiveRef::Track(second)) => {
            tracks(store, first, second, policy)
        }
        _ => Err(abort(AbortReason::UnsupportedKinds).into()),
    };
    if let Err(CommandError::Abort(refusal)) = &planned {
        warn!(%a, %b, reason = refusal.reason(), "combine aborted");
    }
    planned
}

fn abort(kind: AbortReason) -> EditAbort {
    EditAbort::new(EditAction::Combine, kind)
}

fn segment_into_track(
    store: &GraphStore,
    segment: SegmentId,
    track: TrackId,
) -> Result<Command, CommandError> {
    let seg = store.segment(segment).ok_or(GraphError::UnknownSegment(segment))?;
    let owned = store.track(track).ok_or(GraphError::UnknownTrack(track))?;
    if !store.is_pending(segment) {
        return Err(GraphError::NotPending(segment).into());
    }

    let at_end = if owned.is_empty() {
        true
    } else if store.track_start(track) == Some(seg.end()) {
        false
    } else if store.track_end(track) == Some(seg.start()) {
        true
    } else {
        return Err(abort(AbortReason::SegmentNotConnected).on(segment).into());
    };
    info!(segment = %segment, track = %track, at_end, "planned combine");
    Ok(CombineCommand::segment_into_track(segment, track, at_end).into())
}

fn tracks(
    store: &GraphStore,
    first: TrackId,
    second: TrackId,
    policy: TagPolicy,
) -> Result<Command, CommandError> {
    let a = store.track(first).ok_or(GraphError::UnknownTrack(first))?;
    let b = store.track(second).ok_or(GraphError::UnknownTrack(second))?;
    if first == second {
        return Err(abort(AbortReason::TracksNotConnected).on(first).into());
    }

    let meets = |tail: TrackId, head: TrackId| {
        matches!(
            (store.track_end(tail), store.track_start(head)),
            (Some(end), Some(start)) if end == start
        )
    };
    let (survivor, consumed, survivor_tags, consumed_tags) = if meets(first, second) {
        (first, second, a.tags(), b.tags())
    } else if meets(second, first) {
        (second, first, b.tags(), a.tags())
    } else {
        return Err(abort(AbortReason::TracksNotConnected).into());
    };

    let tags = match policy {
        TagPolicy::Strict => survivor_tags
            .merge_strict(consumed_tags)
            .map_err(|conflict| {
                warn!(
                    key = %conflict.key,
                    ours = %conflict.ours,
                    theirs = %conflict.theirs,
                    "tag conflict"
                );
                abort(AbortReason::DifferentProperties).on(consumed)
            })?,
        TagPolicy::DestinationWins => survivor_tags.merge_preferring_self(consumed_tags),
    };
    info!(survivor = %survivor, consumed = %consumed, "planned combine");
    Ok(CombineCommand::tracks(survivor, consumed, tags).into())
}
