// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use tracing::{info, warn};

use crate::command::{Command, CommandError, ReverseTrackCommand, SplitTrackCommand};
use crate::graph::{GraphError, GraphStore};
use crate::model::{HasBase, PointId, TrackId};

use super::{AbortReason, EditAbort, EditAction};

/// Plans splitting `track` at an interior joint `point`.
///
/// The original track keeps every segment up to and including the one ending at `point`; a new
/// track with a copy of the tags takes the rest. Returns the new track's handle with the command.
pub fn split_track(
    store: &mut GraphStore,
    track: TrackId,
    point: PointId,
) -> Result<(TrackId, Command), CommandError> {
    let owned = store.track(track).ok_or(GraphError::UnknownTrack(track))?;
    let points = store.track_points(track)?;
    // Joint i sits between segment i-1 and segment i; skip the two track ends.
    let interior = points.len().saturating_sub(1);
    let Some(keep) = (1..interior).find(|idx| points[*idx] == point) else {
        warn!(track = %track, point = %point, "split aborted");
        return Err(EditAbort::new(EditAction::SplitTrack, AbortReason::PointNotInside)
            .on(point)
            .into());
    };
    let tags = owned.tags().clone();
    let command = SplitTrackCommand::new(store, track, keep, tags);
    let new_track = command.new_track();
    info!(track = %track, point = %point, keep, new_track = %new_track, "planned split");
    Ok((new_track, command.into()))
}

/// Plans reversing `track`; `None` for an empty track.
pub fn reverse_track(store: &GraphStore, track: TrackId) -> Result<Option<Command>, CommandError> {
    let owned = store.track(track).ok_or(GraphError::UnknownTrack(track))?;
    if owned.is_empty() {
        return Ok(None);
    }
    Ok(Some(ReverseTrackCommand::new(store, track)?.into()))
}
