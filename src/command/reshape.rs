// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use crate::graph::{GraphError, GraphStore, Snapshot};
use crate::model::{PrimitiveRef, TagMap, Track, TrackId};

use super::{Affected, AffectedBuilder, CommandError, SnapshotCommand};

/// Cuts a track in two: the first `keep` segments stay, the rest move to a new track carrying a
/// copy of the original tags.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitTrackCommand {
    track: TrackId,
    keep: usize,
    new_track: TrackId,
    tags: TagMap,
    affected: Affected,
    saved: Option<Snapshot>,
}

impl SplitTrackCommand {
    /// Reserves the handle of the second half up front so it is stable across undo/redo.
    pub(crate) fn new(store: &mut GraphStore, track: TrackId, keep: usize, tags: TagMap) -> Self {
        let new_track = store.allocate();
        let mut affected = AffectedBuilder::default();
        affected.record_modified(PrimitiveRef::Track(track));
        affected.record_added(PrimitiveRef::Track(new_track));
        Self {
            track,
            keep,
            new_track,
            tags,
            affected: affected.finish(),
            saved: None,
        }
    }

    pub fn track(&self) -> TrackId {
        self.track
    }

    /// The track holding the segments after the split point.
    pub fn new_track(&self) -> TrackId {
        self.new_track
    }

    pub fn is_executed(&self) -> bool {
        self.saved.is_some()
    }
}

impl SnapshotCommand for SplitTrackCommand {
    fn name(&self) -> &'static str {
        "split track"
    }

    fn touched(&self, store: &GraphStore) -> Result<BTreeSet<PrimitiveRef>, CommandError> {
        let track = store.track(self.track).ok_or(GraphError::UnknownTrack(self.track))?;
        if store.track(self.new_track).is_some() {
            return Err(GraphError::AlreadyExists(self.new_track.into()).into());
        }
        let mut touched: BTreeSet<PrimitiveRef> = self.affected.all().collect();
        touched.extend(track.segments().iter().copied().map(PrimitiveRef::Segment));
        Ok(touched)
    }

    fn apply(&self, store: &mut GraphStore) -> Result<(), CommandError> {
        let mut kept = store
            .track(self.track)
            .ok_or(GraphError::UnknownTrack(self.track))?
            .segments()
            .to_vec();
        let rest = kept.split_off(self.keep.min(kept.len()));
        store.set_track_segments(self.track, kept)?;
        store.add_track(self.new_track, Track::with_tags(rest, self.tags.clone()))?;
        Ok(())
    }

    fn affected(&self) -> &Affected {
        &self.affected
    }

    fn saved(&mut self) -> &mut Option<Snapshot> {
        &mut self.saved
    }
}

/// Flips the direction of a track: every segment is turned around and the list is reversed.
#[derive(Debug, Clone, PartialEq)]
pub struct ReverseTrackCommand {
    track: TrackId,
    affected: Affected,
    saved: Option<Snapshot>,
}

impl ReverseTrackCommand {
    pub(crate) fn new(store: &GraphStore, track: TrackId) -> Result<Self, GraphError> {
        let owned = store.track(track).ok_or(GraphError::UnknownTrack(track))?;
        let mut affected = AffectedBuilder::default();
        affected.record_modified(PrimitiveRef::Track(track));
        for segment in owned.segments() {
            affected.record_modified(PrimitiveRef::Segment(*segment));
        }
        Ok(Self {
            track,
            affected: affected.finish(),
            saved: None,
        })
    }

    pub fn track(&self) -> TrackId {
        self.track
    }

    pub fn is_executed(&self) -> bool {
        self.saved.is_some()
    }
}

impl SnapshotCommand for ReverseTrackCommand {
    fn name(&self) -> &'static str {
        "reverse track"
    }

    fn touched(&self, store: &GraphStore) -> Result<BTreeSet<PrimitiveRef>, CommandError> {
        let track = store.track(self.track).ok_or(GraphError::UnknownTrack(self.track))?;
        let mut touched = BTreeSet::from([PrimitiveRef::Track(self.track)]);
        touched.extend(track.segments().iter().copied().map(PrimitiveRef::Segment));
        Ok(touched)
    }

    fn apply(&self, store: &mut GraphStore) -> Result<(), CommandError> {
        let mut segments = store
            .track(self.track)
            .ok_or(GraphError::UnknownTrack(self.track))?
            .segments()
            .to_vec();
        for id in &segments {
            store.segment_mut(*id)?.flip();
        }
        segments.reverse();
        store.set_track_segments(self.track, segments)?;
        Ok(())
    }

    fn affected(&self) -> &Affected {
        &self.affected
    }

    fn saved(&mut self) -> &mut Option<Snapshot> {
        &mut self.saved
    }
}
