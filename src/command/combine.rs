// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use crate::graph::{GraphError, GraphStore, Snapshot};
use crate::model::{HasBase, PointId, PrimitiveRef, SegmentId, TagMap, TrackId};

use super::{Affected, AffectedBuilder, CommandError, SnapshotCommand};

#[derive(Debug, Clone, PartialEq)]
enum CombineKind {
    SegmentIntoTrack {
        segment: SegmentId,
        track: TrackId,
        at_end: bool,
    },
    Tracks {
        survivor: TrackId,
        consumed: TrackId,
        tags: TagMap,
    },
}

/// Merges two primitives into one track. Built by [`edit::combine`](crate::edit::combine), which
/// decides orientation and the merged tags.
#[derive(Debug, Clone, PartialEq)]
pub struct CombineCommand {
    kind: CombineKind,
    affected: Affected,
    saved: Option<Snapshot>,
}

impl CombineCommand {
    /// Appends (`at_end`) or prepends a pending segment to a track.
    pub(crate) fn segment_into_track(segment: SegmentId, track: TrackId, at_end: bool) -> Self {
        let mut affected = AffectedBuilder::default();
        affected.record_modified(PrimitiveRef::Track(track));
        Self {
            kind: CombineKind::SegmentIntoTrack {
                segment,
                track,
                at_end,
            },
            affected: affected.finish(),
            saved: None,
        }
    }

    /// Appends `consumed`'s segments to `survivor`, sets the survivor's tags, deletes `consumed`.
    pub(crate) fn tracks(survivor: TrackId, consumed: TrackId, tags: TagMap) -> Self {
        let mut affected = AffectedBuilder::default();
        affected.record_modified(PrimitiveRef::Track(survivor));
        affected.record_deleted(PrimitiveRef::Track(consumed));
        Self {
            kind: CombineKind::Tracks {
                survivor,
                consumed,
                tags,
            },
            affected: affected.finish(),
            saved: None,
        }
    }

    /// The track that holds the combined result.
    pub fn result_track(&self) -> TrackId {
        match self.kind {
            CombineKind::SegmentIntoTrack { track, .. } => track,
            CombineKind::Tracks { survivor, .. } => survivor,
        }
    }

    pub fn is_executed(&self) -> bool {
        self.saved.is_some()
    }
}

impl SnapshotCommand for CombineCommand {
    fn name(&self) -> &'static str {
        "combine"
    }

    fn touched(&self, store: &GraphStore) -> Result<BTreeSet<PrimitiveRef>, CommandError> {
        match &self.kind {
            CombineKind::SegmentIntoTrack { segment, track, .. } => {
                if !store.is_pending(*segment) {
                    return Err(GraphError::NotPending(*segment).into());
                }
                store.track(*track).ok_or(GraphError::UnknownTrack(*track))?;
                Ok(BTreeSet::from([
                    PrimitiveRef::Segment(*segment),
                    PrimitiveRef::Track(*track),
                ]))
            }
            CombineKind::Tracks {
                survivor, consumed, ..
            } => {
                store.track(*survivor).ok_or(GraphError::UnknownTrack(*survivor))?;
                let consumed_track = store
                    .track(*consumed)
                    .ok_or(GraphError::UnknownTrack(*consumed))?;
                let mut touched = BTreeSet::from([
                    PrimitiveRef::Track(*survivor),
                    PrimitiveRef::Track(*consumed),
                ]);
                touched.extend(
                    consumed_track
                        .segments()
                        .iter()
                        .copied()
                        .map(PrimitiveRef::Segment),
                );
                Ok(touched)
            }
        }
    }

    fn apply(&self, store: &mut GraphStore) -> Result<(), CommandError> {
        match &self.kind {
            CombineKind::SegmentIntoTrack {
                segment,
                track,
                at_end,
            } => store.assign_pending_segment(*segment, *track, *at_end)?,
            CombineKind::Tracks {
                survivor,
                consumed,
                tags,
            } => {
                let removed = store.remove_track(*consumed)?;
                let mut segments = store
                    .track(*survivor)
                    .ok_or(GraphError::UnknownTrack(*survivor))?
                    .segments()
                    .to_vec();
                segments.extend_from_slice(removed.segments());
                store.set_track_segments(*survivor, segments)?;
                store.track_mut(*survivor)?.base_mut().set_tags(tags.clone());
            }
        }
        Ok(())
    }

    fn affected(&self) -> &Affected {
        &self.affected
    }

    fn saved(&mut self) -> &mut Option<Snapshot> {
        &mut self.saved
    }
}

/// Two segments of one track meeting head-to-tail at the deleted point, fused into `incoming`.
#[derive(Debug, Clone, PartialEq)]
pub struct Splice {
    pub track: TrackId,
    pub incoming: SegmentId,
    pub outgoing: SegmentId,
    /// New end of `incoming` (the far end of `outgoing`).
    pub new_end: PointId,
    pub tags: TagMap,
}

/// Two tracks meeting end-to-start at the deleted point. `survivor` absorbs `consumed`, and the
/// boundary segments fuse into `survivor`'s last segment.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackJoin {
    pub survivor: TrackId,
    pub consumed: TrackId,
    pub incoming: SegmentId,
    pub outgoing: SegmentId,
    pub new_end: PointId,
    pub segment_tags: TagMap,
    pub track_tags: TagMap,
}

/// Removes a point and keeps the graph connected around it. Built by
/// [`edit::delete`](crate::edit::delete) once every precondition has been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct CombineAndDeleteCommand {
    point: PointId,
    splices: Vec<Splice>,
    join: Option<TrackJoin>,
    affected: Affected,
    saved: Option<Snapshot>,
}

impl CombineAndDeleteCommand {
    pub(crate) fn new(point: PointId, splices: Vec<Splice>, join: Option<TrackJoin>) -> Self {
        let mut affected = AffectedBuilder::default();
        affected.record_deleted(PrimitiveRef::Point(point));
        for splice in &splices {
            affected.record_modified(PrimitiveRef::Track(splice.track));
            affected.record_modified(PrimitiveRef::Segment(splice.incoming));
            affected.record_deleted(PrimitiveRef::Segment(splice.outgoing));
        }
        if let Some(join) = &join {
            affected.record_modified(PrimitiveRef::Track(join.survivor));
            affected.record_modified(PrimitiveRef::Segment(join.incoming));
            affected.record_deleted(PrimitiveRef::Segment(join.outgoing));
            affected.record_deleted(PrimitiveRef::Track(join.consumed));
        }
        Self {
            point,
            splices,
            join,
            affected: affected.finish(),
            saved: None,
        }
    }

    pub fn point(&self) -> PointId {
        self.point
    }

    pub fn splices(&self) -> &[Splice] {
        &self.splices
    }

    pub fn join(&self) -> Option<&TrackJoin> {
        self.join.as_ref()
    }

    pub fn is_executed(&self) -> bool {
        self.saved.is_some()
    }

    fn fuse(
        store: &mut GraphStore,
        incoming: SegmentId,
        new_end: PointId,
        tags: &TagMap,
    ) -> Result<(), GraphError> {
        let start = store
            .segment(incoming)
            .ok_or(GraphError::UnknownSegment(incoming))?
            .start();
        store.set_segment_ends(incoming, start, new_end)?;
        store.segment_mut(incoming)?.base_mut().set_tags(tags.clone());
        Ok(())
    }
}

impl SnapshotCommand for CombineAndDeleteCommand {
    fn name(&self) -> &'static str {
        "delete and combine"
    }

    fn touched(&self, store: &GraphStore) -> Result<BTreeSet<PrimitiveRef>, CommandError> {
        store.point(self.point).ok_or(GraphError::UnknownPoint(self.point))?;
        let mut touched: BTreeSet<PrimitiveRef> = self.affected.all().collect();
        if let Some(join) = &self.join {
            let consumed = store
                .track(join.consumed)
                .ok_or(GraphError::UnknownTrack(join.consumed))?;
            touched.extend(consumed.segments().iter().copied().map(PrimitiveRef::Segment));
        }
        Ok(touched)
    }

    fn apply(&self, store: &mut GraphStore) -> Result<(), CommandError> {
        for splice in &self.splices {
            Self::fuse(store, splice.incoming, splice.new_end, &splice.tags)?;
            let remaining: Vec<SegmentId> = store
                .track(splice.track)
                .ok_or(GraphError::UnknownTrack(splice.track))?
                .segments()
                .iter()
                .copied()
                .filter(|s| *s != splice.outgoing)
                .collect();
            store.set_track_segments(splice.track, remaining)?;
            store.destroy_pending_segment(splice.outgoing)?;
        }

        if let Some(join) = &self.join {
            Self::fuse(store, join.incoming, join.new_end, &join.segment_tags)?;
            let consumed = store.remove_track(join.consumed)?;
            let mut segments = store
                .track(join.survivor)
                .ok_or(GraphError::UnknownTrack(join.survivor))?
                .segments()
                .to_vec();
            segments.extend(
                consumed
                    .segments()
                    .iter()
                    .copied()
                    .filter(|s| *s != join.outgoing),
            );
            store.set_track_segments(join.survivor, segments)?;
            store.destroy_pending_segment(join.outgoing)?;
            store
                .track_mut(join.survivor)?
                .base_mut()
                .set_tags(join.track_tags.clone());
        }

        store.remove_point(self.point)?;
        Ok(())
    }

    fn affected(&self) -> &Affected {
        &self.affected
    }

    fn saved(&mut self) -> &mut Option<Snapshot> {
        &mut self.saved
    }
}
