// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use crate::graph::{not_found, GraphError, GraphStore, Snapshot};
use crate::model::{PointId, PrimitiveRef, SegmentId, TrackId};

use super::{Affected, AffectedBuilder, CommandError, SnapshotCommand};

/// Removes a closed set of primitives.
///
/// The set must be self-contained: every segment is pending or owned by a track in the set, and
/// every point is referenced only by segments in the set. Segments of removed tracks that are not
/// themselves in the set go back to pending. Reference collection lives in
/// [`edit::delete`](crate::edit::delete).
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteCommand {
    tracks: Vec<TrackId>,
    segments: Vec<SegmentId>,
    points: Vec<PointId>,
    affected: Affected,
    saved: Option<Snapshot>,
}

impl DeleteCommand {
    pub fn new(targets: impl IntoIterator<Item = PrimitiveRef>) -> Self {
        let targets: BTreeSet<PrimitiveRef> = targets.into_iter().collect();
        let mut tracks = Vec::new();
        let mut segments = Vec::new();
        let mut points = Vec::new();
        let mut affected = AffectedBuilder::default();
        for target in &targets {
            match *target {
                PrimitiveRef::Point(id) => points.push(id),
                PrimitiveRef::Segment(id) => segments.push(id),
                PrimitiveRef::Track(id) => tracks.push(id),
            }
            affected.record_deleted(*target);
        }
        Self {
            tracks,
            segments,
            points,
            affected: affected.finish(),
            saved: None,
        }
    }

    pub fn is_executed(&self) -> bool {
        self.saved.is_some()
    }

    pub fn targets(&self) -> impl Iterator<Item = PrimitiveRef> + '_ {
        self.affected.deleted.iter().copied()
    }

    fn validate(&self, store: &GraphStore) -> Result<(), GraphError> {
        for target in self.targets() {
            if !store.contains(target) {
                return Err(not_found(target));
            }
        }
        for segment in &self.segments {
            if let Some(owner) = store.track_of(*segment) {
                if !self.tracks.contains(&owner) {
                    return Err(GraphError::SegmentOwned {
                        segment: *segment,
                        track: owner,
                    });
                }
            }
        }
        for point in &self.points {
            let outside = store
                .segments_referencing(*point)
                .iter()
                .filter(|s| !self.segments.contains(*s))
                .count();
            if outside > 0 {
                return Err(GraphError::PointInUse {
                    point: *point,
                    segments: outside,
                });
            }
        }
        Ok(())
    }
}

impl SnapshotCommand for DeleteCommand {
    fn name(&self) -> &'static str {
        "delete"
    }

    fn touched(&self, store: &GraphStore) -> Result<BTreeSet<PrimitiveRef>, CommandError> {
        self.validate(store)?;
        let mut touched: BTreeSet<PrimitiveRef> = self.targets().collect();
        for track in &self.tracks {
            if let Some(owned) = store.track(*track) {
                touched.extend(owned.segments().iter().copied().map(PrimitiveRef::Segment));
            }
        }
        Ok(touched)
    }

    fn apply(&self, store: &mut GraphStore) -> Result<(), CommandError> {
        for track in &self.tracks {
            store.remove_track(*track)?;
        }
        for segment in &self.segments {
            store.destroy_pending_segment(*segment)?;
        }
        for point in &self.points {
            store.remove_point(*point)?;
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
