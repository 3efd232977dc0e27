// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, BTreeSet};

use crate::graph::{not_found, GraphError, GraphStore, Snapshot};
use crate::model::{HasBase, Primitive, PrimitiveRef, SegmentId, TrackId};

use super::{Affected, AffectedBuilder, CommandError, SnapshotCommand};

/// The version chosen for one conflicting primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub target: PrimitiveRef,
    pub chosen: Primitive,
}

/// Overwrites local primitives with the versions picked while resolving a merge conflict.
///
/// Values (position, endpoints, segment lists, tags) come from the chosen version; the local
/// selection flag is kept. Segments dropped from a resolved track become pending, and resolved
/// tracks may claim segments currently owned by one another.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveConflictCommand {
    resolutions: Vec<Resolution>,
    affected: Affected,
    saved: Option<Snapshot>,
}

impl ResolveConflictCommand {
    pub fn new(resolutions: Vec<Resolution>) -> Self {
        let mut affected = AffectedBuilder::default();
        for resolution in &resolutions {
            affected.record_modified(resolution.target);
        }
        Self {
            resolutions,
            affected: affected.finish(),
            saved: None,
        }
    }

    pub fn resolutions(&self) -> &[Resolution] {
        &self.resolutions
    }

    pub fn is_executed(&self) -> bool {
        self.saved.is_some()
    }

    fn validate(&self, store: &GraphStore) -> Result<(), GraphError> {
        let mut claimed: BTreeMap<SegmentId, TrackId> = BTreeMap::new();
        let mut seen = BTreeSet::new();
        // Tracks released together in `apply`; they may take each other's segments.
        let resolved: BTreeSet<TrackId> = self
            .resolutions
            .iter()
            .filter_map(|r| match (r.target, &r.chosen) {
                (PrimitiveRef::Track(id), Primitive::Track(_)) => Some(id),
                _ => None,
            })
            .collect();
        for resolution in &self.resolutions {
            let target = resolution.target;
            if !seen.insert(target) {
                return Err(GraphError::AlreadyExists(target));
            }
            if !store.contains(target) {
                return Err(not_found(target));
            }
            if target.kind() != resolution.chosen.kind() {
                return Err(GraphError::KindMismatch {
                    target,
                    expected: resolution.chosen.kind(),
                });
            }
            match (&resolution.chosen, target) {
                (Primitive::Segment(segment), _) => {
                    for end in [segment.start(), segment.end()] {
                        store.point(end).ok_or(GraphError::UnknownPoint(end))?;
                    }
                    if segment.is_degenerate() {
                        return Err(GraphError::DegenerateSegment(segment.start()));
                    }
                }
                (Primitive::Track(track), PrimitiveRef::Track(track_id)) => {
                    for segment in track.segments() {
                        store
                            .segment(*segment)
                            .ok_or(GraphError::UnknownSegment(*segment))?;
                        if let Some(owner) = store.track_of(*segment) {
                            if !resolved.contains(&owner) {
                                return Err(GraphError::SegmentOwned {
                                    segment: *segment,
                                    track: owner,
                                });
                            }
                        }
                        if let Some(other) = claimed.insert(*segment, track_id) {
                            return Err(GraphError::SegmentOwned {
                                segment: *segment,
                                track: other,
                            });
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl SnapshotCommand for ResolveConflictCommand {
    fn name(&self) -> &'static str {
        "resolve conflicts"
    }

    fn touched(&self, store: &GraphStore) -> Result<BTreeSet<PrimitiveRef>, CommandError> {
        self.validate(store)?;
        let mut touched: BTreeSet<PrimitiveRef> = self.affected.all().collect();
        for resolution in &self.resolutions {
            if let (Primitive::Track(chosen), PrimitiveRef::Track(id)) =
                (&resolution.chosen, resolution.target)
            {
                touched.extend(chosen.segments().iter().copied().map(PrimitiveRef::Segment));
                if let Some(current) = store.track(id) {
                    touched.extend(current.segments().iter().copied().map(PrimitiveRef::Segment));
                }
            }
        }
        Ok(touched)
    }

    fn apply(&self, store: &mut GraphStore) -> Result<(), CommandError> {
        let projection = store.projection();
        // Release first so resolved tracks can trade segments with each other.
        for resolution in &self.resolutions {
            if let PrimitiveRef::Track(id) = resolution.target {
                store.set_track_segments(id, Vec::new())?;
            }
        }
        let mut repointed = Vec::new();
        for resolution in &self.resolutions {
            match (&resolution.chosen, resolution.target) {
                (Primitive::Point(chosen), PrimitiveRef::Point(id)) => {
                    let point = store.point_mut(id)?;
                    let lat_lon = chosen.lat_lon();
                    point.set_position(lat_lon, projection.lat_lon_to_east_north(lat_lon));
                    point.base_mut().set_tags(chosen.tags().clone());
                }
                (Primitive::Segment(chosen), PrimitiveRef::Segment(id)) => {
                    store.set_segment_ends(id, chosen.start(), chosen.end())?;
                    let segment = store.segment_mut(id)?;
                    segment.set_incomplete(chosen.is_incomplete());
                    segment.base_mut().set_tags(chosen.tags().clone());
                    repointed.push(id);
                }
                (Primitive::Track(_), PrimitiveRef::Track(_)) => {}
                (_, target) => {
                    return Err(GraphError::KindMismatch {
                        target,
                        expected: resolution.chosen.kind(),
                    }
                    .into())
                }
            }
        }
        for resolution in &self.resolutions {
            if let (Primitive::Track(chosen), PrimitiveRef::Track(id)) =
                (&resolution.chosen, resolution.target)
            {
                store.set_track_segments(id, chosen.segments().to_vec())?;
                store.track_mut(id)?.base_mut().set_tags(chosen.tags().clone());
            }
        }
        // Re-pointed segments may break the chain of a track that was not resolved itself.
        for segment in repointed {
            if let Some(owner) = store.track_of(segment) {
                let segments = store
                    .track(owner)
                    .ok_or(GraphError::UnknownTrack(owner))?
                    .segments()
                    .to_vec();
                store.check_chain(&segments)?;
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
