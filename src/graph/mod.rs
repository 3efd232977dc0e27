// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The primitive graph store.
//!
//! Points, segments and tracks live in handle-keyed arenas. Every segment is either *pending*
//! (listed in the pending index) or owned by exactly one track. Back-references are answered by
//! scanning; nothing is cached, so there is no reverse index to keep in sync.
//!
//! Everything that changes the graph is `pub(crate)`: outside the crate the only way to mutate a
//! store is through a [`Command`](crate::command::Command) (or [`GraphBuilder`] for baseline data),
//! which keeps undo and affected-primitive bookkeeping complete. Selection flags are the exception;
//! they are UI state and have their own public surface.

mod builder;
mod snapshot;

use std::collections::{BTreeMap, BTreeSet};

use smallvec::SmallVec;

use crate::model::{
    EastNorth, GeoBounds, Handle, HandleAllocator, HasBase, LatLon, Point, PointId, Primitive,
    PrimitiveKind, PrimitiveRef, ProjectedBounds, Projection, Segment, SegmentId, Track, TrackId,
};

pub use builder::GraphBuilder;
pub(crate) use snapshot::Snapshot;

/// Contract/invariant violations raised by store operations.
///
/// These indicate a caller bug (wrong handle, wrong state) rather than a user-facing edit
/// refusal; see [`EditAbort`](crate::edit::EditAbort) for the latter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("point not found (id={0})")]
    UnknownPoint(PointId),
    #[error("segment not found (id={0})")]
    UnknownSegment(SegmentId),
    #[error("track not found (id={0})")]
    UnknownTrack(TrackId),
    #[error("primitive already exists (id={0})")]
    AlreadyExists(PrimitiveRef),
    #[error("point {point} is still used by {segments} segment(s)")]
    PointInUse { point: PointId, segments: usize },
    #[error("segment {0} is not pending")]
    NotPending(SegmentId),
    #[error("segment {segment} is already owned by track {track}")]
    SegmentOwned { segment: SegmentId, track: TrackId },
    #[error("segment {0} is listed twice")]
    DuplicateSegment(SegmentId),
    #[error("segment would start and end at point {0}")]
    DegenerateSegment(PointId),
    #[error("segments {before} and {after} do not chain")]
    BrokenChain { before: SegmentId, after: SegmentId },
    #[error("{target} is not a {expected:?}")]
    KindMismatch { target: PrimitiveRef, expected: PrimitiveKind },
    #[error("pending index out of sync for segment {0}")]
    PendingOutOfSync(SegmentId),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphStore {
    projection: Projection,
    points: BTreeMap<PointId, Point>,
    segments: BTreeMap<SegmentId, Segment>,
    pending: BTreeSet<SegmentId>,
    tracks: BTreeMap<TrackId, Track>,
    handles: HandleAllocator,
    selection_dirty: bool,
}

impl GraphStore {
    pub fn new(projection: Projection) -> Self {
        Self {
            projection,
            ..Self::default()
        }
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Switches projection and recomputes every point's projected coordinate.
    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
        for point in self.points.values_mut() {
            point.reproject(projection);
        }
    }

    pub fn point(&self, id: PointId) -> Option<&Point> {
        self.points.get(&id)
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(&id)
    }

    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.get(&id)
    }

    pub fn points(&self) -> impl Iterator<Item = (PointId, &Point)> {
        self.points.iter().map(|(id, p)| (*id, p))
    }

    /// All segments, pending and track-owned.
    pub fn segments(&self) -> impl Iterator<Item = (SegmentId, &Segment)> {
        self.segments.iter().map(|(id, s)| (*id, s))
    }

    pub fn pending_segments(&self) -> impl Iterator<Item = SegmentId> + '_ {
        self.pending.iter().copied()
    }

    pub fn tracks(&self) -> impl Iterator<Item = (TrackId, &Track)> {
        self.tracks.iter().map(|(id, t)| (*id, t))
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_pending(&self, segment: SegmentId) -> bool {
        self.pending.contains(&segment)
    }

    pub fn contains(&self, target: PrimitiveRef) -> bool {
        match target {
            PrimitiveRef::Point(id) => self.points.contains_key(&id),
            PrimitiveRef::Segment(id) => self.segments.contains_key(&id),
            PrimitiveRef::Track(id) => self.tracks.contains_key(&id),
        }
    }

    /// Owned copy of the primitive behind `target`.
    pub fn get(&self, target: PrimitiveRef) -> Option<Primitive> {
        match target {
            PrimitiveRef::Point(id) => self.points.get(&id).cloned().map(Primitive::Point),
            PrimitiveRef::Segment(id) => self.segments.get(&id).cloned().map(Primitive::Segment),
            PrimitiveRef::Track(id) => self.tracks.get(&id).cloned().map(Primitive::Track),
        }
    }

    /// Segments (pending or owned) that start or end at `point`.
    pub fn segments_referencing(&self, point: PointId) -> SmallVec<[SegmentId; 4]> {
        self.segments
            .iter()
            .filter(|(_, s)| s.touches(point))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Tracks owning at least one segment that touches `point`.
    pub fn tracks_referencing_point(&self, point: PointId) -> SmallVec<[TrackId; 2]> {
        self.tracks
            .iter()
            .filter(|(_, track)| {
                track
                    .segments()
                    .iter()
                    .any(|s| self.segments.get(s).is_some_and(|s| s.touches(point)))
            })
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn track_of(&self, segment: SegmentId) -> Option<TrackId> {
        self.tracks
            .iter()
            .find(|(_, track)| track.contains(segment))
            .map(|(id, _)| *id)
    }

    pub fn is_referenced(&self, point: PointId) -> bool {
        self.segments.values().any(|s| s.touches(point))
    }

    pub fn track_start(&self, track: TrackId) -> Option<PointId> {
        let first = self.tracks.get(&track)?.first_segment()?;
        self.segments.get(&first).map(Segment::start)
    }

    pub fn track_end(&self, track: TrackId) -> Option<PointId> {
        let last = self.tracks.get(&track)?.last_segment()?;
        self.segments.get(&last).map(Segment::end)
    }

    /// Point sequence visited by a track (start of the first segment, then every end).
    pub fn track_points(&self, track: TrackId) -> Result<Vec<PointId>, GraphError> {
        let owned = self.tracks.get(&track).ok_or(GraphError::UnknownTrack(track))?;
        let mut points = Vec::with_capacity(owned.len() + 1);
        for (idx, id) in owned.segments().iter().enumerate() {
            let segment = self.segments.get(id).ok_or(GraphError::UnknownSegment(*id))?;
            if idx == 0 {
                points.push(segment.start());
            }
            points.push(segment.end());
        }
        Ok(points)
    }

    /// Checks that `segments` exist, are distinct and chain end-to-start.
    pub fn check_chain(&self, segments: &[SegmentId]) -> Result<(), GraphError> {
        let mut seen = BTreeSet::new();
        let mut previous: Option<(SegmentId, &Segment)> = None;
        for id in segments {
            let segment = self.segments.get(id).ok_or(GraphError::UnknownSegment(*id))?;
            if !seen.insert(*id) {
                return Err(GraphError::DuplicateSegment(*id));
            }
            if let Some((prev_id, prev)) = previous {
                if prev.end() != segment.start() {
                    return Err(GraphError::BrokenChain {
                        before: prev_id,
                        after: *id,
                    });
                }
            }
            previous = Some((*id, segment));
        }
        Ok(())
    }

    /// Full structural self-check: partitioning, endpoint existence, chain continuity.
    pub fn check_invariants(&self) -> Result<(), GraphError> {
        let mut owner: BTreeMap<SegmentId, TrackId> = BTreeMap::new();
        for (track_id, track) in &self.tracks {
            self.check_chain(track.segments())?;
            for segment in track.segments() {
                if let Some(previous) = owner.insert(*segment, *track_id) {
                    return Err(GraphError::SegmentOwned {
                        segment: *segment,
                        track: previous,
                    });
                }
            }
        }
        for (id, segment) in &self.segments {
            for end in [segment.start(), segment.end()] {
                if !self.points.contains_key(&end) {
                    return Err(GraphError::UnknownPoint(end));
                }
            }
            if segment.is_degenerate() {
                return Err(GraphError::DegenerateSegment(segment.start()));
            }
            if owner.contains_key(id) == self.pending.contains(id) {
                return Err(GraphError::PendingOutOfSync(*id));
            }
        }
        if let Some(stray) = self.pending.iter().find(|id| !self.segments.contains_key(id)) {
            return Err(GraphError::PendingOutOfSync(*stray));
        }
        Ok(())
    }

    /// Bounding box in projected space; `None` if there are no points or any is NaN.
    pub fn bounds_projected(&self) -> Option<ProjectedBounds> {
        let mut iter = self.points.values().map(Point::east_north);
        let first = iter.next()?;
        if first.is_nan() {
            return None;
        }
        let mut bounds = ProjectedBounds {
            min: first,
            max: first,
        };
        for en in iter {
            if en.is_nan() {
                return None;
            }
            bounds.min = EastNorth::new(
                bounds.min.east.min(en.east),
                bounds.min.north.min(en.north),
            );
            bounds.max = EastNorth::new(
                bounds.max.east.max(en.east),
                bounds.max.north.max(en.north),
            );
        }
        Some(bounds)
    }

    /// Bounding box in lat/lon; `None` if there are no points or any is NaN.
    pub fn bounds_geographic(&self) -> Option<GeoBounds> {
        let mut iter = self.points.values().map(Point::lat_lon);
        let first = iter.next()?;
        if first.is_nan() {
            return None;
        }
        let mut bounds = GeoBounds {
            min: first,
            max: first,
        };
        for ll in iter {
            if ll.is_nan() {
                return None;
            }
            bounds.min = LatLon::new(bounds.min.lat.min(ll.lat), bounds.min.lon.min(ll.lon));
            bounds.max = LatLon::new(bounds.max.lat.max(ll.lat), bounds.max.lon.max(ll.lon));
        }
        Some(bounds)
    }

    // ---- selection -------------------------------------------------------------------------

    pub fn is_selected(&self, target: PrimitiveRef) -> bool {
        self.get_base(target).is_some_and(|b| b.is_selected())
    }

    pub fn selected(&self) -> BTreeSet<PrimitiveRef> {
        let points = self
            .points
            .iter()
            .filter(|(_, p)| p.is_selected())
            .map(|(id, _)| PrimitiveRef::Point(*id));
        let segments = self
            .segments
            .iter()
            .filter(|(_, s)| s.is_selected())
            .map(|(id, _)| PrimitiveRef::Segment(*id));
        let tracks = self
            .tracks
            .iter()
            .filter(|(_, t)| t.is_selected())
            .map(|(id, _)| PrimitiveRef::Track(*id));
        points.chain(segments).chain(tracks).collect()
    }

    pub fn set_selected(&mut self, target: PrimitiveRef, selected: bool) -> Result<(), GraphError> {
        let base = match target {
            PrimitiveRef::Point(id) => self
                .points
                .get_mut(&id)
                .map(HasBase::base_mut)
                .ok_or(GraphError::UnknownPoint(id))?,
            PrimitiveRef::Segment(id) => self
                .segments
                .get_mut(&id)
                .map(HasBase::base_mut)
                .ok_or(GraphError::UnknownSegment(id))?,
            PrimitiveRef::Track(id) => self
                .tracks
                .get_mut(&id)
                .map(HasBase::base_mut)
                .ok_or(GraphError::UnknownTrack(id))?,
        };
        if base.is_selected() != selected {
            base.set_selected(selected);
            self.selection_dirty = true;
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        for target in self.selected() {
            // Refs come from `selected()`, so they exist.
            let _ = self.set_selected(target, false);
        }
    }

    /// Replaces the selection with `targets`; unknown handles are rejected before anything changes.
    pub fn select_only(
        &mut self,
        targets: impl IntoIterator<Item = PrimitiveRef>,
    ) -> Result<(), GraphError> {
        let targets: BTreeSet<PrimitiveRef> = targets.into_iter().collect();
        if let Some(missing) = targets.iter().find(|t| !self.contains(**t)) {
            return Err(not_found(*missing));
        }
        for current in self.selected() {
            if !targets.contains(&current) {
                let _ = self.set_selected(current, false);
            }
        }
        for target in targets {
            let _ = self.set_selected(target, true);
        }
        Ok(())
    }

    pub(crate) fn take_selection_dirty(&mut self) -> bool {
        std::mem::take(&mut self.selection_dirty)
    }

    fn get_base(&self, target: PrimitiveRef) -> Option<&crate::model::Base> {
        match target {
            PrimitiveRef::Point(id) => self.points.get(&id).map(HasBase::base),
            PrimitiveRef::Segment(id) => self.segments.get(&id).map(HasBase::base),
            PrimitiveRef::Track(id) => self.tracks.get(&id).map(HasBase::base),
        }
    }

    // ---- crate-private mutation ------------------------------------------------------------

    pub(crate) fn allocate<T>(&mut self) -> Handle<T> {
        self.handles.next()
    }

    pub(crate) fn point_mut(&mut self, id: PointId) -> Result<&mut Point, GraphError> {
        self.points.get_mut(&id).ok_or(GraphError::UnknownPoint(id))
    }

    pub(crate) fn segment_mut(&mut self, id: SegmentId) -> Result<&mut Segment, GraphError> {
        self.segments.get_mut(&id).ok_or(GraphError::UnknownSegment(id))
    }

    pub(crate) fn track_mut(&mut self, id: TrackId) -> Result<&mut Track, GraphError> {
        self.tracks.get_mut(&id).ok_or(GraphError::UnknownTrack(id))
    }

    pub(crate) fn base_mut(
        &mut self,
        target: PrimitiveRef,
    ) -> Result<&mut crate::model::Base, GraphError> {
        match target {
            PrimitiveRef::Point(id) => self.point_mut(id).map(HasBase::base_mut),
            PrimitiveRef::Segment(id) => self.segment_mut(id).map(HasBase::base_mut),
            PrimitiveRef::Track(id) => self.track_mut(id).map(HasBase::base_mut),
        }
    }

    pub(crate) fn mark_modified(&mut self, targets: impl IntoIterator<Item = PrimitiveRef>) {
        for target in targets {
            if let Ok(base) = self.base_mut(target) {
                base.set_modified(true);
            }
        }
    }

    pub(crate) fn add_point(&mut self, id: PointId, point: Point) -> Result<(), GraphError> {
        if self.points.contains_key(&id) {
            return Err(GraphError::AlreadyExists(id.into()));
        }
        self.points.insert(id, point);
        Ok(())
    }

    /// Removes an unreferenced point.
    pub(crate) fn remove_point(&mut self, id: PointId) -> Result<Point, GraphError> {
        let users = self.segments_referencing(id).len();
        if users > 0 {
            return Err(GraphError::PointInUse {
                point: id,
                segments: users,
            });
        }
        let point = self.points.remove(&id).ok_or(GraphError::UnknownPoint(id))?;
        if point.is_selected() {
            self.selection_dirty = true;
        }
        Ok(point)
    }

    pub(crate) fn add_pending_segment(
        &mut self,
        id: SegmentId,
        segment: Segment,
    ) -> Result<(), GraphError> {
        if self.segments.contains_key(&id) {
            return Err(GraphError::AlreadyExists(id.into()));
        }
        self.validate_endpoints(&segment)?;
        self.segments.insert(id, segment);
        self.pending.insert(id);
        Ok(())
    }

    pub(crate) fn destroy_pending_segment(&mut self, id: SegmentId) -> Result<Segment, GraphError> {
        if !self.segments.contains_key(&id) {
            return Err(GraphError::UnknownSegment(id));
        }
        if !self.pending.remove(&id) {
            return Err(GraphError::NotPending(id));
        }
        let segment = self.segments.remove(&id).ok_or(GraphError::UnknownSegment(id))?;
        if segment.is_selected() {
            self.selection_dirty = true;
        }
        Ok(segment)
    }

    /// Inserts a track whose segments are all pending and form a chain.
    pub(crate) fn add_track(&mut self, id: TrackId, track: Track) -> Result<(), GraphError> {
        if self.tracks.contains_key(&id) {
            return Err(GraphError::AlreadyExists(id.into()));
        }
        self.check_chain(track.segments())?;
        for segment in track.segments() {
            self.require_pending(*segment)?;
        }
        for segment in track.segments() {
            self.pending.remove(segment);
        }
        self.tracks.insert(id, track);
        Ok(())
    }

    /// Removes a track; its segments go back to pending.
    pub(crate) fn remove_track(&mut self, id: TrackId) -> Result<Track, GraphError> {
        let track = self.tracks.remove(&id).ok_or(GraphError::UnknownTrack(id))?;
        self.pending.extend(track.segments().iter().copied());
        if track.is_selected() {
            self.selection_dirty = true;
        }
        Ok(track)
    }

    /// Moves a pending segment onto the start (`at_end == false`) or end of a track.
    pub(crate) fn assign_pending_segment(
        &mut self,
        segment: SegmentId,
        track: TrackId,
        at_end: bool,
    ) -> Result<(), GraphError> {
        self.require_pending(segment)?;
        let owned = self.tracks.get(&track).ok_or(GraphError::UnknownTrack(track))?;

        let mut candidate: Vec<SegmentId> = owned.segments().to_vec();
        if at_end {
            candidate.push(segment);
        } else {
            candidate.insert(0, segment);
        }
        self.check_chain(&candidate)?;

        self.pending.remove(&segment);
        *self.track_mut(track)?.segments_mut() = candidate;
        Ok(())
    }

    /// Replaces a track's segment list. Segments dropped from the list become pending; newly
    /// listed segments must be pending beforehand.
    pub(crate) fn set_track_segments(
        &mut self,
        track: TrackId,
        segments: Vec<SegmentId>,
    ) -> Result<(), GraphError> {
        let current = self.tracks.get(&track).ok_or(GraphError::UnknownTrack(track))?;
        self.check_chain(&segments)?;
        for segment in &segments {
            if !current.contains(*segment) {
                self.require_pending(*segment)?;
            }
        }
        let released: Vec<SegmentId> = current
            .segments()
            .iter()
            .copied()
            .filter(|s| !segments.contains(s))
            .collect();
        for segment in &segments {
            self.pending.remove(segment);
        }
        self.pending.extend(released);
        *self.track_mut(track)?.segments_mut() = segments;
        Ok(())
    }

    /// Re-points a segment. Only endpoint existence and non-degeneracy are checked here; the
    /// caller re-establishes chain continuity of the owning track.
    pub(crate) fn set_segment_ends(
        &mut self,
        id: SegmentId,
        start: PointId,
        end: PointId,
    ) -> Result<(), GraphError> {
        let mut updated = self.segments.get(&id).cloned().ok_or(GraphError::UnknownSegment(id))?;
        updated.set_start(start);
        updated.set_end(end);
        self.validate_endpoints(&updated)?;
        self.segments.insert(id, updated);
        Ok(())
    }

    pub(crate) fn capture(&self, targets: impl IntoIterator<Item = PrimitiveRef>) -> Snapshot {
        Snapshot::capture(self, targets)
    }

    pub(crate) fn restore(&mut self, snapshot: &Snapshot) {
        snapshot.restore_into(self);
        self.selection_dirty = true;
        debug_assert_eq!(self.check_invariants(), Ok(()));
    }

    fn require_pending(&self, segment: SegmentId) -> Result<(), GraphError> {
        if !self.segments.contains_key(&segment) {
            return Err(GraphError::UnknownSegment(segment));
        }
        if self.pending.contains(&segment) {
            return Ok(());
        }
        match self.track_of(segment) {
            Some(track) => Err(GraphError::SegmentOwned { segment, track }),
            None => Err(GraphError::NotPending(segment)),
        }
    }

    fn validate_endpoints(&self, segment: &Segment) -> Result<(), GraphError> {
        for end in [segment.start(), segment.end()] {
            if !self.points.contains_key(&end) {
                return Err(GraphError::UnknownPoint(end));
            }
        }
        if segment.is_degenerate() {
            return Err(GraphError::DegenerateSegment(segment.start()));
        }
        Ok(())
    }
}

pub(crate) fn not_found(target: PrimitiveRef) -> GraphError {
    match target {
        PrimitiveRef::Point(id) => GraphError::UnknownPoint(id),
        PrimitiveRef::Segment(id) => GraphError::UnknownSegment(id),
        PrimitiveRef::Track(id) => GraphError::UnknownTrack(id),
    }
}

#[cfg(test)]
mod tests;
