// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{
    LatLon, Point, PointId, Projection, Segment, SegmentId, TagMap, Track, TrackId,
};

use super::{GraphError, GraphStore};

/// Assembles a baseline store from already-existing data (e.g. freshly downloaded).
///
/// Baseline primitives are not edits: they are not marked modified and there is nothing to undo.
/// The builder applies the same structural validation as commands do.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    store: GraphStore,
}

impl GraphBuilder {
    pub fn new(projection: Projection) -> Self {
        Self {
            store: GraphStore::new(projection),
        }
    }

    pub fn point(&mut self, lat: f64, lon: f64) -> PointId {
        self.tagged_point(lat, lon, TagMap::new())
    }

    pub fn tagged_point(&mut self, lat: f64, lon: f64, tags: TagMap) -> PointId {
        let id = self.store.allocate();
        let point = Point::with_tags(LatLon::new(lat, lon), self.store.projection(), tags);
        self.store.points.insert(id, point);
        id
    }

    /// Adds a pending segment.
    pub fn segment(&mut self, start: PointId, end: PointId) -> Result<SegmentId, GraphError> {
        self.insert_segment(Segment::new(start, end))
    }

    pub fn tagged_segment(
        &mut self,
        start: PointId,
        end: PointId,
        tags: TagMap,
    ) -> Result<SegmentId, GraphError> {
        self.insert_segment(Segment::with_tags(start, end, tags))
    }

    pub fn incomplete_segment(
        &mut self,
        start: PointId,
        end: PointId,
    ) -> Result<SegmentId, GraphError> {
        self.insert_segment(Segment::incomplete(start, end))
    }

    /// Adds a track owning `segments`, which must be pending and chain.
    pub fn track(&mut self, segments: Vec<SegmentId>, tags: TagMap) -> Result<TrackId, GraphError> {
        let id = self.store.allocate();
        self.store.add_track(id, Track::with_tags(segments, tags))?;
        Ok(id)
    }

    /// Convenience: one segment per consecutive point pair, grouped into a track.
    pub fn polyline(&mut self, points: &[PointId], tags: TagMap) -> Result<TrackId, GraphError> {
        let segments = points
            .windows(2)
            .map(|pair| self.segment(pair[0], pair[1]))
            .collect::<Result<Vec<_>, _>>()?;
        self.track(segments, tags)
    }

    pub fn build(self) -> GraphStore {
        self.store
    }

    fn insert_segment(&mut self, segment: Segment) -> Result<SegmentId, GraphError> {
        let id = self.store.allocate();
        self.store.add_pending_segment(id, segment)?;
        Ok(id)
    }
}
