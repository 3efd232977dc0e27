// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::Serialize;

use super::geo::{EastNorth, LatLon, Projection};
use super::ids::{PointId, SegmentId};
use super::tags::TagMap;

/// State shared by every primitive kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Base {
    tags: TagMap,
    selected: bool,
    modified: bool,
}

impl Base {
    pub fn with_tags(tags: TagMap) -> Self {
        Self {
            tags,
            ..Self::default()
        }
    }

    pub fn tags(&self) -> &TagMap {
        &self.tags
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub(crate) fn tags_mut(&mut self) -> &mut TagMap {
        &mut self.tags
    }

    pub(crate) fn set_tags(&mut self, tags: TagMap) {
        self.tags = tags;
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub(crate) fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }
}

/// Read access to the shared [`Base`] of a primitive.
pub trait HasBase {
    fn base(&self) -> &Base;
    fn base_mut(&mut self) -> &mut Base;

    fn tags(&self) -> &TagMap {
        self.base().tags()
    }

    fn is_selected(&self) -> bool {
        self.base().is_selected()
    }

    fn is_modified(&self) -> bool {
        self.base().is_modified()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    lat_lon: LatLon,
    east_north: EastNorth,
    #[serde(flatten)]
    base: Base,
}

impl Point {
    pub fn new(lat_lon: LatLon, projection: Projection) -> Self {
        Self {
            lat_lon,
            east_north: projection.lat_lon_to_east_north(lat_lon),
            base: Base::default(),
        }
    }

    pub fn with_tags(lat_lon: LatLon, projection: Projection, tags: TagMap) -> Self {
        Self {
            base: Base::with_tags(tags),
            ..Self::new(lat_lon, projection)
        }
    }

    pub fn lat_lon(&self) -> LatLon {
        self.lat_lon
    }

    pub fn east_north(&self) -> EastNorth {
        self.east_north
    }

    /// Moves the point in projected space and derives the new lat/lon.
    pub(crate) fn set_east_north(&mut self, east_north: EastNorth, projection: Projection) {
        self.east_north = east_north;
        self.lat_lon = projection.east_north_to_lat_lon(east_north);
    }

    /// Restores both coordinates verbatim (no projection round-trip).
    pub(crate) fn set_position(&mut self, lat_lon: LatLon, east_north: EastNorth) {
        self.lat_lon = lat_lon;
        self.east_north = east_north;
    }

    pub(crate) fn reproject(&mut self, projection: Projection) {
        self.east_north = projection.lat_lon_to_east_north(self.lat_lon);
    }
}

impl HasBase for Point {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }
}

/// A directed edge between two points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    start: PointId,
    end: PointId,
    /// Placeholder whose geometry is not fully known yet.
    incomplete: bool,
    #[serde(flatten)]
    base: Base,
}

impl Segment {
    pub fn new(start: PointId, end: PointId) -> Self {
        Self {
            start,
            end,
            incomplete: false,
            base: Base::default(),
        }
    }

    pub fn with_tags(start: PointId, end: PointId, tags: TagMap) -> Self {
        Self {
            base: Base::with_tags(tags),
            ..Self::new(start, end)
        }
    }

    pub fn incomplete(start: PointId, end: PointId) -> Self {
        Self {
            incomplete: true,
            ..Self::new(start, end)
        }
    }

    pub fn start(&self) -> PointId {
        self.start
    }

    pub fn end(&self) -> PointId {
        self.end
    }

    pub fn is_incomplete(&self) -> bool {
        self.incomplete
    }

    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    pub fn touches(&self, point: PointId) -> bool {
        self.start == point || self.end == point
    }

    pub(crate) fn set_start(&mut self, start: PointId) {
        self.start = start;
    }

    pub(crate) fn set_end(&mut self, end: PointId) {
        self.end = end;
    }

    pub(crate) fn set_incomplete(&mut self, incomplete: bool) {
        self.incomplete = incomplete;
    }

    pub(crate) fn flip(&mut self) {
        std::mem::swap(&mut self.start, &mut self.end);
    }
}

impl HasBase for Segment {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }
}

/// An ordered, chain-continuous run of segments.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Track {
    segments: Vec<SegmentId>,
    #[serde(flatten)]
    base: Base,
}

impl Track {
    pub fn new(segments: Vec<SegmentId>) -> Self {
        Self {
            segments,
            base: Base::default(),
        }
    }

    pub fn with_tags(segments: Vec<SegmentId>, tags: TagMap) -> Self {
        Self {
            segments,
            base: Base::with_tags(tags),
        }
    }

    pub fn segments(&self) -> &[SegmentId] {
        &self.segments
    }

    pub fn first_segment(&self) -> Option<SegmentId> {
        self.segments.first().copied()
    }

    pub fn last_segment(&self) -> Option<SegmentId> {
        self.segments.last().copied()
    }

    pub fn contains(&self, segment: SegmentId) -> bool {
        self.segments.contains(&segment)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub(crate) fn segments_mut(&mut self) -> &mut Vec<SegmentId> {
        &mut self.segments
    }
}

impl HasBase for Track {
    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }
}

#[cfg(test)]
mod tests {
    use super::{HasBase, Point, Segment, Track};
    use crate::model::{LatLon, PointId, Projection, SegmentId, TagMap};

    #[test]
    fn point_derives_east_north_from_projection() {
        let point = Point::new(LatLon::new(10.0, 20.0), Projection::Epsg4326);
        assert_eq!(point.east_north().east, 20.0);
        assert_eq!(point.east_north().north, 10.0);
        assert!(!point.is_selected());
        assert!(!point.is_modified());
    }

    #[test]
    fn segment_flip_swaps_direction() {
        let a = PointId::from_raw(1);
        let b = PointId::from_raw(2);
        let mut segment = Segment::new(a, b);
        segment.flip();
        assert_eq!((segment.start(), segment.end()), (b, a));
        assert!(segment.touches(a));
        assert!(!segment.is_degenerate());
        assert!(Segment::new(a, a).is_degenerate());
    }

    #[test]
    fn track_reports_its_ends() {
        let tags: TagMap = [("highway", "path")].into_iter().collect();
        let track = Track::with_tags(vec![SegmentId::from_raw(4), SegmentId::from_raw(5)], tags);
        assert_eq!(track.first_segment(), Some(SegmentId::from_raw(4)));
        assert_eq!(track.last_segment(), Some(SegmentId::from_raw(5)));
        assert_eq!(track.tags().get("highway"), Some("path"));
        assert!(Track::default().first_segment().is_none());
    }
}
