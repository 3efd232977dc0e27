// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use crate::graph::{GraphStore, Snapshot};
use crate::model::{
    LatLon, Point, PointId, PrimitiveRef, Segment, SegmentId, TagMap, Track, TrackId,
};

use super::{Affected, AffectedBuilder, CommandError, SnapshotCommand};

#[derive(Debug, Clone, PartialEq)]
enum NewPrimitive {
    Point(PointId, Point),
    Segment(SegmentId, Segment),
    Track(TrackId, Track),
}

/// Creates one primitive. The handle is allocated when the command is built, so redoing it
/// recreates the same handle.
#[derive(Debug, Clone, PartialEq)]
pub struct AddCommand {
    new: NewPrimitive,
    affected: Affected,
    saved: Option<Snapshot>,
}

impl AddCommand {
    pub fn point(store: &mut GraphStore, lat_lon: LatLon, tags: TagMap) -> (PointId, Self) {
        let id = store.allocate();
        let point = Point::with_tags(lat_lon, store.projection(), tags);
        (id, Self::new(NewPrimitive::Point(id, point)))
    }

    /// A new pending segment.
    pub fn segment(
        store: &mut GraphStore,
        start: PointId,
        end: PointId,
        tags: TagMap,
    ) -> (SegmentId, Self) {
        let id = store.allocate();
        (
            id,
            Self::new(NewPrimitive::Segment(id, Segment::with_tags(start, end, tags))),
        )
    }

    /// A new track taking ownership of `segments`, which must be pending and chain.
    pub fn track(
        store: &mut GraphStore,
        segments: Vec<SegmentId>,
        tags: TagMap,
    ) -> (TrackId, Self) {
        let id = store.allocate();
        (
            id,
            Self::new(NewPrimitive::Track(id, Track::with_tags(segments, tags))),
        )
    }

    fn new(new: NewPrimitive) -> Self {
        let mut affected = AffectedBuilder::default();
        affected.record_added(new.target());
        Self {
            new,
            affected: affected.finish(),
            saved: None,
        }
    }

    pub fn target(&self) -> PrimitiveRef {
        self.new.target()
    }

    pub fn is_executed(&self) -> bool {
        self.saved.is_some()
    }
}

impl NewPrimitive {
    fn target(&self) -> PrimitiveRef {
        match self {
            Self::Point(id, _) => PrimitiveRef::Point(*id),
            Self::Segment(id, _) => PrimitiveRef::Segment(*id),
            Self::Track(id, _) => PrimitiveRef::Track(*id),
        }
    }
}

impl SnapshotCommand for AddCommand {
    fn name(&self) -> &'static str {
        match self.new {
            NewPrimitive::Point(..) => "add point",
            NewPrimitive::Segment(..) => "add segment",
            NewPrimitive::Track(..) => "add track",
        }
    }

    fn touched(&self, _store: &GraphStore) -> Result<BTreeSet<PrimitiveRef>, CommandError> {
        let mut touched = BTreeSet::from([self.new.target()]);
        if let NewPrimitive::Track(_, track) = &self.new {
            touched.extend(track.segments().iter().copied().map(PrimitiveRef::Segment));
        }
        Ok(touched)
    }

    fn apply(&self, store: &mut GraphStore) -> Result<(), CommandError> {
        match &self.new {
            NewPrimitive::Point(id, point) => store.add_point(*id, point.clone())?,
            NewPrimitive::Segment(id, segment) => store.add_pending_segment(*id, segment.clone())?,
            NewPrimitive::Track(id, track) => store.add_track(*id, track.clone())?,
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
