// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::Serialize;

use super::ids::{PointId, SegmentId, TrackId};
use super::primitives::{Base, HasBase, Point, Segment, Track};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Point,
    Segment,
    Track,
}

/// Kind-tagged handle of any primitive.
///
/// Orders points before segments before tracks, then by handle. Affected sets and selection
/// snapshots rely on this ordering to be deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum PrimitiveRef {
    Point(PointId),
    Segment(SegmentId),
    Track(TrackId),
}

impl PrimitiveRef {
    pub fn kind(self) -> PrimitiveKind {
        match self {
            Self::Point(_) => PrimitiveKind::Point,
            Self::Segment(_) => PrimitiveKind::Segment,
            Self::Track(_) => PrimitiveKind::Track,
        }
    }
}

impl fmt::Display for PrimitiveRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Point(id) => fmt::Display::fmt(id, f),
            Self::Segment(id) => fmt::Display::fmt(id, f),
            Self::Track(id) => fmt::Display::fmt(id, f),
        }
    }
}

impl From<PointId> for PrimitiveRef {
    fn from(id: PointId) -> Self {
        Self::Point(id)
    }
}

impl From<SegmentId> for PrimitiveRef {
    fn from(id: SegmentId) -> Self {
        Self::Segment(id)
    }
}

impl From<TrackId> for PrimitiveRef {
    fn from(id: TrackId) -> Self {
        Self::Track(id)
    }
}

/// An owned copy of one primitive's value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Primitive {
    Point(Point),
    Segment(Segment),
    Track(Track),
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Point(_) => PrimitiveKind::Point,
            Self::Segment(_) => PrimitiveKind::Segment,
            Self::Track(_) => PrimitiveKind::Track,
        }
    }

    pub fn base(&self) -> &Base {
        match self {
            Self::Point(point) => point.base(),
            Self::Segment(segment) => segment.base(),
            Self::Track(track) => track.base(),
        }
    }
}
