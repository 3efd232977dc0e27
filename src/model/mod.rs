// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Primitive entities and value types.
//!
//! Points, segments and tracks reference each other only through handles; the store owns the
//! values.

pub mod geo;
pub mod ids;
pub mod primitive_ref;
pub mod primitives;
pub mod tags;

pub use geo::{EastNorth, GeoBounds, LatLon, ParseProjectionError, ProjectedBounds, Projection};
pub(crate) use ids::HandleAllocator;
pub use ids::{Handle, HandleKind, PointId, SegmentId, TrackId};
pub use primitive_ref::{Primitive, PrimitiveKind, PrimitiveRef};
pub use primitives::{Base, HasBase, Point, Segment, Track};
pub use tags::{TagConflict, TagMap};
