// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Marker for the primitive kind a [`Handle`] points at.
pub trait HandleKind {
    /// Short prefix used by `Display` (e.g. `p` for points).
    const PREFIX: &'static str;
}

/// A stable arena handle into a [`GraphStore`](crate::graph::GraphStore).
///
/// Handles are allocated monotonically by the store and never reused, so a handle recorded by a
/// command stays valid across undo/redo even after the primitive was removed and re-inserted.
pub struct Handle<T> {
    raw: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub const fn from_raw(raw: u64) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    pub const fn raw(self) -> u64 {
        self.raw
    }
}

// Manual impls: derive would put bounds on `T`, which is only a marker.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for Handle<T> {}

impl<T> PartialOrd for Handle<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Handle<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T: HandleKind> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::PREFIX, self.raw)
    }
}

impl<T: HandleKind> fmt::Display for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::PREFIX, self.raw)
    }
}

impl<T> Serialize for Handle<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.raw)
    }
}

impl<'de, T> Deserialize<'de> for Handle<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(Self::from_raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PointTag {}
impl HandleKind for PointTag {
    const PREFIX: &'static str = "p";
}
pub type PointId = Handle<PointTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SegmentTag {}
impl HandleKind for SegmentTag {
    const PREFIX: &'static str = "s";
}
pub type SegmentId = Handle<SegmentTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrackTag {}
impl HandleKind for TrackTag {
    const PREFIX: &'static str = "t";
}
pub type TrackId = Handle<TrackTag>;

/// Monotonic handle allocator shared by all primitive kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HandleAllocator {
    next: u64,
}

impl Default for HandleAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl HandleAllocator {
    pub(crate) fn next<T>(&mut self) -> Handle<T> {
        let raw = self.next;
        self.next += 1;
        Handle::from_raw(raw)
    }
}
