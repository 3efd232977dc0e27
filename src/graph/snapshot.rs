// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use crate::model::{Point, PointId, PrimitiveRef, Segment, SegmentId, Track, TrackId};

use super::GraphStore;

/// Saved state of a set of primitives, including absence and pending membership.
///
/// Restoring writes every entry back verbatim: present entries overwrite (or re-insert) the
/// primitive, absent entries remove it. As long as the captured set covers everything a command
/// touched, the store is back to a consistent state afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Snapshot {
    points: Vec<(PointId, Option<Point>)>,
    segments: Vec<(SegmentId, Option<SavedSegment>)>,
    tracks: Vec<(TrackId, Option<Track>)>,
}

#[derive(Debug, Clone, PartialEq)]
struct SavedSegment {
    segment: Segment,
    pending: bool,
}

impl Snapshot {
    pub(super) fn capture(
        store: &GraphStore,
        targets: impl IntoIterator<Item = PrimitiveRef>,
    ) -> Self {
        let targets: BTreeSet<PrimitiveRef> = targets.into_iter().collect();
        let mut snapshot = Self::default();
        for target in targets {
            match target {
                PrimitiveRef::Point(id) => {
                    snapshot.points.push((id, store.points.get(&id).cloned()));
                }
                PrimitiveRef::Segment(id) => {
                    let saved = store.segments.get(&id).map(|segment| SavedSegment {
                        segment: segment.clone(),
                        pending: store.pending.contains(&id),
                    });
                    snapshot.segments.push((id, saved));
                }
                PrimitiveRef::Track(id) => {
                    snapshot.tracks.push((id, store.tracks.get(&id).cloned()));
                }
            }
        }
        snapshot
    }

    pub(super) fn restore_into(&self, store: &mut GraphStore) {
        for (id, saved) in &self.points {
            match saved {
                Some(point) => {
                    store.points.insert(*id, point.clone());
                }
                None => {
                    store.points.remove(id);
                }
            }
        }
        for (id, saved) in &self.segments {
            match saved {
                Some(saved) => {
                    store.segments.insert(*id, saved.segment.clone());
                    if saved.pending {
                        store.pending.insert(*id);
                    } else {
                        store.pending.remove(id);
                    }
                }
                None => {
                    store.segments.remove(id);
                    store.pending.remove(id);
                }
            }
        }
        for (id, saved) in &self.tracks {
            match saved {
                Some(track) => {
                    store.tracks.insert(*id, track.clone());
                }
                None => {
                    store.tracks.remove(id);
                }
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.points.len() + self.segments.len() + self.tracks.len()
    }
}
