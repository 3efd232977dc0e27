// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Greedy chaining of an unordered bag of segments.

use std::collections::{BTreeSet, VecDeque};

use serde::Serialize;
use tracing::{info, warn};

use crate::command::{AddCommand, Command, CommandError, DeleteCommand, SequenceCommand};
use crate::graph::{GraphError, GraphStore};
use crate::model::{HasBase, PrimitiveRef, SegmentId, TagMap, TrackId};

use super::{AbortReason, EditAbort, EditAction};

/// Result of [`order_segments`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SegmentOrder {
    /// Each chain is continuous (`end == next.start`); chains appear in discovery order.
    pub chains: Vec<Vec<SegmentId>>,
    /// Incomplete or unknown segments that were left out.
    pub skipped: Vec<SegmentId>,
}

impl SegmentOrder {
    pub fn flatten(&self) -> Vec<SegmentId> {
        self.chains.iter().flatten().copied().collect()
    }

    pub fn is_single_chain(&self) -> bool {
        self.chains.len() == 1
    }
}

/// Orders `segments` into chains.
///
/// The first remaining segment seeds a chain, which then grows at its tail (a segment starting
/// where the chain ends) or head (a segment ending where the chain starts), always taking the
/// first match in input order. Duplicates are ignored.
pub fn order_segments(store: &GraphStore, segments: &[SegmentId]) -> SegmentOrder {
    let mut seen = BTreeSet::new();
    let mut order = SegmentOrder::default();
    let mut remaining: Vec<SegmentId> = Vec::with_capacity(segments.len());
    for id in segments.iter().copied().filter(|id| seen.insert(*id)) {
        match store.segment(id) {
            Some(segment) if !segment.is_incomplete() => remaining.push(id),
            _ => order.skipped.push(id),
        }
    }

    // Every id in `remaining` was looked up above.
    let ends = |id: SegmentId| {
        store
            .segment(id)
            .map(|s| (s.start(), s.end()))
            .expect("segment resolved while filtering")
    };

    while !remaining.is_empty() {
        let seed = remaining.remove(0);
        let mut chain = VecDeque::from([seed]);
        let (mut head, mut tail) = ends(seed);
        loop {
            let next = remaining.iter().position(|id| {
                let (start, end) = ends(*id);
                start == tail || end == head
            });
            let Some(idx) = next else { break };
            let id = remaining.remove(idx);
            let (start, end) = ends(id);
            if start == tail {
                chain.push_back(id);
                tail = end;
            } else {
                chain.push_front(id);
                head = start;
            }
        }
        order.chains.push(chain.into_iter().collect());
    }
    order
}

fn abort(kind: AbortReason) -> EditAbort {
    EditAbort::new(EditAction::BuildTrack, kind)
}

/// Plans a new track from a bag of segments.
///
/// Bag segments must be pending or make up whole existing tracks; those tracks are deleted and
/// their tags strictly merged into `tags`. Returns the new track's handle together with a sequence
/// command that deletes the consumed tracks and adds the new one.
pub fn build_track(
    store: &mut GraphStore,
    segments: &[SegmentId],
    tags: TagMap,
) -> Result<(TrackId, Command), CommandError> {
    let bag: BTreeSet<SegmentId> = segments.iter().copied().collect();
    let mut consumed: BTreeSet<TrackId> = BTreeSet::new();
    for id in &bag {
        let segment = store.segment(*id).ok_or(GraphError::UnknownSegment(*id))?;
        if segment.is_incomplete() {
            return Err(refuse(abort(AbortReason::IncompleteSegment).on(*id)));
        }
        if let Some(owner) = store.track_of(*id) {
            consumed.insert(owner);
        }
    }
    for owner in &consumed {
        let track = store.track(*owner).ok_or(GraphError::UnknownTrack(*owner))?;
        if let Some(outside) = track.segments().iter().find(|s| !bag.contains(*s)) {
            return Err(refuse(abort(AbortReason::PartialTrack).on(*outside)));
        }
    }

    let order = order_segments(store, segments);
    if !order.is_single_chain() {
        return Err(refuse(abort(AbortReason::NotSingleChain)));
    }

    let mut merged = tags;
    for owner in &consumed {
        let track = store.track(*owner).ok_or(GraphError::UnknownTrack(*owner))?;
        merged = merged
            .merge_strict(track.tags())
            .map_err(|_| refuse(abort(AbortReason::DifferentProperties).on(*owner)))?;
    }

    let mut steps: Vec<Command> = Vec::with_capacity(2);
    if !consumed.is_empty() {
        steps.push(DeleteCommand::new(consumed.iter().copied().map(PrimitiveRef::Track)).into());
    }
    let (track, add) = AddCommand::track(store, order.flatten(), merged);
    steps.push(add.into());
    info!(
        track = %track,
        segments = bag.len(),
        consumed = consumed.len(),
        "planned build track"
    );
    Ok((track, SequenceCommand::new("build track", steps).into()))
}

fn refuse(abort: EditAbort) -> CommandError {
    warn!(reason = abort.reason(), "build track aborted");
    CommandError::Abort(abort)
}
