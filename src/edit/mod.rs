// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Structural edit planners.
//!
//! Each planner inspects the store, validates the whole edit up front and returns a ready
//! [`Command`](crate::command::Command) (or `None` when there is nothing to do). Nothing here
//! mutates the store except for handle allocation; callers execute the returned command. A refused
//! edit is reported as [`EditAbort`], wrapped in
//! [`CommandError::Abort`](crate::command::CommandError).

pub mod chain;
mod combine;
mod delete;
mod split;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::PrimitiveRef;

pub use chain::{build_track, order_segments, SegmentOrder};
pub use combine::combine;
pub use delete::delete;
pub use split::{reverse_track, split_track};

/// The edit a user attempted; used as the prefix of an abort message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditAction {
    Delete,
    Combine,
    BuildTrack,
    SplitTrack,
}

impl fmt::Display for EditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Delete => "delete",
            Self::Combine => "combine",
            Self::BuildTrack => "build track",
            Self::SplitTrack => "split track",
        })
    }
}

/// Why an edit was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    PendingSegment,
    TooManySegments,
    SegmentsPointTogether,
    DifferentProperties,
    TooManyTracks,
    UsedByTrack,
    DegenerateSegment,
    UnsupportedKinds,
    SegmentNotConnected,
    TracksNotConnected,
    PartialTrack,
    IncompleteSegment,
    NotSingleChain,
    PointNotInside,
}

impl AbortReason {
    pub fn phrase(self) -> &'static str {
        match self {
            Self::PendingSegment => "used by a line segment not part of any track",
            Self::TooManySegments => "used by more than two segments",
            Self::SegmentsPointTogether => "segments point together",
            Self::DifferentProperties => "different properties",
            Self::TooManyTracks => "used by more than two tracks",
            Self::UsedByTrack => "used by a track",
            Self::DegenerateSegment => "would create a degenerate segment",
            Self::UnsupportedKinds => "can only combine a segment with a track or two tracks",
            Self::SegmentNotConnected => "segment does not connect to the track",
            Self::TracksNotConnected => "tracks are not connected",
            Self::PartialTrack => "segment belongs to a track that is not fully selected",
            Self::IncompleteSegment => "incomplete segment",
            Self::NotSingleChain => "segments do not form a single chain",
            Self::PointNotInside => "point is not inside the track",
        }
    }
}

/// A user-facing refusal. The store is untouched when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "cannot {action}{}: {}",
    .target.as_ref().map(|t| format!(" {t}")).unwrap_or_default(),
    .kind.phrase()
)]
pub struct EditAbort {
    action: EditAction,
    kind: AbortReason,
    target: Option<PrimitiveRef>,
}

impl EditAbort {
    pub fn new(action: EditAction, kind: AbortReason) -> Self {
        Self {
            action,
            kind,
            target: None,
        }
    }

    pub fn on(mut self, target: impl Into<PrimitiveRef>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn action(&self) -> EditAction {
        self.action
    }

    pub fn kind(&self) -> AbortReason {
        self.kind
    }

    pub fn target(&self) -> Option<PrimitiveRef> {
        self.target
    }

    /// The bare reason phrase shown to the user.
    pub fn reason(&self) -> &'static str {
        self.kind.phrase()
    }
}

/// How a delete treats primitives that still reference the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteMode {
    /// Remove everything that references the target, then orphaned points.
    #[default]
    Cascade,
    /// Remove a single point and reconnect the tracks through it.
    Combine,
}

/// What happens when two tracks being combined disagree on a tag value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagPolicy {
    /// Refuse the combine ("different properties").
    #[default]
    Strict,
    /// Keep the surviving track's value.
    DestinationWins,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {what} '{value}'")]
pub struct ParseModeError {
    what: &'static str,
    value: String,
}

impl FromStr for DeleteMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cascade" => Ok(Self::Cascade),
            "combine" => Ok(Self::Combine),
            other => Err(ParseModeError {
                what: "delete mode",
                value: other.to_owned(),
            }),
        }
    }
}

impl FromStr for TagPolicy {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "strict" => Ok(Self::Strict),
            "destination_wins" => Ok(Self::DestinationWins),
            other => Err(ParseModeError {
                what: "tag policy",
                value: other.to_owned(),
            }),
        }
    }
}
