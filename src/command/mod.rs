// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Undoable units of change.
//!
//! A [`Command`] is built against the current store, then executed and undone against it. Most
//! variants use the generic strategy: before mutating they capture a [`Snapshot`] of every
//! primitive they touch, and undo writes that snapshot back. If a mutation step fails partway
//! through, the snapshot is restored before the error is returned, so a failed execute leaves the
//! store unchanged. [`MoveCommand`] and [`RotateCommand`] instead keep the numeric transform and
//! the original positions, which lets a drag be folded into one command.

mod add;
mod combine;
mod conflict;
mod delete;
mod reshape;
mod sequence;
mod tags;
mod transform;

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::edit::EditAbort;
use crate::graph::{GraphError, GraphStore, Snapshot};
use crate::model::PrimitiveRef;

pub use add::AddCommand;
pub use combine::{CombineAndDeleteCommand, CombineCommand, Splice, TrackJoin};
pub use conflict::{Resolution, ResolveConflictCommand};
pub use delete::DeleteCommand;
pub use reshape::{ReverseTrackCommand, SplitTrackCommand};
pub use sequence::SequenceCommand;
pub use tags::ChangeTagsCommand;
pub use transform::{MoveCommand, RotateCommand};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("command '{0}' has not been executed")]
    NotExecuted(&'static str),
    #[error("command '{0}' has already been executed")]
    AlreadyExecuted(&'static str),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Abort(#[from] EditAbort),
    #[error("step {index} of '{name}' failed: {source}")]
    SequenceStep {
        name: String,
        index: usize,
        source: Box<CommandError>,
    },
}

impl CommandError {
    /// The user-facing abort behind this error, looking through sequence steps.
    pub fn abort(&self) -> Option<&EditAbort> {
        match self {
            Self::Abort(abort) => Some(abort),
            Self::SequenceStep { source, .. } => source.abort(),
            _ => None,
        }
    }
}

/// Primitives a command creates, changes or removes; the three sets are disjoint.
///
/// Consumed by upload/merge accounting outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Affected {
    pub modified: BTreeSet<PrimitiveRef>,
    pub deleted: BTreeSet<PrimitiveRef>,
    pub added: BTreeSet<PrimitiveRef>,
}

impl Affected {
    pub fn is_empty(&self) -> bool {
        self.modified.is_empty() && self.deleted.is_empty() && self.added.is_empty()
    }

    /// Everything named in any of the three sets.
    pub fn all(&self) -> impl Iterator<Item = PrimitiveRef> + '_ {
        self.modified
            .iter()
            .chain(&self.deleted)
            .chain(&self.added)
            .copied()
    }
}

#[derive(Debug, Default)]
pub(crate) struct AffectedBuilder {
    affected: Affected,
}

impl AffectedBuilder {
    pub(crate) fn record_added(&mut self, target: PrimitiveRef) {
        if self.affected.deleted.remove(&target) {
            self.affected.modified.insert(target);
            return;
        }
        self.affected.modified.remove(&target);
        self.affected.added.insert(target);
    }

    pub(crate) fn record_deleted(&mut self, target: PrimitiveRef) {
        // Created and removed within the same unit: nothing left to report.
        if self.affected.added.remove(&target) {
            return;
        }
        self.affected.modified.remove(&target);
        self.affected.deleted.insert(target);
    }

    pub(crate) fn record_modified(&mut self, target: PrimitiveRef) {
        if self.affected.added.contains(&target) || self.affected.deleted.contains(&target) {
            return;
        }
        self.affected.modified.insert(target);
    }

    /// Folds a later command's accounting into this one.
    pub(crate) fn extend(&mut self, later: &Affected) {
        for target in &later.added {
            self.record_added(*target);
        }
        for target in &later.modified {
            self.record_modified(*target);
        }
        for target in &later.deleted {
            self.record_deleted(*target);
        }
    }

    pub(crate) fn finish(self) -> Affected {
        self.affected
    }
}

/// Generic snapshot-based execute/undo, shared by every variant that does not keep a delta.
pub(crate) trait SnapshotCommand {
    fn name(&self) -> &'static str;

    /// Checks the command against the current store and returns every primitive it will touch
    /// (a superset of [`affected`](Self::affected), including released or re-owned segments).
    fn touched(&self, store: &GraphStore) -> Result<BTreeSet<PrimitiveRef>, CommandError>;

    fn apply(&self, store: &mut GraphStore) -> Result<(), CommandError>;

    fn affected(&self) -> &Affected;

    fn saved(&mut self) -> &mut Option<Snapshot>;
}

pub(crate) fn execute_with_snapshot<C: SnapshotCommand>(
    command: &mut C,
    store: &mut GraphStore,
) -> Result<(), CommandError> {
    if command.saved().is_some() {
        return Err(CommandError::AlreadyExecuted(command.name()));
    }
    let touched = command.touched(store)?;
    let snapshot = store.capture(touched);
    if let Err(err) = command.apply(store) {
        warn!(command = command.name(), error = %err, "execute failed; restoring snapshot");
        store.restore(&snapshot);
        return Err(err);
    }
    let affected = command.affected();
    let survivors: Vec<PrimitiveRef> = affected
        .modified
        .iter()
        .chain(&affected.added)
        .copied()
        .collect();
    store.mark_modified(survivors);
    debug!(command = command.name(), captured = snapshot.len(), "executed");
    *command.saved() = Some(snapshot);
    Ok(())
}

pub(crate) fn undo_with_snapshot<C: SnapshotCommand>(
    command: &mut C,
    store: &mut GraphStore,
) -> Result<(), CommandError> {
    let name = command.name();
    let snapshot = command
        .saved()
        .take()
        .ok_or(CommandError::NotExecuted(name))?;
    store.restore(&snapshot);
    debug!(command = name, "undone");
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add(AddCommand),
    Delete(DeleteCommand),
    ChangeTags(ChangeTagsCommand),
    Move(MoveCommand),
    Rotate(RotateCommand),
    Sequence(SequenceCommand),
    Combine(CombineCommand),
    CombineAndDelete(CombineAndDeleteCommand),
    ResolveConflict(ResolveConflictCommand),
    SplitTrack(SplitTrackCommand),
    ReverseTrack(ReverseTrackCommand),
}

impl Command {
    pub fn resolve_conflict(resolutions: Vec<Resolution>) -> Self {
        Self::ResolveConflict(ResolveConflictCommand::new(resolutions))
    }

    /// Human-readable name for history menus and logs.
    pub fn name(&self) -> &str {
        match self {
            Self::Add(c) => c.name(),
            Self::Delete(c) => c.name(),
            Self::ChangeTags(c) => c.name(),
            Self::Move(_) => "move",
            Self::Rotate(_) => "rotate",
            Self::Sequence(c) => c.label(),
            Self::Combine(c) => c.name(),
            Self::CombineAndDelete(c) => c.name(),
            Self::ResolveConflict(c) => c.name(),
            Self::SplitTrack(c) => c.name(),
            Self::ReverseTrack(c) => c.name(),
        }
    }

    pub fn execute(&mut self, store: &mut GraphStore) -> Result<(), CommandError> {
        match self {
            Self::Add(c) => execute_with_snapshot(c, store),
            Self::Delete(c) => execute_with_snapshot(c, store),
            Self::ChangeTags(c) => execute_with_snapshot(c, store),
            Self::Move(c) => c.execute(store),
            Self::Rotate(c) => c.execute(store),
            Self::Sequence(c) => c.execute(store),
            Self::Combine(c) => execute_with_snapshot(c, store),
            Self::CombineAndDelete(c) => execute_with_snapshot(c, store),
            Self::ResolveConflict(c) => execute_with_snapshot(c, store),
            Self::SplitTrack(c) => execute_with_snapshot(c, store),
            Self::ReverseTrack(c) => execute_with_snapshot(c, store),
        }
    }

    /// Restores the state from before the matching [`execute`](Self::execute).
    ///
    /// Undoing a command that is not currently executed is a caller bug and fails with
    /// [`CommandError::NotExecuted`].
    pub fn undo(&mut self, store: &mut GraphStore) -> Result<(), CommandError> {
        match self {
            Self::Add(c) => undo_with_snapshot(c, store),
            Self::Delete(c) => undo_with_snapshot(c, store),
            Self::ChangeTags(c) => undo_with_snapshot(c, store),
            Self::Move(c) => c.undo(store),
            Self::Rotate(c) => c.undo(store),
            Self::Sequence(c) => c.undo(store),
            Self::Combine(c) => undo_with_snapshot(c, store),
            Self::CombineAndDelete(c) => undo_with_snapshot(c, store),
            Self::ResolveConflict(c) => undo_with_snapshot(c, store),
            Self::SplitTrack(c) => undo_with_snapshot(c, store),
            Self::ReverseTrack(c) => undo_with_snapshot(c, store),
        }
    }

    pub fn affected(&self) -> &Affected {
        match self {
            Self::Add(c) => SnapshotCommand::affected(c),
            Self::Delete(c) => SnapshotCommand::affected(c),
            Self::ChangeTags(c) => SnapshotCommand::affected(c),
            Self::Move(c) => c.affected(),
            Self::Rotate(c) => c.affected(),
            Self::Sequence(c) => c.affected(),
            Self::Combine(c) => SnapshotCommand::affected(c),
            Self::CombineAndDelete(c) => SnapshotCommand::affected(c),
            Self::ResolveConflict(c) => SnapshotCommand::affected(c),
            Self::SplitTrack(c) => SnapshotCommand::affected(c),
            Self::ReverseTrack(c) => SnapshotCommand::affected(c),
        }
    }

    pub fn is_executed(&self) -> bool {
        match self {
            Self::Add(c) => c.is_executed(),
            Self::Delete(c) => c.is_executed(),
            Self::ChangeTags(c) => c.is_executed(),
            Self::Move(c) => c.is_executed(),
            Self::Rotate(c) => c.is_executed(),
            Self::Sequence(c) => c.is_executed(),
            Self::Combine(c) => c.is_executed(),
            Self::CombineAndDelete(c) => c.is_executed(),
            Self::ResolveConflict(c) => c.is_executed(),
            Self::SplitTrack(c) => c.is_executed(),
            Self::ReverseTrack(c) => c.is_executed(),
        }
    }
}

macro_rules! impl_from_command {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Command {
                fn from(command: $ty) -> Self {
                    Self::$variant(command)
                }
            }
        )*
    };
}

impl_from_command!(
    Add(AddCommand),
    Delete(DeleteCommand),
    ChangeTags(ChangeTagsCommand),
    Move(MoveCommand),
    Rotate(RotateCommand),
    Sequence(SequenceCommand),
    Combine(CombineCommand),
    CombineAndDelete(CombineAndDeleteCommand),
    ResolveConflict(ResolveConflictCommand),
    SplitTrack(SplitTrackCommand),
    ReverseTrack(ReverseTrackCommand),
);
