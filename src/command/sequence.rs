// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use tracing::{debug, error, warn};

use crate::graph::GraphStore;

use super::{Affected, AffectedBuilder, Command, CommandError};

/// Runs sub-commands in order and undoes them in reverse.
///
/// Execution is transactional: when step *k* fails, steps *0..k* are undone (newest first) before
/// the error is returned, so the store ends up exactly as before.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceCommand {
    label: String,
    commands: Vec<Command>,
    affected: Affected,
    executed: bool,
}

impl SequenceCommand {
    pub fn new(label: impl Into<String>, commands: Vec<Command>) -> Self {
        let mut affected = AffectedBuilder::default();
        for command in &commands {
            affected.extend(command.affected());
        }
        Self {
            label: label.into(),
            commands,
            affected: affected.finish(),
            executed: false,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn affected(&self) -> &Affected {
        &self.affected
    }

    pub fn is_executed(&self) -> bool {
        self.executed
    }

    pub fn execute(&mut self, store: &mut GraphStore) -> Result<(), CommandError> {
        if self.executed {
            return Err(CommandError::AlreadyExecuted("sequence"));
        }
        for index in 0..self.commands.len() {
            if let Err(err) = self.commands[index].execute(store) {
                warn!(sequence = %self.label, step = index, error = %err, "rolling back sequence");
                for done in self.commands[..index].iter_mut().rev() {
                    if let Err(undo_err) = done.undo(store) {
                        error!(sequence = %self.label, error = %undo_err, "rollback step failed");
                    }
                }
                return Err(CommandError::SequenceStep {
                    name: self.label.clone(),
                    index,
                    source: Box::new(err),
                });
            }
        }
        self.executed = true;
        debug!(sequence = %self.label, steps = self.commands.len(), "executed");
        Ok(())
    }

    pub fn undo(&mut self, store: &mut GraphStore) -> Result<(), CommandError> {
        if !self.executed {
            return Err(CommandError::NotExecuted("sequence"));
        }
        for command in self.commands.iter_mut().rev() {
            command.undo(store)?;
        }
        self.executed = false;
        Ok(())
    }
}
