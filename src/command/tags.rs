// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use smol_str::SmolStr;

use crate::graph::{not_found, GraphStore, Snapshot};
use crate::model::PrimitiveRef;

use super::{Affected, AffectedBuilder, CommandError, SnapshotCommand};

/// Sets (or with `None`, removes) one tag on every target.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeTagsCommand {
    targets: Vec<PrimitiveRef>,
    key: SmolStr,
    value: Option<SmolStr>,
    affected: Affected,
    saved: Option<Snapshot>,
}

impl ChangeTagsCommand {
    pub fn new(
        targets: impl IntoIterator<Item = PrimitiveRef>,
        key: impl Into<SmolStr>,
        value: Option<SmolStr>,
    ) -> Self {
        let targets: Vec<PrimitiveRef> = targets
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let mut affected = AffectedBuilder::default();
        for target in &targets {
            affected.record_modified(*target);
        }
        Self {
            targets,
            key: key.into(),
            value,
            affected: affected.finish(),
            saved: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn is_executed(&self) -> bool {
        self.saved.is_some()
    }
}

impl SnapshotCommand for ChangeTagsCommand {
    fn name(&self) -> &'static str {
        if self.value.is_some() {
            "set tag"
        } else {
            "remove tag"
        }
    }

    fn touched(&self, store: &GraphStore) -> Result<BTreeSet<PrimitiveRef>, CommandError> {
        if let Some(missing) = self.targets.iter().find(|t| !store.contains(**t)) {
            return Err(not_found(*missing).into());
        }
        Ok(self.targets.iter().copied().collect())
    }

    fn apply(&self, store: &mut GraphStore) -> Result<(), CommandError> {
        for target in &self.targets {
            store
                .base_mut(*target)?
                .tags_mut()
                .set(self.key.clone(), self.value.clone());
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
