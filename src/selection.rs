// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Coalesced selection-change notification.
//!
//! Selection flags change synchronously (through [`GraphStore::set_selected`] and friends, or as a
//! side effect of commands). The host calls [`SelectionDispatcher::flush`] once per processing
//! turn; every turn with a selection change produces exactly one notification carrying the final
//! set, even when the burst ends on the set delivered last time.

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use crate::graph::GraphStore;
use crate::model::PrimitiveRef;

type Listener = Box<dyn FnMut(&BTreeSet<PrimitiveRef>)>;

#[derive(Default)]
pub struct SelectionDispatcher {
    listeners: Vec<Listener>,
    last_delivered: BTreeSet<PrimitiveRef>,
}

impl fmt::Debug for SelectionDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionDispatcher")
            .field("listeners", &self.listeners.len())
            .field("last_delivered", &self.last_delivered)
            .finish()
    }
}

impl SelectionDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&BTreeSet<PrimitiveRef>) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn last_delivered(&self) -> &BTreeSet<PrimitiveRef> {
        &self.last_delivered
    }

    /// Delivers the current selection if any selection flag changed since the last flush.
    ///
    /// Returns the delivered set, or `None` when nothing was sent.
    pub fn flush(&mut self, store: &mut GraphStore) -> Option<BTreeSet<PrimitiveRef>> {
        if !store.take_selection_dirty() {
            return None;
        }
        let current = store.selected();
        debug!(selected = current.len(), listeners = self.listeners.len(), "selection changed");
        for listener in &mut self.listeners {
            listener(&current);
        }
        self.last_delivered = current.clone();
        Some(current)
    }
}
