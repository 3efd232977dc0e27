// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Tracksmith: undoable graph-editing core for map editors.
//!
//! Points, segments and tracks live in a [`graph::GraphStore`]. Every edit is a
//! [`command::Command`] that can be executed and undone and reports the primitives it touched;
//! the [`edit`] planners turn user intents (delete, combine, build, split) into such commands.

pub mod command;
pub mod config;
pub mod edit;
pub mod graph;
pub mod model;
pub mod selection;
