// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Editor defaults read from a TOML file.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::edit::{DeleteMode, TagPolicy};
use crate::model::Projection;

pub const DEFAULT_LOG_FILTER: &str = "tracksmith=info";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub projection: Projection,
    pub delete_mode: DeleteMode,
    pub tag_policy: TagPolicy,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            projection: Projection::default(),
            delete_mode: DeleteMode::default(),
            tag_policy: TagPolicy::default(),
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl EditorConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid editor config")
    }

    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{EditorConfig, DEFAULT_LOG_FILTER};
    use crate::edit::{DeleteMode, TagPolicy};
    use crate::model::Projection;

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let text = "projection = \"mercator\"\ndelete_mode = \"combine\"\n";
        let config = EditorConfig::from_toml(text).unwrap();
        assert_eq!(config.projection, Projection::Mercator);
        assert_eq!(config.delete_mode, DeleteMode::Combine);
        assert_eq!(config.tag_policy, TagPolicy::Strict);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn destination_wins_policy_parses() {
        let config = EditorConfig::from_toml("tag_policy = \"destination_wins\"").unwrap();
        assert_eq!(config.tag_policy, TagPolicy::DestinationWins);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(EditorConfig::from_toml("colour = \"blue\"").is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = EditorConfig::load(Path::new("/nonexistent/tracksmith.toml")).unwrap();
        assert_eq!(config, EditorConfig::default());
    }
}
