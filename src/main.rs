// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Tracksmith demo entrypoint.
//!
//! Builds a small baseline graph, runs a scripted edit session against it (combine, delete,
//! build, split, reverse), undoes everything in reverse order and prints a JSON summary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tracksmith::command::{Affected, Command, CommandError};
use tracksmith::config::EditorConfig;
use tracksmith::edit::{self, DeleteMode, TagPolicy};
use tracksmith::graph::{GraphBuilder, GraphStore};
use tracksmith::model::{PrimitiveRef, ProjectedBounds, Projection, TagMap};
use tracksmith::selection::SelectionDispatcher;

#[derive(Parser, Debug)]
#[command(name = "tracksmith")]
#[command(about = "Runs a scripted edit/undo session on a demo track graph")]
#[command(version)]
struct Args {
    /// TOML file with editor defaults
    #[arg(short, long, default_value = "tracksmith.toml", env = "TRACKSMITH_CONFIG")]
    config: PathBuf,

    /// Overrides the configured projection (epsg4326 | mercator)
    #[arg(long, env = "TRACKSMITH_PROJECTION")]
    projection: Option<Projection>,

    /// Overrides the configured delete mode (cascade | combine)
    #[arg(long)]
    delete_mode: Option<DeleteMode>,

    /// Overrides the configured tag policy (strict | destination-wins)
    #[arg(long)]
    tag_policy: Option<TagPolicy>,

    /// Pretty-print the JSON summary
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Serialize)]
struct StepReport {
    step: String,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    affected: Option<Affected>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct Summary {
    projection: Projection,
    delete_mode: DeleteMode,
    tag_policy: TagPolicy,
    steps: Vec<StepReport>,
    after_edits: GraphCounts,
    after_undo: GraphCounts,
    restored: bool,
    selection_notifications: usize,
}

#[derive(Debug, Serialize)]
struct GraphCounts {
    points: usize,
    segments: usize,
    pending: usize,
    tracks: usize,
    bounds: Option<ProjectedBounds>,
}

impl GraphCounts {
    fn of(store: &GraphStore) -> Self {
        Self {
            points: store.point_count(),
            segments: store.segment_count(),
            pending: store.pending_segments().count(),
            tracks: store.track_count(),
            bounds: store.bounds_projected(),
        }
    }
}

struct Demo {
    store: GraphStore,
    history: Vec<Command>,
    steps: Vec<StepReport>,
}

impl Demo {
    fn run(&mut self, step: &str, planned: Result<Option<Command>, CommandError>) {
        let report = match planned.and_then(|command| {
            command
                .map(|mut command| command.execute(&mut self.store).map(|()| command))
                .transpose()
        }) {
            Ok(Some(command)) => {
                let report = StepReport {
                    step: step.to_owned(),
                    outcome: "executed",
                    affected: Some(command.affected().clone()),
                    error: None,
                };
                self.history.push(command);
                report
            }
            Ok(None) => StepReport {
                step: step.to_owned(),
                outcome: "nothing to do",
                affected: None,
                error: None,
            },
            Err(err) => {
                warn!(step, error = %err, "step refused");
                StepReport {
                    step: step.to_owned(),
                    outcome: if err.abort().is_some() { "aborted" } else { "failed" },
                    affected: None,
                    error: Some(err.to_string()),
                }
            }
        };
        self.steps.push(report);
    }
}

fn same_graph(a: &GraphStore, b: &GraphStore) -> bool {
    a.points().eq(b.points())
        && a.segments().eq(b.segments())
        && a.pending_segments().eq(b.pending_segments())
        && a.tracks().eq(b.tracks())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = EditorConfig::load(&args.config)?;
    if let Some(projection) = args.projection {
        config.projection = projection;
    }
    if let Some(mode) = args.delete_mode {
        config.delete_mode = mode;
    }
    if let Some(policy) = args.tag_policy {
        config.tag_policy = policy;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        projection = ?config.projection,
        delete_mode = ?config.delete_mode,
        tag_policy = ?config.tag_policy,
        "starting demo session"
    );

    let path: TagMap = [("highway", "path")].into_iter().collect();
    let mut builder = GraphBuilder::new(config.projection);
    let p1 = builder.point(47.00, 8.00);
    let p2 = builder.point(47.01, 8.01);
    let p3 = builder.point(47.02, 8.03);
    let p4 = builder.point(47.03, 8.04);
    let p5 = builder.point(47.04, 8.06);
    let p6 = builder.point(47.05, 8.07);
    let p7 = builder.point(47.06, 8.09);
    let west = builder.polyline(&[p1, p2, p3], path.clone())?;
    let east = builder.polyline(&[p3, p4, p5], path)?;
    let spur = builder.segment(p5, p6)?;
    let loose = builder.segment(p6, p7)?;
    let baseline = builder.build();

    let mut demo = Demo {
        store: baseline.clone(),
        history: Vec::new(),
        steps: Vec::new(),
    };
    let mut dispatcher = SelectionDispatcher::new();
    let mut notifications = 0;

    demo.store
        .select_only([PrimitiveRef::Point(p3)])
        .context("selecting the joint")?;
    notifications += usize::from(dispatcher.flush(&mut demo.store).is_some());

    let planned = edit::combine(&demo.store, spur.into(), east.into(), config.tag_policy).map(Some);
    demo.run("extend east track with spur", planned);

    let planned = edit::delete(&demo.store, [PrimitiveRef::Point(p3)], config.delete_mode);
    demo.run("delete the joint", planned);
    notifications += usize::from(dispatcher.flush(&mut demo.store).is_some());

    let planned = edit::build_track(&mut demo.store, &[loose], TagMap::new())
        .map(|(_, command)| Some(command));
    demo.run("build track from loose segment", planned);

    let surviving = [west, east]
        .into_iter()
        .find(|track| demo.store.track(*track).is_some());
    if let Some(track) = surviving {
        let planned = match demo.store.track_points(track) {
            Ok(points) if points.len() > 2 => edit::split_track(&mut demo.store, track, points[1])
                .map(|(_, command)| Some(command)),
            Ok(_) => Ok(None),
            Err(err) => Err(err.into()),
        };
        demo.run("split surviving track", planned);

        let planned = edit::reverse_track(&demo.store, track);
        demo.run("reverse surviving track", planned);
    }

    let after_edits = GraphCounts::of(&demo.store);
    let mut history = std::mem::take(&mut demo.history);
    while let Some(mut command) = history.pop() {
        command
            .undo(&mut demo.store)
            .with_context(|| format!("undoing '{}'", command.name()))?;
    }
    notifications += usize::from(dispatcher.flush(&mut demo.store).is_some());

    let summary = Summary {
        projection: config.projection,
        delete_mode: config.delete_mode,
        tag_policy: config.tag_policy,
        steps: demo.steps,
        after_edits,
        after_undo: GraphCounts::of(&demo.store),
        restored: same_graph(&demo.store, &baseline),
        selection_notifications: notifications,
    };
    let json = if args.pretty {
        serde_json::to_string_pretty(&summary)
    } else {
        serde_json::to_string(&summary)
    }
    .context("serializing summary")?;
    println!("{json}");
    Ok(())
}
