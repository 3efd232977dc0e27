// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Delta-based commands: they remember the transform and every point's original position
//! instead of a full snapshot, which lets an ongoing drag fold into the executed command.

use std::collections::BTreeSet;

use tracing::debug;

use crate::graph::{GraphError, GraphStore};
use crate::model::{EastNorth, HasBase, LatLon, PointId, PrimitiveRef};

use super::{Affected, AffectedBuilder, CommandError};

#[derive(Debug, Clone, Copy, PartialEq)]
struct OriginalPosition {
    point: PointId,
    lat_lon: LatLon,
    east_north: EastNorth,
    modified: bool,
}

/// Collects every point reached from `objects` (a track reaches all points of its segments).
fn collect_points(
    store: &GraphStore,
    objects: &[PrimitiveRef],
) -> Result<Vec<PointId>, GraphError> {
    let mut points = BTreeSet::new();
    for object in objects {
        match *object {
            PrimitiveRef::Point(id) => {
                store.point(id).ok_or(GraphError::UnknownPoint(id))?;
                points.insert(id);
            }
            PrimitiveRef::Segment(id) => {
                let segment = store.segment(id).ok_or(GraphError::UnknownSegment(id))?;
                points.insert(segment.start());
                points.insert(segment.end());
            }
            PrimitiveRef::Track(id) => {
                points.extend(store.track_points(id)?);
            }
        }
    }
    Ok(points.into_iter().collect())
}

fn record_originals(
    store: &GraphStore,
    points: &[PointId],
) -> Result<Vec<OriginalPosition>, GraphError> {
    points
        .iter()
        .map(|id| {
            let point = store.point(*id).ok_or(GraphError::UnknownPoint(*id))?;
            Ok(OriginalPosition {
                point: *id,
                lat_lon: point.lat_lon(),
                east_north: point.east_north(),
                modified: point.is_modified(),
            })
        })
        .collect()
}

fn restore_originals(
    store: &mut GraphStore,
    originals: &[OriginalPosition],
) -> Result<(), GraphError> {
    for original in originals {
        let point = store.point_mut(original.point)?;
        point.set_position(original.lat_lon, original.east_north);
        point.base_mut().set_modified(original.modified);
    }
    Ok(())
}

fn modified_points(points: &[PointId]) -> Affected {
    let mut affected = AffectedBuilder::default();
    for point in points {
        affected.record_modified(PrimitiveRef::Point(*point));
    }
    affected.finish()
}

/// Translates points by a projected-space delta.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveCommand {
    points: Vec<PointId>,
    dx: f64,
    dy: f64,
    originals: Option<Vec<OriginalPosition>>,
    affected: Affected,
}

impl MoveCommand {
    pub fn new(
        store: &GraphStore,
        objects: &[PrimitiveRef],
        dx: f64,
        dy: f64,
    ) -> Result<Self, GraphError> {
        let points = collect_points(store, objects)?;
        let affected = modified_points(&points);
        Ok(Self {
            points,
            dx,
            dy,
            originals: None,
            affected,
        })
    }

    pub fn delta(&self) -> (f64, f64) {
        (self.dx, self.dy)
    }

    pub fn points(&self) -> &[PointId] {
        &self.points
    }

    pub fn affected(&self) -> &Affected {
        &self.affected
    }

    pub fn is_executed(&self) -> bool {
        self.originals.is_some()
    }

    pub fn execute(&mut self, store: &mut GraphStore) -> Result<(), CommandError> {
        if self.originals.is_some() {
            return Err(CommandError::AlreadyExecuted("move"));
        }
        let originals = record_originals(store, &self.points)?;
        self.shift(store, self.dx, self.dy)?;
        self.originals = Some(originals);
        debug!(points = self.points.len(), dx = self.dx, dy = self.dy, "moved");
        Ok(())
    }

    /// Folds a further drag step into this (executed) move.
    pub fn move_again(
        &mut self,
        store: &mut GraphStore,
        dx: f64,
        dy: f64,
    ) -> Result<(), CommandError> {
        if self.originals.is_none() {
            return Err(CommandError::NotExecuted("move"));
        }
        self.shift(store, dx, dy)?;
        self.dx += dx;
        self.dy += dy;
        Ok(())
    }

    pub fn undo(&mut self, store: &mut GraphStore) -> Result<(), CommandError> {
        let originals = self.originals.take().ok_or(CommandError::NotExecuted("move"))?;
        restore_originals(store, &originals)?;
        Ok(())
    }

    fn shift(&self, store: &mut GraphStore, dx: f64, dy: f64) -> Result<(), GraphError> {
        let projection = store.projection();
        for id in &self.points {
            let point = store.point_mut(*id)?;
            let target = point.east_north().add(dx, dy);
            point.set_east_north(target, projection);
            point.base_mut().set_modified(true);
        }
        Ok(())
    }
}

/// Rotates points around a pivot in projected space.
///
/// Positions are always recomputed from the originals, so folding many small rotations does not
/// accumulate rounding drift.
#[derive(Debug, Clone, PartialEq)]
pub struct RotateCommand {
    points: Vec<PointId>,
    pivot: EastNorth,
    angle: f64,
    originals: Option<Vec<OriginalPosition>>,
    affected: Affected,
}

impl RotateCommand {
    /// Rotates by `angle` radians around the centroid of the collected points.
    pub fn new(
        store: &GraphStore,
        objects: &[PrimitiveRef],
        angle: f64,
    ) -> Result<Self, GraphError> {
        let points = collect_points(store, objects)?;
        let pivot = centroid(store, &points)?;
        let affected = modified_points(&points);
        Ok(Self {
            points,
            pivot,
            angle,
            originals: None,
            affected,
        })
    }

    /// Rotation implied by dragging from `start` to `end` around the centroid.
    pub fn from_drag(
        store: &GraphStore,
        objects: &[PrimitiveRef],
        start: EastNorth,
        end: EastNorth,
    ) -> Result<Self, GraphError> {
        let mut command = Self::new(store, objects, 0.0)?;
        command.angle = end.heading_from(command.pivot) - start.heading_from(command.pivot);
        Ok(command)
    }

    pub fn pivot(&self) -> EastNorth {
        self.pivot
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn affected(&self) -> &Affected {
        &self.affected
    }

    pub fn is_executed(&self) -> bool {
        self.originals.is_some()
    }

    pub fn execute(&mut self, store: &mut GraphStore) -> Result<(), CommandError> {
        if self.originals.is_some() {
            return Err(CommandError::AlreadyExecuted("rotate"));
        }
        let originals = record_originals(store, &self.points)?;
        apply_rotation(store, &originals, self.pivot, self.angle)?;
        self.originals = Some(originals);
        debug!(points = self.points.len(), angle = self.angle, "rotated");
        Ok(())
    }

    /// Adds `angle` radians to this (executed) rotation.
    pub fn rotate_again(&mut self, store: &mut GraphStore, angle: f64) -> Result<(), CommandError> {
        let Some(originals) = &self.originals else {
            return Err(CommandError::NotExecuted("rotate"));
        };
        let total = self.angle + angle;
        apply_rotation(store, originals, self.pivot, total)?;
        self.angle = total;
        Ok(())
    }

    pub fn undo(&mut self, store: &mut GraphStore) -> Result<(), CommandError> {
        let originals = self.originals.take().ok_or(CommandError::NotExecuted("rotate"))?;
        restore_originals(store, &originals)?;
        Ok(())
    }
}

fn apply_rotation(
    store: &mut GraphStore,
    originals: &[OriginalPosition],
    pivot: EastNorth,
    angle: f64,
) -> Result<(), GraphError> {
    let projection = store.projection();
    for original in originals {
        let point = store.point_mut(original.point)?;
        point.set_east_north(original.east_north.rotate_around(pivot, angle), projection);
        point.base_mut().set_modified(true);
    }
    Ok(())
}

fn centroid(store: &GraphStore, points: &[PointId]) -> Result<EastNorth, GraphError> {
    if points.is_empty() {
        return Ok(EastNorth::default());
    }
    let mut east = 0.0;
    let mut north = 0.0;
    for id in points {
        let en = store.point(*id).ok_or(GraphError::UnknownPoint(*id))?.east_north();
        east += en.east;
        north += en.north;
    }
    let n = points.len() as f64;
    Ok(EastNorth::new(east / n, north / n))
}
