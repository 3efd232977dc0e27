// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Geographic and projected coordinates.
//!
//! The editing core never chooses a projection on its own; the store carries whichever
//! [`Projection`] the host selected and uses it to keep each point's `EastNorth` in sync.

use std::f64::consts::PI;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// WGS84 latitude/longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_nan(&self) -> bool {
        self.lat.is_nan() || self.lon.is_nan()
    }
}

/// Projected coordinate (x = east, y = north) in projection units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EastNorth {
    pub east: f64,
    pub north: f64,
}

impl EastNorth {
    pub const fn new(east: f64, north: f64) -> Self {
        Self { east, north }
    }

    pub fn is_nan(&self) -> bool {
        self.east.is_nan() || self.north.is_nan()
    }

    pub fn add(self, dx: f64, dy: f64) -> Self {
        Self::new(self.east + dx, self.north + dy)
    }

    /// Rotates `self` around `pivot` by `angle` radians (counter-clockwise).
    pub fn rotate_around(self, pivot: EastNorth, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        let x = self.east - pivot.east;
        let y = self.north - pivot.north;
        Self::new(
            pivot.east + x * cos - y * sin,
            pivot.north + x * sin + y * cos,
        )
    }

    /// Direction from `pivot` to `self`, in radians.
    pub fn heading_from(self, pivot: EastNorth) -> f64 {
        (self.north - pivot.north).atan2(self.east - pivot.east)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    /// Plain lat/lon; east = lon, north = lat.
    #[default]
    Epsg4326,
    /// Spherical Mercator in radians.
    Mercator,
}

impl Projection {
    pub fn lat_lon_to_east_north(self, ll: LatLon) -> EastNorth {
        match self {
            Self::Epsg4326 => EastNorth::new(ll.lon, ll.lat),
            Self::Mercator => EastNorth::new(
                ll.lon * PI / 180.0,
                (PI / 4.0 + ll.lat * PI / 360.0).tan().ln(),
            ),
        }
    }

    pub fn east_north_to_lat_lon(self, en: EastNorth) -> LatLon {
        match self {
            Self::Epsg4326 => LatLon::new(en.north, en.east),
            Self::Mercator => LatLon::new(
                (en.north.exp().atan() - PI / 4.0) * 360.0 / PI,
                en.east * 180.0 / PI,
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown projection '{0}' (expected 'epsg4326' or 'mercator')")]
pub struct ParseProjectionError(String);

impl FromStr for Projection {
    type Err = ParseProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "epsg4326" | "epsg:4326" | "latlon" => Ok(Self::Epsg4326),
            "mercator" => Ok(Self::Mercator),
            other => Err(ParseProjectionError(other.to_owned())),
        }
    }
}

/// Axis-aligned box in geographic space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoBounds {
    pub min: LatLon,
    pub max: LatLon,
}

/// Axis-aligned box in projected space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectedBounds {
    pub min: EastNorth,
    pub max: EastNorth,
}

impl ProjectedBounds {
    pub fn center(&self) -> EastNorth {
        EastNorth::new(
            (self.min.east + self.max.east) / 2.0,
            (self.min.north + self.max.north) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{EastNorth, LatLon, Projection};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn epsg4326_swaps_axes() {
        let en = Projection::Epsg4326.lat_lon_to_east_north(LatLon::new(48.0, 11.0));
        assert_eq!(en, EastNorth::new(11.0, 48.0));
    }

    #[test]
    fn mercator_inverse_recovers_lat_lon() {
        let ll = LatLon::new(47.3769, 8.5417);
        let en = Projection::Mercator.lat_lon_to_east_north(ll);
        let back = Projection::Mercator.east_north_to_lat_lon(en);
        assert!(close(back.lat, ll.lat));
        assert!(close(back.lon, ll.lon));
    }

    #[test]
    fn rotate_quarter_turn() {
        let rotated = EastNorth::new(1.0, 0.0)
            .rotate_around(EastNorth::new(0.0, 0.0), std::f64::consts::FRAC_PI_2);
        assert!(close(rotated.east, 0.0));
        assert!(close(rotated.north, 1.0));
    }

    #[test]
    fn projection_parses_names() {
        assert_eq!("Mercator".parse::<Projection>(), Ok(Projection::Mercator));
        assert_eq!("epsg:4326".parse::<Projection>(), Ok(Projection::Epsg4326));
        assert!("utm".parse::<Projection>().is_err());
    }
}
