//! Spherical Mercator projection (EPSG:3857) and the viewport geometry built on it.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// Earth radius used by the spherical Mercator projection, in meters.
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Project geographic degrees to spherical Mercator meters.
///
/// Poles map to infinity; no clamping is applied.
pub fn project(lng: f64, lat: f64) -> (f64, f64) {
    let x = EARTH_RADIUS * lng * PI / 180.0;
    let y = EARTH_RADIUS * (FRAC_PI_4 + lat * PI / 360.0).tan().ln();
    (x, y)
}

/// Inverse of [`project`].
pub fn unproject(x: f64, y: f64) -> (f64, f64) {
    let lng = (x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - FRAC_PI_2).to_degrees();
    (lng, lat)
}

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// A bounding box in geographic degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeoBBox {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Zero-area box sitting on a single point.
    pub fn around_point(point: LngLat) -> Self {
        Self::new(point.lng, point.lat, point.lng, point.lat)
    }

    pub fn projected(&self) -> ProjectedBBox {
        let (min_x, min_y) = project(self.west, self.south);
        let (max_x, max_y) = project(self.east, self.north);
        ProjectedBBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// `west,south,east,north` as used in query strings.
    pub fn to_param(&self) -> String {
        format!("{},{},{},{}", self.west, self.south, self.east, self.north)
    }
}

/// A bounding box in projected meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedBBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl ProjectedBBox {
    /// `minx,miny,maxx,maxy` as used in query strings.
    pub fn to_param(&self) -> String {
        format!("{},{},{},{}", self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

/// A pixel offset inside a viewport, counted from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelPosition {
    pub i: u32,
    pub j: u32,
}

/// The visible map: its geographic bounds and its size on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub bounds: GeoBBox,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(bounds: GeoBBox, width: u32, height: u32) -> Self {
        Self {
            bounds,
            width,
            height,
        }
    }

    pub fn projected_bbox(&self) -> ProjectedBBox {
        self.bounds.projected()
    }

    /// Screen pixel under a geographic point.
    ///
    /// Interpolates linearly in projected space, which is what a Mercator map
    /// renders. The result is the pixel containing the point, clamped to
    /// `0..width` and `0..height`, so points on or past an edge land on the
    /// edge pixel.
    pub fn pixel_of(&self, point: LngLat) -> PixelPosition {
        let bbox = self.projected_bbox();
        let (x, y) = project(point.lng, point.lat);
        let span_x = bbox.max_x - bbox.min_x;
        let span_y = bbox.max_y - bbox.min_y;
        let fx = if span_x > 0.0 {
            (x - bbox.min_x) / span_x
        } else {
            0.0
        };
        let fy = if span_y > 0.0 {
            (bbox.max_y - y) / span_y
        } else {
            0.0
        };
        PixelPosition {
            i: pixel_index(fx, self.width),
            j: pixel_index(fy, self.height),
        }
    }
}

fn pixel_index(fraction: f64, size: u32) -> u32 {
    let last = size.saturating_sub(1);
    let index = (fraction * size as f64).floor();
    if index.is_nan() || index <= 0.0 {
        0
    } else if index >= last as f64 {
        last
    } else {
        index as u32
    }
}
