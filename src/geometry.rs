// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Airways Disruption Simulator - Arc Geometry

use std::collections::HashMap;
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::types::{Coordinate, Node, NodeCode};

/// Mean earth radius used for distances (km).
const EARTH_RADIUS_KM: f64 = 6371.0088;
/// Web-Mercator tile edge in pixels (MapLibre vector tiles).
const TILE_SIZE: f64 = 512.0;
const MERCATOR_MAX_LAT: f64 = 85.051_128_78;
/// Endpoints closer than this share a position and have no arc.
const COINCIDENT_KM: f64 = 1e-6;

// ─── Arc Style ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum ArcStyle {
    GreatCircle,
    /// Quadratic curve in the lon/lat plane. `bend` is the control point
    /// offset as a fraction of the chord length.
    Bezier { bend: f64 },
}

impl Default for ArcStyle {
    fn default() -> Self { ArcStyle::GreatCircle }
}

/// Ordered points from `origin` to `destination`, `resolution + 1` long.
///
/// Returns an empty sequence when either endpoint is malformed, the
/// resolution is zero, the endpoints coincide, or (great circle only) they
/// are antipodal.
/// Callers treat an empty or single-point result as "route unavailable".
pub fn arc_between(
    origin: Coordinate,
    destination: Coordinate,
    resolution: usize,
    style: ArcStyle,
) -> Vec<Coordinate> {
    if resolution == 0 || !origin.is_valid() || !destination.is_valid() {
        return Vec::new();
    }
    if haversine_km(origin, destination) < COINCIDENT_KM {
        return Vec::new();
    }
    let mut points = match style {
        ArcStyle::GreatCircle => great_circle(origin, destination, resolution),
        ArcStyle::Bezier { bend } => bezier(origin, destination, resolution, bend),
    };
    if let Some(first) = points.first_mut() {
        *first = origin;
    }
    if let Some(last) = points.last_mut() {
        *last = destination;
    }
    points
}

fn to_unit(c: Coordinate) -> [f64; 3] {
    let (lon, lat) = (c.lon.to_radians(), c.lat.to_radians());
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

fn great_circle(a: Coordinate, b: Coordinate, n: usize) -> Vec<Coordinate> {
    let (va, vb) = (to_unit(a), to_unit(b));
    let dot = va[0] * vb[0] + va[1] * vb[1] + va[2] * vb[2];
    let cross = [
        va[1] * vb[2] - va[2] * vb[1],
        va[2] * vb[0] - va[0] * vb[2],
        va[0] * vb[1] - va[1] * vb[0],
    ];
    let sin_d = (cross[0].powi(2) + cross[1].powi(2) + cross[2].powi(2)).sqrt();
    let d = sin_d.atan2(dot);

    // Antipodal endpoints have no unique great circle.
    if PI - d < 1e-9 {
        return Vec::new();
    }

    (0..=n)
        .map(|i| {
            let f = i as f64 / n as f64;
            let wa = ((1.0 - f) * d).sin() / sin_d;
            let wb = (f * d).sin() / sin_d;
            let x = wa * va[0] + wb * vb[0];
            let y = wa * va[1] + wb * vb[1];
            let z = wa * va[2] + wb * vb[2];
            Coordinate::new(y.atan2(x).to_degrees(), z.atan2((x * x + y * y).sqrt()).to_degrees())
        })
        .collect()
}

fn bezier(a: Coordinate, b: Coordinate, n: usize, bend: f64) -> Vec<Coordinate> {
    // Both directions bulge to the same side: the normal is taken from the
    // endpoints in canonical order.
    let (lo, hi) = if (a.lon, a.lat) <= (b.lon, b.lat) { (a, b) } else { (b, a) };
    let (dx, dy) = (hi.lon - lo.lon, hi.lat - lo.lat);
    let len = dx.hypot(dy);
    let (nx, ny) = if len > 0.0 { (-dy / len, dx / len) } else { (0.0, 0.0) };
    let control = Coordinate::new(
        (a.lon + b.lon) / 2.0 + nx * bend * len,
        (a.lat + b.lat) / 2.0 + ny * bend * len,
    );

    (0..=n)
        .map(|i| {
            let t = i as f64 / n as f64;
            let u = 1.0 - t;
            Coordinate::new(
                u * u * a.lon + 2.0 * u * t * control.lon + t * t * b.lon,
                u * u * a.lat + 2.0 * u * t * control.lat + t * t * b.lat,
            )
        })
        .collect()
}

// ─── Measures ────────────────────────────────────────────────────────────────

/// Point at fraction `t` of the segment `a`-`b`, crossing the antimeridian
/// the short way. Longitude stays in [-180, 180].
pub fn interpolate(a: Coordinate, b: Coordinate, t: f64) -> Coordinate {
    let mut d_lon = b.lon - a.lon;
    if d_lon > 180.0 {
        d_lon -= 360.0;
    } else if d_lon < -180.0 {
        d_lon += 360.0;
    }
    let mut lon = a.lon + d_lon * t;
    if lon > 180.0 {
        lon -= 360.0;
    } else if lon < -180.0 {
        lon += 360.0;
    }
    Coordinate::new(lon, a.lat + (b.lat - a.lat) * t)
}

/// Initial bearing from `a` to `b` in degrees, in (-180, 180], 0 = north.
pub fn bearing(a: Coordinate, b: Coordinate) -> f64 {
    let (phi1, phi2) = (a.lat.to_radians(), b.lat.to_radians());
    let d_lambda = (b.lon - a.lon).to_radians();
    let y = d_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();
    y.atan2(x).to_degrees()
}

pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

pub fn path_length_km(coords: &[Coordinate]) -> f64 {
    coords.windows(2).map(|w| haversine_km(w[0], w[1])).sum()
}

// ─── Projection ──────────────────────────────────────────────────────────────

/// Screen-space mapping used to keep apparent flight speed uniform.
pub trait Projection {
    fn project(&self, c: Coordinate) -> (f64, f64);

    /// Horizontal extent of one world copy, zero if the plane does not wrap.
    fn world_width(&self) -> f64 {
        0.0
    }

    /// Multiplier applied to the base flight speed at this view.
    fn speed_scale(&self) -> f64 {
        1.0
    }

    /// Projected length of a segment, taking the short way across the
    /// antimeridian.
    fn segment_length(&self, a: Coordinate, b: Coordinate) -> f64 {
        let (ax, ay) = self.project(a);
        let (bx, by) = self.project(b);
        let mut dx = (bx - ax).abs();
        let w = self.world_width();
        if w > 0.0 && dx > w / 2.0 {
            dx = w - dx;
        }
        dx.hypot(by - ay)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WebMercator {
    pub zoom: f64,
}

impl WebMercator {
    pub fn new(zoom: f64) -> Self {
        Self { zoom }
    }

    fn world(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom)
    }
}

impl Projection for WebMercator {
    fn project(&self, c: Coordinate) -> (f64, f64) {
        let world = self.world();
        let lat = c.lat.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT).to_radians();
        let x = (c.lon + 180.0) / 360.0 * world;
        let y = (1.0 - (PI / 4.0 + lat / 2.0).tan().ln() / PI) / 2.0 * world;
        (x, y)
    }

    fn world_width(&self) -> f64 {
        self.world()
    }

    fn speed_scale(&self) -> f64 {
        (0.9 + (self.zoom - 2.0) * 0.12).max(0.05)
    }
}

// ─── GeometryProvider ────────────────────────────────────────────────────────

/// Arc cache keyed by directed node pair. Computing one direction also
/// stores the reversed sequence for the other.
#[derive(Debug, Clone)]
pub struct GeometryProvider {
    resolution: usize,
    style: ArcStyle,
    cache: HashMap<(NodeCode, NodeCode), Vec<Coordinate>>,
}

impl GeometryProvider {
    pub fn new(resolution: usize, style: ArcStyle) -> Self {
        Self { resolution, style, cache: HashMap::new() }
    }

    pub fn arc(&mut self, from: &Node, to: &Node) -> Vec<Coordinate> {
        let key = (from.code.clone(), to.code.clone());
        if let Some(coords) = self.cache.get(&key) {
            return coords.clone();
        }
        let coords = arc_between(from.coordinate(), to.coordinate(), self.resolution, self.style);
        let mut reversed = coords.clone();
        reversed.reverse();
        self.cache.insert((to.code.clone(), from.code.clone()), reversed);
        self.cache.insert(key, coords.clone());
        coords
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn close(a: Coordinate, b: Coordinate) -> bool {
        (a.lon - b.lon).abs() < TOL && (a.lat - b.lat).abs() < TOL
    }

    #[test]
    fn arc_has_resolution_plus_one_points_and_exact_endpoints() {
        let lon = Coordinate::new(-0.1276, 51.5072);
        let nyc = Coordinate::new(-74.0060, 40.7128);
        for style in [ArcStyle::GreatCircle, ArcStyle::Bezier { bend: 0.2 }] {
            let arc = arc_between(lon, nyc, 160, style);
            assert_eq!(arc.len(), 161);
            assert_eq!(arc[0], lon);
            assert_eq!(arc[160], nyc);
        }
    }

    #[test]
    fn reversal_is_a_true_inverse() {
        let dxb = Coordinate::new(55.2708, 25.2048);
        let tyo = Coordinate::new(139.6917, 35.6895);
        for style in [ArcStyle::GreatCircle, ArcStyle::Bezier { bend: 0.25 }] {
            let mut forward = arc_between(dxb, tyo, 64, style);
            forward.reverse();
            let backward = arc_between(tyo, dxb, 64, style);
            assert_eq!(forward.len(), backward.len());
            for (f, b) in forward.iter().zip(&backward) {
                assert!(close(*f, *b), "{:?} vs {:?}", f, b);
            }
        }
    }

    #[test]
    fn great_circle_progresses_monotonically() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(10.0, 0.0);
        let arc = arc_between(a, b, 20, ArcStyle::GreatCircle);
        let dist: Vec<f64> = arc.iter().map(|c| haversine_km(a, *c)).collect();
        assert!(dist.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn malformed_input_is_degenerate() {
        let ok = Coordinate::new(0.0, 0.0);
        assert!(arc_between(Coordinate::new(f64::NAN, 0.0), ok, 10, ArcStyle::GreatCircle).is_empty());
        assert!(arc_between(ok, Coordinate::new(0.0, 120.0), 10, ArcStyle::GreatCircle).is_empty());
        assert!(arc_between(ok, Coordinate::new(10.0, 0.0), 0, ArcStyle::GreatCircle).is_empty());
        assert!(arc_between(ok, Coordinate::new(180.0, 0.0), 10, ArcStyle::GreatCircle).is_empty());
    }

    #[test]
    fn coincident_endpoints_have_no_arc() {
        let a = Coordinate::new(12.5, 41.9);
        assert!(arc_between(a, a, 10, ArcStyle::GreatCircle).is_empty());
        assert!(arc_between(a, a, 10, ArcStyle::Bezier { bend: 0.2 }).is_empty());
    }

    #[test]
    fn interpolation_crosses_antimeridian_the_short_way() {
        let a = Coordinate::new(178.0, 10.0);
        let b = Coordinate::new(-176.0, 20.0);
        let mid = interpolate(a, b, 0.5);
        assert!((mid.lon + 179.0).abs() < TOL, "{:?}", mid);
        assert!((mid.lat - 15.0).abs() < TOL);
        let early = interpolate(a, b, 0.25);
        assert!((early.lon - 179.5).abs() < TOL, "{:?}", early);
        assert!(close(interpolate(b, a, 0.5), mid));
        assert!(close(interpolate(Coordinate::new(-1.0, 0.0), Coordinate::new(1.0, 0.0), 0.5), Coordinate::new(0.0, 0.0)));
    }

    #[test]
    fn bearing_matches_compass_directions() {
        let origin = Coordinate::new(0.0, 0.0);
        assert!((bearing(origin, Coordinate::new(0.0, 10.0))).abs() < 1e-9);
        assert!((bearing(origin, Coordinate::new(10.0, 0.0)) - 90.0).abs() < 1e-9);
        assert!((bearing(origin, Coordinate::new(-10.0, 0.0)) + 90.0).abs() < 1e-9);
    }

    #[test]
    fn haversine_london_new_york() {
        let d = haversine_km(Coordinate::new(-0.1276, 51.5072), Coordinate::new(-74.0060, 40.7128));
        assert!((d - 5570.0).abs() < 15.0, "got {}", d);
    }

    #[test]
    fn mercator_segment_wraps_across_antimeridian() {
        let p = WebMercator::new(2.0);
        let short = p.segment_length(Coordinate::new(179.0, 0.0), Coordinate::new(-179.0, 0.0));
        let direct = p.segment_length(Coordinate::new(-1.0, 0.0), Coordinate::new(1.0, 0.0));
        assert!((short - direct).abs() < 1e-6);
        assert!((p.speed_scale() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn provider_caches_both_directions() {
        let a = Node::new("A", "Alpha", 0.0, 0.0);
        let b = Node::new("B", "Beta", 10.0, 0.0);
        let mut geo = GeometryProvider::new(8, ArcStyle::GreatCircle);
        let ab = geo.arc(&a, &b);
        assert_eq!(geo.cached_len(), 2);
        let mut ba = geo.arc(&b, &a);
        ba.reverse();
        assert_eq!(ab, ba);
    }
}
