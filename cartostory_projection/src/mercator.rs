// Copyright 2026 the Cartostory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::f64::consts::{FRAC_PI_4, TAU};

use cartostory_topology::Feature;
use kurbo::{Affine, Point, Rect, Size};

/// Latitude limit, in degrees, beyond which Mercator coordinates are clamped.
///
/// This is the Web Mercator limit `atan(sinh(π))`, where the projected map
/// becomes square.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

/// Scale used while measuring bounds for [`Mercator::fit_size`].
const FIT_SCALE: f64 = 150.0;

/// A spherical Mercator projection.
///
/// Coordinates go in as longitude (x) and latitude (y) in degrees and come
/// out in view space, with y growing downward. The projection is described by:
/// - `scale`: pixels per radian.
/// - `translate`: where the `center` lands in view space.
/// - `center`: the longitude/latitude placed at `translate`.
///
/// The defaults match d3-geo's `geoMercator()`: scale `961 / τ`, translate
/// `(480, 250)` and center `(0, 0)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mercator {
    scale: f64,
    translate: Point,
    center: Point,
}

impl Default for Mercator {
    fn default() -> Self {
        Self {
            scale: 961.0 / TAU,
            translate: Point::new(480.0, 250.0),
            center: Point::ORIGIN,
        }
    }
}

impl Mercator {
    /// Creates a projection with the default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the scale in pixels per radian.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Returns the view-space position of the center.
    #[must_use]
    pub fn translate(&self) -> Point {
        self.translate
    }

    /// Returns the longitude/latitude placed at [`Mercator::translate`].
    #[must_use]
    pub fn center(&self) -> Point {
        self.center
    }

    /// Returns a copy with a different scale.
    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Returns a copy with a different translate.
    #[must_use]
    pub fn with_translate(mut self, translate: Point) -> Self {
        self.translate = translate;
        self
    }

    /// Returns a copy with a different center.
    #[must_use]
    pub fn with_center(mut self, center: Point) -> Self {
        self.center = center;
        self
    }

    /// Returns the affine map from raw (unscaled, radian) Mercator coordinates
    /// into view space.
    #[must_use]
    pub fn transform(&self) -> Affine {
        let k = self.scale;
        let c = raw(self.center);
        Affine::new([
            k,
            0.0,
            0.0,
            -k,
            self.translate.x - k * c.x,
            self.translate.y + k * c.y,
        ])
    }

    /// Projects a longitude/latitude point into view space.
    #[must_use]
    pub fn project(&self, lon_lat: Point) -> Point {
        self.transform() * raw(lon_lat)
    }

    /// Returns the view-space bounding box of every vertex of `features`.
    ///
    /// Returns `None` when there are no vertices.
    #[must_use]
    pub fn bounds(&self, features: &[Feature]) -> Option<Rect> {
        let transform = self.transform();
        let mut bounds: Option<Rect> = None;
        for feature in features {
            feature.geometry.visit_points(&mut |p| {
                let q = transform * raw(p);
                bounds = Some(match bounds {
                    Some(b) => b.union_pt(q),
                    None => Rect::from_points(q, q),
                });
            });
        }
        bounds
    }

    /// Adjusts scale and translate so `features` fill `size`, centered.
    ///
    /// The center is left as is. The content keeps its aspect ratio and touches
    /// the viewport on its tighter axis. If the features have no extent the
    /// projection is returned unchanged.
    #[must_use]
    pub fn fit_size(self, size: Size, features: &[Feature]) -> Self {
        let probe = self.with_scale(FIT_SCALE).with_translate(Point::ORIGIN);
        let Some(b) = probe.bounds(features) else {
            log::debug!("fit_size skipped: no vertices to fit");
            return self;
        };
        let kx = size.width / b.width();
        let ky = size.height / b.height();
        let k = kx.min(ky);
        if !k.is_finite() || k <= 0.0 {
            log::debug!("fit_size skipped: degenerate bounds {b:?}");
            return self;
        }
        let x = (size.width - k * (b.x1 + b.x0)) / 2.0;
        let y = (size.height - k * (b.y1 + b.y0)) / 2.0;
        probe
            .with_scale(FIT_SCALE * k)
            .with_translate(Point::new(x, y))
    }
}

/// Raw Mercator in radians, latitude clamped to [`MAX_LATITUDE`].
fn raw(lon_lat: Point) -> Point {
    let lambda = lon_lat.x.to_radians();
    let phi = lon_lat.y.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    Point::new(lambda, (FRAC_PI_4 + phi / 2.0).tan().ln())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartostory_topology::{FeatureGeometry, Record};

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Feature {
        Feature {
            id: None,
            properties: Record::new(),
            geometry: FeatureGeometry::Polygon(vec![vec![
                Point::new(x0, y0),
                Point::new(x1, y0),
                Point::new(x1, y1),
                Point::new(x0, y1),
                Point::new(x0, y0),
            ]]),
        }
    }

    #[test]
    fn default_center_lands_on_translate() {
        let m = Mercator::new();
        assert!(close(m.project(Point::ORIGIN), Point::new(480.0, 250.0)));

        // 180° east is half a turn of longitude: π radians at 961/τ px/rad.
        let east = m.project(Point::new(180.0, 0.0));
        assert!((east.x - (480.0 + 961.0 / 2.0)).abs() < 1e-9);
    }

    #[test]
    fn north_is_up() {
        let m = Mercator::new();
        assert!(m.project(Point::new(0.0, 45.0)).y < 250.0);
        assert!(m.project(Point::new(0.0, -45.0)).y > 250.0);
    }

    #[test]
    fn center_moves_the_map() {
        let m = Mercator::new().with_center(Point::new(10.0, 20.0));
        assert!(close(m.project(Point::new(10.0, 20.0)), Point::new(480.0, 250.0)));
    }

    #[test]
    fn poles_are_clamped() {
        let m = Mercator::new();
        let pole = m.project(Point::new(0.0, 90.0));
        assert!(pole.y.is_finite());
        assert!(close(pole, m.project(Point::new(0.0, MAX_LATITUDE))));
    }

    #[test]
    fn fit_size_centers_and_fills_the_tighter_axis() {
        // Wide band near the equator: width is the binding axis.
        let features = [square(-40.0, -1.0, 40.0, 1.0)];
        let m = Mercator::new().fit_size(Size::new(600.0, 400.0), &features);
        let b = m.bounds(&features).unwrap();
        assert!((b.x0 - 0.0).abs() < 1e-6, "{b:?}");
        assert!((b.x1 - 600.0).abs() < 1e-6, "{b:?}");
        assert!((b.center().y - 200.0).abs() < 1e-6, "{b:?}");
    }

    #[test]
    fn fit_size_without_extent_is_a_no_op() {
        let m = Mercator::new();
        assert_eq!(m.fit_size(Size::new(600.0, 600.0), &[]), m);

        let dot = Feature {
            id: None,
            properties: Record::new(),
            geometry: FeatureGeometry::Point(Point::new(3.0, 4.0)),
        };
        assert_eq!(m.fit_size(Size::new(600.0, 600.0), &[dot]), m);
    }
}
