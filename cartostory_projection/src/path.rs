// Copyright 2026 the Cartostory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use cartostory_topology::FeatureGeometry;
use kurbo::{BezPath, Circle, Point, Shape};

use crate::Mercator;

/// Radius, in view pixels, of the circle drawn for point geometry.
pub const POINT_RADIUS: f64 = 4.5;

const CIRCLE_TOLERANCE: f64 = 0.1;

/// Projects `geometry` into a view-space path.
///
/// Polygon rings become closed subpaths, lines become open subpaths and points
/// become small circles of [`POINT_RADIUS`]. Empty parts are skipped.
#[must_use]
pub fn project_geometry(projection: &Mercator, geometry: &FeatureGeometry) -> BezPath {
    let mut path = BezPath::new();
    append(&mut path, projection, geometry);
    path
}

fn append(path: &mut BezPath, projection: &Mercator, geometry: &FeatureGeometry) {
    match geometry {
        FeatureGeometry::Point(p) => point(path, projection, *p),
        FeatureGeometry::MultiPoint(points) => {
            for p in points {
                point(path, projection, *p);
            }
        }
        FeatureGeometry::LineString(line) => polyline(path, projection, line, false),
        FeatureGeometry::MultiLineString(lines) => {
            for line in lines {
                polyline(path, projection, line, false);
            }
        }
        FeatureGeometry::Polygon(rings) => {
            for ring in rings {
                polyline(path, projection, ring, true);
            }
        }
        FeatureGeometry::MultiPolygon(polygons) => {
            for ring in polygons.iter().flatten() {
                polyline(path, projection, ring, true);
            }
        }
        FeatureGeometry::Collection(children) => {
            for child in children {
                append(path, projection, child);
            }
        }
    }
}

fn polyline(path: &mut BezPath, projection: &Mercator, points: &[Point], closed: bool) {
    let mut points = points.iter().map(|&p| projection.project(p));
    let Some(first) = points.next() else {
        return;
    };
    path.move_to(first);
    for p in points {
        path.line_to(p);
    }
    if closed {
        path.close_path();
    }
}

fn point(path: &mut BezPath, projection: &Mercator, p: Point) {
    let circle = Circle::new(projection.project(p), POINT_RADIUS);
    for el in circle.path_elements(CIRCLE_TOLERANCE) {
        path.push(el);
    }
}
