// Copyright 2026 the Cartostory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use cartostory_topology::Feature;
use kurbo::{Size, Vec2};

use crate::Mercator;

/// Caller-facing projection parameters.
///
/// [`ProjectionSettings::build`] applies them in a fixed order:
/// 1. optionally fit the features to the viewport,
/// 2. multiply the resulting scale by [`scale`](Self::scale),
/// 3. shift the center by [`translate`](Self::translate), in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionSettings {
    /// Whether to fit the features to the viewport first.
    ///
    /// Default: `true`.
    pub fit_size: bool,
    /// Multiplier applied to the projection scale.
    ///
    /// Default: `1.0`.
    pub scale: f64,
    /// Offset added to the projection center, as longitude/latitude degrees.
    ///
    /// Default: zero.
    pub translate: Vec2,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            fit_size: true,
            scale: 1.0,
            translate: Vec2::ZERO,
        }
    }
}

impl ProjectionSettings {
    /// Builds a projection for `features` drawn into `viewport`.
    #[must_use]
    pub fn build(&self, viewport: Size, features: &[Feature]) -> Mercator {
        let mut projection = Mercator::new();
        if self.fit_size {
            projection = projection.fit_size(viewport, features);
        }
        let projection = projection
            .with_scale(projection.scale() * self.scale)
            .with_center(projection.center() + self.translate);
        log::debug!(
            "projection rebuilt for {} features: scale {:.3}, translate {:?}, center {:?}",
            features.len(),
            projection.scale(),
            projection.translate(),
            projection.center(),
        );
        projection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartostory_topology::{FeatureGeometry, Record};
    use kurbo::Point;

    fn square() -> Feature {
        Feature {
            id: None,
            properties: Record::new(),
            geometry: FeatureGeometry::Polygon(vec![vec![
                Point::new(0.0, 0.0),
                Point::new(4.0, 0.0),
                Point::new(4.0, 4.0),
                Point::new(0.0, 4.0),
                Point::new(0.0, 0.0),
            ]]),
        }
    }

    #[test]
    fn without_fit_only_adjustments_apply() {
        let settings = ProjectionSettings {
            fit_size: false,
            scale: 2.0,
            translate: Vec2::new(5.0, -3.0),
        };
        let projection = settings.build(Size::new(600.0, 600.0), &[square()]);
        let base = Mercator::new();
        assert_eq!(projection.scale(), base.scale() * 2.0);
        assert_eq!(projection.translate(), base.translate());
        assert_eq!(projection.center(), Point::new(5.0, -3.0));
    }

    #[test]
    fn fitted_square_sits_in_the_viewport() {
        let viewport = Size::new(600.0, 600.0);
        let features = [square()];
        let projection = ProjectionSettings::default().build(viewport, &features);
        let bounds = projection.bounds(&features).unwrap();
        assert!(bounds.x0 >= -1e-6 && bounds.x1 <= 600.0 + 1e-6, "{bounds:?}");
        assert!(bounds.y0 >= -1e-6 && bounds.y1 <= 600.0 + 1e-6, "{bounds:?}");
        assert!((bounds.center() - Point::new(300.0, 300.0)).hypot() < 1e-6);
    }

    #[test]
    fn scale_multiplier_zooms_about_the_translate_point() {
        let viewport = Size::new(600.0, 600.0);
        let features = [square()];
        let fitted = ProjectionSettings::default().build(viewport, &features);
        let zoomed = ProjectionSettings {
            scale: 2.0,
            ..ProjectionSettings::default()
        }
        .build(viewport, &features);
        assert_eq!(zoomed.scale(), fitted.scale() * 2.0);
        assert_eq!(zoomed.translate(), fitted.translate());
    }
}
