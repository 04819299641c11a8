// Copyright 2026 the Cartostory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Rect, Size};

/// Returns the top-left origin of a `size` box centered on `centroid`.
///
/// Used to place fixed-size overlays, such as region labels, over a projected
/// point.
#[must_use]
pub fn center_rect(centroid: Point, size: Size) -> Point {
    Rect::from_center_size(centroid, size).origin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_is_half_the_size_up_and_left() {
        assert_eq!(
            center_rect(Point::new(100.0, 100.0), Size::new(50.0, 20.0)),
            Point::new(75.0, 90.0)
        );
        assert_eq!(
            center_rect(Point::new(-10.0, 0.0), Size::new(75.0, 50.0)),
            Point::new(-47.5, -25.0)
        );
        assert_eq!(center_rect(Point::new(3.0, 4.0), Size::ZERO), Point::new(3.0, 4.0));
    }
}
