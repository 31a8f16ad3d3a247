// Copyright (C) 2023 tessella contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// The scalar type every predicate is evaluated in. Callers are expected to
/// supply inputs for which double precision suffices; degenerate
/// configurations surface as a zero sign, never as an error.
pub type Scalar = f64;

/// A 2D point or vector.
pub type Point = glam::DVec2;

pub fn cross(a: Point, b: Point) -> Scalar {
    a.x * b.y - a.y * b.x
}

/// Result is > 0 if (a, b, c) clockwise, < 0 if counter-clockwise, 0 if
/// collinear. The absolute value is twice the area spanned by the triangle
/// abc. This sign convention is relied upon throughout the crate.
pub fn orientation(a: Point, b: Point, c: Point) -> Scalar {
    cross(c - a, b - a)
}

/// Sign of the 4x4 incircle determinant. For a counter-clockwise triangle
/// (a, b, c), the result is > 0 when p lies strictly inside the circle
/// through a, b and c, < 0 when strictly outside, 0 when cocircular.
pub fn in_circle(p: Point, a: Point, b: Point, c: Point) -> Scalar {
    a.dot(a) * cross(c - b, p - b) - b.dot(b) * cross(c - a, p - a)
        + c.dot(c) * cross(b - a, p - a)
        - p.dot(p) * cross(b - a, c - a)
}

/// Returns true if p lies on the closed segment m. Being on an endpoint of m
/// counts as being on m.
pub fn in_segment(m: [Point; 2], p: Point) -> bool {
    let ab = m[1] - m[0];
    let ap = p - m[0];
    if cross(ab, ap) == 0.0 {
        let along = ab.dot(ap);
        along >= 0.0 && along <= ab.length_squared()
    } else {
        false
    }
}

/// Checks if two closed segments intersect by testing whether either segment
/// lies entirely on one side of the other's supporting line. Parallel and
/// collinear pairs fall back to endpoint-on-segment tests.
pub fn segments_intersect(m: [Point; 2], n: [Point; 2]) -> bool {
    let cross_m_n = cross(m[1] - m[0], n[1] - n[0]);
    if cross_m_n == 0.0 {
        in_segment(m, n[0]) || in_segment(m, n[1])
    } else {
        let diffside_m = orientation(m[0], m[1], n[0]) * orientation(m[0], m[1], n[1]) < 0.0;
        let diffside_n = orientation(n[0], n[1], m[0]) * orientation(n[0], n[1], m[1]) < 0.0;
        diffside_m && diffside_n
    }
}

/// An axis-aligned box in left/top/right/bottom form, the layout every
/// construction entry point shares.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub left: Scalar,
    pub top: Scalar,
    pub right: Scalar,
    pub bottom: Scalar,
}

impl Rect {
    pub fn new(left: Scalar, top: Scalar, right: Scalar, bottom: Scalar) -> Self {
        let rect = Self {
            left,
            top,
            right,
            bottom,
        };
        debug_assert!(rect.is_valid(), "left must not exceed right, bottom must not exceed top");
        rect
    }

    pub fn is_valid(&self) -> bool {
        self.left <= self.right && self.bottom <= self.top
    }

    /// Closed containment test, consistent with every locator treating box
    /// boundaries as inside.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.bottom && p.y <= self.top
    }

    pub fn width(&self) -> Scalar {
        self.right - self.left
    }

    pub fn height(&self) -> Scalar {
        self.top - self.bottom
    }

    /// Grows the box by `amount` on every side.
    pub fn padded(&self, amount: Scalar) -> Rect {
        Rect::new(
            self.left - amount,
            self.top + amount,
            self.right + amount,
            self.bottom - amount,
        )
    }

    /// The four corners in counter-clockwise order, starting at the top-left.
    pub fn corners_ccw(&self) -> [Point; 4] {
        [
            Point::new(self.left, self.top),
            Point::new(self.left, self.bottom),
            Point::new(self.right, self.bottom),
            Point::new(self.right, self.top),
        ]
    }

    /// The tightest box enclosing all of `points`, or None for an empty slice.
    pub fn bounding(points: &[Point]) -> Option<Rect> {
        let first = points.first()?;
        let mut rect = Rect {
            left: first.x,
            top: first.y,
            right: first.x,
            bottom: first.y,
        };
        for p in &points[1..] {
            rect.left = rect.left.min(p.x);
            rect.right = rect.right.max(p.x);
            rect.top = rect.top.max(p.y);
            rect.bottom = rect.bottom.min(p.y);
        }
        Some(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_signs() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        let c = Point::new(0.0, 1.0);
        assert!(orientation(a, b, c) < 0.0, "ccw triple must be negative");
        assert!(orientation(a, c, b) > 0.0, "cw triple must be positive");
        assert_eq!(orientation(a, b, Point::new(2.0, 0.0)), 0.0);
    }

    #[test]
    fn in_circle_signs() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        let c = Point::new(0.0, 1.0);
        // Circumcircle of the right triangle has center (0.5, 0.5).
        assert!(in_circle(Point::new(0.9, 0.9), a, b, c) > 0.0);
        assert!(in_circle(Point::new(2.0, 2.0), a, b, c) < 0.0);
        assert_eq!(in_circle(Point::new(1.0, 1.0), a, b, c), 0.0);
    }

    #[test]
    fn segment_tests() {
        let m = [Point::new(0.0, 0.0), Point::new(2.0, 0.0)];
        assert!(in_segment(m, Point::new(1.0, 0.0)));
        assert!(in_segment(m, Point::new(2.0, 0.0)));
        assert!(!in_segment(m, Point::new(3.0, 0.0)));
        assert!(!in_segment(m, Point::new(1.0, 0.1)));

        let n = [Point::new(1.0, -1.0), Point::new(1.0, 1.0)];
        assert!(segments_intersect(m, n));
        let far = [Point::new(3.0, -1.0), Point::new(3.0, 1.0)];
        assert!(!segments_intersect(m, far));
        // Collinear overlap falls back to the on-segment test.
        let shifted = [Point::new(1.0, 0.0), Point::new(4.0, 0.0)];
        assert!(segments_intersect(m, shifted));
    }

    #[test]
    fn rect_bounding_and_containment() {
        let points = [
            Point::new(-1.0, 2.0),
            Point::new(3.0, -4.0),
            Point::new(0.0, 0.0),
        ];
        let rect = Rect::bounding(&points).unwrap();
        assert_eq!(rect, Rect::new(-1.0, 2.0, 3.0, -4.0));
        assert!(rect.contains(Point::new(3.0, 2.0)));
        assert!(!rect.contains(Point::new(3.1, 0.0)));
        assert_eq!(rect.padded(1.0), Rect::new(-2.0, 3.0, 4.0, -5.0));
        assert!(Rect::bounding(&[]).is_none());
    }
}
