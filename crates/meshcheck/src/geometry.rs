use nalgebra::Point2;

/// The Euclidean length of the segment between two points.
pub fn segment_length(a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    nalgebra::distance(a, b)
}

/// The unsigned area of the triangle `a, b, c` from the shoelace determinant.
///
/// Collinear or coincident points give exactly `0.0`, which the area check
/// relies on, so keep the expanded form rather than a cross product of
/// differences.
pub fn triangle_area(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    0.5 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y)).abs()
}
