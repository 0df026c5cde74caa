use georef_linalg::{DenseMatrix, Point2D};
use serde::{Deserialize, Serialize};

/// A correspondence between a source point and its target location.
///
/// The source ("from") is usually an image pixel and the target ("to") a
/// position in Web-Mercator meters. Serialized as `[to_x, to_y, from_x, from_y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct TiePoint {
    to: Point2D,
    from: Point2D,
}

impl TiePoint {
    /// Create a tie point mapping `from` onto `to`.
    pub const fn new(to: Point2D, from: Point2D) -> Self {
        Self { to, from }
    }

    /// The target location.
    pub fn target(&self) -> Point2D {
        self.to
    }

    /// The source location.
    pub fn source(&self) -> Point2D {
        self.from
    }
}

impl From<[f64; 4]> for TiePoint {
    fn from(v: [f64; 4]) -> Self {
        Self::new(Point2D::new(v[0], v[1]), Point2D::new(v[2], v[3]))
    }
}

impl From<TiePoint> for [f64; 4] {
    fn from(t: TiePoint) -> Self {
        [t.to.x, t.to.y, t.from.x, t.from.y]
    }
}

/// Split tie points into the target and source point matrices.
///
/// Both matrices have shape (2, N): row 0 holds the x and row 1 the y
/// coordinates, so [`DenseMatrix::flatten`] yields `[x0..xn, y0..yn]`.
pub fn split_points(points: &[TiePoint]) -> (DenseMatrix, DenseMatrix) {
    let n = points.len();
    let mut to = DenseMatrix::zeros(2, n);
    let mut from = DenseMatrix::zeros(2, n);
    for (i, p) in points.iter().enumerate() {
        to[(0, i)] = p.to.x;
        to[(1, i)] = p.to.y;
        from[(0, i)] = p.from.x;
        from[(1, i)] = p.from.y;
    }
    (to, from)
}

/// Columns of a (2, N) point matrix.
pub(crate) fn matrix_points(m: &DenseMatrix) -> Vec<Point2D> {
    (0..m.cols())
        .map(|i| Point2D::new(m[(0, i)], m[(1, i)]))
        .collect()
}

/// Lay points out as `[x0..xn, y0..yn]`, the order of a flattened (2, N) matrix.
pub(crate) fn flatten_points(points: &[Point2D]) -> Vec<f64> {
    points
        .iter()
        .map(|p| p.x)
        .chain(points.iter().map(|p| p.y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_points() {
        let points = [
            TiePoint::from([10.0, 20.0, 1.0, 2.0]),
            TiePoint::from([30.0, 40.0, 3.0, 4.0]),
            TiePoint::from([50.0, 60.0, 5.0, 6.0]),
        ];
        let (to, from) = split_points(&points);
        assert_eq!(to.shape(), (2, 3));
        assert_eq!(to.as_slice(), &[10.0, 30.0, 50.0, 20.0, 40.0, 60.0]);
        assert_eq!(from.as_slice(), &[1.0, 3.0, 5.0, 2.0, 4.0, 6.0]);

        // predictions laid out point-wise line up with the flattened targets
        assert_eq!(flatten_points(&matrix_points(&to)), to.flatten().as_slice());
    }

    #[test]
    fn test_tie_point_json() -> Result<(), serde_json::Error> {
        let points: Vec<TiePoint> = serde_json::from_str("[[100.5, -20.0, 3.0, 4.0]]")?;
        assert_eq!(points[0].target(), Point2D::new(100.5, -20.0));
        assert_eq!(points[0].source(), Point2D::new(3.0, 4.0));
        assert_eq!(serde_json::to_string(&points)?, "[[100.5,-20.0,3.0,4.0]]");
        Ok(())
    }
}
