// Convex hulls, hull padding and point containment. Pure geometry, no
// rendering dependency.

use super::Point;
use std::cmp::Ordering;

fn cross(o: Point, a: Point, b: Point) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn distance_sq(a: Point, b: Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dx * dx + dy * dy
}

/// Graham scan. Inputs with fewer than 3 points come back unchanged.
///
/// The pivot is the point with minimum `y` (then minimum `x`); the rest are
/// swept in polar-angle order and any vertex that does not make a strict left
/// turn is popped, so collinear points never survive.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut pivot_idx = 0;
    for (idx, p) in points.iter().enumerate().skip(1) {
        let pivot = points[pivot_idx];
        if p.y < pivot.y || (p.y == pivot.y && p.x < pivot.x) {
            pivot_idx = idx;
        }
    }
    let pivot = points[pivot_idx];

    let mut sorted: Vec<Point> = points
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != pivot_idx)
        .map(|(_, p)| *p)
        .collect();
    sorted.sort_by(|a, b| {
        let angle_a = (a.y - pivot.y).atan2(a.x - pivot.x);
        let angle_b = (b.y - pivot.y).atan2(b.x - pivot.x);
        angle_a
            .partial_cmp(&angle_b)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                distance_sq(pivot, *a)
                    .partial_cmp(&distance_sq(pivot, *b))
                    .unwrap_or(Ordering::Equal)
            })
    });

    let mut hull: Vec<Point> = Vec::with_capacity(sorted.len() + 1);
    hull.push(pivot);
    for p in sorted {
        while hull.len() > 1 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    hull
}

/// Vertex average of a polygon; `None` when empty.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let (sx, sy) = points
        .iter()
        .fold((0.0f32, 0.0f32), |(sx, sy), p| (sx + p.x, sy + p.y));
    let n = points.len() as f32;
    Some(Point::new(sx / n, sy / n))
}

/// Scales every vertex away from the centroid by `1 + padding`.
pub fn pad_hull(hull: &[Point], padding: f32) -> Vec<Point> {
    if hull.len() < 3 {
        return hull.to_vec();
    }
    let Some(center) = centroid(hull) else {
        return hull.to_vec();
    };
    let factor = 1.0 + padding;
    hull.iter()
        .map(|p| {
            Point::new(
                center.x + (p.x - center.x) * factor,
                center.y + (p.y - center.y) * factor,
            )
        })
        .collect()
}

/// Even-odd ray casting. Polygons with fewer than 3 vertices contain nothing.
pub fn point_in_polygon(polygon: &[Point], point: Point) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = polygon[i];
        let pj = polygon[j];
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Samples `samples` points evenly on a circle.
pub fn circle_points(center: Point, radius: f32, samples: usize) -> Vec<Point> {
    let samples = samples.max(3);
    (0..samples)
        .map(|i| {
            let angle = i as f32 / samples as f32 * std::f32::consts::TAU;
            Point::new(
                center.x + angle.cos() * radius,
                center.y + angle.sin() * radius,
            )
        })
        .collect()
}

/// Straight-edged closed path (`M x,y L … Z`).
pub fn polygon_path(points: &[Point]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let body = points
        .iter()
        .map(|p| format!("{:.2},{:.2}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" L ");
    format!("M {body} Z")
}

/// Closed uniform cubic B-spline through the control polygon, as cubic
/// Bézier segments. Raw lasso samples stay untouched; only the drawing is
/// smoothed.
pub fn closed_basis_path(points: &[Point]) -> String {
    match points.len() {
        0 => String::new(),
        1 => format!("M{:.2},{:.2}Z", points[0].x, points[0].y),
        2 => {
            let (a, b) = (points[0], points[1]);
            format!(
                "M{:.2},{:.2}L{:.2},{:.2}Z",
                (a.x + 2.0 * b.x) / 3.0,
                (a.y + 2.0 * b.y) / 3.0,
                (b.x + 2.0 * a.x) / 3.0,
                (b.y + 2.0 * a.y) / 3.0
            )
        }
        n => {
            let at = |i: usize| points[i % n];
            let knot = |i: usize| {
                let (p0, p1, p2) = (at(i + n - 1), at(i), at(i + 1));
                Point::new(
                    (p0.x + 4.0 * p1.x + p2.x) / 6.0,
                    (p0.y + 4.0 * p1.y + p2.y) / 6.0,
                )
            };
            let start = knot(0);
            let mut d = format!("M{:.2},{:.2}", start.x, start.y);
            for i in 0..n {
                let (p1, p2) = (at(i), at(i + 1));
                let end = knot(i + 1);
                d.push_str(&format!(
                    "C{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}",
                    (2.0 * p1.x + p2.x) / 3.0,
                    (2.0 * p1.y + p2.y) / 3.0,
                    (p1.x + 2.0 * p2.x) / 3.0,
                    (p1.y + 2.0 * p2.y) / 3.0,
                    end.x,
                    end.y
                ));
            }
            d.push('Z');
            d
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f32, f32)]) -> Vec<Point> {
        raw.iter().copied().map(Point::from).collect()
    }

    fn on_or_inside(hull: &[Point], p: Point) -> bool {
        let n = hull.len();
        (0..n).all(|i| cross(hull[i], hull[(i + 1) % n], p) >= -1e-3)
    }

    #[test]
    fn hull_of_short_input_is_unchanged() {
        let input = pts(&[(0.0, 0.0), (5.0, 5.0)]);
        assert_eq!(convex_hull(&input), input);
    }

    #[test]
    fn hull_drops_interior_and_collinear_points() {
        let input = pts(&[
            (0.0, 0.0),
            (5.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (5.0, 5.0),
            (0.0, 5.0),
        ]);
        let hull = convex_hull(&input);
        assert_eq!(hull.len(), 4, "{hull:?}");
        assert_eq!(hull[0], Point::new(0.0, 0.0));
        assert!(!hull.contains(&Point::new(5.0, 0.0)));
        assert!(!hull.contains(&Point::new(5.0, 5.0)));
    }

    #[test]
    fn hull_encloses_every_input_point() {
        let input = pts(&[
            (3.0, 1.0),
            (7.5, 2.0),
            (9.0, 6.0),
            (6.0, 9.5),
            (1.0, 7.0),
            (4.0, 4.0),
            (6.0, 5.0),
            (2.0, 3.0),
            (8.0, 8.0),
        ]);
        let hull = convex_hull(&input);
        assert!(hull.len() >= 3);
        for p in &input {
            assert!(on_or_inside(&hull, *p), "{p:?} outside {hull:?}");
        }
    }

    #[test]
    fn duplicated_pivot_does_not_survive() {
        let input = pts(&[(0.0, 0.0), (0.0, 0.0), (4.0, 0.0), (2.0, 3.0)]);
        let hull = convex_hull(&input);
        assert_eq!(hull.len(), 3, "{hull:?}");
    }

    #[test]
    fn pad_hull_scales_from_centroid() {
        let square = pts(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
        let padded = pad_hull(&square, 0.5);
        assert_eq!(padded[0], Point::new(-0.5, -0.5));
        assert_eq!(padded[2], Point::new(2.5, 2.5));
        assert_eq!(pad_hull(&square[..2], 0.5), square[..2].to_vec());
    }

    #[test]
    fn larger_padding_encloses_smaller() {
        let hull = convex_hull(&pts(&[(0.0, 0.0), (6.0, 1.0), (4.0, 5.0), (-1.0, 3.0)]));
        let inner = pad_hull(&hull, 0.1);
        let outer = pad_hull(&hull, 0.4);
        for p in &inner {
            assert!(point_in_polygon(&outer, *p), "{p:?} not inside outer hull");
        }
    }

    #[test]
    fn point_in_polygon_square() {
        let square = pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        assert!(point_in_polygon(&square, Point::new(5.0, 5.0)));
        assert!(!point_in_polygon(&square, Point::new(20.0, 20.0)));
        assert!(!point_in_polygon(&square[..2], Point::new(5.0, 5.0)));
    }

    #[test]
    fn centroid_is_inside_convex_polygons() {
        let polys = [
            pts(&[(0.0, 0.0), (4.0, 0.0), (2.0, 3.0)]),
            pts(&[(1.0, 1.0), (9.0, 2.0), (8.0, 7.0), (3.0, 8.0), (0.0, 4.0)]),
        ];
        for poly in polys {
            let c = centroid(&poly).unwrap();
            assert!(point_in_polygon(&poly, c));
        }
    }

    #[test]
    fn polygon_path_is_closed() {
        let path = polygon_path(&pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]));
        assert_eq!(path, "M 0.00,0.00 L 1.00,0.00 L 1.00,1.00 Z");
        assert!(polygon_path(&[]).is_empty());
    }

    #[test]
    fn basis_path_emits_one_curve_per_vertex() {
        let square = pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let d = closed_basis_path(&square);
        assert!(d.starts_with('M'));
        assert!(d.ends_with('Z'));
        assert_eq!(d.matches('C').count(), 4);
        assert!(closed_basis_path(&[]).is_empty());
    }

    #[test]
    fn circle_points_sit_on_radius() {
        let c = Point::new(3.0, 4.0);
        for p in circle_points(c, 5.0, 8) {
            assert!((distance_sq(c, p).sqrt() - 5.0).abs() < 1e-4);
        }
    }
}
