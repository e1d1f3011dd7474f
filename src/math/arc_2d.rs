/// 2D arc discretization and overlap utilities.
///
/// Arcs are described by a center, a radius and an [`ArcSpan`]: a start
/// angle plus a signed sweep (positive = counter-clockwise). Ranges along an
/// arc are expressed as *arc parameters*: the unsigned angular distance from
/// the arc start, in `[0, |sweep|]`.
use std::f64::consts::TAU;

use super::Point2;

/// Angular extent below which a range is ignored.
const ANGLE_EPS: f64 = 1e-9;

/// Angular range of an arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSpan {
    /// Start angle in radians.
    pub start: f64,
    /// Signed sweep in radians. Positive is counter-clockwise.
    pub sweep: f64,
}

impl ArcSpan {
    #[must_use]
    pub fn new(start: f64, sweep: f64) -> Self {
        Self { start, sweep }
    }

    /// Angle reached after travelling `u` radians from the start.
    #[must_use]
    pub fn angle_at(&self, u: f64) -> f64 {
        self.start + u * self.sweep.signum()
    }

    /// Arc parameter of an absolute angle, wrapped into `[0, TAU)`.
    #[must_use]
    pub fn param_of(&self, angle: f64) -> f64 {
        let raw = (angle - self.start) * self.sweep.signum();
        raw.rem_euclid(TAU)
    }

    /// Counter-clockwise interval `[lo, hi]` covered by the arc.
    fn ccw_interval(&self) -> (f64, f64) {
        if self.sweep >= 0.0 {
            (self.start, self.start + self.sweep)
        } else {
            (self.start + self.sweep, self.start)
        }
    }
}

/// Parts of an arc that are / are not covered by another arc.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArcOverlap {
    /// Covered ranges, as sorted, disjoint arc parameters.
    pub overlapping: Vec<(f64, f64)>,
    /// Uncovered ranges, as sorted, disjoint arc parameters.
    pub non_overlapping: Vec<(f64, f64)>,
}

/// Evaluates a point on a circle at an absolute angle.
#[must_use]
pub fn arc_point_at(center: &Point2, radius: f64, angle: f64) -> Point2 {
    Point2::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
}

/// Minimum number of segments approximating an arc within `tol`.
///
/// The sagitta of a chord spanning `θ` is `r (1 - cos(θ/2))`; the count is
/// the smallest `n` such that `|sweep| / n` keeps the sagitta under `tol`.
#[must_use]
pub fn get_discrete_count(radius: f64, sweep: f64, tol: f64) -> usize {
    if radius <= tol || sweep.abs() < ANGLE_EPS {
        return 1;
    }
    let max_step = 2.0 * (1.0 - tol / radius).clamp(-1.0, 1.0).acos();
    if max_step < ANGLE_EPS {
        return 1;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = (sweep.abs() / max_step).ceil() as usize;
    count.max(1)
}

/// Splits `arc` into the ranges covered and not covered by `other`.
///
/// Both arcs are assumed to lie on the same circle.
#[must_use]
pub fn overlap(arc: ArcSpan, other: ArcSpan) -> ArcOverlap {
    let length = arc.sweep.abs();
    let (a_lo, a_hi) = arc.ccw_interval();
    let (b_lo, b_hi) = other.ccw_interval();

    let mut covered: Vec<(f64, f64)> = Vec::new();
    for k in -2..=2 {
        let shift = f64::from(k) * TAU;
        let lo = a_lo.max(b_lo + shift);
        let hi = a_hi.min(b_hi + shift);
        if hi - lo <= ANGLE_EPS {
            continue;
        }
        let (u0, u1) = if arc.sweep >= 0.0 {
            (lo - arc.start, hi - arc.start)
        } else {
            (arc.start - hi, arc.start - lo)
        };
        covered.push((u0.clamp(0.0, length), u1.clamp(0.0, length)));
    }
    covered.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(covered.len());
    for range in covered {
        match merged.last_mut() {
            Some(last) if range.0 <= last.1 + ANGLE_EPS => last.1 = last.1.max(range.1),
            _ => merged.push(range),
        }
    }

    let mut non_overlapping = Vec::new();
    let mut cursor = 0.0;
    for &(lo, hi) in &merged {
        if lo - cursor > ANGLE_EPS {
            non_overlapping.push((cursor, lo));
        }
        cursor = hi;
    }
    if length - cursor > ANGLE_EPS {
        non_overlapping.push((cursor, length));
    }

    ArcOverlap {
        overlapping: merged,
        non_overlapping,
    }
}

/// Sample points of `mapping` whose arc parameter on `arc` lies strictly
/// inside `(from, to)`, ordered along `arc`.
///
/// The samples are the uniform subdivision of `mapping` at the resolution
/// required by `tol`, so two arcs discretized against the same mapping share
/// their interior points exactly.
#[must_use]
pub fn get_between_points(
    center: &Point2,
    radius: f64,
    arc: ArcSpan,
    mapping: ArcSpan,
    range: (f64, f64),
    tol: f64,
) -> Vec<Point2> {
    let count = get_discrete_count(radius, mapping.sweep, tol);
    #[allow(clippy::cast_precision_loss)]
    let step = mapping.sweep / count as f64;

    let mut samples: Vec<(f64, f64)> = (0..=count)
        .filter_map(|k| {
            #[allow(clippy::cast_precision_loss)]
            let angle = mapping.start + step * k as f64;
            let u = arc.param_of(angle);
            (u > range.0 + ANGLE_EPS && u < range.1 - ANGLE_EPS).then_some((u, angle))
        })
        .collect();
    samples.sort_by(|a, b| a.0.total_cmp(&b.0));
    samples
        .into_iter()
        .map(|(_, angle)| arc_point_at(center, radius, angle))
        .collect()
}

/// Discretizes an arc into a polyline from its start to its end point.
///
/// When a `mapping` arc on the same circle is supplied, the covered part of
/// the arc reuses the mapping's sample points so that two faces sharing a
/// curved boundary produce the same polyline.
#[must_use]
pub fn discrete_arc_2d(
    center: &Point2,
    radius: f64,
    arc: ArcSpan,
    mapping: Option<ArcSpan>,
    tol: f64,
) -> Vec<Point2> {
    let length = arc.sweep.abs();
    let mut points = vec![arc_point_at(center, radius, arc.start)];

    let Some(mapping) = mapping else {
        push_uniform(&mut points, center, radius, arc, (0.0, length), tol);
        points.push(arc_point_at(center, radius, arc.start + arc.sweep));
        return points;
    };

    let split = overlap(arc, mapping);
    let mut pieces: Vec<((f64, f64), bool)> = split
        .overlapping
        .iter()
        .map(|&r| (r, true))
        .chain(split.non_overlapping.iter().map(|&r| (r, false)))
        .collect();
    pieces.sort_by(|a, b| (a.0).0.total_cmp(&(b.0).0));

    for (i, &(range, covered)) in pieces.iter().enumerate() {
        if covered {
            points.extend(get_between_points(center, radius, arc, mapping, range, tol));
        } else {
            push_uniform(&mut points, center, radius, arc, range, tol);
        }
        let end = if i + 1 == pieces.len() {
            arc.start + arc.sweep
        } else {
            arc.angle_at(range.1)
        };
        points.push(arc_point_at(center, radius, end));
    }
    if pieces.is_empty() {
        points.push(arc_point_at(center, radius, arc.start + arc.sweep));
    }
    points
}

/// Pushes the interior points of a uniform subdivision of `range`.
fn push_uniform(
    points: &mut Vec<Point2>,
    center: &Point2,
    radius: f64,
    arc: ArcSpan,
    range: (f64, f64),
    tol: f64,
) {
    let span = range.1 - range.0;
    let count = get_discrete_count(radius, span, tol);
    for i in 1..count {
        #[allow(clippy::cast_precision_loss)]
        let u = range.0 + span * i as f64 / count as f64;
        points.push(arc_point_at(center, radius, arc.angle_at(u)));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const TOL: f64 = 1e-9;

    fn origin() -> Point2 {
        Point2::new(0.0, 0.0)
    }

    #[test]
    fn discrete_count_grows_with_precision() {
        let coarse = get_discrete_count(1.0, PI, 1e-2);
        let fine = get_discrete_count(1.0, PI, 1e-4);
        assert!(fine > coarse, "coarse={coarse} fine={fine}");
    }

    #[test]
    fn discrete_count_keeps_sagitta_under_tolerance() {
        let tol = 1e-3;
        let n = get_discrete_count(5.0, PI, tol);
        let step = PI / n as f64;
        let sagitta = 5.0 * (1.0 - (step / 2.0).cos());
        assert!(sagitta <= tol + TOL, "sagitta={sagitta}");
    }

    #[test]
    fn discrete_count_degenerate_inputs() {
        assert_eq!(get_discrete_count(1e-9, PI, 1e-3), 1);
        assert_eq!(get_discrete_count(1.0, 0.0, 1e-3), 1);
    }

    #[test]
    fn overlap_of_nested_arcs() {
        let arc = ArcSpan::new(0.0, PI);
        let other = ArcSpan::new(FRAC_PI_2, PI);
        let split = overlap(arc, other);
        assert_eq!(split.overlapping.len(), 1);
        let (lo, hi) = split.overlapping[0];
        assert!((lo - FRAC_PI_2).abs() < TOL, "lo={lo}");
        assert!((hi - PI).abs() < TOL, "hi={hi}");
        assert_eq!(split.non_overlapping.len(), 1);
        assert!((split.non_overlapping[0].1 - FRAC_PI_2).abs() < TOL);
    }

    #[test]
    fn overlap_handles_opposite_direction_and_wrap() {
        // Clockwise arc from 0 to -π/2 and a counter-clockwise arc from 3π/2 to 2π.
        let arc = ArcSpan::new(0.0, -FRAC_PI_2);
        let other = ArcSpan::new(3.0 * FRAC_PI_2, FRAC_PI_2);
        let split = overlap(arc, other);
        assert_eq!(split.overlapping.len(), 1);
        let (lo, hi) = split.overlapping[0];
        assert!(lo.abs() < TOL && (hi - FRAC_PI_2).abs() < TOL, "{lo} {hi}");
        assert!(split.non_overlapping.is_empty());
    }

    #[test]
    fn disjoint_arcs_do_not_overlap() {
        let split = overlap(ArcSpan::new(0.0, 0.5), ArcSpan::new(2.0, 0.5));
        assert!(split.overlapping.is_empty());
        assert_eq!(split.non_overlapping, vec![(0.0, 0.5)]);
    }

    #[test]
    fn discrete_arc_hits_both_endpoints() {
        let pts = discrete_arc_2d(&origin(), 2.0, ArcSpan::new(0.0, FRAC_PI_2), None, 1e-3);
        let first = pts.first().unwrap();
        let last = pts.last().unwrap();
        assert!((first.x - 2.0).abs() < TOL && first.y.abs() < TOL);
        assert!(last.x.abs() < TOL && (last.y - 2.0).abs() < TOL);
        for p in &pts {
            assert!((p.coords.norm() - 2.0).abs() < TOL);
        }
    }

    #[test]
    fn sub_arc_shares_mapping_samples() {
        let tol = 1e-3;
        let full = ArcSpan::new(0.0, PI);
        let part = ArcSpan::new(0.3, 1.9);
        let full_pts = discrete_arc_2d(&origin(), 3.0, full, None, tol);
        let part_pts = discrete_arc_2d(&origin(), 3.0, part, Some(full), tol);

        // Every interior point of the sub-arc is a sample of the full arc.
        for p in &part_pts[1..part_pts.len() - 1] {
            let shared = full_pts.iter().any(|q| (p - q).norm() < TOL);
            assert!(shared, "point {p:?} not shared with mapping");
        }
    }

    #[test]
    fn reversed_sub_arc_is_ordered_along_its_direction() {
        let full = ArcSpan::new(0.0, PI);
        let part = ArcSpan::new(2.5, -2.0);
        let pts = discrete_arc_2d(&origin(), 1.0, part, Some(full), 1e-3);
        let angles: Vec<f64> = pts.iter().map(|p| p.y.atan2(p.x)).collect();
        for pair in angles.windows(2) {
            assert!(pair[1] < pair[0], "angles not decreasing: {angles:?}");
        }
    }
}
