use ordered_float::OrderedFloat;
use smallvec::SmallVec;

use crate::api::scene::{SnapAxis, SnapPoint};

/// Nearest snap point among `allowed_series` only.
///
/// Distance is measured along the category axis; ties go to the point
/// closest on the value axis, then to the earlier series.
#[must_use]
pub fn nearest_snap<'a>(
    points: &'a [SnapPoint],
    allowed_series: &[usize],
    axis: SnapAxis,
    pointer_x: f64,
    pointer_y: f64,
) -> Option<&'a SnapPoint> {
    let mut candidates: SmallVec<[(OrderedFloat<f64>, OrderedFloat<f64>, &SnapPoint); 4]> =
        SmallVec::new();
    for series_index in allowed_series {
        if let Some(best) = nearest_in_series(points, *series_index, axis, pointer_x, pointer_y) {
            candidates.push(best);
        }
    }

    candidates
        .into_iter()
        .min_by_key(|(primary, secondary, _)| (*primary, *secondary))
        .map(|(_, _, point)| point)
}

fn nearest_in_series(
    points: &[SnapPoint],
    series_index: usize,
    axis: SnapAxis,
    pointer_x: f64,
    pointer_y: f64,
) -> Option<(OrderedFloat<f64>, OrderedFloat<f64>, &SnapPoint)> {
    let mut best: Option<(OrderedFloat<f64>, OrderedFloat<f64>, &SnapPoint)> = None;
    for point in points.iter().filter(|p| p.series_index == series_index) {
        let (dx, dy) = ((point.x - pointer_x).abs(), (point.y - pointer_y).abs());
        let (primary, secondary) = match axis {
            SnapAxis::X => (OrderedFloat(dx), OrderedFloat(dy)),
            SnapAxis::Y => (OrderedFloat(dy), OrderedFloat(dx)),
        };
        let better = best.is_none_or(|(best_primary, best_secondary, _)| {
            (primary, secondary) < (best_primary, best_secondary)
        });
        if better {
            best = Some((primary, secondary, point));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::nearest_snap;
    use crate::api::scene::{SnapAxis, SnapPoint};

    fn point(series_index: usize, x: f64, y: f64) -> SnapPoint {
        SnapPoint {
            series_index,
            record_index: 0,
            category: "X".to_owned(),
            value: 1.0,
            x,
            y,
        }
    }

    #[test]
    fn snapping_ignores_series_outside_the_allowed_set() {
        let points = [point(0, 100.0, 50.0), point(1, 12.0, 50.0)];
        let snap = nearest_snap(&points, &[0], SnapAxis::X, 10.0, 50.0).expect("snap");
        assert_eq!(snap.series_index, 0);
        assert!(nearest_snap(&points, &[], SnapAxis::X, 10.0, 50.0).is_none());
    }

    #[test]
    fn value_axis_distance_breaks_ties() {
        let points = [point(0, 50.0, 10.0), point(1, 50.0, 90.0)];
        let snap = nearest_snap(&points, &[0, 1], SnapAxis::X, 50.0, 80.0).expect("snap");
        assert_eq!(snap.series_index, 1);
        let snap = nearest_snap(&points, &[0, 1], SnapAxis::Y, 52.0, 12.0).expect("snap");
        assert_eq!(snap.series_index, 0);
    }
}
