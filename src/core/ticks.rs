//! Value-axis tick selection.

pub const VALUE_AXIS_TARGET_SPACING_PX: f64 = 48.0;
pub const VALUE_AXIS_MIN_TICKS: usize = 2;
pub const VALUE_AXIS_MAX_TICKS: usize = 11;

/// Number of ticks that fit `axis_span_px` at roughly `target_spacing_px`.
#[must_use]
pub fn axis_tick_target_count(
    axis_span_px: f64,
    target_spacing_px: f64,
    min_ticks: usize,
    max_ticks: usize,
) -> usize {
    if !axis_span_px.is_finite() || axis_span_px <= 0.0 {
        return min_ticks;
    }
    if !target_spacing_px.is_finite() || target_spacing_px <= 0.0 {
        return min_ticks;
    }

    let raw = (axis_span_px / target_spacing_px).floor() as usize + 1;
    raw.clamp(min_ticks, max_ticks)
}

/// Step from the 1-2-5 ladder that splits `span` into about
/// `target_count - 1` intervals.
#[must_use]
pub fn nice_step(span: f64, target_count: usize) -> f64 {
    if !span.is_finite() || span <= 0.0 {
        return 1.0;
    }
    let intervals = target_count.saturating_sub(1).max(1) as f64;
    let raw = span / intervals;
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Extends `(min, max)` outward to multiples of a nice step.
#[must_use]
pub fn nice_domain(min: f64, max: f64, target_count: usize) -> (f64, f64) {
    let step = nice_step(max - min, target_count);
    let nice_min = (min / step).floor() * step;
    let nice_max = (max / step).ceil() * step;
    (normalize_zero(nice_min), normalize_zero(nice_max))
}

/// Tick values on nice-step multiples inside `[min, max]`.
#[must_use]
pub fn nice_ticks(min: f64, max: f64, target_count: usize) -> Vec<f64> {
    if !min.is_finite() || !max.is_finite() || max <= min || target_count == 0 {
        return Vec::new();
    }

    let step = nice_step(max - min, target_count);
    let first = (min / step).ceil();
    let last = (max / step).floor();
    if last < first {
        return Vec::new();
    }

    let count = (last - first) as usize + 1;
    (0..count)
        .map(|offset| normalize_zero((first + offset as f64) * step))
        .collect()
}

fn normalize_zero(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

#[cfg(test)]
mod tests {
    use super::{axis_tick_target_count, nice_domain, nice_step, nice_ticks};

    #[test]
    fn steps_follow_one_two_five_ladder() {
        assert_eq!(nice_step(10.0, 6), 2.0);
        assert_eq!(nice_step(24.0, 6), 5.0);
        assert_eq!(nice_step(1_000.0, 3), 500.0);
    }

    #[test]
    fn ticks_cover_the_domain_on_step_multiples() {
        assert_eq!(
            nice_ticks(0.0, 24.0, 6),
            vec![0.0, 5.0, 10.0, 15.0, 20.0]
        );
        assert_eq!(nice_domain(0.0, 23.0, 6), (0.0, 25.0));
        assert_eq!(nice_domain(-3.0, 8.0, 6), (-5.0, 10.0));
    }

    #[test]
    fn tick_count_respects_bounds() {
        assert_eq!(axis_tick_target_count(0.0, 48.0, 2, 11), 2);
        assert_eq!(axis_tick_target_count(480.0, 48.0, 2, 11), 11);
        assert_eq!(axis_tick_target_count(100.0, 48.0, 2, 11), 3);
    }
}
