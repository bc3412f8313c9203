use serde::{Deserialize, Serialize};

use crate::api::chart_config::ValueAxisConfig;
use crate::core::ChartType;
use crate::core::ticks::{
    VALUE_AXIS_MAX_TICKS, VALUE_AXIS_MIN_TICKS, VALUE_AXIS_TARGET_SPACING_PX,
    axis_tick_target_count, nice_domain, nice_ticks,
};

/// Headroom factor applied to the largest bar value.
pub const BAR_AXIS_HEADROOM: f64 = 1.2;
/// Bar axis maximum used when no value is positive.
pub const BAR_AXIS_FALLBACK_MAX: f64 = 5.0;

/// Upper bound of the bar numeric axis: `1.2 × max`, or
/// [`BAR_AXIS_FALLBACK_MAX`] when every value is zero, negative, or absent.
#[must_use]
pub fn bar_axis_max(values: impl IntoIterator<Item = f64>) -> f64 {
    let max = values
        .into_iter()
        .filter(|value| value.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    if max.is_finite() && max > 0.0 {
        max * BAR_AXIS_HEADROOM
    } else {
        BAR_AXIS_FALLBACK_MAX
    }
}

/// Resolved numeric axis of one scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueDomain {
    pub min: f64,
    pub max: f64,
    pub ticks: Vec<f64>,
}

impl ValueDomain {
    /// Resolves the numeric axis for `chart_type` from every plotted value.
    ///
    /// Column and line axes start at `min(0, smallest value)` unless
    /// overridden and widen to nice ticks unless `strict`. Bar axes always
    /// start at zero and end at [`bar_axis_max`] unless `max` is overridden.
    #[must_use]
    pub fn resolve(
        chart_type: ChartType,
        values: &[f64],
        axis: &ValueAxisConfig,
        axis_span_px: f64,
    ) -> Self {
        let tick_count = axis_tick_target_count(
            axis_span_px,
            VALUE_AXIS_TARGET_SPACING_PX,
            VALUE_AXIS_MIN_TICKS,
            VALUE_AXIS_MAX_TICKS,
        );

        let (min, max) = match chart_type {
            ChartType::Bar => {
                let max = axis
                    .max
                    .filter(|max| max.is_finite() && *max > 0.0)
                    .unwrap_or_else(|| bar_axis_max(values.iter().copied()));
                (0.0, max)
            }
            ChartType::Column | ChartType::Line => {
                let (data_min, data_max) = finite_extent(values).unwrap_or((0.0, 0.0));
                let min = axis
                    .min
                    .filter(|min| min.is_finite())
                    .unwrap_or_else(|| data_min.min(0.0));
                let mut max = axis
                    .max
                    .filter(|max| max.is_finite())
                    .unwrap_or(data_max);
                if max <= min {
                    max = min + 1.0;
                }
                if axis.strict {
                    (min, max)
                } else {
                    nice_domain(min, max, tick_count)
                }
            }
        };

        Self {
            min,
            max,
            ticks: nice_ticks(min, max, tick_count),
        }
    }
}

fn finite_extent(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|value| value.is_finite())
        .fold(None, |extent, value| match extent {
            None => Some((value, value)),
            Some((low, high)) => Some((value.min(low), value.max(high))),
        })
}
