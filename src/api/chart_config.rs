use serde::{Deserialize, Serialize};

use crate::core::{ChartType, Dimension, NumberFormat, SeriesDescriptor};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{ClickCallback, ClickEvent};
use crate::render::Color;

/// Series color used when neither a descriptor nor the palette provides one.
pub const DEFAULT_SERIES_COLOR: Color = Color::rgb8(0x27, 0xCF, 0xA7);
/// Axis label color.
pub const AXIS_LABEL_COLOR: Color = Color::rgb8(0x66, 0x77, 0x97);
/// Placeholder message color.
pub const PLACEHOLDER_COLOR: Color = Color::rgb8(0xE6, 0x39, 0x46);

pub const DEFAULT_SERIES_LABEL_TEXT: &str = "{name}: {valueY}";

/// Numeric axis overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueAxisConfig {
    /// Lower bound; defaults to `min(0, smallest value)`. Ignored by bar
    /// charts, whose numeric axis always starts at zero.
    #[serde(default)]
    pub min: Option<f64>,
    /// Upper bound; defaults to the data maximum (bar charts: `1.2 × max`).
    #[serde(default)]
    pub max: Option<f64>,
    /// Keep the bounds exactly instead of widening them to nice ticks.
    #[serde(default)]
    pub strict: bool,
    /// Text appended to every axis tick label, e.g. `%`.
    #[serde(default)]
    pub label_suffix: String,
    #[serde(default = "default_true")]
    pub labels_visible: bool,
}

impl Default for ValueAxisConfig {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            strict: false,
            label_suffix: String::new(),
            labels_visible: true,
        }
    }
}

impl ValueAxisConfig {
    /// Strict percentage axis, `0..=100` with a `%` suffix.
    #[must_use]
    pub fn percentage() -> Self {
        Self {
            min: Some(0.0),
            max: Some(100.0),
            strict: true,
            label_suffix: "%".to_owned(),
            labels_visible: true,
        }
    }
}

/// Presentation options of one chart.
///
/// Every field is defaulted under serde so hosts can persist partial
/// configs. Two configs compare equal when every field matches and the
/// click callbacks are the same callback instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default)]
    pub width: Dimension,
    #[serde(default)]
    pub height: Dimension,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub legend_enabled: bool,
    #[serde(default = "default_true")]
    pub tooltip_enabled: bool,
    #[serde(default = "default_true")]
    pub show_value_labels: bool,
    #[serde(default)]
    pub show_line_bullets: bool,
    #[serde(default)]
    pub colors: Vec<Color>,
    /// Tooltip template of the implicit single series.
    #[serde(default)]
    pub label_text: Option<String>,
    /// Tooltip template of explicit series.
    #[serde(default = "default_series_label_text")]
    pub series_label_text: String,
    #[serde(default)]
    pub series: Vec<SeriesDescriptor>,
    #[serde(default)]
    pub value_axis: ValueAxisConfig,
    /// Hide value labels of bars whose value is zero or negative.
    #[serde(default = "default_true")]
    pub hide_zero_bar_labels: bool,
    /// Message drawn in the plot area when there are no records.
    #[serde(default)]
    pub empty_placeholder: Option<String>,
    #[serde(default)]
    pub number_format: NumberFormat,
    #[serde(skip)]
    pub on_click: Option<ClickCallback>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: Dimension::default(),
            height: Dimension::default(),
            title: None,
            legend_enabled: false,
            tooltip_enabled: true,
            show_value_labels: true,
            show_line_bullets: false,
            colors: Vec::new(),
            label_text: None,
            series_label_text: default_series_label_text(),
            series: Vec::new(),
            value_axis: ValueAxisConfig::default(),
            hide_zero_bar_labels: true,
            empty_placeholder: None,
            number_format: NumberFormat::default(),
            on_click: None,
        }
    }
}

impl ChartConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a persisted config.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse chart config: {e}")))
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize chart config: {e}")))
    }

    #[must_use]
    pub fn with_size(mut self, width: Dimension, height: Dimension) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_legend(mut self, enabled: bool) -> Self {
        self.legend_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_tooltips(mut self, enabled: bool) -> Self {
        self.tooltip_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_value_labels(mut self, enabled: bool) -> Self {
        self.show_value_labels = enabled;
        self
    }

    #[must_use]
    pub fn with_line_bullets(mut self, enabled: bool) -> Self {
        self.show_line_bullets = enabled;
        self
    }

    #[must_use]
    pub fn with_colors(mut self, colors: Vec<Color>) -> Self {
        self.colors = colors;
        self
    }

    #[must_use]
    pub fn with_label_text(mut self, template: impl Into<String>) -> Self {
        self.label_text = Some(template.into());
        self
    }

    #[must_use]
    pub fn with_series_label_text(mut self, template: impl Into<String>) -> Self {
        self.series_label_text = template.into();
        self
    }

    #[must_use]
    pub fn with_series(mut self, series: Vec<SeriesDescriptor>) -> Self {
        self.series = series;
        self
    }

    #[must_use]
    pub fn with_value_axis(mut self, value_axis: ValueAxisConfig) -> Self {
        self.value_axis = value_axis;
        self
    }

    #[must_use]
    pub fn with_hide_zero_bar_labels(mut self, hide: bool) -> Self {
        self.hide_zero_bar_labels = hide;
        self
    }

    #[must_use]
    pub fn with_empty_placeholder(mut self, message: impl Into<String>) -> Self {
        self.empty_placeholder = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_number_format(mut self, number_format: NumberFormat) -> Self {
        self.number_format = number_format;
        self
    }

    #[must_use]
    pub fn with_click_callback(mut self, callback: ClickCallback) -> Self {
        self.on_click = Some(callback);
        self
    }

    #[must_use]
    pub fn with_click_handler(self, callback: impl Fn(&ClickEvent) + 'static) -> Self {
        self.with_click_callback(ClickCallback::new(callback))
    }

    /// True when switching from `self` to `other` needs no rebuild.
    #[must_use]
    pub fn same_structure(&self, other: &Self) -> bool {
        self == other
    }

    /// Tooltip template of the implicit series for `chart_type`.
    #[must_use]
    pub fn implicit_label_text(&self, chart_type: ChartType) -> &str {
        match (&self.label_text, chart_type) {
            (Some(template), _) => template,
            (None, ChartType::Bar) => "{valueX}",
            (None, _) => "{valueY}",
        }
    }

    /// Colors validated for drawing; invalid palette entries are dropped.
    #[must_use]
    pub fn palette(&self) -> Vec<Color> {
        self.colors
            .iter()
            .copied()
            .filter(|color| color.validate().is_ok())
            .collect()
    }
}

fn default_true() -> bool {
    true
}

fn default_series_label_text() -> String {
    DEFAULT_SERIES_LABEL_TEXT.to_owned()
}

#[cfg(test)]
mod tests {
    use super::ChartConfig;

    #[test]
    fn partial_json_configs_fill_defaults() {
        let config = ChartConfig::from_json_str(
            r##"{"title":"BMI","colors":["#1E4D91"],"series":[{"field":"a","name":"A"}]}"##,
        )
        .expect("config");
        assert_eq!(config.title.as_deref(), Some("BMI"));
        assert!(config.tooltip_enabled);
        assert!(config.show_value_labels);
        assert!(config.hide_zero_bar_labels);
        assert_eq!(config.series_label_text, "{name}: {valueY}");
        assert_eq!(config.series.len(), 1);
    }

    #[test]
    fn callbacks_compare_by_identity() {
        let base = ChartConfig::new().with_click_handler(|_| {});
        let cloned = base.clone();
        let rebuilt = ChartConfig::new().with_click_handler(|_| {});
        assert!(base.same_structure(&cloned));
        assert!(!base.same_structure(&rebuilt));
    }
}
