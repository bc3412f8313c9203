use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Measured pixel size of a mount surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn validate(self) -> ChartResult<Self> {
        if !self.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.width,
                height: self.height,
            });
        }
        Ok(self)
    }
}

/// Requested chart size relative to the host container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Share of the container extent, `100.0` meaning the full extent.
    Percent(f64),
    /// Fixed size in pixels, clamped to the container.
    Px(f64),
}

impl Default for Dimension {
    fn default() -> Self {
        Self::Percent(100.0)
    }
}

impl Dimension {
    /// Resolves this dimension against a container extent in pixels.
    #[must_use]
    pub fn resolve(self, container_px: u32) -> u32 {
        let container = f64::from(container_px);
        let resolved = match self {
            Self::Percent(percent) if percent.is_finite() => container * percent / 100.0,
            Self::Px(px) if px.is_finite() => px.min(container),
            _ => container,
        };
        resolved.clamp(0.0, container).round() as u32
    }
}

/// Resolves requested dimensions against the measured container.
#[must_use]
pub fn resolve_viewport(container: Viewport, width: Dimension, height: Dimension) -> Viewport {
    Viewport::new(width.resolve(container.width), height.resolve(container.height))
}

/// Visual encoding selected for one chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    /// Vertical columns over a categorical X axis.
    Column,
    /// Zero-tension polylines over a categorical X axis.
    Line,
    /// Horizontal bars over a categorical Y axis.
    Bar,
}

impl ChartType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Column => "column",
            Self::Line => "line",
            Self::Bar => "bar",
        }
    }

    /// Name given to the implicit series when no descriptors are supplied.
    #[must_use]
    pub const fn implicit_series_name(self) -> &'static str {
        match self {
            Self::Column => "ColumnSeries",
            Self::Line => "LineSeries",
            Self::Bar => "BarSeries",
        }
    }

    #[must_use]
    pub const fn supports_multiple_series(self) -> bool {
        !matches!(self, Self::Bar)
    }
}

impl std::str::FromStr for ChartType {
    type Err = ChartError;

    fn from_str(value: &str) -> ChartResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "column" => Ok(Self::Column),
            "line" => Ok(Self::Line),
            "bar" => Ok(Self::Bar),
            other => Err(ChartError::InvalidData(format!(
                "unsupported chart type `{other}`"
            ))),
        }
    }
}

/// Axis-aligned rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn right(self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn contains(self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    #[must_use]
    pub fn is_drawable(self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::{ChartType, Dimension, Viewport, resolve_viewport};

    #[test]
    fn percent_and_fixed_dimensions_resolve_against_container() {
        let container = Viewport::new(800, 400);
        let viewport = resolve_viewport(container, Dimension::Percent(50.0), Dimension::Px(300.0));
        assert_eq!(viewport, Viewport::new(400, 300));

        let clamped = resolve_viewport(container, Dimension::Px(2_000.0), Dimension::default());
        assert_eq!(clamped, Viewport::new(800, 400));
    }

    #[test]
    fn chart_type_parses_case_insensitively() {
        assert_eq!("Bar".parse::<ChartType>().expect("bar"), ChartType::Bar);
        assert!("pie".parse::<ChartType>().is_err());
    }
}
