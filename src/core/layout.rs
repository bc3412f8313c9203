use serde::{Deserialize, Serialize};

use crate::core::{PixelRect, Viewport};

pub const OUTER_PADDING_PX: f64 = 10.0;
pub const RIGHT_PADDING_PX: f64 = 20.0;
pub const TITLE_FONT_SIZE_PX: f64 = 20.0;
pub const TITLE_BAND_PX: f64 = 32.0;
pub const LEGEND_FONT_SIZE_PX: f64 = 13.0;
pub const LEGEND_BAND_PX: f64 = 28.0;
pub const AXIS_LABEL_FONT_SIZE_PX: f64 = 14.0;
pub const AXIS_LABEL_GAP_PX: f64 = 6.0;

/// Width of `text` at `font_size_px`, estimated without a font backend so
/// layout stays deterministic across renderers.
#[must_use]
pub fn estimate_label_text_width_px(text: &str, font_size_px: f64) -> f64 {
    let units = text.chars().fold(0.0, |acc, ch| {
        acc + match ch {
            '0'..='9' => 0.62,
            '.' | ',' => 0.34,
            '-' | '+' | '%' => 0.42,
            ' ' => 0.33,
            // Thai combining marks take no advance.
            '\u{0E31}' | '\u{0E34}'..='\u{0E3A}' | '\u{0E47}'..='\u{0E4E}' => 0.0,
            _ => 0.58,
        }
    });
    units * font_size_px
}

/// Space reserved around the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutRequest {
    pub has_title: bool,
    pub has_legend: bool,
    /// Width of the labels left of the plot (value labels, or categories for
    /// horizontal bars).
    pub left_labels_width_px: f64,
    /// Height of the label band below the plot.
    pub bottom_labels_height_px: f64,
    /// Room kept right of the plot for labels drawn beyond bar ends.
    pub right_overflow_px: f64,
}

/// Resolved regions of one chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotLayout {
    pub viewport: Viewport,
    pub plot: PixelRect,
    /// Top edge of the title text, when a title is drawn.
    pub title_y: Option<f64>,
    /// Top edge of the legend row, when a legend is drawn.
    pub legend_y: Option<f64>,
}

impl PlotLayout {
    #[must_use]
    pub fn resolve(viewport: Viewport, request: LayoutRequest) -> Self {
        let width = f64::from(viewport.width);
        let height = f64::from(viewport.height);

        let mut top = OUTER_PADDING_PX;
        let title_y = request.has_title.then(|| {
            let y = top;
            top += TITLE_BAND_PX;
            y
        });

        let mut bottom = height - OUTER_PADDING_PX;
        let legend_y = request.has_legend.then(|| {
            bottom -= LEGEND_BAND_PX;
            bottom + (LEGEND_BAND_PX - LEGEND_FONT_SIZE_PX) * 0.5
        });
        bottom -= request.bottom_labels_height_px.max(0.0);

        let left = OUTER_PADDING_PX + request.left_labels_width_px.max(0.0);
        let right = width - RIGHT_PADDING_PX - request.right_overflow_px.max(0.0);

        Self {
            viewport,
            plot: PixelRect::new(left, top, (right - left).max(0.0), (bottom - top).max(0.0)),
            title_y,
            legend_y,
        }
    }

    #[must_use]
    pub fn has_drawable_plot(&self) -> bool {
        self.plot.is_drawable()
    }
}

/// Places a box of `size` near `anchor`, flipping and clamping so it stays
/// inside `bounds`.
#[must_use]
pub fn place_box_near(
    anchor: (f64, f64),
    size: (f64, f64),
    offset_px: f64,
    bounds: PixelRect,
) -> (f64, f64) {
    let (width, height) = size;
    let mut x = anchor.0 - width * 0.5;
    let mut y = anchor.1 - height - offset_px;
    if y < bounds.y {
        y = anchor.1 + offset_px;
    }
    x = x.clamp(bounds.x, (bounds.right() - width).max(bounds.x));
    y = y.clamp(bounds.y, (bounds.bottom() - height).max(bounds.y));
    (x, y)
}
