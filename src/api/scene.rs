use serde::{Deserialize, Serialize};

use crate::api::chart_config::{AXIS_LABEL_COLOR, ChartConfig, PLACEHOLDER_COLOR};
use crate::api::label_template::{TemplateContext, format_label_template};
use crate::api::value_axis::ValueDomain;
use crate::api::{bar_scene, column_scene, line_scene};
use crate::core::layout::{
    AXIS_LABEL_FONT_SIZE_PX, AXIS_LABEL_GAP_PX, LEGEND_FONT_SIZE_PX, TITLE_FONT_SIZE_PX,
    estimate_label_text_width_px, place_box_near,
};
use crate::core::{
    CategoryScale, ChartType, LayoutRequest, LinearScale, PixelRange, PixelRect, PlotLayout,
    Record, RecordSchema, Viewport,
};
use crate::error::ChartResult;
use crate::interaction::{HitRegion, HoverTarget, InteractionState};
use crate::render::{
    CanvasLayerKind, Color, LinePrimitive, RectPrimitive, RenderFrame, TextHAlign, TextPrimitive,
};

/// Category labels wider than this wrap onto extra lines.
pub const CATEGORY_LABEL_MAX_WIDTH_PX: f64 = 92.0;
const CATEGORY_LABEL_MAX_LINES: usize = 3;
const LABEL_LINE_HEIGHT_FACTOR: f64 = 1.25;
const LEGEND_SWATCH_PX: f64 = 12.0;
const LEGEND_ENTRY_GAP_PX: f64 = 18.0;
const PLACEHOLDER_FONT_SIZE_PX: f64 = 16.0;
const TOOLTIP_FONT_SIZE_PX: f64 = 13.0;
const TOOLTIP_PADDING_PX: f64 = 6.0;
const TOOLTIP_OFFSET_PX: f64 = 8.0;

const GRID_COLOR: Color = Color::rgba(0.4, 0.467, 0.592, 0.3);
const TITLE_COLOR: Color = Color::rgb(0.12, 0.16, 0.22);
const TOOLTIP_FILL: Color = Color::rgba(0.12, 0.14, 0.19, 0.92);

/// Axis the cursor measures snapping distance along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapAxis {
    /// Categories run along X (column and line charts).
    X,
    /// Categories run along Y (bar charts).
    Y,
}

/// Data point the cursor may snap to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapPoint {
    pub series_index: usize,
    pub record_index: usize,
    pub category: String,
    pub value: f64,
    pub x: f64,
    pub y: f64,
}

/// Inputs of one scene build. Records and config are borrowed read-only.
#[derive(Debug, Clone, Copy)]
pub struct SceneInput<'a> {
    pub chart_type: ChartType,
    pub records: &'a [Record],
    pub schema: &'a RecordSchema,
    pub config: &'a ChartConfig,
    pub viewport: Viewport,
}

/// Geometry shared by the mark painters of one scene.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PlotContext<'a> {
    pub plot: PixelRect,
    pub categories: &'a CategoryScale,
    pub category_range: PixelRange,
    pub value_scale: LinearScale,
    pub value_range: PixelRange,
}

impl PlotContext<'_> {
    pub fn value_px(&self, value: f64) -> ChartResult<f64> {
        self.value_scale
            .domain_to_pixel_clamped(value, self.value_range)
    }

    /// Pixel of the zero line, pinned to the nearest domain edge when zero
    /// lies outside the axis.
    pub fn baseline_px(&self) -> ChartResult<f64> {
        let (start, end) = self.value_scale.domain();
        self.value_px(0.0_f64.clamp(start.min(end), start.max(end)))
    }
}

/// Output accumulated by the per-type mark painters.
#[derive(Debug, Default)]
pub(crate) struct MarkSink {
    pub regions: Vec<Vec<HitRegion>>,
    pub hover_targets: Vec<HoverTarget>,
    pub snap_points: Vec<SnapPoint>,
    pub drawn: Vec<bool>,
}

impl MarkSink {
    fn with_series(series_count: usize) -> Self {
        Self {
            regions: vec![Vec::new(); series_count],
            drawn: vec![false; series_count],
            ..Self::default()
        }
    }

    pub fn mark_drawn(&mut self, series_index: usize) {
        if let Some(flag) = self.drawn.get_mut(series_index) {
            *flag = true;
        }
    }
}

/// Fully resolved drawing of one chart plus its interactive geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub frame: RenderFrame,
    pub layout: PlotLayout,
    pub value_domain: Option<ValueDomain>,
    pub categories: CategoryScale,
    /// Click regions, indexed by series.
    pub regions: Vec<Vec<HitRegion>>,
    pub hover_targets: Vec<HoverTarget>,
    pub snap_points: Vec<SnapPoint>,
    pub snap_axis: SnapAxis,
    pub drawn_series: usize,
}

impl Scene {
    /// Blank scene for a surface that cannot be drawn on yet.
    #[must_use]
    pub fn empty(viewport: Viewport, chart_type: ChartType) -> Self {
        Self {
            frame: RenderFrame::new(viewport),
            layout: PlotLayout::resolve(viewport, LayoutRequest::default()),
            value_domain: None,
            categories: CategoryScale::new(Vec::<String>::new()),
            regions: Vec::new(),
            hover_targets: Vec::new(),
            snap_points: Vec::new(),
            snap_axis: snap_axis_for(chart_type),
            drawn_series: 0,
        }
    }

    pub fn build(input: &SceneInput<'_>) -> ChartResult<Self> {
        let viewport = input.viewport.validate()?;
        let config = input.config;
        let series_count = input.schema.series().len();
        let categories = CategoryScale::new(input.records.iter().map(|r| r.category().to_owned()))
            .with_inverted(input.chart_type == ChartType::Bar);
        let projected = input.schema.project(input.records);
        let values: Vec<f64> = projected.iter().flatten().flatten().copied().collect();

        let has_title = config.title.as_deref().is_some_and(|t| !t.trim().is_empty());
        let has_legend = config.legend_enabled && series_count > 0;
        let label_line_height = AXIS_LABEL_FONT_SIZE_PX * LABEL_LINE_HEIGHT_FACTOR;
        let axis_labels = config.value_axis.labels_visible;

        let (layout, value_domain) = match input.chart_type {
            ChartType::Column | ChartType::Line => {
                let wrapped_lines = categories
                    .categories()
                    .map(|category| {
                        wrap_label(category, CATEGORY_LABEL_MAX_WIDTH_PX, AXIS_LABEL_FONT_SIZE_PX)
                            .len()
                    })
                    .max()
                    .unwrap_or(1)
                    .clamp(1, CATEGORY_LABEL_MAX_LINES);
                let mut request = LayoutRequest {
                    has_title,
                    has_legend,
                    bottom_labels_height_px: AXIS_LABEL_GAP_PX
                        + wrapped_lines as f64 * label_line_height,
                    ..LayoutRequest::default()
                };
                let draft = PlotLayout::resolve(viewport, request);
                let domain = ValueDomain::resolve(
                    input.chart_type,
                    &values,
                    &config.value_axis,
                    draft.plot.height,
                );
                if axis_labels {
                    request.left_labels_width_px = widest_tick_label(&domain, config)
                        .map_or(0.0, |width| width + AXIS_LABEL_GAP_PX);
                }
                (PlotLayout::resolve(viewport, request), domain)
            }
            ChartType::Bar => {
                let widest_category = categories
                    .categories()
                    .map(|c| estimate_label_text_width_px(c, AXIS_LABEL_FONT_SIZE_PX))
                    .fold(0.0, f64::max);
                let request = LayoutRequest {
                    has_title,
                    has_legend,
                    left_labels_width_px: if widest_category > 0.0 {
                        widest_category + AXIS_LABEL_GAP_PX
                    } else {
                        0.0
                    },
                    bottom_labels_height_px: if axis_labels {
                        AXIS_LABEL_GAP_PX + label_line_height
                    } else {
                        0.0
                    },
                    right_overflow_px: if config.show_value_labels {
                        values
                            .iter()
                            .map(|value| {
                                estimate_label_text_width_px(
                                    &config.number_format.format(*value),
                                    AXIS_LABEL_FONT_SIZE_PX,
                                )
                            })
                            .fold(0.0, f64::max)
                    } else {
                        0.0
                    },
                    ..LayoutRequest::default()
                };
                let layout = PlotLayout::resolve(viewport, request);
                let domain = ValueDomain::resolve(
                    input.chart_type,
                    &values,
                    &config.value_axis,
                    layout.plot.width,
                );
                (layout, domain)
            }
        };

        let mut scene = Self {
            frame: RenderFrame::new(viewport),
            layout,
            value_domain: Some(value_domain.clone()),
            categories,
            regions: vec![Vec::new(); series_count],
            hover_targets: Vec::new(),
            snap_points: Vec::new(),
            snap_axis: snap_axis_for(input.chart_type),
            drawn_series: 0,
        };

        paint_title(&mut scene.frame, config, viewport, layout);
        if !layout.has_drawable_plot() {
            return Ok(scene);
        }

        let plot = layout.plot;
        let (category_range, value_range) = match input.chart_type {
            ChartType::Column | ChartType::Line => (
                PixelRange::new(plot.x, plot.right()),
                PixelRange::new(plot.bottom(), plot.y),
            ),
            ChartType::Bar => (
                PixelRange::new(plot.bottom(), plot.y),
                PixelRange::new(plot.x, plot.right()),
            ),
        };
        let context = PlotContext {
            plot,
            categories: &scene.categories,
            category_range,
            value_scale: LinearScale::new(value_domain.min, value_domain.max)?,
            value_range,
        };

        paint_grid_and_axes(&mut scene.frame, input.chart_type, &context, &value_domain, config)?;

        let mut sink = MarkSink::with_series(series_count);
        let paint = match input.chart_type {
            ChartType::Column => column_scene::paint,
            ChartType::Line => line_scene::paint,
            ChartType::Bar => bar_scene::paint,
        };
        paint(&mut scene.frame, &mut sink, input, &context, &projected)?;

        if has_legend {
            paint_legend(&mut scene.frame, input.schema, viewport, layout);
        }
        if input.records.is_empty() {
            paint_placeholder(&mut scene.frame, config, plot);
        }

        scene.drawn_series = sink.drawn.iter().filter(|drawn| **drawn).count();
        scene.regions = sink.regions;
        scene.hover_targets = if config.tooltip_enabled {
            sink.hover_targets
        } else {
            Vec::new()
        };
        scene.snap_points = sink.snap_points;
        Ok(scene)
    }
}

fn snap_axis_for(chart_type: ChartType) -> SnapAxis {
    match chart_type {
        ChartType::Column | ChartType::Line => SnapAxis::X,
        ChartType::Bar => SnapAxis::Y,
    }
}

/// Tooltip text of one data item for the series at `series_index`.
pub(crate) fn tooltip_text(
    input: &SceneInput<'_>,
    series_index: usize,
    category: &str,
    value: f64,
) -> String {
    let series_name = input
        .schema
        .series()
        .get(series_index)
        .map_or("", |series| series.name.as_str());
    let template = if input.schema.is_explicit() {
        input.config.series_label_text.as_str()
    } else {
        input.config.implicit_label_text(input.chart_type)
    };
    format_label_template(
        template,
        TemplateContext {
            category,
            value,
            series_name,
            number_format: input.config.number_format,
        },
    )
}

/// Greedy word wrap on estimated widths. Words wider than `max_width_px`
/// keep a line of their own.
#[must_use]
pub fn wrap_label(text: &str, max_width_px: f64, font_size_px: f64) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_owned()
        } else {
            format!("{current} {word}")
        };
        if current.is_empty()
            || estimate_label_text_width_px(&candidate, font_size_px) <= max_width_px
        {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_owned()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn tick_label(value: f64, config: &ChartConfig) -> String {
    format!(
        "{}{}",
        config.number_format.format(value),
        config.value_axis.label_suffix
    )
}

fn widest_tick_label(domain: &ValueDomain, config: &ChartConfig) -> Option<f64> {
    domain
        .ticks
        .iter()
        .map(|tick| {
            estimate_label_text_width_px(&tick_label(*tick, config), AXIS_LABEL_FONT_SIZE_PX)
        })
        .reduce(f64::max)
}

fn paint_title(
    frame: &mut RenderFrame,
    config: &ChartConfig,
    viewport: Viewport,
    layout: PlotLayout,
) {
    let (Some(title), Some(y)) = (config.title.as_deref(), layout.title_y) else {
        return;
    };
    frame.layer_mut(CanvasLayerKind::Legend).texts.push(
        TextPrimitive::new(
            title.trim(),
            f64::from(viewport.width) * 0.5,
            y,
            TITLE_FONT_SIZE_PX,
            TITLE_COLOR,
            TextHAlign::Center,
        )
        .bold(),
    );
}

fn paint_grid_and_axes(
    frame: &mut RenderFrame,
    chart_type: ChartType,
    context: &PlotContext<'_>,
    domain: &ValueDomain,
    config: &ChartConfig,
) -> ChartResult<()> {
    let plot = context.plot;
    let label_line_height = AXIS_LABEL_FONT_SIZE_PX * LABEL_LINE_HEIGHT_FACTOR;
    let labels_visible = config.value_axis.labels_visible;

    for tick in &domain.ticks {
        let pixel = context.value_px(*tick)?;
        let (grid, label) = match chart_type {
            ChartType::Column | ChartType::Line => (
                LinePrimitive::new(plot.x, pixel, plot.right(), pixel, 1.0, GRID_COLOR),
                TextPrimitive::new(
                    tick_label(*tick, config),
                    plot.x - AXIS_LABEL_GAP_PX,
                    pixel - AXIS_LABEL_FONT_SIZE_PX * 0.5,
                    AXIS_LABEL_FONT_SIZE_PX,
                    AXIS_LABEL_COLOR,
                    TextHAlign::Right,
                ),
            ),
            ChartType::Bar => (
                LinePrimitive::new(pixel, plot.y, pixel, plot.bottom(), 1.0, GRID_COLOR),
                TextPrimitive::new(
                    tick_label(*tick, config),
                    pixel,
                    plot.bottom() + AXIS_LABEL_GAP_PX,
                    AXIS_LABEL_FONT_SIZE_PX,
                    AXIS_LABEL_COLOR,
                    TextHAlign::Center,
                ),
            ),
        };
        frame
            .layer_mut(CanvasLayerKind::Grid)
            .lines
            .push(grid.dashed(4.0, 4.0));
        if labels_visible {
            frame.layer_mut(CanvasLayerKind::Axis).texts.push(label);
        }
    }

    for (index, category) in context.categories.categories().enumerate() {
        let Some(center) = context.categories.center(index, context.category_range) else {
            continue;
        };
        let axis = frame.layer_mut(CanvasLayerKind::Axis);
        match chart_type {
            ChartType::Column | ChartType::Line => {
                let lines =
                    wrap_label(category, CATEGORY_LABEL_MAX_WIDTH_PX, AXIS_LABEL_FONT_SIZE_PX);
                let visible_lines = lines.into_iter().take(CATEGORY_LABEL_MAX_LINES);
                for (line_index, line) in visible_lines.enumerate() {
                    axis.texts.push(TextPrimitive::new(
                        line,
                        center,
                        plot.bottom() + AXIS_LABEL_GAP_PX + line_index as f64 * label_line_height,
                        AXIS_LABEL_FONT_SIZE_PX,
                        AXIS_LABEL_COLOR,
                        TextHAlign::Center,
                    ));
                }
            }
            ChartType::Bar => {
                if category.is_empty() {
                    continue;
                }
                axis.texts.push(TextPrimitive::new(
                    category,
                    plot.x - AXIS_LABEL_GAP_PX,
                    center - AXIS_LABEL_FONT_SIZE_PX * 0.5,
                    AXIS_LABEL_FONT_SIZE_PX,
                    AXIS_LABEL_COLOR,
                    TextHAlign::Right,
                ));
            }
        }
    }
    Ok(())
}

fn paint_legend(
    frame: &mut RenderFrame,
    schema: &RecordSchema,
    viewport: Viewport,
    layout: PlotLayout,
) {
    let Some(y) = layout.legend_y else {
        return;
    };
    let entry_widths: Vec<f64> = schema
        .series()
        .iter()
        .map(|series| {
            LEGEND_SWATCH_PX
                + AXIS_LABEL_GAP_PX
                + estimate_label_text_width_px(&series.name, LEGEND_FONT_SIZE_PX)
        })
        .collect();
    let total = entry_widths.iter().sum::<f64>()
        + LEGEND_ENTRY_GAP_PX * entry_widths.len().saturating_sub(1) as f64;
    let mut x = ((f64::from(viewport.width) - total) * 0.5).max(0.0);

    let legend = frame.layer_mut(CanvasLayerKind::Legend);
    for (series, width) in schema.series().iter().zip(entry_widths) {
        legend.rects.push(
            RectPrimitive::new(
                x,
                y + (LEGEND_FONT_SIZE_PX - LEGEND_SWATCH_PX) * 0.5,
                LEGEND_SWATCH_PX,
                LEGEND_SWATCH_PX,
                series.color,
            )
            .with_corner_radius(2.0),
        );
        if !series.name.is_empty() {
            legend.texts.push(TextPrimitive::new(
                series.name.clone(),
                x + LEGEND_SWATCH_PX + AXIS_LABEL_GAP_PX,
                y,
                LEGEND_FONT_SIZE_PX,
                AXIS_LABEL_COLOR,
                TextHAlign::Left,
            ));
        }
        x += width + LEGEND_ENTRY_GAP_PX;
    }
}

fn paint_placeholder(frame: &mut RenderFrame, config: &ChartConfig, plot: PixelRect) {
    let Some(message) = config
        .empty_placeholder
        .as_deref()
        .map(str::trim)
        .filter(|message| !message.is_empty())
    else {
        return;
    };
    frame.layer_mut(CanvasLayerKind::ValueLabels).texts.push(
        TextPrimitive::new(
            message,
            plot.x + plot.width * 0.5,
            plot.y + (plot.height - PLACEHOLDER_FONT_SIZE_PX) * 0.5,
            PLACEHOLDER_FONT_SIZE_PX,
            PLACEHOLDER_COLOR,
            TextHAlign::Center,
        )
        .bold(),
    );
}

/// Repaints the cursor and tooltip layers of `frame` from `interaction`.
pub fn paint_pointer_overlay(
    frame: &mut RenderFrame,
    plot: PixelRect,
    snap_axis: SnapAxis,
    interaction: &InteractionState,
) {
    for kind in CanvasLayerKind::PAINT_ORDER {
        if kind.is_pointer_layer() {
            frame.clear_layer(kind);
        }
    }

    let cursor = &interaction.cursor;
    if cursor.visible && plot.is_drawable() && plot.contains(cursor.x, cursor.y) {
        let x = match (&cursor.snap, snap_axis) {
            (Some(snap), SnapAxis::X) => snap.x,
            _ => cursor.x,
        };
        frame.layer_mut(CanvasLayerKind::Cursor).lines.push(
            LinePrimitive::new(x, plot.y, x, plot.bottom(), 1.0, AXIS_LABEL_COLOR).dashed(4.0, 4.0),
        );
    }

    let Some(tooltip) = &interaction.tooltip else {
        return;
    };
    if tooltip.text.is_empty() {
        return;
    }
    let size = (
        estimate_label_text_width_px(&tooltip.text, TOOLTIP_FONT_SIZE_PX)
            + TOOLTIP_PADDING_PX * 2.0,
        TOOLTIP_FONT_SIZE_PX + TOOLTIP_PADDING_PX * 2.0,
    );
    let bounds = PixelRect::new(
        0.0,
        0.0,
        f64::from(frame.viewport.width),
        f64::from(frame.viewport.height),
    );
    let (x, y) = place_box_near(
        (tooltip.anchor_x, tooltip.anchor_y),
        size,
        TOOLTIP_OFFSET_PX,
        bounds,
    );
    let layer = frame.layer_mut(CanvasLayerKind::Tooltip);
    layer
        .rects
        .push(RectPrimitive::new(x, y, size.0, size.1, TOOLTIP_FILL).with_corner_radius(4.0));
    layer.texts.push(TextPrimitive::new(
        tooltip.text.clone(),
        x + TOOLTIP_PADDING_PX,
        y + TOOLTIP_PADDING_PX,
        TOOLTIP_FONT_SIZE_PX,
        Color::WHITE,
        TextHAlign::Left,
    ));
}
