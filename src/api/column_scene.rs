use crate::api::scene::{MarkSink, PlotContext, SceneInput, SnapPoint, tooltip_text};
use crate::core::PixelRect;
use crate::error::ChartResult;
use crate::interaction::{HitRegion, HitShape, HoverTarget};
use crate::render::{CanvasLayerKind, RectPrimitive, RenderFrame, TextHAlign, TextPrimitive};

/// Share of a band covered by a single column.
const SINGLE_COLUMN_WIDTH_RATIO: f64 = 0.7;
/// Share of a band covered by a group of side-by-side columns.
const CLUSTER_WIDTH_RATIO: f64 = 0.8;
/// Share of its slot inside the group covered by each grouped column.
const CLUSTERED_COLUMN_WIDTH_RATIO: f64 = 0.8;
const VALUE_LABEL_FONT_SIZE_PX: f64 = 13.0;
const VALUE_LABEL_GAP_PX: f64 = 4.0;

/// Horizontal extent `(x, width)` of the column of `series_index` inside a
/// band `(low, high)`.
#[must_use]
pub fn column_slot(band: (f64, f64), series_index: usize, series_count: usize) -> (f64, f64) {
    let (low, high) = band;
    let band_width = high - low;
    if series_count <= 1 {
        let width = band_width * SINGLE_COLUMN_WIDTH_RATIO;
        return ((low + high - width) * 0.5, width);
    }
    let cluster = band_width * CLUSTER_WIDTH_RATIO;
    let slot = cluster / series_count as f64;
    let width = slot * CLUSTERED_COLUMN_WIDTH_RATIO;
    let cluster_start = low + (band_width - cluster) * 0.5;
    (
        cluster_start + slot * series_index as f64 + (slot - width) * 0.5,
        width,
    )
}

pub(crate) fn paint(
    frame: &mut RenderFrame,
    sink: &mut MarkSink,
    input: &SceneInput<'_>,
    context: &PlotContext<'_>,
    projected: &[Vec<Option<f64>>],
) -> ChartResult<()> {
    let series = input.schema.series();
    let baseline = context.baseline_px()?;

    for (series_index, (resolved, values)) in series.iter().zip(projected).enumerate() {
        for (record_index, (record, value)) in input.records.iter().zip(values).enumerate() {
            let Some(value) = *value else {
                continue;
            };
            let category = record.category();
            let Some(band) = context
                .categories
                .index_of(category)
                .and_then(|index| context.categories.band(index, context.category_range))
            else {
                continue;
            };

            let (x, width) = column_slot(band, series_index, series.len());
            let value_px = context.value_px(value)?;
            let top = value_px.min(baseline);
            let rect = PixelRect::new(x, top, width, (value_px - baseline).abs());
            let center_x = x + width * 0.5;

            frame.layer_mut(CanvasLayerKind::Series).rects.push(RectPrimitive::new(
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                resolved.color,
            ));
            sink.mark_drawn(series_index);

            if input.config.show_value_labels {
                let label_y = if value >= 0.0 {
                    value_px - VALUE_LABEL_GAP_PX - VALUE_LABEL_FONT_SIZE_PX
                } else {
                    value_px + VALUE_LABEL_GAP_PX
                };
                frame
                    .layer_mut(CanvasLayerKind::ValueLabels)
                    .texts
                    .push(TextPrimitive::new(
                        input.config.number_format.format(value),
                        center_x,
                        label_y,
                        VALUE_LABEL_FONT_SIZE_PX,
                        resolved.color,
                        TextHAlign::Center,
                    ));
            }

            sink.regions[series_index].push(HitRegion {
                shape: HitShape::Rect(rect),
                series_index,
                record_index,
                category: category.to_owned(),
                value,
            });
            sink.hover_targets.push(HoverTarget {
                shape: HitShape::Rect(rect),
                series_index,
                record_index,
                text: tooltip_text(input, series_index, category, value),
                anchor_x: center_x,
                anchor_y: value_px,
            });
            sink.snap_points.push(SnapPoint {
                series_index,
                record_index,
                category: category.to_owned(),
                value,
                x: center_x,
                y: value_px,
            });
        }
    }
    Ok(())
}
