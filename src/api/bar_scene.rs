use crate::api::scene::{MarkSink, PlotContext, SceneInput, SnapPoint, tooltip_text};
use crate::core::PixelRect;
use crate::error::ChartResult;
use crate::interaction::{HitRegion, HitShape, HoverTarget};
use crate::render::{CanvasLayerKind, RectPrimitive, RenderFrame, TextHAlign, TextPrimitive};

const BAR_THICKNESS_RATIO: f64 = 0.6;
const MIN_BAR_THICKNESS_PX: f64 = 10.0;
/// Distance between a bar end and its value label.
pub const BAR_LABEL_OFFSET_PX: f64 = 15.0;
const VALUE_LABEL_FONT_SIZE_PX: f64 = 13.0;

/// Whether the value label of a bar holding `value` is drawn.
#[must_use]
pub fn bar_label_visible(value: f64, hide_zero_labels: bool) -> bool {
    !(hide_zero_labels && value <= 0.0)
}

pub(crate) fn paint(
    frame: &mut RenderFrame,
    sink: &mut MarkSink,
    input: &SceneInput<'_>,
    context: &PlotContext<'_>,
    projected: &[Vec<Option<f64>>],
) -> ChartResult<()> {
    let config = input.config;
    let baseline = context.baseline_px()?;

    let series = input.schema.series();
    for (series_index, (resolved, values)) in series.iter().zip(projected).enumerate() {
        for (record_index, (record, value)) in input.records.iter().zip(values).enumerate() {
            let Some(value) = *value else {
                continue;
            };
            let category = record.category();
            let Some((low, high)) = context
                .categories
                .index_of(category)
                .and_then(|index| context.categories.band(index, context.category_range))
            else {
                continue;
            };

            let band = high - low;
            let thickness = (band * BAR_THICKNESS_RATIO)
                .max(MIN_BAR_THICKNESS_PX)
                .min(band);
            let center_y = (low + high) * 0.5;
            let end_x = context.value_px(value)?;
            let rect = PixelRect::new(
                baseline.min(end_x),
                center_y - thickness * 0.5,
                (end_x - baseline).abs(),
                thickness,
            );

            frame.layer_mut(CanvasLayerKind::Series).rects.push(RectPrimitive::new(
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                resolved.color,
            ));
            sink.mark_drawn(series_index);

            if config.show_value_labels && bar_label_visible(value, config.hide_zero_bar_labels) {
                frame
                    .layer_mut(CanvasLayerKind::ValueLabels)
                    .texts
                    .push(TextPrimitive::new(
                        config.number_format.format(value),
                        end_x + BAR_LABEL_OFFSET_PX,
                        center_y - VALUE_LABEL_FONT_SIZE_PX * 0.5,
                        VALUE_LABEL_FONT_SIZE_PX,
                        resolved.color,
                        TextHAlign::Left,
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
                anchor_x: end_x,
                anchor_y: center_y,
            });
            sink.snap_points.push(SnapPoint {
                series_index,
                record_index,
                category: category.to_owned(),
                value,
                x: end_x,
                y: center_y,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::bar_label_visible;

    #[test]
    fn zero_bar_labels_follow_the_toggle() {
        assert!(!bar_label_visible(0.0, true));
        assert!(bar_label_visible(0.0, false));
        assert!(bar_label_visible(3.0, true));
    }

    #[test]
    fn negative_bar_labels_are_hidden_with_zero_ones() {
        assert!(!bar_label_visible(-2.0, true));
        assert!(bar_label_visible(-2.0, false));
    }
}
