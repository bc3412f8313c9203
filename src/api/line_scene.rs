use crate::api::scene::{MarkSink, PlotContext, SceneInput, SnapPoint, tooltip_text};
use crate::error::ChartResult;
use crate::interaction::{HitRegion, HitShape, HoverTarget};
use crate::render::{
    CanvasLayerKind, CirclePrimitive, Color, PolylinePrimitive, RenderFrame, TextHAlign,
    TextPrimitive,
};

pub const LINE_STROKE_WIDTH_PX: f64 = 2.0;
pub const BULLET_RADIUS_PX: f64 = 5.0;
const BULLET_STROKE_WIDTH_PX: f64 = 2.0;
const VALUE_LABEL_FONT_SIZE_PX: f64 = 13.0;
const VALUE_LABEL_GAP_PX: f64 = 4.0;

/// Splits a series into runs of consecutive present points. An absent value
/// ends the current run.
#[must_use]
pub fn split_segments(points: &[Option<(f64, f64)>]) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for point in points {
        match point {
            Some(point) => current.push(*point),
            None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

pub(crate) fn paint(
    frame: &mut RenderFrame,
    sink: &mut MarkSink,
    input: &SceneInput<'_>,
    context: &PlotContext<'_>,
    projected: &[Vec<Option<f64>>],
) -> ChartResult<()> {
    let config = input.config;
    let hit_radius = BULLET_RADIUS_PX + BULLET_STROKE_WIDTH_PX * 0.5;

    let series = input.schema.series();
    for (series_index, (resolved, values)) in series.iter().zip(projected).enumerate() {
        let mut points = Vec::with_capacity(values.len());
        for (record_index, (record, value)) in input.records.iter().zip(values).enumerate() {
            let category = record.category();
            let center = context
                .categories
                .index_of(category)
                .and_then(|index| context.categories.center(index, context.category_range));
            let (Some(value), Some(x)) = (*value, center) else {
                points.push(None);
                continue;
            };
            let y = context.value_px(value)?;
            points.push(Some((x, y)));

            let marker = HitShape::Circle {
                cx: x,
                cy: y,
                radius: hit_radius,
            };
            if config.show_line_bullets {
                frame
                    .layer_mut(CanvasLayerKind::Series)
                    .circles
                    .push(CirclePrimitive::new(
                        x,
                        y,
                        BULLET_RADIUS_PX,
                        Color::WHITE,
                        BULLET_STROKE_WIDTH_PX,
                        resolved.color,
                    ));
                sink.mark_drawn(series_index);
                sink.regions[series_index].push(HitRegion {
                    shape: marker,
                    series_index,
                    record_index,
                    category: category.to_owned(),
                    value,
                });
            }
            if config.show_value_labels {
                frame
                    .layer_mut(CanvasLayerKind::ValueLabels)
                    .texts
                    .push(TextPrimitive::new(
                        config.number_format.format(value),
                        x,
                        y - BULLET_RADIUS_PX - VALUE_LABEL_GAP_PX - VALUE_LABEL_FONT_SIZE_PX,
                        VALUE_LABEL_FONT_SIZE_PX,
                        resolved.color,
                        TextHAlign::Center,
                    ));
            }
            sink.hover_targets.push(HoverTarget {
                shape: marker,
                series_index,
                record_index,
                text: tooltip_text(input, series_index, category, value),
                anchor_x: x,
                anchor_y: y,
            });
            sink.snap_points.push(SnapPoint {
                series_index,
                record_index,
                category: category.to_owned(),
                value,
                x,
                y,
            });
        }

        for segment in split_segments(&points) {
            if segment.len() < 2 {
                continue;
            }
            frame
                .layer_mut(CanvasLayerKind::Series)
                .polylines
                .push(PolylinePrimitive::new(segment, LINE_STROKE_WIDTH_PX, resolved.color));
            sink.mark_drawn(series_index);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::split_segments;

    #[test]
    fn gaps_break_the_polyline() {
        let segments = split_segments(&[
            Some((0.0, 1.0)),
            Some((1.0, 2.0)),
            None,
            None,
            Some((3.0, 4.0)),
        ]);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].len(), 2);
        assert_eq!(segments[1], vec![(3.0, 4.0)]);
    }
}
