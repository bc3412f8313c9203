use cairo::{Context, Format, ImageSurface};
use pango::{FontDescription, Weight};
use std::f64::consts::{FRAC_PI_2, PI, TAU};
use tracing::debug;

use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::{Color, FrameLayer, RectPrimitive, RenderFrame, Renderer, TextHAlign};

const FONT_FAMILY: &str = "Noto Sans Thai, Roboto, Sans";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub rects_drawn: usize,
    pub lines_drawn: usize,
    pub polylines_drawn: usize,
    pub circles_drawn: usize,
    pub texts_drawn: usize,
}

/// Renderers that can paint into a host-provided Cairo context, such as a
/// GTK `DrawingArea` draw callback.
pub trait CairoContextRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> ChartResult<()>;
}

/// Cairo + Pango + PangoCairo renderer backend.
///
/// `Renderer::render` paints into an owned offscreen image surface that is
/// reallocated on resize; `CairoContextRenderer` paints into a borrowed
/// context instead.
#[derive(Debug)]
pub struct CairoRenderer {
    surface: ImageSurface,
    clear_color: Color,
    last_stats: CairoRenderStats,
}

impl CairoRenderer {
    pub fn new(width: i32, height: i32) -> ChartResult<Self> {
        Ok(Self {
            surface: create_surface(width, height)?,
            clear_color: Color::WHITE,
            last_stats: CairoRenderStats::default(),
        })
    }

    pub fn for_viewport(viewport: Viewport) -> ChartResult<Self> {
        let viewport = viewport.validate()?;
        Self::new(to_i32(viewport.width)?, to_i32(viewport.height)?)
    }

    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    pub fn set_clear_color(&mut self, color: Color) -> ChartResult<()> {
        color.validate()?;
        self.clear_color = color;
        Ok(())
    }

    #[must_use]
    pub fn last_stats(&self) -> CairoRenderStats {
        self.last_stats
    }

    /// Encodes the offscreen surface as PNG.
    pub fn write_png(&self, out: &mut impl std::io::Write) -> ChartResult<()> {
        self.surface
            .write_to_png(out)
            .map_err(|err| ChartError::InvalidData(format!("failed to encode png: {err}")))
    }

    fn render_with_context(&mut self, context: &Context, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;

        apply_color(context, self.clear_color);
        context
            .paint()
            .map_err(|err| map_backend_error("failed to clear surface", err))?;

        let mut stats = CairoRenderStats::default();
        for layer in frame.layers() {
            draw_layer(context, layer, &mut stats)?;
        }

        self.last_stats = stats;
        Ok(())
    }
}

impl Renderer for CairoRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        self.render_with_context(&context, frame)
    }

    fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        let viewport = viewport.validate()?;
        let (width, height) = (to_i32(viewport.width)?, to_i32(viewport.height)?);
        if self.surface.width() != width || self.surface.height() != height {
            debug!(width, height, "reallocating cairo surface");
            self.surface = create_surface(width, height)?;
        }
        Ok(())
    }

    fn release(&mut self) {
        self.surface.flush();
        self.surface.finish();
    }
}

impl CairoContextRenderer for CairoRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> ChartResult<()> {
        self.render_with_context(context, frame)
    }
}

fn draw_layer(
    context: &Context,
    layer: &FrameLayer,
    stats: &mut CairoRenderStats,
) -> ChartResult<()> {
    for rect in &layer.rects {
        append_rect_path(context, *rect);
        apply_color(context, rect.fill_color);
        if rect.border_width > 0.0 {
            context
                .fill_preserve()
                .map_err(|err| map_backend_error("failed to fill rectangle", err))?;
            apply_color(context, rect.border_color);
            context.set_line_width(rect.border_width);
            context
                .stroke()
                .map_err(|err| map_backend_error("failed to stroke rectangle border", err))?;
        } else {
            context
                .fill()
                .map_err(|err| map_backend_error("failed to fill rectangle", err))?;
        }
        stats.rects_drawn += 1;
    }

    for line in &layer.lines {
        apply_color(context, line.color);
        context.set_line_width(line.stroke_width);
        match line.dash {
            Some((on, off)) => context.set_dash(&[on, off], 0.0),
            None => context.set_dash(&[], 0.0),
        }
        context.move_to(line.x1, line.y1);
        context.line_to(line.x2, line.y2);
        context
            .stroke()
            .map_err(|err| map_backend_error("failed to stroke line", err))?;
        stats.lines_drawn += 1;
    }
    context.set_dash(&[], 0.0);

    for polyline in &layer.polylines {
        apply_color(context, polyline.color);
        context.set_line_width(polyline.stroke_width);
        let mut points = polyline.points.iter();
        if let Some((x, y)) = points.next() {
            context.move_to(*x, *y);
        }
        for (x, y) in points {
            context.line_to(*x, *y);
        }
        context
            .stroke()
            .map_err(|err| map_backend_error("failed to stroke polyline", err))?;
        stats.polylines_drawn += 1;
    }

    for circle in &layer.circles {
        context.new_sub_path();
        context.arc(circle.cx, circle.cy, circle.radius, 0.0, TAU);
        apply_color(context, circle.fill_color);
        if circle.stroke_width > 0.0 {
            context
                .fill_preserve()
                .map_err(|err| map_backend_error("failed to fill circle", err))?;
            apply_color(context, circle.stroke_color);
            context.set_line_width(circle.stroke_width);
            context
                .stroke()
                .map_err(|err| map_backend_error("failed to stroke circle", err))?;
        } else {
            context
                .fill()
                .map_err(|err| map_backend_error("failed to fill circle", err))?;
        }
        stats.circles_drawn += 1;
    }

    for text in &layer.texts {
        let layout = pangocairo::functions::create_layout(context);
        let mut font_description =
            FontDescription::from_string(&format!("{FONT_FAMILY} {}", text.font_size_px));
        if text.bold {
            font_description.set_weight(Weight::Bold);
        }
        layout.set_font_description(Some(&font_description));
        layout.set_text(&text.text);

        let (text_width, _text_height) = layout.pixel_size();
        let x = match text.h_align {
            TextHAlign::Left => text.x,
            TextHAlign::Center => text.x - f64::from(text_width) / 2.0,
            TextHAlign::Right => text.x - f64::from(text_width),
        };

        apply_color(context, text.color);
        context.move_to(x, text.y);
        pangocairo::functions::show_layout(context, &layout);
        stats.texts_drawn += 1;
    }

    Ok(())
}

fn create_surface(width: i32, height: i32) -> ChartResult<ImageSurface> {
    if width <= 0 || height <= 0 {
        return Err(ChartError::InvalidData(
            "cairo surface size must be > 0".to_owned(),
        ));
    }
    ImageSurface::create(Format::ARgb32, width, height)
        .map_err(|err| map_backend_error("failed to create cairo surface", err))
}

fn to_i32(value: u32) -> ChartResult<i32> {
    i32::try_from(value)
        .map_err(|_| ChartError::InvalidData(format!("surface extent {value} is too large")))
}

fn apply_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn append_rect_path(context: &Context, rect: RectPrimitive) {
    if rect.corner_radius <= 0.0 {
        context.rectangle(rect.x, rect.y, rect.width, rect.height);
        return;
    }

    let radius = rect
        .corner_radius
        .min(rect.width * 0.5)
        .min(rect.height * 0.5);
    let left = rect.x;
    let top = rect.y;
    let right = rect.x + rect.width;
    let bottom = rect.y + rect.height;

    context.new_sub_path();
    context.arc(right - radius, top + radius, radius, -FRAC_PI_2, 0.0);
    context.arc(right - radius, bottom - radius, radius, 0.0, FRAC_PI_2);
    context.arc(left + radius, bottom - radius, radius, FRAC_PI_2, PI);
    context.arc(left + radius, top + radius, radius, PI, PI + FRAC_PI_2);
    context.close_path();
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> ChartError {
    ChartError::InvalidData(format!("{prefix}: {err}"))
}
