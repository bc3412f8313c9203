use crate::core::Viewport;
use crate::error::ChartResult;
use crate::render::{RenderFrame, Renderer};

/// No-op renderer used by tests and headless hosts.
///
/// It still validates frame content so invalid geometry is caught without a
/// real backend, and keeps counters that tests use to observe the session
/// lifecycle.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub last_rect_count: usize,
    pub last_line_count: usize,
    pub last_polyline_count: usize,
    pub last_circle_count: usize,
    pub last_text_count: usize,
    pub render_count: usize,
    pub resize_count: usize,
    pub last_viewport: Option<Viewport>,
    pub released: bool,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        self.last_rect_count = frame.rects().count();
        self.last_line_count = frame.lines().count();
        self.last_polyline_count = frame.polylines().count();
        self.last_circle_count = frame.circles().count();
        self.last_text_count = frame.texts().count();
        self.render_count += 1;
        self.last_viewport = Some(frame.viewport);
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        viewport.validate()?;
        self.resize_count += 1;
        self.last_viewport = Some(viewport);
        Ok(())
    }

    fn release(&mut self) {
        self.released = true;
    }
}
