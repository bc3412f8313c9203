mod frame;
mod layer_stack;
mod null_renderer;
mod primitives;

pub use frame::{FrameLayer, RenderFrame};
pub use layer_stack::CanvasLayerKind;
pub use null_renderer::NullRenderer;
pub use primitives::{
    CirclePrimitive, Color, LinePrimitive, PolylinePrimitive, RectPrimitive, TextHAlign,
    TextPrimitive,
};

use crate::core::Viewport;
use crate::error::ChartResult;

/// Contract implemented by any rendering backend.
///
/// Each live chart session owns exactly one renderer instance. Backends
/// receive a fully materialized `RenderFrame`, so drawing code stays isolated
/// from chart configuration and interaction logic.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()>;

    /// Called when the mount surface changes size. Backends with fixed-size
    /// surfaces reallocate here.
    fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        let _ = viewport;
        Ok(())
    }

    /// Releases backend resources. Called exactly once when the owning session
    /// is disposed.
    fn release(&mut self) {}
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoContextRenderer, CairoRenderStats, CairoRenderer};
