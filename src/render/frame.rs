use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::{
    CanvasLayerKind, CirclePrimitive, LinePrimitive, PolylinePrimitive, RectPrimitive,
    TextPrimitive,
};

/// Primitives belonging to one paint layer.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameLayer {
    pub kind: CanvasLayerKind,
    pub rects: Vec<RectPrimitive>,
    pub lines: Vec<LinePrimitive>,
    pub polylines: Vec<PolylinePrimitive>,
    pub circles: Vec<CirclePrimitive>,
    pub texts: Vec<TextPrimitive>,
}

impl FrameLayer {
    #[must_use]
    pub fn new(kind: CanvasLayerKind) -> Self {
        Self {
            kind,
            rects: Vec::new(),
            lines: Vec::new(),
            polylines: Vec::new(),
            circles: Vec::new(),
            texts: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
            && self.lines.is_empty()
            && self.polylines.is_empty()
            && self.circles.is_empty()
            && self.texts.is_empty()
    }

    fn validate(&self) -> ChartResult<()> {
        for rect in &self.rects {
            rect.validate()?;
        }
        for line in &self.lines {
            line.validate()?;
        }
        for polyline in &self.polylines {
            polyline.validate()?;
        }
        for circle in &self.circles {
            circle.validate()?;
        }
        for text in &self.texts {
            text.validate()?;
        }
        Ok(())
    }
}

/// Backend-agnostic scene for one chart draw pass.
///
/// Layers are kept sorted by [`CanvasLayerKind::PAINT_ORDER`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: Viewport,
    layers: Vec<FrameLayer>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            layers: Vec::new(),
        }
    }

    /// Returns the layer of `kind`, inserting it at its paint position.
    pub fn layer_mut(&mut self, kind: CanvasLayerKind) -> &mut FrameLayer {
        let position = match self
            .layers
            .binary_search_by_key(&kind.paint_index(), |layer| layer.kind.paint_index())
        {
            Ok(position) => position,
            Err(position) => {
                self.layers.insert(position, FrameLayer::new(kind));
                position
            }
        };
        &mut self.layers[position]
    }

    #[must_use]
    pub fn layer(&self, kind: CanvasLayerKind) -> Option<&FrameLayer> {
        self.layers.iter().find(|layer| layer.kind == kind)
    }

    pub fn layers(&self) -> impl Iterator<Item = &FrameLayer> {
        self.layers.iter()
    }

    /// Drops every layer of `kind`, leaving the others untouched.
    pub fn clear_layer(&mut self, kind: CanvasLayerKind) {
        self.layers.retain(|layer| layer.kind != kind);
    }

    pub fn rects(&self) -> impl Iterator<Item = &RectPrimitive> {
        self.layers.iter().flat_map(|layer| layer.rects.iter())
    }

    pub fn lines(&self) -> impl Iterator<Item = &LinePrimitive> {
        self.layers.iter().flat_map(|layer| layer.lines.iter())
    }

    pub fn polylines(&self) -> impl Iterator<Item = &PolylinePrimitive> {
        self.layers.iter().flat_map(|layer| layer.polylines.iter())
    }

    pub fn circles(&self) -> impl Iterator<Item = &CirclePrimitive> {
        self.layers.iter().flat_map(|layer| layer.circles.iter())
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextPrimitive> {
        self.layers.iter().flat_map(|layer| layer.texts.iter())
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        for layer in &self.layers {
            layer.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(FrameLayer::is_empty)
    }
}
