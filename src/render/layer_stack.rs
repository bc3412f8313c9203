use serde::{Deserialize, Serialize};

/// Paint layers of one chart, listed bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanvasLayerKind {
    Background,
    Grid,
    Series,
    ValueLabels,
    Axis,
    Legend,
    Cursor,
    Tooltip,
}

impl CanvasLayerKind {
    /// Canonical paint order. Backends draw layers in exactly this order.
    pub const PAINT_ORDER: [Self; 8] = [
        Self::Background,
        Self::Grid,
        Self::Series,
        Self::ValueLabels,
        Self::Axis,
        Self::Legend,
        Self::Cursor,
        Self::Tooltip,
    ];

    #[must_use]
    pub fn paint_index(self) -> usize {
        Self::PAINT_ORDER
            .iter()
            .position(|kind| *kind == self)
            .unwrap_or(Self::PAINT_ORDER.len())
    }

    /// Layers that depend only on pointer state and can be redrawn without
    /// rebuilding the data layers.
    #[must_use]
    pub const fn is_pointer_layer(self) -> bool {
        matches!(self, Self::Cursor | Self::Tooltip)
    }
}
