pub mod category_scale;
pub mod layout;
pub mod primitives;
pub mod record;
pub mod scale;
pub mod ticks;
pub mod types;

pub use category_scale::CategoryScale;
pub use layout::{LayoutRequest, PlotLayout};
pub use primitives::NumberFormat;
pub use record::{
    CATEGORY_FIELD, DEFAULT_VALUE_FIELD, Record, RecordSchema, ResolvedSeries, SeriesDescriptor,
};
pub use scale::{LinearScale, PixelRange};
pub use types::{ChartType, Dimension, PixelRect, Viewport, resolve_viewport};
