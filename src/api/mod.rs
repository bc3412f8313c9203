mod adapter;
mod bar_scene;
mod chart_config;
mod column_scene;
mod label_template;
mod line_scene;
mod scene;
mod session;
mod snap_resolver;
mod value_axis;

pub use adapter::{ChartAdapter, ChartHandle, TargetId};
pub use bar_scene::{BAR_LABEL_OFFSET_PX, bar_label_visible};
pub use chart_config::{
    AXIS_LABEL_COLOR, ChartConfig, DEFAULT_SERIES_COLOR, DEFAULT_SERIES_LABEL_TEXT,
    PLACEHOLDER_COLOR, ValueAxisConfig,
};
pub use column_scene::column_slot;
pub use label_template::{TemplateContext, format_label_template};
pub use line_scene::{BULLET_RADIUS_PX, LINE_STROKE_WIDTH_PX, split_segments};
pub use scene::{
    CATEGORY_LABEL_MAX_WIDTH_PX, Scene, SceneInput, SnapAxis, SnapPoint, paint_pointer_overlay,
    wrap_label,
};
pub use session::{ChartSession, RendererFactory};
pub use snap_resolver::nearest_snap;
pub use value_axis::{BAR_AXIS_FALLBACK_MAX, BAR_AXIS_HEADROOM, ValueDomain, bar_axis_max};
