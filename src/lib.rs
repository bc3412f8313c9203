//! chart-adapter: column, line, and bar charts from tabular records.
//!
//! A [`ChartAdapter`] owns mount targets and the one live chart bound to
//! each. Rendering is split into backend-agnostic scene building and a
//! pluggable [`render::Renderer`]; failures never reach the caller and
//! degrade to an empty chart.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;
pub mod trend;

#[cfg(feature = "gtk4-adapter")]
pub mod platform_gtk;

pub use api::{ChartAdapter, ChartConfig, ChartHandle, ChartSession, TargetId, ValueAxisConfig};
pub use core::{ChartType, Dimension, Record, SeriesDescriptor, Viewport};
pub use error::{ChartError, ChartResult};
pub use interaction::{ClickCallback, ClickEvent};
