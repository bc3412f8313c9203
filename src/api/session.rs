use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::api::chart_config::{ChartConfig, DEFAULT_SERIES_COLOR};
use crate::api::scene::{Scene, SceneInput, paint_pointer_overlay};
use crate::api::snap_resolver::nearest_snap;
use crate::api::value_axis::ValueDomain;
use crate::core::{ChartType, Record, RecordSchema, Viewport, resolve_viewport};
use crate::error::ChartResult;
use crate::interaction::{
    ClickCallback, ClickEvent, CursorSnap, InteractionState, ListenerRegistry, PointerEventKind,
};
use crate::render::{RenderFrame, Renderer};

/// Builds a renderer for a measured surface.
pub type RendererFactory<R> = Rc<dyn Fn(Viewport) -> ChartResult<R>>;

/// One live chart bound to one mount target.
///
/// The session owns its renderer, its listeners, and its pointer state.
/// Data refreshes keep all three; only [`Self::release`] tears them down.
pub struct ChartSession<R: Renderer> {
    chart_type: ChartType,
    config: ChartConfig,
    schema: RecordSchema,
    records: Vec<Record>,
    container: Option<Viewport>,
    visible: bool,
    renderer: Option<R>,
    renderer_viewport: Option<Viewport>,
    factory: RendererFactory<R>,
    listeners: ListenerRegistry,
    interaction: InteractionState,
    scene: Scene,
    released: bool,
}

impl<R: Renderer> fmt::Debug for ChartSession<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartSession")
            .field("chart_type", &self.chart_type)
            .field("series", &self.schema.series().len())
            .field("records", &self.records.len())
            .field("container", &self.container)
            .field("visible", &self.visible)
            .field("listeners", &self.listeners.len())
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl<R: Renderer> ChartSession<R> {
    pub(crate) fn new(
        chart_type: ChartType,
        records: &[Record],
        config: ChartConfig,
        factory: RendererFactory<R>,
    ) -> Self {
        let schema = resolve_schema(chart_type, &config);
        let mut listeners = ListenerRegistry::default();
        if config.on_click.is_some() {
            attach_listeners(&mut listeners, chart_type, &schema, &config);
        }
        let mut interaction = InteractionState::default();
        interaction
            .cursor
            .set_snap_series(0..schema.series().len());

        Self {
            chart_type,
            config,
            schema,
            records: records.to_vec(),
            container: None,
            visible: true,
            renderer: None,
            renderer_viewport: None,
            factory,
            listeners,
            interaction,
            scene: Scene::empty(Viewport::new(0, 0), chart_type),
            released: false,
        }
    }

    #[must_use]
    pub fn chart_type(&self) -> ChartType {
        self.chart_type
    }

    #[must_use]
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    #[must_use]
    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn frame(&self) -> &RenderFrame {
        &self.scene.frame
    }

    #[must_use]
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    #[must_use]
    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    #[must_use]
    pub fn renderer(&self) -> Option<&R> {
        self.renderer.as_ref()
    }

    #[must_use]
    pub fn series_count(&self) -> usize {
        self.schema.series().len()
    }

    /// Series with at least one visible mark in the current scene.
    #[must_use]
    pub fn drawn_series(&self) -> usize {
        self.scene.drawn_series
    }

    #[must_use]
    pub fn value_domain(&self) -> Option<&ValueDomain> {
        self.scene.value_domain.as_ref()
    }

    /// Chart size resolved against the container, when measured.
    #[must_use]
    pub fn viewport(&self) -> Option<Viewport> {
        self.container
            .map(|container| resolve_viewport(container, self.config.width, self.config.height))
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    pub(crate) fn set_container(&mut self, container: Option<Viewport>) {
        self.container = container;
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Replaces the data in place, keeping listeners, callback, and
    /// renderer.
    pub(crate) fn replace_records(&mut self, records: &[Record]) {
        self.records = records.to_vec();
        self.interaction.on_pointer_leave();
        self.redraw();
    }

    /// Rebuilds the scene for the current size and data and presents it.
    /// Failures degrade to an empty frame.
    pub(crate) fn redraw(&mut self) {
        if self.released {
            return;
        }
        let Some(viewport) = self.viewport().filter(|viewport| viewport.is_valid()) else {
            self.clear_scene(Viewport::new(0, 0));
            return;
        };
        if !self.visible {
            return;
        }

        let input = SceneInput {
            chart_type: self.chart_type,
            records: &self.records,
            schema: &self.schema,
            config: &self.config,
            viewport,
        };
        match Scene::build(&input) {
            Ok(scene) => self.install_scene(scene),
            Err(err) => {
                warn!(
                    chart_type = self.chart_type.as_str(),
                    error = %err,
                    "chart scene build failed, drawing empty frame"
                );
                self.clear_scene(viewport);
            }
        }
        self.present(viewport);
    }

    fn install_scene(&mut self, mut scene: Scene) {
        self.listeners.clear_regions();
        for (series_index, regions) in std::mem::take(&mut scene.regions).into_iter().enumerate() {
            self.listeners.set_regions(series_index, regions);
        }
        self.interaction
            .set_hover_targets(std::mem::take(&mut scene.hover_targets));
        self.interaction.cursor.snap = None;
        self.scene = scene;
    }

    fn clear_scene(&mut self, viewport: Viewport) {
        self.listeners.clear_regions();
        self.interaction.set_hover_targets(Vec::new());
        self.interaction.on_pointer_leave();
        self.scene = Scene::empty(viewport, self.chart_type);
    }

    fn present(&mut self, viewport: Viewport) {
        if let Err(err) = self.ensure_renderer(viewport) {
            warn!(error = %err, "chart renderer unavailable");
            return;
        }
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        if let Err(err) = renderer.render(&self.scene.frame) {
            warn!(error = %err, "chart frame rejected by renderer");
        }
    }

    fn ensure_renderer(&mut self, viewport: Viewport) -> ChartResult<()> {
        match self.renderer.as_mut() {
            None => {
                self.renderer = Some((self.factory)(viewport)?);
                debug!(width = viewport.width, height = viewport.height, "chart renderer created");
            }
            Some(renderer) if self.renderer_viewport != Some(viewport) => {
                renderer.resize(viewport)?;
                debug!(width = viewport.width, height = viewport.height, "chart renderer resized");
            }
            Some(_) => {}
        }
        self.renderer_viewport = Some(viewport);
        Ok(())
    }

    pub(crate) fn pointer_move(&mut self, x: f64, y: f64) {
        if self.released || !self.visible || self.scene.frame.is_empty() {
            return;
        }
        self.interaction.cursor.on_pointer_move(x, y);
        let snap = nearest_snap(
            &self.scene.snap_points,
            self.interaction.cursor.snap_series(),
            self.scene.snap_axis,
            x,
            y,
        )
        .map(|point| CursorSnap {
            series_index: point.series_index,
            series_name: self
                .schema
                .series()
                .get(point.series_index)
                .map(|series| series.name.clone())
                .unwrap_or_default(),
            record_index: point.record_index,
            category: point.category.clone(),
            value: point.value,
            x: point.x,
            y: point.y,
        });
        let snapped = snap
            .as_ref()
            .map(|snap| (snap.series_index, snap.record_index));
        self.interaction.cursor.snap = snap;
        self.interaction.resolve_tooltip(x, y, snapped);
        self.repaint_overlay();
    }

    pub(crate) fn pointer_leave(&mut self) {
        if self.released {
            return;
        }
        self.interaction.on_pointer_leave();
        self.repaint_overlay();
    }

    fn repaint_overlay(&mut self) {
        paint_pointer_overlay(
            &mut self.scene.frame,
            self.scene.layout.plot,
            self.scene.snap_axis,
            &self.interaction,
        );
        if !self.visible {
            return;
        }
        if let Some(viewport) = self.renderer_viewport {
            self.present(viewport);
        }
    }

    /// Resolves the `event` under the pointer without invoking the callback,
    /// so hosts can release their borrows before running user code.
    #[must_use]
    pub fn click_at(
        &self,
        event: PointerEventKind,
        x: f64,
        y: f64,
    ) -> Option<(ClickCallback, ClickEvent)> {
        if self.released || !self.visible {
            return None;
        }
        let callback = self.config.on_click.as_ref()?;
        let (listener, region) = self.listeners.hit_test(event, x, y)?;
        let event = ClickEvent::new(
            region.category.clone(),
            region.value,
            listener.reported_series_name.clone(),
        );
        Some((callback.clone(), event))
    }

    /// Detaches listeners and releases the renderer. Safe to call twice.
    pub(crate) fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let detached = self.listeners.detach_all();
        self.interaction = InteractionState::default();
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.release();
        }
        debug!(chart_type = self.chart_type.as_str(), detached, "chart session released");
    }
}

impl<R: Renderer> Drop for ChartSession<R> {
    fn drop(&mut self) {
        self.release();
    }
}

fn resolve_schema(chart_type: ChartType, config: &ChartConfig) -> RecordSchema {
    let palette = config.palette();
    if !chart_type.supports_multiple_series() && !config.series.is_empty() {
        warn!(
            chart_type = chart_type.as_str(),
            "series descriptors are ignored for single-series charts"
        );
        return RecordSchema::implicit(
            chart_type.implicit_series_name(),
            palette.first().copied().unwrap_or(DEFAULT_SERIES_COLOR),
        );
    }
    RecordSchema::resolve(
        &config.series,
        chart_type.implicit_series_name(),
        &palette,
        DEFAULT_SERIES_COLOR,
    )
}

/// One listener per series mark template. Line charts only react on point
/// markers, so they get none when markers are hidden.
fn attach_listeners(
    registry: &mut ListenerRegistry,
    chart_type: ChartType,
    schema: &RecordSchema,
    config: &ChartConfig,
) {
    for (series_index, series) in schema.series().iter().enumerate() {
        let (event, reported_name) = match chart_type {
            ChartType::Column => (
                PointerEventKind::Click,
                schema.is_explicit().then(|| series.name.clone()),
            ),
            ChartType::Line if config.show_line_bullets => {
                (PointerEventKind::PointerDown, Some(series.name.clone()))
            }
            ChartType::Line => continue,
            ChartType::Bar => (PointerEventKind::Click, None),
        };
        registry.attach(series_index, event, reported_name);
    }
}
