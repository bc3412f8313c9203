use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::chart_config::ChartConfig;
use crate::api::session::{ChartSession, RendererFactory};
use crate::core::{ChartType, Record, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{ClickCallback, ClickEvent, PointerEventKind};
use crate::render::{NullRenderer, RenderFrame, Renderer};

/// Identifier of one mount surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(u64);

impl TargetId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target-{}", self.0)
    }
}

/// Reference to one live chart.
///
/// A handle addresses the session created by the `render` call that
/// returned it. Once that session is replaced or disposed the handle goes
/// stale and every operation on it is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChartHandle {
    target: TargetId,
    generation: u64,
}

impl ChartHandle {
    const DETACHED_GENERATION: u64 = 0;

    #[must_use]
    pub const fn target(self) -> TargetId {
        self.target
    }

    #[must_use]
    pub const fn generation(self) -> u64 {
        self.generation
    }

    /// True for handles returned by a render into an unknown target.
    #[must_use]
    pub const fn is_detached(self) -> bool {
        self.generation == Self::DETACHED_GENERATION
    }

    const fn detached(target: TargetId) -> Self {
        Self {
            target,
            generation: Self::DETACHED_GENERATION,
        }
    }
}

struct MountSlot<R: Renderer> {
    container: Option<Viewport>,
    visible: bool,
    live: Option<(u64, ChartSession<R>)>,
}

impl<R: Renderer> MountSlot<R> {
    fn session_for(&self, handle: ChartHandle) -> Option<&ChartSession<R>> {
        match &self.live {
            Some((generation, session)) if *generation == handle.generation => Some(session),
            _ => None,
        }
    }

    fn session_for_mut(&mut self, handle: ChartHandle) -> Option<&mut ChartSession<R>> {
        match &mut self.live {
            Some((generation, session)) if *generation == handle.generation => Some(session),
            _ => None,
        }
    }

    /// Releases the live session, if any, and returns the detached listener
    /// count.
    fn teardown(&mut self) -> usize {
        let Some((_, mut session)) = self.live.take() else {
            return 0;
        };
        let listeners = session.listeners().len();
        session.release();
        listeners
    }
}

/// Owns every mount target of a host and the chart bound to each.
///
/// All operations are synchronous and infallible from the caller's point of
/// view: bad input degrades to an empty chart and is logged.
pub struct ChartAdapter<R: Renderer> {
    targets: IndexMap<TargetId, MountSlot<R>>,
    factory: RendererFactory<R>,
    next_generation: u64,
}

impl<R: Renderer> fmt::Debug for ChartAdapter<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartAdapter")
            .field("targets", &self.targets.len())
            .field("live_sessions", &self.live_session_count())
            .field("next_generation", &self.next_generation)
            .finish_non_exhaustive()
    }
}

impl ChartAdapter<NullRenderer> {
    /// Adapter that draws into [`NullRenderer`]s, for tests and headless hosts.
    #[must_use]
    pub fn headless() -> Self {
        Self::new(|_| Ok(NullRenderer::default()))
    }
}

impl<R: Renderer> ChartAdapter<R> {
    /// Creates an adapter whose sessions obtain renderers from `factory`
    /// once their surface is measured.
    pub fn new(factory: impl Fn(Viewport) -> ChartResult<R> + 'static) -> Self {
        Self {
            targets: IndexMap::new(),
            factory: Rc::new(factory),
            next_generation: ChartHandle::DETACHED_GENERATION + 1,
        }
    }

    /// Registers a mount surface. Re-attaching a known target keeps it.
    pub fn attach_target(&mut self, target: TargetId) {
        self.targets.entry(target).or_insert_with(|| MountSlot {
            container: None,
            visible: true,
            live: None,
        });
        debug!(%target, "mount target attached");
    }

    /// Records the container size and redraws the live chart in place.
    pub fn measure_target(&mut self, target: TargetId, container: Viewport) {
        let Some(slot) = self.targets.get_mut(&target) else {
            warn!(%target, "ignoring measurement of unknown mount target");
            return;
        };
        if slot.container == Some(container) {
            return;
        }
        slot.container = Some(container);
        if let Some((_, session)) = slot.live.as_mut() {
            session.set_container(Some(container));
            session.redraw();
        }
    }

    /// Shows or hides a target. Becoming visible redraws without rebuilding.
    pub fn set_target_visible(&mut self, target: TargetId, visible: bool) {
        let Some(slot) = self.targets.get_mut(&target) else {
            return;
        };
        if slot.visible == visible {
            return;
        }
        slot.visible = visible;
        if let Some((_, session)) = slot.live.as_mut() {
            session.set_visible(visible);
            if visible {
                session.redraw();
            } else {
                session.pointer_leave();
            }
        }
    }

    /// Disposes the live chart of `target` and forgets the target.
    pub fn detach_target(&mut self, target: TargetId) {
        if let Some(mut slot) = self.targets.shift_remove(&target) {
            let listeners = slot.teardown();
            debug!(%target, listeners, "mount target detached");
        }
    }

    /// Builds a chart on `target`, first tearing down whatever chart the
    /// target held.
    pub fn render(
        &mut self,
        target: TargetId,
        chart_type: ChartType,
        records: &[Record],
        config: ChartConfig,
    ) -> ChartHandle {
        let Some(slot) = self.targets.get_mut(&target) else {
            let error = ChartError::UnknownTarget(target.to_string());
            warn!(%target, %error, "render skipped");
            return ChartHandle::detached(target);
        };

        let detached = slot.teardown();
        let generation = self.next_generation;
        self.next_generation += 1;

        let mut session = ChartSession::new(chart_type, records, config, Rc::clone(&self.factory));
        session.set_container(slot.container);
        session.set_visible(slot.visible);
        session.redraw();
        debug!(
            %target,
            generation,
            chart_type = chart_type.as_str(),
            records = records.len(),
            detached,
            "chart rendered"
        );
        slot.live = Some((generation, session));

        ChartHandle { target, generation }
    }

    /// Replaces the data of the chart behind `handle` in place.
    pub fn update(&mut self, handle: ChartHandle, records: &[Record]) {
        let Some(session) = self.session_mut(handle) else {
            debug!(target = %handle.target, "ignoring update through stale handle");
            return;
        };
        session.replace_records(records);
    }

    /// Updates in place when the live chart on `target` has the same type
    /// and structure, rebuilds otherwise.
    pub fn sync(
        &mut self,
        target: TargetId,
        chart_type: ChartType,
        records: &[Record],
        config: ChartConfig,
    ) -> ChartHandle {
        let reusable = self
            .targets
            .get(&target)
            .and_then(|slot| slot.live.as_ref())
            .filter(|(_, session)| {
                session.chart_type() == chart_type && session.config().same_structure(&config)
            })
            .map(|(generation, _)| ChartHandle {
                target,
                generation: *generation,
            });

        match reusable {
            Some(handle) => {
                self.update(handle, records);
                handle
            }
            None => self.render(target, chart_type, records, config),
        }
    }

    /// Releases the chart behind `handle`. Stale handles are ignored.
    pub fn dispose(&mut self, handle: ChartHandle) {
        let Some(slot) = self.targets.get_mut(&handle.target) else {
            return;
        };
        if slot.session_for(handle).is_none() {
            return;
        }
        let listeners = slot.teardown();
        debug!(target = %handle.target, listeners, "chart disposed");
    }

    pub fn pointer_move(&mut self, handle: ChartHandle, x: f64, y: f64) {
        if let Some(session) = self.session_mut(handle) {
            session.pointer_move(x, y);
        }
    }

    pub fn pointer_leave(&mut self, handle: ChartHandle) {
        if let Some(session) = self.session_mut(handle) {
            session.pointer_leave();
        }
    }

    /// Press on the marks under the pointer. Only line point markers react
    /// to presses. Returns whether a mark ran the click callback.
    pub fn pointer_down(&mut self, handle: ChartHandle, x: f64, y: f64) -> bool {
        self.dispatch(handle, PointerEventKind::PointerDown, x, y)
    }

    /// Completed click on the marks under the pointer. Column and bar marks
    /// react to clicks. Returns whether a mark ran the click callback.
    pub fn click(&mut self, handle: ChartHandle, x: f64, y: f64) -> bool {
        self.dispatch(handle, PointerEventKind::Click, x, y)
    }

    fn dispatch(&mut self, handle: ChartHandle, event: PointerEventKind, x: f64, y: f64) -> bool {
        let Some((callback, payload)) = self.click_at(handle, event, x, y) else {
            return false;
        };
        callback.call(&payload);
        true
    }

    /// Callback and payload `event` would deliver, without delivering it.
    #[must_use]
    pub fn click_at(
        &self,
        handle: ChartHandle,
        event: PointerEventKind,
        x: f64,
        y: f64,
    ) -> Option<(ClickCallback, ClickEvent)> {
        self.session(handle)?.click_at(event, x, y)
    }

    #[must_use]
    pub fn session(&self, handle: ChartHandle) -> Option<&ChartSession<R>> {
        self.targets.get(&handle.target)?.session_for(handle)
    }

    fn session_mut(&mut self, handle: ChartHandle) -> Option<&mut ChartSession<R>> {
        self.targets.get_mut(&handle.target)?.session_for_mut(handle)
    }

    /// Handle of the live chart on `target`.
    #[must_use]
    pub fn live_handle(&self, target: TargetId) -> Option<ChartHandle> {
        let (generation, _) = self.targets.get(&target)?.live.as_ref()?;
        Some(ChartHandle {
            target,
            generation: *generation,
        })
    }

    #[must_use]
    pub fn frame(&self, handle: ChartHandle) -> Option<&RenderFrame> {
        self.session(handle).map(ChartSession::frame)
    }

    #[must_use]
    pub fn is_live(&self, handle: ChartHandle) -> bool {
        self.session(handle).is_some()
    }

    #[must_use]
    pub fn live_session_count(&self) -> usize {
        self.targets
            .values()
            .filter(|slot| slot.live.is_some())
            .count()
    }

    /// Pointer listeners attached on `target`.
    #[must_use]
    pub fn listener_count(&self, target: TargetId) -> usize {
        self.targets
            .get(&target)
            .and_then(|slot| slot.live.as_ref())
            .map_or(0, |(_, session)| session.listeners().len())
    }

    pub fn targets(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.targets.keys().copied()
    }
}
