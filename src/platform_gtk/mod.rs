//! GTK4 mount target: binds one chart target to a `DrawingArea`.

use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk::prelude::*;
use tracing::warn;

use crate::api::{ChartAdapter, TargetId};
use crate::core::Viewport;
use crate::interaction::PointerEventKind;
use crate::render::CairoRenderer;

pub type SharedAdapter = Rc<RefCell<ChartAdapter<CairoRenderer>>>;

/// Adapter whose sessions draw into offscreen Cairo surfaces.
#[must_use]
pub fn shared_cairo_adapter() -> SharedAdapter {
    Rc::new(RefCell::new(ChartAdapter::new(CairoRenderer::for_viewport)))
}

/// `DrawingArea` acting as the mount surface of `target`.
///
/// Size changes and map/unmap feed the adapter's measure and visibility
/// operations, so charts redraw in place instead of being rebuilt.
pub struct GtkChartMount {
    area: gtk::DrawingArea,
    adapter: SharedAdapter,
    target: TargetId,
}

impl GtkChartMount {
    #[must_use]
    pub fn new(adapter: SharedAdapter, target: TargetId) -> Self {
        adapter.borrow_mut().attach_target(target);
        let area = gtk::DrawingArea::new();
        area.set_hexpand(true);
        area.set_vexpand(true);

        let draw_adapter = Rc::clone(&adapter);
        area.set_draw_func(move |_, context, _, _| {
            let adapter = draw_adapter.borrow();
            let Some(renderer) = adapter
                .live_handle(target)
                .and_then(|handle| adapter.session(handle))
                .and_then(|session| session.renderer())
            else {
                return;
            };
            if let Err(err) = context.set_source_surface(renderer.surface(), 0.0, 0.0) {
                warn!(error = %err, "failed to bind chart surface");
                return;
            }
            if let Err(err) = context.paint() {
                warn!(error = %err, "failed to paint chart surface");
            }
        });

        let resize_adapter = Rc::clone(&adapter);
        area.connect_resize(move |area, width, height| {
            let viewport = Viewport::new(width.max(0) as u32, height.max(0) as u32);
            resize_adapter.borrow_mut().measure_target(target, viewport);
            area.queue_draw();
        });

        let map_adapter = Rc::clone(&adapter);
        area.connect_map(move |area| {
            map_adapter.borrow_mut().set_target_visible(target, true);
            area.queue_draw();
        });
        let unmap_adapter = Rc::clone(&adapter);
        area.connect_unmap(move |_| {
            unmap_adapter.borrow_mut().set_target_visible(target, false);
        });

        let motion = gtk::EventControllerMotion::new();
        let motion_adapter = Rc::clone(&adapter);
        let motion_area = area.downgrade();
        motion.connect_motion(move |_, x, y| {
            let mut adapter = motion_adapter.borrow_mut();
            if let Some(handle) = adapter.live_handle(target) {
                adapter.pointer_move(handle, x, y);
            }
            if let Some(area) = motion_area.upgrade() {
                area.queue_draw();
            }
        });
        let leave_adapter = Rc::clone(&adapter);
        let leave_area = area.downgrade();
        motion.connect_leave(move |_| {
            let mut adapter = leave_adapter.borrow_mut();
            if let Some(handle) = adapter.live_handle(target) {
                adapter.pointer_leave(handle);
            }
            if let Some(area) = leave_area.upgrade() {
                area.queue_draw();
            }
        });
        area.add_controller(motion);

        let click = gtk::GestureClick::new();
        let press_adapter = Rc::clone(&adapter);
        click.connect_pressed(move |_, _, x, y| {
            deliver(&press_adapter, target, PointerEventKind::PointerDown, x, y);
        });
        let release_adapter = Rc::clone(&adapter);
        click.connect_released(move |_, _, x, y| {
            deliver(&release_adapter, target, PointerEventKind::Click, x, y);
        });
        area.add_controller(click);

        Self {
            area,
            adapter,
            target,
        }
    }

    #[must_use]
    pub fn widget(&self) -> &gtk::DrawingArea {
        &self.area
    }

    #[must_use]
    pub fn target(&self) -> TargetId {
        self.target
    }

    /// Requests a repaint after the host rendered or updated the chart.
    pub fn queue_draw(&self) {
        self.area.queue_draw();
    }

    /// Disposes the chart and forgets the target.
    pub fn detach(self) {
        self.adapter.borrow_mut().detach_target(self.target);
    }
}

/// Resolves under a shared borrow and calls with no borrow held, so the
/// callback may re-render through the same adapter.
fn deliver(adapter: &SharedAdapter, target: TargetId, event: PointerEventKind, x: f64, y: f64) {
    let pending = {
        let adapter = adapter.borrow();
        adapter
            .live_handle(target)
            .and_then(|handle| adapter.click_at(handle, event, x, y))
    };
    if let Some((callback, payload)) = pending {
        callback.call(&payload);
    }
}
