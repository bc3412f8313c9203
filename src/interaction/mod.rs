use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::PixelRect;

/// Payload delivered to the click callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub category: String,
    pub value: f64,
    pub series_name: Option<String>,
}

impl ClickEvent {
    pub fn new(category: impl Into<String>, value: f64, series_name: Option<String>) -> Self {
        Self {
            category: category.into(),
            value,
            series_name,
        }
    }
}

/// Shared click handler.
///
/// Cloning keeps identity: two clones compare equal under [`Self::same_as`],
/// two separately constructed callbacks never do.
#[derive(Clone)]
pub struct ClickCallback(Rc<dyn Fn(&ClickEvent)>);

impl ClickCallback {
    pub fn new(callback: impl Fn(&ClickEvent) + 'static) -> Self {
        Self(Rc::new(callback))
    }

    pub fn call(&self, event: &ClickEvent) {
        (self.0)(event);
    }

    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for ClickCallback {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl fmt::Debug for ClickCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClickCallback")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// Pointer event a listener reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerEventKind {
    /// Click on a column or bar mark.
    Click,
    /// Press on a line point marker.
    PointerDown,
}

/// Pickable geometry of one mark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HitShape {
    Rect(PixelRect),
    Circle { cx: f64, cy: f64, radius: f64 },
}

impl HitShape {
    #[must_use]
    pub fn contains(self, x: f64, y: f64) -> bool {
        match self {
            Self::Rect(rect) => rect.contains(x, y),
            Self::Circle { cx, cy, radius } => {
                let (dx, dy) = (x - cx, y - cy);
                dx * dx + dy * dy <= radius * radius
            }
        }
    }
}

/// One interactive mark bound to a data item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitRegion {
    pub shape: HitShape,
    pub series_index: usize,
    pub record_index: usize,
    pub category: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListenerId(u64);

impl ListenerId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Pointer listener attached to the mark template of one series.
///
/// The listener outlives data refreshes: only its regions are replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkListener {
    pub id: ListenerId,
    pub series_index: usize,
    pub event: PointerEventKind,
    /// Series name reported in click payloads, `None` for anonymous series.
    pub reported_series_name: Option<String>,
    regions: Vec<HitRegion>,
}

impl MarkListener {
    #[must_use]
    pub fn regions(&self) -> &[HitRegion] {
        &self.regions
    }
}

/// Listeners owned by one chart session.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: Vec<MarkListener>,
    next_id: u64,
}

impl ListenerRegistry {
    pub fn attach(
        &mut self,
        series_index: usize,
        event: PointerEventKind,
        reported_series_name: Option<String>,
    ) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push(MarkListener {
            id,
            series_index,
            event,
            reported_series_name,
            regions: Vec::new(),
        });
        id
    }

    /// Replaces the regions of every listener bound to `series_index`.
    pub fn set_regions(&mut self, series_index: usize, regions: Vec<HitRegion>) {
        for listener in self
            .listeners
            .iter_mut()
            .filter(|listener| listener.series_index == series_index)
        {
            listener.regions.clone_from(&regions);
        }
    }

    pub fn clear_regions(&mut self) {
        for listener in &mut self.listeners {
            listener.regions.clear();
        }
    }

    /// Detaches all listeners and returns how many were attached.
    pub fn detach_all(&mut self) -> usize {
        let count = self.listeners.len();
        self.listeners.clear();
        count
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarkListener> {
        self.listeners.iter()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<ListenerId> {
        self.listeners.iter().map(|listener| listener.id).collect()
    }

    /// Topmost region under the pointer among listeners reacting to
    /// `event`. Later series paint above earlier ones, so they win ties.
    #[must_use]
    pub fn hit_test(
        &self,
        event: PointerEventKind,
        x: f64,
        y: f64,
    ) -> Option<(&MarkListener, &HitRegion)> {
        self.listeners
            .iter()
            .rev()
            .filter(|listener| listener.event == event)
            .find_map(|listener| {
                listener
                    .regions
                    .iter()
                    .rev()
                    .find(|region| region.shape.contains(x, y))
                    .map(|region| (listener, region))
            })
    }
}

/// Nearest data item the cursor snapped to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorSnap {
    pub series_index: usize,
    pub series_name: String,
    pub record_index: usize,
    pub category: String,
    pub value: f64,
    pub x: f64,
    pub y: f64,
}

/// Pointer-tracking cursor state.
///
/// `snap_series` is the exact set of series the cursor may snap to; it is
/// replaced whenever the series list is rebuilt.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CursorState {
    pub visible: bool,
    pub x: f64,
    pub y: f64,
    pub snap: Option<CursorSnap>,
    snap_series: SmallVec<[usize; 4]>,
}

impl CursorState {
    pub fn set_snap_series(&mut self, series: impl IntoIterator<Item = usize>) {
        self.snap_series = series.into_iter().collect();
        self.snap = None;
    }

    #[must_use]
    pub fn snap_series(&self) -> &[usize] {
        &self.snap_series
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        self.visible = true;
        self.x = x;
        self.y = y;
    }

    pub fn on_pointer_leave(&mut self) {
        self.visible = false;
        self.snap = None;
    }
}

/// Hover label shown next to a mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipState {
    pub text: String,
    pub series_index: usize,
    pub record_index: usize,
    pub anchor_x: f64,
    pub anchor_y: f64,
}

/// Hoverable mark carrying the tooltip text it shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoverTarget {
    pub shape: HitShape,
    pub series_index: usize,
    pub record_index: usize,
    pub text: String,
    pub anchor_x: f64,
    pub anchor_y: f64,
}

/// Pointer-driven state of one session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InteractionState {
    pub cursor: CursorState,
    pub tooltip: Option<TooltipState>,
    hover_targets: Vec<HoverTarget>,
}

impl InteractionState {
    pub fn set_hover_targets(&mut self, targets: Vec<HoverTarget>) {
        self.hover_targets = targets;
        self.tooltip = None;
    }

    #[must_use]
    pub fn hover_targets(&self) -> &[HoverTarget] {
        &self.hover_targets
    }

    /// Resolves the tooltip for the pointer position; `snapped` is used for
    /// marks that are hovered through the cursor (line points).
    pub fn resolve_tooltip(&mut self, x: f64, y: f64, snapped: Option<(usize, usize)>) {
        let direct = self
            .hover_targets
            .iter()
            .rev()
            .find(|target| target.shape.contains(x, y));
        let target = direct.or_else(|| {
            let (series_index, record_index) = snapped?;
            self.hover_targets.iter().find(|target| {
                target.series_index == series_index && target.record_index == record_index
            })
        });

        self.tooltip = target.map(|target| TooltipState {
            text: target.text.clone(),
            series_index: target.series_index,
            record_index: target.record_index,
            anchor_x: target.anchor_x,
            anchor_y: target.anchor_y,
        });
    }

    pub fn on_pointer_leave(&mut self) {
        self.cursor.on_pointer_leave();
        self.tooltip = None;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::{ClickCallback, ClickEvent, HitRegion, HitShape, ListenerRegistry, PointerEventKind};
    use crate::core::PixelRect;

    #[test]
    fn callback_identity_survives_clones() {
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let callback = ClickCallback::new(move |_| counter.set(counter.get() + 1));
        let clone = callback.clone();
        let other = ClickCallback::new(|_| {});

        clone.call(&ClickEvent::new("X", 1.0, None));
        assert_eq!(hits.get(), 1);
        assert!(callback.same_as(&clone));
        assert!(!callback.same_as(&other));
    }

    #[test]
    fn later_series_win_overlapping_hits() {
        let mut registry = ListenerRegistry::default();
        registry.attach(0, PointerEventKind::Click, None);
        registry.attach(1, PointerEventKind::Click, None);
        let region = |series_index| HitRegion {
            shape: HitShape::Rect(PixelRect::new(0.0, 0.0, 10.0, 10.0)),
            series_index,
            record_index: 0,
            category: "X".to_owned(),
            value: 1.0,
        };
        registry.set_regions(0, vec![region(0)]);
        registry.set_regions(1, vec![region(1)]);

        let (listener, _) = registry
            .hit_test(PointerEventKind::Click, 5.0, 5.0)
            .expect("hit");
        assert_eq!(listener.series_index, 1);
        assert!(registry.hit_test(PointerEventKind::Click, 50.0, 5.0).is_none());
        assert_eq!(registry.detach_all(), 2);
        assert!(registry.is_empty());
    }

    #[test]
    fn hits_only_reach_listeners_of_the_matching_event() {
        let mut registry = ListenerRegistry::default();
        registry.attach(0, PointerEventKind::PointerDown, Some("Line".to_owned()));
        registry.attach(1, PointerEventKind::Click, None);
        let region = |series_index| HitRegion {
            shape: HitShape::Circle {
                cx: 5.0,
                cy: 5.0,
                radius: 6.0,
            },
            series_index,
            record_index: 0,
            category: "X".to_owned(),
            value: 1.0,
        };
        registry.set_regions(0, vec![region(0)]);
        registry.set_regions(1, vec![region(1)]);

        let (pressed, _) = registry
            .hit_test(PointerEventKind::PointerDown, 5.0, 5.0)
            .expect("press hit");
        assert_eq!(pressed.series_index, 0);
        let (clicked, _) = registry
            .hit_test(PointerEventKind::Click, 5.0, 5.0)
            .expect("click hit");
        assert_eq!(clicked.series_index, 1);

        registry.detach_all();
        registry.attach(0, PointerEventKind::PointerDown, None);
        registry.set_regions(0, vec![region(0)]);
        assert!(registry.hit_test(PointerEventKind::Click, 5.0, 5.0).is_none());
    }
}
