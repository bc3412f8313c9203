use std::cell::{Cell, RefCell};
use std::rc::Rc;

use approx::assert_relative_eq;
use chart_adapter::api::{ChartAdapter, ChartConfig, ChartHandle, TargetId};
use chart_adapter::core::{ChartType, Record, SeriesDescriptor, Viewport};
use chart_adapter::error::ChartResult;
use chart_adapter::interaction::ClickEvent;
use chart_adapter::render::{CanvasLayerKind, NullRenderer, RenderFrame, Renderer};

const TARGET: TargetId = TargetId::new(1);

fn measured_adapter() -> ChartAdapter<NullRenderer> {
    let mut adapter = ChartAdapter::headless();
    adapter.attach_target(TARGET);
    adapter.measure_target(TARGET, Viewport::new(600, 400));
    adapter
}

fn sample_records() -> Vec<Record> {
    vec![
        Record::with_category_value("North", 10.0),
        Record::with_category_value("South", 20.0),
        Record::with_category_value("East", 5.0),
    ]
}

struct ReleaseCountingRenderer {
    releases: Rc<Cell<usize>>,
}

impl Renderer for ReleaseCountingRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()
    }

    fn release(&mut self) {
        self.releases.set(self.releases.get() + 1);
    }
}

fn center_of_series_rect(
    adapter: &ChartAdapter<NullRenderer>,
    handle: ChartHandle,
    index: usize,
) -> (f64, f64) {
    let frame = adapter.frame(handle).expect("frame");
    let rect = &frame.layer(CanvasLayerKind::Series).expect("series layer").rects[index];
    (rect.x + rect.width * 0.5, rect.y + rect.height * 0.5)
}

#[test]
fn empty_records_render_zero_series_for_every_chart_type() {
    let mut adapter = measured_adapter();
    for chart_type in [ChartType::Column, ChartType::Line, ChartType::Bar] {
        let handle = adapter.render(TARGET, chart_type, &[], ChartConfig::new());
        let session = adapter.session(handle).expect("live session");
        assert_eq!(session.drawn_series(), 0);
        assert_eq!(session.chart_type(), chart_type);
        assert!(session.frame().validate().is_ok());
    }
    assert_eq!(adapter.live_session_count(), 1);
}

#[test]
fn rendering_twice_leaves_one_chart_and_one_listener_set() {
    let mut adapter = measured_adapter();
    let config = ChartConfig::new().with_click_handler(|_| {});

    let first = adapter.render(TARGET, ChartType::Column, &sample_records(), config.clone());
    let second = adapter.render(TARGET, ChartType::Column, &sample_records(), config);

    assert_eq!(adapter.live_session_count(), 1);
    assert_eq!(adapter.listener_count(TARGET), 1);
    assert!(!adapter.is_live(first));
    assert!(adapter.is_live(second));
    assert_ne!(first, second);
}

#[test]
fn rerender_releases_the_previous_renderer_before_building() {
    let releases = Rc::new(Cell::new(0));
    let shared = Rc::clone(&releases);
    let mut adapter = ChartAdapter::new(move |_| {
        Ok(ReleaseCountingRenderer {
            releases: Rc::clone(&shared),
        })
    });
    adapter.attach_target(TARGET);
    adapter.measure_target(TARGET, Viewport::new(400, 300));

    adapter.render(TARGET, ChartType::Bar, &sample_records(), ChartConfig::new());
    assert_eq!(releases.get(), 0);
    let handle = adapter.render(TARGET, ChartType::Bar, &sample_records(), ChartConfig::new());
    assert_eq!(releases.get(), 1);

    adapter.dispose(handle);
    adapter.dispose(handle);
    assert_eq!(releases.get(), 2);
}

#[test]
fn update_keeps_chart_type_series_and_callback_identity() {
    let mut adapter = measured_adapter();
    let config = ChartConfig::new()
        .with_series(vec![
            SeriesDescriptor::new("a", "A"),
            SeriesDescriptor::new("b", "B"),
        ])
        .with_click_handler(|_| {});
    let records = vec![Record::new("X").with_value("a", 1.0).with_value("b", 2.0)];
    let handle = adapter.render(TARGET, ChartType::Column, &records, config);

    let before = adapter.session(handle).expect("session");
    let listener_ids = before.listeners().ids();
    let callback = before.config().on_click.clone().expect("callback");

    let refreshed = vec![
        Record::new("Y").with_value("a", 3.0),
        Record::new("Z").with_value("b", 4.0),
    ];
    adapter.update(handle, &refreshed);

    let after = adapter.session(handle).expect("session survives update");
    assert_eq!(after.chart_type(), ChartType::Column);
    assert_eq!(after.series_count(), 2);
    assert_eq!(after.listeners().ids(), listener_ids);
    assert!(after.config().on_click.as_ref().expect("callback").same_as(&callback));
    assert_eq!(after.records(), refreshed.as_slice());
    assert_eq!(after.scene().categories.len(), 2);
}

#[test]
fn update_with_empty_records_clears_the_marks() {
    let mut adapter = measured_adapter();
    let handle = adapter.render(TARGET, ChartType::Column, &sample_records(), ChartConfig::new());
    assert_eq!(adapter.session(handle).expect("session").drawn_series(), 1);

    adapter.update(handle, &[]);
    let session = adapter.session(handle).expect("session");
    assert_eq!(session.drawn_series(), 0);
    assert!(session.frame().layer(CanvasLayerKind::Series).is_none());
}

#[test]
fn dispose_is_idempotent_and_detaches_listeners() {
    let mut adapter = measured_adapter();
    let config = ChartConfig::new().with_click_handler(|_| {});
    let handle = adapter.render(TARGET, ChartType::Column, &sample_records(), config);
    assert_eq!(adapter.listener_count(TARGET), 1);

    adapter.dispose(handle);
    adapter.dispose(handle);

    assert_eq!(adapter.listener_count(TARGET), 0);
    assert_eq!(adapter.live_session_count(), 0);
    assert!(!adapter.is_live(handle));
    assert!(!adapter.click(handle, 100.0, 100.0));
}

#[test]
fn bar_axis_maximum_adds_twenty_percent_headroom() {
    let mut adapter = measured_adapter();
    let handle = adapter.render(TARGET, ChartType::Bar, &sample_records(), ChartConfig::new());
    let domain = adapter
        .session(handle)
        .and_then(|session| session.value_domain())
        .expect("domain");
    assert_relative_eq!(domain.min, 0.0);
    assert_relative_eq!(domain.max, 24.0, epsilon = 1e-9);

    let zeros = vec![
        Record::with_category_value("A", 0.0),
        Record::with_category_value("B", 0.0),
        Record::with_category_value("C", 0.0),
    ];
    adapter.update(handle, &zeros);
    let domain = adapter
        .session(handle)
        .and_then(|session| session.value_domain())
        .expect("domain");
    assert_relative_eq!(domain.max, 5.0);
}

#[test]
fn two_series_column_chart_draws_grouped_columns_at_one_category() {
    let mut adapter = measured_adapter();
    let config = ChartConfig::new().with_series(vec![
        SeriesDescriptor::new("a", "A"),
        SeriesDescriptor::new("b", "B"),
    ]);
    let records = vec![Record::new("X").with_value("a", 1.0).with_value("b", 2.0)];
    let handle = adapter.render(TARGET, ChartType::Column, &records, config);

    let session = adapter.session(handle).expect("session");
    let rects = &session
        .frame()
        .layer(CanvasLayerKind::Series)
        .expect("series layer")
        .rects;
    assert_eq!(rects.len(), 2);
    assert!(rects[0].x + rects[0].width <= rects[1].x);
    assert!(rects[1].height > rects[0].height);

    let points: Vec<(usize, &str, f64)> = session
        .scene()
        .snap_points
        .iter()
        .map(|point| (point.series_index, point.category.as_str(), point.value))
        .collect();
    assert_eq!(points, vec![(0, "X", 1.0), (1, "X", 2.0)]);
    assert_eq!(session.drawn_series(), 2);
}

#[test]
fn clicking_a_grouped_column_reports_category_value_and_series() {
    let mut adapter = measured_adapter();
    let clicks: Rc<RefCell<Vec<ClickEvent>>> = Rc::default();
    let sink = Rc::clone(&clicks);
    let config = ChartConfig::new()
        .with_series(vec![
            SeriesDescriptor::new("a", "A"),
            SeriesDescriptor::new("b", "B"),
        ])
        .with_click_handler(move |event| sink.borrow_mut().push(event.clone()));
    let records = vec![Record::new("X").with_value("a", 1.0).with_value("b", 2.0)];
    let handle = adapter.render(TARGET, ChartType::Column, &records, config);

    let (x, y) = center_of_series_rect(&adapter, handle, 0);
    assert!(adapter.click(handle, x, y));

    assert_eq!(
        clicks.borrow().as_slice(),
        &[ClickEvent::new("X", 1.0, Some("A".to_owned()))]
    );
}

#[test]
fn single_series_clicks_carry_no_series_name() {
    let mut adapter = measured_adapter();
    let clicks: Rc<RefCell<Vec<ClickEvent>>> = Rc::default();
    let sink = Rc::clone(&clicks);
    let config =
        ChartConfig::new().with_click_handler(move |event| sink.borrow_mut().push(event.clone()));

    let handle = adapter.render(TARGET, ChartType::Bar, &sample_records(), config.clone());
    let (x, y) = center_of_series_rect(&adapter, handle, 1);
    assert!(adapter.click(handle, x, y));

    let handle = adapter.render(TARGET, ChartType::Column, &sample_records(), config);
    let (x, y) = center_of_series_rect(&adapter, handle, 2);
    assert!(adapter.click(handle, x, y));

    assert_eq!(
        clicks.borrow().as_slice(),
        &[
            ClickEvent::new("South", 20.0, None),
            ClickEvent::new("East", 5.0, None),
        ]
    );
}

#[test]
fn disabling_tooltips_keeps_clicks_working() {
    let mut adapter = measured_adapter();
    let clicks = Rc::new(Cell::new(0));
    let counter = Rc::clone(&clicks);
    let config = ChartConfig::new()
        .with_tooltips(false)
        .with_click_handler(move |_| counter.set(counter.get() + 1));
    let handle = adapter.render(TARGET, ChartType::Column, &sample_records(), config);

    let (x, y) = center_of_series_rect(&adapter, handle, 0);
    adapter.pointer_move(handle, x, y);
    let session = adapter.session(handle).expect("session");
    assert!(session.interaction().hover_targets().is_empty());
    assert!(session.interaction().tooltip.is_none());
    assert!(session.frame().layer(CanvasLayerKind::Tooltip).is_none());

    assert!(adapter.click(handle, x, y));
    assert_eq!(clicks.get(), 1);
}

#[test]
fn tooltips_show_the_formatted_template_on_hover() {
    let mut adapter = measured_adapter();
    let config = ChartConfig::new().with_series(vec![SeriesDescriptor::new("a", "Screened")]);
    let records = vec![Record::new("X").with_value("a", 1_250.5)];
    let handle = adapter.render(TARGET, ChartType::Column, &records, config);

    let (x, y) = center_of_series_rect(&adapter, handle, 0);
    adapter.pointer_move(handle, x, y);
    let session = adapter.session(handle).expect("session");
    let tooltip = session.interaction().tooltip.as_ref().expect("tooltip");
    assert_eq!(tooltip.text, "Screened: 1,250.5");
    assert_eq!(
        session
            .frame()
            .layer(CanvasLayerKind::Tooltip)
            .expect("tooltip layer")
            .texts
            .len(),
        1
    );

    adapter.pointer_leave(handle);
    let session = adapter.session(handle).expect("session");
    assert!(session.interaction().tooltip.is_none());
    assert!(session.frame().layer(CanvasLayerKind::Tooltip).is_none());
}

#[test]
fn unknown_targets_yield_detached_handles() {
    let mut adapter = ChartAdapter::headless();
    let handle = adapter.render(
        TargetId::new(99),
        ChartType::Line,
        &sample_records(),
        ChartConfig::new(),
    );

    assert!(handle.is_detached());
    assert!(!adapter.is_live(handle));
    adapter.update(handle, &[]);
    adapter.dispose(handle);
    assert_eq!(adapter.live_session_count(), 0);
}

#[test]
fn unmeasured_targets_draw_once_measured() {
    let mut adapter = ChartAdapter::headless();
    adapter.attach_target(TARGET);
    let handle = adapter.render(TARGET, ChartType::Column, &sample_records(), ChartConfig::new());

    let session = adapter.session(handle).expect("session");
    assert!(session.frame().is_empty());
    assert!(session.renderer().is_none());

    adapter.measure_target(TARGET, Viewport::new(500, 300));
    let session = adapter.session(handle).expect("session");
    assert_eq!(session.drawn_series(), 1);
    assert_eq!(session.renderer().expect("renderer").render_count, 1);
}

#[test]
fn sync_updates_in_place_until_the_structure_changes() {
    let mut adapter = measured_adapter();
    let config = ChartConfig::new().with_title("Screening");

    let first = adapter.sync(TARGET, ChartType::Column, &sample_records(), config.clone());
    let same = adapter.sync(TARGET, ChartType::Column, &sample_records()[..1], config.clone());
    assert_eq!(first, same);
    assert_eq!(adapter.session(same).expect("session").records().len(), 1);

    let retitled = adapter.sync(
        TARGET,
        ChartType::Column,
        &sample_records(),
        config.clone().with_title("Other"),
    );
    assert_ne!(retitled, first);

    let retyped = adapter.sync(
        TARGET,
        ChartType::Line,
        &sample_records(),
        config.with_title("Other"),
    );
    assert_ne!(retyped, retitled);
    assert_eq!(adapter.live_session_count(), 1);
}

#[test]
fn detaching_a_target_disposes_its_chart() {
    let mut adapter = measured_adapter();
    let handle = adapter.render(TARGET, ChartType::Line, &sample_records(), ChartConfig::new());
    adapter.detach_target(TARGET);

    assert!(!adapter.is_live(handle));
    assert_eq!(adapter.targets().count(), 0);
    let again = adapter.render(TARGET, ChartType::Line, &sample_records(), ChartConfig::new());
    assert!(again.is_detached());
}
