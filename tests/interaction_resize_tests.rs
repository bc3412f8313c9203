use std::cell::RefCell;
use std::rc::Rc;

use chart_adapter::api::{ChartAdapter, ChartConfig, TargetId};
use chart_adapter::core::{ChartType, Dimension, Record, SeriesDescriptor, Viewport};
use chart_adapter::interaction::ClickEvent;
use chart_adapter::render::{CanvasLayerKind, NullRenderer};

const TARGET: TargetId = TargetId::new(7);

fn measured_adapter(width: u32, height: u32) -> ChartAdapter<NullRenderer> {
    let mut adapter = ChartAdapter::headless();
    adapter.attach_target(TARGET);
    adapter.measure_target(TARGET, Viewport::new(width, height));
    adapter
}

fn monthly_records() -> Vec<Record> {
    vec![
        Record::with_category_value("Jan", 12.0),
        Record::with_category_value("Feb", 18.0),
        Record::with_category_value("Mar", 9.0),
    ]
}

#[test]
fn line_bullets_report_pointer_down_with_the_series_name() {
    let mut adapter = measured_adapter(640, 360);
    let clicks: Rc<RefCell<Vec<ClickEvent>>> = Rc::default();
    let sink = Rc::clone(&clicks);
    let config = ChartConfig::new()
        .with_line_bullets(true)
        .with_click_handler(move |event| sink.borrow_mut().push(event.clone()));
    let handle = adapter.render(TARGET, ChartType::Line, &monthly_records(), config);

    let point = adapter.session(handle).expect("session").scene().snap_points[1].clone();
    assert!(adapter.pointer_down(handle, point.x, point.y));
    assert!(!adapter.pointer_down(handle, point.x, 1.0));

    assert_eq!(
        clicks.borrow().as_slice(),
        &[ClickEvent::new("Feb", 18.0, Some("LineSeries".to_owned()))]
    );
    let frame = adapter.frame(handle).expect("frame");
    assert_eq!(frame.circles().count(), 3);
    assert_eq!(frame.polylines().count(), 1);
}

#[test]
fn presses_reach_line_markers_and_clicks_reach_columns() {
    let mut adapter = measured_adapter(640, 360);
    let clicks: Rc<RefCell<Vec<ClickEvent>>> = Rc::default();
    let sink = Rc::clone(&clicks);
    let config = ChartConfig::new()
        .with_line_bullets(true)
        .with_click_handler(move |event| sink.borrow_mut().push(event.clone()));

    let handle = adapter.render(TARGET, ChartType::Column, &monthly_records(), config.clone());
    let rect = adapter
        .frame(handle)
        .and_then(|frame| frame.layer(CanvasLayerKind::Series))
        .map(|layer| layer.rects[0])
        .expect("column rect");
    let (x, y) = (rect.x + rect.width * 0.5, rect.y + rect.height * 0.5);
    assert!(!adapter.pointer_down(handle, x, y));
    assert!(clicks.borrow().is_empty());
    assert!(adapter.click(handle, x, y));

    let handle = adapter.render(TARGET, ChartType::Line, &monthly_records(), config);
    let point = adapter.session(handle).expect("session").scene().snap_points[2].clone();
    assert!(!adapter.click(handle, point.x, point.y));
    assert!(adapter.pointer_down(handle, point.x, point.y));

    assert_eq!(
        clicks.borrow().as_slice(),
        &[
            ClickEvent::new("Jan", 12.0, None),
            ClickEvent::new("Mar", 9.0, Some("LineSeries".to_owned())),
        ]
    );
}

#[test]
fn lines_without_bullets_attach_no_listeners() {
    let mut adapter = measured_adapter(640, 360);
    let config = ChartConfig::new().with_click_handler(|_| {});
    let handle = adapter.render(TARGET, ChartType::Line, &monthly_records(), config);

    assert_eq!(adapter.listener_count(TARGET), 0);
    let point = adapter.session(handle).expect("session").scene().snap_points[0].clone();
    assert!(!adapter.pointer_down(handle, point.x, point.y));
}

#[test]
fn absent_values_split_lines_instead_of_failing() {
    let mut adapter = measured_adapter(640, 360);
    let config = ChartConfig::new().with_series(vec![SeriesDescriptor::new("bp", "BP")]);
    let records = vec![
        Record::new("Q1").with_value("bp", 1.0),
        Record::new("Q2").with_value("bp", 2.0),
        Record::new("Q3"),
        Record::new("Q4").with_value("bp", 3.0),
        Record::new("Q5").with_value("bp", 4.0),
    ];
    let handle = adapter.render(TARGET, ChartType::Line, &records, config);

    let session = adapter.session(handle).expect("session");
    assert_eq!(session.frame().polylines().count(), 2);
    assert_eq!(session.scene().snap_points.len(), 4);
    assert_eq!(session.scene().categories.len(), 5);
}

#[test]
fn cursor_snaps_only_to_the_series_of_the_current_render() {
    let mut adapter = measured_adapter(640, 360);
    let two_series = ChartConfig::new().with_series(vec![
        SeriesDescriptor::new("a", "A"),
        SeriesDescriptor::new("b", "B"),
    ]);
    let records = vec![
        Record::new("X").with_value("a", 1.0).with_value("b", 5.0),
        Record::new("Y").with_value("a", 2.0).with_value("b", 6.0),
    ];
    let handle = adapter.render(TARGET, ChartType::Line, &records, two_series);
    assert_eq!(
        adapter.session(handle).expect("session").interaction().cursor.snap_series(),
        &[0, 1]
    );

    let one_series = ChartConfig::new().with_series(vec![SeriesDescriptor::new("b", "B")]);
    let handle = adapter.render(TARGET, ChartType::Line, &records, one_series);
    let point = adapter.session(handle).expect("session").scene().snap_points[0].clone();
    adapter.pointer_move(handle, point.x + 3.0, point.y);

    let session = adapter.session(handle).expect("session");
    assert_eq!(session.interaction().cursor.snap_series(), &[0]);
    let snap = session.interaction().cursor.snap.as_ref().expect("snap");
    assert_eq!(snap.series_name, "B");
    assert_eq!(snap.category, "X");
    assert_eq!(snap.value, 5.0);
    assert!(session.frame().layer(CanvasLayerKind::Cursor).is_some());
}

#[test]
fn line_tooltips_follow_the_snapped_point() {
    let mut adapter = measured_adapter(640, 360);
    let handle = adapter.render(TARGET, ChartType::Line, &monthly_records(), ChartConfig::new());

    let point = adapter.session(handle).expect("session").scene().snap_points[2].clone();
    adapter.pointer_move(handle, point.x - 2.0, point.y - 40.0);

    let tooltip = adapter
        .session(handle)
        .expect("session")
        .interaction()
        .tooltip
        .clone()
        .expect("tooltip");
    assert_eq!(tooltip.text, "9");
    assert_eq!(tooltip.record_index, 2);
}

#[test]
fn resizing_redraws_without_rebuilding() {
    let mut adapter = measured_adapter(600, 400);
    let config = ChartConfig::new().with_click_handler(|_| {});
    let handle = adapter.render(TARGET, ChartType::Column, &monthly_records(), config);
    let listener_ids = adapter.session(handle).expect("session").listeners().ids();

    adapter.measure_target(TARGET, Viewport::new(900, 500));

    assert!(adapter.is_live(handle));
    let session = adapter.session(handle).expect("session");
    assert_eq!(session.listeners().ids(), listener_ids);
    let renderer = session.renderer().expect("renderer");
    assert_eq!(renderer.render_count, 2);
    assert_eq!(renderer.resize_count, 1);
    assert_eq!(renderer.last_viewport, Some(Viewport::new(900, 500)));
    assert_eq!(session.frame().viewport, Viewport::new(900, 500));
}

#[test]
fn becoming_visible_redraws_pending_updates() {
    let mut adapter = measured_adapter(600, 400);
    let handle = adapter.render(TARGET, ChartType::Bar, &monthly_records(), ChartConfig::new());

    adapter.set_target_visible(TARGET, false);
    adapter.update(handle, &monthly_records()[..1]);
    assert_eq!(
        adapter.session(handle).expect("session").renderer().expect("renderer").render_count,
        1
    );

    adapter.set_target_visible(TARGET, true);
    let session = adapter.session(handle).expect("session");
    assert_eq!(session.renderer().expect("renderer").render_count, 2);
    assert_eq!(session.scene().categories.len(), 1);
}

#[test]
fn relative_dimensions_resolve_against_the_container() {
    let mut adapter = measured_adapter(800, 600);
    let config = ChartConfig::new().with_size(Dimension::Percent(50.0), Dimension::Px(300.0));
    let handle = adapter.render(TARGET, ChartType::Column, &monthly_records(), config);

    let session = adapter.session(handle).expect("session");
    assert_eq!(session.viewport(), Some(Viewport::new(400, 300)));
    assert_eq!(session.frame().viewport, Viewport::new(400, 300));
}

#[test]
fn zero_bar_labels_are_hidden_unless_configured() {
    let mut adapter = measured_adapter(600, 400);
    let records = vec![
        Record::with_category_value("A", 0.0),
        Record::with_category_value("B", 3.0),
    ];
    let handle = adapter.render(TARGET, ChartType::Bar, &records, ChartConfig::new());
    let labels = |adapter: &ChartAdapter<NullRenderer>| {
        adapter
            .frame(adapter.live_handle(TARGET).expect("handle"))
            .and_then(|frame| frame.layer(CanvasLayerKind::ValueLabels))
            .map_or(0, |layer| layer.texts.len())
    };
    assert!(adapter.is_live(handle));
    assert_eq!(labels(&adapter), 1);

    adapter.render(
        TARGET,
        ChartType::Bar,
        &records,
        ChartConfig::new().with_hide_zero_bar_labels(false),
    );
    assert_eq!(labels(&adapter), 2);
}

#[test]
fn bar_charts_put_the_first_category_on_top() {
    let mut adapter = measured_adapter(600, 400);
    let handle = adapter.render(TARGET, ChartType::Bar, &monthly_records(), ChartConfig::new());
    let frame = adapter.frame(handle).expect("frame");
    let rects = &frame.layer(CanvasLayerKind::Series).expect("series").rects;
    assert!(rects[0].y < rects[1].y);
    assert!(rects[1].y < rects[2].y);
}

#[test]
fn legend_title_and_placeholder_are_drawn_when_configured() {
    let mut adapter = measured_adapter(600, 400);
    let config = ChartConfig::new()
        .with_title("Screening")
        .with_legend(true)
        .with_series(vec![
            SeriesDescriptor::new("a", "A"),
            SeriesDescriptor::new("b", "B"),
        ])
        .with_empty_placeholder("No data");
    let handle = adapter.render(TARGET, ChartType::Column, &[], config);

    let frame = adapter.frame(handle).expect("frame");
    let legend = frame.layer(CanvasLayerKind::Legend).expect("legend");
    assert_eq!(legend.rects.len(), 2);
    assert!(legend.texts.iter().any(|text| text.text == "Screening" && text.bold));
    assert!(frame.texts().any(|text| text.text == "No data"));
}
