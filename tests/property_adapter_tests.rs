use chart_adapter::api::{
    BAR_AXIS_FALLBACK_MAX, BAR_AXIS_HEADROOM, ChartAdapter, ChartConfig, TargetId, bar_axis_max,
};
use chart_adapter::core::{ChartType, Record, SeriesDescriptor, Viewport};
use chart_adapter::render::{CanvasLayerKind, NullRenderer};
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

const TARGET: TargetId = TargetId::new(21);

fn measured_adapter() -> ChartAdapter<NullRenderer> {
    let mut adapter = ChartAdapter::headless();
    adapter.attach_target(TARGET);
    adapter.measure_target(TARGET, Viewport::new(800, 480));
    adapter
}

fn chart_type_strategy() -> impl Strategy<Value = ChartType> {
    prop_oneof![
        Just(ChartType::Column),
        Just(ChartType::Line),
        Just(ChartType::Bar),
    ]
}

fn two_series_config() -> ChartConfig {
    ChartConfig::new()
        .with_line_bullets(true)
        .with_series(vec![
            SeriesDescriptor::new("a", "A"),
            SeriesDescriptor::new("b", "B"),
        ])
        .with_click_handler(|_| {})
}

fn paired_records(values: &[(f64, f64)]) -> Vec<Record> {
    values
        .iter()
        .enumerate()
        .map(|(index, (a, b))| {
            Record::new(format!("C{index}"))
                .with_value("a", *a)
                .with_value("b", *b)
        })
        .collect()
}

proptest! {
    #[test]
    fn bar_axis_max_is_headroom_over_the_largest_positive_value(
        values in prop::collection::vec(-1_000.0f64..1_000.0, 0..24)
    ) {
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let expected = if max > 0.0 { max * BAR_AXIS_HEADROOM } else { BAR_AXIS_FALLBACK_MAX };
        prop_assert!((bar_axis_max(values.iter().copied()) - expected).abs() <= 1e-9);
    }

    #[test]
    fn repeated_renders_keep_a_single_listener_set(
        chart_type in chart_type_strategy(),
        renders in 1usize..6,
        values in prop::collection::vec((0.0f64..500.0, 0.0f64..500.0), 1..8)
    ) {
        let mut adapter = measured_adapter();
        let records = paired_records(&values);
        let mut handle = None;
        for _ in 0..renders {
            handle = Some(adapter.render(TARGET, chart_type, &records, two_series_config()));
        }
        let handle = handle.expect("rendered at least once");
        let series = adapter.session(handle).expect("session").series_count();

        prop_assert_eq!(adapter.live_session_count(), 1);
        prop_assert_eq!(adapter.listener_count(TARGET), series);
        prop_assert_eq!(handle.generation(), renders as u64);
    }

    #[test]
    fn updates_never_change_the_series_count(
        chart_type in chart_type_strategy(),
        first in prop::collection::vec((-50.0f64..500.0, -50.0f64..500.0), 0..8),
        second in prop::collection::vec((-50.0f64..500.0, -50.0f64..500.0), 0..8)
    ) {
        let mut adapter = measured_adapter();
        let handle =
            adapter.render(TARGET, chart_type, &paired_records(&first), two_series_config());
        let before = adapter.session(handle).expect("session").series_count();
        let listeners = adapter.listener_count(TARGET);

        adapter.update(handle, &paired_records(&second));

        let session = adapter.session(handle).expect("session");
        prop_assert_eq!(session.series_count(), before);
        prop_assert!(session.drawn_series() <= before);
        prop_assert_eq!(adapter.listener_count(TARGET), listeners);
        prop_assert!(session.frame().validate().is_ok());
    }

    #[test]
    fn clicking_inside_a_column_reports_that_column(
        values in prop::collection::vec(1.0f64..1_000.0, 1..8),
        pick in any::<prop::sample::Index>()
    ) {
        let clicks = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&clicks);
        let config = ChartConfig::new()
            .with_click_handler(move |event| sink.borrow_mut().push(event.clone()));
        let records: Vec<Record> = values
            .iter()
            .enumerate()
            .map(|(index, value)| Record::with_category_value(format!("C{index}"), *value))
            .collect();

        let mut adapter = measured_adapter();
        let handle = adapter.render(TARGET, ChartType::Column, &records, config);
        let index = pick.index(values.len());
        let rect = adapter
            .frame(handle)
            .and_then(|frame| frame.layer(CanvasLayerKind::Series))
            .map(|layer| layer.rects[index])
            .expect("column rect");

        prop_assert!(adapter.click(
            handle,
            rect.x + rect.width * 0.5,
            rect.y + rect.height * 0.5
        ));
        let clicks = clicks.borrow();
        prop_assert_eq!(clicks.len(), 1);
        prop_assert_eq!(clicks[0].category.as_str(), records[index].category());
        prop_assert_eq!(clicks[0].value, values[index]);
        prop_assert_eq!(clicks[0].series_name.as_deref(), None);
    }
}
