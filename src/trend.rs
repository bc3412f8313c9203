//! Period-trend presets for screening statistics.
//!
//! The statistics gateway returns one row per period, keyed by
//! `{"_id": {"year", "month"?, "day"?}}` with percentage metrics alongside.
//! [`trend_chart`] turns such rows into a strict `0..100 %` line chart.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::api::{ChartAdapter, ChartConfig, ChartHandle, TargetId, ValueAxisConfig};
use crate::core::primitives::parse_numeric_text;
use crate::core::{ChartType, Record, SeriesDescriptor};
use crate::error::{ChartError, ChartResult};
use crate::render::{Color, Renderer};

pub const THAI_MONTH_ABBREVIATIONS: [&str; 12] = [
    "ม.ค.", "ก.พ.", "มี.ค.", "เม.ย.", "พ.ค.", "มิ.ย.",
    "ก.ค.", "ส.ค.", "ก.ย.", "ต.ค.", "พ.ย.", "ธ.ค.",
];

/// Message shown when a trend has no rows.
pub const NO_DATA_MESSAGE: &str = "ไม่มีข้อมูล";

pub const TREND_LABEL_TEXT: &str = "{categoryX} : {valueY}%";

/// Period a statistics row aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodKey {
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
}

impl PeriodKey {
    #[must_use]
    pub const fn year(year: i32) -> Self {
        Self {
            year,
            month: None,
            day: None,
        }
    }

    #[must_use]
    pub const fn month(year: i32, month: u32) -> Self {
        Self {
            year,
            month: Some(month),
            day: None,
        }
    }

    #[must_use]
    pub const fn day(year: i32, month: u32, day: u32) -> Self {
        Self {
            year,
            month: Some(month),
            day: Some(day),
        }
    }

    /// Month, when it names a real calendar month of `year`.
    fn valid_month(self) -> Option<u32> {
        self.month
            .filter(|month| NaiveDate::from_ymd_opt(self.year, *month, 1).is_some())
    }

    /// `(month, day)`, when they name a real calendar day.
    fn valid_day(self) -> Option<(u32, u32)> {
        let month = self.valid_month()?;
        let day = self.day?;
        NaiveDate::from_ymd_opt(self.year, month, day).map(|_| (month, day))
    }
}

/// Granularity of the category labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimePeriod {
    Yearly,
    Monthly,
    Daily,
}

impl TimePeriod {
    /// Category label of `key`. Missing or invalid parts fall back to the
    /// next coarser label.
    #[must_use]
    pub fn label(self, key: PeriodKey) -> String {
        let year = key.year.to_string();
        match self {
            Self::Yearly => year,
            Self::Monthly => key
                .valid_month()
                .map_or(year, |month| month_abbreviation(month).to_owned()),
            Self::Daily => match (key.valid_day(), key.valid_month()) {
                (Some((month, day)), _) => {
                    format!("{day} {} {}", month_abbreviation(month), key.year)
                }
                (None, Some(month)) => format!("{} {}", month_abbreviation(month), key.year),
                (None, None) => year,
            },
        }
    }
}

impl std::str::FromStr for TimePeriod {
    type Err = ChartError;

    fn from_str(value: &str) -> ChartResult<Self> {
        match value.trim() {
            "Yearly" | "yearly" => Ok(Self::Yearly),
            "Monthly" | "monthly" => Ok(Self::Monthly),
            "Daily" | "daily" => Ok(Self::Daily),
            other => Err(ChartError::InvalidData(format!(
                "unsupported time period `{other}`"
            ))),
        }
    }
}

fn month_abbreviation(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|index| THAI_MONTH_ABBREVIATIONS.get(index as usize))
        .copied()
        .unwrap_or_default()
}

/// One aggregated statistics row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPeriodStat", into = "RawPeriodStat")]
pub struct PeriodStat {
    pub period: PeriodKey,
    /// Numeric metrics by field name; non-numeric gateway fields are dropped.
    pub metrics: IndexMap<String, f64>,
}

impl PeriodStat {
    #[must_use]
    pub fn new(period: PeriodKey) -> Self {
        Self {
            period,
            metrics: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_metric(mut self, field: impl Into<String>, value: f64) -> Self {
        if value.is_finite() {
            self.metrics.insert(field.into(), value);
        }
        self
    }

    /// Parses a gateway payload (a JSON array of rows).
    pub fn many_from_json_str(input: &str) -> ChartResult<Vec<Self>> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse period statistics: {e}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawPeriodStat {
    #[serde(rename = "_id")]
    period: PeriodKey,
    #[serde(flatten)]
    fields: IndexMap<String, Value>,
}

impl From<RawPeriodStat> for PeriodStat {
    fn from(raw: RawPeriodStat) -> Self {
        let metrics = raw
            .fields
            .into_iter()
            .filter_map(|(field, value)| {
                let number = match &value {
                    Value::Number(number) => number.as_f64().filter(|v| v.is_finite()),
                    Value::String(text) => parse_numeric_text(text),
                    _ => None,
                };
                if number.is_none() {
                    trace!(field = %field, "dropping non-numeric period metric");
                }
                number.map(|number| (field, number))
            })
            .collect();
        Self {
            period: raw.period,
            metrics,
        }
    }
}

impl From<PeriodStat> for RawPeriodStat {
    fn from(stat: PeriodStat) -> Self {
        Self {
            period: stat.period,
            fields: stat
                .metrics
                .into_iter()
                .filter_map(|(field, value)| {
                    serde_json::Number::from_f64(value).map(|n| (field, Value::Number(n)))
                })
                .collect(),
        }
    }
}

/// Metric presets of the screening dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendKind {
    /// Screening outcomes: BMI, blood pressure, blood sugar.
    Health,
    /// Diagnosed conditions: hypertension, diabetes, depression.
    Disease,
}

impl TrendKind {
    #[must_use]
    pub fn series(self) -> Vec<SeriesDescriptor> {
        let presets: [(&str, &str, Color); 3] = match self {
            Self::Health => [
                ("percentage_is_bmi", "BMI", Color::rgb8(0x38, 0x8E, 0x3C)),
                ("percentage_is_bp", "ความดันโลหิต", Color::rgb8(0x00, 0xC9, 0xD6)),
                ("percentage_is_bs", "ระดับน้ำตาลในเลือด", Color::rgb8(0xE6, 0x51, 0x00)),
            ],
            Self::Disease => [
                ("percentage_high_bp", "โรคความดันโลหิตสูง", Color::rgb8(0x1E, 0x4D, 0x91)),
                ("percentage_high_bs", "โรคเบาหวาน", Color::rgb8(0xFF, 0xC3, 0x00)),
                ("percentage_is_dp", "โรคซึมเศร้า", Color::rgb8(0x6A, 0x05, 0x72)),
            ],
        };
        presets
            .into_iter()
            .map(|(field, name, color)| SeriesDescriptor::new(field, name).with_color(color))
            .collect()
    }
}

/// Records and config of a trend line chart.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendChart {
    pub records: Vec<Record>,
    pub config: ChartConfig,
}

impl TrendChart {
    pub const CHART_TYPE: ChartType = ChartType::Line;

    /// Draws the trend on `target`, updating in place when the target
    /// already shows a trend of the same shape.
    pub fn show<R: Renderer>(
        &self,
        adapter: &mut ChartAdapter<R>,
        target: TargetId,
    ) -> ChartHandle {
        adapter.sync(target, Self::CHART_TYPE, &self.records, self.config.clone())
    }
}

/// Builds the percentage trend of `kind` over `stats`.
///
/// Empty input yields the no-data placeholder with hidden axis labels.
#[must_use]
pub fn trend_chart(kind: TrendKind, period: TimePeriod, stats: &[PeriodStat]) -> TrendChart {
    let series = kind.series();
    let mut value_axis = ValueAxisConfig::percentage();
    let mut config = ChartConfig::new()
        .with_value_labels(false)
        .with_series_label_text(TREND_LABEL_TEXT)
        .with_series(series.clone());

    if stats.is_empty() {
        value_axis.labels_visible = false;
        config = config
            .with_value_axis(value_axis)
            .with_empty_placeholder(NO_DATA_MESSAGE);
        debug!(?kind, "trend has no rows, drawing placeholder");
        return TrendChart {
            records: Vec::new(),
            config,
        };
    }

    let records = stats
        .iter()
        .map(|stat| {
            series.iter().fold(Record::new(period.label(stat.period)), |record, descriptor| {
                match stat.metrics.get(&descriptor.field) {
                    Some(value) => record.with_value(descriptor.field.clone(), *value),
                    None => record,
                }
            })
        })
        .collect();

    TrendChart {
        records,
        config: config.with_value_axis(value_axis),
    }
}
