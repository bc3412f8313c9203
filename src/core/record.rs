use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{trace, warn};

use crate::core::primitives::parse_numeric_text;
use crate::error::{ChartError, ChartResult};
use crate::render::Color;

/// Field name read by single-series charts.
pub const DEFAULT_VALUE_FIELD: &str = "value";
/// Reserved field carrying the category label.
pub const CATEGORY_FIELD: &str = "category";

/// One data row: a category label plus named numeric fields.
///
/// Values that are not finite numbers never enter a record; they are treated
/// as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRecord", into = "RawRecord")]
pub struct Record {
    category: String,
    values: IndexMap<String, f64>,
}

impl Record {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            values: IndexMap::new(),
        }
    }

    /// Single-series shorthand: a record with only the `value` field.
    pub fn with_category_value(category: impl Into<String>, value: f64) -> Self {
        Self::new(category).with_value(DEFAULT_VALUE_FIELD, value)
    }

    #[must_use]
    pub fn with_value(mut self, field: impl Into<String>, value: f64) -> Self {
        self.set_value(field, value);
        self
    }

    pub fn set_value(&mut self, field: impl Into<String>, value: f64) {
        let field = field.into();
        if field == CATEGORY_FIELD {
            trace!("ignoring numeric value assigned to the category field");
            return;
        }
        if value.is_finite() {
            self.values.insert(field, value);
        } else {
            trace!(field = %field, "dropping non-finite record value");
            self.values.shift_remove(&field);
        }
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn value(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(field, value)| (field.as_str(), *value))
    }

    /// Builds a record from a loosely-typed JSON object.
    ///
    /// `category` is required (numbers are stringified). Every other field is
    /// coerced: numbers pass through, numeric strings are parsed, anything
    /// else is dropped.
    pub fn from_json(value: &Value) -> ChartResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            ChartError::InvalidData("record must be a JSON object".to_owned())
        })?;
        let category = object
            .get(CATEGORY_FIELD)
            .and_then(category_label)
            .ok_or_else(|| {
                ChartError::InvalidData("record is missing the `category` field".to_owned())
            })?;

        let mut record = Self::new(category);
        for (field, raw) in object {
            if field == CATEGORY_FIELD {
                continue;
            }
            match coerce_numeric(raw) {
                Some(number) => record.set_value(field.clone(), number),
                None => trace!(field = %field, "treating non-numeric record value as absent"),
            }
        }
        Ok(record)
    }

    /// Parses a JSON array of records, skipping rows without a category.
    pub fn many_from_json(value: &Value) -> ChartResult<Vec<Self>> {
        let rows = value.as_array().ok_or_else(|| {
            ChartError::InvalidData("records payload must be a JSON array".to_owned())
        })?;
        Ok(rows
            .iter()
            .filter_map(|row| match Self::from_json(row) {
                Ok(record) => Some(record),
                Err(err) => {
                    trace!(error = %err, "skipping malformed record row");
                    None
                }
            })
            .collect())
    }
}

fn category_label(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn coerce_numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|v| v.is_finite()),
        Value::String(text) => parse_numeric_text(text),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawRecord {
    category: Value,
    #[serde(flatten)]
    fields: IndexMap<String, Value>,
}

impl TryFrom<RawRecord> for Record {
    type Error = ChartError;

    fn try_from(raw: RawRecord) -> ChartResult<Self> {
        let category = category_label(&raw.category).ok_or_else(|| {
            ChartError::InvalidData("record category must be a string or number".to_owned())
        })?;
        let mut record = Self::new(category);
        for (field, value) in &raw.fields {
            if let Some(number) = coerce_numeric(value) {
                record.set_value(field.clone(), number);
            }
        }
        Ok(record)
    }
}

impl From<Record> for RawRecord {
    fn from(record: Record) -> Self {
        Self {
            category: Value::String(record.category),
            fields: record
                .values
                .into_iter()
                .filter_map(|(field, value)| {
                    serde_json::Number::from_f64(value).map(|n| (field, Value::Number(n)))
                })
                .collect(),
        }
    }
}

/// Maps one numeric field to a named, optionally colored series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesDescriptor {
    pub field: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl SeriesDescriptor {
    pub fn new(field: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            name: name.into(),
            color: None,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.field.trim().is_empty() {
            return Err(ChartError::InvalidData(
                "series field must not be empty".to_owned(),
            ));
        }
        if self.field == CATEGORY_FIELD {
            return Err(ChartError::InvalidData(
                "series field must not be the category field".to_owned(),
            ));
        }
        if let Some(color) = self.color {
            color.validate()?;
        }
        Ok(())
    }
}

/// Series resolved for one chart invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSeries {
    pub field: String,
    pub name: String,
    pub color: Color,
}

/// Declared numeric fields of one chart invocation.
///
/// `explicit` is true when the series came from caller descriptors rather
/// than the implicit single `value` series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSchema {
    series: Vec<ResolvedSeries>,
    explicit: bool,
}

impl RecordSchema {
    /// Resolves the series list.
    ///
    /// Invalid descriptors are skipped. Explicit series take their own color,
    /// then the palette entry at their position, then `fallback_color`. When
    /// no valid descriptor remains, a single implicit series named
    /// `implicit_name` reads [`DEFAULT_VALUE_FIELD`] and takes the first
    /// palette color.
    #[must_use]
    pub fn resolve(
        descriptors: &[SeriesDescriptor],
        implicit_name: &str,
        palette: &[Color],
        fallback_color: Color,
    ) -> Self {
        let series: Vec<ResolvedSeries> = descriptors
            .iter()
            .filter(|descriptor| match descriptor.validate() {
                Ok(()) => true,
                Err(err) => {
                    warn!(
                        field = %descriptor.field,
                        error = %err,
                        "skipping invalid series descriptor"
                    );
                    false
                }
            })
            .enumerate()
            .map(|(index, descriptor)| ResolvedSeries {
                field: descriptor.field.clone(),
                name: descriptor.name.clone(),
                color: descriptor
                    .color
                    .or_else(|| palette.get(index).copied())
                    .unwrap_or(fallback_color),
            })
            .collect();

        if series.is_empty() {
            return Self::implicit(
                implicit_name,
                palette.first().copied().unwrap_or(fallback_color),
            );
        }
        Self {
            series,
            explicit: true,
        }
    }

    #[must_use]
    pub fn implicit(name: &str, color: Color) -> Self {
        Self {
            series: vec![ResolvedSeries {
                field: DEFAULT_VALUE_FIELD.to_owned(),
                name: name.to_owned(),
                color,
            }],
            explicit: false,
        }
    }

    #[must_use]
    pub fn series(&self) -> &[ResolvedSeries] {
        &self.series
    }

    #[must_use]
    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    /// Values of every series, one entry per record, `None` where absent.
    #[must_use]
    pub fn project(&self, records: &[Record]) -> Vec<Vec<Option<f64>>> {
        self.series
            .iter()
            .map(|series| {
                records
                    .iter()
                    .map(|record| record.value(&series.field))
                    .collect()
            })
            .collect()
    }
}
