use serde_json::{Map, Number, Value};
use std::fmt;
use tracing::trace;

use crate::domain::{NOT_AVAILABLE, PVError};
use crate::snapshot::Record;

pub const RATING_SCALE: u8 = 5;
pub const OUT_OF_STOCK: &str = "Out of Stock";
pub const NO_DIMENSIONS: &str = "No dimensions available";
pub const NO_META: &str = "No meta information available";

/// A display ready cell. Renderers draw the `Display` form, images are handed
/// over as references so the renderer can decide how to show them.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(Number),
    Image(String),
    Images(Vec<String>),
}

impl CellValue {
    fn not_available() -> Self {
        CellValue::Text(NOT_AVAILABLE.to_string())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => f.write_str(&display_number(n)),
            CellValue::Image(url) => f.write_str(url),
            CellValue::Images(urls) => f.write_str(&urls.join(", ")),
        }
    }
}

pub type FormatFn = fn(Option<&Value>) -> CellValue;

/// How a raw field value is turned into a [`CellValue`].
///
/// Every variant is total: a missing, null or mistyped field results in a
/// fallback value, never in an error.
#[derive(Debug, Clone, Copy)]
pub enum Formatter {
    Text,
    Number,
    Currency { symbol: char },
    Ratio,
    Rating,
    Quantity,
    TagList,
    Reviews,
    Dimensions,
    Meta,
    Image,
    ImageList,
    Custom(FormatFn),
}

impl Formatter {
    pub fn format(&self, value: Option<&Value>) -> CellValue {
        let value = value.filter(|v| !v.is_null());
        match self {
            Formatter::Text => value.map_or_else(CellValue::not_available, |v| {
                CellValue::Text(scalar_text(v))
            }),
            Formatter::Number => match value {
                Some(Value::Number(n)) => CellValue::Number(n.clone()),
                Some(v) => CellValue::Text(scalar_text(v)),
                None => CellValue::not_available(),
            },
            Formatter::Currency { symbol } => match value.and_then(Value::as_f64) {
                Some(price) => CellValue::Text(format!("{symbol}{price:.2}")),
                None => CellValue::not_available(),
            },
            Formatter::Ratio => match value.and_then(Value::as_f64) {
                Some(ratio) => CellValue::Text(format!("{ratio:.2}")),
                None => CellValue::not_available(),
            },
            Formatter::Rating => match value {
                Some(Value::Number(n)) => {
                    CellValue::Text(format!("{} / {}", display_number(n), RATING_SCALE))
                }
                _ => CellValue::not_available(),
            },
            Formatter::Quantity => match value.and_then(quantity) {
                Some(n) if n.as_f64().is_some_and(|q| q > 0.0) => CellValue::Number(n),
                _ => CellValue::Text(OUT_OF_STOCK.to_string()),
            },
            Formatter::TagList => match value {
                Some(Value::Array(tags)) => CellValue::Text(
                    tags.iter()
                        .map(scalar_text)
                        .collect::<Vec<String>>()
                        .join(", "),
                ),
                _ => CellValue::not_available(),
            },
            Formatter::Reviews => match value {
                Some(Value::Array(reviews)) => CellValue::Text(
                    reviews
                        .iter()
                        .map(review_summary)
                        .collect::<Vec<String>>()
                        .join("\n\n"),
                ),
                _ => CellValue::not_available(),
            },
            Formatter::Dimensions => match value {
                Some(Value::Object(dim)) => CellValue::Text(format!(
                    "Width: {}, Height: {}, Depth: {}",
                    sub_field(dim, "width"),
                    sub_field(dim, "height"),
                    sub_field(dim, "depth"),
                )),
                _ => CellValue::Text(NO_DIMENSIONS.to_string()),
            },
            Formatter::Meta => match value {
                Some(Value::Object(meta)) => CellValue::Text(format!(
                    "Created At: {}, Updated At: {}, Barcode: {}, QR Code: {}",
                    sub_field(meta, "createdAt"),
                    sub_field(meta, "updatedAt"),
                    sub_field(meta, "barcode"),
                    sub_field(meta, "qrCode"),
                )),
                _ => CellValue::Text(NO_META.to_string()),
            },
            Formatter::Image => match value {
                Some(Value::String(url)) => CellValue::Image(url.clone()),
                _ => CellValue::not_available(),
            },
            Formatter::ImageList => match value {
                Some(Value::Array(images)) => CellValue::Images(
                    images
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect(),
                ),
                _ => CellValue::not_available(),
            },
            Formatter::Custom(format) => format(value),
        }
    }
}

// Numbers that are integral are shown without a fraction, 4.0 => "4"
pub fn display_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

// Stock counts may arrive as numeric strings, "5" counts like 5
fn quantity(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .map(Number::from)
                .or_else(|| s.parse::<f64>().ok().and_then(Number::from_f64))
        }
        _ => None,
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => NOT_AVAILABLE.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => display_number(n),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn sub_field(object: &Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .map_or_else(|| NOT_AVAILABLE.to_string(), scalar_text)
}

fn review_summary(review: &Value) -> String {
    let Some(review) = review.as_object() else {
        return NOT_AVAILABLE.to_string();
    };
    ["rating", "comment", "date", "reviewerName", "reviewerEmail"]
        .iter()
        .map(|key| format!("{key}: {}", sub_field(review, key)))
        .collect::<Vec<String>>()
        .join("\n")
}

#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: String,
    pub header: String,
    pub formatter: Formatter,
}

impl ColumnDef {
    pub fn cell(&self, record: &Record) -> CellValue {
        self.formatter.format(record.get(&self.key))
    }
}

/// Ordered set of column definitions. Declaration order is the left to right
/// order of the rendered table.
#[derive(Debug, Clone, Default)]
pub struct ColumnModel {
    columns: Vec<ColumnDef>,
}

impl ColumnModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(
        &mut self,
        key: impl Into<String>,
        header: impl Into<String>,
        formatter: Formatter,
    ) -> Result<&mut Self, PVError> {
        let key = key.into();
        if self.columns.iter().any(|c| c.key == key) {
            return Err(PVError::DuplicateColumn(key));
        }
        let header = header.into();
        trace!("Define column \"{key}\" => \"{header}\" ({formatter:?})");
        self.columns.push(ColumnDef {
            key,
            header,
            formatter,
        });
        Ok(self)
    }

    /// Maps every declared column key to the display value of `record`.
    pub fn project<'a>(&'a self, record: &Record) -> Vec<(&'a str, CellValue)> {
        self.columns
            .iter()
            .map(|c| (c.key.as_str(), c.cell(record)))
            .collect()
    }

    pub fn cells(&self, record: &Record) -> Vec<CellValue> {
        self.columns.iter().map(|c| c.cell(record)).collect()
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.header.as_str()).collect()
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
