use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::{ReportageError, Result};

pub mod markdown;

pub use markdown::{to_markdown_table, Formatter, FormatterSet};

/// A single scalar cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Semantic column type driving default cell formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
    Other,
}

/// Minimal tabular contract consumed by the renderer: ordered column names,
/// per-column types, and iteration over rows of nullable cells.
///
/// Rows must have exactly one cell per column; the renderer does not repair
/// mismatched rows.
pub trait TableSource {
    fn columns(&self) -> &[String];

    fn column_type(&self, index: usize) -> ColumnType;

    fn rows(&self) -> Box<dyn Iterator<Item = &[Option<Value>]> + '_>;
}

/// An owned rectangular dataset implementing [`TableSource`].
#[derive(Debug, Clone, Default)]
pub struct DataTable {
    columns: Vec<String>,
    types: Vec<ColumnType>,
    rows: Vec<Vec<Option<Value>>>,
}

impl DataTable {
    /// Create an empty table with the given column names and types.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = (S, ColumnType)>,
        S: Into<String>,
    {
        let (columns, types) = columns
            .into_iter()
            .map(|(name, ty)| (name.into(), ty))
            .unzip();
        Self {
            columns,
            types,
            rows: Vec::new(),
        }
    }

    /// Append a row. The row must have exactly one cell per column.
    pub fn push_row(&mut self, row: Vec<Option<Value>>) -> &mut Self {
        self.rows.push(row);
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Load a table from a CSV file with a header row.
    ///
    /// Column types are inferred: all-integer columns become
    /// [`ColumnType::Integer`], columns where some cell only parses as float
    /// become [`ColumnType::Float`], everything else is [`ColumnType::Text`].
    /// Empty cells become `None`.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_csv_reader(file)
    }

    /// Load a table from CSV data with a header row.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let columns: Vec<String> = rdr
            .headers()
            .map_err(|e| ReportageError::UnsupportedInput(format!("CSV header: {}", e)))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut raw_rows: Vec<Vec<String>> = Vec::new();
        for record in rdr.records() {
            let record =
                record.map_err(|e| ReportageError::UnsupportedInput(format!("CSV row: {}", e)))?;
            raw_rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        let types: Vec<ColumnType> = (0..columns.len())
            .map(|j| infer_column_type(raw_rows.iter().map(|r| r.get(j).map(String::as_str))))
            .collect();

        let rows = raw_rows
            .iter()
            .map(|raw| {
                raw.iter()
                    .enumerate()
                    .map(|(j, cell)| parse_cell(cell, types[j]))
                    .collect()
            })
            .collect();

        Ok(Self {
            columns,
            types,
            rows,
        })
    }

    /// Build a table from a JSON array of row objects.
    ///
    /// Column order follows the first object's keys; keys absent from a later
    /// row become `None`. Anything that is not an array of objects fails with
    /// [`ReportageError::UnsupportedInput`].
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let rows = value.as_array().ok_or_else(|| {
            ReportageError::UnsupportedInput("expected a JSON array of row objects".to_string())
        })?;

        let mut columns: Vec<String> = Vec::new();
        if let Some(first) = rows.first() {
            let obj = first.as_object().ok_or_else(|| {
                ReportageError::UnsupportedInput("row 0 is not a JSON object".to_string())
            })?;
            columns = obj.keys().cloned().collect();
        }

        let mut parsed: Vec<Vec<Option<Value>>> = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let obj = row.as_object().ok_or_else(|| {
                ReportageError::UnsupportedInput(format!("row {} is not a JSON object", i))
            })?;
            parsed.push(
                columns
                    .iter()
                    .map(|name| obj.get(name).and_then(json_cell))
                    .collect(),
            );
        }

        let types = (0..columns.len())
            .map(|j| {
                let mut ty: Option<ColumnType> = None;
                for row in &parsed {
                    let cell_ty = match row.get(j) {
                        Some(Some(Value::Int(_))) => ColumnType::Integer,
                        Some(Some(Value::Float(_))) => ColumnType::Float,
                        Some(Some(Value::Text(_))) => ColumnType::Text,
                        _ => continue,
                    };
                    ty = Some(match (ty, cell_ty) {
                        (None, t) => t,
                        (Some(t), u) if t == u => t,
                        (Some(ColumnType::Integer), ColumnType::Float)
                        | (Some(ColumnType::Float), ColumnType::Integer) => ColumnType::Float,
                        _ => ColumnType::Other,
                    });
                }
                ty.unwrap_or(ColumnType::Other)
            })
            .collect();

        Ok(Self {
            columns,
            types,
            rows: parsed,
        })
    }
}

impl TableSource for DataTable {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn column_type(&self, index: usize) -> ColumnType {
        self.types.get(index).copied().unwrap_or(ColumnType::Other)
    }

    fn rows(&self) -> Box<dyn Iterator<Item = &[Option<Value>]> + '_> {
        Box::new(self.rows.iter().map(|r| r.as_slice()))
    }
}

fn infer_column_type<'a, I: Iterator<Item = Option<&'a str>>>(cells: I) -> ColumnType {
    let mut saw_value = false;
    let mut all_int = true;
    let mut all_numeric = true;

    for cell in cells.flatten() {
        if cell.is_empty() {
            continue;
        }
        saw_value = true;
        if cell.parse::<i64>().is_err() {
            all_int = false;
            if cell.parse::<f64>().is_err() {
                all_numeric = false;
            }
        }
    }

    if !saw_value {
        ColumnType::Other
    } else if all_int {
        ColumnType::Integer
    } else if all_numeric {
        ColumnType::Float
    } else {
        ColumnType::Text
    }
}

fn parse_cell(cell: &str, ty: ColumnType) -> Option<Value> {
    if cell.is_empty() {
        return None;
    }
    match ty {
        ColumnType::Integer => cell.parse::<i64>().ok().map(Value::Int),
        ColumnType::Float => cell.parse::<f64>().ok().map(Value::Float),
        _ => Some(Value::Text(cell.to_string())),
    }
}

fn json_cell(value: &serde_json::Value) -> Option<Value> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(b) => Some(Value::Text(b.to_string())),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Value::Int(i))
            } else {
                n.as_f64().map(Value::Float)
            }
        }
        serde_json::Value::String(s) => Some(Value::Text(s.clone())),
        other => Some(Value::Text(other.to_string())),
    }
}
