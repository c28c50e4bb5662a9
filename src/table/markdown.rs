use std::collections::HashMap;

use super::{ColumnType, TableSource, Value};

/// A cell formatting rule: one of the named built-ins or a caller-supplied
/// closure over a single value.
pub enum Formatter {
    /// `0.1234` -> `"0.12%"`
    Percent,
    /// `0.1234` -> `"12.34%"`
    Percent100,
    /// Two decimals, thousands-separated.
    Round,
    /// Nearest integer, thousands-separated.
    RoundInt,
    Custom(Box<dyn Fn(&Value) -> String + Send + Sync>),
}

impl Formatter {
    /// Resolve a built-in formatter by name.
    pub fn from_name(name: &str) -> Option<Formatter> {
        match name {
            "percent" => Some(Formatter::Percent),
            "percent100" => Some(Formatter::Percent100),
            "round" => Some(Formatter::Round),
            "round_int" => Some(Formatter::RoundInt),
            _ => None,
        }
    }

    fn apply(&self, value: &Value) -> String {
        match self {
            Formatter::Percent => match value.as_f64() {
                Some(v) => format!("{}%", format_float(v)),
                None => value.to_string(),
            },
            Formatter::Percent100 => match value.as_f64() {
                Some(v) => format!("{}%", format_float(100.0 * v)),
                None => value.to_string(),
            },
            Formatter::Round => match value.as_f64() {
                Some(v) => format_float(v),
                None => value.to_string(),
            },
            Formatter::RoundInt => match value {
                Value::Int(i) => format_int(*i),
                Value::Float(f) => format_int(f.round() as i64),
                Value::Text(_) => value.to_string(),
            },
            Formatter::Custom(f) => f(value),
        }
    }
}

/// Formatter overrides for one render call, keyed by column name or position.
///
/// Resolution order: name, then position, then the column's type default.
#[derive(Default)]
pub struct FormatterSet {
    by_name: HashMap<String, Formatter>,
    by_index: HashMap<usize, Formatter>,
}

impl FormatterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a formatter to a column by name.
    pub fn column(mut self, name: impl Into<String>, formatter: Formatter) -> Self {
        self.by_name.insert(name.into(), formatter);
        self
    }

    /// Attach a formatter to a column by position.
    pub fn index(mut self, index: usize, formatter: Formatter) -> Self {
        self.by_index.insert(index, formatter);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty() && self.by_index.is_empty()
    }

    fn resolve(&self, name: &str, index: usize) -> Option<&Formatter> {
        self.by_name.get(name).or_else(|| self.by_index.get(&index))
    }
}

/// Render a [`TableSource`] as a GitHub-style Markdown pipe table.
///
/// The first column is left-aligned when `align_first_left` is set, all other
/// columns are right-aligned. Missing cells render empty regardless of any
/// formatter. Zero rows yields just the header and alignment lines.
pub fn to_markdown_table(
    table: &dyn TableSource,
    align_first_left: bool,
    formatters: &FormatterSet,
) -> String {
    let headers = table.columns();

    let header_line = format!("| {} |", headers.join(" | "));
    let aligns: Vec<&str> = (0..headers.len())
        .map(|i| {
            if i == 0 && align_first_left {
                ":--"
            } else {
                "--:"
            }
        })
        .collect();
    let sep_line = format!("| {} |", aligns.join(" | "));

    let mut lines = vec![header_line, sep_line];

    for row in table.rows() {
        let cells: Vec<String> = row
            .iter()
            .zip(headers)
            .enumerate()
            .map(|(j, (cell, name))| match cell {
                None => String::new(),
                Some(value) => match formatters.resolve(name, j) {
                    Some(f) => f.apply(value),
                    None => match table.column_type(j) {
                        ColumnType::Integer => Formatter::RoundInt.apply(value),
                        ColumnType::Float => Formatter::Round.apply(value),
                        ColumnType::Text | ColumnType::Other => value.to_string(),
                    },
                },
            })
            .collect();
        lines.push(format!("| {} |", cells.join(" | ")));
    }

    lines.join("\n")
}

/// Thousands-separated integer, e.g. `1000000` -> `"1,000,000"`.
pub fn format_int(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let grouped = group_digits(&digits);
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Two decimals with thousands separators, e.g. `1234.5` -> `"1,234.50"`.
///
/// Ties at the third decimal follow the standard formatter (round half to
/// even over the exact binary value).
pub fn format_float(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let (number, negative) = match fixed.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (fixed.as_str(), false),
    };
    let (int_part, frac_part) = number.split_once('.').unwrap_or((number, "00"));
    let grouped = group_digits(int_part);
    if negative {
        format!("-{}.{}", grouped, frac_part)
    } else {
        format!("{}.{}", grouped, frac_part)
    }
}

fn group_digits(digits: &str) -> String {
    let mut result = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
