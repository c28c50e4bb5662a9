use pretty_assertions::assert_eq;
use reportage::table::{to_markdown_table, Formatter, FormatterSet};
use reportage::{ColumnType, DataTable, Value};

fn sample_table() -> DataTable {
    let mut table = DataTable::new([
        ("id", ColumnType::Integer),
        ("bignumber", ColumnType::Integer),
        ("percent", ColumnType::Float),
        ("precision", ColumnType::Float),
        ("text", ColumnType::Text),
    ]);
    table.push_row(vec![
        Some(Value::Int(1)),
        Some(Value::Int(1_000_000)),
        Some(Value::Float(0.1234)),
        Some(Value::Float(1.23456)),
        Some(Value::Text("A".to_string())),
    ]);
    table.push_row(vec![
        Some(Value::Int(2)),
        Some(Value::Int(2_000_000)),
        Some(Value::Float(0.2345)),
        Some(Value::Float(2.34567)),
        Some(Value::Text("B".to_string())),
    ]);
    table.push_row(vec![
        Some(Value::Int(3)),
        Some(Value::Int(3_000_000)),
        Some(Value::Float(0.3456)),
        Some(Value::Float(3.45678)),
        Some(Value::Text("C".to_string())),
    ]);
    table
}

#[test]
fn basic_table_formatting() {
    let result = to_markdown_table(&sample_table(), true, &FormatterSet::new());
    let lines: Vec<&str> = result.lines().collect();

    assert_eq!(lines[0], "| id | bignumber | percent | precision | text |");
    assert_eq!(lines[1], "| :-- | --: | --: | --: | --: |");
    // header + separator + 3 rows
    assert_eq!(lines.len(), 5);
}

#[test]
fn integer_comma_formatting() {
    let result = to_markdown_table(&sample_table(), true, &FormatterSet::new());

    assert!(result.contains("1,000,000"));
    assert!(result.contains("2,000,000"));
    assert!(result.contains("3,000,000"));
}

#[test]
fn named_percent_formatters() {
    let mut table = DataTable::new([
        ("percent1", ColumnType::Float),
        ("percent2", ColumnType::Float),
    ]);
    for v in [0.1234, 0.2345, 0.3456] {
        table.push_row(vec![Some(Value::Float(v)), Some(Value::Float(v))]);
    }
    let formatters = FormatterSet::new()
        .column("percent1", Formatter::Percent100)
        .column("percent2", Formatter::Percent);

    let result = to_markdown_table(&table, true, &formatters);
    let lines: Vec<&str> = result.lines().collect();

    assert_eq!(lines[2], "| 12.34% | 0.12% |");
    assert_eq!(lines[3], "| 23.45% | 0.23% |");
    assert_eq!(lines[4], "| 34.56% | 0.35% |");
}

#[test]
fn custom_closure_formatters() {
    let mut table = DataTable::new([("value", ColumnType::Float)]);
    table.push_row(vec![Some(Value::Float(0.5))]);

    let formatters = FormatterSet::new().column(
        "value",
        Formatter::Custom(Box::new(|v| format!("<{}>", v))),
    );
    let result = to_markdown_table(&table, true, &formatters);

    assert!(result.contains("| <0.5> |"));
}

#[test]
fn default_formatting_by_column_type() {
    let result = to_markdown_table(&sample_table(), true, &FormatterSet::new());
    let lines: Vec<&str> = result.lines().collect();

    assert_eq!(lines[2], "| 1 | 1,000,000 | 0.12 | 1.23 | A |");
    assert_eq!(lines[3], "| 2 | 2,000,000 | 0.23 | 2.35 | B |");
    assert_eq!(lines[4], "| 3 | 3,000,000 | 0.35 | 3.46 | C |");
}

#[test]
fn none_values_render_empty() {
    let mut table = DataTable::new([
        ("id", ColumnType::Integer),
        ("missing", ColumnType::Float),
    ]);
    table.push_row(vec![Some(Value::Int(1)), None]);

    let result = to_markdown_table(&table, true, &FormatterSet::new());
    assert!(result.contains("| 1 |  |"));
}

#[test]
fn none_beats_any_formatter() {
    let mut table = DataTable::new([("value", ColumnType::Float)]);
    table.push_row(vec![None]);

    let formatters = FormatterSet::new().column(
        "value",
        Formatter::Custom(Box::new(|_| "never".to_string())),
    );
    let result = to_markdown_table(&table, true, &formatters);
    let lines: Vec<&str> = result.lines().collect();

    assert_eq!(lines[2], "|  |");
}

#[test]
fn name_formatter_beats_index_formatter() {
    let mut table = DataTable::new([("value", ColumnType::Float)]);
    table.push_row(vec![Some(Value::Float(0.1234))]);

    let formatters = FormatterSet::new()
        .column("value", Formatter::Percent100)
        .index(0, Formatter::Percent);
    let result = to_markdown_table(&table, true, &formatters);

    assert!(result.contains("| 12.34% |"));
}

#[test]
fn index_formatter_beats_type_default() {
    let mut table = DataTable::new([("value", ColumnType::Integer)]);
    table.push_row(vec![Some(Value::Int(1))]);

    let formatters = FormatterSet::new().index(0, Formatter::Round);
    let result = to_markdown_table(&table, true, &formatters);

    assert!(result.contains("| 1.00 |"));
}

#[test]
fn align_first_col_left() {
    let mut table = DataTable::new([("col1", ColumnType::Integer), ("col2", ColumnType::Integer)]);
    table.push_row(vec![Some(Value::Int(1)), Some(Value::Int(3))]);
    table.push_row(vec![Some(Value::Int(2)), Some(Value::Int(4))]);

    let left = to_markdown_table(&table, true, &FormatterSet::new());
    assert!(left.contains("| :-- | --: |"));

    let right = to_markdown_table(&table, false, &FormatterSet::new());
    assert!(right.contains("| --: | --: |"));
}

#[test]
fn empty_table_is_header_and_separator_only() {
    let table = DataTable::new([("col1", ColumnType::Other), ("col2", ColumnType::Other)]);
    let result = to_markdown_table(&table, true, &FormatterSet::new());
    let lines: Vec<&str> = result.lines().collect();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "| col1 | col2 |");
}

#[test]
fn single_row_table() {
    let mut table = DataTable::new([("col1", ColumnType::Integer), ("col2", ColumnType::Integer)]);
    table.push_row(vec![Some(Value::Int(1)), Some(Value::Int(2))]);

    let result = to_markdown_table(&table, true, &FormatterSet::new());
    assert_eq!(result.lines().count(), 3);
}

#[test]
fn category_value_scenario() {
    let mut table = DataTable::new([
        ("category", ColumnType::Text),
        ("value", ColumnType::Integer),
    ]);
    for (cat, val) in [("A", 1), ("B", 2), ("C", 3)] {
        table.push_row(vec![
            Some(Value::Text(cat.to_string())),
            Some(Value::Int(val)),
        ]);
    }

    let result = to_markdown_table(&table, true, &FormatterSet::new());
    let expected = "\
| category | value |
| :-- | --: |
| A | 1 |
| B | 2 |
| C | 3 |";
    assert_eq!(result, expected);
}
