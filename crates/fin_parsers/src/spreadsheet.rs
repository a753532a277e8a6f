use std::io::Cursor;
use calamine::{Data, Range, Reader, Xlsx};
use fin_core::{ExtractedContent, ParseError, Record, SourceFormat};
use serde_json::{Number, Value};
use crate::DocumentParser;

/// First sheet of an `.xlsx` workbook, top row as header.
#[derive(Debug, Clone, Default)]
pub struct SpreadsheetParser;

impl SpreadsheetParser {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentParser for SpreadsheetParser {
    fn format(&self) -> SourceFormat {
        SourceFormat::Spreadsheet
    }

    fn parse(&self, bytes: &[u8]) -> Result<ExtractedContent, ParseError> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))
            .map_err(|e| ParseError::Unreadable(format!("Not a readable workbook: {}", e)))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ParseError::Malformed("Workbook has no sheets".to_string()))?
            .map_err(|e| ParseError::Malformed(format!("Failed to read first sheet: {}", e)))?;

        let (columns, rows) = rows_from_range(&range)?;
        Ok(ExtractedContent::Rows {
            format: SourceFormat::Spreadsheet,
            columns,
            rows,
        })
    }
}

/// Converts a sheet range into the header and records keyed by it.
/// Every record carries every column; empty cells become `null`.
pub fn rows_from_range(range: &Range<Data>) -> Result<(Vec<String>, Vec<Record>), ParseError> {
    let mut sheet_rows = range.rows();
    let header_row = sheet_rows
        .next()
        .ok_or_else(|| ParseError::Malformed("First sheet is empty".to_string()))?;

    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(column, cell)| match cell {
            Data::Empty => format!("column_{}", column + 1),
            other => other.to_string().trim().to_string(),
        })
        .collect();

    let rows = sheet_rows
        .filter(|cells| cells.iter().any(|cell| !matches!(cell, Data::Empty)))
        .map(|cells| {
            headers
                .iter()
                .enumerate()
                .map(|(column, header)| {
                    let value = cells.get(column).map(cell_value).unwrap_or(Value::Null);
                    (header.clone(), value)
                })
                .collect::<Record>()
        })
        .collect();

    Ok((headers, rows))
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::Number((*i).into()),
        Data::Float(f) if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 => {
            Value::Number((*f as i64).into())
        }
        Data::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        Data::Bool(b) => Value::Bool(*b),
        other => Value::String(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUARTERLY_XLSX: &[u8] = include_bytes!("../tests/fixtures/quarterly.xlsx");

    fn sheet(cells: &[(u32, u32, Data)], end: (u32, u32)) -> Range<Data> {
        let mut range = Range::new((0, 0), end);
        for (row, column, value) in cells {
            range.set_value((*row, *column), value.clone());
        }
        range
    }

    #[test]
    fn test_top_row_becomes_keys() {
        let range = sheet(
            &[
                (0, 0, Data::String("month".into())),
                (0, 1, Data::String("revenue".into())),
                (1, 0, Data::String("Jan".into())),
                (1, 1, Data::Float(1200.5)),
                (2, 0, Data::String("Feb".into())),
                (2, 1, Data::Int(900)),
            ],
            (2, 1),
        );
        let (columns, rows) = rows_from_range(&range).unwrap();
        assert_eq!(columns, vec!["month", "revenue"]);
        assert_eq!(rows.len(), 2);
        let keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["month", "revenue"]);
        assert_eq!(rows[0]["revenue"], 1200.5);
        assert_eq!(rows[1]["revenue"], 900);
    }

    #[test]
    fn test_absent_cells_are_null() {
        let range = sheet(
            &[
                (0, 0, Data::String("account".into())),
                (0, 1, Data::String("balance".into())),
                (1, 0, Data::String("Cash".into())),
            ],
            (1, 1),
        );
        let (_, rows) = rows_from_range(&range).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["account"], "Cash");
        assert_eq!(rows[0]["balance"], Value::Null);
    }

    #[test]
    fn test_blank_rows_skipped_and_unnamed_columns_labelled() {
        let range = sheet(
            &[
                (0, 0, Data::String("item".into())),
                (1, 0, Data::String("rent".into())),
                (1, 1, Data::Bool(true)),
                (3, 0, Data::String("fees".into())),
            ],
            (3, 1),
        );
        let (_, rows) = rows_from_range(&range).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["column_2"], true);
        assert_eq!(rows[1]["item"], "fees");
    }

    #[test]
    fn test_whole_floats_become_integers() {
        assert_eq!(cell_value(&Data::Float(100.0)), Value::from(100));
        assert_eq!(cell_value(&Data::Float(-3.0)), Value::from(-3));
        assert_eq!(cell_value(&Data::Float(2.5)), Value::from(2.5));
        assert_eq!(cell_value(&Data::Float(1e30)), Value::from(1e30));
    }

    #[test]
    fn test_reads_only_the_first_sheet_of_a_workbook() {
        let content = SpreadsheetParser::new().parse(QUARTERLY_XLSX).unwrap();
        let (columns, rows) = match content {
            ExtractedContent::Rows { format, columns, rows } => {
                assert_eq!(format, SourceFormat::Spreadsheet);
                (columns, rows)
            }
            other => panic!("expected rows, got {:?}", other),
        };

        assert_eq!(columns, vec!["month", "revenue", "note"]);
        assert_eq!(rows.len(), 3);
        let months: Vec<&Value> = rows.iter().map(|row| &row["month"]).collect();
        assert_eq!(months, vec!["Jan", "Feb", "Mar"]);
        assert_eq!(rows[0]["revenue"], 1200);
        assert_eq!(rows[0]["note"], "on plan");
        assert_eq!(rows[1]["revenue"], 950.5);
        assert_eq!(rows[1]["note"], Value::Null);
        assert!(rows
            .iter()
            .all(|row| row.values().all(|v| v != "forecast" && v != "hidden")));
    }

    #[test]
    fn test_truncated_workbook_yields_nothing() {
        let truncated = &QUARTERLY_XLSX[..QUARTERLY_XLSX.len() / 2];
        let err = SpreadsheetParser::new().parse(truncated).unwrap_err();
        assert!(matches!(err, ParseError::Unreadable(_)));
    }

    #[test]
    fn test_garbage_bytes_are_unreadable() {
        let err = SpreadsheetParser::new().parse(b"definitely not a zip archive").unwrap_err();
        assert!(matches!(err, ParseError::Unreadable(_)));
    }
}
