use ::csv::ReaderBuilder;
use fin_core::{ExtractedContent, ParseError, Record, SourceFormat};
use serde_json::Value;
use tracing::debug;
use crate::DocumentParser;

/// Header-row CSV. Short rows keep only the keys they have values for;
/// cells past the header width are dropped. Physically empty lines are
/// skipped by the reader; a row of empty cells still counts as a row.
#[derive(Debug, Clone, Default)]
pub struct CsvParser;

impl CsvParser {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentParser for CsvParser {
    fn format(&self) -> SourceFormat {
        SourceFormat::Csv
    }

    fn parse(&self, bytes: &[u8]) -> Result<ExtractedContent, ParseError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ParseError::Unreadable(format!("CSV is not valid UTF-8: {}", e)))?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| ParseError::Malformed(format!("Invalid CSV header: {}", e)))?
            .clone();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(ParseError::Malformed("CSV has no header row".to_string()));
        }

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                ParseError::Malformed(format!("Invalid CSV row {}: {}", index + 2, e))
            })?;
            if record.len() > headers.len() {
                debug!(
                    "CSV row {} has {} cells for {} columns, dropping the extra cells",
                    index + 2,
                    record.len(),
                    headers.len()
                );
            }

            let mut row = Record::new();
            for (header, value) in headers.iter().zip(record.iter()) {
                row.insert(header.to_string(), Value::String(value.to_string()));
            }
            rows.push(row);
        }

        Ok(ExtractedContent::Rows {
            format: SourceFormat::Csv,
            columns: headers.iter().map(str::to_string).collect(),
            rows,
        })
    }
}
