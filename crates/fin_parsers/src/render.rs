use fin_core::{ExtractedContent, ParseError, Record};
use serde_json::Value;

/// Renders extracted content as the text block injected into prompts.
///
/// Rows come out as CSV: the source header first, then any key a row has
/// beyond it in first-seen order. Missing and `null` cells render empty.
/// Content with no columns at all renders as an empty string.
pub fn content_to_context(content: &ExtractedContent) -> Result<String, ParseError> {
    match content {
        ExtractedContent::Text { text, .. } => Ok(text.clone()),
        ExtractedContent::Rows { columns, rows, .. } => rows_to_csv(columns, rows),
    }
}

fn rows_to_csv(header: &[String], rows: &[Record]) -> Result<String, ParseError> {
    let mut columns: Vec<&str> = header.iter().map(String::as_str).collect();
    for row in rows {
        for key in row.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key.as_str());
            }
        }
    }

    if columns.is_empty() {
        return Ok(String::new());
    }

    let mut writer = ::csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns).map_err(render_error)?;
    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| match row.get(*column) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            })
            .collect();
        writer.write_record(&cells).map_err(render_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ParseError::Malformed(format!("Failed to render rows: {}", e)))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| ParseError::Unreadable(format!("Rendered rows are not UTF-8: {}", e)))?;
    Ok(text.trim_end().to_string())
}

fn render_error(e: ::csv::Error) -> ParseError {
    ParseError::Malformed(format!("Failed to render rows: {}", e))
}
