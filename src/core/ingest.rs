//! File ingestion: spreadsheet or JSON bytes into an [`IngestResult`].

use crate::domain::model::{number_value, IngestResult, RawRecord, RowSet, SourceKind};
use crate::utils::error::{DocgenError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use serde_json::{json, Value};
use std::io::Cursor;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads `bytes` according to the declared file type (`EXCEL` or `JSON`).
pub fn ingest(bytes: &[u8], declared_type: &str) -> Result<IngestResult> {
    let kind: SourceKind = declared_type.parse()?;
    ingest_as(bytes, kind)
}

pub fn ingest_as(bytes: &[u8], kind: SourceKind) -> Result<IngestResult> {
    let result = match kind {
        SourceKind::Spreadsheet => read_spreadsheet(bytes)?,
        SourceKind::JsonArray => read_json(bytes)?,
    };

    match &result {
        IngestResult::Table(set) => tracing::debug!(
            "Ingested {} rows with {} headers from {}",
            set.rows.len(),
            set.headers.len(),
            kind
        ),
        IngestResult::Passthrough(_) => {
            tracing::warn!("JSON source is not a non-empty array, keeping it verbatim")
        }
    }

    Ok(result)
}

fn read_spreadsheet(bytes: &[u8]) -> Result<IngestResult> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => {
            return Err(DocgenError::EmptySource {
                reason: "No worksheet found in Excel file".to_string(),
            })
        }
    };

    let (last_row, last_col) = range.end().ok_or_else(|| DocgenError::EmptySource {
        reason: "Worksheet is empty".to_string(),
    })?;

    let headers = read_headers(&range, last_col);
    if headers.is_empty() {
        return Err(DocgenError::EmptySource {
            reason: "Header row is empty".to_string(),
        });
    }

    let mut rows = Vec::new();
    for row in 1..=last_row {
        let mut record = RawRecord::new();
        let mut populated = false;

        for col in 0..=last_col {
            let Some(value) = range.get_value((row, col)).and_then(cell_value) else {
                continue;
            };
            // 重複的表頭直接覆蓋前一個值
            match headers.get(col as usize) {
                Some(header) => {
                    record.insert(header.clone(), value);
                    populated = true;
                }
                None => tracing::debug!("Dropping cell at row {}, col {} outside the header row", row + 1, col + 1),
            }
        }

        if populated {
            rows.push(record);
        }
    }

    if rows.is_empty() {
        return Err(DocgenError::EmptySource {
            reason: "No data rows found below the header row".to_string(),
        });
    }

    Ok(IngestResult::Table(RowSet {
        headers,
        rows,
        source_kind: SourceKind::Spreadsheet,
    }))
}

/// Row 1 up to its last populated cell; blanks become `Column N`.
fn read_headers(range: &Range<Data>, last_col: u32) -> Vec<String> {
    let width = (0..=last_col)
        .rev()
        .find(|&col| range.get_value((0, col)).and_then(cell_value).is_some())
        .map(|col| col + 1)
        .unwrap_or(0);

    (0..width)
        .map(|col| {
            range
                .get_value((0, col))
                .and_then(cell_value)
                .map(|value| header_text(&value))
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| format!("Column {}", col + 1))
        })
        .collect()
}

fn header_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(obj) => obj
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        other => other.to_string(),
    }
}

fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(Value::String(s.clone())),
        Data::Int(i) => Some(Value::from(*i)),
        Data::Float(f) => Some(number_value(*f)),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::DateTime(dt) => {
            let as_date = if dt.is_datetime() { dt.as_datetime() } else { None };
            Some(match as_date {
                Some(naive) => Value::String(naive.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()),
                None => number_value(dt.as_f64()),
            })
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Value::String(s.clone())),
        Data::Error(e) => Some(json!({ "error": e.to_string() })),
    }
}

fn read_json(bytes: &[u8]) -> Result<IngestResult> {
    let text = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let value: Value = serde_json::from_slice(text).map_err(DocgenError::MalformedJson)?;

    match value {
        Value::Array(items) if !items.is_empty() => {
            let headers = items[0]
                .as_object()
                .map(|obj| obj.keys().cloned().collect())
                .unwrap_or_default();

            // 非物件元素保留為空紀錄，列數與陣列長度一致
            let rows = items
                .into_iter()
                .map(|item| match item {
                    Value::Object(obj) => RawRecord::from(obj),
                    _ => RawRecord::new(),
                })
                .collect();

            Ok(IngestResult::Table(RowSet {
                headers,
                rows,
                source_kind: SourceKind::JsonArray,
            }))
        }
        other => Ok(IngestResult::Passthrough(other)),
    }
}
