//! Export stage: generated documents to JSON, row-sets to styled workbooks.

use crate::domain::model::{ExportArtifact, GeneratedDocument, RawRecord, SessionStatus};
use crate::domain::ports::Clipboard;
use crate::utils::error::{DocgenError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rust_xlsxwriter::{
    Color, DocProperties, Format, FormatAlign, FormatBorder, Workbook, Worksheet,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

pub const JSON_MIME: &str = "application/json";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const MAX_SHEET_NAME_CHARS: usize = 31;
const ILLEGAL_SHEET_CHARS: [char; 7] = ['*', ':', '?', '/', '\\', '[', ']'];
const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;

const AUTO_FIT_MIN: f64 = 10.0;
const AUTO_FIT_MAX: f64 = 50.0;
const AUTO_FIT_EMPTY_LEN: usize = 10;

/// Styling switches for one worksheet. Each flag is independent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadsheetOptions {
    /// Header text per source key, overriding the upper-cased key.
    pub header_mapping: HashMap<String, String>,
    pub column_width: f64,
    pub header_color: String,
    pub header_height: f64,
    pub row_height: Option<f64>,
    pub alternate_rows: bool,
    pub alternate_color: String,
    pub auto_fit: bool,
    pub add_borders: bool,
    pub freeze_header: bool,
    pub add_filter: bool,
    /// Workbook author property.
    pub creator: String,
}

impl Default for SpreadsheetOptions {
    fn default() -> Self {
        Self {
            header_mapping: HashMap::new(),
            column_width: 15.0,
            header_color: "366092".to_string(),
            header_height: 25.0,
            row_height: None,
            alternate_rows: false,
            alternate_color: "F2F2F2".to_string(),
            auto_fit: false,
            add_borders: true,
            freeze_header: true,
            add_filter: false,
            creator: "fast-docgen".to_string(),
        }
    }
}

impl SpreadsheetOptions {
    pub fn header_text(&self, key: &str) -> String {
        self.header_mapping
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_uppercase().replace('_', " "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetSpec {
    pub sheet_name: String,
    pub rows: Vec<RawRecord>,
    pub options: SpreadsheetOptions,
}

pub fn json_filename(now: DateTime<Utc>) -> String {
    format!("export_{}.json", now.to_rfc3339_opts(SecondsFormat::Millis, true))
}

pub fn to_json_artifact(document: Option<&GeneratedDocument>) -> Result<ExportArtifact> {
    to_json_artifact_at(document, Utc::now())
}

/// Pretty JSON (2-space indent) in as-constructed key order.
pub fn to_json_artifact_at(
    document: Option<&GeneratedDocument>,
    now: DateTime<Utc>,
) -> Result<ExportArtifact> {
    let document = document.ok_or(DocgenError::NoData)?;
    let bytes = serde_json::to_vec_pretty(document)?;

    Ok(ExportArtifact {
        bytes,
        filename: json_filename(now),
        mime_type: JSON_MIME.to_string(),
        row_count: document.row_count(),
    })
}

pub fn to_spreadsheet_artifact(
    rows: &[RawRecord],
    filename: &str,
    sheet_name: &str,
    options: &SpreadsheetOptions,
) -> Result<ExportArtifact> {
    if rows.is_empty() {
        return Err(DocgenError::EmptyData);
    }

    let mut workbook = new_workbook(&options.creator);
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sanitize_sheet_name(sheet_name))?;
    write_sheet(worksheet, rows, options)?;

    Ok(ExportArtifact {
        bytes: workbook.save_to_buffer()?,
        filename: format!("{}.xlsx", filename),
        mime_type: XLSX_MIME.to_string(),
        row_count: rows.len(),
    })
}

/// One worksheet per non-empty sheet, in input order.
pub fn to_multi_sheet_artifact(sheets: &[SheetSpec], filename: &str) -> Result<ExportArtifact> {
    let creator = sheets
        .first()
        .map(|s| s.options.creator.clone())
        .unwrap_or_else(|| SpreadsheetOptions::default().creator);
    let mut workbook = new_workbook(&creator);
    let mut used_names = BTreeSet::new();
    let mut row_count = 0;

    for sheet in sheets {
        if sheet.rows.is_empty() {
            tracing::debug!("Skipping empty sheet '{}'", sheet.sheet_name);
            continue;
        }

        let name = unique_sheet_name(&sanitize_sheet_name(&sheet.sheet_name), &mut used_names);
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(name)?;
        write_sheet(worksheet, &sheet.rows, &sheet.options)?;
        row_count += sheet.rows.len();
    }

    if used_names.is_empty() {
        tracing::warn!("Every sheet is empty, writing a workbook with a blank sheet");
        workbook.add_worksheet();
    }

    Ok(ExportArtifact {
        bytes: workbook.save_to_buffer()?,
        filename: format!("{}.xlsx", filename),
        mime_type: XLSX_MIME.to_string(),
        row_count,
    })
}

/// Writes the serialized document as text and records the outcome on `status`.
pub fn copy_to_clipboard<C: Clipboard + ?Sized>(
    clipboard: &C,
    document: &GeneratedDocument,
    status: &mut SessionStatus,
) -> bool {
    let copied = serde_json::to_string_pretty(document)
        .map_err(DocgenError::from)
        .and_then(|text| clipboard.write_text(&text));

    match copied {
        Ok(()) => {
            status.copy_status = Some("Copied!".to_string());
            true
        }
        Err(e) => {
            tracing::warn!("Clipboard write failed: {}", e);
            status.copy_status = Some("Failed to copy".to_string());
            false
        }
    }
}

fn new_workbook(creator: &str) -> Workbook {
    let mut workbook = Workbook::new();
    let properties = DocProperties::new().set_author(creator);
    workbook.set_properties(&properties);
    workbook
}

fn write_sheet(worksheet: &mut Worksheet, rows: &[RawRecord], options: &SpreadsheetOptions) -> Result<()> {
    let keys: Vec<String> = rows[0].keys().cloned().collect();
    if keys.len() > MAX_COLS || rows.len() >= MAX_ROWS {
        return Err(DocgenError::InvalidConfigValueError {
            field: "rows".to_string(),
            value: format!("{} rows x {} columns", rows.len(), keys.len()),
            reason: "Exceeds the worksheet size limit".to_string(),
        });
    }

    let headers: Vec<String> = keys.iter().map(|k| options.header_text(k)).collect();
    let header_format = header_format(options);
    let (plain_format, alternate_format) = data_formats(options);

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }
    worksheet.set_row_height(0, options.header_height)?;

    for (idx, row) in rows.iter().enumerate() {
        let row_num = (idx + 1) as u32;
        let format = if options.alternate_rows && idx % 2 == 1 {
            &alternate_format
        } else {
            &plain_format
        };

        for (col, key) in keys.iter().enumerate() {
            write_cell(worksheet, row_num, col as u16, row.get(key), format)?;
        }

        if let Some(height) = options.row_height {
            worksheet.set_row_height(row_num, height)?;
        }
    }

    let widths = if options.auto_fit {
        auto_fit_widths(&keys, &headers, rows)
    } else {
        vec![options.column_width; keys.len()]
    };
    for (col, width) in widths.into_iter().enumerate() {
        worksheet.set_column_width(col as u16, width)?;
    }

    if options.freeze_header {
        worksheet.set_freeze_panes(1, 0)?;
    }

    if options.add_filter {
        if let Some((first_row, first_col, last_row, last_col)) = autofilter_bounds(keys.len()) {
            worksheet.autofilter(first_row, first_col, last_row, last_col)?;
            tracing::debug!("Autofilter on A1:{}1", column_letter(last_col as usize));
        }
    }

    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: Option<&Value>,
    format: &Format,
) -> Result<()> {
    match value {
        None | Some(Value::Null) => {
            worksheet.write_blank(row, col, format)?;
        }
        Some(Value::Bool(b)) => {
            worksheet.write_boolean_with_format(row, col, *b, format)?;
        }
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) => {
                worksheet.write_number_with_format(row, col, f, format)?;
            }
            None => {
                worksheet.write_string_with_format(row, col, n.to_string(), format)?;
            }
        },
        Some(Value::String(s)) => {
            worksheet.write_string_with_format(row, col, s, format)?;
        }
        Some(other) => {
            worksheet.write_string_with_format(row, col, other.to_string(), format)?;
        }
    }
    Ok(())
}

fn header_format(options: &SpreadsheetOptions) -> Format {
    let format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(hex_color(&options.header_color))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);

    if options.add_borders {
        with_border(format)
    } else {
        format
    }
}

fn data_formats(options: &SpreadsheetOptions) -> (Format, Format) {
    let plain = if options.add_borders {
        with_border(Format::new()).set_align(FormatAlign::VerticalCenter)
    } else {
        Format::new()
    };
    let alternate = plain
        .clone()
        .set_background_color(hex_color(&options.alternate_color));
    (plain, alternate)
}

fn with_border(format: Format) -> Format {
    format
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::Black)
}

fn hex_color(value: &str) -> Color {
    u32::from_str_radix(value.trim_start_matches('#'), 16)
        .map(Color::RGB)
        .unwrap_or(Color::Black)
}

/// Text length as shown in the cell; blank cells count as 10.
fn display_len(value: Option<&Value>) -> usize {
    let text = match value {
        None | Some(Value::Null) => return AUTO_FIT_EMPTY_LEN,
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    if text.is_empty() {
        AUTO_FIT_EMPTY_LEN
    } else {
        text.chars().count()
    }
}

fn auto_fit_widths(keys: &[String], headers: &[String], rows: &[RawRecord]) -> Vec<f64> {
    keys.iter()
        .zip(headers)
        .map(|(key, header)| {
            let longest = rows
                .iter()
                .map(|row| display_len(row.get(key)))
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0);
            ((longest + 2) as f64).clamp(AUTO_FIT_MIN, AUTO_FIT_MAX)
        })
        .collect()
}

/// Header row only, `A1` through the last header column.
fn autofilter_bounds(header_count: usize) -> Option<(u32, u16, u32, u16)> {
    header_count
        .checked_sub(1)
        .map(|last_col| (0, 0, 0, last_col as u16))
}

/// Zero-based column index to its letter name (0 -> A, 26 -> AA).
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

pub fn sanitize_sheet_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if ILLEGAL_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim();
    let base = if trimmed.is_empty() { "Sheet" } else { trimmed };
    base.chars().take(MAX_SHEET_NAME_CHARS).collect()
}

fn unique_sheet_name(name: &str, used: &mut BTreeSet<String>) -> String {
    let mut candidate = name.to_string();
    let mut n = 2;
    while used.contains(&candidate.to_lowercase()) {
        let suffix = format!(" {}", n);
        let keep = MAX_SHEET_NAME_CHARS - suffix.chars().count();
        candidate = format!("{}{}", name.chars().take(keep).collect::<String>(), suffix);
        n += 1;
    }
    used.insert(candidate.to_lowercase());
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ingest::ingest;
    use crate::domain::model::{BatchEnvelope, TrxFastDocument};
    use chrono::TimeZone;
    use serde_json::json;

    fn rows(values: Vec<Value>) -> Vec<RawRecord> {
        values
            .into_iter()
            .map(|v| match v {
                Value::Object(obj) => RawRecord::from(obj),
                _ => RawRecord::new(),
            })
            .collect()
    }

    #[test]
    fn test_json_artifact_requires_document() {
        assert!(matches!(to_json_artifact(None), Err(DocgenError::NoData)));
    }

    #[test]
    fn test_json_artifact_pretty_printed_with_timestamp_name() {
        let doc = GeneratedDocument::TrxFast(TrxFastDocument {
            doc_no_app: "DOC".to_string(),
            jumlah_row: 0,
            jumlah_amount: 0.0,
            use_nik: None,
            data: vec![],
        });
        let now = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();

        let artifact = to_json_artifact_at(Some(&doc), now).unwrap();

        assert_eq!(artifact.filename, "export_2025-03-04T05:06:07.000Z.json");
        assert_eq!(artifact.mime_type, JSON_MIME);
        let text = String::from_utf8(artifact.bytes).unwrap();
        assert!(text.starts_with("{\n  \"docNoApp\": \"DOC\",\n  \"jumlahRow\": 0,"));
    }

    #[test]
    fn test_empty_batch_document_exports() {
        let doc = GeneratedDocument::BatchMessage(BatchEnvelope { data: vec![] });
        assert!(to_json_artifact(Some(&doc)).is_ok());
    }

    #[test]
    fn test_spreadsheet_rejects_empty_rows() {
        let err = to_spreadsheet_artifact(&[], "report", "Sheet1", &SpreadsheetOptions::default())
            .unwrap_err();
        assert!(matches!(err, DocgenError::EmptyData));
    }

    #[test]
    fn test_spreadsheet_round_trips_through_ingest() {
        let data = rows(vec![
            json!({"doc_no": "A-1", "amount": 100}),
            json!({"doc_no": "A-2"}),
        ]);
        let options = SpreadsheetOptions {
            alternate_rows: true,
            auto_fit: true,
            add_filter: true,
            ..Default::default()
        };

        let artifact = to_spreadsheet_artifact(&data, "report", "Data", &options).unwrap();

        assert_eq!(artifact.filename, "report.xlsx");
        assert_eq!(artifact.mime_type, XLSX_MIME);
        assert_eq!(artifact.row_count, 2);

        let read_back = ingest(&artifact.bytes, "EXCEL").unwrap();
        assert_eq!(read_back.headers(), ["DOC NO", "AMOUNT"]);
        assert_eq!(read_back.rows().len(), 2);
        assert_eq!(read_back.rows()[0].get("AMOUNT"), Some(&json!(100)));
        assert!(read_back.rows()[1].get("AMOUNT").is_none());
    }

    #[test]
    fn test_header_mapping_overrides_key() {
        let mut options = SpreadsheetOptions::default();
        options
            .header_mapping
            .insert("AIT_AMOUNT1".to_string(), "Amount".to_string());

        assert_eq!(options.header_text("AIT_AMOUNT1"), "Amount");
        assert_eq!(options.header_text("sender_doc_no"), "SENDER DOC NO");
    }

    #[test]
    fn test_auto_fit_bounds() {
        let keys = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let headers = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let data = rows(vec![json!({"a": "x", "b": "y".repeat(80), "c": "exactly-twenty-chars"})]);

        let widths = auto_fit_widths(&keys, &headers, &data);

        assert_eq!(widths, vec![10.0, 50.0, 22.0]);
    }

    #[test]
    fn test_multi_sheet_skips_empty_sheets() {
        let sheets = vec![
            SheetSpec {
                sheet_name: "data".to_string(),
                rows: rows(vec![json!({"ID": 1})]),
                options: SpreadsheetOptions::default(),
            },
            SheetSpec {
                sheet_name: "empty".to_string(),
                rows: vec![],
                options: SpreadsheetOptions::default(),
            },
        ];

        let artifact = to_multi_sheet_artifact(&sheets, "multi_export").unwrap();

        assert_eq!(artifact.filename, "multi_export.xlsx");
        assert_eq!(artifact.row_count, 1);
    }

    #[test]
    fn test_multi_sheet_all_empty_still_exports() {
        let sheets = vec![SheetSpec {
            sheet_name: "empty".to_string(),
            rows: vec![],
            options: SpreadsheetOptions::default(),
        }];

        let artifact = to_multi_sheet_artifact(&sheets, "multi_export").unwrap();

        assert_eq!(artifact.filename, "multi_export.xlsx");
        assert_eq!(artifact.row_count, 0);
        assert!(!artifact.bytes.is_empty());
    }

    #[test]
    fn test_autofilter_spans_header_row() {
        assert_eq!(autofilter_bounds(0), None);
        assert_eq!(autofilter_bounds(1), Some((0, 0, 0, 0)));
        assert_eq!(autofilter_bounds(4), Some((0, 0, 0, 3)));
        assert_eq!(column_letter(3), "D");
    }

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(701), "ZZ");
    }

    #[test]
    fn test_sheet_names() {
        assert_eq!(sanitize_sheet_name("Q1/Q2 [draft]"), "Q1_Q2 _draft_");
        assert_eq!(sanitize_sheet_name("   "), "Sheet");
        assert_eq!(sanitize_sheet_name(&"n".repeat(40)).chars().count(), 31);

        let mut used = BTreeSet::new();
        assert_eq!(unique_sheet_name("data", &mut used), "data");
        assert_eq!(unique_sheet_name("Data", &mut used), "Data 2");
    }

    struct FailingClipboard;

    impl Clipboard for FailingClipboard {
        fn write_text(&self, _text: &str) -> Result<()> {
            Err(DocgenError::IoError(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "no clipboard",
            )))
        }
    }

    #[test]
    fn test_copy_status_on_failure() {
        let doc = GeneratedDocument::BatchMessage(BatchEnvelope { data: vec![] });
        let mut status = SessionStatus::default();

        assert!(!copy_to_clipboard(&FailingClipboard, &doc, &mut status));
        assert_eq!(status.copy_status.as_deref(), Some("Failed to copy"));
    }
}
