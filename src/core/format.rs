//! Row shaping before export, and the key/header view used for previews.

use crate::domain::model::RawRecord;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// source key -> exported key
    pub field_mapping: HashMap<String, String>,
    pub exclude_fields: Vec<String>,
    /// Render dates and large numbers the way id-ID users read them.
    pub localize_values: bool,
}

impl FormatOptions {
    pub fn is_noop(&self) -> bool {
        self.field_mapping.is_empty() && self.exclude_fields.is_empty() && !self.localize_values
    }
}

pub fn format_rows_for_export(rows: &[RawRecord], options: &FormatOptions) -> Vec<RawRecord> {
    rows.iter().map(|row| format_row(row, options)).collect()
}

fn format_row(row: &RawRecord, options: &FormatOptions) -> RawRecord {
    let mut formatted = RawRecord::new();
    for (key, value) in &row.data {
        if options.exclude_fields.iter().any(|f| f == key) {
            continue;
        }
        let name = options.field_mapping.get(key).unwrap_or(key);
        let value = if options.localize_values {
            localize_value(value)
        } else {
            value.clone()
        };
        formatted.insert(name.clone(), value);
    }
    formatted
}

fn localize_value(value: &Value) -> Value {
    match value {
        Value::Null => Value::String(String::new()),
        Value::String(s) => match DateTime::parse_from_rfc3339(s) {
            Ok(date) => Value::String(date.format("%-d/%-m/%Y").to_string()),
            Err(_) => value.clone(),
        },
        Value::Number(n) => match n.as_f64() {
            Some(f) if f > 1000.0 => Value::String(format_id_number(f)),
            _ => value.clone(),
        },
        other => other.clone(),
    }
}

/// `1234567.891` -> `1.234.567,891` (at most three fraction digits).
pub fn format_id_number(value: f64) -> String {
    let rounded = format!("{:.3}", value);
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));

    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let mut grouped = String::new();
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let frac = frac_part.trim_end_matches('0');
    if frac.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{},{}", sign, grouped, frac)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableViewOptions {
    pub include_keys: Vec<String>,
    pub exclude_keys: Vec<String>,
}

/// Keys and display headers for a tabular preview of ingested rows.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub raw_keys: Vec<String>,
    pub headers: Vec<String>,
    pub row_count: usize,
}

impl TableView {
    pub fn new(rows: &[RawRecord], options: &TableViewOptions) -> Self {
        let raw_keys: Vec<String> = match rows.first() {
            None => options.include_keys.clone(),
            Some(first) => first
                .keys()
                .filter(|k| options.include_keys.is_empty() || options.include_keys.contains(*k))
                .filter(|k| !options.exclude_keys.contains(*k))
                .cloned()
                .collect(),
        };
        let headers = raw_keys.iter().map(|k| title_case_header(k)).collect();

        Self {
            raw_keys,
            headers,
            row_count: rows.len(),
        }
    }
}

/// `sender_doc_no` -> `Sender Doc No`
pub fn title_case_header(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut out = String::with_capacity(spaced.len());
    let mut at_word_start = true;
    for ch in spaced.chars() {
        if at_word_start && ch.is_alphanumeric() {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = !ch.is_alphanumeric();
    }
    out
}
