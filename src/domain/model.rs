use crate::utils::error::DocgenError;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::str::FromStr;

/// One ingested row: header -> cell value, in source column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    pub data: Map<String, Value>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.data.insert(key.into(), value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(data: Map<String, Value>) -> Self {
        Self { data }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    Spreadsheet,
    JsonArray,
}

impl FromStr for SourceKind {
    type Err = DocgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EXCEL" | "XLSX" | "SPREADSHEET" => Ok(Self::Spreadsheet),
            "JSON" => Ok(Self::JsonArray),
            _ => Err(DocgenError::UnsupportedFormat {
                declared: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spreadsheet => write!(f, "EXCEL"),
            Self::JsonArray => write!(f, "JSON"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowSet {
    pub headers: Vec<String>,
    pub rows: Vec<RawRecord>,
    pub source_kind: SourceKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IngestResult {
    Table(RowSet),
    /// JSON that is not a non-empty array, kept verbatim.
    Passthrough(Value),
}

impl IngestResult {
    pub fn headers(&self) -> &[String] {
        match self {
            Self::Table(set) => &set.headers,
            Self::Passthrough(_) => &[],
        }
    }

    pub fn rows(&self) -> &[RawRecord] {
        match self {
            Self::Table(set) => &set.rows,
            Self::Passthrough(_) => &[],
        }
    }

    pub fn source_kind(&self) -> SourceKind {
        match self {
            Self::Table(set) => set.source_kind,
            Self::Passthrough(_) => SourceKind::JsonArray,
        }
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self, Self::Passthrough(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateName {
    #[serde(rename = "MASTER")]
    Master,
    #[serde(rename = "SCHEDULE")]
    Schedule,
    #[serde(rename = "RC_SCHEDULE")]
    RcSchedule,
    #[serde(rename = "RESCHEDULE")]
    Reschedule,
    #[serde(rename = "CANCEL_PPD")]
    CancelPpd,
    #[serde(rename = "TRX_FAST")]
    TrxFast,
}

impl TemplateName {
    pub const ALL: [TemplateName; 6] = [
        Self::Master,
        Self::Schedule,
        Self::RcSchedule,
        Self::Reschedule,
        Self::CancelPpd,
        Self::TrxFast,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Master => "MASTER",
            Self::Schedule => "SCHEDULE",
            Self::RcSchedule => "RC_SCHEDULE",
            Self::Reschedule => "RESCHEDULE",
            Self::CancelPpd => "CANCEL_PPD",
            Self::TrxFast => "TRX_FAST",
        }
    }

    pub fn is_batch_message(&self) -> bool {
        !matches!(self, Self::TrxFast)
    }
}

impl FromStr for TemplateName {
    type Err = DocgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == name)
            .ok_or_else(|| DocgenError::UnknownTemplate {
                name: name.to_string(),
            })
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frozen document-level fields handed to template generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalarContext {
    pub document_number: String,
    pub template_name: String,
    pub source_system: String,
    pub use_nik: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMessage {
    pub fast_seq_no: String,
    pub msg_content: Vec<String>,
    pub json_name: TemplateName,
    pub source_system: String,
    pub sender_doc_no: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchEnvelope {
    pub data: Vec<BatchMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrxFastDocument {
    pub doc_no_app: String,
    pub jumlah_row: usize,
    #[serde(serialize_with = "serialize_amount")]
    pub jumlah_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_nik: Option<String>,
    pub data: Vec<RawRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeneratedDocument {
    BatchMessage(BatchEnvelope),
    TrxFast(TrxFastDocument),
}

impl GeneratedDocument {
    pub fn template_name(&self) -> Option<TemplateName> {
        match self {
            Self::BatchMessage(envelope) => envelope.data.first().map(|m| m.json_name),
            Self::TrxFast(_) => Some(TemplateName::TrxFast),
        }
    }

    /// Number of source rows carried by the document.
    pub fn row_count(&self) -> usize {
        match self {
            Self::BatchMessage(envelope) => envelope.data.iter().map(|m| m.msg_content.len()).sum(),
            Self::TrxFast(doc) => doc.jumlah_row,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
    pub row_count: usize,
}

/// Status flags a host shell binds to its busy indicator and error banner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStatus {
    pub is_processing: bool,
    pub error_message: Option<String>,
    pub copy_status: Option<String>,
}

impl SessionStatus {
    pub fn begin(&mut self) {
        self.is_processing = true;
        self.error_message = None;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }

    pub fn finish(&mut self) {
        self.is_processing = false;
    }
}

/// Whole floats render without a fractional part, like a JS number.
pub(crate) fn number_value(value: f64) -> Value {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE {
        Value::Number(Number::from(value as i64))
    } else {
        Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
    }
}

fn serialize_amount<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    number_value(*value).serialize(serializer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_name_parsing() {
        assert_eq!("TRX_FAST".parse::<TemplateName>().unwrap(), TemplateName::TrxFast);
        assert_eq!(" RC_SCHEDULE ".parse::<TemplateName>().unwrap(), TemplateName::RcSchedule);
        assert!(matches!(
            "INVOICE".parse::<TemplateName>(),
            Err(DocgenError::UnknownTemplate { .. })
        ));
        assert!(TemplateName::CancelPpd.is_batch_message());
        assert!(!TemplateName::TrxFast.is_batch_message());
    }

    #[test]
    fn test_source_kind_parsing() {
        assert_eq!("excel".parse::<SourceKind>().unwrap(), SourceKind::Spreadsheet);
        assert_eq!("JSON".parse::<SourceKind>().unwrap(), SourceKind::JsonArray);
        assert!(matches!(
            "CSV".parse::<SourceKind>(),
            Err(DocgenError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_number_value_drops_whole_fraction() {
        assert_eq!(number_value(100.0).to_string(), "100");
        assert_eq!(number_value(12.5).to_string(), "12.5");
        assert_eq!(number_value(f64::NAN), Value::Null);
    }

    fn record(value: Value) -> RawRecord {
        match value {
            Value::Object(obj) => RawRecord::from(obj),
            _ => RawRecord::new(),
        }
    }

    #[test]
    fn test_generated_documents_survive_json_round_trip() {
        let batch = GeneratedDocument::BatchMessage(BatchEnvelope {
            data: vec![BatchMessage {
                fast_seq_no: "1".to_string(),
                msg_content: vec![r#"{"data":{"CIF":"001","LIMIT":5000}}"#.to_string()],
                json_name: TemplateName::Master,
                source_system: "LOS".to_string(),
                sender_doc_no: "250101R00001".to_string(),
            }],
        });
        let trx = GeneratedDocument::TrxFast(TrxFastDocument {
            doc_no_app: "APP-0001".to_string(),
            jumlah_row: 2,
            jumlah_amount: 350.5,
            use_nik: Some("3201".to_string()),
            data: vec![
                record(serde_json::json!({"AIT_ID": 1, "AIT_AMOUNT1": "100"})),
                record(serde_json::json!({"AIT_ID": 2, "AIT_AMOUNT1": 250.5, "NOTE": null})),
            ],
        });

        for doc in [batch, trx] {
            let text = serde_json::to_string_pretty(&doc).unwrap();
            let parsed: GeneratedDocument = serde_json::from_str(&text).unwrap();
            assert_eq!(parsed, doc);
            assert_eq!(parsed.template_name(), doc.template_name());
        }
    }

    #[test]
    fn test_trx_fast_omits_missing_use_nik() {
        let doc = GeneratedDocument::TrxFast(TrxFastDocument {
            doc_no_app: "DOC1".to_string(),
            jumlah_row: 0,
            jumlah_amount: 0.0,
            use_nik: None,
            data: vec![],
        });
        let text = serde_json::to_string(&doc).unwrap();
        assert_eq!(text, r#"{"docNoApp":"DOC1","jumlahRow":0,"jumlahAmount":0,"data":[]}"#);
    }
}
