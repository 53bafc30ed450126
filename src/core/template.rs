//! Template generation: ingested rows + frozen form fields into a document.

use crate::domain::model::{
    BatchEnvelope, BatchMessage, GeneratedDocument, IngestResult, RawRecord, ScalarContext,
    TemplateName, TrxFastDocument,
};
use crate::utils::error::Result;
use serde_json::{Map, Value};

pub const DEFAULT_AMOUNT_COLUMN: &str = "AIT_AMOUNT1";
pub const FAST_SEQ_NO: &str = "1";

/// Builds the document selected by `template_name`.
///
/// `ingested` may be absent (nothing loaded yet) or a JSON passthrough; both
/// generate a document with no rows.
pub fn generate(
    template_name: &str,
    context: &ScalarContext,
    ingested: Option<&IngestResult>,
    amount_column: &str,
) -> Result<GeneratedDocument> {
    let template: TemplateName = template_name.parse()?;

    let rows: &[RawRecord] = match ingested {
        Some(IngestResult::Table(set)) => set.rows.as_slice(),
        Some(IngestResult::Passthrough(_)) => {
            tracing::warn!("Generating {} from a JSON passthrough source with no rows", template);
            &[]
        }
        None => &[],
    };

    let document = if template.is_batch_message() {
        GeneratedDocument::BatchMessage(batch_message(template, context, rows)?)
    } else {
        GeneratedDocument::TrxFast(trx_fast(context, rows, amount_column))
    };

    tracing::debug!("Generated {} document with {} rows", template, rows.len());
    Ok(document)
}

fn batch_message(
    template: TemplateName,
    context: &ScalarContext,
    rows: &[RawRecord],
) -> Result<BatchEnvelope> {
    let msg_content = rows
        .iter()
        .map(encode_message)
        .collect::<Result<Vec<_>>>()?;

    Ok(BatchEnvelope {
        data: vec![BatchMessage {
            fast_seq_no: FAST_SEQ_NO.to_string(),
            msg_content,
            json_name: template,
            source_system: context.source_system.clone(),
            sender_doc_no: context.document_number.clone(),
        }],
    })
}

/// `{"data": {...row...}}` as a compact JSON string.
pub fn encode_message(row: &RawRecord) -> Result<String> {
    let mut wrapper = Map::new();
    wrapper.insert("data".to_string(), Value::Object(row.data.clone()));
    Ok(serde_json::to_string(&Value::Object(wrapper))?)
}

fn trx_fast(context: &ScalarContext, rows: &[RawRecord], amount_column: &str) -> TrxFastDocument {
    TrxFastDocument {
        doc_no_app: context.document_number.clone(),
        jumlah_row: rows.len(),
        jumlah_amount: sum_amount(rows, amount_column),
        use_nik: context.use_nik.clone(),
        data: rows.to_vec(),
    }
}

/// Missing or non-numeric values contribute 0.
pub fn sum_amount(rows: &[RawRecord], amount_column: &str) -> f64 {
    rows.iter()
        .map(|row| row.get(amount_column).map(coerce_amount).unwrap_or(0.0))
        .sum()
}

fn coerce_amount(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{RowSet, SourceKind};
    use crate::utils::error::DocgenError;
    use serde_json::json;

    fn context() -> ScalarContext {
        ScalarContext {
            document_number: "DOC-0001".to_string(),
            template_name: String::new(),
            source_system: "CORE".to_string(),
            use_nik: Some("3201".to_string()),
        }
    }

    fn table(rows: Vec<Value>) -> IngestResult {
        IngestResult::Table(RowSet {
            headers: vec![],
            rows: rows
                .into_iter()
                .map(|v| match v {
                    Value::Object(obj) => RawRecord::from(obj),
                    _ => RawRecord::new(),
                })
                .collect(),
            source_kind: SourceKind::JsonArray,
        })
    }

    #[test]
    fn test_unknown_template() {
        let err = generate("INVOICE", &context(), None, DEFAULT_AMOUNT_COLUMN).unwrap_err();
        assert!(matches!(err, DocgenError::UnknownTemplate { .. }));
    }

    #[test]
    fn test_trx_fast_scenario() {
        let ingested = table(vec![
            json!({"AIT_AMOUNT1": "100"}),
            json!({"AIT_AMOUNT1": "bad"}),
            json!({}),
        ]);

        let doc = generate("TRX_FAST", &context(), Some(&ingested), DEFAULT_AMOUNT_COLUMN).unwrap();

        let GeneratedDocument::TrxFast(trx) = doc else {
            panic!("expected TRX_FAST document");
        };
        assert_eq!(trx.jumlah_row, 3);
        assert_eq!(trx.jumlah_amount, 100.0);
        assert_eq!(trx.doc_no_app, "DOC-0001");
        assert_eq!(trx.use_nik.as_deref(), Some("3201"));
        assert_eq!(trx.data[0].get("AIT_AMOUNT1"), Some(&json!("100")));
    }

    #[test]
    fn test_trx_fast_mixes_numbers_and_strings() {
        let ingested = table(vec![
            json!({"AIT_AMOUNT1": 250.5}),
            json!({"AIT_AMOUNT1": " 49.5 "}),
            json!({"AIT_AMOUNT1": null}),
            json!({"AIT_AMOUNT1": true}),
        ]);

        let doc = generate("TRX_FAST", &context(), Some(&ingested), DEFAULT_AMOUNT_COLUMN).unwrap();

        let GeneratedDocument::TrxFast(trx) = doc else {
            panic!("expected TRX_FAST document");
        };
        assert_eq!(trx.jumlah_amount, 300.0);
        assert_eq!(trx.jumlah_row, 4);
    }

    #[test]
    fn test_trx_fast_empty_rows() {
        let doc = generate("TRX_FAST", &context(), None, DEFAULT_AMOUNT_COLUMN).unwrap();

        let GeneratedDocument::TrxFast(trx) = doc else {
            panic!("expected TRX_FAST document");
        };
        assert_eq!(trx.jumlah_row, 0);
        assert_eq!(trx.jumlah_amount, 0.0);
        assert!(trx.data.is_empty());
    }

    #[test]
    fn test_custom_amount_column() {
        let ingested = table(vec![json!({"NOMINAL": 10}), json!({"NOMINAL": "5"})]);
        assert_eq!(sum_amount(ingested.rows(), "NOMINAL"), 15.0);
        assert_eq!(sum_amount(ingested.rows(), DEFAULT_AMOUNT_COLUMN), 0.0);
    }

    #[test]
    fn test_batch_message_double_encodes_rows() {
        let ingested = table(vec![
            json!({"ID": "1", "NAME": "alpha"}),
            json!({"ID": "2", "NAME": "beta"}),
        ]);

        let doc = generate("SCHEDULE", &context(), Some(&ingested), DEFAULT_AMOUNT_COLUMN).unwrap();

        let GeneratedDocument::BatchMessage(envelope) = doc else {
            panic!("expected batch-message document");
        };
        assert_eq!(envelope.data.len(), 1);
        let message = &envelope.data[0];
        assert_eq!(message.fast_seq_no, "1");
        assert_eq!(message.json_name, TemplateName::Schedule);
        assert_eq!(message.sender_doc_no, "DOC-0001");
        assert_eq!(message.source_system, "CORE");
        assert_eq!(
            message.msg_content,
            vec![
                r#"{"data":{"ID":"1","NAME":"alpha"}}"#.to_string(),
                r#"{"data":{"ID":"2","NAME":"beta"}}"#.to_string(),
            ]
        );
    }

    #[test]
    fn test_mixed_json_array_yields_one_message_per_element() {
        let ingested = crate::core::ingest::ingest(br#"[{"a": 1}, {"a": 2}, 5]"#, "JSON").unwrap();

        let doc = generate("MASTER", &context(), Some(&ingested), DEFAULT_AMOUNT_COLUMN).unwrap();

        let GeneratedDocument::BatchMessage(envelope) = doc else {
            panic!("expected batch-message document");
        };
        assert_eq!(
            envelope.data[0].msg_content,
            vec![
                r#"{"data":{"a":1}}"#.to_string(),
                r#"{"data":{"a":2}}"#.to_string(),
                r#"{"data":{}}"#.to_string(),
            ]
        );
    }

    #[test]
    fn test_batch_message_without_rows() {
        let passthrough = IngestResult::Passthrough(json!([]));

        let doc = generate("MASTER", &context(), Some(&passthrough), DEFAULT_AMOUNT_COLUMN).unwrap();

        assert_eq!(doc.row_count(), 0);
        let text = serde_json::to_string(&doc).unwrap();
        assert_eq!(
            text,
            r#"{"data":[{"fastSeqNo":"1","msgContent":[],"jsonName":"MASTER","sourceSystem":"CORE","senderDocNo":"DOC-0001"}]}"#
        );
    }
}
