use crate::core::export::{
    to_json_artifact, to_multi_sheet_artifact, to_spreadsheet_artifact, SheetSpec,
};
use crate::core::format::format_rows_for_export;
use crate::core::ingest::ingest;
use crate::core::template::generate;
use crate::core::{ConfigProvider, OutputFormat, Pipeline, Storage};
use crate::domain::model::{
    number_value, ExportArtifact, GeneratedDocument, IngestResult, RawRecord, ScalarContext,
    TrxFastDocument,
};
use crate::utils::error::Result;
use serde_json::Value;

pub const DATA_SHEET_NAME: &str = "data";
pub const SUMMARY_SHEET_NAME: &str = "summary";

/// Reads one source file, generates the selected template and writes every
/// configured output format to storage.
pub struct FilePipeline<S: Storage, C: ConfigProvider> {
    source: S,
    storage: S,
    config: C,
    input: String,
    declared_type: String,
    context: ScalarContext,
}

impl<S: Storage, C: ConfigProvider> FilePipeline<S, C> {
    pub fn new(
        source: S,
        storage: S,
        config: C,
        input: impl Into<String>,
        declared_type: impl Into<String>,
        context: ScalarContext,
    ) -> Self {
        Self {
            source,
            storage,
            config,
            input: input.into(),
            declared_type: declared_type.into(),
            context,
        }
    }

    fn spreadsheet_artifact(
        &self,
        ingested: &IngestResult,
        document: &GeneratedDocument,
    ) -> Result<ExportArtifact> {
        let format_options = self.config.format_options();
        let options = self.config.spreadsheet_options();
        let filename = self.config.export_filename();

        let source_rows = match document {
            GeneratedDocument::TrxFast(trx) => trx.data.as_slice(),
            GeneratedDocument::BatchMessage(_) => ingested.rows(),
        };
        let rows = if format_options.is_noop() {
            source_rows.to_vec()
        } else {
            format_rows_for_export(source_rows, &format_options)
        };

        match document {
            GeneratedDocument::TrxFast(trx) => {
                let sheets = vec![
                    SheetSpec {
                        sheet_name: DATA_SHEET_NAME.to_string(),
                        rows,
                        options: options.clone(),
                    },
                    SheetSpec {
                        sheet_name: SUMMARY_SHEET_NAME.to_string(),
                        rows: vec![summary_row(trx)],
                        options,
                    },
                ];
                to_multi_sheet_artifact(&sheets, filename)
            }
            GeneratedDocument::BatchMessage(_) => {
                to_spreadsheet_artifact(&rows, filename, self.config.sheet_name(), &options)
            }
        }
    }
}

fn summary_row(trx: &TrxFastDocument) -> RawRecord {
    let mut row = RawRecord::new();
    row.insert("doc_no_app", Value::String(trx.doc_no_app.clone()));
    row.insert("jumlah_row", Value::from(trx.jumlah_row));
    row.insert("jumlah_amount", number_value(trx.jumlah_amount));
    row.insert(
        "use_nik",
        trx.use_nik.clone().map(Value::String).unwrap_or(Value::Null),
    );
    row
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for FilePipeline<S, C> {
    fn context(&self) -> &ScalarContext {
        &self.context
    }

    async fn ingest(&self) -> Result<IngestResult> {
        tracing::debug!("Reading {} as {}", self.input, self.declared_type);
        let bytes = self.source.read_file(&self.input).await?;
        tracing::debug!("Read {} bytes", bytes.len());
        ingest(&bytes, &self.declared_type)
    }

    async fn generate(&self, ingested: &IngestResult) -> Result<GeneratedDocument> {
        generate(
            &self.context.template_name,
            &self.context,
            Some(ingested),
            self.config.amount_column(),
        )
    }

    async fn export(
        &self,
        ingested: &IngestResult,
        document: &GeneratedDocument,
    ) -> Result<Vec<String>> {
        let mut saved = Vec::new();

        for format in self.config.output_formats() {
            let artifact = match format {
                OutputFormat::Json => to_json_artifact(Some(document))?,
                OutputFormat::Xlsx => self.spreadsheet_artifact(ingested, document)?,
            };

            tracing::debug!(
                "Writing {} ({} bytes, {})",
                artifact.filename,
                artifact.bytes.len(),
                artifact.mime_type
            );
            self.storage
                .write_file(&artifact.filename, &artifact.bytes)
                .await?;
            saved.push(format!("{}/{}", self.config.output_path(), artifact.filename));
        }

        Ok(saved)
    }
}
