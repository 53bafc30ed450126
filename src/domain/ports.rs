use crate::domain::model::{GeneratedDocument, IngestResult, ScalarContext};
use crate::core::export::SpreadsheetOptions;
use crate::core::format::FormatOptions;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Byte storage for source files and downloaded artifacts.
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Xlsx,
}

pub trait ConfigProvider: Send + Sync {
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> Vec<OutputFormat>;
    fn amount_column(&self) -> &str;
    fn export_filename(&self) -> &str;
    fn sheet_name(&self) -> &str;
    fn spreadsheet_options(&self) -> SpreadsheetOptions;
    fn format_options(&self) -> FormatOptions;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    fn context(&self) -> &ScalarContext;
    async fn ingest(&self) -> Result<IngestResult>;
    async fn generate(&self, ingested: &IngestResult) -> Result<GeneratedDocument>;
    async fn export(&self, ingested: &IngestResult, document: &GeneratedDocument) -> Result<Vec<String>>;
}
