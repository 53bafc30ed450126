pub mod cli;
pub mod toml_config;

use crate::core::doc_number::generate_sender_doc_no;
use crate::core::form::DocumentForm;
use crate::domain::model::SourceKind;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use toml_config::TomlConfig;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "fast-docgen")]
#[command(about = "Generate FAST batch JSON documents from spreadsheet or JSON files")]
pub struct CliConfig {
    /// Source file to ingest
    #[arg(short, long)]
    pub input: String,

    /// EXCEL or JSON
    #[arg(long, default_value = "EXCEL")]
    pub file_type: String,

    /// Sender document number (max 12 chars)
    #[arg(long, default_value = "")]
    pub doc_no: String,

    /// Generate a sender document number when --doc-no is empty
    #[arg(long)]
    pub generate_doc_no: bool,

    /// Print a generated application document number and exit
    #[arg(long)]
    pub generate_doc_no_app: bool,

    /// MASTER, SCHEDULE, RC_SCHEDULE, RESCHEDULE, CANCEL_PPD or TRX_FAST
    #[arg(long, default_value = "")]
    pub template: String,

    #[arg(long, default_value = "")]
    pub source_system: String,

    #[arg(long)]
    pub use_nik: Option<String>,

    /// TOML file with generation and export settings
    #[arg(short, long)]
    pub config: Option<String>,

    /// Overrides export.output_path
    #[arg(long)]
    pub output_path: Option<String>,

    /// Overrides export.output_formats (json,xlsx)
    #[arg(long, value_delimiter = ',')]
    pub formats: Vec<String>,

    /// Copy the generated document to the clipboard (stdout)
    #[arg(long)]
    pub copy: bool,

    /// Print a preview of the ingested table before generating
    #[arg(long)]
    pub preview: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    pub fn source_kind(&self) -> Result<SourceKind> {
        self.file_type.parse()
    }

    /// File settings (or defaults) with command line overrides applied.
    pub fn load_settings(&self) -> Result<TomlConfig> {
        let mut settings = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(output_path) = &self.output_path {
            settings.export.output_path = output_path.clone();
        }
        if !self.formats.is_empty() {
            settings.export.output_formats = self.formats.clone();
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn document_form(&self) -> DocumentForm {
        let doc_no = if self.doc_no.is_empty() && self.generate_doc_no {
            let generated = generate_sender_doc_no();
            tracing::info!("🔢 Generated sender document number: {}", generated);
            generated
        } else {
            self.doc_no.clone()
        };

        DocumentForm::new(doc_no, self.template.clone(), self.source_system.clone())
            .with_use_nik(self.use_nik.clone())
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;
        self.source_kind()?;
        if let Some(path) = &self.config {
            validate_path("config", path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{ConfigProvider, OutputFormat};
    use crate::utils::error::DocgenError;

    fn parse(args: &[&str]) -> CliConfig {
        CliConfig::parse_from(std::iter::once("fast-docgen").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_defaults() {
        let config = parse(&["--input", "data.xlsx"]);

        assert_eq!(config.source_kind().unwrap(), SourceKind::Spreadsheet);
        assert!(config.validate().is_ok());
        let settings = config.load_settings().unwrap();
        assert_eq!(settings.output_formats(), vec![OutputFormat::Json]);
    }

    #[test]
    fn test_cli_overrides() {
        let config = parse(&[
            "--input",
            "rows.json",
            "--file-type",
            "JSON",
            "--formats",
            "json,xlsx",
            "--output-path",
            "/tmp/out",
        ]);

        let settings = config.load_settings().unwrap();
        assert_eq!(settings.output_path(), "/tmp/out");
        assert_eq!(
            settings.output_formats(),
            vec![OutputFormat::Json, OutputFormat::Xlsx]
        );
    }

    #[test]
    fn test_cli_rejects_unknown_file_type() {
        let config = parse(&["--input", "rows.csv", "--file-type", "CSV"]);
        assert!(matches!(
            config.validate(),
            Err(DocgenError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_generated_doc_no_fills_empty_field() {
        let config = parse(&["--input", "a.xlsx", "--generate-doc-no"]);
        let form = config.document_form();
        assert_eq!(form.document_number.chars().count(), 12);

        let explicit = parse(&["--input", "a.xlsx", "--generate-doc-no", "--doc-no", "MINE"]);
        assert_eq!(explicit.document_form().document_number, "MINE");
    }
}
