use crate::core::export::SpreadsheetOptions;
use crate::core::format::FormatOptions;
use crate::core::template::DEFAULT_AMOUNT_COLUMN;
use crate::domain::ports::{ConfigProvider, OutputFormat};
use crate::utils::error::{DocgenError, Result};
use crate::utils::validation::{
    validate_hex_color, validate_non_empty_string, validate_path, validate_range, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

pub const VALID_OUTPUT_FORMATS: [&str; 2] = ["json", "xlsx"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub generation: GenerationConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Column summed into `jumlahAmount` for TRX_FAST.
    pub amount_column: String,
    pub doc_no_app_prefix: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            amount_column: DEFAULT_AMOUNT_COLUMN.to_string(),
            doc_no_app_prefix: crate::core::doc_number::DEFAULT_DOC_NO_APP_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    /// Spreadsheet file base name, without extension.
    pub filename: String,
    pub sheet_name: String,
    pub spreadsheet: SpreadsheetOptions,
    pub format: FormatOptions,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: "./output".to_string(),
            output_formats: vec!["json".to_string()],
            filename: "export".to_string(),
            sheet_name: "Sheet1".to_string(),
            spreadsheet: SpreadsheetOptions::default(),
            format: FormatOptions::default(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DocgenError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| DocgenError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OUTPUT_DIR})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is a valid regex")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn parsed_output_formats(&self) -> Result<Vec<OutputFormat>> {
        self.export
            .output_formats
            .iter()
            .map(|f| parse_output_format(f))
            .collect()
    }
}

pub fn parse_output_format(value: &str) -> Result<OutputFormat> {
    match value.trim().to_ascii_lowercase().as_str() {
        "json" => Ok(OutputFormat::Json),
        "xlsx" | "excel" => Ok(OutputFormat::Xlsx),
        _ => Err(DocgenError::InvalidConfigValueError {
            field: "export.output_formats".to_string(),
            value: value.to_string(),
            reason: format!(
                "Unsupported format. Valid formats: {}",
                VALID_OUTPUT_FORMATS.join(", ")
            ),
        }),
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("generation.amount_column", &self.generation.amount_column)?;
        validate_path("export.output_path", &self.export.output_path)?;
        validate_non_empty_string("export.filename", &self.export.filename)?;

        if self.export.output_formats.is_empty() {
            return Err(DocgenError::InvalidConfigValueError {
                field: "export.output_formats".to_string(),
                value: String::new(),
                reason: "At least one output format is required".to_string(),
            });
        }
        self.parsed_output_formats()?;

        let sheet = &self.export.spreadsheet;
        validate_hex_color("export.spreadsheet.header_color", &sheet.header_color)?;
        validate_hex_color("export.spreadsheet.alternate_color", &sheet.alternate_color)?;
        validate_range("export.spreadsheet.column_width", sheet.column_width, 1.0, 255.0)?;
        validate_range("export.spreadsheet.header_height", sheet.header_height, 1.0, 409.0)?;
        if let Some(height) = sheet.row_height {
            validate_range("export.spreadsheet.row_height", height, 1.0, 409.0)?;
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn output_path(&self) -> &str {
        &self.export.output_path
    }

    fn output_formats(&self) -> Vec<OutputFormat> {
        // 已在 validate 中檢查過，這裡略過無法辨識的格式
        self.export
            .output_formats
            .iter()
            .filter_map(|f| parse_output_format(f).ok())
            .collect()
    }

    fn amount_column(&self) -> &str {
        &self.generation.amount_column
    }

    fn export_filename(&self) -> &str {
        &self.export.filename
    }

    fn sheet_name(&self) -> &str {
        &self.export.sheet_name
    }

    fn spreadsheet_options(&self) -> SpreadsheetOptions {
        self.export.spreadsheet.clone()
    }

    fn format_options(&self) -> FormatOptions {
        self.export.format.clone()
    }
}
