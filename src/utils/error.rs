use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocgenError {
    #[error("Unsupported file type: {declared}")]
    UnsupportedFormat { declared: String },

    #[error("Empty source: {reason}")]
    EmptySource { reason: String },

    #[error("Invalid JSON file format: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} cannot exceed {max} characters")]
    TooLong { field: String, max: usize },

    #[error("Unknown template: {name}")]
    UnknownTemplate { name: String },

    #[error("No template data available for export")]
    NoData,

    #[error("Data must not be empty")]
    EmptyData,

    #[error("Error reading spreadsheet: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Error writing spreadsheet: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Validation,
    Template,
    Export,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DocgenError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedFormat { .. }
            | Self::EmptySource { .. }
            | Self::MalformedJson(_)
            | Self::Workbook(_) => ErrorCategory::Input,
            Self::Required { .. } | Self::TooLong { .. } => ErrorCategory::Validation,
            Self::UnknownTemplate { .. } => ErrorCategory::Template,
            Self::NoData | Self::EmptyData | Self::XlsxWrite(_) | Self::SerializationError(_) => {
                ErrorCategory::Export
            }
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation | ErrorCategory::Template => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Export | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat { .. } => "Choose EXCEL or JSON as the file type",
            Self::EmptySource { .. } => "Pick a file whose first sheet has a header row and data rows",
            Self::MalformedJson(_) => "Check that the file contains valid JSON",
            Self::Workbook(_) => "Re-save the file as .xlsx and pick it again",
            Self::Required { .. } | Self::TooLong { .. } => "Fix the highlighted field and submit again",
            Self::UnknownTemplate { .. } => {
                "Use one of MASTER, SCHEDULE, RC_SCHEDULE, RESCHEDULE, CANCEL_PPD, TRX_FAST"
            }
            Self::NoData => "Generate the template before downloading it",
            Self::EmptyData => "Load a file with at least one data row before exporting",
            Self::XlsxWrite(_) | Self::SerializationError(_) => "Retry the export",
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                "Check the configuration file and command line arguments"
            }
            Self::IoError(_) => "Check that the paths exist and are writable",
        }
    }

    /// Single human readable line bound to the session error message.
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::MalformedJson(_) => "Invalid JSON file format".to_string(),
            Self::Workbook(e) => format!("Error reading Excel file: {}", e),
            Self::EmptySource { reason } => format!("Error reading Excel file: {}", reason),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DocgenError>;
