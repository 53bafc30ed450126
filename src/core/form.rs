//! Document-level form fields and their validation rules.
//!
//! [`DocumentForm`] is the editable state: it is re-validated on every edit
//! and keeps one error message per field. [`DocumentForm::freeze`] produces
//! the read-only [`ScalarContext`] consumed by template generation.

use crate::domain::model::ScalarContext;
use crate::utils::error::Result;
use crate::utils::validation::{validate_max_chars, validate_required, Validate};

pub const DOCUMENT_NUMBER_MAX_CHARS: usize = 12;

pub const DOCUMENT_NUMBER_LABEL: &str = "Document Number";
pub const TEMPLATE_NAME_LABEL: &str = "JSON Name";
pub const SOURCE_SYSTEM_LABEL: &str = "Source System";

/// Cuts the value to the first 12 chars. Returns whether anything was cut.
pub fn truncate_document_number(value: &mut String) -> bool {
    match value.char_indices().nth(DOCUMENT_NUMBER_MAX_CHARS) {
        Some((byte_idx, _)) => {
            value.truncate(byte_idx);
            true
        }
        None => false,
    }
}

pub fn validate_document_number(value: &mut String) -> Result<()> {
    if truncate_document_number(value) {
        tracing::debug!("Document number truncated to {} chars", DOCUMENT_NUMBER_MAX_CHARS);
    }
    validate_required(DOCUMENT_NUMBER_LABEL, value)
}

pub fn validate_template_name(value: &str) -> Result<()> {
    validate_required(TEMPLATE_NAME_LABEL, value)
}

pub fn validate_source_system(value: &str) -> Result<()> {
    validate_required(SOURCE_SYSTEM_LABEL, value)
}

/// Empty string means the field currently passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub document_number: String,
    pub template_name: String,
    pub source_system: String,
}

impl FieldErrors {
    pub fn is_clean(&self) -> bool {
        self.document_number.is_empty() && self.template_name.is_empty() && self.source_system.is_empty()
    }

    /// `(label, message)` for every failing field.
    pub fn failures(&self) -> Vec<(&'static str, &str)> {
        [
            (DOCUMENT_NUMBER_LABEL, self.document_number.as_str()),
            (TEMPLATE_NAME_LABEL, self.template_name.as_str()),
            (SOURCE_SYSTEM_LABEL, self.source_system.as_str()),
        ]
        .into_iter()
        .filter(|(_, message)| !message.is_empty())
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentForm {
    pub document_number: String,
    pub template_name: String,
    pub source_system: String,
    pub use_nik: Option<String>,
    pub errors: FieldErrors,
}

fn message_of(result: &Result<()>) -> String {
    match result {
        Ok(()) => String::new(),
        Err(e) => e.to_string(),
    }
}

impl DocumentForm {
    pub fn new(
        document_number: impl Into<String>,
        template_name: impl Into<String>,
        source_system: impl Into<String>,
    ) -> Self {
        Self {
            document_number: document_number.into(),
            template_name: template_name.into(),
            source_system: source_system.into(),
            ..Default::default()
        }
    }

    pub fn with_use_nik(mut self, use_nik: Option<String>) -> Self {
        self.use_nik = use_nik.filter(|v| !v.is_empty());
        self
    }

    pub fn validate_document_number(&mut self) -> bool {
        let result = validate_document_number(&mut self.document_number);
        self.errors.document_number = message_of(&result);
        result.is_ok()
    }

    pub fn validate_template_name(&mut self) -> bool {
        let result = validate_template_name(&self.template_name);
        self.errors.template_name = message_of(&result);
        result.is_ok()
    }

    pub fn validate_source_system(&mut self) -> bool {
        let result = validate_source_system(&self.source_system);
        self.errors.source_system = message_of(&result);
        result.is_ok()
    }

    /// Runs every field check, so all messages are current afterwards.
    pub fn validate_all(&mut self) -> bool {
        let doc_no_ok = self.validate_document_number();
        let template_ok = self.validate_template_name();
        let source_ok = self.validate_source_system();

        doc_no_ok && template_ok && source_ok
    }

    /// Keystroke handler for the document number input.
    pub fn input_document_number(&mut self, value: &str) -> bool {
        self.document_number = value.to_string();
        self.validate_document_number()
    }

    pub fn reset_validation(&mut self) {
        self.errors = FieldErrors::default();
    }

    pub fn freeze(&self) -> ScalarContext {
        ScalarContext {
            document_number: self.document_number.clone(),
            template_name: self.template_name.clone(),
            source_system: self.source_system.clone(),
            use_nik: self.use_nik.clone(),
        }
    }
}

impl Validate for ScalarContext {
    fn validate(&self) -> Result<()> {
        validate_max_chars(DOCUMENT_NUMBER_LABEL, &self.document_number, DOCUMENT_NUMBER_MAX_CHARS)?;
        validate_required(DOCUMENT_NUMBER_LABEL, &self.document_number)?;
        validate_required(TEMPLATE_NAME_LABEL, &self.template_name)?;
        validate_required(SOURCE_SYSTEM_LABEL, &self.source_system)
    }
}

impl From<&DocumentForm> for ScalarContext {
    fn from(form: &DocumentForm) -> Self {
        form.freeze()
    }
}
