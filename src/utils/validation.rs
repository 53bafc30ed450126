use crate::utils::error::{DocgenError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(DocgenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(DocgenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// Required scalar field: empty means missing.
pub fn validate_required(field_name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(DocgenError::Required {
            field: field_name.to_string(),
        });
    }
    Ok(())
}

pub fn validate_max_chars(field_name: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(DocgenError::TooLong {
            field: field_name.to_string(),
            max,
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DocgenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(DocgenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// `RRGGBB`, optionally prefixed with `#`.
pub fn validate_hex_color(field_name: &str, value: &str) -> Result<()> {
    let digits = value.trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DocgenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Expected a 6 digit hex color such as 366092".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required() {
        assert!(validate_required("Source System", "CORE").is_ok());
        assert!(matches!(
            validate_required("Source System", ""),
            Err(DocgenError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_max_chars_counts_chars_not_bytes() {
        assert!(validate_max_chars("Document Number", "ééééééééééé", 12).is_ok());
        assert!(validate_max_chars("Document Number", &"x".repeat(13), 12).is_err());
    }

    #[test]
    fn test_validate_hex_color() {
        assert!(validate_hex_color("header_color", "366092").is_ok());
        assert!(validate_hex_color("header_color", "#F2F2F2").is_ok());
        assert!(validate_hex_color("header_color", "blue").is_err());
        assert!(validate_hex_color("header_color", "12345").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("column_width", 15.0, 1.0, 255.0).is_ok());
        assert!(validate_range("column_width", 0.0, 1.0, 255.0).is_err());
    }
}
