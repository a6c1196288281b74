use crate::core::options::SheetLayout;
use crate::domain::ports::OutputFormat;
use crate::utils::error::{ReconError, Result};
use std::collections::HashSet;

pub const INPUT_EXTENSIONS: [&str; 3] = ["csv", "tsv", "txt"];

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(ReconError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ReconError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[&str],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        match std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(extension) if allowed_set.contains(extension.to_ascii_lowercase().as_str()) => {}
            Some(extension) => {
                return Err(ReconError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.to_string(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
            None => {
                return Err(ReconError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.to_string(),
                    reason: "File has no extension or invalid filename".to_string(),
                });
            }
        }
    }

    Ok(())
}

/// A timesheet or mapping export on disk.
pub fn validate_input_file(field_name: &str, path: &str) -> Result<()> {
    validate_path(field_name, path)?;
    validate_file_extensions(field_name, &[path], &INPUT_EXTENSIONS)
}

pub fn validate_output_formats(field_name: &str, formats: &[String]) -> Result<()> {
    if formats.is_empty() {
        return Err(ReconError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: String::new(),
            reason: "At least one output format is required".to_string(),
        });
    }

    for format in formats {
        if OutputFormat::parse(format).is_none() {
            return Err(ReconError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: format.clone(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    OutputFormat::ALL.join(", ")
                ),
            });
        }
    }
    Ok(())
}

/// Every field in `required` must be bound.
pub fn validate_layout(field_name: &str, layout: &SheetLayout, required: &[&str]) -> Result<()> {
    let missing = layout.missing_fields(required);
    if !missing.is_empty() {
        return Err(ReconError::ConfigValidationError {
            field: field_name.to_string(),
            message: format!("missing column bindings: {}", missing.join(", ")),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| ReconError::MissingConfigError {
        field: field_name.to_string(),
    })
}
