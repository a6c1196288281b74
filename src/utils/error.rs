use crate::domain::model::TimesheetSource;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconError {
    #[error("Malformed mapping at row {row}: {reason}")]
    MalformedMapping { row: usize, reason: String },

    #[error("Extraction error in {dataset} at row {row}: {reason}")]
    ExtractionError {
        dataset: TimesheetSource,
        row: usize,
        reason: String,
    },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Output,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReconError {
    pub fn extraction(dataset: TimesheetSource, row: usize, reason: impl Into<String>) -> Self {
        ReconError::ExtractionError {
            dataset,
            row,
            reason: reason.into(),
        }
    }

    pub fn malformed_mapping(row: usize, reason: impl Into<String>) -> Self {
        ReconError::MalformedMapping {
            row,
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ReconError::MalformedMapping { .. }
            | ReconError::ExtractionError { .. }
            | ReconError::CsvError(_) => ErrorCategory::Input,
            ReconError::ConfigError { .. }
            | ReconError::ConfigValidationError { .. }
            | ReconError::InvalidConfigValueError { .. }
            | ReconError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ReconError::ZipError(_) | ReconError::SerializationError(_) => ErrorCategory::Output,
            ReconError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ReconError::MalformedMapping { row, .. } => format!(
                "The ID mapping file is malformed at row {}: {}",
                row, self
            ),
            ReconError::ExtractionError { dataset, row, .. } => format!(
                "Could not read the {} timesheet at row {}: {}",
                dataset, row, self
            ),
            ReconError::IoError(e) => format!("File access failed: {}", e),
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ReconError::MalformedMapping { .. } => {
                "Make sure every mapping row has both a Fulcrum ID and a MasterCard ID"
            }
            ReconError::ExtractionError { .. } => {
                "Check that the export has the expected column layout and no blank required cells"
            }
            ReconError::CsvError(_) => "Check that the input is a valid CSV/TSV export",
            ReconError::ZipError(_) | ReconError::SerializationError(_) => {
                "Retry with a different output path or without --bundle"
            }
            ReconError::IoError(_) => "Check that the files exist and are readable/writable",
            ReconError::ConfigError { .. }
            | ReconError::ConfigValidationError { .. }
            | ReconError::InvalidConfigValueError { .. }
            | ReconError::MissingConfigError { .. } => "Review the configuration and try again",
        }
    }
}

pub type Result<T> = std::result::Result<T, ReconError>;
