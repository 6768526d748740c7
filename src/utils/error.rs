use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Unrecognized stored data under '{key}': {reason}")]
    SchemaError { key: String, reason: String },

    #[error("Metadata fetch failed for {url}: {message}")]
    MetadataError { url: String, message: String },

    #[error("Listing not found: {id}")]
    NotFound { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Storage,
    Configuration,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TrackerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TrackerError::HttpError(_) | TrackerError::MetadataError { .. } => {
                ErrorCategory::Network
            }
            TrackerError::IoError(_)
            | TrackerError::SerializationError(_)
            | TrackerError::CsvError(_)
            | TrackerError::SchemaError { .. } => ErrorCategory::Storage,
            TrackerError::ConfigError { .. }
            | TrackerError::ConfigValidationError { .. }
            | TrackerError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            TrackerError::ValidationError { .. } | TrackerError::NotFound { .. } => {
                ErrorCategory::Input
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TrackerError::NotFound { .. } => ErrorSeverity::Low,
            TrackerError::HttpError(_) | TrackerError::MetadataError { .. } => {
                ErrorSeverity::Medium
            }
            TrackerError::ValidationError { .. }
            | TrackerError::ConfigError { .. }
            | TrackerError::ConfigValidationError { .. }
            | TrackerError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            TrackerError::IoError(_)
            | TrackerError::SerializationError(_)
            | TrackerError::CsvError(_)
            | TrackerError::SchemaError { .. } => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            TrackerError::HttpError(_) | TrackerError::MetadataError { .. } => {
                "Could not fetch page metadata".to_string()
            }
            TrackerError::IoError(e) => format!("Could not read or write listing data: {}", e),
            TrackerError::SerializationError(_) | TrackerError::SchemaError { .. } => {
                "Stored listing data is not in a recognized format".to_string()
            }
            TrackerError::CsvError(_) => "Could not render the listing table".to_string(),
            TrackerError::ConfigError { message } => format!("Configuration problem: {}", message),
            TrackerError::ConfigValidationError { field, .. }
            | TrackerError::InvalidConfigValueError { field, .. } => {
                format!("Configuration field '{}' is invalid", field)
            }
            TrackerError::ValidationError { message } => message.clone(),
            TrackerError::NotFound { .. } => "Listing not found".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check the URL and your connection, or enter the title manually with --title"
            }
            ErrorCategory::Storage => {
                "Check the data directory, or restore the listings from an exported JSON file"
            }
            ErrorCategory::Configuration => "Fix the configuration file or command line flags",
            ErrorCategory::Input => "Run `listing-tracker list` to see existing listings",
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_low_severity() {
        let err = TrackerError::NotFound {
            id: "missing".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.user_friendly_message(), "Listing not found");
    }

    #[test]
    fn test_schema_error_is_storage_critical() {
        let err = TrackerError::SchemaError {
            key: "apartment-listings".to_string(),
            reason: "no listings array".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.to_string().contains("apartment-listings"));
    }
}
