use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvoiceError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("JWT signing error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("{service} API error ({status}): {message}")]
    RemoteApiError {
        service: String,
        status: u16,
        message: String,
    },

    #[error("Authentication error: {message}")]
    AuthError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Authentication,
    Network,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl InvoiceError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Configuration,
            Self::AuthError { .. } | Self::JwtError(_) => ErrorCategory::Authentication,
            Self::ApiError(_) | Self::RemoteApiError { .. } => ErrorCategory::Network,
            Self::ProcessingError { .. } | Self::ValidationError { .. } => {
                ErrorCategory::Processing
            }
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorSeverity::High,
            Self::AuthError { .. } | Self::JwtError(_) => ErrorSeverity::Critical,
            // Remote 4xx are permission/quota problems the user must fix;
            // everything else network-ish may be transient.
            Self::RemoteApiError { status, .. } if *status >= 400 && *status < 500 => {
                ErrorSeverity::High
            }
            Self::RemoteApiError { .. } | Self::ApiError(_) => ErrorSeverity::Medium,
            Self::ProcessingError { .. } | Self::ValidationError { .. } => ErrorSeverity::High,
            Self::IoError(_) | Self::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::MissingConfigError { field } => {
                format!("Add '{}' to the config file or environment", field)
            }
            Self::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' in the config file", field)
            }
            Self::ConfigValidationError { .. } => {
                "Check the config file against the documented format".to_string()
            }
            Self::AuthError { .. } | Self::JwtError(_) => {
                "Verify the service-account credential file and its scopes".to_string()
            }
            Self::RemoteApiError { status, .. } if *status == 403 => {
                "Share the spreadsheet, template and folder with the service account".to_string()
            }
            Self::RemoteApiError { status, .. } if *status == 404 => {
                "Check the spreadsheet, template document and folder ids".to_string()
            }
            Self::RemoteApiError { status, .. } if *status == 429 => {
                "API quota exhausted; wait and re-run".to_string()
            }
            Self::RemoteApiError { .. } | Self::ApiError(_) => {
                "Check network connectivity and re-run".to_string()
            }
            Self::ProcessingError { .. } => {
                "Inspect the named rows in the source spreadsheet".to_string()
            }
            Self::ValidationError { .. } => "Fix the reported input and re-run".to_string(),
            Self::IoError(_) => "Check file paths and permissions".to_string(),
            Self::SerializationError(_) => {
                "The remote API returned an unexpected payload; re-run with --verbose".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Authentication => format!("Authentication failed: {}", self),
            ErrorCategory::Network => format!("Remote API problem: {}", self),
            ErrorCategory::Processing => format!("Data problem: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, InvoiceError>;
