use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Message {message_id} could not be decoded: {reason}")]
    Decoding { message_id: String, reason: String },

    #[error("Unrecognized field group in accepter: {domain}")]
    UnrecognizedDomain { domain: String },

    #[error("Remote call for {group} failed: {reason}")]
    RemoteCall { group: String, reason: String },

    #[error("Unexpected fault: {message}")]
    UnexpectedFault { message: String },

    #[error("Result sink error: {message}")]
    Sink { message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed on {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

/// 錯誤分類，用於結構化日誌
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 單一訊息範圍內的錯誤，訊息會被 Reject
    Message,
    /// 遠端 API 呼叫失敗
    Remote,
    Configuration,
    System,
}

impl WorkerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            WorkerError::Decoding { .. }
            | WorkerError::UnrecognizedDomain { .. }
            | WorkerError::UnexpectedFault { .. } => ErrorCategory::Message,
            WorkerError::RemoteCall { .. } | WorkerError::Http(_) => ErrorCategory::Remote,
            WorkerError::ConfigError { .. }
            | WorkerError::MissingConfigError { .. }
            | WorkerError::InvalidConfigValueError { .. }
            | WorkerError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            WorkerError::Sink { .. }
            | WorkerError::Transport { .. }
            | WorkerError::IoError(_)
            | WorkerError::SerializationError(_) => ErrorCategory::System,
        }
    }
}

pub type Result<T> = std::result::Result<T, WorkerError>;
