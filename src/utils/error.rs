use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Remote endpoint unreachable: {0}")]
    Connectivity(#[from] reqwest::Error),

    #[error("Remote endpoint returned an error: {message}")]
    Remote { message: String },

    #[error("Remote endpoint responded with HTTP {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Unexpected response from remote endpoint: {message}")]
    Protocol { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// 錯誤分類，用於決定退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Connectivity,
    Remote,
    Configuration,
    System,
}

impl RelayError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } => ErrorCategory::Input,
            Self::Connectivity(_) => ErrorCategory::Connectivity,
            Self::Remote { .. } | Self::HttpStatus { .. } | Self::Protocol { .. } => {
                ErrorCategory::Remote
            }
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    /// sysexits.h 風格的退出碼，全部非零
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Input => 65,
            ErrorCategory::Connectivity | ErrorCategory::Remote => 69,
            ErrorCategory::Configuration => 78,
            ErrorCategory::System => 74,
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
