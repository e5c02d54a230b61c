use thiserror::Error;

#[derive(Debug, Error)]
pub enum WattCompareError {
    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Validation(String),

    #[error("Camera capture is unavailable; upload a photo instead")]
    CaptureUnavailable,

    #[error("Image error: {0}")]
    Image(String),

    #[error("{action} failed: {message}")]
    Transport { action: String, message: String },

    /// `detail` carries the backend's own `error` message when it sent one.
    #[error("{action} failed with HTTP {status}{}", detail_suffix(.detail))]
    Status {
        action: String,
        status: u16,
        detail: Option<String>,
    },

    #[error("Malformed response from {action}: {message}")]
    Malformed { action: String, message: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WattCompareError {
    pub fn transport(action: &str, message: impl ToString) -> Self {
        Self::Transport {
            action: action.to_string(),
            message: message.to_string(),
        }
    }

    pub fn status(action: &str, status: u16) -> Self {
        Self::Status {
            action: action.to_string(),
            status,
            detail: None,
        }
    }

    pub fn status_with_detail(action: &str, status: u16, detail: impl ToString) -> Self {
        Self::Status {
            action: action.to_string(),
            status,
            detail: Some(detail.to_string()),
        }
    }

    pub fn malformed(action: &str, message: impl ToString) -> Self {
        Self::Malformed {
            action: action.to_string(),
            message: message.to_string(),
        }
    }

    /// True for errors raised before any exchange with the backend.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::CaptureUnavailable | Self::Image(_) | Self::Config(_)
        )
    }
}

impl From<WattCompareError> for String {
    fn from(err: WattCompareError) -> Self {
        err.to_string()
    }
}

pub type Result<T> = std::result::Result<T, WattCompareError>;

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(": {}", detail),
        None => String::new(),
    }
}
