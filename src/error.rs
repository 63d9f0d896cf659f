use thiserror::Error;

pub const VALIDATION_MESSAGE: &str = "Please enter a valid YouTube URL.";
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch info";

/// Everything that can end a search attempt. The `Display` text is what the
/// error region shows.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Please enter a valid YouTube URL.")]
    Validation,
    #[error("{message}")]
    Backend { status: u16, message: String },
    #[error("Failed to fetch info")]
    Transport { detail: String },
}

impl ControllerError {
    pub fn backend(status: u16, message: Option<&str>) -> Self {
        Self::Backend {
            status,
            message: message.unwrap_or(FETCH_FAILED_MESSAGE).to_string(),
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self::Transport {
            detail: detail.into(),
        }
    }
}
