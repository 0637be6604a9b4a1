use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("{message}")]
    Conflict { message: String },
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Builds the error for a non-2xx response from its status and raw body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<ApiError>(body).ok();
        let message = parsed
            .as_ref()
            .and_then(ApiError::message_text)
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| format!("HTTP {status}"));

        if status == 409 {
            ClientError::Conflict { message }
        } else {
            ClientError::Status { status, message }
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ClientError::Conflict { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Conflict { .. } => Some(409),
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.status()
            .map(ErrorCode::from_status)
            .unwrap_or(ErrorCode::Unknown)
    }
}
