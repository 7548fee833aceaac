use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpendcastError {
    #[error("Invalid reply delay window: min {min_ms}ms is greater than max {max_ms}ms")]
    InvalidDelayWindow { min_ms: u64, max_ms: u64 },

    #[error("Terminal error: {0}")]
    TerminalError(String),
}

impl SpendcastError {
    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            SpendcastError::InvalidDelayWindow { .. } => {
                "The reply delay window is invalid. Check delay.min_ms and delay.max_ms.".to_string()
            }
            SpendcastError::TerminalError(_) => {
                "The terminal could not be prepared for the chat view.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SpendcastError>;
