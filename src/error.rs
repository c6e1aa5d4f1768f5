use serde_json::Value;

use crate::data::types::RawMessage;

#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("Invalid message format")]
    SchemaValidation { message: RawMessage },

    #[error("sentiment_score is not a finite number: {value} ({reason})")]
    Conversion { value: Value, reason: &'static str },

    #[error("Message is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Message must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

pub type Result<T> = std::result::Result<T, SignalError>;
