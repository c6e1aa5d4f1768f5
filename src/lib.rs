//! Validates trading messages against a configurable schema and enriches
//! them with a BUY/SELL/HOLD signal derived from `sentiment_score`.

pub mod config;
pub mod data;
pub mod error;
pub mod execution;
pub mod monitoring;
pub mod strategies;

pub use data::schema::{RuleSetValidator, SchemaCheck};
pub use data::types::{EnrichedMessage, RawMessage, ValidatedMessage};
pub use error::SignalError;
pub use execution::processor::{validate_input_message, MessageProcessor};
pub use strategies::sentiment::{compute_sentiment_signal, SignalComputer};
pub use strategies::types::Signal;
