use anyhow::{Context, Result as AnyResult};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::data::schema::{RuleSetValidator, SchemaCheck};
use crate::data::types::{EnrichedMessage, RawMessage, ValidatedMessage};
use crate::error::{Result, SignalError};
use crate::monitoring::logger::CsvSignalLogger;
use crate::strategies::sentiment::SignalComputer;

/// Validate the incoming raw message against the expected schema.
///
/// One check, no retries. On failure the offending message travels back in
/// the error.
pub fn validate_input_message<S>(message: RawMessage, schema: &S) -> Result<ValidatedMessage>
where
    S: SchemaCheck + ?Sized,
{
    debug!("Validating message schema...");
    if !schema.is_valid_schema(&message) {
        error!("Invalid message schema: {}", serde_json::Value::Object(message.clone()));
        return Err(SignalError::SchemaValidation { message });
    }
    Ok(ValidatedMessage::new(message))
}

/// Validator and signal computer applied in sequence, one message at a time.
pub struct MessageProcessor {
    schema: Box<dyn SchemaCheck>,
    computer: SignalComputer,
    csv_logger: Option<CsvSignalLogger>,
}

impl MessageProcessor {
    pub fn new(schema: Box<dyn SchemaCheck>, computer: SignalComputer) -> Self {
        Self {
            schema,
            computer,
            csv_logger: None,
        }
    }

    pub fn from_config(config: &Config) -> AnyResult<Self> {
        let schema = RuleSetValidator::from_config(&config.schema)
            .context("Failed to build schema rule set")?;
        let mut processor = Self::new(Box::new(schema), SignalComputer::new(config.signal.clone()));

        if config.monitoring.csv_logging {
            let logger = CsvSignalLogger::new(&config.monitoring.csv_log_path).with_context(|| {
                format!("Failed to open CSV log: {}", config.monitoring.csv_log_path)
            })?;
            processor = processor.with_csv_logger(logger);
        }

        Ok(processor)
    }

    pub fn with_csv_logger(mut self, logger: CsvSignalLogger) -> Self {
        self.csv_logger = Some(logger);
        self
    }

    pub fn process(&self, message: RawMessage) -> Result<EnrichedMessage> {
        let outcome = validate_input_message(message, self.schema.as_ref())
            .and_then(|validated| self.computer.compute(validated));

        if let Some(logger) = &self.csv_logger {
            let written = match &outcome {
                Ok(enriched) => logger.log_signal(enriched),
                Err(e) => logger.log_event(&e.to_string()),
            };
            if let Err(e) = written {
                warn!("Failed to write CSV log: {}", e);
            }
        }

        outcome
    }

    /// Decode one JSON line, process it, and encode the enriched message.
    pub fn process_line(&self, line: &str) -> Result<String> {
        let message = match serde_json::from_str::<Value>(line)? {
            Value::Object(map) => map,
            other => return Err(SignalError::NotAnObject(json_kind(&other))),
        };

        let enriched = self.process(message)?;
        Ok(serde_json::to_string(&enriched)?)
    }
}

impl Default for MessageProcessor {
    fn default() -> Self {
        Self::new(Box::new(RuleSetValidator::default()), SignalComputer::default())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
