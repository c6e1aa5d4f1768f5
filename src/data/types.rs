use serde::Serialize;
use serde_json::{Map, Value};
use std::borrow::Cow;

use crate::strategies::types::Signal;

/// Key holding the instrument identifier.
pub const SYMBOL_KEY: &str = "symbol";
/// Key holding the sentiment score, rewritten with the rounded value on output.
pub const SCORE_KEY: &str = "sentiment_score";
/// Key added with the computed signal.
pub const SIGNAL_KEY: &str = "sentiment_signal";

/// Symbol reported in diagnostics when a message carries none.
pub const UNKNOWN_SYMBOL: &str = "UNKNOWN";

/// Raw decoded message, keys unconstrained.
pub type RawMessage = Map<String, Value>;

/// A message that has passed schema validation.
///
/// Only `validate_input_message` hands these out, so holding one means the
/// schema check already ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidatedMessage(RawMessage);

impl ValidatedMessage {
    pub(crate) fn new(message: RawMessage) -> Self {
        Self(message)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Symbol for diagnostics, `"UNKNOWN"` when absent. Non-string values
    /// are shown in their JSON form.
    pub fn symbol(&self) -> Cow<'_, str> {
        symbol_of(&self.0)
    }

    pub fn as_map(&self) -> &RawMessage {
        &self.0
    }

    pub fn into_inner(self) -> RawMessage {
        self.0
    }
}

/// Validated message plus the computed `sentiment_signal` and rounded
/// `sentiment_score`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EnrichedMessage {
    #[serde(skip)]
    signal: Signal,
    #[serde(skip)]
    score: f64,
    fields: RawMessage,
}

impl EnrichedMessage {
    /// Merges the computed fields over `base`; computed keys win on collision.
    pub(crate) fn merge(mut base: RawMessage, signal: Signal, score: f64) -> Self {
        base.insert(SIGNAL_KEY.to_string(), Value::String(signal.to_string()));
        base.insert(SCORE_KEY.to_string(), Value::from(score));
        Self {
            signal,
            score,
            fields: base,
        }
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn symbol(&self) -> Cow<'_, str> {
        symbol_of(&self.fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn as_map(&self) -> &RawMessage {
        &self.fields
    }

    pub fn into_inner(self) -> RawMessage {
        self.fields
    }
}

fn symbol_of(message: &RawMessage) -> Cow<'_, str> {
    match message.get(SYMBOL_KEY) {
        Some(Value::String(symbol)) => Cow::Borrowed(symbol.as_str()),
        Some(other) => Cow::Owned(other.to_string()),
        None => Cow::Borrowed(UNKNOWN_SYMBOL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> RawMessage {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_symbol_defaults_to_unknown() {
        let validated = ValidatedMessage::new(map(json!({ "sentiment_score": 0.1 })));
        assert_eq!(validated.symbol(), "UNKNOWN");

        let validated = ValidatedMessage::new(map(json!({ "symbol": "MSFT" })));
        assert_eq!(validated.symbol(), "MSFT");
    }

    #[test]
    fn test_non_string_symbol_shown_as_json() {
        let validated = ValidatedMessage::new(map(json!({ "symbol": 42 })));
        assert_eq!(validated.symbol(), "42");

        let validated = ValidatedMessage::new(map(json!({ "symbol": null })));
        assert_eq!(validated.symbol(), "null");
    }

    #[test]
    fn test_merge_overwrites_computed_keys() {
        let base = map(json!({
            "symbol": "AAPL",
            "sentiment_signal": "STALE",
            "sentiment_score": "0.51234",
            "source": "news",
        }));

        let enriched = EnrichedMessage::merge(base, Signal::Buy, 0.5123);

        assert_eq!(enriched.get("sentiment_signal"), Some(&json!("BUY")));
        assert_eq!(enriched.get("sentiment_score"), Some(&json!(0.5123)));
        assert_eq!(enriched.get("source"), Some(&json!("news")));
        assert_eq!(enriched.as_map().len(), 4);
    }

    #[test]
    fn test_enriched_serializes_as_plain_object() {
        let enriched = EnrichedMessage::merge(map(json!({ "symbol": "AAPL" })), Signal::Hold, 0.0);
        let encoded = serde_json::to_value(&enriched).unwrap();

        assert_eq!(
            encoded,
            json!({ "symbol": "AAPL", "sentiment_signal": "HOLD", "sentiment_score": 0.0 })
        );
    }
}
