use serde_json::Value;
use tracing::{debug, info};

use crate::config::SignalConfig;
use crate::data::types::{EnrichedMessage, ValidatedMessage, SCORE_KEY};
use crate::error::{Result, SignalError};
use crate::strategies::types::Signal;

/// Maps a sentiment score onto BUY/SELL/HOLD using inclusive thresholds.
#[derive(Debug, Clone)]
pub struct SignalComputer {
    config: SignalConfig,
}

impl SignalComputer {
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    /// Enrich a validated message with `sentiment_signal` and the rounded
    /// `sentiment_score`.
    ///
    /// A missing score counts as 0.0. The score is never clamped.
    pub fn compute(&self, message: ValidatedMessage) -> Result<EnrichedMessage> {
        let sentiment_score = match message.get(SCORE_KEY) {
            Some(value) => coerce_score(value)?,
            None => 0.0,
        };

        info!("Computing sentiment signal for {}", message.symbol());

        let signal = self.classify(sentiment_score);
        let rounded = round_to(sentiment_score, self.config.score_decimals);

        let symbol = message.symbol().to_string();
        let enriched = EnrichedMessage::merge(message.into_inner(), signal, rounded);

        debug!(
            "Sentiment result for {}: {}",
            symbol,
            serde_json::Value::Object(enriched.as_map().clone())
        );
        Ok(enriched)
    }

    pub fn classify(&self, sentiment_score: f64) -> Signal {
        if sentiment_score >= self.config.buy_threshold {
            Signal::Buy
        } else if sentiment_score <= self.config.sell_threshold {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}

impl Default for SignalComputer {
    fn default() -> Self {
        Self::new(SignalConfig::default())
    }
}

/// Compute with the standard thresholds (+/-0.3, 4 decimals).
pub fn compute_sentiment_signal(message: ValidatedMessage) -> Result<EnrichedMessage> {
    SignalComputer::default().compute(message)
}

/// Lenient float conversion: numbers, booleans and numeric strings.
///
/// Strings such as `"inf"` or `"NaN"` parse as floats but are rejected with
/// `Conversion`, since a non-finite score cannot be written back as JSON.
pub fn coerce_score(value: &Value) -> Result<f64> {
    let score = match value {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| conversion(value, "unrepresentable number"))?,
        Value::Bool(flag) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| conversion(value, "unparsable string"))?,
        Value::Null => return Err(conversion(value, "null")),
        Value::Array(_) | Value::Object(_) => return Err(conversion(value, "not a scalar")),
    };

    if !score.is_finite() {
        return Err(conversion(value, "not finite"));
    }
    Ok(score)
}

/// Round half away from zero to `decimals` places.
///
/// Values that cannot be scaled without overflow come back unchanged.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let exponent = match i32::try_from(decimals) {
        Ok(exponent) => exponent,
        Err(_) => return value,
    };
    let factor = 10f64.powi(exponent);
    let scaled = value * factor;
    // Magnitudes this large carry no fractional digits.
    if !factor.is_finite() || !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

fn conversion(value: &Value, reason: &'static str) -> SignalError {
    SignalError::Conversion {
        value: value.clone(),
        reason,
    }
}
