use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

use crate::config::{FieldKind, FieldRule, SchemaConfig};
use crate::data::types::RawMessage;

/// Predicate deciding whether a raw message has the expected shape.
pub trait SchemaCheck: Send + Sync {
    fn is_valid_schema(&self, message: &RawMessage) -> bool;
}

impl<F> SchemaCheck for F
where
    F: Fn(&RawMessage) -> bool + Send + Sync,
{
    fn is_valid_schema(&self, message: &RawMessage) -> bool {
        self(message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaBuildError {
    #[error("Invalid pattern for field '{field}': {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error("Duplicate rule for field '{0}'")]
    DuplicateField(String),
}

/// First rule a message broke.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldViolation {
    Missing(String),
    WrongKind { field: String, expected: FieldKind },
    PatternMismatch(String),
    OutOfRange { field: String, value: f64 },
    UnknownField(String),
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldViolation::Missing(field) => write!(f, "missing required field '{}'", field),
            FieldViolation::WrongKind { field, expected } => {
                write!(f, "field '{}' is not of kind {:?}", field, expected)
            }
            FieldViolation::PatternMismatch(field) => {
                write!(f, "field '{}' does not match its pattern", field)
            }
            FieldViolation::OutOfRange { field, value } => {
                write!(f, "field '{}' value {} is out of range", field, value)
            }
            FieldViolation::UnknownField(field) => write!(f, "unexpected field '{}'", field),
        }
    }
}

struct CompiledRule {
    rule: FieldRule,
    pattern: Option<Regex>,
}

/// Configurable schema check built from `[schema]` rules.
pub struct RuleSetValidator {
    rules: Vec<CompiledRule>,
    allow_unknown_fields: bool,
}

impl RuleSetValidator {
    pub fn from_config(config: &SchemaConfig) -> Result<Self, SchemaBuildError> {
        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(config.fields.len());

        for rule in &config.fields {
            if !seen.insert(rule.name.as_str()) {
                return Err(SchemaBuildError::DuplicateField(rule.name.clone()));
            }

            let pattern = match &rule.pattern {
                Some(pattern) => Some(Regex::new(pattern).map_err(|source| {
                    SchemaBuildError::InvalidPattern {
                        field: rule.name.clone(),
                        source,
                    }
                })?),
                None => None,
            };

            rules.push(CompiledRule {
                rule: rule.clone(),
                pattern,
            });
        }

        Ok(Self {
            rules,
            allow_unknown_fields: config.allow_unknown_fields,
        })
    }

    /// Check `message` against every rule, reporting the first violation.
    pub fn check(&self, message: &RawMessage) -> Result<(), FieldViolation> {
        for compiled in &self.rules {
            let rule = &compiled.rule;
            let value = match message.get(&rule.name) {
                Some(value) => value,
                None if rule.required => return Err(FieldViolation::Missing(rule.name.clone())),
                None => continue,
            };

            if !kind_matches(rule.kind, value) {
                return Err(FieldViolation::WrongKind {
                    field: rule.name.clone(),
                    expected: rule.kind,
                });
            }

            if let (Some(pattern), Some(text)) = (&compiled.pattern, value.as_str()) {
                if !pattern.is_match(text) {
                    return Err(FieldViolation::PatternMismatch(rule.name.clone()));
                }
            }

            if let Some(number) = value.as_f64() {
                let below = rule.min.map_or(false, |min| number < min);
                let above = rule.max.map_or(false, |max| number > max);
                if below || above {
                    return Err(FieldViolation::OutOfRange {
                        field: rule.name.clone(),
                        value: number,
                    });
                }
            }
        }

        if !self.allow_unknown_fields {
            if let Some(key) = message
                .keys()
                .find(|key| !self.rules.iter().any(|c| &c.rule.name == *key))
            {
                return Err(FieldViolation::UnknownField(key.clone()));
            }
        }

        Ok(())
    }
}

impl Default for RuleSetValidator {
    fn default() -> Self {
        Self::from_config(&SchemaConfig::default())
            .expect("default schema rules carry no patterns")
    }
}

impl SchemaCheck for RuleSetValidator {
    fn is_valid_schema(&self, message: &RawMessage) -> bool {
        match self.check(message) {
            Ok(()) => true,
            Err(violation) => {
                debug!("Schema check failed: {}", violation);
                false
            }
        }
    }
}

fn kind_matches(kind: FieldKind, value: &Value) -> bool {
    match kind {
        FieldKind::String => value.is_string(),
        FieldKind::Number => value.is_number(),
        FieldKind::Integer => value.is_i64() || value.is_u64(),
        FieldKind::Boolean => value.is_boolean(),
        FieldKind::Any => true,
    }
}
