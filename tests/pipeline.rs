use sentiment_signal::config::Config;
use sentiment_signal::{
    compute_sentiment_signal, validate_input_message, MessageProcessor, RawMessage,
    RuleSetValidator, Signal, SignalError,
};
use serde_json::{json, Value};

fn map(value: Value) -> RawMessage {
    value.as_object().cloned().unwrap()
}

#[test]
fn validate_then_compute() {
    let validated = validate_input_message(
        map(json!({ "symbol": "AAPL", "sentiment_score": 0.3, "desk": "eq" })),
        &RuleSetValidator::default(),
    )
    .unwrap();
    let enriched = compute_sentiment_signal(validated).unwrap();

    assert_eq!(enriched.signal(), Signal::Buy);
    assert_eq!(
        Value::Object(enriched.into_inner()),
        json!({ "symbol": "AAPL", "sentiment_score": 0.3, "desk": "eq", "sentiment_signal": "BUY" })
    );
}

#[test]
fn boundary_scores() {
    let processor = MessageProcessor::default();
    let cases = [(0.3, Signal::Buy), (-0.3, Signal::Sell), (0.29999, Signal::Hold)];

    for (score, expected) in cases {
        let enriched = processor
            .process(map(json!({ "symbol": "SPY", "sentiment_score": score })))
            .unwrap();
        assert_eq!(enriched.signal(), expected, "score {}", score);
    }
}

#[test]
fn configured_schema_gates_messages() {
    let config = Config::load("config.toml").unwrap();
    let processor = MessageProcessor::from_config(&config).unwrap();

    assert!(processor
        .process(map(json!({ "symbol": "BRK.B", "sentiment_score": -0.31 })))
        .is_ok());
    assert!(matches!(
        processor.process(map(json!({ "symbol": "brk b", "sentiment_score": -0.31 }))),
        Err(SignalError::SchemaValidation { .. })
    ));
}

#[test]
fn permissive_schema_allows_defaults() {
    let config = Config::parse(
        r#"
        [schema]
        fields = []
        "#,
    )
    .unwrap();
    let processor = MessageProcessor::from_config(&config).unwrap();

    let enriched = processor.process(map(json!({ "note": "empty" }))).unwrap();
    assert_eq!(enriched.signal(), Signal::Hold);
    assert_eq!(enriched.symbol(), "UNKNOWN");
    assert_eq!(enriched.get("sentiment_score"), Some(&json!(0.0)));
    assert!(enriched.get("symbol").is_none());
}
