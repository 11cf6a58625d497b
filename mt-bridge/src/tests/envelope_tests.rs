// Location: mt-bridge/src/tests/envelope_tests.rs
// Purpose: Decoding tests for the tagged EA envelope
// Why: Every EA endpoint relies on these rejection rules happening before any state change

use serde_json::json;

use crate::*;

fn ea_info_json() -> serde_json::Value {
    json!({
        "type": "EA_INFO",
        "data": {
            "name": "Test EA",
            "version": "2.01",
            "account": 12345,
            "broker": "Test Broker",
            "symbol": "EURUSD",
            "timeframe": "H1",
            "magic_number": 12345
        },
        "timestamp": "2024-01-01T12:00:00"
    })
}

#[test]
fn test_decode_ea_info_envelope() {
    let envelope: EaEnvelope = serde_json::from_value(ea_info_json()).unwrap();

    assert_eq!(envelope.timestamp, "2024-01-01T12:00:00");
    assert_eq!(envelope.message.kind(), MessageKind::EaInfo);
    assert_eq!(
        envelope.message.ea_id(),
        Some(EaIdentifier::new(12345, 12345))
    );

    match envelope.message {
        EaMessage::EaInfo(info) => {
            assert_eq!(info.name, "Test EA");
            assert_eq!(info.timeframe, "H1");
        }
        other => panic!("unexpected message: {:?}", other),
    }
}

#[test]
fn test_decode_heartbeat_with_empty_last_signal() {
    let envelope: EaEnvelope = serde_json::from_value(json!({
        "type": "HEARTBEAT",
        "data": {
            "status": "active",
            "positions": 0,
            "pending_orders": 0,
            "last_signal": "",
            "account": 12345,
            "magic_number": 67890
        },
        "timestamp": "2024-01-01T12:00:00"
    }))
    .unwrap();

    assert_eq!(
        envelope.message.ea_id(),
        Some(EaIdentifier::new(12345, 67890))
    );
}

#[test]
fn test_trade_result_defaults_optional_fields() {
    let envelope: EaEnvelope = serde_json::from_value(json!({
        "type": "TRADE_RESULT",
        "data": { "signal_id": "SIG_1", "success": false, "error_code": 134 },
        "timestamp": "2024-01-01T12:00:00"
    }))
    .unwrap();

    let EaMessage::TradeResult(result) = envelope.message else {
        panic!("expected a trade result");
    };
    assert_eq!(result.ticket, 0);
    assert_eq!(result.error_code, 134);
    assert!(result.error_message.is_empty());
    assert_eq!(EaMessage::TradeResult(result).ea_id(), None);
}

#[test]
fn test_missing_account_is_rejected() {
    let mut value = ea_info_json();
    value["data"].as_object_mut().unwrap().remove("account");

    let err = serde_json::from_value::<EaEnvelope>(value).unwrap_err();
    assert!(err.to_string().contains("account"), "{}", err);
}

#[test]
fn test_account_with_wrong_type_is_rejected() {
    let mut value = ea_info_json();
    value["data"]["account"] = json!("12345");

    assert!(serde_json::from_value::<EaEnvelope>(value).is_err());
}

#[test]
fn test_unknown_message_type_is_rejected() {
    let mut value = ea_info_json();
    value["type"] = json!("SHUTDOWN");

    let err = serde_json::from_value::<EaEnvelope>(value).unwrap_err();
    assert!(err.to_string().contains("SHUTDOWN"), "{}", err);
}

#[test]
fn test_missing_timestamp_is_rejected() {
    let mut value = ea_info_json();
    value.as_object_mut().unwrap().remove("timestamp");

    let err = serde_json::from_value::<EaEnvelope>(value).unwrap_err();
    assert!(err.to_string().contains("timestamp"), "{}", err);
}

#[test]
fn test_non_object_body_is_rejected() {
    assert!(serde_json::from_value::<EaEnvelope>(json!({"invalid_field": "value"})).is_err());
    assert!(serde_json::from_value::<EaEnvelope>(json!([1, 2, 3])).is_err());
}

#[test]
fn test_expect_kind_rejects_wrong_endpoint() {
    let envelope: EaEnvelope = serde_json::from_value(ea_info_json()).unwrap();

    let err = envelope.expect_kind(MessageKind::Heartbeat).unwrap_err();
    match err {
        ProtocolError::UnexpectedMessageType { expected, found } => {
            assert_eq!(expected, MessageKind::Heartbeat);
            assert_eq!(found, MessageKind::EaInfo);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_envelope_serializes_with_type_data_and_timestamp() {
    let envelope: EaEnvelope = serde_json::from_value(ea_info_json()).unwrap();
    let json = serde_json::to_value(&envelope).unwrap();

    assert_eq!(json, ea_info_json());
}

#[test]
fn test_from_json_reports_malformed_bytes() {
    let err = EaEnvelope::from_json(b"{not json").unwrap_err();
    assert!(matches!(err, ProtocolError::Malformed(_)));
}

#[test]
fn test_decode_ulong_magic_number_above_i64_max() {
    let mut value = ea_info_json();
    value["data"]["magic_number"] = json!(u64::MAX);

    let envelope: EaEnvelope = serde_json::from_value(value).unwrap();
    assert_eq!(
        envelope.message.ea_id(),
        Some(EaIdentifier::new(12345, u64::MAX))
    );
}

#[test]
fn test_negative_magic_number_is_rejected() {
    let mut value = ea_info_json();
    value["data"]["magic_number"] = json!(-1);

    assert!(serde_json::from_value::<EaEnvelope>(value).is_err());
}
