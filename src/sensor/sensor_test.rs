use crate::FeedErrorCode;
use crate::FeedErrorInfo;
use crate::PushError;
use crate::SensorType;
use crate::SensorValue;
use crate::SubscriptionKey;

/// Case 1: every value variant reports the matching sensor type
#[test]
fn test_sensor_value_kind() {
    assert_eq!(SensorValue::Number(21.5).kind(), SensorType::Gauge);
    assert_eq!(SensorValue::Text("ok".into()).kind(), SensorType::Text);
    assert_eq!(SensorValue::Switch(true).kind(), SensorType::Switch);
    assert_eq!(
        SensorValue::Snapshot("blob://cam/1".into()).kind(),
        SensorType::Snapshot
    );
}

/// Case 2: recognized push errors decode into the consumer-facing shape
#[test]
fn test_push_error_decoding_recognized() {
    let decoded = FeedErrorInfo::from_push_error(&PushError::PermissionDenied("no scope".into()))
        .expect("should decode");
    assert_eq!(decoded.code, FeedErrorCode::PermissionDenied);
    assert_eq!(decoded.message, "no scope");

    let decoded = FeedErrorInfo::from_push_error(&PushError::ConnectionLost("reset".into()))
        .expect("should decode");
    assert_eq!(decoded.code, FeedErrorCode::ConnectionLost);

    let decoded = FeedErrorInfo::from_push_error(&PushError::Rejected("bad document".into()))
        .expect("should decode");
    assert_eq!(decoded.code, FeedErrorCode::Rejected);
}

/// Case 3: unclassified push errors are not decoded
#[test]
fn test_push_error_decoding_unclassified() {
    let decoded = FeedErrorInfo::from_push_error(&PushError::Unclassified("???".into()));
    assert!(decoded.is_none());
}

/// Case 4: key display is stable for log correlation
#[test]
fn test_subscription_key_display() {
    let key = SubscriptionKey::new("d1", "temperature");
    assert_eq!(key.to_string(), "d1/temperature");
}
