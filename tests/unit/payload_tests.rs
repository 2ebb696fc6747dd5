//! Unit tests for platform payload shaping and the publish envelope.

use serde_json::{json, Map, Value};

use shift_sentinel::dispatch::payload::{apns_payload, build_envelope, extra_fields, fcm_payload};

fn extras_full() -> Map<String, Value> {
    extra_fields(
        Some("escalation"),
        Some("p1"),
        Some(&json!({ "shift": "night", "slots": 2 })),
    )
}

#[test]
fn extra_fields_collects_only_present_values() {
    assert!(extra_fields(None, None, None).is_empty());

    let extras = extras_full();
    assert_eq!(extras.len(), 3);
    assert_eq!(extras["category"], "escalation");
    assert_eq!(extras["postingId"], "p1");
    assert_eq!(extras["metadata"]["shift"], "night");
}

#[test]
fn apns_payload_has_alert_block_and_flattened_extras() {
    let payload = apns_payload("Title", "Body", &extras_full());

    assert_eq!(payload["aps"]["alert"]["title"], "Title");
    assert_eq!(payload["aps"]["alert"]["body"], "Body");
    assert_eq!(payload["aps"]["sound"], "default");
    assert_eq!(payload["category"], "escalation");
    assert_eq!(payload["postingId"], "p1");
    assert_eq!(
        payload["metadata"],
        json!({ "shift": "night", "slots": 2 }),
        "iOS extras keep their structure"
    );
}

#[test]
fn fcm_payload_stringifies_data_values() {
    let mut extras = extras_full();
    extras.insert("count".into(), json!(7));
    extras.insert("urgent".into(), json!(true));

    let payload = fcm_payload("Title", "Body", &extras);
    assert_eq!(payload["notification"]["title"], "Title");
    assert_eq!(payload["notification"]["body"], "Body");

    let data = payload["data"].as_object().unwrap();
    assert_eq!(data["category"], "escalation", "strings pass through");
    assert_eq!(data["count"], "7");
    assert_eq!(data["urgent"], "true");
    assert_eq!(
        data["metadata"],
        json!({ "shift": "night", "slots": 2 }).to_string(),
        "objects are JSON-serialized"
    );
}

#[test]
fn fcm_payload_omits_empty_data_block() {
    let payload = fcm_payload("Title", "Body", &Map::new());
    assert!(payload.get("data").is_none());
    assert_eq!(payload["notification"]["title"], "Title");
}

#[test]
fn envelope_defaults_to_plain_body_and_carries_both_platforms() {
    let envelope = build_envelope("Title", "Body", &extras_full()).unwrap();
    assert_eq!(envelope.default, "Body");

    let apns: Value = serde_json::from_str(envelope.apns.as_deref().unwrap()).unwrap();
    assert_eq!(apns["aps"]["alert"]["title"], "Title");

    let gcm: Value = serde_json::from_str(envelope.gcm.as_deref().unwrap()).unwrap();
    assert_eq!(gcm["notification"]["body"], "Body");
}

#[test]
fn envelope_serializes_with_platform_keys() {
    let envelope = build_envelope("Title", "Body", &Map::new()).unwrap();
    let value = serde_json::to_value(&envelope).unwrap();
    assert!(value.get("default").is_some());
    assert!(value.get("APNS").is_some());
    assert!(value.get("GCM").is_some());
}
