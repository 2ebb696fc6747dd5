//! Platform-specific push payload builders.
//!
//! Both builders compose from a single extra-fields map so iOS and Android
//! payloads always carry the same optional data, shaped per platform: iOS
//! flattens extras as top-level payload keys, Android stringifies them into
//! the `data` map.

use serde_json::{json, Map, Value};

use crate::gateway::push::MessageEnvelope;
use crate::Result;

/// Collect the optional dispatch fields into one extras map.
#[must_use]
pub fn extra_fields(
    category: Option<&str>,
    posting_id: Option<&str>,
    metadata: Option<&Value>,
) -> Map<String, Value> {
    let mut extras = Map::new();
    if let Some(category) = category {
        extras.insert("category".into(), category.into());
    }
    if let Some(posting_id) = posting_id {
        extras.insert("postingId".into(), posting_id.into());
    }
    if let Some(metadata) = metadata {
        extras.insert("metadata".into(), metadata.clone());
    }
    extras
}

/// Build the iOS payload: an `aps` alert block with the default sound,
/// extras flattened as top-level keys.
#[must_use]
pub fn apns_payload(title: &str, body: &str, extras: &Map<String, Value>) -> Value {
    let mut payload = Map::new();
    payload.insert(
        "aps".into(),
        json!({
            "alert": { "title": title, "body": body },
            "sound": "default",
        }),
    );
    for (key, value) in extras {
        payload.insert(key.clone(), value.clone());
    }
    Value::Object(payload)
}

/// Build the Android payload: a `notification` block plus a `data` map of
/// stringified extras, omitted entirely when there are none.
#[must_use]
pub fn fcm_payload(title: &str, body: &str, extras: &Map<String, Value>) -> Value {
    let mut payload = Map::new();
    payload.insert(
        "notification".into(),
        json!({ "title": title, "body": body }),
    );
    if !extras.is_empty() {
        let data: Map<String, Value> = extras
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(stringify(value))))
            .collect();
        payload.insert("data".into(), Value::Object(data));
    }
    Value::Object(payload)
}

/// Wrap both platform payloads in a publish envelope whose plain-text
/// default is the body.
///
/// # Errors
///
/// Returns [`AppError::Parse`](crate::AppError::Parse) if a payload fails to serialize.
pub fn build_envelope(
    title: &str,
    body: &str,
    extras: &Map<String, Value>,
) -> Result<MessageEnvelope> {
    Ok(MessageEnvelope {
        default: body.to_owned(),
        apns: Some(serde_json::to_string(&apns_payload(title, body, extras))?),
        gcm: Some(serde_json::to_string(&fcm_payload(title, body, extras))?),
    })
}

/// Android `data` values must be strings: strings pass through, everything
/// else is JSON-serialized.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
