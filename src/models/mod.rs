//! Domain model module declarations.

use serde::{Deserialize, Deserializer};

pub mod dispatch;
pub mod endpoint;
pub mod invite;
pub mod posting;

/// Deserialize a device platform tag leniently.
///
/// The record store carries platforms as free-form strings. Known tags map
/// onto [`endpoint::Platform`]; anything else (including absence) becomes
/// `None` so a single misregistered device cannot fail a whole endpoint
/// listing. The iOS fallback for unresolved platforms is applied later, at
/// dispatch time, where it can be logged per endpoint.
/// Deserialize a nested sub-listing as a plain vector.
///
/// The data gateway wraps nested collections in a connection object
/// (`{"items": [...], "nextToken": ...}`); fixtures and local callers use
/// bare arrays. Both shapes deserialize to the same vector, and `null`
/// becomes empty.
pub(crate) fn deserialize_nested_items<'de, D, T>(
    deserializer: D,
) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Nested<T> {
        Connection {
            #[serde(default = "Vec::new")]
            items: Vec<T>,
        },
        Bare(Vec<T>),
    }

    let nested: Option<Nested<T>> = Option::deserialize(deserializer)?;
    Ok(match nested {
        Some(Nested::Connection { items } | Nested::Bare(items)) => items,
        None => Vec::new(),
    })
}

pub(crate) fn deserialize_platform<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<endpoint::Platform>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(|tag| match tag {
        "IOS" => Some(endpoint::Platform::Ios),
        "ANDROID" => Some(endpoint::Platform::Android),
        _ => None,
    }))
}
