//! External collaborator seams: the remote record store and the push
//! platform, each an object-safe trait with an HTTP production client.

use serde::{Deserialize, Serialize};

pub mod data;
pub mod push;

/// One page of a cursor-paginated list result.
///
/// Pagination continues while `next_token` is present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Records in this page.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Cursor for the next page, absent on the last one.
    #[serde(default)]
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// A page with no items and no continuation.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_token: None,
        }
    }
}
