//! Request DTOs for the KV HTTP facade
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::kv::Item;

/// Request body naming keys (has, mget, ttl, delete)
///
/// A missing or `null` key list is passed on as an empty one, which the
/// storage rejects with "no keys".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeysRequest {
    #[serde(default)]
    pub keys: Option<Vec<String>>,
}

impl KeysRequest {
    pub fn into_keys(self) -> Vec<String> {
        self.keys.unwrap_or_default()
    }
}

/// One item in a set or mexpire request
#[derive(Debug, Clone, Deserialize)]
pub struct ItemRequest {
    pub key: String,
    #[serde(default)]
    pub value: String,
    /// RFC 3339 timestamp; empty or missing means no expiration
    #[serde(default)]
    pub timeout: String,
}

impl From<ItemRequest> for Item {
    fn from(req: ItemRequest) -> Self {
        Item::new(req.key, req.value).with_timeout(req.timeout)
    }
}

/// Request body carrying items (set, mexpire). `null` entries are kept as
/// absent items.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemsRequest {
    #[serde(default)]
    pub items: Option<Vec<Option<ItemRequest>>>,
}

impl ItemsRequest {
    pub fn into_items(self) -> Vec<Option<Item>> {
        self.items
            .unwrap_or_default()
            .into_iter()
            .map(|item| item.map(Item::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_request_deserialize() {
        let req: KeysRequest = serde_json::from_str(r#"{"keys": ["a", "b"]}"#).unwrap();
        assert_eq!(req.into_keys(), vec!["a", "b"]);
    }

    #[test]
    fn test_keys_request_null_is_empty() {
        let req: KeysRequest = serde_json::from_str(r#"{"keys": null}"#).unwrap();
        assert!(req.into_keys().is_empty());
        let req: KeysRequest = serde_json::from_str("{}").unwrap();
        assert!(req.into_keys().is_empty());
    }

    #[test]
    fn test_items_request_keeps_null_entries() {
        let json = r#"{"items": [
            {"key": "a", "value": "1"},
            null,
            {"key": "b", "value": "2", "timeout": "2099-01-01T00:00:00Z"}
        ]}"#;
        let items = serde_json::from_str::<ItemsRequest>(json).unwrap().into_items();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0], Some(Item::new("a", "1")));
        assert!(items[1].is_none());
        assert_eq!(items[2].as_ref().unwrap().timeout, "2099-01-01T00:00:00Z");
    }

    #[test]
    fn test_item_request_defaults() {
        let req: ItemRequest = serde_json::from_str(r#"{"key": "k"}"#).unwrap();
        let item = Item::from(req);
        assert!(item.value.is_empty());
        assert!(item.timeout.is_empty());
    }
}
