//! Tests against a running memcached server
//!
//! Ignored by default. Run with a server on 127.0.0.1:11211:
//! `cargo test --test memcached_live -- --ignored --test-threads=1`

use std::sync::Arc;
use std::time::Duration;

use memcached_kv::plugin::TracingLogger;
use memcached_kv::{ErrorKind, Item, JsonConfig, Plugin, Storage};
use serde_json::json;

// == Helper Functions ==

fn storage() -> Arc<dyn Storage> {
    let addr = std::env::var("MEMCACHED_ADDR").unwrap_or_else(|_| "127.0.0.1:11211".to_string());
    let cfg = JsonConfig::new(json!({
        "kv": {
            "cache": {
                "driver": "memcached",
                "config": { "addr": [addr], "connection_timeout_ms": 2000 }
            }
        }
    }));
    let plugin = Plugin::init(&TracingLogger, Arc::new(cfg)).unwrap();
    plugin.kv_from_config("kv.cache.config").unwrap()
}

fn keys(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|k| k.to_string()).collect()
}

// == Tests ==

#[test]
#[ignore]
fn live_set_get_round_trip() {
    let storage = storage();
    storage.clear().unwrap();

    storage
        .set(&[Some(Item::new("live:a", vec![1u8, 2, 3]))])
        .unwrap();
    assert_eq!(storage.get("live:a").unwrap(), Some(vec![1u8, 2, 3]));
    assert_eq!(storage.get("live:missing").unwrap(), None);
}

#[test]
#[ignore]
fn live_has_and_mget_skip_misses() {
    let storage = storage();
    storage.clear().unwrap();
    storage.set(&[Some(Item::new("live:a", "1"))]).unwrap();

    let present = storage.has(&keys(&["live:a", "live:b"])).unwrap();
    assert_eq!(present.len(), 1);
    assert_eq!(present.get("live:a"), Some(&true));

    let values = storage.mget(&keys(&["live:a", "live:b"])).unwrap();
    assert_eq!(values.len(), 1);
}

#[test]
#[ignore]
fn live_mexpire_missing_key_fails() {
    let storage = storage();
    storage.clear().unwrap();

    let item = Item::expiring_in("live:ghost", "", Duration::from_secs(60));
    let err = storage.mexpire(&[Some(item)]).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::NotFound(_)));
}

#[test]
#[ignore]
fn live_expiring_item_and_clear() {
    let storage = storage();
    storage.clear().unwrap();

    storage
        .set(&[
            Some(Item::expiring_in("live:short", "x", Duration::from_secs(600))),
            Some(Item::new("live:long", "y")),
        ])
        .unwrap();
    assert!(storage.get("live:short").unwrap().is_some());

    storage.delete(&keys(&["live:long", "live:never"])).unwrap();
    assert!(storage.get("live:long").unwrap().is_none());

    storage.clear().unwrap();
    assert!(storage.get("live:short").unwrap().is_none());
}

#[test]
#[ignore]
fn live_ttl_is_unsupported() {
    let storage = storage();
    let err = storage.ttl(&keys(&["live:a"])).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::TtlUnsupported));
}
