//! Property-Based Tests for the Memcached Driver
//!
//! Uses proptest against a memory-backed driver.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

use tracing::Span;

use crate::config::Config;
use crate::error::ErrorKind;
use crate::kv::{Item, Storage};
use crate::memcached::Driver;
use crate::memory::MemoryClient;

// == Strategies ==
/// Generates valid keys (non-blank, within memcached's length limit)
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:.-]{1,64}".prop_map(|s| s)
}

/// Generates keys that are empty or whitespace only
fn blank_key_strategy() -> impl Strategy<Value = String> {
    "[ \t\n]{0,4}".prop_map(|s| s)
}

/// Arbitrary binary values
fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..512)
}

fn memory_driver() -> (Driver<MemoryClient>, MemoryClient) {
    let client = MemoryClient::new();
    let driver = Driver::with_client(client.clone(), Span::none(), Config::default(), None);
    (driver, client)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Set followed by Get returns the exact bytes written.
    #[test]
    fn prop_set_get_round_trip(key in valid_key_strategy(), value in value_strategy()) {
        let (driver, _) = memory_driver();

        driver.set(&[Some(Item::new(key.clone(), value.clone()))]).unwrap();

        prop_assert_eq!(driver.get(&key).unwrap(), Some(value));
    }

    // Has returns exactly the keys that were set, all mapped to true.
    #[test]
    fn prop_has_reports_only_present_keys(
        present in prop::collection::hash_set(valid_key_strategy(), 0..10),
        queried in prop::collection::vec(valid_key_strategy(), 1..20)
    ) {
        let (driver, _) = memory_driver();
        let items: Vec<Option<Item>> = present
            .iter()
            .map(|key| Some(Item::new(key.clone(), "v")))
            .collect();
        if !items.is_empty() {
            driver.set(&items).unwrap();
        }

        let result = driver.has(&queried).unwrap();

        let expected: HashMap<String, bool> = queried
            .iter()
            .filter(|key| present.contains(*key))
            .map(|key| (key.clone(), true))
            .collect();
        prop_assert_eq!(result, expected);
    }

    // A blank key anywhere in the batch fails Has, MGet and Delete without
    // touching the client.
    #[test]
    fn prop_blank_key_rejected_without_calls(
        mut keys in prop::collection::vec(valid_key_strategy(), 0..10),
        blank in blank_key_strategy(),
        position in any::<prop::sample::Index>()
    ) {
        let (driver, client) = memory_driver();
        let at = position.index(keys.len() + 1);
        keys.insert(at, blank);

        prop_assert!(matches!(driver.has(&keys).unwrap_err().kind(), ErrorKind::EmptyKey));
        prop_assert!(matches!(driver.mget(&keys).unwrap_err().kind(), ErrorKind::EmptyKey));
        prop_assert!(matches!(driver.delete(&keys).unwrap_err().kind(), ErrorKind::EmptyKey));
        prop_assert_eq!(client.stats().total_calls(), 0);
    }

    // MGet returns the stored value for every present key and nothing else.
    #[test]
    fn prop_mget_matches_written_values(
        written in prop::collection::hash_map(valid_key_strategy(), value_strategy(), 1..10),
        extra in prop::collection::vec(valid_key_strategy(), 0..5)
    ) {
        let (driver, _) = memory_driver();
        let items: Vec<Option<Item>> = written
            .iter()
            .map(|(key, value)| Some(Item::new(key.clone(), value.clone())))
            .collect();
        driver.set(&items).unwrap();

        let mut keys: Vec<String> = written.keys().cloned().collect();
        keys.extend(extra.iter().filter(|k| !written.contains_key(*k)).cloned());

        prop_assert_eq!(driver.mget(&keys).unwrap(), written);
    }

    // After Clear, nothing previously written can be read back.
    #[test]
    fn prop_clear_removes_all(keys in prop::collection::hash_set(valid_key_strategy(), 1..20)) {
        let (driver, _) = memory_driver();
        let items: Vec<Option<Item>> =
            keys.iter().map(|k| Some(Item::new(k.clone(), "v"))).collect();
        driver.set(&items).unwrap();

        driver.clear().unwrap();

        let keys: Vec<String> = keys.into_iter().collect();
        prop_assert!(driver.has(&keys).unwrap().is_empty());
        for key in &keys {
            prop_assert_eq!(driver.get(key).unwrap(), None);
        }
    }

    // Items before an unparsable timeout are written, the rest are not.
    #[test]
    fn prop_set_stops_at_bad_timeout(
        keys in prop::collection::hash_set(valid_key_strategy(), 2..10),
        position in any::<prop::sample::Index>()
    ) {
        let (driver, _) = memory_driver();
        let keys: Vec<String> = keys.into_iter().collect();
        let bad = position.index(keys.len());
        let items: Vec<Option<Item>> = keys
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let item = Item::new(key.clone(), "v");
                Some(if i == bad { item.with_timeout("soon") } else { item })
            })
            .collect();

        let err = driver.set(&items).unwrap_err();
        prop_assert!(
            matches!(err.kind(), ErrorKind::InvalidTimeout { .. }),
            "unexpected error kind: {}",
            err
        );

        let present: HashSet<String> = driver.has(&keys).unwrap().into_keys().collect();
        let expected: HashSet<String> = keys[..bad].iter().cloned().collect();
        prop_assert_eq!(present, expected);
    }
}
