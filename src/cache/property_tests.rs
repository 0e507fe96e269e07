//! Property-Based Tests for Cache Module
//!
//! Uses proptest to verify key-codec determinism and discrimination,
//! serializer round-trips, and store semantics on the memory backend.

use proptest::prelude::*;
use serde_json::json;

use crate::cache::key::{Identity, ListParams, SortMode};
use crate::cache::serializer;
use crate::cache::store::CacheStore;

// == Strategies ==
fn sort_strategy() -> impl Strategy<Value = SortMode> {
    prop_oneof![
        Just(SortMode::Id),
        Just(SortMode::Name),
        Just(SortMode::Favorites),
    ]
}

fn identity_strategy() -> impl Strategy<Value = Identity> {
    prop_oneof![
        Just(Identity::Anonymous),
        (1i32..10_000).prop_map(Identity::User),
    ]
}

fn text_filter_strategy() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[a-zA-Z ]{1,16}")
}

fn list_params_strategy() -> impl Strategy<Value = ListParams> {
    (
        1u32..1000,
        1u32..100,
        text_filter_strategy(),
        text_filter_strategy(),
        sort_strategy(),
        identity_strategy(),
    )
        .prop_map(|(page, per_page, search, type_filter, sort, user)| ListParams {
            page,
            per_page,
            search,
            type_filter,
            sort,
            user,
        })
}

fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:]{1,64}"
}

fn valid_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,256}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any parameter tuple, deriving the key twice yields the same key.
    #[test]
    fn prop_key_determinism(params in list_params_strategy()) {
        prop_assert_eq!(params.digest(), params.clone().digest());
        prop_assert_eq!(params.canonical(), params.clone().canonical());
    }

    // Tuples differing in any single field derive different keys.
    #[test]
    fn prop_key_discriminates_page(params in list_params_strategy()) {
        let other = ListParams { page: params.page + 1, ..params.clone() };
        prop_assert_ne!(params.digest(), other.digest());
    }

    #[test]
    fn prop_key_discriminates_per_page(params in list_params_strategy()) {
        let other = ListParams { per_page: params.per_page + 1, ..params.clone() };
        prop_assert_ne!(params.digest(), other.digest());
    }

    // For identity-dependent sorts, distinct users never share a key,
    // and no user shares the anonymous partition.
    #[test]
    fn prop_identity_partitions_never_alias(user_id in 1i32..10_000, params in list_params_strategy()) {
        let base = ListParams { sort: SortMode::Favorites, ..params };
        let as_user = ListParams { user: Identity::User(user_id), ..base.clone() };
        let as_anon = ListParams { user: Identity::Anonymous, ..base };
        prop_assert_ne!(as_user.digest(), as_anon.digest());
    }

    // The digest stays 8 hex chars for any input.
    #[test]
    fn prop_digest_is_short_hex(params in list_params_strategy()) {
        let digest = params.digest();
        prop_assert_eq!(digest.len(), 8);
        prop_assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    // Structurally-encodable values survive an encode/decode round trip.
    #[test]
    fn prop_serializer_roundtrip(
        name in "[a-z]{1,12}",
        id in 1i64..100_000,
        types in prop::collection::vec("[a-z]{1,8}", 0..4)
    ) {
        let value = json!({ "pokemon_id": id, "name": name, "types": types });
        let encoded = serializer::encode(&value).unwrap();
        prop_assert_eq!(serializer::decode(&encoded), value);
    }

    // Arbitrary non-JSON input decodes to a pass-through string, never a panic.
    #[test]
    fn prop_decode_never_panics(raw in "\\PC{0,128}") {
        let _ = serializer::decode(&raw);
        let _ = serializer::decode_as::<serde_json::Value>(&raw);
    }
}

// Store semantics on the memory backend.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // Storing then retrieving returns the stored value.
    #[test]
    fn prop_store_roundtrip(key in valid_key_strategy(), value in valid_value_strategy()) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let store = CacheStore::in_memory();
            prop_assert!(store.set(&key, &value, None).await);
            prop_assert_eq!(store.get(&key).await, Some(value));
            Ok(())
        })?;
    }

    // After delete, a get misses.
    #[test]
    fn prop_store_delete_removes(key in valid_key_strategy(), value in valid_value_strategy()) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let store = CacheStore::in_memory();
            store.set(&key, &value, None).await;
            prop_assert!(store.delete(&key).await);
            prop_assert_eq!(store.get(&key).await, None);
            Ok(())
        })?;
    }

    // Overwriting a key returns the newest value.
    #[test]
    fn prop_store_overwrite(
        key in valid_key_strategy(),
        value1 in valid_value_strategy(),
        value2 in valid_value_strategy()
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let store = CacheStore::in_memory();
            store.set(&key, &value1, None).await;
            store.set(&key, &value2, None).await;
            prop_assert_eq!(store.get(&key).await, Some(value2));
            Ok(())
        })?;
    }
}
