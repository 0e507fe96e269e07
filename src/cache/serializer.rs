//! Cache Value Serialization
//!
//! JSON is the primary encoding. Values that JSON cannot represent
//! (e.g. maps with non-string keys) fall back to hex-encoded bincode
//! behind a marker prefix so the decoder can tell the paths apart.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// Prefix marking a hex-encoded bincode payload.
const BINARY_MARKER: &str = "bin1:";

// == Encode ==
/// Serializes a value for storage.
///
/// Returns `None` only when both the JSON and the binary path fail;
/// callers treat that as "don't cache" rather than an error.
pub fn encode<T: Serialize>(value: &T) -> Option<String> {
    match serde_json::to_string(value) {
        Ok(json) => Some(json),
        Err(json_err) => match bincode::serialize(value) {
            Ok(bytes) => Some(format!("{BINARY_MARKER}{}", hex::encode(bytes))),
            Err(bin_err) => {
                warn!(%json_err, %bin_err, "value not serializable, skipping cache write");
                None
            }
        },
    }
}

// == Decode ==
/// Decodes a stored value into a concrete type, reversing whichever
/// encoding path `encode` used. Returns `None` on any mismatch; callers
/// treat that as a cache miss.
pub fn decode_as<T: DeserializeOwned>(raw: &str) -> Option<T> {
    if let Some(body) = raw.strip_prefix(BINARY_MARKER) {
        let bytes = hex::decode(body).ok()?;
        return bincode::deserialize(&bytes).ok();
    }
    serde_json::from_str(raw).ok()
}

/// Decodes a stored value without type information.
///
/// Malformed or binary-marked content (bincode is not self-describing)
/// is passed through unchanged as a string value instead of erroring,
/// so unreadable cache content can never crash the read path.
pub fn decode(raw: &str) -> serde_json::Value {
    if !raw.starts_with(BINARY_MARKER) {
        if let Ok(value) = serde_json::from_str(raw) {
            return value;
        }
    }
    serde_json::Value::String(raw.to_string())
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_roundtrip_nested_json() {
        let value = json!({
            "name": "pikachu",
            "types": ["electric"],
            "stats": {"speed": 90, "hp": 35},
            "sprite": null,
        });
        let encoded = encode(&value).unwrap();
        assert_eq!(decode(&encoded), value);
    }

    #[test]
    fn test_roundtrip_typed() {
        let value = vec![1i64, 2, 3];
        let encoded = encode(&value).unwrap();
        assert_eq!(decode_as::<Vec<i64>>(&encoded), Some(value));
    }

    #[test]
    fn test_binary_fallback_for_non_string_keys() {
        // JSON rejects tuple map keys; the binary path carries them.
        let mut value: BTreeMap<(u8, u8), String> = BTreeMap::new();
        value.insert((1, 2), "pair".to_string());

        let encoded = encode(&value).unwrap();
        assert!(encoded.starts_with(BINARY_MARKER));
        assert_eq!(decode_as::<BTreeMap<(u8, u8), String>>(&encoded), Some(value));
    }

    #[test]
    fn test_binary_payload_passes_through_untyped_decode() {
        let mut value: BTreeMap<(u8, u8), u8> = BTreeMap::new();
        value.insert((0, 0), 1);
        let encoded = encode(&value).unwrap();

        // Untyped decode cannot reverse bincode; it must not error.
        assert_eq!(decode(&encoded), serde_json::Value::String(encoded.clone()));
    }

    #[test]
    fn test_malformed_input_passes_through() {
        let raw = "{not json at all";
        assert_eq!(decode(raw), serde_json::Value::String(raw.to_string()));
        assert_eq!(decode_as::<Vec<i64>>(raw), None);
    }

    #[test]
    fn test_decode_as_rejects_wrong_shape() {
        let encoded = encode(&json!({"a": 1})).unwrap();
        assert_eq!(decode_as::<Vec<String>>(&encoded), None);
    }
}
