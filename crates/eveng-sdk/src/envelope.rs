// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The server's response wrapper and its polymorphic list shapes.
//!
//! Every API response is `{status, code, message, data}`. A response counts as
//! a success only when `status` is `"success"` and `code` lies in
//! `[200, 300)`; anything else is an application-level failure, independent of
//! the HTTP status line.

use std::collections::BTreeMap;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Result, SdkError};
use crate::lenient;
use crate::types::Interface;

/// Value of `status` on success.
pub const SUCCESS_STATUS: &str = "success";

/// The uniform response wrapper.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    /// True when the wrapper's own status field is the success marker.
    pub fn status_ok(&self) -> bool {
        self.status == SUCCESS_STATUS
    }

    /// True when the numeric code is in the success range.
    pub fn code_ok(&self) -> bool {
        (200..300).contains(&self.code)
    }

    /// Success marker and success code together.
    pub fn is_success(&self) -> bool {
        self.status_ok() && self.code_ok()
    }

    /// Deserialize the payload, consuming the envelope.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T> {
        serde_json::from_value(self.data).map_err(|e| {
            SdkError::UnexpectedResponse(format!("payload does not match schema: {}", e))
        })
    }
}

/// Parse a raw response body into an [`Envelope`].
///
/// A body that is not a JSON object in the wrapper shape is a
/// [`SdkError::Decode`] carrying the HTTP status; it is never replaced with a
/// synthetic envelope.
pub fn decode(body: &[u8], http_status: u16, status_text: &str) -> Result<Envelope> {
    serde_json::from_slice::<Envelope>(body).map_err(|e| SdkError::Decode {
        http_status,
        status_text: status_text.to_string(),
        reason: e.to_string(),
    })
}

/// Interfaces keyed by slot index, in ascending slot order.
///
/// Depending on the node driver the server sends either a dense zero-based
/// array or an object keyed by stringified slot numbers (IOL nodes do the
/// latter). Both decode to the same value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct InterfaceMap(BTreeMap<u32, Interface>);

impl InterfaceMap {
    pub fn get(&self, slot: u32) -> Option<&Interface> {
        self.0.get(&slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &Interface)> {
        self.0.iter().map(|(slot, iface)| (*slot, iface))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First interface, by slot order, whose name matches exactly.
    pub fn find_by_name(&self, name: &str) -> Option<(u32, &Interface)> {
        self.iter().find(|(_, iface)| iface.name == name)
    }

    pub fn into_inner(self) -> BTreeMap<u32, Interface> {
        self.0
    }
}

impl From<BTreeMap<u32, Interface>> for InterfaceMap {
    fn from(map: BTreeMap<u32, Interface>) -> Self {
        Self(map)
    }
}

impl<'de> Deserialize<'de> for InterfaceMap {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        indexed(deserializer).map(Self)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IndexedShape<T> {
    Dense(Vec<T>),
    Sparse(BTreeMap<String, T>),
}

/// Decode a dense array (zero-based) or a sparse index-keyed object into one
/// ordered map. Null decodes as empty.
pub(crate) fn indexed<'de, D, T>(deserializer: D) -> std::result::Result<BTreeMap<u32, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    match Option::<IndexedShape<T>>::deserialize(deserializer)? {
        None => Ok(BTreeMap::new()),
        Some(IndexedShape::Dense(items)) => Ok((0u32..).zip(items).collect()),
        Some(IndexedShape::Sparse(entries)) => entries
            .into_iter()
            .map(|(key, value)| {
                key.trim()
                    .parse::<u32>()
                    .map(|slot| (slot, value))
                    .map_err(|_| D::Error::custom(format!("non-numeric index key {:?}", key)))
            })
            .collect(),
    }
}

/// Normalize an interface list payload of either shape.
pub fn decode_interface_list(payload: &Value) -> Result<InterfaceMap> {
    InterfaceMap::deserialize(payload)
        .map_err(|e| SdkError::UnexpectedResponse(format!("invalid interface list: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_with_created_code() {
        let env = decode(br#"{"status":"success","code":201,"message":"ok","data":{}}"#, 200, "OK")
            .unwrap();
        assert!(env.is_success());
    }

    #[test]
    fn test_failure_status_is_application_failure() {
        let env = decode(br#"{"status":"fail","code":200,"message":"nope"}"#, 200, "OK").unwrap();
        assert!(!env.status_ok());
        assert!(!env.is_success());
    }

    #[test]
    fn test_code_outside_range_is_application_failure() {
        for code in [404, 300, 199, 0, 500] {
            let env = Envelope {
                status: SUCCESS_STATUS.to_string(),
                code,
                ..Default::default()
            };
            assert!(!env.is_success(), "code {code}");
        }
        let env = Envelope {
            status: SUCCESS_STATUS.to_string(),
            code: 299,
            ..Default::default()
        };
        assert!(env.is_success());
    }

    #[test]
    fn test_numeric_string_code() {
        let env = decode(br#"{"status":"success","code":"200","message":""}"#, 200, "OK").unwrap();
        assert_eq!(env.code, 200);
        assert!(env.is_success());
    }

    #[test]
    fn test_missing_data_is_null() {
        let env = decode(br#"{"status":"success","code":200,"message":"x"}"#, 200, "OK").unwrap();
        assert!(env.data.is_null());
    }

    #[test]
    fn test_decode_error_preserves_status() {
        let err = decode(b"<html>Bad Gateway</html>", 502, "Bad Gateway").unwrap_err();
        match err {
            SdkError::Decode {
                http_status,
                status_text,
                ..
            } => {
                assert_eq!(http_status, 502);
                assert_eq!(status_text, "Bad Gateway");
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_error_on_empty_body() {
        assert!(matches!(
            decode(b"", 200, "OK"),
            Err(SdkError::Decode { http_status: 200, .. })
        ));
    }

    #[test]
    fn test_interface_list_shapes_are_equivalent() {
        let dense = decode_interface_list(&json!([{"name": "Gi0/0", "network_id": 1}])).unwrap();
        let sparse =
            decode_interface_list(&json!({"0": {"name": "Gi0/0", "network_id": 1}})).unwrap();

        assert_eq!(dense, sparse);
        assert_eq!(dense.len(), 1);
        let iface = dense.get(0).unwrap();
        assert_eq!(iface.name, "Gi0/0");
        assert_eq!(iface.network_id, 1);
    }

    #[test]
    fn test_sparse_interface_list_keeps_gaps_in_order() {
        let map = decode_interface_list(&json!({
            "16": {"name": "e1/0", "network_id": 0},
            "0": {"name": "e0/0", "network_id": 3},
            "1": {"name": "e0/1", "network_id": 0}
        }))
        .unwrap();
        let slots: Vec<u32> = map.iter().map(|(slot, _)| slot).collect();
        assert_eq!(slots, vec![0, 1, 16]);
        assert_eq!(map.find_by_name("e1/0").map(|(slot, _)| slot), Some(16));
    }

    #[test]
    fn test_interface_list_null_and_empty() {
        assert!(decode_interface_list(&Value::Null).unwrap().is_empty());
        assert!(decode_interface_list(&json!([])).unwrap().is_empty());
        assert!(decode_interface_list(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_interface_list_rejects_non_numeric_keys() {
        assert!(decode_interface_list(&json!({"eth0": {"name": "x", "network_id": 0}})).is_err());
    }

    #[test]
    fn test_into_data_reports_schema_mismatch() {
        let env = Envelope {
            data: json!("not an object"),
            ..Default::default()
        };
        let result: Result<BTreeMap<String, String>> = env.into_data();
        assert!(matches!(result, Err(SdkError::UnexpectedResponse(_))));
    }
}
