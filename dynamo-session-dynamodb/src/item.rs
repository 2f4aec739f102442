//! Session item layout in the DynamoDB table.

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use dynamo_session_core::{BackendError, BackendResult, StoredSession};
use std::collections::HashMap;

/// Partition key attribute.
pub const KEY_ATTRIBUTE: &str = "id";

/// Payload attribute.
pub const DATA_ATTRIBUTE: &str = "data";

/// Default TTL attribute.
pub const DEFAULT_TTL_ATTRIBUTE: &str = "ttl";

/// Update expression used for write-back.
pub(crate) const UPDATE_EXPRESSION: &str = "SET #data = :data, #ttl = :ttl";

/// Key map for a session id.
pub fn key(id: &str) -> HashMap<String, AttributeValue> {
    HashMap::from([(KEY_ATTRIBUTE.to_string(), AttributeValue::S(id.to_string()))])
}

/// Convert a returned item into a [`StoredSession`].
///
/// A missing `data` attribute is allowed and means an empty session; a
/// missing TTL attribute means the item never expires.
pub fn parse_item(
    id: &str,
    item: &HashMap<String, AttributeValue>,
    ttl_attribute: &str,
) -> BackendResult<StoredSession> {
    let data = match item.get(DATA_ATTRIBUTE) {
        None | Some(AttributeValue::Null(_)) => None,
        Some(AttributeValue::S(s)) => Some(s.clone()),
        Some(other) => {
            return Err(BackendError::malformed(format!(
                "'{DATA_ATTRIBUTE}' of session {id} is not a string: {other:?}"
            )));
        }
    };

    let expires_at = match item.get(ttl_attribute) {
        None | Some(AttributeValue::Null(_)) => None,
        Some(AttributeValue::N(n)) => Some(parse_epoch(id, ttl_attribute, n)?),
        Some(other) => {
            return Err(BackendError::malformed(format!(
                "'{ttl_attribute}' of session {id} is not a number: {other:?}"
            )));
        }
    };

    Ok(StoredSession::new(id, data, expires_at))
}

fn parse_epoch(id: &str, ttl_attribute: &str, value: &str) -> BackendResult<DateTime<Utc>> {
    value
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| {
            BackendError::malformed(format!(
                "'{ttl_attribute}' of session {id} is not epoch seconds: {value}"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(pairs: Vec<(&str, AttributeValue)>) -> HashMap<String, AttributeValue> {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn test_key_shape() {
        let key = key("foobar");
        assert_eq!(key.len(), 1);
        assert_eq!(key["id"], AttributeValue::S("foobar".to_string()));
    }

    #[test]
    fn test_parse_full_item() {
        let parsed = parse_item(
            "abc",
            &item(vec![
                ("id", AttributeValue::S("abc".to_string())),
                ("data", AttributeValue::S("e30=".to_string())),
                ("ttl", AttributeValue::N("1700000000".to_string())),
            ]),
            DEFAULT_TTL_ATTRIBUTE,
        )
        .unwrap();

        assert_eq!(parsed.id, "abc");
        assert_eq!(parsed.data.as_deref(), Some("e30="));
        assert_eq!(parsed.expires_at.map(|t| t.timestamp()), Some(1_700_000_000));
    }

    #[test]
    fn test_parse_item_with_empty_data() {
        let parsed = parse_item(
            "abc",
            &item(vec![("data", AttributeValue::S(String::new()))]),
            DEFAULT_TTL_ATTRIBUTE,
        )
        .unwrap();
        assert_eq!(parsed.data.as_deref(), Some(""));
        assert!(parsed.expires_at.is_none());
    }

    #[test]
    fn test_parse_item_without_data() {
        let parsed = parse_item("abc", &HashMap::new(), DEFAULT_TTL_ATTRIBUTE).unwrap();
        assert!(parsed.data.is_none());
    }

    #[test]
    fn test_parse_item_custom_ttl_attribute() {
        let parsed = parse_item(
            "abc",
            &item(vec![("expires", AttributeValue::N("60".to_string()))]),
            "expires",
        )
        .unwrap();
        assert_eq!(parsed.expires_at.map(|t| t.timestamp()), Some(60));
    }

    #[test]
    fn test_parse_malformed_items() {
        let err = parse_item(
            "abc",
            &item(vec![("data", AttributeValue::N("1".to_string()))]),
            DEFAULT_TTL_ATTRIBUTE,
        )
        .unwrap_err();
        assert!(matches!(err, BackendError::MalformedItem(_)));

        let err = parse_item(
            "abc",
            &item(vec![("ttl", AttributeValue::N("soon".to_string()))]),
            DEFAULT_TTL_ATTRIBUTE,
        )
        .unwrap_err();
        assert!(matches!(err, BackendError::MalformedItem(_)));
    }
}
