//! Ids of task and note list entries.
//!
//! New entries carry UUIDs. Older profile documents used millisecond
//! timestamps (`"1718000000000"`, sometimes as bare numbers); those map onto
//! the UUID whose 128-bit value is the timestamp, so an entry keeps the same
//! id across loads and is written back in UUID form.

use serde::de::Error;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Parses a stored entry id, accepting UUID text or a decimal timestamp.
pub fn parse_list_id(raw: &str) -> Option<Uuid> {
    let raw = raw.trim();
    if let Ok(id) = Uuid::parse_str(raw) {
        return Some(id);
    }
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u128>().ok().map(Uuid::from_u128)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredId {
    Text(String),
    Number(u64),
}

pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Uuid, D::Error>
where
    D: Deserializer<'de>,
{
    match StoredId::deserialize(deserializer)? {
        StoredId::Text(text) => parse_list_id(&text)
            .ok_or_else(|| D::Error::custom(format!("invalid list entry id `{text}`"))),
        StoredId::Number(value) => Ok(Uuid::from_u128(u128::from(value))),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_list_id;
    use uuid::Uuid;

    #[test]
    fn accepts_uuid_and_timestamp_ids() {
        let id = Uuid::new_v4();
        assert_eq!(parse_list_id(&id.to_string()), Some(id));
        assert_eq!(
            parse_list_id("1718000000000"),
            Some(Uuid::from_u128(1_718_000_000_000))
        );
        assert_eq!(parse_list_id(" 42 "), Some(Uuid::from_u128(42)));
    }

    #[test]
    fn rejects_other_text() {
        assert_eq!(parse_list_id(""), None);
        assert_eq!(parse_list_id("+42"), None);
        assert_eq!(parse_list_id("task-1"), None);
    }
}
