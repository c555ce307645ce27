//! Partial-update fields that distinguish "absent" from an explicit `null`.

use serde::{Deserialize, Deserializer};

/// `#[serde(default, deserialize_with = "nullable::deserialize")]` on an
/// `Option<Option<T>>`: absent gives `None`, `null` gives `Some(None)`.
pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "super::deserialize")]
        km: Option<Option<i64>>,
    }

    #[test]
    fn absent_null_and_value_are_distinct() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let cleared: Patch = serde_json::from_str(r#"{"km": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"km": 120000}"#).unwrap();
        assert_eq!(absent.km, None);
        assert_eq!(cleared.km, Some(None));
        assert_eq!(set.km, Some(Some(120000)));
    }
}
