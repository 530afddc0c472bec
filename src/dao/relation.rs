//! Normalisation of embedded relations returned by the hosted store.
//!
//! Depending on how a foreign key is declared, an embedded record comes back
//! either as a single object or as a one-element array (or `null`). Rows are
//! decoded through [`single`] so that the rest of the crate only ever sees an
//! `Option<T>`.

use serde::{Deserialize, Deserializer};
use serde_with::{As, OneOrMany, Same, formats::PreferOne};

/// Deserialize an object, an array or `null` into at most one value.
pub fn single<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let many: Option<Vec<T>> =
        As::<Option<OneOrMany<Same, PreferOne>>>::deserialize(deserializer)?;
    Ok(many.and_then(|items| items.into_iter().next()))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Player {
        name: String,
    }

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "super::single")]
        player: Option<Player>,
    }

    fn decode(value: serde_json::Value) -> Option<Player> {
        serde_json::from_value::<Row>(value).unwrap().player
    }

    #[test]
    fn accepts_a_single_object() {
        assert_eq!(
            decode(json!({ "player": { "name": "Ana" } })),
            Some(Player { name: "Ana".into() })
        );
    }

    #[test]
    fn accepts_a_one_element_array() {
        assert_eq!(
            decode(json!({ "player": [{ "name": "Ana" }] })),
            Some(Player { name: "Ana".into() })
        );
    }

    #[test]
    fn null_empty_or_missing_is_none() {
        assert_eq!(decode(json!({ "player": null })), None);
        assert_eq!(decode(json!({ "player": [] })), None);
        assert_eq!(decode(json!({})), None);
    }
}
