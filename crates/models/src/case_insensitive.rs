use serde::de::{DeserializeOwned, Error};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Lowercase every object key, recursively.
pub(crate) fn fold_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_lowercase(), fold_keys(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(fold_keys).collect()),
        other => other,
    }
}

/// Decode `R` (whose fields are declared lowercase) from a JSON value with keys in any case.
pub(crate) fn deserialize_folded<'de, D, R>(deserializer: D) -> Result<R, D::Error>
where
    D: Deserializer<'de>,
    R: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    serde_json::from_value(fold_keys(value)).map_err(D::Error::custom)
}
