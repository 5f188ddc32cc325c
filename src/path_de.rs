use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::value::Value;

/// Decode failure with the JSON path where it happened.
#[derive(Debug, Error)]
#[error("at JSON path {path} → {source}")]
pub struct PathError {
    pub path: String,
    #[source]
    pub source: serde_json::Error,
}

impl From<serde_path_to_error::Error<serde_json::Error>> for PathError {
    fn from(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = err.path().to_string();
        PathError { path, source: err.into_inner() }
    }
}

/// Deserialize with JSON-path context in error messages.
pub fn from_slice_with_path<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, PathError> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    Ok(serde_path_to_error::deserialize::<_, T>(de)?)
}

/// Parse a JSON document into an engine value, optionally narrowed to the
/// node at `pointer` (RFC 6901, e.g. `/render/options`).
pub fn read_value(bytes: &[u8], pointer: Option<&str>) -> Result<Option<Value>, PathError> {
    let json = from_slice_with_path::<serde_json::Value>(bytes)?;
    let selected = match pointer {
        None => Some(json),
        Some(p) => json.pointer(p).cloned(),
    };
    Ok(selected.map(Value::from))
}
