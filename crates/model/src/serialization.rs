//! Canonical JSON for artifacts.
//!
//! `serde_json` maps are ordered by key, so routing a value through
//! [`serde_json::Value`] sorts every object. Output uses a two-space indent
//! so the same model always produces the same bytes and the same hash.

use serde::ser::Error as _;
use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Serializer};

/// Serialize a value into canonical JSON bytes
pub fn canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let sorted = serde_json::to_value(value)?;
    let mut buffer = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"  "));
    sorted.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Serialize a value into a canonical JSON string
pub fn canonical_json_string<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let bytes = canonical_json_bytes(value)?;
    String::from_utf8(bytes).map_err(serde_json::Error::custom)
}
