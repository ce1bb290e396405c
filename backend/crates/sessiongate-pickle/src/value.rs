//! Decoded value tree.

use num_bigint::BigInt;

/// A value rebuilt from a pickle stream.
///
/// Lists, tuples and sets all decode to [`DecodedValue::Sequence`]. Mappings
/// keep insertion order and are stored as pairs, so keys of any variant
/// (floats included) are allowed. There is no variant for class
/// references or constructed objects.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    None,
    Bool(bool),
    Integer(BigInt),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Sequence(Vec<DecodedValue>),
    Mapping(Vec<(DecodedValue, DecodedValue)>),
}

impl DecodedValue {
    /// Variant name, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            DecodedValue::None => "none",
            DecodedValue::Bool(_) => "bool",
            DecodedValue::Integer(_) => "integer",
            DecodedValue::Float(_) => "float",
            DecodedValue::Text(_) => "text",
            DecodedValue::Bytes(_) => "bytes",
            DecodedValue::Sequence(_) => "sequence",
            DecodedValue::Mapping(_) => "mapping",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DecodedValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&[(DecodedValue, DecodedValue)]> {
        match self {
            DecodedValue::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a mapping entry by exact text key.
    ///
    /// Returns `None` when `self` is not a mapping or no text key matches.
    pub fn get(&self, key: &str) -> Option<&DecodedValue> {
        self.as_mapping()?
            .iter()
            .find(|(k, _)| k.as_text() == Some(key))
            .map(|(_, v)| v)
    }

    pub(crate) fn payload_len(&self) -> usize {
        match self {
            DecodedValue::Text(s) => s.len(),
            DecodedValue::Bytes(b) => b.len(),
            _ => 0,
        }
    }
}

impl From<&str> for DecodedValue {
    fn from(value: &str) -> Self {
        DecodedValue::Text(value.to_string())
    }
}

impl From<i64> for DecodedValue {
    fn from(value: i64) -> Self {
        DecodedValue::Integer(BigInt::from(value))
    }
}

impl From<bool> for DecodedValue {
    fn from(value: bool) -> Self {
        DecodedValue::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_matches_text_keys_only() {
        let mapping = DecodedValue::Mapping(vec![
            (DecodedValue::Bytes(b"user".to_vec()), "bytes-key".into()),
            ("user".into(), "text-key".into()),
        ]);
        assert_eq!(mapping.get("user"), Some(&DecodedValue::from("text-key")));
        assert_eq!(mapping.get("missing"), None);
        assert_eq!(DecodedValue::None.get("user"), None);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(DecodedValue::from(7i64).kind(), "integer");
        assert_eq!(DecodedValue::Sequence(vec![]).kind(), "sequence");
    }
}
