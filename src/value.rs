//! Typed option values for module parameter sets.
//!
//! The value model mirrors the host framework's parameter types: 32-bit
//! integers, doubles, booleans, strings, ordered string sequences, input-tag
//! references, and nested parameter sets. Fragment files carry values in
//! plain YAML; conversion goes through `serde_json::Value` so the same
//! mapping works for every self-describing format.

use crate::config::Pset;
use crate::error::{ConfigError, ConfigResult};
use serde::de::Error as _;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::fmt;

/// Reference to another module's output collection.
///
/// The empty tag stands for "default/unspecified" and is the placeholder
/// used when a consumer should fall back to framework defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputTag {
    pub module: String,
    pub label: String,
    pub process: String,
}

impl InputTag {
    /// Tag referencing a module's default output.
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            label: String::new(),
            process: String::new(),
        }
    }

    /// The "unspecified" placeholder tag.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.module.is_empty() && self.label.is_empty() && self.process.is_empty()
    }

    /// Parse the `module:label:process` encoding; trailing parts optional.
    pub fn parse(s: &str) -> Self {
        let mut parts = s.splitn(3, ':');
        Self {
            module: parts.next().unwrap_or("").to_string(),
            label: parts.next().unwrap_or("").to_string(),
            process: parts.next().unwrap_or("").to_string(),
        }
    }

    /// Encode as `module:label:process`, dropping trailing empty parts.
    pub fn encode(&self) -> String {
        if !self.process.is_empty() {
            format!("{}:{}:{}", self.module, self.label, self.process)
        } else if !self.label.is_empty() {
            format!("{}:{}", self.module, self.label)
        } else {
            self.module.clone()
        }
    }
}

impl fmt::Display for InputTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

/// A typed option value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int32(i32),
    Double(f64),
    Bool(bool),
    Str(String),
    /// Ordered string sequence. Overrides replace the whole sequence.
    Strings(Vec<String>),
    InputTag(InputTag),
    /// Nested embedded parameter set.
    Pset(Pset),
}

impl Value {
    /// Build a `Strings` value from anything iterable over string-likes.
    pub fn strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::Strings(items.into_iter().map(Into::into).collect())
    }

    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int32(_) => "int32",
            Value::Double(_) => "double",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Strings(_) => "vstring",
            Value::InputTag(_) => "input_tag",
            Value::Pset(_) => "pset",
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            Value::Int32(i) => Some(f64::from(*i)),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            Value::Strings(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_input_tag(&self) -> Option<&InputTag> {
        match self {
            Value::InputTag(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_pset(&self) -> Option<&Pset> {
        match self {
            Value::Pset(p) => Some(p),
            _ => None,
        }
    }

    /// Convert a plain JSON value into a typed option value.
    ///
    /// - null maps to the empty input-tag placeholder
    /// - integers fitting i32 map to `Int32`, other numbers to `Double`
    /// - arrays must contain only strings
    /// - objects map to nested psets
    pub fn from_json(option: &str, json: &JsonValue) -> ConfigResult<Self> {
        match json {
            JsonValue::Null => Ok(Value::InputTag(InputTag::empty())),
            JsonValue::Bool(b) => Ok(Value::Bool(*b)),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64().and_then(|i| i32::try_from(i).ok()) {
                    Ok(Value::Int32(i))
                } else if let Some(d) = n.as_f64() {
                    Ok(Value::Double(d))
                } else {
                    Err(ConfigError::invalid_value(option, "unrepresentable number"))
                }
            }
            JsonValue::String(s) => Ok(Value::Str(s.clone())),
            JsonValue::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        JsonValue::String(s) => out.push(s.clone()),
                        other => {
                            return Err(ConfigError::invalid_value(
                                option,
                                format!("sequence element is not a string: {}", other),
                            ));
                        }
                    }
                }
                Ok(Value::Strings(out))
            }
            JsonValue::Object(map) => {
                let mut pset = Pset::new();
                for (key, nested) in map {
                    pset.insert(key.clone(), Value::from_json(key, nested)?);
                }
                Ok(Value::Pset(pset))
            }
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<InputTag> for Value {
    fn from(v: InputTag) -> Self {
        Value::InputTag(v)
    }
}

impl From<Pset> for Value {
    fn from(v: Pset) -> Self {
        Value::Pset(v)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Int32(i) => serializer.serialize_i32(*i),
            Value::Double(d) => serializer.serialize_f64(*d),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Strings(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::InputTag(tag) => {
                if tag.is_empty() {
                    serializer.serialize_unit()
                } else {
                    serializer.serialize_str(&tag.encode())
                }
            }
            Value::Pset(pset) => pset.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = JsonValue::deserialize(deserializer)?;
        Value::from_json("value", &json).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(Value::from_json("a", &json!(1)).unwrap(), Value::Int32(1));
        assert_eq!(
            Value::from_json("a", &json!(1.5)).unwrap(),
            Value::Double(1.5)
        );
        assert_eq!(
            Value::from_json("a", &json!(true)).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            Value::from_json("a", &json!("TM")).unwrap(),
            Value::Str("TM".to_string())
        );
    }

    #[test]
    fn test_from_json_null_is_empty_tag() {
        let v = Value::from_json("vertexCollection", &JsonValue::Null).unwrap();
        assert_eq!(v, Value::InputTag(InputTag::empty()));
    }

    #[test]
    fn test_from_json_large_integer_widens_to_double() {
        let v = Value::from_json("a", &json!(1_i64 << 40)).unwrap();
        assert_eq!(v, Value::Double((1_i64 << 40) as f64));
    }

    #[test]
    fn test_from_json_string_sequence() {
        let v = Value::from_json("hwSources", &json!(["TM", "DDU"])).unwrap();
        assert_eq!(v, Value::strings(["TM", "DDU"]));
    }

    #[test]
    fn test_from_json_mixed_sequence_rejected() {
        let err = Value::from_json("hwSources", &json!(["TM", 2])).unwrap_err();
        assert_eq!(err.option.as_deref(), Some("hwSources"));
    }

    #[test]
    fn test_from_json_object_is_nested_pset() {
        let v = Value::from_json("regressionConfig", &json!({"isHLT": false})).unwrap();
        let pset = v.as_pset().unwrap();
        assert_eq!(pset.get("isHLT"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_serialize_round_trip_through_json() {
        let v = Value::strings(["TM", "DDU"]);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json, json!(["TM", "DDU"]));
        assert_eq!(serde_json::from_value::<Value>(json).unwrap(), v);
    }

    #[test]
    fn test_empty_tag_serializes_as_null() {
        let json = serde_json::to_value(Value::InputTag(InputTag::empty())).unwrap();
        assert_eq!(json, JsonValue::Null);
    }

    #[test]
    fn test_input_tag_encode_parse() {
        let tag = InputTag::new("hltVertices").with_label("sel");
        assert_eq!(tag.encode(), "hltVertices:sel");
        assert_eq!(InputTag::parse("hltVertices:sel"), tag);
        assert_eq!(InputTag::parse("a:b:HLT").process, "HLT");
    }
}
