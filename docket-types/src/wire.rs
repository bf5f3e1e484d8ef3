//! The wire value tree.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::refs::NativeRef;
use crate::timestamp::NativeTime;

/// Key of the JSON object that carries a serialized timestamp.
pub const TS_KEY: &str = "@ts";

/// Key of the JSON object that carries a serialized reference.
pub const REF_KEY: &str = "@ref";

/// A value as exchanged with the database.
///
/// `Time` and `Ref` only appear in values produced in-process by the driver.
/// Once a value has crossed a JSON boundary the same information shows up as
/// `Object`s keyed by [`TS_KEY`] and [`REF_KEY`].
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<WireValue>),
    Object(BTreeMap<String, WireValue>),
    Time(NativeTime),
    Ref(NativeRef),
}

impl WireValue {
    /// Builds an object from key/value pairs.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, WireValue)>,
    {
        Self::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Short name of the variant, used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Time(_) => "time",
            Self::Ref(_) => "ref",
        }
    }

    /// Returns true for the driver's in-process values.
    #[must_use]
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Time(_) | Self::Ref(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, WireValue>> {
        match self {
            Self::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Looks up a field of an object value.
    pub fn get(&self, key: &str) -> Option<&WireValue> {
        self.as_object().and_then(|fields| fields.get(key))
    }

    /// Renders the JSON-transmitted form.
    ///
    /// Native values become `{"@ts": ..}` and nested `{"@ref": ..}` objects.
    /// Non-finite floats have no JSON form and render as `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(n) => Value::from(*n),
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Self::String(s) => Value::String(s.clone()),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Self::Time(time) => {
                let mut wrapper = serde_json::Map::new();
                wrapper.insert(TS_KEY.into(), Value::String(time.to_iso()));
                Value::Object(wrapper)
            }
            Self::Ref(reference) => reference.to_json(),
        }
    }

    /// What this value looks like after being sent over the wire and parsed
    /// back: every native value is replaced by its JSON form.
    #[must_use]
    pub fn json_round_trip(&self) -> Self {
        Self::from(self.to_json())
    }
}

impl From<serde_json::Value> for WireValue {
    /// Converts parsed JSON without interpreting `@ts`/`@ref`; that is the
    /// codecs' job.
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(fields) => {
                Self::Object(fields.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<NativeTime> for WireValue {
    fn from(time: NativeTime) -> Self {
        Self::Time(time)
    }
}

impl From<NativeRef> for WireValue {
    fn from(reference: NativeRef) -> Self {
        Self::Ref(reference)
    }
}

impl From<String> for WireValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for WireValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<i64> for WireValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for WireValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl Serialize for WireValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WireValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

impl fmt::Display for WireValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Time(time) => write!(f, "Time({:?})", time.to_iso()),
            Self::Ref(reference) => write!(f, "{reference}"),
            other => write!(f, "{}", other.to_json()),
        }
    }
}
