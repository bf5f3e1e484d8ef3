//! Codecs for the driver's scalar types.

use chrono::{DateTime, Utc};
use docket_types::{
    format_iso, parse_iso, DocRef, NativeTime, WireValue, COLLECTIONS, REF_KEY, TS_KEY,
};

use crate::codec::{Codec, DecodeResult};
use crate::error::{Path, ValidationError, ValidationErrors};

/// A driver timestamp: `Time` in-process, `{"@ts": "<RFC 3339>"}` over JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampCodec;

impl Codec for TimestampCodec {
    type Domain = DateTime<Utc>;

    fn name(&self) -> &str {
        "Timestamp"
    }

    fn validate(&self, input: &WireValue, path: &Path) -> DecodeResult<DateTime<Utc>> {
        match input {
            WireValue::Time(time) => Ok(time.date()),
            WireValue::Object(fields) => match fields.get(TS_KEY) {
                Some(serialized) => IsoDateCodec.validate(serialized, &path.child(TS_KEY)),
                None => Err(self.reject(input, path)),
            },
            _ => Err(self.reject(input, path)),
        }
    }

    fn encode(&self, value: &DateTime<Utc>) -> WireValue {
        WireValue::Time(NativeTime::new(*value))
    }
}

/// A document reference: a native `Ref` in-process, the triple-nested
/// `{"@ref": ..}` object over JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocRefCodec;

impl DocRefCodec {
    /// Unwraps one `{"@ref": {..}}` level, returning the body and its path.
    fn unwrap_ref<'a>(&self, value: &'a WireValue, path: &Path) -> DecodeResult<(&'a WireValue, Path)> {
        let body_path = path.child(REF_KEY);
        match value.get(REF_KEY) {
            Some(body @ WireValue::Object(_)) => Ok((body, body_path)),
            Some(other) => Err(ValidationError::new(body_path, "object", other).into()),
            None => Err(self.reject(value, path)),
        }
    }

    /// Returns the `collection` member of a ref body.
    fn parent<'a>(&self, body: &'a WireValue, path: &Path) -> DecodeResult<(&'a WireValue, Path)> {
        let parent_path = path.child("collection");
        match body.get("collection") {
            Some(parent) => self.unwrap_ref(parent, &parent_path),
            None => Err(ValidationError::missing(parent_path, self.name())
                .with_reason("reference has no collection")
                .into()),
        }
    }

    fn decode_serialized(&self, input: &WireValue, path: &Path) -> DecodeResult<DocRef> {
        let (document, document_path) = self.unwrap_ref(input, path)?;
        let id = string_member(document, &document_path, "id")?;

        let (collection, collection_path) = self.parent(document, &document_path)?;
        let collection_id = string_member(collection, &collection_path, "id")?;

        let (root, root_path) = self.parent(collection, &collection_path)?;
        let root_id = string_member(root, &root_path, "id")?;
        if root_id != COLLECTIONS {
            return Err(ValidationError::new(
                root_path.child("id"),
                format!("{COLLECTIONS:?}"),
                &WireValue::String(root_id),
            )
            .into());
        }

        Ok(DocRef::new(id, collection_id))
    }
}

impl Codec for DocRefCodec {
    type Domain = DocRef;

    fn name(&self) -> &str {
        "DocRef"
    }

    fn validate(&self, input: &WireValue, path: &Path) -> DecodeResult<DocRef> {
        match input {
            WireValue::Ref(reference) => match reference.parent() {
                Some(collection) => Ok(DocRef::new(reference.id(), collection.id())),
                None => Err(ValidationError::new(path.clone(), self.name(), input)
                    .with_reason("reference has no collection")
                    .into()),
            },
            WireValue::Object(_) => self.decode_serialized(input, path),
            _ => Err(self.reject(input, path)),
        }
    }

    fn encode(&self, value: &DocRef) -> WireValue {
        WireValue::Ref(value.to_native())
    }
}

/// A timestamp carried as integer microseconds since the Unix epoch, the
/// format of a document's `ts` field.
///
/// Microseconds are kept exactly in both directions. Sub-microsecond digits
/// of an encoded instant are truncated.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampAsIntegerCodec;

impl Codec for TimestampAsIntegerCodec {
    type Domain = DateTime<Utc>;

    fn name(&self) -> &str {
        "TimestampMicros"
    }

    fn validate(&self, input: &WireValue, path: &Path) -> DecodeResult<DateTime<Utc>> {
        let micros = integral(input).ok_or_else(|| {
            ValidationErrors::from(
                ValidationError::new(path.clone(), self.name(), input).with_reason("not an integer"),
            )
        })?;
        DateTime::from_timestamp_micros(micros).ok_or_else(|| {
            ValidationError::new(path.clone(), self.name(), input)
                .with_reason("outside the representable range")
                .into()
        })
    }

    fn encode(&self, value: &DateTime<Utc>) -> WireValue {
        WireValue::Int(value.timestamp_micros())
    }
}

/// A date carried as an RFC 3339 string.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsoDateCodec;

impl Codec for IsoDateCodec {
    type Domain = DateTime<Utc>;

    fn name(&self) -> &str {
        "DateFromISOString"
    }

    fn validate(&self, input: &WireValue, path: &Path) -> DecodeResult<DateTime<Utc>> {
        let WireValue::String(s) = input else {
            return Err(self.reject(input, path));
        };
        parse_iso(s).map_err(|e| {
            ValidationError::new(path.clone(), self.name(), input)
                .with_reason(e.to_string())
                .into()
        })
    }

    fn encode(&self, value: &DateTime<Utc>) -> WireValue {
        WireValue::String(format_iso(value))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringCodec;

impl Codec for StringCodec {
    type Domain = String;

    fn name(&self) -> &str {
        "string"
    }

    fn validate(&self, input: &WireValue, path: &Path) -> DecodeResult<String> {
        match input {
            WireValue::String(s) => Ok(s.clone()),
            _ => Err(self.reject(input, path)),
        }
    }

    fn encode(&self, value: &String) -> WireValue {
        WireValue::String(value.clone())
    }
}

/// A whole number. Integral floats such as `3.0` are accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntCodec;

impl Codec for IntCodec {
    type Domain = i64;

    fn name(&self) -> &str {
        "integer"
    }

    fn validate(&self, input: &WireValue, path: &Path) -> DecodeResult<i64> {
        integral(input).ok_or_else(|| self.reject(input, path))
    }

    fn encode(&self, value: &i64) -> WireValue {
        WireValue::Int(*value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoolCodec;

impl Codec for BoolCodec {
    type Domain = bool;

    fn name(&self) -> &str {
        "boolean"
    }

    fn validate(&self, input: &WireValue, path: &Path) -> DecodeResult<bool> {
        input.as_bool().ok_or_else(|| self.reject(input, path))
    }

    fn encode(&self, value: &bool) -> WireValue {
        WireValue::Bool(*value)
    }
}

/// Reads an integer, accepting floats with no fractional part.
fn integral(value: &WireValue) -> Option<i64> {
    match value {
        WireValue::Int(n) => Some(*n),
        WireValue::Float(f)
            if f.is_finite() && f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 =>
        {
            Some(*f as i64)
        }
        _ => None,
    }
}

fn string_member(body: &WireValue, path: &Path, key: &str) -> DecodeResult<String> {
    let member_path = path.child(key);
    match body.get(key) {
        Some(value) => StringCodec.validate(value, &member_path),
        None => Err(ValidationError::missing(member_path, StringCodec.name()).into()),
    }
}
