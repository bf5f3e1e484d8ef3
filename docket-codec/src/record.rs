//! Struct codecs assembled from per-field codecs.

use docket_types::WireValue;
use std::collections::BTreeMap;
use std::marker::PhantomData;

use crate::codec::{Codec, DecodeResult};
use crate::error::{Path, ValidationError, ValidationErrors};

/// A struct that maps to a wire object field by field.
///
/// `read` pulls every field through a [`FieldReader`] and returns `Some`
/// only when all of them decoded. It should read all fields before
/// combining them so that every failing field gets reported:
///
/// ```
/// use chrono::{DateTime, Utc};
/// use docket_codec::{FieldReader, FieldWriter, IsoDateCodec, Record, StringCodec};
///
/// struct Release {
///     name: String,
///     date: DateTime<Utc>,
/// }
///
/// impl Record for Release {
///     const NAME: &'static str = "Release";
///     const FIELDS: &'static [&'static str] = &["name", "date"];
///
///     fn read(fields: &mut FieldReader<'_>) -> Option<Self> {
///         let name = fields.field("name", &StringCodec);
///         let date = fields.field("date", &IsoDateCodec);
///         Some(Self { name: name?, date: date? })
///     }
///
///     fn write(&self, fields: &mut FieldWriter) {
///         fields.field("name", &StringCodec, &self.name);
///         fields.field("date", &IsoDateCodec, &self.date);
///     }
/// }
/// ```
pub trait Record: Sized + Send + Sync {
    /// Name used in validation errors.
    const NAME: &'static str;

    /// Every wire field the record reads and writes.
    const FIELDS: &'static [&'static str];

    fn read(fields: &mut FieldReader<'_>) -> Option<Self>;

    fn write(&self, fields: &mut FieldWriter);
}

/// Decodes fields of one wire object, collecting every failure.
pub struct FieldReader<'a> {
    fields: &'a BTreeMap<String, WireValue>,
    path: &'a Path,
    errors: Vec<ValidationError>,
}

impl<'a> FieldReader<'a> {
    pub fn new(fields: &'a BTreeMap<String, WireValue>, path: &'a Path) -> Self {
        Self {
            fields,
            path,
            errors: Vec::new(),
        }
    }

    /// Decodes field `name` with `codec`. Returns `None` and records the
    /// failure if the field is absent or invalid.
    pub fn field<C: Codec>(&mut self, name: &str, codec: &C) -> Option<C::Domain> {
        let path = self.path.child(name);
        let Some(value) = self.fields.get(name) else {
            self.errors.push(ValidationError::missing(path, codec.name()));
            return None;
        };
        match codec.validate(value, &path) {
            Ok(decoded) => Some(decoded),
            Err(errors) => {
                self.errors.extend(errors);
                None
            }
        }
    }

    /// Finishes reading. Succeeds only if nothing was rejected.
    pub fn finish<T>(self, decoded: Option<T>) -> DecodeResult<T> {
        if let Some(errors) = ValidationErrors::from_vec(self.errors) {
            return Err(errors);
        }
        // A reader that returned `None` without a recorded failure skipped
        // its own checks.
        decoded.ok_or_else(|| {
            ValidationError::missing(self.path.clone(), "complete record")
                .with_reason("record reader produced no value")
                .into()
        })
    }
}

/// Encodes fields into a wire object.
#[derive(Debug, Default)]
pub struct FieldWriter {
    fields: BTreeMap<String, WireValue>,
}

impl FieldWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field<C: Codec>(&mut self, name: &str, codec: &C, value: &C::Domain) {
        self.fields.insert(name.to_string(), codec.encode(value));
    }

    pub fn into_fields(self) -> BTreeMap<String, WireValue> {
        self.fields
    }
}

/// The codec for a [`Record`] type.
pub struct RecordCodec<R> {
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> RecordCodec<R> {
    pub fn new() -> Self {
        Self {
            _record: PhantomData,
        }
    }

    /// Encodes a record to its field map, without the enclosing object.
    pub fn encode_fields(&self, value: &R) -> BTreeMap<String, WireValue> {
        let mut writer = FieldWriter::new();
        value.write(&mut writer);
        writer.into_fields()
    }
}

impl<R: Record> Default for RecordCodec<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for RecordCodec<R> {
    fn clone(&self) -> Self {
        Self {
            _record: PhantomData,
        }
    }
}

impl<R> std::fmt::Debug for RecordCodec<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordCodec")
            .field("record", &std::any::type_name::<R>())
            .finish()
    }
}

impl<R: Record> Codec for RecordCodec<R> {
    type Domain = R;

    fn name(&self) -> &str {
        R::NAME
    }

    fn validate(&self, input: &WireValue, path: &Path) -> DecodeResult<R> {
        let WireValue::Object(fields) = input else {
            return Err(self.reject(input, path));
        };
        let mut reader = FieldReader::new(fields, path);
        let record = R::read(&mut reader);
        reader.finish(record)
    }

    fn encode(&self, value: &R) -> WireValue {
        WireValue::Object(self.encode_fields(value))
    }
}
