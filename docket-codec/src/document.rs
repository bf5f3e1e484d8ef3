//! The persisted-document envelope.
//!
//! Create and read queries return documents shaped like
//!
//! ```text
//! { ref: Ref, ts: <integer micros>, data: { ...record fields, createdAt: Time, owner: Ref } }
//! ```
//!
//! `data` is the intersection of the caller's record and the fields every
//! stored document carries. Both halves are validated and all failures
//! from either half are reported together.

use chrono::{DateTime, Utc};
use docket_types::{DocRef, WireValue};
use std::ops::Deref;
use tracing::debug;

use crate::codec::{Codec, DecodeResult};
use crate::error::{CodecError, CodecResult, Path};
use crate::primitives::{DocRefCodec, TimestampAsIntegerCodec, TimestampCodec};
use crate::record::{FieldReader, FieldWriter, Record, RecordCodec};

/// Server-assigned creation time field.
pub const CREATED_AT: &str = "createdAt";

/// Owning user reference field.
pub const OWNER: &str = "owner";

/// Fields every stored document carries in `data`. Records may not declare them.
pub const RESERVED_FIELDS: &[&str] = &[CREATED_AT, OWNER];

const REF: &str = "ref";
const TS: &str = "ts";
const DATA: &str = "data";

/// A record together with the fields the database stamps on every document.
///
/// Derefs to the record, so `data.name` reads the record's own field.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentData<D> {
    fields: D,
    created_at: DateTime<Utc>,
    owner: DocRef,
}

impl<D> DocumentData<D> {
    pub fn fields(&self) -> &D {
        &self.fields
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn owner(&self) -> &DocRef {
        &self.owner
    }

    pub fn into_fields(self) -> D {
        self.fields
    }
}

impl<D> Deref for DocumentData<D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.fields
    }
}

/// A stored document as returned by the database.
///
/// Only produced by decoding a query result with [`DocumentCodec`].
#[derive(Debug, Clone, PartialEq)]
pub struct Document<D> {
    reference: DocRef,
    timestamp: DateTime<Utc>,
    data: DocumentData<D>,
}

impl<D> Document<D> {
    /// Identity of the document.
    pub fn reference(&self) -> &DocRef {
        &self.reference
    }

    /// Revision timestamp.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn data(&self) -> &DocumentData<D> {
        &self.data
    }

    pub fn into_data(self) -> DocumentData<D> {
        self.data
    }
}

/// Codec for the `data` member: the record's fields plus `createdAt` and `owner`.
pub struct DocumentDataCodec<R> {
    record: RecordCodec<R>,
}

impl<R: Record> DocumentDataCodec<R> {
    /// Fails if the record declares one of [`RESERVED_FIELDS`].
    pub fn new() -> CodecResult<Self> {
        if let Some(field) = RESERVED_FIELDS
            .iter()
            .copied()
            .find(|reserved| R::FIELDS.contains(reserved))
        {
            return Err(CodecError::ReservedField {
                record: R::NAME,
                field,
            });
        }
        Ok(Self {
            record: RecordCodec::new(),
        })
    }
}

impl<R: Record> Codec for DocumentDataCodec<R> {
    type Domain = DocumentData<R>;

    fn name(&self) -> &str {
        R::NAME
    }

    fn validate(&self, input: &WireValue, path: &Path) -> DecodeResult<DocumentData<R>> {
        let WireValue::Object(fields) = input else {
            return Err(self.reject(input, path));
        };
        let mut reader = FieldReader::new(fields, path);
        let record = R::read(&mut reader);
        let created_at = reader.field(CREATED_AT, &TimestampCodec);
        let owner = reader.field(OWNER, &DocRefCodec);
        let data = match (record, created_at, owner) {
            (Some(fields), Some(created_at), Some(owner)) => Some(DocumentData {
                fields,
                created_at,
                owner,
            }),
            _ => None,
        };
        reader.finish(data)
    }

    fn encode(&self, value: &DocumentData<R>) -> WireValue {
        let mut fields = self.record.encode_fields(&value.fields);
        fields.insert(CREATED_AT.to_string(), TimestampCodec.encode(&value.created_at));
        fields.insert(OWNER.to_string(), DocRefCodec.encode(&value.owner));
        WireValue::Object(fields)
    }
}

/// Codec for a whole stored document `{ref, ts, data}`.
pub struct DocumentCodec<R> {
    data: DocumentDataCodec<R>,
}

impl<R: Record> DocumentCodec<R> {
    /// Fails if the record declares one of [`RESERVED_FIELDS`].
    pub fn new() -> CodecResult<Self> {
        let data = DocumentDataCodec::new()?;
        debug!(record = R::NAME, fields = ?R::FIELDS, "built document codec");
        Ok(Self { data })
    }
}

impl<R: Record> Codec for DocumentCodec<R> {
    type Domain = Document<R>;

    fn name(&self) -> &str {
        "Document"
    }

    fn validate(&self, input: &WireValue, path: &Path) -> DecodeResult<Document<R>> {
        let WireValue::Object(fields) = input else {
            return Err(self.reject(input, path));
        };
        let mut reader = FieldReader::new(fields, path);
        let reference = reader.field(REF, &DocRefCodec);
        let timestamp = reader.field(TS, &TimestampAsIntegerCodec);
        let data = reader.field(DATA, &self.data);
        let document = match (reference, timestamp, data) {
            (Some(reference), Some(timestamp), Some(data)) => Some(Document {
                reference,
                timestamp,
                data,
            }),
            _ => None,
        };
        reader.finish(document)
    }

    fn encode(&self, value: &Document<R>) -> WireValue {
        let mut writer = FieldWriter::new();
        writer.field(REF, &DocRefCodec, &value.reference);
        writer.field(TS, &TimestampAsIntegerCodec, &value.timestamp);
        writer.field(DATA, &self.data, &value.data);
        WireValue::Object(writer.into_fields())
    }
}
