//! Codecs between wire values and domain values.
//!
//! A [`Codec`] pairs a `decode` that validates an untrusted [`WireValue`] with
//! an `encode` that produces the driver's in-process form. Decoding accepts
//! both the in-process shape and the shape a value has after a JSON round
//! trip, so for every codec and every valid `x`:
//!
//! ```text
//! decode(encode(x)) == x
//! decode(json_round_trip(encode(x))) == x
//! ```
//!
//! Primitives cover the driver's scalar types. [`RecordCodec`] assembles them
//! into structs and [`DocumentCodec`] wraps a record in the persisted-document
//! envelope returned by create/read queries.
//!
//! [`WireValue`]: docket_types::WireValue

mod codec;
mod document;
mod error;
mod primitives;
mod record;

pub use codec::{Codec, DecodeResult};
pub use document::{
    Document, DocumentCodec, DocumentData, DocumentDataCodec, CREATED_AT, OWNER,
    RESERVED_FIELDS,
};
pub use error::{CodecError, CodecResult, Path, ValidationError, ValidationErrors};
pub use primitives::{
    BoolCodec, DocRefCodec, IntCodec, IsoDateCodec, StringCodec, TimestampAsIntegerCodec,
    TimestampCodec,
};
pub use record::{FieldReader, FieldWriter, Record, RecordCodec};
