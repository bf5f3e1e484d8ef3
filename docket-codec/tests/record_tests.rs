use chrono::{DateTime, Utc};
use docket_codec::{
    Codec, CodecError, DocumentCodec, FieldReader, FieldWriter, IntCodec, IsoDateCodec, Record,
    RecordCodec, StringCodec,
};
use docket_types::{DocRef, NativeRef, NativeTime, WireValue};
use pretty_assertions::assert_eq;
use serde_json::json;

#[derive(Debug, Clone, PartialEq)]
struct Album {
    title: String,
    released: DateTime<Utc>,
    tracks: i64,
}

impl Record for Album {
    const NAME: &'static str = "Album";
    const FIELDS: &'static [&'static str] = &["title", "released", "tracks"];

    fn read(fields: &mut FieldReader<'_>) -> Option<Self> {
        let title = fields.field("title", &StringCodec);
        let released = fields.field("released", &IsoDateCodec);
        let tracks = fields.field("tracks", &IntCodec);
        Some(Self {
            title: title?,
            released: released?,
            tracks: tracks?,
        })
    }

    fn write(&self, fields: &mut FieldWriter) {
        fields.field("title", &StringCodec, &self.title);
        fields.field("released", &IsoDateCodec, &self.released);
        fields.field("tracks", &IntCodec, &self.tracks);
    }
}

/// A record that tries to own the `owner` field itself.
#[derive(Debug)]
struct Squatter;

impl Record for Squatter {
    const NAME: &'static str = "Squatter";
    const FIELDS: &'static [&'static str] = &["name", "owner"];

    fn read(_: &mut FieldReader<'_>) -> Option<Self> {
        Some(Self)
    }

    fn write(&self, _: &mut FieldWriter) {}
}

fn album() -> Album {
    Album {
        title: "First".into(),
        released: "2020-04-13T19:51:19.487Z".parse().unwrap(),
        tracks: 12,
    }
}

fn created_at() -> DateTime<Utc> {
    "2021-01-01T00:00:00Z".parse().unwrap()
}

fn stored_album() -> WireValue {
    WireValue::object([
        ("ref", WireValue::Ref(NativeRef::document("albums", "264"))),
        ("ts", WireValue::Int(1_609_459_200_000_000)),
        (
            "data",
            WireValue::object([
                ("title", WireValue::from("First")),
                ("released", WireValue::from("2020-04-13T19:51:19.487Z")),
                ("tracks", WireValue::Int(12)),
                ("createdAt", WireValue::Time(NativeTime::new(created_at()))),
                ("owner", WireValue::Ref(NativeRef::document("users", "123"))),
            ]),
        ),
    ])
}

// ── RecordCodec ──────────────────────────────────────────────────

#[test]
fn record_decodes_json_input() {
    let input = WireValue::from(json!({
        "title": "First",
        "released": "2020-04-13T19:51:19.487Z",
        "tracks": 12
    }));
    assert_eq!(RecordCodec::<Album>::new().decode(&input).unwrap(), album());
}

#[test]
fn record_round_trip() {
    let codec = RecordCodec::<Album>::new();
    let encoded = codec.encode(&album());
    assert_eq!(codec.decode(&encoded).unwrap(), album());
    assert_eq!(codec.decode(&encoded.json_round_trip()).unwrap(), album());
}

#[test]
fn record_ignores_extra_fields() {
    let input = WireValue::from(json!({
        "title": "First",
        "released": "2020-04-13T19:51:19.487Z",
        "tracks": 12,
        "label": "indie"
    }));
    assert!(RecordCodec::<Album>::new().decode(&input).is_ok());
}

#[test]
fn record_reports_every_failing_field_in_order() {
    let input = WireValue::from(json!({ "released": "soon", "tracks": "twelve" }));
    let errors = RecordCodec::<Album>::new().decode(&input).unwrap_err();
    assert_eq!(errors.paths(), vec!["$.title", "$.released", "$.tracks"]);
    assert_eq!(errors.first().value, None);
}

#[test]
fn record_rejects_non_object() {
    let errors = RecordCodec::<Album>::new()
        .decode(&WireValue::Array(vec![]))
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().expected, "Album");
}

// ── DocumentCodec ────────────────────────────────────────────────

#[test]
fn document_decodes_native_result() {
    let codec = DocumentCodec::<Album>::new().unwrap();
    let document = codec.decode(&stored_album()).unwrap();

    assert_eq!(document.reference(), &DocRef::new("264", "albums"));
    assert_eq!(document.timestamp(), created_at());
    assert_eq!(document.data().fields(), &album());
    assert_eq!(document.data().title, "First");
    assert_eq!(document.data().created_at(), created_at());
    assert_eq!(document.data().owner(), &DocRef::new("123", "users"));
}

#[test]
fn document_decodes_json_result() {
    let codec = DocumentCodec::<Album>::new().unwrap();
    let native = codec.decode(&stored_album()).unwrap();
    let sent = codec.decode(&stored_album().json_round_trip()).unwrap();
    assert_eq!(sent, native);
}

#[test]
fn document_round_trip() {
    let codec = DocumentCodec::<Album>::new().unwrap();
    let document = codec.decode(&stored_album()).unwrap();
    assert_eq!(codec.encode(&document), stored_album());
}

#[test]
fn document_requires_owner() {
    let mut input = stored_album();
    if let WireValue::Object(fields) = &mut input {
        if let Some(WireValue::Object(data)) = fields.get_mut("data") {
            data.remove("owner");
        }
    }
    let errors = DocumentCodec::<Album>::new().unwrap().decode(&input).unwrap_err();
    assert_eq!(errors.paths(), vec!["$.data.owner"]);
    assert_eq!(errors.first().expected, "DocRef");
}

#[test]
fn document_collects_record_and_envelope_failures() {
    let input = WireValue::object([
        ("ref", WireValue::Ref(NativeRef::collections())),
        ("ts", WireValue::from("now")),
        (
            "data",
            WireValue::object([
                ("title", WireValue::Int(1)),
                ("released", WireValue::from("2020-04-13T19:51:19.487Z")),
                ("tracks", WireValue::Int(12)),
                ("createdAt", WireValue::from("2021-01-01T00:00:00Z")),
            ]),
        ),
    ]);
    let errors = DocumentCodec::<Album>::new().unwrap().decode(&input).unwrap_err();
    assert_eq!(
        errors.paths(),
        vec!["$.ref", "$.ts", "$.data.title", "$.data.createdAt", "$.data.owner"]
    );
}

#[test]
fn document_rejects_reserved_record_field() {
    let err = DocumentCodec::<Squatter>::new().err().unwrap();
    assert_eq!(
        err,
        CodecError::ReservedField {
            record: "Squatter",
            field: "owner"
        }
    );
}
