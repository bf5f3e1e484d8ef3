use chrono::{DateTime, Utc};
use docket_codec::{FieldReader, FieldWriter, IsoDateCodec, Record, StringCodec};
use docket_pipeline::{Pipeline, PipelineConfig, Stage};
use docket_query::mock::ScriptedDatabase;
use docket_query::{
    DriverError, Expr, HttpFailure, LocalErrorKind, MemoryDatabase, QueryError, RequestTrace,
    TransportErrorKind,
};
use docket_types::{DocRef, NativeRef, NativeTime, WireValue};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
struct Product {
    name: String,
    release: DateTime<Utc>,
}

impl Record for Product {
    const NAME: &'static str = "Product";
    const FIELDS: &'static [&'static str] = &["name", "release"];

    fn read(fields: &mut FieldReader<'_>) -> Option<Self> {
        let name = fields.field("name", &StringCodec);
        let release = fields.field("release", &IsoDateCodec);
        Some(Self {
            name: name?,
            release: release?,
        })
    }

    fn write(&self, fields: &mut FieldWriter) {
        fields.field("name", &StringCodec, &self.name);
        fields.field("release", &IsoDateCodec, &self.release);
    }
}

const RELEASE: &str = "2020-04-13T19:51:19.487Z";

fn release() -> DateTime<Utc> {
    RELEASE.parse().unwrap()
}

fn created_at() -> DateTime<Utc> {
    "2021-06-01T08:30:00.250Z".parse().unwrap()
}

fn input() -> WireValue {
    WireValue::object([
        ("name", WireValue::from("First")),
        ("release", WireValue::from(RELEASE)),
    ])
}

fn stored_data() -> WireValue {
    WireValue::object([
        ("name", WireValue::from("First")),
        ("release", WireValue::from(RELEASE)),
        ("createdAt", WireValue::Time(NativeTime::new(created_at()))),
        ("owner", WireValue::Ref(NativeRef::document("users", "123"))),
    ])
}

fn stored(data: WireValue) -> WireValue {
    WireValue::object([
        ("ref", WireValue::Ref(NativeRef::document("products", "1"))),
        ("ts", WireValue::Int(created_at().timestamp_micros())),
        ("data", data),
    ])
}

fn pipeline(db: Arc<ScriptedDatabase>) -> Pipeline<Arc<ScriptedDatabase>, Product> {
    Pipeline::new(db, PipelineConfig::default()).unwrap()
}

fn denied() -> DriverError {
    let trace = RequestTrace::json_exchange(
        "POST",
        "/",
        json!({ "create": { "collection": "products" } }),
        403,
        json!({ "errors": [{ "code": "permission denied" }] }),
        created_at(),
        created_at(),
    );
    DriverError::from_status(HttpFailure::new(
        "Insufficient privileges to perform the action.",
        trace,
    ))
}

// ── Decoding ─────────────────────────────────────────────────────

#[tokio::test]
async fn malformed_input_never_reaches_database() {
    let db = Arc::new(ScriptedDatabase::new());
    let pipeline = pipeline(db.clone());

    let bad = WireValue::object([("name", WireValue::Int(3))]);
    let error = pipeline.create_persisted_entity(&bad).await.unwrap_err();

    assert_eq!(error.name(), "invalidValue");
    assert!(error.message().contains("$.name"));
    assert!(error.message().contains("$.release"));
    assert_eq!(db.call_count(), 0);
}

#[tokio::test]
async fn non_object_input_is_invalid_value() {
    let db = Arc::new(ScriptedDatabase::new());
    let error = pipeline(db.clone())
        .create_persisted_entity(&WireValue::from("First"))
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        QueryError::Local {
            kind: LocalErrorKind::InvalidValue,
            ..
        }
    ));
    assert_eq!(db.call_count(), 0);
}

// ── Provisioning ─────────────────────────────────────────────────

#[tokio::test]
async fn existing_collection_skips_provisioning() {
    let db = Arc::new(ScriptedDatabase::new());
    db.push_ok(WireValue::Bool(true))
        .push_ok(stored(stored_data()));

    let document = pipeline(db.clone())
        .create_persisted_entity(&input())
        .await
        .unwrap();

    assert_eq!(document.data().name, "First");
    let queries = db.queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0], Expr::exists(Expr::collection("products")));
    assert!(matches!(queries[1], Expr::Create { .. }));
}

#[tokio::test]
async fn missing_collection_is_provisioned_before_write() {
    let db = Arc::new(ScriptedDatabase::new());
    db.push_ok(WireValue::Bool(false))
        .push_ok(WireValue::Null)
        .push_ok(stored(stored_data()));

    pipeline(db.clone())
        .create_persisted_entity(&input())
        .await
        .unwrap();

    let queries = db.queries();
    assert_eq!(queries.len(), 3);
    assert_eq!(
        queries[1],
        Expr::do_all([
            Expr::create_collection("products"),
            Expr::create_collection("users"),
        ])
    );
    assert!(matches!(queries[2], Expr::Create { .. }));
    assert_eq!(db.remaining(), 0);
}

#[tokio::test]
async fn non_boolean_existence_answer_is_invalid_value() {
    let db = Arc::new(ScriptedDatabase::new());
    db.push_ok(WireValue::from("yes"));

    let error = pipeline(db.clone())
        .create_persisted_entity(&input())
        .await
        .unwrap_err();

    assert_eq!(error.name(), "invalidValue");
    assert_eq!(db.call_count(), 1);
}

#[tokio::test]
async fn provisioning_failure_stops_before_write() {
    let db = Arc::new(ScriptedDatabase::new());
    db.push_ok(WireValue::Bool(false)).push_err(denied());

    let error = pipeline(db.clone())
        .create_persisted_entity(&input())
        .await
        .unwrap_err();

    assert_eq!(error.name(), "permissionDenied");
    assert_eq!(db.call_count(), 2);
}

// ── Writing ──────────────────────────────────────────────────────

#[tokio::test]
async fn write_carries_stamped_fields() {
    let db = Arc::new(ScriptedDatabase::new());
    db.push_ok(WireValue::Bool(true))
        .push_ok(stored(stored_data()));

    pipeline(db.clone())
        .create_persisted_entity(&input())
        .await
        .unwrap();

    assert_eq!(
        db.queries()[1].to_json(),
        json!({
            "create": { "collection": "products" },
            "params": { "object": { "data": { "object": {
                "name": "First",
                "release": RELEASE,
                "createdAt": { "now": null },
                "owner": { "ref": { "collection": "users" }, "id": "123" }
            } } } }
        })
    );
}

#[tokio::test]
async fn permission_denied_write_is_returned_unchanged() {
    let db = Arc::new(ScriptedDatabase::new());
    db.push_ok(WireValue::Bool(true)).push_err(denied());

    let error = pipeline(db.clone())
        .create_persisted_entity(&input())
        .await
        .unwrap_err();

    match &error {
        QueryError::Transport { kind, message, trace } => {
            assert_eq!(*kind, TransportErrorKind::PermissionDenied);
            assert_eq!(message, "Insufficient privileges to perform the action.");
            assert_eq!(trace.status_code, 403);
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

// ── Decoding the result ──────────────────────────────────────────

#[tokio::test]
async fn result_without_owner_is_invalid_value() {
    let mut data = stored_data();
    if let WireValue::Object(fields) = &mut data {
        fields.remove("owner");
    }
    let db = Arc::new(ScriptedDatabase::new());
    db.push_ok(WireValue::Bool(true)).push_ok(stored(data));

    let error = pipeline(db.clone())
        .create_persisted_entity(&input())
        .await
        .unwrap_err();

    assert_eq!(error.name(), "invalidValue");
    assert!(error.message().contains("$.data.owner"));
}

#[tokio::test]
async fn result_decodes_into_document() {
    let db = Arc::new(ScriptedDatabase::new());
    db.push_ok(WireValue::Bool(true))
        .push_ok(stored(stored_data()));

    let document = pipeline(db)
        .create_persisted_entity(&input())
        .await
        .unwrap();

    assert_eq!(document.reference(), &DocRef::new("1", "products"));
    assert_eq!(document.timestamp(), created_at());
    assert_eq!(document.data().created_at(), created_at());
    assert_eq!(document.data().owner(), &DocRef::new("123", "users"));
    assert_eq!(
        document.data().fields(),
        &Product {
            name: "First".into(),
            release: release(),
        }
    );
}

// ── Against the in-memory database ───────────────────────────────

#[tokio::test]
async fn creates_product_end_to_end() {
    let pipeline: Pipeline<MemoryDatabase, Product> =
        Pipeline::new(MemoryDatabase::new(), PipelineConfig::default()).unwrap();

    let document = pipeline.create_persisted_entity(&input()).await.unwrap();

    assert_eq!(document.data().name, "First");
    assert_eq!(document.data().release, release());
    assert_eq!(document.data().owner(), &DocRef::new("123", "users"));
    assert_eq!(document.reference().collection, "products");
    assert!(document.data().created_at() <= Utc::now());

    let names = pipeline.executor().database().collection_names().await;
    assert_eq!(names, vec!["products".to_string(), "users".to_string()]);
}

#[tokio::test]
async fn second_run_reuses_collections() {
    let pipeline: Pipeline<MemoryDatabase, Product> =
        Pipeline::new(MemoryDatabase::new(), PipelineConfig::default()).unwrap();

    let first = pipeline.create_persisted_entity(&input()).await.unwrap();
    let second = pipeline.create_persisted_entity(&input()).await.unwrap();

    assert_ne!(first.reference(), second.reference());
    let stored = pipeline
        .executor()
        .database()
        .documents("products")
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn read_only_database_denies_creation() {
    let db = MemoryDatabase::with_collections(["products", "users"]).read_only();
    let pipeline: Pipeline<MemoryDatabase, Product> =
        Pipeline::new(db, PipelineConfig::default()).unwrap();

    let error = pipeline.create_persisted_entity(&input()).await.unwrap_err();
    assert_eq!(error.name(), "permissionDenied");
}

#[test]
fn stage_names() {
    assert_eq!(Stage::CheckingExistence.to_string(), "checking_existence");
    assert_eq!(Stage::DecodingResult.to_string(), "decoding_result");
}
