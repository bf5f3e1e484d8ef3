//! An in-process database for local runs and tests.
//!
//! Evaluates [`Expr`]s against collections held in memory. Each query runs
//! as a transaction: it sees a private copy of the store, which replaces the
//! shared one only if every step succeeded. Failures are reported the way a
//! remote database reports them, as HTTP errors with a full request trace.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docket_types::{NativeRef, NativeTime, WireValue};
use serde_json::json;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::database::{Database, DriverError, HttpFailure};
use crate::expr::Expr;
use crate::trace::RequestTrace;

type Documents = BTreeMap<String, WireValue>;

/// A document database living in memory.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    store: RwLock<Store>,
    read_only: bool,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with the given (empty) collections already created.
    pub fn with_collections<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Store {
            collections: names
                .into_iter()
                .map(|name| (name.into(), Documents::new()))
                .collect(),
            next_id: 0,
        };
        Self {
            store: RwLock::new(store),
            read_only: false,
        }
    }

    /// Rejects every write with `403 permission denied`, like a read-only key.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub async fn collection_names(&self) -> Vec<String> {
        self.store.read().await.collections.keys().cloned().collect()
    }

    /// Returns the `data` of every document in `collection`, keyed by id.
    pub async fn documents(&self, collection: &str) -> Option<Documents> {
        self.store.read().await.collections.get(collection).cloned()
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn query(&self, expr: Expr) -> Result<WireValue, DriverError> {
        let start = Utc::now();
        let mut store = self.store.write().await;
        let mut staged = store.clone();
        let mut eval = Evaluation {
            store: &mut staged,
            now: start,
            read_only: self.read_only,
        };

        match eval.eval(&expr) {
            Ok(value) => {
                *store = staged;
                debug!(query = %expr, "memory query committed");
                Ok(value)
            }
            Err(failure) => {
                info!(code = failure.code, description = %failure.description, "memory query rejected");
                Err(failure.into_driver_error(&expr, start))
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Store {
    collections: BTreeMap<String, Documents>,
    next_id: u64,
}

/// An error response, before it is wrapped with its trace.
struct Failure {
    status: u16,
    code: &'static str,
    description: String,
}

impl Failure {
    fn invalid_argument(description: impl Into<String>) -> Self {
        Self {
            status: 400,
            code: "invalid argument",
            description: description.into(),
        }
    }

    fn already_exists(description: impl Into<String>) -> Self {
        Self {
            status: 400,
            code: "instance already exists",
            description: description.into(),
        }
    }

    fn not_found(description: impl Into<String>) -> Self {
        Self {
            status: 404,
            code: "instance not found",
            description: description.into(),
        }
    }

    fn permission_denied() -> Self {
        Self {
            status: 403,
            code: "permission denied",
            description: "Insufficient privileges to perform the action.".into(),
        }
    }

    fn into_driver_error(self, expr: &Expr, start: DateTime<Utc>) -> DriverError {
        let response = json!({
            "errors": [{ "position": [], "code": self.code, "description": self.description }]
        });
        let trace = RequestTrace::json_exchange(
            "POST",
            "/",
            expr.to_json(),
            self.status,
            response,
            start,
            Utc::now(),
        );
        DriverError::from_status(HttpFailure::new(self.description, trace))
    }
}

struct Evaluation<'a> {
    store: &'a mut Store,
    now: DateTime<Utc>,
    read_only: bool,
}

impl Evaluation<'_> {
    fn eval(&mut self, expr: &Expr) -> Result<WireValue, Failure> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Object(members) => members
                .iter()
                .map(|(k, v)| Ok((k.clone(), self.eval(v)?)))
                .collect::<Result<BTreeMap<_, _>, Failure>>()
                .map(WireValue::Object),
            Expr::Collection(name) => Ok(WireValue::Ref(NativeRef::collection(name))),
            Expr::Exists(target) => {
                let target = self.eval_ref(target)?;
                Ok(WireValue::Bool(self.exists(&target)))
            }
            Expr::CreateCollection(name) => self.create_collection(name),
            Expr::Create { collection, params } => {
                let collection = self.eval_collection(collection)?;
                let params = self.eval(params)?;
                self.create(&collection, &params)
            }
            Expr::Do(steps) => {
                let mut last = WireValue::Null;
                for step in steps {
                    last = self.eval(step)?;
                }
                Ok(last)
            }
            Expr::Now => Ok(WireValue::Time(NativeTime::new(self.now))),
            Expr::Ref { collection, id } => {
                let collection = self.eval_collection(collection)?;
                Ok(WireValue::Ref(NativeRef::new(id, collection)))
            }
        }
    }

    fn eval_ref(&mut self, expr: &Expr) -> Result<NativeRef, Failure> {
        match self.eval(expr)? {
            WireValue::Ref(reference) => Ok(reference),
            other => Err(Failure::invalid_argument(format!(
                "Ref expected, {} provided.",
                other.kind()
            ))),
        }
    }

    fn eval_collection(&mut self, expr: &Expr) -> Result<NativeRef, Failure> {
        let reference = self.eval_ref(expr)?;
        if reference.is_collection() {
            Ok(reference)
        } else {
            Err(Failure::invalid_argument(format!(
                "Collection Ref expected, {reference} provided."
            )))
        }
    }

    fn exists(&self, reference: &NativeRef) -> bool {
        if reference.is_collection() {
            return self.store.collections.contains_key(reference.id());
        }
        reference
            .parent()
            .filter(|parent| parent.is_collection())
            .and_then(|parent| self.store.collections.get(parent.id()))
            .is_some_and(|documents| documents.contains_key(reference.id()))
    }

    fn create_collection(&mut self, name: &str) -> Result<WireValue, Failure> {
        if self.read_only {
            return Err(Failure::permission_denied());
        }
        if self.store.collections.contains_key(name) {
            return Err(Failure::already_exists(format!(
                "Collection {name:?} already exists."
            )));
        }
        self.store
            .collections
            .insert(name.to_string(), Documents::new());
        Ok(WireValue::object([
            ("ref", WireValue::Ref(NativeRef::collection(name))),
            ("ts", WireValue::Int(self.now.timestamp_micros())),
            ("history_days", WireValue::Int(30)),
            ("name", WireValue::from(name)),
        ]))
    }

    fn create(&mut self, collection: &NativeRef, params: &WireValue) -> Result<WireValue, Failure> {
        if self.read_only {
            return Err(Failure::permission_denied());
        }
        let data = match params.get("data") {
            None => WireValue::Object(BTreeMap::new()),
            Some(data @ WireValue::Object(_)) => data.clone(),
            Some(other) => {
                return Err(Failure::invalid_argument(format!(
                    "Object expected, {} provided.",
                    other.kind()
                )));
            }
        };

        self.store.next_id += 1;
        let id = self.store.next_id.to_string();
        let Some(documents) = self.store.collections.get_mut(collection.id()) else {
            return Err(Failure::not_found(format!(
                "Collection {:?} does not exist.",
                collection.id()
            )));
        };
        documents.insert(id.clone(), data.clone());

        Ok(WireValue::object([
            ("ref", WireValue::Ref(NativeRef::new(id, collection.clone()))),
            ("ts", WireValue::Int(self.now.timestamp_micros())),
            ("data", data),
        ]))
    }
}
