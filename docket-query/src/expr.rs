//! Query expressions.
//!
//! A small subset of the database's query language, enough to check for a
//! collection, create collections and create documents. Expressions are
//! values; nothing runs until a [`Database`](crate::Database) evaluates one.

use docket_types::WireValue;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A constant value.
    Literal(WireValue),
    /// An object whose members are themselves expressions.
    Object(BTreeMap<String, Expr>),
    /// Reference to the collection with the given name.
    Collection(String),
    /// Whether the referenced collection or document exists.
    Exists(Box<Expr>),
    /// Creates a collection with the given name.
    CreateCollection(String),
    /// Creates a document in `collection` from `params` (`{data: {..}}`).
    Create {
        collection: Box<Expr>,
        params: Box<Expr>,
    },
    /// Evaluates each expression in order, yielding the last result.
    Do(Vec<Expr>),
    /// The transaction's timestamp.
    Now,
    /// Reference to document `id` in `collection`.
    Ref { collection: Box<Expr>, id: String },
}

impl Expr {
    pub fn literal(value: impl Into<WireValue>) -> Self {
        Self::Literal(value.into())
    }

    pub fn object<K, I>(members: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Expr)>,
    {
        Self::Object(members.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn collection(name: impl Into<String>) -> Self {
        Self::Collection(name.into())
    }

    pub fn exists(target: Expr) -> Self {
        Self::Exists(Box::new(target))
    }

    pub fn create_collection(name: impl Into<String>) -> Self {
        Self::CreateCollection(name.into())
    }

    pub fn create(collection: Expr, params: Expr) -> Self {
        Self::Create {
            collection: Box::new(collection),
            params: Box::new(params),
        }
    }

    pub fn do_all(steps: impl IntoIterator<Item = Expr>) -> Self {
        Self::Do(steps.into_iter().collect())
    }

    pub fn reference(collection: Expr, id: impl Into<String>) -> Self {
        Self::Ref {
            collection: Box::new(collection),
            id: id.into(),
        }
    }

    /// Renders the expression as the JSON request body the database expects.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Literal(value) => literal_json(value),
            Self::Object(members) => json!({
                "object": members
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<serde_json::Map<_, _>>()
            }),
            Self::Collection(name) => json!({ "collection": name }),
            Self::Exists(target) => json!({ "exists": target.to_json() }),
            Self::CreateCollection(name) => {
                json!({ "create_collection": { "object": { "name": name } } })
            }
            Self::Create { collection, params } => json!({
                "create": collection.to_json(),
                "params": params.to_json(),
            }),
            Self::Do(steps) => json!({ "do": steps.iter().map(Self::to_json).collect::<Vec<_>>() }),
            Self::Now => json!({ "now": null }),
            Self::Ref { collection, id } => json!({ "ref": collection.to_json(), "id": id }),
        }
    }
}

/// Literal objects are wrapped so their keys are not read as query functions.
fn literal_json(value: &WireValue) -> Value {
    match value {
        WireValue::Object(fields) => json!({
            "object": fields
                .iter()
                .map(|(k, v)| (k.clone(), literal_json(v)))
                .collect::<serde_json::Map<_, _>>()
        }),
        WireValue::Array(items) => Value::Array(items.iter().map(literal_json).collect()),
        other => other.to_json(),
    }
}

impl From<WireValue> for Expr {
    fn from(value: WireValue) -> Self {
        Self::Literal(value)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
