//! Document and collection references.
//!
//! A native reference is recursive: a document ref points at its collection
//! ref, which in turn points at the root `collections` ref. [`DocRef`] is the
//! flattened form the application works with.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::wire::REF_KEY;

/// Id of the root collection every user collection lives under.
pub const COLLECTIONS: &str = "collections";

/// A reference as produced by the database driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NativeRef {
    id: String,
    collection: Option<Box<NativeRef>>,
}

impl NativeRef {
    /// Creates a reference scoped under `collection`.
    pub fn new(id: impl Into<String>, collection: NativeRef) -> Self {
        Self {
            id: id.into(),
            collection: Some(Box::new(collection)),
        }
    }

    /// The root `collections` reference. It has no collection of its own.
    #[must_use]
    pub fn collections() -> Self {
        Self {
            id: COLLECTIONS.to_string(),
            collection: None,
        }
    }

    /// A reference to the user collection `name`.
    pub fn collection(name: impl Into<String>) -> Self {
        Self::new(name, Self::collections())
    }

    /// A reference to document `id` in collection `collection`.
    pub fn document(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::new(id, Self::collection(collection))
    }

    /// Returns the reference id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the collection this reference lives in, if any.
    pub fn parent(&self) -> Option<&NativeRef> {
        self.collection.as_deref()
    }

    /// Returns true if this is a reference to a user collection.
    pub fn is_collection(&self) -> bool {
        self.parent()
            .is_some_and(|parent| parent.id == COLLECTIONS && parent.collection.is_none())
    }

    /// Renders the nested `{"@ref": {..}}` JSON form.
    pub fn to_json(&self) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        body.insert("id".into(), serde_json::Value::String(self.id.clone()));
        if let Some(parent) = &self.collection {
            body.insert("collection".into(), parent.to_json());
        }
        let mut wrapper = serde_json::Map::new();
        wrapper.insert(REF_KEY.into(), serde_json::Value::Object(body));
        serde_json::Value::Object(wrapper)
    }
}

impl fmt::Display for NativeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.collection {
            Some(parent) => write!(f, "Ref({parent}, {:?})", self.id),
            None => write!(f, "Ref({:?})", self.id),
        }
    }
}

/// A document reference flattened to its id and collection name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocRef {
    pub id: String,
    pub collection: String,
}

impl DocRef {
    /// Creates a document reference.
    pub fn new(id: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            collection: collection.into(),
        }
    }

    /// Rebuilds the nested native reference.
    pub fn to_native(&self) -> NativeRef {
        NativeRef::document(&self.collection, &self.id)
    }
}

impl fmt::Display for DocRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}
