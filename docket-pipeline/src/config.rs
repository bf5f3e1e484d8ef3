use docket_types::DocRef;
use serde::{Deserialize, Serialize};

/// Where the pipeline writes and whom it stamps as owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Collection new documents are created in.
    pub collection: String,
    /// Collection the owner reference points into.
    pub owner_collection: String,
    /// Id of the owning document.
    pub owner_id: String,
}

impl PipelineConfig {
    /// The owner reference stamped on every document.
    pub fn owner(&self) -> DocRef {
        DocRef::new(&self.owner_id, &self.owner_collection)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            collection: "products".to_string(),
            owner_collection: "users".to_string(),
            owner_id: "123".to_string(),
        }
    }
}
