// Record trait shared by every resource kind held in a RecordStore

use crate::error::Result;
use crate::models::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Core trait that any storable record must implement
pub trait Record: Serialize + for<'de> Deserialize<'de> + Clone + Send + Sync + 'static {
    /// Creation input: required fields plus optional overrides
    type Draft;

    /// Partial update input, every field optional
    type Patch: Default;

    /// Store-assigned identifier
    fn id(&self) -> u64;

    /// Timestamp of the last mutation
    fn updated_at(&self) -> Timestamp;

    /// Singular name used in errors and logs (e.g. "post")
    fn kind() -> &'static str
    where
        Self: Sized;

    /// Collection name (e.g. "posts"), also the seed file stem
    fn collection_name() -> &'static str
    where
        Self: Sized;

    /// Validate a draft and build the record with both timestamps set to `now`
    fn from_draft(id: u64, draft: Self::Draft, now: Timestamp) -> Result<Self>
    where
        Self: Sized;

    /// Overwrite only the fields present in `patch`
    fn apply_patch(&mut self, patch: Self::Patch);

    /// Set `updated_at`
    fn touch(&mut self, now: Timestamp);

    /// Field that must be unique across the collection at creation time
    fn unique_key(&self) -> Option<(&'static str, &str)> {
        None
    }

    /// Fields exposed to filtering
    /// Return empty HashMap if no fields should be filterable
    fn indexed_fields(&self) -> HashMap<String, IndexValue> {
        HashMap::new()
    }
}

/// Value types that can be filtered on
#[derive(Debug, Clone, PartialEq)]
pub enum IndexValue {
    String(String),
}

impl From<&str> for IndexValue {
    fn from(s: &str) -> Self {
        IndexValue::String(s.to_string())
    }
}
