//! Document database client seam
//!
//! The walkthrough never talks to the service directly; it goes through the
//! [`DocumentClient`] trait. Two implementations ship with the crate:
//!
//! - [`memory::MemoryClient`]: in-process, records every call, can simulate
//!   failures. Used by the tests.
//! - [`cosmos::AccountClient`] (feature `cosmos`): a thin adapter over the
//!   `azure_data_cosmos` SDK for a real account.
//!
//! Queries are paged. Both implementations hand back a lazy [`FeedPager`]
//! stream that requests one [`FeedPage`] at a time.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GSError, Result};

pub mod handles;
pub mod memory;
pub mod pager;
#[cfg(feature = "cosmos")]
pub mod cosmos;

pub use handles::{ContainerHandle, DatabaseHandle};
pub use memory::MemoryClient;
pub use pager::{FeedPage, FeedPager};
#[cfg(feature = "cosmos")]
pub use cosmos::AccountClient;

/// How a container distributes documents across physical partitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionKeyDefinition {
    /// JSON paths of the key, e.g. `/id`. Only single-path keys are used here.
    pub paths: Vec<String>,
    /// Partitioning scheme; always `Hash` for containers created by this crate.
    #[serde(default = "default_partition_kind")]
    pub kind: String,
    /// Hash version; 2 supports large key values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u8>,
}

fn default_partition_kind() -> String {
    "Hash".to_string()
}

impl Default for PartitionKeyDefinition {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            kind: default_partition_kind(),
            version: None,
        }
    }
}

impl PartitionKeyDefinition {
    /// A hash partition key on a single path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            paths: vec![path.into()],
            kind: default_partition_kind(),
            version: Some(2),
        }
    }

    /// The first (and for this crate, only) key path.
    pub fn path(&self) -> Option<&str> {
        self.paths.first().map(String::as_str)
    }

    /// Reads the partition key value out of a document.
    ///
    /// # Errors
    ///
    /// Returns [`GSError::InvalidInput`] if the definition has no path or the
    /// document has no value at that path.
    pub fn extract(&self, item: &Value) -> Result<Value> {
        let path = self
            .path()
            .ok_or_else(|| GSError::invalid_input("container has no partition key path"))?;

        let mut current = item;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = current.get(segment).ok_or_else(|| {
                GSError::invalid_input(format!("document has no value at partition key path {}", path))
            })?;
        }

        match current {
            Value::Object(_) | Value::Array(_) => Err(GSError::invalid_input(format!(
                "partition key at {} must be a string, number, boolean or null",
                path
            ))),
            value => Ok(value.clone()),
        }
    }
}

/// System view of a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseProperties {
    pub id: String,
    #[serde(rename = "_rid", default, skip_serializing_if = "Option::is_none")]
    pub rid: Option<String>,
    #[serde(rename = "_etag", default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl DatabaseProperties {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rid: None,
            etag: None,
        }
    }
}

/// System view of a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerProperties {
    pub id: String,
    #[serde(rename = "partitionKey", default)]
    pub partition_key: PartitionKeyDefinition,
    #[serde(rename = "_rid", default, skip_serializing_if = "Option::is_none")]
    pub rid: Option<String>,
    #[serde(rename = "_etag", default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl ContainerProperties {
    pub fn new(id: impl Into<String>, partition_key_path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            partition_key: PartitionKeyDefinition::new(partition_key_path),
            rid: None,
            etag: None,
        }
    }
}

/// Throughput provisioned when a container is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThroughputProperties {
    /// Fixed request units per second
    Manual(u32),
}

impl ThroughputProperties {
    pub fn manual(request_units: u32) -> Self {
        ThroughputProperties::Manual(request_units)
    }

    /// Provisioned request units per second.
    pub fn request_units(&self) -> u32 {
        match self {
            ThroughputProperties::Manual(request_units) => *request_units,
        }
    }
}

/// Operations the walkthrough needs from a document database.
///
/// Creates and deletes are single round trips. Queries return a lazy
/// [`FeedPager`]: nothing is sent until the first item is polled, and each
/// further page is requested only when the previous one is used up. The
/// `database` and `container` handle constructors do no I/O.
#[async_trait]
pub trait DocumentClient: Send + Sync {
    /// Creates the database, or returns the existing one with that id.
    async fn create_database_if_not_exists(&self, id: &str) -> Result<DatabaseProperties>;

    /// Creates the container, or returns the existing one with that id.
    /// `throughput` is only applied when the container is created.
    async fn create_container_if_not_exists(
        &self,
        database: &str,
        properties: &ContainerProperties,
        throughput: Option<ThroughputProperties>,
    ) -> Result<ContainerProperties>;

    /// Inserts a document and returns it as sent.
    async fn create_item(&self, database: &str, container: &str, item: Value) -> Result<Value>;

    /// Runs a query over the containers of a database.
    fn query_containers(&self, database: &str, query: &str) -> Result<FeedPager<'_, ContainerProperties>>;

    /// Runs a query over the documents of a container, across all of its
    /// partitions, deserializing each document as `T`.
    fn query_items<T>(&self, database: &str, container: &str, query: &str) -> Result<FeedPager<'_, T>>
    where
        T: DeserializeOwned + Send + 'static;

    /// Deletes a database and everything in it.
    async fn delete_database(&self, id: &str) -> Result<()>;

    /// Handle on a database by id.
    fn database(&self, id: &str) -> DatabaseHandle<'_, Self>
    where
        Self: Sized,
    {
        DatabaseHandle::new(self, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_top_level_key() {
        let pk = PartitionKeyDefinition::new("/id");
        let doc = json!({ "id": "Andersen.1", "lastName": "Andersen" });
        assert_eq!(pk.extract(&doc).unwrap(), json!("Andersen.1"));
    }

    #[test]
    fn test_extract_nested_key() {
        let pk = PartitionKeyDefinition::new("/address/state");
        let doc = json!({ "id": "x", "address": { "state": "WA" } });
        assert_eq!(pk.extract(&doc).unwrap(), json!("WA"));
    }

    #[test]
    fn test_extract_missing_or_composite_value_fails() {
        let pk = PartitionKeyDefinition::new("/address");
        assert!(pk.extract(&json!({ "id": "x" })).is_err());
        assert!(pk.extract(&json!({ "address": { "city": "NY" } })).is_err());
        assert!(PartitionKeyDefinition::default().extract(&json!({ "id": "x" })).is_err());
    }

    #[test]
    fn test_container_properties_wire_form() {
        let props = ContainerProperties::new("FamilyCollection", "/id");
        assert_eq!(
            serde_json::to_value(&props).unwrap(),
            json!({
                "id": "FamilyCollection",
                "partitionKey": { "paths": ["/id"], "kind": "Hash", "version": 2 }
            })
        );
    }

    #[test]
    fn test_container_properties_from_service_response() {
        let body = json!({
            "id": "FamilyCollection",
            "indexingPolicy": { "indexingMode": "consistent" },
            "partitionKey": { "paths": ["/id"], "kind": "Hash" },
            "_rid": "8f0mAK8hkGo=",
            "_etag": "\"00000d00-0000-0000-0000-000000000000\""
        });
        let props: ContainerProperties = serde_json::from_value(body).unwrap();
        assert_eq!(props.partition_key.path(), Some("/id"));
        assert_eq!(props.rid.as_deref(), Some("8f0mAK8hkGo="));
    }

    #[test]
    fn test_manual_throughput() {
        assert_eq!(ThroughputProperties::manual(400).request_units(), 400);
    }
}
