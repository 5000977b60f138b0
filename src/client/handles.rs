// src/client/handles.rs

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{ContainerProperties, DocumentClient, FeedPager, ThroughputProperties};
use crate::error::{GSError, Result};

/// Handle on a database. Creating one does not touch the service.
#[derive(Debug)]
pub struct DatabaseHandle<'a, C> {
    client: &'a C,
    id: String,
}

impl<'a, C: DocumentClient> DatabaseHandle<'a, C> {
    pub(crate) fn new(client: &'a C, id: &str) -> Self {
        Self {
            client,
            id: id.to_string(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Creates the container with a single-path hash partition key unless it
    /// already exists.
    pub async fn create_container_if_not_exists(
        &self,
        id: &str,
        partition_key_path: &str,
        throughput: ThroughputProperties,
    ) -> Result<ContainerProperties> {
        let properties = ContainerProperties::new(id, partition_key_path);
        self.client
            .create_container_if_not_exists(&self.id, &properties, Some(throughput))
            .await
    }

    /// Handle on a container of this database.
    pub fn container(&self, id: &str) -> ContainerHandle<'a, C> {
        ContainerHandle {
            client: self.client,
            database: self.id.clone(),
            id: id.to_string(),
        }
    }

    /// Lazily paged query over this database's containers.
    pub fn query_containers(&self, query: &str) -> Result<FeedPager<'a, ContainerProperties>> {
        let client: &'a C = self.client;
        client.query_containers(&self.id, query)
    }

    /// Deletes the database.
    pub async fn delete(&self) -> Result<()> {
        self.client.delete_database(&self.id).await
    }
}

/// Handle on a container. Creating one does not touch the service.
#[derive(Debug)]
pub struct ContainerHandle<'a, C> {
    client: &'a C,
    database: String,
    id: String,
}

impl<'a, C: DocumentClient> ContainerHandle<'a, C> {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Serializes and inserts a document.
    pub async fn create_item<T: Serialize>(&self, item: &T) -> Result<()> {
        let document = serde_json::to_value(item)?;
        if !document.is_object() {
            return Err(GSError::invalid_input("documents must serialize to a JSON object"));
        }
        self.client
            .create_item(&self.database, &self.id, document)
            .await?;
        Ok(())
    }

    /// Lazily paged query over this container's documents, deserialized as `T`.
    pub fn query_items<T>(&self, query: &str) -> Result<FeedPager<'a, T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client: &'a C = self.client;
        client.query_items(&self.database, &self.id, query)
    }
}
