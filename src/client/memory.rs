// src/client/memory.rs

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use strum::Display;

use super::{
    ContainerProperties, DatabaseProperties, DocumentClient, FeedPage, FeedPager, ThroughputProperties,
};
use crate::error::{GSError, Result};

/// Default number of results per page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Kinds of client operation, used to count calls and inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Operation {
    CreateDatabase,
    CreateContainer,
    CreateItem,
    QueryContainers,
    QueryItems,
    DeleteDatabase,
}

/// One recorded call against a [`MemoryClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCall {
    CreateDatabase {
        id: String,
    },
    CreateContainer {
        database: String,
        id: String,
        partition_key_path: Option<String>,
        throughput: Option<ThroughputProperties>,
    },
    CreateItem {
        database: String,
        container: String,
        id: Option<String>,
    },
    QueryContainers {
        database: String,
        query: String,
        continuation: Option<String>,
    },
    QueryItems {
        database: String,
        container: String,
        query: String,
        continuation: Option<String>,
    },
    DeleteDatabase {
        id: String,
    },
}

impl ClientCall {
    pub fn operation(&self) -> Operation {
        match self {
            ClientCall::CreateDatabase { .. } => Operation::CreateDatabase,
            ClientCall::CreateContainer { .. } => Operation::CreateContainer,
            ClientCall::CreateItem { .. } => Operation::CreateItem,
            ClientCall::QueryContainers { .. } => Operation::QueryContainers,
            ClientCall::QueryItems { .. } => Operation::QueryItems,
            ClientCall::DeleteDatabase { .. } => Operation::DeleteDatabase,
        }
    }

    /// True for the first page request of a query, or any non-query call.
    pub fn starts_request(&self) -> bool {
        match self {
            ClientCall::QueryContainers { continuation, .. }
            | ClientCall::QueryItems { continuation, .. } => continuation.is_none(),
            _ => true,
        }
    }
}

#[derive(Debug, Clone)]
struct MemoryContainer {
    properties: ContainerProperties,
    throughput: Option<ThroughputProperties>,
    items: Vec<Value>,
}

/// An in-process document database.
///
/// Databases live in a `DashMap`; containers and their documents keep
/// insertion order, which is also the order queries return them in. Query
/// text is recorded but not evaluated: a container query returns every
/// container of the database and an item query every document of the
/// container.
///
/// Every call, and every page fetch of a query, is appended to a log before
/// it runs, so tests can assert on exactly what was attempted. `fail_on` makes every call of one operation
/// kind fail with [`GSError::Simulated`].
#[derive(Debug, Clone)]
pub struct MemoryClient {
    databases: Arc<DashMap<String, Vec<MemoryContainer>>>,
    calls: Arc<Mutex<Vec<ClientCall>>>,
    fail_on: Arc<Mutex<Option<Operation>>>,
    page_size: usize,
}

impl MemoryClient {
    /// Creates a new, empty `MemoryClient`.
    pub fn new() -> Self {
        Self {
            databases: Arc::new(DashMap::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_on: Arc::new(Mutex::new(None)),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Caps every page at `page_size` results (minimum 1).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Makes every subsequent call of `operation` fail.
    pub fn fail_on(&self, operation: Operation) {
        *self.fail_on.lock() = Some(operation);
    }

    /// Clears any previously set failure.
    pub fn clear_failure(&self) {
        *self.fail_on.lock() = None;
    }

    /// Snapshot of every call made so far.
    pub fn calls(&self) -> Vec<ClientCall> {
        self.calls.lock().clone()
    }

    /// Number of requests of one kind; follow-up page fetches are not counted.
    pub fn request_count(&self, operation: Operation) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.operation() == operation && call.starts_request())
            .count()
    }

    /// Total number of calls, page fetches included.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn database_exists(&self, id: &str) -> bool {
        self.databases.contains_key(id)
    }

    /// Documents stored in a container, in insertion order.
    pub fn items(&self, database: &str, container: &str) -> Option<Vec<Value>> {
        let db = self.databases.get(database)?;
        db.iter()
            .find(|c| c.properties.id == container)
            .map(|c| c.items.clone())
    }

    /// Throughput a container was created with.
    pub fn throughput(&self, database: &str, container: &str) -> Option<ThroughputProperties> {
        let db = self.databases.get(database)?;
        db.iter()
            .find(|c| c.properties.id == container)
            .and_then(|c| c.throughput)
    }

    fn record(&self, call: ClientCall) -> Result<()> {
        let operation = call.operation();
        log::trace!("MemoryClient call: {:?}", call);
        self.calls.lock().push(call);
        if *self.fail_on.lock() == Some(operation) {
            return Err(GSError::Simulated(format!("{} failed", operation)));
        }
        Ok(())
    }

    /// One page of a container query; recorded as one call.
    fn container_page(
        &self,
        database: &str,
        query: &str,
        continuation: Option<String>,
    ) -> Result<FeedPage<ContainerProperties>> {
        self.record(ClientCall::QueryContainers {
            database: database.to_string(),
            query: query.to_string(),
            continuation: continuation.clone(),
        })?;

        let db = self
            .databases
            .get(database)
            .ok_or_else(|| GSError::not_found(format!("dbs/{}", database)))?;
        let containers: Vec<ContainerProperties> = db.iter().map(|c| c.properties.clone()).collect();
        page_of(&containers, continuation.as_deref(), self.page_size)
    }

    /// One page of an item query; recorded as one call.
    fn item_page(
        &self,
        database: &str,
        container: &str,
        query: &str,
        continuation: Option<String>,
    ) -> Result<FeedPage<Value>> {
        self.record(ClientCall::QueryItems {
            database: database.to_string(),
            container: container.to_string(),
            query: query.to_string(),
            continuation: continuation.clone(),
        })?;

        let db = self
            .databases
            .get(database)
            .ok_or_else(|| GSError::not_found(format!("dbs/{}", database)))?;
        let target = db
            .iter()
            .find(|c| c.properties.id == container)
            .ok_or_else(|| GSError::not_found(format!("dbs/{}/colls/{}", database, container)))?;
        page_of(&target.items, continuation.as_deref(), self.page_size)
    }
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Slices one page out of `items`; the continuation token is the next offset.
fn page_of<T: Clone>(items: &[T], continuation: Option<&str>, page_size: usize) -> Result<FeedPage<T>> {
    let start = match continuation {
        Some(token) => token.parse::<usize>().map_err(|_| {
            GSError::invalid_input(format!("malformed continuation token '{}'", token))
        })?,
        None => 0,
    };
    let end = start.saturating_add(page_size).min(items.len());
    let page = items.get(start..end).unwrap_or(&[]).to_vec();
    let next = (end < items.len()).then(|| end.to_string());
    Ok(FeedPage::new(page, next))
}

#[async_trait]
impl DocumentClient for MemoryClient {
    async fn create_database_if_not_exists(&self, id: &str) -> Result<DatabaseProperties> {
        self.record(ClientCall::CreateDatabase { id: id.to_string() })?;
        self.databases.entry(id.to_string()).or_default();
        Ok(DatabaseProperties::new(id))
    }

    async fn create_container_if_not_exists(
        &self,
        database: &str,
        properties: &ContainerProperties,
        throughput: Option<ThroughputProperties>,
    ) -> Result<ContainerProperties> {
        self.record(ClientCall::CreateContainer {
            database: database.to_string(),
            id: properties.id.clone(),
            partition_key_path: properties.partition_key.path().map(str::to_string),
            throughput,
        })?;

        let mut db = self
            .databases
            .get_mut(database)
            .ok_or_else(|| GSError::not_found(format!("dbs/{}", database)))?;
        if let Some(existing) = db.iter().find(|c| c.properties.id == properties.id) {
            return Ok(existing.properties.clone());
        }
        db.push(MemoryContainer {
            properties: properties.clone(),
            throughput,
            items: Vec::new(),
        });
        Ok(properties.clone())
    }

    async fn create_item(&self, database: &str, container: &str, item: Value) -> Result<Value> {
        let id = item.get("id").and_then(Value::as_str).map(str::to_string);
        self.record(ClientCall::CreateItem {
            database: database.to_string(),
            container: container.to_string(),
            id: id.clone(),
        })?;

        let id = id.ok_or_else(|| GSError::invalid_input("document must have a string 'id'"))?;
        let mut db = self
            .databases
            .get_mut(database)
            .ok_or_else(|| GSError::not_found(format!("dbs/{}", database)))?;
        let target = db
            .iter_mut()
            .find(|c| c.properties.id == container)
            .ok_or_else(|| GSError::not_found(format!("dbs/{}/colls/{}", database, container)))?;

        let partition_key = target.properties.partition_key.extract(&item)?;
        let duplicate = target.items.iter().any(|existing| {
            existing.get("id").and_then(Value::as_str) == Some(id.as_str())
                && target.properties.partition_key.extract(existing).ok().as_ref() == Some(&partition_key)
        });
        if duplicate {
            return Err(GSError::conflict(format!(
                "document '{}' already exists in dbs/{}/colls/{}",
                id, database, container
            )));
        }

        target.items.push(item.clone());
        Ok(item)
    }

    fn query_containers(&self, database: &str, query: &str) -> Result<FeedPager<'_, ContainerProperties>> {
        let client = self.clone();
        let database = database.to_string();
        let query = query.to_string();
        Ok(FeedPager::new(move |continuation| {
            let page = client.container_page(&database, &query, continuation);
            async move { page }
        }))
    }

    fn query_items<T>(&self, database: &str, container: &str, query: &str) -> Result<FeedPager<'_, T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = self.clone();
        let database = database.to_string();
        let container = container.to_string();
        let query = query.to_string();
        Ok(FeedPager::new(move |continuation| {
            let page = client
                .item_page(&database, &container, &query, continuation)
                .and_then(|page| page.try_map(|value| serde_json::from_value(value).map_err(GSError::from)));
            async move { page }
        }))
    }

    async fn delete_database(&self, id: &str) -> Result<()> {
        self.record(ClientCall::DeleteDatabase { id: id.to_string() })?;
        self.databases
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| GSError::not_found(format!("dbs/{}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_of_boundaries() {
        let items = vec![1, 2, 3];
        let first = page_of(&items, None, 2).unwrap();
        assert_eq!(first.items, vec![1, 2]);
        assert_eq!(first.continuation.as_deref(), Some("2"));

        let second = page_of(&items, first.continuation.as_deref(), 2).unwrap();
        assert_eq!(second.items, vec![3]);
        assert!(second.is_last());

        let past_end = page_of(&items, Some("10"), 2).unwrap();
        assert!(past_end.items.is_empty());
        assert!(past_end.is_last());

        assert!(page_of(&items, Some("abc"), 2).is_err());
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(Operation::CreateContainer.to_string(), "create-container");
        assert_eq!(Operation::DeleteDatabase.to_string(), "delete-database");
    }
}
