// src/client/cosmos.rs

//! [`DocumentClient`] over the `azure_data_cosmos` SDK.
//!
//! The SDK owns authorization, request routing, session tokens and query
//! continuation. This adapter only turns its "create" calls into
//! "create if absent" (a conflict means the resource is already there),
//! remembers the partition key path of each container it set up so that
//! documents can be routed, and rewraps SDK pagers as [`FeedPager`]s.

use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use azure_core::credentials::Secret;
use azure_data_cosmos::models::{
    ContainerProperties as SdkContainerProperties, ThroughputProperties as SdkThroughputProperties,
};
use azure_data_cosmos::{CosmosClient, CreateContainerOptions, PartitionKey};
use dashmap::DashMap;
use futures::{Stream, TryStreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::{
    ContainerProperties, DatabaseProperties, DocumentClient, FeedPage, FeedPager, PartitionKeyDefinition,
    ThroughputProperties,
};
use crate::config::AccountConfig;
use crate::error::{GSError, Result};

/// Client for a real account.
pub struct AccountClient {
    client: CosmosClient,
    endpoint: Url,
    partition_keys: PartitionKeyPaths,
}

impl fmt::Debug for AccountClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("partition_keys", &self.partition_keys)
            .finish()
    }
}

impl AccountClient {
    /// Builds the SDK client with key authorization. No request is sent.
    ///
    /// # Errors
    ///
    /// Returns [`GSError::InvalidInput`] if the host is not an absolute
    /// `http(s)` URL, or the SDK's error if it rejects the account settings.
    pub fn new(account: &AccountConfig) -> Result<Self> {
        let endpoint = endpoint_url(account.host())?;
        let client = CosmosClient::with_key(endpoint.as_str(), Secret::new(account.key().to_string()), None)?;
        log::debug!("Document client for {}", endpoint);
        Ok(Self {
            client,
            endpoint,
            partition_keys: PartitionKeyPaths::default(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Parses and checks the account endpoint.
fn endpoint_url(host: &str) -> Result<Url> {
    let url = Url::parse(host)
        .map_err(|e| GSError::invalid_input(format!("account endpoint '{}' is not a URL: {}", host, e)))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(GSError::invalid_input(format!(
            "account endpoint '{}' must be an http or https URL",
            host
        )));
    }
    Ok(url)
}

/// Runs a create call, reporting `false` instead of failing when the resource
/// already exists.
async fn create_if_absent<F, T>(create: F) -> Result<bool>
where
    F: Future<Output = Result<T>>,
{
    match create.await {
        Ok(_) => Ok(true),
        Err(GSError::Conflict(_)) => Ok(false),
        Err(err) => Err(err),
    }
}

/// Partition key value for the SDK. Only string values are routed.
fn partition_key_value(value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| GSError::invalid_input(format!("partition key value {} is not a string", value)))
}

/// Converts SDK pages, keeping the continuation token for diagnostics.
fn convert_pages<S, T>(pages: S) -> impl Stream<Item = Result<FeedPage<T>>>
where
    S: Stream<Item = azure_core::Result<azure_data_cosmos::FeedPage<T>>>,
{
    pages.map_err(GSError::from).map_ok(|page| {
        let continuation = page.continuation().map(str::to_string);
        FeedPage::new(page.into_items(), continuation)
    })
}

/// Partition key paths of the containers set up through this client, keyed
/// by `dbs/{database}/colls/{container}`.
#[derive(Debug, Default)]
struct PartitionKeyPaths {
    paths: DashMap<String, String>,
}

impl PartitionKeyPaths {
    fn link(database: &str, container: &str) -> String {
        format!("dbs/{}/colls/{}", database, container)
    }

    fn remember(&self, database: &str, container: &str, path: &str) {
        self.paths.insert(Self::link(database, container), path.to_string());
    }

    fn definition(&self, database: &str, container: &str) -> Result<PartitionKeyDefinition> {
        let link = Self::link(database, container);
        self.paths
            .get(&link)
            .map(|path| PartitionKeyDefinition::new(path.value().clone()))
            .ok_or_else(|| {
                GSError::invalid_input(format!(
                    "partition key of {} is unknown; create the container through this client first",
                    link
                ))
            })
    }

    fn forget_database(&self, database: &str) {
        let prefix = format!("dbs/{}/", database);
        self.paths.retain(|link, _| !link.starts_with(&prefix));
    }
}

#[async_trait]
impl DocumentClient for AccountClient {
    async fn create_database_if_not_exists(&self, id: &str) -> Result<DatabaseProperties> {
        let created = create_if_absent(async { Ok::<_, GSError>(self.client.create_database(id, None).await?) }).await?;
        if !created {
            log::info!("Database {} already exists", id);
        }
        Ok(DatabaseProperties::new(id))
    }

    /// An existing container is assumed to use the requested partition key.
    async fn create_container_if_not_exists(
        &self,
        database: &str,
        properties: &ContainerProperties,
        throughput: Option<ThroughputProperties>,
    ) -> Result<ContainerProperties> {
        let path = properties
            .partition_key
            .path()
            .ok_or_else(|| GSError::invalid_input("container needs a partition key path"))?;

        let sdk_properties = SdkContainerProperties {
            id: properties.id.clone().into(),
            partition_key: path.into(),
            ..Default::default()
        };
        let mut options = CreateContainerOptions::default();
        if let Some(throughput) = throughput {
            let request_units = throughput
                .request_units()
                .try_into()
                .map_err(|e| GSError::invalid_input(format!("throughput out of range: {}", e)))?;
            options.throughput = Some(SdkThroughputProperties::manual(request_units));
        }

        let db = self.client.database_client(database);
        let created = create_if_absent(async {
            Ok::<_, GSError>(db.create_container(sdk_properties, Some(options)).await?)
        })
        .await?;
        if !created {
            log::info!("Container {} already exists in {}", properties.id, database);
        }

        self.partition_keys.remember(database, &properties.id, path);
        Ok(properties.clone())
    }

    async fn create_item(&self, database: &str, container: &str, item: Value) -> Result<Value> {
        let definition = self.partition_keys.definition(database, container)?;
        let partition_key = partition_key_value(&definition.extract(&item)?)?;

        self.client
            .database_client(database)
            .container_client(container)
            .create_item(PartitionKey::from(partition_key), &item, None)
            .await?;
        Ok(item)
    }

    fn query_containers(&self, database: &str, query: &str) -> Result<FeedPager<'_, ContainerProperties>> {
        let pager = self
            .client
            .database_client(database)
            .query_containers(query.to_string(), None)?;
        let pages = convert_pages(pager.into_pages()).map_ok(|page: FeedPage<SdkContainerProperties>| {
            FeedPage::new(
                page.items
                    .into_iter()
                    .map(|sdk| ContainerProperties {
                        id: sdk.id.to_string(),
                        partition_key: PartitionKeyDefinition::default(),
                        rid: None,
                        etag: None,
                    })
                    .collect(),
                page.continuation,
            )
        });
        Ok(FeedPager::from_pages(pages))
    }

    fn query_items<T>(&self, database: &str, container: &str, query: &str) -> Result<FeedPager<'_, T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let pager = self
            .client
            .database_client(database)
            .container_client(container)
            .query_items::<T>(query.to_string(), PartitionKey::EMPTY, None)?;
        Ok(FeedPager::from_pages(convert_pages(pager.into_pages())))
    }

    async fn delete_database(&self, id: &str) -> Result<()> {
        self.client.database_client(id).delete(None).await?;
        self.partition_keys.forget_database(id);
        Ok(())
    }
}
