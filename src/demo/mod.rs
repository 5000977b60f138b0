//! The getting-started walkthrough.
//!
//! [`GetStartedDemo`] drives a fixed sequence against any [`DocumentClient`]:
//! create the database and container, insert the sample families, query the
//! database's containers and print every document in each, then delete the
//! database. Results go to the supplied writer; diagnostics go through `log`.
//!
//! [`launch`] wraps the sequence with account validation, client construction
//! and the single top-level failure report.

use std::io::Write;

use futures::TryStreamExt;

use crate::client::{DocumentClient, ThroughputProperties};
use crate::config::{AccountConfig, Config, DatabaseConfig};
use crate::error::Result;
use crate::model::{sample_families, Family};

/// Partition key path of the walkthrough container.
pub const PARTITION_KEY_PATH: &str = "/id";

/// Printed once the whole sequence has succeeded.
pub const COMPLETION_MESSAGE: &str = "Demo complete, please hold while resources are deleted";

/// Query selecting the walkthrough container from the database's containers.
pub fn container_query(container: &str) -> String {
    format!("SELECT * from c where c.id = '{}'", container)
}

/// Query selecting every document of a container.
///
/// Built from the configured container name and reused unchanged for every
/// container the container query returns.
pub fn item_query(container: &str) -> String {
    format!("SELECT * from {}", container)
}

/// How a [`launch`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoOutcome {
    /// Every step succeeded and the completion line was printed.
    Completed,
    /// A step failed; the failure line was printed.
    Failed,
    /// Account settings were missing; no client was constructed.
    NotConfigured,
}

/// The walkthrough sequence, bound to a client and database settings.
#[derive(Debug)]
pub struct GetStartedDemo<'a, C> {
    client: &'a C,
    settings: &'a DatabaseConfig,
}

impl<'a, C: DocumentClient> GetStartedDemo<'a, C> {
    pub fn new(client: &'a C, settings: &'a DatabaseConfig) -> Self {
        Self { client, settings }
    }

    /// Runs every step in order, stopping at the first error.
    ///
    /// Nothing created before a failure is cleaned up.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<()> {
        let settings = self.settings;

        log::info!("Creating database {}", settings.name);
        self.client.create_database_if_not_exists(&settings.name).await?;
        let database = self.client.database(&settings.name);

        log::info!(
            "Creating container {} ({} RU/s, partition key {})",
            settings.container,
            settings.throughput,
            PARTITION_KEY_PATH
        );
        database
            .create_container_if_not_exists(
                &settings.container,
                PARTITION_KEY_PATH,
                ThroughputProperties::manual(settings.throughput),
            )
            .await?;
        let container = database.container(&settings.container);

        for family in sample_families() {
            log::debug!("Inserting {}", family.id);
            container.create_item(&family).await?;
        }

        let container_sql = container_query(&settings.container);
        writeln!(out, "{}", container_sql)?;
        let item_sql = item_query(&settings.container);
        writeln!(out, "{}", item_sql)?;

        let mut containers = database.query_containers(&container_sql)?;
        while let Some(properties) = containers.try_next().await? {
            log::debug!("Reading documents of {}", properties.id);
            let mut items = database
                .container(&properties.id)
                .query_items::<Family>(&item_sql)?;
            while let Some(family) = items.try_next().await? {
                writeln!(out, "{}", family)?;
            }
            writeln!(out, "{}", properties.id)?;
        }
        log::debug!("Container query used {} page(s)", containers.pages_fetched());

        log::info!("Deleting database {}", settings.name);
        database.delete().await?;
        Ok(())
    }
}

/// Prints the completion line or the single failure line for a run.
pub fn report<W: Write>(result: &Result<()>, out: &mut W) -> DemoOutcome {
    let (line, outcome) = match result {
        Ok(()) => (COMPLETION_MESSAGE.to_string(), DemoOutcome::Completed),
        Err(err) => {
            log::error!("Walkthrough aborted: {}", err);
            (format!("DocumentDB GetStarted failed with {}", err), DemoOutcome::Failed)
        }
    };
    if let Err(err) = writeln!(out, "{}", line) {
        log::warn!("Could not write the final status line: {}", err);
    }
    outcome
}

/// Validates the account, connects and runs the walkthrough.
///
/// Missing account settings are written to `err` and nothing else happens.
/// Otherwise `connect` builds the client and the sequence runs against it;
/// a connection failure is reported the same way as a failed step.
pub async fn launch<C, F, W, E>(config: &Config, connect: F, out: &mut W, err: &mut E) -> DemoOutcome
where
    C: DocumentClient,
    F: FnOnce(&AccountConfig) -> Result<C>,
    W: Write,
    E: Write,
{
    if let Err(missing) = config.account.validate() {
        log::warn!("Account is not configured: {}", missing);
        if let Err(write_err) = writeln!(err, "{}", missing) {
            log::warn!("Could not write to stderr: {}", write_err);
        }
        return DemoOutcome::NotConfigured;
    }

    let result = match connect(&config.account) {
        Ok(client) => GetStartedDemo::new(&client, &config.database).run(out).await,
        Err(connect_err) => Err(connect_err),
    };
    report(&result, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::memory::{MemoryClient, Operation};
    use crate::error::GSError;

    fn output(buffer: Vec<u8>) -> Vec<String> {
        String::from_utf8(buffer)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_queries() {
        assert_eq!(
            container_query("FamilyCollection"),
            "SELECT * from c where c.id = 'FamilyCollection'"
        );
        assert_eq!(item_query("FamilyCollection"), "SELECT * from FamilyCollection");
    }

    #[test]
    fn test_report_lines() {
        let mut out = Vec::new();
        assert_eq!(report(&Ok(()), &mut out), DemoOutcome::Completed);
        let failed: Result<()> = Err(GSError::Simulated("create-item failed".to_string()));
        assert_eq!(report(&failed, &mut out), DemoOutcome::Failed);
        assert_eq!(
            output(out),
            vec![
                COMPLETION_MESSAGE.to_string(),
                "DocumentDB GetStarted failed with Simulated failure: create-item failed".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_run_prints_documents_then_container() {
        let client = MemoryClient::new();
        let settings = DatabaseConfig::default();
        let mut out = Vec::new();
        GetStartedDemo::new(&client, &settings).run(&mut out).await.unwrap();

        let lines = output(out);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "SELECT * from c where c.id = 'FamilyCollection'");
        assert_eq!(lines[1], "SELECT * from FamilyCollection");
        assert!(lines[2].contains("\"id\":\"Andersen.1\""));
        assert!(lines[3].contains("\"id\":\"Wakefield.7\""));
        assert_eq!(lines[4], "FamilyCollection");
        assert!(!client.database_exists("FamilyDB"));
    }

    #[tokio::test]
    async fn test_run_stops_at_first_error() {
        let client = MemoryClient::new();
        client.fail_on(Operation::CreateContainer);
        let settings = DatabaseConfig::default();
        let mut out = Vec::new();

        let err = GetStartedDemo::new(&client, &settings).run(&mut out).await.unwrap_err();
        assert!(matches!(err, GSError::Simulated(_)));
        assert!(out.is_empty());
        assert_eq!(client.call_count(), 2);
        assert!(client.database_exists("FamilyDB"));
    }

    #[tokio::test]
    async fn test_launch_connect_failure_is_reported() {
        let config = Config {
            account: AccountConfig::new("https://localhost:8081/", "c2VjcmV0a2V5"),
            ..Config::default()
        };
        let mut out = Vec::new();
        let mut err = Vec::new();
        let outcome = launch(
            &config,
            |_| -> Result<MemoryClient> { Err(GSError::Client("bad key".to_string())) },
            &mut out,
            &mut err,
        )
        .await;

        assert_eq!(outcome, DemoOutcome::Failed);
        assert_eq!(
            output(out),
            vec!["DocumentDB GetStarted failed with Client error: bad key".to_string()]
        );
        assert!(err.is_empty());
    }
}
