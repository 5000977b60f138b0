use cosmos_getstarted::client::memory::{ClientCall, MemoryClient, Operation};
use cosmos_getstarted::client::ThroughputProperties;
use cosmos_getstarted::config::{AccountConfig, Config};
use cosmos_getstarted::demo::{self, DemoOutcome, COMPLETION_MESSAGE};
use cosmos_getstarted::model::{andersen_family, wakefield_family};
use cosmos_getstarted::GSError;

const HOST: &str = "https://localhost:8081/";
const KEY: &str = "c2VjcmV0a2V5";

fn configured() -> Config {
    Config {
        account: AccountConfig::new(HOST, KEY),
        ..Config::default()
    }
}

fn lines(buffer: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(buffer).lines().map(str::to_string).collect()
}

/// Runs `launch` against a clone of `client`, returning outcome, stdout and stderr.
async fn launch_with(config: &Config, client: &MemoryClient) -> (DemoOutcome, Vec<String>, Vec<String>) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let stub = client.clone();
    let outcome = demo::launch(config, move |_| Ok::<_, GSError>(stub), &mut out, &mut err).await;
    (outcome, lines(&out), lines(&err))
}

#[tokio::test]
async fn test_full_run_against_memory_client() {
    let client = MemoryClient::new();
    let (outcome, out, err) = launch_with(&configured(), &client).await;

    assert_eq!(outcome, DemoOutcome::Completed);
    assert!(err.is_empty());
    assert_eq!(
        out,
        vec![
            "SELECT * from c where c.id = 'FamilyCollection'".to_string(),
            "SELECT * from FamilyCollection".to_string(),
            andersen_family().to_string(),
            wakefield_family().to_string(),
            "FamilyCollection".to_string(),
            COMPLETION_MESSAGE.to_string(),
        ]
    );

    assert_eq!(client.request_count(Operation::CreateDatabase), 1);
    assert_eq!(client.request_count(Operation::CreateContainer), 1);
    assert_eq!(client.request_count(Operation::CreateItem), 2);
    assert_eq!(client.request_count(Operation::QueryContainers), 1);
    assert_eq!(client.request_count(Operation::QueryItems), 1);
    assert_eq!(client.request_count(Operation::DeleteDatabase), 1);
    assert!(!client.database_exists("FamilyDB"));
}

#[tokio::test]
async fn test_calls_are_made_in_order_with_expected_arguments() {
    let client = MemoryClient::new();
    launch_with(&configured(), &client).await;

    let calls = client.calls();
    assert_eq!(
        calls,
        vec![
            ClientCall::CreateDatabase { id: "FamilyDB".to_string() },
            ClientCall::CreateContainer {
                database: "FamilyDB".to_string(),
                id: "FamilyCollection".to_string(),
                partition_key_path: Some("/id".to_string()),
                throughput: Some(ThroughputProperties::Manual(400)),
            },
            ClientCall::CreateItem {
                database: "FamilyDB".to_string(),
                container: "FamilyCollection".to_string(),
                id: Some("Andersen.1".to_string()),
            },
            ClientCall::CreateItem {
                database: "FamilyDB".to_string(),
                container: "FamilyCollection".to_string(),
                id: Some("Wakefield.7".to_string()),
            },
            ClientCall::QueryContainers {
                database: "FamilyDB".to_string(),
                query: "SELECT * from c where c.id = 'FamilyCollection'".to_string(),
                continuation: None,
            },
            ClientCall::QueryItems {
                database: "FamilyDB".to_string(),
                container: "FamilyCollection".to_string(),
                query: "SELECT * from FamilyCollection".to_string(),
                continuation: None,
            },
            ClientCall::DeleteDatabase { id: "FamilyDB".to_string() },
        ]
    );
}

#[tokio::test]
async fn test_missing_host_makes_no_calls() {
    for host in ["", "   "] {
        let client = MemoryClient::new();
        let config = Config {
            account: AccountConfig::new(host, KEY),
            ..Config::default()
        };
        let (outcome, out, err) = launch_with(&config, &client).await;

        assert_eq!(outcome, DemoOutcome::NotConfigured);
        assert_eq!(err, vec!["ACCOUNT_HOST is not set".to_string()]);
        assert!(out.is_empty());
        assert_eq!(client.call_count(), 0);
    }
}

#[tokio::test]
async fn test_missing_key_makes_no_calls() {
    for key in ["", "\t"] {
        let client = MemoryClient::new();
        let config = Config {
            account: AccountConfig::new(HOST, key),
            ..Config::default()
        };
        let (outcome, out, err) = launch_with(&config, &client).await;

        assert_eq!(outcome, DemoOutcome::NotConfigured);
        assert_eq!(err, vec!["ACCOUNT_KEY is not set".to_string()]);
        assert!(out.is_empty());
        assert_eq!(client.call_count(), 0);
    }
}

#[tokio::test]
async fn test_missing_both_reports_host() {
    let client = MemoryClient::new();
    let (outcome, _, err) = launch_with(&Config::default(), &client).await;
    assert_eq!(outcome, DemoOutcome::NotConfigured);
    assert_eq!(err, vec!["ACCOUNT_HOST is not set".to_string()]);
}

#[tokio::test]
async fn test_missing_account_never_connects() {
    let mut connected = false;
    let mut out = Vec::new();
    let mut err = Vec::new();
    let outcome = demo::launch(
        &Config::default(),
        |_| {
            connected = true;
            Ok::<_, GSError>(MemoryClient::new())
        },
        &mut out,
        &mut err,
    )
    .await;

    assert_eq!(outcome, DemoOutcome::NotConfigured);
    assert!(!connected);
}

#[tokio::test]
async fn test_failure_at_each_step_stops_the_sequence() {
    let steps = [
        (Operation::CreateDatabase, 1),
        (Operation::CreateContainer, 2),
        (Operation::CreateItem, 3),
        (Operation::QueryContainers, 5),
        (Operation::QueryItems, 6),
        (Operation::DeleteDatabase, 7),
    ];

    for (operation, calls_made) in steps {
        let client = MemoryClient::new();
        client.fail_on(operation);
        let (outcome, out, err) = launch_with(&configured(), &client).await;

        assert_eq!(outcome, DemoOutcome::Failed, "failing {}", operation);
        assert!(err.is_empty());
        let failures: Vec<_> = out
            .iter()
            .filter(|line| line.starts_with("DocumentDB GetStarted failed with "))
            .collect();
        assert_eq!(failures.len(), 1, "failing {}", operation);
        assert_eq!(
            out.last().unwrap(),
            &format!("DocumentDB GetStarted failed with Simulated failure: {} failed", operation)
        );
        assert!(!out.iter().any(|line| line == COMPLETION_MESSAGE));
        assert_eq!(client.call_count(), calls_made, "failing {}", operation);
        assert_eq!(client.calls().last().unwrap().operation(), operation);
    }
}

#[tokio::test]
async fn test_small_pages_yield_every_document() {
    let client = MemoryClient::new().with_page_size(1);
    let (outcome, out, _) = launch_with(&configured(), &client).await;

    assert_eq!(outcome, DemoOutcome::Completed);
    assert_eq!(out[2], andersen_family().to_string());
    assert_eq!(out[3], wakefield_family().to_string());
    assert_eq!(out[4], "FamilyCollection");

    // Two documents at one per page: a first page plus one follow-up.
    assert_eq!(client.request_count(Operation::QueryItems), 1);
    let item_pages = client
        .calls()
        .iter()
        .filter(|call| call.operation() == Operation::QueryItems)
        .count();
    assert_eq!(item_pages, 2);
}

#[cfg(feature = "cosmos")]
#[tokio::test]
async fn test_malformed_host_is_reported_as_a_failed_run() {
    use cosmos_getstarted::client::AccountClient;

    let config = Config {
        account: AccountConfig::new("localhost:8081", KEY),
        ..Config::default()
    };
    let mut out = Vec::new();
    let mut err = Vec::new();
    let outcome = demo::launch(&config, AccountClient::new, &mut out, &mut err).await;

    assert_eq!(outcome, DemoOutcome::Failed);
    assert!(err.is_empty());
    assert_eq!(
        lines(&out),
        vec!["DocumentDB GetStarted failed with Invalid input: account endpoint 'localhost:8081' must be an http or https URL"]
    );
}

#[tokio::test]
async fn test_custom_names_flow_into_queries_and_calls() {
    let client = MemoryClient::new();
    let mut config = configured();
    config.database.name = "SchoolDB".to_string();
    config.database.container = "Households".to_string();
    config.database.throughput = 1000;
    let (outcome, out, _) = launch_with(&config, &client).await;

    assert_eq!(outcome, DemoOutcome::Completed);
    assert_eq!(out[0], "SELECT * from c where c.id = 'Households'");
    assert_eq!(out[1], "SELECT * from Households");
    assert_eq!(out[4], "Households");
    assert_matches::assert_matches!(
        client.calls()[1],
        ClientCall::CreateContainer { throughput: Some(ThroughputProperties::Manual(1000)), .. }
    );
}
