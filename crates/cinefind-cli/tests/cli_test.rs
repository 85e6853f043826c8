#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo_bin_cmd;
use predicates::prelude::predicate;

/// Environment variables that would leak the caller's setup into a test.
const ENV_VARS: &[&str] = &[
    "TMDB_API_TOKEN",
    "APPWRITE_ENDPOINT",
    "APPWRITE_PROJECT_ID",
    "APPWRITE_DATABASE_ID",
    "APPWRITE_COLLECTION_ID",
    "APPWRITE_API_KEY",
    "OTEL_EXPORTER_OTLP_ENDPOINT",
    "RUST_LOG",
];

/// Builds a command isolated from the caller's environment and config.
fn cinefind(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("cinefind");
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.arg("--dir").arg(dir);
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("cinefind");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("browse"))
        .stdout(predicate::str::contains("discover"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("trending"));
}

#[test]
fn test_search_help() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("cinefind");
    cmd.args(["search", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--query"));
}

#[test]
fn test_search_requires_query() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("cinefind");
    cmd.arg("search")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--query"));
}

#[test]
fn test_discover_without_token_fails() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    cinefind(dir.path())
        .arg("discover")
        .assert()
        .failure()
        .stderr(predicate::str::contains("TMDB_API_TOKEN"));
}

#[test]
fn test_trending_without_store_fails() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    cinefind(dir.path())
        .arg("trending")
        .assert()
        .failure()
        .stderr(predicate::str::contains("[store]"));
}

#[test]
fn test_config_path_uses_dir() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    cinefind(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    // Act
    cinefind(dir.path())
        .args(["config", "init"])
        .assert()
        .success();
    let second = cinefind(dir.path()).args(["config", "init"]).assert();

    // Assert
    assert!(path.exists());
    assert!(std::fs::read_to_string(&path).unwrap().contains("debounce_ms = 500"));
    second
        .failure()
        .stderr(predicate::str::contains("already exists"));
    cinefind(dir.path())
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_completions_bash() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("cinefind");
    cmd.args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cinefind"));
}

fn write_config(dir: &Path, server_uri: &str) {
    let config = format!(
        r#"[tmdb]
api_token = "test-token"
base_url = "{server_uri}/3/"

[store]
endpoint = "{server_uri}/v1"
project_id = "proj"
database_id = "cinefind"
collection_id = "metrics"
"#
    );
    std::fs::write(dir.join("config.toml"), config).unwrap();
}

#[tokio::test]
async fn test_search_lists_movies_and_records_count() {
    // Arrange
    let mock_server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::path("/3/search/movie"))
        .and(wiremock::matchers::query_param("query", "The Batman"))
        .and(wiremock::matchers::header("Authorization", "Bearer test-token"))
        .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(include_str!(
            "../../../fixtures/tmdb/search_movie_batman.json"
        )))
        .expect(1)
        .mount(&mock_server)
        .await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::path(
            "/v1/databases/cinefind/collections/metrics/documents/the-batman",
        ))
        .respond_with(wiremock::ResponseTemplate::new(404).set_body_string(
            r#"{"message":"Document not found","code":404,"type":"document_not_found"}"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .and(wiremock::matchers::path(
            "/v1/databases/cinefind/collections/metrics/documents",
        ))
        .and(wiremock::matchers::body_partial_json(serde_json::json!({
            "documentId": "the-batman",
            "data": { "searchTerm": "The Batman", "count": 1, "movie_id": 414_906 }
        })))
        .respond_with(wiremock::ResponseTemplate::new(201).set_body_string(include_str!(
            "../../../fixtures/appwrite/document_the_batman.json"
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &mock_server.uri());
    let mut cmd = cinefind(dir.path());
    cmd.args(["search", "--query", "The Batman"]);

    // Act
    let assert = tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .unwrap();

    // Assert
    assert
        .success()
        .stdout(predicate::str::contains("414906"))
        .stdout(predicate::str::contains("7.7"));
}

#[tokio::test]
async fn test_discover_empty_results_reports_no_movies() {
    // Arrange
    let mock_server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::path("/3/discover/movie"))
        .and(wiremock::matchers::query_param("sort_by", "popularity.desc"))
        .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(include_str!(
            "../../../fixtures/tmdb/search_movie_empty.json"
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &mock_server.uri());
    let mut cmd = cinefind(dir.path());
    cmd.arg("discover");

    // Act
    let assert = tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .unwrap();

    // Assert
    assert
        .success()
        .stdout(predicate::str::contains("No movies found."));
}
