//! Integration tests for the seeding orchestrator
//!
//! Each test runs a full seeding pass against a mockito server and checks
//! which requests were made, in what order, and what ended up in the
//! transcript.

use bbs_seed::api::{ApiError, BitbucketClient};
use bbs_seed::config::SeedConfig;
use bbs_seed::seed::{Phase, SeedError, SeedReport, Seeder};
use mockito::{Matcher, Mock, ServerGuard};
use reqwest::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

fn config_for(server: &ServerGuard, projects: i64, repos: i64) -> SeedConfig {
    config_for_url(server.url(), projects, repos)
}

fn config_for_url(url: String, projects: i64, repos: i64) -> SeedConfig {
    SeedConfig::from_lookup(
        |name| match name {
            "BBS_API_USER" => Some("u".to_string()),
            "BBS_API_PASS" => Some("p".to_string()),
            "BBS_API_URL" => Some(url.clone()),
            _ => None,
        },
        projects,
        repos,
    )
    .unwrap()
}

async fn seed(config: &SeedConfig) -> (Result<SeedReport, SeedError>, String) {
    let client = BitbucketClient::from_config(config).unwrap();
    let mut out = Vec::new();
    let result = Seeder::new(config, client).run(&mut out).await;
    (result, String::from_utf8(out).unwrap())
}

async fn healthy(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", "/status")
        .match_header("authorization", "Basic dTpw")
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_body(r#"{"state":"RUNNING"}"#)
        .expect(1)
        .create_async()
        .await
}

async fn project_mock(server: &mut ServerGuard, index: u64, status: usize, hits: usize) -> Mock {
    server
        .mock("POST", "/rest/api/latest/projects")
        .match_header("authorization", "Basic dTpw")
        .match_header("content-type", "application/json")
        .match_body(format!(r#"{{"key":"Project-project{index}","links":""}}"#).as_str())
        .with_status(status)
        .with_body(format!(r#"{{"id":{index},"key":"Project-project{index}"}}"#))
        .expect(hits)
        .create_async()
        .await
}

async fn repos_mock(server: &mut ServerGuard, project: u64, hits: usize) -> Mock {
    server
        .mock(
            "POST",
            format!("/rest/api/latest/projects/Project-project{project}/repos").as_str(),
        )
        .match_header("authorization", "Basic dTpw")
        .with_status(201)
        .with_body(format!(r#"{{"id":1,"slug":"created-in-project{project}","name":"x"}}"#))
        .expect(hits)
        .create_async()
        .await
}

#[tokio::test]
async fn test_two_projects_one_repo_each() {
    let mut server = mockito::Server::new_async().await;
    let health = healthy(&mut server).await;
    let p0 = project_mock(&mut server, 0, 201, 1).await;
    let p1 = project_mock(&mut server, 1, 201, 1).await;
    let mut repos = Vec::new();
    for project in 0..2 {
        repos.push(
            server
                .mock(
                    "POST",
                    format!("/rest/api/latest/projects/Project-project{project}/repos").as_str(),
                )
                .match_body(r#"{"name":"Repo-repo0","scmId":"git","forkable":true}"#)
                .with_status(201)
                .with_body(format!(r#"{{"slug":"repo-repo0","in":"project{project}"}}"#))
                .expect(1)
                .create_async()
                .await,
        );
    }

    let config = config_for(&server, 2, 1);
    let (result, transcript) = seed(&config).await;

    assert_eq!(
        result.unwrap(),
        SeedReport {
            projects_created: 2,
            repos_created: 2
        }
    );
    health.assert_async().await;
    p0.assert_async().await;
    p1.assert_async().await;
    for mock in &repos {
        mock.assert_async().await;
    }

    let order = [
        r#"{"state":"RUNNING"}"#,
        "Adding 2 projects and 1 repos to each project",
        r#""key":"Project-project0""#,
        r#""in":"project0""#,
        r#""key":"Project-project1""#,
        r#""in":"project1""#,
    ];
    let positions: Vec<usize> = order
        .iter()
        .map(|needle| transcript.find(needle).expect(needle))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{transcript}");
}

#[tokio::test]
async fn test_repos_created_in_project_major_order() {
    let mut server = mockito::Server::new_async().await;
    let _health = healthy(&mut server).await;
    let mut mocks = Vec::new();
    for project in 0..2 {
        mocks.push(project_mock(&mut server, project, 201, 1).await);
        for repo in 0..3 {
            let mock = server
                .mock(
                    "POST",
                    format!("/rest/api/latest/projects/Project-project{project}/repos").as_str(),
                )
                .match_body(
                    format!(r#"{{"name":"Repo-repo{repo}","scmId":"git","forkable":true}}"#)
                        .as_str(),
                )
                .with_status(201)
                .with_body(format!("p{project}r{repo}"))
                .expect(1)
                .create_async()
                .await;
            mocks.push(mock);
        }
    }

    let config = config_for(&server, 2, 3);
    let (result, transcript) = seed(&config).await;

    assert_eq!(result.unwrap().repos_created, 6);
    for mock in &mocks {
        mock.assert_async().await;
    }
    let bodies: Vec<&str> = transcript
        .lines()
        .filter(|line| line.starts_with('p') && line.contains('r'))
        .collect();
    assert_eq!(bodies, ["p0r0", "p0r1", "p0r2", "p1r0", "p1r1", "p1r2"]);
}

#[tokio::test]
async fn test_zero_projects_only_checks_health() {
    let mut server = mockito::Server::new_async().await;
    let health = healthy(&mut server).await;
    let writes = server
        .mock("POST", Matcher::Any)
        .with_status(201)
        .expect(0)
        .create_async()
        .await;

    let config = config_for(&server, 0, 5);
    let (result, transcript) = seed(&config).await;

    assert_eq!(result.unwrap(), SeedReport::default());
    health.assert_async().await;
    writes.assert_async().await;
    assert!(transcript.contains("Health check response:"));
    assert!(transcript.ends_with("Adding 0 projects and 5 repos to each project\n"));
}

#[tokio::test]
async fn test_negative_counts_create_nothing() {
    let mut server = mockito::Server::new_async().await;
    let _health = healthy(&mut server).await;
    let writes = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let config = config_for(&server, -2, -1);
    let (result, _) = seed(&config).await;

    assert_eq!(result.unwrap(), SeedReport::default());
    writes.assert_async().await;
}

#[tokio::test]
async fn test_projects_without_repos() {
    let mut server = mockito::Server::new_async().await;
    let _health = healthy(&mut server).await;
    let p0 = project_mock(&mut server, 0, 201, 1).await;
    let p1 = project_mock(&mut server, 1, 201, 1).await;
    let repos = server
        .mock("POST", Matcher::Regex("/repos$".to_string()))
        .expect(0)
        .create_async()
        .await;

    let config = config_for(&server, 2, 0);
    let (result, _) = seed(&config).await;

    assert_eq!(result.unwrap().projects_created, 2);
    p0.assert_async().await;
    p1.assert_async().await;
    repos.assert_async().await;
}

#[tokio::test]
async fn test_unhealthy_server_creates_nothing() {
    let mut server = mockito::Server::new_async().await;
    let health = server
        .mock("GET", "/status")
        .with_status(503)
        .with_body("maintenance")
        .expect(1)
        .create_async()
        .await;
    let writes = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let config = config_for(&server, 3, 3);
    let (result, transcript) = seed(&config).await;

    let err = result.unwrap_err();
    assert_eq!(err.phase(), Some(Phase::HealthCheck));
    assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
    assert_eq!(
        format!("{:#}", anyhow::Error::from(err)),
        "Health check failed: unexpected status 503 Service Unavailable (expected 200 OK)"
    );
    assert!(transcript.is_empty());
    health.assert_async().await;
    writes.assert_async().await;
}

#[tokio::test]
async fn test_health_check_requires_exactly_200() {
    let mut server = mockito::Server::new_async().await;
    let _health = server
        .mock("GET", "/status")
        .with_status(204)
        .create_async()
        .await;

    let config = config_for(&server, 1, 1);
    let (result, _) = seed(&config).await;

    assert_eq!(result.unwrap_err().status(), Some(StatusCode::NO_CONTENT));
}

#[tokio::test]
async fn test_project_failure_stops_the_run() {
    let mut server = mockito::Server::new_async().await;
    let _health = healthy(&mut server).await;
    let p0 = project_mock(&mut server, 0, 201, 1).await;
    let r0 = repos_mock(&mut server, 0, 2).await;
    let p1 = project_mock(&mut server, 1, 409, 1).await;
    let r1 = repos_mock(&mut server, 1, 0).await;
    let p2 = project_mock(&mut server, 2, 201, 0).await;

    let config = config_for(&server, 3, 2);
    let (result, transcript) = seed(&config).await;

    let err = result.unwrap_err();
    assert_eq!(err.phase(), Some(Phase::ProjectCreation));
    assert_eq!(err.status(), Some(StatusCode::CONFLICT));
    p0.assert_async().await;
    r0.assert_async().await;
    p1.assert_async().await;
    r1.assert_async().await;
    p2.assert_async().await;

    assert_eq!(transcript.matches("Project creation response:").count(), 1);
    assert_eq!(transcript.matches("Repo creation response:").count(), 2);
    assert!(!transcript.contains("Project-project1"));
}

#[tokio::test]
async fn test_repo_failure_stops_the_run() {
    let mut server = mockito::Server::new_async().await;
    let _health = healthy(&mut server).await;
    let p0 = project_mock(&mut server, 0, 201, 1).await;
    let ok = server
        .mock("POST", "/rest/api/latest/projects/Project-project0/repos")
        .match_body(Matcher::Regex("Repo-repo0".to_string()))
        .with_status(201)
        .expect(1)
        .create_async()
        .await;
    let failing = server
        .mock("POST", "/rest/api/latest/projects/Project-project0/repos")
        .match_body(Matcher::Regex("Repo-repo1".to_string()))
        .with_status(500)
        .expect(1)
        .create_async()
        .await;
    let untouched = server
        .mock("POST", "/rest/api/latest/projects/Project-project0/repos")
        .match_body(Matcher::Regex("Repo-repo2".to_string()))
        .expect(0)
        .create_async()
        .await;
    let p1 = project_mock(&mut server, 1, 201, 0).await;

    let config = config_for(&server, 2, 3);
    let (result, _) = seed(&config).await;

    let err = result.unwrap_err();
    assert_eq!(err.phase(), Some(Phase::RepoCreation));
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    p0.assert_async().await;
    ok.assert_async().await;
    failing.assert_async().await;
    untouched.assert_async().await;
    p1.assert_async().await;
}

#[tokio::test]
async fn test_concurrent_seeding_creates_everything() {
    let mut server = mockito::Server::new_async().await;
    let _health = healthy(&mut server).await;
    let projects = server
        .mock("POST", "/rest/api/latest/projects")
        .match_body(Matcher::Regex(
            r#"^\{"key":"Project-project[0-3]","links":""\}$"#.to_string(),
        ))
        .with_status(201)
        .expect(4)
        .create_async()
        .await;
    let repos = server
        .mock(
            "POST",
            Matcher::Regex(r"^/rest/api/latest/projects/Project-project[0-3]/repos$".to_string()),
        )
        .with_status(201)
        .expect(8)
        .create_async()
        .await;

    let config = config_for(&server, 4, 2).with_concurrency(3);
    let (result, transcript) = seed(&config).await;

    assert_eq!(
        result.unwrap(),
        SeedReport {
            projects_created: 4,
            repos_created: 8
        }
    );
    projects.assert_async().await;
    repos.assert_async().await;
    assert_eq!(transcript.matches("Project creation response:").count(), 4);
    assert_eq!(transcript.matches("Repo creation response:").count(), 8);
}

#[tokio::test]
async fn test_concurrent_failure_short_circuits() {
    let mut server = mockito::Server::new_async().await;
    let _health = healthy(&mut server).await;
    let projects = server
        .mock("POST", "/rest/api/latest/projects")
        .with_status(400)
        .expect_at_least(1)
        .expect_at_most(2)
        .create_async()
        .await;
    let repos = server
        .mock("POST", Matcher::Regex("/repos$".to_string()))
        .expect(0)
        .create_async()
        .await;

    let config = config_for(&server, 6, 2).with_concurrency(2);
    let (result, _) = seed(&config).await;

    let err = result.unwrap_err();
    assert_eq!(err.phase(), Some(Phase::ProjectCreation));
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    projects.assert_async().await;
    repos.assert_async().await;
}

#[tokio::test]
async fn test_concurrent_failure_keeps_created_projects_in_transcript() {
    let mut server = mockito::Server::new_async().await;
    let _health = healthy(&mut server).await;
    let created = server
        .mock("POST", "/rest/api/latest/projects")
        .match_body(r#"{"key":"Project-project0","links":""}"#)
        .with_status(201)
        .with_body("P0-CREATED")
        .expect(1)
        .create_async()
        .await;
    let rejected = server
        .mock("POST", "/rest/api/latest/projects")
        .match_body(r#"{"key":"Project-project1","links":""}"#)
        .with_status(400)
        .expect(1)
        .create_async()
        .await;
    let repos = server
        .mock("POST", "/rest/api/latest/projects/Project-project0/repos")
        .with_status(201)
        .expect_at_most(1)
        .create_async()
        .await;

    let config = config_for(&server, 2, 1).with_concurrency(2);
    let (result, transcript) = seed(&config).await;

    let err = result.unwrap_err();
    assert_eq!(err.phase(), Some(Phase::ProjectCreation));
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    created.assert_async().await;
    rejected.assert_async().await;
    repos.assert_async().await;
    assert!(
        transcript.contains("Project creation response:\nP0-CREATED\nStatus code: 201\n"),
        "{transcript}"
    );
}

// =============================================================================
// transport failures
// =============================================================================

/// Serve one canned response per connection, in order. Once the script runs
/// out, connections are accepted, read and dropped without an answer.
async fn scripted_server(responses: Vec<&'static str>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let mut responses = responses.into_iter();
        while let Ok((mut socket, _)) = listener.accept().await {
            read_request(&mut socket).await;
            if let Some(response) = responses.next() {
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        }
    });
    url
}

async fn read_request(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                return;
            }
        }
    }
}

const HEALTHY: &str = "HTTP/1.1 200 OK\r\nContent-Length: 7\r\nConnection: close\r\n\r\nRUNNING";

#[tokio::test]
async fn test_connection_lost_after_health_check() {
    let url = scripted_server(vec![HEALTHY]).await;

    let config = config_for_url(url, 2, 1);
    let (result, transcript) = seed(&config).await;

    let err = result.unwrap_err();
    assert_eq!(err.phase(), Some(Phase::ProjectCreation));
    assert_eq!(err.status(), None);
    assert!(
        matches!(
            err,
            SeedError::Request {
                source: ApiError::Network(_),
                ..
            }
        ),
        "{err:?}"
    );
    assert!(transcript.contains("Health check response:\nRUNNING\nStatus code: 200\n"));
    assert!(transcript.contains("Adding 2 projects and 1 repos to each project"));
    assert!(!transcript.contains("Project creation response:"));
}

#[tokio::test]
async fn test_truncated_body_is_a_read_error() {
    let url = scripted_server(vec![
        HEALTHY,
        "HTTP/1.1 201 Created\r\nContent-Length: 50\r\nConnection: close\r\n\r\n{\"id\":0",
    ])
    .await;

    let config = config_for_url(url, 1, 0);
    let (result, transcript) = seed(&config).await;

    let err = result.unwrap_err();
    assert_eq!(err.phase(), Some(Phase::ProjectCreation));
    assert!(
        matches!(
            err,
            SeedError::Request {
                source: ApiError::BodyRead(_),
                ..
            }
        ),
        "{err:?}"
    );
    assert!(!transcript.contains("Project creation response:"));
}
