//! Integration tests for the repository API client
//!
//! These tests use wiremock to stand in for the hosting API and drive the
//! client through the real reqwest transport.

use chrono::{TimeZone, Utc};
use forge_harvest::api::{
    NewRepository, NewTag, Repository, RepositoryClient, RepositoryUpdate, ResourceIdentity, Tag,
    TagObjectType, Tagger,
};
use forge_harvest::transport::{ReqwestTransport, TransportError, TransportSettings};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const TOKEN: &str = "test-token";

fn create_transport() -> Arc<ReqwestTransport> {
    let settings = TransportSettings {
        token: TOKEN.to_string(),
        user_agent: "forge-harvest-tests".to_string(),
        timeout: Duration::from_secs(5),
    };
    Arc::new(ReqwestTransport::new(&settings).expect("Failed to build transport"))
}

fn create_client(base_url: &str) -> RepositoryClient {
    RepositoryClient::new(
        create_transport(),
        base_url,
        ResourceIdentity::new("octocat", "hello-world"),
    )
}

#[tokio::test]
async fn test_create_issue() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/repos/octocat/hello-world/issues"))
        .and(header("authorization", "Bearer test-token"))
        .and(header("accept", "application/vnd.github+json"))
        .and(body_json(json!({
            "title": "Found a bug",
            "body": "I'm having a problem with this.",
            "labels": ["bug"]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"number": 1347})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server.uri());
    let response = client
        .create_issue("Found a bug", "I'm having a problem with this.", ["bug"])
        .await
        .expect("Request failed");

    assert_eq!(response.status(), 201);
    assert_eq!(response.status_text(), "Created");
    assert_eq!(response.json::<Value>().unwrap()["number"], 1347);
}

#[tokio::test]
async fn test_create_repository() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .and(body_json(json!({
            "name": "private_repo",
            "description": "This is your first repository",
            "homepage": "https://github.com",
            "private": true,
            "has_issues": true,
            "has_projects": true,
            "has_wiki": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 7,
            "name": "private_repo",
            "full_name": "octocat/private_repo",
            "private": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server.uri());
    let data = NewRepository {
        name: "private_repo".to_string(),
        description: Some("This is your first repository".to_string()),
        homepage: Some("https://github.com".to_string()),
        private: Some(true),
        has_issues: Some(true),
        has_projects: Some(true),
        has_wiki: Some(true),
    };
    let response = client.create_repository(&data).await.unwrap();

    assert_eq!(response.status(), 201);
    let repo: Repository = response.json().unwrap();
    assert_eq!(repo.full_name, "octocat/private_repo");
    assert!(repo.private);
}

#[tokio::test]
async fn test_delete_repository() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/repos/octocat/hello-world"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server.uri());
    let response = client.delete_repository().await.unwrap();

    assert_eq!(response.status(), 204);
    assert!(response.body().is_empty());
}

#[tokio::test]
async fn test_list_repositories() {
    let mock_server = MockServer::start().await;
    let repos = json!([
        {"id": 1, "name": "hello-world", "full_name": "octocat/hello-world", "private": false},
        {"id": 2, "name": "linguist", "full_name": "octocat/linguist", "private": true}
    ]);

    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repos.clone()))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/octocat/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([repos[0].clone()])))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server.uri());

    let response = client.list_user_repositories().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.json::<Value>().unwrap(), repos);
    let names: Vec<String> = response
        .json::<Vec<Repository>>()
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, ["hello-world", "linguist"]);

    let response = client.list_owner_repositories().await.unwrap();
    assert_eq!(response.json::<Vec<Repository>>().unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_repository_uses_patch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/repos/octocat/hello-world"))
        .and(body_json(json!({"name": "x"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "name": "x"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server.uri());
    let update = RepositoryUpdate {
        name: Some("x".to_string()),
        ..RepositoryUpdate::default()
    };
    let response = client.update_repository(&update).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.json::<Repository>().unwrap().name, "x");
}

#[tokio::test]
async fn test_tags() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/repos/octocat/hello-world/tags"))
        .and(|request: &Request| {
            let body: Value = match serde_json::from_slice(&request.body) {
                Ok(body) => body,
                Err(_) => return false,
            };
            body["tag"] == "v0.0.1"
                && body["type"] == "commit"
                && body["tagger"]["date"] == "2011-06-17T14:53:35Z"
        })
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"tag": "v0.0.1"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello-world/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "v0.0.1", "commit": {"sha": "c5b97d5ae6c19d5c5df71a34c7fbeeda2479ccbc"}}
        ])))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server.uri());
    let data = NewTag {
        message: "initial version".to_string(),
        object: "c5b97d5ae6c19d5c5df71a34c7fbeeda2479ccbc".to_string(),
        object_type: TagObjectType::Commit,
        tagger: Tagger {
            name: "Monalisa Octocat".to_string(),
            email: "octocat@github.com".to_string(),
            date: Utc.with_ymd_and_hms(2011, 6, 17, 14, 53, 35).unwrap(),
        },
    };

    let response = client.create_tag("v0.0.1", &data).await.unwrap();
    assert_eq!(response.status(), 201);

    let response = client.list_repository_tags().await.unwrap();
    let tags: Vec<Tag> = response.json().unwrap();
    assert_eq!(tags[0].name, "v0.0.1");
    assert_eq!(tags[0].commit.sha, "c5b97d5ae6c19d5c5df71a34c7fbeeda2479ccbc");
}

#[tokio::test]
async fn test_error_status_is_returned_unmodified() {
    let mock_server = MockServer::start().await;
    let error_body = json!({
        "message": "Validation Failed",
        "errors": [{"resource": "Issue", "code": "missing_field", "field": "title"}]
    });

    Mock::given(method("POST"))
        .and(path("/repos/octocat/hello-world/issues"))
        .respond_with(ResponseTemplate::new(422).set_body_json(error_body.clone()))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server.uri());
    let response = client
        .create_issue("", "", Vec::<String>::new())
        .await
        .expect("A 422 is a response, not a transport failure");

    assert_eq!(response.status(), 422);
    assert!(!response.is_success());
    assert_eq!(response.json::<Value>().unwrap(), error_body);
}

#[tokio::test]
async fn test_unreachable_host_is_a_transport_error() {
    // Nothing listens on port 9 of localhost in the test environment
    let client = create_client("http://127.0.0.1:9");

    let result = client.list_user_repositories().await;

    match result {
        Err(TransportError::Network { url, .. }) => {
            assert_eq!(url, "http://127.0.0.1:9/user/repos");
        }
        other => panic!("expected a network error, got {:?}", other),
    }
}
