//! Integration tests for the cluster HTTP client against a mock server.

use assert_matches::assert_matches;
use reqwest::Url;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use esguard_client::api::ElasticsearchApi;
use esguard_core::cluster::{ClusterApi, ClusterError};

async fn api_for(server: &MockServer) -> ElasticsearchApi {
    let url = Url::parse(&server.uri()).expect("mock server uri is a valid url");
    ElasticsearchApi::new(url, Some(std::time::Duration::from_secs(5)))
        .expect("client should build")
}

// ---------------------------------------------------------------------------
// Test: node stats
// ---------------------------------------------------------------------------

#[tokio::test]
async fn node_space_reads_filesystem_totals() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/_nodes/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nodes": {
                "n1": {
                    "name": "es-1",
                    "host": "10.0.0.1",
                    "fs": {
                        "total": {
                            "total_in_bytes": 1000,
                            "free_in_bytes": 120,
                            "available_in_bytes": 100
                        },
                        "data": [{
                            "path": "/var/lib/elasticsearch",
                            "mount": "/",
                            "dev": "/dev/sda1",
                            "total_in_bytes": 1000,
                            "free_in_bytes": 120,
                            "available_in_bytes": 100
                        }]
                    }
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let nodes = api_for(&server).await.node_space().await.unwrap();

    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].name, "es-1");
    assert_eq!(nodes[0].available_percent(), Some(10));
    assert_eq!(nodes[0].mounts[0].path, "/var/lib/elasticsearch");
}

#[tokio::test]
async fn malformed_stats_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/_nodes/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let err = api_for(&server).await.node_space().await.unwrap_err();

    assert_matches!(err, ClusterError::Decode { operation: "node_stats", .. });
    assert!(!err.is_transport());
}

#[tokio::test]
async fn server_error_is_status_error_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/_nodes/stats"))
        .respond_with(ResponseTemplate::new(503).set_body_string("master_not_discovered"))
        .mount(&server)
        .await;

    let err = api_for(&server).await.node_space().await.unwrap_err();

    assert!(err.is_transport());
    assert_matches!(err, ClusterError::Status { status: 503, ref body, .. } if body == "master_not_discovered");
}

// ---------------------------------------------------------------------------
// Test: alias listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn index_names_are_alias_keys() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/_aliases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "app-2023.01.01": { "aliases": {} },
            "app-2023.06.15": { "aliases": { "app-current": {} } },
            ".kibana": { "aliases": {} }
        })))
        .mount(&server)
        .await;

    let mut names = api_for(&server).await.index_names().await.unwrap();
    names.sort();

    assert_eq!(names, [".kibana", "app-2023.01.01", "app-2023.06.15"]);
}

#[tokio::test]
async fn aliases_must_be_an_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/_aliases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["not", "a", "map"])))
        .mount(&server)
        .await;

    let err = api_for(&server).await.index_names().await.unwrap_err();
    assert!(!err.is_transport());
}

// ---------------------------------------------------------------------------
// Test: index deletion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_index_issues_delete_request() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/app-2023.01.01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
        .expect(1)
        .mount(&server)
        .await;

    api_for(&server)
        .await
        .delete_index("app-2023.01.01")
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_accepts_any_2xx() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/app-2023.01.01"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    assert!(api_for(&server)
        .await
        .delete_index("app-2023.01.01")
        .await
        .is_ok());
}

#[tokio::test]
async fn failed_delete_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/app-2023.01.01"))
        .respond_with(ResponseTemplate::new(404).set_body_string("index_not_found_exception"))
        .mount(&server)
        .await;

    let err = api_for(&server)
        .await
        .delete_index("app-2023.01.01")
        .await
        .unwrap_err();

    assert_matches!(err, ClusterError::Status { operation: "delete_index", status: 404, .. });
}

#[tokio::test]
async fn base_path_is_preserved() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/es/_aliases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "a-2023.01.01": {} })))
        .expect(1)
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/es/", server.uri())).unwrap();
    let api = ElasticsearchApi::new(url, None).unwrap();

    assert_eq!(api.index_names().await.unwrap(), ["a-2023.01.01"]);
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    // Port 9 (discard) is almost never listening locally.
    let api = ElasticsearchApi::new(
        Url::parse("http://127.0.0.1:9").unwrap(),
        Some(std::time::Duration::from_secs(2)),
    )
    .unwrap();

    let err = api.node_space().await.unwrap_err();
    assert_matches!(err, ClusterError::Transport { operation: "node_stats", .. });
}
