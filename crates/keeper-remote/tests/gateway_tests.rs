//! Tests for OpenSearchGateway against a mock cluster

use keeper_core::{Error, KeeperConfig, RemoteGateway, ResourceKind, Revision};
use keeper_remote::OpenSearchGateway;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer, extra: &str) -> KeeperConfig {
    let yaml = format!(
        "environments:\n  qa:\n    host: 127.0.0.1\n    port: {}\n    use_ssl: false\n    timeout_secs: 5\n{}",
        server.address().port(),
        extra
    );
    KeeperConfig::from_yaml(&yaml).unwrap()
}

async fn mount_ping(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": {"number": "2.11.0"}})))
        .mount(server)
        .await;
}

/// Run blocking gateway calls off the async test runtime.
async fn blocking<T, F>(f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_connect_fails_on_rejected_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let config = config(&server, "");

    let err = blocking(move || {
        OpenSearchGateway::connect(config.environment("qa").unwrap(), ResourceKind::Template)
            .err()
            .unwrap()
    })
    .await;

    assert!(matches!(err, Error::Connection { .. }), "{err}");
    assert!(err.is_fatal());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_connect_fails_when_unreachable() {
    let config = KeeperConfig::from_yaml(
        "environments:\n  qa:\n    host: 127.0.0.1\n    port: 1\n    use_ssl: false\n    timeout_secs: 2\n",
    )
    .unwrap();

    let err = blocking(move || {
        OpenSearchGateway::connect(config.environment("qa").unwrap(), ResourceKind::Template)
            .err()
            .unwrap()
    })
    .await;

    assert!(matches!(err, Error::Connection { .. }), "{err}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_basic_auth_header_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    let config = config(&server, "    basic_auth:\n      username: admin\n      password: secret\n");

    blocking(move || {
        OpenSearchGateway::connect(config.environment("qa").unwrap(), ResourceKind::Template)
            .map(|_| ())
            .unwrap()
    })
    .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_template_list_and_get() {
    let server = MockServer::start().await;
    mount_ping(&server).await;
    Mock::given(method("GET"))
        .and(path("/_index_template"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "index_templates": [
                {"name": "logs", "index_template": {"index_patterns": ["logs-*"]}},
                {"name": "metrics", "index_template": {"index_patterns": ["metrics-*"]}}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/_index_template/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "index_templates": [
                {"name": "logs", "index_template": {"index_patterns": ["logs-*"], "priority": 5}}
            ]
        })))
        .mount(&server)
        .await;
    let config = config(&server, "");

    let (names, doc) = blocking(move || {
        let gateway =
            OpenSearchGateway::connect(config.environment("qa").unwrap(), ResourceKind::Template)
                .unwrap();
        (gateway.list_names().unwrap(), gateway.get("logs").unwrap())
    })
    .await;

    assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["logs", "metrics"]);
    assert_eq!(serde_json::Value::Object(doc.body.clone()), json!({"index_patterns": ["logs-*"], "priority": 5}));
    assert!(doc.last_updated().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_template_is_not_found() {
    let server = MockServer::start().await;
    mount_ping(&server).await;
    Mock::given(method("GET"))
        .and(path("/_index_template/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"root_cause": [{"reason": "index template matching [ghost] not found"}]},
            "status": 404
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/_index_template/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let config = config(&server, "");

    let (get_err, delete_err) = blocking(move || {
        let gateway =
            OpenSearchGateway::connect(config.environment("qa").unwrap(), ResourceKind::Template)
                .unwrap();
        (
            gateway.get("ghost").unwrap_err(),
            gateway.delete("ghost").unwrap_err(),
        )
    })
    .await;

    assert!(get_err.is_not_found());
    assert!(delete_err.is_not_found());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_template_put_reports_server_reason() {
    let server = MockServer::start().await;
    mount_ping(&server).await;
    Mock::given(method("PUT"))
        .and(path("/_index_template/logs"))
        .and(body_json(json!({"index_patterns": "logs-*"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"type": "x_content_parse_exception", "reason": "[index_patterns] must be an array"},
            "status": 400
        })))
        .mount(&server)
        .await;
    let config = config(&server, "");

    let err = blocking(move || {
        let gateway =
            OpenSearchGateway::connect(config.environment("qa").unwrap(), ResourceKind::Template)
                .unwrap();
        let body = json!({"index_patterns": "logs-*"}).as_object().cloned().unwrap();
        gateway.put("logs", &body, None).unwrap_err()
    })
    .await;

    match err {
        Error::Api { status, reason } => {
            assert_eq!(status, 400);
            assert_eq!(reason, "[index_patterns] must be an array");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_policy_get_carries_revision() {
    let server = MockServer::start().await;
    mount_ping(&server).await;
    Mock::given(method("GET"))
        .and(path("/_plugins/_ism/policies/hot-warm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "hot-warm",
            "_seq_no": 7,
            "_primary_term": 2,
            "policy": {
                "policy_id": "hot-warm",
                "last_updated_time": 1_700_000_000_000_i64,
                "schema_version": 21,
                "states": []
            }
        })))
        .mount(&server)
        .await;
    let config = config(&server, "");

    let doc = blocking(move || {
        let gateway =
            OpenSearchGateway::connect(config.environment("qa").unwrap(), ResourceKind::IsmPolicy)
                .unwrap();
        gateway.get("hot-warm").unwrap()
    })
    .await;

    let revision = doc.revision.clone().unwrap();
    assert_eq!(revision.seq_no, Some(7));
    assert_eq!(revision.primary_term, Some(2));
    assert_eq!(doc.last_updated().unwrap().timestamp(), 1_700_000_000);
    assert!(doc.body.contains_key("states"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_policy_list_pages_through_results() {
    let server = MockServer::start().await;
    mount_ping(&server).await;
    Mock::given(method("GET"))
        .and(path("/_plugins/_ism/policies"))
        .and(query_param("from", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "policies": [{"_id": "a", "policy": {}}, {"_id": "b", "policy": {}}],
            "total_policies": 3
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/_plugins/_ism/policies"))
        .and(query_param("from", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "policies": [{"_id": "c", "policy": {}}],
            "total_policies": 3
        })))
        .mount(&server)
        .await;
    let config = config(&server, "");

    let names = blocking(move || {
        let gateway =
            OpenSearchGateway::connect(config.environment("qa").unwrap(), ResourceKind::IsmPolicy)
                .unwrap();
        gateway.list_names().unwrap()
    })
    .await;

    assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_policy_put_sends_concurrency_token() {
    let server = MockServer::start().await;
    mount_ping(&server).await;
    Mock::given(method("PUT"))
        .and(path("/_plugins/_ism/policies/hot-warm"))
        .and(query_param("if_seq_no", "7"))
        .and(query_param("if_primary_term", "2"))
        .and(body_json(json!({"policy": {"states": []}})))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": {"reason": "version conflict, required seqNo [7]"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let config = config(&server, "");

    let err = blocking(move || {
        let gateway =
            OpenSearchGateway::connect(config.environment("qa").unwrap(), ResourceKind::IsmPolicy)
                .unwrap();
        let body = json!({"states": []}).as_object().cloned().unwrap();
        let revision = Revision {
            seq_no: Some(7),
            primary_term: Some(2),
            last_updated: None,
        };
        gateway.put("hot-warm", &body, Some(&revision)).unwrap_err()
    })
    .await;

    assert!(matches!(err, Error::Api { status: 409, .. }), "{err}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_names_are_percent_encoded_in_paths() {
    let server = MockServer::start().await;
    mount_ping(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/_index_template/team%2Flogs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acknowledged": true})))
        .expect(1)
        .mount(&server)
        .await;
    let config = config(&server, "");

    blocking(move || {
        let gateway =
            OpenSearchGateway::connect(config.environment("qa").unwrap(), ResourceKind::Template)
                .unwrap();
        gateway.delete("team/logs").unwrap()
    })
    .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_policy_delete_existing_and_missing() {
    let server = MockServer::start().await;
    mount_ping(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/_plugins/_ism/policies/hot-warm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "deleted"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/_plugins/_ism/policies/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"result": "not_found"})))
        .expect(1)
        .mount(&server)
        .await;
    let config = config(&server, "");

    let (deleted, missing) = blocking(move || {
        let gateway =
            OpenSearchGateway::connect(config.environment("qa").unwrap(), ResourceKind::IsmPolicy)
                .unwrap();
        (gateway.delete("hot-warm"), gateway.delete("ghost"))
    })
    .await;

    assert!(deleted.is_ok());
    match missing.unwrap_err() {
        Error::NotFound { kind, name } => {
            assert_eq!(kind, ResourceKind::IsmPolicy);
            assert_eq!(name, "ghost");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_template_delete_rejected_is_api_error() {
    let server = MockServer::start().await;
    mount_ping(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/_index_template/logs"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"reason": "no permissions for [indices:admin/index_template/delete]"}
        })))
        .mount(&server)
        .await;
    let config = config(&server, "");

    let err = blocking(move || {
        let gateway =
            OpenSearchGateway::connect(config.environment("qa").unwrap(), ResourceKind::Template)
                .unwrap();
        gateway.delete("logs").unwrap_err()
    })
    .await;

    assert!(matches!(err, Error::Api { status: 403, .. }), "{err}");
    assert!(!err.is_not_found());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_policy_list_without_policies_index_is_empty() {
    let server = MockServer::start().await;
    mount_ping(&server).await;
    Mock::given(method("GET"))
        .and(path("/_plugins/_ism/policies"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"reason": "no such index [.opendistro-ism-config]"},
            "status": 404
        })))
        .expect(1)
        .mount(&server)
        .await;
    let config = config(&server, "");

    let names = blocking(move || {
        let gateway =
            OpenSearchGateway::connect(config.environment("qa").unwrap(), ResourceKind::IsmPolicy)
                .unwrap();
        gateway.list_names().unwrap()
    })
    .await;

    assert!(names.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_policy_list_server_error_is_api_error() {
    let server = MockServer::start().await;
    mount_ping(&server).await;
    Mock::given(method("GET"))
        .and(path("/_plugins/_ism/policies"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"reason": "shard failure"}
        })))
        .mount(&server)
        .await;
    let config = config(&server, "");

    let err = blocking(move || {
        let gateway =
            OpenSearchGateway::connect(config.environment("qa").unwrap(), ResourceKind::IsmPolicy)
                .unwrap();
        gateway.list_names().unwrap_err()
    })
    .await;

    match err {
        Error::Api { status, reason } => {
            assert_eq!(status, 500);
            assert_eq!(reason, "shard failure");
        }
        other => panic!("unexpected error: {other}"),
    }
}
