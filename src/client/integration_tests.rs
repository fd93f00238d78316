//! Control API client tests against a mock daemon

use super::*;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
};

const SECRET: &str = "s3cret";

/// Mock control API daemon
pub struct MockDaemon {
    server: MockServer,
}

impl MockDaemon {
    pub async fn new() -> Self {
        Self { server: MockServer::start().await }
    }

    /// `host:port` of the mock, the form the checker takes on the command line
    pub fn controller(&self) -> String {
        self.server.address().to_string()
    }

    pub fn client(&self) -> ControllerClient {
        ControllerClient::new(&self.controller(), SECRET, 1500).unwrap()
    }

    pub async fn mock_global(&self, names: &[&str]) {
        Mock::given(method("GET"))
            .and(path("/proxies"))
            .and(header("Authorization", "Bearer s3cret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "proxies": {
                    "GLOBAL": { "type": "Selector", "all": names, "now": names.first() }
                }
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_kind(&self, name: &str, kind: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/proxies/{}", name)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": name, "type": kind, "udp": false, "history": []
            })))
            .mount(&self.server)
            .await;
    }

    /// Details answered after `delay`, so concurrent fetches finish out of order
    pub async fn mock_slow_kind(&self, name: &str, kind: &str, delay: std::time::Duration) {
        Mock::given(method("GET"))
            .and(path(format!("/proxies/{}", name)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"name": name, "type": kind}))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mock_delay(&self, name: &str, status: u16, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/proxies/{}/delay", name)))
            .and(query_param("url", "http://www.gstatic.com/generate_204"))
            .and(query_param("timeout", "1500"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }
}

#[tokio::test]
async fn test_list_keeps_only_leaf_proxies_in_order() {
    let daemon = MockDaemon::new().await;
    daemon.mock_global(&["DIRECT", "REJECT", "Proxy", "Auto", "HK", "JP", "Chain", "US"]).await;
    daemon.mock_kind("DIRECT", "Direct").await;
    daemon.mock_kind("REJECT", "Reject").await;
    daemon.mock_kind("Proxy", "Selector").await;
    daemon.mock_kind("Auto", "URLTest").await;
    daemon.mock_kind("HK", "Shadowsocks").await;
    daemon.mock_kind("JP", "Trojan").await;
    daemon.mock_kind("Chain", "Relay").await;
    daemon.mock_kind("US", "Vmess").await;

    let names = daemon.client().list_proxy_names().await.unwrap();
    assert_eq!(names, vec!["HK", "JP", "US"]);
}

#[tokio::test]
async fn test_concurrent_listing_keeps_daemon_order() {
    let daemon = MockDaemon::new().await;
    daemon.mock_global(&["HK", "Proxy", "JP", "US"]).await;
    daemon.mock_slow_kind("HK", "Shadowsocks", std::time::Duration::from_millis(300)).await;
    daemon.mock_slow_kind("Proxy", "Selector", std::time::Duration::from_millis(200)).await;
    daemon.mock_slow_kind("JP", "Trojan", std::time::Duration::from_millis(100)).await;
    daemon.mock_kind("US", "Vmess").await;

    let client = daemon.client().with_concurrency(4);
    let names = assert_ok!(client.list_proxy_names().await);
    assert_eq!(names, vec!["HK", "JP", "US"]);
}

#[tokio::test]
async fn test_list_fails_when_a_member_has_no_details() {
    let daemon = MockDaemon::new().await;
    daemon.mock_global(&["HK", "ghost"]).await;
    daemon.mock_kind("HK", "Shadowsocks").await;

    let err = assert_err!(daemon.client().with_concurrency(2).list_proxy_names().await);
    assert!(matches!(err, AppError::ProxyNotFound(_)));
}

#[tokio::test]
async fn test_list_empty_global() {
    let daemon = MockDaemon::new().await;
    daemon.mock_global(&[]).await;

    let names = daemon.client().list_proxy_names().await.unwrap();
    assert!(names.is_empty());
}

#[tokio::test]
async fn test_missing_bearer_is_not_matched() {
    let daemon = MockDaemon::new().await;
    daemon.mock_global(&[]).await;

    let client = ControllerClient::new(&daemon.controller(), "wrong", 1500).unwrap();
    let err = client.list_proxy_names().await.unwrap_err();
    // wiremock answers unmatched requests with 404
    assert!(matches!(err, AppError::Upstream(_)));
}

#[tokio::test]
async fn test_list_without_global_all_is_upstream_error() {
    let daemon = MockDaemon::new().await;
    Mock::given(method("GET"))
        .and(path("/proxies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"proxies": {}})))
        .mount(&daemon.server)
        .await;

    let err = daemon.client().list_proxy_names().await.unwrap_err();
    assert!(matches!(err, AppError::Upstream(_)));
}

#[tokio::test]
async fn test_list_malformed_json_is_upstream_error() {
    let daemon = MockDaemon::new().await;
    Mock::given(method("GET"))
        .and(path("/proxies"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&daemon.server)
        .await;

    let err = daemon.client().list_proxy_names().await.unwrap_err();
    assert!(err.to_string().contains("malformed JSON"));
}

#[tokio::test]
async fn test_list_unauthorized_is_auth_error() {
    let daemon = MockDaemon::new().await;
    Mock::given(method("GET"))
        .and(path("/proxies"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthorized"})))
        .mount(&daemon.server)
        .await;

    let err = daemon.client().list_proxy_names().await.unwrap_err();
    assert!(matches!(err, AppError::Auth(_)));
    assert_eq!(err.exit_code(), 4);
}

#[tokio::test]
async fn test_details_returned_verbatim() {
    let daemon = MockDaemon::new().await;
    daemon.mock_kind("HK", "Shadowsocks").await;

    let details = assert_ok!(daemon.client().get_proxy_details("HK").await);
    assert_eq!(details.tag(), "Shadowsocks");
    assert_eq!(details.raw()["udp"], json!(false));
}

#[tokio::test]
async fn test_details_unknown_proxy() {
    let daemon = MockDaemon::new().await;
    Mock::given(method("GET"))
        .and(path("/proxies/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "resource not found"})))
        .mount(&daemon.server)
        .await;

    let err = daemon.client().get_proxy_details("ghost").await.unwrap_err();
    assert!(matches!(err, AppError::ProxyNotFound(ref name) if name == "ghost"));
}

#[tokio::test]
async fn test_details_name_is_percent_encoded() {
    let daemon = MockDaemon::new().await;
    Mock::given(method("GET"))
        .and(path("/proxies/HK%2001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "Trojan"})))
        .mount(&daemon.server)
        .await;

    let details = daemon.client().get_proxy_details("HK 01").await.unwrap();
    assert_eq!(details.name(), "HK 01");
}

#[tokio::test]
async fn test_delay_numeric() {
    let daemon = MockDaemon::new().await;
    daemon.mock_delay("HK", 200, json!({"delay": 320})).await;

    let outcome = daemon.client().get_proxy_delay("HK").await.unwrap();
    assert_eq!(outcome, DelayOutcome::Delay(320));
}

#[tokio::test]
async fn test_delay_failure_statuses_carry_message() {
    let daemon = MockDaemon::new().await;
    daemon.mock_delay("slow", 408, json!({"message": "Timeout"})).await;
    daemon.mock_delay("broken", 503, json!({"message": "An error occurred in the delay test"})).await;
    daemon.mock_delay("gateway", 504, json!({"message": "Gateway Timeout"})).await;

    let client = daemon.client();
    assert_eq!(client.get_proxy_delay("slow").await.unwrap(), DelayOutcome::Failed("Timeout".to_string()));
    assert_eq!(
        client.get_proxy_delay("broken").await.unwrap(),
        DelayOutcome::Failed("An error occurred in the delay test".to_string())
    );
    assert!(!client.get_proxy_delay("gateway").await.unwrap().is_numeric());
}

#[tokio::test]
async fn test_delay_unknown_proxy() {
    let daemon = MockDaemon::new().await;
    daemon.mock_delay("ghost", 404, json!({"message": "resource not found"})).await;

    let err = assert_err!(daemon.client().get_proxy_delay("ghost").await);
    assert!(matches!(err, AppError::ProxyNotFound(_)));
}

#[tokio::test]
async fn test_delay_non_json_failure_is_upstream_error() {
    let daemon = MockDaemon::new().await;
    Mock::given(method("GET"))
        .and(path("/proxies/HK/delay"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&daemon.server)
        .await;

    let err = daemon.client().get_proxy_delay("HK").await.unwrap_err();
    assert!(matches!(err, AppError::Upstream(_)));
}

#[tokio::test]
async fn test_unreachable_daemon() {
    let daemon = MockDaemon::new().await;
    let controller = daemon.controller();
    drop(daemon);

    let client = ControllerClient::new(&controller, SECRET, 1500).unwrap();
    let err = client.list_proxy_names().await.unwrap_err();
    assert!(matches!(err, AppError::Upstream(_)));
    assert!(err.is_recoverable());
}
