//! End-to-end tests: client → gateway → mock backend.

use std::time::Duration;

use headerblock::config::{GatewayConfig, HeaderConfig};
use reqwest::StatusCode;

mod common;

fn rule(name: &str, value: &str) -> HeaderConfig {
    HeaderConfig {
        name: name.into(),
        value: value.into(),
    }
}

async fn config_for_backend() -> GatewayConfig {
    let backend = common::start_mock_backend("Hello from backend").await;
    let mut config = GatewayConfig::default();
    config.upstream.address = backend.to_string();
    config
}

#[tokio::test]
async fn test_allowed_request_reaches_backend() {
    let mut config = config_for_backend().await;
    config.filter.request_headers.push(rule("User-Agent", "SpamBot"));
    let gateway = common::start_gateway(config).await;

    let client = reqwest::Client::new();
    let res = client
        .get(gateway.url("/hello"))
        .header("User-Agent", "Mozilla")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "Hello from backend");
    gateway.stop();
}

#[tokio::test]
async fn test_blocked_request_gets_empty_403() {
    let mut config = config_for_backend().await;
    config.filter.request_headers.push(rule("User-Agent", "SpamBot"));
    let gateway = common::start_gateway(config).await;

    let client = reqwest::Client::new();
    let res = client
        .get(gateway.url("/hello"))
        .header("User-Agent", "SpamBot/1.0")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert!(res.text().await.unwrap().is_empty());
    gateway.stop();
}

#[tokio::test]
async fn test_allowlist_uses_connection_address() {
    let mut config = config_for_backend().await;
    config.filter.request_headers.push(rule("X-Test", ""));
    config.filter.allowed_ips = vec!["10.0.0.0/8".into()];
    let gateway = common::start_gateway(config.clone()).await;

    let client = reqwest::Client::new();
    let res = client.get(gateway.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    gateway.stop();

    // Loopback on the allowlist skips the header rules entirely.
    config.filter.allowed_ips = vec!["10.0.0.0/8, 127.0.0.1, ::1".into()];
    let gateway = common::start_gateway(config).await;
    let res = client
        .get(gateway.url("/"))
        .header("X-Test", "blocked")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    gateway.stop();
}

#[tokio::test]
async fn test_config_update_swaps_filter() {
    let config = config_for_backend().await;
    let gateway = common::start_gateway(config.clone()).await;
    let client = reqwest::Client::new();

    let res = client
        .get(gateway.url("/"))
        .header("Cf-Ipcountry", "FR")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let mut updated = config;
    updated.filter.request_headers.push(rule("Cf-Ipcountry", ""));
    updated.filter.whitelist_request_headers.push(rule("Cf-Ipcountry", "VN"));
    gateway.updates.send(updated).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let res = client
        .get(gateway.url("/"))
        .header("Cf-Ipcountry", "FR")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(gateway.url("/"))
        .header("Cf-Ipcountry", "VN")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    gateway.stop();
}

#[tokio::test]
async fn test_value_rule_ignores_host_header() {
    let mut config = config_for_backend().await;
    // Matches the Host header reqwest sends (127.0.0.1:port).
    config.filter.request_headers.push(rule("", "127\\.0\\.0\\.1"));
    let gateway = common::start_gateway(config).await;

    let client = reqwest::Client::new();
    let res = client.get(gateway.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(gateway.url("/"))
        .header("X-Forwarded-For", "127.0.0.1")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    gateway.stop();
}
