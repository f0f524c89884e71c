//! 请求调度器集成测试
//!
//! 用mock服务器验证重试次数、指数退避与白名单闸门的真实行为:
//! - 重试次数为N时最多发起N+1次HTTP尝试
//! - 不可重试错误(401)只尝试1次
//! - 白名单拒绝时零HTTP尝试,只留一条ERROR日志

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wechat_ticketing::models::{ActivityKind, ApiConfig, ApiError, Environment};
use wechat_ticketing::services::{ActivityLogger, RequestDescriptor, RequestDispatcher};
use wechat_ticketing::utils::KvStorage;

fn test_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        timeout_ms: 2_000,
        retry_count: 1,
        environment: Environment::Development,
    }
}

fn test_dispatcher(
    base_url: &str,
    dir: &tempfile::TempDir,
) -> (RequestDispatcher, Arc<ActivityLogger>) {
    let storage = Arc::new(KvStorage::new(dir.path().join("storage")).unwrap());
    let logger = Arc::new(ActivityLogger::new(storage, Environment::Development));
    let dispatcher = RequestDispatcher::new(test_config(base_url), Arc::clone(&logger))
        .with_backoff_base(Duration::from_millis(20));
    (dispatcher, logger)
}

#[tokio::test]
async fn test_success_returns_immediately_and_logs_request_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/banners"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (dispatcher, logger) = test_dispatcher(&server.uri(), &dir);

    let descriptor = RequestDescriptor::get(format!("{}/api/banners", server.uri()));
    let response = dispatcher.dispatch(&descriptor, None).await.unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.data["success"], true);

    let entries = logger.read_all();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].kind, ActivityKind::Request);
    assert_eq!(entries[1].kind, ActivityKind::Response);
    assert_eq!(entries[1].data["status_code"], 200);
}

#[tokio::test]
async fn test_transient_failure_retries_up_to_bound() {
    let server = MockServer::start().await;
    // 重试次数2 -> 最多3次尝试,全部失败
    Mock::given(method("GET"))
        .and(path("/api/concerts"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (dispatcher, logger) = test_dispatcher(&server.uri(), &dir);

    let descriptor = RequestDescriptor::get(format!("{}/api/concerts", server.uri()));
    let result = dispatcher.dispatch(&descriptor, Some(2)).await;

    match result {
        Err(ApiError::HttpStatus { status }) => assert_eq!(status, 500),
        other => panic!("预期HTTP 500错误,实际: {:?}", other),
    }

    // 3条REQUEST + 3条ERROR
    let entries = logger.read_all();
    assert_eq!(entries.len(), 6);
    assert_eq!(
        entries
            .iter()
            .filter(|entry| entry.kind == ActivityKind::Error)
            .count(),
        3
    );
}

#[tokio::test]
async fn test_non_retryable_401_makes_single_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user/info"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (dispatcher, _logger) = test_dispatcher(&server.uri(), &dir);

    let descriptor = RequestDescriptor::get(format!("{}/api/user/info", server.uri()));
    // 即使允许5次重试,401也只发一次
    let result = dispatcher.dispatch(&descriptor, Some(5)).await;

    assert!(matches!(result, Err(ApiError::HttpStatus { status: 401 })));
}

#[tokio::test]
async fn test_recovers_after_transient_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/banners"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/banners"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (dispatcher, _logger) = test_dispatcher(&server.uri(), &dir);

    let descriptor = RequestDescriptor::get(format!("{}/api/banners", server.uri()));
    let response = dispatcher.dispatch(&descriptor, Some(2)).await.unwrap();

    assert_eq!(response.status_code, 200);
}

#[tokio::test]
async fn test_unlisted_domain_rejected_with_zero_attempts() {
    let dir = tempfile::tempdir().unwrap();
    let (dispatcher, logger) = test_dispatcher("http://127.0.0.1:5000/api", &dir);

    let descriptor = RequestDescriptor::get("https://invalid-domain.example.com/api/test");
    let result = dispatcher.dispatch(&descriptor, None).await;

    match result {
        Err(ApiError::DomainNotAllowed { url }) => {
            assert_eq!(url, "https://invalid-domain.example.com/api/test");
        }
        other => panic!("预期白名单拒绝,实际: {:?}", other),
    }

    // 只有一条ERROR日志,没有REQUEST (零HTTP尝试)
    let entries = logger.read_all();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, ActivityKind::Error);
    assert_eq!(entries[0].data["attempt"], 0);
}

#[tokio::test]
async fn test_per_attempt_timeout_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (dispatcher, _logger) = test_dispatcher(&server.uri(), &dir);

    let descriptor =
        RequestDescriptor::get(format!("{}/api/slow", server.uri())).with_timeout_ms(50);
    let result = dispatcher.dispatch(&descriptor, Some(0)).await;

    assert!(matches!(result, Err(ApiError::Timeout)));
}

#[tokio::test]
async fn test_backoff_grows_exponentially() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(KvStorage::new(dir.path().join("storage")).unwrap());
    let logger = Arc::new(ActivityLogger::new(storage, Environment::Development));
    let dispatcher = RequestDispatcher::new(test_config(&server.uri()), logger)
        .with_backoff_base(Duration::from_millis(50));

    let descriptor = RequestDescriptor::get(format!("{}/api/flaky", server.uri()));
    let started = Instant::now();
    let result = dispatcher.dispatch(&descriptor, Some(2)).await;
    let elapsed = started.elapsed();

    assert!(result.is_err());
    // 两次退避: 50ms * 2^0 + 50ms * 2^1 = 150ms
    assert!(
        elapsed >= Duration::from_millis(150),
        "退避总时长不足: {:?}",
        elapsed
    );
}
