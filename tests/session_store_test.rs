//! 会话存储集成测试
//!
//! 验证登录态缓存的完整生命周期:
//! - 保存后读取往返一致 (服务端校验mock通过)
//! - 超过7天的登录态本地直接清除,不发起服务端校验
//! - 服务端校验未通过时清除本地会话
//! - 半截数据 (只有token没有用户信息) 视为无会话

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wechat_ticketing::models::{ApiConfig, Environment, WxUserInfo};
use wechat_ticketing::services::{
    ActivityLogger, RequestDispatcher, SessionStore, WechatApiClient,
};
use wechat_ticketing::utils::KvStorage;

fn test_user(days_since_login: i64) -> WxUserInfo {
    WxUserInfo {
        id: 42,
        openid: "openid_42".to_string(),
        nickname: "演唱会观众".to_string(),
        avatar: "https://example.com/avatar.png".to_string(),
        phone: None,
        ticket_count: 3,
        last_login: Some(Utc::now() - ChronoDuration::days(days_since_login)),
    }
}

fn build_store(base_url: &str, dir: &tempfile::TempDir) -> (SessionStore, Arc<KvStorage>) {
    let storage = Arc::new(KvStorage::new(dir.path().join("storage")).unwrap());
    let logger = Arc::new(ActivityLogger::new(
        Arc::clone(&storage),
        Environment::Development,
    ));
    let config = ApiConfig {
        base_url: base_url.to_string(),
        timeout_ms: 2_000,
        retry_count: 0,
        environment: Environment::Development,
    };
    let dispatcher = Arc::new(RequestDispatcher::new(config, logger));
    let api = Arc::new(WechatApiClient::new(dispatcher));
    (
        SessionStore::new(Arc::clone(&storage), api),
        storage,
    )
}

#[tokio::test]
async fn test_save_then_load_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/wechat/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (store, _storage) = build_store(&format!("{}/api", server.uri()), &dir);

    let user = test_user(0);
    store.save(&user, "token_abc").unwrap();

    let session = store.load().await.expect("应存在有效会话");
    assert_eq!(session.token, "token_abc");
    assert_eq!(session.user, user);
}

#[tokio::test]
async fn test_expired_session_cleared_without_server_validation() {
    let server = MockServer::start().await;
    // 过期会话不应触发任何服务端校验
    Mock::given(method("POST"))
        .and(path("/api/wechat/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (store, _storage) = build_store(&format!("{}/api", server.uri()), &dir);

    let user = test_user(8);
    store.save(&user, "token_old").unwrap();

    assert!(store.load().await.is_none());
    // 两个键都已清除
    assert!(store.current_token().is_none());
    assert!(store.current_user().is_none());
}

#[tokio::test]
async fn test_failed_server_validation_clears_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/wechat/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (store, _storage) = build_store(&format!("{}/api", server.uri()), &dir);

    store.save(&test_user(1), "token_rejected").unwrap();

    assert!(store.load().await.is_none());
    assert!(store.current_token().is_none());
}

#[tokio::test]
async fn test_validation_transport_failure_treated_as_invalid() {
    // 未挂载mock: /wechat/check 返回404,校验视为失败
    let server = MockServer::start().await;

    let dir = tempfile::tempdir().unwrap();
    let (store, _storage) = build_store(&format!("{}/api", server.uri()), &dir);

    store.save(&test_user(1), "token_unreachable").unwrap();

    assert!(store.load().await.is_none());
    assert!(store.current_user().is_none());
}

#[tokio::test]
async fn test_load_empty_when_nothing_saved() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (store, _storage) = build_store(&format!("{}/api", server.uri()), &dir);

    assert!(store.load().await.is_none());
}

#[tokio::test]
async fn test_partial_state_treated_as_no_session() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (store, storage) = build_store(&format!("{}/api", server.uri()), &dir);

    // 模拟两步写入之间崩溃: 只有token落盘
    storage.set("wx_token", &"orphan_token").unwrap();

    assert!(store.load().await.is_none());
}

#[tokio::test]
async fn test_logout_clears_and_is_idempotent() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (store, _storage) = build_store(&format!("{}/api", server.uri()), &dir);

    store.save(&test_user(0), "token_bye").unwrap();
    assert!(store.current_token().is_some());

    store.logout();
    assert!(store.current_token().is_none());
    assert!(store.current_user().is_none());

    // 再次清除不报错
    store.clear();
}
