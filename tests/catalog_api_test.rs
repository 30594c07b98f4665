//! Integration tests for the catalog read routes and API auth.

mod common;

use common::TestHarness;
use melodex::config::{AuthConfig, Config};

#[tokio::test]
async fn health_check() {
    let (_h, addr) = TestHarness::with_server().await;
    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn list_music_empty() {
    let (_h, addr) = TestHarness::with_server().await;
    let resp = reqwest::get(format!("http://{addr}/api/music")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["code"], 200);
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn list_music_in_id_order() {
    let (h, addr) = TestHarness::with_server().await;
    h.catalog_entry("Zebra", "/Zebra.mp3");
    h.catalog_entry("Apple", "/Apple.flac");

    let resp = reqwest::get(format!("http://{addr}/api/music")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["name"], "Zebra");
    assert_eq!(data[0]["file_path"], "/Zebra.mp3");
    assert_eq!(data[1]["name"], "Apple");
    assert!(data[0]["id"].as_i64().unwrap() < data[1]["id"].as_i64().unwrap());
}

#[tokio::test]
async fn play_music_returns_url() {
    let (h, addr) = TestHarness::with_server().await;
    let entry = h.catalog_entry("Song", "/Song.mp3");

    let resp = reqwest::get(format!("http://{addr}/api/music/play/{}", entry.id))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["data"]["url"], "/Song.mp3");
    assert_eq!(json["message"], "Playing: Song");
}

#[tokio::test]
async fn play_music_not_found() {
    let (_h, addr) = TestHarness::with_server().await;
    let resp = reqwest::get(format!("http://{addr}/api/music/play/4242"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["code"], 404);
}

#[tokio::test]
async fn play_music_invalid_id() {
    let (_h, addr) = TestHarness::with_server().await;
    let resp = reqwest::get(format!("http://{addr}/api/music/play/abc"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

fn auth_config() -> Config {
    let mut config = Config::default();
    config.server.auth = AuthConfig {
        enabled: true,
        api_key: Some("test-key".to_string()),
        ..AuthConfig::default()
    };
    config
}

#[tokio::test]
async fn auth_rejects_missing_key() {
    let (_h, addr) = TestHarness::with_server_config(auth_config()).await;
    let resp = reqwest::get(format!("http://{addr}/api/music")).await.unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn auth_accepts_bearer_key() {
    let (_h, addr) = TestHarness::with_server_config(auth_config()).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("http://{addr}/api/music"))
        .bearer_auth("wrong")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = client
        .get(format!("http://{addr}/api/music"))
        .bearer_auth("test-key")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn health_check_skips_auth() {
    let (_h, addr) = TestHarness::with_server_config(auth_config()).await;
    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn auth_accepts_session_token() {
    let (h, addr) = TestHarness::with_server_config(auth_config()).await;
    let (_user, token) = h.user_session("listener");

    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/api/music"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn auth_error_uses_envelope() {
    let (_h, addr) = TestHarness::with_server_config(auth_config()).await;
    let resp = reqwest::get(format!("http://{addr}/api/music/play/1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["code"], 401);
}
