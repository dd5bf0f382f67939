// HTTP client tests against a mock matching service

use lume_swipe::services::{Credential, CredentialStore, HttpMatchingService};
use lume_swipe::{MatchingService, RemoteError};
use mockito::{Matcher, Server};
use serde_json::json;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

const TOKEN: &str = "opaque-session-token";

async fn client_for(server: &Server) -> (HttpMatchingService, CredentialStore) {
    let credentials = CredentialStore::new();
    credentials.set(Credential::parse(TOKEN).unwrap()).await;
    let client =
        HttpMatchingService::new(server.url(), Duration::from_secs(5), credentials.clone())
            .unwrap();
    (client, credentials)
}

fn profile_json(id: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "name": format!("Candidate {}", id),
        "age": 29,
        "job": "Designer",
        "bio": "Dog person",
        "education": "Art school",
        "lookingFor": "Long-term",
        "photo": format!("https://example.com/{}.jpg", id),
        "interests": ["film"],
        "hobbies": ["cycling"]
    })
}

#[tokio::test]
async fn test_list_profiles_decodes_catalog() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/profiles")
        .match_header("authorization", format!("Bearer {}", TOKEN).as_str())
        .match_header("x-request-id", Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([profile_json("p1"), profile_json("p2")]).to_string())
        .create_async()
        .await;

    let (client, _) = client_for(&server).await;
    let profiles = assert_ok!(client.list_profiles().await);

    mock.assert_async().await;
    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[0].id, "p1");
    assert_eq!(profiles[0].looking_for, "Long-term");
}

#[tokio::test]
async fn test_like_reads_match_flag() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/matches/like/p1")
        .match_body(Matcher::Json(json!({ "superLiked": false })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"isMatch":true}"#)
        .create_async()
        .await;

    let (client, _) = client_for(&server).await;
    let outcome = assert_ok!(client.like("p1").await);

    mock.assert_async().await;
    assert!(outcome.is_match());
}

#[tokio::test]
async fn test_super_like_without_match_flag_is_no_match() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/matches/superlike/p1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Profile super liked"}"#)
        .create_async()
        .await;

    let (client, _) = client_for(&server).await;
    let outcome = assert_ok!(client.super_like("p1").await);

    mock.assert_async().await;
    assert_eq!(outcome.is_match, None);
    assert!(!outcome.is_match());
}

#[tokio::test]
async fn test_like_with_empty_body_is_no_match() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/matches/like/p1")
        .with_status(201)
        .create_async()
        .await;

    let (client, _) = client_for(&server).await;
    let outcome = assert_ok!(client.like("p1").await);

    assert!(!outcome.is_match());
}

#[tokio::test]
async fn test_like_with_plain_text_body_is_no_match() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/matches/like/p1")
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body("Liked")
        .create_async()
        .await;

    let (client, _) = client_for(&server).await;
    let outcome = assert_ok!(client.like("p1").await);

    mock.assert_async().await;
    assert_eq!(outcome.is_match, None);
    assert!(!outcome.is_match());
}

#[tokio::test]
async fn test_profile_id_is_path_encoded() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/matches/pass/a%20b")
        .with_status(200)
        .create_async()
        .await;

    let (client, _) = client_for(&server).await;
    assert_ok!(client.pass("a b").await);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_matches_decodes_populated_profiles() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/matches")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([{ "profileId": profile_json("m1"), "superLiked": true }]).to_string())
        .create_async()
        .await;

    let (client, _) = client_for(&server).await;
    let matches = assert_ok!(client.list_matches().await);

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].profile.id, "m1");
    assert!(matches[0].super_liked);
}

#[tokio::test]
async fn test_list_liked_defaults_super_liked() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/matches/liked")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([{ "profileId": profile_json("p3") }]).to_string())
        .create_async()
        .await;

    let (client, _) = client_for(&server).await;
    let liked = assert_ok!(client.list_liked().await);

    assert_eq!(liked[0].profile.id, "p3");
    assert!(!liked[0].super_liked);
}

#[tokio::test]
async fn test_unauthorized_clears_credential() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/matches")
        .with_status(401)
        .with_body(r#"{"message":"Token expired"}"#)
        .create_async()
        .await;

    let (client, credentials) = client_for(&server).await;
    let err = assert_err!(client.list_matches().await);

    assert!(err.is_unauthorized());
    assert!(!credentials.is_present().await);
}

#[tokio::test]
async fn test_missing_credential_is_not_sent() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/profiles")
        .expect(0)
        .create_async()
        .await;

    let client =
        HttpMatchingService::new(server.url(), Duration::from_secs(5), CredentialStore::new())
            .unwrap();
    let err = assert_err!(client.list_profiles().await);

    mock.assert_async().await;
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_remove_unknown_match_maps_to_not_found() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("DELETE", "/matches/ghost")
        .with_status(404)
        .create_async()
        .await;

    let (client, credentials) = client_for(&server).await;
    let err = assert_err!(client.remove_match("ghost").await);

    assert!(matches!(err, RemoteError::NotFound(_)));
    assert!(credentials.is_present().await);
}

#[tokio::test]
async fn test_server_error_maps_to_api_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/profiles/seed")
        .with_status(500)
        .with_body("database offline")
        .create_async()
        .await;

    let (client, _) = client_for(&server).await;
    let err = assert_err!(client.seed_profiles().await);

    assert!(matches!(err, RemoteError::ApiError(_)));
}

#[tokio::test]
async fn test_malformed_catalog_is_invalid_response() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/profiles")
        .with_status(200)
        .with_body(r#"{"profiles":"nope"}"#)
        .create_async()
        .await;

    let (client, _) = client_for(&server).await;
    let err = assert_err!(client.list_profiles().await);

    assert!(matches!(err, RemoteError::InvalidResponse(_)));
}
