#![allow(non_snake_case)]

mod common;

use blog_firebase::{FirebaseError, IdpCredential};
use blog_types::PostDraft;
use mockito::Matcher;
use serde_json::json;

use common::{documents_path, setup, sign_in_body, API_KEY};

fn post_document(id: &str, title: &str, createdAt: &str) -> serde_json::Value {
    json!({
        "name": format!("projects/quill-demo/databases/(default)/documents/posts/{id}"),
        "fields": {
            "title": { "stringValue": title },
            "content": { "stringValue": format!("Body of {title}") },
            "authorName": { "stringValue": "Ada Lovelace" },
            "authorId": { "stringValue": "u1" },
            "createdAt": { "timestampValue": createdAt }
        },
        "createTime": createdAt,
        "updateTime": createdAt
    })
}

#[tokio::test]
async fn list_posts_follows_page_tokens() {
    let (mut server, services) = setup().await;
    let firstPage = server
        .mock("GET", documents_path("posts").as_str())
        .match_query(Matcher::Regex("pageSize=100$".into()))
        .with_status(200)
        .with_body(
            json!({
                "documents": [post_document("p3", "Third", "2024-03-03T00:00:00Z")],
                "nextPageToken": "page-2"
            })
            .to_string(),
        )
        .create_async()
        .await;
    let secondPage = server
        .mock("GET", documents_path("posts").as_str())
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("key".into(), API_KEY.into()),
            Matcher::UrlEncoded("orderBy".into(), "createdAt desc".into()),
            Matcher::UrlEncoded("pageToken".into(), "page-2".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "documents": [
                    post_document("p2", "Second", "2024-03-02T00:00:00Z"),
                    post_document("p1", "First", "2024-03-01T00:00:00Z")
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let posts = services.db.list_posts().await.unwrap();
    firstPage.assert_async().await;
    secondPage.assert_async().await;

    let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p3", "p2", "p1"]);
    assert_eq!(posts[0].content, "Body of Third");
}

#[tokio::test]
async fn empty_collection_lists_nothing() {
    let (mut server, services) = setup().await;
    server
        .mock("GET", documents_path("posts").as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    assert!(services.db.list_posts().await.unwrap().is_empty());
}

#[tokio::test]
async fn get_post_maps_missing_document_to_none() {
    let (mut server, services) = setup().await;
    server
        .mock("GET", documents_path("posts/abc123").as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(post_document("abc123", "Hello", "2024-03-01T00:00:00Z").to_string())
        .create_async()
        .await;
    server
        .mock("GET", documents_path("posts/missing").as_str())
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(
            json!({ "error": { "code": 404, "message": "Document not found", "status": "NOT_FOUND" } })
                .to_string(),
        )
        .create_async()
        .await;

    let post = services.db.get_post("abc123").await.unwrap().unwrap();
    assert_eq!(post.title, "Hello");
    assert_eq!(post.created_at, "2024-03-01T00:00:00Z");

    assert!(services.db.get_post("missing").await.unwrap().is_none());
    assert!(services.db.get_post("a/b").await.unwrap().is_none());
}

#[tokio::test]
async fn server_errors_surface_as_api_errors() {
    let (mut server, services) = setup().await;
    server
        .mock("GET", documents_path("posts").as_str())
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body(
            json!({ "error": { "code": 403, "message": "Missing or insufficient permissions.", "status": "PERMISSION_DENIED" } })
                .to_string(),
        )
        .create_async()
        .await;

    let err = services.db.list_posts().await.unwrap_err();
    assert!(matches!(err, FirebaseError::Api { status: 403, .. }));
}

#[tokio::test]
async fn create_post_authorizes_with_id_token() {
    let (mut server, services) = setup().await;
    server
        .mock("POST", "/accounts:signInWithIdp")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(sign_in_body("u1", "a@b.com", "3600"))
        .create_async()
        .await;
    let createMock = server
        .mock("POST", documents_path("posts").as_str())
        .match_query(Matcher::UrlEncoded("key".into(), API_KEY.into()))
        .match_header("authorization", "Bearer id-token-u1")
        .match_body(Matcher::PartialJson(json!({
            "fields": {
                "title": { "stringValue": "Hello" },
                "authorName": { "stringValue": "Ada Lovelace" },
                "authorId": { "stringValue": "u1" }
            }
        })))
        .with_status(200)
        .with_body(post_document("new1", "Hello", "2024-03-04T00:00:00Z").to_string())
        .create_async()
        .await;

    services
        .auth
        .sign_in_with_idp(&services.google_provider, IdpCredential::IdToken("t".into()))
        .await
        .unwrap();
    let session = services.auth.current_session().unwrap();

    let draft = PostDraft {
        title: "  Hello ".into(),
        content: "Body of Hello".into(),
    };
    let post = services.db.create_post(&draft, &session).await.unwrap();
    createMock.assert_async().await;
    assert_eq!(post.id, "new1");

    let blank = PostDraft {
        title: String::new(),
        content: "x".into(),
    };
    assert!(matches!(
        services.db.create_post(&blank, &session).await,
        Err(FirebaseError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn delete_post_sends_bearer_token() {
    let (mut server, services) = setup().await;
    server
        .mock("POST", "/accounts:signInWithIdp")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(sign_in_body("u1", "a@b.com", "3600"))
        .create_async()
        .await;
    let deleteMock = server
        .mock("DELETE", documents_path("posts/p1").as_str())
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer id-token-u1")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    services
        .auth
        .sign_in_with_idp(&services.google_provider, IdpCredential::IdToken("t".into()))
        .await
        .unwrap();
    let session = services.auth.current_session().unwrap();

    services.db.delete_post("p1", &session).await.unwrap();
    deleteMock.assert_async().await;
}
