#![allow(dead_code, non_snake_case)]

use blog_firebase::{Endpoints, FirebaseApp, FirebaseConfig, Services};
use mockito::ServerGuard;
use serde_json::json;

pub const API_KEY: &str = "test-api-key";
pub const APP_ID: &str = "1:1234567890:web:abcdef";
pub const PROJECT_ID: &str = "quill-demo";

/// Services wired to a mock server standing in for every Google endpoint.
pub async fn setup() -> (ServerGuard, Services) {
    let server = mockito::Server::new_async().await;
    let config = FirebaseConfig {
        api_key: API_KEY.into(),
        auth_domain: "quill-demo.firebaseapp.com".into(),
        project_id: PROJECT_ID.into(),
        storage_bucket: "quill-demo.appspot.com".into(),
        messaging_sender_id: "1234567890".into(),
        app_id: APP_ID.into(),
        endpoints: Endpoints {
            identity_toolkit: server.url(),
            secure_token: server.url(),
            firestore: server.url(),
        },
    };
    let services = FirebaseApp::initialize(config).expect("valid test config");
    (server, services)
}

pub fn sign_in_body(uid: &str, email: &str, expiresIn: &str) -> String {
    json!({
        "kind": "identitytoolkit#VerifyAssertionResponse",
        "providerId": "google.com",
        "localId": uid,
        "email": email,
        "displayName": "Ada Lovelace",
        "idToken": format!("id-token-{uid}"),
        "refreshToken": format!("refresh-token-{uid}"),
        "expiresIn": expiresIn
    })
    .to_string()
}

pub fn documents_path(rest: &str) -> String {
    format!("/projects/{PROJECT_ID}/databases/(default)/documents/{rest}")
}
