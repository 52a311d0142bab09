use std::sync::Arc;

use blog_types::{Post, PostDraft};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::auth::Session;
use crate::config::FirebaseConfig;
use crate::error::{check_response, decode_error, FirebaseError};
use crate::value::{decode_fields, encode_fields, timestamp_value};

pub const POSTS_COLLECTION: &str = "posts";

const PAGE_SIZE: &str = "100";

struct FirestoreInner {
    http: reqwest::Client,
    api_key: String,
    documents_url: String,
}

/// Client for the Firestore REST API, scoped to the project's default database.
#[derive(Clone)]
pub struct Firestore {
    inner: Arc<FirestoreInner>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
    create_time: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

impl Document {
    fn into_post(self) -> Result<Post, FirebaseError> {
        let decoded = decode_fields(&self.fields)?;
        let mut post: Post = serde_json::from_value(decoded)
            .map_err(|e| decode_error(format!("document {}: {e}", self.name)))?;
        post.id = self
            .name
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        if post.created_at.is_empty() {
            post.created_at = self.create_time.unwrap_or_default();
        }
        Ok(post)
    }
}

/// Document ids are a single path segment.
fn is_valid_document_id(id: &str) -> bool {
    !id.is_empty() && !id.contains('/') && id != "." && id != ".."
}

impl Firestore {
    pub fn new(http: reqwest::Client, config: &FirebaseConfig) -> Self {
        let documents_url = format!(
            "{}/projects/{}/databases/(default)/documents",
            config.endpoints.firestore.trim_end_matches('/'),
            config.project_id
        );
        Self {
            inner: Arc::new(FirestoreInner {
                http,
                api_key: config.api_key.clone(),
                documents_url,
            }),
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{collection}", self.inner.documents_url)
    }

    /// All posts, newest first.
    pub async fn list_posts(&self) -> Result<Vec<Post>, FirebaseError> {
        let mut posts = Vec::new();
        let mut pageToken: Option<String> = None;

        loop {
            let mut request = self
                .inner
                .http
                .get(self.collection_url(POSTS_COLLECTION))
                .query(&[
                    ("key", self.inner.api_key.as_str()),
                    ("orderBy", "createdAt desc"),
                    ("pageSize", PAGE_SIZE),
                ]);
            if let Some(token) = &pageToken {
                request = request.query(&[("pageToken", token)]);
            }

            let page: ListDocumentsResponse = check_response(request.send().await?)
                .await?
                .json()
                .await
                .map_err(decode_error)?;
            for document in page.documents {
                posts.push(document.into_post()?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => pageToken = Some(token),
                _ => break,
            }
        }

        debug!("listed {} posts", posts.len());
        Ok(posts)
    }

    /// `Ok(None)` when no such post exists.
    pub async fn get_post(&self, id: &str) -> Result<Option<Post>, FirebaseError> {
        if !is_valid_document_id(id) {
            return Ok(None);
        }

        let response = self
            .inner
            .http
            .get(format!("{}/{id}", self.collection_url(POSTS_COLLECTION)))
            .query(&[("key", &self.inner.api_key)])
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document: Document = check_response(response)
            .await?
            .json()
            .await
            .map_err(decode_error)?;
        document.into_post().map(Some)
    }

    /// Stores a new post authored by `session`'s user. The server assigns the id.
    pub async fn create_post(
        &self,
        draft: &PostDraft,
        session: &Session,
    ) -> Result<Post, FirebaseError> {
        draft.validate().map_err(FirebaseError::InvalidInput)?;

        let plain = serde_json::json!({
            "title": draft.title.trim(),
            "content": draft.content,
            "authorName": session.user.label(),
            "authorId": session.user.uid,
        });
        let mut fields = match plain {
            Value::Object(map) => encode_fields(&map),
            _ => Map::new(),
        };
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        fields.insert("createdAt".into(), timestamp_value(&now));

        let response = self
            .inner
            .http
            .post(self.collection_url(POSTS_COLLECTION))
            .query(&[("key", &self.inner.api_key)])
            .bearer_auth(&session.credentials.id_token)
            .json(&serde_json::json!({ "fields": fields }))
            .send()
            .await?;
        let document: Document = check_response(response)
            .await?
            .json()
            .await
            .map_err(decode_error)?;
        document.into_post()
    }

    pub async fn delete_post(&self, id: &str, session: &Session) -> Result<(), FirebaseError> {
        if !is_valid_document_id(id) {
            return Err(FirebaseError::InvalidInput(format!("bad post id {id:?}")));
        }

        let response = self
            .inner
            .http
            .delete(format!("{}/{id}", self.collection_url(POSTS_COLLECTION)))
            .query(&[("key", &self.inner.api_key)])
            .bearer_auth(&session.credentials.id_token)
            .send()
            .await?;
        check_response(response).await?;
        Ok(())
    }
}
