use serde::{Deserialize, Serialize};

/// A blog post as stored in the `posts` collection.
///
/// `id` is not a stored field; it is the last segment of the document name and
/// is filled in after decoding.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_id: String,
    #[serde(default)]
    pub created_at: String,
}

/// What a signed-in author submits. Author fields and the timestamp are
/// attached server side from the current session.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
}

impl PostDraft {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".into());
        }
        if self.content.trim().is_empty() {
            return Err("content must not be empty".into());
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}
