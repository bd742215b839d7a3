//! Document models for hoots and their embedded comments.
//!
//! Hoots live in the `hoots` collection with comments embedded as an
//! ordered array. Users are owned by the auth subsystem; this service only
//! reads the `users` collection to expand author references.

use bson::oid::ObjectId;
use bson::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user, as referenced by hoots and comments. Extra fields held by the
/// auth subsystem are ignored on read.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub username: String,
}

/// A reply embedded in its parent hoot. No independent lifecycle: comments
/// are appended through the parent and vanish with it.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub author: ObjectId,
    pub text: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(text: String, author: ObjectId) -> Self {
        Self {
            id: ObjectId::new(),
            author,
            text,
            created_at: Utc::now(),
        }
    }
}

/// A user-authored post.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Hoot {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Set once at creation from the verified identity, immutable after.
    pub author: ObjectId,
    pub title: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Hoot {
    pub fn new(req: CreateHootRequest, author: ObjectId) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            author,
            title: req.title,
            text: req.text,
            category: req.category,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request body for creating a hoot. There is no author field here: the
/// author always comes from the verified identity.
#[derive(Debug, Deserialize)]
pub struct CreateHootRequest {
    pub title: String,
    pub text: String,
    pub category: Option<String>,
}

/// Owner-mutable fields of a hoot. Anything else in the body, including an
/// attempted author change, never reaches the store.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateHootRequest {
    pub title: Option<String>,
    pub text: Option<String>,
    pub category: Option<String>,
}

impl UpdateHootRequest {
    /// The fields present in the body, as a `$set` document.
    pub fn set_document(&self) -> Document {
        let mut set = Document::new();
        if let Some(title) = &self.title {
            set.insert("title", title.as_str());
        }
        if let Some(text) = &self.text {
            set.insert("text", text.as_str());
        }
        if let Some(category) = &self.category {
            set.insert("category", category.as_str());
        }
        set
    }
}

/// Request body for commenting on a hoot.
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
}
