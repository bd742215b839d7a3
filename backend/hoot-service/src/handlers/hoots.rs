/// Hoot handlers - HTTP endpoints for hoot and comment operations
use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::HootStore;
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{
    Comment, CreateCommentRequest, CreateHootRequest, Hoot, UpdateHootRequest, User,
};

const HOOT_NOT_FOUND: &str = "Hoot not found.";

/// Author field of a response: the full user object when expanded,
/// otherwise the bare hex id reference.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AuthorRef {
    Expanded(AuthorResponse),
    Reference(String),
}

#[derive(Debug, Serialize)]
pub struct AuthorResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
}

impl From<&User> for AuthorResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_hex(),
            username: user.username.clone(),
        }
    }
}

impl From<&AuthUser> for AuthorResponse {
    fn from(user: &AuthUser) -> Self {
        Self {
            id: user.id.to_hex(),
            username: user.username.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub author: AuthorRef,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl CommentResponse {
    fn new(comment: &Comment, author: AuthorRef) -> Self {
        Self {
            id: comment.id.to_hex(),
            author,
            text: comment.text.clone(),
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HootResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub author: AuthorRef,
    pub title: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub comments: Vec<CommentResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HootResponse {
    fn new(hoot: Hoot, author: AuthorRef, comments: Vec<CommentResponse>) -> Self {
        Self {
            id: hoot.id.to_hex(),
            author,
            title: hoot.title,
            text: hoot.text,
            category: hoot.category,
            comments,
            created_at: hoot.created_at,
            updated_at: hoot.updated_at,
        }
    }

    /// Shape `hoot` with `author`, leaving comment authors as id references.
    fn with_comment_refs(hoot: Hoot, author: AuthorRef) -> Self {
        let comments = hoot
            .comments
            .iter()
            .map(|c| CommentResponse::new(c, AuthorRef::Reference(c.author.to_hex())))
            .collect();
        Self::new(hoot, author, comments)
    }
}

/// Expanded author for `id`, falling back to the id reference when the
/// user record is gone.
fn expand_author(id: ObjectId, users: &HashMap<ObjectId, User>) -> AuthorRef {
    match users.get(&id) {
        Some(user) => AuthorRef::Expanded(user.into()),
        None => AuthorRef::Reference(id.to_hex()),
    }
}

/// An identifier no hoot can match is indistinguishable from an absent one.
fn parse_hoot_id(raw: &str) -> Result<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| not_found())
}

fn not_found() -> AppError {
    AppError::NotFound(HOOT_NOT_FOUND.to_string())
}

/// Create a new hoot
pub async fn create_hoot(
    store: web::Data<HootStore>,
    user: AuthUser,
    req: web::Json<CreateHootRequest>,
) -> Result<HttpResponse> {
    // author comes from the verified identity, never from the body
    let hoot = Hoot::new(req.into_inner(), user.id);
    store.insert(&hoot).await?;

    let author = AuthorRef::Expanded((&user).into());
    Ok(HttpResponse::Created().json(HootResponse::with_comment_refs(hoot, author)))
}

/// Get all hoots
pub async fn list_hoots(store: web::Data<HootStore>) -> Result<HttpResponse> {
    let hoots = store.find_all().await?;
    let users = store
        .find_users(hoots.iter().map(|h| h.author).collect())
        .await?;

    let body: Vec<HootResponse> = hoots
        .into_iter()
        .map(|hoot| {
            let author = expand_author(hoot.author, &users);
            HootResponse::with_comment_refs(hoot, author)
        })
        .collect();

    Ok(HttpResponse::Ok().json(body))
}

/// Get a specific hoot by id
pub async fn get_hoot(store: web::Data<HootStore>, path: web::Path<String>) -> Result<HttpResponse> {
    let id = parse_hoot_id(&path)?;
    let hoot = store.find_by_id(id).await?.ok_or_else(not_found)?;

    // expand the hoot's author and every comment author in one lookup
    let mut ids: Vec<ObjectId> = vec![hoot.author];
    ids.extend(hoot.comments.iter().map(|c| c.author));
    let users = store.find_users(ids).await?;

    let author = expand_author(hoot.author, &users);
    let comments = hoot
        .comments
        .iter()
        .map(|c| CommentResponse::new(c, expand_author(c.author, &users)))
        .collect();

    Ok(HttpResponse::Ok().json(HootResponse::new(hoot, author, comments)))
}

/// Update a hoot (owner only)
pub async fn update_hoot(
    store: web::Data<HootStore>,
    path: web::Path<String>,
    user: AuthUser,
    req: web::Json<UpdateHootRequest>,
) -> Result<HttpResponse> {
    let id = parse_hoot_id(&path)?;
    let hoot = store.find_by_id(id).await?.ok_or_else(not_found)?;

    if hoot.author != user.id {
        return Err(AppError::Forbidden);
    }

    let set = req.set_document();
    let updated = if set.is_empty() {
        hoot
    } else {
        store.update(id, set).await?.ok_or_else(not_found)?
    };

    // the response carries the requester's identity; the stored author is
    // untouched by the update
    let author = AuthorRef::Expanded((&user).into());
    Ok(HttpResponse::Ok().json(HootResponse::with_comment_refs(updated, author)))
}

/// Delete a hoot (owner only)
pub async fn delete_hoot(
    store: web::Data<HootStore>,
    path: web::Path<String>,
    user: AuthUser,
) -> Result<HttpResponse> {
    let id = parse_hoot_id(&path)?;
    let hoot = store.find_by_id(id).await?.ok_or_else(not_found)?;

    if hoot.author != user.id {
        return Err(AppError::Forbidden);
    }

    let deleted = store.delete(id).await?.ok_or_else(not_found)?;

    let author = AuthorRef::Reference(deleted.author.to_hex());
    Ok(HttpResponse::Ok().json(HootResponse::with_comment_refs(deleted, author)))
}

/// Add a comment to a hoot
pub async fn create_comment(
    store: web::Data<HootStore>,
    path: web::Path<String>,
    user: AuthUser,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    let id = parse_hoot_id(&path)?;
    let comment = Comment::new(req.into_inner().text, user.id);

    let hoot = store.push_comment(id, &comment).await?.ok_or_else(not_found)?;

    // the newly appended comment is the list's last element
    let new_comment = hoot
        .comments
        .last()
        .ok_or_else(|| AppError::Internal("comment list empty after append".to_string()))?;

    let author = AuthorRef::Expanded((&user).into());
    Ok(HttpResponse::Created().json(CommentResponse::new(new_comment, author)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateHootRequest;

    fn sample_hoot(author: ObjectId) -> Hoot {
        let mut hoot = Hoot::new(
            CreateHootRequest {
                title: "Night owls".to_string(),
                text: "Who else is up?".to_string(),
                category: None,
            },
            author,
        );
        hoot.comments.push(Comment::new("hoo".to_string(), ObjectId::new()));
        hoot
    }

    #[test]
    fn response_uses_hex_ids_and_camel_case_timestamps() {
        let author = ObjectId::new();
        let hoot = sample_hoot(author);
        let hoot_id = hoot.id;

        let resp = HootResponse::with_comment_refs(hoot, AuthorRef::Reference(author.to_hex()));
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["_id"], hoot_id.to_hex());
        assert_eq!(json["author"], author.to_hex());
        assert!(json["createdAt"].is_string());
        assert!(json["updatedAt"].is_string());
        assert!(json.get("category").is_none());
    }

    #[test]
    fn expanded_author_serializes_as_object() {
        let user = User {
            id: ObjectId::new(),
            username: "owlfred".to_string(),
        };
        let mut users = HashMap::new();
        users.insert(user.id, user.clone());

        let json = serde_json::to_value(expand_author(user.id, &users)).unwrap();
        assert_eq!(json["_id"], user.id.to_hex());
        assert_eq!(json["username"], "owlfred");
    }

    #[test]
    fn dangling_author_falls_back_to_reference() {
        let id = ObjectId::new();
        let json = serde_json::to_value(expand_author(id, &HashMap::new())).unwrap();
        assert_eq!(json, serde_json::Value::String(id.to_hex()));
    }

    #[test]
    fn comment_refs_keep_append_order() {
        let author = ObjectId::new();
        let mut hoot = sample_hoot(author);
        hoot.comments.push(Comment::new("hoo hoo".to_string(), author));

        let resp = HootResponse::with_comment_refs(hoot, AuthorRef::Reference(author.to_hex()));
        assert_eq!(resp.comments.len(), 2);
        assert_eq!(resp.comments[0].text, "hoo");
        assert_eq!(resp.comments[1].text, "hoo hoo");
    }

    #[test]
    fn malformed_hoot_id_reads_as_not_found() {
        assert!(matches!(
            parse_hoot_id("not-an-id"),
            Err(AppError::NotFound(_))
        ));
        assert!(parse_hoot_id(&ObjectId::new().to_hex()).is_ok());
    }
}
