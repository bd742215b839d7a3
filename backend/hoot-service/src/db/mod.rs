//! Store access for hoots and author lookups.

use std::collections::HashMap;

use bson::{doc, oid::ObjectId, Document};
use futures::TryStreamExt;
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};

use crate::error::Result;
use crate::models::{Comment, Hoot, User};

/// Handle over the `hoots` and `users` collections.
///
/// Created once at startup and cloned into application data; the driver
/// pools connections underneath, so clones are cheap and safe to share
/// across handlers.
#[derive(Clone)]
pub struct HootStore {
    hoots: Collection<Hoot>,
    users: Collection<User>,
}

impl HootStore {
    pub fn new(db: &Database) -> Self {
        Self {
            hoots: db.collection("hoots"),
            users: db.collection("users"),
        }
    }

    pub async fn insert(&self, hoot: &Hoot) -> Result<()> {
        self.hoots.insert_one(hoot).await?;
        Ok(())
    }

    /// All hoots, in store-default order.
    pub async fn find_all(&self) -> Result<Vec<Hoot>> {
        let cursor = self.hoots.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_by_id(&self, id: ObjectId) -> Result<Option<Hoot>> {
        Ok(self.hoots.find_one(doc! { "_id": id }).await?)
    }

    /// Merge `set` into the hoot and return the post-update document.
    /// Refreshes `updatedAt` alongside the caller's fields.
    pub async fn update(&self, id: ObjectId, mut set: Document) -> Result<Option<Hoot>> {
        set.insert("updatedAt", bson::DateTime::now());
        Ok(self
            .hoots
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?)
    }

    /// Remove the hoot permanently, returning its last-known content.
    /// Embedded comments vanish with the parent.
    pub async fn delete(&self, id: ObjectId) -> Result<Option<Hoot>> {
        Ok(self.hoots.find_one_and_delete(doc! { "_id": id }).await?)
    }

    /// Append `comment` to the hoot's list and return the post-update
    /// document, or `None` when the hoot is gone.
    pub async fn push_comment(&self, id: ObjectId, comment: &Comment) -> Result<Option<Hoot>> {
        let comment = bson::to_bson(comment)?;
        Ok(self
            .hoots
            .find_one_and_update(
                doc! { "_id": id },
                doc! {
                    "$push": { "comments": comment },
                    "$set": { "updatedAt": bson::DateTime::now() },
                },
            )
            .return_document(ReturnDocument::After)
            .await?)
    }

    /// Batch-fetch users for author expansion, keyed by id.
    pub async fn find_users(&self, ids: Vec<ObjectId>) -> Result<HashMap<ObjectId, User>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut cursor = self.users.find(doc! { "_id": { "$in": ids } }).await?;
        let mut users = HashMap::new();
        while let Some(user) = cursor.try_next().await? {
            users.insert(user.id, user);
        }
        Ok(users)
    }
}
