use crate::comment::model::Comment;
use crate::database::DB_NAME;
use crate::utils::error::ApiError;
use futures_util::TryStreamExt;
use mongodb::bson::{DateTime, doc, oid::ObjectId};
use mongodb::{Client, Collection};

pub struct CommentService {
    collection: Collection<Comment>,
}

impl CommentService {
    pub fn new(client: &Client) -> Self {
        let collection = client.database(DB_NAME).collection::<Comment>("comments");
        CommentService { collection }
    }

    pub async fn add_comment(
        &self,
        post_id: ObjectId,
        author_id: ObjectId,
        content: String,
    ) -> Result<ObjectId, ApiError> {
        let comment = Comment {
            id: None,
            post_id,
            author_id,
            content,
            created_at: DateTime::now(),
        };

        let result = self
            .collection
            .insert_one(comment)
            .await
            .map_err(|e| ApiError::InternalServerError(format!("Failed to add comment: {}", e)))?;

        result.inserted_id.as_object_id().ok_or_else(|| {
            ApiError::InternalServerError("Failed to get inserted comment ID".to_string())
        })
    }

    pub async fn get_comment_by_id(
        &self,
        comment_id: &ObjectId,
    ) -> Result<Option<Comment>, ApiError> {
        self.collection
            .find_one(doc! { "_id": comment_id })
            .await
            .map_err(|e| ApiError::InternalServerError(format!("Failed to fetch comment: {}", e)))
    }

    /// Comments for one post, oldest first
    pub async fn get_comments_for_post(
        &self,
        post_id: &ObjectId,
    ) -> Result<Vec<Comment>, ApiError> {
        let cursor = self
            .collection
            .find(doc! { "post_id": post_id })
            .sort(doc! { "created_at": 1 })
            .await
            .map_err(|e| {
                ApiError::InternalServerError(format!("Failed to fetch comments: {}", e))
            })?;

        cursor.try_collect().await.map_err(|e| {
            ApiError::InternalServerError(format!("Failed to collect comments: {}", e))
        })
    }

    pub async fn delete_comment(&self, comment_id: &ObjectId) -> Result<bool, ApiError> {
        let result = self
            .collection
            .delete_one(doc! { "_id": comment_id })
            .await
            .map_err(|e| {
                ApiError::InternalServerError(format!("Failed to delete comment: {}", e))
            })?;

        Ok(result.deleted_count > 0)
    }

    /// Sweep every comment attached to a post; used when the post goes away
    pub async fn delete_comments_for_post(&self, post_id: &ObjectId) -> Result<u64, ApiError> {
        let result = self
            .collection
            .delete_many(doc! { "post_id": post_id })
            .await
            .map_err(|e| {
                ApiError::InternalServerError(format!("Failed to delete comments: {}", e))
            })?;

        Ok(result.deleted_count)
    }
}
