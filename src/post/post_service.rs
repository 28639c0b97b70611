use crate::post::post_model::{CreatePostRequest, Post, UpdatePostRequest};
use crate::utils::error::ApiError;
use crate::database::DB_NAME;
use futures_util::TryStreamExt;
use mongodb::bson::{DateTime, doc, oid::ObjectId, to_bson};
use mongodb::{Client, Collection};

pub struct PostService {
    collection: Collection<Post>,
}

impl PostService {
    pub fn new(client: &Client) -> Self {
        let collection = client.database(DB_NAME).collection::<Post>("posts");
        PostService { collection }
    }

    pub async fn create_post(
        &self,
        author_id: ObjectId,
        request: CreatePostRequest,
    ) -> Result<Post, ApiError> {
        let mut post = Post {
            id: None,
            title: request.title,
            content: request.content,
            category: request.category,
            author_id,
            image: request.image,
            likes: Vec::new(),
            dislikes: Vec::new(),
            reports: Vec::new(),
            comments: Vec::new(),
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
        };

        let result = self
            .collection
            .insert_one(&post)
            .await
            .map_err(|_| ApiError::InternalServerError("Failed to create post".into()))?;

        post.id = result.inserted_id.as_object_id();
        Ok(post)
    }

    /// All posts, newest first; optionally restricted to one author
    pub async fn list_posts(&self, author_id: Option<ObjectId>) -> Result<Vec<Post>, ApiError> {
        let filter = match author_id {
            Some(author) => doc! { "author_id": author },
            None => doc! {},
        };

        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .await
            .map_err(|_| ApiError::InternalServerError("Failed to fetch posts".into()))?;

        cursor
            .try_collect()
            .await
            .map_err(|_| ApiError::InternalServerError("Failed to collect posts".into()))
    }

    /// Posts with at least one standing report
    pub async fn reported_posts(&self) -> Result<Vec<Post>, ApiError> {
        let cursor = self
            .collection
            .find(doc! { "reports.0": { "$exists": true } })
            .sort(doc! { "created_at": -1 })
            .await
            .map_err(|_| ApiError::InternalServerError("Failed to fetch reported posts".into()))?;

        cursor
            .try_collect()
            .await
            .map_err(|_| ApiError::InternalServerError("Failed to collect reported posts".into()))
    }

    pub async fn get_post(&self, id: &ObjectId) -> Result<Option<Post>, ApiError> {
        self.collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|_| ApiError::InternalServerError("Failed to fetch post".into()))
    }

    pub async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Post>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let cursor = self
            .collection
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await
            .map_err(|_| ApiError::InternalServerError("Failed to fetch posts".into()))?;

        cursor
            .try_collect()
            .await
            .map_err(|_| ApiError::InternalServerError("Failed to collect posts".into()))
    }

    pub async fn update_post(
        &self,
        id: &ObjectId,
        request: UpdatePostRequest,
    ) -> Result<Post, ApiError> {
        let mut set = doc! { "updated_at": DateTime::now() };

        if let Some(title) = request.title {
            set.insert("title", title);
        }
        if let Some(content) = request.content {
            set.insert("content", content);
        }
        if let Some(category) = request.category {
            set.insert("category", category);
        }
        if let Some(image) = request.image {
            set.insert("image", image);
        }

        self.collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(mongodb::options::ReturnDocument::After)
            .await
            .map_err(|_| ApiError::InternalServerError("Failed to update post".into()))?
            .ok_or_else(|| ApiError::NotFoundError("Post not found".into()))
    }

    pub async fn delete_post(&self, id: &ObjectId) -> Result<bool, ApiError> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|_| ApiError::InternalServerError("Failed to delete post".into()))?;

        Ok(result.deleted_count > 0)
    }

    /// Persist the in-memory like/dislike sets after a toggle
    pub async fn save_votes(&self, post: &Post) -> Result<(), ApiError> {
        let id = post
            .id
            .ok_or_else(|| ApiError::InternalServerError("Post ID missing".into()))?;
        let likes = to_bson(&post.likes)
            .map_err(|e| ApiError::InternalServerError(e.to_string()))?;
        let dislikes = to_bson(&post.dislikes)
            .map_err(|e| ApiError::InternalServerError(e.to_string()))?;

        self.collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "likes": likes, "dislikes": dislikes } },
            )
            .await
            .map_err(|_| ApiError::InternalServerError("Failed to update votes".into()))?;

        Ok(())
    }

    pub async fn save_reports(&self, post: &Post) -> Result<(), ApiError> {
        let id = post
            .id
            .ok_or_else(|| ApiError::InternalServerError("Post ID missing".into()))?;
        let reports = to_bson(&post.reports)
            .map_err(|e| ApiError::InternalServerError(e.to_string()))?;

        self.collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "reports": reports } },
            )
            .await
            .map_err(|_| ApiError::InternalServerError("Failed to update reports".into()))?;

        Ok(())
    }

    pub async fn push_comment(
        &self,
        post_id: &ObjectId,
        comment_id: &ObjectId,
    ) -> Result<(), ApiError> {
        self.collection
            .update_one(
                doc! { "_id": post_id },
                doc! { "$push": { "comments": comment_id } },
            )
            .await
            .map_err(|_| ApiError::InternalServerError("Failed to attach comment".into()))?;

        Ok(())
    }

    pub async fn pull_comment(
        &self,
        post_id: &ObjectId,
        comment_id: &ObjectId,
    ) -> Result<(), ApiError> {
        self.collection
            .update_one(
                doc! { "_id": post_id },
                doc! { "$pull": { "comments": comment_id } },
            )
            .await
            .map_err(|_| ApiError::InternalServerError("Failed to detach comment".into()))?;

        Ok(())
    }
}
