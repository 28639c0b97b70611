use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub post_id: ObjectId,
    pub author_id: ObjectId,
    pub content: String,
    pub created_at: DateTime,
}

#[derive(Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: String,
    pub content: String,
    pub author: AuthorView,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct AuthorView {
    pub id: String,
    pub username: String,
}

impl CommentView {
    pub fn new(comment: &Comment, author_username: Option<&String>) -> Self {
        CommentView {
            id: comment.id.map(|id| id.to_hex()).unwrap_or_default(),
            content: comment.content.clone(),
            author: AuthorView {
                id: comment.author_id.to_hex(),
                username: author_username
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
            },
            created_at: comment
                .created_at
                .try_to_rfc3339_string()
                .unwrap_or_default(),
        }
    }
}
