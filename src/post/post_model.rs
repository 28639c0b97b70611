use crate::comment::model::{AuthorView, CommentView};
use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// A post is deleted once strictly more than this many distinct users
/// have reported it.
pub const REPORT_THRESHOLD: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub content: String,
    pub category: String,
    pub author_id: ObjectId,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub likes: Vec<ObjectId>,
    #[serde(default)]
    pub dislikes: Vec<ObjectId>,
    #[serde(default)]
    pub reports: Vec<ObjectId>,
    #[serde(default)]
    pub comments: Vec<ObjectId>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ReportOutcome {
    AlreadyReported,
    Recorded,
    ThresholdExceeded,
}

impl Post {
    /// Flip the user's like. A user sits in at most one of the two vote
    /// sets, so liking always clears an existing dislike first.
    pub fn toggle_like(&mut self, user_id: ObjectId) {
        if self.likes.contains(&user_id) {
            self.likes.retain(|id| *id != user_id);
        } else {
            self.dislikes.retain(|id| *id != user_id);
            self.likes.push(user_id);
        }
    }

    pub fn toggle_dislike(&mut self, user_id: ObjectId) {
        if self.dislikes.contains(&user_id) {
            self.dislikes.retain(|id| *id != user_id);
        } else {
            self.likes.retain(|id| *id != user_id);
            self.dislikes.push(user_id);
        }
    }

    /// Count a report from `reporter`. Each reporter counts once; crossing
    /// the threshold means the post must be removed.
    pub fn register_report(&mut self, reporter: ObjectId) -> ReportOutcome {
        if self.reports.contains(&reporter) {
            return ReportOutcome::AlreadyReported;
        }

        self.reports.push(reporter);

        if self.reports.len() > REPORT_THRESHOLD {
            ReportOutcome::ThresholdExceeded
        } else {
            ReportOutcome::Recorded
        }
    }
}

#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub category: String,
    pub image: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub author: AuthorView,
    pub image: Option<String>,
    pub likes: Vec<String>,
    pub dislikes: Vec<String>,
    pub report_count: usize,
    pub comment_count: usize,
    pub created_at: String,
    pub updated_at: String,
}

impl PostView {
    pub fn new(post: &Post, author_username: Option<&String>) -> Self {
        PostView {
            id: post.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: post.title.clone(),
            content: post.content.clone(),
            category: post.category.clone(),
            author: AuthorView {
                id: post.author_id.to_hex(),
                username: author_username
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
            },
            image: post.image.clone(),
            likes: post.likes.iter().map(|id| id.to_hex()).collect(),
            dislikes: post.dislikes.iter().map(|id| id.to_hex()).collect(),
            report_count: post.reports.len(),
            comment_count: post.comments.len(),
            created_at: post.created_at.try_to_rfc3339_string().unwrap_or_default(),
            updated_at: post.updated_at.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostDetailView {
    #[serde(flatten)]
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

/// Entry in the hot-posts ribbon
#[derive(Debug, Serialize)]
pub struct HotPostView {
    pub id: String,
    pub title: String,
    pub category: String,
    pub author: AuthorView,
    pub image: Option<String>,
    pub score: i64,
}

impl HotPostView {
    pub fn new(post: &Post, author_username: Option<&String>, score: i64) -> Self {
        HotPostView {
            id: post.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: post.title.clone(),
            category: post.category.clone(),
            author: AuthorView {
                id: post.author_id.to_hex(),
                username: author_username
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
            },
            image: post.image.clone(),
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Post, REPORT_THRESHOLD, ReportOutcome};
    use mongodb::bson::{DateTime, oid::ObjectId};

    fn sample_post() -> Post {
        Post {
            id: Some(ObjectId::new()),
            title: "title".to_string(),
            content: "content".to_string(),
            category: "general".to_string(),
            author_id: ObjectId::new(),
            image: None,
            likes: Vec::new(),
            dislikes: Vec::new(),
            reports: Vec::new(),
            comments: Vec::new(),
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
        }
    }

    #[test]
    fn like_clears_existing_dislike() {
        let mut post = sample_post();
        let user = ObjectId::new();

        post.toggle_dislike(user);
        assert!(post.dislikes.contains(&user));

        post.toggle_like(user);
        assert!(post.likes.contains(&user));
        assert!(!post.dislikes.contains(&user));
    }

    #[test]
    fn dislike_clears_existing_like() {
        let mut post = sample_post();
        let user = ObjectId::new();

        post.toggle_like(user);
        post.toggle_dislike(user);

        assert!(post.dislikes.contains(&user));
        assert!(!post.likes.contains(&user));
    }

    #[test]
    fn toggling_twice_restores_initial_state() {
        let mut post = sample_post();
        let user = ObjectId::new();

        post.toggle_like(user);
        post.toggle_like(user);
        assert!(post.likes.is_empty());
        assert!(post.dislikes.is_empty());

        post.toggle_dislike(user);
        post.toggle_dislike(user);
        assert!(post.likes.is_empty());
        assert!(post.dislikes.is_empty());
    }

    #[test]
    fn votes_from_other_users_are_untouched() {
        let mut post = sample_post();
        let first = ObjectId::new();
        let second = ObjectId::new();

        post.toggle_like(first);
        post.toggle_dislike(second);
        post.toggle_like(second);

        assert!(post.likes.contains(&first));
        assert!(post.likes.contains(&second));
        assert!(post.dislikes.is_empty());
    }

    #[test]
    fn report_threshold_triggers_removal() {
        let mut post = sample_post();

        for _ in 0..REPORT_THRESHOLD {
            assert_eq!(
                post.register_report(ObjectId::new()),
                ReportOutcome::Recorded
            );
        }

        assert_eq!(
            post.register_report(ObjectId::new()),
            ReportOutcome::ThresholdExceeded
        );
    }

    #[test]
    fn repeat_reporter_does_not_count_twice() {
        let mut post = sample_post();
        let reporter = ObjectId::new();

        assert_eq!(post.register_report(reporter), ReportOutcome::Recorded);
        assert_eq!(
            post.register_report(reporter),
            ReportOutcome::AlreadyReported
        );
        assert_eq!(post.reports.len(), 1);
    }
}
