use crate::comment::model::{CommentView, CreateCommentRequest};
use crate::comment::service::CommentService;
use crate::database::RedisService;
use crate::middleware::auth::{Claims, authenticate};
use crate::post::post_model::{
    CreatePostRequest, HotPostView, Post, PostDetailView, PostView, ReportOutcome,
    UpdatePostRequest,
};
use crate::post::post_service::PostService;
use crate::user::model::Role;
use crate::user::service::UserService;
use crate::utils::error::ApiError;
use crate::view_log::service::ViewLogService;
use actix_web::{HttpResponse, web};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

#[derive(Deserialize)]
pub struct ListPostsQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub hot: Option<bool>,
}

#[derive(Deserialize)]
pub struct ViewerQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

fn can_modify(claims: &Claims, author_id: &ObjectId) -> bool {
    claims.id == author_id.to_hex() || Role::parse(&claims.role).unwrap_or_default().is_staff()
}

fn claims_user_id(claims: &Claims) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(&claims.id)
        .map_err(|_| ApiError::BadRequestError("Invalid user id in token".into()))
}

/// Resolve comments and usernames for a single post
async fn build_detail(
    post: &Post,
    comment_service: &CommentService,
    user_service: &UserService,
) -> Result<PostDetailView, ApiError> {
    let post_id = post
        .id
        .ok_or_else(|| ApiError::InternalServerError("Post ID missing".into()))?;

    let comments = comment_service.get_comments_for_post(&post_id).await?;

    let mut author_ids: Vec<ObjectId> = comments.iter().map(|c| c.author_id).collect();
    author_ids.push(post.author_id);
    let usernames = user_service.usernames_for(&author_ids).await?;

    let comment_views = comments
        .iter()
        .map(|c| CommentView::new(c, usernames.get(&c.author_id)))
        .collect();

    Ok(PostDetailView {
        post: PostView::new(post, usernames.get(&post.author_id)),
        comments: comment_views,
    })
}

async fn hot_posts(
    post_service: &PostService,
    user_service: &UserService,
    view_log_service: &ViewLogService,
) -> Result<Vec<HotPostView>, ApiError> {
    let scores = view_log_service.hot_posts().await?;

    let ids: Vec<ObjectId> = scores.iter().map(|s| s.post_id).collect();
    let posts = post_service.find_by_ids(&ids).await?;
    let by_id: HashMap<ObjectId, &Post> =
        posts.iter().filter_map(|p| p.id.map(|id| (id, p))).collect();

    let author_ids: Vec<ObjectId> = posts.iter().map(|p| p.author_id).collect();
    let usernames = user_service.usernames_for(&author_ids).await?;

    // A post deleted since its last view still has log entries; skip it
    Ok(scores
        .iter()
        .filter_map(|s| by_id.get(&s.post_id).map(|p| (p, s.score)))
        .map(|(post, score)| HotPostView::new(post, usernames.get(&post.author_id), score))
        .collect())
}

pub async fn list_posts(
    post_service: web::Data<PostService>,
    user_service: web::Data<UserService>,
    view_log_service: web::Data<ViewLogService>,
    query: web::Query<ListPostsQuery>,
) -> Result<HttpResponse, ApiError> {
    if query.hot.unwrap_or(false) {
        let data = hot_posts(&post_service, &user_service, &view_log_service).await?;
        return Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Hot posts retrieved successfully",
            "httpStatusCode": 200,
            "count": data.len(),
            "data": data
        })));
    }

    let author_id = match &query.user_id {
        Some(raw) => Some(
            ObjectId::parse_str(raw)
                .map_err(|_| ApiError::BadRequestError("Invalid user ID".into()))?,
        ),
        None => None,
    };

    let posts = post_service.list_posts(author_id).await?;

    let author_ids: Vec<ObjectId> = posts.iter().map(|p| p.author_id).collect();
    let usernames = user_service.usernames_for(&author_ids).await?;

    let data: Vec<PostView> = posts
        .iter()
        .map(|p| PostView::new(p, usernames.get(&p.author_id)))
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Posts retrieved successfully",
        "httpStatusCode": 200,
        "count": data.len(),
        "data": data
    })))
}

/// Moderation queue: posts carrying at least one report
pub async fn reported_posts(
    credentials: BearerAuth,
    post_service: web::Data<PostService>,
    user_service: web::Data<UserService>,
    redis_service: Option<web::Data<RedisService>>,
) -> Result<HttpResponse, ApiError> {
    let claims = authenticate(&credentials, redis_service.as_ref().map(|d| d.get_ref())).await?;

    if !Role::parse(&claims.role).unwrap_or_default().is_staff() {
        return Err(ApiError::ForbiddenError("Moderator role required".into()));
    }

    let posts = post_service.reported_posts().await?;

    let author_ids: Vec<ObjectId> = posts.iter().map(|p| p.author_id).collect();
    let usernames = user_service.usernames_for(&author_ids).await?;

    let data: Vec<PostView> = posts
        .iter()
        .map(|p| PostView::new(p, usernames.get(&p.author_id)))
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Reported posts retrieved successfully",
        "httpStatusCode": 200,
        "count": data.len(),
        "data": data
    })))
}

pub async fn get_post(
    post_service: web::Data<PostService>,
    comment_service: web::Data<CommentService>,
    user_service: web::Data<UserService>,
    view_log_service: web::Data<ViewLogService>,
    path: web::Path<String>,
    query: web::Query<ViewerQuery>,
) -> Result<HttpResponse, ApiError> {
    let post_id = ObjectId::parse_str(path.into_inner())
        .map_err(|_| ApiError::BadRequestError("Invalid post ID".into()))?;

    let post = post_service
        .get_post(&post_id)
        .await?
        .ok_or_else(|| ApiError::NotFoundError("Post not found".into()))?;

    // Views count toward the hot ranking only for identified readers
    // other than the author. A failed write must not block the read.
    if let Some(raw) = &query.user_id {
        if let Ok(viewer) = ObjectId::parse_str(raw) {
            if viewer != post.author_id {
                if let Err(e) = view_log_service.record_view(post_id).await {
                    log::warn!("Failed to record view for post {}: {}", post_id, e);
                }
            }
        }
    }

    let detail = build_detail(&post, &comment_service, &user_service).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post retrieved successfully",
        "httpStatusCode": 200,
        "data": detail
    })))
}

pub async fn create_post(
    credentials: BearerAuth,
    post_service: web::Data<PostService>,
    user_service: web::Data<UserService>,
    redis_service: Option<web::Data<RedisService>>,
    body: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, ApiError> {
    let claims = authenticate(&credentials, redis_service.as_ref().map(|d| d.get_ref())).await?;
    let author_id = claims_user_id(&claims)?;

    let request = body.into_inner();
    if request.title.trim().is_empty()
        || request.content.trim().is_empty()
        || request.category.trim().is_empty()
    {
        return Err(ApiError::ValidationError(
            "Title, content and category are required".into(),
        ));
    }

    let post = post_service.create_post(author_id, request).await?;
    let usernames = user_service.usernames_for(&[post.author_id]).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Post created successfully",
        "httpStatusCode": 201,
        "post": PostView::new(&post, usernames.get(&post.author_id))
    })))
}

pub async fn update_post(
    credentials: BearerAuth,
    post_service: web::Data<PostService>,
    user_service: web::Data<UserService>,
    redis_service: Option<web::Data<RedisService>>,
    path: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse, ApiError> {
    let claims = authenticate(&credentials, redis_service.as_ref().map(|d| d.get_ref())).await?;

    let post_id = ObjectId::parse_str(path.into_inner())
        .map_err(|_| ApiError::BadRequestError("Invalid post ID".into()))?;

    let post = post_service
        .get_post(&post_id)
        .await?
        .ok_or_else(|| ApiError::NotFoundError("Post not found".into()))?;

    if !can_modify(&claims, &post.author_id) {
        return Err(ApiError::ForbiddenError(
            "You can only edit your own posts".into(),
        ));
    }

    let updated = post_service.update_post(&post_id, body.into_inner()).await?;
    let usernames = user_service.usernames_for(&[updated.author_id]).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post updated successfully",
        "httpStatusCode": 200,
        "post": PostView::new(&updated, usernames.get(&updated.author_id))
    })))
}

pub async fn delete_post(
    credentials: BearerAuth,
    post_service: web::Data<PostService>,
    comment_service: web::Data<CommentService>,
    view_log_service: web::Data<ViewLogService>,
    redis_service: Option<web::Data<RedisService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let claims = authenticate(&credentials, redis_service.as_ref().map(|d| d.get_ref())).await?;

    let post_id = ObjectId::parse_str(path.into_inner())
        .map_err(|_| ApiError::BadRequestError("Invalid post ID".into()))?;

    let post = post_service
        .get_post(&post_id)
        .await?
        .ok_or_else(|| ApiError::NotFoundError("Post not found".into()))?;

    if !can_modify(&claims, &post.author_id) {
        return Err(ApiError::ForbiddenError(
            "You can only delete your own posts".into(),
        ));
    }

    comment_service.delete_comments_for_post(&post_id).await?;
    view_log_service.delete_for_post(&post_id).await?;
    post_service.delete_post(&post_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post deleted successfully",
        "httpStatusCode": 200
    })))
}

pub async fn report_post(
    credentials: BearerAuth,
    post_service: web::Data<PostService>,
    comment_service: web::Data<CommentService>,
    view_log_service: web::Data<ViewLogService>,
    redis_service: Option<web::Data<RedisService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let claims = authenticate(&credentials, redis_service.as_ref().map(|d| d.get_ref())).await?;
    let reporter = claims_user_id(&claims)?;

    let post_id = ObjectId::parse_str(path.into_inner())
        .map_err(|_| ApiError::BadRequestError("Invalid post ID".into()))?;

    let mut post = post_service
        .get_post(&post_id)
        .await?
        .ok_or_else(|| ApiError::NotFoundError("Post not found".into()))?;

    let message = match post.register_report(reporter) {
        ReportOutcome::AlreadyReported => "You have already reported this post",
        ReportOutcome::Recorded => {
            post_service.save_reports(&post).await?;
            "Report submitted successfully"
        }
        ReportOutcome::ThresholdExceeded => {
            comment_service.delete_comments_for_post(&post_id).await?;
            view_log_service.delete_for_post(&post_id).await?;
            post_service.delete_post(&post_id).await?;
            log::warn!("Post {} deleted after exceeding report threshold", post_id);
            "Post deleted due to excessive reports"
        }
    };

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": message,
        "httpStatusCode": 200
    })))
}

enum Vote {
    Like,
    Dislike,
}

async fn toggle_vote(
    credentials: BearerAuth,
    post_service: &PostService,
    user_service: &UserService,
    redis_service: Option<&RedisService>,
    raw_post_id: String,
    vote: Vote,
) -> Result<HttpResponse, ApiError> {
    let claims = authenticate(&credentials, redis_service).await?;
    let user_id = claims_user_id(&claims)?;

    let post_id = ObjectId::parse_str(raw_post_id)
        .map_err(|_| ApiError::BadRequestError("Invalid post ID".into()))?;

    let mut post = post_service
        .get_post(&post_id)
        .await?
        .ok_or_else(|| ApiError::NotFoundError("Post not found".into()))?;

    match vote {
        Vote::Like => post.toggle_like(user_id),
        Vote::Dislike => post.toggle_dislike(user_id),
    }

    post_service.save_votes(&post).await?;
    let usernames = user_service.usernames_for(&[post.author_id]).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post updated",
        "httpStatusCode": 200,
        "post": PostView::new(&post, usernames.get(&post.author_id))
    })))
}

pub async fn toggle_like(
    credentials: BearerAuth,
    post_service: web::Data<PostService>,
    user_service: web::Data<UserService>,
    redis_service: Option<web::Data<RedisService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    toggle_vote(
        credentials,
        &post_service,
        &user_service,
        redis_service.as_ref().map(|d| d.get_ref()),
        path.into_inner(),
        Vote::Like,
    )
    .await
}

pub async fn toggle_dislike(
    credentials: BearerAuth,
    post_service: web::Data<PostService>,
    user_service: web::Data<UserService>,
    redis_service: Option<web::Data<RedisService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    toggle_vote(
        credentials,
        &post_service,
        &user_service,
        redis_service.as_ref().map(|d| d.get_ref()),
        path.into_inner(),
        Vote::Dislike,
    )
    .await
}

pub async fn add_comment(
    credentials: BearerAuth,
    post_service: web::Data<PostService>,
    comment_service: web::Data<CommentService>,
    user_service: web::Data<UserService>,
    redis_service: Option<web::Data<RedisService>>,
    path: web::Path<String>,
    body: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, ApiError> {
    let claims = authenticate(&credentials, redis_service.as_ref().map(|d| d.get_ref())).await?;
    let author_id = claims_user_id(&claims)?;

    let post_id = ObjectId::parse_str(path.into_inner())
        .map_err(|_| ApiError::BadRequestError("Invalid post ID".into()))?;

    if body.content.trim().is_empty() {
        return Err(ApiError::BadRequestError(
            "Comment content cannot be empty".into(),
        ));
    }

    let post = post_service
        .get_post(&post_id)
        .await?
        .ok_or_else(|| ApiError::NotFoundError("Post not found".into()))?;

    let comment_id = comment_service
        .add_comment(post_id, author_id, body.content.clone())
        .await?;
    post_service.push_comment(&post_id, &comment_id).await?;

    // Re-read so the response carries the comment that was just attached
    let post = post_service.get_post(&post_id).await?.unwrap_or(post);
    let detail = build_detail(&post, &comment_service, &user_service).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Comment created successfully",
        "httpStatusCode": 201,
        "data": detail
    })))
}

pub async fn remove_comment(
    credentials: BearerAuth,
    post_service: web::Data<PostService>,
    comment_service: web::Data<CommentService>,
    user_service: web::Data<UserService>,
    redis_service: Option<web::Data<RedisService>>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let claims = authenticate(&credentials, redis_service.as_ref().map(|d| d.get_ref())).await?;

    let (raw_post_id, raw_comment_id) = path.into_inner();
    let post_id = ObjectId::parse_str(raw_post_id)
        .map_err(|_| ApiError::BadRequestError("Invalid post ID".into()))?;
    let comment_id = ObjectId::parse_str(raw_comment_id)
        .map_err(|_| ApiError::BadRequestError("Invalid comment ID".into()))?;

    let comment = comment_service
        .get_comment_by_id(&comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFoundError("Comment not found".into()))?;

    if comment.post_id != post_id {
        return Err(ApiError::BadRequestError(
            "Comment does not belong to this post".into(),
        ));
    }

    if !can_modify(&claims, &comment.author_id) {
        return Err(ApiError::ForbiddenError(
            "You can only delete your own comments".into(),
        ));
    }

    comment_service.delete_comment(&comment_id).await?;
    post_service.pull_comment(&post_id, &comment_id).await?;

    let post = post_service
        .get_post(&post_id)
        .await?
        .ok_or_else(|| ApiError::NotFoundError("Post not found".into()))?;
    let detail = build_detail(&post, &comment_service, &user_service).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comment deleted successfully",
        "httpStatusCode": 200,
        "data": detail
    })))
}
