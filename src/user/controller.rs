use crate::database::RedisService;
use crate::middleware::auth::{
    authenticate, create_token, create_token_with_session, invalidate_session,
};
use crate::user::model::{
    BanUserRequest, ModerationUserView, RegisterRequest, ReportUserRequest, Role,
    UpdateUserRequest, UserView,
};
use crate::user::service::UserService;
use crate::utils::error::ApiError;
use crate::utils::model::LoginRequest;
use actix_web::{HttpResponse, web};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use mongodb::bson::oid::ObjectId;
use serde_json::json;

pub async fn register_user(
    user_service: web::Data<UserService>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let user_id = user_service
        .create_user(body.username, body.email, body.password)
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "User created successfully",
        "httpStatusCode": 201,
        "user_id": user_id.to_hex()
    })))
}

pub async fn login_user(
    user_service: web::Data<UserService>,
    redis_service: Option<web::Data<RedisService>>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = user_service
        .authenticate_user(&body.username, &body.password)
        .await?;

    if user.is_banned {
        return Err(ApiError::ForbiddenError(
            "Your account has been banned".to_string(),
        ));
    }

    let user_id = user
        .id
        .ok_or_else(|| ApiError::InternalServerError("User ID missing".to_string()))?;

    let token = match redis_service.as_ref().map(|d| d.get_ref()) {
        Some(redis) => {
            create_token_with_session(&user_id.to_hex(), user.role.as_str(), redis).await?
        }
        None => create_token(&user_id.to_hex(), user.role.as_str())?,
    };

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Login successful",
        "httpStatusCode": 200,
        "token": token,
        "user": UserView::from(&user)
    })))
}

pub async fn logout_user(
    credentials: BearerAuth,
    redis_service: Option<web::Data<RedisService>>,
) -> Result<HttpResponse, ApiError> {
    let claims = authenticate(&credentials, redis_service.as_ref().map(|d| d.get_ref())).await?;

    if let Some(redis) = redis_service.as_ref().map(|d| d.get_ref()) {
        invalidate_session(&claims.id, redis).await?;
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Logged out successfully",
        "httpStatusCode": 200
    })))
}

/// Full user list for the moderation screen
pub async fn list_users(
    credentials: BearerAuth,
    user_service: web::Data<UserService>,
    redis_service: Option<web::Data<RedisService>>,
) -> Result<HttpResponse, ApiError> {
    let claims = authenticate(&credentials, redis_service.as_ref().map(|d| d.get_ref())).await?;

    if !Role::parse(&claims.role).unwrap_or_default().is_staff() {
        return Err(ApiError::ForbiddenError(
            "Moderator role required".to_string(),
        ));
    }

    let users = user_service.list_users().await?;
    let data: Vec<ModerationUserView> = users.iter().map(ModerationUserView::from).collect();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Users retrieved successfully",
        "httpStatusCode": 200,
        "count": data.len(),
        "data": data
    })))
}

pub async fn get_user(
    user_service: web::Data<UserService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user_id = ObjectId::parse_str(path.into_inner())
        .map_err(|_| ApiError::BadRequestError("Invalid user ID".to_string()))?;

    let user = user_service
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| ApiError::NotFoundError("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "User retrieved successfully",
        "httpStatusCode": 200,
        "data": UserView::from(&user)
    })))
}

pub async fn update_user(
    credentials: BearerAuth,
    user_service: web::Data<UserService>,
    redis_service: Option<web::Data<RedisService>>,
    path: web::Path<String>,
    body: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, ApiError> {
    let claims = authenticate(&credentials, redis_service.as_ref().map(|d| d.get_ref())).await?;

    let target = path.into_inner();
    let target_id = ObjectId::parse_str(&target)
        .map_err(|_| ApiError::BadRequestError("Invalid user ID".to_string()))?;

    let is_self = claims.id == target;
    let is_admin = Role::parse(&claims.role).unwrap_or_default() == Role::Admin;
    if !is_self && !is_admin {
        return Err(ApiError::ForbiddenError(
            "You can only update your own profile".to_string(),
        ));
    }

    let user = user_service
        .update_user(&target_id, body.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "User updated successfully",
        "httpStatusCode": 200,
        "data": UserView::from(&user)
    })))
}

pub async fn delete_user(
    credentials: BearerAuth,
    user_service: web::Data<UserService>,
    redis_service: Option<web::Data<RedisService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let claims = authenticate(&credentials, redis_service.as_ref().map(|d| d.get_ref())).await?;

    let target = path.into_inner();
    let target_id = ObjectId::parse_str(&target)
        .map_err(|_| ApiError::BadRequestError("Invalid user ID".to_string()))?;

    let is_self = claims.id == target;
    let is_admin = Role::parse(&claims.role).unwrap_or_default() == Role::Admin;
    if !is_self && !is_admin {
        return Err(ApiError::ForbiddenError(
            "You can only delete your own account".to_string(),
        ));
    }

    if !user_service.delete_user(&target_id).await? {
        return Err(ApiError::NotFoundError("User not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "User deleted successfully",
        "httpStatusCode": 200
    })))
}

pub async fn report_user(
    credentials: BearerAuth,
    user_service: web::Data<UserService>,
    redis_service: Option<web::Data<RedisService>>,
    path: web::Path<String>,
    body: web::Json<ReportUserRequest>,
) -> Result<HttpResponse, ApiError> {
    let claims = authenticate(&credentials, redis_service.as_ref().map(|d| d.get_ref())).await?;

    let target = path.into_inner();
    let target_id = ObjectId::parse_str(&target)
        .map_err(|_| ApiError::BadRequestError("Invalid user ID".to_string()))?;

    if claims.id == target {
        return Err(ApiError::BadRequestError(
            "You cannot report yourself".to_string(),
        ));
    }

    if body.reason.trim().is_empty() {
        return Err(ApiError::BadRequestError(
            "Report reason cannot be empty".to_string(),
        ));
    }

    let reporter = ObjectId::parse_str(&claims.id)
        .map_err(|_| ApiError::BadRequestError("Invalid user id in token".to_string()))?;

    let recorded = user_service
        .report_user(&target_id, reporter, body.reason.clone())
        .await?;

    let message = if recorded {
        "Report submitted successfully"
    } else {
        "You have already reported this user"
    };

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": message,
        "httpStatusCode": 200
    })))
}

pub async fn ban_user(
    credentials: BearerAuth,
    user_service: web::Data<UserService>,
    redis_service: Option<web::Data<RedisService>>,
    path: web::Path<String>,
    body: web::Json<BanUserRequest>,
) -> Result<HttpResponse, ApiError> {
    let claims = authenticate(&credentials, redis_service.as_ref().map(|d| d.get_ref())).await?;

    if Role::parse(&claims.role).unwrap_or_default() != Role::Admin {
        return Err(ApiError::ForbiddenError("Admin role required".to_string()));
    }

    let user_id = ObjectId::parse_str(path.into_inner())
        .map_err(|_| ApiError::BadRequestError("Invalid user ID".to_string()))?;

    user_service.set_banned(&user_id, body.is_banned).await?;

    let message = if body.is_banned {
        "User banned successfully"
    } else {
        "User unbanned successfully"
    };

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": message,
        "httpStatusCode": 200
    })))
}
