use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    UnauthorizedError(String),

    #[error("Forbidden: {0}")]
    ForbiddenError(String),

    #[error("Bad Request: {0}")]
    BadRequestError(String),

    #[error("Conflict: {0}")]
    ConflictError(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Not Found: {0}")]
    NotFoundError(String),

    #[error("Validation Error: {0}")]
    ValidationError(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match *self {
            ApiError::UnauthorizedError(..) => StatusCode::UNAUTHORIZED,
            ApiError::ForbiddenError(..) => StatusCode::FORBIDDEN,
            ApiError::BadRequestError(..) => StatusCode::BAD_REQUEST,
            ApiError::ConflictError(..) => StatusCode::CONFLICT,
            ApiError::InternalServerError(..) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFoundError(..) => StatusCode::NOT_FOUND,
            ApiError::ValidationError(..) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_message = json!({
            "success": false,
            "message": self.to_string(),
            "httpStatusCode": self.status_code().as_u16(),
            "error": match *self {
                ApiError::UnauthorizedError(..) => "UNAUTHORIZED_ERROR",
                ApiError::ForbiddenError(..) => "FORBIDDEN_ERROR",
                ApiError::BadRequestError(..) => "BAD_REQUEST_ERROR",
                ApiError::ConflictError(..) => "CONFLICT_ERROR",
                ApiError::InternalServerError(..) => "INTERNAL_SERVER_ERROR",
                ApiError::NotFoundError(..) => "NOT_FOUND_ERROR",
                ApiError::ValidationError(..) => "VALIDATION_ERROR",
            },
            "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string()),
        });

        HttpResponse::build(self.status_code()).json(error_message)
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use actix_web::{ResponseError, http::StatusCode};

    #[test]
    fn status_codes_match_variants() {
        assert_eq!(
            ApiError::UnauthorizedError("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::ForbiddenError("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::BadRequestError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::ConflictError("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::NotFoundError("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InternalServerError("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
