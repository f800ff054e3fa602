use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;
use crate::repo::RepoError;

/// Uniform error envelope returned to clients.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// An identifier in the path did not resolve.
    #[error("Resource not found.")] NotFound,
    /// Validation, authentication or store failure; the message goes to the client.
    #[error("{0}")] InvalidRequest(String),
    /// A handler was reached without the context its route should have resolved.
    #[error("Internal server error.")] Internal,
}

impl ApiError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ApiError::InvalidRequest(msg.into())
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        ApiError::InvalidRequest(e.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::InvalidRequest(e.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::InvalidRequest(msg) => ApiErrorBody {
                status: "Invalid request.".into(),
                error: Some(msg.clone()),
            },
            other => ApiErrorBody { status: other.to_string(), error: None },
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
