use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// ApiError
///
/// The application-wide error taxonomy. Every handler returns `Result<_, ApiError>`,
/// and this type's `IntoResponse` implementation is the single place where errors
/// are translated into HTTP status codes and JSON bodies. Handlers never build
/// error responses by hand.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid bearer credential on a protected route.
    #[error("Missing or invalid token")]
    Unauthorized,

    /// Credentials were presented but do not match (signin).
    #[error("Invalid credentials")]
    Forbidden,

    /// No blog post matches the requested id.
    #[error("Blog not found")]
    NotFound,

    /// The user has already liked this post.
    #[error("You already liked this post")]
    AlreadyLiked,

    /// Any data-store failure. Deliberately opaque to the client: transient and
    /// permanent failures are both surfaced as a generic 500.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Unexpected internal failure (token signing, password hashing).
    #[error("internal error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": self.to_string() }),
            ),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                json!({ "message": self.to_string() }),
            ),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                json!({ "message": self.to_string() }),
            ),
            ApiError::AlreadyLiked => (
                StatusCode::BAD_REQUEST,
                json!({ "message": self.to_string() }),
            ),
            ApiError::Database(e) => {
                // Log the concrete failure for operators, return a generic body.
                tracing::error!("database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
