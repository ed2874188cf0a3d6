use crate::{AppState, handlers};
use axum::{Router, routing::post};

/// Authenticated Router Module
///
/// Defines the routes that mutate posts and therefore require a resolved
/// identity: creating a post, liking, and commenting.
///
/// Access Control Strategy:
/// Every handler in this module relies on the `AuthUser` extractor middleware
/// being layered on top of this router. This guarantees that all handlers
/// receive a validated `AuthUser` carrying the user id decoded from the bearer
/// token's `sub` claim.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /blog
        // Submits a new post owned by the authenticated user.
        .route("/blog", post(handlers::create_blog))
        // POST /blog/{id}/like
        // Records a like. At most one like per (user, post); duplicates get 400.
        .route("/blog/{id}/like", post(handlers::like_blog))
        // POST /blog/{id}/comment
        // Posts a comment and bumps the post's comment counter.
        .route("/blog/{id}/comment", post(handlers::comment_blog))
}
