use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any client,
/// anonymous or logged-in: the read-only post surface and the signup/signin
/// identity flow. All paths are mounted under the `/api/v1` prefix by the
/// top-level router.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /blog/bulk?page=...&limit=...&sort=...
        // Paginated listing of all posts. Registered before /blog/{id} so the
        // literal segment wins over the path parameter.
        .route("/blog/bulk", get(handlers::list_blogs))
        // GET /blog/search?query=...&page=...&limit=...&sort=...
        // Same contract as the listing, filtered by a title/content substring.
        .route("/blog/search", get(handlers::search_blogs))
        // GET /blog/{id}
        // Single post with nested author and comments. 404 when absent.
        .route("/blog/{id}", get(handlers::get_blog))
        // POST /user/signup
        // Creates an account and returns a signed bearer token.
        .route("/user/signup", post(handlers::signup))
        // POST /user/signin
        // Verifies credentials and returns a signed bearer token, 403 otherwise.
        .route("/user/signin", post(handlers::signin))
}
