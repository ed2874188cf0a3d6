use crate::{
    AppState,
    auth::{self, AuthUser},
    error::ApiError,
    models::{
        BlogDetailResponse, BlogPage, CreateBlogRequest, CreateCommentRequest, MessageResponse,
        Post, SigninRequest, SignupRequest, SortKey, TokenResponse,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::PathRejection},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

// --- Filter Structs ---

/// BlogFilter
///
/// The accepted query parameters for the list and search endpoints. Used by
/// Axum's Query extractor to safely bind HTTP query parameters. `query` is only
/// consulted by the search handler.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct BlogFilter {
    /// 1-based page number, defaults to 1.
    pub page: Option<i64>,
    /// Page size, defaults to 10.
    pub limit: Option<i64>,
    /// Sort key: "date", "likes" or "comments". Anything else sorts by date.
    pub sort: Option<String>,
    /// Case-insensitive substring matched against title and content.
    pub query: Option<String>,
}

impl BlogFilter {
    // (page, limit, offset) with the documented defaults applied.
    fn paging(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(10);
        (page, limit, (page - 1) * limit)
    }

    fn sort(&self) -> SortKey {
        SortKey::parse(self.sort.as_deref())
    }
}

// ceil(total / limit)
fn total_pages(total: i64, limit: i64) -> i64 {
    if limit > 0 { (total + limit - 1) / limit } else { 0 }
}

// --- Handlers ---

/// list_blogs
///
/// [Public Route] Paginated listing of every post, each including its author's
/// name, ordered by the requested sort key descending.
#[utoipa::path(
    get,
    path = "/api/v1/blog/bulk",
    params(BlogFilter),
    responses((status = 200, description = "One page of posts", body = BlogPage))
)]
pub async fn list_blogs(
    State(state): State<AppState>,
    Query(filter): Query<BlogFilter>,
) -> Result<Json<BlogPage>, ApiError> {
    let (page, limit, offset) = filter.paging();

    let total = state.repo.count_posts(None).await?;
    let blogs = state
        .repo
        .list_posts(None, filter.sort(), limit, offset)
        .await?;

    Ok(Json(BlogPage {
        blogs,
        total_pages: total_pages(total, limit),
        current_page: page,
    }))
}

/// search_blogs
///
/// [Public Route] Same pagination and sort contract as the listing, restricted
/// to posts whose title or content contains the query substring. An empty query
/// matches everything, so search without a query is equivalent to the listing.
#[utoipa::path(
    get,
    path = "/api/v1/blog/search",
    params(BlogFilter),
    responses((status = 200, description = "Matching posts", body = BlogPage))
)]
pub async fn search_blogs(
    State(state): State<AppState>,
    Query(filter): Query<BlogFilter>,
) -> Result<Json<BlogPage>, ApiError> {
    let (page, limit, offset) = filter.paging();
    let query = filter.query.clone().unwrap_or_default();

    let total = state.repo.count_posts(Some(&query)).await?;
    let blogs = state
        .repo
        .list_posts(Some(&query), filter.sort(), limit, offset)
        .await?;

    Ok(Json(BlogPage {
        blogs,
        total_pages: total_pages(total, limit),
        current_page: page,
    }))
}

/// get_blog
///
/// [Public Route] Retrieves a single post with its author's name and all
/// comments, each carrying the commenting user's name.
#[utoipa::path(
    get,
    path = "/api/v1/blog/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = BlogDetailResponse),
        (status = 404, description = "No such post")
    )
)]
pub async fn get_blog(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<BlogDetailResponse>, ApiError> {
    // A malformed id cannot name any post, so it reports the same 404 as an
    // unknown one instead of axum's plain-text rejection.
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;

    match state.repo.get_post(id).await? {
        Some(blog) => Ok(Json(BlogDetailResponse { blog })),
        None => Err(ApiError::NotFound),
    }
}

/// create_blog
///
/// [Authenticated Route] Submits a new post. The author id is taken from the
/// resolved identity, never from the request body.
#[utoipa::path(
    post,
    path = "/api/v1/blog",
    request_body = CreateBlogRequest,
    responses((status = 201, description = "Created", body = Post))
)]
pub async fn create_blog(
    AuthUser { id }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateBlogRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let post = state
        .repo
        .create_post(id, payload.title, payload.content)
        .await?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// like_blog
///
/// [Authenticated Route] Records a like from the user for a post.
///
/// *At most one like per (user, post)*: the repository enforces this against
/// the composite primary key on `post_likes` and increments `likesCount` only
/// when a new row was inserted, so the counter moves by exactly 1 for the first
/// like and not at all for repeats.
#[utoipa::path(
    post,
    path = "/api/v1/blog/{id}/like",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Liked", body = MessageResponse),
        (status = 400, description = "Already liked")
    )
)]
pub async fn like_blog(
    AuthUser { id: user_id }: AuthUser,
    State(state): State<AppState>,
    post_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(post_id) = post_id.map_err(|_| ApiError::NotFound)?;

    if state.repo.like_post(post_id, user_id).await? {
        Ok(Json(MessageResponse {
            message: "Liked successfully".to_string(),
        }))
    } else {
        Err(ApiError::AlreadyLiked)
    }
}

/// comment_blog
///
/// [Authenticated Route] Posts a new comment on a post. The comment insert and
/// the `commentsCount` increment are one repository transaction.
#[utoipa::path(
    post,
    path = "/api/v1/blog/{id}/comment",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = CreateCommentRequest,
    responses((status = 200, description = "Comment added", body = MessageResponse))
)]
pub async fn comment_blog(
    AuthUser { id: user_id }: AuthUser,
    State(state): State<AppState>,
    post_id: Result<Path<Uuid>, PathRejection>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(post_id) = post_id.map_err(|_| ApiError::NotFound)?;

    state
        .repo
        .add_comment(post_id, user_id, payload.comment_text)
        .await?;

    Ok(Json(MessageResponse {
        message: "Comment added successfully".to_string(),
    }))
}

/// signup
///
/// [Public Route] Creates a new account and immediately issues a bearer token.
/// The password is Argon2-hashed before it reaches the repository. A duplicate
/// email violates the store's unique constraint and surfaces as a generic
/// internal error.
#[utoipa::path(
    post,
    path = "/api/v1/user/signup",
    request_body = SignupRequest,
    responses((status = 200, description = "Account created", body = TokenResponse))
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let hashed = auth::hash_password(&payload.password)?;

    let user = state
        .repo
        .create_user(payload.email, payload.name, hashed)
        .await?;

    let token = auth::issue_token(user.id, &state.config.jwt_secret)?;
    Ok(Json(TokenResponse { token }))
}

/// signin
///
/// [Public Route] Verifies the presented credentials and issues a bearer token.
/// An unknown email and a wrong password are indistinguishable to the caller:
/// both reject with 403 and no token.
#[utoipa::path(
    post,
    path = "/api/v1/user/signin",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenResponse),
        (status = 403, description = "Invalid credentials")
    )
)]
pub async fn signin(
    State(state): State<AppState>,
    Json(payload): Json<SigninRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state
        .repo
        .find_user_by_email(&payload.email)
        .await?
        .ok_or(ApiError::Forbidden)?;

    if !auth::verify_password(&payload.password, &user.password) {
        return Err(ApiError::Forbidden);
    }

    let token = auth::issue_token(user.id, &state.config.jwt_secret)?;
    Ok(Json(TokenResponse { token }))
}
