use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Represents the user's canonical identity record stored in the `users` table.
/// The stored password is the Argon2 PHC string; it is never serialized into a
/// response body.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    // Unique login identifier.
    pub email: String,
    // Display name shown as `author.name` on posts and comments.
    pub name: String,
    // Argon2 hash, storage only.
    #[serde(skip_serializing)]
    #[ts(skip)]
    pub password: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Post
///
/// A blog post row from the `posts` table, including the denormalized engagement
/// counters. This is the shape returned by the create endpoint (no author join).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Post {
    pub id: Uuid,
    // FK to users.id (Owner).
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    // Denormalized counters, maintained transactionally with their detail rows.
    pub likes_count: i64,
    pub comments_count: i64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// BlogAuthor
///
/// Minimal author projection nested inside list/detail responses. Only the name
/// is exposed to anonymous readers.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BlogAuthor {
    pub name: String,
}

/// BlogPost
///
/// A post enriched with its author's name, as served by the list and search
/// endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BlogPost {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub likes_count: i64,
    pub comments_count: i64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub author: BlogAuthor,
}

/// CommentView
///
/// A comment projection for the blog detail response: the text plus the
/// commenting user's name.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CommentView {
    pub text: String,
    pub user: BlogAuthor,
}

/// BlogDetail
///
/// The full single-post projection: post fields, author name, and every comment
/// with its author's name.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BlogDetail {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub likes_count: i64,
    pub comments_count: i64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub author: BlogAuthor,
    pub comments: Vec<CommentView>,
}

/// SortKey
///
/// The closed set of accepted sort orders for list and search. Anything the
/// client sends outside this set falls back to `Date` explicitly rather than
/// through a lookup-table miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Date,
    Likes,
    Comments,
}

impl SortKey {
    /// Parses the raw `sort` query parameter, defaulting to date ordering for
    /// absent or unrecognized values.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("likes") => SortKey::Likes,
            Some("comments") => SortKey::Comments,
            _ => SortKey::Date,
        }
    }

    /// The ORDER BY clause for this key. Always descending.
    pub fn order_by(self) -> &'static str {
        match self {
            SortKey::Date => "p.created_at DESC",
            SortKey::Likes => "p.likes_count DESC",
            SortKey::Comments => "p.comments_count DESC",
        }
    }
}

// --- Request Payloads (Input Schemas) ---

/// CreateBlogRequest
///
/// Input payload for submitting a new post (POST /blog). The author is taken
/// from the authenticated identity, never from the body.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateBlogRequest {
    pub title: String,
    pub content: String,
}

/// CreateCommentRequest
///
/// Input payload for posting a new comment.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCommentRequest {
    pub comment_text: String,
}

/// SignupRequest
///
/// Input payload for the public signup endpoint. The password is hashed before
/// it reaches the repository and is never persisted or logged in clear text.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// SigninRequest
///
/// Input payload for the public signin endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

// --- Response Schemas (Output) ---

/// BlogPage
///
/// One page of posts plus the pagination metadata the frontend needs to render
/// page controls.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BlogPage {
    pub blogs: Vec<BlogPost>,
    pub total_pages: i64,
    pub current_page: i64,
}

/// BlogDetailResponse
///
/// Wrapper for the single-post endpoint, matching the `{ blog }` wire shape.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BlogDetailResponse {
    pub blog: BlogDetail,
}

/// TokenResponse
///
/// Output of signup and signin: the signed bearer token the client presents on
/// protected routes.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TokenResponse {
    pub token: String,
}

/// MessageResponse
///
/// Generic `{ message }` acknowledgement used by the like and comment endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}
