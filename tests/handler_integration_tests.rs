use async_trait::async_trait;
use axum::{
    Json,
    body::Body,
    extract::{Path, Query, State},
    http::{Request, StatusCode},
    response::IntoResponse,
};
use blog_api::{
    AppState,
    auth::{self, AuthUser, Claims},
    config::AppConfig,
    error::ApiError,
    handlers::{self, BlogFilter},
    models::{
        BlogAuthor, BlogDetail, BlogPost, CommentView, Post, SigninRequest, SignupRequest, SortKey,
        User,
    },
    repository::Repository,
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, Validation, decode};
use std::sync::Arc;
use tokio::test;
use tower::ServiceExt;
use uuid::Uuid;

// --- MOCK REPOSITORY IMPLEMENTATION ---

// Central control point for testing handler logic: handlers depend on the
// Repository trait, so the trait implementation is mocked with pre-canned
// outputs.
pub struct MockRepoControl {
    pub post_count: i64,
    pub posts_to_return: Vec<BlogPost>,
    pub blog_detail: Option<BlogDetail>,
    // true = like row inserted, false = already liked
    pub like_result: bool,
    // None simulates a store failure (e.g. duplicate email) on create_user
    pub user_to_create: Option<User>,
    pub user_by_email: Option<User>,
}

impl Default for MockRepoControl {
    fn default() -> Self {
        MockRepoControl {
            post_count: 0,
            posts_to_return: vec![],
            blog_detail: None,
            like_result: true,
            user_to_create: Some(User::default()),
            user_by_email: None,
        }
    }
}

#[async_trait]
impl Repository for MockRepoControl {
    async fn count_posts(&self, _search: Option<&str>) -> Result<i64, sqlx::Error> {
        Ok(self.post_count)
    }

    async fn list_posts(
        &self,
        _search: Option<&str>,
        _sort: SortKey,
        _limit: i64,
        _offset: i64,
    ) -> Result<Vec<BlogPost>, sqlx::Error> {
        Ok(self.posts_to_return.clone())
    }

    async fn get_post(&self, _id: Uuid) -> Result<Option<BlogDetail>, sqlx::Error> {
        Ok(self.blog_detail.clone())
    }

    async fn create_post(
        &self,
        author_id: Uuid,
        title: String,
        content: String,
    ) -> Result<Post, sqlx::Error> {
        // Echo the inputs back so tests can verify the handler passed the
        // authenticated identity through.
        Ok(Post {
            id: Uuid::from_u128(999),
            author_id,
            title,
            content,
            likes_count: 0,
            comments_count: 0,
            created_at: Utc::now(),
        })
    }

    async fn like_post(&self, _post_id: Uuid, _user_id: Uuid) -> Result<bool, sqlx::Error> {
        Ok(self.like_result)
    }

    async fn add_comment(
        &self,
        _post_id: Uuid,
        _user_id: Uuid,
        _text: String,
    ) -> Result<(), sqlx::Error> {
        Ok(())
    }

    async fn create_user(
        &self,
        email: String,
        name: String,
        password_hash: String,
    ) -> Result<User, sqlx::Error> {
        match &self.user_to_create {
            Some(user) => Ok(User {
                email,
                name,
                password: password_hash,
                ..user.clone()
            }),
            None => Err(sqlx::Error::RowNotFound),
        }
    }

    async fn find_user_by_email(&self, _email: &str) -> Result<Option<User>, sqlx::Error> {
        Ok(self.user_by_email.clone())
    }
}

// --- TEST UTILITIES ---

const TEST_USER_ID: Uuid = Uuid::from_u128(123);
const TEST_POST_ID: Uuid = Uuid::from_u128(456);

fn create_test_state(repo_control: MockRepoControl) -> AppState {
    AppState {
        repo: Arc::new(repo_control),
        config: AppConfig::default(),
    }
}

fn test_user() -> AuthUser {
    AuthUser { id: TEST_USER_ID }
}

fn filter(page: Option<i64>, limit: Option<i64>, sort: Option<&str>, query: Option<&str>) -> BlogFilter {
    BlogFilter {
        page,
        limit,
        sort: sort.map(str::to_string),
        query: query.map(str::to_string),
    }
}

fn sample_blog_post() -> BlogPost {
    BlogPost {
        id: TEST_POST_ID,
        author_id: TEST_USER_ID,
        title: "A".to_string(),
        content: "B".to_string(),
        likes_count: 3,
        comments_count: 1,
        created_at: Utc::now(),
        author: BlogAuthor {
            name: "Alice".to_string(),
        },
    }
}

async fn response_json(response: axum::response::Response) -> (StatusCode, serde_json::Value) {
    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    (parts.status, serde_json::from_slice(&bytes).unwrap())
}

// Decodes a token issued by the handlers under the default test secret.
fn decode_claims(token: &str) -> Claims {
    let key = DecodingKey::from_secret(AppConfig::default().jwt_secret.as_bytes());
    decode::<Claims>(token, &key, &Validation::default())
        .expect("token should verify under the configured secret")
        .claims
}

// --- LIST & SEARCH ---

#[test]
async fn test_list_blogs_pagination_math() {
    let state = create_test_state(MockRepoControl {
        post_count: 25,
        posts_to_return: vec![sample_blog_post()],
        ..MockRepoControl::default()
    });

    let result = handlers::list_blogs(State(state), Query(filter(Some(2), Some(10), None, None)))
        .await
        .unwrap();

    let Json(page) = result;
    assert_eq!(page.current_page, 2);
    // ceil(25 / 10)
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.blogs.len(), 1);
    assert_eq!(page.blogs[0].author.name, "Alice");
}

#[test]
async fn test_list_blogs_defaults() {
    let state = create_test_state(MockRepoControl {
        post_count: 5,
        ..MockRepoControl::default()
    });

    let Json(page) = handlers::list_blogs(State(state), Query(filter(None, None, None, None)))
        .await
        .unwrap();

    assert_eq!(page.current_page, 1);
    // 5 posts fit on one default-sized page.
    assert_eq!(page.total_pages, 1);
}

#[test]
async fn test_list_blogs_exact_page_boundary() {
    let state = create_test_state(MockRepoControl {
        post_count: 30,
        ..MockRepoControl::default()
    });

    let Json(page) = handlers::list_blogs(State(state), Query(filter(Some(1), Some(10), None, None)))
        .await
        .unwrap();

    // 30 / 10 divides evenly, no phantom extra page.
    assert_eq!(page.total_pages, 3);
}

#[test]
async fn test_search_blogs_empty_query_matches_list_total() {
    let repo = MockRepoControl {
        post_count: 17,
        ..MockRepoControl::default()
    };
    let state = create_test_state(repo);

    let Json(listed) = handlers::list_blogs(
        State(state.clone()),
        Query(filter(Some(1), Some(10), None, None)),
    )
    .await
    .unwrap();

    let Json(searched) = handlers::search_blogs(
        State(state),
        Query(filter(Some(1), Some(10), None, Some(""))),
    )
    .await
    .unwrap();

    assert_eq!(listed.total_pages, searched.total_pages);
    assert_eq!(searched.current_page, 1);
}

// --- GET BY ID ---

#[test]
async fn test_get_blog_not_found() {
    let state = create_test_state(MockRepoControl {
        blog_detail: None,
        ..MockRepoControl::default()
    });

    let err = handlers::get_blog(State(state), Ok(Path(TEST_POST_ID)))
        .await
        .unwrap_err();

    let (status, body) = response_json(err.into_response()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.get("blog").is_none());
    assert_eq!(body["message"], "Blog not found");
}

#[test]
async fn test_get_blog_success_includes_author_and_comments() {
    let detail = BlogDetail {
        id: TEST_POST_ID,
        author_id: TEST_USER_ID,
        title: "A".to_string(),
        content: "B".to_string(),
        likes_count: 0,
        comments_count: 1,
        created_at: Utc::now(),
        author: BlogAuthor {
            name: "Alice".to_string(),
        },
        comments: vec![CommentView {
            text: "nice".to_string(),
            user: BlogAuthor {
                name: "Bob".to_string(),
            },
        }],
    };
    let state = create_test_state(MockRepoControl {
        blog_detail: Some(detail),
        ..MockRepoControl::default()
    });

    let Json(response) = handlers::get_blog(State(state), Ok(Path(TEST_POST_ID)))
        .await
        .unwrap();

    assert_eq!(response.blog.author.name, "Alice");
    assert_eq!(response.blog.comments.len(), 1);
    assert_eq!(response.blog.comments[0].user.name, "Bob");
}

#[test]
async fn test_get_blog_malformed_id_returns_json_not_found() {
    let state = create_test_state(MockRepoControl::default());
    let app = blog_api::create_router(state);

    // A non-UUID path segment must stay inside the structured error contract
    // rather than surfacing axum's plain-text path rejection.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/blog/not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let (status, body) = response_json(response).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.get("blog").is_none());
    assert_eq!(body["message"], "Blog not found");
}

// --- CREATE ---

#[test]
async fn test_create_blog_uses_authenticated_identity() {
    let state = create_test_state(MockRepoControl::default());

    let payload = blog_api::models::CreateBlogRequest {
        title: "A".to_string(),
        content: "B".to_string(),
    };

    let (status, Json(post)) = handlers::create_blog(test_user(), State(state), Json(payload))
        .await
        .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(post.author_id, TEST_USER_ID);
    assert_eq!(post.title, "A");
    assert_eq!(post.content, "B");
}

// --- LIKE & COMMENT ---

#[test]
async fn test_like_blog_success() {
    let state = create_test_state(MockRepoControl {
        like_result: true,
        ..MockRepoControl::default()
    });

    let Json(response) = handlers::like_blog(test_user(), State(state), Ok(Path(TEST_POST_ID)))
        .await
        .unwrap();

    assert_eq!(response.message, "Liked successfully");
}

#[test]
async fn test_like_blog_duplicate_rejected() {
    let state = create_test_state(MockRepoControl {
        like_result: false,
        ..MockRepoControl::default()
    });

    let err = handlers::like_blog(test_user(), State(state), Ok(Path(TEST_POST_ID)))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::AlreadyLiked));

    let (status, body) = response_json(err.into_response()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You already liked this post");
}

#[test]
async fn test_comment_blog_success() {
    let state = create_test_state(MockRepoControl::default());

    let payload = blog_api::models::CreateCommentRequest {
        comment_text: "nice".to_string(),
    };

    let Json(response) =
        handlers::comment_blog(test_user(), State(state), Ok(Path(TEST_POST_ID)), Json(payload))
            .await
            .unwrap();

    assert_eq!(response.message, "Comment added successfully");
}

// --- SIGNUP & SIGNIN ---

#[test]
async fn test_signup_issues_token_for_created_user() {
    let created = User {
        id: TEST_USER_ID,
        ..User::default()
    };
    let state = create_test_state(MockRepoControl {
        user_to_create: Some(created),
        ..MockRepoControl::default()
    });

    let payload = SignupRequest {
        email: "alice@example.com".to_string(),
        password: "hunter22".to_string(),
        name: "Alice".to_string(),
    };

    let Json(response) = handlers::signup(State(state), Json(payload)).await.unwrap();

    let claims = decode_claims(&response.token);
    assert_eq!(claims.sub, TEST_USER_ID);
}

#[test]
async fn test_signup_duplicate_email_surfaces_as_internal_error() {
    let state = create_test_state(MockRepoControl {
        user_to_create: None,
        ..MockRepoControl::default()
    });

    let payload = SignupRequest {
        email: "taken@example.com".to_string(),
        password: "hunter22".to_string(),
        name: "Alice".to_string(),
    };

    let err = handlers::signup(State(state), Json(payload)).await.unwrap_err();

    let (status, body) = response_json(err.into_response()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}

#[test]
async fn test_signin_success_issues_token() {
    let stored = User {
        id: TEST_USER_ID,
        email: "alice@example.com".to_string(),
        password: auth::hash_password("hunter22").unwrap(),
        ..User::default()
    };
    let state = create_test_state(MockRepoControl {
        user_by_email: Some(stored),
        ..MockRepoControl::default()
    });

    let payload = SigninRequest {
        email: "alice@example.com".to_string(),
        password: "hunter22".to_string(),
    };

    let Json(response) = handlers::signin(State(state), Json(payload)).await.unwrap();

    let claims = decode_claims(&response.token);
    assert_eq!(claims.sub, TEST_USER_ID);
}

#[test]
async fn test_signin_wrong_password_forbidden() {
    let stored = User {
        id: TEST_USER_ID,
        password: auth::hash_password("hunter22").unwrap(),
        ..User::default()
    };
    let state = create_test_state(MockRepoControl {
        user_by_email: Some(stored),
        ..MockRepoControl::default()
    });

    let payload = SigninRequest {
        email: "alice@example.com".to_string(),
        password: "wrong-password".to_string(),
    };

    let err = handlers::signin(State(state), Json(payload)).await.unwrap_err();

    assert!(matches!(err, ApiError::Forbidden));
    let (status, body) = response_json(err.into_response()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Invalid credentials");
}

#[test]
async fn test_signin_unknown_email_forbidden() {
    let state = create_test_state(MockRepoControl {
        user_by_email: None,
        ..MockRepoControl::default()
    });

    let payload = SigninRequest {
        email: "nobody@example.com".to_string(),
        password: "whatever".to_string(),
    };

    let err = handlers::signin(State(state), Json(payload)).await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden));
}
