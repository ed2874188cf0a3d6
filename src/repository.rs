use crate::models::{BlogAuthor, BlogDetail, BlogPost, CommentView, Post, SortKey, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, query_builder::QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations. Handlers interact
/// with the data layer through this trait without knowing the concrete
/// implementation (Postgres, Mock, etc.), which is what makes them testable
/// without a running database.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's asynchronous task
/// boundaries.
///
/// Every method returns `Result<_, sqlx::Error>`; the handler boundary converts
/// any store failure into a generic internal error response.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Post Retrieval ---

    /// Total number of posts, optionally restricted to those whose title or
    /// content contains `search` (case-insensitive). Drives `totalPages`.
    async fn count_posts(&self, search: Option<&str>) -> Result<i64, sqlx::Error>;

    /// One page of posts with their author's name, ordered by the given sort
    /// key descending. `search` applies the same filter as `count_posts`.
    async fn list_posts(
        &self,
        search: Option<&str>,
        sort: SortKey,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BlogPost>, sqlx::Error>;

    /// Single post with author name and all comments (each with its author's
    /// name). `None` if no post matches the id.
    async fn get_post(&self, id: Uuid) -> Result<Option<BlogDetail>, sqlx::Error>;

    // --- Post Actions ---

    /// Inserts a new post owned by `author_id` with zeroed counters.
    async fn create_post(
        &self,
        author_id: Uuid,
        title: String,
        content: String,
    ) -> Result<Post, sqlx::Error>;

    /// Records a like for (user, post). Returns true if a new row was inserted
    /// and the counter incremented, false if the user had already liked the
    /// post. Insert and increment happen in one transaction.
    async fn like_post(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error>;

    /// Inserts a comment and increments the post's comment counter in one
    /// transaction.
    async fn add_comment(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        text: String,
    ) -> Result<(), sqlx::Error>;

    // --- User/Auth ---

    /// Inserts a new user. A duplicate email violates the unique constraint and
    /// surfaces as the store's error.
    async fn create_user(
        &self,
        email: String,
        name: String,
        password_hash: String,
    ) -> Result<User, sqlx::Error>;

    /// Looks a user up by email for signin. `None` when no account exists.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

// --- Row Projections ---

// Flat row shapes produced by the JOIN queries, mapped into the nested wire
// models before leaving the repository.

#[derive(Debug, FromRow)]
struct PostRow {
    id: Uuid,
    author_id: Uuid,
    title: String,
    content: String,
    likes_count: i64,
    comments_count: i64,
    created_at: DateTime<Utc>,
    author_name: String,
}

impl From<PostRow> for BlogPost {
    fn from(row: PostRow) -> Self {
        BlogPost {
            id: row.id,
            author_id: row.author_id,
            title: row.title,
            content: row.content,
            likes_count: row.likes_count,
            comments_count: row.comments_count,
            created_at: row.created_at,
            author: BlogAuthor {
                name: row.author_name,
            },
        }
    }
}

#[derive(Debug, FromRow)]
struct CommentRow {
    text: String,
    author_name: String,
}

impl From<CommentRow> for CommentView {
    fn from(row: CommentRow) -> Self {
        CommentView {
            text: row.text,
            user: BlogAuthor {
                name: row.author_name,
            },
        }
    }
}

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the
/// PostgreSQL database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Appends the case-insensitive title/content filter shared by count and list.
fn push_search_filter(builder: &mut QueryBuilder<'_, sqlx::Postgres>, search: &str) {
    let pattern = format!("%{}%", search);
    builder.push(" WHERE (p.title ILIKE ");
    builder.push_bind(pattern.clone());
    builder.push(" OR p.content ILIKE ");
    builder.push_bind(pattern);
    builder.push(")");
}

#[async_trait]
impl Repository for PostgresRepository {
    /// count_posts
    ///
    /// Uses QueryBuilder for safe parameterization of the optional search
    /// filter; an empty search string matches every row, so count_posts(None)
    /// and count_posts(Some("")) agree.
    async fn count_posts(&self, search: Option<&str>) -> Result<i64, sqlx::Error> {
        let mut builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM posts p");

        if let Some(s) = search {
            push_search_filter(&mut builder, s);
        }

        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
    }

    /// list_posts
    ///
    /// The sort key is a closed enum, so its ORDER BY clause can be appended as
    /// a static string; only the search pattern and paging values are bound.
    async fn list_posts(
        &self,
        search: Option<&str>,
        sort: SortKey,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BlogPost>, sqlx::Error> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
            r#"
            SELECT
                p.id, p.author_id, p.title, p.content,
                p.likes_count, p.comments_count, p.created_at,
                u.name AS author_name
            FROM posts p
            JOIN users u ON p.author_id = u.id
            "#,
        );

        if let Some(s) = search {
            push_search_filter(&mut builder, s);
        }

        builder.push(" ORDER BY ");
        builder.push(sort.order_by());
        builder.push(" LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let rows = builder
            .build_query_as::<PostRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(BlogPost::from).collect())
    }

    /// get_post
    ///
    /// Two reads: the post joined with its author, then the comment list joined
    /// with each comment's author, oldest first.
    async fn get_post(&self, id: Uuid) -> Result<Option<BlogDetail>, sqlx::Error> {
        let post = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT
                p.id, p.author_id, p.title, p.content,
                p.likes_count, p.comments_count, p.created_at,
                u.name AS author_name
            FROM posts p
            JOIN users u ON p.author_id = u.id
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(post) = post else {
            return Ok(None);
        };

        let comments = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.text, u.name AS author_name
            FROM post_comments c
            JOIN users u ON c.user_id = u.id
            WHERE c.post_id = $1
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(BlogDetail {
            id: post.id,
            author_id: post.author_id,
            title: post.title,
            content: post.content,
            likes_count: post.likes_count,
            comments_count: post.comments_count,
            created_at: post.created_at,
            author: BlogAuthor {
                name: post.author_name,
            },
            comments: comments.into_iter().map(CommentView::from).collect(),
        }))
    }

    /// create_post
    ///
    /// Inserts a new post with both engagement counters at zero and returns the
    /// created row.
    async fn create_post(
        &self,
        author_id: Uuid,
        title: String,
        content: String,
    ) -> Result<Post, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (id, author_id, title, content, likes_count, comments_count, created_at)
            VALUES ($1, $2, $3, $4, 0, 0, NOW())
            RETURNING id, author_id, title, content, likes_count, comments_count, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(author_id)
        .bind(title)
        .bind(content)
        .fetch_one(&self.pool)
        .await
    }

    /// like_post
    ///
    /// Uses `ON CONFLICT DO NOTHING` against the composite primary key on
    /// `post_likes` so a duplicate like never inserts a second row, and only
    /// increments `likes_count` when a row was actually inserted. Both
    /// statements run inside one transaction, so the counter stays equal to the
    /// number of like rows even under concurrent requests.
    async fn like_post(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO post_likes (user_id, post_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(post_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if inserted {
            sqlx::query("UPDATE posts SET likes_count = likes_count + 1 WHERE id = $1")
                .bind(post_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// add_comment
    ///
    /// Insert plus counter increment in one transaction, mirroring `like_post`.
    /// A nonexistent post fails the foreign key and rolls the whole mutation
    /// back.
    async fn add_comment(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        text: String,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO post_comments (post_id, user_id, text, created_at) VALUES ($1, $2, $3, NOW())",
        )
        .bind(post_id)
        .bind(user_id)
        .bind(text)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE posts SET comments_count = comments_count + 1 WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// create_user
    ///
    /// The unique index on `email` makes a duplicate signup fail here rather
    /// than being checked first.
    async fn create_user(
        &self,
        email: String,
        name: String,
        password_hash: String,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, name, password, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, email, name, password, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
    }

    /// find_user_by_email
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, name, password, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }
}
