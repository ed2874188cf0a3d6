use blog_api::models::{BlogAuthor, BlogPage, BlogPost, Post, SortKey, User};
use chrono::Utc;
use uuid::Uuid;

// --- SORT KEY ---

#[test]
fn test_sort_key_known_values() {
    assert_eq!(SortKey::parse(Some("date")), SortKey::Date);
    assert_eq!(SortKey::parse(Some("likes")), SortKey::Likes);
    assert_eq!(SortKey::parse(Some("comments")), SortKey::Comments);
}

#[test]
fn test_sort_key_falls_back_to_date() {
    assert_eq!(SortKey::parse(None), SortKey::Date);
    assert_eq!(SortKey::parse(Some("")), SortKey::Date);
    assert_eq!(SortKey::parse(Some("popularity")), SortKey::Date);
    // Matching is exact, not case-insensitive.
    assert_eq!(SortKey::parse(Some("LIKES")), SortKey::Date);
}

#[test]
fn test_sort_key_order_clauses_descend() {
    assert_eq!(SortKey::Date.order_by(), "p.created_at DESC");
    assert_eq!(SortKey::Likes.order_by(), "p.likes_count DESC");
    assert_eq!(SortKey::Comments.order_by(), "p.comments_count DESC");
}

// --- WIRE SHAPES ---

#[test]
fn test_blog_page_serializes_camel_case() {
    let page = BlogPage {
        blogs: vec![],
        total_pages: 3,
        current_page: 2,
    };

    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["totalPages"], 3);
    assert_eq!(json["currentPage"], 2);
    assert!(json["blogs"].is_array());
}

#[test]
fn test_post_serializes_counters_camel_case() {
    let post = Post {
        id: Uuid::from_u128(1),
        author_id: Uuid::from_u128(2),
        title: "A".to_string(),
        content: "B".to_string(),
        likes_count: 4,
        comments_count: 7,
        created_at: Utc::now(),
    };

    let json = serde_json::to_value(&post).unwrap();
    assert_eq!(json["likesCount"], 4);
    assert_eq!(json["commentsCount"], 7);
    assert_eq!(json["authorId"], Uuid::from_u128(2).to_string());
    assert!(json.get("likes_count").is_none());
}

#[test]
fn test_blog_post_nests_author() {
    let post = BlogPost {
        id: Uuid::from_u128(1),
        author_id: Uuid::from_u128(2),
        title: "A".to_string(),
        content: "B".to_string(),
        likes_count: 0,
        comments_count: 0,
        created_at: Utc::now(),
        author: BlogAuthor {
            name: "Alice".to_string(),
        },
    };

    let json = serde_json::to_value(&post).unwrap();
    assert_eq!(json["author"]["name"], "Alice");
}

#[test]
fn test_user_never_serializes_password() {
    let user = User {
        id: Uuid::from_u128(1),
        email: "alice@example.com".to_string(),
        name: "Alice".to_string(),
        password: "$argon2id$secret".to_string(),
        created_at: Utc::now(),
    };

    let json = serde_json::to_value(&user).unwrap();
    assert!(json.get("password").is_none());
    assert_eq!(json["email"], "alice@example.com");
}
