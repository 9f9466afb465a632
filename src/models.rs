use chrono::prelude::*;
use serde::{Deserialize, Serialize};

/// Vote direction on a comment.
///
/// Stored in the database as the PostgreSQL ENUM type "vote_type"
/// ('up' / 'down'). Deserializing a request body with any other value
/// fails before a handler ever runs, so the enum doubles as boundary
/// validation for votes.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "vote_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Up,
    Down,
}

/// User account row from the "users" table.
///
/// `hashed_password` holds the argon2id PHC string, never plain text.
/// `is_active` gates login and token validation; rows are never deleted
/// once referenced by recipes/comments/ratings/votes.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Recipe row. Owned by exactly one user (`author_id`).
///
/// Timing/servings/difficulty/image fields are optional metadata.
/// `is_published` controls visibility in listings only; fetching a single
/// recipe by id ignores it.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Recipe {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: String,
    pub instructions: String,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub servings: Option<i32>,
    pub difficulty: Option<String>,
    pub image_url: Option<String>,
    pub author_id: i32,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Comment on a recipe, optionally nested under another comment via
/// `parent_id`. The core only stores and returns the parent reference;
/// thread assembly is the frontend's job.
///
/// User-facing deletion is a soft delete: `is_active` flips to false and
/// the row stays (replies may still point at it).
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Comment {
    pub id: i32,
    pub content: String,
    pub recipe_id: i32,
    pub author_id: i32,
    pub parent_id: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A user's rating of a recipe, 1.0 to 5.0.
///
/// At most one row per (user_id, recipe_id), enforced by a composite
/// unique constraint; repeat submissions overwrite the value in place.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Rating {
    pub id: i32,
    pub rating: f64,
    pub recipe_id: i32,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A user's up/down vote on a comment.
///
/// At most one row per (user_id, comment_id), same upsert semantics as
/// ratings.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct CommentVote {
    pub id: i32,
    pub vote_type: VoteType,
    pub comment_id: i32,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
}
