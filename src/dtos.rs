use crate::models::{Comment, Recipe, User, VoteType};
use crate::stats::{RatingSummary, VoteTally};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

// Request DTOs carry validator rules for boundary checks; response DTOs are
// built from database rows plus separately computed statistics, so derived
// fields (average_rating, upvotes, ...) never live on persisted models.

// ============================================================================
// Authentication DTOs
// ============================================================================

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct RegisterUserDto {
    #[validate(length(min = 1, max = 50, message = "Username is required"))]
    pub username: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    pub full_name: Option<String>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct LoginUserDto {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// User data with the password hash stripped.
#[derive(Debug, Serialize, Deserialize)]
pub struct FilterUserDto {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl FilterUserDto {
    pub fn filter_user(user: &User) -> Self {
        FilterUserDto {
            id: user.id,
            username: user.username.to_owned(),
            email: user.email.to_owned(),
            full_name: user.full_name.to_owned(),
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserLoginResponseDto {
    pub status: String,
    pub access_token: String,
    pub username: String,
}

/// Current user's profile with content counts.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserMeData {
    pub user: FilterUserDto,
    pub recipe_count: i64,
    pub comment_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserMeResponseDto {
    pub status: String,
    pub data: UserMeData,
}

/// Generic success response.
#[derive(Serialize, Deserialize)]
pub struct Response {
    pub status: &'static str,
    pub message: String,
}

// ============================================================================
// Recipe DTOs
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RecipeCreateDto {
    #[validate(length(min = 1, max = 200, message = "Title is required."))]
    pub title: String,

    pub description: Option<String>,

    #[validate(length(min = 1, message = "Ingredients are required."))]
    pub ingredients: String,

    #[validate(length(min = 1, message = "Instructions are required."))]
    pub instructions: String,

    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub servings: Option<i32>,
    pub difficulty: Option<String>,
    pub image_url: Option<String>,
}

/// Sparse update: every field optional, absent means "do not touch".
/// Fields are applied with COALESCE in the update statement, so `None`
/// never overwrites a stored value.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct RecipeUpdateDto {
    #[validate(length(min = 1, max = 200, message = "Title cannot be empty."))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Ingredients cannot be empty."))]
    pub ingredients: Option<String>,
    #[validate(length(min = 1, message = "Instructions cannot be empty."))]
    pub instructions: Option<String>,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub servings: Option<i32>,
    pub difficulty: Option<String>,
    pub image_url: Option<String>,
}

/// Recipe row decorated with read-time rating statistics.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeDto {
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
    pub average_rating: Option<f64>,
    pub rating_count: i64,
}

impl RecipeDto {
    /// Pair a stored recipe with its freshly computed rating summary.
    /// Listings attach only average and count; the full distribution has
    /// its own endpoint.
    pub fn decorate(recipe: Recipe, summary: &RatingSummary) -> Self {
        RecipeDto {
            id: recipe.id,
            title: recipe.title,
            description: recipe.description,
            ingredients: recipe.ingredients,
            instructions: recipe.instructions,
            prep_time: recipe.prep_time,
            cook_time: recipe.cook_time,
            servings: recipe.servings,
            difficulty: recipe.difficulty,
            image_url: recipe.image_url,
            author_id: recipe.author_id,
            is_published: recipe.is_published,
            created_at: recipe.created_at,
            updated_at: recipe.updated_at,
            average_rating: summary.average,
            rating_count: summary.count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeListResponseDto {
    pub status: String,
    pub data: Vec<RecipeDto>,
    pub results: usize,
}

#[derive(Debug, Serialize)]
pub struct SingleRecipeResponseDto {
    pub status: String,
    pub data: RecipeDto,
}

/// Query parameters for the recipe listing.
#[derive(Debug, Deserialize, Validate)]
pub struct RecipesQueryDto {
    #[validate(range(min = 0, message = "Skip must not be negative"))]
    pub skip: Option<i64>,

    // Server-enforced cap keeps a single listing from scanning the world.
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,

    #[validate(length(min = 1))]
    pub search: Option<String>,
}

// ============================================================================
// Comment DTOs
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CommentCreateDto {
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Content must be between 1 and 1000 characters"
    ))]
    pub content: String,

    pub recipe_id: i32,

    /// Optional reply target; stored and echoed back, never traversed here.
    pub parent_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CommentUpdateDto {
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Content must be between 1 and 1000 characters"
    ))]
    pub content: String,
}

/// Comment row decorated with read-time vote tallies.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommentDto {
    pub id: i32,
    pub content: String,
    pub recipe_id: i32,
    pub author_id: i32,
    pub parent_id: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub upvotes: i64,
    pub downvotes: i64,
}

impl CommentDto {
    pub fn decorate(comment: Comment, tally: VoteTally) -> Self {
        CommentDto {
            id: comment.id,
            content: comment.content,
            recipe_id: comment.recipe_id,
            author_id: comment.author_id,
            parent_id: comment.parent_id,
            is_active: comment.is_active,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            upvotes: tally.upvotes,
            downvotes: tally.downvotes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentListResponseDto {
    pub status: String,
    pub data: Vec<CommentDto>,
    pub results: usize,
}

#[derive(Debug, Serialize)]
pub struct SingleCommentResponseDto {
    pub status: String,
    pub data: CommentDto,
}

// ============================================================================
// Rating & vote DTOs
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct RatingCreateDto {
    pub recipe_id: i32,

    #[validate(range(min = 1.0, max = 5.0, message = "Rating must be between 1.0 and 5.0"))]
    pub rating: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RatingDto {
    pub id: i32,
    pub rating: f64,
    pub recipe_id: i32,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
}

impl RatingDto {
    pub fn from_model(rating: &crate::models::Rating) -> Self {
        RatingDto {
            id: rating.id,
            rating: rating.rating,
            recipe_id: rating.recipe_id,
            user_id: rating.user_id,
            created_at: rating.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SingleRatingResponseDto {
    pub status: String,
    pub data: RatingDto,
}

/// Full statistics payload for one recipe's ratings.
#[derive(Debug, Serialize, Deserialize)]
pub struct RatingStatsDto {
    pub average_rating: Option<f64>,
    pub rating_count: i64,
    pub rating_distribution: BTreeMap<String, i64>,
}

impl RatingStatsDto {
    pub fn from_summary(summary: RatingSummary) -> Self {
        RatingStatsDto {
            average_rating: summary.average,
            rating_count: summary.count,
            rating_distribution: summary.distribution,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RatingStatsResponseDto {
    pub status: String,
    pub data: RatingStatsDto,
}

#[derive(Debug, Deserialize)]
pub struct VoteCreateDto {
    pub vote_type: VoteType,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::summarize_ratings;
    use validator::Validate;

    #[test]
    fn rating_range_bounds_are_inclusive() {
        let ok_low = RatingCreateDto {
            recipe_id: 1,
            rating: 1.0,
        };
        let ok_high = RatingCreateDto {
            recipe_id: 1,
            rating: 5.0,
        };
        assert!(ok_low.validate().is_ok());
        assert!(ok_high.validate().is_ok());

        let too_low = RatingCreateDto {
            recipe_id: 1,
            rating: 0.9,
        };
        let too_high = RatingCreateDto {
            recipe_id: 1,
            rating: 5.1,
        };
        assert!(too_low.validate().is_err());
        assert!(too_high.validate().is_err());
    }

    #[test]
    fn vote_type_rejects_unknown_values() {
        let up: VoteCreateDto = serde_json::from_str(r#"{"vote_type":"up"}"#).unwrap();
        assert_eq!(up.vote_type, VoteType::Up);
        let down: VoteCreateDto = serde_json::from_str(r#"{"vote_type":"down"}"#).unwrap();
        assert_eq!(down.vote_type, VoteType::Down);

        assert!(serde_json::from_str::<VoteCreateDto>(r#"{"vote_type":"sideways"}"#).is_err());
    }

    #[test]
    fn listing_limit_is_capped() {
        let over = RecipesQueryDto {
            skip: Some(0),
            limit: Some(101),
            search: None,
        };
        assert!(over.validate().is_err());

        let negative_skip = RecipesQueryDto {
            skip: Some(-1),
            limit: Some(10),
            search: None,
        };
        assert!(negative_skip.validate().is_err());

        let ok = RecipesQueryDto {
            skip: Some(0),
            limit: Some(100),
            search: Some("Cake".to_string()),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn sparse_update_deserializes_absent_fields_as_none() {
        let body: RecipeUpdateDto = serde_json::from_str(r#"{"title":"Brownies"}"#).unwrap();
        assert_eq!(body.title.as_deref(), Some("Brownies"));
        assert!(body.ingredients.is_none());
        assert!(body.instructions.is_none());
        assert!(body.servings.is_none());
    }

    #[test]
    fn decorate_attaches_stats_without_touching_the_row() {
        let recipe = Recipe {
            id: 7,
            title: "Lemon Cake".to_string(),
            description: None,
            ingredients: "lemons".to_string(),
            instructions: "bake".to_string(),
            prep_time: Some(20),
            cook_time: Some(40),
            servings: Some(8),
            difficulty: Some("easy".to_string()),
            image_url: None,
            author_id: 3,
            is_published: true,
            created_at: Utc::now(),
            updated_at: None,
        };
        let summary = summarize_ratings(&[4.0, 3.0]);
        let dto = RecipeDto::decorate(recipe, &summary);
        assert_eq!(dto.id, 7);
        assert_eq!(dto.average_rating, Some(3.5));
        assert_eq!(dto.rating_count, 2);
    }
}
