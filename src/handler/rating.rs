use crate::{
    AppState,
    db::{RatingExt, RecipeExt},
    dtos::{
        RatingCreateDto, RatingDto, RatingStatsDto, RatingStatsResponseDto, Response,
        SingleRatingResponseDto,
    },
    error::{ErrorMessage, HttpError},
    middleware::{JWTAuthMiddleware, auth},
    stats,
};
use axum::{
    Extension, Json, Router, middleware,
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post},
};
use tracing::instrument;
use validator::Validate;

/// Router for rating endpoints.
pub fn rating_handler(app_state: AppState) -> Router<AppState> {
    Router::new()
        // POST / - submit or overwrite the caller's rating (requires auth)
        .route(
            "/",
            post(create_rating)
                .route_layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        // GET /recipe/{recipe_id} - aggregate statistics (public)
        .route("/recipe/{recipe_id}", get(get_recipe_rating_stats))
        // GET /user/{user_id}/recipe/{recipe_id} - a user's own rating
        .route(
            "/user/{user_id}/recipe/{recipe_id}",
            get(get_user_rating)
                .route_layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        // DELETE /recipe/{recipe_id} - remove the caller's rating
        .route(
            "/recipe/{recipe_id}",
            delete(delete_rating)
                .route_layer(middleware::from_fn_with_state(app_state, auth)),
        )
}

/// Submit a rating for a recipe.
///
/// One rating per (user, recipe): a repeat submission overwrites the
/// stored value in place rather than being rejected. The recipe's derived
/// average changes on the next read; nothing is cached.
#[instrument(skip(app_state, body, jwt), fields(username = %jwt.user.username))]
pub async fn create_rating(
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
    Json(body): Json<RatingCreateDto>,
) -> Result<impl IntoResponse, HttpError> {
    // The only validated field is the rating range.
    body.validate().map_err(|e| {
        tracing::error!("Invalid create_rating input: {}", e);
        HttpError::bad_request(ErrorMessage::InvalidRatingValue.to_string())
    })?;

    app_state
        .db_client
        .get_recipe(body.recipe_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting recipe: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::RecipeNotFound.to_string()))?;

    let rating = app_state
        .db_client
        .upsert_rating(jwt.user.id, body.recipe_id, body.rating)
        .await
        .map_err(|e| {
            tracing::error!("DB error, upserting rating: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let response = Json(SingleRatingResponseDto {
        status: "success".to_string(),
        data: RatingDto::from_model(&rating),
    });
    tracing::info!("create_rating successful");
    Ok(response)
}

/// Aggregate rating statistics for a recipe: average (2 dp), count and the
/// five-bucket distribution. Zero ratings yield a null average and zeroed
/// buckets, never an error.
#[instrument(skip(app_state))]
pub async fn get_recipe_rating_stats(
    Path(recipe_id): Path<i32>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .db_client
        .get_recipe(recipe_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting recipe: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::RecipeNotFound.to_string()))?;

    let values = app_state
        .db_client
        .get_recipe_rating_values(recipe_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting rating values: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let summary = stats::summarize_ratings(&values);

    let response = Json(RatingStatsResponseDto {
        status: "success".to_string(),
        data: RatingStatsDto::from_summary(summary),
    });
    tracing::info!("get_recipe_rating_stats successful");
    Ok(response)
}

/// Fetch a user's rating for a recipe.
///
/// Self-view only: the path user id must match the authenticated caller,
/// otherwise 403 regardless of whether a rating exists.
#[instrument(skip(app_state, jwt), fields(username = %jwt.user.username))]
pub async fn get_user_rating(
    Path((user_id, recipe_id)): Path<(i32, i32)>,
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    if user_id != jwt.user.id {
        return Err(HttpError::forbidden(
            ErrorMessage::PermissionDenied.to_string(),
        ));
    }

    let rating = app_state
        .db_client
        .get_user_rating(user_id, recipe_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting user rating: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::RatingNotFound.to_string()))?;

    let response = Json(SingleRatingResponseDto {
        status: "success".to_string(),
        data: RatingDto::from_model(&rating),
    });
    tracing::info!("get_user_rating successful");
    Ok(response)
}

/// Remove the caller's own rating for a recipe.
#[instrument(skip(app_state, jwt), fields(username = %jwt.user.username))]
pub async fn delete_rating(
    Path(recipe_id): Path<i32>,
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let result = app_state
        .db_client
        .delete_rating(jwt.user.id, recipe_id)
        .await;

    match result {
        Ok(()) => {
            tracing::info!("delete_rating successful");
            Ok(Json(Response {
                status: "success",
                message: "Rating deleted successfully".to_string(),
            }))
        }
        Err(sqlx::Error::RowNotFound) => Err(HttpError::not_found(
            ErrorMessage::RatingNotFound.to_string(),
        )),
        Err(e) => {
            tracing::error!("DB error, deleting rating: {}", e);
            Err(HttpError::server_error(
                ErrorMessage::ServerError.to_string(),
            ))
        }
    }
}
