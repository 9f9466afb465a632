use crate::{
    AppState,
    db::{RatingExt, RecipeExt},
    dtos::{
        RecipeCreateDto, RecipeDto, RecipeListResponseDto, RecipeUpdateDto, RecipesQueryDto,
        SingleRecipeResponseDto,
    },
    error::{ErrorMessage, HttpError},
    middleware::{JWTAuthMiddleware, auth},
    stats,
};
use axum::{
    Extension, Json, Router, middleware,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use tracing::instrument;
use validator::Validate;

/// Router for recipe endpoints. Reads are public; mutations require auth.
pub fn recipe_handler(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_recipes))
        .route(
            "/",
            post(create_recipe)
                .route_layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        .route("/{recipe_id}", get(get_recipe))
        .route(
            "/{recipe_id}",
            put(update_recipe)
                .delete(delete_recipe)
                .route_layer(middleware::from_fn_with_state(app_state, auth)),
        )
}

/// List published recipes, optionally filtered by title substring.
///
/// Query params: ?skip=0&limit=100&search=Cake
/// Each row is decorated with average_rating and rating_count, recomputed
/// from the ratings table on every request.
#[instrument(skip(app_state))]
pub async fn list_recipes(
    Query(params): Query<RecipesQueryDto>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    params.validate().map_err(|e| {
        tracing::error!("Invalid list_recipes input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let skip = params.skip.unwrap_or(0);
    let limit = params.limit.unwrap_or(100);

    let recipes = app_state
        .db_client
        .list_recipes(skip, limit, params.search.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("DB error, listing recipes: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let mut data = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        let values = app_state
            .db_client
            .get_recipe_rating_values(recipe.id)
            .await
            .map_err(|e| {
                tracing::error!("DB error, getting rating values: {}", e);
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            })?;
        let summary = stats::summarize_ratings(&values);
        data.push(RecipeDto::decorate(recipe, &summary));
    }

    let results = data.len();
    let response = Json(RecipeListResponseDto {
        status: "success".to_string(),
        data,
        results,
    });
    tracing::info!("list_recipes successful");
    Ok(response)
}

/// Fetch one recipe by id.
///
/// Unpublished recipes are returned here even though listings hide them;
/// the asymmetry matches the reference API.
#[instrument(skip(app_state))]
pub async fn get_recipe(
    Path(recipe_id): Path<i32>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let recipe = app_state
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
        .get_recipe_rating_values(recipe.id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting rating values: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;
    let summary = stats::summarize_ratings(&values);

    let response = Json(SingleRecipeResponseDto {
        status: "success".to_string(),
        data: RecipeDto::decorate(recipe, &summary),
    });
    tracing::info!("get_recipe successful");
    Ok(response)
}

/// Create a recipe owned by the caller.
#[instrument(skip(app_state, body, jwt), fields(username = %jwt.user.username))]
pub async fn create_recipe(
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
    Json(body): Json<RecipeCreateDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid create_recipe input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let recipe = app_state
        .db_client
        .create_recipe(jwt.user.id, &body)
        .await
        .map_err(|e| {
            tracing::error!("DB error, creating recipe: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    // A brand new recipe has no ratings yet.
    let summary = stats::summarize_ratings(&[]);
    let response = Json(SingleRecipeResponseDto {
        status: "success".to_string(),
        data: RecipeDto::decorate(recipe, &summary),
    });
    tracing::info!("create_recipe successful");
    Ok((StatusCode::CREATED, response))
}

/// Partially update a recipe. Author only; absent fields stay untouched.
#[instrument(skip(app_state, body, jwt), fields(username = %jwt.user.username))]
pub async fn update_recipe(
    Path(recipe_id): Path<i32>,
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
    Json(body): Json<RecipeUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid update_recipe input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    // Existence first, ownership second: NotFound beats Forbidden.
    let recipe = app_state
        .db_client
        .get_recipe(recipe_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting recipe: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::RecipeNotFound.to_string()))?;

    if recipe.author_id != jwt.user.id {
        return Err(HttpError::forbidden(
            ErrorMessage::PermissionDenied.to_string(),
        ));
    }

    let updated = app_state
        .db_client
        .update_recipe(recipe_id, &body)
        .await
        .map_err(|e| {
            tracing::error!("DB error, updating recipe: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let values = app_state
        .db_client
        .get_recipe_rating_values(updated.id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting rating values: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;
    let summary = stats::summarize_ratings(&values);

    let response = Json(SingleRecipeResponseDto {
        status: "success".to_string(),
        data: RecipeDto::decorate(updated, &summary),
    });
    tracing::info!("update_recipe successful");
    Ok(response)
}

/// Hard-delete a recipe. Author only; dependents cascade in the database.
#[instrument(skip(app_state, jwt), fields(username = %jwt.user.username))]
pub async fn delete_recipe(
    Path(recipe_id): Path<i32>,
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let recipe = app_state
        .db_client
        .get_recipe(recipe_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting recipe: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::RecipeNotFound.to_string()))?;

    if recipe.author_id != jwt.user.id {
        return Err(HttpError::forbidden(
            ErrorMessage::PermissionDenied.to_string(),
        ));
    }

    app_state
        .db_client
        .delete_recipe(recipe_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, deleting recipe: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;
    tracing::info!("delete_recipe successful");
    Ok(StatusCode::NO_CONTENT)
}
