use crate::{
    AppState,
    db::{CommentExt, RecipeExt, VoteExt},
    dtos::{
        CommentCreateDto, CommentDto, CommentListResponseDto, CommentUpdateDto, Response,
        SingleCommentResponseDto, VoteCreateDto,
    },
    error::{ErrorMessage, HttpError},
    middleware::{JWTAuthMiddleware, auth},
    stats,
};
use axum::{
    Extension, Json, Router, middleware,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use tracing::instrument;
use validator::Validate;

/// Router for comment and comment-vote endpoints.
pub fn comment_handler(app_state: AppState) -> Router<AppState> {
    Router::new()
        // GET /recipe/{recipe_id} - active comments for a recipe (public)
        .route("/recipe/{recipe_id}", get(get_recipe_comments))
        // POST / - create comment, optionally as a reply (requires auth)
        .route(
            "/",
            post(create_comment)
                .route_layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        // PUT/DELETE /{comment_id} - author-only edit and soft delete
        .route(
            "/{comment_id}",
            put(update_comment)
                .delete(delete_comment)
                .route_layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        // POST/DELETE /{comment_id}/vote - upsert or remove the caller's vote
        .route(
            "/{comment_id}/vote",
            post(vote_comment)
                .delete(remove_vote)
                .route_layer(middleware::from_fn_with_state(app_state, auth)),
        )
}

/// Active comments for a recipe, each decorated with vote tallies.
///
/// There is no published-state check on the parent recipe, and no stored
/// counters: tallies are recomputed from the vote rows on every request.
#[instrument(skip(app_state))]
pub async fn get_recipe_comments(
    Path(recipe_id): Path<i32>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let comments = app_state
        .db_client
        .get_recipe_comments(recipe_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting comments: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let mut data = Vec::with_capacity(comments.len());
    for comment in comments {
        let votes = app_state
            .db_client
            .get_comment_vote_types(comment.id)
            .await
            .map_err(|e| {
                tracing::error!("DB error, getting comment votes: {}", e);
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            })?;
        let tally = stats::tally_votes(&votes);
        data.push(CommentDto::decorate(comment, tally));
    }

    let results = data.len();
    let response = Json(CommentListResponseDto {
        status: "success".to_string(),
        data,
        results,
    });
    tracing::info!("get_recipe_comments successful");
    Ok(response)
}

/// Create a comment, optionally nested under a parent comment.
#[instrument(skip(app_state, body, jwt), fields(username = %jwt.user.username))]
pub async fn create_comment(
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
    Json(body): Json<CommentCreateDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid create_comment input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    // The recipe must exist; a dangling parent_id is caught by its FK.
    app_state
        .db_client
        .get_recipe(body.recipe_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting recipe: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::RecipeNotFound.to_string()))?;

    let result = app_state
        .db_client
        .create_comment(jwt.user.id, body.recipe_id, &body.content, body.parent_id)
        .await;

    let comment = match result {
        Ok(comment) => comment,
        Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
            tracing::error!("FK violation, creating comment: {}", db_err);
            return Err(HttpError::bad_request("Parent comment not found"));
        }
        Err(e) => {
            tracing::error!("DB error, creating comment: {}", e);
            return Err(HttpError::server_error(
                ErrorMessage::ServerError.to_string(),
            ));
        }
    };

    let response = Json(SingleCommentResponseDto {
        status: "success".to_string(),
        data: CommentDto::decorate(comment, stats::tally_votes(&[])),
    });
    tracing::info!("create_comment successful");
    Ok((StatusCode::CREATED, response))
}

/// Replace a comment's content. Author only.
#[instrument(skip(app_state, body, jwt), fields(username = %jwt.user.username))]
pub async fn update_comment(
    Path(comment_id): Path<i32>,
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
    Json(body): Json<CommentUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid update_comment input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let comment = app_state
        .db_client
        .get_comment(comment_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting comment: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::CommentNotFound.to_string()))?;

    if comment.author_id != jwt.user.id {
        return Err(HttpError::forbidden(
            ErrorMessage::PermissionDenied.to_string(),
        ));
    }

    let updated = app_state
        .db_client
        .edit_comment(comment_id, &body.content)
        .await
        .map_err(|e| {
            tracing::error!("DB error, editing comment: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let votes = app_state
        .db_client
        .get_comment_vote_types(updated.id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting comment votes: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let response = Json(SingleCommentResponseDto {
        status: "success".to_string(),
        data: CommentDto::decorate(updated, stats::tally_votes(&votes)),
    });
    tracing::info!("update_comment successful");
    Ok(response)
}

/// Soft-delete a comment (is_active = false). Author only.
#[instrument(skip(app_state, jwt), fields(username = %jwt.user.username))]
pub async fn delete_comment(
    Path(comment_id): Path<i32>,
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let comment = app_state
        .db_client
        .get_comment(comment_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting comment: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::CommentNotFound.to_string()))?;

    if comment.author_id != jwt.user.id {
        return Err(HttpError::forbidden(
            ErrorMessage::PermissionDenied.to_string(),
        ));
    }

    app_state
        .db_client
        .soft_delete_comment(comment_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, deleting comment: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;
    tracing::info!("delete_comment successful");
    Ok(StatusCode::NO_CONTENT)
}

/// Cast or change the caller's vote on a comment.
///
/// One vote per (user, comment): an existing row has its direction
/// overwritten, including re-submission of the same direction.
#[instrument(skip(app_state, body, jwt), fields(username = %jwt.user.username))]
pub async fn vote_comment(
    Path(comment_id): Path<i32>,
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
    Json(body): Json<VoteCreateDto>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .db_client
        .get_comment(comment_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting comment: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::CommentNotFound.to_string()))?;

    app_state
        .db_client
        .upsert_vote(jwt.user.id, comment_id, body.vote_type)
        .await
        .map_err(|e| {
            tracing::error!("DB error, upserting vote: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let response = Json(Response {
        status: "success",
        message: "Vote recorded successfully".to_string(),
    });
    tracing::info!("vote_comment successful");
    Ok(response)
}

/// Remove the caller's own vote from a comment.
#[instrument(skip(app_state, jwt), fields(username = %jwt.user.username))]
pub async fn remove_vote(
    Path(comment_id): Path<i32>,
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let result = app_state
        .db_client
        .delete_vote(jwt.user.id, comment_id)
        .await;

    match result {
        Ok(()) => {
            tracing::info!("remove_vote successful");
            Ok(Json(Response {
                status: "success",
                message: "Vote removed successfully".to_string(),
            }))
        }
        Err(sqlx::Error::RowNotFound) => Err(HttpError::not_found(
            ErrorMessage::VoteNotFound.to_string(),
        )),
        Err(e) => {
            tracing::error!("DB error, removing vote: {}", e);
            Err(HttpError::server_error(
                ErrorMessage::ServerError.to_string(),
            ))
        }
    }
}
