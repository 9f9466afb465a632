use crate::{
    AppState,
    db::{CommentExt, RecipeExt},
    dtos::{FilterUserDto, Response, UserMeData, UserMeResponseDto},
    error::{ErrorMessage, HttpError},
    middleware::JWTAuthMiddleware,
};
use axum::{
    Extension, Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::instrument;

/// Router for user endpoints. The auth middleware is applied in routes.rs.
pub fn users_handler() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/logout", post(logout))
}

/// Current user's profile with recipe and comment counts.
#[instrument(skip(user, app_state), fields(username = %user.user.username))]
pub async fn get_me(
    Extension(user): Extension<JWTAuthMiddleware>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let filtered_user = FilterUserDto::filter_user(&user.user);

    let recipe_count = app_state
        .db_client
        .get_user_recipe_count(user.user.id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting user recipe count: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let comment_count = app_state
        .db_client
        .get_user_comment_count(user.user.id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting user comment count: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let response = Json(UserMeResponseDto {
        status: "success".to_string(),
        data: UserMeData {
            user: filtered_user,
            recipe_count,
            comment_count,
        },
    });
    tracing::info!("get_me successful");
    Ok(response)
}

/// Clear the access token cookie.
#[instrument(skip(user), fields(username = %user.user.username))]
pub async fn logout(
    Extension(user): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let expired_cookie = Cookie::build(("access_token", ""))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::seconds(0))
        .build();

    let cookie_jar = CookieJar::new().add(expired_cookie);

    let response = Json(Response {
        status: "success",
        message: "Logged out successfully".to_string(),
    });
    tracing::info!("Logout successful");
    Ok((cookie_jar, response))
}
