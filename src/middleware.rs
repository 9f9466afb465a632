use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::IntoResponse,
};

use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    db::UserExt,
    error::{ErrorMessage, HttpError},
    models::User,
    utils::token,
};

/// Authenticated caller, inserted into request extensions by [`auth`].
///
/// Handlers extract it with `Extension(jwt): Extension<JWTAuthMiddleware>`
/// and trust `jwt.user.id` as the caller identity; credentials themselves
/// are never re-verified past this point.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JWTAuthMiddleware {
    pub user: User,
}

/// JWT authentication middleware.
///
/// Token sources, in order: `access_token` cookie, then
/// `Authorization: Bearer <token>`. The decoded subject is the numeric user
/// id; the user must still exist and be active.
pub async fn auth(
    cookie_jar: CookieJar,
    State(app_state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let cookies = cookie_jar
        .get("access_token")
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|auth_header| auth_header.to_str().ok())
                .and_then(|auth_value| {
                    auth_value
                        .strip_prefix("Bearer ")
                        .map(|token| token.to_owned())
                })
        });

    let token = cookies
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::TokenNotProvided.to_string()))?;

    let subject = token::decode_token(token, app_state.env.jwt_secret.as_bytes())
        .map_err(|_| HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()))?;

    let user_id = subject
        .parse::<i32>()
        .map_err(|_| HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()))?;

    let user = app_state
        .db_client
        .get_user(Some(user_id), None, None)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting user for auth: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    // Token may outlive its account: deleted or deactivated users fail here.
    let user =
        user.ok_or_else(|| HttpError::unauthorized(ErrorMessage::UserNoLongerExist.to_string()))?;

    if !user.is_active {
        return Err(HttpError::unauthorized(
            ErrorMessage::InactiveUser.to_string(),
        ));
    }

    req.extensions_mut()
        .insert(JWTAuthMiddleware { user });

    Ok(next.run(req).await)
}
