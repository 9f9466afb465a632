use crate::{
    AppState,
    db::UserExt,
    dtos::{LoginUserDto, RegisterUserDto, Response, UserLoginResponseDto},
    error::{ErrorMessage, HttpError},
    utils::{password, token},
};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::instrument;
use validator::Validate;

/// Router for authentication endpoints
pub fn auth_handler() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Register a new user account.
///
/// Hashes the password before storing; duplicate username or email
/// surfaces as 409.
#[instrument(skip(app_state, body), fields(username = %body.username, email = %body.email))]
pub async fn register(
    State(app_state): State<AppState>,
    Json(body): Json<RegisterUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid register input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let hashed_password = password::hash(&body.password).map_err(|e| {
        tracing::error!("Password hashing error: {}", e);
        HttpError::server_error(e.to_string())
    })?;

    let result = app_state
        .db_client
        .save_user(
            &body.username,
            &body.email,
            &hashed_password,
            body.full_name.as_deref(),
        )
        .await;

    match result {
        Ok(_user) => {
            tracing::info!(username = %body.username, "Register successful");
            Ok((
                StatusCode::CREATED,
                Json(Response {
                    status: "success",
                    message: "Registration successful!".to_string(),
                }),
            ))
        }
        Err(sqlx::Error::Database(db_err)) => {
            if db_err.is_unique_violation() {
                tracing::error!("DB error, saving user, unique violation: {}", db_err);
                Err(HttpError::unique_constraint_violation(
                    "Username or email already registered",
                ))
            } else {
                tracing::error!("DB error, saving user: {}", db_err);
                Err(HttpError::server_error(
                    ErrorMessage::ServerError.to_string(),
                ))
            }
        }
        Err(e) => {
            tracing::error!("DB error, saving user: {}", e);
            Err(HttpError::server_error(
                ErrorMessage::ServerError.to_string(),
            ))
        }
    }
}

/// Login with username and password.
///
/// On success the JWT is returned in the body and also set as an http-only
/// cookie for browser clients. Failures are deliberately vague.
#[instrument(skip(app_state, body), fields(username = %body.username))]
pub async fn login(
    State(app_state): State<AppState>,
    Json(body): Json<LoginUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid login input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let result = app_state
        .db_client
        .get_user(None, Some(&body.username), None)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting user: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let user = result.ok_or_else(|| {
        tracing::error!("User not found");
        HttpError::unauthorized("Incorrect username or password")
    })?;

    if !user.is_active {
        return Err(HttpError::unauthorized(
            ErrorMessage::InactiveUser.to_string(),
        ));
    }

    let password_matched =
        password::compare(&body.password, &user.hashed_password).map_err(|e| {
            tracing::error!("Password error: {}", e);
            HttpError::unauthorized("Incorrect username or password")
        })?;

    if !password_matched {
        tracing::error!("Password mismatch");
        return Err(HttpError::unauthorized("Incorrect username or password"));
    }

    let access_token = token::create_token(
        &user.id.to_string(),
        app_state.env.jwt_secret.as_bytes(),
        app_state.env.jwt_maxage,
    )
    .map_err(|e| {
        tracing::error!("Access token creation error: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    let access_cookie = Cookie::build(("access_token", access_token.clone()))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::seconds(app_state.env.jwt_maxage))
        .build();

    let cookie_jar = CookieJar::new().add(access_cookie);

    let response = Json(UserLoginResponseDto {
        status: "success".to_string(),
        access_token,
        username: user.username,
    });
    tracing::info!("Login successful");
    Ok((cookie_jar, response))
}
