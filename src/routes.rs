use axum::{Json, Router, middleware, routing::get};
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    dtos::Response,
    handler::{
        auth::auth_handler, comment::comment_handler, rating::rating_handler,
        recipe::recipe_handler, users::users_handler,
    },
    middleware::auth,
};

pub fn create_router(app_state: AppState) -> Router {
    let api_route = Router::new()
        .route("/health", get(health_check))
        .nest("/auth", auth_handler())
        .nest(
            "/users",
            users_handler().layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        .nest("/recipes", recipe_handler(app_state.clone()))
        .nest("/comments", comment_handler(app_state.clone()))
        .nest("/ratings", rating_handler(app_state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    Router::new().nest("/api", api_route)
}

async fn health_check() -> Json<Response> {
    Json(Response {
        status: "success",
        message: "healthy".to_string(),
    })
}
