pub(crate) mod drinks;
pub(crate) mod health;

use crate::state::AppState;
use axum::routing::{delete, get, patch, post};
use axum::Router;

/// Combines all API routes into a single router
pub(super) fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(drinks_routes(state))
}

/// Drink routes; every route except the public listing requires a permission
fn drinks_routes(state: &AppState) -> Router<AppState> {
    let guard = |permission: &str| state.authorizer.guard(permission).layer();

    Router::new()
        .route(
            "/drinks",
            get(drinks::get_drinks)
                .merge(post(drinks::create_drink).route_layer(guard("post:drinks"))),
        )
        .route(
            "/drinks-detail",
            get(drinks::get_drinks_detail).route_layer(guard("get:drinks-detail")),
        )
        .route(
            "/drinks/{id}",
            patch(drinks::update_drink)
                .route_layer(guard("patch:drinks"))
                .merge(delete(drinks::delete_drink).route_layer(guard("delete:drinks"))),
        )
}
