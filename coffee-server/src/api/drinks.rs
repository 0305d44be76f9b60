use crate::errors::ApiError;
use crate::models::{DeleteResponse, Drink, DrinkShort, DrinkUpdate, DrinksResponse, NewDrink};
use crate::openapi::DRINKS_TAG;
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Json, Path, State};
use coffee_auth::Claims;
use log::info;

/// List every drink with its short recipe
#[utoipa::path(
    get,
    path = "/drinks",
    tag = DRINKS_TAG,
    responses(
        (status = 200, description = "All drinks in short form", body = DrinksResponse<DrinkShort>)
    )
)]
pub(crate) async fn get_drinks(State(state): State<AppState>) -> Json<DrinksResponse<DrinkShort>> {
    let drinks = state.drinks.list().await;
    Json(DrinksResponse::new(drinks.iter().map(Drink::short).collect()))
}

/// List every drink with its full recipe
#[utoipa::path(
    get,
    path = "/drinks-detail",
    tag = DRINKS_TAG,
    security(("bearer" = ["get:drinks-detail"])),
    responses(
        (status = 200, description = "All drinks in long form", body = DrinksResponse<Drink>),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token lacks the get:drinks-detail permission")
    )
)]
pub(crate) async fn get_drinks_detail(
    _claims: Claims,
    State(state): State<AppState>,
) -> Json<DrinksResponse<Drink>> {
    Json(DrinksResponse::new(state.drinks.list().await))
}

/// Create a drink
#[utoipa::path(
    post,
    path = "/drinks",
    tag = DRINKS_TAG,
    request_body = NewDrink,
    security(("bearer" = ["post:drinks"])),
    responses(
        (status = 200, description = "The created drink", body = DrinksResponse<Drink>),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token lacks the post:drinks permission"),
        (status = 422, description = "Malformed drink or duplicate title")
    )
)]
pub(crate) async fn create_drink(
    claims: Claims,
    State(state): State<AppState>,
    body: Result<Json<NewDrink>, JsonRejection>,
) -> Result<Json<DrinksResponse<Drink>>, ApiError> {
    let Json(new_drink) = body?;
    let drink = state
        .drinks
        .create(new_drink.title, new_drink.recipe.into())
        .await?;
    info!("{} created drink {} '{}'", claims.subject(), drink.id, drink.title);
    Ok(Json(DrinksResponse::new(vec![drink])))
}

/// Update a drink's title and/or recipe
#[utoipa::path(
    patch,
    path = "/drinks/{id}",
    tag = DRINKS_TAG,
    request_body = DrinkUpdate,
    params(
        ("id" = u64, Path, description = "Drink id"),
    ),
    security(("bearer" = ["patch:drinks"])),
    responses(
        (status = 200, description = "The updated drink", body = DrinksResponse<Drink>),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token lacks the patch:drinks permission"),
        (status = 404, description = "No drink with this id"),
        (status = 422, description = "Malformed update or duplicate title")
    )
)]
pub(crate) async fn update_drink(
    claims: Claims,
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    body: Result<Json<DrinkUpdate>, JsonRejection>,
) -> Result<Json<DrinksResponse<Drink>>, ApiError> {
    let Path(id) = id?;
    let Json(update) = body?;
    let drink = state
        .drinks
        .update(id, update.title, update.recipe.map(Into::into))
        .await?;
    info!("{} updated drink {}", claims.subject(), drink.id);
    Ok(Json(DrinksResponse::new(vec![drink])))
}

/// Delete a drink
#[utoipa::path(
    delete,
    path = "/drinks/{id}",
    tag = DRINKS_TAG,
    params(
        ("id" = u64, Path, description = "Drink id"),
    ),
    security(("bearer" = ["delete:drinks"])),
    responses(
        (status = 200, description = "Id of the deleted drink", body = DeleteResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token lacks the delete:drinks permission"),
        (status = 404, description = "No drink with this id")
    )
)]
pub(crate) async fn delete_drink(
    claims: Claims,
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let Path(id) = id?;
    let drink = state.drinks.delete(id).await?;
    info!("{} deleted drink {}", claims.subject(), drink.id);
    Ok(Json(DeleteResponse {
        success: true,
        delete: drink.id,
    }))
}
