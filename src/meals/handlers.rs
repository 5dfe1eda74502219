use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{jwt::AuthUser, services::daily_target},
    error::{AppError, AppResult},
    meals::{
        dto::{MealFilter, MealPayload, MealTo},
        repo_types::Meal,
        services,
    },
    state::AppState,
};

pub const MEALS_URL: &str = "/api/v1/meals";

pub fn read_router() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals))
        .route("/meals/filter", get(filter_meals))
        .route("/meals/:id", get(get_meal))
}

pub fn write_router() -> Router<AppState> {
    Router::new()
        .route("/meals", post(create_meal))
        .route("/meals/:id", put(update_meal).delete(delete_meal))
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<MealTo>>> {
    let target = daily_target(state.users.as_ref(), user_id).await?;
    let tos = services::list_all(state.meals.as_ref(), user_id, target).await?;
    Ok(Json(tos))
}

#[instrument(skip(state))]
pub async fn filter_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(filter): Query<MealFilter>,
) -> AppResult<Json<Vec<MealTo>>> {
    let target = daily_target(state.users.as_ref(), user_id).await?;
    let tos = services::list_filtered(state.meals.as_ref(), user_id, target, &filter).await?;
    Ok(Json(tos))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Meal>> {
    let meal = services::get(state.meals.as_ref(), user_id, id).await?;
    Ok(Json(meal))
}

#[instrument(skip(state, payload))]
pub async fn create_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<MealPayload>,
) -> AppResult<(StatusCode, HeaderMap, Json<Meal>)> {
    let created = services::create(state.meals.as_ref(), user_id, payload).await?;

    let id = created
        .id
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("store returned meal without id")))?;
    let mut headers = HeaderMap::new();
    let location = HeaderValue::from_str(&format!("{}/{}", MEALS_URL, id))
        .map_err(|e| AppError::Internal(e.into()))?;
    headers.insert(header::LOCATION, location);

    Ok((StatusCode::CREATED, headers, Json(created)))
}

#[instrument(skip(state, payload))]
pub async fn update_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<MealPayload>,
) -> AppResult<StatusCode> {
    services::update(state.meals.as_ref(), user_id, id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    services::delete(state.meals.as_ref(), user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
