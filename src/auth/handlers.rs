use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            AuthResponse, LoginRequest, ProfileRequest, PublicUser, RefreshRequest,
            RegisterRequest,
        },
        jwt::{AuthUser, JwtKeys},
        services,
    },
    error::AppResult,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let resp = services::register(state.users.as_ref(), &keys, payload).await?;
    Ok(Json(resp))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let resp = services::login(state.users.as_ref(), &keys, payload).await?;
    Ok(Json(resp))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let resp = services::refresh(state.users.as_ref(), &keys, &payload.refresh_token).await?;
    Ok(Json(resp))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<PublicUser>> {
    let user = services::current_user(state.users.as_ref(), user_id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ProfileRequest>,
) -> AppResult<Json<PublicUser>> {
    let user = services::update_profile(state.users.as_ref(), user_id, payload).await?;
    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{app::build_app, state::AppState};

    async fn call(state: &AppState, req: Request<Body>) -> (StatusCode, Value) {
        let resp = build_app(state.clone()).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn register_then_read_and_update_profile() {
        let state = AppState::fake();
        let (status, body) = call(
            &state,
            post_json(
                "/api/v1/auth/register",
                json!({
                    "name": "New",
                    "email": "new@gmail.com",
                    "password": "newPass",
                    "calories_per_day": 1555,
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["calories_per_day"], 1555);
        let token = body["access_token"].as_str().unwrap().to_string();

        let (status, me) = call(
            &state,
            Request::builder()
                .uri("/api/v1/profile")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["email"], "new@gmail.com");
        assert!(me.get("password_hash").is_none());

        let (status, updated) = call(
            &state,
            Request::builder()
                .method("PUT")
                .uri("/api/v1/profile")
                .header("Authorization", format!("Bearer {token}"))
                .header("Content-Type", "application/json")
                .body(Body::from(
                    json!({
                        "name": "Renamed",
                        "email": "new@gmail.com",
                        "calories_per_day": 1800,
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["calories_per_day"], 1800);
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_401() {
        let state = AppState::fake();
        call(
            &state,
            post_json(
                "/api/v1/auth/register",
                json!({ "name": "User", "email": "user@yandex.ru", "password": "password" }),
            ),
        )
        .await;
        let (status, _) = call(
            &state,
            post_json(
                "/api/v1/auth/login",
                json!({ "email": "user@yandex.ru", "password": "nope" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = call(
            &state,
            post_json(
                "/api/v1/auth/login",
                json!({ "email": "USER@yandex.ru", "password": "password" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["refresh_token"].is_string());
    }
}
