use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::dto::{AuthResponse, LoginRequest, ProfileRequest, PublicUser, RegisterRequest};
use crate::auth::jwt::{JwtKeys, TokenKind};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::UserRepository;
use crate::auth::repo_types::{NewUser, ProfileUpdate, User};
use crate::error::{AppError, AppResult};
use crate::validation::{
    is_valid_email, validate_profile, validate_registration, DEFAULT_CALORIES_PER_DAY,
};

pub const DUPLICATE_EMAIL: &str = "User with this email already exists";

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Daily calorie target of the caller; a token for a vanished user is unauthorized.
pub async fn daily_target(users: &dyn UserRepository, user_id: Uuid) -> AppResult<i32> {
    current_user(users, user_id).await.map(|u| u.calories_per_day)
}

pub async fn current_user(users: &dyn UserRepository, user_id: Uuid) -> AppResult<User> {
    users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))
}

/// Email must be free or already belong to `self_id`.
async fn ensure_email_available(
    users: &dyn UserRepository,
    email: &str,
    self_id: Option<Uuid>,
) -> AppResult<()> {
    match users.find_by_email(email).await? {
        Some(other) if Some(other.id) != self_id => {
            warn!(%email, "email already registered");
            Err(AppError::Conflict(DUPLICATE_EMAIL.into()))
        }
        _ => Ok(()),
    }
}

fn email_conflict(e: AppError) -> AppError {
    match e {
        AppError::DuplicateKey(_) => AppError::Conflict(DUPLICATE_EMAIL.into()),
        other => other,
    }
}

fn issue_tokens(keys: &JwtKeys, user: User) -> AppResult<AuthResponse> {
    Ok(AuthResponse {
        access_token: keys.sign_access(user.id)?,
        refresh_token: keys.sign_refresh(user.id)?,
        user: PublicUser::from(user),
    })
}

pub async fn register(
    users: &dyn UserRepository,
    keys: &JwtKeys,
    req: RegisterRequest,
) -> AppResult<AuthResponse> {
    let email = normalize_email(&req.email);
    let name = req.name.trim().to_string();
    let calories_per_day = req.calories_per_day.unwrap_or(DEFAULT_CALORIES_PER_DAY);
    validate_registration(&name, &email, &req.password, calories_per_day)?;
    ensure_email_available(users, &email, None).await?;

    let user = users
        .create(NewUser {
            name,
            email,
            password_hash: hash_password(&req.password)?,
            calories_per_day,
        })
        .await
        .map_err(email_conflict)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    issue_tokens(keys, user)
}

pub async fn login(
    users: &dyn UserRepository,
    keys: &JwtKeys,
    req: LoginRequest,
) -> AppResult<AuthResponse> {
    let invalid = || AppError::Unauthorized("Invalid credentials".into());
    let email = normalize_email(&req.email);
    if !is_valid_email(&email) {
        return Err(invalid());
    }

    let Some(user) = users.find_by_email(&email).await? else {
        warn!(%email, "login unknown email");
        return Err(invalid());
    };
    if !verify_password(&req.password, &user.password_hash)? {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Err(invalid());
    }

    info!(user_id = %user.id, "user logged in");
    issue_tokens(keys, user)
}

pub async fn refresh(
    users: &dyn UserRepository,
    keys: &JwtKeys,
    refresh_token: &str,
) -> AppResult<AuthResponse> {
    let claims = keys
        .verify_kind(refresh_token, TokenKind::Refresh)
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;
    let user = current_user(users, claims.sub).await?;
    issue_tokens(keys, user)
}

pub async fn update_profile(
    users: &dyn UserRepository,
    user_id: Uuid,
    req: ProfileRequest,
) -> AppResult<User> {
    let profile = ProfileUpdate {
        name: req.name.trim().to_string(),
        email: normalize_email(&req.email),
        calories_per_day: req.calories_per_day,
    };
    validate_profile(&profile.name, &profile.email, profile.calories_per_day)?;
    ensure_email_available(users, &profile.email, Some(user_id)).await?;

    let user = users
        .update_profile(user_id, profile)
        .await
        .map_err(email_conflict)?
        .ok_or_else(|| AppError::NoRowAffected(format!("User id={user_id} missed")))?;
    info!(%user_id, calories_per_day = user.calories_per_day, "profile updated");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::memory::InMemoryUserRepository;
    use crate::config::JwtConfig;

    fn keys() -> JwtKeys {
        JwtKeys::from(&JwtConfig {
            secret: "test".into(),
            issuer: "test".into(),
            audience: "test".into(),
            ttl_minutes: 5,
            refresh_ttl_minutes: 60,
        })
    }

    fn registration(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "User".into(),
            email: email.into(),
            password: "password".into(),
            calories_per_day: None,
        }
    }

    #[tokio::test]
    async fn register_normalizes_email_and_defaults_target() {
        let users = InMemoryUserRepository::new();
        let resp = register(&users, &keys(), registration("  User@Yandex.RU ")).await.unwrap();
        assert_eq!(resp.user.email, "user@yandex.ru");
        assert_eq!(resp.user.calories_per_day, DEFAULT_CALORIES_PER_DAY);
        assert_eq!(daily_target(&users, resp.user.id).await.unwrap(), 2000);
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let users = InMemoryUserRepository::new();
        register(&users, &keys(), registration("user@yandex.ru")).await.unwrap();
        let err = register(&users, &keys(), registration("USER@yandex.ru")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn login_checks_password() {
        let users = InMemoryUserRepository::new();
        register(&users, &keys(), registration("user@yandex.ru")).await.unwrap();

        let ok = login(
            &users,
            &keys(),
            LoginRequest {
                email: "user@yandex.ru".into(),
                password: "password".into(),
            },
        )
        .await
        .unwrap();
        assert!(keys().verify_kind(&ok.access_token, TokenKind::Access).is_ok());

        let err = login(
            &users,
            &keys(),
            LoginRequest {
                email: "user@yandex.ru".into(),
                password: "wrong".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn refresh_rejects_access_tokens() {
        let users = InMemoryUserRepository::new();
        let resp = register(&users, &keys(), registration("user@yandex.ru")).await.unwrap();
        assert!(refresh(&users, &keys(), &resp.refresh_token).await.is_ok());
        assert!(matches!(
            refresh(&users, &keys(), &resp.access_token).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn profile_update_keeps_own_email_but_not_others() {
        let users = InMemoryUserRepository::new();
        let me = register(&users, &keys(), registration("user@yandex.ru")).await.unwrap().user;
        register(&users, &keys(), registration("admin@gmail.com")).await.unwrap();

        let updated = update_profile(
            &users,
            me.id,
            ProfileRequest {
                name: "UpdatedName".into(),
                email: "user@yandex.ru".into(),
                calories_per_day: 330,
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.calories_per_day, 330);
        assert_eq!(daily_target(&users, me.id).await.unwrap(), 330);

        let err = update_profile(
            &users,
            me.id,
            ProfileRequest {
                name: "UpdatedName".into(),
                email: "admin@gmail.com".into(),
                calories_per_day: 330,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn unknown_user_has_no_target() {
        let users = InMemoryUserRepository::new();
        assert!(matches!(
            daily_target(&users, Uuid::new_v4()).await,
            Err(AppError::Unauthorized(_))
        ));
    }
}
