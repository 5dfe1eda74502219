use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::repo::UserRepository;
use crate::auth::repo_types::{NewUser, ProfileUpdate, User};
use crate::error::{AppError, AppResult};

/// Process-local user store with the same unique-email rule as `users_unique_email_idx`.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::DuplicateKey("users_unique_email_idx".into()));
        }
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            calories_per_day: user.calories_per_day,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn update_profile(&self, id: Uuid, profile: ProfileUpdate) -> AppResult<Option<User>> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.id != id && u.email == profile.email) {
            return Err(AppError::DuplicateKey("users_unique_email_idx".into()));
        }
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.name = profile.name;
        user.email = profile.email;
        user.calories_per_day = profile.calories_per_day;
        Ok(Some(user.clone()))
    }
}
