use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::auth::memory::InMemoryUserRepository;
use crate::auth::repo::{PgUserRepository, UserRepository};
use crate::config::AppConfig;
use crate::meals::memory::InMemoryMealRepository;
use crate::meals::repo::{MealRepository, PgMealRepository};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub meals: Arc<dyn MealRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let Some(url) = config.database_url.as_deref() else {
            tracing::warn!("DATABASE_URL not set; using in-memory stores, data is lost on exit");
            return Ok(Self::in_memory(config));
        };

        let db = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(url)
            .await
            .context("connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run migrations")?;

        Ok(Self {
            meals: Arc::new(PgMealRepository::new(db.clone())) as Arc<dyn MealRepository>,
            users: Arc::new(PgUserRepository::new(db)) as Arc<dyn UserRepository>,
            config,
        })
    }

    fn in_memory(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            meals: Arc::new(InMemoryMealRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
        }
    }

    /// Empty in-memory state with fixed JWT settings.
    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::JwtConfig;

        Self::in_memory(Arc::new(AppConfig {
            database_url: None,
            db_max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test".into(),
                audience: "test".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
        }))
    }
}
