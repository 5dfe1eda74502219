use async_trait::async_trait;
use sqlx::PgPool;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::meals::repo_types::Meal;

/// Meal storage. All listings come back newest first.
#[async_trait]
pub trait MealRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Meal>>;

    async fn find_by_owner_and_id(&self, user_id: Uuid, id: i64) -> AppResult<Option<Meal>>;

    async fn find_all_by_owner(&self, user_id: Uuid) -> AppResult<Vec<Meal>>;

    /// Meals with `start <= date_time < end`.
    async fn find_by_owner_in_range(
        &self,
        user_id: Uuid,
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
    ) -> AppResult<Vec<Meal>>;

    /// Inserts when `meal.id` is `None`, otherwise updates the row with that id
    /// owned by `meal.user_id`. An update that matches nothing is
    /// [`AppError::NoRowAffected`].
    async fn save(&self, meal: Meal) -> AppResult<Meal>;

    /// Number of rows removed, 0 or 1.
    async fn delete_by_owner_and_id(&self, user_id: Uuid, id: i64) -> AppResult<u64>;
}

#[derive(Clone)]
pub struct PgMealRepository {
    db: PgPool,
}

impl PgMealRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MealRepository for PgMealRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Meal>> {
        let meal = sqlx::query_as::<_, Meal>(
            r#"
            SELECT id, user_id, date_time, description, calories
            FROM meals
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(meal)
    }

    async fn find_by_owner_and_id(&self, user_id: Uuid, id: i64) -> AppResult<Option<Meal>> {
        let meal = sqlx::query_as::<_, Meal>(
            r#"
            SELECT id, user_id, date_time, description, calories
            FROM meals
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(meal)
    }

    async fn find_all_by_owner(&self, user_id: Uuid) -> AppResult<Vec<Meal>> {
        let rows = sqlx::query_as::<_, Meal>(
            r#"
            SELECT id, user_id, date_time, description, calories
            FROM meals
            WHERE user_id = $1
            ORDER BY date_time DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_by_owner_in_range(
        &self,
        user_id: Uuid,
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
    ) -> AppResult<Vec<Meal>> {
        let rows = sqlx::query_as::<_, Meal>(
            r#"
            SELECT id, user_id, date_time, description, calories
            FROM meals
            WHERE user_id = $1 AND date_time >= $2 AND date_time < $3
            ORDER BY date_time DESC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn save(&self, meal: Meal) -> AppResult<Meal> {
        match meal.id {
            None => {
                let created = sqlx::query_as::<_, Meal>(
                    r#"
                    INSERT INTO meals (user_id, date_time, description, calories)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id, user_id, date_time, description, calories
                    "#,
                )
                .bind(meal.user_id)
                .bind(meal.date_time)
                .bind(&meal.description)
                .bind(meal.calories)
                .fetch_one(&self.db)
                .await?;
                Ok(created)
            }
            Some(id) => {
                let updated = sqlx::query_as::<_, Meal>(
                    r#"
                    UPDATE meals
                       SET date_time = $3, description = $4, calories = $5
                     WHERE id = $1 AND user_id = $2
                    RETURNING id, user_id, date_time, description, calories
                    "#,
                )
                .bind(id)
                .bind(meal.user_id)
                .bind(meal.date_time)
                .bind(&meal.description)
                .bind(meal.calories)
                .fetch_optional(&self.db)
                .await?;
                updated.ok_or_else(|| {
                    AppError::NoRowAffected(format!(
                        "Meal id={} for user id={} missed",
                        id, meal.user_id
                    ))
                })
            }
        }
    }

    async fn delete_by_owner_and_id(&self, user_id: Uuid, id: i64) -> AppResult<u64> {
        let res = sqlx::query("DELETE FROM meals WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected())
    }
}
