use async_trait::async_trait;
use time::PrimitiveDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::meals::repo::MealRepository;
use crate::meals::repo_types::Meal;

/// Process-local meal store. Enforces the same `(user_id, date_time)`
/// uniqueness as the `meals_unique_user_datetime_idx` index.
#[derive(Default)]
pub struct InMemoryMealRepository {
    inner: RwLock<Table>,
}

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: Vec<Meal>,
}

impl InMemoryMealRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut meals: Vec<Meal>) -> Vec<Meal> {
    meals.sort_by(|a, b| b.date_time.cmp(&a.date_time));
    meals
}

fn duplicate(meal: &Meal) -> AppError {
    AppError::DuplicateKey(format!(
        "meal at {} already exists for user id={}",
        meal.date_time, meal.user_id
    ))
}

#[async_trait]
impl MealRepository for InMemoryMealRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Meal>> {
        let t = self.inner.read().await;
        Ok(t.rows.iter().find(|m| m.id == Some(id)).cloned())
    }

    async fn find_by_owner_and_id(&self, user_id: Uuid, id: i64) -> AppResult<Option<Meal>> {
        let t = self.inner.read().await;
        Ok(t
            .rows
            .iter()
            .find(|m| m.id == Some(id) && m.user_id == user_id)
            .cloned())
    }

    async fn find_all_by_owner(&self, user_id: Uuid) -> AppResult<Vec<Meal>> {
        let t = self.inner.read().await;
        let rows = t.rows.iter().filter(|m| m.user_id == user_id).cloned().collect();
        Ok(newest_first(rows))
    }

    async fn find_by_owner_in_range(
        &self,
        user_id: Uuid,
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
    ) -> AppResult<Vec<Meal>> {
        let t = self.inner.read().await;
        let rows = t
            .rows
            .iter()
            .filter(|m| m.user_id == user_id && m.date_time >= start && m.date_time < end)
            .cloned()
            .collect();
        Ok(newest_first(rows))
    }

    async fn save(&self, mut meal: Meal) -> AppResult<Meal> {
        let mut t = self.inner.write().await;
        let clashes = t.rows.iter().any(|m| {
            m.user_id == meal.user_id && m.date_time == meal.date_time && m.id != meal.id
        });

        match meal.id {
            None => {
                if clashes {
                    return Err(duplicate(&meal));
                }
                t.next_id += 1;
                meal.id = Some(t.next_id);
                t.rows.push(meal.clone());
                Ok(meal)
            }
            Some(id) => {
                let Some(pos) = t
                    .rows
                    .iter()
                    .position(|m| m.id == Some(id) && m.user_id == meal.user_id)
                else {
                    return Err(AppError::NoRowAffected(format!(
                        "Meal id={} for user id={} missed",
                        id, meal.user_id
                    )));
                };
                if clashes {
                    return Err(duplicate(&meal));
                }
                t.rows[pos] = meal.clone();
                Ok(meal)
            }
        }
    }

    async fn delete_by_owner_and_id(&self, user_id: Uuid, id: i64) -> AppResult<u64> {
        let mut t = self.inner.write().await;
        let before = t.rows.len();
        t.rows.retain(|m| !(m.id == Some(id) && m.user_id == user_id));
        Ok((before - t.rows.len()) as u64)
    }
}
