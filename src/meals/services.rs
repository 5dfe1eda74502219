use std::collections::HashMap;

use time::{Date, Time};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AppResult;
use crate::meals::dto::{MealFilter, MealPayload, MealTo};
use crate::meals::guard::{assure_id_consistent, check_new, check_single_modification, owned_by};
use crate::meals::repo::MealRepository;
use crate::meals::repo_types::Meal;
use crate::util::datetime::{at_start_of_day_or_min, at_start_of_next_day_or_max};
use crate::util::interval::is_in_half_open_range;
use crate::validation::validate_meal;

// ---- aggregation ----

/// Flags every meal whose calendar day sums to more than `daily_target`.
///
/// Day totals come from the whole of `meals`, so pass the full candidate set
/// and narrow it afterwards. Output order follows input order.
pub fn summarize(meals: &[Meal], daily_target: i32) -> Vec<MealTo> {
    let mut totals: HashMap<Date, i64> = HashMap::new();
    for m in meals {
        *totals.entry(m.date()).or_default() += i64::from(m.calories);
    }

    meals
        .iter()
        .map(|m| {
            let total = totals.get(&m.date()).copied().unwrap_or_default();
            MealTo::from_meal(m, total > i64::from(daily_target))
        })
        .collect()
}

/// Keeps summaries whose time of day falls in `[start_time, end_time)`.
pub fn filter_by_time_of_day(
    summaries: Vec<MealTo>,
    start_time: Option<Time>,
    end_time: Option<Time>,
) -> Vec<MealTo> {
    summaries
        .into_iter()
        .filter(|s| {
            is_in_half_open_range(&s.date_time.time(), start_time.as_ref(), end_time.as_ref())
        })
        .collect()
}

pub fn filtered_summaries(
    meals: &[Meal],
    daily_target: i32,
    start_time: Option<Time>,
    end_time: Option<Time>,
) -> Vec<MealTo> {
    filter_by_time_of_day(summarize(meals, daily_target), start_time, end_time)
}

// ---- operations ----

pub async fn list_all(
    repo: &dyn MealRepository,
    user_id: Uuid,
    daily_target: i32,
) -> AppResult<Vec<MealTo>> {
    let meals = repo.find_all_by_owner(user_id).await?;
    Ok(summarize(&meals, daily_target))
}

pub async fn list_filtered(
    repo: &dyn MealRepository,
    user_id: Uuid,
    daily_target: i32,
    filter: &MealFilter,
) -> AppResult<Vec<MealTo>> {
    let start = at_start_of_day_or_min(filter.start_date);
    let end = at_start_of_next_day_or_max(filter.end_date);
    let candidates = repo.find_by_owner_in_range(user_id, start, end).await?;
    debug!(%user_id, candidates = candidates.len(), %start, %end, "date-filtered meals");
    Ok(filtered_summaries(
        &candidates,
        daily_target,
        filter.start_time,
        filter.end_time,
    ))
}

pub async fn get(repo: &dyn MealRepository, user_id: Uuid, id: i64) -> AppResult<Meal> {
    owned_by(repo.find_by_id(id).await?, user_id, id)
}

pub async fn create(
    repo: &dyn MealRepository,
    user_id: Uuid,
    payload: MealPayload,
) -> AppResult<Meal> {
    validate_meal(&payload)?;
    let meal = payload.into_meal(user_id);
    check_new(&meal)?;
    let created = repo.save(meal).await?;
    info!(%user_id, meal_id = ?created.id, "meal created");
    Ok(created)
}

pub async fn update(
    repo: &dyn MealRepository,
    user_id: Uuid,
    id: i64,
    payload: MealPayload,
) -> AppResult<Meal> {
    validate_meal(&payload)?;
    let mut meal = payload.into_meal(user_id);
    assure_id_consistent(&mut meal, id)?;
    owned_by(repo.find_by_owner_and_id(user_id, id).await?, user_id, id)?;
    let updated = repo.save(meal).await?;
    info!(%user_id, meal_id = id, "meal updated");
    Ok(updated)
}

pub async fn delete(repo: &dyn MealRepository, user_id: Uuid, id: i64) -> AppResult<()> {
    let count = repo.delete_by_owner_and_id(user_id, id).await?;
    check_single_modification(count, || format!("Meal id={id}, user id={user_id} missed"))?;
    info!(%user_id, meal_id = id, "meal deleted");
    Ok(())
}
