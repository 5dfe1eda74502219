use serde::{Deserialize, Serialize};
use time::{Date, PrimitiveDateTime, Time};
use uuid::Uuid;

use crate::meals::repo_types::Meal;
use crate::util::datetime::{iso_date_time, optional};

/// Body of `POST /meals` and `PUT /meals/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct MealPayload {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(with = "iso_date_time")]
    pub date_time: PrimitiveDateTime,
    pub description: String,
    pub calories: i32,
}

impl MealPayload {
    pub fn into_meal(self, user_id: Uuid) -> Meal {
        Meal::new(
            self.id,
            user_id,
            self.date_time,
            self.description.trim(),
            self.calories,
        )
    }
}

/// A meal annotated with whether its day went over the calorie target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MealTo {
    pub id: Option<i64>,
    #[serde(with = "iso_date_time")]
    pub date_time: PrimitiveDateTime,
    pub description: String,
    pub calories: i32,
    pub excess: bool,
}

impl MealTo {
    pub fn from_meal(meal: &Meal, excess: bool) -> Self {
        Self {
            id: meal.id,
            date_time: meal.date_time,
            description: meal.description.clone(),
            calories: meal.calories,
            excess,
        }
    }
}

/// `GET /meals/filter` query. Every bound is optional; empty values count as absent.
///
/// Names are snake_case like the meal bodies; the camelCase spellings are
/// accepted too.
#[derive(Debug, Default, Deserialize)]
pub struct MealFilter {
    #[serde(default, alias = "startDate", deserialize_with = "optional::date")]
    pub start_date: Option<Date>,
    #[serde(default, alias = "endDate", deserialize_with = "optional::date")]
    pub end_date: Option<Date>,
    #[serde(default, alias = "startTime", deserialize_with = "optional::time_of_day")]
    pub start_time: Option<Time>,
    #[serde(default, alias = "endTime", deserialize_with = "optional::time_of_day")]
    pub end_time: Option<Time>,
}
