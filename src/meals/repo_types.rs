use serde::Serialize;
use sqlx::FromRow;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::util::datetime::iso_date_time;

/// Meal record. `id` is `None` until the store assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Meal {
    pub id: Option<i64>,
    #[serde(skip)]
    pub user_id: Uuid,
    #[serde(with = "iso_date_time")]
    pub date_time: PrimitiveDateTime,
    pub description: String,
    pub calories: i32,
}

impl Meal {
    pub fn new(
        id: Option<i64>,
        user_id: Uuid,
        date_time: PrimitiveDateTime,
        description: impl Into<String>,
        calories: i32,
    ) -> Self {
        Self {
            id,
            user_id,
            date_time,
            description: description.into(),
            calories,
        }
    }

    pub fn date(&self) -> Date {
        self.date_time.date()
    }
}
