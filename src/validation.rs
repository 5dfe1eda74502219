use lazy_static::lazy_static;
use regex::Regex;
use time::PrimitiveDateTime;

use crate::error::{AppError, AppResult, FieldViolation};
use crate::meals::dto::MealPayload;
use crate::util::datetime::{format_date_time, MAX_DATE_TIME, MIN_DATE_TIME};
use crate::util::interval::is_in_half_open_range;

pub const MEAL_CALORIES: std::ops::RangeInclusive<i32> = 10..=5000;
pub const DAILY_CALORIES: std::ops::RangeInclusive<i32> = 10..=10000;
pub const DEFAULT_CALORIES_PER_DAY: i32 = 2000;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref HTML_RE: Regex = Regex::new(r"<[^>]*>|&[a-zA-Z]+;|&#\d+;").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Collects violations; `into_result` turns a non-empty list into [`AppError::Validation`].
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&mut self, field: &'static str, value: &str, min: usize, max: usize) -> &mut Self {
        let len = value.trim().chars().count();
        if len == 0 {
            self.0.push(FieldViolation::new(field, "must not be blank"));
        } else if len < min || len > max {
            self.0.push(FieldViolation::new(
                field,
                format!("size must be between {min} and {max}"),
            ));
        }
        self
    }

    /// Raw length check; unlike [`Violations::text`] whitespace counts.
    pub fn len_between(
        &mut self,
        field: &'static str,
        value: &str,
        min: usize,
        max: usize,
    ) -> &mut Self {
        let len = value.chars().count();
        if len < min || len > max {
            self.0.push(FieldViolation::new(
                field,
                format!("size must be between {min} and {max}"),
            ));
        }
        self
    }

    /// `value` must lie in `[start, end)`.
    pub fn date_time_within(
        &mut self,
        field: &'static str,
        value: PrimitiveDateTime,
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
    ) -> &mut Self {
        if !is_in_half_open_range(&value, Some(&start), Some(&end)) {
            let show = |dt: &PrimitiveDateTime| format_date_time(dt).unwrap_or_default();
            self.0.push(FieldViolation::new(
                field,
                format!("must be at or after {} and before {}", show(&start), show(&end)),
            ));
        }
        self
    }

    pub fn no_html(&mut self, field: &'static str, value: &str) -> &mut Self {
        if HTML_RE.is_match(value) {
            self.0.push(FieldViolation::new(field, "must not contain HTML markup"));
        }
        self
    }

    pub fn range(
        &mut self,
        field: &'static str,
        value: i32,
        range: std::ops::RangeInclusive<i32>,
    ) -> &mut Self {
        if !range.contains(&value) {
            self.0.push(FieldViolation::new(
                field,
                format!("must be between {} and {}", range.start(), range.end()),
            ));
        }
        self
    }

    pub fn email(&mut self, field: &'static str, value: &str) -> &mut Self {
        if !is_valid_email(value) {
            self.0.push(FieldViolation::new(field, "must be a well-formed email address"));
        }
        self
    }

    pub fn into_result(&mut self) -> AppResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(std::mem::take(&mut self.0)))
        }
    }
}

pub fn validate_meal(payload: &MealPayload) -> AppResult<()> {
    Violations::new()
        .date_time_within("date_time", payload.date_time, MIN_DATE_TIME, MAX_DATE_TIME)
        .text("description", &payload.description, 2, 120)
        .no_html("description", &payload.description)
        .range("calories", payload.calories, MEAL_CALORIES)
        .into_result()
}

pub fn validate_profile(name: &str, email: &str, calories_per_day: i32) -> AppResult<()> {
    Violations::new()
        .text("name", name, 2, 128)
        .no_html("name", name)
        .email("email", email)
        .range("calories_per_day", calories_per_day, DAILY_CALORIES)
        .into_result()
}

pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
    calories_per_day: i32,
) -> AppResult<()> {
    Violations::new()
        .text("name", name, 2, 128)
        .no_html("name", name)
        .email("email", email)
        .range("calories_per_day", calories_per_day, DAILY_CALORIES)
        .len_between("password", password, 5, 32)
        .into_result()
}
