use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::meals::repo_types::Meal;

/// A record owned by someone else is reported exactly like a missing one.
pub fn owned_by(meal: Option<Meal>, user_id: Uuid, id: i64) -> AppResult<Meal> {
    match meal {
        Some(m) if m.user_id == user_id => Ok(m),
        _ => Err(AppError::NotFound(format!("Meal id={id}"))),
    }
}

pub fn check_new(meal: &Meal) -> AppResult<()> {
    match meal.id {
        None => Ok(()),
        Some(_) => Err(AppError::InvalidState(format!("{meal:?} must be new (id=null)"))),
    }
}

/// Path id wins: an absent payload id takes it, a different one is refused.
pub fn assure_id_consistent(meal: &mut Meal, id: i64) -> AppResult<()> {
    match meal.id {
        None => {
            meal.id = Some(id);
            Ok(())
        }
        Some(own) if own == id => Ok(()),
        Some(_) => Err(AppError::InvalidState(format!("{meal:?} must be with id={id}"))),
    }
}

/// Maps a zero row count from a scoped write to [`AppError::NoRowAffected`].
pub fn check_single_modification(count: u64, msg: impl FnOnce() -> String) -> AppResult<()> {
    if count == 0 {
        Err(AppError::NoRowAffected(msg()))
    } else {
        Ok(())
    }
}
