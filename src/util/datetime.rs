use time::{macros::datetime, macros::format_description, Date, PrimitiveDateTime, Time};

/// Lower bound used when no start date is given.
///
/// Stored meals always lie in `[MIN_DATE_TIME, MAX_DATE_TIME)`, so an
/// unbounded filter sees every one of them.
pub const MIN_DATE_TIME: PrimitiveDateTime = datetime!(1-01-01 0:00);
/// Upper bound used when no end date is given. Midnight of the last day a
/// four-digit `[year]` can name.
pub const MAX_DATE_TIME: PrimitiveDateTime = datetime!(9999-12-31 0:00);

/// `date 00:00`, or [`MIN_DATE_TIME`] when absent.
pub fn at_start_of_day_or_min(date: Option<Date>) -> PrimitiveDateTime {
    match date {
        Some(d) => d.midnight().max(MIN_DATE_TIME),
        None => MIN_DATE_TIME,
    }
}

/// Midnight of the day after `date`, or [`MAX_DATE_TIME`] when absent.
///
/// Used as an exclusive upper bound so every meal of `date` is included
/// whatever its time of day.
pub fn at_start_of_next_day_or_max(date: Option<Date>) -> PrimitiveDateTime {
    date.and_then(Date::next_day)
        .map(Date::midnight)
        .map_or(MAX_DATE_TIME, |dt| dt.min(MAX_DATE_TIME))
}

pub fn parse_date(s: &str) -> Result<Date, time::error::Parse> {
    Date::parse(s.trim(), format_description!("[year]-[month]-[day]"))
}

/// Accepts `HH:MM` and `HH:MM:SS`; fractional seconds are dropped.
pub fn parse_time(s: &str) -> Result<Time, time::error::Parse> {
    let s = with_seconds(s.trim());
    Time::parse(&s, format_description!("[hour]:[minute]:[second]"))
}

/// Accepts `YYYY-MM-DDTHH:MM` and `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_date_time(s: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
    let s = with_seconds(s.trim());
    PrimitiveDateTime::parse(
        &s,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    )
}

pub fn format_date_time(dt: &PrimitiveDateTime) -> Result<String, time::error::Format> {
    dt.format(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second]"
    ))
}

fn with_seconds(s: &str) -> String {
    let s = s.split('.').next().unwrap_or(s);
    let time_part = s.rsplit('T').next().unwrap_or(s);
    if time_part.matches(':').count() == 1 {
        format!("{s}:00")
    } else {
        s.to_string()
    }
}

/// Serde adapter for `YYYY-MM-DDTHH:MM:SS` local date-times.
pub mod iso_date_time {
    use serde::{de::Error as _, ser::Error as _, Deserialize, Deserializer, Serializer};
    use time::PrimitiveDateTime;

    pub fn serialize<S: Serializer>(dt: &PrimitiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        let text = super::format_date_time(dt).map_err(S::Error::custom)?;
        s.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<PrimitiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_date_time(&raw).map_err(D::Error::custom)
    }
}

/// Query-string adapters: an empty value means "not given".
pub mod optional {
    use serde::{de::Error as _, Deserialize, Deserializer};
    use time::{Date, Time};

    pub fn date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Date>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(s) if !s.trim().is_empty() => {
                super::parse_date(&s).map(Some).map_err(D::Error::custom)
            }
            _ => Ok(None),
        }
    }

    pub fn time_of_day<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Time>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(s) if !s.trim().is_empty() => {
                super::parse_time(&s).map(Some).map_err(D::Error::custom)
            }
            _ => Ok(None),
        }
    }
}
