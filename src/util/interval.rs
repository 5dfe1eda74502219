/// Half-open range check `[start, end)`. A missing bound leaves that side open.
pub fn is_in_half_open_range<T: Ord>(value: &T, start: Option<&T>, end: Option<&T>) -> bool {
    start.map_or(true, |s| value >= s) && end.map_or(true, |e| value < e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime, time};

    #[test]
    fn unbounded_range_contains_everything() {
        assert!(is_in_half_open_range(&i32::MIN, None, None));
        assert!(is_in_half_open_range(&time!(23:59:59), None, None));
    }

    #[test]
    fn start_is_inclusive_end_is_exclusive() {
        assert!(is_in_half_open_range(&10, Some(&10), Some(&20)));
        assert!(is_in_half_open_range(&19, Some(&10), Some(&20)));
        assert!(!is_in_half_open_range(&20, Some(&10), Some(&20)));
        assert!(!is_in_half_open_range(&9, Some(&10), Some(&20)));
    }

    #[test]
    fn works_for_dates_and_timestamps() {
        let start = date!(2024 - 01 - 01);
        let end = date!(2024 - 01 - 03);
        assert!(is_in_half_open_range(&date!(2024 - 01 - 02), Some(&start), Some(&end)));
        assert!(!is_in_half_open_range(&end, Some(&start), Some(&end)));

        let at = datetime!(2024-01-01 10:00);
        assert!(is_in_half_open_range(&at, Some(&at), None));
        assert!(!is_in_half_open_range(&at, None, Some(&at)));
    }

    #[test]
    fn one_sided_bounds() {
        assert!(is_in_half_open_range(&time!(7:00), Some(&time!(7:00)), None));
        assert!(!is_in_half_open_range(&time!(6:59), Some(&time!(7:00)), None));
        assert!(is_in_half_open_range(&time!(6:59), None, Some(&time!(7:00))));
    }
}
