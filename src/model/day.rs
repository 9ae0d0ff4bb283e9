use chrono::{Datelike, Month, NaiveDate};
use num_traits::FromPrimitive;
use serde::Serialize;

use super::event::EventContext;

const YMD_FORMAT: &str = "%Y-%m-%d";

/// One day column handed to the week template
#[derive(Debug, Serialize)]
pub struct DayContext {
    pub(crate) date: String,
    pub(crate) day: u8,
    pub(crate) wday: String,
    pub(crate) month: String,
    pub(crate) month_name: String,
    pub(crate) is_weekend: bool,
    pub(crate) is_today: bool,
    pub(crate) events: Vec<EventContext>,
}

impl DayContext {
    pub fn new(date: NaiveDate, is_today: bool, events: Vec<EventContext>) -> DayContext {
        DayContext {
            date: date.format(YMD_FORMAT).to_string(),
            day: date.day() as u8,
            wday: date.weekday().to_string(),
            month: date.month().to_string(),
            month_name: Month::from_u32(date.month())
                .expect("invalid month")
                .name()
                .to_string(),
            is_weekend: date.weekday().number_from_monday() > 5,
            is_today,
            events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wednesday_renders_its_names() {
        let context = DayContext::new(
            NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(),
            false,
            Vec::new(),
        );
        assert_eq!(context.date, "2024-06-05");
        assert_eq!(context.wday, "Wed");
        assert_eq!(context.month_name, "June");
        assert!(!context.is_weekend);
        assert!(!context.is_today);
    }

    #[test]
    fn saturday_and_sunday_are_weekend() {
        let saturday = DayContext::new(
            NaiveDate::from_ymd_opt(2024, 6, 8).unwrap(),
            false,
            Vec::new(),
        );
        let sunday = DayContext::new(
            NaiveDate::from_ymd_opt(2024, 6, 9).unwrap(),
            true,
            Vec::new(),
        );
        assert!(saturday.is_weekend);
        assert!(sunday.is_weekend);
        assert!(sunday.is_today);
    }
}
