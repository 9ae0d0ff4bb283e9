use chrono::format::{DelayedFormat, StrftimeItems};
use chrono::{Datelike, Days, NaiveDate};
use chronoutil::DateRule;
use color_eyre::eyre::{eyre, Result};

/// One displayed week, anchored on its Monday
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Week {
    start: NaiveDate,
}

impl Week {
    /// Returns the week containing the given date.
    ///
    /// The anchor is always normalized back to the Monday of that week, so a
    /// Sunday belongs to the week that started six days earlier.
    pub fn containing(date: NaiveDate) -> Result<Week> {
        let start = date
            .checked_sub_days(Days::new(date.weekday().num_days_from_monday().into()))
            .ok_or(eyre!("could not create the aligned week start"))?;

        Ok(Week { start })
    }

    /// The Monday anchoring this week
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Whether a day falls inside the half-open range [start, start + 7 days)
    pub fn contains(&self, day: NaiveDate) -> bool {
        match self.start.checked_add_days(Days::new(7)) {
            Some(end) => self.start <= day && day < end,
            None => false,
        }
    }

    /// The following week
    pub fn succ(&self) -> Result<Week> {
        let start = self
            .start
            .checked_add_days(Days::new(7))
            .ok_or(eyre!("could not advance the week anchor"))?;

        Ok(Week { start })
    }

    /// The preceding week
    pub fn pred(&self) -> Result<Week> {
        let start = self
            .start
            .checked_sub_days(Days::new(7))
            .ok_or(eyre!("could not rewind the week anchor"))?;

        Ok(Week { start })
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        DateRule::daily(self.start).with_count(7)
    }

    /// The name of the HTML page for this week
    pub fn file_name(&self) -> String {
        let week = self.start.iso_week();
        format!("{}-{:02}.html", week.year(), week.week())
    }

    pub fn format<'a>(&'a self, fmt: &'a str) -> DelayedFormat<StrftimeItems<'a>> {
        self.start.format(fmt)
    }
}
