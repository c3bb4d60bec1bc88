use chrono::{Local, NaiveDate};
#[cfg(test)]
use mockall::automock;

/// Source of "today" for projections and reminders
#[cfg_attr(test, automock)]
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Pins "today", for replaying a ledger as it looked on a given day
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
