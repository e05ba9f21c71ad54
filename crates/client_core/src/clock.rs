use chrono::NaiveDate;

/// Source of "today" so date-dependent logic is deterministic under test.
pub trait Clock: Send + Sync {
    /// Local calendar date at the moment of the call.
    fn today(&self) -> NaiveDate;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}
