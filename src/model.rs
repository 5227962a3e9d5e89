use crate::dates::{date_ordinal, days_in_month, ordinal};
use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthInfo {
    pub year: i32,
    pub month: u32,
    pub is_past: bool,
    pub is_current: bool,
    pub is_future: bool,
    pub has_full_diary: bool,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CalendarError {
    #[error("birth date {birth} is after death date {death}")]
    InvertedRange { birth: NaiveDate, death: NaiveDate },
}

/// Answers whether a note exists for a given day.
pub trait DiaryStatus {
    fn exists(&self, year: i32, month: u32, day: u32) -> bool;
}

impl<F> DiaryStatus for F
where
    F: Fn(i32, u32, u32) -> bool,
{
    fn exists(&self, year: i32, month: u32, day: u32) -> bool {
        self(year, month, day)
    }
}

impl MonthInfo {
    fn classify(year: i32, month: u32, today: i64) -> Self {
        let mut info = MonthInfo {
            year,
            month,
            is_past: false,
            is_current: false,
            is_future: false,
            has_full_diary: false,
        };
        let start = info.first_ordinal();
        let end = info.last_ordinal();
        info.is_past = end < today;
        info.is_current = start <= today && today <= end;
        info.is_future = start > today;
        info
    }

    pub fn days(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn first_ordinal(&self) -> i64 {
        ordinal(self.year, self.month, 1)
    }

    pub fn last_ordinal(&self) -> i64 {
        ordinal(self.year, self.month, self.days())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.year == date.year() && self.month == date.month()
    }
}

/// Every calendar month from birth through death, oldest first.
#[derive(Debug, Clone)]
pub struct MonthIndex {
    months: Vec<MonthInfo>,
}

impl MonthIndex {
    pub fn build(
        birth: NaiveDate,
        death: NaiveDate,
        today: NaiveDate,
    ) -> Result<Self, CalendarError> {
        if birth > death {
            return Err(CalendarError::InvertedRange { birth, death });
        }
        let today = date_ordinal(today);
        let mut months = Vec::new();
        let (mut year, mut month) = (birth.year(), birth.month());
        while (year, month) <= (death.year(), death.month()) {
            months.push(MonthInfo::classify(year, month, today));
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
        }
        Ok(MonthIndex { months })
    }

    /// Re-derives `has_full_diary`. Months that have not fully elapsed are
    /// never full and are not looked up.
    pub fn refresh_diary_status(&mut self, diary: &impl DiaryStatus, today: NaiveDate) {
        let today = date_ordinal(today);
        let mut full = 0usize;
        for info in &mut self.months {
            if info.last_ordinal() > today {
                info.has_full_diary = false;
                continue;
            }
            let (year, month) = (info.year, info.month);
            info.has_full_diary = (1..=info.days()).all(|day| diary.exists(year, month, day));
            if info.has_full_diary {
                full += 1;
            }
        }
        tracing::debug!(full_months = full, "refreshed diary status");
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn months(&self) -> &[MonthInfo] {
        &self.months
    }

    pub fn current_index(&self) -> Option<usize> {
        self.months.iter().position(|m| m.is_current)
    }

    pub fn past_count(&self) -> usize {
        self.months.iter().filter(|m| m.is_past).count()
    }

    pub fn full_count(&self) -> usize {
        self.months.iter().filter(|m| m.has_full_diary).count()
    }
}
