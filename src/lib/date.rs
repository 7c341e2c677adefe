//! Day-precise time management, with a focus on edge cases
//!
//! Dates are `YYYY-Mmm-DD`, not number of seconds. Every record of the logbook
//! is dated with a day, so the start-of-day / end-of-day normalization
//! of a range is implicit: a range `[a, b]` simply contains every day
//! from `a` to `b` inclusive.
//!
//! Dates also support jumping by a number of days, months or years
//! and moving to the boundaries of a time frame
//! (see for example `start_of_week` or `end_of_month`)

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A date with day-precision
///
/// Supports years in the range 1000..=9999, but weekday conversion
/// is not guaranteed accurate before 1900.
///
/// All methods execute in constant time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    year: u16,
    month: Month,
    day: u8,
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{:02}", self.year, self.month, self.day)
    }
}

impl Serialize for Date {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.iso())
    }
}

/// Twelve months in the year, identified by their 3-letter abbreviations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, PartialOrd, Ord)]
pub enum Month {
    Jan = 0,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl FromStr for Month {
    type Err = ();

    /// Parse a month from its stringified name (`"Jan"`, `"Feb"`, `"Mar"`, ...)
    fn from_str(s: &str) -> Result<Self, ()> {
        use Month::*;
        Ok(match s {
            "Jan" => Jan,
            "Feb" => Feb,
            "Mar" => Mar,
            "Apr" => Apr,
            "May" => May,
            "Jun" => Jun,
            "Jul" => Jul,
            "Aug" => Aug,
            "Sep" => Sep,
            "Oct" => Oct,
            "Nov" => Nov,
            "Dec" => Dec,
            _ => return Err(()),
        })
    }
}

impl Month {
    /// Month directly succeeding the current one with wrapping
    pub fn next(self) -> Self {
        Self::from_month_index((self as usize + 1) % 12)
    }

    /// Month directly preceding the current one with wrapping
    pub fn prev(self) -> Self {
        Self::from_month_index((self as usize + 11) % 12)
    }

    /// Calendar number of the month, `Jan` is 1
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    /// Inverse of `number`
    pub fn from_number(n: u32) -> Option<Self> {
        n.checked_sub(1).and_then(Self::from_u32)
    }

    // `idx` is always reduced modulo 12 by the callers
    fn from_month_index(idx: usize) -> Self {
        Self::from_usize(idx % 12).unwrap_or(Month::Jan)
    }

    /// Number of days in this month of the given year
    pub fn count(self, year: u16) -> u8 {
        use Month::*;
        match self {
            Jan | Mar | May | Jul | Aug | Oct | Dec => 31,
            Apr | Jun | Sep | Nov => 30,
            Feb => {
                if is_leap(year) {
                    29
                } else {
                    28
                }
            }
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Weekday with Monday-first week convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, FromPrimitive)]
pub enum Weekday {
    Mon = 0,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Ways in which a date taken from user input can be wrong
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DateError {
    /// year is outside of 1000..=9999
    UnsupportedYear(usize),
    /// Feb 29 of a non-leap year
    NotBissextile(usize),
    /// Feb 30 or Feb 31 or 31st day of a 30-day month
    MonthTooShort(Month, usize),
    /// day outside of 1..=31
    InvalidDay(usize),
}

impl Date {
    pub const MIN: Date = Date { year: 1000, month: Month::Jan, day: 1 };
    pub const MAX: Date = Date { year: 9999, month: Month::Dec, day: 31 };
    /// Lower bound of the `all` timeframe and of open-ended custom periods
    pub const EPOCH: Date = Date { year: 1970, month: Month::Jan, day: 1 };

    /// Validate year-month-day into date
    pub fn from(year: usize, month: Month, day: usize) -> Result<Self, DateError> {
        if !(1000..=9999).contains(&year) {
            Err(DateError::UnsupportedYear(year))
        } else if day == 0 || day > 31 {
            Err(DateError::InvalidDay(day))
        } else if day <= month.count(year as u16) as usize {
            Ok(Self { year: year as u16, month, day: day as u8 })
        } else if day >= 30 {
            Err(DateError::MonthTooShort(month, day))
        } else {
            Err(DateError::NotBissextile(year))
        }
    }

    /// Current day in the local timezone
    pub fn today() -> Self {
        use chrono::Datelike;
        let now = chrono::Local::now().date_naive();
        let month = Month::from_number(now.month()).unwrap_or(Month::Jan);
        Date::from(now.year().max(0) as usize, month, now.day() as usize).unwrap_or(Date::EPOCH)
    }

    /// `self.day` accessor
    pub fn day(&self) -> u8 {
        self.day
    }

    /// `self.month` accessor
    pub fn month(&self) -> Month {
        self.month
    }

    /// `self.year` accessor
    pub fn year(&self) -> u16 {
        self.year
    }

    /// `YYYY-MM-DD`, for machine-readable outputs
    pub fn iso(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month.number(), self.day)
    }

    /// Biject the dates with integers
    ///
    /// This indexing is guaranteed consistent in the sense that
    /// for any date `d`,
    ///
    ///     assert_eq!(d.index() + 1, d.next().index());
    pub fn index(self) -> usize {
        let leaps = {
            let years = if self.month <= Month::Feb {
                self.year as usize - 1
            } else {
                self.year as usize
            };
            // count leap years before current
            (years / 4) - (years / 100) + (years / 400)
        };
        let mut n = self.year as usize * 365 + self.day as usize;
        // partially elapsed current year
        n += [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334][self.month as usize];
        n += leaps; // each leap year adds one day
        n
    }

    /// Number of days from `self` to `other`, negative if `other` is earlier
    pub fn days_until(self, other: Date) -> isize {
        other.index() as isize - self.index() as isize
    }

    /// Get day of week
    pub fn weekday(self) -> Weekday {
        let offset = 2; // essentially the weekday of 0000-Jan-01
        Weekday::from_usize((self.index() - offset) % 7).unwrap_or(Weekday::Mon)
    }

    pub fn next(self) -> Self {
        if self.month.count(self.year) == self.day {
            if self.month == Month::Dec {
                Self { year: self.year + 1, month: Month::Jan, day: 1 }
            } else {
                Self { month: self.month.next(), day: 1, ..self }
            }
        } else {
            Self { day: self.day + 1, ..self }
        }
    }

    pub fn prev(self) -> Self {
        if self.day == 1 {
            if self.month == Month::Jan {
                Self { year: self.year - 1, month: Month::Dec, day: 31 }
            } else {
                let month = self.month.prev();
                Self { month, day: month.count(self.year), ..self }
            }
        } else {
            Self { day: self.day - 1, ..self }
        }
    }

    /// `count` days before/after current date
    pub fn jump_day(self, count: isize) -> Self {
        let full_count = count;
        // first rough approximation to get
        // the year and month as close as possible
        let (mut d, count) = if count.abs() > 30 {
            let target = self.index() as isize + count;
            let adjust_year = self.jump_year(count / 365);
            let adjust_month = adjust_year.jump_month((target - adjust_year.index() as isize) / 31);
            (adjust_month, target - adjust_month.index() as isize)
        } else {
            (self, count)
        };
        if count > 0 {
            let mut count = count as usize;
            while count > 0 {
                let diff = ((d.month.count(d.year) - d.day) as usize).min(count);
                d.day += diff as u8;
                count -= diff;
                if count > 0 {
                    d = d.next();
                    count -= 1;
                }
            }
        } else {
            let mut count = (-count) as usize;
            while count > 0 {
                let diff = ((d.day - 1) as usize).min(count);
                d.day -= diff as u8;
                count -= diff;
                if count > 0 {
                    d = d.prev();
                    count -= 1;
                }
            }
        }
        debug_assert_eq!(d.index() as isize, self.index() as isize + full_count);
        d
    }

    /// `count` months before/after current date
    ///
    /// Day will be truncated to fit in the new month:
    /// adding one month to `2000-Jan-31` makes it `2000-Feb-29`
    pub fn jump_month(self, count: isize) -> Self {
        let (year, month) = {
            let mut year = self.year as isize;
            let mut month = self.month as isize + count;
            while month < 0 {
                month += 12;
                year -= 1;
            }
            while month >= 12 {
                month -= 12;
                year += 1;
            }
            (year as u16, Month::from_month_index(month as usize))
        };
        Self {
            year,
            month,
            day: self.day.min(month.count(year)),
        }
    }

    /// `count` years before/after current date
    ///
    /// Day will be truncated in the rare case it is needed:
    /// adding one year to `2000-Feb-29` makes it `2001-Feb-28`
    pub fn jump_year(self, count: isize) -> Self {
        let year = (self.year as isize + count) as u16;
        if self.month == Month::Feb && self.day == 29 && !is_leap(year) {
            Self { year, day: 28, ..self }
        } else {
            Self { year, ..self }
        }
    }

    /// Get date of the first day of the current month
    pub fn start_of_month(self) -> Self {
        Self { day: 1, ..self }
    }

    /// Get date of the last day of the current month
    pub fn end_of_month(self) -> Self {
        Self { day: self.month.count(self.year), ..self }
    }

    /// Jan 1st of the current year
    pub fn start_of_year(self) -> Self {
        Self { day: 1, month: Month::Jan, ..self }
    }

    /// First Monday before the current date
    pub fn start_of_week(self) -> Self {
        self.jump_day(-(self.weekday() as isize))
    }
}

fn is_leap(year: u16) -> bool {
    if year % 400 == 0 {
        true
    } else if year % 100 == 0 {
        false
    } else {
        year % 4 == 0
    }
}

impl fmt::Display for DateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use DateError::*;
        match self {
            UnsupportedYear(y) => write!(f, "{} is outside of the supported range for years", y),
            NotBissextile(y) => write!(f, "{} is not bissextile, Feb 29 does not exist", y),
            MonthTooShort(m, d) => write!(f, "{} is a short month, it does not have a {}th day", m, d),
            InvalidDay(d) => write!(f, "{} is not a valid day", d),
        }
    }
}

impl DateError {
    /// What message to show to help fix the date error
    pub fn fix_hint(&self) -> String {
        use DateError::*;
        match *self {
            UnsupportedYear(_) => "year should be between 1000 and 9999 inclusive".to_string(),
            NotBissextile(y) => format!("did you mean {y}-Feb-28 or {y}-Mar-01 ?", y = y),
            MonthTooShort(m, d) => format!(
                "{} is only {} days long",
                m,
                if m == Month::Feb { 28.max(d - 1) } else { 30 }
            ),
            InvalidDay(d) => format!("{} is not in the range 1 ..= 31", d),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Month::*, Weekday::*, *};

    #[test]
    fn bissextile_check() {
        assert!(is_leap(2004));
        assert!(!is_leap(2100));
        assert!(is_leap(2000));
        assert!(!is_leap(2001));
        assert!(is_leap(2024));
    }

    macro_rules! ok {
        ( $y:tt - $m:tt - $d:tt ) => {
            assert_eq!(Date::from($y, $m, $d), Ok(Date { year: $y, month: $m, day: $d }));
        };
    }
    macro_rules! short {
        ( $y:tt - $m:tt - $d:tt ) => {
            assert_eq!(Date::from($y, $m, $d), Err(DateError::MonthTooShort($m, $d)));
        };
    }

    #[test]
    fn month_lengths() {
        ok!(2024-Jan-31);
        short!(2024-Apr-31);
        short!(2024-Feb-30);
        ok!(2024-Feb-29);
        assert_eq!(Date::from(2023, Feb, 29), Err(DateError::NotBissextile(2023)));
        assert_eq!(Date::from(2023, Jan, 0), Err(DateError::InvalidDay(0)));
        assert_eq!(Date::from(999, Jan, 1), Err(DateError::UnsupportedYear(999)));
    }

    macro_rules! dt {
        ( $y:tt - $m:tt - $d:tt ) => {
            Date::from($y, $m, $d).unwrap()
        };
    }

    #[test]
    fn weekday_references() {
        assert_eq!(dt!(2000-Jan-1).weekday(), Sat);
        assert_eq!(dt!(2000-Jan-3).weekday(), Mon);
        assert_eq!(dt!(2024-Mar-15).weekday(), Fri);
        assert_eq!(dt!(2100-Jul-14).weekday(), Wed);
    }

    #[test]
    fn index_consistent() {
        let mut d = dt!(1999-Jan-1);
        let end = dt!(2030-Dec-31);
        while d < end {
            let ds = d.next();
            assert_eq!(d.index() + 1, ds.index(), "date {}, successor {}", d, ds);
            assert_eq!((d.weekday() as usize + 1) % 7, ds.weekday() as usize);
            d = ds;
        }
    }

    #[test]
    fn jump_day() {
        assert_eq!(dt!(2020-Jan-31).jump_day(1), dt!(2020-Feb-1));
        assert_eq!(dt!(2021-Mar-1).jump_day(-1), dt!(2021-Feb-28));
        assert_eq!(dt!(2024-Mar-05).jump_day(-29), dt!(2024-Feb-5));
        assert_eq!(dt!(2024-Jan-03).jump_day(-6), dt!(2023-Dec-28));
        assert_eq!(dt!(2000-Jan-1).jump_day(365242), dt!(2999-Dec-31));
        assert_eq!(dt!(2999-Dec-31).jump_day(-365242), dt!(2000-Jan-1));
        assert_eq!(dt!(2024-Jun-10).jump_day(-400), dt!(2023-May-7));
    }

    #[test]
    fn jump_month() {
        assert_eq!(dt!(2020-Dec-30).jump_month(1), dt!(2021-Jan-30));
        assert_eq!(dt!(2020-Mar-31).jump_month(1), dt!(2020-Apr-30));
        assert_eq!(dt!(2021-Jan-31).jump_month(1), dt!(2021-Feb-28));
        assert_eq!(dt!(2024-Jan-15).jump_month(-1), dt!(2023-Dec-15));
        assert_eq!(dt!(2020-Feb-29).jump_year(1), dt!(2021-Feb-28));
    }

    #[test]
    fn time_boundaries() {
        assert_eq!(dt!(2020-Mar-26).start_of_month(), dt!(2020-Mar-1));
        assert_eq!(dt!(2020-Feb-12).end_of_month(), dt!(2020-Feb-29));
        assert_eq!(dt!(2020-Dec-31).start_of_year(), dt!(2020-Jan-1));
        assert_eq!(dt!(2000-Jan-5).start_of_week(), dt!(2000-Jan-3));
    }

    #[test]
    fn formats() {
        assert_eq!(format!("{}", dt!(2024-Mar-5)), "2024-Mar-05");
        assert_eq!(dt!(2024-Mar-5).iso(), "2024-03-05");
        assert_eq!(dt!(2024-Mar-5).days_until(dt!(2024-Mar-1)), -4);
    }
}
