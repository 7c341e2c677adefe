//! An inclusive range of dates, and the filters built on it

use pest::Parser;
use std::fmt;
use std::str::FromStr;

use crate::lib::{
    date::{Date, Month},
    entry::Dated,
};
use crate::load::{
    error::{Error, Loc},
    parse::{LogbookParser, Rule},
};

/// `Period(a, b)` is the range of dates from `a` to `b` inclusive
///
/// Open ends are represented by `Date::MIN` and `Date::MAX`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period(pub Date, pub Date);

impl Period {
    pub const UNBOUNDED: Period = Period(Date::MIN, Date::MAX);

    pub fn day(date: Date) -> Self {
        Self(date, date)
    }

    pub fn contains(&self, date: Date) -> bool {
        self.0 <= date && date <= self.1
    }

    pub fn is_empty(&self) -> bool {
        self.0 > self.1
    }

    /// Number of days covered, `0` for an empty period
    pub fn days(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.0.days_until(self.1) as usize + 1
        }
    }

    pub fn unite(self, other: Self) -> Self {
        Self(self.0.min(other.0), self.1.max(other.1))
    }

    /// Replace open ends with concrete dates
    pub fn close(self, start: Date, end: Date) -> Self {
        Self(
            if self.0 == Date::MIN { start } else { self.0 },
            if self.1 == Date::MAX { end } else { self.1 },
        )
    }

    /// Smallest period that contains all dates, if any
    pub fn spanning<I>(dates: I) -> Option<Self>
    where
        I: IntoIterator<Item = Date>,
    {
        dates
            .into_iter()
            .map(Period::day)
            .reduce(Period::unite)
    }
}

/// Subsequence of `items` dated within `period`, in their original order
pub fn filter_by_range<T>(items: &[T], period: Period) -> Vec<T>
where
    T: Dated + Clone,
{
    items
        .iter()
        .filter(|it| period.contains(it.date()))
        .cloned()
        .collect()
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let merge_day = |f: &mut fmt::Formatter| {
            if self.0.day() == 1 && self.1.day() == self.1.month().count(self.1.year()) {
                Ok(())
            } else if self.0.day() == self.1.day() {
                write!(f, "-{}", self.0.day())
            } else {
                write!(f, "-{}..{}", self.0.day(), self.1.day())
            }
        };
        let shorten_month = |f: &mut fmt::Formatter| {
            write!(f, "-{}", self.0.month())?;
            if self.0.day() != 1 {
                write!(f, "-{}", self.0.day())?;
            }
            write!(f, "..{}", self.1.month())?;
            if self.1.day() != self.1.month().count(self.1.year()) {
                write!(f, "-{}", self.1.day())?;
            }
            Ok(())
        };
        let shorten_year = |f: &mut fmt::Formatter| {
            if self.0 != Date::MIN {
                write!(f, "{}", self.0.year())?;
                if self.0.month() != Month::Jan || self.0.day() != 1 {
                    write!(f, "-{}", self.0.month())?;
                    if self.0.day() != 1 {
                        write!(f, "-{}", self.0.day())?;
                    }
                }
            }
            write!(f, "..")?;
            if self.1 != Date::MAX {
                write!(f, "{}", self.1.year())?;
                if self.1.month() != Month::Dec || self.1.day() != 31 {
                    write!(f, "-{}", self.1.month())?;
                    if self.1.day() != self.1.month().count(self.1.year()) {
                        write!(f, "-{}", self.1.day())?;
                    }
                }
            }
            Ok(())
        };
        let merge_month = |f: &mut fmt::Formatter| {
            if self.0.month() == Month::Jan
                && self.0.day() == 1
                && self.1.month() == Month::Dec
                && self.1.day() == 31
            {
                Ok(())
            } else if self.0.month() == self.1.month() {
                write!(f, "-{}", self.0.month())?;
                merge_day(f)
            } else {
                shorten_month(f)
            }
        };
        let merge_year = |f: &mut fmt::Formatter| {
            if self.0.year() == self.1.year() {
                write!(f, "{}", self.0.year())?;
                merge_month(f)
            } else {
                shorten_year(f)
            }
        };
        if self.is_empty() {
            write!(f, "()")
        } else {
            merge_year(f)
        }
    }
}

type Pair<'i> = pest::iterators::Pair<'i, Rule>;
type Result<T> = std::result::Result<T, Error>;

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Period> {
        let mut contents = match LogbookParser::parse(Rule::period_only, s) {
            Ok(contents) => contents,
            Err(e) => {
                let mut err = Error::new("Invalid period");
                err.with_pest(e)
                    .hint("periods look like 2024, 2024-Mar, 2024-Mar-05..Apr-10, 2024-Jan.. or ..2024-Jun");
                return Err(err);
            }
        };
        match contents.next() {
            Some(inner) => validate_period(inner),
            None => Ok(Period::UNBOUNDED),
        }
    }
}

fn validate_period(inner: Pair) -> Result<Period> {
    let loc = ("", inner.as_span());
    match inner.as_rule() {
        Rule::period_after => {
            let start = first_inner(inner).map(validate_full_date).transpose()?;
            match start {
                Some(trunc) => Ok(Period(trunc.make(&loc, true)?, Date::MAX)),
                None => Ok(Period::UNBOUNDED),
            }
        }
        Rule::period_before => {
            let end = first_inner(inner).map(validate_full_date).transpose()?;
            match end {
                Some(trunc) => Ok(Period(Date::MIN, trunc.make(&loc, false)?)),
                None => Ok(Period::UNBOUNDED),
            }
        }
        Rule::full_date => {
            let trunc = validate_full_date(inner)?;
            Ok(Period(trunc.make(&loc, true)?, trunc.make(&loc, false)?))
        }
        Rule::period_between => {
            let mut inner = inner.into_inner();
            let (fst, snd) = match (inner.next(), inner.next()) {
                (Some(fst), Some(snd)) => (fst, snd),
                _ => return Ok(Period::UNBOUNDED),
            };
            let fst_loc = ("", fst.as_span());
            let start = validate_full_date(fst)?.make(&fst_loc, true)?;
            let snd_loc = ("", snd.as_span());
            let end = validate_partial_date(start, snd)?.make(&snd_loc, false)?;
            if start > end {
                let mut err = Error::new("Empty period");
                err.span(&loc, "provided here")
                    .text("This period has its END smaller than START")
                    .hint("swap the two ends");
                return Err(err);
            }
            Ok(Period(start, end))
        }
        // only EOI remains for `..`
        _ => Ok(Period::UNBOUNDED),
    }
}

fn first_inner(pair: Pair) -> Option<Pair> {
    pair.into_inner().next()
}

fn validate_full_date(p: Pair) -> Result<TruncDate> {
    let mut inner = p.into_inner();
    let year = inner
        .next()
        .and_then(|y| y.as_str().parse::<u16>().ok())
        .unwrap_or(Date::EPOCH.year());
    match inner.next() {
        None => Ok(TruncDate { year, ..Default::default() }),
        Some(month) => validate_month_date(year, month),
    }
}

fn validate_partial_date(default: Date, p: Pair) -> Result<TruncDate> {
    match p.as_rule() {
        Rule::full_date => validate_full_date(p),
        Rule::month_date => validate_month_date(default.year(), p),
        _ => Ok(validate_day_date(default.year(), default.month(), p)),
    }
}

fn validate_month_date(year: u16, p: Pair) -> Result<TruncDate> {
    let loc = ("", p.as_span());
    let mut inner = p.into_inner();
    let month = inner
        .next()
        .and_then(|m| m.as_str().parse::<Month>().ok())
        .ok_or_else(|| {
            let mut err = Error::new("Invalid month");
            err.span(&loc, "provided here")
                .hint("Months are 'Jan', 'Feb', ..., 'Dec'");
            err
        })?;
    match inner.next() {
        None => Ok(TruncDate { year, month: Some(month), ..Default::default() }),
        Some(day) => Ok(validate_day_date(year, month, day)),
    }
}

fn validate_day_date(year: u16, month: Month, p: Pair) -> TruncDate {
    // at most two digits by the grammar
    let day = p.as_str().parse::<u8>().unwrap_or(0);
    TruncDate { year, month: Some(month), day: Some(day) }
}

/// A date with possibly missing month and day, that can be completed
/// either as the start or the end of what it designates
#[derive(Default, Debug)]
struct TruncDate {
    year: u16,
    month: Option<Month>,
    day: Option<u8>,
}

impl TruncDate {
    fn make(&self, loc: &Loc, starting: bool) -> Result<Date> {
        let year = self.year;
        let month = self.month.unwrap_or(if starting { Month::Jan } else { Month::Dec });
        let day = self.day.unwrap_or(if starting { 1 } else { month.count(year) });
        Date::from(year as usize, month, day as usize).map_err(|e| {
            let mut err = Error::new("Invalid date");
            err.span(loc, "provided here")
                .text(format!("{}", e))
                .hint("choose a date that exists")
                .hint(e.fix_hint());
            err
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::{
        date::Month::*,
        entry::fixtures::{day, odo},
    };

    macro_rules! pp {
        ( $start:expr, $end:expr => $fmt:expr ) => {{
            assert_eq!(&format!("{}", Period($start, $end)), $fmt);
        }};
    }

    #[test]
    fn period_fmt() {
        pp!(day(2020, Jan, 15), day(2021, Mar, 17) => "2020-Jan-15..2021-Mar-17");
        pp!(day(2020, Jan, 15), day(2020, Mar, 17) => "2020-Jan-15..Mar-17");
        pp!(day(2020, Jan, 15), day(2020, Jan, 15) => "2020-Jan-15");
        pp!(day(2020, Jan, 1), day(2020, Jan, 31) => "2020-Jan");
        pp!(day(2020, Jan, 1), day(2020, Dec, 31) => "2020");
        pp!(day(2020, Jan, 10), Date::MAX => "2020-Jan-10..");
        pp!(Date::MIN, day(2020, Dec, 31) => "..2020");
        pp!(day(2020, Feb, 1), day(2020, Jan, 1) => "()");
    }

    macro_rules! ps {
        ( $s:expr => $res:expr ) => {{
            match $s.parse::<Period>() {
                Ok(period) => assert_eq!(&format!("{}", period), $res),
                Err(err) => panic!("{} ->\n{}", $s, err),
            }
        }};
        ( $s:expr ) => {{
            ps!($s => $s)
        }};
    }

    #[test]
    fn period_parse() {
        ps!("2020-Jan-15..2021-Mar-17");
        ps!("2020-Jan-15..Mar-17");
        ps!("2020-Jan-15..17");
        ps!("2020-Jan-15");
        ps!("2020-Jan");
        ps!("2020-Jan..Feb-15");
        ps!("2020");
        ps!("2020..2023");
        ps!("2020-Jan-10..");
        ps!("..2020");
        ps!("2020..Mar" => "2020-Jan..Mar");
        ps!("2020-Jan..15" => "2020-Jan-1..15");
        ps!("2020..2020" => "2020");
        ps!("..");
    }

    #[test]
    fn period_parse_failures() {
        assert!("2021-Feb-29".parse::<Period>().is_err());
        assert!("2020-Foo".parse::<Period>().is_err());
        assert!("2020-Mar..Jan".parse::<Period>().is_err());
        assert!("yesterday".parse::<Period>().is_err());
    }

    #[test]
    fn period_arith() {
        let p = Period(day(2024, Feb, 27), day(2024, Mar, 2));
        assert_eq!(p.days(), 5);
        assert!(p.contains(day(2024, Feb, 29)));
        assert!(!p.contains(day(2024, Mar, 3)));
        assert_eq!(Period(day(2024, Mar, 2), day(2024, Mar, 1)).days(), 0);
        assert_eq!(
            Period::UNBOUNDED.close(Date::EPOCH, day(2024, Mar, 2)),
            Period(Date::EPOCH, day(2024, Mar, 2))
        );
        assert_eq!(
            Period::spanning(vec![day(2024, Mar, 2), day(2023, Jan, 1), day(2024, Jan, 5)]),
            Some(Period(day(2023, Jan, 1), day(2024, Mar, 2)))
        );
        assert_eq!(Period::spanning(Vec::new()), None);
    }

    #[test]
    fn range_filter() {
        let entries = vec![
            odo(1, "a", day(2024, Jan, 31), 10.0),
            odo(2, "a", day(2024, Feb, 1), 20.0),
            odo(3, "a", day(2024, Feb, 29), 30.0),
            odo(4, "a", day(2024, Mar, 1), 40.0),
        ];
        let feb = Period(day(2024, Feb, 1), day(2024, Feb, 29));
        let once = filter_by_range(&entries, feb);
        assert_eq!(once.iter().map(|e| e.id.0).collect::<Vec<_>>(), vec![2, 3]);
        let twice = filter_by_range(&once, feb);
        assert_eq!(once, twice);
    }
}
