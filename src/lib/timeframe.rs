//! Named shorthands for the most common periods

use std::fmt;
use std::str::FromStr;

use crate::lib::{date::Date, period::Period};

/// A named period, resolved relative to the current day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    Today,
    /// the last 7 days, today included
    Week,
    /// the last 30 days, today included
    Month,
    /// current calendar month
    ThisMonth,
    /// previous calendar month
    LastMonth,
    All,
    /// explicit period, open ends are clamped by `resolve`
    Custom(Period),
}

impl Timeframe {
    /// Concrete range of dates relative to `today`
    pub fn resolve(self, today: Date) -> Period {
        match self {
            Timeframe::Today => Period(today, today),
            Timeframe::Week => Period(today.jump_day(-6), today),
            Timeframe::Month => Period(today.jump_day(-29), today),
            Timeframe::ThisMonth => Period(today.start_of_month(), today.end_of_month()),
            Timeframe::LastMonth => {
                let prev = today.start_of_month().prev();
                Period(prev.start_of_month(), prev.end_of_month())
            }
            Timeframe::All => Period(Date::EPOCH, today),
            Timeframe::Custom(period) => period.close(Date::EPOCH, today),
        }
    }
}

impl FromStr for Timeframe {
    type Err = ();

    /// Parse one of the preset names, `custom` is built from a period instead
    fn from_str(s: &str) -> Result<Self, ()> {
        Ok(match s {
            "today" => Timeframe::Today,
            "7d" => Timeframe::Week,
            "30d" => Timeframe::Month,
            "this-month" => Timeframe::ThisMonth,
            "last-month" => Timeframe::LastMonth,
            "all" => Timeframe::All,
            _ => return Err(()),
        })
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeframe::Today => write!(f, "today"),
            Timeframe::Week => write!(f, "7d"),
            Timeframe::Month => write!(f, "30d"),
            Timeframe::ThisMonth => write!(f, "this-month"),
            Timeframe::LastMonth => write!(f, "last-month"),
            Timeframe::All => write!(f, "all"),
            Timeframe::Custom(p) => write!(f, "{}", p),
        }
    }
}

pub const PRESETS: &[&str] = &["today", "7d", "30d", "this-month", "last-month", "all"];

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::{date::Month::*, entry::fixtures::day};

    macro_rules! tf {
        ( $tf:expr, $today:expr => $start:expr, $end:expr ) => {{
            assert_eq!($tf.resolve($today), Period($start, $end));
        }};
    }

    #[test]
    fn presets() {
        let today = day(2024, Mar, 5);
        tf!(Timeframe::Today, today => today, today);
        tf!(Timeframe::Week, today => day(2024, Feb, 28), today);
        tf!(Timeframe::Month, today => day(2024, Feb, 5), today);
        tf!(Timeframe::ThisMonth, today => day(2024, Mar, 1), day(2024, Mar, 31));
        tf!(Timeframe::LastMonth, today => day(2024, Feb, 1), day(2024, Feb, 29));
        tf!(Timeframe::LastMonth, day(2024, Jan, 15) => day(2023, Dec, 1), day(2023, Dec, 31));
        tf!(Timeframe::All, today => Date::EPOCH, today);
    }

    #[test]
    fn custom() {
        let today = day(2024, Mar, 5);
        let after = Timeframe::Custom("2024-Jan..".parse().unwrap());
        tf!(after, today => day(2024, Jan, 1), today);
        let before = Timeframe::Custom("..2023".parse().unwrap());
        tf!(before, today => Date::EPOCH, day(2023, Dec, 31));
        let exact = Timeframe::Custom("2023-Jun".parse().unwrap());
        tf!(exact, today => day(2023, Jun, 1), day(2023, Jun, 30));
    }

    #[test]
    fn names() {
        for name in PRESETS {
            let tf = name.parse::<Timeframe>().unwrap();
            assert_eq!(format!("{}", tf), *name);
        }
        assert!("custom".parse::<Timeframe>().is_err());
    }
}
