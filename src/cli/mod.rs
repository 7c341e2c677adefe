//! Command line surface and the renderers it dispatches to

pub mod export;
pub mod plot;
pub mod report;
pub mod table;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};

use crate::error::{MilelogError, Result};
use crate::lib::{
    date::Date,
    history::KindFilter,
    period::Period,
    summary::Duration,
    timeframe::{Timeframe, PRESETS},
};

const DURATIONS: &[&str] = &["day", "week", "month", "year"];
const KINDS: &[&str] = &["all", "odometer", "fuel"];

pub fn app() -> App<'static, 'static> {
    let by = Arg::with_name("by")
        .long("by")
        .takes_value(true)
        .possible_values(DURATIONS)
        .help("Width of the calendar buckets");
    let kind = Arg::with_name("kind")
        .long("kind")
        .takes_value(true)
        .possible_values(KINDS)
        .default_value("all")
        .help("Only keep one type of record");
    let ascending = Arg::with_name("ascending").long("ascending").help("Oldest first");
    let output = Arg::with_name("output")
        .long("output")
        .short("o")
        .takes_value(true)
        .value_name("PATH");
    App::new("milelog")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Mileage, fuel and cost tracking from a plain-text logbook")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("FILE")
                .required(true)
                .help("Logbook to read"),
        )
        .arg(
            Arg::with_name("timeframe")
                .long("timeframe")
                .short("t")
                .takes_value(true)
                .possible_values(PRESETS)
                .global(true)
                .help("Named period relative to today [default: 30d]"),
        )
        .arg(
            Arg::with_name("period")
                .long("period")
                .short("p")
                .takes_value(true)
                .conflicts_with("timeframe")
                .global(true)
                .help("Explicit period, e.g. 2024-Mar, 2024-Jan..Jun or 2024-Mar-05.."),
        )
        .arg(
            Arg::with_name("vehicle")
                .long("vehicle")
                .takes_value(true)
                .value_name("ID")
                .global(true)
                .help("Only consider the records of one vehicle"),
        )
        .arg(
            Arg::with_name("config")
                .long("config")
                .takes_value(true)
                .value_name("PATH")
                .global(true)
                .help("Preferences file [default: ./milelog.toml if present]"),
        )
        .subcommand(
            SubCommand::with_name("summary")
                .about("Totals, averages and forecasts")
                .arg(Arg::with_name("json").long("json").help("Print as JSON"))
                .arg(by.clone().help("Also print a calendar with buckets of this width")),
        )
        .subcommand(
            SubCommand::with_name("history")
                .about("Odometer readings and fill-ups as a single timeline")
                .arg(kind.clone())
                .arg(ascending.clone()),
        )
        .subcommand(
            SubCommand::with_name("export")
                .about("Timeline as CSV")
                .arg(kind)
                .arg(ascending)
                .arg(output.clone().help("Write to a file instead of stdout")),
        )
        .subcommand(SubCommand::with_name("trips").about("Trips with their fuel, emissions and cost"))
        .subcommand(SubCommand::with_name("vehicles").about("Declared vehicles"))
        .subcommand(
            SubCommand::with_name("plot")
                .about("SVG of the cumulative distance per vehicle")
                .arg(by.default_value("day"))
                .arg(output.default_value("milelog.svg")),
        )
}

fn invalid(name: &'static str, value: &str, expected: &str) -> MilelogError {
    MilelogError::Argument {
        name,
        value: value.to_string(),
        expected: expected.to_string(),
    }
}

/// Options shared by all subcommands
///
/// They may be given before or after the subcommand, the latter wins.
#[derive(Debug, Default)]
pub struct Shared<'a> {
    pub timeframe: Option<&'a str>,
    pub period: Option<&'a str>,
    pub vehicle: Option<&'a str>,
    pub config: Option<&'a str>,
}

impl<'a> Shared<'a> {
    pub fn from(top: &'a ArgMatches, sub: Option<&'a ArgMatches>) -> Self {
        let get = |name| sub.and_then(|s| s.value_of(name)).or_else(|| top.value_of(name));
        Self {
            timeframe: get("timeframe"),
            period: get("period"),
            vehicle: get("vehicle"),
            config: get("config"),
        }
    }

    /// Active period described by `--period` or `--timeframe`
    pub fn active_period(&self, today: Date) -> Result<Period> {
        let timeframe = match self.period {
            Some(text) => {
                let period = text.parse::<Period>().map_err(|e| {
                    eprintln!("{}", e);
                    MilelogError::Period(text.to_string())
                })?;
                Timeframe::Custom(period)
            }
            None => {
                let name = self.timeframe.unwrap_or("30d");
                name.parse::<Timeframe>()
                    .map_err(|()| invalid("timeframe", name, &PRESETS.join(", ")))?
            }
        };
        let period = timeframe.resolve(today);
        log::debug!("timeframe {} resolves to {}", timeframe, period);
        Ok(period)
    }
}

pub fn duration(matches: &ArgMatches) -> Result<Option<Duration>> {
    matches
        .value_of("by")
        .map(|by| {
            by.parse::<Duration>()
                .map_err(|()| invalid("by", by, &DURATIONS.join(", ")))
        })
        .transpose()
}

pub fn kind(matches: &ArgMatches) -> Result<KindFilter> {
    let kind = matches.value_of("kind").unwrap_or("all");
    kind.parse::<KindFilter>()
        .map_err(|()| invalid("kind", kind, &KINDS.join(", ")))
}
