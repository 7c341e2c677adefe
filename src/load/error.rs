//! Pretty-printing facility for logbook diagnostics
//!
//! This is mostly a wrapper around `pest::error::Error::new_from_span`,
//! the difficult part of the formatting is handled by pest and `Error` only adds
//! aggregation of messages as well as colored output.
//!
//! # Example
//!
//! ```rust
//! errs.make("Unknown vehicle")
//!     .nonfatal()
//!     .span(&loc, "referenced here")
//!     .text(format!("'{}' is not declared by any `vehicle` block", id))
//!     .hint("declare the vehicle before using it");
//! ```
//!
//! ```txt
//! --> Warning: Unknown vehicle
//!  |     --> logbook.mlg:12:9
//!  |      |
//!  |   12 |     05: odo polo 1200;
//!  |      |         ^-----------^
//!  |      |
//!  |      = referenced here
//!  |  'polo' is not declared by any `vehicle` block
//!  |      ? hint: declare the vehicle before using it
//! ```

use std::fmt;

use crate::load::parse::Rule;

/// Location of an error
///
/// Contains information on the file in which the error
/// occured and the precise span within that file
pub type Loc<'i> = (&'i str, pest::Span<'i>);

/// Report for a single error
///
/// All messages (`label` passed with `new`, arguments of `hint`
/// and `text`) should fit in a single line.
#[must_use]
#[derive(Debug)]
pub struct Error {
    /// determines the error label (warning/error) and the color (yellow/red)
    fatal: bool,
    /// name of the error
    label: String,
    items: Vec<Item>,
}

/// Kinds of items that can be added to an error report
#[derive(Debug)]
enum Item {
    /// code block
    Block(Box<pest::error::Error<Rule>>),
    /// important message
    Text(String),
    /// recommendations for fixes
    Hint(String),
}

/// A collection of errors
///
/// Typically to keep record of all errors detected in one file,
/// but the structure itself makes no assumption regarding the
/// spatial or semantic relationship between these errors
#[must_use]
#[derive(Debug, Default)]
pub struct Record {
    /// how many are errors, the rest are warnings
    /// counts only `contents[..contents.len()-1]`
    fatal: usize,
    contents: Vec<Error>,
}

impl Error {
    /// Create a new error
    pub fn new<S>(msg: S) -> Self
    where
        S: ToString,
    {
        Self {
            fatal: true,
            label: msg.to_string(),
            items: Vec::new(),
        }
    }

    /// Add a pre-existing error (e.g. to build from a parsing error)
    pub fn with_pest(&mut self, err: pest::error::Error<Rule>) -> &mut Self {
        self.items
            .push(Item::Block(Box::new(err.renamed_rules(rule_rename))));
        self
    }

    /// Mark as a warning rather that a fatal error
    pub fn nonfatal(&mut self) -> &mut Self {
        self.fatal = false;
        self
    }

    /// Add a code block and its associated message
    pub fn span<S>(&mut self, loc: &Loc, msg: S) -> &mut Self
    where
        S: ToString,
    {
        self.items.push(Item::Block(Box::new(
            pest::error::Error::new_from_span(
                pest::error::ErrorVariant::CustomError {
                    message: msg.to_string(),
                },
                loc.1,
            )
            .with_path(loc.0),
        )));
        self
    }

    /// Add an important note
    pub fn text<S>(&mut self, msg: S) -> &mut Self
    where
        S: ToString,
    {
        self.items.push(Item::Text(msg.to_string()));
        self
    }

    /// Add a hint on how to fix
    pub fn hint<S>(&mut self, msg: S) -> &mut Self
    where
        S: ToString,
    {
        self.items.push(Item::Hint(msg.to_string()));
        self
    }
}

impl Record {
    /// Initialize a new pool of errors (e.g. to record errors from another file)
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if any of the recorded errors are fatal
    pub fn is_fatal(&self) -> bool {
        self.fatal > 0 || self.last_is_fatal()
    }

    fn last_is_fatal(&self) -> bool {
        self.contents.last().map(|e| e.fatal).unwrap_or(false)
    }

    /// Number of fatal errors
    pub fn count_errors(&self) -> usize {
        self.fatal + usize::from(self.last_is_fatal())
    }

    /// Number of nonfatal errors
    pub fn count_warnings(&self) -> usize {
        self.contents.len() - self.count_errors()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Add a new error to the pool
    pub fn make<S>(&mut self, msg: S) -> &mut Error
    where
        S: ToString,
    {
        if self.last_is_fatal() {
            self.fatal += 1;
        }
        self.contents.push(Error::new(msg));
        let last = self.contents.len() - 1;
        &mut self.contents[last]
    }

    /// Labels of all recorded diagnostics, in order
    #[cfg(test)]
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.contents.iter().map(|e| e.label.as_str())
    }
}

const RED: &str = "\x1b[0;91;1m";
const YELLOW: &str = "\x1b[0;93;1m";
const BLUE: &str = "\x1b[0;96;1m";
const WHITE: &str = "\x1b[0;1m";
const NONE: &str = "\x1b[0m";

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (color, header) = if self.fatal {
            (RED, "--> Error")
        } else {
            (YELLOW, "--> Warning")
        };
        writeln!(f, "{}{}:{} {}{}", color, header, WHITE, self.label, NONE)?;
        for item in &self.items {
            match item {
                Item::Block(err) => {
                    let mut align = "   ".to_string();
                    let mut align_found = false;
                    for line in format!("{}", err).split('\n') {
                        write!(
                            f,
                            " {}|{}  {}",
                            color,
                            if align_found { &align } else { "" },
                            BLUE
                        )?;
                        for c in line.chars() {
                            match c {
                                '-' if !align_found => {
                                    align_found = true;
                                    write!(f, "{}-", align)?;
                                }
                                ' ' if !align_found => {
                                    align.pop();
                                    write!(f, " ")?;
                                }
                                '|' => write!(f, "|{}", NONE)?,
                                '=' => write!(f, "={}", NONE)?,
                                '^' => write!(f, "{}^", color)?,
                                '␊' => (), // pest shows line endings as a visible character
                                _ => write!(f, "{}", c)?,
                            }
                        }
                        writeln!(f)?;
                    }
                }
                Item::Text(txt) => {
                    writeln!(f, " {}|  {}{}{}", color, WHITE, txt, NONE)?;
                }
                Item::Hint(txt) => {
                    writeln!(f, " {}|      {}? hint: {}{}", color, BLUE, NONE, txt)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.contents.is_empty() {
            return Ok(());
        }
        let fatal = self.is_fatal();
        let count = if fatal {
            self.count_errors()
        } else {
            self.count_warnings()
        };
        let color = if fatal { RED } else { YELLOW };
        let trunc = 10;
        // only print errors with the maximum fatality
        for err in self
            .contents
            .iter()
            .filter(|err| err.fatal == fatal)
            .take(trunc)
        {
            writeln!(f, "{}", err)?;
        }
        if count > trunc {
            writeln!(f, "{} And {} more.", color, count - trunc)?;
        }
        let plural = if count > 1 { "s" } else { "" };
        if fatal {
            writeln!(f, "{}Fatal: {}{} error{} emitted{}", color, WHITE, count, plural, NONE)?;
        } else {
            writeln!(f, "{}Nonfatal: {}{} warning{} emitted{}", color, WHITE, count, plural, NONE)?;
        }
        Ok(())
    }
}

fn rule_rename(r: &Rule) -> String {
    String::from(match r {
        Rule::EOI => "EOF",
        Rule::number => "a number",
        Rule::string => "a string of non-'\"' characters",
        Rule::text => "a quoted text ('\"foo\"')",
        Rule::identifier => "an identifier composed of a..zA..Z0..9-_",
        Rule::fuel_kind => "a fuel kind Petrol, Diesel, Cng, Hybrid, Ev or Other",
        Rule::marker_year => "a year marker ('YYYY:')",
        Rule::marker_month => "a month marker ('Jan:' ... 'Dec:')",
        Rule::marker_day => "a 1- or 2-digit day number",
        Rule::field_make => "a 'make' field descriptor",
        Rule::field_model => "a 'model' field descriptor",
        Rule::field_year => "a 'year' field descriptor",
        Rule::field_fuel => "a 'fuel' field descriptor",
        Rule::field_typical => "a 'typical' field descriptor",
        Rule::vehicle_descriptor => "a vehicle declaration",
        Rule::field_odo => "an 'odo' field descriptor",
        Rule::field_vol => "a 'vol' field descriptor",
        Rule::field_cost => "a 'cost' field descriptor",
        Rule::field_price => "a 'price' field descriptor",
        Rule::field_station => "an 'at' field descriptor",
        Rule::field_note => "a 'note' field descriptor",
        Rule::odometer_entry => "an odometer reading 'odo VEHICLE READING'",
        Rule::fuel_entry => "a fill-up 'fuel VEHICLE odo .. vol .. cost ..'",
        Rule::entries_day => "a sequence of records for the same day",
        Rule::entries_month => "a sequence of records for the same month",
        Rule::entries_year => "a sequence of records for the same year",
        Rule::month_date => "a date Mmm-DD or Mmm",
        Rule::full_date => "a date YYYY-Mmm-DD or YYYY-Mmm or YYYY",
        Rule::period_between => "a period [start..end]",
        Rule::period_after => "a period [start..]",
        Rule::period_before => "a period [..end?]",
        _ => return format!("{:?}", r),
    })
}
