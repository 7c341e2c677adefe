//! Convert the contents of a logbook into vehicles, odometer readings,
//! fill-ups and trips

#![allow(clippy::upper_case_acronyms)]

use pest::Parser;
use pest_derive::*;

/// Wrapper around Pest's `Pair`
type Pair<'i> = pest::iterators::Pair<'i, Rule>;
/// Wrapper around Pest's `Pairs`
type Pairs<'i> = pest::iterators::Pairs<'i, Rule>;

use crate::lib::{
    date::{Date, Month},
    entry::{FuelFillUp, FuelKind, Id, OdometerEntry, Trip, Vehicle, VehicleKind},
    typical,
};
use crate::load::error;

/// Pest-generated parser
#[derive(Parser)]
#[grammar = "load/milelog.pest"]
pub struct LogbookParser;

/// Everything a logbook declares, in logbook order
#[derive(Debug, Default)]
pub struct Logbook {
    pub vehicles: Vec<Vehicle>,
    pub entries: Vec<OdometerEntry>,
    pub fillups: Vec<FuelFillUp>,
    pub trips: Vec<Trip>,
}

struct Once<'i, T> {
    name: &'i str,
    hint: &'i str,
    loc: &'i error::Loc<'i>,
    valid: bool,
    data: Option<T>,
}

impl<'i, T> Once<'i, T> {
    fn new(name: &'i str, hint: &'i str, loc: &'i error::Loc) -> Self {
        Self {
            name,
            hint,
            loc,
            valid: true,
            data: None,
        }
    }

    fn try_set(&mut self, val: T, errs: &mut error::Record) {
        if self.data.is_some() {
            errs.make("Duplicate field definition")
                .span(self.loc, format!("attempt to override {}", self.name))
                .text("Each field may only be defined once")
                .hint("remove one of the field definitions");
            self.valid = false;
        }
        self.data = Some(val);
    }

    fn try_get(self, errs: &mut error::Record) -> Option<T> {
        if self.valid {
            if self.data.is_none() {
                errs.make("Missing field definition")
                    .span(self.loc, format!("'{}' may not be omitted", self.name))
                    .text("This field is required")
                    .hint(format!(
                        "add definition for the missing field: '{} {}'",
                        self.name, self.hint
                    ));
                None
            } else {
                self.data
            }
        } else {
            None
        }
    }

    /// Like `try_get` for a field that may be omitted
    fn try_get_optional(self) -> Option<Option<T>> {
        if self.valid {
            Some(self.data)
        } else {
            None
        }
    }
}

/// Get the contents of a logbook
///
/// The return value may be non-empty even if some errors (including fatal ones) occured,
/// it contains all items that were read correctly.
///
/// Caller should determine the success of this function not through its return value
/// but by querying `errs` (e.g. by checking `errs.is_fatal()` or `errs.count_errors()`)
pub fn extract<'i>(path: &'i str, errs: &mut error::Record, contents: &'i str) -> Logbook {
    match LogbookParser::parse(Rule::program, contents) {
        Ok(pairs) => validate(path, errs, pairs),
        Err(e) => {
            errs.make("Parsing failure").with_pest(e.with_path(path));
            Logbook::default()
        }
    }
}

// get first and rest of inner
macro_rules! decapitate {
    ( $node:expr ) => {{
        let mut items = $node.into_inner();
        let fst = items.next().unwrap_or_else(|| panic!("No head"));
        (fst, items)
    }};
}

// extract contents of wrapper rule
macro_rules! subrule {
    ( $node:expr ) => {{
        let mut items = $node.into_inner();
        let fst = items.next().unwrap_or_else(|| panic!("No subrule"));
        if items.next().is_some() {
            panic!("Several subrules");
        }
        fst
    }};
}

/// Records waiting for their vehicle to be known
struct Builder<'i> {
    path: &'i str,
    next_id: usize,
    book: Logbook,
    /// every vehicle mentioned by a record, with its first mention
    references: Vec<(&'i str, error::Loc<'i>)>,
    /// where each vehicle was declared
    declared: Vec<error::Loc<'i>>,
}

impl<'i> Builder<'i> {
    fn new(path: &'i str) -> Self {
        Self {
            path,
            next_id: 0,
            book: Logbook::default(),
            references: Vec::new(),
            declared: Vec::new(),
        }
    }

    fn loc(&self, pair: &Pair<'i>) -> error::Loc<'i> {
        (self.path, pair.as_span())
    }

    fn fresh_id(&mut self) -> Id {
        self.next_id += 1;
        Id(self.next_id)
    }

    fn refer(&mut self, id: &'i str, loc: error::Loc<'i>) {
        if !self.references.iter().any(|(r, _)| *r == id) {
            self.references.push((id, loc));
        }
    }

    fn finish(mut self, errs: &mut error::Record) -> Logbook {
        for (id, loc) in &self.references {
            if !self.book.vehicles.iter().any(|v| v.id == *id) {
                errs.make("Unknown vehicle")
                    .nonfatal()
                    .span(loc, "referenced here")
                    .text(format!("'{}' is not declared by any `vehicle` block", id))
                    .hint(format!("declare it: 'vehicle {} {{ make \"...\" model \"...\" }}'", id));
            }
        }
        for v in &mut self.book.vehicles {
            if typical::complete(v) {
                log::debug!("expected mileage of '{}' taken from the built-in table", v.id);
            }
        }
        log::info!(
            "read {} vehicles, {} odometer readings, {} fill-ups and {} trips from '{}'",
            self.book.vehicles.len(),
            self.book.entries.len(),
            self.book.fillups.len(),
            self.book.trips.len(),
            self.path
        );
        self.book
    }
}

/// Check all items
///
/// Sequentially validates each vehicle or dated group, records errors, accumulates
/// the correct ones into the return value.
pub fn validate<'i>(path: &'i str, errs: &mut error::Record, pairs: Pairs<'i>) -> Logbook {
    let mut builder = Builder::new(path);
    for pair in pairs {
        match pair.as_rule() {
            Rule::vehicle_descriptor => validate_vehicle(&mut builder, errs, pair),
            Rule::entries_year => {
                let (head, body) = decapitate!(pair);
                let year = match read_number::<usize>(&builder, errs, &head) {
                    Some(year) => year,
                    None => continue,
                };
                validate_year(&mut builder, errs, year, body);
            }
            Rule::EOI => break,
            _ => unreachable!("{:?}", pair.as_rule()),
        }
    }
    builder.finish(errs)
}

/// Parse the text of a number, which the grammar already validated
fn read_number<'i, T>(builder: &Builder<'i>, errs: &mut error::Record, pair: &Pair<'i>) -> Option<T>
where
    T: std::str::FromStr,
{
    match pair.as_str().parse::<T>() {
        Ok(n) => Some(n),
        Err(_) => {
            errs.make("Invalid number")
                .span(&builder.loc(pair), "provided here")
                .text(format!("'{}' cannot be represented", pair.as_str()))
                .hint("use a smaller value");
            None
        }
    }
}

/// Contents of a quoted text
fn read_text(pair: Pair) -> String {
    subrule!(pair).as_str().to_string()
}

/// Check that a vehicle declaration is valid
///
/// This can raise errors since the grammar can't ensure that no
/// duplicate field is present or that no field definition is missing
fn validate_vehicle<'i>(builder: &mut Builder<'i>, errs: &mut error::Record, pair: Pair<'i>) {
    let loc = builder.loc(&pair);
    let (id, fields) = decapitate!(pair);
    let id = id.as_str();
    if let Some(prev) = builder
        .book
        .vehicles
        .iter()
        .position(|v| v.id == id)
    {
        errs.make("Duplicate vehicle")
            .span(&loc, format!("attempt to redeclare '{}'", id))
            .span(&builder.declared[prev], "first declared here")
            .text("Each vehicle may only be declared once")
            .hint("rename one of the vehicles or merge the declarations");
        return;
    }
    let mut kind = Once::new("type", "Car", &loc);
    let mut make = Once::new("make", "\"Honda\"", &loc);
    let mut model = Once::new("model", "\"Civic\"", &loc);
    let mut variant = Once::new("variant", "\"VX\"", &loc);
    let mut year = Once::new("year", "2021", &loc);
    let mut fuel = Once::new("fuel", "Petrol", &loc);
    let mut typical = Once::new("typical", "15", &loc);
    for field in fields {
        match field.as_rule() {
            Rule::field_type => {
                let name = subrule!(field);
                match name.as_str().parse::<VehicleKind>() {
                    Ok(k) => kind.try_set(k, errs),
                    Err(()) => {
                        errs.make("Invalid vehicle type")
                            .span(&builder.loc(&name), "provided here")
                            .text(format!("'{}' is not a known type of vehicle", name.as_str()))
                            .hint("use one of Car, Scooter, Bike, Truck, Van, Ev, Other");
                        return;
                    }
                }
            }
            Rule::field_make => make.try_set(read_text(subrule!(field)), errs),
            Rule::field_model => model.try_set(read_text(subrule!(field)), errs),
            Rule::field_variant => variant.try_set(read_text(subrule!(field)), errs),
            Rule::field_year => {
                let inner = subrule!(field);
                match read_number::<u16>(builder, errs, &inner) {
                    Some(y) => year.try_set(y, errs),
                    None => return,
                }
            }
            Rule::field_fuel => {
                let name = subrule!(field);
                match name.as_str().parse::<FuelKind>() {
                    Ok(k) => fuel.try_set(k, errs),
                    Err(()) => {
                        errs.make("Invalid fuel kind")
                            .span(&builder.loc(&name), "provided here")
                            .text(format!("'{}' is not a known kind of fuel", name.as_str()))
                            .hint("use one of Petrol, Diesel, Cng, Hybrid, Ev, Other");
                        return;
                    }
                }
            }
            Rule::field_typical => {
                let inner = subrule!(field);
                match read_number::<f64>(builder, errs, &inner) {
                    Some(m) => typical.try_set(m, errs),
                    None => return,
                }
            }
            _ => unreachable!("{:?}", field.as_rule()),
        }
    }
    let make = make.try_get(errs);
    let model = model.try_get(errs);
    let (kind, variant, year, fuel, typical) = match (
        kind.try_get_optional(),
        variant.try_get_optional(),
        year.try_get_optional(),
        fuel.try_get_optional(),
        typical.try_get_optional(),
    ) {
        (Some(k), Some(v), Some(y), Some(f), Some(t)) => (k, v, y, f, t),
        _ => return,
    };
    if let (Some(make), Some(model)) = (make, model) {
        builder.declared.push(loc.clone());
        builder.book.vehicles.push(Vehicle {
            id: id.to_string(),
            kind: kind.unwrap_or(VehicleKind::Car),
            make,
            model,
            variant,
            year,
            fuel: fuel.unwrap_or(FuelKind::Other),
            typical_mileage: typical,
        });
    }
}

/// Parse a series of records registered for the same year
fn validate_year<'i>(builder: &mut Builder<'i>, errs: &mut error::Record, year: usize, pairs: Pairs<'i>) {
    for pair in pairs {
        let (month, rest) = decapitate!(pair);
        if let Some(month) = read_month(builder, errs, &month) {
            validate_month(builder, errs, year, month, rest);
        }
    }
}

fn read_month<'i>(builder: &Builder<'i>, errs: &mut error::Record, pair: &Pair<'i>) -> Option<Month> {
    match pair.as_str().parse::<Month>() {
        Ok(month) => Some(month),
        Err(()) => {
            errs.make("Invalid month")
                .span(&builder.loc(pair), "provided here")
                .hint("Months are 'Jan', 'Feb', ..., 'Dec'");
            None
        }
    }
}

/// Build a date, reporting it at `loc` if it does not exist
fn make_date(errs: &mut error::Record, loc: &error::Loc, year: usize, month: Month, day: usize) -> Option<Date> {
    match Date::from(year, month, day) {
        Ok(date) => Some(date),
        Err(e) => {
            errs.make("Invalid date")
                .span(loc, "provided here")
                .text(format!("{}", e))
                .hint("choose a date that exists")
                .hint(e.fix_hint());
            None
        }
    }
}

/// Parse a series of records registered for the same month
///
/// The date creation can produce errors
fn validate_month<'i>(
    builder: &mut Builder<'i>,
    errs: &mut error::Record,
    year: usize,
    month: Month,
    pairs: Pairs<'i>,
) {
    for pair in pairs {
        let (day, rest) = decapitate!(pair);
        let loc = builder.loc(&day);
        let day = match read_number::<usize>(builder, errs, &day) {
            Some(day) => day,
            None => continue,
        };
        if let Some(date) = make_date(errs, &loc, year, month, day) {
            validate_day(builder, errs, date, rest);
        }
    }
}

/// Parse a series of records registered for the same day
fn validate_day<'i>(builder: &mut Builder<'i>, errs: &mut error::Record, date: Date, pairs: Pairs<'i>) {
    for pair in pairs {
        match pair.as_rule() {
            Rule::odometer_entry => validate_odometer(builder, errs, date, pair),
            Rule::fuel_entry => validate_fillup(builder, errs, date, pair),
            Rule::trip_entry => validate_trip(builder, errs, date, pair),
            _ => unreachable!("{:?}", pair.as_rule()),
        }
    }
}

/// Parse an odometer reading
///
/// Grammar ensures that fields are in order
fn validate_odometer<'i>(builder: &mut Builder<'i>, errs: &mut error::Record, date: Date, pair: Pair<'i>) {
    let loc = builder.loc(&pair);
    let mut inner = pair.into_inner();
    let (vehicle, reading) = match (inner.next(), inner.next()) {
        (Some(v), Some(r)) => (v, r),
        _ => unreachable!(),
    };
    let notes = inner.next().map(|note| read_text(subrule!(note)));
    let reading = match read_number::<f64>(builder, errs, &reading) {
        Some(r) => r,
        None => return,
    };
    builder.refer(vehicle.as_str(), loc);
    let id = builder.fresh_id();
    builder.book.entries.push(OdometerEntry {
        id,
        vehicle: vehicle.as_str().to_string(),
        date,
        reading,
        notes,
    });
}

/// Parse a fill-up
///
/// This can fail since the grammar can't ensure that there is no duplicate field
/// definition or that there is no missing field
fn validate_fillup<'i>(builder: &mut Builder<'i>, errs: &mut error::Record, date: Date, pair: Pair<'i>) {
    let loc = builder.loc(&pair);
    let (vehicle, fields) = decapitate!(pair);
    let mut odometer = Once::new("odo", "12030", &loc);
    let mut volume = Once::new("vol", "35.2", &loc);
    let mut cost = Once::new("cost", "3520", &loc);
    let mut price = Once::new("price", "100", &loc);
    let mut station = Once::new("at", "\"Shell\"", &loc);
    let mut note = Once::new("note", "\"full tank\"", &loc);
    for field in fields {
        let rule = field.as_rule();
        match rule {
            Rule::field_odo | Rule::field_vol | Rule::field_cost | Rule::field_price => {
                let inner = subrule!(field);
                let value = match read_number::<f64>(builder, errs, &inner) {
                    Some(value) => value,
                    None => return,
                };
                match rule {
                    Rule::field_odo => odometer.try_set(value, errs),
                    Rule::field_vol => volume.try_set(value, errs),
                    Rule::field_cost => cost.try_set(value, errs),
                    _ => price.try_set(value, errs),
                }
            }
            Rule::field_station => station.try_set(read_text(subrule!(field)), errs),
            Rule::field_note => note.try_set(read_text(subrule!(field)), errs),
            _ => unreachable!("{:?}", rule),
        }
    }
    let odometer = odometer.try_get(errs);
    let volume = volume.try_get(errs);
    let cost = cost.try_get(errs);
    let (odometer, volume, cost) = match (odometer, volume, cost) {
        (Some(o), Some(v), Some(c)) => (o, v, c),
        _ => return,
    };
    let (price, station, notes) = match (
        price.try_get_optional(),
        station.try_get_optional(),
        note.try_get_optional(),
    ) {
        (Some(p), Some(s), Some(n)) => (p, s, n),
        _ => return,
    };
    if volume == 0.0 {
        errs.make("Empty fill-up")
            .nonfatal()
            .span(&loc, "no fuel bought")
            .text("This fill-up will not contribute to any mileage")
            .hint("check the 'vol' field");
    }
    builder.refer(vehicle.as_str(), loc);
    let id = builder.fresh_id();
    builder.book.fillups.push(FuelFillUp {
        id,
        vehicle: vehicle.as_str().to_string(),
        date,
        odometer,
        volume,
        cost,
        price,
        station,
        notes,
    });
}

/// Parse the date at which a trip ends
fn read_exact_date<'i>(builder: &Builder<'i>, errs: &mut error::Record, pair: Pair<'i>) -> Option<Date> {
    let loc = builder.loc(&pair);
    let mut inner = pair.into_inner();
    let (year, month, day) = match (inner.next(), inner.next(), inner.next()) {
        (Some(y), Some(m), Some(d)) => (y, m, d),
        _ => unreachable!(),
    };
    let year = read_number::<usize>(builder, errs, &year)?;
    let month = read_month(builder, errs, &month)?;
    let day = read_number::<usize>(builder, errs, &day)?;
    make_date(errs, &loc, year, month, day)
}

/// Parse a trip starting on `date`
///
/// Besides duplicate and missing fields, the trip is rejected if it
/// ends before it starts, either in time or on the odometer.
fn validate_trip<'i>(builder: &mut Builder<'i>, errs: &mut error::Record, date: Date, pair: Pair<'i>) {
    let loc = builder.loc(&pair);
    let (vehicle, fields) = decapitate!(pair);
    let mut from = Once::new("from", "12000", &loc);
    let mut to = Once::new("to", "12250", &loc);
    let mut until = Once::new("until", "2024-Jan-07", &loc);
    let mut volume = Once::new("vol", "15", &loc);
    let mut cost = Once::new("cost", "1500", &loc);
    let mut note = Once::new("note", "\"holidays\"", &loc);
    for field in fields {
        let rule = field.as_rule();
        match rule {
            Rule::field_from | Rule::field_to | Rule::field_vol | Rule::field_cost => {
                let inner = subrule!(field);
                let value = match read_number::<f64>(builder, errs, &inner) {
                    Some(value) => value,
                    None => return,
                };
                match rule {
                    Rule::field_from => from.try_set(value, errs),
                    Rule::field_to => to.try_set(value, errs),
                    Rule::field_vol => volume.try_set(value, errs),
                    _ => cost.try_set(value, errs),
                }
            }
            Rule::field_until => match read_exact_date(builder, errs, subrule!(field)) {
                Some(end) => until.try_set(end, errs),
                None => return,
            },
            Rule::field_note => note.try_set(read_text(subrule!(field)), errs),
            _ => unreachable!("{:?}", rule),
        }
    }
    let from = from.try_get(errs);
    let to = to.try_get(errs);
    let (start_odometer, end_odometer) = match (from, to) {
        (Some(f), Some(t)) => (f, t),
        _ => return,
    };
    let (end, volume, cost, notes) = match (
        until.try_get_optional(),
        volume.try_get_optional(),
        cost.try_get_optional(),
        note.try_get_optional(),
    ) {
        (Some(e), Some(v), Some(c), Some(n)) => (e.unwrap_or(date), v, c, n),
        _ => return,
    };
    if end_odometer < start_odometer {
        errs.make("Invalid trip")
            .span(&loc, "odometer runs backwards")
            .text(format!(
                "The trip ends at {} but starts at {}",
                end_odometer, start_odometer
            ))
            .hint("swap the 'from' and 'to' readings");
        return;
    }
    if end < date {
        errs.make("Invalid trip")
            .span(&loc, "ends before it starts")
            .text(format!("The trip starts on {} but ends on {}", date, end))
            .hint("the 'until' date must not precede the day the trip is logged under");
        return;
    }
    builder.refer(vehicle.as_str(), loc);
    let id = builder.fresh_id();
    builder.book.trips.push(Trip {
        id,
        vehicle: vehicle.as_str().to_string(),
        start: date,
        end,
        start_odometer,
        end_odometer,
        volume,
        cost,
        notes,
    });
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::{date::Month::*, entry::fixtures::day};

    fn load(contents: &str) -> (Logbook, error::Record) {
        let mut errs = error::Record::new();
        let book = extract("test.mlg", &mut errs, contents);
        (book, errs)
    }

    macro_rules! labels {
        ( $errs:expr => $( $label:expr ),* ) => {{
            let expected: Vec<&str> = vec![ $( $label ),* ];
            assert_eq!($errs.labels().collect::<Vec<_>>(), expected);
        }};
    }

    const CIVIC: &str = r#"
        vehicle civic {
            make "Honda" model "Civic" year 2021
            fuel Petrol
        }
    "#;

    #[test]
    fn full_logbook() {
        let contents = format!(
            "{}{}",
            CIVIC,
            r#"
            vehicle creta {
                model "Creta" make "Hyundai"
                fuel Diesel typical 18.5
            }
            # first week of the year
            2024:
              Jan:
                05: odo civic 12034.5 note "commute";
                    fuel civic odo 12030 vol 35.2 cost 3520 at "Shell";
                7: fuel creta cost 2000 vol 20 odo 500 price 100 note "full";
              Feb:
                01: odo creta 900;
            "#
        );
        let (book, errs) = load(&contents);
        assert!(errs.is_empty(), "{}", errs);
        assert_eq!(book.vehicles.len(), 2);
        let civic = &book.vehicles[0];
        assert_eq!((civic.make.as_str(), civic.model.as_str()), ("Honda", "Civic"));
        assert_eq!(civic.year, Some(2021));
        assert_eq!(civic.fuel, FuelKind::Petrol);
        // from the built-in table
        assert_eq!(civic.typical_mileage, Some(15.0));
        assert_eq!(book.vehicles[1].typical_mileage, Some(18.5));
        assert_eq!(book.vehicles[1].fuel, FuelKind::Diesel);

        assert_eq!(book.entries.len(), 2);
        assert_eq!(book.entries[0].id, Id(1));
        assert_eq!(book.entries[0].date, day(2024, Jan, 5));
        assert_eq!(book.entries[0].reading, 12034.5);
        assert_eq!(book.entries[0].notes.as_deref(), Some("commute"));
        assert_eq!(book.entries[1].id, Id(4));
        assert_eq!(book.entries[1].date, day(2024, Feb, 1));

        assert_eq!(book.fillups.len(), 2);
        let shell = &book.fillups[0];
        assert_eq!(shell.id, Id(2));
        assert_eq!((shell.odometer, shell.volume, shell.cost), (12030.0, 35.2, 3520.0));
        assert_eq!(shell.station.as_deref(), Some("Shell"));
        assert_eq!(shell.price, None);
        let full = &book.fillups[1];
        assert_eq!(full.id, Id(3));
        assert_eq!(full.date, day(2024, Jan, 7));
        assert_eq!(full.price, Some(100.0));
        assert_eq!(full.notes.as_deref(), Some("full"));
    }

    #[test]
    fn defaults() {
        let (book, errs) = load(r#"vehicle bike { make "Hero" model "Splendor" }"#);
        assert!(errs.is_empty());
        assert_eq!(book.vehicles[0].fuel, FuelKind::Other);
        assert_eq!(book.vehicles[0].kind, VehicleKind::Car);
        assert_eq!(book.vehicles[0].variant, None);
        assert_eq!(book.vehicles[0].year, None);
        assert_eq!(book.vehicles[0].typical_mileage, None);
    }

    #[test]
    fn vehicle_details() {
        let (book, errs) = load(
            r#"
            vehicle activa {
                type Scooter make "Honda" model "Activa" variant "6G"
                year 2022 fuel Petrol typical 45
            }
            vehicle tank { type Tank make "Rheinmetall" model "Leopard" }
            "#,
        );
        labels!(errs => "Invalid vehicle type");
        assert_eq!(book.vehicles.len(), 1);
        let activa = &book.vehicles[0];
        assert_eq!(activa.kind, VehicleKind::Scooter);
        assert_eq!(activa.variant.as_deref(), Some("6G"));
        assert_eq!(activa.long_name(), "Honda Activa · 6G");
        assert_eq!(activa.typical_mileage, Some(45.0));
    }

    #[test]
    fn trips() {
        let contents = format!(
            "{}{}",
            CIVIC,
            r#"
            2024: Jan:
                05: trip civic from 12000 to 12250 until 2024-Jan-07 vol 15 cost 1500 note "Goa";
                    odo civic 12260;
                09: trip civic to 12300 from 12260;
            "#
        );
        let (book, errs) = load(&contents);
        assert!(errs.is_empty(), "{}", errs);
        assert_eq!(book.trips.len(), 2);
        let goa = &book.trips[0];
        assert_eq!(goa.id, Id(1));
        assert_eq!((goa.start, goa.end), (day(2024, Jan, 5), day(2024, Jan, 7)));
        assert_eq!((goa.start_odometer, goa.end_odometer), (12000.0, 12250.0));
        assert_eq!((goa.volume, goa.cost), (Some(15.0), Some(1500.0)));
        assert_eq!(goa.notes.as_deref(), Some("Goa"));
        assert_eq!(book.entries[0].id, Id(2));
        let short = &book.trips[1];
        assert_eq!(short.id, Id(3));
        assert_eq!((short.start, short.end), (day(2024, Jan, 9), day(2024, Jan, 9)));
        assert_eq!((short.volume, short.cost, short.notes.clone()), (None, None, None));
    }

    #[test]
    fn invalid_trips() {
        let contents = format!(
            "{}{}",
            CIVIC,
            r#"
            2024: Jan:
                05: trip civic from 200 to 100;
                    trip civic from 100 to 200 until 2024-Jan-04;
                    trip civic from 100 to 200 until 2024-Jan-32;
                    trip civic from 100;
                    trip civic from 100 to 200 from 150;
            "#
        );
        let (book, errs) = load(&contents);
        assert!(errs.is_fatal());
        labels!(errs =>
            "Invalid trip",
            "Invalid trip",
            "Invalid date",
            "Missing field definition",
            "Duplicate field definition"
        );
        assert!(book.trips.is_empty());
    }

    #[test]
    fn syntax_error() {
        let (book, errs) = load("2024: Jan: 05: odo civic;");
        assert!(errs.is_fatal());
        labels!(errs => "Parsing failure");
        assert!(book.entries.is_empty());
    }

    #[test]
    fn invalid_dates() {
        let contents = format!(
            "{}{}",
            CIVIC,
            "2023: Feb: 29: odo civic 10; Jan: 32: odo civic 11; 1: odo civic 12; Foo: 2: odo civic 13;"
        );
        let (book, errs) = load(&contents);
        assert!(errs.is_fatal());
        labels!(errs => "Invalid date", "Invalid date", "Invalid month");
        assert_eq!(book.entries.len(), 1);
        assert_eq!(book.entries[0].reading, 12.0);
    }

    #[test]
    fn field_errors() {
        let contents = format!(
            "{}{}",
            CIVIC,
            r#"
            vehicle civic { make "Honda" model "City" }
            vehicle polo { make "VW" }
            vehicle zoe { make "Renault" model "Zoe" fuel Electric }
            vehicle golf { make "VW" make "VW" model "Golf" }
            2024: Jan:
                01: fuel civic odo 10 vol 2;
                02: fuel civic odo 10 vol 2 cost 3 odo 11;
            "#
        );
        let (book, errs) = load(&contents);
        assert!(errs.is_fatal());
        labels!(errs =>
            "Duplicate vehicle",
            "Missing field definition",
            "Invalid fuel kind",
            "Duplicate field definition",
            "Missing field definition",
            "Duplicate field definition"
        );
        assert_eq!(book.vehicles.len(), 1);
        assert!(book.fillups.is_empty());
    }

    #[test]
    fn warnings() {
        let contents = format!(
            "{}{}",
            CIVIC,
            r#"
            2024: Mar:
                03: odo polo 100; odo polo 120;
                04: fuel civic odo 10 vol 0 cost 0;
            "#
        );
        let (book, errs) = load(&contents);
        assert!(!errs.is_fatal());
        assert_eq!(errs.count_warnings(), 2);
        labels!(errs => "Empty fill-up", "Unknown vehicle");
        assert_eq!(book.entries.len(), 2);
        assert_eq!(book.fillups.len(), 1);
    }

    #[test]
    fn declared_after_use() {
        let contents = format!("{}{}", "2024: Mar: 03: odo civic 100;", CIVIC);
        let (book, errs) = load(&contents);
        assert!(errs.is_empty());
        assert_eq!(book.entries[0].vehicle, "civic");
    }
}
