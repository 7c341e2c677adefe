//! Dashboard of the selected records

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::cli::table::Table;
use crate::lib::{
    date::Date,
    entry::{of_vehicle, Dated, FuelFillUp, OdometerEntry, Trip, Vehicle},
    metrics::{self, Comparison, DashboardMetrics},
    period::{filter_by_range, Period},
    projection::{self, Forecast, Range},
    units::Preferences,
};
use crate::load::Logbook;

/// Records of the logbook that fall in the active period, optionally
/// restricted to a single vehicle
#[derive(Debug)]
pub struct Selection<'b> {
    pub period: Period,
    pub vehicle: Option<&'b str>,
    pub entries: Vec<OdometerEntry>,
    pub fillups: Vec<FuelFillUp>,
    /// trips that started in the period
    pub trips: Vec<Trip>,
    /// vehicles the expectations are taken from
    pub vehicles: Vec<Vehicle>,
}

impl<'b> Selection<'b> {
    pub fn new(book: &Logbook, period: Period, vehicle: Option<&'b str>) -> Self {
        let mut entries = filter_by_range(&book.entries, period);
        let mut fillups = filter_by_range(&book.fillups, period);
        let mut trips = filter_by_range(&book.trips, period);
        let mut vehicles = book.vehicles.clone();
        if let Some(id) = vehicle {
            entries = of_vehicle(&entries, id);
            fillups = of_vehicle(&fillups, id);
            trips = of_vehicle(&trips, id);
            vehicles.retain(|v| v.id == id);
        }
        log::debug!(
            "selected {} entries, {} fill-ups and {} trips in {}",
            entries.len(),
            fillups.len(),
            trips.len(),
            period
        );
        Self {
            period,
            vehicle,
            entries,
            fillups,
            trips,
            vehicles,
        }
    }

    /// Range a calendar of the selection should cover: the active period,
    /// starting no earlier than the first record
    ///
    /// `None` if nothing was selected.
    pub fn chart_period(&self) -> Option<Period> {
        let dates = self
            .entries
            .iter()
            .map(Dated::date)
            .chain(self.fillups.iter().map(Dated::date));
        let span = Period::spanning(dates)?;
        Some(Period(self.period.0.max(span.0), self.period.1))
    }
}

/// Everything the `summary` command shows
///
/// Quantities are kept in the units of the logbook, they are converted
/// only when displayed.
#[derive(Debug, Serialize)]
pub struct Dashboard<'s> {
    pub start: Date,
    pub end: Date,
    pub vehicle: Option<&'s str>,
    pub metrics: DashboardMetrics,
    pub forecast: Forecast,
    pub distance_by_vehicle: BTreeMap<&'s str, f64>,
    pub comparisons: Vec<Comparison>,
}

impl<'s> Dashboard<'s> {
    pub fn build(sel: &'s Selection, all_vehicles: &[Vehicle], today: Date) -> Self {
        let metrics = metrics::aggregate(&sel.entries, &sel.fillups, all_vehicles);
        let forecast = projection::forecast(
            &metrics,
            &sel.entries,
            &sel.fillups,
            &sel.vehicles,
            sel.period,
            today,
        );
        Self {
            start: sel.period.0,
            end: sel.period.1,
            vehicle: sel.vehicle,
            metrics,
            forecast,
            distance_by_vehicle: metrics::distance_by_vehicle(&sel.entries),
            comparisons: metrics::compare_vehicles(&sel.fillups, &sel.vehicles),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn display<'p>(&'p self, prefs: &'p Preferences) -> Report<'p> {
        Report { dash: self, prefs }
    }
}

/// Text rendering of a dashboard in the preferred units
pub struct Report<'p> {
    dash: &'p Dashboard<'p>,
    prefs: &'p Preferences,
}

impl Report<'_> {
    fn range(&self, range: Range) -> String {
        if range.distance > 0.0 {
            format!(
                "{:.1} {} (~{} days)",
                self.prefs.distance(range.distance),
                self.prefs.distance_unit,
                range.days
            )
        } else {
            "-".to_string()
        }
    }

    fn comparisons(&self) -> Table {
        let prefs = self.prefs;
        let mut table = Table::with_columns(
            "Vehicle",
            vec![
                format!("Distance ({})", prefs.distance_unit),
                format!("Expected ({})", prefs.mileage_label()),
                format!("Actual ({})", prefs.mileage_label()),
            ],
        );
        for cmp in &self.dash.comparisons {
            let distance = self
                .dash
                .distance_by_vehicle
                .get(cmp.vehicle.as_str())
                .copied()
                .unwrap_or(0.0);
            table.push_line(
                cmp.name.clone(),
                vec![
                    format!("{:.1}", prefs.distance(distance)),
                    cmp.typical
                        .map(|t| format!("{:.2}", prefs.mileage(t)))
                        .unwrap_or_else(|| "-".to_string()),
                    if cmp.actual > 0.0 {
                        format!("{:.2}", prefs.mileage(cmp.actual))
                    } else {
                        "-".to_string()
                    },
                ],
            );
        }
        table
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (m, fc, prefs) = (&self.dash.metrics, &self.dash.forecast, self.prefs);
        let month = |ym: Option<metrics::YearMonth>| ym.map(|ym| ym.to_string()).unwrap_or_else(|| "-".to_string());
        writeln!(
            f,
            " Dashboard {} ({})",
            Period(self.dash.start, self.dash.end),
            self.dash.vehicle.unwrap_or("all vehicles")
        )?;
        writeln!(f, "   {:<26}{:.1} {}", "Distance", prefs.distance(m.total_distance), prefs.distance_unit)?;
        writeln!(f, "   {:<26}{:.2} {}", "Fuel", prefs.fuel(m.total_fuel), prefs.fuel_unit)?;
        writeln!(f, "   {:<26}{}", "Cost", prefs.money(m.total_cost))?;
        writeln!(f, "   {:<26}{:.2} {}", "Average mileage", prefs.mileage(m.avg_mileage), prefs.mileage_label())?;
        writeln!(f, "   {:<26}{:.1} {}", "CO2", prefs.co2(m.total_co2), prefs.co2_unit)?;
        writeln!(f, "   {:<26}{}", "Best mileage month", month(m.best_mileage_month))?;
        writeln!(f, "   {:<26}{}", "Most travelled month", month(m.most_travelled_month))?;
        writeln!(f, " Forecast over {} days", fc.days)?;
        writeln!(f, "   {:<26}{:.1} {}", "Daily distance", prefs.distance(fc.avg_daily_distance), prefs.distance_unit)?;
        writeln!(f, "   {:<26}{}", "Daily cost", prefs.money(fc.avg_daily_cost))?;
        writeln!(f, "   {:<26}{:.2} {}", "Monthly fuel", prefs.fuel(fc.monthly_fuel), prefs.fuel_unit)?;
        writeln!(f, "   {:<26}{}", "Monthly cost", prefs.money(fc.monthly_cost))?;
        writeln!(f, "   {:<26}{:.1} {}", "Monthly CO2", prefs.co2(fc.monthly_co2), prefs.co2_unit)?;
        writeln!(f, "   {:<26}{}", "Range of last fill-up", self.range(fc.from_last_fill))?;
        writeln!(f, "   {:<26}{}", "Range if refuelled today", self.range(fc.if_refuel_today))?;
        if !self.dash.comparisons.is_empty() {
            write!(f, "{}", self.comparisons())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::{
        date::Month::*,
        entry::{fixtures::*, FuelKind},
        units::DistanceUnit,
    };

    fn logbook() -> Logbook {
        Logbook {
            vehicles: vec![
                vehicle("a", "Civic", FuelKind::Petrol, Some(15.0)),
                vehicle("d", "Creta", FuelKind::Diesel, None),
            ],
            entries: vec![
                odo(1, "a", day(2024, Jan, 1), 100.0),
                odo(2, "a", day(2024, Jan, 5), 300.0),
                odo(3, "d", day(2024, Jan, 2), 50.0),
                odo(4, "d", day(2024, Feb, 2), 150.0),
            ],
            fillups: vec![
                fill(5, "a", day(2024, Jan, 1), 100.0, 10.0, 20.0),
                fill(6, "a", day(2024, Jan, 5), 300.0, 20.0, 40.0),
                fill(7, "d", day(2024, Jan, 3), 60.0, 10.0, 30.0),
            ],
            trips: vec![
                trip(8, "a", day(2024, Jan, 2), 120.0, 180.0),
                trip(9, "d", day(2024, Feb, 3), 150.0, 200.0),
            ],
        }
    }

    #[test]
    fn selection() {
        let book = logbook();
        let jan = Period(day(2024, Jan, 1), day(2024, Jan, 31));
        let sel = Selection::new(&book, jan, None);
        assert_eq!(sel.entries.len(), 3);
        assert_eq!(sel.fillups.len(), 3);
        assert_eq!(sel.trips.len(), 1);
        assert_eq!(sel.vehicles.len(), 2);
        let sel = Selection::new(&book, Period::UNBOUNDED, Some("d"));
        assert_eq!(sel.entries.len(), 2);
        assert_eq!(sel.fillups.len(), 1);
        assert_eq!(sel.trips.len(), 1);
        assert_eq!(sel.trips[0].id.0, 9);
        assert_eq!(sel.vehicles.len(), 1);
    }

    #[test]
    fn chart_period() {
        let book = logbook();
        let all = Selection::new(&book, Period(Date::EPOCH, day(2024, Mar, 1)), None);
        assert_eq!(all.chart_period(), Some(Period(day(2024, Jan, 1), day(2024, Mar, 1))));
        let feb = Selection::new(&book, Period(day(2024, Feb, 1), day(2024, Feb, 29)), None);
        assert_eq!(feb.chart_period(), Some(Period(day(2024, Feb, 2), day(2024, Feb, 29))));
        let none = Selection::new(&book, Period::day(day(2023, Jan, 1)), None);
        assert_eq!(none.chart_period(), None);
    }

    #[test]
    fn dashboard() {
        let book = logbook();
        let sel = Selection::new(&book, Period(day(2024, Jan, 1), day(2024, Jan, 31)), Some("a"));
        let dash = Dashboard::build(&sel, &book.vehicles, day(2024, Jan, 31));
        assert_eq!(dash.metrics.total_distance, 200.0);
        assert_eq!(dash.metrics.avg_mileage, 10.0);
        assert_eq!(dash.forecast.days, 5);
        assert_eq!(dash.comparisons.len(), 1);
        assert_eq!(dash.comparisons[0].actual, 10.0);
        let text = dash.display(&Preferences::default()).to_string();
        assert!(text.contains("Dashboard 2024-Jan (a)"));
        assert!(text.contains("200.0 km"));
        assert!(text.contains("Make Civic"));
        let miles = Preferences {
            distance_unit: DistanceUnit::Mi,
            ..Preferences::default()
        };
        assert!(dash.display(&miles).to_string().contains("124.3 mi"));
    }

    #[test]
    fn json() {
        let book = logbook();
        let sel = Selection::new(&book, Period(day(2024, Jan, 1), day(2024, Feb, 29)), None);
        let dash = Dashboard::build(&sel, &book.vehicles, day(2024, Feb, 29));
        let value: serde_json::Value = serde_json::from_str(&dash.to_json().unwrap()).unwrap();
        assert_eq!(value["start"], "2024-01-01");
        assert_eq!(value["vehicle"], serde_json::Value::Null);
        assert_eq!(value["metrics"]["total_fuel"], 40.0);
        assert_eq!(value["metrics"]["most_travelled_month"], "2024-01");
        assert_eq!(value["distance_by_vehicle"]["d"], 100.0);
        assert_eq!(value["comparisons"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn empty_selection() {
        let book = Logbook::default();
        let sel = Selection::new(&book, Period::day(day(2024, Jan, 1)), None);
        let dash = Dashboard::build(&sel, &book.vehicles, day(2024, Jan, 1));
        let text = dash.display(&Preferences::default()).to_string();
        assert!(text.contains("Range of last fill-up"));
        assert!(text.contains("   Range if refuelled today  -"));
        assert!(!text.contains("Vehicle"));
    }
}
