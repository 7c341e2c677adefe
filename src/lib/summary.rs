//! Per-bucket totals over a period

use std::ops;
use std::str::FromStr;

use crate::lib::{
    date::Date,
    entry::{FuelFillUp, OdometerEntry, Vehicle, FALLBACK_VEHICLE},
    metrics::{compute_distances, compute_fuel_mileage, emission_factor},
    period::Period,
};

/// Width of the buckets of a calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duration {
    Day,
    Week,
    Month,
    Year,
}

impl FromStr for Duration {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        Ok(match s {
            "day" => Duration::Day,
            "week" => Duration::Week,
            "month" => Duration::Month,
            "year" => Duration::Year,
            _ => return Err(()),
        })
    }
}

impl Duration {
    fn align(self, date: Date) -> Date {
        match self {
            Duration::Day => date,
            Duration::Week => date.start_of_week(),
            Duration::Month => date.start_of_month(),
            Duration::Year => date.start_of_year(),
        }
    }

    fn step(self, date: Date, count: usize) -> Date {
        let count = count.max(1) as isize;
        match self {
            Duration::Day => date.jump_day(count),
            Duration::Week => date.jump_day(count * 7),
            Duration::Month => date.jump_month(count),
            Duration::Year => date.jump_year(count),
        }
    }
}

/// Something that happened on a day and adds to the totals of its bucket
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contribution {
    /// distance driven by the vehicle in slot `slot`
    Distance { date: Date, slot: usize, distance: f64 },
    /// a fill-up and the CO2 its fuel will emit
    Fuel { date: Date, volume: f64, cost: f64, co2: f64 },
    /// a completed mileage cycle
    Cycle { date: Date, distance: f64, fuel: f64 },
}

impl Contribution {
    pub fn date(&self) -> Date {
        match *self {
            Contribution::Distance { date, .. } => date,
            Contribution::Fuel { date, .. } => date,
            Contribution::Cycle { date, .. } => date,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    period: Period,
    /// one slot per vehicle, plus a last one for unknown vehicles
    distances: Vec<f64>,
    fuel: f64,
    cost: f64,
    co2: f64,
    fills: usize,
    cycle_distance: f64,
    cycle_fuel: f64,
}

impl Summary {
    pub fn new(period: Period, slots: usize) -> Self {
        Self {
            period,
            distances: vec![0.0; slots],
            fuel: 0.0,
            cost: 0.0,
            co2: 0.0,
            fills: 0,
            cycle_distance: 0.0,
            cycle_fuel: 0.0,
        }
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    pub fn total_distance(&self) -> f64 {
        self.distances.iter().sum()
    }

    pub fn fuel(&self) -> f64 {
        self.fuel
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn co2(&self) -> f64 {
        self.co2
    }

    pub fn fills(&self) -> usize {
        self.fills
    }

    /// Fuel-weighted mileage of the cycles that closed in this bucket
    pub fn mileage(&self) -> Option<f64> {
        if self.cycle_fuel > 0.0 {
            Some(self.cycle_distance / self.cycle_fuel)
        } else {
            None
        }
    }
}

impl ops::AddAssign<&Contribution> for Summary {
    fn add_assign(&mut self, contrib: &Contribution) {
        if !self.period.contains(contrib.date()) {
            return;
        }
        match *contrib {
            Contribution::Distance { slot, distance, .. } => {
                let last = self.distances.len() - 1;
                self.distances[slot.min(last)] += distance;
            }
            Contribution::Fuel { volume, cost, co2, .. } => {
                self.fuel += volume;
                self.cost += cost;
                self.co2 += co2;
                self.fills += 1;
            }
            Contribution::Cycle { distance, fuel, .. } => {
                self.cycle_distance += distance;
                self.cycle_fuel += fuel;
            }
        }
    }
}

/// A collection of disjoint ordered summaries
#[derive(Debug)]
pub struct Calendar {
    vehicles: Vec<String>,
    labels: Vec<String>,
    items: Vec<Summary>,
}

impl Calendar {
    /// Cover `period` with buckets of `count` times `duration`
    ///
    /// Buckets are aligned on the natural boundaries of `duration`, the first
    /// and the last one are truncated to fit inside `period`.
    pub fn from_spacing(period: Period, duration: Duration, count: usize, vehicles: &[Vehicle]) -> Self {
        let slots = vehicles.len() + 1;
        let mut items = Vec::new();
        if !period.is_empty() {
            let mut start = duration.align(period.0);
            while start <= period.1 {
                let next = duration.step(start, count);
                debug_assert!(start < next);
                items.push(Summary::new(
                    Period(start.max(period.0), next.prev().min(period.1)),
                    slots,
                ));
                start = next;
            }
        }
        Self {
            vehicles: vehicles.iter().map(|v| v.id.clone()).collect(),
            labels: vehicles
                .iter()
                .map(|v| v.display_name().to_string())
                .chain(std::iter::once(FALLBACK_VEHICLE.to_string()))
                .collect(),
            items,
        }
    }

    /// Slot of the distances of vehicle `id`
    pub fn slot(&self, id: &str) -> usize {
        self.vehicles
            .iter()
            .position(|v| v == id)
            .unwrap_or(self.vehicles.len())
    }

    /// Names of the slots, the last one groups unknown vehicles
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn items(&self) -> &[Summary] {
        &self.items
    }

    /// Whether any distance was attributed to an unknown vehicle
    pub fn has_unknown(&self) -> bool {
        let last = self.vehicles.len();
        self.items.iter().any(|s| s.distances[last] > 0.0)
    }

    fn add(&mut self, contrib: Contribution) {
        let date = contrib.date();
        let idx = self.items.partition_point(|s| s.period().1 < date);
        if let Some(sum) = self.items.get_mut(idx) {
            *sum += &contrib;
        }
    }

    /// Distribute all records among the buckets
    pub fn register(&mut self, entries: &[OdometerEntry], fillups: &[FuelFillUp], vehicles: &[Vehicle]) {
        for d in compute_distances(entries) {
            let slot = self.slot(&d.entry.vehicle);
            self.add(Contribution::Distance {
                date: d.entry.date,
                slot,
                distance: d.distance,
            });
        }
        for f in fillups {
            self.add(Contribution::Fuel {
                date: f.date,
                volume: f.volume,
                cost: f.cost,
                co2: f.volume * emission_factor(vehicles, &f.vehicle),
            });
        }
        for c in compute_fuel_mileage(fillups) {
            self.add(Contribution::Cycle {
                date: c.date,
                distance: c.distance,
                fuel: c.fuel,
            });
        }
        log::debug!("registered records over {} buckets", self.items.len());
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::{
        date::Month::*,
        entry::{fixtures::*, FuelKind},
    };

    macro_rules! periods {
        ( $cal:expr => $( $start:expr, $end:expr );* ) => {{
            let found = $cal.items().iter().map(|s| s.period()).collect::<Vec<_>>();
            assert_eq!(found, vec![ $( Period($start, $end) ),* ]);
        }};
    }

    #[test]
    fn spacing() {
        let period = Period(day(2024, Jan, 15), day(2024, Apr, 3));
        let cal = Calendar::from_spacing(period, Duration::Month, 1, &[]);
        periods!(cal =>
            day(2024, Jan, 15), day(2024, Jan, 31);
            day(2024, Feb, 1), day(2024, Feb, 29);
            day(2024, Mar, 1), day(2024, Mar, 31);
            day(2024, Apr, 1), day(2024, Apr, 3)
        );
        let cal = Calendar::from_spacing(period, Duration::Year, 1, &[]);
        periods!(cal => day(2024, Jan, 15), day(2024, Apr, 3));
        let cal = Calendar::from_spacing(Period(day(2024, Jan, 1), day(2024, Jan, 5)), Duration::Day, 2, &[]);
        periods!(cal =>
            day(2024, Jan, 1), day(2024, Jan, 2);
            day(2024, Jan, 3), day(2024, Jan, 4);
            day(2024, Jan, 5), day(2024, Jan, 5)
        );
        let empty = Calendar::from_spacing(Period(day(2024, Jan, 5), day(2024, Jan, 1)), Duration::Day, 1, &[]);
        assert!(empty.items().is_empty());
    }

    #[test]
    fn weeks_are_contiguous() {
        let period = Period(day(2024, Feb, 7), day(2024, Mar, 20));
        let cal = Calendar::from_spacing(period, Duration::Week, 1, &[]);
        let items = cal.items();
        assert_eq!(items[0].period().0, period.0);
        assert_eq!(items.last().unwrap().period().1, period.1);
        for pair in items.windows(2) {
            assert_eq!(pair[0].period().1.next(), pair[1].period().0);
        }
        assert_eq!(items.iter().map(|s| s.period().days()).sum::<usize>(), period.days());
    }

    #[test]
    fn registration() {
        let vehicles = vec![
            vehicle("a", "Civic", FuelKind::Petrol, None),
            vehicle("d", "Creta", FuelKind::Diesel, None),
        ];
        let entries = vec![
            odo(1, "a", day(2024, Jan, 20), 100.0),
            odo(2, "a", day(2024, Feb, 3), 180.0),
            odo(3, "d", day(2024, Feb, 4), 10.0),
            odo(4, "d", day(2024, Feb, 10), 40.0),
            odo(5, "x", day(2024, Feb, 11), 1.0),
            odo(6, "x", day(2024, Feb, 12), 6.0),
        ];
        let fillups = vec![
            fill(7, "a", day(2024, Jan, 20), 100.0, 5.0, 10.0),
            fill(8, "a", day(2024, Feb, 3), 180.0, 8.0, 16.0),
            fill(9, "d", day(2024, Feb, 10), 40.0, 10.0, 20.0),
        ];
        let period = Period(day(2024, Jan, 1), day(2024, Feb, 29));
        let mut cal = Calendar::from_spacing(period, Duration::Month, 1, &vehicles);
        cal.register(&entries, &fillups, &vehicles);
        assert_eq!(cal.labels(), &["Civic", "Creta", FALLBACK_VEHICLE]);
        assert!(cal.has_unknown());
        let jan = &cal.items()[0];
        let feb = &cal.items()[1];
        assert_eq!(jan.distances(), &[0.0, 0.0, 0.0]);
        assert_eq!(jan.fills(), 1);
        assert_eq!(jan.mileage(), None);
        assert_eq!(feb.distances(), &[80.0, 30.0, 5.0]);
        assert_eq!(feb.total_distance(), 115.0);
        assert_eq!(feb.fuel(), 18.0);
        assert_eq!(feb.cost(), 36.0);
        assert!((feb.co2() - (8.0 * 2.3 + 10.0 * 2.7)).abs() < 1e-9);
        assert_eq!(feb.mileage(), Some(10.0));
    }

    #[test]
    fn outside_is_ignored() {
        let mut cal = Calendar::from_spacing(Period::day(day(2024, Jan, 2)), Duration::Day, 1, &[]);
        cal.register(
            &[],
            &[
                fill(1, "a", day(2024, Jan, 1), 0.0, 5.0, 10.0),
                fill(2, "a", day(2024, Jan, 3), 0.0, 5.0, 10.0),
            ],
            &[],
        );
        assert_eq!(cal.items()[0].fills(), 0);
        assert_eq!(cal.items()[0].fuel(), 0.0);
        assert!(!cal.has_unknown());
    }
}
