//! Estimates for trips: how much fuel a journey burnt, what it emitted
//! and what it cost
//!
//! Quantities written in the logbook are used as they are, the others are
//! derived from the expected mileage of the vehicle and from the price paid
//! at its fill-ups.

use crate::lib::{
    entry::{find_vehicle, FuelFillUp, Trip, Vehicle},
    metrics::emission_factor,
};

/// A value either taken from the logbook or computed from other records
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Quantity {
    Logged(f64),
    Estimated(f64),
}

impl Quantity {
    pub fn value(self) -> f64 {
        match self {
            Quantity::Logged(x) | Quantity::Estimated(x) => x,
        }
    }

    pub fn is_estimated(self) -> bool {
        matches!(self, Quantity::Estimated(_))
    }

    /// Convert the value, keeping where it comes from
    pub fn map<F>(self, f: F) -> Self
    where
        F: FnOnce(f64) -> f64,
    {
        match self {
            Quantity::Logged(x) => Quantity::Logged(f(x)),
            Quantity::Estimated(x) => Quantity::Estimated(f(x)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripEstimate {
    pub distance: f64,
    pub fuel: Option<Quantity>,
    pub co2: Option<f64>,
    pub cost: Option<Quantity>,
}

/// Average price of one unit of fuel over the fill-ups of `vehicle`
pub fn average_price(fillups: &[FuelFillUp], vehicle: &str) -> Option<f64> {
    let (volume, cost) = fillups
        .iter()
        .filter(|f| f.vehicle == vehicle)
        .fold((0.0, 0.0), |(v, c), f| (v + f.volume, c + f.cost));
    if volume > 0.0 {
        Some(cost / volume)
    } else {
        None
    }
}

/// Estimate the consumption of a single trip
///
/// The fuel is the logged volume, or the distance over the expected mileage
/// of the vehicle. The cost is the logged one, or that fuel at `price`.
pub fn estimate(trip: &Trip, vehicles: &[Vehicle], price: Option<f64>) -> TripEstimate {
    let distance = (trip.end_odometer - trip.start_odometer).max(0.0);
    let typical = find_vehicle(vehicles, &trip.vehicle)
        .and_then(|v| v.typical_mileage)
        .filter(|m| *m > 0.0);
    let fuel = match (trip.volume, typical) {
        (Some(volume), _) => Some(Quantity::Logged(volume)),
        (None, Some(mileage)) => Some(Quantity::Estimated(distance / mileage)),
        (None, None) => None,
    };
    let co2 = fuel.map(|f| f.value() * emission_factor(vehicles, &trip.vehicle));
    let cost = match (trip.cost, fuel, price) {
        (Some(cost), _, _) => Some(Quantity::Logged(cost)),
        (None, Some(fuel), Some(price)) => Some(Quantity::Estimated(fuel.value() * price)),
        _ => None,
    };
    TripEstimate {
        distance,
        fuel,
        co2,
        cost,
    }
}

/// Trips with their estimates, most recent first
///
/// Prices are taken from the fill-ups of each trip's vehicle.
pub fn estimate_all<'t>(
    trips: &'t [Trip],
    fillups: &[FuelFillUp],
    vehicles: &[Vehicle],
) -> Vec<(&'t Trip, TripEstimate)> {
    let mut estimates = trips
        .iter()
        .map(|t| (t, estimate(t, vehicles, average_price(fillups, &t.vehicle))))
        .collect::<Vec<_>>();
    estimates.sort_by(|(a, _), (b, _)| b.start.cmp(&a.start).then(a.id.cmp(&b.id)));
    estimates
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::{
        date::Month::*,
        entry::{fixtures::*, FuelKind},
    };

    macro_rules! close {
        ( $left:expr, $right:expr ) => {{
            let (l, r): (f64, f64) = ($left, $right);
            assert!((l - r).abs() < 1e-9, "{} != {}", l, r);
        }};
    }

    #[test]
    fn logged_values_win() {
        let vehicles = vec![vehicle("d", "Creta", FuelKind::Diesel, Some(20.0))];
        let mut t = trip(1, "d", day(2024, Jan, 1), 1000.0, 1250.0);
        t.volume = Some(10.0);
        t.cost = Some(1000.0);
        let est = estimate(&t, &vehicles, Some(50.0));
        assert_eq!(est.distance, 250.0);
        assert_eq!(est.fuel, Some(Quantity::Logged(10.0)));
        close!(est.co2.unwrap(), 27.0);
        assert_eq!(est.cost, Some(Quantity::Logged(1000.0)));
    }

    #[test]
    fn estimated_from_mileage() {
        let vehicles = vec![vehicle("a", "Civic", FuelKind::Petrol, Some(15.0))];
        let t = trip(1, "a", day(2024, Jan, 1), 100.0, 400.0);
        let est = estimate(&t, &vehicles, Some(100.0));
        assert_eq!(est.distance, 300.0);
        assert_eq!(est.fuel, Some(Quantity::Estimated(20.0)));
        assert!(est.fuel.unwrap().is_estimated());
        close!(est.co2.unwrap(), 46.0);
        close!(est.cost.unwrap().value(), 2000.0);
        assert!(est.cost.unwrap().is_estimated());
    }

    #[test]
    fn nothing_to_estimate_from() {
        let t = trip(1, "ghost", day(2024, Jan, 1), 100.0, 150.0);
        let est = estimate(&t, &[], Some(100.0));
        assert_eq!(est.distance, 50.0);
        assert_eq!((est.fuel, est.co2, est.cost), (None, None, None));
        let vehicles = vec![vehicle("a", "Civic", FuelKind::Petrol, Some(15.0))];
        let t = trip(2, "a", day(2024, Jan, 1), 100.0, 250.0);
        let est = estimate(&t, &vehicles, None);
        assert_eq!(est.fuel, Some(Quantity::Estimated(10.0)));
        assert_eq!(est.cost, None);
        let backwards = trip(3, "a", day(2024, Jan, 1), 250.0, 100.0);
        assert_eq!(estimate(&backwards, &vehicles, None).distance, 0.0);
    }

    #[test]
    fn prices() {
        let fillups = vec![
            fill(1, "a", day(2024, Jan, 1), 0.0, 10.0, 1000.0),
            fill(2, "a", day(2024, Jan, 9), 0.0, 30.0, 3400.0),
            fill(3, "b", day(2024, Jan, 9), 0.0, 0.0, 0.0),
        ];
        close!(average_price(&fillups, "a").unwrap(), 110.0);
        assert_eq!(average_price(&fillups, "b"), None);
        assert_eq!(average_price(&fillups, "c"), None);
    }

    #[test]
    fn most_recent_first() {
        let vehicles = vec![vehicle("a", "Civic", FuelKind::Petrol, Some(10.0))];
        let fillups = vec![fill(9, "a", day(2024, Jan, 1), 0.0, 10.0, 1000.0)];
        let trips = vec![
            trip(1, "a", day(2024, Jan, 3), 0.0, 100.0),
            trip(2, "a", day(2024, Jan, 5), 100.0, 150.0),
            trip(3, "a", day(2024, Jan, 3), 150.0, 170.0),
        ];
        let all = estimate_all(&trips, &fillups, &vehicles);
        assert_eq!(all.iter().map(|(t, _)| t.id.0).collect::<Vec<_>>(), vec![2, 1, 3]);
        close!(all[0].1.cost.unwrap().value(), 500.0);
    }
}
