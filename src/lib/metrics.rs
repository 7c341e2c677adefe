//! Aggregation of the logbook into distances, mileage cycles and totals
//!
//! Every function here is a pure computation over the records it is given:
//! callers filter by period and vehicle beforehand and recompute from scratch
//! whenever the selection changes.
//!
//! Numeric edge cases never produce errors. Odometers that run backwards
//! contribute a distance of zero, divisions by zero yield `0` or `None`.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::lib::{
    date::{Date, Month},
    entry::{find_vehicle, FuelFillUp, Id, OdometerEntry, Vehicle, DEFAULT_EMISSION_FACTOR},
};

/// An odometer entry with the distance travelled since the previous
/// reading of the same vehicle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distance<'a> {
    pub entry: &'a OdometerEntry,
    pub distance: f64,
}

/// Distance travelled between two consecutive fill-ups of a vehicle,
/// and the fuel that was needed to refill it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MileageCycle {
    /// fill-up that closes the cycle
    pub fillup: Id,
    pub vehicle: String,
    pub date: Date,
    pub distance: f64,
    pub fuel: f64,
    pub mileage: f64,
}

/// A calendar month, used to group records
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth(pub u16, pub Month);

impl YearMonth {
    pub fn of(date: Date) -> Self {
        Self(date.year(), date.month())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.0, self.1)
    }
}

impl Serialize for YearMonth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(&format_args!("{:04}-{:02}", self.0, self.1.number()))
    }
}

/// Totals over a selection of the logbook
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub total_distance: f64,
    pub total_fuel: f64,
    pub total_cost: f64,
    pub avg_mileage: f64,
    pub total_co2: f64,
    pub best_mileage_month: Option<YearMonth>,
    pub most_travelled_month: Option<YearMonth>,
}

/// Indices of `items` grouped by vehicle, each group sorted by date
///
/// Sorting is stable: records of the same day keep their logbook order.
fn chronological_groups<'a, T, K, D>(items: &'a [T], key: K, date: D) -> BTreeMap<&'a str, Vec<usize>>
where
    K: Fn(&'a T) -> &'a str,
    D: Fn(&T) -> Date,
{
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (idx, item) in items.iter().enumerate() {
        groups.entry(key(item)).or_default().push(idx);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|&idx| date(&items[idx]));
    }
    groups
}

/// Distance since the previous reading of the same vehicle, for every entry
///
/// The first reading of each vehicle has a distance of `0`, and a reading
/// lower than the previous one counts as `0` rather than a negative distance.
/// The result is sorted by date across all vehicles.
pub fn compute_distances(entries: &[OdometerEntry]) -> Vec<Distance<'_>> {
    let mut distances = vec![0.0; entries.len()];
    for group in chronological_groups(entries, |e| e.vehicle.as_str(), |e| e.date).values() {
        for pair in group.windows(2) {
            let (prev, curr) = (&entries[pair[0]], &entries[pair[1]]);
            distances[pair[1]] = (curr.reading - prev.reading).max(0.0);
        }
    }
    let mut order = (0..entries.len()).collect::<Vec<_>>();
    order.sort_by_key(|&idx| entries[idx].date);
    order
        .into_iter()
        .map(|idx| Distance {
            entry: &entries[idx],
            distance: distances[idx],
        })
        .collect()
}

/// Mileage of every cycle between consecutive fill-ups of the same vehicle
///
/// A cycle is only emitted when the closing fill-up has a positive volume
/// and the odometer moved forward. The result is sorted by date.
pub fn compute_fuel_mileage(fillups: &[FuelFillUp]) -> Vec<MileageCycle> {
    let mut cycles = Vec::new();
    for group in chronological_groups(fillups, |f| f.vehicle.as_str(), |f| f.date).values() {
        for pair in group.windows(2) {
            let (prev, curr) = (&fillups[pair[0]], &fillups[pair[1]]);
            let distance = curr.odometer - prev.odometer;
            let fuel = curr.volume;
            if fuel > 0.0 && distance > 0.0 {
                cycles.push(MileageCycle {
                    fillup: curr.id,
                    vehicle: curr.vehicle.clone(),
                    date: curr.date,
                    distance,
                    fuel,
                    mileage: distance / fuel,
                });
            }
        }
    }
    cycles.sort_by_key(|c| c.date);
    cycles
}

/// Mean of the mileage of all cycles, `0` if there are none
pub fn average_mileage(cycles: &[MileageCycle]) -> f64 {
    if cycles.is_empty() {
        0.0
    } else {
        cycles.iter().map(|c| c.mileage).sum::<f64>() / cycles.len() as f64
    }
}

/// Sum over vehicles of the difference between the highest and the lowest reading
fn odometer_span<'a, I>(readings: I) -> f64
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut bounds: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for (vehicle, reading) in readings {
        let b = bounds.entry(vehicle).or_insert((reading, reading));
        b.0 = b.0.min(reading);
        b.1 = b.1.max(reading);
    }
    bounds.values().map(|(lo, hi)| hi - lo).sum()
}

fn entry_readings(entries: &[OdometerEntry]) -> impl Iterator<Item = (&str, f64)> {
    entries.iter().map(|e| (e.vehicle.as_str(), e.reading))
}

fn fillup_readings(fillups: &[FuelFillUp]) -> impl Iterator<Item = (&str, f64)> {
    fillups.iter().map(|f| (f.vehicle.as_str(), f.odometer))
}

/// Total distance travelled
///
/// Maximum of four estimates: the sum of distances between readings, and
/// the odometer span per vehicle computed from the entries, from the fill-ups,
/// and from both combined. Sparse logging in one source thus does not
/// under-report the distance.
pub fn total_distance(entries: &[OdometerEntry], fillups: &[FuelFillUp]) -> f64 {
    let from_deltas = compute_distances(entries).iter().map(|d| d.distance).sum::<f64>();
    let from_entries = odometer_span(entry_readings(entries));
    let from_fillups = odometer_span(fillup_readings(fillups));
    let combined = odometer_span(entry_readings(entries).chain(fillup_readings(fillups)));
    [from_deltas, from_entries, from_fillups, combined]
        .into_iter()
        .fold(0.0, f64::max)
}

/// Emission factor of the fuel burnt by `vehicle`
pub fn emission_factor(vehicles: &[Vehicle], vehicle: &str) -> f64 {
    find_vehicle(vehicles, vehicle)
        .map(|v| v.fuel.emission_factor())
        .unwrap_or(DEFAULT_EMISSION_FACTOR)
}

/// Mass of CO2 emitted by burning the fuel of all fill-ups
pub fn total_co2(fillups: &[FuelFillUp], vehicles: &[Vehicle]) -> f64 {
    fillups
        .iter()
        .map(|f| f.volume * emission_factor(vehicles, &f.vehicle))
        .sum()
}

/// Month with the best fuel-weighted mileage
///
/// Each fill-up contributes its volume to its month, and the distance since
/// the latest strictly earlier fill-up of the same vehicle (if any).
pub fn best_mileage_month(fillups: &[FuelFillUp]) -> Option<YearMonth> {
    let mut months: BTreeMap<YearMonth, (f64, f64)> = BTreeMap::new();
    for f in fillups {
        let acc = months.entry(YearMonth::of(f.date)).or_insert((0.0, 0.0));
        // latest earlier fill-up, the first one in logbook order among equals
        let prev = fillups
            .iter()
            .filter(|x| x.vehicle == f.vehicle && x.date < f.date)
            .fold(None, |best: Option<&FuelFillUp>, x| match best {
                Some(b) if b.date >= x.date => Some(b),
                _ => Some(x),
            });
        if let Some(prev) = prev {
            acc.0 += (f.odometer - prev.odometer).max(0.0);
        }
        acc.1 += f.volume;
    }
    best_of(
        months
            .into_iter()
            .filter(|(_, (_, fuel))| *fuel > 0.0)
            .map(|(month, (distance, fuel))| (month, distance / fuel)),
    )
}

/// Month with the highest distance travelled
pub fn most_travelled_month(entries: &[OdometerEntry]) -> Option<YearMonth> {
    let mut months: BTreeMap<YearMonth, f64> = BTreeMap::new();
    for d in compute_distances(entries) {
        *months.entry(YearMonth::of(d.entry.date)).or_insert(0.0) += d.distance;
    }
    best_of(months.into_iter())
}

// strictly positive maximum, the earliest month wins ties
fn best_of<I>(scores: I) -> Option<YearMonth>
where
    I: Iterator<Item = (YearMonth, f64)>,
{
    let mut best = None;
    let mut best_score = 0.0;
    for (month, score) in scores {
        if score > best_score {
            best_score = score;
            best = Some(month);
        }
    }
    best
}

/// All totals of the dashboard
pub fn aggregate(entries: &[OdometerEntry], fillups: &[FuelFillUp], vehicles: &[Vehicle]) -> DashboardMetrics {
    let cycles = compute_fuel_mileage(fillups);
    let metrics = DashboardMetrics {
        total_distance: total_distance(entries, fillups),
        total_fuel: fillups.iter().map(|f| f.volume).sum(),
        total_cost: fillups.iter().map(|f| f.cost).sum(),
        avg_mileage: average_mileage(&cycles),
        total_co2: total_co2(fillups, vehicles),
        best_mileage_month: best_mileage_month(fillups),
        most_travelled_month: most_travelled_month(entries),
    };
    log::debug!(
        "aggregated {} entries and {} fill-ups ({} cycles)",
        entries.len(),
        fillups.len(),
        cycles.len()
    );
    metrics
}

/// Sum of distances between readings, per vehicle
pub fn distance_by_vehicle(entries: &[OdometerEntry]) -> BTreeMap<&str, f64> {
    let mut totals = BTreeMap::new();
    for d in compute_distances(entries) {
        *totals.entry(d.entry.vehicle.as_str()).or_insert(0.0) += d.distance;
    }
    totals
}

/// Observed mileage of a vehicle next to the one it is expected to reach
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub vehicle: String,
    pub name: String,
    pub typical: Option<f64>,
    pub actual: f64,
}

pub fn compare_vehicles(fillups: &[FuelFillUp], vehicles: &[Vehicle]) -> Vec<Comparison> {
    vehicles
        .iter()
        .map(|v| {
            let own = fillups
                .iter()
                .filter(|f| f.vehicle == v.id)
                .cloned()
                .collect::<Vec<_>>();
            Comparison {
                vehicle: v.id.clone(),
                name: v.full_name(),
                typical: v.typical_mileage,
                actual: average_mileage(&compute_fuel_mileage(&own)),
            }
        })
        .collect()
}

/// Whether the odometer has not been logged yet today
pub fn reminder_needed(entries: &[OdometerEntry], today: Date) -> bool {
    match entries.iter().map(|e| e.date).max() {
        None => true,
        Some(latest) => latest.days_until(today) >= 1,
    }
}
