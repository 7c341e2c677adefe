//! Linear extrapolations of the current driving habits

use serde::Serialize;

use crate::lib::{
    date::Date,
    entry::{Dated, FuelFillUp, OdometerEntry, Vehicle, DEFAULT_EMISSION_FACTOR},
    metrics::DashboardMetrics,
    period::Period,
};

/// Length of the month used by monthly forecasts
pub const MONTH_DAYS: f64 = 30.0;

/// How far a given volume of fuel is expected to go
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Range {
    pub distance: f64,
    pub days: u32,
}

#[cfg(test)]
impl Range {
    pub const NONE: Range = Range { distance: 0.0, days: 0 };
}

// 0 instead of NaN or infinities
fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// Distance that `fuel_volume` allows at `avg_mileage`, and how many days
/// that is at `avg_daily_distance`
///
/// The distance is rounded to one decimal and the number of days to the nearest integer.
pub fn projected_range(avg_mileage: f64, fuel_volume: f64, avg_daily_distance: f64) -> Range {
    let distance = finite_or_zero(fuel_volume * avg_mileage);
    let days = if avg_daily_distance > 0.0 {
        finite_or_zero(distance / avg_daily_distance)
    } else {
        0.0
    };
    Range {
        distance: (distance * 10.0).round() / 10.0,
        days: days.round().max(0.0) as u32,
    }
}

/// Average of the expected mileages of the vehicles that declare one
pub fn typical_mileage(vehicles: &[Vehicle]) -> Option<f64> {
    let known = vehicles
        .iter()
        .filter_map(|v| v.typical_mileage)
        .collect::<Vec<_>>();
    if known.is_empty() {
        None
    } else {
        Some(known.iter().sum::<f64>() / known.len() as f64)
    }
}

/// Observed mileage if there is one, the expected one otherwise
pub fn effective_mileage(metrics: &DashboardMetrics, vehicles: &[Vehicle]) -> f64 {
    if metrics.avg_mileage > 0.0 {
        metrics.avg_mileage
    } else {
        typical_mileage(vehicles).unwrap_or(0.0)
    }
}

/// Number of days the averages are computed over
///
/// This is the span of the records themselves when there are any, so that
/// a long selected period with recent data does not dilute the averages.
pub fn days_in_range(entries: &[OdometerEntry], fillups: &[FuelFillUp], active: Period) -> usize {
    let dates = entries
        .iter()
        .map(Dated::date)
        .chain(fillups.iter().map(Dated::date));
    Period::spanning(dates).unwrap_or(active).days().max(1)
}

/// Everything the dashboard extrapolates from the selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub days: usize,
    pub avg_daily_distance: f64,
    pub avg_daily_cost: f64,
    pub avg_fuel_price: f64,
    pub effective_mileage: f64,
    pub monthly_fuel: f64,
    pub monthly_cost: f64,
    pub monthly_co2: f64,
    /// range of the fuel bought at the latest fill-up
    pub from_last_fill: Range,
    /// range of a typical fill-up made today
    pub if_refuel_today: Range,
}

/// Latest fill-up, the first one in logbook order if several share its day
pub fn last_fill(fillups: &[FuelFillUp]) -> Option<&FuelFillUp> {
    fillups.iter().fold(None, |best: Option<&FuelFillUp>, f| match best {
        Some(b) if b.date >= f.date => Some(b),
        _ => Some(f),
    })
}

/// Volume assumed for a fill-up made today: the actual one if it exists,
/// else the average fill-up, else the latest one
fn assumed_fill_volume(fillups: &[FuelFillUp], today: Date) -> f64 {
    if let Some(todays) = fillups.iter().find(|f| f.date == today) {
        return todays.volume;
    }
    let average = if fillups.is_empty() {
        0.0
    } else {
        fillups.iter().map(|f| f.volume).sum::<f64>() / fillups.len() as f64
    };
    if average > 0.0 {
        average
    } else {
        last_fill(fillups).map(|f| f.volume).unwrap_or(0.0)
    }
}

/// Extrapolate the selection to monthly consumption and remaining range
///
/// `vehicles` are the candidates for the expected mileage: all vehicles,
/// or only the selected one.
pub fn forecast(
    metrics: &DashboardMetrics,
    entries: &[OdometerEntry],
    fillups: &[FuelFillUp],
    vehicles: &[Vehicle],
    active: Period,
    today: Date,
) -> Forecast {
    let days = days_in_range(entries, fillups, active);
    let avg_daily_distance = metrics.total_distance / days as f64;
    let avg_daily_cost = metrics.total_cost / days as f64;
    let avg_fuel_price = if metrics.total_fuel > 0.0 {
        metrics.total_cost / metrics.total_fuel
    } else {
        0.0
    };
    let mileage = effective_mileage(metrics, vehicles);
    let monthly_fuel = if mileage > 0.0 {
        avg_daily_distance * MONTH_DAYS / mileage
    } else {
        0.0
    };
    let monthly_cost = if avg_fuel_price > 0.0 {
        monthly_fuel * avg_fuel_price
    } else {
        avg_daily_cost * MONTH_DAYS
    };
    let co2_per_unit = if metrics.total_fuel > 0.0 {
        metrics.total_co2 / metrics.total_fuel
    } else {
        DEFAULT_EMISSION_FACTOR
    };
    let last_volume = last_fill(fillups).map(|f| f.volume).unwrap_or(0.0);
    Forecast {
        days,
        avg_daily_distance,
        avg_daily_cost,
        avg_fuel_price,
        effective_mileage: mileage,
        monthly_fuel,
        monthly_cost,
        monthly_co2: monthly_fuel * co2_per_unit,
        from_last_fill: projected_range(mileage, last_volume, avg_daily_distance),
        if_refuel_today: projected_range(mileage, assumed_fill_volume(fillups, today), avg_daily_distance),
    }
}
