//! Comma-separated dump of the timeline
//!
//! Quantities are written in the units of the logbook, not in the display units.

use std::fmt::Write;

use crate::lib::history::{HistoryItem, HistoryKind};

pub const HEADER: &[&str] = &[
    "type",
    "date",
    "vehicle",
    "odometer",
    "distanceSinceLast",
    "fuelVolume",
    "totalCost",
    "fuelPricePerLitre",
    "stationName",
    "mileageForCycle",
];

/// Quote a field if it would otherwise break the line structure
fn escape(field: &str) -> String {
    if field.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn number(x: Option<f64>) -> String {
    x.map(|x| x.to_string()).unwrap_or_default()
}

fn record(item: &HistoryItem) -> Vec<String> {
    let mut fields = vec![
        item.type_name().to_string(),
        item.date().iso(),
        item.vehicle_name.to_string(),
        item.odometer().to_string(),
    ];
    match item.kind {
        HistoryKind::Odometer { distance, .. } => {
            fields.push(distance.to_string());
            fields.extend(std::iter::repeat(String::new()).take(5));
        }
        HistoryKind::Fuel { fillup, mileage } => {
            fields.push(String::new());
            fields.push(fillup.volume.to_string());
            fields.push(fillup.cost.to_string());
            fields.push(number(fillup.price_per_unit()));
            fields.push(fillup.station.clone().unwrap_or_default());
            fields.push(mileage.map(|m| format!("{:.2}", m)).unwrap_or_default());
        }
    }
    fields
}

/// The whole timeline as CSV, header included
pub fn to_csv(items: &[HistoryItem]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", HEADER.join(","));
    for item in items {
        let line = record(item)
            .iter()
            .map(|f| escape(f))
            .collect::<Vec<_>>()
            .join(",");
        let _ = writeln!(out, "{}", line);
    }
    out
}
