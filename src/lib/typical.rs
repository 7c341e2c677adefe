//! Expected mileage of well-known vehicles

use crate::lib::entry::Vehicle;

// make-model-year, km/L
const TYPICAL: &[(&str, f64)] = &[
    ("toyota-corolla-2022", 16.0),
    ("honda-civic-2021", 15.0),
    ("tesla-model-3-2024", 0.0),
    ("maruti-swift-2020", 19.0),
    ("hyundai-creta-2023", 17.0),
];

fn key(make: &str, model: &str, year: u16) -> String {
    format!("{} {} {}", make, model, year)
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Expected mileage of a vehicle according to the built-in table
pub fn lookup(make: &str, model: &str, year: u16) -> Option<f64> {
    let key = key(make, model, year);
    TYPICAL.iter().find(|(k, _)| *k == key).map(|(_, m)| *m)
}

/// Fill in the expected mileage of a vehicle that does not declare one
///
/// Returns whether the vehicle was modified.
pub fn complete(vehicle: &mut Vehicle) -> bool {
    if vehicle.typical_mileage.is_some() {
        return false;
    }
    let found = vehicle
        .year
        .and_then(|year| lookup(&vehicle.make, &vehicle.model, year));
    vehicle.typical_mileage = found;
    found.is_some()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::entry::{fixtures::vehicle, FuelKind};

    #[test]
    fn keys() {
        assert_eq!(lookup("Honda", "Civic", 2021), Some(15.0));
        assert_eq!(lookup("Tesla", "Model  3", 2024), Some(0.0));
        assert_eq!(lookup("Honda", "Civic", 2020), None);
        assert_eq!(lookup("Ford", "T", 1908), None);
    }

    #[test]
    fn completion() {
        let mut v = vehicle("swift", "Swift", FuelKind::Petrol, None);
        v.make = "Maruti".to_string();
        assert!(!complete(&mut v));
        v.year = Some(2020);
        assert!(complete(&mut v));
        assert_eq!(v.typical_mileage, Some(19.0));
        v.typical_mileage = Some(12.0);
        assert!(!complete(&mut v));
        assert_eq!(v.typical_mileage, Some(12.0));
    }
}
