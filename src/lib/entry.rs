//! Records of the logbook: vehicles, odometer readings, fuel fill-ups and trips

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::lib::date::Date;

/// Identifier of an odometer entry, a fill-up or a trip
///
/// All dated records share the same sequence, assigned in logbook order,
/// so ids never overlap and also encode the order of creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Id(pub usize);

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Anything that happened on a given day
pub trait Dated {
    fn date(&self) -> Date;
}

/// Anything that belongs to a single vehicle
pub trait Owned {
    fn vehicle(&self) -> &str;
}

/// A daily reading of the odometer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OdometerEntry {
    pub id: Id,
    pub vehicle: String,
    pub date: Date,
    pub reading: f64,
    pub notes: Option<String>,
}

/// A single refueling event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelFillUp {
    pub id: Id,
    pub vehicle: String,
    pub date: Date,
    /// odometer reading when the tank was filled
    pub odometer: f64,
    pub volume: f64,
    pub cost: f64,
    /// price as written on the receipt, if any
    pub price: Option<f64>,
    pub station: Option<String>,
    pub notes: Option<String>,
}

/// A journey between two odometer readings
///
/// Fuel and cost are optional, they are estimated when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trip {
    pub id: Id,
    pub vehicle: String,
    pub start: Date,
    pub end: Date,
    pub start_odometer: f64,
    pub end_odometer: f64,
    pub volume: Option<f64>,
    pub cost: Option<f64>,
    pub notes: Option<String>,
}

impl FuelFillUp {
    /// Price of one unit of fuel
    ///
    /// The price written in the logbook takes precedence, otherwise it is derived
    /// from the total cost. Absent for a zero volume.
    pub fn price_per_unit(&self) -> Option<f64> {
        self.price.or_else(|| {
            if self.volume > 0.0 {
                Some(self.cost / self.volume)
            } else {
                None
            }
        })
    }
}

/// What a vehicle runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FuelKind {
    Petrol,
    Diesel,
    Cng,
    Hybrid,
    Ev,
    Other,
}

/// Mass of CO2 emitted per unit of fuel for kinds without a dedicated factor
pub const DEFAULT_EMISSION_FACTOR: f64 = 2.3;

impl FuelKind {
    /// Mass of CO2 emitted by burning one unit of fuel
    pub fn emission_factor(self) -> f64 {
        match self {
            FuelKind::Petrol => 2.3,
            FuelKind::Diesel => 2.7,
            _ => DEFAULT_EMISSION_FACTOR,
        }
    }
}

impl FromStr for FuelKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        use FuelKind::*;
        Ok(match s {
            "Petrol" => Petrol,
            "Diesel" => Diesel,
            "Cng" => Cng,
            "Hybrid" => Hybrid,
            "Ev" => Ev,
            "Other" => Other,
            _ => return Err(()),
        })
    }
}

impl fmt::Display for FuelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Body type of a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VehicleKind {
    Car,
    Scooter,
    Bike,
    Truck,
    Van,
    Ev,
    Other,
}

impl FromStr for VehicleKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        use VehicleKind::*;
        Ok(match s {
            "Car" => Car,
            "Scooter" => Scooter,
            "Bike" => Bike,
            "Truck" => Truck,
            "Van" => Van,
            "Ev" => Ev,
            "Other" => Other,
            _ => return Err(()),
        })
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vehicle {
    pub id: String,
    pub kind: VehicleKind,
    pub make: String,
    pub model: String,
    /// trim level, e.g. "VX"
    pub variant: Option<String>,
    pub year: Option<u16>,
    pub fuel: FuelKind,
    /// expected distance per unit of fuel
    pub typical_mileage: Option<f64>,
}

/// Label shown for records that reference an undeclared vehicle
pub const FALLBACK_VEHICLE: &str = "Vehicle";

impl Vehicle {
    /// Short label used in history and plots
    pub fn display_name(&self) -> &str {
        &self.model
    }

    /// Full label used when vehicles are compared with each other
    pub fn full_name(&self) -> String {
        format!("{} {}", self.make, self.model)
    }

    /// Full label with the variant, as in the list of vehicles
    pub fn long_name(&self) -> String {
        match &self.variant {
            Some(variant) => format!("{} · {}", self.full_name(), variant),
            None => self.full_name(),
        }
    }
}

/// Display name of vehicle `id`, or a generic label if it is unknown
pub fn vehicle_name<'a>(vehicles: &'a [Vehicle], id: &str) -> &'a str {
    find_vehicle(vehicles, id)
        .map(|v| v.display_name())
        .unwrap_or(FALLBACK_VEHICLE)
}

pub fn find_vehicle<'a>(vehicles: &'a [Vehicle], id: &str) -> Option<&'a Vehicle> {
    vehicles.iter().find(|v| v.id == id)
}

impl Dated for OdometerEntry {
    fn date(&self) -> Date {
        self.date
    }
}

impl Dated for FuelFillUp {
    fn date(&self) -> Date {
        self.date
    }
}

impl Dated for Trip {
    fn date(&self) -> Date {
        self.start
    }
}

impl Owned for Trip {
    fn vehicle(&self) -> &str {
        &self.vehicle
    }
}

impl Owned for OdometerEntry {
    fn vehicle(&self) -> &str {
        &self.vehicle
    }
}

impl Owned for FuelFillUp {
    fn vehicle(&self) -> &str {
        &self.vehicle
    }
}

/// Keep only the records of vehicle `id`
pub fn of_vehicle<T>(items: &[T], id: &str) -> Vec<T>
where
    T: Owned + Clone,
{
    items.iter().filter(|it| it.vehicle() == id).cloned().collect()
}


#[cfg(test)]
mod test {
    use super::{fixtures::*, *};
    use crate::lib::date::Month::*;

    #[test]
    fn price_per_unit() {
        let mut f = fill(1, "a", day(2024, Jan, 1), 100.0, 10.0, 25.0);
        assert_eq!(f.price_per_unit(), Some(2.5));
        f.price = Some(2.4);
        assert_eq!(f.price_per_unit(), Some(2.4));
        let empty = fill(2, "a", day(2024, Jan, 1), 100.0, 0.0, 25.0);
        assert_eq!(empty.price_per_unit(), None);
    }

    #[test]
    fn emission_factors() {
        assert_eq!(FuelKind::Petrol.emission_factor(), 2.3);
        assert_eq!(FuelKind::Diesel.emission_factor(), 2.7);
        assert_eq!(FuelKind::Ev.emission_factor(), DEFAULT_EMISSION_FACTOR);
        assert_eq!("Cng".parse::<FuelKind>(), Ok(FuelKind::Cng));
        assert!("Kerosene".parse::<FuelKind>().is_err());
    }

    #[test]
    fn fallback_name() {
        let vehicles = vec![vehicle("civic", "Civic", FuelKind::Petrol, None)];
        assert_eq!(vehicle_name(&vehicles, "civic"), "Civic");
        assert_eq!(vehicle_name(&vehicles, "polo"), FALLBACK_VEHICLE);
    }

    #[test]
    fn names() {
        let mut civic = vehicle("civic", "Civic", FuelKind::Petrol, None);
        civic.make = "Honda".to_string();
        assert_eq!(civic.full_name(), "Honda Civic");
        assert_eq!(civic.long_name(), "Honda Civic");
        civic.variant = Some("VX".to_string());
        assert_eq!(civic.long_name(), "Honda Civic · VX");
        assert_eq!("Scooter".parse::<VehicleKind>(), Ok(VehicleKind::Scooter));
        assert!("Tank".parse::<VehicleKind>().is_err());
    }
}
