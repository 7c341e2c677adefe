//! Display units and the user preferences that select them
//!
//! All quantities are stored in km, L and kg. Conversions only happen
//! when something is shown to the user.

use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Km,
    Mi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelUnit {
    L,
    Gal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Co2Unit {
    Kg,
    Lb,
}

impl DistanceUnit {
    pub fn factor(self) -> f64 {
        match self {
            DistanceUnit::Km => 1.0,
            DistanceUnit::Mi => 0.621371,
        }
    }
}

impl FuelUnit {
    pub fn factor(self) -> f64 {
        match self {
            FuelUnit::L => 1.0,
            FuelUnit::Gal => 0.264172,
        }
    }
}

impl Co2Unit {
    pub fn factor(self) -> f64 {
        match self {
            Co2Unit::Kg => 1.0,
            Co2Unit::Lb => 2.20462,
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceUnit::Km => write!(f, "km"),
            DistanceUnit::Mi => write!(f, "mi"),
        }
    }
}

impl fmt::Display for FuelUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FuelUnit::L => write!(f, "L"),
            FuelUnit::Gal => write!(f, "gal"),
        }
    }
}

impl fmt::Display for Co2Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Co2Unit::Kg => write!(f, "kg"),
            Co2Unit::Lb => write!(f, "lb"),
        }
    }
}

/// How the user wants quantities to be shown
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Preferences {
    /// ISO code printed after amounts of money
    pub currency: String,
    pub distance_unit: DistanceUnit,
    pub fuel_unit: FuelUnit,
    pub co2_unit: Co2Unit,
    /// whether to remind the user to log today's odometer reading
    pub reminders: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            currency: "INR".to_string(),
            distance_unit: DistanceUnit::Km,
            fuel_unit: FuelUnit::L,
            co2_unit: Co2Unit::Kg,
            reminders: true,
        }
    }
}

impl Preferences {
    pub fn distance(&self, km: f64) -> f64 {
        km * self.distance_unit.factor()
    }

    pub fn fuel(&self, litres: f64) -> f64 {
        litres * self.fuel_unit.factor()
    }

    pub fn co2(&self, kg: f64) -> f64 {
        kg * self.co2_unit.factor()
    }

    /// Distance per unit of fuel, from km/L
    pub fn mileage(&self, km_per_litre: f64) -> f64 {
        km_per_litre * self.distance_unit.factor() / self.fuel_unit.factor()
    }

    /// Price per unit of fuel, from price per litre
    pub fn price(&self, per_litre: f64) -> f64 {
        per_litre / self.fuel_unit.factor()
    }

    pub fn mileage_label(&self) -> String {
        format!("{}/{}", self.distance_unit, self.fuel_unit)
    }

    pub fn money(&self, amount: f64) -> String {
        format!("{:.2} {}", amount, self.currency)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! close {
        ( $left:expr, $right:expr ) => {{
            let (l, r): (f64, f64) = ($left, $right);
            assert!((l - r).abs() < 1e-6, "{} is not close to {}", l, r);
        }};
    }

    #[test]
    fn metric_is_identity() {
        let prefs = Preferences::default();
        close!(prefs.distance(123.4), 123.4);
        close!(prefs.fuel(5.0), 5.0);
        close!(prefs.co2(23.0), 23.0);
        close!(prefs.mileage(15.0), 15.0);
        assert_eq!(prefs.mileage_label(), "km/L");
    }

    #[test]
    fn imperial() {
        let prefs = Preferences {
            distance_unit: DistanceUnit::Mi,
            fuel_unit: FuelUnit::Gal,
            co2_unit: Co2Unit::Lb,
            ..Preferences::default()
        };
        close!(prefs.distance(100.0), 62.1371);
        close!(prefs.fuel(10.0), 2.64172);
        close!(prefs.co2(10.0), 22.0462);
        close!(prefs.mileage(10.0), 62.1371 / 2.64172);
        close!(prefs.price(1.0), 1.0 / 0.264172);
        assert_eq!(prefs.mileage_label(), "mi/gal");
        assert_eq!(prefs.money(12.0), "12.00 INR");
    }
}
