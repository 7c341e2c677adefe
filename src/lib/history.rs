//! Odometer entries and fill-ups merged into a single timeline

use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

use crate::lib::{
    date::Date,
    entry::{vehicle_name, FuelFillUp, Id, OdometerEntry, Vehicle},
    metrics::{compute_distances, compute_fuel_mileage},
};

/// One line of the history, annotated with what was computed for it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryItem<'a> {
    pub vehicle_name: &'a str,
    pub kind: HistoryKind<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HistoryKind<'a> {
    Odometer {
        entry: &'a OdometerEntry,
        /// distance since the previous reading of the same vehicle
        distance: f64,
    },
    Fuel {
        fillup: &'a FuelFillUp,
        /// mileage of the cycle closed by this fill-up
        mileage: Option<f64>,
    },
}

impl HistoryItem<'_> {
    pub fn date(&self) -> Date {
        match self.kind {
            HistoryKind::Odometer { entry, .. } => entry.date,
            HistoryKind::Fuel { fillup, .. } => fillup.date,
        }
    }

    pub fn id(&self) -> Id {
        match self.kind {
            HistoryKind::Odometer { entry, .. } => entry.id,
            HistoryKind::Fuel { fillup, .. } => fillup.id,
        }
    }

    /// Odometer reading, either logged directly or at the time of the fill-up
    pub fn odometer(&self) -> f64 {
        match self.kind {
            HistoryKind::Odometer { entry, .. } => entry.reading,
            HistoryKind::Fuel { fillup, .. } => fillup.odometer,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            HistoryKind::Odometer { .. } => "odometer",
            HistoryKind::Fuel { .. } => "fuel",
        }
    }

    fn rank(&self) -> u8 {
        match self.kind {
            HistoryKind::Odometer { .. } => 0,
            HistoryKind::Fuel { .. } => 1,
        }
    }

    /// Order of the timeline: newest first, then odometer readings before
    /// fill-ups of the same day, then logbook order
    pub fn timeline_cmp(&self, other: &Self) -> Ordering {
        other
            .date()
            .cmp(&self.date())
            .then(self.rank().cmp(&other.rank()))
            .then(self.id().cmp(&other.id()))
    }
}

/// Which records a history view shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindFilter {
    All,
    Odometer,
    Fuel,
}

impl KindFilter {
    pub fn accepts(self, item: &HistoryItem) -> bool {
        match (self, item.kind) {
            (KindFilter::All, _) => true,
            (KindFilter::Odometer, HistoryKind::Odometer { .. }) => true,
            (KindFilter::Fuel, HistoryKind::Fuel { .. }) => true,
            _ => false,
        }
    }
}

impl FromStr for KindFilter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "all" => Ok(KindFilter::All),
            "odometer" => Ok(KindFilter::Odometer),
            "fuel" => Ok(KindFilter::Fuel),
            _ => Err(()),
        }
    }
}

/// Every entry and every fill-up as a single timeline, newest first
///
/// Records of unknown vehicles are labeled with a generic name.
pub fn unified_history<'a>(
    entries: &'a [OdometerEntry],
    fillups: &'a [FuelFillUp],
    vehicles: &'a [Vehicle],
) -> Vec<HistoryItem<'a>> {
    let mileage_by_fillup = compute_fuel_mileage(fillups)
        .into_iter()
        .map(|c| (c.fillup, c.mileage))
        .collect::<HashMap<_, _>>();
    let odometer = compute_distances(entries).into_iter().map(|d| HistoryItem {
        vehicle_name: vehicle_name(vehicles, &d.entry.vehicle),
        kind: HistoryKind::Odometer {
            entry: d.entry,
            distance: d.distance,
        },
    });
    let fuel = fillups.iter().map(|f| HistoryItem {
        vehicle_name: vehicle_name(vehicles, &f.vehicle),
        kind: HistoryKind::Fuel {
            fillup: f,
            mileage: mileage_by_fillup.get(&f.id).copied(),
        },
    });
    let mut history = odometer.chain(fuel).collect::<Vec<_>>();
    history.sort_by(HistoryItem::timeline_cmp);
    history
}

/// Restrict a timeline to a kind of record and choose its direction
pub fn view<'a>(history: Vec<HistoryItem<'a>>, kind: KindFilter, ascending: bool) -> Vec<HistoryItem<'a>> {
    let mut items = history
        .into_iter()
        .filter(|it| kind.accepts(it))
        .collect::<Vec<_>>();
    if ascending {
        items.reverse();
    }
    items
}
