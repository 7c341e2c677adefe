use std::fmt;

use crate::lib::{
    entry::{vehicle_name, Trip, Vehicle},
    history::{HistoryItem, HistoryKind},
    summary::Calendar,
    trip::{Quantity, TripEstimate},
    units::Preferences,
};

/// A box-drawn grid with a label column and a header line
pub struct Table {
    title: Option<String>,
    grid: GridFmt,
}

struct BoxFmt {
    width: usize,
    text: String,
}

struct ColFmt {
    width: usize,
    label: BoxFmt,
    boxes: Vec<BoxFmt>,
}

struct GridFmt {
    labels: ColFmt,
    columns: Vec<ColFmt>,
}

impl Table {
    pub fn with_columns<I, S>(corner: &str, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        let cols = columns
            .into_iter()
            .map(|c| ColFmt::with_label(BoxFmt::from(c.to_string())))
            .collect::<Vec<_>>();
        Self {
            title: None,
            grid: GridFmt::with_columns(BoxFmt::from(corner.to_string()), cols),
        }
    }

    pub fn with_title<S>(mut self, title: S) -> Self
    where
        S: ToString,
    {
        self.title = Some(title.to_string());
        self
    }

    /// Add a line, missing cells are left blank
    pub fn push_line(&mut self, label: String, cells: Vec<String>) {
        self.grid.push_line(
            BoxFmt::from(label),
            cells.into_iter().map(BoxFmt::from).collect(),
        );
    }

    /// Totals of each bucket of a calendar, one column per vehicle
    pub fn calendar(cal: &Calendar, prefs: &Preferences) -> Self {
        let shown = if cal.has_unknown() {
            cal.labels().len()
        } else {
            cal.labels().len() - 1
        };
        let dist = prefs.distance_unit;
        let columns = cal.labels()[..shown]
            .iter()
            .map(|l| format!("{} ({})", l, dist))
            .chain(vec![
                format!("Total ({})", dist),
                format!("Fuel ({})", prefs.fuel_unit),
                format!("Cost ({})", prefs.currency),
                format!("CO2 ({})", prefs.co2_unit),
                "Fills".to_string(),
                prefs.mileage_label(),
            ])
            .collect::<Vec<_>>();
        let mut table = Self::with_columns("", columns);
        for sum in cal.items() {
            let cells = sum.distances()[..shown]
                .iter()
                .map(|d| nonzero(prefs.distance(*d), 1))
                .chain(vec![
                    nonzero(prefs.distance(sum.total_distance()), 1),
                    nonzero(prefs.fuel(sum.fuel()), 2),
                    nonzero(sum.cost(), 2),
                    nonzero(prefs.co2(sum.co2()), 1),
                    if sum.fills() > 0 { sum.fills().to_string() } else { String::new() },
                    sum.mileage()
                        .map(|m| format!("{:.2}", prefs.mileage(m)))
                        .unwrap_or_default(),
                ])
                .collect();
            table.push_line(format!("{}", sum.period()), cells);
        }
        table
    }

    /// One line per record of the timeline
    pub fn history(items: &[HistoryItem], prefs: &Preferences) -> Self {
        let columns = vec![
            "Id".to_string(),
            "Type".to_string(),
            "Vehicle".to_string(),
            format!("Odometer ({})", prefs.distance_unit),
            format!("Distance ({})", prefs.distance_unit),
            format!("Fuel ({})", prefs.fuel_unit),
            format!("Cost ({})", prefs.currency),
            format!("Price (/{})", prefs.fuel_unit),
            prefs.mileage_label(),
            "Station".to_string(),
            "Notes".to_string(),
        ];
        let mut table = Self::with_columns("Date", columns);
        for item in items {
            let head = vec![
                item.id().to_string(),
                item.type_name().to_string(),
                item.vehicle_name.to_string(),
                format!("{:.1}", prefs.distance(item.odometer())),
            ];
            let tail = match item.kind {
                HistoryKind::Odometer { entry, distance } => vec![
                    format!("{:.1}", prefs.distance(distance)),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                    entry.notes.clone().unwrap_or_default(),
                ],
                HistoryKind::Fuel { fillup, mileage } => vec![
                    String::new(),
                    format!("{:.2}", prefs.fuel(fillup.volume)),
                    format!("{:.2}", fillup.cost),
                    fillup
                        .price_per_unit()
                        .map(|p| format!("{:.2}", prefs.price(p)))
                        .unwrap_or_default(),
                    mileage
                        .map(|m| format!("{:.2}", prefs.mileage(m)))
                        .unwrap_or_default(),
                    fillup.station.clone().unwrap_or_default(),
                    fillup.notes.clone().unwrap_or_default(),
                ],
            };
            table.push_line(item.date().to_string(), head.into_iter().chain(tail).collect());
        }
        table
    }

    /// Declared vehicles with their expected mileage
    pub fn vehicles(vehicles: &[Vehicle], prefs: &Preferences) -> Self {
        let mut table = Self::with_columns(
            "Id",
            vec![
                "Vehicle".to_string(),
                "Year".to_string(),
                "Type".to_string(),
                "Fuel".to_string(),
                format!("Expected ({})", prefs.mileage_label()),
            ],
        );
        for v in vehicles {
            table.push_line(
                v.id.clone(),
                vec![
                    v.long_name(),
                    v.year.map(|y| y.to_string()).unwrap_or_default(),
                    v.kind.to_string(),
                    v.fuel.to_string(),
                    v.typical_mileage
                        .map(|m| format!("{:.2}", prefs.mileage(m)))
                        .unwrap_or_default(),
                ],
            );
        }
        table
    }

    /// One line per trip, estimated quantities are marked with `~`
    pub fn trips(trips: &[(&Trip, TripEstimate)], vehicles: &[Vehicle], prefs: &Preferences) -> Self {
        let columns = vec![
            "Id".to_string(),
            "Vehicle".to_string(),
            "Until".to_string(),
            format!("Distance ({})", prefs.distance_unit),
            format!("Fuel ({})", prefs.fuel_unit),
            format!("CO2 ({})", prefs.co2_unit),
            format!("Cost ({})", prefs.currency),
            "Notes".to_string(),
        ];
        let mut table = Self::with_columns("Start", columns);
        for (trip, est) in trips {
            table.push_line(
                trip.start.to_string(),
                vec![
                    trip.id.to_string(),
                    vehicle_name(vehicles, &trip.vehicle).to_string(),
                    if trip.end == trip.start { String::new() } else { trip.end.to_string() },
                    format!("{:.1}", prefs.distance(est.distance)),
                    quantity(est.fuel.map(|q| q.map(|x| prefs.fuel(x)))),
                    est.co2.map(|c| format!("{:.2}", prefs.co2(c))).unwrap_or_default(),
                    quantity(est.cost),
                    trip.notes.clone().unwrap_or_default(),
                ],
            );
        }
        table
    }
}

fn quantity(q: Option<Quantity>) -> String {
    match q {
        Some(q) if q.is_estimated() => format!("~{:.2}", q.value()),
        Some(q) => format!("{:.2}", q.value()),
        None => String::new(),
    }
}

// blank for zero so that sparse tables stay readable
fn nonzero(x: f64, precision: usize) -> String {
    if x.abs() < 1e-9 {
        String::new()
    } else {
        format!("{:.*}", precision, x)
    }
}

impl BoxFmt {
    fn from(text: String) -> Self {
        let width = text.chars().count();
        Self { text, width }
    }

    fn empty() -> Self {
        Self::from(String::new())
    }
}

impl ColFmt {
    fn with_label(label: BoxFmt) -> Self {
        Self {
            width: label.width,
            label,
            boxes: Vec::new(),
        }
    }

    fn push(&mut self, b: BoxFmt) {
        self.width = self.width.max(b.width);
        self.boxes.push(b);
    }
}

impl GridFmt {
    fn with_columns(corner: BoxFmt, columns: Vec<ColFmt>) -> Self {
        Self {
            labels: ColFmt::with_label(corner),
            columns,
        }
    }

    fn push_line(&mut self, label: BoxFmt, boxes: Vec<BoxFmt>) {
        self.labels.push(label);
        let mut boxes = boxes.into_iter();
        for c in &mut self.columns {
            c.push(boxes.next().unwrap_or_else(BoxFmt::empty));
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(title) = &self.title {
            writeln!(f, " {}", title)?;
        }
        write!(f, "{}", self.grid)
    }
}

impl fmt::Display for GridFmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // upper border
        write!(f, "{}", ULCORNER)?;
        self.labels.hline(f)?;
        for c in &self.columns {
            write!(f, "{}", LOJOIN)?;
            c.hline(f)?;
        }
        writeln!(f, "{}", URCORNER)?;
        // title line
        write!(f, "{}", VLINE)?;
        self.labels.write_label(f)?;
        for c in &self.columns {
            write!(f, "{}", VLINE)?;
            c.write_label(f)?;
        }
        writeln!(f, "{}", VLINE)?;
        // separator
        write!(f, "{}", RTJOIN)?;
        self.labels.hline(f)?;
        for c in &self.columns {
            write!(f, "{}", CROSS)?;
            c.hline(f)?;
        }
        writeln!(f, "{}", LTJOIN)?;

        // main block
        for idx in 0..self.labels.len() {
            write!(f, "{}", VLINE)?;
            self.labels.write_item(f, idx, false)?;
            for c in &self.columns {
                write!(f, "{}", VLINE)?;
                c.write_item(f, idx, true)?;
            }
            writeln!(f, "{}", VLINE)?;
        }
        // lower border
        write!(f, "{}", DLCORNER)?;
        self.labels.hline(f)?;
        for c in &self.columns {
            write!(f, "{}", HIJOIN)?;
            c.hline(f)?;
        }
        writeln!(f, "{}", DRCORNER)?;
        Ok(())
    }
}

impl ColFmt {
    fn write_label(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.label.write(f, self.width, true)
    }

    fn write_item(&self, f: &mut fmt::Formatter, idx: usize, right: bool) -> fmt::Result {
        self.boxes[idx].write(f, self.width, right)
    }

    fn len(&self) -> usize {
        self.boxes.len()
    }

    fn hline(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", HLINE.repeat(self.width + 2))
    }
}

const HLINE: &str = "─";
const VLINE: &str = "│";
const ULCORNER: &str = "┌";
const URCORNER: &str = "┐";
const DLCORNER: &str = "└";
const DRCORNER: &str = "┘";
const LTJOIN: &str = "┤";
const RTJOIN: &str = "├";
const HIJOIN: &str = "┴";
const LOJOIN: &str = "┬";
const CROSS: &str = "┼";

impl BoxFmt {
    fn write(&self, f: &mut fmt::Formatter, width: usize, right: bool) -> fmt::Result {
        let padding = " ".repeat(width.saturating_sub(self.width));
        if right {
            write!(f, " {}{} ", padding, self.text)
        } else {
            write!(f, " {}{} ", self.text, padding)
        }
    }
}
