use svg::{
    node::element::{path::Data, Line, Path},
    Document,
};

use crate::lib::{date::Date, period::Period, summary::Summary};

/// Stacked areas of the distance driven by each vehicle since the start
/// of the calendar
pub struct Plotter<'d> {
    data: &'d [Summary],
    labels: &'d [String],
}

impl<'d> Plotter<'d> {
    pub fn from(data: &'d [Summary], labels: &'d [String]) -> Self {
        Self { data, labels }
    }

    /// `None` if there is nothing to draw
    pub fn cumulative_document(&self) -> Option<Document> {
        self.cumulative_plot()
            .to_range_group_drawer()
            .render(self.labels)
    }

    fn cumulative_plot(&self) -> Plot<Period, CumulativeEntry> {
        let mut plot = Plot::new();
        let mut running = Vec::new();
        for sum in self.data {
            running.resize(sum.distances().len(), 0.0);
            for (total, d) in running.iter_mut().zip(sum.distances()) {
                *total += d;
            }
            plot.push(sum.period(), CumulativeEntry::cumul(running.clone()));
        }
        plot
    }
}

#[derive(Debug)]
pub struct Plot<X, Y> {
    data: Vec<(X, Y)>,
}

impl<X, Y> Plot<X, Y> {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    fn push(&mut self, x: X, y: Y) {
        self.data.push((x, y));
    }
}

/// Boundaries of the stacked areas, starting from the baseline
#[derive(Debug)]
struct CumulativeEntry {
    points: Vec<f64>,
}

impl CumulativeEntry {
    fn cumul(values: Vec<f64>) -> Self {
        let mut points = Vec::with_capacity(values.len() + 1);
        points.push(0.0);
        for v in values {
            let prev = points[points.len() - 1];
            points.push(prev + v);
        }
        Self { points }
    }
}

pub trait Scalar {
    fn to_scalar(&self) -> f64;
}
pub trait ScalarRange {
    fn to_range(&self) -> (f64, f64);
}
pub trait ScalarGroup {
    fn to_group(&self) -> Vec<f64>;
}

impl Scalar for Date {
    fn to_scalar(&self) -> f64 {
        self.index() as f64
    }
}

impl ScalarRange for Period {
    /// A bucket spans from the start of its first day to the end of its last day
    fn to_range(&self) -> (f64, f64) {
        (self.0.to_scalar(), self.1.to_scalar() + 1.0)
    }
}

impl ScalarGroup for CumulativeEntry {
    fn to_group(&self) -> Vec<f64> {
        self.points.clone()
    }
}

impl<X, Y> Plot<X, Y>
where
    X: ScalarRange,
    Y: ScalarGroup,
{
    fn to_range_group_drawer(&self) -> RangeGroupDrawer {
        RangeGroupDrawer {
            points: self
                .data
                .iter()
                .map(|(x, y)| (x.to_range(), y.to_group()))
                .collect::<Vec<_>>(),
        }
    }
}

#[derive(Debug)]
struct RangeGroupDrawer {
    points: Vec<((f64, f64), Vec<f64>)>,
}

impl RangeGroupDrawer {
    fn render(&self, labels: &[String]) -> Option<Document> {
        let (first, _) = self.points.first()?;
        let group_size = self.points[0].1.len();
        if group_size < 2 {
            return None;
        }
        let (xmin, ymin, width, height) = {
            let mut xmin = f64::MAX;
            let mut ymin = 0.0_f64;
            let mut xmax = f64::MIN;
            let mut ymax = f64::MIN;
            for ((start, end), points) in &self.points {
                xmin = xmin.min(*start).min(*end);
                xmax = xmax.max(*start).max(*end);
                for pt in points {
                    ymin = ymin.min(*pt);
                    ymax = ymax.max(*pt);
                }
            }
            // flat plots still get a visible frame
            (xmin, ymin, (xmax - xmin).max(1.0), (ymax - ymin).max(1.0))
        };
        let fheight = 700.0;
        let fwidth = 1000.0;
        let stroke_width = 2.0;
        let margin = 20.0;
        let resize_x = |x: f64| (x - xmin) / width * fwidth;
        let resize_y = |y: f64| (height - (y - ymin)) / height * fheight;
        let mut groups = Vec::new();
        for i in 0..group_size - 1 {
            groups.push(Data::new().move_to((resize_x(first.0), resize_y(self.points[0].1[i]))));
        }
        // lower boundary left to right, then upper boundary right to left
        let groups = self.points.iter().fold(groups, |gr, ((start, end), points)| {
            gr.into_iter()
                .enumerate()
                .map(|(i, gr)| {
                    gr.line_to((resize_x(*start), resize_y(points[i])))
                        .line_to((resize_x(*end), resize_y(points[i])))
                })
                .collect::<Vec<_>>()
        });
        let groups = self.points.iter().rev().fold(groups, |gr, ((start, end), points)| {
            gr.into_iter()
                .enumerate()
                .map(|(i, gr)| {
                    gr.line_to((resize_x(*end), resize_y(points[i + 1])))
                        .line_to((resize_x(*start), resize_y(points[i + 1])))
                })
                .collect::<Vec<_>>()
        });
        let paths = groups.into_iter().enumerate().map(|(i, gr)| {
            Path::new()
                .set("fill", COLORS[i % COLORS.len()])
                .set("data-vehicle", labels.get(i).map(String::as_str).unwrap_or(""))
                .set("d", gr.close())
        });
        let yaxis = Line::new()
            .set("x1", 0.0)
            .set("x2", 0.0)
            .set("y1", 0.0)
            .set("y2", fheight)
            .set("stroke", "black")
            .set("stroke-width", stroke_width);
        let xaxis = Line::new()
            .set("x1", 0.0)
            .set("x2", fwidth)
            .set("y1", resize_y(0.0))
            .set("y2", resize_y(0.0))
            .set("stroke", "black")
            .set("stroke-width", stroke_width);
        let document = paths
            .fold(Document::new(), |doc, path| doc.add(path))
            .add(yaxis)
            .add(xaxis)
            .set(
                "viewBox",
                (-margin, -margin, fwidth + 2.0 * margin, fheight + 2.0 * margin),
            );
        Some(document)
    }
}

const COLORS: &[&str] = &["red", "green", "blue", "yellow", "orange", "purple", "cyan"];

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::{
        date::Month::*,
        entry::{fixtures::*, FuelKind},
        summary::{Calendar, Duration},
    };

    #[test]
    fn stacking() {
        let entry = CumulativeEntry::cumul(vec![1.0, 2.0, 3.0]);
        assert_eq!(entry.points, vec![0.0, 1.0, 3.0, 6.0]);
    }

    #[test]
    fn running_totals() {
        let vehicles = vec![
            vehicle("a", "Civic", FuelKind::Petrol, None),
            vehicle("b", "Creta", FuelKind::Diesel, None),
        ];
        let entries = vec![
            odo(1, "a", day(2024, Jan, 1), 0.0),
            odo(2, "a", day(2024, Jan, 2), 10.0),
            odo(3, "b", day(2024, Jan, 2), 0.0),
            odo(4, "b", day(2024, Jan, 3), 5.0),
        ];
        let mut cal = Calendar::from_spacing(Period(day(2024, Jan, 1), day(2024, Jan, 3)), Duration::Day, 1, &vehicles);
        cal.register(&entries, &[], &vehicles);
        let plotter = Plotter::from(cal.items(), cal.labels());
        let plot = plotter.cumulative_plot();
        let tops = plot.data.iter().map(|(_, y)| y.points.clone()).collect::<Vec<_>>();
        assert_eq!(
            tops,
            vec![
                vec![0.0, 0.0, 0.0, 0.0],
                vec![0.0, 10.0, 10.0, 10.0],
                vec![0.0, 10.0, 15.0, 15.0],
            ]
        );
        let svg = plotter.cumulative_document().unwrap().to_string();
        assert_eq!(svg.matches("<path").count(), 3);
        assert!(svg.contains("data-vehicle=\"Creta\""));
    }

    #[test]
    fn nothing_to_draw() {
        assert!(Plotter::from(&[], &[]).cumulative_document().is_none());
        // no data at all still draws flat areas
        let cal = Calendar::from_spacing(Period::day(day(2024, Jan, 1)), Duration::Day, 1, &[]);
        assert!(Plotter::from(cal.items(), cal.labels()).cumulative_document().is_some());
    }
}
