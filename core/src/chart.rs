//! Grouped two-series bar charts.
//!
//! [`ChartGeometry::compute`] turns labels and values into rectangles and text
//! positions on a logical canvas whose origin is the top-left corner with `y`
//! growing downwards. [`render_bar_chart`] replays that geometry onto any
//! [`DrawSurface`], so the mapping can be checked without a terminal.

use crate::config::ChartConfig;
use crate::service::dto::{DatePerformance, RobotSummary};

/// Bars shorter than this get no value label inside them.
pub const VALUE_LABEL_MIN_HEIGHT: f64 = 20.0;
/// Equal intervals on the Y scale; ticks are drawn at both ends.
pub const Y_DIVISIONS: u32 = 5;

const BAR_SPACING_RATIO: f64 = 0.2;
const CATEGORY_LABEL_OFFSET: f64 = 20.0;
const VALUE_LABEL_OFFSET: f64 = 15.0;
const AXIS_LABEL_GAP: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    First,
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    Category,
    Value,
    Axis,
    Legend,
    Placeholder,
}

/// The drawing capability a chart needs. Implemented by the terminal canvas
/// in the CLI and by a recorder in tests.
pub trait DrawSurface {
    fn line(&mut self, from: Point, to: Point);
    fn fill_rect(&mut self, rect: Rect, series: Series);
    fn text(&mut self, at: Point, text: &str, anchor: TextAnchor, role: TextRole);
}

/// Labels plus two series of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub first: Vec<u64>,
    pub second: Vec<u64>,
}

impl ChartData {
    pub fn from_dates(series: &[DatePerformance]) -> Self {
        Self {
            labels: series.iter().map(|p| p.date.clone()).collect(),
            first: series.iter().map(|p| p.successes).collect(),
            second: series.iter().map(|p| p.failures).collect(),
        }
    }

    pub fn from_robot_totals(totals: &[RobotSummary]) -> Self {
        Self {
            labels: totals.iter().map(|t| t.name.clone()).collect(),
            first: totals.iter().map(|t| t.successes).collect(),
            second: totals.iter().map(|t| t.failures).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartArea {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl ChartArea {
    pub fn plot_width(&self) -> f64 {
        self.width - 2.0 * self.padding
    }

    pub fn plot_height(&self) -> f64 {
        self.height - 2.0 * self.padding
    }

    /// Y coordinate of the X axis.
    pub fn baseline(&self) -> f64 {
        self.padding + self.plot_height()
    }
}

impl From<&ChartConfig> for ChartArea {
    fn from(config: &ChartConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            padding: config.padding,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub rect: Rect,
    pub value: u64,
    /// Where the value is printed, when the bar is tall enough.
    pub value_label: Option<Point>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarGroup {
    pub label: String,
    pub label_at: Point,
    pub first: Bar,
    pub second: Bar,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisTick {
    pub value: u64,
    pub at: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartGeometry {
    pub area: ChartArea,
    /// Largest value across both series, at least 1.
    pub max_value: u64,
    pub groups: Vec<BarGroup>,
    pub y_ticks: Vec<AxisTick>,
}

impl ChartGeometry {
    pub fn compute(area: ChartArea, data: &ChartData) -> Self {
        let max_value = data
            .first
            .iter()
            .chain(data.second.iter())
            .copied()
            .max()
            .unwrap_or(0)
            .max(1);

        let plot_height = area.plot_height();
        let baseline = area.baseline();
        let slot = area.plot_width() / (data.labels.len() * 2 + 1) as f64;
        let bar_width = slot - slot * BAR_SPACING_RATIO;

        let bar = |x: f64, value: u64| {
            let height = value as f64 / max_value as f64 * plot_height;
            let top = baseline - height;
            Bar {
                rect: Rect {
                    x,
                    y: top,
                    width: bar_width,
                    height,
                },
                value,
                value_label: (height > VALUE_LABEL_MIN_HEIGHT)
                    .then(|| Point::new(x + bar_width / 2.0, top + VALUE_LABEL_OFFSET)),
            }
        };

        let groups = data
            .labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let x = area.padding + (i * 2 + 1) as f64 * slot;
                BarGroup {
                    label: label.clone(),
                    label_at: Point::new(x + slot, baseline + CATEGORY_LABEL_OFFSET),
                    first: bar(x, data.first.get(i).copied().unwrap_or(0)),
                    second: bar(x + slot, data.second.get(i).copied().unwrap_or(0)),
                }
            })
            .collect();

        let y_ticks = (0..=Y_DIVISIONS)
            .map(|i| AxisTick {
                value: (max_value as f64 / f64::from(Y_DIVISIONS) * f64::from(i)).round() as u64,
                at: Point::new(
                    area.padding - AXIS_LABEL_GAP,
                    baseline - f64::from(i) * plot_height / f64::from(Y_DIVISIONS),
                ),
            })
            .collect();

        Self {
            area,
            max_value,
            groups,
            y_ticks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

pub struct Legend<'a> {
    pub first: &'a str,
    pub second: &'a str,
    /// Shown instead of the chart when there is nothing to plot.
    pub placeholder: &'a str,
}

pub fn render_bar_chart<D: DrawSurface>(surface: &mut D, geometry: &ChartGeometry, legend: &Legend<'_>) {
    let area = geometry.area;
    if geometry.is_empty() {
        surface.text(
            Point::new(area.width / 2.0, area.height / 2.0),
            legend.placeholder,
            TextAnchor::Middle,
            TextRole::Placeholder,
        );
        return;
    }

    let baseline = area.baseline();
    surface.line(Point::new(area.padding, area.padding), Point::new(area.padding, baseline));
    surface.line(
        Point::new(area.padding, baseline),
        Point::new(area.padding + area.plot_width(), baseline),
    );

    for group in &geometry.groups {
        for (bar, series) in [(&group.first, Series::First), (&group.second, Series::Second)] {
            surface.fill_rect(bar.rect, series);
            if let Some(at) = bar.value_label {
                surface.text(at, &bar.value.to_string(), TextAnchor::Middle, TextRole::Value);
            }
        }
        surface.text(group.label_at, &group.label, TextAnchor::Middle, TextRole::Category);
    }

    surface.fill_rect(
        Rect { x: area.padding, y: 20.0, width: 15.0, height: 15.0 },
        Series::First,
    );
    surface.text(
        Point::new(area.padding + 20.0, 32.0),
        legend.first,
        TextAnchor::Start,
        TextRole::Legend,
    );
    surface.fill_rect(
        Rect { x: area.padding + 80.0, y: 20.0, width: 15.0, height: 15.0 },
        Series::Second,
    );
    surface.text(
        Point::new(area.padding + 105.0, 32.0),
        legend.second,
        TextAnchor::Start,
        TextRole::Legend,
    );

    for tick in &geometry.y_ticks {
        surface.text(
            Point::new(tick.at.x, tick.at.y + 4.0),
            &tick.value.to_string(),
            TextAnchor::End,
            TextRole::Axis,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AREA: ChartArea = ChartArea {
        width: 600.0,
        height: 300.0,
        padding: 60.0,
    };

    fn data(labels: &[&str], first: &[u64], second: &[u64]) -> ChartData {
        ChartData {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            first: first.to_vec(),
            second: second.to_vec(),
        }
    }

    #[derive(Default)]
    struct Recorder {
        lines: usize,
        rects: Vec<(Rect, Series)>,
        texts: Vec<(String, TextRole)>,
    }

    impl DrawSurface for Recorder {
        fn line(&mut self, _from: Point, _to: Point) {
            self.lines += 1;
        }

        fn fill_rect(&mut self, rect: Rect, series: Series) {
            self.rects.push((rect, series));
        }

        fn text(&mut self, _at: Point, text: &str, _anchor: TextAnchor, role: TextRole) {
            self.texts.push((text.to_string(), role));
        }
    }

    const LEGEND: Legend<'static> = Legend {
        first: "Successes",
        second: "Failures",
        placeholder: "No data",
    };

    #[test]
    fn test_max_bar_fills_plot_height() {
        let geometry = ChartGeometry::compute(AREA, &data(&["a", "b"], &[10, 20], &[5, 40]));
        let plot_height = AREA.plot_height();

        assert_eq!(geometry.max_value, 40);
        let tallest = &geometry.groups[1].second;
        assert_eq!(tallest.rect.height, plot_height);
        assert_eq!(tallest.rect.y, AREA.padding);
        assert_eq!(geometry.groups[0].first.rect.height, plot_height / 4.0);
    }

    #[test]
    fn test_zero_value_has_zero_height_and_no_label() {
        let geometry = ChartGeometry::compute(AREA, &data(&["a"], &[0], &[3]));
        let bar = &geometry.groups[0].first;
        assert_eq!(bar.rect.height, 0.0);
        assert_eq!(bar.rect.y, AREA.baseline());
        assert!(bar.value_label.is_none());
        assert!(geometry.groups[0].second.value_label.is_some());
    }

    #[test]
    fn test_all_zero_series_uses_max_of_one() {
        let geometry = ChartGeometry::compute(AREA, &data(&["a"], &[0], &[0]));
        assert_eq!(geometry.max_value, 1);
        let ticks: Vec<u64> = geometry.y_ticks.iter().map(|t| t.value).collect();
        assert_eq!(ticks, vec![0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn test_short_bars_get_no_value_label() {
        // 180px plot; 20/180*max is the cut-off
        let geometry = ChartGeometry::compute(AREA, &data(&["a"], &[100], &[11]));
        assert!(geometry.groups[0].first.value_label.is_some());
        assert!(geometry.groups[0].second.value_label.is_none());
    }

    #[test]
    fn test_y_ticks_span_zero_to_max() {
        let geometry = ChartGeometry::compute(AREA, &data(&["a"], &[50], &[0]));
        let ticks: Vec<u64> = geometry.y_ticks.iter().map(|t| t.value).collect();
        assert_eq!(ticks, vec![0, 10, 20, 30, 40, 50]);
        assert_eq!(geometry.y_ticks[0].at.y, AREA.baseline());
        assert_eq!(geometry.y_ticks[5].at.y, AREA.padding);
    }

    #[test]
    fn test_groups_are_evenly_laid_out() {
        let geometry = ChartGeometry::compute(AREA, &data(&["a", "b"], &[1, 1], &[1, 1]));
        let slot = AREA.plot_width() / 5.0;
        assert_eq!(geometry.groups[0].first.rect.x, AREA.padding + slot);
        assert_eq!(geometry.groups[0].second.rect.x, AREA.padding + 2.0 * slot);
        assert_eq!(geometry.groups[1].first.rect.x, AREA.padding + 3.0 * slot);
        assert!((geometry.groups[0].first.rect.width - slot * 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_render_issues_bars_labels_and_scale() {
        let geometry = ChartGeometry::compute(AREA, &data(&["a", "b"], &[10, 20], &[5, 40]));
        let mut recorder = Recorder::default();
        render_bar_chart(&mut recorder, &geometry, &LEGEND);

        assert_eq!(recorder.lines, 2);
        // 4 bars + 2 legend swatches
        assert_eq!(recorder.rects.len(), 6);
        let count = |role| recorder.texts.iter().filter(|(_, r)| *r == role).count();
        assert_eq!(count(TextRole::Category), 2);
        assert_eq!(count(TextRole::Legend), 2);
        assert_eq!(count(TextRole::Axis), 6);
        assert!(recorder.texts.contains(&("40".to_string(), TextRole::Value)));
    }

    #[test]
    fn test_render_empty_shows_placeholder_only() {
        let geometry = ChartGeometry::compute(AREA, &ChartData::default());
        let mut recorder = Recorder::default();
        render_bar_chart(&mut recorder, &geometry, &LEGEND);

        assert_eq!(recorder.lines, 0);
        assert!(recorder.rects.is_empty());
        assert_eq!(recorder.texts, vec![("No data".to_string(), TextRole::Placeholder)]);
    }

    #[test]
    fn test_from_dates() {
        let series = vec![DatePerformance {
            date: "2024-01-01".into(),
            successes: 5,
            failures: 1,
        }];
        let data = ChartData::from_dates(&series);
        assert_eq!(data.labels, vec!["2024-01-01"]);
        assert_eq!((data.first[0], data.second[0]), (5, 1));
    }
}
