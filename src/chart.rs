use charming::{
    Chart,
    component::{Axis, Legend},
    element::{AxisType, ItemStyle, LineStyle, Tooltip, Trigger},
    series::Line,
};

use crate::format::format_chart_label;
use crate::models::{ChartData, Entry};
use crate::units::WeightUnit;
use crate::view_state::{ChartOrientations, Orientation};

pub const WEIGHT_CHART_ID: &str = "weight-chart";
pub const WAIST_CHART_ID: &str = "waist-chart";
pub const SINGLE_CHART_ID: &str = "line-chart";

const WEIGHT_COLOR: &str = "rgba(78, 115, 223, 1)";
const WAIST_COLOR: &str = "rgba(54, 185, 204, 1)";
const SINGLE_COLOR: &str = "rgba(75, 192, 192, 1)";

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Fraction digits for tooltips.
    pub digits: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub orientation: Orientation,
    pub color: &'static str,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub begin_at_zero: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartProjection {
    pub weight: ChartSeries,
    pub waist: ChartSeries,
}

/// Sorts entries by ISO date and builds the weight and waist series. The waist
/// series only contains entries that have a waist measurement, so its labels
/// can differ from the weight labels.
pub fn project_charts(entries: &[Entry], unit: WeightUnit) -> ChartProjection {
    let mut chronological: Vec<&Entry> = entries.iter().collect();
    chronological.sort_by(|a, b| a.date.cmp(&b.date));

    let weight = ChartSeries {
        name: unit.series_name().to_string(),
        labels: chronological
            .iter()
            .map(|entry| format_chart_label(&entry.date))
            .collect(),
        values: chronological
            .iter()
            .map(|entry| unit.select(entry.weight_jin, entry.weight_kg))
            .collect(),
        digits: unit.digits(),
    };

    let (labels, values): (Vec<String>, Vec<f64>) = chronological
        .iter()
        .filter_map(|entry| entry.waist_cm.map(|waist| (format_chart_label(&entry.date), waist)))
        .unzip();
    let waist = ChartSeries {
        name: "Waist (cm)".to_string(),
        labels,
        values,
        digits: 1,
    };

    ChartProjection { weight, waist }
}

pub fn weight_options(orientation: Orientation) -> ChartOptions {
    ChartOptions {
        orientation,
        color: WEIGHT_COLOR,
        x_label: None,
        y_label: None,
        begin_at_zero: false,
    }
}

pub fn waist_options(orientation: Orientation) -> ChartOptions {
    ChartOptions {
        orientation,
        color: WAIST_COLOR,
        x_label: None,
        y_label: None,
        begin_at_zero: false,
    }
}

/// Series and options for the standalone `/api/chart/data` line chart.
pub fn single_series(data: &ChartData) -> (ChartSeries, ChartOptions) {
    let len = data.labels.len().min(data.values.len());
    let series = ChartSeries {
        name: data.series_name.clone().unwrap_or_else(|| "data".to_string()),
        labels: data.labels[..len].to_vec(),
        values: data.values[..len].to_vec(),
        digits: 1,
    };
    let options = ChartOptions {
        orientation: Orientation::Vertical,
        color: SINGLE_COLOR,
        x_label: data.x_label.clone().filter(|label| !label.is_empty()),
        y_label: data.y_label.clone().filter(|label| !label.is_empty()),
        begin_at_zero: true,
    };
    (series, options)
}

/// Capability a charting library has to offer.
pub trait ChartRenderer {
    fn render(&mut self, series: &ChartSeries, options: &ChartOptions);
    fn dispose(&mut self);
}

/// Creates chart instances bound to a container id.
pub trait ChartBackend {
    type Renderer: ChartRenderer;

    fn create(&self, target_id: &str) -> Self::Renderer;
}

/// A chart container that owns at most one live chart instance.
pub struct ChartSlot<B: ChartBackend> {
    id: &'static str,
    backend: B,
    instance: Option<B::Renderer>,
}

impl<B: ChartBackend> ChartSlot<B> {
    pub fn new(id: &'static str, backend: B) -> Self {
        Self {
            id,
            backend,
            instance: None,
        }
    }

    /// Disposes the current instance, if any, and renders into a new one.
    pub fn mount(&mut self, series: &ChartSeries, options: &ChartOptions) {
        self.unmount();
        let mut chart = self.backend.create(self.id);
        chart.render(series, options);
        self.instance = Some(chart);
    }

    pub fn unmount(&mut self) {
        if let Some(mut previous) = self.instance.take() {
            previous.dispose();
        }
    }

    pub fn instance(&self) -> Option<&B::Renderer> {
        self.instance.as_ref()
    }
}

/// Registry of the tracker's two chart containers.
pub struct ChartHandles<B: ChartBackend> {
    pub weight: ChartSlot<B>,
    pub waist: ChartSlot<B>,
}

impl<B: ChartBackend + Clone> ChartHandles<B> {
    pub fn new(backend: B) -> Self {
        Self {
            weight: ChartSlot::new(WEIGHT_CHART_ID, backend.clone()),
            waist: ChartSlot::new(WAIST_CHART_ID, backend),
        }
    }
}

impl<B: ChartBackend> ChartHandles<B> {
    pub fn render(&mut self, entries: &[Entry], unit: WeightUnit, orientation: ChartOrientations) {
        let projection = project_charts(entries, unit);
        self.weight
            .mount(&projection.weight, &weight_options(orientation.weight));
        self.waist
            .mount(&projection.waist, &waist_options(orientation.waist));
    }
}

/// Renders charts as ECharts option objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct EChartsBackend;

impl ChartBackend for EChartsBackend {
    type Renderer = EChartsChart;

    fn create(&self, target_id: &str) -> EChartsChart {
        EChartsChart {
            target_id: target_id.to_string(),
            options: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EChartsChart {
    target_id: String,
    options: Option<String>,
}

impl EChartsChart {
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// The ECharts option object as JavaScript source, `None` once disposed.
    pub fn options(&self) -> Option<&str> {
        self.options.as_deref()
    }
}

impl ChartRenderer for EChartsChart {
    fn render(&mut self, series: &ChartSeries, options: &ChartOptions) {
        self.options = Some(build_echarts(series, options).to_string());
    }

    fn dispose(&mut self) {
        self.options = None;
    }
}

fn build_echarts(series: &ChartSeries, options: &ChartOptions) -> Chart {
    let mut category = Axis::new()
        .type_(AxisType::Category)
        .data(series.labels.clone());
    let mut value = Axis::new()
        .type_(AxisType::Value)
        .scale(!options.begin_at_zero);

    let (category_label, value_label) = match options.orientation {
        Orientation::Vertical => (&options.x_label, &options.y_label),
        Orientation::Horizontal => (&options.y_label, &options.x_label),
    };
    if let Some(label) = category_label {
        category = category.name(label.clone());
    }
    if let Some(label) = value_label {
        value = value.name(label.clone());
    }

    let chart = Chart::new()
        .legend(Legend::new())
        .tooltip(Tooltip::new().trigger(Trigger::Axis));

    let chart = match options.orientation {
        Orientation::Vertical => chart.x_axis(category).y_axis(value),
        Orientation::Horizontal => chart.x_axis(value).y_axis(category),
    };

    chart.series(
        Line::new()
            .name(series.name.clone())
            .smooth(0.35)
            .item_style(ItemStyle::new().color(options.color))
            .line_style(LineStyle::new().width(3))
            .data(series.values.clone()),
    )
}
