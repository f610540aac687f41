use crate::models::Entry;
use crate::pagination::Pagination;
use crate::units::WeightUnit;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Dates run along the horizontal axis.
    #[default]
    Vertical,
    /// Dates run down the vertical axis.
    Horizontal,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Vertical => "vertical",
            Orientation::Horizontal => "horizontal",
        }
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "vertical" => Ok(Orientation::Vertical),
            "horizontal" => Ok(Orientation::Horizontal),
            other => Err(format!("unknown orientation '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartTarget {
    Weight,
    Waist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewport {
    #[default]
    Regular,
    Compact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChartOrientations {
    pub weight: Orientation,
    pub waist: Orientation,
}

impl ChartOrientations {
    pub fn for_viewport(viewport: Viewport) -> Self {
        let default = match viewport {
            Viewport::Regular => Orientation::Vertical,
            Viewport::Compact => Orientation::Horizontal,
        };
        Self {
            weight: default,
            waist: default,
        }
    }

    pub fn get(&self, target: ChartTarget) -> Orientation {
        match target {
            ChartTarget::Weight => self.weight,
            ChartTarget::Waist => self.waist,
        }
    }

    pub fn set(&mut self, target: ChartTarget, orientation: Orientation) {
        match target {
            ChartTarget::Weight => self.weight = orientation,
            ChartTarget::Waist => self.waist = orientation,
        }
    }
}

/// Client-held snapshot of what the table and charts show. Renderers only
/// read it; it is replaced slice by slice as loads complete.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub entries: Vec<Entry>,
    pub chart_entries: Vec<Entry>,
    pub pagination: Pagination,
    pub weight_unit: WeightUnit,
    pub orientation: ChartOrientations,
}

impl ViewState {
    pub fn new(page_size: u64, viewport: Viewport) -> Self {
        Self {
            entries: Vec::new(),
            chart_entries: Vec::new(),
            pagination: Pagination::empty(page_size),
            weight_unit: WeightUnit::default(),
            orientation: ChartOrientations::for_viewport(viewport),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Table,
    Chart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    pub kind: RequestKind,
    pub seq: u64,
}

/// Hands out increasing tokens per load kind so that only the response to the
/// most recently issued request is applied.
#[derive(Debug, Clone, Default)]
pub struct RequestTokens {
    table: u64,
    chart: u64,
}

impl RequestTokens {
    pub fn issue(&mut self, kind: RequestKind) -> RequestToken {
        let counter = self.counter_mut(kind);
        *counter += 1;
        RequestToken { kind, seq: *counter }
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        let latest = match token.kind {
            RequestKind::Table => self.table,
            RequestKind::Chart => self.chart,
        };
        token.seq == latest
    }

    fn counter_mut(&mut self, kind: RequestKind) -> &mut u64 {
        match kind {
            RequestKind::Table => &mut self.table,
            RequestKind::Chart => &mut self.chart,
        }
    }
}
