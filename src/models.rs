use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One dated measurement record as stored and served by `/api/entries`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default)]
    pub id: u64,
    pub date: String,
    #[serde(default)]
    pub weight_kg: f64,
    #[serde(default)]
    pub weight_jin: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waist_cm: Option<f64>,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Body of `POST /api/entries`. Saving is an upsert keyed by `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPayload {
    pub date: String,
    pub weight_jin: f64,
    pub waist_cm: Option<f64>,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
}

/// Response of `GET /api/entries`. `meta` is omitted for unbounded listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EntryList {
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Response of `GET /api/chart/data`, a generic single-series line chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Everything the server persists: entries keyed by their date.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    #[serde(default)]
    pub next_id: u64,
    #[serde(default)]
    pub entries: BTreeMap<String, Entry>,
}
