use crate::chart::{ChartHandles, ChartSlot, EChartsBackend, SINGLE_CHART_ID, single_series};
use crate::errors::AppError;
use crate::form::{FormInput, SAVED_TEXT, StatusLine};
use crate::format::{format_chart_label, parse_date, today_string};
use crate::models::{AppData, ChartData, Entry, EntryList, EntryPayload, ListQuery, PageMeta};
use crate::pagination::{Pagination, total_pages};
use crate::state::AppState;
use crate::storage::persist_data;
use crate::table::render_table;
use crate::ui::{TrackerPage, render_chart_page, render_tracker_page};
use crate::units::{WeightUnit, round_tenth};
use crate::view_state::{Orientation, ViewState, Viewport};
use axum::{
    Form, Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::{error, info};

pub const INVALID_PAYLOAD_TEXT: &str = "please provide a complete and valid entry";
pub const INVALID_DATE_TEXT: &str = "date must be formatted as YYYY-MM-DD";
pub const INVALID_WEIGHT_TEXT: &str = "weight must be greater than 0";
pub const INVALID_WAIST_TEXT: &str = "waist must be greater than 0";
pub const PERSIST_FAILED_TEXT: &str = "failed to save entry, please try again later";

/// Query parameters of the tracker page.
#[derive(Debug, Deserialize, Default)]
pub struct PageQuery {
    pub page: Option<String>,
    pub unit: Option<String>,
    pub weight: Option<String>,
    pub waist: Option<String>,
    pub edit: Option<String>,
    pub saved: Option<String>,
    pub compact: Option<String>,
}

/// A browser form post: the entry fields plus the display preferences the page
/// was rendered with.
#[derive(Debug, Deserialize)]
pub struct EntrySubmission {
    #[serde(flatten)]
    pub input: FormInput,
    #[serde(flatten)]
    pub prefs: PageQuery,
}

pub async fn index(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Html<String> {
    let today = today_string();
    let mut form = FormInput::with_date(&today);
    let mut status = if query.saved.is_some() {
        StatusLine::success(SAVED_TEXT)
    } else {
        StatusLine::clear()
    };

    let view = {
        let data = state.data.lock().await;
        build_view(&data, &query, state.page_size)
    };

    if let Some(index) = query.edit.as_deref().and_then(|value| value.parse::<usize>().ok()) {
        if let Some(entry) = view.entries.get(index) {
            form.populate(entry);
            status = StatusLine::success(format!(
                "loaded entry for {}; edit and save to update it",
                entry.date
            ));
        }
    }

    Html(render_page(&view, &form, &status))
}

/// Form fallback for browsers: same validation as the JSON API, then back to
/// the tracker page.
pub async fn submit_form(
    State(state): State<AppState>,
    Form(submission): Form<EntrySubmission>,
) -> Response {
    let EntrySubmission { input, prefs } = submission;
    let result = match input.build_payload() {
        Ok(payload) => save(&state, &payload).await.map_err(|err| err.message),
        Err(err) => Err(err.to_string()),
    };

    match result {
        Ok(_) => Redirect::to(&saved_location(&prefs)).into_response(),
        Err(message) => {
            let view = {
                let data = state.data.lock().await;
                build_view(&data, &prefs, state.page_size)
            };
            let page = render_page(&view, &input, &StatusLine::error(message));
            (StatusCode::BAD_REQUEST, Html(page)).into_response()
        }
    }
}

pub async fn list_entries(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Json<EntryList> {
    let limit = parse_limit(query.limit.as_deref());
    let requested = parse_page(query.page.as_deref());
    let data = state.data.lock().await;
    Json(list_page(&data, requested, limit))
}

pub async fn save_entry(
    State(state): State<AppState>,
    payload: Result<Json<EntryPayload>, JsonRejection>,
) -> Result<Json<Entry>, AppError> {
    let Json(payload) = payload.map_err(|_| AppError::bad_request(INVALID_PAYLOAD_TEXT))?;
    let entry = save(&state, &payload).await?;
    Ok(Json(entry))
}

pub async fn chart_data(State(state): State<AppState>) -> Json<ChartData> {
    let data = state.data.lock().await;
    Json(weight_history(&data))
}

pub async fn chart_page(State(state): State<AppState>) -> Html<String> {
    let chart_data = {
        let data = state.data.lock().await;
        weight_history(&data)
    };
    let mut slot = ChartSlot::new(SINGLE_CHART_ID, EChartsBackend);
    let (series, options) = single_series(&chart_data);
    slot.mount(&series, &options);
    let chart_options = slot.instance().and_then(|chart| chart.options()).unwrap_or("{}");
    Html(render_chart_page(chart_options))
}

/// Checks the payload against the values that will actually be stored, so a
/// weight that rounds to zero or overflows is rejected rather than persisted.
pub fn validate_entry(payload: &EntryPayload) -> Result<NaiveDate, AppError> {
    let date = parse_date(&payload.date).ok_or_else(|| AppError::bad_request(INVALID_DATE_TEXT))?;
    if !storable(payload.weight_jin) {
        return Err(AppError::bad_request(INVALID_WEIGHT_TEXT));
    }
    if let Some(waist) = payload.waist_cm {
        if !storable(waist) {
            return Err(AppError::bad_request(INVALID_WAIST_TEXT));
        }
    }
    Ok(date)
}

fn storable(value: f64) -> bool {
    let rounded = round_tenth(value);
    rounded.is_finite() && rounded > 0.0
}

async fn save(state: &AppState, payload: &EntryPayload) -> Result<Entry, AppError> {
    let date = validate_entry(payload)?;
    let mut data = state.data.lock().await;
    let entry = data.upsert_entry(date, payload, Utc::now());

    if let Err(err) = persist_data(&state.data_path, &data).await {
        error!("failed to persist entries: {}", err.message);
        return Err(AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: PERSIST_FAILED_TEXT.to_string(),
        });
    }

    info!(date = %entry.date, id = entry.id, "entry saved");
    Ok(entry)
}

/// One page of entries, newest first. A `limit` of 0 lists everything and
/// omits the pagination meta.
pub fn list_page(data: &AppData, requested_page: u64, limit: u64) -> EntryList {
    if limit == 0 {
        return EntryList {
            entries: data.list_entries(0, 0),
            meta: None,
        };
    }

    let total = data.count_entries() as u64;
    let page = requested_page.clamp(1, total_pages(total, limit));
    let offset = (page - 1).saturating_mul(limit);
    EntryList {
        entries: data.list_entries(limit as usize, offset as usize),
        meta: Some(PageMeta {
            page,
            page_size: limit,
            total,
        }),
    }
}

/// Weight history in jin as a generic single-series chart.
pub fn weight_history(data: &AppData) -> ChartData {
    let (labels, values): (Vec<String>, Vec<f64>) = data
        .chronological()
        .map(|entry| (format_chart_label(&entry.date), entry.weight_jin))
        .unzip();
    ChartData {
        labels,
        values,
        series_name: Some(WeightUnit::Jin.series_name().to_string()),
        x_label: Some("Date".to_string()),
        y_label: Some("jin".to_string()),
    }
}

fn build_view(data: &AppData, query: &PageQuery, page_size: u64) -> ViewState {
    let viewport = if query.compact.is_some() {
        Viewport::Compact
    } else {
        Viewport::Regular
    };
    let mut view = ViewState::new(page_size, viewport);

    let requested = parse_page(query.page.as_deref());
    let list = list_page(data, requested, page_size);
    view.pagination = Pagination::resolve(list.meta, requested, list.entries.len(), page_size);
    view.entries = list.entries;
    view.chart_entries = data.chronological().cloned().collect();

    if let Some(unit) = query.unit.as_deref().and_then(|value| value.parse().ok()) {
        view.weight_unit = unit;
    }
    if let Some(orientation) = parse_orientation(query.weight.as_deref()) {
        view.orientation.weight = orientation;
    }
    if let Some(orientation) = parse_orientation(query.waist.as_deref()) {
        view.orientation.waist = orientation;
    }
    view
}

fn render_page(view: &ViewState, form: &FormInput, status: &StatusLine) -> String {
    let mut charts = ChartHandles::new(EChartsBackend);
    charts.render(&view.chart_entries, view.weight_unit, view.orientation);

    render_tracker_page(&TrackerPage {
        view,
        table: &render_table(view),
        form,
        status,
        weight_chart: charts.weight.instance().and_then(|chart| chart.options()),
        waist_chart: charts.waist.instance().and_then(|chart| chart.options()),
    })
}

/// Back to the first page after a save, keeping unit and chart orientations.
fn saved_location(prefs: &PageQuery) -> String {
    let mut location = String::from("/?saved=1");
    if let Some(unit) = prefs.unit.as_deref().and_then(|value| value.parse::<WeightUnit>().ok()) {
        location.push_str(&format!("&unit={unit}"));
    }
    for (key, value) in [("weight", &prefs.weight), ("waist", &prefs.waist)] {
        if let Some(orientation) = parse_orientation(value.as_deref()) {
            location.push_str(&format!("&{key}={}", orientation.as_str()));
        }
    }
    location
}

fn parse_orientation(value: Option<&str>) -> Option<Orientation> {
    value.and_then(|value| value.parse().ok())
}

/// Missing, invalid or negative limits mean "no limit".
pub fn parse_limit(value: Option<&str>) -> u64 {
    value
        .and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|limit| *limit > 0)
        .map(|limit| limit as u64)
        .unwrap_or(0)
}

pub fn parse_page(value: Option<&str>) -> u64 {
    value
        .and_then(|value| value.trim().parse::<i64>().ok())
        .map(|page| page.max(1) as u64)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_with(dates: &[&str]) -> AppData {
        let mut data = AppData::default();
        for date in dates {
            let payload = EntryPayload {
                date: date.to_string(),
                weight_jin: 120.0,
                waist_cm: None,
                note: String::new(),
            };
            data.upsert_entry(parse_date(date).unwrap(), &payload, Utc::now());
        }
        data
    }

    fn payload(date: &str, weight_jin: f64, waist_cm: Option<f64>) -> EntryPayload {
        EntryPayload {
            date: date.to_string(),
            weight_jin,
            waist_cm,
            note: String::new(),
        }
    }

    #[test]
    fn limit_and_page_parsing() {
        assert_eq!(parse_limit(None), 0);
        assert_eq!(parse_limit(Some("-3")), 0);
        assert_eq!(parse_limit(Some("abc")), 0);
        assert_eq!(parse_limit(Some("20")), 20);
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("0")), 1);
        assert_eq!(parse_page(Some("4")), 4);
    }

    #[test]
    fn list_page_clamps_and_reports_meta() {
        let data = data_with(&["2025-01-01", "2025-01-02", "2025-01-03"]);
        let list = list_page(&data, 9, 2);
        assert_eq!(list.meta, Some(PageMeta { page: 2, page_size: 2, total: 3 }));
        assert_eq!(list.entries.len(), 1);
        assert_eq!(list.entries[0].date, "2025-01-01");

        let all = list_page(&data, 1, 0);
        assert_eq!(all.meta, None);
        assert_eq!(all.entries.len(), 3);
    }

    #[test]
    fn list_page_on_empty_store() {
        let list = list_page(&AppData::default(), 3, 20);
        assert_eq!(list.meta, Some(PageMeta { page: 1, page_size: 20, total: 0 }));
        assert!(list.entries.is_empty());
    }

    #[test]
    fn validation_messages() {
        assert!(validate_entry(&payload("2025-05-01", 120.0, Some(80.0))).is_ok());
        assert_eq!(
            validate_entry(&payload("05/01/2025", 120.0, None)).unwrap_err().message,
            INVALID_DATE_TEXT
        );
        assert_eq!(
            validate_entry(&payload("2025-05-01", 0.0, None)).unwrap_err().message,
            INVALID_WEIGHT_TEXT
        );
        assert_eq!(
            validate_entry(&payload("2025-05-01", 120.0, Some(-1.0))).unwrap_err().message,
            INVALID_WAIST_TEXT
        );
    }

    #[test]
    fn weights_that_do_not_survive_rounding_are_rejected() {
        for weight in [1e308, f64::MAX, 0.04] {
            assert_eq!(
                validate_entry(&payload("2025-05-01", weight, None)).unwrap_err().message,
                INVALID_WEIGHT_TEXT
            );
        }
        assert_eq!(
            validate_entry(&payload("2025-05-01", 120.0, Some(0.04))).unwrap_err().message,
            INVALID_WAIST_TEXT
        );
        assert!(validate_entry(&payload("2025-05-01", 0.06, None)).is_ok());
    }

    #[test]
    fn saved_location_keeps_valid_preferences() {
        let prefs = PageQuery {
            page: Some("3".into()),
            unit: Some("kg".into()),
            weight: Some("horizontal".into()),
            waist: Some("sideways".into()),
            ..PageQuery::default()
        };
        assert_eq!(saved_location(&prefs), "/?saved=1&unit=kg&weight=horizontal");
        assert_eq!(saved_location(&PageQuery::default()), "/?saved=1");
    }

    #[test]
    fn rejected_form_keeps_display_preferences() {
        let data = data_with(&["2025-01-01", "2025-01-02", "2025-01-03"]);
        let prefs = PageQuery {
            page: Some("2".into()),
            unit: Some("kg".into()),
            waist: Some("horizontal".into()),
            ..PageQuery::default()
        };
        let view = build_view(&data, &prefs, 2);
        assert_eq!(view.pagination.page, 2);
        assert_eq!(view.weight_unit, WeightUnit::Kg);
        assert_eq!(view.orientation.waist, Orientation::Horizontal);
        assert_eq!(view.orientation.weight, Orientation::Vertical);
    }

    #[test]
    fn weight_history_is_chronological() {
        let data = data_with(&["2025-03-02", "2025-01-10", "2025-02-15"]);
        let chart = weight_history(&data);
        assert_eq!(chart.labels, ["1/10", "2/15", "3/2"]);
        assert_eq!(chart.values.len(), 3);
        assert_eq!(chart.y_label.as_deref(), Some("jin"));
    }
}
