use tracing::{debug, error, info, warn};

use crate::chart::{ChartBackend, ChartHandles, ChartSlot, single_series};
use crate::client::{ClientError, EntryApi};
use crate::form::{FormInput, FormPhase, INVALID_INPUT_TEXT, SAVED_TEXT, SAVING_TEXT, StatusLine};
use crate::models::EntryList;
use crate::pagination::Pagination;
use crate::table::{TableView, render_table};
use crate::units::WeightUnit;
use crate::view_state::{
    ChartTarget, Orientation, RequestKind, RequestToken, RequestTokens, ViewState, Viewport,
};

pub const REFRESHING_TEXT: &str = "refreshing list...";
pub const REFRESHED_TEXT: &str = "list updated";
pub const LOAD_FAILED_TEXT: &str = "failed to load entries, please try again later";

/// How a table load reports itself on the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadFeedback {
    /// Clears the status line.
    Quiet,
    /// Shows progress and completion.
    Announce,
    /// Leaves the current status alone, only failures are reported.
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRequest {
    pub token: RequestToken,
    pub page: u64,
    pub page_size: u64,
    pub feedback: LoadFeedback,
}

pub struct TrackerController<C, B>
where
    C: EntryApi,
    B: ChartBackend,
{
    api: C,
    page_size: u64,
    state: ViewState,
    tokens: RequestTokens,
    table: TableView,
    charts: ChartHandles<B>,
    form: FormInput,
    phase: FormPhase,
    status: StatusLine,
}

impl<C, B> TrackerController<C, B>
where
    C: EntryApi,
    B: ChartBackend + Clone,
{
    pub fn new(api: C, backend: B, page_size: u64, viewport: Viewport, today: &str) -> Self {
        let page_size = page_size.max(1);
        Self {
            api,
            page_size,
            state: ViewState::new(page_size, viewport),
            tokens: RequestTokens::default(),
            table: TableView::default(),
            charts: ChartHandles::new(backend),
            form: FormInput::with_date(today),
            phase: FormPhase::Idle,
            status: StatusLine::clear(),
        }
    }
}

impl<C, B> TrackerController<C, B>
where
    C: EntryApi,
    B: ChartBackend,
{
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn table(&self) -> &TableView {
        &self.table
    }

    pub fn charts(&self) -> &ChartHandles<B> {
        &self.charts
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn submit_enabled(&self) -> bool {
        self.phase.submit_enabled()
    }

    pub fn form(&self) -> &FormInput {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormInput {
        &mut self.form
    }

    pub fn weight_preview(&self) -> String {
        self.form.weight_preview()
    }

    /// First load: page 1 of the table and the full chart history.
    pub async fn init(&mut self) {
        self.status = StatusLine::clear();
        self.render_charts();
        self.reload(1, LoadFeedback::Quiet).await;
    }

    /// User-triggered refresh of the current table page and the charts.
    pub async fn refresh(&mut self) {
        let page = self.state.pagination.page;
        self.reload(page, LoadFeedback::Announce).await;
    }

    /// Loads a table page and the chart data concurrently. Each response
    /// only touches its own slice of the view state.
    pub async fn reload(&mut self, page: u64, feedback: LoadFeedback) {
        let table_request = self.begin_table_load(page, feedback);
        let chart_token = self.begin_chart_load();

        let api = &self.api;
        let (table_result, chart_result) = tokio::join!(
            api.list_entries(table_request.page, table_request.page_size),
            api.list_entries(1, 0),
        );

        self.finish_table_load(table_request, table_result);
        self.finish_chart_load(chart_token, chart_result);
    }

    pub async fn load_table(&mut self, page: u64, feedback: LoadFeedback) {
        let request = self.begin_table_load(page, feedback);
        let result = self.api.list_entries(request.page, request.page_size).await;
        self.finish_table_load(request, result);
    }

    pub async fn load_charts(&mut self) {
        let token = self.begin_chart_load();
        let result = self.api.list_entries(1, 0).await;
        self.finish_chart_load(token, result);
    }

    pub fn begin_table_load(&mut self, page: u64, feedback: LoadFeedback) -> TableRequest {
        match feedback {
            LoadFeedback::Announce => self.status = StatusLine::neutral(REFRESHING_TEXT),
            LoadFeedback::Quiet => self.status = StatusLine::clear(),
            LoadFeedback::Keep => {}
        }
        TableRequest {
            token: self.tokens.issue(RequestKind::Table),
            page: page.max(1),
            page_size: self.page_size,
            feedback,
        }
    }

    /// Applies a table response. Returns `false` when the response was stale
    /// and has been dropped.
    pub fn finish_table_load(&mut self, request: TableRequest, result: Result<EntryList, ClientError>) -> bool {
        if !self.tokens.is_current(request.token) {
            debug!(seq = request.token.seq, "dropping stale table response");
            return false;
        }

        match result {
            Ok(list) => {
                self.state.pagination =
                    Pagination::resolve(list.meta, request.page, list.entries.len(), self.page_size);
                self.state.entries = list.entries;
                self.table = render_table(&self.state);
                match request.feedback {
                    LoadFeedback::Announce => self.status = StatusLine::success(REFRESHED_TEXT),
                    LoadFeedback::Quiet => self.status = StatusLine::clear(),
                    LoadFeedback::Keep => {}
                }
            }
            Err(err) => {
                error!("failed to load entries: {err}");
                self.status = StatusLine::error(LOAD_FAILED_TEXT);
            }
        }
        true
    }

    pub fn begin_chart_load(&mut self) -> RequestToken {
        self.tokens.issue(RequestKind::Chart)
    }

    /// Applies a chart response. Failures are logged and leave the charts as
    /// they were.
    pub fn finish_chart_load(&mut self, token: RequestToken, result: Result<EntryList, ClientError>) -> bool {
        if !self.tokens.is_current(token) {
            debug!(seq = token.seq, "dropping stale chart response");
            return false;
        }

        match result {
            Ok(list) => {
                self.state.chart_entries = list.entries;
                self.render_charts();
            }
            Err(err) => warn!("failed to load chart data: {err}"),
        }
        true
    }

    pub async fn next_page(&mut self) {
        if let Some(page) = self.state.pagination.next_page() {
            self.load_table(page, LoadFeedback::Announce).await;
        }
    }

    pub async fn prev_page(&mut self) {
        if let Some(page) = self.state.pagination.prev_page() {
            self.load_table(page, LoadFeedback::Announce).await;
        }
    }

    pub fn set_weight_unit(&mut self, unit: WeightUnit) {
        if self.state.weight_unit == unit {
            return;
        }
        self.state.weight_unit = unit;
        self.render_charts();
    }

    pub fn set_orientation(&mut self, target: ChartTarget, orientation: Orientation) {
        if self.state.orientation.get(target) == orientation {
            return;
        }
        self.state.orientation.set(target, orientation);
        self.render_charts();
    }

    /// Loads the entry shown at `index` of the current table page into the
    /// form. Unknown rows are ignored.
    pub fn select_row(&mut self, index: usize) -> bool {
        let Some(entry) = self.state.entries.get(index) else {
            return false;
        };
        self.form.populate(entry);
        self.status = StatusLine::success(format!(
            "loaded entry for {}; edit and save to update it",
            entry.date
        ));
        true
    }

    /// Validates and saves the form. On success the form is reset to `today`
    /// and both the table and the charts are reloaded from the server; on
    /// failure the typed values stay in place. The submit button is released
    /// on every path.
    pub async fn submit(&mut self, today: &str) -> FormPhase {
        let outcome = self.save(today).await;
        self.phase = FormPhase::Idle;
        outcome
    }

    async fn save(&mut self, today: &str) -> FormPhase {
        let payload = match self.form.build_payload() {
            Ok(payload) => payload,
            Err(err) => {
                debug!("form rejected locally: {err}");
                self.status = StatusLine::error(INVALID_INPUT_TEXT);
                self.phase = FormPhase::Failed;
                return self.phase;
            }
        };

        self.phase = FormPhase::Submitting;
        self.status = StatusLine::neutral(SAVING_TEXT);

        match self.api.create_entry(&payload).await {
            Ok(()) => {
                info!(date = %payload.date, "entry saved");
                self.phase = FormPhase::Succeeded;
                self.status = StatusLine::success(SAVED_TEXT);
                self.form.reset(today);
                self.reload(1, LoadFeedback::Keep).await;
            }
            Err(err) => {
                error!("failed to save entry: {err}");
                self.phase = FormPhase::Failed;
                self.status = StatusLine::save_failed(&err);
            }
        }
        self.phase
    }

    fn render_charts(&mut self) {
        self.charts.render(
            &self.state.chart_entries,
            self.state.weight_unit,
            self.state.orientation,
        );
    }
}

/// Loads `/api/chart/data` and mounts it as the standalone line chart.
pub async fn load_line_chart<C, B>(api: &C, slot: &mut ChartSlot<B>) -> Result<(), ClientError>
where
    C: EntryApi,
    B: ChartBackend,
{
    let data = api.chart_data().await.inspect_err(|err| {
        warn!("failed to load line chart data: {err}");
    })?;
    let (series, options) = single_series(&data);
    slot.mount(&series, &options);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartOptions, ChartRenderer, ChartSeries, EChartsBackend};
    use crate::form::{SAVE_FAILED_TEXT, StatusTone};
    use crate::models::{Entry, EntryPayload, PageMeta};
    use std::sync::{Arc, Mutex};

    const TODAY: &str = "2025-06-01";

    #[derive(Default)]
    struct FakeInner {
        entries: Vec<Entry>,
        calls: Vec<String>,
        reject_with: Option<ClientError>,
        fail_lists: bool,
    }

    #[derive(Clone, Default)]
    struct FakeApi(Arc<Mutex<FakeInner>>);

    impl FakeApi {
        fn with_entries(entries: Vec<Entry>) -> Self {
            let api = Self::default();
            api.0.lock().unwrap().entries = entries;
            api
        }

        fn calls(&self) -> Vec<String> {
            self.0.lock().unwrap().calls.clone()
        }
    }

    impl EntryApi for FakeApi {
        async fn list_entries(&self, page: u64, page_size: u64) -> Result<EntryList, ClientError> {
            let mut inner = self.0.lock().unwrap();
            inner.calls.push(format!("list {page} {page_size}"));
            if inner.fail_lists {
                return Err(ClientError::Network("offline".into()));
            }
            let mut entries = inner.entries.clone();
            entries.sort_by(|a, b| b.date.cmp(&a.date));
            if page_size == 0 {
                return Ok(EntryList { entries, meta: None });
            }
            let total = entries.len() as u64;
            let pages = crate::pagination::total_pages(total, page_size);
            let page = if total == 0 { 1 } else { page.clamp(1, pages) };
            let start = ((page - 1) * page_size) as usize;
            Ok(EntryList {
                entries: entries.into_iter().skip(start).take(page_size as usize).collect(),
                meta: Some(PageMeta { page, page_size, total }),
            })
        }

        async fn create_entry(&self, payload: &EntryPayload) -> Result<(), ClientError> {
            let mut inner = self.0.lock().unwrap();
            inner.calls.push(format!("create {}", payload.date));
            if let Some(err) = inner.reject_with.clone() {
                return Err(err);
            }
            inner.entries.retain(|e| e.date != payload.date);
            inner.entries.push(Entry {
                date: payload.date.clone(),
                weight_jin: payload.weight_jin,
                weight_kg: payload.weight_jin / 2.0,
                waist_cm: payload.waist_cm,
                note: payload.note.clone(),
                ..Entry::default()
            });
            Ok(())
        }

        async fn chart_data(&self) -> Result<crate::models::ChartData, ClientError> {
            Ok(crate::models::ChartData {
                labels: vec!["1/10".into(), "2/15".into()],
                values: vec![120.0, 118.0],
                series_name: Some("visits".into()),
                x_label: None,
                y_label: None,
            })
        }
    }

    fn entry(date: &str, jin: f64, waist: Option<f64>) -> Entry {
        Entry {
            date: date.to_string(),
            weight_jin: jin,
            weight_kg: jin / 2.0,
            waist_cm: waist,
            ..Entry::default()
        }
    }

    fn controller(api: FakeApi, page_size: u64) -> TrackerController<FakeApi, EChartsBackend> {
        TrackerController::new(api, EChartsBackend, page_size, Viewport::Regular, TODAY)
    }

    fn many(count: usize) -> Vec<Entry> {
        (1..=count)
            .map(|day| entry(&format!("2025-01-{day:02}"), 100.0 + day as f64, None))
            .collect()
    }

    #[tokio::test]
    async fn init_loads_table_page_and_full_chart_history() {
        let api = FakeApi::with_entries(many(5));
        let mut controller = controller(api.clone(), 2);
        controller.init().await;

        assert_eq!(controller.state().entries.len(), 2);
        assert_eq!(controller.state().chart_entries.len(), 5);
        assert_eq!(controller.state().pagination.total_pages, 3);
        assert_eq!(controller.table().rows[0].date, "2025-01-05");
        assert_eq!(controller.status(), &StatusLine::clear());
        assert!(api.calls().contains(&"list 1 2".to_string()));
        assert!(api.calls().contains(&"list 1 0".to_string()));
        assert!(controller.charts().weight.instance().and_then(|c| c.options()).is_some());
    }

    #[tokio::test]
    async fn paging_walks_and_stops_at_edges() {
        let api = FakeApi::with_entries(many(5));
        let mut controller = controller(api, 2);
        controller.init().await;

        controller.prev_page().await;
        assert_eq!(controller.state().pagination.page, 1);

        controller.next_page().await;
        controller.next_page().await;
        assert_eq!(controller.state().pagination.page, 3);
        assert_eq!(controller.state().entries.len(), 1);
        assert!(!controller.table().controls.next_enabled);

        controller.next_page().await;
        assert_eq!(controller.state().pagination.page, 3);
        assert_eq!(controller.status(), &StatusLine::success(REFRESHED_TEXT));
    }

    #[tokio::test]
    async fn empty_history_disables_navigation() {
        let mut controller = controller(FakeApi::default(), 20);
        controller.init().await;

        assert_eq!(controller.state().pagination.page, 1);
        assert!(!controller.table().controls.prev_enabled);
        assert!(!controller.table().controls.next_enabled);
    }

    #[tokio::test]
    async fn successful_submit_resets_form_and_reloads() {
        let api = FakeApi::default();
        let mut controller = controller(api.clone(), 20);
        controller.init().await;

        *controller.form_mut() = FormInput {
            date: "2025-05-01".into(),
            weight_jin: "120".into(),
            waist_cm: "80".into(),
            note: "ok".into(),
        };
        let outcome = controller.submit(TODAY).await;

        assert_eq!(outcome, FormPhase::Succeeded);
        assert_eq!(controller.phase(), FormPhase::Idle);
        assert!(controller.submit_enabled());
        assert_eq!(controller.status(), &StatusLine::success(SAVED_TEXT));
        assert_eq!(controller.form(), &FormInput::with_date(TODAY));
        assert_eq!(controller.state().entries.len(), 1);
        assert_eq!(controller.state().entries[0].date, "2025-05-01");
        assert_eq!(controller.table().rows[0].weight_kg, "60.00");
        assert_eq!(controller.state().chart_entries.len(), 1);
    }

    #[tokio::test]
    async fn invalid_weight_never_reaches_the_network() {
        let api = FakeApi::default();
        let mut controller = controller(api.clone(), 20);
        *controller.form_mut() = FormInput {
            date: "2025-05-01".into(),
            weight_jin: "-5".into(),
            ..FormInput::default()
        };

        let outcome = controller.submit(TODAY).await;

        assert_eq!(outcome, FormPhase::Failed);
        assert!(controller.submit_enabled());
        assert_eq!(controller.status(), &StatusLine::error(INVALID_INPUT_TEXT));
        assert!(api.calls().iter().all(|call| !call.starts_with("create")));
    }

    #[tokio::test]
    async fn server_rejection_keeps_form_values() {
        let api = FakeApi::default();
        api.0.lock().unwrap().reject_with = Some(ClientError::Validation("duplicate date".into()));
        let mut controller = controller(api, 20);
        let typed = FormInput {
            date: "2025-05-01".into(),
            weight_jin: "120".into(),
            waist_cm: "80".into(),
            note: "ok".into(),
        };
        *controller.form_mut() = typed.clone();

        let outcome = controller.submit(TODAY).await;

        assert_eq!(outcome, FormPhase::Failed);
        assert_eq!(controller.phase(), FormPhase::Idle);
        assert_eq!(controller.status(), &StatusLine::error("duplicate date"));
        assert_eq!(controller.form(), &typed);
    }

    #[tokio::test]
    async fn network_failure_uses_generic_message() {
        let api = FakeApi::default();
        api.0.lock().unwrap().reject_with = Some(ClientError::Network("refused".into()));
        let mut controller = controller(api, 20);
        controller.form_mut().weight_jin = "120".into();

        controller.submit(TODAY).await;
        assert_eq!(controller.status(), &StatusLine::error(SAVE_FAILED_TEXT));
    }

    #[tokio::test]
    async fn failed_table_load_shows_error() {
        let api = FakeApi::default();
        api.0.lock().unwrap().fail_lists = true;
        let mut controller = controller(api, 20);
        controller.refresh().await;

        assert_eq!(controller.status().tone, StatusTone::Error);
        assert_eq!(controller.status().message, LOAD_FAILED_TEXT);
    }

    #[test]
    fn stale_table_response_is_dropped() {
        let mut controller = controller(FakeApi::default(), 20);
        let older = controller.begin_table_load(1, LoadFeedback::Quiet);
        let newer = controller.begin_table_load(2, LoadFeedback::Quiet);

        let fresh = EntryList {
            entries: vec![entry("2025-02-01", 110.0, None)],
            meta: Some(PageMeta { page: 1, page_size: 20, total: 1 }),
        };
        assert!(controller.finish_table_load(newer, Ok(fresh)));

        let stale = EntryList {
            entries: many(3),
            meta: Some(PageMeta { page: 1, page_size: 20, total: 3 }),
        };
        assert!(!controller.finish_table_load(older, Ok(stale)));
        assert_eq!(controller.state().entries.len(), 1);
        assert_eq!(controller.state().entries[0].date, "2025-02-01");
    }

    #[test]
    fn stale_chart_response_is_dropped() {
        let mut controller = controller(FakeApi::default(), 20);
        let older = controller.begin_chart_load();
        let newer = controller.begin_chart_load();

        assert!(controller.finish_chart_load(newer, Ok(EntryList { entries: many(2), meta: None })));
        assert!(!controller.finish_chart_load(older, Ok(EntryList { entries: many(4), meta: None })));
        assert_eq!(controller.state().chart_entries.len(), 2);
    }

    #[test]
    fn select_row_populates_form() {
        let mut controller = controller(FakeApi::default(), 20);
        let request = controller.begin_table_load(1, LoadFeedback::Quiet);
        controller.finish_table_load(
            request,
            Ok(EntryList {
                entries: vec![entry("2025-05-01", 120.0, Some(80.0))],
                meta: None,
            }),
        );

        assert!(!controller.select_row(3));
        assert!(controller.select_row(0));
        assert_eq!(controller.form().weight_jin, "120");
        assert_eq!(controller.form().waist_cm, "80");
        assert_eq!(controller.status().tone, StatusTone::Success);
    }

    #[derive(Clone, Default)]
    struct CountingBackend(Arc<Mutex<Vec<(String, usize)>>>);

    struct CountingChart(String, Arc<Mutex<Vec<(String, usize)>>>);

    impl ChartBackend for CountingBackend {
        type Renderer = CountingChart;

        fn create(&self, target_id: &str) -> CountingChart {
            CountingChart(target_id.to_string(), Arc::clone(&self.0))
        }
    }

    impl ChartRenderer for CountingChart {
        fn render(&mut self, series: &ChartSeries, _options: &ChartOptions) {
            self.1.lock().unwrap().push((self.0.clone(), series.values.len()));
        }

        fn dispose(&mut self) {}
    }

    #[test]
    fn toggles_rerender_only_on_change() {
        let backend = CountingBackend::default();
        let mut controller =
            TrackerController::new(FakeApi::default(), backend.clone(), 20, Viewport::Regular, TODAY);
        let token = controller.begin_chart_load();
        controller.finish_chart_load(
            token,
            Ok(EntryList {
                entries: vec![entry("2025-05-01", 120.0, Some(80.0)), entry("2025-05-02", 119.0, None)],
                meta: None,
            }),
        );
        let renders = backend.0.lock().unwrap().len();

        controller.set_weight_unit(WeightUnit::Jin);
        controller.set_orientation(ChartTarget::Waist, Orientation::Vertical);
        assert_eq!(backend.0.lock().unwrap().len(), renders);

        controller.set_weight_unit(WeightUnit::Kg);
        controller.set_orientation(ChartTarget::Weight, Orientation::Horizontal);
        let log = backend.0.lock().unwrap().clone();
        assert_eq!(log.len(), renders + 4);
        assert!(log.contains(&("waist-chart".to_string(), 1)));
        assert!(log.contains(&("weight-chart".to_string(), 2)));
    }

    #[tokio::test]
    async fn line_chart_mounts_fetched_series() {
        let mut slot = ChartSlot::new(crate::chart::SINGLE_CHART_ID, EChartsBackend);
        load_line_chart(&FakeApi::default(), &mut slot).await.unwrap();

        let options = slot.instance().and_then(|chart| chart.options()).unwrap();
        assert!(options.contains("visits"));
    }
}
