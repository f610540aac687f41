use crate::format::format_number;
use crate::models::Entry;
use crate::view_state::ViewState;

pub const EMPTY_TABLE_TEXT: &str = "no entries yet";
const MISSING: &str = "--";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Position in the current page, used to select the row for editing.
    pub index: usize,
    pub date: String,
    pub weight_kg: String,
    pub weight_jin: String,
    pub waist_cm: String,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationControls {
    pub summary: String,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub rows: Vec<TableRow>,
    pub controls: PaginationControls,
}

impl TableView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Default for TableView {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            controls: PaginationControls {
                summary: EMPTY_TABLE_TEXT.to_string(),
                prev_enabled: false,
                next_enabled: false,
            },
        }
    }
}

pub fn render_table(state: &ViewState) -> TableView {
    let rows = state
        .entries
        .iter()
        .enumerate()
        .map(|(index, entry)| table_row(index, entry))
        .collect();

    let pagination = &state.pagination;
    TableView {
        rows,
        controls: PaginationControls {
            summary: pagination.summary(),
            prev_enabled: pagination.prev_enabled(),
            next_enabled: pagination.next_enabled(),
        },
    }
}

fn table_row(index: usize, entry: &Entry) -> TableRow {
    TableRow {
        index,
        date: non_empty(&entry.date),
        weight_kg: format_number(entry.weight_kg, 2),
        weight_jin: format_number(entry.weight_jin, 1),
        waist_cm: entry
            .waist_cm
            .map(|waist| format_number(waist, 1))
            .unwrap_or_else(|| MISSING.to_string()),
        note: non_empty(&entry.note),
    }
}

fn non_empty(value: &str) -> String {
    if value.is_empty() {
        MISSING.to_string()
    } else {
        value.to_string()
    }
}
