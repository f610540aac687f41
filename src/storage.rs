use crate::errors::AppError;
use crate::models::{AppData, Entry, EntryPayload};
use crate::units::{jin_to_kg, round_tenth};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use std::{path::Path, path::PathBuf};
use tokio::fs;
use tracing::error;

pub const DEFAULT_DATA_PATH: &str = "data/entries.json";

pub fn resolve_data_path(configured: Option<&str>) -> PathBuf {
    match configured.map(str::trim) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_DATA_PATH),
    }
}

pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            AppData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

impl AppData {
    /// Inserts the entry for `date`, or updates it in place keeping its id and
    /// creation time. The payload is expected to be validated already.
    pub fn upsert_entry(&mut self, date: NaiveDate, payload: &EntryPayload, now: DateTime<Utc>) -> Entry {
        let key = date.format("%Y-%m-%d").to_string();
        let timestamp = now.to_rfc3339_opts(SecondsFormat::Secs, true);
        let weight_jin = round_tenth(payload.weight_jin);

        let (id, created_at) = match self.entries.get(&key) {
            Some(existing) => (existing.id, existing.created_at.clone()),
            None => {
                self.next_id = self.next_id.saturating_add(1);
                (self.next_id, timestamp.clone())
            }
        };

        let entry = Entry {
            id,
            date: key.clone(),
            weight_kg: jin_to_kg(weight_jin),
            weight_jin,
            waist_cm: payload.waist_cm.map(round_tenth),
            note: payload.note.trim().to_string(),
            created_at,
            updated_at: timestamp,
        };
        self.entries.insert(key, entry.clone());
        entry
    }

    /// Entries newest first. A `limit` of 0 returns every entry.
    pub fn list_entries(&self, limit: usize, offset: usize) -> Vec<Entry> {
        let newest_first = self.entries.values().rev().cloned();
        if limit == 0 {
            newest_first.collect()
        } else {
            newest_first.skip(offset).take(limit).collect()
        }
    }

    pub fn count_entries(&self) -> usize {
        self.entries.len()
    }

    /// Entries oldest first, for chart series.
    pub fn chronological(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }
}
