use serde::Deserialize;

use crate::client::ClientError;
use crate::format::{format_input_number, format_number};
use crate::models::{Entry, EntryPayload};
use crate::units::jin_to_kg;

pub const INVALID_INPUT_TEXT: &str = "please check your input";
pub const SAVING_TEXT: &str = "saving...";
pub const SAVED_TEXT: &str = "saved";
pub const SAVE_FAILED_TEXT: &str = "save failed, please try again later";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusTone {
    #[default]
    Neutral,
    Success,
    Error,
}

impl StatusTone {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusTone::Neutral => "neutral",
            StatusTone::Success => "success",
            StatusTone::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusLine {
    pub message: String,
    pub tone: StatusTone,
}

impl StatusLine {
    pub fn neutral(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            tone: StatusTone::Neutral,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            tone: StatusTone::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            tone: StatusTone::Error,
        }
    }

    pub fn clear() -> Self {
        Self::default()
    }

    /// Status for a failed save: the server's message when it sent one.
    pub fn save_failed(err: &ClientError) -> Self {
        Self::error(err.user_message().unwrap_or(SAVE_FAILED_TEXT))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormPhase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl FormPhase {
    pub fn submit_enabled(self) -> bool {
        self != FormPhase::Submitting
    }
}

/// Raw form field values exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct FormInput {
    #[serde(default)]
    pub date: String,
    #[serde(default, rename = "weightJin")]
    pub weight_jin: String,
    #[serde(default, rename = "waistCm")]
    pub waist_cm: String,
    #[serde(default)]
    pub note: String,
}

impl FormInput {
    pub fn with_date(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            ..Self::default()
        }
    }

    /// Validates the fields and builds the save payload. The date must be
    /// present and the weight a finite positive number; a waist that is not
    /// finite and positive is sent as absent.
    pub fn build_payload(&self) -> Result<EntryPayload, ClientError> {
        let date = self.date.trim();
        let weight_jin = parse_positive(&self.weight_jin);

        match weight_jin {
            Some(weight_jin) if !date.is_empty() => Ok(EntryPayload {
                date: date.to_string(),
                weight_jin,
                waist_cm: parse_positive(&self.waist_cm),
                note: self.note.trim().to_string(),
            }),
            _ => Err(ClientError::Validation(INVALID_INPUT_TEXT.to_string())),
        }
    }

    /// Live kilogram preview of the typed jin value.
    pub fn weight_preview(&self) -> String {
        match parse_positive(&self.weight_jin) {
            Some(jin) => format!("{} kg", format_number(jin_to_kg(jin), 2)),
            None => String::new(),
        }
    }

    /// Clears every field and defaults the date to `today`.
    pub fn reset(&mut self, today: &str) {
        *self = Self::with_date(today);
    }

    /// Loads an existing entry for editing.
    pub fn populate(&mut self, entry: &Entry) {
        if !entry.date.is_empty() {
            self.date = entry.date.clone();
        }
        self.weight_jin = format_input_number(Some(entry.weight_jin));
        self.waist_cm = format_input_number(entry.waist_cm);
        self.note = entry.note.clone();
    }
}

fn parse_positive(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite() && *number > 0.0)
}
