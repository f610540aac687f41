use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// One jin is exactly half a kilogram. Dividing by two never loses precision
/// for the magnitudes a scale produces.
pub fn jin_to_kg(jin: f64) -> f64 {
    jin / 2.0
}

/// Rounds to one decimal place, the precision weights and waists are stored at.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Jin,
    Kg,
}

impl WeightUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            WeightUnit::Jin => "jin",
            WeightUnit::Kg => "kg",
        }
    }

    /// Fraction digits used when showing a weight in this unit.
    pub fn digits(self) -> usize {
        match self {
            WeightUnit::Jin => 1,
            WeightUnit::Kg => 2,
        }
    }

    pub fn series_name(self) -> &'static str {
        match self {
            WeightUnit::Jin => "Weight (jin)",
            WeightUnit::Kg => "Weight (kg)",
        }
    }

    /// Picks the weight in this unit from the entry's source values.
    pub fn select(self, weight_jin: f64, weight_kg: f64) -> f64 {
        match self {
            WeightUnit::Jin => weight_jin,
            WeightUnit::Kg => weight_kg,
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightUnit {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "jin" => Ok(WeightUnit::Jin),
            "kg" => Ok(WeightUnit::Kg),
            other => Err(format!("unknown weight unit '{other}'")),
        }
    }
}
