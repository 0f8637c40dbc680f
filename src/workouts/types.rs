//! Workout types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single logged workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    /// Row id assigned by the store, unique and increasing in insertion order
    pub id: i64,
    /// Workout name as submitted
    pub name: String,
    /// Time the workout was recorded, assigned by the store at insertion
    pub date: DateTime<Utc>,
}

impl Workout {
    /// Date formatted for display in the workout list.
    pub fn date_display(&self) -> String {
        self.date.format("%Y-%m-%d %H:%M").to_string()
    }
}
