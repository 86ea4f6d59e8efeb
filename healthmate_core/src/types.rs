//! Core domain types for HealthMate.
//!
//! This module defines the records the persistence layer reads and writes:
//! - The user profile
//! - Meals (catalog definitions) and meal entries (consumption log)
//! - The ordered collections that own them

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical on-disk timestamp format for meal entries.
///
/// `%.f` drops the fractional part when it is zero.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Minute-precision form accepted when reading older files.
pub const TIMESTAMP_FORMAT_MINUTES: &str = "%Y-%m-%dT%H:%M";

/// Format a timestamp in the canonical form.
pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp written by [`format_timestamp`].
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .or_else(|e| NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT_MINUTES).map_err(|_| e))
}

fn normalize_name(name: Option<String>) -> Option<String> {
    name.filter(|n| !n.is_empty())
}

// ============================================================================
// Profile
// ============================================================================

/// Biometric and goal data for the user
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub height: f64,
    pub weight: f64,
    pub is_male: bool,
    pub age: u32,
    pub goal: String,
}

impl Profile {
    pub fn new(
        height: f64,
        weight: f64,
        is_male: bool,
        age: u32,
        goal: impl Into<String>,
    ) -> Self {
        Self {
            height,
            weight,
            is_male,
            age,
            goal: goal.into(),
        }
    }

    /// Five newline-terminated lines: height, weight, sex flag, age, goal.
    pub fn to_save_string(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}\n{}\n",
            self.height, self.weight, self.is_male, self.age, self.goal
        )
    }
}

// ============================================================================
// Meals
// ============================================================================

/// A reusable meal definition from the catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub name: Option<String>,
    pub calories: i32,
}

impl Meal {
    /// An empty name is treated as no name.
    pub fn new(name: Option<String>, calories: i32) -> Self {
        Self {
            name: normalize_name(name),
            calories,
        }
    }

    pub fn to_save_string(&self) -> String {
        format!("{},{}", self.name.as_deref().unwrap_or(""), self.calories)
    }
}

impl fmt::Display for Meal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({} kcal)", name, self.calories),
            None => write!(f, "(unnamed) ({} kcal)", self.calories),
        }
    }
}

/// A meal actually consumed at a point in time
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealEntry {
    pub name: Option<String>,
    pub calories: i32,
    pub timestamp: NaiveDateTime,
}

impl MealEntry {
    pub fn new(name: Option<String>, calories: i32, timestamp: NaiveDateTime) -> Self {
        Self {
            name: normalize_name(name),
            calories,
            timestamp,
        }
    }

    /// Log an entry for a catalog meal
    pub fn from_meal(meal: &Meal, timestamp: NaiveDateTime) -> Self {
        Self {
            name: meal.name.clone(),
            calories: meal.calories,
            timestamp,
        }
    }

    pub fn to_save_string(&self) -> String {
        format!(
            "{},{},{}",
            self.name.as_deref().unwrap_or(""),
            self.calories,
            format_timestamp(&self.timestamp)
        )
    }
}

impl fmt::Display for MealEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({} kcal)",
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.name.as_deref().unwrap_or("(unnamed)"),
            self.calories
        )
    }
}

// ============================================================================
// Collections
// ============================================================================

/// The meal catalog, in insertion order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MealList {
    meals: Vec<Meal>,
}

impl MealList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append without any user-facing message
    pub fn push(&mut self, meal: Meal) {
        self.meals.push(meal);
    }

    pub fn meals(&self) -> &[Meal] {
        &self.meals
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Meal> {
        self.meals.iter()
    }

    pub fn len(&self) -> usize {
        self.meals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meals.is_empty()
    }
}

impl FromIterator<Meal> for MealList {
    fn from_iter<I: IntoIterator<Item = Meal>>(iter: I) -> Self {
        Self {
            meals: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a MealList {
    type Item = &'a Meal;
    type IntoIter = std::slice::Iter<'a, Meal>;

    fn into_iter(self) -> Self::IntoIter {
        self.meals.iter()
    }
}

/// The consumption log, in insertion order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MealEntriesList {
    entries: Vec<MealEntry>,
}

impl MealEntriesList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append without any user-facing message
    pub fn push(&mut self, entry: MealEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[MealEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MealEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_calories(&self) -> i64 {
        self.entries.iter().map(|e| e.calories as i64).sum()
    }
}

impl FromIterator<MealEntry> for MealEntriesList {
    fn from_iter<I: IntoIterator<Item = MealEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a MealEntriesList {
    type Item = &'a MealEntry;
    type IntoIter = std::slice::Iter<'a, MealEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
