//! Persistence adapter for the meal catalog and meal entry log.
//!
//! Both files are headerless, comma-separated, one record per line:
//! - `meal_options.csv`: `name,calories`
//! - `meal_entries.csv`: `name,calories,timestamp`
//!
//! Fields are split on every comma with no quoting, and trailing empty
//! fields are ignored. An empty name field means the meal has no name. Lines
//! with the wrong number of fields, or fields that fail to parse, are skipped
//! and reported back in [`Loaded::skipped`]; they never abort a load.

use crate::error::LineError;
use crate::store;
use crate::types::{format_timestamp, parse_timestamp};
use crate::{Error, Meal, MealEntriesList, MealEntry, MealList, Profile, Result};
use csv::{QuoteStyle, ReaderBuilder, StringRecord, WriterBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

pub const MEAL_ENTRIES_FILE: &str = "meal_entries.csv";
pub const MEAL_OPTIONS_FILE: &str = "meal_options.csv";
pub const USER_DATA_FILE: &str = "user_data.txt";

const MEAL_FIELDS: usize = 2;
const ENTRY_FIELDS: usize = 3;

/// Records produced by a load, plus the lines that were skipped
#[derive(Clone, Debug, Default)]
pub struct Loaded<T> {
    pub records: T,
    pub skipped: Vec<SkippedLine>,
}

impl<T> Loaded<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Loaded<U> {
        Loaded {
            records: f(self.records),
            skipped: self.skipped,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// A line that was dropped during a load
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the source file
    pub line: u64,
    pub reason: LineError,
}

impl fmt::Display for SkippedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

/// Catalog line as it appears on disk
#[derive(Debug, Serialize, Deserialize)]
struct MealRow {
    name: Option<String>,
    calories: String,
}

impl From<&Meal> for MealRow {
    fn from(meal: &Meal) -> Self {
        MealRow {
            name: meal.name.clone(),
            calories: meal.calories.to_string(),
        }
    }
}

impl TryFrom<MealRow> for Meal {
    type Error = LineError;

    fn try_from(row: MealRow) -> std::result::Result<Self, LineError> {
        let calories = parse_calories(&row.calories)?;
        Ok(Meal::new(row.name, calories))
    }
}

/// Entry line as it appears on disk
#[derive(Debug, Serialize, Deserialize)]
struct EntryRow {
    name: Option<String>,
    calories: String,
    timestamp: String,
}

impl From<&MealEntry> for EntryRow {
    fn from(entry: &MealEntry) -> Self {
        EntryRow {
            name: entry.name.clone(),
            calories: entry.calories.to_string(),
            timestamp: format_timestamp(&entry.timestamp),
        }
    }
}

impl TryFrom<EntryRow> for MealEntry {
    type Error = LineError;

    fn try_from(row: EntryRow) -> std::result::Result<Self, LineError> {
        let calories = parse_calories(&row.calories)?;
        let raw = row.timestamp.trim();
        let timestamp = parse_timestamp(raw).map_err(|e| LineError::Timestamp {
            value: raw.to_string(),
            reason: e.to_string(),
        })?;
        Ok(MealEntry::new(row.name, calories, timestamp))
    }
}

fn parse_calories(value: &str) -> std::result::Result<i32, LineError> {
    value.parse::<i32>().map_err(|e| LineError::Calories {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Reads and writes the user's nutrition data inside one storage directory
#[derive(Debug)]
pub struct HistoryTracker {
    data_dir: PathBuf,
    pub(crate) profile: Option<Profile>,
}

impl HistoryTracker {
    /// Open the storage directory, creating it (and any parents) if needed.
    ///
    /// Fails if the directory cannot be created or the path is not a
    /// directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();

        if let Err(e) = std::fs::create_dir_all(&data_dir) {
            return Err(Error::StorageDir {
                path: data_dir,
                reason: e.to_string(),
            });
        }
        if !data_dir.is_dir() {
            return Err(Error::StorageDir {
                path: data_dir,
                reason: "not a directory".into(),
            });
        }

        tracing::debug!("Using data directory {:?}", data_dir);
        Ok(Self {
            data_dir,
            profile: None,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn meal_entries_path(&self) -> PathBuf {
        self.data_dir.join(MEAL_ENTRIES_FILE)
    }

    pub fn meal_options_path(&self) -> PathBuf {
        self.data_dir.join(MEAL_OPTIONS_FILE)
    }

    pub fn user_data_path(&self) -> PathBuf {
        self.data_dir.join(USER_DATA_FILE)
    }

    /// Overwrite the entry log with `entries`
    pub fn save_meal_entries(&self, entries: &MealEntriesList) -> Result<()> {
        let path = self.meal_entries_path();
        save_rows(&path, entries.iter().map(EntryRow::from))?;
        tracing::info!("Saved {} meal entries to {:?}", entries.len(), path);
        Ok(())
    }

    /// Overwrite the catalog with `options`
    pub fn save_meal_options(&self, options: &MealList) -> Result<()> {
        let path = self.meal_options_path();
        save_rows(&path, options.iter().map(MealRow::from))?;
        tracing::info!("Saved {} meal options to {:?}", options.len(), path);
        Ok(())
    }

    /// Load the entry log. A missing file yields an empty log.
    pub fn load_meal_entries(&self) -> Result<Loaded<MealEntriesList>> {
        let path = self.meal_entries_path();
        let loaded = load_rows::<EntryRow, MealEntry>(&path, ENTRY_FIELDS)?;
        tracing::info!(
            "Loaded {} meal entries ({} skipped)",
            loaded.records.len(),
            loaded.skipped.len()
        );
        Ok(loaded.map(|records| records.into_iter().collect()))
    }

    /// Load the catalog. A missing file yields an empty catalog.
    pub fn load_meal_options(&self) -> Result<Loaded<MealList>> {
        let path = self.meal_options_path();
        let loaded = load_rows::<MealRow, Meal>(&path, MEAL_FIELDS)?;
        tracing::info!(
            "Loaded {} meal options ({} skipped)",
            loaded.records.len(),
            loaded.skipped.len()
        );
        Ok(loaded.map(|records| records.into_iter().collect()))
    }

    /// Fresh log for callers that start over instead of loading
    pub fn empty_meal_entries(&self) -> MealEntriesList {
        MealEntriesList::new()
    }

    /// Fresh catalog for callers that start over instead of loading
    pub fn empty_meal_options(&self) -> MealList {
        MealList::new()
    }
}

fn save_rows<R, I>(path: &Path, rows: I) -> Result<()>
where
    R: Serialize,
    I: IntoIterator<Item = R>,
{
    store::write_atomic(path, |out| {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::Never)
            .from_writer(out);
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    })
}

fn load_rows<R, T>(path: &Path, expected_fields: usize) -> Result<Loaded<Vec<T>>>
where
    R: DeserializeOwned,
    T: TryFrom<R, Error = LineError>,
{
    let loaded = store::with_shared(path, |file| read_rows::<R, T>(file, expected_fields))?;

    match loaded {
        Some(loaded) => Ok(loaded),
        None => {
            tracing::debug!("No file at {:?}, starting empty", path);
            Ok(Loaded::default())
        }
    }
}

fn read_rows<R, T>(file: &File, expected_fields: usize) -> Result<Loaded<Vec<T>>>
where
    R: DeserializeOwned,
    T: TryFrom<R, Error = LineError>,
{
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(file);

    let mut loaded: Loaded<Vec<T>> = Loaded::default();
    let mut record = StringRecord::new();

    loop {
        let (line, result) = match reader.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => (
                record.position().map_or(0, |p| p.line()),
                parse_record::<R, T>(&mut record, expected_fields),
            ),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => (
                e.position().map_or(0, |p| p.line()),
                Err(LineError::Unreadable(e.to_string())),
            ),
        };

        match result {
            Ok(value) => loaded.records.push(value),
            Err(reason) => {
                tracing::warn!("Skipping line {}: {}", line, reason);
                loaded.skipped.push(SkippedLine { line, reason });
            }
        }
    }

    Ok(loaded)
}

fn parse_record<R, T>(
    record: &mut StringRecord,
    expected_fields: usize,
) -> std::result::Result<T, LineError>
where
    R: DeserializeOwned,
    T: TryFrom<R, Error = LineError>,
{
    // `rice,300,` counts as two fields
    let found = record.iter().rev().skip_while(|f| f.is_empty()).count();
    if found != expected_fields {
        return Err(LineError::FieldCount {
            expected: expected_fields,
            found,
        });
    }
    record.truncate(found);

    let row: R = record
        .deserialize(None)
        .map_err(|e| LineError::Unreadable(e.to_string()))?;
    T::try_from(row)
}
