//! Profile persistence.
//!
//! The profile lives in `user_data.txt` as five lines: height, weight, sex
//! flag, age, goal. The sex flag is `true` in any letter case; any other
//! value reads as `false`.

use crate::history::HistoryTracker;
use crate::store;
use crate::{Error, Profile, Result};
use std::str::FromStr;

/// What [`HistoryTracker::save_profile`] did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfileSave {
    /// The profile file did not exist; an empty one was created and nothing
    /// was written. A second save persists the profile.
    FileCreated,
    /// The profile replaced the file contents
    Written,
}

impl HistoryTracker {
    /// Load the profile from disk.
    ///
    /// - Missing file: an empty one is created, returns `Ok(None)`.
    /// - Empty file: `Ok(None)`.
    /// - Missing or unparsable field: the error is logged and returned.
    ///
    /// The tracker's profile is cleared first and only set on success.
    pub fn load_profile(&mut self) -> Result<Option<Profile>> {
        self.profile = None;
        let path = self.user_data_path();

        let Some(contents) = store::read_to_string_shared(&path)? else {
            store::create_empty(&path)?;
            tracing::info!("Created empty profile file at {:?}", path);
            return Ok(None);
        };

        match parse_profile(&contents) {
            Ok(Some(profile)) => {
                tracing::info!("Loaded profile from {:?}", path);
                self.profile = Some(profile.clone());
                Ok(Some(profile))
            }
            Ok(None) => {
                tracing::debug!("Profile file {:?} is empty", path);
                Ok(None)
            }
            Err(e) => {
                tracing::warn!("Failed to load profile from {:?}: {}", path, e);
                Err(e)
            }
        }
    }

    /// The profile from the last successful [`load_profile`](Self::load_profile)
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Write the profile, replacing any previous one.
    ///
    /// If the profile file does not exist yet it is only created (empty) and
    /// `ProfileSave::FileCreated` is returned.
    pub fn save_profile(&self, profile: &Profile) -> Result<ProfileSave> {
        let path = self.user_data_path();

        if !path.exists() {
            store::create_empty(&path)?;
            tracing::info!("Created empty profile file at {:?}; profile not written", path);
            return Ok(ProfileSave::FileCreated);
        }

        let contents = profile.to_save_string();
        store::write_atomic(&path, |w| {
            std::io::Write::write_all(w, contents.as_bytes())?;
            Ok(())
        })?;

        tracing::info!("Saved profile to {:?}", path);
        Ok(ProfileSave::Written)
    }

    /// Raw lines of the profile file, for display. Empty if the file is missing.
    pub fn read_profile_lines(&self) -> Result<Vec<String>> {
        let contents = store::read_to_string_shared(&self.user_data_path())?;
        Ok(contents
            .map(|c| c.lines().map(str::to_string).collect())
            .unwrap_or_default())
    }
}

/// Parse the five-line profile form. `Ok(None)` for a blank file.
pub fn parse_profile(contents: &str) -> Result<Option<Profile>> {
    if contents.trim().is_empty() {
        return Ok(None);
    }

    let lines: Vec<&str> = contents.lines().collect();

    let height = parse_field::<f64>(&lines, 0, "height")?;
    let weight = parse_field::<f64>(&lines, 1, "weight")?;
    let is_male = parse_flag(&lines, 2, "sex flag")?;
    let age = parse_field::<u32>(&lines, 3, "age")?;
    let goal = field(&lines, 4, "goal")?.to_string();

    Ok(Some(Profile {
        height,
        weight,
        is_male,
        age,
        goal,
    }))
}

fn field<'a>(lines: &[&'a str], index: usize, name: &'static str) -> Result<&'a str> {
    lines
        .get(index)
        .copied()
        .ok_or(Error::MissingProfileField { field: name })
}

fn parse_field<T>(lines: &[&str], index: usize, name: &'static str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = field(lines, index, name)?.trim();
    raw.parse::<T>().map_err(|e| Error::MalformedProfile {
        line: index + 1,
        field: name,
        reason: format!("{:?}: {}", raw, e),
    })
}

fn parse_flag(lines: &[&str], index: usize, name: &'static str) -> Result<bool> {
    let raw = field(lines, index, name)?.trim();
    Ok(raw.eq_ignore_ascii_case("true"))
}
