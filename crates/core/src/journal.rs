//! Journal Model
//!
//! A journal is a named, optionally goal-directed sequence of dated text
//! entries. The coaching service never sees the journal itself, only the
//! timestamped excerpts produced here.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::elapsed::ElapsedTime;
use crate::error::{CoreError, CoreResult};

/// Format used for each excerpt line handed to the model.
const LINE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A single dated journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

impl JournalEntry {
    /// Render as `[YYYY-MM-DD HH:MM] text`.
    pub fn to_line(&self) -> String {
        format!("[{}] {}", self.timestamp.format(LINE_TIME_FORMAT), self.text)
    }

    /// Calendar date (UTC) of the entry.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// A named journal with an optional goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journal {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Chronological, oldest first.
    #[serde(default)]
    pub entries: Vec<JournalEntry>,
}

impl Journal {
    /// Create an empty journal. The name is required; a blank goal is dropped.
    pub fn new(name: &str, goal: Option<&str>) -> CoreResult<Self> {
        Self::new_at(name, goal, Utc::now())
    }

    /// Like [`Journal::new`] with an explicit creation time.
    pub fn new_at(name: &str, goal: Option<&str>, created_at: DateTime<Utc>) -> CoreResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::validation("journal name is required"));
        }
        let goal = goal
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string);

        Ok(Self {
            id: slugify(name),
            name: name.to_string(),
            goal,
            created_at,
            entries: Vec::new(),
        })
    }

    /// Parse a journal from its JSON document form.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let mut journal: Journal = serde_json::from_str(json)?;
        if journal.name.trim().is_empty() {
            return Err(CoreError::validation("journal name is required"));
        }
        // Documents written by hand are not guaranteed to be sorted.
        journal.entries.sort_by_key(|e| e.timestamp);
        Ok(journal)
    }

    /// Load a journal from a JSON file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::JournalNotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Append an entry, keeping entries in timestamp order.
    ///
    /// Entries with equal timestamps keep insertion order.
    pub fn append(&mut self, text: &str, timestamp: DateTime<Utc>) -> CoreResult<&JournalEntry> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CoreError::validation("entry text is empty"));
        }
        let idx = self.entries.partition_point(|e| e.timestamp <= timestamp);
        self.entries.insert(
            idx,
            JournalEntry {
                timestamp,
                text: text.to_string(),
            },
        );
        Ok(&self.entries[idx])
    }

    /// Calendar date of the newest entry.
    pub fn latest_day(&self) -> Option<NaiveDate> {
        self.entries.last().map(JournalEntry::date)
    }

    /// Entries written on `date`, oldest first.
    pub fn entries_on(&self, date: NaiveDate) -> Vec<&JournalEntry> {
        self.entries.iter().filter(|e| e.date() == date).collect()
    }

    /// Newest-first excerpt of at most `limit` timestamped lines.
    pub fn recent_lines(&self, limit: usize) -> String {
        self.entries
            .iter()
            .rev()
            .take(limit)
            .map(JournalEntry::to_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Oldest-first excerpt of one day's entries.
    pub fn day_lines(&self, date: NaiveDate) -> String {
        self.entries_on(date)
            .into_iter()
            .map(JournalEntry::to_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Time since the journal was started.
    pub fn streak_since_start(&self, now: DateTime<Utc>) -> ElapsedTime {
        ElapsedTime::between(self.created_at, now)
    }
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
