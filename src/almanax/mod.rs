use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// One day of the cached almanax calendar, keyed in the file by `YYYY-MM-DD`.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct AlmanaxDay {
    pub meryde_name: String,
    pub meryde_description: String,
    pub meryde_image: Option<String>,
    pub bonus_type: String,
    pub bonus_description: String,
    #[serde(deserialize_with = "text_or_words")]
    pub offering_name: String,
    pub offering_quantity: u32,
    pub offering_image: Option<String>,
    #[serde(rename = "OfferingURL")]
    pub offering_url: Option<String>,
    pub event_name: Option<String>,
    pub event_description: Option<String>,
    pub event_image: Option<String>,
    pub zodiac_name: String,
    pub date: String,
}

/// Older cache files store the offering name as a list of words.
fn text_or_words<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Name {
        Text(String),
        Words(Vec<String>),
    }

    Ok(match Name::deserialize(deserializer)? {
        Name::Text(text) => text,
        Name::Words(words) => words.join(" "),
    })
}

#[derive(Debug, thiserror::Error)]
pub enum AlmanaxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("almanax cache at {} is not valid JSON: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),
}

#[derive(Debug, Default)]
pub struct Calendar {
    days: BTreeMap<String, AlmanaxDay>,
}

impl Calendar {
    /// Read the cached calendar. A missing file is an empty calendar.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, AlmanaxError> {
        let path = path.as_ref();
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "almanax cache not found");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        Self::from_json(&raw).map_err(|source| AlmanaxError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            days: serde_json::from_str(raw)?,
        })
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Exact date first. The cache covers a single scraped year, so any
    /// other year falls back to the same month and day.
    pub fn lookup(&self, date: NaiveDate) -> Option<&AlmanaxDay> {
        if let Some(day) = self.days.get(&date.format("%Y-%m-%d").to_string()) {
            return Some(day);
        }

        let suffix = date.format("-%m-%d").to_string();
        self.days
            .iter()
            .find(|(key, _)| key.ends_with(&suffix))
            .map(|(_, day)| day)
    }
}

pub fn parse_date(input: &str) -> Result<NaiveDate, AlmanaxError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| AlmanaxError::InvalidDate(input.to_string()))
}
