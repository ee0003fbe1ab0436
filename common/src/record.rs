//! Matched record model
//!
//! One row returned by the matching service. Every field is optional at the
//! boundary: `None` means the service did not send the field (or sent `null`),
//! which is displayed differently from an empty string.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Group key used when `date_published` is missing or empty.
pub const UNKNOWN_DATE: &str = "Unknown Date";

/// A matched name entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub court_station: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub cause_no: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name_of_deceased: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub status_at_gp: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub volume_no: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub date_published: Option<String>,
}

impl Record {
    pub fn get(&self, field: RecordField) -> Option<&str> {
        let value = match field {
            RecordField::Id => &self.id,
            RecordField::CourtStation => &self.court_station,
            RecordField::CauseNo => &self.cause_no,
            RecordField::NameOfDeceased => &self.name_of_deceased,
            RecordField::StatusAtGp => &self.status_at_gp,
            RecordField::VolumeNo => &self.volume_no,
            RecordField::DatePublished => &self.date_published,
        };
        value.as_deref()
    }

    /// Field value coerced to a string; absent is `""`.
    pub fn sort_value(&self, field: RecordField) -> &str {
        self.get(field).unwrap_or("")
    }

    /// Date bucket this record belongs to.
    pub fn group_key(&self) -> &str {
        match self.date_published.as_deref() {
            Some(date) if !date.is_empty() => date,
            _ => UNKNOWN_DATE,
        }
    }
}

/// Columns of a record, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    Id,
    CourtStation,
    CauseNo,
    NameOfDeceased,
    StatusAtGp,
    VolumeNo,
    DatePublished,
}

impl RecordField {
    pub const ALL: [RecordField; 7] = [
        RecordField::Id,
        RecordField::CourtStation,
        RecordField::CauseNo,
        RecordField::NameOfDeceased,
        RecordField::StatusAtGp,
        RecordField::VolumeNo,
        RecordField::DatePublished,
    ];

    /// Fields consulted by the search filter. `id` is not searchable.
    pub const SEARCHABLE: [RecordField; 6] = [
        RecordField::CourtStation,
        RecordField::CauseNo,
        RecordField::NameOfDeceased,
        RecordField::StatusAtGp,
        RecordField::VolumeNo,
        RecordField::DatePublished,
    ];

    /// Wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordField::Id => "id",
            RecordField::CourtStation => "court_station",
            RecordField::CauseNo => "cause_no",
            RecordField::NameOfDeceased => "name_of_deceased",
            RecordField::StatusAtGp => "status_at_gp",
            RecordField::VolumeNo => "volume_no",
            RecordField::DatePublished => "date_published",
        }
    }

    /// Column header text.
    pub fn label(&self) -> &'static str {
        match self {
            RecordField::Id => "No.",
            RecordField::CourtStation => "Court Station",
            RecordField::CauseNo => "Cause No.",
            RecordField::NameOfDeceased => "Name of Deceased",
            RecordField::StatusAtGp => "Status at G.P.",
            RecordField::VolumeNo => "Volume No.",
            RecordField::DatePublished => "Date Published",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        RecordField::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == normalized)
            .ok_or_else(|| {
                let names: Vec<&str> = RecordField::ALL.iter().map(|f| f.as_str()).collect();
                format!("Unknown field: {}. Use one of {}", s, names.join(", "))
            })
    }
}

/// Accepts strings, numbers and booleans; `null` becomes `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}
