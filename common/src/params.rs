//! Submission parameters and the `POST /match` response shape.

use crate::record::Record;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Remote matching strategy. Opaque to the client beyond parameter passing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Exact match after alias normalisation
    Exact,
    /// Order-insensitive token match
    #[default]
    Tokens,
    /// Levenshtein similarity, gated by the threshold
    Fuzzy,
}

impl MatchMode {
    pub const ALL: [MatchMode; 3] = [MatchMode::Exact, MatchMode::Tokens, MatchMode::Fuzzy];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Exact => "exact",
            MatchMode::Tokens => "tokens",
            MatchMode::Fuzzy => "fuzzy",
        }
    }

    /// Selector label.
    pub fn label(&self) -> &'static str {
        match self {
            MatchMode::Exact => "Exact (alias-normalized)",
            MatchMode::Tokens => "Tokens (order-insensitive)",
            MatchMode::Fuzzy => "Fuzzy (Levenshtein)",
        }
    }

    pub fn uses_threshold(&self) -> bool {
        matches!(self, MatchMode::Fuzzy)
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(MatchMode::Exact),
            "tokens" | "token" => Ok(MatchMode::Tokens),
            "fuzzy" => Ok(MatchMode::Fuzzy),
            _ => Err(format!("Unknown mode: {}. Use exact, tokens, or fuzzy", s)),
        }
    }
}

/// Fuzzy similarity cutoff in `[0.50, 0.99]`, kept on the 0.01 slider step.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Threshold(f64);

impl Threshold {
    pub const MIN: f64 = 0.5;
    pub const MAX: f64 = 0.99;
    pub const DEFAULT: f64 = 0.85;

    pub fn new(value: f64) -> Result<Self, String> {
        if !value.is_finite() || value < Self::MIN || value > Self::MAX {
            return Err(format!(
                "Threshold {} is out of range ({:.2}..={:.2})",
                value,
                Self::MIN,
                Self::MAX
            ));
        }
        Ok(Threshold((value * 100.0).round() / 100.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Threshold(Self::DEFAULT)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Threshold {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| format!("Invalid threshold: {}", s))?;
        Threshold::new(value)
    }
}

impl<'de> Deserialize<'de> for Threshold {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Threshold::new(value).map_err(serde::de::Error::custom)
    }
}

/// Parameters sent alongside the two files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionParameters {
    pub mode: MatchMode,
    pub threshold: Threshold,
}

impl SubmissionParameters {
    pub fn new(mode: MatchMode, threshold: Threshold) -> Self {
        Self { mode, threshold }
    }

    /// Request-target query pairs. The threshold is always sent; the service
    /// ignores it outside fuzzy mode.
    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        [
            ("mode", self.mode.as_str().to_string()),
            ("threshold", self.threshold.to_string()),
        ]
    }

    pub fn query_string(&self) -> String {
        self.query_pairs()
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Snapshot of the latest successful submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResultSummary {
    pub mode: Option<String>,
    #[serde(deserialize_with = "number_or_string")]
    pub threshold: Option<f64>,
    #[serde(deserialize_with = "count")]
    pub total_gazette: Option<u64>,
    #[serde(deserialize_with = "count")]
    pub total_excel: Option<u64>,
    #[serde(deserialize_with = "count")]
    pub matched_count: Option<u64>,
    #[serde(deserialize_with = "count")]
    pub inserted_count: Option<u64>,
}

/// Body of a successful `POST /match`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    #[serde(default, deserialize_with = "rows")]
    pub matched_rows: Vec<Record>,
    #[serde(flatten)]
    pub summary: ResultSummary,
}

/// Body of a non-2xx response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RemoteErrorBody {
    pub error: Option<String>,
}

impl RemoteErrorBody {
    /// Extract the `error` message from a raw response body, if it has one.
    pub fn message_from(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<RemoteErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.trim().is_empty())
    }
}

fn number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number_or_string(deserializer)?
        .filter(|v| *v >= 0.0)
        .map(|v| v as u64))
}

/// `matchedRows: null` is treated like a missing list.
fn rows<'de, D>(deserializer: D) -> Result<Vec<Record>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Record>>::deserialize(deserializer)?.unwrap_or_default())
}
