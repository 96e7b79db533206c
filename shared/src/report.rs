use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use crate::event::ReportId;
use crate::geo::Coordinate;

/// Label shown when a report carries no status at all.
pub const MISSING_STATUS_LABEL: &str = "Sin estado";

/// Canonical two-valued report status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Open,
    Closed,
}

/// Normalized input tokens accepted for each canonical status.
const STATUS_TOKENS: &[(&str, ReportStatus)] = &[
    ("open", ReportStatus::Open),
    ("abierto", ReportStatus::Open),
    ("closed", ReportStatus::Closed),
    ("cerrado", ReportStatus::Closed),
];

impl ReportStatus {
    /// Maps free-form status text onto a canonical status.
    ///
    /// Matching ignores surrounding whitespace, case and Latin diacritics.
    /// Returns `None` for anything outside the token table.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_token(raw);
        STATUS_TOKENS
            .iter()
            .find(|(token, _)| *token == normalized)
            .map(|(_, status)| *status)
    }

    /// Wire form used when submitting a report.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Abierto",
            Self::Closed => "Cerrado",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display text for a raw status: the canonical label when recognised,
/// the raw text verbatim otherwise.
#[must_use]
pub fn status_label(raw: Option<&str>) -> String {
    match raw {
        Some(text) => ReportStatus::parse(text)
            .map_or_else(|| text.to_string(), |status| status.label().to_string()),
        None => MISSING_STATUS_LABEL.to_string(),
    }
}

fn normalize_token(raw: &str) -> String {
    raw.trim().chars().flat_map(char::to_lowercase).map(fold_diacritic).collect()
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

/// Status filter offered by the map screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Open,
    Closed,
}

impl StatusFilter {
    pub const ALL: [Self; 3] = [Self::All, Self::Open, Self::Closed];

    #[must_use]
    pub fn matches(self, raw_status: Option<&str>) -> bool {
        let wanted = match self {
            Self::All => return true,
            Self::Open => ReportStatus::Open,
            Self::Closed => ReportStatus::Closed,
        };
        raw_status.and_then(ReportStatus::parse) == Some(wanted)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "TODOS",
            Self::Open => "ABIERTOS",
            Self::Closed => "CERRADOS",
        }
    }

    /// Prev/next arrows are only offered when open reports are visible.
    #[must_use]
    pub const fn allows_navigation(self) -> bool {
        matches!(self, Self::All | Self::Open)
    }
}

/// A report exactly as the API returned it.
///
/// Every field is optional and loosely typed; nothing is validated until a
/// view is derived from it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawReport {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default)]
    pub latitude: Option<Value>,
    #[serde(default)]
    pub longitude: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
}

impl RawReport {
    /// Converts one element of the API array. Elements that are not objects
    /// are kept as empty records so they still count in the raw list.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Canonical string form of the id, falling back to the list position.
    #[must_use]
    pub fn canonical_id(&self, index: usize) -> ReportId {
        match &self.id {
            Some(Value::String(s)) => ReportId::new(s.clone()),
            Some(Value::Number(n)) => ReportId::new(canonical_number(n)),
            Some(Value::Bool(b)) => ReportId::new(b.to_string()),
            _ => ReportId::new(format!("#{index}")),
        }
    }

    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        let lat = numeric(self.latitude.as_ref()?)?;
        let lng = numeric(self.longitude.as_ref()?)?;
        Coordinate::new(lat, lng).ok()
    }

    #[must_use]
    pub fn canonical_status(&self) -> Option<ReportStatus> {
        self.status.as_deref().and_then(ReportStatus::parse)
    }
}

fn canonical_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        #[allow(clippy::cast_possible_truncation)]
        Some(f) if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => (f as i64).to_string(),
        _ => n.to_string(),
    }
}

fn numeric(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    parsed.is_finite().then_some(parsed)
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// A report that survived filtering: string id, numeric coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub coordinate: Coordinate,
    pub status: Option<String>,
}

impl Report {
    #[must_use]
    pub fn canonical_status(&self) -> Option<ReportStatus> {
        self.status.as_deref().and_then(ReportStatus::parse)
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.canonical_status() == Some(ReportStatus::Open)
    }

    #[must_use]
    pub fn status_label(&self) -> String {
        status_label(self.status.as_deref())
    }

    /// Title with surrounding whitespace removed, `None` when blank.
    #[must_use]
    pub fn display_title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Body of `POST /reports`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReport {
    pub title: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: ReportStatus,
}
