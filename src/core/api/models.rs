//! Wire and domain types for the document analysis API.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Documents per list page. The backend's default `limit` matches.
pub const PAGE_SIZE: u64 = 10;

/// Number of pages needed to show `total` documents.
pub fn total_pages(total: u64) -> u64 {
    total.div_ceil(PAGE_SIZE)
}

// ── Identifiers ─────────────────────────────────────────────────────────────

/// Opaque, stable document identifier. The backend sends Mongo ObjectIds as
/// strings, but numeric ids are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert a raw JSON value into an id. Null, empty strings and
    /// non-scalar values are rejected.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        DocumentId::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid document id: {value}")))
    }
}

// ── Timestamps ──────────────────────────────────────────────────────────────

/// Parse the backend's `isoformat()` output. Naive timestamps are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => parse_timestamp(&s),
        _ => None,
    })
}

// ── Documents ───────────────────────────────────────────────────────────────

/// One entry of a document list page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DocumentSummary {
    pub id: DocumentId,
    #[serde(default)]
    pub filename: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub upload_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A fully fetched document with its (optional) analysis.
///
/// Only `id` is strictly typed. The detail sections interpret the other
/// fields themselves, so a wrong-typed `text` or analysis field faults its
/// own section instead of the whole document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub filename: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub upload_date: Option<DateTime<Utc>>,
    /// Extracted text; absent when processing failed.
    #[serde(default)]
    pub text: Option<Value>,
    #[serde(default, deserialize_with = "lenient_analysis")]
    pub analysis: Option<Analysis>,
}

impl Document {
    /// Non-blank summary, or an error if the field is not text.
    pub fn summary(&self) -> Result<Option<&str>, String> {
        let raw = self.analysis.as_ref().and_then(|a| a.summary.as_ref());
        non_blank_str(raw, "summary")
    }

    /// Non-blank extracted text, or an error if the field is not text.
    pub fn text(&self) -> Result<Option<&str>, String> {
        non_blank_str(self.text.as_ref(), "text")
    }

    pub fn risks(&self) -> Result<Option<&[Value]>, String> {
        match self.analysis.as_ref().and_then(|a| a.risks.as_ref()) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(other) => Err(format!("risks is not a list: {other}")),
        }
    }

    pub fn entities(&self) -> Result<Option<&Map<String, Value>>, String> {
        match self.analysis.as_ref().and_then(|a| a.entities.as_ref()) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(format!("entities is not a mapping: {other}")),
        }
    }
}

fn non_blank_str<'a>(raw: Option<&'a Value>, field: &str) -> Result<Option<&'a str>, String> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(format!("{field} is not text: {other}")),
    }
}

/// Backend analysis result. Every field is independently optional and kept
/// as raw JSON until its section reads it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub summary: Option<Value>,
    #[serde(default)]
    pub risks: Option<Value>,
    #[serde(default)]
    pub entities: Option<Value>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// An `analysis` that is not an object is handed to every analysis section
/// as-is, so each of them reports the fault.
fn lenient_analysis<'de, D>(deserializer: D) -> Result<Option<Analysis>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(Value::Null) => None,
        Some(Value::Object(mut map)) => Some(Analysis {
            summary: map.remove("summary"),
            risks: map.remove("risks"),
            entities: map.remove("entities"),
        }),
        Some(other) => Some(Analysis {
            summary: Some(other.clone()),
            risks: Some(other.clone()),
            entities: Some(other),
        }),
    })
}

// ── Risks ───────────────────────────────────────────────────────────────────

/// Risk severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Unknown,
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" | "minor" => Self::Low,
            "medium" | "moderate" => Self::Medium,
            "high" | "critical" | "severe" => Self::High,
            _ => Self::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// A single identified risk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskRecord {
    pub category: String,
    pub severity: Severity,
    pub description: String,
}

impl RiskRecord {
    /// Interpret one raw risk entry.
    ///
    /// The backend emits plain sentences ("Missing Governing Law clause",
    /// "Ambiguous term: reasonable", "Potential risk in liability clause");
    /// structured `{category|type, severity?, description}` objects are
    /// accepted as well.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Ok(Self::from_sentence(s.trim())),
            Value::Object(map) => {
                let description = map
                    .get("description")
                    .and_then(Value::as_str)
                    .filter(|d| !d.trim().is_empty())
                    .ok_or_else(|| format!("risk record without description: {value}"))?;
                let category = map
                    .get("category")
                    .or_else(|| map.get("type"))
                    .and_then(Value::as_str)
                    .filter(|c| !c.trim().is_empty())
                    .ok_or_else(|| format!("risk record without category: {value}"))?;
                let severity = map
                    .get("severity")
                    .and_then(Value::as_str)
                    .map(Severity::parse)
                    .unwrap_or(Severity::Unknown);
                Ok(Self {
                    category: category.trim().to_string(),
                    severity,
                    description: description.trim().to_string(),
                })
            }
            other => Err(format!("unsupported risk record: {other}")),
        }
    }

    fn from_sentence(sentence: &str) -> Self {
        let lower = sentence.to_ascii_lowercase();
        let (category, severity) = if let Some(rest) = lower.strip_prefix("missing ") {
            let clause = rest.trim_end_matches(" clause");
            (title_case(clause), Severity::High)
        } else if lower.starts_with("ambiguous term") {
            ("Ambiguous Terms".to_string(), Severity::Low)
        } else if let Some(rest) = lower.strip_prefix("potential risk in ") {
            let clause = rest.trim_end_matches(" clause");
            (title_case(clause), Severity::Medium)
        } else {
            ("General".to_string(), Severity::Unknown)
        };
        Self {
            category,
            severity,
            description: sentence.to_string(),
        }
    }
}

fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ── Uploads ─────────────────────────────────────────────────────────────────

/// A local file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: bytes::Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<bytes::Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, keeping only its final path component as the name.
    pub async fn from_path(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(file_name, bytes))
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lowercase extension without the dot.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .filter(|e| !e.is_empty())
    }

    pub fn mime_type(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("pdf") => "application/pdf",
            Some("docx") => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Some("doc") => "application/msword",
            Some("txt") => "text/plain",
            _ => "application/octet-stream",
        }
    }
}

// ── Responses ───────────────────────────────────────────────────────────────

/// One page of documents plus the total across all pages.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPage {
    pub documents: Vec<DocumentSummary>,
    pub total: u64,
}

impl DocumentPage {
    pub fn total_pages(&self) -> u64 {
        total_pages(self.total)
    }
}

/// `GET /documents?page=n` body as sent on the wire.
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse {
    pub data: Option<Vec<DocumentSummary>>,
    pub pagination: Option<PaginationWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PaginationWire {
    pub total: Option<u64>,
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub id: DocumentId,
    pub filename: Option<String>,
    pub status: Option<String>,
}

/// Acknowledgement of a successful delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pub id: DocumentId,
}

/// Backend root endpoint reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub message: String,
}

/// Error body shape used by the backend's error handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Parse a response body, returning `None` if it is not JSON.
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .map(|mut b| {
                b.message = b.message.filter(|m| !m.trim().is_empty());
                b
            })
    }
}
