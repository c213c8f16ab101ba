use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::DeviceAnalysis;
use crate::error::{EcoScanError, Result};

/// An image submitted for analysis: either a remote URI or the raw bytes.
#[derive(Clone, PartialEq, Eq)]
pub enum ImageReference {
    Uri(String),
    Bytes(Vec<u8>),
}

impl ImageReference {
    /// Parse the `image_url` field of a request.
    ///
    /// `http(s)://` URLs are forwarded as-is; `data:<mime>;base64,<payload>` URLs
    /// are decoded into raw bytes. Anything else is rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(EcoScanError::validation("Missing image_url"));
        }
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Ok(Self::Uri(raw.to_string()));
        }
        if let Some(rest) = raw.strip_prefix("data:") {
            let (meta, payload) = rest
                .split_once(',')
                .ok_or_else(|| EcoScanError::validation("Malformed data URL in image_url"))?;
            if !meta.ends_with(";base64") {
                return Err(EcoScanError::validation(
                    "Only base64-encoded data URLs are supported",
                ));
            }
            let bytes = STANDARD
                .decode(payload)
                .map_err(|e| EcoScanError::validation(format!("Invalid base64 image payload: {e}")))?;
            return Ok(Self::Bytes(bytes));
        }
        Err(EcoScanError::validation(
            "image_url must be an http(s) URL or a base64 data URL",
        ))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Uri(_))
    }
}

impl fmt::Debug for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uri(uri) => f.debug_tuple("Uri").field(uri).finish(),
            Self::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
        }
    }
}

/// Which of the ranked labels returned by the classifier are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSelection {
    /// Every requested label, in rank order.
    #[default]
    All,
    /// Labels from position `len / 2` onwards. Kept only for compatibility with
    /// an older deployment that dropped the most generic top labels.
    SecondHalf,
}

impl LabelSelection {
    pub fn apply(self, labels: Vec<String>) -> Vec<String> {
        match self {
            Self::All => labels,
            Self::SecondHalf => {
                let half = labels.len() / 2;
                labels.into_iter().skip(half).collect()
            }
        }
    }
}

impl FromStr for LabelSelection {
    type Err = EcoScanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "second_half" | "second-half" => Ok(Self::SecondHalf),
            other => Err(EcoScanError::config(format!(
                "unknown label selection '{other}' (expected 'all' or 'second_half')"
            ))),
        }
    }
}

/// Ordered labels; index 0 is the classifier's most confident label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(Vec<String>);

impl LabelSet {
    pub fn new(labels: Vec<String>) -> Self {
        Self(labels)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Comma-joined description handed to the content analyzer.
    pub fn description(&self) -> String {
        self.0.join(", ")
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for LabelSet {
    fn from(labels: Vec<String>) -> Self {
        Self(labels)
    }
}

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Place rating: the upstream score, or the `"N/A"` sentinel when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rating {
    Score(f64),
    Unrated(String),
}

impl Rating {
    pub const UNRATED: &'static str = "N/A";

    pub fn from_option(score: Option<f64>) -> Self {
        match score {
            Some(score) => Self::Score(score),
            None => Self::Unrated(Self::UNRATED.to_string()),
        }
    }
}

/// A nearby recycler, annotated for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecyclerEntry {
    pub name: String,
    pub address: String,
    pub rating: Rating,
    /// `"<km> km"` with one decimal, or empty when the place has no geometry.
    pub distance: String,
    pub thumbnail: String,
    pub maps_url: String,
}

/// A persisted analysis document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDevice {
    pub id: Uuid,
    pub analysis: DeviceAnalysis,
    pub created_at: DateTime<Utc>,
}
