//! Structured e-waste assessment of a single device.
//!
//! The generative model is asked to answer with exactly this shape; model output
//! is turned into a [`DeviceAnalysis`] through [`DeviceAnalysis::from_model_output`].

use serde::{Deserialize, Serialize};

use crate::error::{EcoScanError, Result};

/// Service name used for errors raised while interpreting model output.
pub const ANALYZER_SERVICE: &str = "gemini";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceAnalysis {
    pub device_info: DeviceInfo,
    pub eco_score: EcoScore,
    pub components: Vec<Component>,
    pub toxic_components: Vec<ToxicComponent>,
    pub recommendations: Recommendations,
    pub disposal_guidelines: DisposalGuidelines,
    pub ai_summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub name: String,
    pub estimated_age: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub image_url: String,
}

/// Sub-scores on a 0–100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcoScore {
    pub score: f64,
    pub repairability: f64,
    pub recyclability: f64,
    pub toxicity: f64,
    pub resale_value: f64,
    pub environmental_impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    pub material: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(alias = "low", alias = "LOW")]
    Low,
    #[serde(alias = "moderate", alias = "MODERATE", alias = "Medium", alias = "medium")]
    Moderate,
    #[serde(alias = "high", alias = "HIGH")]
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToxicComponent {
    pub name: String,
    pub risk_level: RiskLevel,
    pub found_in: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub repair: bool,
    pub reuse: bool,
    pub recycle: bool,
    pub repair_notes: String,
    pub reuse_notes: String,
    pub recycle_notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisposalGuidelines {
    pub battery: String,
    pub plastic: String,
    pub general: String,
}

/// Badges shown next to an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Highlight {
    #[serde(rename = "High Recyclability")]
    HighRecyclability,
    #[serde(rename = "Repair-Friendly")]
    RepairFriendly,
    #[serde(rename = "Smart Suggestions")]
    SmartSuggestions,
}

const HIGH_RECYCLABILITY: f64 = 80.0;
const REPAIR_FRIENDLY: f64 = 70.0;

impl DeviceAnalysis {
    /// Parse and validate the raw text produced by the content analyzer.
    ///
    /// Accepts output wrapped in a Markdown code fence.
    pub fn from_model_output(raw: &str) -> Result<Self> {
        let body = strip_code_fence(raw);
        if body.is_empty() {
            return Err(EcoScanError::upstream(
                ANALYZER_SERVICE,
                "model returned an empty analysis",
            ));
        }
        let analysis: DeviceAnalysis = serde_json::from_str(body).map_err(|e| {
            EcoScanError::upstream(ANALYZER_SERVICE, format!("invalid analysis JSON: {e}"))
        })?;
        analysis.validate()?;
        Ok(analysis)
    }

    /// Check the numeric ranges serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let s = &self.eco_score;
        let scores = [
            ("eco_score.score", s.score),
            ("eco_score.repairability", s.repairability),
            ("eco_score.recyclability", s.recyclability),
            ("eco_score.toxicity", s.toxicity),
            ("eco_score.resale_value", s.resale_value),
            ("eco_score.environmental_impact", s.environmental_impact),
        ];
        for (path, value) in scores {
            check_percent(path, value)?;
        }
        for (i, component) in self.components.iter().enumerate() {
            check_percent(&format!("components[{i}].percentage"), component.percentage)?;
        }
        Ok(())
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.device_info.image_url = image_url.into();
        self
    }

    pub fn highlights(&self) -> Vec<Highlight> {
        let mut out = Vec::new();
        if self.eco_score.recyclability >= HIGH_RECYCLABILITY {
            out.push(Highlight::HighRecyclability);
        }
        if self.eco_score.repairability >= REPAIR_FRIENDLY {
            out.push(Highlight::RepairFriendly);
        }
        out.push(Highlight::SmartSuggestions);
        out
    }
}

fn check_percent(path: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(EcoScanError::upstream(
            ANALYZER_SERVICE,
            format!("{path} must be within 0-100, got {value}"),
        ))
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the info string ("json") on the opening fence line
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
pub(crate) mod fixtures {
    pub const SAMPLE_ANALYSIS: &str = r#"{
        "device_info": {"name": "Smartphone", "estimated_age": "3-4 years", "type": "Mobile phone", "image_url": ""},
        "eco_score": {"score": 62, "repairability": 72, "recyclability": 85, "toxicity": 40, "resale_value": 55, "environmental_impact": 60},
        "components": [
            {"name": "Display", "material": "Glass", "percentage": 25},
            {"name": "Battery", "material": "Lithium-ion", "percentage": 20.5}
        ],
        "toxic_components": [
            {"name": "Lead", "risk_level": "Moderate", "found_in": "Solder"}
        ],
        "recommendations": {
            "repair": true, "reuse": true, "recycle": false,
            "repair_notes": "Replace the battery.", "reuse_notes": "Donate it.", "recycle_notes": "Not yet."
        },
        "disposal_guidelines": {"battery": "Drop-off point.", "plastic": "Sort.", "general": "Certified recycler."},
        "ai_summary": "A mid-life smartphone with good repair options."
    }"#;
}
