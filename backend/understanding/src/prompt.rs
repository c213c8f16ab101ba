//! Prompt sent to the generative model for a device assessment.

/// Skeleton of the JSON document the model must return. Field names and
/// nesting match `ecoscan_core::DeviceAnalysis`.
pub const ANALYSIS_SCHEMA: &str = r#"{
  "device_info": {
    "name": "string",
    "estimated_age": "string",
    "type": "string",
    "image_url": "string"
  },
  "eco_score": {
    "score": 0,
    "repairability": 0,
    "recyclability": 0,
    "toxicity": 0,
    "resale_value": 0,
    "environmental_impact": 0
  },
  "components": [
    { "name": "string", "material": "string", "percentage": 0 }
  ],
  "toxic_components": [
    { "name": "string", "risk_level": "Low | Moderate | High", "found_in": "string" }
  ],
  "recommendations": {
    "repair": true,
    "reuse": true,
    "recycle": true,
    "repair_notes": "string",
    "reuse_notes": "string",
    "recycle_notes": "string"
  },
  "disposal_guidelines": {
    "battery": "string",
    "plastic": "string",
    "general": "string"
  },
  "ai_summary": "string"
}"#;

/// Build the analysis prompt for a device description (usually the
/// comma-joined image labels).
pub fn analysis_prompt(description: &str) -> String {
    format!(
        "You are an expert in electronic waste, device repair and material recovery.\n\
         An image of an electronic device was classified with these labels: {description}.\n\
         Identify the most likely device and produce an e-waste analysis.\n\
         \n\
         Rules:\n\
         - Respond with a single JSON object and nothing else: no Markdown, no commentary.\n\
         - Use exactly the fields of the schema below; every field is required.\n\
         - Every eco_score value and every component percentage is a number from 0 to 100.\n\
         - risk_level is one of \"Low\", \"Moderate\" or \"High\".\n\
         - Leave device_info.image_url as an empty string.\n\
         \n\
         Schema:\n{ANALYSIS_SCHEMA}\n"
    )
}
