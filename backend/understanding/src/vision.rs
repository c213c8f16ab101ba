//! Vision labeling: rank what an image shows using Google Cloud Vision
//! `LABEL_DETECTION`.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use ecoscan_core::{EcoScanError, ImageReference, LabelClassifier, LabelSelection, LabelSet, Result};

use crate::{ErrorBody, transport_error};

/// Number of candidate labels requested per image.
pub const MAX_LABELS: u32 = 10;

const SERVICE: &str = "vision";

/// Google Cloud Vision label classifier.
pub struct VisionLabelClassifier {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    selection: LabelSelection,
}

impl VisionLabelClassifier {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: "https://vision.googleapis.com".to_string(),
            selection: LabelSelection::All,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_selection(mut self, selection: LabelSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| EcoScanError::config("Missing GOOGLE_VISION_API_KEY environment variable"))
    }
}

/// JSON body for `images:annotate`.
pub fn annotate_request(image: &ImageReference) -> serde_json::Value {
    let image = match image {
        ImageReference::Uri(uri) => serde_json::json!({ "source": { "imageUri": uri } }),
        ImageReference::Bytes(bytes) => serde_json::json!({ "content": STANDARD.encode(bytes) }),
    };
    serde_json::json!({
        "requests": [{
            "image": image,
            "features": [{ "type": "LABEL_DETECTION", "maxResults": MAX_LABELS }]
        }]
    })
}

#[derive(Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    label_annotations: Vec<LabelAnnotation>,
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct LabelAnnotation {
    description: String,
}

/// Turn an `images:annotate` reply into labels, in rank order.
pub fn parse_annotate_response(
    status: u16,
    body: &str,
    selection: LabelSelection,
) -> Result<LabelSet> {
    let parsed: Option<AnnotateResponse> = serde_json::from_str(body).ok();
    let success = (200..300).contains(&status);

    let parsed = match parsed {
        Some(parsed) if success && parsed.error.is_none() => parsed,
        Some(AnnotateResponse { error: Some(error), .. }) => {
            return Err(EcoScanError::upstream(SERVICE, error.message));
        }
        _ if !success => {
            return Err(EcoScanError::upstream(SERVICE, format!("HTTP {status}: {body}")));
        }
        _ => {
            return Err(EcoScanError::upstream(SERVICE, "unreadable annotate response"));
        }
    };

    let first = parsed.responses.into_iter().next();
    if let Some(error) = first.as_ref().and_then(|r| r.error.as_ref()) {
        return Err(EcoScanError::upstream(SERVICE, error.message.clone()));
    }
    let labels: Vec<String> = first
        .map(|r| r.label_annotations.into_iter().map(|l| l.description).collect())
        .unwrap_or_default();

    Ok(LabelSet::new(selection.apply(labels)))
}

#[async_trait]
impl LabelClassifier for VisionLabelClassifier {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn classify(&self, image: &ImageReference) -> Result<LabelSet> {
        let api_key = self.api_key()?;
        info!(remote = image.is_remote(), "[Vision] Requesting labels");

        let resp = self
            .client
            .post(format!("{}/v1/images:annotate", self.base_url))
            .query(&[("key", api_key)])
            .json(&annotate_request(image))
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| transport_error(SERVICE, e))?;
        let labels = parse_annotate_response(status, &body, self.selection)?;
        debug!(labels = ?labels.as_slice(), "[Vision] Labels received");
        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEN_LABELS: &str = r#"{"responses": [{"labelAnnotations": [
        {"description": "Mobile phone", "score": 0.97},
        {"description": "Gadget", "score": 0.95},
        {"description": "Communication Device", "score": 0.93},
        {"description": "Portable communications device", "score": 0.92},
        {"description": "Smartphone", "score": 0.90},
        {"description": "Electronic device", "score": 0.88},
        {"description": "Telephony", "score": 0.85},
        {"description": "Technology", "score": 0.80},
        {"description": "Feature phone", "score": 0.70},
        {"description": "Screen", "score": 0.65}
    ]}]}"#;

    #[test]
    fn request_uses_image_uri_for_remote() {
        let body = annotate_request(&ImageReference::Uri("https://x/y.jpg".into()));
        assert_eq!(body["requests"][0]["image"]["source"]["imageUri"], "https://x/y.jpg");
        assert_eq!(body["requests"][0]["features"][0]["type"], "LABEL_DETECTION");
        assert_eq!(body["requests"][0]["features"][0]["maxResults"], 10);
    }

    #[test]
    fn request_inlines_bytes_as_base64() {
        let body = annotate_request(&ImageReference::Bytes(b"hello".to_vec()));
        assert_eq!(body["requests"][0]["image"]["content"], "aGVsbG8=");
    }

    #[test]
    fn returns_all_labels_in_rank_order() {
        let labels = parse_annotate_response(200, TEN_LABELS, LabelSelection::All).unwrap();
        assert_eq!(labels.len(), 10);
        assert_eq!(labels.as_slice()[0], "Mobile phone");
        assert_eq!(labels.as_slice()[9], "Screen");
    }

    #[test]
    fn second_half_selection() {
        let labels = parse_annotate_response(200, TEN_LABELS, LabelSelection::SecondHalf).unwrap();
        assert_eq!(labels.len(), 5);
        assert_eq!(labels.as_slice()[0], "Electronic device");
    }

    #[test]
    fn no_annotations_yields_empty_set() {
        let labels = parse_annotate_response(200, r#"{"responses": [{}]}"#, LabelSelection::All).unwrap();
        assert!(labels.is_empty());
    }

    #[test]
    fn top_level_error_is_upstream() {
        let body = r#"{"error": {"code": 403, "message": "API key not valid."}}"#;
        let err = parse_annotate_response(403, body, LabelSelection::All).unwrap_err();
        assert_eq!(err.to_string(), "vision error: API key not valid.");
    }

    #[test]
    fn per_image_error_is_upstream() {
        let body = r#"{"responses": [{"error": {"code": 7, "message": "Image fetch denied."}}]}"#;
        let err = parse_annotate_response(200, body, LabelSelection::All).unwrap_err();
        assert!(err.to_string().contains("Image fetch denied."));
    }

    #[test]
    fn non_success_without_json_is_upstream() {
        let err = parse_annotate_response(502, "Bad Gateway", LabelSelection::All).unwrap_err();
        assert_eq!(err.to_string(), "vision error: HTTP 502: Bad Gateway");
    }

    #[tokio::test]
    async fn missing_key_is_config_error() {
        let classifier = VisionLabelClassifier::new(None);
        let err = classifier
            .classify(&ImageReference::Uri("https://x/y.jpg".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, EcoScanError::Config(_)));
    }
}
