use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analysis::DeviceAnalysis;
use crate::error::Result;
use crate::traits::{ContentAnalyzer, LabelClassifier};
use crate::types::{ImageReference, LabelSet};

/// Total analyzer calls allowed when the model output does not parse.
pub const ANALYSIS_ATTEMPTS: usize = 2;

/// Labels plus the analyzer's raw output.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub labels: LabelSet,
    pub result: String,
}

/// Runs the label classifier, then feeds its labels to the content analyzer.
///
/// Holds no per-request state; one instance is shared by every request.
#[derive(Clone)]
pub struct AnalysisOrchestrator {
    classifier: Arc<dyn LabelClassifier>,
    analyzer: Arc<dyn ContentAnalyzer>,
}

impl AnalysisOrchestrator {
    pub fn new(classifier: Arc<dyn LabelClassifier>, analyzer: Arc<dyn ContentAnalyzer>) -> Self {
        Self {
            classifier,
            analyzer,
        }
    }

    /// Classify the image and return the labels with the raw model output.
    pub async fn analyze(&self, image: &ImageReference) -> Result<AnalysisOutcome> {
        let start = Instant::now();
        let labels = self.classify(image).await?;
        let result = self.analyzer.analyze(&labels.description()).await?;

        info!(
            classifier = self.classifier.name(),
            analyzer = self.analyzer.name(),
            label_count = labels.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Analysis completed"
        );
        Ok(AnalysisOutcome { labels, result })
    }

    /// Full pipeline producing a validated [`DeviceAnalysis`].
    ///
    /// When the model output does not parse, only the analyzer is called again,
    /// up to [`ANALYSIS_ATTEMPTS`] calls in total. Transport failures are
    /// returned immediately.
    pub async fn analyze_device(
        &self,
        image: &ImageReference,
        image_url: &str,
    ) -> Result<DeviceAnalysis> {
        let outcome = self.analyze(image).await?;
        let description = outcome.labels.description();

        let mut raw = outcome.result;
        let mut attempt = 1;
        loop {
            match DeviceAnalysis::from_model_output(&raw) {
                Ok(analysis) => return Ok(analysis.with_image_url(image_url)),
                Err(e) if attempt < ANALYSIS_ATTEMPTS => {
                    warn!(attempt, error = %e, "Model output rejected, asking again");
                    attempt += 1;
                    raw = self.analyzer.analyze(&description).await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn classify(&self, image: &ImageReference) -> Result<LabelSet> {
        debug!(classifier = self.classifier.name(), image = ?image, "Classifying image");
        let labels = self.classifier.classify(image).await?;
        if labels.is_empty() {
            warn!(classifier = self.classifier.name(), "No labels detected in image");
        }
        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::analysis::fixtures::SAMPLE_ANALYSIS;
    use crate::error::EcoScanError;

    struct StubClassifier {
        labels: Option<Vec<String>>,
        calls: AtomicUsize,
    }

    impl StubClassifier {
        fn ok(labels: &[&str]) -> Self {
            Self {
                labels: Some(labels.iter().map(|l| l.to_string()).collect()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                labels: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LabelClassifier for StubClassifier {
        fn name(&self) -> &str {
            "stub-vision"
        }

        async fn classify(&self, _image: &ImageReference) -> Result<LabelSet> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.labels {
                Some(labels) => Ok(LabelSet::new(labels.clone())),
                None => Err(EcoScanError::upstream("vision", "quota exceeded")),
            }
        }
    }

    struct StubAnalyzer {
        responses: Mutex<VecDeque<Result<String>>>,
        descriptions: Mutex<Vec<String>>,
    }

    impl StubAnalyzer {
        fn with(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                descriptions: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.descriptions.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ContentAnalyzer for StubAnalyzer {
        fn name(&self) -> &str {
            "stub-gemini"
        }

        async fn analyze(&self, description: &str) -> Result<String> {
            self.descriptions.lock().unwrap().push(description.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(SAMPLE_ANALYSIS.to_string()))
        }
    }

    fn image() -> ImageReference {
        ImageReference::Uri("https://example.com/phone.jpg".into())
    }

    #[tokio::test]
    async fn classifier_failure_skips_analyzer() {
        let classifier = Arc::new(StubClassifier::failing());
        let analyzer = Arc::new(StubAnalyzer::with(vec![]));
        let orchestrator = AnalysisOrchestrator::new(classifier.clone(), analyzer.clone());

        let err = orchestrator.analyze(&image()).await.unwrap_err();
        assert_eq!(err.to_string(), "vision error: quota exceeded");
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
        assert_eq!(analyzer.calls(), 0);
    }

    #[tokio::test]
    async fn labels_are_joined_for_analyzer() {
        let classifier = Arc::new(StubClassifier::ok(&["Mobile phone", "Gadget", "Screen"]));
        let analyzer = Arc::new(StubAnalyzer::with(vec![Ok("{\"raw\":true}".into())]));
        let orchestrator = AnalysisOrchestrator::new(classifier, analyzer.clone());

        let outcome = orchestrator.analyze(&image()).await.unwrap();
        assert_eq!(outcome.labels.as_slice(), ["Mobile phone", "Gadget", "Screen"]);
        assert_eq!(outcome.result, "{\"raw\":true}");
        assert_eq!(
            analyzer.descriptions.lock().unwrap().as_slice(),
            ["Mobile phone, Gadget, Screen"]
        );
    }

    #[tokio::test]
    async fn empty_label_set_reaches_analyzer() {
        let classifier = Arc::new(StubClassifier::ok(&[]));
        let analyzer = Arc::new(StubAnalyzer::with(vec![Ok("{}".into())]));
        let orchestrator = AnalysisOrchestrator::new(classifier, analyzer.clone());

        let outcome = orchestrator.analyze(&image()).await.unwrap();
        assert!(outcome.labels.is_empty());
        assert_eq!(outcome.result, "{}");
        assert_eq!(analyzer.descriptions.lock().unwrap().as_slice(), [""]);
    }

    #[tokio::test]
    async fn analyze_device_stamps_image_url() {
        let classifier = Arc::new(StubClassifier::ok(&["Laptop"]));
        let analyzer = Arc::new(StubAnalyzer::with(vec![]));
        let orchestrator = AnalysisOrchestrator::new(classifier, analyzer);

        let analysis = orchestrator
            .analyze_device(&image(), "https://example.com/phone.jpg")
            .await
            .unwrap();
        assert_eq!(analysis.device_info.image_url, "https://example.com/phone.jpg");
        assert_eq!(analysis.device_info.name, "Smartphone");
    }

    #[tokio::test]
    async fn malformed_output_is_retried_once() {
        let classifier = Arc::new(StubClassifier::ok(&["Laptop"]));
        let analyzer = Arc::new(StubAnalyzer::with(vec![
            Ok("Sure! Here is the analysis".into()),
            Ok(SAMPLE_ANALYSIS.into()),
        ]));
        let orchestrator = AnalysisOrchestrator::new(classifier.clone(), analyzer.clone());

        assert!(orchestrator.analyze_device(&image(), "u").await.is_ok());
        assert_eq!(analyzer.calls(), 2);
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_attempt_limit() {
        let classifier = Arc::new(StubClassifier::ok(&["Laptop"]));
        let analyzer = Arc::new(StubAnalyzer::with(vec![
            Ok("not json".into()),
            Ok("still not json".into()),
            Ok(SAMPLE_ANALYSIS.into()),
        ]));
        let orchestrator = AnalysisOrchestrator::new(classifier, analyzer.clone());

        let err = orchestrator.analyze_device(&image(), "u").await.unwrap_err();
        assert!(err.to_string().contains("invalid analysis JSON"));
        assert_eq!(analyzer.calls(), ANALYSIS_ATTEMPTS);
    }

    #[tokio::test]
    async fn transport_failure_is_not_retried() {
        let classifier = Arc::new(StubClassifier::ok(&["Laptop"]));
        let analyzer = Arc::new(StubAnalyzer::with(vec![Err(EcoScanError::upstream(
            "gemini",
            "503 Service Unavailable",
        ))]));
        let orchestrator = AnalysisOrchestrator::new(classifier, analyzer.clone());

        assert!(orchestrator.analyze_device(&image(), "u").await.is_err());
        assert_eq!(analyzer.calls(), 1);
    }
}
