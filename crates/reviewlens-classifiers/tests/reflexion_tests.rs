//! Integration tests for the audit/reflexion protocol


use mock_backends::{FailingBackend, ScriptedBackend};
use reviewlens_classifiers::{
    Classifier, ClassifierConfig, PromptTemplate, ReflexionClassifier, RetryPolicy,
};
use reviewlens_core::{ClassificationOutcome, Error, TaxonomyLabel};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const MODEL: &str = "models/gemini-2.5-flash";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("reviewlens=debug")
        .with_test_writer()
        .try_init();
}

fn classifier(backend: Arc<dyn reviewlens_classifiers::GenerativeBackend>) -> ReflexionClassifier {
    ReflexionClassifier::new(backend, MODEL).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_two_stage_success_on_first_attempt() {
    init_tracing();
    let backend = Arc::new(
        ScriptedBackend::new().then_classify(&["Fragrance", "Price"], &["Fragrance"]),
    );
    let classifier = classifier(backend.clone());

    let start = Instant::now();
    let result = classifier.classify("Smells lovely").await;

    assert_eq!(result.factors, vec!["Fragrance"]);
    assert_eq!(result.attempts, 1);
    assert_eq!(result.outcome, ClassificationOutcome::Succeeded);
    assert_eq!(backend.call_count(), 2);
    assert_eq!(start.elapsed(), Duration::ZERO);

    let prompts = backend.prompts();
    assert!(prompts[0].contains("\"Smells lovely\""));
    assert!(prompts[1].contains("Audit: Positive overall"));
    assert!(prompts[1].contains(r#"Initial Labels: ["Fragrance","Price"]"#));
}

#[tokio::test(start_paused = true)]
async fn test_exhaustion_returns_empty_within_backoff_bound() {
    init_tracing();
    let backend = Arc::new(FailingBackend::new());
    let classifier = classifier(backend.clone());

    let start = Instant::now();
    let result = classifier.classify("Great product").await;
    let elapsed = start.elapsed();

    assert!(result.factors.is_empty());
    assert_eq!(result.outcome, ClassificationOutcome::Exhausted);
    assert_eq!(result.attempts, 7);
    // Stage 1 fails every time, so stage 2 is never reached.
    assert_eq!(backend.call_count(), 7);
    // 2 + 4 + ... + 128: the last failure backs off before giving up.
    assert_eq!(elapsed, Duration::from_secs(254));
    assert_eq!(elapsed, classifier.retry_policy().max_total_backoff());
}

#[tokio::test(start_paused = true)]
async fn test_timeouts_are_retried() {
    let backend = Arc::new(FailingBackend::timing_out());
    let classifier = classifier(backend.clone())
        .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(10)));

    let start = Instant::now();
    let result = classifier.classify("Great product").await;

    assert!(result.factors.is_empty());
    assert_eq!(backend.call_count(), 3);
    // 20ms + 40ms + 80ms
    assert_eq!(start.elapsed(), Duration::from_millis(140));
}

#[tokio::test(start_paused = true)]
async fn test_malformed_audit_retries_after_backoff() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .then_respond("Sure! Here are the labels: Price")
            .then_classify(&["Price"], &["Price"]),
    );
    let classifier = classifier(backend.clone());

    let start = Instant::now();
    let result = classifier.classify("Cheap and cheerful").await;

    assert_eq!(result.factors, vec!["Price"]);
    assert_eq!(result.attempts, 2);
    assert_eq!(backend.call_count(), 3);
    assert!(start.elapsed() >= Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_reflexion_failure_restarts_both_stages() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .then_respond(r#"{"audit": "first", "factors": ["Packaging"]}"#)
            .then_fail(Error::backend("429 Too Many Requests"))
            .then_classify(&["Packaging"], &["Packaging"]),
    );
    let classifier = classifier(backend.clone());

    let result = classifier.classify("Pump broke").await;

    assert_eq!(result.factors, vec!["Packaging"]);
    assert_eq!(result.attempts, 2);
    assert_eq!(backend.call_count(), 4);
    assert_eq!(backend.remaining(), 0);

    // The retry starts over with a fresh audit prompt.
    let prompts = backend.prompts();
    assert!(prompts[2].contains("Senior Consumer Insights Analyst"));
}

#[tokio::test(start_paused = true)]
async fn test_bare_array_reflexion_and_fenced_audit() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .then_respond("```json\n{\"audit\": \"Mixed\", \"factors\": [\"Efficacy\", \"Vibes\"]}\n```")
            .then_respond(r#"["Efficacy", "Vibes"]"#),
    );
    let classifier = classifier(backend.clone());

    let result = classifier.classify("Works but meh").await;

    // Raw factors are returned untouched; filtering is the caller's job.
    assert_eq!(result.factors, vec!["Efficacy", "Vibes"]);
    let labels = result.labels();
    assert_eq!(labels.len(), 1);
    assert!(labels.contains(TaxonomyLabel::Efficacy));
}

#[tokio::test(start_paused = true)]
async fn test_empty_reflexion_is_success_not_retry() {
    let backend = Arc::new(ScriptedBackend::new().then_classify(&["Price"], &[]));
    let classifier = classifier(backend.clone());

    let result = classifier.classify("ok").await;

    assert!(result.factors.is_empty());
    assert_eq!(result.outcome, ClassificationOutcome::Succeeded);
    assert_eq!(backend.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_from_config_applies_prompt_and_retry() {
    let config = ClassifierConfig {
        prompt: PromptTemplate::FewShot,
        max_attempts: 2,
        backoff_unit_ms: 5,
        ..Default::default()
    };
    let backend = Arc::new(ScriptedBackend::new());
    let classifier = ReflexionClassifier::from_config(backend.clone(), &config).unwrap();

    let result = classifier.classify("anything").await;

    assert_eq!(classifier.prompt(), PromptTemplate::FewShot);
    assert_eq!(result.attempts, 2);
    assert_eq!(backend.call_count(), 2);
    assert!(backend.prompts()[0].contains("### EXAMPLES"));
    assert_eq!(classifier.name(), "reflexion");
}

#[tokio::test(start_paused = true)]
async fn test_both_stages_request_deterministic_json() {
    let config = ClassifierConfig {
        model: "models/gemini-2.5-pro".to_string(),
        ..Default::default()
    };
    let backend = Arc::new(
        ScriptedBackend::new()
            .then_fail(Error::Timeout)
            .then_classify(&["Price"], &["Price"]),
    );
    let classifier = ReflexionClassifier::from_config(backend.clone(), &config).unwrap();

    let result = classifier.classify("Cheap").await;
    assert_eq!(result.attempts, 2);

    let requests = backend.requests();
    assert_eq!(requests.len(), 3);
    for request in &requests {
        assert_eq!(request.model, "models/gemini-2.5-pro");
        assert_eq!(request.config.temperature, 0.0);
        assert_eq!(request.config.response_mime_type.as_deref(), Some("application/json"));
    }
}
