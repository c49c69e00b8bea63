//! Reviewlens CLI
//!
//! Batch labelling of product reviews with a two-stage LLM classifier,
//! training-data aggregation, and validation against human labels.

use anyhow::{anyhow, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use reviewlens_classifiers::{Classifier, GeminiBackend, ReflexionClassifier};
use reviewlens_core::Error;
use reviewlens_pipeline::{aggregate_file, validate_file, BatchPipeline, Validator};
use reviewlens_telemetry::DriftMonitor;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

mod cli;
mod config;

use cli::{Cli, Commands, ModelArgs};
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Initialize metrics
    let metrics_handle = init_metrics()?;

    let run_id = Uuid::new_v4();
    let span = info_span!(
        "run",
        %run_id,
        command = cli.command.name(),
        started_at = %chrono::Utc::now().to_rfc3339()
    );

    let result = run(&cli).instrument(span).await;

    if let Some(path) = &cli.metrics_out {
        std::fs::write(path, metrics_handle.render())?;
        info!("Metrics written to {}", path.display());
    }

    result
}

async fn run(cli: &Cli) -> Result<()> {
    let mut config = AppConfig::load(&cli.config)?;

    match &cli.command {
        Commands::Label {
            input,
            output,
            pacing_ms,
            drift_threshold,
            model,
        } => {
            config.apply_model_args(model);
            if let Some(pacing_ms) = pacing_ms {
                config.pipeline.pacing_ms = *pacing_ms;
            }
            if let Some(threshold) = drift_threshold {
                config.drift.threshold = *threshold;
            }
            config.validate()?;
            ensure_input(input)?;

            info!(
                "--- Starting labelling pipeline ({}, {} prompt) ---",
                config.classifier.model,
                config.classifier.prompt.as_str()
            );
            let classifier = build_classifier(&config, model)?;
            let mut pipeline = BatchPipeline::new(classifier)
                .with_config(config.pipeline.clone())
                .with_monitor(DriftMonitor::with_config(config.drift.clone()));

            let result = pipeline.label_file(input, output).await?;
            if !result.alerts.is_empty() {
                info!("{} drift alert(s) raised during the run", result.alerts.len());
            }
        }

        Commands::Aggregate { input, output } => {
            config.validate()?;
            ensure_input(input)?;

            aggregate_file(
                input,
                output,
                &config.pipeline.review_column,
                &config.pipeline.label_column,
            )?;
        }

        Commands::Validate {
            input,
            samples,
            seed,
            model,
        } => {
            config.apply_model_args(model);
            if let Some(samples) = samples {
                config.validation.sample_size = *samples;
            }
            if seed.is_some() {
                config.validation.seed = *seed;
            }
            config.validate()?;
            ensure_input(input)?;

            info!(
                "--- Starting multi-label validation ({}) ---",
                config.classifier.model
            );
            let classifier = build_classifier(&config, model)?;
            let mut validator = Validator::with_config(classifier, config.validation.clone());
            let run = validate_file(
                &mut validator,
                input,
                &config.pipeline.review_column,
                &config.pipeline.label_column,
            )
            .await?;

            println!("\n{}", run.report);
        }
    }

    Ok(())
}

/// Fail fast on a missing input, before any credentials or network are needed
fn ensure_input(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::InputNotFound(path.to_path_buf()).into());
    }
    Ok(())
}

fn build_classifier(config: &AppConfig, model: &ModelArgs) -> Result<Arc<dyn Classifier>> {
    let api_key = model
        .api_key
        .as_deref()
        .ok_or_else(|| anyhow!("GEMINI_API_KEY is not set (use the environment or --api-key)"))?;

    let backend = GeminiBackend::with_base_url(
        api_key,
        config.classifier.base_url.clone(),
        config.classifier.request_timeout(),
    )?;
    let classifier = ReflexionClassifier::from_config(Arc::new(backend), &config.classifier)?;
    info!(
        classifier = classifier.name(),
        max_attempts = classifier.retry_policy().max_attempts,
        "classifier ready"
    );
    Ok(Arc::new(classifier))
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("reviewlens=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reviewlens=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics recorder and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .map_err(|e| anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "reviewlens_backend_calls_total",
        "Generative backend calls by protocol stage"
    );
    metrics::describe_counter!(
        "reviewlens_classify_retries_total",
        "Two-stage attempts abandoned and retried after backoff"
    );
    metrics::describe_counter!(
        "reviewlens_classifications_total",
        "Classifications by outcome (succeeded or exhausted)"
    );
    metrics::describe_counter!(
        "reviewlens_outcomes_total",
        "Drift monitor outcomes by result"
    );
    metrics::describe_counter!("reviewlens_drift_alerts_total", "Drift alerts raised");
    metrics::describe_counter!("reviewlens_rows_total", "Input rows by status");
    metrics::describe_gauge!(
        "reviewlens_window_failure_rate",
        "Failure rate over the most recent drift window"
    );

    Ok(handle)
}
