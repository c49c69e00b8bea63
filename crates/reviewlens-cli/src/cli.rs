use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "reviewlens")]
#[command(
    author,
    version,
    about = "Classify product reviews into consumer-insight factors with an LLM"
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "reviewlens.yaml", global = true)]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write Prometheus metrics to this file when the run ends
    #[arg(long, global = true)]
    pub metrics_out: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Label every review in a spreadsheet
    Label {
        /// Input spreadsheet (.xlsx, .xls, .ods or .csv)
        #[arg(short, long, default_value = "bodywash-test.xlsx")]
        input: PathBuf,

        /// Output CSV
        #[arg(short, long, default_value = "bodywash_test_flash_final.csv")]
        output: PathBuf,

        /// Delay before each classified review, in milliseconds
        #[arg(long)]
        pacing_ms: Option<u64>,

        /// Window failure rate above which drift is reported
        #[arg(long)]
        drift_threshold: Option<f64>,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Collapse per-label training rows into one row per unique review
    Aggregate {
        /// Training spreadsheet
        #[arg(short, long, default_value = "bodywash-train.xlsx")]
        input: PathBuf,

        /// Output CSV
        #[arg(short, long, default_value = "aggregated_train.csv")]
        output: PathBuf,
    },

    /// Re-classify a random sample of labelled reviews and report metrics
    Validate {
        /// Aggregated training CSV
        #[arg(short, long, default_value = "aggregated_train.csv")]
        input: PathBuf,

        /// Number of reviews to sample
        #[arg(short = 'n', long)]
        samples: Option<usize>,

        /// RNG seed for a reproducible sample
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        model: ModelArgs,
    },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Label { .. } => "label",
            Self::Aggregate { .. } => "aggregate",
            Self::Validate { .. } => "validate",
        }
    }
}

/// Model selection shared by commands that call the classifier
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model identifier
    #[arg(short, long)]
    pub model: Option<String>,

    /// Use the few-shot prompt variant
    #[arg(long)]
    pub few_shot: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_defaults() {
        let cli = Cli::try_parse_from(["reviewlens", "label"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("reviewlens.yaml"));
        match cli.command {
            Commands::Label {
                input,
                output,
                pacing_ms,
                model,
                ..
            } => {
                assert_eq!(input, PathBuf::from("bodywash-test.xlsx"));
                assert_eq!(output, PathBuf::from("bodywash_test_flash_final.csv"));
                assert_eq!(pacing_ms, None);
                assert!(!model.few_shot);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_aggregate_defaults() {
        let cli = Cli::try_parse_from(["reviewlens", "aggregate"]).unwrap();
        match cli.command {
            Commands::Aggregate { input, output } => {
                assert_eq!(input, PathBuf::from("bodywash-train.xlsx"));
                assert_eq!(output, PathBuf::from("aggregated_train.csv"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_validate_flags_and_globals() {
        let cli = Cli::try_parse_from([
            "reviewlens",
            "validate",
            "-n",
            "25",
            "--seed",
            "9",
            "--few-shot",
            "--verbose",
            "--metrics-out",
            "metrics.prom",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.metrics_out, Some(PathBuf::from("metrics.prom")));
        assert_eq!(cli.command.name(), "validate");
        match cli.command {
            Commands::Validate {
                samples, seed, model, ..
            } => {
                assert_eq!(samples, Some(25));
                assert_eq!(seed, Some(9));
                assert!(model.few_shot);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
