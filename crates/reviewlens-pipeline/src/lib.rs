//! Reviewlens Pipeline
//!
//! File-level workflows built on the classifier:
//! - [`BatchPipeline`]: label every review in a sheet, monitoring drift
//! - [`aggregate`]: collapse per-label training rows into one row per review
//! - [`Validator`]: re-classify a sample of labelled reviews and score it

pub mod aggregate;
pub mod batch;
pub mod evaluation;
pub mod normalize;
pub mod table;
pub mod validate;

pub use aggregate::{aggregate, aggregate_file, aggregate_table, AggregatedRow};
pub use batch::{BatchOutput, BatchPipeline, PipelineConfig};
pub use evaluation::EvaluationReport;
pub use normalize::{normalize_review, strip_non_ascii};
pub use table::{Table, LABEL_COLUMN, REVIEW_COLUMN};
pub use validate::{
    ground_truth_from_table, parse_truth, validate_file, LabelledReview, ValidationConfig,
    ValidationRun, Validator,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::batch::{BatchOutput, BatchPipeline};
    pub use crate::evaluation::EvaluationReport;
    pub use crate::table::Table;
    pub use crate::validate::Validator;
}
