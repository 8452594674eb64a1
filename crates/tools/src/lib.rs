//! HSI Tools library

pub mod analyze;
pub mod config;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod synth;

pub use analyze::{compare_predictors, PredictorComparison};
pub use config::{ConfigArgs, RunConfig};
pub use metrics::MetricsRecord;
pub use pipeline::{encode_source, Pipeline, RunReport, SourceCoding};
