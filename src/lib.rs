//! FTIR spectrum analysis.
//!
//! A table of `(wavenumber, absorbance)` samples goes through baseline
//! correction, smoothing and peak detection; peak positions are mapped to
//! functional groups and the resulting group set is looked up in a table of
//! compound signatures.
//!
//! ```no_run
//! use ftir_analyzer::{analyze, Catalog, PipelineConfig};
//!
//! let spectrum = ftir_analyzer::data::loader::load_file("sample.csv".as_ref())?;
//! let report = analyze(&spectrum, &PipelineConfig::default(), &Catalog::builtin()?)?;
//! println!("{}", report.outcome);
//! # Ok::<(), ftir_analyzer::AnalysisError>(())
//! ```

pub mod catalog;
pub mod config;
pub mod data;
pub mod deduction;
pub mod error;
pub mod pipeline;
pub mod processing;
pub mod report;

pub use catalog::Catalog;
pub use config::{DeductionConfig, PipelineConfig, Settings};
pub use data::model::{Peak, ProcessedSignal, Spectrum};
pub use error::{AnalysisError, Result};
pub use pipeline::{analyze, AnalysisReport, Outcome, Pipeline};
