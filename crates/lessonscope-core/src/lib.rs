//! lessonscope-core: response parser, model selection, and analysis pipeline.
//!
//! The heart of this crate is [`parser::parse`], which turns a model's
//! heading-delimited answer into a fixed nine-field [`model::ParsedRecord`].
//! The rest wires a provider, the hidden instruction template, and model
//! selection around it.

pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod prompt;
pub mod report;
pub mod selection;
pub mod traits;

pub use engine::{Analyzer, AnalyzerConfig, ConnectionStatus};
pub use error::AnalysisError;
pub use model::{Field, ParsedRecord, Section};
pub use parser::{parse, parse_with_diagnostics, ParseOutcome};
pub use report::Analysis;
pub use selection::{select_model, ModelChoice, Selection};
