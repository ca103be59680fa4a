//! Response comparison and analysis.

pub mod analyzer;
pub mod diff;

pub use analyzer::{analyze, analyze_record, AnalysisResult, ResponseView};
pub use diff::{diff, DiffItem, DiffKind, DiffSummary};
