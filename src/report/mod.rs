//! Framework aggregation and cross-framework report summaries.

pub mod digest;
pub mod label;
pub mod statistics;
pub mod structure;
pub mod summary;
pub mod types;

#[cfg(test)]
mod tests;

pub use digest::{DigestControls, DigestCounts, DigestEntry, ScoreDigest, digest};
pub use label::ScoreLabel;
pub use statistics::{FrameworkStatistics, NO_CONTROLS_EVALUATED, UNKNOWN_RISK, compute_statistics};
pub use structure::{FrameworkStructure, StructureGroup, StructureLeaf, build_structure};
pub use summary::{
    CriticalGap, PrioritizedRecommendation, ReportSummary, ScoreDistribution, summarize,
};
pub use types::{AnalysisResults, DocumentInfo, FrameworkResult};
