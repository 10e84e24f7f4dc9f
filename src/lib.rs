//! Exam invigilation duty analysis: reconcile roster names from duty sheets
//! against a canonical faculty list and report duty load per faculty,
//! department and semester.

pub mod aggregate;
pub mod analysis;
pub mod config;
pub mod error;
pub mod export;
pub mod fairness;
pub mod ingest;
pub mod matcher;
pub mod models;
pub mod normalize;
pub mod report;
pub mod roster;

pub use analysis::{run_analysis, Analysis};
pub use config::AnalysisConfig;
pub use error::DutyError;
pub use matcher::{match_name, MatchCache};
pub use normalize::normalize;
pub use roster::Roster;
