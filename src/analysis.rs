use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregate::{self, CombinedTotals, FileAggregation, GroupTotal};
use crate::config::{AnalysisConfig, InputFile};
use crate::error::DutyError;
use crate::fairness;
use crate::ingest::{self, DutyMode, DutyTable};
use crate::models::FairnessReport;
use crate::roster::Roster;

/// What happened to one configured input.
#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub source: String,
    pub semester: String,
    pub mode: DutyMode,
    pub name_column: String,
    pub name_column_fallback: bool,
    pub department_column: Option<String>,
    pub session_count: usize,
    pub row_count: usize,
    pub duty_cells: usize,
    pub unparseable_cells: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub source: String,
    pub semester: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub files: Vec<FileSummary>,
    pub failures: Vec<FileFailure>,
    pub aggregations: Vec<FileAggregation>,
    pub combined: CombinedTotals,
    pub departments: Vec<GroupTotal>,
    pub sessions: Vec<GroupTotal>,
    pub fairness: FairnessReport,
    pub semester_fairness: Vec<(String, FairnessReport)>,
    pub roster_collisions: Vec<Vec<String>>,
}

/// Build and aggregate one already-read file.
pub fn process_table(
    table: &ingest::TabularFile,
    config: &AnalysisConfig,
    roster: &Roster,
    semester: &str,
    mode: DutyMode,
    source: &str,
) -> Result<(FileSummary, FileAggregation), DutyError> {
    let duty_table: DutyTable = ingest::build_duty_table(table, &config.columns, mode)?;
    let aggregation = aggregate::aggregate(&duty_table, roster, semester, config.cutoff, source);

    let summary = FileSummary {
        source: source.to_string(),
        semester: semester.to_string(),
        mode,
        name_column: duty_table.name_column.clone(),
        name_column_fallback: duty_table.name_column_fallback,
        department_column: duty_table.department_column.clone(),
        session_count: duty_table.sessions.len(),
        row_count: duty_table.rows.len(),
        duty_cells: duty_table.duty_cells(),
        unparseable_cells: duty_table.unparseable_cells,
    };
    debug!(
        source,
        semester,
        rows = summary.row_count,
        sessions = summary.session_count,
        duty_cells = summary.duty_cells,
        "file processed"
    );
    Ok((summary, aggregation))
}

fn process_input(
    input: &InputFile,
    config: &AnalysisConfig,
    roster: &Roster,
) -> Result<(FileSummary, FileAggregation), DutyError> {
    let table = ingest::read_table(&input.path)?;
    process_table(
        &table,
        config,
        roster,
        &input.semester_label(),
        config.mode_for(input),
        &input.path.display().to_string(),
    )
}

/// Process every input; a file that fails is recorded and skipped.
/// Totals are computed once all files are done.
pub fn run_analysis(config: &AnalysisConfig, roster: &Roster) -> Analysis {
    let mut files = Vec::new();
    let mut failures = Vec::new();
    let mut aggregations = Vec::new();

    for input in &config.input {
        match process_input(input, config, roster) {
            Ok((summary, aggregation)) => {
                files.push(summary);
                aggregations.push(aggregation);
            }
            Err(err) => {
                warn!(path = %input.path.display(), error = %err, "skipping input file");
                failures.push(FileFailure {
                    source: input.path.display().to_string(),
                    semester: input.semester_label(),
                    error: err.to_string(),
                });
            }
        }
    }

    let analysis = assemble(files, failures, aggregations, roster);
    info!(
        processed = analysis.files.len(),
        failed = analysis.failures.len(),
        matched_duty = analysis.combined.matched_duty(),
        unmatched_duty = analysis.combined.unmatched_duty(),
        "analysis complete"
    );
    analysis
}

pub fn assemble(
    files: Vec<FileSummary>,
    failures: Vec<FileFailure>,
    aggregations: Vec<FileAggregation>,
    roster: &Roster,
) -> Analysis {
    let combined = aggregate::combine(&aggregations, roster);
    let fairness = fairness::summarize(&combined.name_totals());
    let semester_fairness = fairness::summarize_semesters(&combined.matrix);

    Analysis {
        files,
        failures,
        departments: aggregate::department_totals(&aggregations),
        sessions: aggregate::session_totals(&aggregations),
        aggregations,
        combined,
        fairness,
        semester_fairness,
        roster_collisions: roster.collisions(),
    }
}
