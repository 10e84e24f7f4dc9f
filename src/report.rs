use std::fmt::Write;

use chrono::NaiveDate;

use crate::aggregate::GroupTotal;
use crate::analysis::Analysis;
use crate::models::{Extreme, FairnessReport, MatchResult};

pub fn build_report(analysis: &Analysis, generated_on: NaiveDate) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Exam Duty Report");
    let _ = writeln!(
        output,
        "Generated on {} from {} file(s), {} failed",
        generated_on,
        analysis.files.len(),
        analysis.failures.len()
    );
    let _ = writeln!(output);

    write_inputs(&mut output, analysis);
    write_match_review(&mut output, analysis);
    write_totals(&mut output, analysis);
    write_matrix(&mut output, analysis);
    write_groups(&mut output, "Department-wise Duty", &analysis.departments);
    write_groups(&mut output, "Date-wise Duty", &analysis.sessions);
    write_fairness(&mut output, "Fairness Check", &analysis.fairness);
    write_overall(&mut output, &analysis.fairness);

    let _ = writeln!(output, "## Per-semester Statistics");
    if analysis.semester_fairness.is_empty() {
        let _ = writeln!(output, "No semesters processed.");
    } else {
        let _ = writeln!(output, "| Semester | Min | Max | Mean | Std |");
        let _ = writeln!(output, "|---|---|---|---|---|");
        for (semester, report) in &analysis.semester_fairness {
            let min = if report.zero_duty.is_empty() {
                report.min_non_zero.as_ref().map(|e| e.value).unwrap_or(0)
            } else {
                0
            };
            let _ = writeln!(
                output,
                "| {} | {} | {} | {:.2} | {:.2} |",
                semester,
                min,
                report.max.as_ref().map(|e| e.value).unwrap_or(0),
                report.mean,
                report.std_dev
            );
        }
    }

    output
}

fn write_inputs(output: &mut String, analysis: &Analysis) {
    let _ = writeln!(output, "## Inputs");
    if analysis.files.is_empty() {
        let _ = writeln!(output, "No files processed.");
    }
    for file in &analysis.files {
        let _ = writeln!(
            output,
            "- {} as '{}' ({}): {} rows, {} sessions, {} duties",
            file.source,
            file.semester,
            file.mode.label(),
            file.row_count,
            file.session_count,
            file.duty_cells
        );
        if file.name_column_fallback {
            let _ = writeln!(
                output,
                "  - no name header found; used first column '{}'",
                file.name_column
            );
        }
        if file.unparseable_cells > 0 {
            let _ = writeln!(
                output,
                "  - {} unparseable cell(s) read as no duty",
                file.unparseable_cells
            );
        }
    }
    for failure in &analysis.failures {
        let _ = writeln!(
            output,
            "- FAILED {} ('{}'): {}",
            failure.source, failure.semester, failure.error
        );
    }
    let _ = writeln!(output);
}

fn write_match_review(output: &mut String, analysis: &Analysis) {
    let _ = writeln!(output, "## Names Needing Review");

    let mut flagged: Vec<(&str, &MatchResult)> = Vec::new();
    for aggregation in &analysis.aggregations {
        for result in &aggregation.matches {
            if result.strategy.needs_review() || result.ambiguous {
                flagged.push((aggregation.semester.as_str(), result));
            }
        }
    }

    if flagged.is_empty() && analysis.roster_collisions.is_empty() {
        let _ = writeln!(output, "All names matched exactly.");
    }
    for (semester, result) in flagged {
        let target = result.canonical_name.as_deref().unwrap_or("(unmatched)");
        let _ = writeln!(
            output,
            "- [{}] '{}' -> {} ({}, {:.2}){}",
            semester,
            result.raw_name,
            target,
            result.strategy.label(),
            result.confidence,
            if result.ambiguous { " ambiguous" } else { "" }
        );
    }
    for group in &analysis.roster_collisions {
        let _ = writeln!(
            output,
            "- roster names normalize identically: {}",
            group.join(", ")
        );
    }

    if !analysis.combined.unmatched.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "Unmatched duty (not in totals):");
        for entry in &analysis.combined.unmatched {
            let name = if entry.name.is_empty() {
                "(blank name)"
            } else {
                entry.name.as_str()
            };
            let _ = writeln!(output, "- {}: {}", name, entry.total_duty);
        }
    }
    let _ = writeln!(output);
}

fn write_totals(output: &mut String, analysis: &Analysis) {
    let _ = writeln!(output, "## Total Duty Across All Semesters");
    let mut totals = analysis.combined.totals.clone();
    totals.sort_by(|a, b| b.total_duty.cmp(&a.total_duty));
    for total in &totals {
        let _ = writeln!(output, "- {}: {}", total.name, total.total_duty);
    }
    let _ = writeln!(output);
}

fn write_matrix(output: &mut String, analysis: &Analysis) {
    let matrix = &analysis.combined.matrix;
    let _ = writeln!(output, "## Faculty x Semester");
    if matrix.semesters.is_empty() {
        let _ = writeln!(output, "No semesters processed.");
        let _ = writeln!(output);
        return;
    }

    let _ = writeln!(output, "| Faculty | {} | Total |", matrix.semesters.join(" | "));
    let _ = writeln!(output, "|---|{}---|", "---|".repeat(matrix.semesters.len()));
    for row in &matrix.rows {
        let cells: Vec<String> = row.per_semester.iter().map(u64::to_string).collect();
        let _ = writeln!(output, "| {} | {} | {} |", row.name, cells.join(" | "), row.total);
    }
    let _ = writeln!(output);
}

fn write_groups(output: &mut String, title: &str, groups: &[GroupTotal]) {
    let _ = writeln!(output, "## {}", title);
    if groups.is_empty() {
        let _ = writeln!(output, "No duties recorded.");
    }
    for group in groups {
        let _ = writeln!(output, "- [{}] {}: {}", group.semester, group.key, group.total_duty);
    }
    let _ = writeln!(output);
}

fn format_extreme(extreme: Option<&Extreme>) -> String {
    match extreme {
        Some(extreme) => format!("{} ({})", extreme.value, extreme.names.join(", ")),
        None => "none".to_string(),
    }
}

fn write_fairness(output: &mut String, title: &str, report: &FairnessReport) {
    let _ = writeln!(output, "## {}", title);
    let _ = writeln!(
        output,
        "- Maximum duty: {}",
        format_extreme(report.max.as_ref())
    );
    let _ = writeln!(
        output,
        "- Minimum non-zero duty: {}",
        format_extreme(report.min_non_zero.as_ref())
    );
    if report.zero_duty.is_empty() {
        let _ = writeln!(output, "- Zero duty: none");
    } else {
        let _ = writeln!(output, "- Zero duty: {}", report.zero_duty.join(", "));
    }
    let _ = writeln!(
        output,
        "- Mean {:.2}, standard deviation {:.2}",
        report.mean, report.std_dev
    );
    let _ = writeln!(output);
}

fn write_overall(output: &mut String, report: &FairnessReport) {
    let _ = writeln!(output, "## Overall Summary");
    let _ = writeln!(output, "| Metric | Value |");
    let _ = writeln!(output, "|---|---|");
    let _ = writeln!(output, "| Total faculty in roster | {} |", report.faculty_count);
    let _ = writeln!(output, "| Faculty with no duty | {} |", report.zero_duty.len());
    let _ = writeln!(output, "| Faculty with some duty | {} |", report.assigned_count);
    let _ = writeln!(output, "| Percentage assigned | {:.2}% |", report.pct_assigned());
    let _ = writeln!(output, "| Percentage with no duty | {:.2}% |", report.pct_no_duty());
    let _ = writeln!(output, "| Average duty load | {:.2} |", report.mean);
    let _ = writeln!(
        output,
        "| Maximum duty | {} |",
        report.max.as_ref().map(|e| e.value).unwrap_or(0)
    );
    let _ = writeln!(
        output,
        "| Minimum non-zero duty | {} |",
        report
            .min_non_zero
            .as_ref()
            .map(|e| e.value.to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    let _ = writeln!(output);
}
