use crate::aggregate::DutyMatrix;
use crate::models::{Extreme, FairnessReport};

/// Distribution summary over roster-complete totals. Zero-duty faculty are
/// part of the mean and standard deviation.
pub fn summarize(totals: &[(String, u64)]) -> FairnessReport {
    let zero_duty: Vec<String> = totals
        .iter()
        .filter(|(_, total)| *total == 0)
        .map(|(name, _)| name.clone())
        .collect();

    let min_non_zero = totals
        .iter()
        .map(|(_, total)| *total)
        .filter(|total| *total > 0)
        .min()
        .map(|value| extreme(totals, value));

    let max = totals
        .iter()
        .map(|(_, total)| *total)
        .max()
        .map(|value| extreme(totals, value));

    let (mean, std_dev) = mean_and_std(totals.iter().map(|(_, total)| *total as f64));

    FairnessReport {
        assigned_count: totals.len() - zero_duty.len(),
        faculty_count: totals.len(),
        zero_duty,
        min_non_zero,
        max,
        mean,
        std_dev,
    }
}

/// One report per semester column of the matrix.
pub fn summarize_semesters(matrix: &DutyMatrix) -> Vec<(String, FairnessReport)> {
    matrix
        .semesters
        .iter()
        .filter_map(|semester| {
            matrix
                .semester_totals(semester)
                .map(|totals| (semester.clone(), summarize(&totals)))
        })
        .collect()
}

fn extreme(totals: &[(String, u64)], value: u64) -> Extreme {
    Extreme {
        value,
        names: totals
            .iter()
            .filter(|(_, total)| *total == value)
            .map(|(name, _)| name.clone())
            .collect(),
    }
}

/// Sample standard deviation (n - 1); 0.0 below two values.
fn mean_and_std(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let values: Vec<f64> = values.collect();
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::MatrixRow;

    fn totals(pairs: &[(&str, u64)]) -> Vec<(String, u64)> {
        pairs.iter().map(|(n, t)| (n.to_string(), *t)).collect()
    }

    #[test]
    fn reports_zero_min_and_max_sets() {
        let report = summarize(&totals(&[("Dr. A", 1), ("Dr. B", 0)]));
        assert_eq!(report.zero_duty, vec!["Dr. B"]);
        assert_eq!(
            report.max,
            Some(Extreme { value: 1, names: vec!["Dr. A".into()] })
        );
        assert_eq!(
            report.min_non_zero,
            Some(Extreme { value: 1, names: vec!["Dr. A".into()] })
        );
        assert!((report.mean - 0.5).abs() < 1e-9);
        assert_eq!(report.assigned_count, 1);
        assert!((report.pct_no_duty() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn ties_report_every_name() {
        let report = summarize(&totals(&[("A", 3), ("B", 1), ("C", 3), ("D", 1), ("E", 2)]));
        assert_eq!(report.max.unwrap().names, vec!["A", "C"]);
        assert_eq!(report.min_non_zero.unwrap().names, vec!["B", "D"]);
        assert!(report.zero_duty.is_empty());
    }

    #[test]
    fn all_zero_has_no_min_non_zero() {
        let report = summarize(&totals(&[("A", 0), ("B", 0)]));
        assert_eq!(report.min_non_zero, None);
        assert_eq!(report.max, Some(Extreme { value: 0, names: vec!["A".into(), "B".into()] }));
        assert_eq!(report.zero_duty.len(), 2);
        assert_eq!(report.mean, 0.0);
        assert_eq!(report.std_dev, 0.0);
        assert_eq!(report.pct_assigned(), 0.0);
    }

    #[test]
    fn empty_roster_does_not_panic() {
        let report = summarize(&[]);
        assert_eq!(report.max, None);
        assert_eq!(report.min_non_zero, None);
        assert_eq!(report.faculty_count, 0);
        assert_eq!(report.pct_assigned(), 0.0);
    }

    #[test]
    fn std_dev_uses_sample_variance() {
        let report = summarize(&totals(&[
            ("A", 2),
            ("B", 4),
            ("C", 4),
            ("D", 4),
            ("E", 5),
            ("F", 5),
            ("G", 7),
            ("H", 9),
        ]));
        assert!((report.mean - 5.0).abs() < 1e-9);
        assert!((report.std_dev - (32.0f64 / 7.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn per_semester_reports_follow_matrix_columns() {
        let matrix = DutyMatrix {
            semesters: vec!["Mid".into(), "End".into()],
            rows: vec![
                MatrixRow { name: "A".into(), per_semester: vec![2, 0], total: 2 },
                MatrixRow { name: "B".into(), per_semester: vec![0, 3], total: 3 },
            ],
        };
        let reports = summarize_semesters(&matrix);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].0, "Mid");
        assert_eq!(reports[0].1.zero_duty, vec!["B"]);
        assert_eq!(reports[1].1.max.as_ref().unwrap().names, vec!["B"]);
    }
}
