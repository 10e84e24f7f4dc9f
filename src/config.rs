use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::ingest::{ColumnCandidates, DutyMode};
use crate::matcher::DEFAULT_CUTOFF;
use crate::models::CanonicalFaculty;
use crate::roster::Roster;

/// Analysis configuration loaded from TOML.
///
/// # Example TOML
/// ```toml
/// cutoff = 0.70
/// default_mode = "mark-presence"
/// name_columns = ["Name", "Faculty"]
///
/// faculty = [
///     "Mrs. Chandana Das",
///     { name = "Dr. Arup Bharali", department = "Physics" },
/// ]
///
/// [[input]]
/// path = "duty_files/mid_2025.csv"
/// semester = "Mid 2025"
///
/// [[input]]
/// path = "duty_files/end_2025.csv"
/// mode = "literal-one"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_cutoff")]
    pub cutoff: f64,
    #[serde(default)]
    pub default_mode: DutyMode,
    #[serde(flatten)]
    pub columns: ColumnCandidates,
    #[serde(default)]
    pub faculty: Vec<FacultyEntry>,
    #[serde(default)]
    pub input: Vec<InputFile>,
}

fn default_cutoff() -> f64 {
    DEFAULT_CUTOFF
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FacultyEntry {
    Name(String),
    Detailed {
        name: String,
        department: Option<String>,
    },
}

impl From<FacultyEntry> for CanonicalFaculty {
    fn from(entry: FacultyEntry) -> Self {
        match entry {
            FacultyEntry::Name(name) => CanonicalFaculty::new(name),
            FacultyEntry::Detailed { name, department } => CanonicalFaculty { name, department },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputFile {
    pub path: PathBuf,
    pub semester: Option<String>,
    pub mode: Option<DutyMode>,
}

impl InputFile {
    /// Explicit semester label, else the file stem.
    pub fn semester_label(&self) -> String {
        self.semester.clone().unwrap_or_else(|| {
            self.path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.path.display().to_string())
        })
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AnalysisConfig =
            toml::from_str(content).context("Failed to parse analysis config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file; relative input paths resolve against its directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for input in config.input.iter_mut() {
            if input.path.is_relative() {
                input.path = base.join(&input.path);
            }
        }
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.cutoff) {
            anyhow::bail!("cutoff must be within [0, 1], got {}", self.cutoff);
        }
        if self.faculty.is_empty() {
            anyhow::bail!("config must list at least one faculty entry");
        }
        Ok(())
    }

    pub fn roster(&self) -> Result<Roster> {
        let entries = self.faculty.iter().cloned().map(CanonicalFaculty::from).collect();
        Roster::new(entries).context("Invalid faculty roster")
    }

    pub fn mode_for(&self, input: &InputFile) -> DutyMode {
        input.mode.unwrap_or(self.default_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
cutoff = 0.8
default_mode = "literal-one"
department_columns = ["Department"]

faculty = [
    "Mrs. Chandana Das",
    { name = "Dr. Arup Bharali", department = "Physics" },
]

[[input]]
path = "mid.csv"
semester = "Mid"

[[input]]
path = "data/end_2025.csv"
mode = "mark-presence"
"#;

    #[test]
    fn parses_roster_inputs_and_defaults() {
        let config = AnalysisConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.cutoff, 0.8);
        assert_eq!(config.columns.name_columns, vec!["Name", "NAME"]);
        assert_eq!(config.columns.department_columns, vec!["Department"]);

        let roster = config.roster().unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.department_of("Dr. Arup Bharali"), Some("Physics"));

        assert_eq!(config.input[0].semester_label(), "Mid");
        assert_eq!(config.input[1].semester_label(), "end_2025");
        assert_eq!(config.mode_for(&config.input[0]), DutyMode::LiteralOne);
        assert_eq!(config.mode_for(&config.input[1]), DutyMode::MarkPresence);
    }

    #[test]
    fn cutoff_defaults_to_seventy_percent() {
        let config = AnalysisConfig::from_toml_str(r#"faculty = ["Dr. A"]"#).unwrap();
        assert_eq!(config.cutoff, DEFAULT_CUTOFF);
        assert_eq!(config.default_mode, DutyMode::MarkPresence);
        assert!(config.input.is_empty());
    }

    #[test]
    fn rejects_bad_cutoff_and_empty_roster() {
        assert!(AnalysisConfig::from_toml_str("cutoff = 1.5\nfaculty = [\"Dr. A\"]").is_err());
        assert!(AnalysisConfig::from_toml_str("cutoff = 0.5").is_err());
    }

    #[test]
    fn duplicate_roster_names_fail_roster_build() {
        let config = AnalysisConfig::from_toml_str(r#"faculty = ["Dr. A", "Dr. A"]"#).unwrap();
        assert!(config.roster().is_err());
    }
}
