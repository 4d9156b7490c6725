//! Report rendering for human and JSON modes
//!
//! The renderer formats the ordered finding sequence; it holds no comparison
//! logic. Exit-status mapping lives here too: a run fails exactly when it
//! produced at least one warning-severity finding.

use chrono::Utc;
use colored::Colorize;
use serde::Serialize;

use crate::core::models::{Finding, FindingKind, RepositoryRef, Severity};
use crate::core::services::{AuditOutcome, CheckMode};
use crate::error::RenderError;

/// Output mode for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output (machine-readable)
    Json,
}

/// Status assigned to a repository in the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoStatus {
    /// No findings at all
    Current,
    /// At least one actionable or informational finding
    Update,
    /// The repository could not be fetched or its pipeline did not parse
    Failed,
}

impl std::fmt::Display for RepoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Current => write!(f, "current"),
            Self::Update => write!(f, "update"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// One repository's summary line.
#[derive(Debug, Clone, Serialize)]
pub struct RepoSummary {
    /// The repository
    pub repository: RepositoryRef,
    /// Derived status
    pub status: RepoStatus,
    /// Warning findings for this repository
    pub warnings: usize,
    /// Info findings for this repository
    pub info: usize,
}

/// A rendered audit run: summaries, findings and aggregate counts.
#[derive(Debug, Serialize)]
pub struct Report {
    /// Which drift dimension was compared
    pub mode: String,
    /// When the report was generated (RFC3339)
    pub generated_at: String,
    /// Per-repository summaries, in ref order
    pub repositories: Vec<RepoSummary>,
    /// All findings, in deterministic report order
    pub findings: Vec<Finding>,
    /// Total warning findings
    pub warnings: usize,
    /// Total info findings
    pub info: usize,
    /// Repositories that stayed unreachable
    pub unreachable: usize,
    /// Whether the run was interrupted
    pub cancelled: bool,
}

impl Report {
    /// Assemble a report from a finished audit run.
    #[must_use]
    pub fn build(mode: CheckMode, refs: &[RepositoryRef], outcome: AuditOutcome) -> Self {
        let repositories = refs
            .iter()
            .map(|r| {
                let mut warnings = 0;
                let mut info = 0;
                let mut failed = false;
                for finding in outcome.findings.iter().filter(|f| &f.repository == r) {
                    match finding.severity {
                        Severity::Warning => warnings += 1,
                        Severity::Info => info += 1,
                    }
                    if matches!(
                        finding.kind,
                        FindingKind::FetchFailure { .. } | FindingKind::ExtractionFailure { .. }
                    ) {
                        failed = true;
                    }
                }
                let status = if failed {
                    RepoStatus::Failed
                } else if warnings + info > 0 {
                    RepoStatus::Update
                } else {
                    RepoStatus::Current
                };
                RepoSummary {
                    repository: r.clone(),
                    status,
                    warnings,
                    info,
                }
            })
            .collect();

        Self {
            mode: mode.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            repositories,
            warnings: outcome.count_by_severity(Severity::Warning),
            info: outcome.count_by_severity(Severity::Info),
            unreachable: outcome.unreachable,
            cancelled: outcome.cancelled,
            findings: outcome.findings,
        }
    }

    /// Process exit code for this report: nonzero iff warnings were produced.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        if self.warnings > 0 { 1 } else { 0 }
    }

    /// Render the report in the requested mode.
    pub fn render(&self, mode: OutputMode) -> Result<(), RenderError> {
        match mode {
            OutputMode::Human => {
                self.render_human();
                Ok(())
            },
            OutputMode::Json => self.render_json(),
        }
    }

    fn render_human(&self) {
        println!("Azure Pipelines drift report ({} mode)\n", self.mode);

        for summary in &self.repositories {
            let status = match summary.status {
                RepoStatus::Current => format!("{}", "current".green()),
                RepoStatus::Update => format!("{}", "update".yellow()),
                RepoStatus::Failed => format!("{}", "failed".red()),
            };
            let mut counts = Vec::new();
            if summary.warnings > 0 {
                counts.push(format!("{} warning(s)", summary.warnings));
            }
            if summary.info > 0 {
                counts.push(format!("{} info", summary.info));
            }
            let suffix = if counts.is_empty() {
                String::new()
            } else {
                format!(" - {}", counts.join(", "))
            };
            println!("  [{status}] {}{suffix}", summary.repository);

            for finding in self.findings.iter().filter(|f| f.repository == summary.repository) {
                println!("      {}", describe(&finding.kind));
            }
        }

        println!(
            "\n{} repositories checked: {} warnings, {} info, {} unreachable",
            self.repositories.len(),
            self.warnings,
            self.info,
            self.unreachable
        );
        if self.cancelled {
            println!("{}", "run was interrupted; results are incomplete".yellow());
        }
    }

    fn render_json(&self) -> Result<(), RenderError> {
        println!("{}", serde_json::to_string_pretty(self)?);
        Ok(())
    }
}

/// One human-readable line per finding.
fn describe(kind: &FindingKind) -> String {
    match kind {
        FindingKind::StaleMatrixEntry {
            platform,
            observed_max,
            canonical_max,
        } => {
            format!("{platform}: tests up to {observed_max}, devel tests {canonical_max}")
        },
        FindingKind::MissingPlatform {
            platform,
            canonical_max,
        } => format!("consider {platform} (devel tests {canonical_max})"),
        FindingKind::StaleContainerTag {
            observed,
            canonical,
        } => format!("container pinned to {observed}, latest is {canonical}"),
        FindingKind::UnpinnedContainerTag { observed } => {
            format!("container tag {observed} is not a pinned version")
        },
        FindingKind::FetchFailure { detail } => format!("fetch failed: {detail}"),
        FindingKind::ExtractionFailure { detail } => format!("pipeline unparseable: {detail}"),
    }
}
