mod json;
mod markdown;
mod text;

pub use json::JsonOutput;
pub use markdown::MarkdownOutput;
pub use text::TextOutput;

use crate::model::{AnalysisResult, Location, Severity, Violation, ViolationKind};
use serde::Serialize;
use std::io::Write;

pub trait OutputFormatter {
    fn format<W: Write>(&self, report: &Report<'_>, writer: &mut W) -> std::io::Result<()>;
}

/// Per-kind counts and the overall verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub layer_direction: usize,
    pub deep_import: usize,
    pub cycle: usize,
    pub total: usize,
    /// Violations with severity `error`.
    pub errors: usize,
    /// Violations with severity `warning`.
    pub warnings: usize,
    pub passed: bool,
}

impl Summary {
    pub fn count(&self, kind: ViolationKind) -> usize {
        match kind {
            ViolationKind::LayerDirection => self.layer_direction,
            ViolationKind::DeepImport => self.deep_import,
            ViolationKind::Cycle => self.cycle,
        }
    }
}

/// Violations of one run in reporting order, with their summary.
pub struct Report<'a> {
    pub result: &'a AnalysisResult,
    /// Sorted by file, line and column; ties keep rule-engine order.
    pub violations: Vec<&'a Violation>,
    pub summary: Summary,
    pub fail_on: Severity,
}

impl<'a> Report<'a> {
    pub fn new(result: &'a AnalysisResult, fail_on: Severity) -> Self {
        let mut violations: Vec<&Violation> = result.violations.iter().collect();
        violations.sort_by(|a, b| a.primary_location().cmp(b.primary_location()));

        let mut summary = Summary::default();
        for violation in &violations {
            match violation.kind {
                ViolationKind::LayerDirection => summary.layer_direction += 1,
                ViolationKind::DeepImport => summary.deep_import += 1,
                ViolationKind::Cycle => summary.cycle += 1,
            }
            match violation.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => {}
            }
        }
        summary.total = violations.len();
        summary.passed = !violations.iter().any(|v| v.severity >= fail_on);

        Self {
            result,
            violations,
            summary,
            fail_on,
        }
    }

    pub fn passed(&self) -> bool {
        self.summary.passed
    }

    /// Trimmed source line at a location, read from the scanned file text.
    pub fn snippet(&self, location: &Location) -> Option<&'a str> {
        self.result
            .file(&location.path)
            .and_then(|file| file.line_text(location.line))
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }
}
