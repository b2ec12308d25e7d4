use crate::model::{Location, Severity, ViolationKind, WarningKind};
use crate::output::{OutputFormatter, Report, Summary};
use serde::Serialize;
use std::io::Write;

/// Machine-readable report. Contains no timestamps or absolute paths, so an
/// unchanged tree always produces the same bytes.
pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    violations: Vec<JsonViolation<'a>>,
    summary: Summary,
    warnings: Vec<JsonWarning<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonViolation<'a> {
    kind: ViolationKind,
    severity: Severity,
    from_module: &'a str,
    to_module: &'a str,
    file: &'a str,
    line: usize,
    column: usize,
    message: &'a str,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    symbols: &'a [String],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    cycle: &'a [String],
    locations: &'a [Location],
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonWarning<'a> {
    kind: WarningKind,
    path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    message: &'a str,
}

impl OutputFormatter for JsonOutput {
    fn format<W: Write>(&self, report: &Report<'_>, writer: &mut W) -> std::io::Result<()> {
        let json = JsonReport {
            violations: report
                .violations
                .iter()
                .map(|v| {
                    let location = v.primary_location();
                    JsonViolation {
                        kind: v.kind,
                        severity: v.severity,
                        from_module: &v.from_module,
                        to_module: &v.to_module,
                        file: &location.path,
                        line: location.line,
                        column: location.column,
                        message: &v.message,
                        symbols: &v.symbols,
                        cycle: &v.cycle,
                        locations: &v.locations,
                        suggestion: v.suggestion.as_deref(),
                    }
                })
                .collect(),
            summary: report.summary,
            warnings: report
                .result
                .warnings
                .iter()
                .map(|w| JsonWarning {
                    kind: w.kind,
                    path: &w.path,
                    line: w.line,
                    message: &w.message,
                })
                .collect(),
        };

        serde_json::to_writer_pretty(&mut *writer, &json).map_err(std::io::Error::other)?;
        writeln!(writer)
    }
}
