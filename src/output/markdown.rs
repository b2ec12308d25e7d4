use crate::model::ViolationKind;
use crate::output::{OutputFormatter, Report};
use std::io::Write;

pub struct MarkdownOutput {
    pub quiet: bool,
}

impl MarkdownOutput {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Default for MarkdownOutput {
    fn default() -> Self {
        Self::new(false)
    }
}

fn section_title(kind: ViolationKind) -> &'static str {
    match kind {
        ViolationKind::LayerDirection => "Layer Direction",
        ViolationKind::DeepImport => "Deep Imports",
        ViolationKind::Cycle => "Dependency Cycles",
    }
}

impl OutputFormatter for MarkdownOutput {
    fn format<W: Write>(&self, report: &Report<'_>, writer: &mut W) -> std::io::Result<()> {
        let summary = &report.summary;
        writeln!(writer, "# Layer Check: {}\n", report.result.project_name)?;

        let verdict = if summary.passed { "PASSED" } else { "FAILED" };
        writeln!(
            writer,
            "**{}**: {} violations ({} errors, {} warnings)\n",
            verdict, summary.total, summary.errors, summary.warnings
        )?;

        writeln!(writer, "| Rule | Violations |")?;
        writeln!(writer, "|------|-----------:|")?;
        for kind in ViolationKind::ALL {
            writeln!(writer, "| {} | {} |", kind, summary.count(kind))?;
        }

        for kind in ViolationKind::ALL {
            let matching: Vec<_> = report.violations.iter().filter(|v| v.kind == kind).collect();
            if matching.is_empty() {
                continue;
            }
            writeln!(writer, "\n## {}\n", section_title(kind))?;

            for violation in matching {
                let location = violation.primary_location();
                writeln!(
                    writer,
                    "- **{}** `{}:{}`: {}",
                    violation.severity, location.path, location.line, violation.message
                )?;
                if self.quiet {
                    continue;
                }
                if let Some(snippet) = report.snippet(location) {
                    writeln!(writer, "  - `{}`", snippet.replace('`', "'"))?;
                }
                if let Some(suggestion) = &violation.suggestion {
                    writeln!(writer, "  - *{}*", suggestion)?;
                }
            }
        }

        let warnings = &report.result.warnings;
        if !self.quiet && !warnings.is_empty() {
            writeln!(writer, "\n## Warnings\n")?;
            for warning in warnings {
                match warning.line {
                    Some(line) => writeln!(
                        writer,
                        "- `{}:{}` {} ({})",
                        warning.path, line, warning.message, warning.kind
                    )?,
                    None => writeln!(
                        writer,
                        "- `{}` {} ({})",
                        warning.path, warning.message, warning.kind
                    )?,
                }
            }
        }

        Ok(())
    }
}
