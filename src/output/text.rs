use crate::model::{Severity, ViolationKind};
use crate::output::{OutputFormatter, Report};
use colored::{ColoredString, Colorize};
use std::io::Write;

/// One line per violation, optionally followed by the offending source line.
pub struct TextOutput {
    /// Drop snippets and the warnings section.
    pub quiet: bool,
    pub color: bool,
}

impl TextOutput {
    pub fn new(quiet: bool, color: bool) -> Self {
        Self { quiet, color }
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn severity(&self, severity: Severity) -> String {
        let label = severity.to_string();
        match severity {
            Severity::Error => self.paint(&label, |s| s.red().bold()),
            Severity::Warning => self.paint(&label, |s| s.yellow().bold()),
            Severity::Info => self.paint(&label, |s| s.blue()),
        }
    }
}

impl Default for TextOutput {
    fn default() -> Self {
        Self::new(false, false)
    }
}

impl OutputFormatter for TextOutput {
    fn format<W: Write>(&self, report: &Report<'_>, writer: &mut W) -> std::io::Result<()> {
        for violation in &report.violations {
            let location = violation.primary_location();
            writeln!(
                writer,
                "{}:{}:{}: {}[{}] {}",
                self.paint(&location.path, |s| s.bold()),
                location.line,
                location.column,
                self.severity(violation.severity),
                violation.kind,
                violation.message
            )?;

            if self.quiet {
                continue;
            }

            if let Some(snippet) = report.snippet(location) {
                writeln!(
                    writer,
                    "    {} {}",
                    self.paint(&format!("{:>4} |", location.line), |s| s.dimmed()),
                    snippet
                )?;
            }
            for other in violation.locations.iter().skip(1) {
                writeln!(
                    writer,
                    "    {} {}:{}:{}",
                    self.paint("also", |s| s.dimmed()),
                    other.path,
                    other.line,
                    other.column
                )?;
            }
            if let Some(suggestion) = &violation.suggestion {
                writeln!(writer, "    {} {}", self.paint("= help:", |s| s.cyan()), suggestion)?;
            }
        }

        let warnings = &report.result.warnings;
        if !self.quiet && !warnings.is_empty() {
            if !report.violations.is_empty() {
                writeln!(writer)?;
            }
            writeln!(writer, "{}", self.paint("warnings:", |s| s.yellow().bold()))?;
            for warning in warnings {
                let place = match warning.line {
                    Some(line) => format!("{}:{}", warning.path, line),
                    None => warning.path.clone(),
                };
                writeln!(writer, "  {}: {} [{}]", place, warning.message, warning.kind)?;
            }
        }

        let summary = &report.summary;
        let counts: Vec<String> = ViolationKind::ALL
            .iter()
            .map(|&kind| format!("{} {}", summary.count(kind), kind))
            .collect();
        let verdict = if summary.passed {
            self.paint("passed", |s| s.green().bold())
        } else {
            self.paint("failed", |s| s.red().bold())
        };
        if !report.violations.is_empty() || !self.quiet {
            writeln!(writer)?;
        }
        writeln!(
            writer,
            "{} {} ({} errors, {} warnings); {}",
            self.paint("summary:", |s| s.bold()),
            counts.join(", "),
            summary.errors,
            summary.warnings,
            verdict
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::mixed_result;

    fn render(output: TextOutput) -> String {
        let result = mixed_result();
        let report = Report::new(&result, Severity::Error);
        let mut buffer = Vec::new();
        output.format(&report, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_text_output() {
        let text = render(TextOutput::default());
        assert!(text.starts_with(
            "src/core/x.ts:2:1: error[layer-direction] core module `src/core` may not import feature module `src/modules/auth`\n"
        ));
        assert!(text.contains("       2 | import { login } from '@/modules/auth';\n"));
        assert!(text.contains("error[cycle] Dependency cycle between 2 feature modules"));
        assert!(text.contains("    also src/modules/billing/index.ts:1:1\n"));
        assert!(text.contains("warnings:\n  src/main.ts: file matches no layer"));
        assert!(text.ends_with(
            "summary: 1 layer-direction, 1 deep-import, 1 cycle (3 errors, 0 warnings); failed\n"
        ));
    }

    #[test]
    fn test_quiet_text_output() {
        let text = render(TextOutput::new(true, false));
        assert_eq!(text.lines().count(), 5);
        assert!(!text.contains(" | "));
        assert!(!text.contains("warnings:"));
    }
}
