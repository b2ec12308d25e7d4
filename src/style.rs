//! Styling for the status lines the CLI prints to stderr, and terminal
//! rendering of markdown reports.

use colored::Colorize;
use std::io::{self, IsTerminal, Write};

/// Print an error message to stderr
pub fn error(msg: &str) {
    eprintln!("{} {}", "error:".red().bold(), msg);
}

/// Print a success message to stderr
pub fn success(msg: &str) {
    eprintln!("{} {}", "✓".green().bold(), msg);
}

/// Print a hint message to stderr (dimmed)
pub fn hint(msg: &str) {
    eprintln!("{} {}", "hint:".dimmed(), msg.dimmed());
}

/// Format a path for display (bright white)
pub fn path(p: &std::path::Path) -> String {
    p.display().to_string().bright_white().to_string()
}

/// Check if stdout is a terminal (TTY)
pub fn is_terminal() -> bool {
    io::stdout().is_terminal()
}

/// Render markdown through termimad when `styled`, otherwise write it
/// unchanged so files and pipes get plain markdown.
pub fn render_markdown(markdown: &str, styled: bool, output: &mut dyn Write) -> io::Result<()> {
    if styled {
        write!(output, "{}", report_skin().term_text(markdown))
    } else {
        write!(output, "{}", markdown)
    }
}

fn report_skin() -> termimad::MadSkin {
    use crossterm::style::Color;
    use termimad::{MadSkin, StyledChar};

    let mut skin = MadSkin::default();
    skin.set_headers_fg(Color::Cyan);
    // severities and the verdict
    skin.bold.set_fg(Color::Red);
    // suggestions
    skin.italic.set_fg(Color::DarkGrey);
    // paths and source snippets
    skin.inline_code.set_fg(Color::Yellow);
    skin.bullet = StyledChar::from_fg_char(Color::Blue, '•');
    skin
}
