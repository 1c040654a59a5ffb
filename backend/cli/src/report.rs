//! Terminal output: ANSI notes and the verification checklist.

use dropcheck_core::VerificationResult;

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

/// Strip ANSI escape codes from a string.
#[cfg(test)]
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

/// Print a formatted INFO note to stderr.
pub fn note_info(msg: &str) {
    if supports_color() {
        eprintln!("{CYAN}{BOLD}ℹ{RESET} {msg}");
    } else {
        eprintln!("INFO: {msg}");
    }
}

/// Print a formatted WARNING note.
pub fn note_warn(msg: &str) {
    if supports_color() {
        eprintln!("{YELLOW}{BOLD}⚠{RESET} {msg}");
    } else {
        eprintln!("WARN: {msg}");
    }
}

/// Print a formatted ERROR note.
pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}✗{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

/// Print a formatted SUCCESS note.
pub fn note_success(msg: &str) {
    if supports_color() {
        eprintln!("{GREEN}{BOLD}✓{RESET} {msg}");
    } else {
        eprintln!("OK: {msg}");
    }
}

fn mark(passed: bool, color: bool) -> String {
    match (passed, color) {
        (true, true) => format!("{GREEN}✓ pass{RESET}"),
        (false, true) => format!("{RED}✗ fail{RESET}"),
        (true, false) => "[x] pass".to_string(),
        (false, false) => "[ ] fail".to_string(),
    }
}

/// Render the banner, summary, and six-row checklist. Nothing for `None`.
pub fn render_report(result: Option<&VerificationResult>, color: bool) -> String {
    let Some(result) = result else {
        return String::new();
    };

    let passed = result.overall_passed();
    let mut out = String::new();
    let banner = if color {
        let tint = if passed { GREEN } else { RED };
        format!("{tint}{BOLD}{}{RESET}", result.banner())
    } else {
        result.banner().to_string()
    };
    out.push_str(&banner);
    out.push('\n');
    if color {
        out.push_str(&format!("{DIM}{}{RESET}\n\n", result.summary));
    } else {
        out.push_str(&format!("{}\n\n", result.summary));
    }

    let items = result.checklist();
    let width = items.iter().map(|i| i.label.len()).max().unwrap_or(0);
    for item in items {
        out.push_str(&format!(
            "  {:<width$}  {}\n",
            item.label,
            mark(item.passed, color)
        ));
    }
    out
}
