//! Terminal output for the command-line harness.
//!
//! Colored status lines, a spinner for long acquisitions, and renderers for
//! acquisition outcomes and verification results.

use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use std::time::Duration;

use crate::models::{AcquisitionOutcome, CandidateSource, ClaimVerificationResult};

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
}

/// Status icons for different operations.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
        Status::Info => "ℹ",
    }
}

/// Print a styled status line to stderr.
pub fn print_status(status: Status, msg: &str) {
    let icon = status_icon(status);
    match status {
        Status::Success => eprintln!("{} {}", icon.green().bold(), msg),
        Status::Error => eprintln!("{} {}", icon.red().bold(), msg),
        Status::Warning => eprintln!("{} {}", icon.yellow().bold(), msg),
        Status::Info => eprintln!("{} {}", icon.cyan().bold(), msg),
    }
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    println!("{}", format!("━━━ {} ━━━", title).bold().cyan());
}

/// Truncate to `max_len` characters, ending in "..." when shortened.
pub fn truncate_with_ellipsis(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return "...".to_string();
    }
    let kept: String = s.chars().take(max_len - 3).collect();
    format!("{}...", kept)
}

/// Render an acquisition outcome for a person reading the terminal.
pub fn print_outcome(url: &str, outcome: &AcquisitionOutcome) {
    match outcome.content() {
        Some(content) => {
            print_section(&format!("{} ({} chars)", content.provenance, content.length));
            println!("{}", content.text);
        }
        None => print_status(Status::Error, &outcome.user_message(url)),
    }
}

fn print_source(index: usize, source: &CandidateSource) {
    let marker = if source.trusted {
        "trusted".green().bold().to_string()
    } else {
        "other".dimmed().to_string()
    };
    println!("{:>2}. [{}] {}", index + 1, marker, source.title.bold());
    println!("    {}", source.url.blue());
    if !source.snippet.is_empty() {
        println!("    {}", truncate_with_ellipsis(&source.snippet, 200).dimmed());
    }
}

/// Render a verification result for a person reading the terminal.
pub fn print_verification(result: &ClaimVerificationResult) {
    print_section(&format!("Sources for \"{}\"", result.claim));
    if result.sources.is_empty() {
        print_status(Status::Warning, "No sources found");
        return;
    }
    for (index, source) in result.sources.iter().enumerate() {
        print_source(index, source);
    }

    if let Some(evidence) = &result.best_evidence {
        print_section("Evidence from top trusted source");
        println!("{}", evidence);
    }
}

/// Spinner shown while the chain or the verifier works.
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    /// Create a new spinner with the given message.
    pub fn new(msg: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// A spinner that draws nothing (non-terminal or quiet output).
    pub fn hidden() -> Self {
        Self {
            pb: ProgressBar::hidden(),
        }
    }

    /// Set the message.
    pub fn set_message(&self, msg: &str) {
        self.pb.set_message(msg.to_string());
    }

    /// Clear the spinner from the terminal.
    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_icon() {
        assert_eq!(status_icon(Status::Success), "✓");
        assert_eq!(status_icon(Status::Error), "✗");
        assert_eq!(status_icon(Status::Info), "ℹ");
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("Hello", 10), "Hello");
        assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
        assert_eq!(truncate_with_ellipsis("", 10), "");
        assert_eq!(truncate_with_ellipsis("Hello", 3), "...");
        assert_eq!(truncate_with_ellipsis("héllo wörld", 8), "héllo...");
    }

    #[test]
    fn test_hidden_spinner() {
        let spinner = Spinner::hidden();
        spinner.set_message("working");
        spinner.finish();
    }
}
