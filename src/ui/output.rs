use crate::error::{Wp2OrgError, UserFriendlyError};
use crate::renderer::{RenderMode, RenderReport};
use crate::ui::ProgressManager;
use console::{style, Emoji, Term};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");

/// Console sink handed to the extractor and renderer.
///
/// Verbosity 0 shows everything but debug messages, which need 1 (`-v`).
/// Quiet mode shows errors only. With progress bars attached, every line
/// is printed with the bars suspended.
pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
    progress: Option<ProgressManager>,
    recorder: Option<Arc<Mutex<Vec<String>>>>,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
            progress: None,
            recorder: None,
        }
    }

    /// A formatter that prints nothing but errors, for library callers and tests.
    pub fn silent() -> Self {
        Self::new(OutputMode::Plain, 0, true)
    }

    /// Keeps visible messages as `LEVEL: message` lines instead of printing them.
    pub fn recording(verbose: u8) -> Self {
        Self {
            recorder: Some(Arc::new(Mutex::new(Vec::new()))),
            ..Self::new(OutputMode::Plain, verbose, false)
        }
    }

    pub fn with_progress(mut self, progress: ProgressManager) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Lines kept by a [`recording`](Self::recording) formatter, oldest first.
    pub fn recorded(&self) -> Vec<String> {
        match &self.recorder {
            Some(recorder) => recorder
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
            None => Vec::new(),
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn success(&self, message: &str) {
        if self.should_show_message(0) {
            self.emit("SUCCESS", message, || match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Success, message),
                OutputMode::Json => self.print_json_message("success", message),
                OutputMode::Plain => println!("SUCCESS: {}", message),
            });
        }
    }

    pub fn error(&self, message: &str) {
        self.emit("ERROR", message, || match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        });
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            self.emit("WARNING", message, || match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            });
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(0) {
            self.emit("INFO", message, || match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            });
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(1) {
            self.emit("DEBUG", message, || match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            });
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            self.emit("STARTING", operation, || match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            });
        }
    }

    pub fn print_user_friendly_error(&self, error: &Wp2OrgError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    eprintln!();
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    pub fn print_render_summary(&self, report: &RenderReport) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_summary(report),
            OutputMode::Json => self.print_json_summary(report),
            OutputMode::Plain => self.print_plain_summary(report),
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn emit<F: FnOnce()>(&self, label: &str, message: &str, print: F) {
        if let Some(recorder) = &self.recorder {
            recorder
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(format!("{}: {}", label, message));
            return;
        }

        match &self.progress {
            Some(progress) => progress.suspend(print),
            None => print(),
        }
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        if self.use_colors {
            let (emoji, styled) = match msg_type {
                MessageType::Success => (&CHECKMARK, style(message).green().bold()),
                MessageType::Error => (&CROSS, style(message).red().bold()),
                MessageType::Warning => (&WARNING, style(message).yellow().bold()),
                MessageType::Info => (&INFO, style(message).cyan()),
            };

            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, styled),
                _ => println!("{}{}", emoji, styled),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_summary(&self, report: &RenderReport) {
        println!();
        self.print_separator();

        let emphasize = |value: String| {
            if self.use_colors {
                style(value).cyan().bold().to_string()
            } else {
                value
            }
        };

        println!("  Output:          {}", emphasize(report.output_path.display().to_string()));
        println!("  Mode:            {}", describe_mode(report.mode));
        println!("  Posts written:   {}", emphasize(report.posts_written.to_string()));
        if report.posts_skipped > 0 {
            println!("  Posts skipped:   {}", report.posts_skipped);
        }
        println!("  Bytes written:   {}", emphasize(format_bytes(report.bytes_written)));
        println!("  Time taken:      {}", emphasize(format_duration(report.elapsed)));

        self.print_separator();
    }

    fn print_json_summary(&self, report: &RenderReport) {
        let summary = serde_json::json!({
            "type": "summary",
            "output": report.output_path.display().to_string(),
            "mode": describe_mode(report.mode),
            "posts_written": report.posts_written,
            "posts_skipped": report.posts_skipped,
            "bytes_written": report.bytes_written,
            "duration_ms": report.elapsed.as_millis(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        println!(
            "{}",
            serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_plain_summary(&self, report: &RenderReport) {
        println!("COMPLETED: {}", report.output_path.display());
        println!("Posts written: {}", report.posts_written);
        if report.posts_skipped > 0 {
            println!("Posts skipped: {}", report.posts_skipped);
        }
        println!("Bytes written: {}", report.bytes_written);
        println!("Duration: {:?}", report.elapsed);
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

fn describe_mode(mode: RenderMode) -> &'static str {
    match mode {
        RenderMode::Subtree => "subtree (single file)",
        RenderMode::Buffer => "buffer (file per post)",
    }
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatter_creation() {
        let formatter = OutputFormatter::new(OutputMode::Human, 1, false);
        assert_eq!(formatter.mode(), OutputMode::Human);
        assert_eq!(formatter.verbose_level, 1);
        assert!(!formatter.quiet);
    }

    #[test]
    fn test_quiet_mode() {
        let formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert_eq!(formatter.verbose_level, 0);
        assert!(formatter.quiet);
        assert!(!formatter.use_colors);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_millis(0)), "0ms");
    }

    #[test]
    fn test_should_show_message() {
        let formatter = OutputFormatter::new(OutputMode::Plain, 1, false);
        assert!(formatter.should_show_message(0));
        assert!(formatter.should_show_message(1));
        assert!(!formatter.should_show_message(2));

        let silent = OutputFormatter::silent();
        assert!(!silent.should_show_message(0));
    }

    #[test]
    fn test_info_shows_by_default_and_debug_needs_verbose() {
        let formatter = OutputFormatter::recording(0);
        formatter.info("shown");
        formatter.debug("hidden");
        assert_eq!(formatter.recorded(), vec!["INFO: shown"]);

        let verbose = OutputFormatter::recording(1);
        verbose.info("shown");
        verbose.debug("also shown");
        assert_eq!(verbose.recorded(), vec!["INFO: shown", "DEBUG: also shown"]);
    }

    #[test]
    fn test_recording_keeps_order_and_errors() {
        let formatter = OutputFormatter::recording(0);
        formatter.start_operation("Parsing xml ...");
        formatter.warning("odd date");
        formatter.error("broken");
        assert_eq!(
            formatter.recorded(),
            vec!["STARTING: Parsing xml ...", "WARNING: odd date", "ERROR: broken"]
        );
        assert!(OutputFormatter::silent().recorded().is_empty());
    }

    #[test]
    fn test_printing_with_hidden_progress_attached() {
        let formatter = OutputFormatter::new(OutputMode::Plain, 1, false)
            .with_progress(ProgressManager::new(false));
        formatter.info("printed with the bars suspended");
        formatter.debug("same for debug");
    }
}
