pub mod cli;
pub mod config;
pub mod converter;
pub mod error;
pub mod extractor;
pub mod renderer;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, ConverterConfig, OutputConfig};
pub use error::{Result, UserFriendlyError, Wp2OrgError};

// Core functionality re-exports
pub use converter::{MarkupConverter, ProcessConverter};
pub use extractor::{ExtractionProgress, PostRecord, WxrReader};
pub use renderer::{OrgWriter, RenderConfig, RenderMode, RenderReport, RenderedPost};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use std::path::Path;

/// Main library interface: read a WordPress export and write org files.
pub struct Wp2Org {
    config: Config,
    converter: Box<dyn MarkupConverter>,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl Wp2Org {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let converter = Box::new(ProcessConverter::from_config(&config.converter));
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);
        let output_formatter =
            OutputFormatter::new(output_mode, verbose, quiet).with_progress(progress_manager.clone());
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            converter,
            output_formatter,
            progress_manager,
            shutdown,
        })
    }

    /// Builds an instance around any converter, without touching signal handlers.
    pub fn with_converter(config: Config, converter: Box<dyn MarkupConverter>, output_formatter: OutputFormatter) -> Self {
        Self {
            config,
            converter,
            output_formatter,
            progress_manager: ProgressManager::new(false),
            shutdown: GracefulShutdown::new_for_test(),
        }
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbosity_level(), cli_args.quiet)
    }

    /// Extracts every post of `in_file` and writes them per the output config.
    pub fn convert_file(&self, in_file: &Path) -> Result<RenderReport> {
        self.shutdown.check_shutdown()?;

        self.output_formatter.start_operation("Parsing xml ...");
        let posts = self.extract_posts(in_file)?;
        self.output_formatter
            .info(&format!("Found {} posts in {}", posts.len(), in_file.display()));

        self.output_formatter.start_operation("Writing posts...");
        let report = self.write_posts(&posts)?;

        self.output_formatter.success("Done!");
        Ok(report)
    }

    pub fn extract_posts(&self, in_file: &Path) -> Result<Vec<PostRecord>> {
        let reader = WxrReader::new(self.converter.as_ref(), &self.output_formatter);
        let progress_bar = self.progress_manager.create_spinner("Converting posts");

        let posts = reader.read_file_with(in_file, |progress| {
            let message = format!(
                "{}/{} {}",
                progress.posts_processed,
                progress.total_posts,
                progress.current_post.as_deref().unwrap_or_default()
            );
            ui::progress::update_post_progress(&progress_bar, progress.posts_processed, &message);
            self.shutdown.check_shutdown()
        });

        match posts {
            Ok(posts) => {
                ui::progress::finish_progress_with_summary(
                    &progress_bar,
                    &format!("Converted {} posts", posts.len()),
                    progress_bar.elapsed(),
                );
                Ok(posts)
            }
            Err(e) => {
                progress_bar.abandon();
                Err(e)
            }
        }
    }

    pub fn write_posts(&self, posts: &[PostRecord]) -> Result<RenderReport> {
        let writer = OrgWriter::new(self.config.render_config(), &self.output_formatter);
        let progress_bar = self
            .progress_manager
            .create_post_progress(posts.len() as u64, "Writing");

        let report = writer.write_posts_with(posts, |index, post| {
            ui::progress::update_post_progress(&progress_bar, index + 1, &post.display_name());
            self.shutdown.check_shutdown()
        });

        match report {
            Ok(report) => {
                ui::progress::finish_progress_with_summary(
                    &progress_bar,
                    &format!("Wrote {}", report.output_path.display()),
                    report.elapsed,
                );
                Ok(report)
            }
            Err(e) => {
                progress_bar.abandon();
                Err(e)
            }
        }
    }

    /// Runs the configured converter with `--version`.
    pub fn check_converter(&self) -> Result<String> {
        ProcessConverter::from_config(&self.config.converter).check_available()
    }

    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    pub fn handle_error(&self, error: &Wp2OrgError) {
        self.progress_manager.clear();
        self.output_formatter.print_user_friendly_error(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct UppercaseConverter;

    impl MarkupConverter for UppercaseConverter {
        fn convert(&self, html: &str) -> Result<String> {
            Ok(html.to_uppercase())
        }
    }

    const EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/" xmlns:wp="http://wordpress.org/export/1.2/">
<channel>
<item>
<title>One</title>
<pubDate>Mon, 03 Jan 2011 10:00:00 +0000</pubDate>
<content:encoded><![CDATA[body one]]></content:encoded>
<wp:post_id>10</wp:post_id>
</item>
</channel>
</rss>"#;

    fn app(temp_dir: &TempDir) -> Wp2Org {
        let mut config = Config::default();
        config.output.name = temp_dir.path().join("out").to_string_lossy().to_string();
        Wp2Org::with_converter(config, Box::new(UppercaseConverter), OutputFormatter::silent())
    }

    #[test]
    fn test_convert_file_end_to_end() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("export.xml");
        std::fs::write(&input, EXPORT).unwrap();

        let report = app(&temp_dir).convert_file(&input).unwrap();

        let content = std::fs::read_to_string(temp_dir.path().join("out.org")).unwrap();
        assert!(content.starts_with("* One ::\n"));
        assert!(content.contains(":POST_DATE: [2011-01-03 Mon 10:00]"));
        assert!(content.contains("  BODY ONE\n"));
        assert_eq!(report.posts_written, 1);
    }

    #[test]
    fn test_cancelled_run_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("export.xml");
        std::fs::write(&input, EXPORT).unwrap();

        let app = app(&temp_dir);
        app.request_shutdown();

        assert!(matches!(app.convert_file(&input), Err(Wp2OrgError::Cancelled)));
        assert!(!temp_dir.path().join("out.org").exists());
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sample.toml");

        Wp2Org::generate_sample_config(&config_path).unwrap();

        let content = std::fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[converter]"));
        assert!(content.contains("[output]"));
    }
}
