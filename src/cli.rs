use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "wp2org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Convert wordpress.xml to org2blog posts")]
#[command(
    long_about = "wp2org reads a WordPress export (Dashboard, Tools, Export, Posts) and \
                  writes the posts as org-mode text, either as subtrees of a single file \
                  or as one file per post. Post bodies are converted with pandoc."
)]
#[command(after_help = "EXAMPLES:\n  \
    wp2org wordpress.xml\n  \
    wp2org wordpress.xml --level 2 --out-file blog\n  \
    wp2org wordpress.xml --buffer --prefix-date --out-file posts\n  \
    wp2org --generate-config --config wp2org.toml")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// The input xml file exported from WordPress
    #[arg(required_unless_present_any = ["generate_config", "check_converter"])]
    pub in_file: Option<PathBuf>,

    /// Write a separate file for each post
    #[arg(long)]
    pub buffer: bool,

    /// Prefix the post file names with the publish date (with --buffer)
    #[arg(long)]
    pub prefix_date: bool,

    /// Level of the subtree when writing a single file [default: 1]
    #[arg(short, long)]
    pub level: Option<usize>,

    /// File or directory name for output [default: org-posts]
    #[arg(short, long)]
    pub out_file: Option<String>,

    /// Also write the post that creates the --buffer output directory
    #[arg(long)]
    pub keep_first_post: bool,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for messages
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output (-v shows debug messages)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only errors are printed)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Check that the markup converter can be run, then exit
    #[arg(long)]
    pub check_converter: bool,

    /// Generate a sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_output_name(self.out_file.clone())
            .with_level(self.level)
            .with_separate_files(self.buffer)
            .with_prefix_date(self.prefix_date)
            .with_keep_first_post(self.keep_first_post)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["wp2org", "export.xml"]).unwrap();
        assert_eq!(cli.in_file, Some(PathBuf::from("export.xml")));
        assert!(!cli.buffer);
        assert!(!cli.prefix_date);
        assert_eq!(cli.level, None);
        assert_eq!(cli.out_file, None);

        let config = cli.load_config().unwrap();
        assert_eq!(config.output.level, 1);
        assert_eq!(config.output.name, "org-posts");
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "wp2org",
            "export.xml",
            "--buffer",
            "--prefix-date",
            "-l",
            "3",
            "-o",
            "blog",
            "--keep-first-post",
        ])
        .unwrap();

        let overrides = cli.create_cli_overrides();
        assert!(overrides.separate_files);
        assert!(overrides.prefix_date);
        assert!(overrides.keep_first_post);
        assert_eq!(overrides.level, Some(3));
        assert_eq!(overrides.output_name.as_deref(), Some("blog"));
    }

    #[test]
    fn test_long_option_names() {
        let cli = Cli::try_parse_from(["wp2org", "export.xml", "--level", "2", "--out-file", "x"])
            .unwrap();
        assert_eq!(cli.level, Some(2));
        assert_eq!(cli.out_file.as_deref(), Some("x"));
    }

    #[test]
    fn test_in_file_required() {
        assert!(Cli::try_parse_from(["wp2org", "--buffer"]).is_err());
        assert!(Cli::try_parse_from(["wp2org", "--generate-config"]).is_ok());
    }

    #[test]
    fn test_invalid_level_rejected() {
        assert!(Cli::try_parse_from(["wp2org", "export.xml", "-l", "many"]).is_err());

        let cli = Cli::try_parse_from(["wp2org", "export.xml", "-l", "0"]).unwrap();
        assert!(cli.load_config().is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["wp2org", "export.xml", "-q", "-v"]).is_err());

        let cli = Cli::try_parse_from(["wp2org", "export.xml", "-vv"]).unwrap();
        assert_eq!(cli.verbosity_level(), 2);
    }
}
