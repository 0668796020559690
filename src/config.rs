use crate::error::{Wp2OrgError, Result};
use crate::renderer::RenderConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub converter: ConverterConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub program: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub name: String,
    pub level: usize,
    pub separate_files: bool,
    pub prefix_date: bool,
    pub skip_first_post_on_create: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: "pandoc".to_string(),
            args: vec![
                "-r".to_string(),
                "html".to_string(),
                "-t".to_string(),
                "org".to_string(),
                "--wrap=none".to_string(),
                "-".to_string(),
            ],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            name: "org-posts".to_string(),
            level: 1,
            separate_files: false,
            prefix_date: false,
            skip_first_post_on_create: true,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(Wp2OrgError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Wp2OrgError::Config {
                message: format!("Failed to read config file {}: {}", path.display(), e),
            })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Wp2OrgError::Config {
                message: format!("Failed to parse config file {}: {}", path.display(), e),
            })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["wp2org.toml", ".wp2org.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref name) = cli_args.output_name {
            self.output.name = name.clone();
        }

        if let Some(level) = cli_args.level {
            self.output.level = level;
        }

        // Flags can only switch these on; a config file may already have.
        if cli_args.separate_files {
            self.output.separate_files = true;
        }

        if cli_args.prefix_date {
            self.output.prefix_date = true;
        }

        if cli_args.keep_first_post {
            self.output.skip_first_post_on_create = false;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.converter.program.trim().is_empty() {
            return Err(Wp2OrgError::Config {
                message: "Converter program must not be empty".to_string(),
            });
        }

        if self.output.name.trim().is_empty() {
            return Err(Wp2OrgError::Config {
                message: "Output name must not be empty".to_string(),
            });
        }

        if self.output.level == 0 {
            return Err(Wp2OrgError::Config {
                message: "Heading level must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            output_name: self.output.name.clone(),
            indent_level: self.output.level,
            separate_files: self.output.separate_files,
            prefix_date: self.output.prefix_date,
            skip_first_post_on_create: self.output.skip_first_post_on_create,
        }
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub output_name: Option<String>,
    pub level: Option<usize>,
    pub separate_files: bool,
    pub prefix_date: bool,
    pub keep_first_post: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_name(mut self, name: Option<String>) -> Self {
        self.output_name = name;
        self
    }

    pub fn with_level(mut self, level: Option<usize>) -> Self {
        self.level = level;
        self
    }

    pub fn with_separate_files(mut self, separate: bool) -> Self {
        self.separate_files = separate;
        self
    }

    pub fn with_prefix_date(mut self, prefix: bool) -> Self {
        self.prefix_date = prefix;
        self
    }

    pub fn with_keep_first_post(mut self, keep: bool) -> Self {
        self.keep_first_post = keep;
        self
    }
}
