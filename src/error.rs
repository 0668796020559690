use thiserror::Error;

#[derive(Error, Debug)]
pub enum Wp2OrgError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input file not found: {path}")]
    InputNotFound { path: String },

    #[error("Failed to parse WordPress export {path}: {source}")]
    XmlParse {
        path: String,
        #[source]
        source: roxmltree::Error,
    },

    #[error("{program} exited with status {status} and error {stderr} when parsing: {input}")]
    Conversion {
        program: String,
        status: String,
        stderr: String,
        input: String,
    },

    #[error("Markup converter could not be started: {program}")]
    ConverterUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for Wp2OrgError {
    fn user_message(&self) -> String {
        match self {
            Wp2OrgError::InputNotFound { path } => {
                format!("Input file not found: {}", path)
            }
            Wp2OrgError::XmlParse { path, source } => {
                format!("Could not parse {} as XML: {}", path, source)
            }
            Wp2OrgError::Conversion {
                program,
                status,
                stderr,
                input,
            } => {
                format!(
                    "{} failed with status {}: {}\nOffending input ({}):\n{}",
                    program,
                    status,
                    stderr.trim(),
                    format_bytes(input.len() as u64),
                    preview(input, 400)
                )
            }
            Wp2OrgError::ConverterUnavailable { program, source } => {
                format!("Could not run markup converter '{}': {}", program, source)
            }
            Wp2OrgError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            Wp2OrgError::Cancelled => "Operation was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Wp2OrgError::InputNotFound { .. } => Some(
                "Check the path to the XML file exported from WordPress (Dashboard, Tools, Export).".to_string()
            ),
            Wp2OrgError::XmlParse { .. } => Some(
                "Make sure the file is a complete WordPress export (WXR). Partial downloads are not valid XML.".to_string()
            ),
            Wp2OrgError::Conversion { .. } => Some(
                "The converter rejected a post body. Fix the post in WordPress or check the converter installation, then run again.".to_string()
            ),
            Wp2OrgError::ConverterUnavailable { .. } => Some(
                "Install pandoc (https://pandoc.org) or set [converter] program in your configuration file.".to_string()
            ),
            Wp2OrgError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for Wp2OrgError {
    fn from(error: toml::de::Error) -> Self {
        Wp2OrgError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Wp2OrgError>;

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

/// Truncates long converter input so error output stays readable.
fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
