use crate::config::ConverterConfig;
use crate::converter::MarkupConverter;
use crate::error::{Wp2OrgError, Result};
use std::io::Write;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

/// Runs an external text filter (pandoc by default) once per conversion.
///
/// The HTML goes in on stdin and org text comes back on stdout. A non-zero
/// exit status or anything written to stderr fails the conversion.
#[derive(Debug, Clone)]
pub struct ProcessConverter {
    program: String,
    args: Vec<String>,
}

impl ProcessConverter {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn pandoc() -> Self {
        Self::from_config(&ConverterConfig::default())
    }

    pub fn from_config(config: &ConverterConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Runs `<program> --version` and returns the first line it prints.
    pub fn check_available(&self) -> Result<String> {
        let output = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| self.unavailable(e))?;

        if !output.status.success() {
            return Err(Wp2OrgError::Conversion {
                program: self.program.clone(),
                status: describe_status(output.status),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                input: "--version".to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().trim().to_string())
    }

    fn unavailable(&self, source: std::io::Error) -> Wp2OrgError {
        Wp2OrgError::ConverterUnavailable {
            program: self.program.clone(),
            source,
        }
    }
}

impl MarkupConverter for ProcessConverter {
    fn convert(&self, html: &str) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.unavailable(e))?;

        // Feed stdin from its own thread so a large body cannot fill the
        // stdout pipe while we are still writing.
        let stdin = child.stdin.take();
        let input = html.as_bytes().to_vec();
        let writer = thread::spawn(move || -> std::io::Result<()> {
            match stdin {
                Some(mut stdin) => stdin.write_all(&input),
                None => Ok(()),
            }
        });

        let output = child.wait_with_output()?;
        let write_result = writer.join().unwrap_or_else(|_| {
            Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "converter stdin writer panicked",
            ))
        });

        if !output.status.success() || !output.stderr.is_empty() {
            return Err(Wp2OrgError::Conversion {
                program: self.program.clone(),
                status: describe_status(output.status),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                input: html.to_string(),
            });
        }

        // The filter exited cleanly but did not read everything we sent.
        write_result?;

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => code.to_string(),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pandoc_defaults() {
        let converter = ProcessConverter::pandoc();
        assert_eq!(converter.program(), "pandoc");
        assert_eq!(
            converter.command_line(),
            "pandoc -r html -t org --wrap=none -"
        );
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let converter = ProcessConverter::new("wp2org-no-such-converter");
        let result = converter.convert("<p>hi</p>");
        assert!(matches!(
            result,
            Err(Wp2OrgError::ConverterUnavailable { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_identity_filter_passes_bytes_through() {
        let converter = ProcessConverter::new("cat");
        let html = "<p>caf\u{e9} #$NEWLINE-MARKER$# ok</p>";
        assert_eq!(converter.convert(html).unwrap(), html);
    }

    #[cfg(unix)]
    #[test]
    fn test_large_input_does_not_deadlock() {
        let converter = ProcessConverter::new("cat");
        let html = "<p>lorem ipsum</p>".repeat(50_000);
        assert_eq!(converter.convert(&html).unwrap().len(), html.len());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_conversion_error() {
        let converter = ProcessConverter::new("sh").with_args(["-c", "cat > /dev/null; exit 1"]);
        match converter.convert("<p>bad</p>") {
            Err(Wp2OrgError::Conversion { status, input, .. }) => {
                assert_eq!(status, "1");
                assert_eq!(input, "<p>bad</p>");
            }
            other => panic!("expected conversion error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_stderr_output_is_conversion_error() {
        let converter =
            ProcessConverter::new("sh").with_args(["-c", "cat; echo 'warning: odd markup' >&2"]);
        match converter.convert("<p>odd</p>") {
            Err(Wp2OrgError::Conversion { status, stderr, .. }) => {
                assert_eq!(status, "0");
                assert!(stderr.contains("odd markup"));
            }
            other => panic!("expected conversion error, got {:?}", other),
        }
    }

    #[test]
    fn test_check_available_missing_program() {
        let missing = ProcessConverter::new("wp2org-no-such-converter");
        assert!(matches!(
            missing.check_available(),
            Err(Wp2OrgError::ConverterUnavailable { .. })
        ));
    }
}
