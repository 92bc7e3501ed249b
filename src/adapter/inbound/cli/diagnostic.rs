//! Miette-based error diagnostics for CLI error presentation.
//!
//! Configuration problems are rendered against the config file itself with
//! a label on the offending key when one can be located. Everything else
//! becomes a [`CommandError`] with a help hint.

use std::ops::Range;
use std::path::Path;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::error::{ConfigError as ConfigFailure, Error, RiskError};

/// Configuration error with source location context.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(bankroll::config))]
pub struct ConfigError {
    pub message: String,

    #[source_code]
    pub src: NamedSource<String>,

    #[label("here")]
    pub span: Option<SourceSpan>,

    #[help]
    pub help: Option<String>,
}

impl ConfigError {
    #[must_use]
    pub fn new(message: impl Into<String>, path: &Path, src: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            src: NamedSource::new(path.display().to_string(), src.into()),
            span: None,
            help: None,
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Range<usize>) -> Self {
        self.span = Some(span.into());
        self
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Failure of a command outside config parsing.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(bankroll::command))]
pub struct CommandError {
    pub message: String,

    #[help]
    pub help: Option<String>,
}

impl CommandError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            help: None,
        }
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Render a config loading failure against the file content.
#[must_use]
pub fn config_report(error: Error, path: &Path, content: &str) -> miette::Report {
    let failure = match error {
        Error::Config(failure) => failure,
        other => return command_report(other),
    };

    let diagnostic = match &failure {
        ConfigFailure::Parse(e) => {
            let diagnostic = ConfigError::new(e.message(), path, content)
                .with_help("check the TOML syntax and field types");
            match e.span() {
                Some(span) => diagnostic.with_span(span),
                None => diagnostic,
            }
        }
        ConfigFailure::MissingField { field } => ConfigError::new(failure.to_string(), path, content)
            .with_help(format!("add `{field}` to the configuration")),
        ConfigFailure::InvalidValue { field, .. } => {
            let diagnostic = ConfigError::new(failure.to_string(), path, content);
            match locate_key(content, field) {
                Some(span) => diagnostic.with_span(span),
                None => diagnostic,
            }
        }
        ConfigFailure::UnknownStrategy { name } => {
            let diagnostic = ConfigError::new(failure.to_string(), path, content)
                .with_help("set `preset` to conservative, balanced, or aggressive");
            match locate_value(content, name) {
                Some(span) => diagnostic.with_span(span),
                None => diagnostic,
            }
        }
        ConfigFailure::ReadFile(_) => {
            return CommandError::new(failure.to_string())
                .with_help("pass --config <path> or run `bankroll config init`")
                .into();
        }
    };
    diagnostic.into()
}

/// Attach a help hint to a runtime failure.
#[must_use]
pub fn command_report(error: Error) -> miette::Report {
    let help = match &error {
        Error::Risk(RiskError::OutOfOrderSnapshot { .. }) => {
            Some("values must be recorded in time order; pass --at with a later time")
        }
        Error::Risk(RiskError::InvalidValue { .. }) => {
            Some("portfolio values must be finite and non-negative")
        }
        Error::Json(_) => Some("the batch must be a JSON document with an `entries` array"),
        Error::Database(_) | Error::Connection(_) => {
            Some("check the `database` path in the configuration")
        }
        Error::Config(ConfigFailure::UnknownStrategy { .. }) => {
            Some("run `bankroll profiles --config <path>` to list configured strategies")
        }
        _ => None,
    };

    let diagnostic = CommandError::new(error.to_string());
    match help {
        Some(help) => diagnostic.with_help(help).into(),
        None => diagnostic.into(),
    }
}

/// Byte range of `key = ...` for the last segment of a dotted field name.
fn locate_key(content: &str, field: &str) -> Option<Range<usize>> {
    let key = field.rsplit('.').next().unwrap_or(field);
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix(key) {
            if rest.trim_start().starts_with('=') {
                let start = offset + (line.len() - trimmed.len());
                return Some(start..start + trimmed.trim_end().len());
            }
        }
        offset += line.len();
    }
    None
}

/// Byte range of the first quoted occurrence of `value`.
fn locate_value(content: &str, value: &str) -> Option<Range<usize>> {
    let quoted = format!("\"{value}\"");
    content
        .find(&quoted)
        .map(|start| start..start + quoted.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT: &str = "[risk]\nmax_drawdown_threshold = 2.0\n\n[[strategies]]\nname = \"yolo\"\n";

    #[test]
    fn locates_dotted_key() {
        let span = locate_key(CONTENT, "risk.max_drawdown_threshold").unwrap();
        assert_eq!(&CONTENT[span], "max_drawdown_threshold = 2.0");
    }

    #[test]
    fn locates_quoted_value() {
        let span = locate_value(CONTENT, "yolo").unwrap();
        assert_eq!(&CONTENT[span], "\"yolo\"");
    }

    #[test]
    fn missing_key_has_no_span() {
        assert!(locate_key(CONTENT, "capital").is_none());
    }

    #[test]
    fn parse_failures_carry_a_span() {
        let content = "database = \n";
        let error = crate::infrastructure::config::settings::Config::parse_toml(content)
            .unwrap_err();
        let report = config_report(error, Path::new("config.toml"), content);
        let diagnostic = report.downcast_ref::<ConfigError>().unwrap();
        assert!(diagnostic.span.is_some());
    }
}
