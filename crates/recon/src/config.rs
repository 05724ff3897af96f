use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Run configuration. Every section is optional; an empty file is valid.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReconConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Worker pool size. Unset uses the global rayon pool.
    #[serde(default)]
    pub threads: Option<usize>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default)]
    pub line_ending: LineEnding,
    /// Optional path for the JSON run summary.
    #[serde(default)]
    pub summary_json: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            delimiter: default_delimiter(),
            line_ending: LineEnding::default(),
            summary_json: None,
        }
    }
}

impl OutputConfig {
    /// The delimiter as a single byte. Only meaningful after validation.
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter.as_bytes().first().copied().unwrap_or(b';')
    }
}

fn default_delimiter() -> String {
    ";".into()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// `part;master` lines.
    Text,
    Csv,
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Text
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineEnding {
    Lf,
    Crlf,
}

impl Default for LineEnding {
    fn default() -> Self {
        Self::Lf
    }
}

impl LineEnding {
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Self::Lf => b"\n",
            Self::Crlf => b"\r\n",
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.engine.threads == Some(0) {
            return Err(ReconError::ConfigValidation(
                "engine.threads must be at least 1".into(),
            ));
        }

        let delim = self.output.delimiter.as_bytes();
        if delim.len() != 1 || !delim[0].is_ascii() {
            return Err(ReconError::ConfigValidation(format!(
                "output.delimiter must be a single ASCII character, got {:?}",
                self.output.delimiter
            )));
        }
        if matches!(delim[0], b'\r' | b'\n') {
            return Err(ReconError::ConfigValidation(
                "output.delimiter cannot be a line break".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
name = "Nightly parts"

[engine]
threads = 4

[output]
format = "csv"
delimiter = "|"
line_ending = "crlf"
summary_json = "out/summary.json"
"#;

    #[test]
    fn parse_full() {
        let config = ReconConfig::from_toml(FULL).unwrap();
        assert_eq!(config.name.as_deref(), Some("Nightly parts"));
        assert_eq!(config.engine.threads, Some(4));
        assert_eq!(config.output.format, OutputFormat::Csv);
        assert_eq!(config.output.delimiter_byte(), b'|');
        assert_eq!(config.output.line_ending, LineEnding::Crlf);
        assert_eq!(config.output.summary_json.as_deref(), Some("out/summary.json"));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = ReconConfig::from_toml("").unwrap();
        assert!(config.name.is_none());
        assert!(config.engine.threads.is_none());
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.output.delimiter_byte(), b';');
        assert_eq!(config.output.line_ending.as_bytes(), b"\n");
        assert!(ReconConfig::default().validate().is_ok());
    }

    #[test]
    fn reject_zero_threads() {
        let err = ReconConfig::from_toml("[engine]\nthreads = 0\n").unwrap_err();
        assert!(err.to_string().contains("engine.threads"));
    }

    #[test]
    fn reject_multi_char_delimiter() {
        let err = ReconConfig::from_toml("[output]\ndelimiter = \";;\"\n").unwrap_err();
        assert!(err.to_string().contains("single ASCII character"));
    }

    #[test]
    fn reject_newline_delimiter() {
        let err = ReconConfig::from_toml("[output]\ndelimiter = \"\\n\"\n").unwrap_err();
        assert!(err.to_string().contains("line break"));
    }

    #[test]
    fn reject_unknown_format() {
        let err = ReconConfig::from_toml("[output]\nformat = \"xml\"\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }
}
