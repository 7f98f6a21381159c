//! EO Protocol Tool Configuration
//!
//! Loads codec tool settings from a `key = value` text file, the same format
//! as a server's `serveroptions.txt`. Lines starting with `#` are comments.
//!
//! ```text
//! # eoproto.txt
//! sanitizestrings = true
//! sequencestart = 120
//! width = 2
//! loglevel = debug
//! ```

use std::fs;
use std::path::Path;

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "eoproto.txt";

/// Settings for the codec tool
#[derive(Debug, Clone, PartialEq)]
pub struct CodecConfig {
    /// Replace 0xFF in written strings (from "sanitizestrings" option)
    pub sanitize_strings: bool,
    /// Base for generated sequence numbers (from "sequencestart" option)
    pub sequence_start: i32,
    /// Default number width in bytes, 1 to 4 (from "width" option)
    pub width: u8,
    /// Log filter used when RUST_LOG is unset (from "loglevel" option)
    pub log_level: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            sanitize_strings: false,
            sequence_start: 0,
            width: 2,
            log_level: "warn".into(),
        }
    }
}

impl CodecConfig {
    /// Load configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        Ok(config)
    }

    /// Load `eoproto.txt` from the working directory, or defaults if absent
    pub fn load_default() -> Result<Self, Box<dyn std::error::Error>> {
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            Self::load_from_file(DEFAULT_CONFIG_FILE)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config file content
    pub fn parse(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = Self::default();

        for (number, line) in content.lines().enumerate() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match line.split_once('=') {
                Some((key, value)) => config.parse_option(key.trim(), value.trim())?,
                None => {
                    tracing::warn!(line = number + 1, "ignoring config line without '='");
                }
            }
        }

        Ok(config)
    }

    fn parse_option(&mut self, key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
        match key.to_lowercase().as_str() {
            "sanitizestrings" => {
                self.sanitize_strings = value.parse()?;
            }
            "sequencestart" => {
                self.sequence_start = value.parse()?;
            }
            "width" => {
                let width: u8 = value.parse()?;
                if !(1..=4).contains(&width) {
                    return Err(format!("width must be between 1 and 4, got {}", width).into());
                }
                self.width = width;
            }
            "loglevel" => self.log_level = value.into(),
            _ => {
                tracing::warn!(key, "unknown config option");
            }
        }
        Ok(())
    }

    /// Display configuration summary
    pub fn display(&self) {
        tracing::info!("Codec configuration:");
        tracing::info!("  Sanitize strings: {}", self.sanitize_strings);
        tracing::info!("  Sequence start: {}", self.sequence_start);
        tracing::info!("  Number width: {} byte(s)", self.width);
        tracing::info!("  Log level: {}", self.log_level);
    }
}
