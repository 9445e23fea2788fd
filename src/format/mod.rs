//! Listing formats for a decoded sweep

mod json;
mod csv;

use crate::{DecoderConfig, DisassemblyError, Line};
use std::fmt;
use std::str::FromStr;
use clap::ValueEnum;

/// Supported output formats for a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output (default)
    #[default]
    Text,
    /// JSON document with the decoder configuration and every line
    Json,
    /// JSON Lines format (one JSON object per line)
    #[value(name = "jsonl")]
    JsonLines,
    /// CSV format (comma-separated values)
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::JsonLines => write!(f, "jsonl"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "jsonlines" => Ok(OutputFormat::JsonLines),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

impl OutputFormat {
    /// Get all available output formats
    pub fn available_formats() -> &'static [Self] {
        &[
            OutputFormat::Text,
            OutputFormat::Json,
            OutputFormat::JsonLines,
            OutputFormat::Csv,
        ]
    }

    /// Get a formatter for this output format
    pub fn get_formatter(&self) -> Box<dyn ListingFormatter> {
        match self {
            OutputFormat::Text => Box::new(TextFormatter),
            OutputFormat::Json => Box::new(JsonFormatter),
            OutputFormat::JsonLines => Box::new(JsonLinesFormatter),
            OutputFormat::Csv => Box::new(CsvFormatter),
        }
    }
}

/// Formatter trait for a decoded listing
pub trait ListingFormatter {
    /// Format the lines decoded under `config`
    fn format(&self, lines: &[Line], config: &DecoderConfig) -> Result<String, DisassemblyError>;
}

/// Format a listing in plain text
pub struct TextFormatter;

/// Format a listing in JSON
pub struct JsonFormatter;

/// Format a listing in JSON Lines
pub struct JsonLinesFormatter;

/// Format a listing in CSV
pub struct CsvFormatter;

impl ListingFormatter for TextFormatter {
    fn format(&self, lines: &[Line], config: &DecoderConfig) -> Result<String, DisassemblyError> {
        let mut output = String::new();
        // Addresses are padded to the width of the mode.
        let width = (config.mode.bits() / 4) as usize;

        output.push_str(&format!(
            "Disassembly at 0x{:x} ({}, {}):\n\n",
            config.pc, config.mode, config.syntax
        ));

        for line in lines {
            output.push_str(&format!(
                "0x{:0width$x}: {:<40} ; {}\n",
                line.address,
                line.text,
                line.hex,
                width = width
            ));
        }

        Ok(output)
    }
}
