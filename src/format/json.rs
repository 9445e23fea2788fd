//! JSON and JSON Lines output formatters

use serde::{Serialize, Deserialize};

use crate::{DecoderConfig, DisassemblyError, Line};
use super::ListingFormatter;

/// Serializable instruction for JSON output
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct InstructionJson {
    /// Virtual address of the instruction
    pub(crate) address: String,
    /// Offset from the program-counter base
    pub(crate) offset: String,
    /// Size of the instruction in bytes
    pub(crate) size: usize,
    /// Bytes of the instruction as hex string
    pub(crate) bytes: String,
    /// Rendered instruction text
    pub(crate) text: String,
}

/// Serializable listing for JSON output
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ListingJson {
    /// Configuration the listing was decoded with
    pub(crate) config: DecoderConfig,
    /// Decoded instructions in input order
    pub(crate) instructions: Vec<InstructionJson>,
}

impl ListingFormatter for super::JsonFormatter {
    fn format(&self, lines: &[Line], config: &DecoderConfig) -> Result<String, DisassemblyError> {
        let result = ListingJson {
            config: *config,
            instructions: lines.iter().map(instruction_to_json).collect(),
        };

        serde_json::to_string_pretty(&result).map_err(json_error)
    }
}

impl ListingFormatter for super::JsonLinesFormatter {
    fn format(&self, lines: &[Line], _config: &DecoderConfig) -> Result<String, DisassemblyError> {
        let mut output = String::new();

        for line in lines {
            output.push_str(&serde_json::to_string(&instruction_to_json(line)).map_err(json_error)?);
            output.push('\n');
        }

        Ok(output)
    }
}

/// Convert a listing line to JSON format
fn instruction_to_json(line: &Line) -> InstructionJson {
    InstructionJson {
        address: format!("0x{:x}", line.address),
        offset: format!("0x{:x}", line.offset),
        size: line.size,
        bytes: line.hex.clone(),
        text: line.text.clone(),
    }
}

fn json_error(e: serde_json::Error) -> DisassemblyError {
    DisassemblyError::Generic(format!("JSON serialization error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::tests::{create_test_config, create_test_lines};
    use crate::format::{JsonFormatter, JsonLinesFormatter};
    use crate::Mode;

    #[test]
    fn test_json_document() {
        let output = JsonFormatter
            .format(&create_test_lines(), &create_test_config())
            .unwrap();
        let parsed: ListingJson = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed.config.mode, Mode::Bits32);
        assert_eq!(parsed.config.pc, 0x1000);
        assert_eq!(parsed.instructions.len(), 3);
        assert_eq!(parsed.instructions[1].address, "0x1001");
        assert_eq!(parsed.instructions[1].bytes, "89e5");
        assert_eq!(parsed.instructions[1].text, "mov %esp,%ebp");
        assert_eq!(parsed.instructions[2].offset, "0x3");
    }

    #[test]
    fn test_json_lines() {
        let output = JsonLinesFormatter
            .format(&create_test_lines(), &create_test_config())
            .unwrap();
        let rows: Vec<serde_json::Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["address"], "0x1000");
        assert_eq!(rows[0]["size"], 1);
        assert_eq!(rows[2]["text"], "ret");
    }
}
