//! CSV output formatter

use crate::{DecoderConfig, DisassemblyError, Line};
use super::ListingFormatter;

impl ListingFormatter for super::CsvFormatter {
    fn format(&self, lines: &[Line], config: &DecoderConfig) -> Result<String, DisassemblyError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        let base_addr = format!("0x{:x}", config.pc);

        writer
            .write_record(&["base_address", "address", "offset", "size", "bytes", "text"])
            .map_err(csv_error)?;

        for line in lines {
            writer
                .write_record(&[
                    base_addr.clone(),
                    format!("0x{:x}", line.address),
                    format!("0x{:x}", line.offset),
                    line.size.to_string(),
                    line.hex.clone(),
                    line.text.clone(),
                ])
                .map_err(csv_error)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| DisassemblyError::Generic(format!("CSV serialization error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| DisassemblyError::Generic(format!("CSV serialization error: {}", e)))
    }
}

fn csv_error(e: csv::Error) -> DisassemblyError {
    DisassemblyError::Generic(format!("CSV serialization error: {}", e))
}
