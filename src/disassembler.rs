//! The decode context: configuration, the owned input source and the most
//! recently decoded instruction.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::decoder::{Decoder, Insn, X86Decoder};
use crate::input::Input;
use crate::{Address, DecoderConfig, DisassemblyError, Mode, Syntax, Vendor};

/// A streaming disassembler.
///
/// One instance owns at most one input source and holds a single
/// instruction slot that every [`decode`](Disassembler::decode) overwrites.
/// Accessors read that slot and never advance the input.
#[derive(Debug)]
pub struct Disassembler {
    config: DecoderConfig,
    source: Option<Input>,
    current: Option<Insn>,
}

/// One row of a decoded listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Virtual address (program-counter base plus position)
    pub address: Address,
    /// Position minus program-counter base, wrapping
    pub offset: u64,
    /// Length in bytes
    pub size: usize,
    /// Lowercase hex of the raw bytes
    pub hex: String,
    /// Rendered instruction
    pub text: String,
}

impl Default for Disassembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Disassembler {
    /// A context with default configuration and an empty buffer attached.
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    /// A context with the given configuration and an empty buffer attached.
    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            config,
            source: Some(Input::default()),
            current: None,
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    pub fn vendor(&self) -> Vendor {
        self.config.vendor
    }

    pub fn syntax(&self) -> Syntax {
        self.config.syntax
    }

    pub fn program_counter(&self) -> Address {
        self.config.pc
    }

    /// Set the bit-mode from its width (16, 32 or 64). Any other value is
    /// rejected and the current mode is kept.
    pub fn set_mode(&mut self, bits: u32) -> Result<(), DisassemblyError> {
        match Mode::try_from(bits) {
            Ok(mode) => {
                log::debug!("mode set to {}", mode);
                self.config.mode = mode;
                Ok(())
            }
            Err(e) => {
                log::warn!("{}, keeping {}", e, self.config.mode);
                Err(e)
            }
        }
    }

    pub fn set_vendor(&mut self, vendor: Vendor) {
        log::debug!("vendor set to {}", vendor);
        self.config.vendor = vendor;
    }

    pub fn set_syntax(&mut self, syntax: Syntax) {
        log::debug!("syntax set to {}", syntax);
        self.config.syntax = syntax;
    }

    pub fn set_program_counter(&mut self, pc: Address) {
        log::debug!("program counter base set to {:#x}", pc);
        self.config.pc = pc;
    }

    /// Replace the source with a copy of `data`.
    pub fn attach_buffer(&mut self, data: impl Into<Vec<u8>>) {
        let input = Input::buffer(data);
        log::debug!("attached buffer {:?}", input);
        self.attach(input);
    }

    /// Replace the source with the file at `path`, read sequentially.
    ///
    /// When the file cannot be opened the previous source stays attached.
    pub fn attach_file(&mut self, path: impl AsRef<Path>) -> Result<(), DisassemblyError> {
        let path = path.as_ref();
        match Input::open(path) {
            Ok(input) => {
                log::debug!("attached file {}", path.display());
                self.attach(input);
                Ok(())
            }
            Err(e) => {
                log::warn!("{}", e);
                Err(e)
            }
        }
    }

    /// Replace the source with a sequential reader.
    pub fn attach_reader<R: Read + Send + 'static>(&mut self, reader: R) {
        log::debug!("attached reader");
        self.attach(Input::reader(reader));
    }

    /// Replace the source with an already built input.
    pub fn attach(&mut self, input: Input) {
        self.source = Some(input);
        self.current = None;
    }

    /// Release the source. Decoding returns 0 until another is attached.
    /// Calling this again is a no-op.
    pub fn close(&mut self) {
        if self.source.take().is_some() {
            log::debug!("input closed");
        }
        self.current = None;
    }

    pub fn is_attached(&self) -> bool {
        self.source.is_some()
    }

    /// Bytes consumed from the current source since it was attached.
    pub fn position(&self) -> u64 {
        self.source.as_ref().map_or(0, Input::position)
    }

    /// Advance the source by up to `n` bytes without decoding. Returns the
    /// number of bytes skipped.
    pub fn skip(&mut self, n: u64) -> u64 {
        match self.source.as_mut() {
            Some(source) => {
                let skipped = source.skip(n);
                log::debug!("skipped {} of {} requested bytes", skipped, n);
                skipped
            }
            None => 0,
        }
    }

    /// Move a buffer cursor to `pos`. Streams cannot be repositioned.
    pub fn seek(&mut self, pos: u64) -> Result<(), DisassemblyError> {
        let source = self
            .source
            .as_mut()
            .ok_or_else(|| DisassemblyError::Generic("no input attached".to_string()))?;
        source.seek(pos)?;
        self.current = None;
        Ok(())
    }

    /// Decode the next instruction. Returns its length in bytes, or 0 at end
    /// of data or when no source is attached.
    pub fn decode(&mut self) -> usize {
        let Some(source) = self.source.as_mut() else {
            self.current = None;
            return 0;
        };
        match X86Decoder::new(self.config).decode(source) {
            Some(insn) => {
                log::trace!("{:#x}: {} ({} bytes)", insn.addr, insn, insn.size);
                let size = usize::from(insn.size);
                self.current = Some(insn);
                size
            }
            None => {
                self.current = None;
                0
            }
        }
    }

    /// The current instruction record.
    pub fn insn(&self) -> Option<&Insn> {
        self.current.as_ref()
    }

    pub fn instruction_length(&self) -> usize {
        self.current.as_ref().map_or(0, |insn| usize::from(insn.size))
    }

    /// Position of the current instruction minus the program-counter base.
    pub fn offset(&self) -> u64 {
        self.current
            .as_ref()
            .map_or(0, |insn| insn.position.wrapping_sub(self.config.pc))
    }

    /// Virtual address of the current instruction.
    pub fn address(&self) -> Address {
        self.current.as_ref().map_or(0, |insn| insn.addr)
    }

    /// The current instruction in the configured syntax, or an empty string.
    pub fn mnemonic(&self) -> String {
        self.current
            .as_ref()
            .map(|insn| insn.render(self.config.syntax))
            .unwrap_or_default()
    }

    /// Lowercase hex of the current instruction's bytes, or an empty string.
    pub fn hex(&self) -> String {
        self.current.as_ref().map(Insn::hex).unwrap_or_default()
    }

    /// The current instruction as a listing row.
    pub fn line(&self) -> Option<Line> {
        self.current.as_ref().map(|insn| Line {
            address: insn.addr,
            offset: insn.position.wrapping_sub(self.config.pc),
            size: usize::from(insn.size),
            hex: insn.hex(),
            text: insn.render(self.config.syntax),
        })
    }

    /// Decode until the end of the source, yielding one [`Line`] per
    /// instruction.
    pub fn iter(&mut self) -> Lines<'_> {
        Lines { dis: self }
    }
}

/// Iterator returned by [`Disassembler::iter`].
#[derive(Debug)]
pub struct Lines<'a> {
    dis: &'a mut Disassembler,
}

impl Iterator for Lines<'_> {
    type Item = Line;

    fn next(&mut self) -> Option<Line> {
        if self.dis.decode() == 0 {
            return None;
        }
        self.dis.line()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::{Cursor, Write};

    #[rstest]
    #[case(16, Mode::Bits16)]
    #[case(32, Mode::Bits32)]
    #[case(64, Mode::Bits64)]
    fn test_set_mode_round_trip(#[case] bits: u32, #[case] expected: Mode) {
        let mut dis = Disassembler::new();
        dis.set_mode(bits).unwrap();
        assert_eq!(dis.mode(), expected);
        assert_eq!(dis.mode().bits(), bits);
    }

    #[rstest]
    #[case(0)]
    #[case(8)]
    #[case(33)]
    #[case(128)]
    fn test_set_mode_rejects_other_widths(#[case] bits: u32) {
        let mut dis = Disassembler::new();
        dis.set_mode(32).unwrap();
        let err = dis.set_mode(bits).unwrap_err();
        assert!(matches!(err, DisassemblyError::InvalidConfiguration(_)));
        assert_eq!(dis.mode(), Mode::Bits32);
    }

    #[test]
    fn test_defaults() {
        let mut dis = Disassembler::new();
        assert_eq!(dis.mode(), Mode::Bits16);
        assert_eq!(dis.syntax(), Syntax::Att);
        assert_eq!(dis.vendor(), Vendor::Intel);
        assert_eq!(dis.program_counter(), 0);
        assert!(dis.is_attached());
        assert_eq!(dis.decode(), 0);
        assert_eq!(dis.mnemonic(), "");
        assert_eq!(dis.hex(), "");
    }

    #[test]
    fn test_nop_nop_ret() {
        let mut dis = Disassembler::new();
        dis.set_mode(32).unwrap();
        dis.attach_buffer(vec![0x90, 0x90, 0xc3]);

        for expected in ["nop", "nop", "ret"] {
            assert_eq!(dis.decode(), 1);
            assert_eq!(dis.mnemonic(), expected);
        }
        assert_eq!(dis.decode(), 0);
        assert_eq!(dis.instruction_length(), 0);
        assert_eq!(dis.mnemonic(), "");
        assert_eq!(dis.hex(), "");
    }

    #[test]
    fn test_accessors_are_idempotent() {
        let mut dis = Disassembler::new();
        dis.set_mode(32).unwrap();
        dis.attach_buffer(vec![0xc7, 0x45, 0xfc, 0x01, 0x00, 0x00, 0x00]);
        assert_eq!(dis.decode(), 7);

        let first = (dis.mnemonic(), dis.hex(), dis.instruction_length(), dis.offset());
        let second = (dis.mnemonic(), dis.hex(), dis.instruction_length(), dis.offset());
        assert_eq!(first, second);
        assert_eq!(first.0, "movl $0x1,-0x4(%ebp)");
        assert_eq!(first.1, "c745fc01000000");
        assert_eq!(dis.hex().len(), 2 * dis.instruction_length());
    }

    #[test]
    fn test_syntax_switch_rerenders_current() {
        let mut dis = Disassembler::new();
        dis.set_mode(32).unwrap();
        dis.attach_buffer(vec![0x89, 0xe5]);
        dis.decode();
        assert_eq!(dis.mnemonic(), "mov %esp,%ebp");
        dis.set_syntax(Syntax::Intel);
        assert_eq!(dis.mnemonic(), "mov ebp, esp");
    }

    #[test]
    fn test_offset_and_address() {
        let mut dis = Disassembler::new();
        dis.set_mode(32).unwrap();
        dis.set_program_counter(0x10);
        dis.attach_buffer(vec![0x55, 0x89, 0xe5, 0xc3]);

        let mut offsets = Vec::new();
        let mut addresses = Vec::new();
        while dis.decode() > 0 {
            offsets.push(dis.offset());
            addresses.push(dis.address());
        }
        assert_eq!(
            offsets,
            vec![0u64.wrapping_sub(0x10), 1u64.wrapping_sub(0x10), 3u64.wrapping_sub(0x10)]
        );
        assert_eq!(addresses, vec![0x10, 0x11, 0x13]);
    }

    #[test]
    fn test_skip_and_seek() {
        let mut dis = Disassembler::new();
        dis.set_mode(32).unwrap();
        dis.attach_buffer(vec![0xcc, 0xcc, 0x90, 0xc3]);
        assert_eq!(dis.skip(2), 2);
        assert_eq!(dis.decode(), 1);
        assert_eq!(dis.offset(), 2);
        assert_eq!(dis.mnemonic(), "nop");

        dis.seek(0).unwrap();
        assert_eq!(dis.instruction_length(), 0);
        assert_eq!(dis.decode(), 1);
        assert_eq!(dis.mnemonic(), "int3");

        assert_eq!(dis.skip(100), 3);
        assert_eq!(dis.decode(), 0);
    }

    #[test]
    fn test_stream_source() {
        let mut dis = Disassembler::new();
        dis.set_mode(64).unwrap();
        dis.set_syntax(Syntax::Intel);
        dis.attach_reader(Cursor::new(vec![0x48, 0x89, 0xe5, 0xc3]));
        assert!(matches!(dis.seek(0), Err(DisassemblyError::NotSeekable)));

        let lines: Vec<Line> = dis.iter().collect();
        let text: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(text, vec!["mov rbp, rsp", "ret"]);
        assert_eq!(lines[1].offset, 3);
        assert_eq!(dis.decode(), 0);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut dis = Disassembler::new();
        dis.attach_buffer(vec![0x90]);
        dis.close();
        dis.close();
        assert!(!dis.is_attached());
        assert_eq!(dis.decode(), 0);
        assert_eq!(dis.skip(1), 0);
        assert_eq!(dis.position(), 0);
        assert!(dis.seek(0).is_err());

        dis.attach_buffer(vec![0x90]);
        assert_eq!(dis.decode(), 1);
    }

    #[test]
    fn test_attach_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0x55, 0xc3]).unwrap();
        file.flush().unwrap();

        let mut dis = Disassembler::new();
        dis.set_mode(32).unwrap();
        dis.attach_file(file.path()).unwrap();
        assert_eq!(dis.decode(), 1);
        assert_eq!(dis.mnemonic(), "push %ebp");
        assert_eq!(dis.decode(), 1);
        assert_eq!(dis.decode(), 0);
    }

    #[test]
    fn test_missing_file_keeps_previous_source() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.bin");

        let mut dis = Disassembler::new();
        dis.set_mode(32).unwrap();
        dis.attach_buffer(vec![0x90, 0xc3]);
        assert_eq!(dis.decode(), 1);

        let err = dis.attach_file(&missing).unwrap_err();
        assert!(matches!(err, DisassemblyError::SourceUnavailable { .. }));
        assert_eq!(dis.decode(), 1);
        assert_eq!(dis.mnemonic(), "ret");
    }

    #[test]
    fn test_disassembler_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Disassembler>();
    }
}
