//! Streaming, stateful x86 / x86-64 disassembler engine.
//!
//! The engine decodes one instruction per call from an attached byte source
//! (an in-memory buffer, a file, or any sequential reader) and renders it in
//! AT&T or Intel syntax together with its raw hex bytes.
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use streamdis::{Disassembler, Mode, Syntax};
//!
//! let mut dis = Disassembler::new();
//! dis.set_mode(64).unwrap();
//! dis.set_syntax(Syntax::Intel);
//! dis.set_program_counter(0x401000);
//! dis.attach_buffer(vec![0x55, 0x48, 0x89, 0xe5, 0xc3]);
//!
//! while dis.decode() > 0 {
//!     println!("{:016x}  {:<20} {}", dis.address(), dis.hex(), dis.mnemonic());
//! }
//! assert_eq!(dis.mode(), Mode::Bits64);
//! ```
//!
//! A [`Disassembler`] is not internally synchronized: callers sharing one
//! across threads must hold an external mutual-exclusion lock around it.

pub mod decoder;
pub mod disassembler;
pub mod format;
pub mod handle;
pub mod input;
pub mod parser;
pub mod syntax;
mod large_tests;

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use decoder::{Immediate, Insn, MemOperand, Operand, Register};
pub use disassembler::{Disassembler, Line, Lines};
pub use input::Input;

/// Represents an address in memory
pub type Address = u64;

/// Architectural limit on the length of one x86 instruction, in bytes.
pub const MAX_INSTRUCTION_SIZE: usize = 15;

/// Processor bit-mode the decoder targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Mode {
    /// 16-bit real / protected mode. This is the power-on default of a fresh
    /// context.
    #[default]
    Bits16,
    /// 32-bit protected mode
    Bits32,
    /// 64-bit long mode
    Bits64,
}

impl Mode {
    /// Width of the mode in bits (16, 32 or 64).
    pub fn bits(self) -> u32 {
        match self {
            Mode::Bits16 => 16,
            Mode::Bits32 => 32,
            Mode::Bits64 => 64,
        }
    }
}

impl TryFrom<u32> for Mode {
    type Error = DisassemblyError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        match bits {
            16 => Ok(Mode::Bits16),
            32 => Ok(Mode::Bits32),
            64 => Ok(Mode::Bits64),
            other => Err(DisassemblyError::InvalidConfiguration(format!(
                "invalid mode {}, expected 16, 32 or 64",
                other
            ))),
        }
    }
}

impl From<Mode> for u32 {
    fn from(mode: Mode) -> u32 {
        mode.bits()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// Instruction-set variant used where Intel and AMD decode the same bytes
/// differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    /// Intel decoding rules
    #[default]
    Intel,
    /// AMD decoding rules (3DNow!, SVM, 16-bit near branches in long mode)
    Amd,
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vendor::Intel => write!(f, "intel"),
            Vendor::Amd => write!(f, "amd"),
        }
    }
}

/// Textual dialect used when rendering instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    /// AT&T / GAS syntax: `movl $0x1,-0x4(%ebp)`
    #[default]
    Att,
    /// Intel syntax: `mov dword [ebp-0x4], 0x1`
    Intel,
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Syntax::Att => write!(f, "att"),
            Syntax::Intel => write!(f, "intel"),
        }
    }
}

/// Configuration of one decode context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Target bit-mode
    pub mode: Mode,
    /// Vendor instruction-set variant
    pub vendor: Vendor,
    /// Output syntax dialect
    pub syntax: Syntax,
    /// Program-counter base that offsets are reported against
    pub pc: Address,
}

/// Error type for disassembly operations
#[derive(Debug, thiserror::Error)]
pub enum DisassemblyError {
    /// A mode, vendor or syntax value was rejected; the previous value is kept.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A file source could not be opened; the previous source is kept.
    #[error("Source unavailable: {path}: {source}")]
    SourceUnavailable {
        /// Path that was requested
        path: PathBuf,
        /// Underlying open failure
        #[source]
        source: std::io::Error,
    },

    /// Repositioning was requested on a sequential source.
    #[error("Input source is sequential and cannot be repositioned")]
    NotSeekable,

    /// Failed to parse binary format
    #[error("Failed to parse binary format: {0}")]
    ParsingError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Generic(String),
}
