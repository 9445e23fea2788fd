//! Handle-based entry points for embedding the engine behind a foreign
//! boundary.
//!
//! Configuration values cross the boundary as plain integers and are
//! validated here. A destroyed handle stays usable: every operation becomes
//! a no-op that returns a neutral value (`0`, `""`, `false`).

use std::path::Path;

use crate::{Disassembler, DisassemblyError, Syntax, Vendor};

/// AT&T syntax selector for [`set_syntax`].
pub const SYNTAX_ATT: i64 = 0;
/// Intel syntax selector for [`set_syntax`].
pub const SYNTAX_INTEL: i64 = 1;
/// Intel vendor selector for [`set_vendor`].
pub const VENDOR_INTEL: i64 = 0;
/// AMD vendor selector for [`set_vendor`].
pub const VENDOR_AMD: i64 = 1;

/// An opaque disassembler handle.
#[derive(Debug)]
pub struct Handle {
    inner: Option<Disassembler>,
}

impl Handle {
    /// True once [`destroy`] has been called.
    pub fn is_destroyed(&self) -> bool {
        self.inner.is_none()
    }
}

/// Create a handle with the default configuration: AT&T syntax, Intel
/// vendor, 16-bit mode and an empty input buffer.
pub fn create() -> Handle {
    Handle {
        inner: Some(Disassembler::new()),
    }
}

/// Release the handle and any stream it owns. Safe to call repeatedly.
pub fn destroy(handle: &mut Handle) {
    if let Some(mut dis) = handle.inner.take() {
        dis.close();
        log::debug!("handle destroyed");
    }
}

fn with<T>(handle: &mut Handle, neutral: T, f: impl FnOnce(&mut Disassembler) -> T) -> T {
    match handle.inner.as_mut() {
        Some(dis) => f(dis),
        None => {
            log::warn!("operation on a destroyed handle ignored");
            neutral
        }
    }
}

fn peek<T>(handle: &Handle, neutral: T, f: impl FnOnce(&Disassembler) -> T) -> T {
    handle.inner.as_ref().map_or(neutral, f)
}

fn rejected(what: &str, value: i64) -> DisassemblyError {
    let err = DisassemblyError::InvalidConfiguration(format!("invalid {} {}", what, value));
    log::warn!("{}", err);
    err
}

pub fn set_mode(handle: &mut Handle, mode: i64) -> Result<(), DisassemblyError> {
    with(handle, Ok(()), |dis| {
        let bits = u32::try_from(mode).map_err(|_| rejected("mode", mode))?;
        dis.set_mode(bits)
    })
}

pub fn set_vendor(handle: &mut Handle, vendor: i64) -> Result<(), DisassemblyError> {
    with(handle, Ok(()), |dis| {
        let vendor = match vendor {
            VENDOR_INTEL => Vendor::Intel,
            VENDOR_AMD => Vendor::Amd,
            other => return Err(rejected("vendor", other)),
        };
        dis.set_vendor(vendor);
        Ok(())
    })
}

pub fn set_syntax(handle: &mut Handle, syntax: i64) -> Result<(), DisassemblyError> {
    with(handle, Ok(()), |dis| {
        let syntax = match syntax {
            SYNTAX_ATT => Syntax::Att,
            SYNTAX_INTEL => Syntax::Intel,
            other => return Err(rejected("syntax", other)),
        };
        dis.set_syntax(syntax);
        Ok(())
    })
}

pub fn set_program_counter(handle: &mut Handle, pc: u64) {
    with(handle, (), |dis| dis.set_program_counter(pc))
}

pub fn attach_buffer(handle: &mut Handle, data: &[u8]) {
    with(handle, (), |dis| dis.attach_buffer(data))
}

/// Attach a file for sequential reading. Returns `false` when it cannot be
/// opened, in which case the previous source is kept.
pub fn attach_file(handle: &mut Handle, path: impl AsRef<Path>) -> bool {
    with(handle, false, |dis| dis.attach_file(path).is_ok())
}

pub fn skip(handle: &mut Handle, n: u64) {
    with(handle, (), |dis| {
        dis.skip(n);
    })
}

/// Decode one instruction; returns its length or 0 at end of data.
pub fn decode(handle: &mut Handle) -> u64 {
    with(handle, 0, |dis| dis.decode() as u64)
}

pub fn mnemonic(handle: &Handle) -> String {
    peek(handle, String::new(), Disassembler::mnemonic)
}

pub fn hex(handle: &Handle) -> String {
    peek(handle, String::new(), Disassembler::hex)
}

pub fn instruction_length(handle: &Handle) -> u64 {
    peek(handle, 0, |dis| dis.instruction_length() as u64)
}

pub fn offset(handle: &Handle) -> u64 {
    peek(handle, 0, Disassembler::offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mode;
    use std::io::Write;

    #[test]
    fn test_constants_are_distinct() {
        assert_ne!(SYNTAX_ATT, SYNTAX_INTEL);
        assert_ne!(VENDOR_INTEL, VENDOR_AMD);
    }

    #[test]
    fn test_full_session() {
        let mut h = create();
        set_mode(&mut h, 32).unwrap();
        set_syntax(&mut h, SYNTAX_INTEL).unwrap();
        set_program_counter(&mut h, 0x400000);
        attach_buffer(&mut h, &[0x55, 0x89, 0xe5, 0xc3]);

        assert_eq!(decode(&mut h), 1);
        assert_eq!(mnemonic(&h), "push ebp");
        assert_eq!(hex(&h), "55");
        assert_eq!(offset(&h), 0u64.wrapping_sub(0x400000));

        assert_eq!(decode(&mut h), 2);
        assert_eq!(mnemonic(&h), "mov ebp, esp");
        assert_eq!(instruction_length(&h), 2);

        assert_eq!(decode(&mut h), 1);
        assert_eq!(decode(&mut h), 0);
        destroy(&mut h);
    }

    #[test]
    fn test_invalid_integers_keep_state() {
        let mut h = create();
        set_mode(&mut h, 64).unwrap();
        assert!(set_mode(&mut h, -1).is_err());
        assert!(set_mode(&mut h, 48).is_err());
        assert!(set_vendor(&mut h, 7).is_err());
        assert!(set_syntax(&mut h, -3).is_err());

        let dis = h.inner.as_ref().unwrap();
        assert_eq!(dis.mode(), Mode::Bits64);
        assert_eq!(dis.vendor(), Vendor::Intel);
        assert_eq!(dis.syntax(), Syntax::Att);
    }

    #[test]
    fn test_vendor_selector() {
        let mut h = create();
        set_mode(&mut h, 32).unwrap();
        attach_buffer(&mut h, &[0x0f, 0x05]);
        assert_eq!(decode(&mut h), 1);
        assert_eq!(mnemonic(&h), "invalid");

        set_vendor(&mut h, VENDOR_AMD).unwrap();
        attach_buffer(&mut h, &[0x0f, 0x05]);
        assert_eq!(decode(&mut h), 2);
        assert_eq!(mnemonic(&h), "syscall");
    }

    #[test]
    fn test_attach_file_reports_failure() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0x90]).unwrap();
        file.flush().unwrap();

        let mut h = create();
        attach_buffer(&mut h, &[0xc3]);
        assert!(!attach_file(&mut h, "/nonexistent/streamdis/input.bin"));
        assert_eq!(decode(&mut h), 1);
        assert_eq!(mnemonic(&h), "ret");

        assert!(attach_file(&mut h, file.path()));
        assert_eq!(decode(&mut h), 1);
        assert_eq!(mnemonic(&h), "nop");
    }

    #[test]
    fn test_destroyed_handle_is_inert() {
        let mut h = create();
        attach_buffer(&mut h, &[0x90]);
        destroy(&mut h);
        destroy(&mut h);
        assert!(h.is_destroyed());

        assert!(set_mode(&mut h, 32).is_ok());
        attach_buffer(&mut h, &[0x90]);
        skip(&mut h, 1);
        assert!(!attach_file(&mut h, "/tmp"));
        assert_eq!(decode(&mut h), 0);
        assert_eq!(mnemonic(&h), "");
        assert_eq!(hex(&h), "");
        assert_eq!(instruction_length(&h), 0);
        assert_eq!(offset(&h), 0);
    }
}
