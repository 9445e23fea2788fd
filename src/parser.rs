//! Goblin-based code-region locator for ELF, PE and Mach-O images.
//!
//! The CLI uses this to disassemble the code section of a real binary: the
//! parser picks the section, the bit-mode implied by the machine type, and
//! the virtual address that becomes the program-counter base.

use std::fmt;
use goblin::{elf, pe, Object};
use goblin::mach::{Mach, MachO, constants::cputype};

use crate::{Address, DisassemblyError, Mode};

/// The executable section chosen from a container image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRegion {
    /// Section name as recorded in the image
    pub name: String,
    /// Bit-mode implied by the image's machine type
    pub mode: Mode,
    /// Virtual address of the first byte
    pub address: Address,
    /// File offset of the first byte
    pub offset: usize,
    /// Length in bytes
    pub size: usize,
}

impl CodeRegion {
    /// Slice the region out of the image it was parsed from.
    pub fn bytes<'a>(&self, image: &'a [u8]) -> Result<&'a [u8], DisassemblyError> {
        self.offset
            .checked_add(self.size)
            .and_then(|end| image.get(self.offset..end))
            .ok_or_else(|| {
                DisassemblyError::ParsingError(format!(
                    "section {} at 0x{:x}+0x{:x} lies outside the {}-byte image",
                    self.name,
                    self.offset,
                    self.size,
                    image.len()
                ))
            })
    }
}

/// Locates the code region of a container format.
pub trait BinaryParser {
    /// Parse `data` and return its primary code region.
    fn parse(&self, data: &[u8]) -> Result<CodeRegion, DisassemblyError>;
}

/// A parser that handles ELF, PE, and Mach-O via Goblin.
#[derive(Debug, Default)]
pub struct GoblinParser;

fn unsupported(what: &str, machine: impl fmt::LowerHex) -> DisassemblyError {
    DisassemblyError::ParsingError(format!("unsupported {} machine 0x{:x}", what, machine))
}

fn no_code(what: &str) -> DisassemblyError {
    DisassemblyError::ParsingError(format!("no executable section in {} image", what))
}

impl GoblinParser {
    /// Construct a new GoblinParser.
    pub fn new() -> Self {
        GoblinParser
    }

    /// Parse an ELF image.
    fn parse_elf(&self, elf: elf::Elf) -> Result<CodeRegion, DisassemblyError> {
        let mode = match elf.header.e_machine {
            elf::header::EM_386    => Mode::Bits32,
            elf::header::EM_X86_64 => Mode::Bits64,
            other                  => return Err(unsupported("ELF", other)),
        };

        let named = |sh: &elf::SectionHeader| elf.shdr_strtab.get_at(sh.sh_name).unwrap_or("");

        // Prefer .text, fall back to the first executable section
        let sh = elf
            .section_headers
            .iter()
            .find(|sh| named(sh) == ".text")
            .or_else(|| elf.section_headers.iter().find(|sh| sh.is_executable()))
            .ok_or_else(|| no_code("ELF"))?;

        Ok(CodeRegion {
            name: named(sh).to_string(),
            mode,
            address: sh.sh_addr,
            offset: sh.sh_offset as usize,
            size: sh.sh_size as usize,
        })
    }

    /// Parse a PE image.
    fn parse_pe(&self, pe: pe::PE<'_>) -> Result<CodeRegion, DisassemblyError> {
        let mode = match pe.header.coff_header.machine {
            pe::header::COFF_MACHINE_X86    => Mode::Bits32,
            pe::header::COFF_MACHINE_X86_64 => Mode::Bits64,
            other                           => return Err(unsupported("PE", other)),
        };

        let executable = |sect: &pe::section_table::SectionTable| {
            (sect.characteristics & pe::section_table::IMAGE_SCN_MEM_EXECUTE) != 0
        };

        // ".text" (case-insensitive), else the first executable section
        let sect = pe
            .sections
            .iter()
            .find(|s| s.name().map(|n| n.eq_ignore_ascii_case(".text")).unwrap_or(false))
            .or_else(|| pe.sections.iter().find(|s| executable(s)))
            .ok_or_else(|| no_code("PE"))?;

        // Raw data is padded to the file alignment; the virtual size is exact.
        let size = match sect.virtual_size {
            0 => sect.size_of_raw_data,
            v => v.min(sect.size_of_raw_data),
        };

        Ok(CodeRegion {
            name: sect.name().unwrap_or("").to_string(),
            mode,
            address: pe.image_base as Address + Address::from(sect.virtual_address),
            offset: sect.pointer_to_raw_data as usize,
            size: size as usize,
        })
    }

    /// Parse a Mach-O binary
    fn parse_macho(&self, macho: &MachO) -> Result<CodeRegion, DisassemblyError> {
        let mode = match macho.header.cputype {
            cputype::CPU_TYPE_I386   => Mode::Bits32,
            cputype::CPU_TYPE_X86_64 => Mode::Bits64,
            other                    => return Err(unsupported("Mach-O", other)),
        };

        for segment in &macho.segments {
            let sections = segment
                .sections()
                .map_err(|e| DisassemblyError::ParsingError(e.to_string()))?;

            for (section, _) in sections {
                let segname = section.segname().unwrap_or("");
                let sectname = section.name().unwrap_or("");
                if segname == "__TEXT" && sectname == "__text" {
                    return Ok(CodeRegion {
                        name: format!("{},{}", segname, sectname),
                        mode,
                        address: section.addr,
                        offset: section.offset as usize,
                        size: section.size as usize,
                    });
                }
            }
        }

        Err(no_code("Mach-O"))
    }

    /// Parse a Mach-O image.
    fn parse_mach(&self, m: Mach<'_>) -> Result<CodeRegion, DisassemblyError> {
        match m {
            Mach::Binary(binary) => self.parse_macho(&binary),
            Mach::Fat(_) => Err(DisassemblyError::ParsingError(
                "universal Mach-O images are not supported, extract a single architecture first".into(),
            )),
        }
    }
}

impl fmt::Display for GoblinParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GoblinParser")
    }
}

impl BinaryParser for GoblinParser {
    fn parse(&self, data: &[u8]) -> Result<CodeRegion, DisassemblyError> {
        let region = match Object::parse(data) {
            Ok(Object::Elf(elf)) => self.parse_elf(elf),
            Ok(Object::PE(pe)) => self.parse_pe(pe),
            Ok(Object::Mach(m)) => self.parse_mach(m),
            Ok(_) => Err(DisassemblyError::ParsingError("Unsupported file format".into())),
            Err(e) => Err(DisassemblyError::ParsingError(e.to_string())),
        }?;

        log::debug!(
            "code region {} at 0x{:x} ({} bytes, {})",
            region.name,
            region.address,
            region.size,
            region.mode
        );
        Ok(region)
    }
}
