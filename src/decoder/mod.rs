//! Table-driven x86 / x86-64 instruction decoder.
//!
//! Decoding runs in the usual phases: legacy and REX prefixes, the opcode
//! (with the 0F, 0F 38, 0F 3A and 3DNow! escapes), table resolution down to
//! a single instruction form, then ModR/M, SIB, displacement and immediates
//! as that form's operand specs demand.
//!
//! Bytes are pulled from an [`Input`] one at a time. When they turn out not
//! to form a valid instruction (unknown opcode, wrong vendor or mode,
//! truncated source, more than [`MAX_INSTRUCTION_SIZE`] bytes) everything
//! past the first byte is handed back to the input and a one-byte `invalid`
//! record is produced instead.

mod extended;
mod insn;
mod tables;

pub use insn::*;

use crate::input::Input;
use crate::{Address, DecoderConfig, Mode, Vendor, MAX_INSTRUCTION_SIZE};
use tables::{Entry, Op, Slot, Sz};
use tables::{AMD, AMD_LEGACY, BRANCH, DEF64, INTEL, INTEL_LONG, INV64, ONLY64, SIZED_MEM};

/// Trait for instruction decoders
pub trait Decoder {
    /// Decode one instruction at the current position of `input`.
    ///
    /// Returns `None` only when the input is exhausted. Undecodable bytes
    /// yield a one-byte `invalid` record so callers always make progress.
    fn decode(&self, input: &mut Input) -> Option<Insn>;
}

/// The native x86 decoder for one configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct X86Decoder {
    config: DecoderConfig,
}

impl X86Decoder {
    /// Create a decoder for `config`.
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// The configuration this decoder was built with.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }
}

impl Decoder for X86Decoder {
    fn decode(&self, input: &mut Input) -> Option<Insn> {
        let position = input.position();
        let addr = self.config.pc.wrapping_add(position);

        let mut state = State::new(input, &self.config, position, addr);
        let outcome = state.run();
        let (bytes, len) = (state.bytes, state.len);

        match outcome {
            Ok(insn) => Some(insn),
            Err(_) if len == 0 => None,
            Err(reason) => {
                log::trace!(
                    "{:?} at position {}, emitting invalid byte {:#04x}",
                    reason,
                    position,
                    bytes[0]
                );
                input.unread(&bytes[1..len]);
                Some(Insn::invalid(position, addr, bytes[0]))
            }
        }
    }
}

/// Why a byte sequence was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reject {
    /// No encoding matches
    Invalid,
    /// The input ended mid-instruction
    Truncated,
    /// The encoding would exceed the architectural length limit
    TooLong,
}

type Step<T> = Result<T, Reject>;

const XCHG_R8: Entry = Entry {
    mnemonic: "xchg",
    ops: [tables::ZV, tables::RAX, Op::None],
    flags: 0,
};

const AMD3DNOW: Entry = Entry {
    mnemonic: "",
    ops: [Op::P, tables::QQ, Op::None],
    flags: AMD,
};

/// Per-instruction decoding state.
struct State<'a> {
    input: &'a mut Input,
    mode: Mode,
    vendor: Vendor,
    position: u64,
    addr: Address,
    bytes: [u8; MAX_INSTRUCTION_SIZE],
    len: usize,
    prefixes: Prefixes,
    /// 66 was taken as a mandatory prefix and no longer changes operand size
    opsize_taken: bool,
    opcode: u8,
    modrm: Option<u8>,
    amd3dnow: bool,
    flags: u16,
}

impl<'a> State<'a> {
    fn new(input: &'a mut Input, config: &DecoderConfig, position: u64, addr: Address) -> Self {
        Self {
            input,
            mode: config.mode,
            vendor: config.vendor,
            position,
            addr,
            bytes: [0; MAX_INSTRUCTION_SIZE],
            len: 0,
            prefixes: Prefixes::default(),
            opsize_taken: false,
            opcode: 0,
            modrm: None,
            amd3dnow: false,
            flags: 0,
        }
    }

    fn run(&mut self) -> Step<Insn> {
        let first = self.prefixes()?;
        let entry = self.entry(first)?;
        self.check(entry.flags)?;

        let osize = self.operand_size(entry.flags);
        let asize = self.address_size();

        let mut operands = Vec::with_capacity(3);
        for op in entry.ops.into_iter().take_while(|op| *op != Op::None) {
            operands.push(self.operand(op, osize, asize)?);
        }

        let mnemonic = if self.amd3dnow {
            let suffix = self.next()?;
            extended::amd3dnow(suffix).ok_or(Reject::Invalid)?
        } else {
            entry.mnemonic
        };

        let size = self.len as u8;
        let next = self.addr.wrapping_add(u64::from(size));
        for op in operands.iter_mut() {
            if let Operand::Branch { target, size } = op {
                *target = next.wrapping_add(*target) & insn::mask(*size);
            }
        }

        let mut prefixes = self.prefixes;
        if self.opsize_taken {
            prefixes.operand_size = false;
        }

        Ok(Insn {
            position: self.position,
            addr: self.addr,
            size,
            bytes: self.bytes,
            mnemonic,
            operands,
            prefixes,
            operand_size: osize,
            address_size: asize,
            flags: entry.flags | self.flags,
        })
    }

    fn next(&mut self) -> Step<u8> {
        if self.len == MAX_INSTRUCTION_SIZE {
            return Err(Reject::TooLong);
        }
        let b = self.input.next_byte().ok_or(Reject::Truncated)?;
        self.bytes[self.len] = b;
        self.len += 1;
        Ok(b)
    }

    /// Little-endian unsigned value of `n` bytes.
    fn read_le(&mut self, n: usize) -> Step<u64> {
        let mut value = 0u64;
        for i in 0..n {
            value |= u64::from(self.next()?) << (8 * i);
        }
        Ok(value)
    }

    /// Little-endian value of `n` bytes, sign-extended.
    fn read_signed(&mut self, n: usize) -> Step<i64> {
        let value = self.read_le(n)?;
        let shift = 64 - 8 * n as u32;
        Ok(((value << shift) as i64) >> shift)
    }

    /// Consume prefixes and return the first opcode byte.
    fn prefixes(&mut self) -> Step<u8> {
        loop {
            let b = self.next()?;
            match b {
                0xf0 => self.prefixes.lock = true,
                0xf2 => self.prefixes.rep = Some(RepPrefix::Repne),
                0xf3 => self.prefixes.rep = Some(RepPrefix::Rep),
                0x26 | 0x2e | 0x36 | 0x3e | 0x64 | 0x65 => self.segment(b),
                0x66 => self.prefixes.operand_size = true,
                0x67 => self.prefixes.address_size = true,
                0x40..=0x4f if self.mode == Mode::Bits64 => {
                    self.prefixes.rex = b;
                    continue;
                }
                _ => return Ok(b),
            }
            // REX only counts when it immediately precedes the opcode
            self.prefixes.rex = 0;
        }
    }

    fn segment(&mut self, b: u8) {
        let n = match b {
            0x26 => 0,
            0x2e => 1,
            0x36 => 2,
            0x3e => 3,
            0x64 => 4,
            _ => 5,
        };
        // es, cs, ss and ds overrides are ignored in long mode
        if self.mode == Mode::Bits64 && n < 4 {
            return;
        }
        self.prefixes.segment = Some(Register::Segment(n));
    }

    fn entry(&mut self, first: u8) -> Step<Entry> {
        self.opcode = first;
        if first != 0x0f {
            if first == 0x90 && self.rex_b() != 0 {
                return Ok(XCHG_R8);
            }
            return self.resolve(&tables::ONE_BYTE[usize::from(first)]);
        }

        let second = self.next()?;
        self.opcode = second;
        match second {
            0x0f => {
                self.amd3dnow = true;
                Ok(AMD3DNOW)
            }
            0x38 => {
                let third = self.next()?;
                self.opcode = third;
                self.resolve(extended::map_0f38(third))
            }
            0x3a => {
                let third = self.next()?;
                self.opcode = third;
                self.resolve(extended::map_0f3a(third))
            }
            _ => self.resolve(&extended::MAP_0F[usize::from(second)]),
        }
    }

    /// Narrow a table slot down to one instruction form.
    fn resolve(&mut self, mut slot: &'static Slot) -> Step<Entry> {
        loop {
            slot = match *slot {
                Slot::Invalid => return Err(Reject::Invalid),
                Slot::Insn(entry) => return Ok(entry),
                Slot::Group(table) => &table[usize::from((self.modrm()? >> 3) & 7)],
                Slot::ModSplit { mem, reg } => {
                    if self.modrm()? >> 6 == 3 {
                        reg
                    } else {
                        mem
                    }
                }
                Slot::RmTable(table) => &table[usize::from(self.modrm()? & 7)],
                Slot::Prefix(table) => &table[self.mandatory_prefix()],
                Slot::RepSelect(table) => {
                    let i = match self.prefixes.rep.take() {
                        None => 0,
                        Some(RepPrefix::Rep) => 1,
                        Some(RepPrefix::Repne) => 2,
                    };
                    &table[i]
                }
                Slot::Mode(table) => &table[usize::from(self.mode == Mode::Bits64)],
                Slot::OpSize { table, def64 } => {
                    let flags = if def64 { DEF64 } else { 0 };
                    &table[size_index(self.operand_size(flags))]
                }
                Slot::AdSize(table) => &table[size_index(self.address_size())],
            };
        }
    }

    /// Pick a mandatory-prefix column: F3 and F2 take precedence over 66.
    fn mandatory_prefix(&mut self) -> usize {
        match self.prefixes.rep.take() {
            Some(RepPrefix::Rep) => 2,
            Some(RepPrefix::Repne) => 3,
            None if self.prefixes.operand_size => {
                self.opsize_taken = true;
                1
            }
            None => 0,
        }
    }

    fn check(&self, flags: u16) -> Step<()> {
        let long = self.mode == Mode::Bits64;
        let amd = self.vendor == Vendor::Amd;
        let rejected = (flags & INV64 != 0 && long)
            || (flags & ONLY64 != 0 && !long)
            || (flags & AMD != 0 && !amd)
            || (flags & INTEL != 0 && amd)
            || (flags & AMD_LEGACY != 0 && !long && !amd)
            || (flags & INTEL_LONG != 0 && long && amd);
        if rejected {
            Err(Reject::Invalid)
        } else {
            Ok(())
        }
    }

    fn operand_size(&self, flags: u16) -> u8 {
        let o16 = self.prefixes.operand_size && !self.opsize_taken;
        match self.mode {
            Mode::Bits16 => {
                if o16 {
                    32
                } else {
                    16
                }
            }
            Mode::Bits32 => {
                if o16 {
                    16
                } else {
                    32
                }
            }
            Mode::Bits64 => {
                if flags & BRANCH != 0 {
                    // Intel ignores 66 on near branches in long mode
                    if o16 && self.vendor == Vendor::Amd {
                        16
                    } else {
                        64
                    }
                } else if self.rex_w() != 0 {
                    64
                } else if o16 {
                    16
                } else if flags & DEF64 != 0 {
                    64
                } else {
                    32
                }
            }
        }
    }

    fn address_size(&self) -> u8 {
        let a = self.prefixes.address_size;
        match self.mode {
            Mode::Bits16 => {
                if a {
                    32
                } else {
                    16
                }
            }
            Mode::Bits32 => {
                if a {
                    16
                } else {
                    32
                }
            }
            Mode::Bits64 => {
                if a {
                    32
                } else {
                    64
                }
            }
        }
    }

    fn rex_w(&self) -> u8 {
        (self.prefixes.rex >> 3) & 1
    }

    fn rex_r(&self) -> u8 {
        (self.prefixes.rex >> 2) & 1
    }

    fn rex_x(&self) -> u8 {
        (self.prefixes.rex >> 1) & 1
    }

    fn rex_b(&self) -> u8 {
        self.prefixes.rex & 1
    }

    fn modrm(&mut self) -> Step<u8> {
        if let Some(m) = self.modrm {
            return Ok(m);
        }
        let m = self.next()?;
        self.modrm = Some(m);
        Ok(m)
    }

    /// ModR/M reg field extended by REX.R.
    fn reg(&mut self) -> Step<u8> {
        let m = self.modrm()?;
        Ok(((m >> 3) & 7) | (self.rex_r() << 3))
    }

    /// ModR/M r/m field extended by REX.B.
    fn rm(&mut self) -> Step<u8> {
        let m = self.modrm()?;
        Ok((m & 7) | (self.rex_b() << 3))
    }

    fn width(&self, sz: Sz, osize: u8) -> u16 {
        let osize = u16::from(osize);
        match sz {
            Sz::Any => 0,
            Sz::B => 8,
            Sz::W => 16,
            Sz::D => 32,
            Sz::Q => 64,
            Sz::V => osize,
            Sz::Z => {
                if osize == 16 {
                    16
                } else {
                    32
                }
            }
            Sz::Y => {
                if osize == 64 {
                    64
                } else {
                    32
                }
            }
            Sz::Dq => 128,
            Sz::T => 80,
            Sz::P => osize + 16,
            Sz::Lm => {
                if self.mode == Mode::Bits64 {
                    64
                } else {
                    32
                }
            }
        }
    }

    fn gpr(&self, bits: u16, n: u8) -> Register {
        match bits {
            8 if (4..8).contains(&n) && self.prefixes.rex == 0 => Register::HighByte(n - 4),
            8 => Register::Byte(n),
            16 => Register::Word(n),
            32 => Register::Dword(n),
            _ => Register::Qword(n),
        }
    }

    fn operand(&mut self, op: Op, osize: u8, asize: u8) -> Step<Operand> {
        let operand = match op {
            Op::None => return Err(Reject::Invalid),
            Op::E(sz) => {
                let bits = self.width(sz, osize);
                let m = self.modrm()?;
                if m >> 6 == 3 {
                    let n = self.rm()?;
                    Operand::Reg(self.gpr(bits, n))
                } else {
                    self.flags |= SIZED_MEM;
                    self.memory(m, bits, asize)?
                }
            }
            Op::M(sz) => {
                let bits = self.width(sz, osize);
                let m = self.modrm()?;
                if m >> 6 == 3 {
                    return Err(Reject::Invalid);
                }
                self.memory(m, bits, asize)?
            }
            Op::G(sz) => {
                let bits = self.width(sz, osize);
                let n = self.reg()?;
                Operand::Reg(self.gpr(bits, n))
            }
            Op::R(sz) => {
                let bits = self.width(sz, osize);
                let n = self.rm()?;
                Operand::Reg(self.gpr(bits, n))
            }
            Op::I(Sz::Z) => {
                let n = if osize == 16 { 2 } else { 4 };
                let value = self.read_signed(n)?;
                immediate(value as u64, u16::from(osize))
            }
            Op::I(sz) => {
                let bits = self.width(sz, osize);
                let value = self.read_le(usize::from(bits / 8))?;
                immediate(value, bits)
            }
            Op::Ibs => {
                let value = self.read_signed(1)?;
                immediate(value as u64, u16::from(osize))
            }
            Op::J(sz) => {
                let disp = match sz {
                    Sz::B => self.read_signed(1)?,
                    _ => self.read_signed(if osize == 16 { 2 } else { 4 })?,
                };
                // resolved against the end of the instruction in run()
                Operand::Branch {
                    target: disp as u64,
                    size: u16::from(osize),
                }
            }
            Op::A => {
                let offset = self.read_le(if osize == 16 { 2 } else { 4 })? as u32;
                let selector = self.read_le(2)? as u16;
                Operand::Far { selector, offset }
            }
            Op::O(sz) => {
                let bits = self.width(sz, osize);
                let n = asize / 8;
                let disp = self.read_le(usize::from(n))? as i64;
                Operand::Mem(MemOperand {
                    size: bits,
                    segment: self.prefixes.segment,
                    base: None,
                    index: None,
                    scale: 1,
                    disp,
                    disp_size: n,
                    addr_size: asize,
                })
            }
            Op::Z(sz) => {
                let bits = self.width(sz, osize);
                let n = (self.opcode & 7) | (self.rex_b() << 3);
                Operand::Reg(self.gpr(bits, n))
            }
            Op::Gpr(n, sz) => Operand::Reg(self.gpr(self.width(sz, osize), n)),
            Op::Sreg(n) => Operand::Reg(Register::Segment(n)),
            Op::S => {
                let n = (self.modrm()? >> 3) & 7;
                if n > 5 {
                    return Err(Reject::Invalid);
                }
                Operand::Reg(Register::Segment(n))
            }
            Op::C => Operand::Reg(Register::Control(self.reg()?)),
            Op::D => Operand::Reg(Register::Debug(self.reg()?)),
            Op::One => Operand::Const(1),
            Op::V => Operand::Reg(Register::Xmm(self.reg()?)),
            Op::W(sz) => {
                let bits = self.width(sz, osize);
                let m = self.modrm()?;
                if m >> 6 == 3 {
                    Operand::Reg(Register::Xmm(self.rm()?))
                } else {
                    self.memory(m, bits, asize)?
                }
            }
            Op::U => {
                if self.modrm()? >> 6 != 3 {
                    return Err(Reject::Invalid);
                }
                Operand::Reg(Register::Xmm(self.rm()?))
            }
            Op::P => Operand::Reg(Register::Mmx((self.modrm()? >> 3) & 7)),
            Op::Q(sz) => {
                let bits = self.width(sz, osize);
                let m = self.modrm()?;
                if m >> 6 == 3 {
                    Operand::Reg(Register::Mmx(m & 7))
                } else {
                    self.memory(m, bits, asize)?
                }
            }
            Op::N => {
                let m = self.modrm()?;
                if m >> 6 != 3 {
                    return Err(Reject::Invalid);
                }
                Operand::Reg(Register::Mmx(m & 7))
            }
            Op::St0 => Operand::Reg(Register::St(0)),
            Op::Sti => Operand::Reg(Register::St(self.modrm()? & 7)),
        };
        Ok(operand)
    }

    /// Memory operand addressed by ModR/M byte `m` (plus SIB and displacement).
    fn memory(&mut self, m: u8, size: u16, asize: u8) -> Step<Operand> {
        let md = m >> 6;
        let rm = m & 7;
        let mut mem = MemOperand {
            size,
            segment: self.prefixes.segment,
            base: None,
            index: None,
            scale: 1,
            disp: 0,
            disp_size: 0,
            addr_size: asize,
        };

        if asize == 16 {
            const BASE: [Option<u8>; 8] = [Some(3), Some(3), Some(5), Some(5), Some(6), Some(7), Some(5), Some(3)];
            const INDEX: [Option<u8>; 8] = [Some(6), Some(7), Some(6), Some(7), None, None, None, None];
            if md == 0 && rm == 6 {
                mem.disp_size = 2;
            } else {
                mem.base = BASE[usize::from(rm)].map(Register::Word);
                mem.index = INDEX[usize::from(rm)].map(Register::Word);
                mem.disp_size = match md {
                    1 => 1,
                    2 => 2,
                    _ => 0,
                };
            }
        } else {
            let wide = asize == 64;
            let reg = |n: u8| if wide { Register::Qword(n) } else { Register::Dword(n) };
            if rm == 4 {
                let sib = self.next()?;
                let index = ((sib >> 3) & 7) | (self.rex_x() << 3);
                let base = (sib & 7) | (self.rex_b() << 3);
                if index != 4 {
                    mem.index = Some(reg(index));
                    mem.scale = 1 << (sib >> 6);
                }
                if sib & 7 == 5 && md == 0 {
                    mem.disp_size = 4;
                } else {
                    mem.base = Some(reg(base));
                }
            } else if rm == 5 && md == 0 {
                if self.mode == Mode::Bits64 {
                    mem.base = Some(if wide { Register::Rip } else { Register::Eip });
                }
                mem.disp_size = 4;
            } else {
                mem.base = Some(reg(rm | (self.rex_b() << 3)));
            }
            match md {
                1 => mem.disp_size = 1,
                2 => mem.disp_size = 4,
                _ => {}
            }
        }

        if mem.disp_size > 0 {
            mem.disp = self.read_signed(usize::from(mem.disp_size))?;
        }
        Ok(Operand::Mem(mem))
    }
}

fn immediate(value: u64, size: u16) -> Operand {
    Operand::Imm(Immediate { value, size })
}

fn size_index(bits: u8) -> usize {
    match bits {
        16 => 0,
        32 => 1,
        _ => 2,
    }
}
