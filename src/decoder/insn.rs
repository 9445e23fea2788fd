//! The decoded instruction record and its operands.

use std::fmt;

use super::tables::{BRANCH, COUNT_CL, FAR, SIZED_MEM, STRING, STRING_CMP, X87_FLOAT, X87_INT};
use crate::{syntax, Address, Syntax, MAX_INSTRUCTION_SIZE};

/// Mnemonic of the pseudo-instruction produced for undecodable bytes.
pub const INVALID_MNEMONIC: &str = "invalid";

const GPR64: [&str; 16] = [
    "rax", "rcx", "rdx", "rbx", "rsp", "rbp", "rsi", "rdi",
    "r8", "r9", "r10", "r11", "r12", "r13", "r14", "r15",
];
const GPR32: [&str; 16] = [
    "eax", "ecx", "edx", "ebx", "esp", "ebp", "esi", "edi",
    "r8d", "r9d", "r10d", "r11d", "r12d", "r13d", "r14d", "r15d",
];
const GPR16: [&str; 16] = [
    "ax", "cx", "dx", "bx", "sp", "bp", "si", "di",
    "r8w", "r9w", "r10w", "r11w", "r12w", "r13w", "r14w", "r15w",
];
const GPR8: [&str; 16] = [
    "al", "cl", "dl", "bl", "spl", "bpl", "sil", "dil",
    "r8b", "r9b", "r10b", "r11b", "r12b", "r13b", "r14b", "r15b",
];
const GPR8_HIGH: [&str; 4] = ["ah", "ch", "dh", "bh"];
const SEGMENT: [&str; 6] = ["es", "cs", "ss", "ds", "fs", "gs"];
const CONTROL: [&str; 16] = [
    "cr0", "cr1", "cr2", "cr3", "cr4", "cr5", "cr6", "cr7",
    "cr8", "cr9", "cr10", "cr11", "cr12", "cr13", "cr14", "cr15",
];
const DEBUG: [&str; 16] = [
    "dr0", "dr1", "dr2", "dr3", "dr4", "dr5", "dr6", "dr7",
    "dr8", "dr9", "dr10", "dr11", "dr12", "dr13", "dr14", "dr15",
];
const MMX: [&str; 8] = ["mm0", "mm1", "mm2", "mm3", "mm4", "mm5", "mm6", "mm7"];
const XMM: [&str; 16] = [
    "xmm0", "xmm1", "xmm2", "xmm3", "xmm4", "xmm5", "xmm6", "xmm7",
    "xmm8", "xmm9", "xmm10", "xmm11", "xmm12", "xmm13", "xmm14", "xmm15",
];
const ST: [&str; 8] = ["st0", "st1", "st2", "st3", "st4", "st5", "st6", "st7"];

/// A machine register. The payload is the register number within its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// 8-bit low registers: al..bl, spl..dil (REX forms), r8b..r15b
    Byte(u8),
    /// Legacy high-byte registers ah, ch, dh, bh (numbered 0..=3)
    HighByte(u8),
    /// 16-bit general registers
    Word(u8),
    /// 32-bit general registers
    Dword(u8),
    /// 64-bit general registers
    Qword(u8),
    /// Segment registers es, cs, ss, ds, fs, gs
    Segment(u8),
    /// Control registers
    Control(u8),
    /// Debug registers
    Debug(u8),
    /// MMX registers
    Mmx(u8),
    /// SSE registers
    Xmm(u8),
    /// x87 stack registers
    St(u8),
    /// 64-bit instruction pointer (RIP-relative addressing)
    Rip,
    /// 32-bit instruction pointer (RIP-relative with address-size override)
    Eip,
}

impl Register {
    /// Lowercase register name without any syntax decoration.
    pub fn name(&self) -> &'static str {
        fn pick(table: &'static [&'static str], i: u8) -> &'static str {
            table.get(i as usize).copied().unwrap_or("?")
        }
        match *self {
            Register::Byte(i) => pick(&GPR8, i),
            Register::HighByte(i) => pick(&GPR8_HIGH, i),
            Register::Word(i) => pick(&GPR16, i),
            Register::Dword(i) => pick(&GPR32, i),
            Register::Qword(i) => pick(&GPR64, i),
            Register::Segment(i) => pick(&SEGMENT, i),
            Register::Control(i) => pick(&CONTROL, i),
            Register::Debug(i) => pick(&DEBUG, i),
            Register::Mmx(i) => pick(&MMX, i),
            Register::Xmm(i) => pick(&XMM, i),
            Register::St(i) => pick(&ST, i),
            Register::Rip => "rip",
            Register::Eip => "eip",
        }
    }

    /// Width in bits.
    pub fn size(&self) -> u16 {
        match self {
            Register::Byte(_) | Register::HighByte(_) => 8,
            Register::Word(_) | Register::Segment(_) => 16,
            Register::Dword(_) | Register::Eip => 32,
            Register::Qword(_) | Register::Rip | Register::Mmx(_) => 64,
            Register::Control(_) | Register::Debug(_) => 64,
            Register::Xmm(_) => 128,
            Register::St(_) => 80,
        }
    }

    /// True for the integer general-purpose register file.
    pub fn is_general(&self) -> bool {
        matches!(
            self,
            Register::Byte(_)
                | Register::HighByte(_)
                | Register::Word(_)
                | Register::Dword(_)
                | Register::Qword(_)
        )
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A memory reference `segment:[base + index*scale + disp]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemOperand {
    /// Access width in bits, 0 when the instruction does not define one (`lea`)
    pub size: u16,
    /// Explicit segment override
    pub segment: Option<Register>,
    /// Base register
    pub base: Option<Register>,
    /// Index register
    pub index: Option<Register>,
    /// Index scale factor (1, 2, 4 or 8)
    pub scale: u8,
    /// Sign-extended displacement
    pub disp: i64,
    /// Width of the encoded displacement in bytes (0 when absent)
    pub disp_size: u8,
    /// Effective address width in bits
    pub addr_size: u8,
}

impl MemOperand {
    /// The displacement as an absolute address, wrapped to the address width.
    pub fn absolute(&self) -> u64 {
        (self.disp as u64) & mask(u16::from(self.addr_size))
    }
}

/// An immediate value, sign- or zero-extended to `size` bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Immediate {
    /// Raw value, already extended to 64 bits
    pub value: u64,
    /// Width the value is interpreted at, in bits
    pub size: u16,
}

impl Immediate {
    /// The value truncated to its width.
    pub fn masked(&self) -> u64 {
        self.value & mask(self.size)
    }
}

/// One instruction operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// A register
    Reg(Register),
    /// A memory reference
    Mem(MemOperand),
    /// An immediate
    Imm(Immediate),
    /// A relative branch, already resolved to its absolute target
    Branch {
        /// Absolute target address
        target: Address,
        /// Width of the instruction pointer the target was wrapped to
        size: u16,
    },
    /// A direct far pointer `selector:offset`
    Far {
        /// Code segment selector
        selector: u16,
        /// Offset within the segment
        offset: u32,
    },
    /// A literal constant encoded by the opcode itself (the `1` in `shl eax, 1`)
    Const(u8),
}

impl Operand {
    /// Width in bits, 0 where the operand has no inherent width.
    pub fn size(&self) -> u16 {
        match self {
            Operand::Reg(r) => r.size(),
            Operand::Mem(m) => m.size,
            Operand::Imm(i) => i.size,
            Operand::Branch { size, .. } => *size,
            Operand::Far { .. } | Operand::Const(_) => 0,
        }
    }
}

/// Repeat prefix carried by an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepPrefix {
    /// F3
    Rep,
    /// F2
    Repne,
}

/// Legacy and REX prefixes seen before the opcode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Prefixes {
    /// F0
    pub lock: bool,
    /// Last of F2/F3
    pub rep: Option<RepPrefix>,
    /// Segment override, `None` when absent or ignored in long mode
    pub segment: Option<Register>,
    /// 66
    pub operand_size: bool,
    /// 67
    pub address_size: bool,
    /// REX byte (0x40..=0x4F) or 0 when absent
    pub rex: u8,
}

/// One decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insn {
    /// Position of the first byte, counted from where the source was attached
    pub position: u64,
    /// Virtual address: program-counter base plus position
    pub addr: Address,
    /// Size of the instruction in bytes
    pub size: u8,
    /// Raw bytes of the instruction (up to MAX_INSTRUCTION_SIZE)
    pub bytes: [u8; MAX_INSTRUCTION_SIZE],
    /// Instruction mnemonic (e.g., "mov", "add")
    pub mnemonic: &'static str,
    /// Decoded operands in Intel order (destination first)
    pub operands: Vec<Operand>,
    /// Prefixes as decoded
    pub prefixes: Prefixes,
    /// Effective operand width in bits
    pub operand_size: u8,
    /// Effective address width in bits
    pub address_size: u8,
    pub(crate) flags: u16,
}

impl Insn {
    pub(crate) fn invalid(position: u64, addr: Address, byte: u8) -> Self {
        let mut bytes = [0u8; MAX_INSTRUCTION_SIZE];
        bytes[0] = byte;
        Insn {
            position,
            addr,
            size: 1,
            bytes,
            mnemonic: INVALID_MNEMONIC,
            operands: Vec::new(),
            prefixes: Prefixes::default(),
            operand_size: 0,
            address_size: 0,
            flags: 0,
        }
    }

    /// Returns the instruction bytes, up to the actual instruction size.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes[..self.size as usize]
    }

    /// True for the pseudo-instruction standing in for undecodable bytes.
    pub fn is_invalid(&self) -> bool {
        self.mnemonic == INVALID_MNEMONIC
    }

    /// True for jumps, calls and loops.
    pub fn is_branch(&self) -> bool {
        self.mnemonic.starts_with('j')
            || self.mnemonic.starts_with("loop")
            || self.mnemonic == "call"
    }

    /// True for near and far returns.
    pub fn is_return(&self) -> bool {
        matches!(self.mnemonic, "ret" | "retf" | "iretw" | "iretd" | "iretq")
    }

    /// True for far calls, jumps and returns.
    pub fn is_far(&self) -> bool {
        self.flags & FAR != 0
    }

    /// Near or far control transfer; register and memory operands are targets.
    pub(crate) fn is_transfer(&self) -> bool {
        self.flags & (BRANCH | FAR) != 0
    }

    /// A general-purpose r/m operand was encoded as memory.
    pub(crate) fn has_sized_memory(&self) -> bool {
        self.flags & SIZED_MEM != 0
    }

    /// A register operand of `bits` width implies the memory operand's width.
    /// A CL shift count never does.
    pub(crate) fn register_implies_width(&self, bits: u16) -> bool {
        let sizing = if self.flags & COUNT_CL != 0 {
            self.operands.len().saturating_sub(1)
        } else {
            self.operands.len()
        };
        self.operands[..sizing]
            .iter()
            .any(|op| matches!(op, Operand::Reg(r) if r.size() == bits))
    }

    /// The memory operand, if any.
    pub(crate) fn memory_operand(&self) -> Option<&MemOperand> {
        self.operands.iter().find_map(|op| match op {
            Operand::Mem(mem) => Some(mem),
            _ => None,
        })
    }

    pub(crate) fn is_x87_float(&self) -> bool {
        self.flags & X87_FLOAT != 0
    }

    pub(crate) fn is_x87_integer(&self) -> bool {
        self.flags & X87_INT != 0
    }

    /// Repeat prefix as printed, only for string instructions.
    pub(crate) fn repeat_prefix(&self) -> Option<&'static str> {
        let rep = self.prefixes.rep?;
        if self.flags & STRING_CMP != 0 {
            Some(match rep {
                RepPrefix::Rep => "repe",
                RepPrefix::Repne => "repne",
            })
        } else if self.flags & STRING != 0 {
            Some(match rep {
                RepPrefix::Rep => "rep",
                RepPrefix::Repne => "repne",
            })
        } else {
            None
        }
    }

    /// Resolved target of a relative branch, if this is one.
    pub fn branch_target(&self) -> Option<Address> {
        self.operands.iter().find_map(|op| match op {
            Operand::Branch { target, .. } => Some(*target),
            _ => None,
        })
    }

    /// Render in the given dialect.
    pub fn render(&self, syntax: Syntax) -> String {
        syntax::render(self, syntax)
    }

    /// Lowercase hex of the raw bytes.
    pub fn hex(&self) -> String {
        syntax::hex(self.bytes())
    }
}

impl fmt::Display for Insn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&syntax::render(self, Syntax::Intel))
    }
}

/// All-ones mask of `bits` width (64 and above give the full word).
pub(crate) fn mask(bits: u16) -> u64 {
    if bits == 0 || bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}
