//! Opcode tables: the one-byte map, ModR/M groups and the x87 escapes.
//!
//! Operand specs follow the Intel manual's addressing-method notation
//! (`Eb`, `Gv`, `Iz`, `Jb`, ...). A table slot either names an instruction
//! or tells the decoder how to narrow the choice further: by ModR/M field,
//! mandatory prefix, bit-mode, operand size or address size. Vendor-specific
//! forms carry flags the decoder checks once a form is chosen.

/// Operand width code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sz {
    /// No defined width (`lea`, `lgdt`)
    Any,
    B,
    W,
    D,
    Q,
    /// 16/32/64 by effective operand size
    V,
    /// 16 when operand size is 16, otherwise 32
    Z,
    /// 64 under REX.W, otherwise 32
    Y,
    /// 128-bit
    Dq,
    /// 80-bit x87 extended / packed BCD
    T,
    /// Far pointer in memory: operand size + 16
    P,
    /// Native width of the mode: 64 in long mode, otherwise 32
    Lm,
}

/// Operand addressing method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    None,
    /// ModR/M r/m: general register or memory
    E(Sz),
    /// ModR/M r/m: memory only
    M(Sz),
    /// ModR/M reg: general register
    G(Sz),
    /// ModR/M r/m read as a general register whatever `mod` says
    R(Sz),
    /// Immediate, zero-extended
    I(Sz),
    /// 8-bit immediate sign-extended to the operand size
    Ibs,
    /// Relative branch displacement
    J(Sz),
    /// Direct far pointer
    A,
    /// Memory offset of address-size width (moffs)
    O(Sz),
    /// General register from the low three opcode bits (+REX.B)
    Z(Sz),
    /// Fixed general register by number
    Gpr(u8, Sz),
    /// Fixed segment register
    Sreg(u8),
    /// ModR/M reg: segment register
    S,
    /// ModR/M reg: control register
    C,
    /// ModR/M reg: debug register
    D,
    /// The constant 1
    One,
    /// ModR/M reg: SSE register
    V,
    /// ModR/M r/m: SSE register or memory
    W(Sz),
    /// ModR/M r/m: SSE register only
    U,
    /// ModR/M reg: MMX register
    P,
    /// ModR/M r/m: MMX register or memory
    Q(Sz),
    /// ModR/M r/m: MMX register only
    N,
    /// x87 top of stack
    St0,
    /// x87 stack register from ModR/M r/m
    Sti,
}

// Entry flags.
/// Invalid in 64-bit mode
pub(crate) const INV64: u16 = 1 << 0;
/// Valid only in 64-bit mode
pub(crate) const ONLY64: u16 = 1 << 1;
/// Operand size defaults to 64 in long mode
pub(crate) const DEF64: u16 = 1 << 2;
/// Near branch: 64-bit in long mode, 66 honoured only by AMD
pub(crate) const BRANCH: u16 = 1 << 3;
/// AMD only
pub(crate) const AMD: u16 = 1 << 4;
/// Intel only
pub(crate) const INTEL: u16 = 1 << 5;
/// AMD only outside long mode (syscall, sysret)
pub(crate) const AMD_LEGACY: u16 = 1 << 6;
/// Invalid in long mode on AMD (sysenter, sysexit)
pub(crate) const INTEL_LONG: u16 = 1 << 7;
/// String instruction: F3 prints as `rep`
pub(crate) const STRING: u16 = 1 << 8;
/// Comparing string instruction: F3 prints as `repe`
pub(crate) const STRING_CMP: u16 = 1 << 9;
/// Far control transfer
pub(crate) const FAR: u16 = 1 << 10;
/// Set by the decoder when a general-purpose r/m operand resolved to memory
pub(crate) const SIZED_MEM: u16 = 1 << 11;
/// Last operand is a CL shift count and never implies the operand width
pub(crate) const COUNT_CL: u16 = 1 << 12;
/// x87 floating-point memory form: GAS suffix s, l or t
pub(crate) const X87_FLOAT: u16 = 1 << 13;
/// x87 integer memory form: GAS suffix s, l or ll
pub(crate) const X87_INT: u16 = 1 << 14;

/// One instruction form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Entry {
    pub mnemonic: &'static str,
    pub ops: [Op; 3],
    pub flags: u16,
}

/// A table slot.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Slot {
    Invalid,
    Insn(Entry),
    /// Indexed by ModR/M reg
    Group(&'static [Slot; 8]),
    /// Split on ModR/M mod == 3
    ModSplit {
        mem: &'static Slot,
        reg: &'static Slot,
    },
    /// Indexed by ModR/M r/m
    RmTable(&'static [Slot; 8]),
    /// Mandatory prefix: none, 66, F3, F2
    Prefix(&'static [Slot; 4]),
    /// Repeat prefix only: none, F3, F2; 66 keeps its operand-size meaning
    RepSelect(&'static [Slot; 3]),
    /// Legacy modes, long mode
    Mode(&'static [Slot; 2]),
    /// Operand size 16, 32, 64
    OpSize {
        table: &'static [Slot; 3],
        def64: bool,
    },
    /// Address size 16, 32, 64
    AdSize(&'static [Slot; 3]),
}

macro_rules! insn {
    (@ $m:literal, $ops:expr, $f:expr) => {
        Slot::Insn(Entry { mnemonic: $m, ops: $ops, flags: $f })
    };
    ($m:literal) => { insn!(@ $m, [Op::None, Op::None, Op::None], 0) };
    ($m:literal; $f:expr) => { insn!(@ $m, [Op::None, Op::None, Op::None], $f) };
    ($m:literal, $a:expr) => { insn!(@ $m, [$a, Op::None, Op::None], 0) };
    ($m:literal, $a:expr; $f:expr) => { insn!(@ $m, [$a, Op::None, Op::None], $f) };
    ($m:literal, $a:expr, $b:expr) => { insn!(@ $m, [$a, $b, Op::None], 0) };
    ($m:literal, $a:expr, $b:expr; $f:expr) => { insn!(@ $m, [$a, $b, Op::None], $f) };
    ($m:literal, $a:expr, $b:expr, $c:expr) => { insn!(@ $m, [$a, $b, $c], 0) };
    ($m:literal, $a:expr, $b:expr, $c:expr; $f:expr) => { insn!(@ $m, [$a, $b, $c], $f) };
}

/// MMX form without prefix, SSE form under 66.
macro_rules! mmx_sse {
    ($m:literal) => {
        Slot::Prefix(&[
            insn!($m, Op::P, QQ),
            insn!($m, Op::V, WX),
            Slot::Invalid,
            Slot::Invalid,
        ])
    };
}

/// SSE form under 66 only.
macro_rules! sse66 {
    ($m:literal $(, $op:expr)*) => {
        Slot::Prefix(&[Slot::Invalid, insn!($m $(, $op)*), Slot::Invalid, Slot::Invalid])
    };
}

/// Packed/scalar arithmetic quartet: ps, pd, ss, sd.
macro_rules! sse_arith {
    ($ps:literal, $pd:literal, $ss:literal, $sd:literal) => {
        Slot::Prefix(&[
            insn!($ps, Op::V, WX),
            insn!($pd, Op::V, WX),
            insn!($ss, Op::V, WD),
            insn!($sd, Op::V, WQ),
        ])
    };
}

pub(crate) use {insn, mmx_sse, sse66, sse_arith};

pub(crate) const EB: Op = Op::E(Sz::B);
pub(crate) const EW: Op = Op::E(Sz::W);
pub(crate) const ED: Op = Op::E(Sz::D);
pub(crate) const EV: Op = Op::E(Sz::V);
pub(crate) const EY: Op = Op::E(Sz::Y);
pub(crate) const GB: Op = Op::G(Sz::B);
pub(crate) const GW: Op = Op::G(Sz::W);
pub(crate) const GD: Op = Op::G(Sz::D);
pub(crate) const GV: Op = Op::G(Sz::V);
pub(crate) const GZ: Op = Op::G(Sz::Z);
pub(crate) const GY: Op = Op::G(Sz::Y);
pub(crate) const IB: Op = Op::I(Sz::B);
pub(crate) const IW: Op = Op::I(Sz::W);
pub(crate) const IZ: Op = Op::I(Sz::Z);
pub(crate) const IV: Op = Op::I(Sz::V);
pub(crate) const IBS: Op = Op::Ibs;
pub(crate) const JB: Op = Op::J(Sz::B);
pub(crate) const JZ: Op = Op::J(Sz::Z);
pub(crate) const M: Op = Op::M(Sz::Any);
pub(crate) const MB: Op = Op::M(Sz::B);
pub(crate) const MW: Op = Op::M(Sz::W);
pub(crate) const MD: Op = Op::M(Sz::D);
pub(crate) const MQ: Op = Op::M(Sz::Q);
pub(crate) const MV: Op = Op::M(Sz::V);
pub(crate) const MY: Op = Op::M(Sz::Y);
pub(crate) const MT: Op = Op::M(Sz::T);
pub(crate) const MP: Op = Op::M(Sz::P);
pub(crate) const MDQ: Op = Op::M(Sz::Dq);
pub(crate) const RLM: Op = Op::R(Sz::Lm);
pub(crate) const OB: Op = Op::O(Sz::B);
pub(crate) const OV: Op = Op::O(Sz::V);
pub(crate) const ZB: Op = Op::Z(Sz::B);
pub(crate) const ZV: Op = Op::Z(Sz::V);
pub(crate) const ZY: Op = Op::Z(Sz::Y);
pub(crate) const AL: Op = Op::Gpr(0, Sz::B);
pub(crate) const CL: Op = Op::Gpr(1, Sz::B);
pub(crate) const AX: Op = Op::Gpr(0, Sz::W);
pub(crate) const DX: Op = Op::Gpr(2, Sz::W);
pub(crate) const RAX: Op = Op::Gpr(0, Sz::V);
pub(crate) const EAX: Op = Op::Gpr(0, Sz::Z);
pub(crate) const WX: Op = Op::W(Sz::Dq);
pub(crate) const WD: Op = Op::W(Sz::D);
pub(crate) const WQ: Op = Op::W(Sz::Q);
pub(crate) const QQ: Op = Op::Q(Sz::Q);
pub(crate) const ST0: Op = Op::St0;
pub(crate) const STI: Op = Op::Sti;

const GROUP1_EB_IB: [Slot; 8] = [
    insn!("add", EB, IB),
    insn!("or", EB, IB),
    insn!("adc", EB, IB),
    insn!("sbb", EB, IB),
    insn!("and", EB, IB),
    insn!("sub", EB, IB),
    insn!("xor", EB, IB),
    insn!("cmp", EB, IB),
];

const GROUP1_82: [Slot; 8] = [
    insn!("add", EB, IB; INV64),
    insn!("or", EB, IB; INV64),
    insn!("adc", EB, IB; INV64),
    insn!("sbb", EB, IB; INV64),
    insn!("and", EB, IB; INV64),
    insn!("sub", EB, IB; INV64),
    insn!("xor", EB, IB; INV64),
    insn!("cmp", EB, IB; INV64),
];

const GROUP1_EV_IZ: [Slot; 8] = [
    insn!("add", EV, IZ),
    insn!("or", EV, IZ),
    insn!("adc", EV, IZ),
    insn!("sbb", EV, IZ),
    insn!("and", EV, IZ),
    insn!("sub", EV, IZ),
    insn!("xor", EV, IZ),
    insn!("cmp", EV, IZ),
];

const GROUP1_EV_IBS: [Slot; 8] = [
    insn!("add", EV, IBS),
    insn!("or", EV, IBS),
    insn!("adc", EV, IBS),
    insn!("sbb", EV, IBS),
    insn!("and", EV, IBS),
    insn!("sub", EV, IBS),
    insn!("xor", EV, IBS),
    insn!("cmp", EV, IBS),
];

const GROUP1A: [Slot; 8] = [
    insn!("pop", EV; DEF64),
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
];

macro_rules! group2 {
    ($a:expr, $b:expr) => {
        group2!($a, $b; 0)
    };
    ($a:expr, $b:expr; $f:expr) => {
        [
            insn!("rol", $a, $b; $f),
            insn!("ror", $a, $b; $f),
            insn!("rcl", $a, $b; $f),
            insn!("rcr", $a, $b; $f),
            insn!("shl", $a, $b; $f),
            insn!("shr", $a, $b; $f),
            insn!("sal", $a, $b; $f),
            insn!("sar", $a, $b; $f),
        ]
    };
}

const GROUP2_EB_IB: [Slot; 8] = group2!(EB, IB);
const GROUP2_EV_IB: [Slot; 8] = group2!(EV, IB);
const GROUP2_EB_1: [Slot; 8] = group2!(EB, Op::One);
const GROUP2_EV_1: [Slot; 8] = group2!(EV, Op::One);
const GROUP2_EB_CL: [Slot; 8] = group2!(EB, CL; COUNT_CL);
const GROUP2_EV_CL: [Slot; 8] = group2!(EV, CL; COUNT_CL);

const GROUP3_EB: [Slot; 8] = [
    insn!("test", EB, IB),
    insn!("test", EB, IB),
    insn!("not", EB),
    insn!("neg", EB),
    insn!("mul", EB),
    insn!("imul", EB),
    insn!("div", EB),
    insn!("idiv", EB),
];

const GROUP3_EV: [Slot; 8] = [
    insn!("test", EV, IZ),
    insn!("test", EV, IZ),
    insn!("not", EV),
    insn!("neg", EV),
    insn!("mul", EV),
    insn!("imul", EV),
    insn!("div", EV),
    insn!("idiv", EV),
];

const GROUP4: [Slot; 8] = [
    insn!("inc", EB),
    insn!("dec", EB),
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
];

const GROUP5: [Slot; 8] = [
    insn!("inc", EV),
    insn!("dec", EV),
    insn!("call", EV; BRANCH),
    insn!("call", MP; FAR),
    insn!("jmp", EV; BRANCH),
    insn!("jmp", MP; FAR),
    insn!("push", EV; DEF64),
    Slot::Invalid,
];

const GROUP11_EB: [Slot; 8] = [
    insn!("mov", EB, IB),
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
];

const GROUP11_EV: [Slot; 8] = [
    insn!("mov", EV, IZ),
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
];

// x87 escapes D8..DF. Memory forms are indexed by ModR/M reg; register
// forms by reg and, where the whole row is one-operand-free, by r/m.

const X87_D8_MEM: [Slot; 8] = [
    insn!("fadd", MD; X87_FLOAT),
    insn!("fmul", MD; X87_FLOAT),
    insn!("fcom", MD; X87_FLOAT),
    insn!("fcomp", MD; X87_FLOAT),
    insn!("fsub", MD; X87_FLOAT),
    insn!("fsubr", MD; X87_FLOAT),
    insn!("fdiv", MD; X87_FLOAT),
    insn!("fdivr", MD; X87_FLOAT),
];

const X87_D8_REG: [Slot; 8] = [
    insn!("fadd", ST0, STI),
    insn!("fmul", ST0, STI),
    insn!("fcom", ST0, STI),
    insn!("fcomp", ST0, STI),
    insn!("fsub", ST0, STI),
    insn!("fsubr", ST0, STI),
    insn!("fdiv", ST0, STI),
    insn!("fdivr", ST0, STI),
];

const X87_D9_MEM: [Slot; 8] = [
    insn!("fld", MD; X87_FLOAT),
    Slot::Invalid,
    insn!("fst", MD; X87_FLOAT),
    insn!("fstp", MD; X87_FLOAT),
    insn!("fldenv", M),
    insn!("fldcw", MW),
    insn!("fnstenv", M),
    insn!("fnstcw", MW),
];

const X87_D9_REG: [Slot; 8] = [
    insn!("fld", STI),
    insn!("fxch", STI),
    Slot::RmTable(&[
        insn!("fnop"),
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
    ]),
    Slot::Invalid,
    Slot::RmTable(&[
        insn!("fchs"),
        insn!("fabs"),
        Slot::Invalid,
        Slot::Invalid,
        insn!("ftst"),
        insn!("fxam"),
        Slot::Invalid,
        Slot::Invalid,
    ]),
    Slot::RmTable(&[
        insn!("fld1"),
        insn!("fldl2t"),
        insn!("fldl2e"),
        insn!("fldpi"),
        insn!("fldlg2"),
        insn!("fldln2"),
        insn!("fldz"),
        Slot::Invalid,
    ]),
    Slot::RmTable(&[
        insn!("f2xm1"),
        insn!("fyl2x"),
        insn!("fptan"),
        insn!("fpatan"),
        insn!("fxtract"),
        insn!("fprem1"),
        insn!("fdecstp"),
        insn!("fincstp"),
    ]),
    Slot::RmTable(&[
        insn!("fprem"),
        insn!("fyl2xp1"),
        insn!("fsqrt"),
        insn!("fsincos"),
        insn!("frndint"),
        insn!("fscale"),
        insn!("fsin"),
        insn!("fcos"),
    ]),
];

const X87_DA_MEM: [Slot; 8] = [
    insn!("fiadd", MD; X87_INT),
    insn!("fimul", MD; X87_INT),
    insn!("ficom", MD; X87_INT),
    insn!("ficomp", MD; X87_INT),
    insn!("fisub", MD; X87_INT),
    insn!("fisubr", MD; X87_INT),
    insn!("fidiv", MD; X87_INT),
    insn!("fidivr", MD; X87_INT),
];

const X87_DA_REG: [Slot; 8] = [
    insn!("fcmovb", ST0, STI),
    insn!("fcmove", ST0, STI),
    insn!("fcmovbe", ST0, STI),
    insn!("fcmovu", ST0, STI),
    Slot::Invalid,
    Slot::RmTable(&[
        Slot::Invalid,
        insn!("fucompp"),
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
    ]),
    Slot::Invalid,
    Slot::Invalid,
];

const X87_DB_MEM: [Slot; 8] = [
    insn!("fild", MD; X87_INT),
    insn!("fisttp", MD; X87_INT),
    insn!("fist", MD; X87_INT),
    insn!("fistp", MD; X87_INT),
    Slot::Invalid,
    insn!("fld", MT; X87_FLOAT),
    Slot::Invalid,
    insn!("fstp", MT; X87_FLOAT),
];

const X87_DB_REG: [Slot; 8] = [
    insn!("fcmovnb", ST0, STI),
    insn!("fcmovne", ST0, STI),
    insn!("fcmovnbe", ST0, STI),
    insn!("fcmovnu", ST0, STI),
    Slot::RmTable(&[
        Slot::Invalid,
        Slot::Invalid,
        insn!("fnclex"),
        insn!("fninit"),
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
    ]),
    insn!("fucomi", ST0, STI),
    insn!("fcomi", ST0, STI),
    Slot::Invalid,
];

const X87_DC_MEM: [Slot; 8] = [
    insn!("fadd", MQ; X87_FLOAT),
    insn!("fmul", MQ; X87_FLOAT),
    insn!("fcom", MQ; X87_FLOAT),
    insn!("fcomp", MQ; X87_FLOAT),
    insn!("fsub", MQ; X87_FLOAT),
    insn!("fsubr", MQ; X87_FLOAT),
    insn!("fdiv", MQ; X87_FLOAT),
    insn!("fdivr", MQ; X87_FLOAT),
];

const X87_DC_REG: [Slot; 8] = [
    insn!("fadd", STI, ST0),
    insn!("fmul", STI, ST0),
    Slot::Invalid,
    Slot::Invalid,
    insn!("fsubr", STI, ST0),
    insn!("fsub", STI, ST0),
    insn!("fdivr", STI, ST0),
    insn!("fdiv", STI, ST0),
];

const X87_DD_MEM: [Slot; 8] = [
    insn!("fld", MQ; X87_FLOAT),
    insn!("fisttp", MQ; X87_INT),
    insn!("fst", MQ; X87_FLOAT),
    insn!("fstp", MQ; X87_FLOAT),
    insn!("frstor", M),
    Slot::Invalid,
    insn!("fnsave", M),
    insn!("fnstsw", MW),
];

const X87_DD_REG: [Slot; 8] = [
    insn!("ffree", STI),
    Slot::Invalid,
    insn!("fst", STI),
    insn!("fstp", STI),
    insn!("fucom", STI),
    insn!("fucomp", STI),
    Slot::Invalid,
    Slot::Invalid,
];

const X87_DE_MEM: [Slot; 8] = [
    insn!("fiadd", MW; X87_INT),
    insn!("fimul", MW; X87_INT),
    insn!("ficom", MW; X87_INT),
    insn!("ficomp", MW; X87_INT),
    insn!("fisub", MW; X87_INT),
    insn!("fisubr", MW; X87_INT),
    insn!("fidiv", MW; X87_INT),
    insn!("fidivr", MW; X87_INT),
];

const X87_DE_REG: [Slot; 8] = [
    insn!("faddp", STI, ST0),
    insn!("fmulp", STI, ST0),
    Slot::Invalid,
    Slot::RmTable(&[
        Slot::Invalid,
        insn!("fcompp"),
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
    ]),
    insn!("fsubrp", STI, ST0),
    insn!("fsubp", STI, ST0),
    insn!("fdivrp", STI, ST0),
    insn!("fdivp", STI, ST0),
];

const X87_DF_MEM: [Slot; 8] = [
    insn!("fild", MW; X87_INT),
    insn!("fisttp", MW; X87_INT),
    insn!("fist", MW; X87_INT),
    insn!("fistp", MW; X87_INT),
    insn!("fbld", MT),
    insn!("fild", MQ; X87_INT),
    insn!("fbstp", MT),
    insn!("fistp", MQ; X87_INT),
];

const X87_DF_REG: [Slot; 8] = [
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::RmTable(&[
        insn!("fnstsw", AX),
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
    ]),
    insn!("fucomip", ST0, STI),
    insn!("fcomip", ST0, STI),
    Slot::Invalid,
];

macro_rules! x87 {
    ($mem:ident, $reg:ident) => {
        Slot::ModSplit {
            mem: &Slot::Group(&$mem),
            reg: &Slot::Group(&$reg),
        }
    };
}

/// Primary opcode map. Prefix bytes, 0F and (in long mode) 40..4F never
/// reach this table; their slots only matter for documentation.
pub(crate) static ONE_BYTE: [Slot; 256] = [
    // 00
    insn!("add", EB, GB),
    insn!("add", EV, GV),
    insn!("add", GB, EB),
    insn!("add", GV, EV),
    insn!("add", AL, IB),
    insn!("add", RAX, IZ),
    insn!("push", Op::Sreg(0); INV64),
    insn!("pop", Op::Sreg(0); INV64),
    insn!("or", EB, GB),
    insn!("or", EV, GV),
    insn!("or", GB, EB),
    insn!("or", GV, EV),
    insn!("or", AL, IB),
    insn!("or", RAX, IZ),
    insn!("push", Op::Sreg(1); INV64),
    Slot::Invalid, // 0F escape
    // 10
    insn!("adc", EB, GB),
    insn!("adc", EV, GV),
    insn!("adc", GB, EB),
    insn!("adc", GV, EV),
    insn!("adc", AL, IB),
    insn!("adc", RAX, IZ),
    insn!("push", Op::Sreg(2); INV64),
    insn!("pop", Op::Sreg(2); INV64),
    insn!("sbb", EB, GB),
    insn!("sbb", EV, GV),
    insn!("sbb", GB, EB),
    insn!("sbb", GV, EV),
    insn!("sbb", AL, IB),
    insn!("sbb", RAX, IZ),
    insn!("push", Op::Sreg(3); INV64),
    insn!("pop", Op::Sreg(3); INV64),
    // 20
    insn!("and", EB, GB),
    insn!("and", EV, GV),
    insn!("and", GB, EB),
    insn!("and", GV, EV),
    insn!("and", AL, IB),
    insn!("and", RAX, IZ),
    Slot::Invalid, // es:
    insn!("daa"; INV64),
    insn!("sub", EB, GB),
    insn!("sub", EV, GV),
    insn!("sub", GB, EB),
    insn!("sub", GV, EV),
    insn!("sub", AL, IB),
    insn!("sub", RAX, IZ),
    Slot::Invalid, // cs:
    insn!("das"; INV64),
    // 30
    insn!("xor", EB, GB),
    insn!("xor", EV, GV),
    insn!("xor", GB, EB),
    insn!("xor", GV, EV),
    insn!("xor", AL, IB),
    insn!("xor", RAX, IZ),
    Slot::Invalid, // ss:
    insn!("aaa"; INV64),
    insn!("cmp", EB, GB),
    insn!("cmp", EV, GV),
    insn!("cmp", GB, EB),
    insn!("cmp", GV, EV),
    insn!("cmp", AL, IB),
    insn!("cmp", RAX, IZ),
    Slot::Invalid, // ds:
    insn!("aas"; INV64),
    // 40
    insn!("inc", ZV; INV64),
    insn!("inc", ZV; INV64),
    insn!("inc", ZV; INV64),
    insn!("inc", ZV; INV64),
    insn!("inc", ZV; INV64),
    insn!("inc", ZV; INV64),
    insn!("inc", ZV; INV64),
    insn!("inc", ZV; INV64),
    insn!("dec", ZV; INV64),
    insn!("dec", ZV; INV64),
    insn!("dec", ZV; INV64),
    insn!("dec", ZV; INV64),
    insn!("dec", ZV; INV64),
    insn!("dec", ZV; INV64),
    insn!("dec", ZV; INV64),
    insn!("dec", ZV; INV64),
    // 50
    insn!("push", ZV; DEF64),
    insn!("push", ZV; DEF64),
    insn!("push", ZV; DEF64),
    insn!("push", ZV; DEF64),
    insn!("push", ZV; DEF64),
    insn!("push", ZV; DEF64),
    insn!("push", ZV; DEF64),
    insn!("push", ZV; DEF64),
    insn!("pop", ZV; DEF64),
    insn!("pop", ZV; DEF64),
    insn!("pop", ZV; DEF64),
    insn!("pop", ZV; DEF64),
    insn!("pop", ZV; DEF64),
    insn!("pop", ZV; DEF64),
    insn!("pop", ZV; DEF64),
    insn!("pop", ZV; DEF64),
    // 60
    Slot::OpSize {
        table: &[insn!("pusha"; INV64), insn!("pushad"; INV64), Slot::Invalid],
        def64: false,
    },
    Slot::OpSize {
        table: &[insn!("popa"; INV64), insn!("popad"; INV64), Slot::Invalid],
        def64: false,
    },
    insn!("bound", GV, M; INV64),
    Slot::Mode(&[insn!("arpl", EW, GW), insn!("movsxd", GV, ED)]),
    Slot::Invalid, // fs:
    Slot::Invalid, // gs:
    Slot::Invalid, // operand size
    Slot::Invalid, // address size
    insn!("push", IZ; DEF64),
    insn!("imul", GV, EV, IZ),
    insn!("push", IBS; DEF64),
    insn!("imul", GV, EV, IBS),
    insn!("insb"; STRING),
    Slot::OpSize {
        table: &[insn!("insw"; STRING), insn!("insd"; STRING), insn!("insd"; STRING)],
        def64: false,
    },
    insn!("outsb"; STRING),
    Slot::OpSize {
        table: &[insn!("outsw"; STRING), insn!("outsd"; STRING), insn!("outsd"; STRING)],
        def64: false,
    },
    // 70
    insn!("jo", JB; BRANCH),
    insn!("jno", JB; BRANCH),
    insn!("jb", JB; BRANCH),
    insn!("jae", JB; BRANCH),
    insn!("jz", JB; BRANCH),
    insn!("jnz", JB; BRANCH),
    insn!("jbe", JB; BRANCH),
    insn!("ja", JB; BRANCH),
    insn!("js", JB; BRANCH),
    insn!("jns", JB; BRANCH),
    insn!("jp", JB; BRANCH),
    insn!("jnp", JB; BRANCH),
    insn!("jl", JB; BRANCH),
    insn!("jge", JB; BRANCH),
    insn!("jle", JB; BRANCH),
    insn!("jg", JB; BRANCH),
    // 80
    Slot::Group(&GROUP1_EB_IB),
    Slot::Group(&GROUP1_EV_IZ),
    Slot::Group(&GROUP1_82),
    Slot::Group(&GROUP1_EV_IBS),
    insn!("test", EB, GB),
    insn!("test", EV, GV),
    insn!("xchg", EB, GB),
    insn!("xchg", EV, GV),
    insn!("mov", EB, GB),
    insn!("mov", EV, GV),
    insn!("mov", GB, EB),
    insn!("mov", GV, EV),
    insn!("mov", EW, Op::S),
    insn!("lea", GV, M),
    insn!("mov", Op::S, EW),
    Slot::Group(&GROUP1A),
    // 90
    Slot::RepSelect(&[insn!("nop"), insn!("pause"), insn!("nop")]),
    insn!("xchg", ZV, RAX),
    insn!("xchg", ZV, RAX),
    insn!("xchg", ZV, RAX),
    insn!("xchg", ZV, RAX),
    insn!("xchg", ZV, RAX),
    insn!("xchg", ZV, RAX),
    insn!("xchg", ZV, RAX),
    Slot::OpSize {
        table: &[insn!("cbw"), insn!("cwde"), insn!("cdqe")],
        def64: false,
    },
    Slot::OpSize {
        table: &[insn!("cwd"), insn!("cdq"), insn!("cqo")],
        def64: false,
    },
    insn!("call", Op::A; INV64 | FAR),
    insn!("wait"),
    Slot::OpSize {
        table: &[insn!("pushfw"; DEF64), insn!("pushfd"; DEF64), insn!("pushfq"; DEF64)],
        def64: true,
    },
    Slot::OpSize {
        table: &[insn!("popfw"; DEF64), insn!("popfd"; DEF64), insn!("popfq"; DEF64)],
        def64: true,
    },
    insn!("sahf"),
    insn!("lahf"),
    // A0
    insn!("mov", AL, OB),
    insn!("mov", RAX, OV),
    insn!("mov", OB, AL),
    insn!("mov", OV, RAX),
    insn!("movsb"; STRING),
    Slot::OpSize {
        table: &[insn!("movsw"; STRING), insn!("movsd"; STRING), insn!("movsq"; STRING)],
        def64: false,
    },
    insn!("cmpsb"; STRING_CMP),
    Slot::OpSize {
        table: &[insn!("cmpsw"; STRING_CMP), insn!("cmpsd"; STRING_CMP), insn!("cmpsq"; STRING_CMP)],
        def64: false,
    },
    insn!("test", AL, IB),
    insn!("test", RAX, IZ),
    insn!("stosb"; STRING),
    Slot::OpSize {
        table: &[insn!("stosw"; STRING), insn!("stosd"; STRING), insn!("stosq"; STRING)],
        def64: false,
    },
    insn!("lodsb"; STRING),
    Slot::OpSize {
        table: &[insn!("lodsw"; STRING), insn!("lodsd"; STRING), insn!("lodsq"; STRING)],
        def64: false,
    },
    insn!("scasb"; STRING_CMP),
    Slot::OpSize {
        table: &[insn!("scasw"; STRING_CMP), insn!("scasd"; STRING_CMP), insn!("scasq"; STRING_CMP)],
        def64: false,
    },
    // B0
    insn!("mov", ZB, IB),
    insn!("mov", ZB, IB),
    insn!("mov", ZB, IB),
    insn!("mov", ZB, IB),
    insn!("mov", ZB, IB),
    insn!("mov", ZB, IB),
    insn!("mov", ZB, IB),
    insn!("mov", ZB, IB),
    insn!("mov", ZV, IV),
    insn!("mov", ZV, IV),
    insn!("mov", ZV, IV),
    insn!("mov", ZV, IV),
    insn!("mov", ZV, IV),
    insn!("mov", ZV, IV),
    insn!("mov", ZV, IV),
    insn!("mov", ZV, IV),
    // C0
    Slot::Group(&GROUP2_EB_IB),
    Slot::Group(&GROUP2_EV_IB),
    insn!("ret", IW; BRANCH),
    insn!("ret"; BRANCH),
    insn!("les", GZ, MP; INV64),
    insn!("lds", GZ, MP; INV64),
    Slot::Group(&GROUP11_EB),
    Slot::Group(&GROUP11_EV),
    insn!("enter", IW, IB; DEF64),
    insn!("leave"; DEF64),
    insn!("retf", IW; FAR),
    insn!("retf"; FAR),
    insn!("int3"),
    insn!("int", IB),
    insn!("into"; INV64),
    Slot::OpSize {
        table: &[insn!("iretw"), insn!("iretd"), insn!("iretq")],
        def64: false,
    },
    // D0
    Slot::Group(&GROUP2_EB_1),
    Slot::Group(&GROUP2_EV_1),
    Slot::Group(&GROUP2_EB_CL),
    Slot::Group(&GROUP2_EV_CL),
    insn!("aam", IB; INV64),
    insn!("aad", IB; INV64),
    insn!("salc"; INV64),
    insn!("xlatb"),
    x87!(X87_D8_MEM, X87_D8_REG),
    x87!(X87_D9_MEM, X87_D9_REG),
    x87!(X87_DA_MEM, X87_DA_REG),
    x87!(X87_DB_MEM, X87_DB_REG),
    x87!(X87_DC_MEM, X87_DC_REG),
    x87!(X87_DD_MEM, X87_DD_REG),
    x87!(X87_DE_MEM, X87_DE_REG),
    x87!(X87_DF_MEM, X87_DF_REG),
    // E0
    insn!("loopnz", JB; BRANCH),
    insn!("loope", JB; BRANCH),
    insn!("loop", JB; BRANCH),
    Slot::AdSize(&[
        insn!("jcxz", JB; BRANCH),
        insn!("jecxz", JB; BRANCH),
        insn!("jrcxz", JB; BRANCH),
    ]),
    insn!("in", AL, IB),
    insn!("in", EAX, IB),
    insn!("out", IB, AL),
    insn!("out", IB, EAX),
    insn!("call", JZ; BRANCH),
    insn!("jmp", JZ; BRANCH),
    insn!("jmp", Op::A; INV64 | FAR),
    insn!("jmp", JB; BRANCH),
    insn!("in", AL, DX),
    insn!("in", EAX, DX),
    insn!("out", DX, AL),
    insn!("out", DX, EAX),
    // F0
    Slot::Invalid, // lock
    insn!("int1"),
    Slot::Invalid, // repne
    Slot::Invalid, // rep
    insn!("hlt"),
    insn!("cmc"),
    Slot::Group(&GROUP3_EB),
    Slot::Group(&GROUP3_EV),
    insn!("clc"),
    insn!("stc"),
    insn!("cli"),
    insn!("sti"),
    insn!("cld"),
    insn!("std"),
    Slot::Group(&GROUP4),
    Slot::Group(&GROUP5),
];
