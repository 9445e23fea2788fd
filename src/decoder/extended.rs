//! Two- and three-byte opcode maps (0F, 0F 38, 0F 3A) and the 3DNow! suffix
//! table.

use super::tables::*;

const GROUP6: [Slot; 8] = [
    // the memory forms always store 16 bits
    Slot::ModSplit {
        mem: &insn!("sldt", EW),
        reg: &insn!("sldt", EV),
    },
    Slot::ModSplit {
        mem: &insn!("str", EW),
        reg: &insn!("str", EV),
    },
    insn!("lldt", EW),
    insn!("ltr", EW),
    insn!("verr", EW),
    insn!("verw", EW),
    Slot::Invalid,
    Slot::Invalid,
];

const GROUP7_MEM: [Slot; 8] = [
    insn!("sgdt", M),
    insn!("sidt", M),
    insn!("lgdt", M),
    insn!("lidt", M),
    insn!("smsw", MW),
    Slot::Invalid,
    insn!("lmsw", MW),
    insn!("invlpg", M),
];

const GROUP7_REG: [Slot; 8] = [
    Slot::RmTable(&[
        Slot::Invalid,
        insn!("vmcall"; INTEL),
        insn!("vmlaunch"; INTEL),
        insn!("vmresume"; INTEL),
        insn!("vmxoff"; INTEL),
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
    ]),
    Slot::RmTable(&[
        insn!("monitor"),
        insn!("mwait"),
        insn!("clac"),
        insn!("stac"),
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
    ]),
    Slot::RmTable(&[
        insn!("xgetbv"),
        insn!("xsetbv"),
        Slot::Invalid,
        Slot::Invalid,
        insn!("vmfunc"; INTEL),
        insn!("xend"),
        insn!("xtest"),
        Slot::Invalid,
    ]),
    Slot::RmTable(&[
        insn!("vmrun"; AMD),
        insn!("vmmcall"; AMD),
        insn!("vmload"; AMD),
        insn!("vmsave"; AMD),
        insn!("stgi"; AMD),
        insn!("clgi"; AMD),
        insn!("skinit"; AMD),
        insn!("invlpga"; AMD),
    ]),
    insn!("smsw", EV),
    Slot::Invalid,
    insn!("lmsw", EW),
    Slot::RmTable(&[
        insn!("swapgs"; ONLY64),
        insn!("rdtscp"),
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
        Slot::Invalid,
    ]),
];

const GROUP_PREFETCH: [Slot; 8] = [
    insn!("prefetch", MB),
    insn!("prefetchw", MB),
    insn!("prefetch", MB),
    insn!("prefetch", MB),
    insn!("prefetch", MB),
    insn!("prefetch", MB),
    insn!("prefetch", MB),
    insn!("prefetch", MB),
];

const GROUP16: [Slot; 8] = [
    insn!("prefetchnta", MB),
    insn!("prefetcht0", MB),
    insn!("prefetcht1", MB),
    insn!("prefetcht2", MB),
    insn!("nop", EV),
    insn!("nop", EV),
    insn!("nop", EV),
    insn!("nop", EV),
];

macro_rules! mmx_shift {
    ($m:literal) => {
        Slot::Prefix(&[
            insn!($m, Op::N, IB),
            insn!($m, Op::U, IB),
            Slot::Invalid,
            Slot::Invalid,
        ])
    };
}

const GROUP12: [Slot; 8] = [
    Slot::Invalid,
    Slot::Invalid,
    mmx_shift!("psrlw"),
    Slot::Invalid,
    mmx_shift!("psraw"),
    Slot::Invalid,
    mmx_shift!("psllw"),
    Slot::Invalid,
];

const GROUP13: [Slot; 8] = [
    Slot::Invalid,
    Slot::Invalid,
    mmx_shift!("psrld"),
    Slot::Invalid,
    mmx_shift!("psrad"),
    Slot::Invalid,
    mmx_shift!("pslld"),
    Slot::Invalid,
];

const GROUP14: [Slot; 8] = [
    Slot::Invalid,
    Slot::Invalid,
    mmx_shift!("psrlq"),
    sse66!("psrldq", Op::U, IB),
    Slot::Invalid,
    Slot::Invalid,
    mmx_shift!("psllq"),
    sse66!("pslldq", Op::U, IB),
];

const GROUP15_MEM: [Slot; 8] = [
    insn!("fxsave", M),
    insn!("fxrstor", M),
    insn!("ldmxcsr", MD),
    insn!("stmxcsr", MD),
    insn!("xsave", M),
    insn!("xrstor", M),
    insn!("xsaveopt", M),
    insn!("clflush", MB),
];

const GROUP15_REG: [Slot; 8] = [
    Slot::Prefix(&[Slot::Invalid, Slot::Invalid, insn!("rdfsbase", EY; ONLY64), Slot::Invalid]),
    Slot::Prefix(&[Slot::Invalid, Slot::Invalid, insn!("rdgsbase", EY; ONLY64), Slot::Invalid]),
    Slot::Prefix(&[Slot::Invalid, Slot::Invalid, insn!("wrfsbase", EY; ONLY64), Slot::Invalid]),
    Slot::Prefix(&[Slot::Invalid, Slot::Invalid, insn!("wrgsbase", EY; ONLY64), Slot::Invalid]),
    Slot::Invalid,
    insn!("lfence"),
    insn!("mfence"),
    insn!("sfence"),
];

const GROUP8: [Slot; 8] = [
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    insn!("bt", EV, IB),
    insn!("bts", EV, IB),
    insn!("btr", EV, IB),
    insn!("btc", EV, IB),
];

const GROUP9_MEM: [Slot; 8] = [
    Slot::Invalid,
    Slot::OpSize {
        table: &[
            insn!("cmpxchg8b", MQ),
            insn!("cmpxchg8b", MQ),
            insn!("cmpxchg16b", MDQ),
        ],
        def64: false,
    },
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Prefix(&[
        insn!("vmptrld", MQ; INTEL),
        insn!("vmclear", MQ; INTEL),
        insn!("vmxon", MQ; INTEL),
        Slot::Invalid,
    ]),
    Slot::Prefix(&[insn!("vmptrst", MQ; INTEL), Slot::Invalid, Slot::Invalid, Slot::Invalid]),
];

const GROUP9_REG: [Slot; 8] = [
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::RepSelect(&[insn!("rdrand", EV), Slot::Invalid, Slot::Invalid]),
    Slot::RepSelect(&[insn!("rdseed", EV), Slot::Invalid, Slot::Invalid]),
];

/// Opcodes following 0F. 0F 0F (3DNow!), 0F 38 and 0F 3A are escapes the
/// decoder handles before consulting this table.
pub(crate) static MAP_0F: [Slot; 256] = [
    // 00
    Slot::Group(&GROUP6),
    Slot::ModSplit {
        mem: &Slot::Group(&GROUP7_MEM),
        reg: &Slot::Group(&GROUP7_REG),
    },
    insn!("lar", GV, EW),
    insn!("lsl", GV, EW),
    Slot::Invalid,
    insn!("syscall"; AMD_LEGACY),
    insn!("clts"),
    insn!("sysret"; AMD_LEGACY),
    insn!("invd"),
    insn!("wbinvd"),
    Slot::Invalid,
    insn!("ud2"),
    Slot::Invalid,
    Slot::ModSplit {
        mem: &Slot::Group(&GROUP_PREFETCH),
        reg: &Slot::Invalid,
    },
    insn!("femms"; AMD),
    Slot::Invalid, // 3DNow!
    // 10
    Slot::Prefix(&[
        insn!("movups", Op::V, WX),
        insn!("movupd", Op::V, WX),
        insn!("movss", Op::V, WD),
        insn!("movsd", Op::V, WQ),
    ]),
    Slot::Prefix(&[
        insn!("movups", WX, Op::V),
        insn!("movupd", WX, Op::V),
        insn!("movss", WD, Op::V),
        insn!("movsd", WQ, Op::V),
    ]),
    Slot::Prefix(&[
        Slot::ModSplit {
            mem: &insn!("movlps", Op::V, MQ),
            reg: &insn!("movhlps", Op::V, Op::U),
        },
        insn!("movlpd", Op::V, MQ),
        insn!("movsldup", Op::V, WX),
        insn!("movddup", Op::V, WQ),
    ]),
    Slot::Prefix(&[
        insn!("movlps", MQ, Op::V),
        insn!("movlpd", MQ, Op::V),
        Slot::Invalid,
        Slot::Invalid,
    ]),
    Slot::Prefix(&[
        insn!("unpcklps", Op::V, WX),
        insn!("unpcklpd", Op::V, WX),
        Slot::Invalid,
        Slot::Invalid,
    ]),
    Slot::Prefix(&[
        insn!("unpckhps", Op::V, WX),
        insn!("unpckhpd", Op::V, WX),
        Slot::Invalid,
        Slot::Invalid,
    ]),
    Slot::Prefix(&[
        Slot::ModSplit {
            mem: &insn!("movhps", Op::V, MQ),
            reg: &insn!("movlhps", Op::V, Op::U),
        },
        insn!("movhpd", Op::V, MQ),
        insn!("movshdup", Op::V, WX),
        Slot::Invalid,
    ]),
    Slot::Prefix(&[
        insn!("movhps", MQ, Op::V),
        insn!("movhpd", MQ, Op::V),
        Slot::Invalid,
        Slot::Invalid,
    ]),
    Slot::ModSplit {
        mem: &Slot::Group(&GROUP16),
        reg: &insn!("nop", EV),
    },
    insn!("nop", EV),
    insn!("nop", EV),
    insn!("nop", EV),
    insn!("nop", EV),
    insn!("nop", EV),
    insn!("nop", EV),
    insn!("nop", EV),
    // 20
    insn!("mov", RLM, Op::C),
    insn!("mov", RLM, Op::D),
    insn!("mov", Op::C, RLM),
    insn!("mov", Op::D, RLM),
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Prefix(&[
        insn!("movaps", Op::V, WX),
        insn!("movapd", Op::V, WX),
        Slot::Invalid,
        Slot::Invalid,
    ]),
    Slot::Prefix(&[
        insn!("movaps", WX, Op::V),
        insn!("movapd", WX, Op::V),
        Slot::Invalid,
        Slot::Invalid,
    ]),
    Slot::Prefix(&[
        insn!("cvtpi2ps", Op::V, QQ),
        insn!("cvtpi2pd", Op::V, QQ),
        insn!("cvtsi2ss", Op::V, EY),
        insn!("cvtsi2sd", Op::V, EY),
    ]),
    Slot::Prefix(&[
        insn!("movntps", MDQ, Op::V),
        insn!("movntpd", MDQ, Op::V),
        Slot::Invalid,
        Slot::Invalid,
    ]),
    Slot::Prefix(&[
        insn!("cvttps2pi", Op::P, WQ),
        insn!("cvttpd2pi", Op::P, WX),
        insn!("cvttss2si", GY, WD),
        insn!("cvttsd2si", GY, WQ),
    ]),
    Slot::Prefix(&[
        insn!("cvtps2pi", Op::P, WQ),
        insn!("cvtpd2pi", Op::P, WX),
        insn!("cvtss2si", GY, WD),
        insn!("cvtsd2si", GY, WQ),
    ]),
    Slot::Prefix(&[
        insn!("ucomiss", Op::V, WD),
        insn!("ucomisd", Op::V, WQ),
        Slot::Invalid,
        Slot::Invalid,
    ]),
    Slot::Prefix(&[
        insn!("comiss", Op::V, WD),
        insn!("comisd", Op::V, WQ),
        Slot::Invalid,
        Slot::Invalid,
    ]),
    // 30
    insn!("wrmsr"),
    insn!("rdtsc"),
    insn!("rdmsr"),
    insn!("rdpmc"),
    insn!("sysenter"; INTEL_LONG),
    insn!("sysexit"; INTEL_LONG),
    Slot::Invalid,
    insn!("getsec"),
    Slot::Invalid, // 0F 38
    Slot::Invalid,
    Slot::Invalid, // 0F 3A
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    Slot::Invalid,
    // 40
    insn!("cmovo", GV, EV),
    insn!("cmovno", GV, EV),
    insn!("cmovb", GV, EV),
    insn!("cmovae", GV, EV),
    insn!("cmovz", GV, EV),
    insn!("cmovnz", GV, EV),
    insn!("cmovbe", GV, EV),
    insn!("cmova", GV, EV),
    insn!("cmovs", GV, EV),
    insn!("cmovns", GV, EV),
    insn!("cmovp", GV, EV),
    insn!("cmovnp", GV, EV),
    insn!("cmovl", GV, EV),
    insn!("cmovge", GV, EV),
    insn!("cmovle", GV, EV),
    insn!("cmovg", GV, EV),
    // 50
    Slot::Prefix(&[
        insn!("movmskps", GD, Op::U),
        insn!("movmskpd", GD, Op::U),
        Slot::Invalid,
        Slot::Invalid,
    ]),
    sse_arith!("sqrtps", "sqrtpd", "sqrtss", "sqrtsd"),
    Slot::Prefix(&[
        insn!("rsqrtps", Op::V, WX),
        Slot::Invalid,
        insn!("rsqrtss", Op::V, WD),
        Slot::Invalid,
    ]),
    Slot::Prefix(&[
        insn!("rcpps", Op::V, WX),
        Slot::Invalid,
        insn!("rcpss", Op::V, WD),
        Slot::Invalid,
    ]),
    Slot::Prefix(&[
        insn!("andps", Op::V, WX),
        insn!("andpd", Op::V, WX),
        Slot::Invalid,
        Slot::Invalid,
    ]),
    Slot::Prefix(&[
        insn!("andnps", Op::V, WX),
        insn!("andnpd", Op::V, WX),
        Slot::Invalid,
        Slot::Invalid,
    ]),
    Slot::Prefix(&[
        insn!("orps", Op::V, WX),
        insn!("orpd", Op::V, WX),
        Slot::Invalid,
        Slot::Invalid,
    ]),
    Slot::Prefix(&[
        insn!("xorps", Op::V, WX),
        insn!("xorpd", Op::V, WX),
        Slot::Invalid,
        Slot::Invalid,
    ]),
    sse_arith!("addps", "addpd", "addss", "addsd"),
    sse_arith!("mulps", "mulpd", "mulss", "mulsd"),
    Slot::Prefix(&[
        insn!("cvtps2pd", Op::V, WQ),
        insn!("cvtpd2ps", Op::V, WX),
        insn!("cvtss2sd", Op::V, WD),
        insn!("cvtsd2ss", Op::V, WQ),
    ]),
    Slot::Prefix(&[
        insn!("cvtdq2ps", Op::V, WX),
        insn!("cvtps2dq", Op::V, WX),
        insn!("cvttps2dq", Op::V, WX),
        Slot::Invalid,
    ]),
    sse_arith!("subps", "subpd", "subss", "subsd"),
    sse_arith!("minps", "minpd", "minss", "minsd"),
    sse_arith!("divps", "divpd", "divss", "divsd"),
    sse_arith!("maxps", "maxpd", "maxss", "maxsd"),
    // 60
    mmx_sse!("punpcklbw"),
    mmx_sse!("punpcklwd"),
    mmx_sse!("punpckldq"),
    mmx_sse!("packsswb"),
    mmx_sse!("pcmpgtb"),
    mmx_sse!("pcmpgtw"),
    mmx_sse!("pcmpgtd"),
    mmx_sse!("packuswb"),
    mmx_sse!("punpckhbw"),
    mmx_sse!("punpckhwd"),
    mmx_sse!("punpckhdq"),
    mmx_sse!("packssdw"),
    sse66!("punpcklqdq", Op::V, WX),
    sse66!("punpckhqdq", Op::V, WX),
    Slot::Prefix(&[
        Slot::OpSize {
            table: &[
                insn!("movd", Op::P, EY),
                insn!("movd", Op::P, EY),
                insn!("movq", Op::P, EY),
            ],
            def64: false,
        },
        Slot::OpSize {
            table: &[
                insn!("movd", Op::V, EY),
                insn!("movd", Op::V, EY),
                insn!("movq", Op::V, EY),
            ],
            def64: false,
        },
        Slot::Invalid,
        Slot::Invalid,
    ]),
    Slot::Prefix(&[
        insn!("movq", Op::P, QQ),
        insn!("movdqa", Op::V, WX),
        insn!("movdqu", Op::V, WX),
        Slot::Invalid,
    ]),
    // 70
    Slot::Prefix(&[
        insn!("pshufw", Op::P, QQ, IB),
        insn!("pshufd", Op::V, WX, IB),
        insn!("pshufhw", Op::V, WX, IB),
        insn!("pshuflw", Op::V, WX, IB),
    ]),
    Slot::ModSplit {
        mem: &Slot::Invalid,
        reg: &Slot::Group(&GROUP12),
    },
    Slot::ModSplit {
        mem: &Slot::Invalid,
        reg: &Slot::Group(&GROUP13),
    },
    Slot::ModSplit {
        mem: &Slot::Invalid,
        reg: &Slot::Group(&GROUP14),
    },
    mmx_sse!("pcmpeqb"),
    mmx_sse!("pcmpeqw"),
    mmx_sse!("pcmpeqd"),
    insn!("emms"),
    Slot::Prefix(&[insn!("vmread", EY, GY; INTEL | DEF64), Slot::Invalid, Slot::Invalid, Slot::Invalid]),
    Slot::Prefix(&[insn!("vmwrite", GY, EY; INTEL | DEF64), Slot::Invalid, Slot::Invalid, Slot::Invalid]),
    Slot::Invalid,
    Slot::Invalid,
    Slot::Prefix(&[
        Slot::Invalid,
        insn!("haddpd", Op::V, WX),
        Slot::Invalid,
        insn!("haddps", Op::V, WX),
    ]),
    Slot::Prefix(&[
        Slot::Invalid,
        insn!("hsubpd", Op::V, WX),
        Slot::Invalid,
        insn!("hsubps", Op::V, WX),
    ]),
    Slot::Prefix(&[
        Slot::OpSize {
            table: &[
                insn!("movd", EY, Op::P),
                insn!("movd", EY, Op::P),
                insn!("movq", EY, Op::P),
            ],
            def64: false,
        },
        Slot::OpSize {
            table: &[
                insn!("movd", EY, Op::V),
                insn!("movd", EY, Op::V),
                insn!("movq", EY, Op::V),
            ],
            def64: false,
        },
        insn!("movq", Op::V, WQ),
        Slot::Invalid,
    ]),
    Slot::Prefix(&[
        insn!("movq", QQ, Op::P),
        insn!("movdqa", WX, Op::V),
        insn!("movdqu", WX, Op::V),
        Slot::Invalid,
    ]),
    // 80
    insn!("jo", JZ; BRANCH),
    insn!("jno", JZ; BRANCH),
    insn!("jb", JZ; BRANCH),
    insn!("jae", JZ; BRANCH),
    insn!("jz", JZ; BRANCH),
    insn!("jnz", JZ; BRANCH),
    insn!("jbe", JZ; BRANCH),
    insn!("ja", JZ; BRANCH),
    insn!("js", JZ; BRANCH),
    insn!("jns", JZ; BRANCH),
    insn!("jp", JZ; BRANCH),
    insn!("jnp", JZ; BRANCH),
    insn!("jl", JZ; BRANCH),
    insn!("jge", JZ; BRANCH),
    insn!("jle", JZ; BRANCH),
    insn!("jg", JZ; BRANCH),
    // 90
    insn!("seto", EB),
    insn!("setno", EB),
    insn!("setb", EB),
    insn!("setae", EB),
    insn!("setz", EB),
    insn!("setnz", EB),
    insn!("setbe", EB),
    insn!("seta", EB),
    insn!("sets", EB),
    insn!("setns", EB),
    insn!("setp", EB),
    insn!("setnp", EB),
    insn!("setl", EB),
    insn!("setge", EB),
    insn!("setle", EB),
    insn!("setg", EB),
    // A0
    insn!("push", Op::Sreg(4); DEF64),
    insn!("pop", Op::Sreg(4); DEF64),
    insn!("cpuid"),
    insn!("bt", EV, GV),
    insn!("shld", EV, GV, IB),
    insn!("shld", EV, GV, CL; COUNT_CL),
    Slot::Invalid,
    Slot::Invalid,
    insn!("push", Op::Sreg(5); DEF64),
    insn!("pop", Op::Sreg(5); DEF64),
    insn!("rsm"),
    insn!("bts", EV, GV),
    insn!("shrd", EV, GV, IB),
    insn!("shrd", EV, GV, CL; COUNT_CL),
    Slot::ModSplit {
        mem: &Slot::Group(&GROUP15_MEM),
        reg: &Slot::Group(&GROUP15_REG),
    },
    insn!("imul", GV, EV),
    // B0
    insn!("cmpxchg", EB, GB),
    insn!("cmpxchg", EV, GV),
    insn!("lss", GZ, MP),
    insn!("btr", EV, GV),
    insn!("lfs", GZ, MP),
    insn!("lgs", GZ, MP),
    insn!("movzx", GV, EB),
    insn!("movzx", GV, EW),
    Slot::RepSelect(&[Slot::Invalid, insn!("popcnt", GV, EV), Slot::Invalid]),
    insn!("ud1", GV, EV),
    Slot::Group(&GROUP8),
    insn!("btc", EV, GV),
    Slot::RepSelect(&[insn!("bsf", GV, EV), insn!("tzcnt", GV, EV), insn!("bsf", GV, EV)]),
    Slot::RepSelect(&[insn!("bsr", GV, EV), insn!("lzcnt", GV, EV), insn!("bsr", GV, EV)]),
    insn!("movsx", GV, EB),
    insn!("movsx", GV, EW),
    // C0
    insn!("xadd", EB, GB),
    insn!("xadd", EV, GV),
    Slot::Prefix(&[
        insn!("cmpps", Op::V, WX, IB),
        insn!("cmppd", Op::V, WX, IB),
        insn!("cmpss", Op::V, WD, IB),
        insn!("cmpsd", Op::V, WQ, IB),
    ]),
    Slot::Prefix(&[insn!("movnti", MY, GY), Slot::Invalid, Slot::Invalid, Slot::Invalid]),
    Slot::Prefix(&[
        insn!("pinsrw", Op::P, ED, IB),
        insn!("pinsrw", Op::V, ED, IB),
        Slot::Invalid,
        Slot::Invalid,
    ]),
    Slot::Prefix(&[
        insn!("pextrw", GD, Op::N, IB),
        insn!("pextrw", GD, Op::U, IB),
        Slot::Invalid,
        Slot::Invalid,
    ]),
    Slot::Prefix(&[
        insn!("shufps", Op::V, WX, IB),
        insn!("shufpd", Op::V, WX, IB),
        Slot::Invalid,
        Slot::Invalid,
    ]),
    Slot::ModSplit {
        mem: &Slot::Group(&GROUP9_MEM),
        reg: &Slot::Group(&GROUP9_REG),
    },
    insn!("bswap", ZY),
    insn!("bswap", ZY),
    insn!("bswap", ZY),
    insn!("bswap", ZY),
    insn!("bswap", ZY),
    insn!("bswap", ZY),
    insn!("bswap", ZY),
    insn!("bswap", ZY),
    // D0
    Slot::Prefix(&[
        Slot::Invalid,
        insn!("addsubpd", Op::V, WX),
        Slot::Invalid,
        insn!("addsubps", Op::V, WX),
    ]),
    mmx_sse!("psrlw"),
    mmx_sse!("psrld"),
    mmx_sse!("psrlq"),
    mmx_sse!("paddq"),
    mmx_sse!("pmullw"),
    Slot::Prefix(&[
        Slot::Invalid,
        insn!("movq", WQ, Op::V),
        insn!("movq2dq", Op::V, Op::N),
        insn!("movdq2q", Op::P, Op::U),
    ]),
    Slot::Prefix(&[
        insn!("pmovmskb", GD, Op::N),
        insn!("pmovmskb", GD, Op::U),
        Slot::Invalid,
        Slot::Invalid,
    ]),
    mmx_sse!("psubusb"),
    mmx_sse!("psubusw"),
    mmx_sse!("pminub"),
    mmx_sse!("pand"),
    mmx_sse!("paddusb"),
    mmx_sse!("paddusw"),
    mmx_sse!("pmaxub"),
    mmx_sse!("pandn"),
    // E0
    mmx_sse!("pavgb"),
    mmx_sse!("psraw"),
    mmx_sse!("psrad"),
    mmx_sse!("pavgw"),
    mmx_sse!("pmulhuw"),
    mmx_sse!("pmulhw"),
    Slot::Prefix(&[
        Slot::Invalid,
        insn!("cvttpd2dq", Op::V, WX),
        insn!("cvtdq2pd", Op::V, WQ),
        insn!("cvtpd2dq", Op::V, WX),
    ]),
    Slot::Prefix(&[
        insn!("movntq", MQ, Op::P),
        insn!("movntdq", MDQ, Op::V),
        Slot::Invalid,
        Slot::Invalid,
    ]),
    mmx_sse!("psubsb"),
    mmx_sse!("psubsw"),
    mmx_sse!("pminsw"),
    mmx_sse!("por"),
    mmx_sse!("paddsb"),
    mmx_sse!("paddsw"),
    mmx_sse!("pmaxsw"),
    mmx_sse!("pxor"),
    // F0
    Slot::Prefix(&[Slot::Invalid, Slot::Invalid, Slot::Invalid, insn!("lddqu", Op::V, MDQ)]),
    mmx_sse!("psllw"),
    mmx_sse!("pslld"),
    mmx_sse!("psllq"),
    mmx_sse!("pmuludq"),
    mmx_sse!("pmaddwd"),
    mmx_sse!("psadbw"),
    Slot::Prefix(&[
        insn!("maskmovq", Op::P, Op::N),
        insn!("maskmovdqu", Op::V, Op::U),
        Slot::Invalid,
        Slot::Invalid,
    ]),
    mmx_sse!("psubb"),
    mmx_sse!("psubw"),
    mmx_sse!("psubd"),
    mmx_sse!("psubq"),
    mmx_sse!("paddb"),
    mmx_sse!("paddw"),
    mmx_sse!("paddd"),
    Slot::Invalid,
];

const WW: Op = Op::W(Sz::W);

/// 0F 38 xx: SSSE3, SSE4.1/4.2, AES-NI and movbe/crc32.
pub(crate) fn map_0f38(op: u8) -> &'static Slot {
    match op {
        0x00 => &mmx_sse!("pshufb"),
        0x01 => &mmx_sse!("phaddw"),
        0x02 => &mmx_sse!("phaddd"),
        0x03 => &mmx_sse!("phaddsw"),
        0x04 => &mmx_sse!("pmaddubsw"),
        0x05 => &mmx_sse!("phsubw"),
        0x06 => &mmx_sse!("phsubd"),
        0x07 => &mmx_sse!("phsubsw"),
        0x08 => &mmx_sse!("psignb"),
        0x09 => &mmx_sse!("psignw"),
        0x0a => &mmx_sse!("psignd"),
        0x0b => &mmx_sse!("pmulhrsw"),
        0x10 => &sse66!("pblendvb", Op::V, WX),
        0x14 => &sse66!("blendvps", Op::V, WX),
        0x15 => &sse66!("blendvpd", Op::V, WX),
        0x17 => &sse66!("ptest", Op::V, WX),
        0x1c => &mmx_sse!("pabsb"),
        0x1d => &mmx_sse!("pabsw"),
        0x1e => &mmx_sse!("pabsd"),
        0x20 => &sse66!("pmovsxbw", Op::V, WQ),
        0x21 => &sse66!("pmovsxbd", Op::V, WD),
        0x22 => &sse66!("pmovsxbq", Op::V, WW),
        0x23 => &sse66!("pmovsxwd", Op::V, WQ),
        0x24 => &sse66!("pmovsxwq", Op::V, WD),
        0x25 => &sse66!("pmovsxdq", Op::V, WQ),
        0x28 => &sse66!("pmuldq", Op::V, WX),
        0x29 => &sse66!("pcmpeqq", Op::V, WX),
        0x2a => &sse66!("movntdqa", Op::V, MDQ),
        0x2b => &sse66!("packusdw", Op::V, WX),
        0x30 => &sse66!("pmovzxbw", Op::V, WQ),
        0x31 => &sse66!("pmovzxbd", Op::V, WD),
        0x32 => &sse66!("pmovzxbq", Op::V, WW),
        0x33 => &sse66!("pmovzxwd", Op::V, WQ),
        0x34 => &sse66!("pmovzxwq", Op::V, WD),
        0x35 => &sse66!("pmovzxdq", Op::V, WQ),
        0x37 => &sse66!("pcmpgtq", Op::V, WX),
        0x38 => &sse66!("pminsb", Op::V, WX),
        0x39 => &sse66!("pminsd", Op::V, WX),
        0x3a => &sse66!("pminuw", Op::V, WX),
        0x3b => &sse66!("pminud", Op::V, WX),
        0x3c => &sse66!("pmaxsb", Op::V, WX),
        0x3d => &sse66!("pmaxsd", Op::V, WX),
        0x3e => &sse66!("pmaxuw", Op::V, WX),
        0x3f => &sse66!("pmaxud", Op::V, WX),
        0x40 => &sse66!("pmulld", Op::V, WX),
        0x41 => &sse66!("phminposuw", Op::V, WX),
        0xdb => &sse66!("aesimc", Op::V, WX),
        0xdc => &sse66!("aesenc", Op::V, WX),
        0xdd => &sse66!("aesenclast", Op::V, WX),
        0xde => &sse66!("aesdec", Op::V, WX),
        0xdf => &sse66!("aesdeclast", Op::V, WX),
        0xf0 => &Slot::RepSelect(&[
            insn!("movbe", GV, MV),
            Slot::Invalid,
            insn!("crc32", GY, EB),
        ]),
        0xf1 => &Slot::RepSelect(&[
            insn!("movbe", MV, GV),
            Slot::Invalid,
            insn!("crc32", GY, EV),
        ]),
        _ => &Slot::Invalid,
    }
}

/// 0F 3A xx: instructions carrying a trailing imm8.
pub(crate) fn map_0f3a(op: u8) -> &'static Slot {
    match op {
        0x08 => &sse66!("roundps", Op::V, WX, IB),
        0x09 => &sse66!("roundpd", Op::V, WX, IB),
        0x0a => &sse66!("roundss", Op::V, WD, IB),
        0x0b => &sse66!("roundsd", Op::V, WQ, IB),
        0x0c => &sse66!("blendps", Op::V, WX, IB),
        0x0d => &sse66!("blendpd", Op::V, WX, IB),
        0x0e => &sse66!("pblendw", Op::V, WX, IB),
        0x0f => &Slot::Prefix(&[
            insn!("palignr", Op::P, QQ, IB),
            insn!("palignr", Op::V, WX, IB),
            Slot::Invalid,
            Slot::Invalid,
        ]),
        0x14 => &sse66!("pextrb", ED, Op::V, IB),
        0x15 => &sse66!("pextrw", ED, Op::V, IB),
        0x16 => &Slot::Prefix(&[
            Slot::Invalid,
            Slot::OpSize {
                table: &[
                    insn!("pextrd", EY, Op::V, IB),
                    insn!("pextrd", EY, Op::V, IB),
                    insn!("pextrq", EY, Op::V, IB),
                ],
                def64: false,
            },
            Slot::Invalid,
            Slot::Invalid,
        ]),
        0x17 => &sse66!("extractps", ED, Op::V, IB),
        0x20 => &sse66!("pinsrb", Op::V, ED, IB),
        0x21 => &sse66!("insertps", Op::V, WD, IB),
        0x22 => &Slot::Prefix(&[
            Slot::Invalid,
            Slot::OpSize {
                table: &[
                    insn!("pinsrd", Op::V, EY, IB),
                    insn!("pinsrd", Op::V, EY, IB),
                    insn!("pinsrq", Op::V, EY, IB),
                ],
                def64: false,
            },
            Slot::Invalid,
            Slot::Invalid,
        ]),
        0x40 => &sse66!("dpps", Op::V, WX, IB),
        0x41 => &sse66!("dppd", Op::V, WX, IB),
        0x42 => &sse66!("mpsadbw", Op::V, WX, IB),
        0x44 => &sse66!("pclmulqdq", Op::V, WX, IB),
        0x60 => &sse66!("pcmpestrm", Op::V, WX, IB),
        0x61 => &sse66!("pcmpestri", Op::V, WX, IB),
        0x62 => &sse66!("pcmpistrm", Op::V, WX, IB),
        0x63 => &sse66!("pcmpistri", Op::V, WX, IB),
        0xdf => &sse66!("aeskeygenassist", Op::V, WX, IB),
        _ => &Slot::Invalid,
    }
}

/// 3DNow! mnemonic selected by the trailing suffix byte of 0F 0F.
pub(crate) fn amd3dnow(suffix: u8) -> Option<&'static str> {
    let m = match suffix {
        0x0c => "pi2fw",
        0x0d => "pi2fd",
        0x1c => "pf2iw",
        0x1d => "pf2id",
        0x8a => "pfnacc",
        0x8e => "pfpnacc",
        0x90 => "pfcmpge",
        0x94 => "pfmin",
        0x96 => "pfrcp",
        0x97 => "pfrsqrt",
        0x9a => "pfsub",
        0x9e => "pfadd",
        0xa0 => "pfcmpgt",
        0xa4 => "pfmax",
        0xa6 => "pfrcpit1",
        0xa7 => "pfrsqit1",
        0xaa => "pfsubr",
        0xae => "pfacc",
        0xb0 => "pfcmpeq",
        0xb4 => "pfmul",
        0xb6 => "pfrcpit2",
        0xb7 => "pmulhrw",
        0xbb => "pswapd",
        0xbf => "pavgusb",
        _ => return None,
    };
    Some(m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_byte_maps_are_sparse() {
        assert!(matches!(map_0f38(0x00), Slot::Prefix(_)));
        assert!(matches!(map_0f38(0x50), Slot::Invalid));
        assert!(matches!(map_0f3a(0x0f), Slot::Prefix(_)));
        assert!(matches!(map_0f3a(0xff), Slot::Invalid));
    }

    #[test]
    fn test_3dnow_suffixes() {
        assert_eq!(amd3dnow(0x9e), Some("pfadd"));
        assert_eq!(amd3dnow(0xbf), Some("pavgusb"));
        assert_eq!(amd3dnow(0x00), None);
    }
}
