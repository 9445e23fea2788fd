use std::fmt::Write;

use super::{prefix, signed_hex};
use crate::decoder::{Insn, MemOperand, Operand};

pub(super) fn render(insn: &Insn) -> String {
    let mut out = String::new();
    prefix(&mut out, insn);
    out.push_str(insn.mnemonic);
    for (i, op) in insn.operands.iter().enumerate() {
        out.push_str(if i == 0 { " " } else { ", " });
        operand(&mut out, insn, op);
    }
    out
}

fn operand(out: &mut String, insn: &Insn, op: &Operand) {
    match op {
        Operand::Reg(reg) => out.push_str(reg.name()),
        Operand::Mem(mem) => memory(out, insn, mem),
        Operand::Imm(imm) => {
            let _ = write!(out, "{:#x}", imm.masked());
        }
        Operand::Branch { target, .. } => {
            let _ = write!(out, "{:#x}", target);
        }
        Operand::Far { selector, offset } => {
            let _ = write!(out, "{:#x}:{:#x}", selector, offset);
        }
        Operand::Const(c) => {
            let _ = write!(out, "{}", c);
        }
    }
}

fn size_keyword(bits: u16) -> Option<&'static str> {
    match bits {
        8 => Some("byte"),
        16 => Some("word"),
        32 => Some("dword"),
        48 => Some("fword"),
        64 => Some("qword"),
        80 => Some("tword"),
        128 => Some("oword"),
        _ => None,
    }
}

fn memory(out: &mut String, insn: &Insn, mem: &MemOperand) {
    if insn.is_far() {
        out.push_str("far ");
    } else {
        // the width is implied when a register operand of the same size is present
        if !insn.register_implies_width(mem.size) {
            if let Some(kw) = size_keyword(mem.size) {
                out.push_str(kw);
                out.push(' ');
            }
        }
    }

    out.push('[');
    if let Some(seg) = mem.segment {
        let _ = write!(out, "{}:", seg);
    }
    let mut regs = false;
    if let Some(base) = mem.base {
        out.push_str(base.name());
        regs = true;
    }
    if let Some(index) = mem.index {
        if regs {
            out.push('+');
        }
        out.push_str(index.name());
        if mem.scale > 1 {
            let _ = write!(out, "*{}", mem.scale);
        }
        regs = true;
    }
    if mem.disp_size > 0 {
        if regs {
            signed_hex(out, mem.disp, true);
        } else {
            let _ = write!(out, "{:#x}", mem.absolute());
        }
    }
    out.push(']');
}
