use std::fmt::Write;

use super::{prefix, signed_hex};
use crate::decoder::{Insn, MemOperand, Operand, Register};

pub(super) fn render(insn: &Insn) -> String {
    let mut out = String::new();
    prefix(&mut out, insn);
    out.push_str(&mnemonic(insn));
    // enter keeps its source order in GAS
    let operands: Vec<&Operand> = if insn.mnemonic == "enter" {
        insn.operands.iter().collect()
    } else {
        insn.operands.iter().rev().collect()
    };
    for (i, op) in operands.into_iter().enumerate() {
        out.push_str(if i == 0 { " " } else { "," });
        operand(&mut out, insn, op);
    }
    out
}

fn suffix(bits: u16) -> &'static str {
    match bits {
        8 => "b",
        16 => "w",
        32 => "l",
        64 => "q",
        _ => "",
    }
}

fn x87_suffix(insn: &Insn, bits: u16) -> &'static str {
    match (insn.is_x87_integer(), bits) {
        (true, 16) | (false, 32) => "s",
        (true, 32) | (false, 64) => "l",
        (true, 64) => "ll",
        (false, 80) => "t",
        _ => "",
    }
}

/// GAS names for operand-less forms whose Intel name encodes the width.
fn operandless(mnemonic: &str) -> Option<&'static str> {
    let name = match mnemonic {
        "cbw" => "cbtw",
        "cwde" => "cwtl",
        "cdqe" => "cltq",
        "cwd" => "cwtd",
        "cdq" => "cltd",
        "cqo" => "cqto",
        "movsd" => "movsl",
        "cmpsd" => "cmpsl",
        "stosd" => "stosl",
        "lodsd" => "lodsl",
        "scasd" => "scasl",
        "insd" => "insl",
        "outsd" => "outsl",
        "pushfd" => "pushfl",
        "popfd" => "popfl",
        "iretd" => "iretl",
        "pushad" => "pushal",
        "popad" => "popal",
        _ => return None,
    };
    Some(name)
}

fn mnemonic(insn: &Insn) -> String {
    let m = insn.mnemonic;
    if insn.is_far() {
        match m {
            "call" => return "lcall".to_string(),
            "jmp" => return "ljmp".to_string(),
            "retf" => return "lret".to_string(),
            _ => {}
        }
    }
    if insn.operands.is_empty() {
        return operandless(m).unwrap_or(m).to_string();
    }

    let dst = insn.operands[0].size();
    match m {
        "movzx" | "movsx" => {
            let src = insn.operands.get(1).map_or(0, |op| op.size());
            return format!("{}{}{}", &m[..4], suffix(src), suffix(dst));
        }
        "movsxd" if dst == 64 => return "movslq".to_string(),
        _ => {}
    }

    let Some(mem) = insn.memory_operand() else {
        return m.to_string();
    };
    if insn.is_x87_float() || insn.is_x87_integer() {
        return format!("{}{}", m, x87_suffix(insn, mem.size));
    }
    let vector = insn
        .operands
        .iter()
        .any(|op| matches!(op, Operand::Reg(Register::Mmx(_) | Register::Xmm(_))));
    if vector && !m.starts_with("cvtsi2") {
        return m.to_string();
    }
    if insn.has_sized_memory() && !insn.register_implies_width(mem.size) && !insn.is_transfer() {
        return format!("{}{}", m, suffix(mem.size));
    }
    m.to_string()
}

fn operand(out: &mut String, insn: &Insn, op: &Operand) {
    if insn.is_transfer() && matches!(op, Operand::Reg(_) | Operand::Mem(_)) {
        out.push('*');
    }
    match op {
        Operand::Reg(reg) => {
            let _ = write!(out, "%{}", reg);
        }
        Operand::Mem(mem) => memory(out, mem),
        Operand::Imm(imm) => {
            let _ = write!(out, "${:#x}", imm.masked());
        }
        Operand::Branch { target, .. } => {
            let _ = write!(out, "{:#x}", target);
        }
        Operand::Far { selector, offset } => {
            let _ = write!(out, "${:#x},${:#x}", selector, offset);
        }
        Operand::Const(c) => {
            let _ = write!(out, "${}", c);
        }
    }
}

fn memory(out: &mut String, mem: &MemOperand) {
    if let Some(seg) = mem.segment {
        let _ = write!(out, "%{}:", seg);
    }
    let regs = mem.base.is_some() || mem.index.is_some();
    if mem.disp_size > 0 {
        if regs {
            signed_hex(out, mem.disp, false);
        } else {
            let _ = write!(out, "{:#x}", mem.absolute());
        }
    }
    if regs {
        out.push('(');
        if let Some(base) = mem.base {
            let _ = write!(out, "%{}", base);
        }
        if let Some(index) = mem.index {
            let _ = write!(out, ",%{},{}", index, mem.scale);
        }
        out.push(')');
    }
}
