//! Textual rendering of decoded instructions.
//!
//! Two dialects are supported: Intel (`mov dword [ebp-0x4], 0x1`) and AT&T
//! (`movl $0x1,-0x4(%ebp)`). Undecodable bytes render as `invalid` in both.

mod att;
mod intel;

use std::fmt::Write;

use crate::decoder::{Insn, INVALID_MNEMONIC};
use crate::Syntax;

/// Render `insn` in the given dialect.
pub fn render(insn: &Insn, syntax: Syntax) -> String {
    if insn.is_invalid() {
        return INVALID_MNEMONIC.to_string();
    }
    match syntax {
        Syntax::Intel => intel::render(insn),
        Syntax::Att => att::render(insn),
    }
}

/// Lowercase hex of `bytes`, two digits per byte, no separators.
pub fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{:02x}", b);
    }
    out
}

/// Prefixes printed ahead of the mnemonic in both dialects.
fn prefix(out: &mut String, insn: &Insn) {
    if insn.prefixes.lock {
        out.push_str("lock ");
    }
    if let Some(rep) = insn.repeat_prefix() {
        out.push_str(rep);
        out.push(' ');
    }
}

/// Signed displacement following a register, `+0x8` / `-0x8`.
fn signed_hex(out: &mut String, value: i64, plus: bool) {
    if value < 0 {
        let _ = write!(out, "-{:#x}", value.unsigned_abs());
    } else if plus {
        let _ = write!(out, "+{:#x}", value);
    } else {
        let _ = write!(out, "{:#x}", value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{Decoder, X86Decoder};
    use crate::{DecoderConfig, Input, Mode, Vendor};
    use rstest::rstest;

    fn decode(mode: Mode, bytes: &[u8]) -> Insn {
        let dec = X86Decoder::new(DecoderConfig {
            mode,
            vendor: Vendor::Intel,
            ..Default::default()
        });
        dec.decode(&mut Input::buffer(bytes.to_vec())).unwrap()
    }

    #[test]
    fn test_hex() {
        assert_eq!(hex(&[0x0f, 0x1f, 0xab]), "0f1fab");
        assert_eq!(hex(&[]), "");
    }

    #[test]
    fn test_invalid_renders_the_same_in_both_dialects() {
        let insn = decode(Mode::Bits64, &[0x06]);
        assert!(insn.is_invalid());
        assert_eq!(render(&insn, Syntax::Att), "invalid");
        assert_eq!(render(&insn, Syntax::Intel), "invalid");
    }

    #[rstest]
    #[case(Mode::Bits32, &[0x55], "push ebp", "push %ebp")]
    #[case(Mode::Bits32, &[0x89, 0xe5], "mov ebp, esp", "mov %esp,%ebp")]
    #[case(Mode::Bits32, &[0xc7, 0x45, 0xfc, 0x01, 0x00, 0x00, 0x00], "mov dword [ebp-0x4], 0x1", "movl $0x1,-0x4(%ebp)")]
    #[case(Mode::Bits32, &[0x8d, 0x04, 0x8d, 0x00, 0x00, 0x00, 0x00], "lea eax, [ecx*4+0x0]", "lea 0x0(,%ecx,4),%eax")]
    #[case(Mode::Bits64, &[0x48, 0x8b, 0x05, 0x10, 0x00, 0x00, 0x00], "mov rax, [rip+0x10]", "mov 0x10(%rip),%rax")]
    #[case(Mode::Bits32, &[0x8b, 0x44, 0x8b, 0x08], "mov eax, [ebx+ecx*4+0x8]", "mov 0x8(%ebx,%ecx,4),%eax")]
    #[case(Mode::Bits32, &[0x0f, 0xb6, 0x01], "movzx eax, byte [ecx]", "movzbl (%ecx),%eax")]
    #[case(Mode::Bits64, &[0x48, 0x0f, 0xbf, 0xc1], "movsx rax, cx", "movswq %cx,%rax")]
    #[case(Mode::Bits64, &[0x48, 0x63, 0xc1], "movsxd rax, ecx", "movslq %ecx,%rax")]
    #[case(Mode::Bits32, &[0xff, 0xd0], "call eax", "call *%eax")]
    #[case(Mode::Bits32, &[0xff, 0x20], "jmp dword [eax]", "jmp *(%eax)")]
    #[case(Mode::Bits32, &[0xff, 0x18], "call far [eax]", "lcall *(%eax)")]
    #[case(Mode::Bits32, &[0xea, 0x00, 0x10, 0x00, 0x00, 0x10, 0x00], "jmp 0x10:0x1000", "ljmp $0x10,$0x1000")]
    #[case(Mode::Bits32, &[0xcb], "retf", "lret")]
    #[case(Mode::Bits32, &[0xff, 0x30], "push dword [eax]", "pushl (%eax)")]
    #[case(Mode::Bits32, &[0xfe, 0x00], "inc byte [eax]", "incb (%eax)")]
    #[case(Mode::Bits32, &[0x98], "cwde", "cwtl")]
    #[case(Mode::Bits32, &[0x99], "cdq", "cltd")]
    #[case(Mode::Bits32, &[0xa5], "movsd", "movsl")]
    #[case(Mode::Bits32, &[0x9c], "pushfd", "pushfl")]
    #[case(Mode::Bits32, &[0xf3, 0xab], "rep stosd", "rep stosl")]
    #[case(Mode::Bits32, &[0xf2, 0xae], "repne scasb", "repne scasb")]
    #[case(Mode::Bits32, &[0xd1, 0xe0], "shl eax, 1", "shl $1,%eax")]
    #[case(Mode::Bits32, &[0x64, 0x8b, 0x03], "mov eax, [fs:ebx]", "mov %fs:(%ebx),%eax")]
    #[case(Mode::Bits32, &[0xa1, 0x00, 0x20, 0x00, 0x00], "mov eax, [0x2000]", "mov 0x2000,%eax")]
    #[case(Mode::Bits32, &[0x66, 0x0f, 0xef, 0xc0], "pxor xmm0, xmm0", "pxor %xmm0,%xmm0")]
    #[case(Mode::Bits32, &[0xf2, 0x0f, 0x10, 0x45, 0x08], "movsd xmm0, qword [ebp+0x8]", "movsd 0x8(%ebp),%xmm0")]
    #[case(Mode::Bits32, &[0xcd, 0x80], "int 0x80", "int $0x80")]
    #[case(Mode::Bits32, &[0x6a, 0xff], "push 0xffffffff", "push $0xffffffff")]
    #[case(Mode::Bits32, &[0xd2, 0x20], "shl byte [eax], cl", "shlb %cl,(%eax)")]
    #[case(Mode::Bits32, &[0xd3, 0x20], "shl dword [eax], cl", "shll %cl,(%eax)")]
    #[case(Mode::Bits32, &[0x66, 0xd3, 0x20], "shl word [eax], cl", "shlw %cl,(%eax)")]
    #[case(Mode::Bits32, &[0x0f, 0xa5, 0x00], "shld [eax], eax, cl", "shld %cl,%eax,(%eax)")]
    #[case(Mode::Bits32, &[0xdf, 0x00], "fild word [eax]", "filds (%eax)")]
    #[case(Mode::Bits32, &[0xdb, 0x00], "fild dword [eax]", "fildl (%eax)")]
    #[case(Mode::Bits32, &[0xdf, 0x28], "fild qword [eax]", "fildll (%eax)")]
    #[case(Mode::Bits32, &[0xd9, 0x00], "fld dword [eax]", "flds (%eax)")]
    #[case(Mode::Bits32, &[0xdd, 0x00], "fld qword [eax]", "fldl (%eax)")]
    #[case(Mode::Bits32, &[0xdb, 0x28], "fld tword [eax]", "fldt (%eax)")]
    #[case(Mode::Bits32, &[0xd8, 0x00], "fadd dword [eax]", "fadds (%eax)")]
    #[case(Mode::Bits32, &[0xdc, 0x00], "fadd qword [eax]", "faddl (%eax)")]
    #[case(Mode::Bits32, &[0x0f, 0x00, 0x00], "sldt word [eax]", "sldtw (%eax)")]
    #[case(Mode::Bits32, &[0x0f, 0x00, 0xc0], "sldt eax", "sldt %eax")]
    #[case(Mode::Bits32, &[0xc8, 0x10, 0x00, 0x01], "enter 0x10, 0x1", "enter $0x10,$0x1")]
    fn test_dialects(
        #[case] mode: Mode,
        #[case] bytes: &[u8],
        #[case] intel: &str,
        #[case] att: &str,
    ) {
        let insn = decode(mode, bytes);
        assert_eq!(render(&insn, Syntax::Intel), intel);
        assert_eq!(render(&insn, Syntax::Att), att);
    }
}
