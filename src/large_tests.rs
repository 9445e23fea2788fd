#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};
    use std::time::Instant;

    use capstone::prelude::*;
    use rstest::rstest;

    use crate::{
        format::OutputFormat,
        parser::{BinaryParser, GoblinParser},
        Disassembler, DisassemblyError, Line, Mode, Syntax, Vendor, MAX_INSTRUCTION_SIZE,
    };

    // Hand-assembled function prologues, bodies and epilogues for each mode
    fn sample_code(mode: Mode) -> Vec<u8> {
        match mode {
            Mode::Bits16 => vec![
                0x55, 0x89, 0xe5, 0x8b, 0x46, 0x04, 0x03, 0x46, 0x06, 0xb4, 0x09, 0xcd, 0x21,
                0x66, 0xb8, 0x78, 0x56, 0x34, 0x12, 0xe8, 0x00, 0x00, 0x5d, 0xc3,
            ],
            Mode::Bits32 => vec![
                0x55, 0x89, 0xe5, 0x83, 0xec, 0x10, 0xc7, 0x45, 0xfc, 0x01, 0x00, 0x00, 0x00,
                0x8b, 0x44, 0x8b, 0x08, 0x0f, 0xb6, 0x01, 0x64, 0xa1, 0x30, 0x00, 0x00, 0x00,
                0xf3, 0xab, 0xd9, 0xe8, 0x66, 0x0f, 0xef, 0xc0, 0x74, 0x02, 0xff, 0xd0, 0xc9,
                0xc3,
            ],
            Mode::Bits64 => vec![
                0x55, 0x48, 0x89, 0xe5, 0x48, 0x83, 0xec, 0x10, 0x48, 0x8b, 0x05, 0x10, 0x00,
                0x00, 0x00, 0x42, 0x8b, 0x04, 0xa0, 0x48, 0xb8, 0x88, 0x77, 0x66, 0x55, 0x44,
                0x33, 0x22, 0x11, 0x0f, 0x1f, 0x44, 0x00, 0x00, 0xe8, 0x00, 0x00, 0x00, 0x00,
                0x41, 0x57, 0x0f, 0x05, 0x48, 0x63, 0xc1, 0xc9, 0xc3,
            ],
        }
    }

    // Deterministic pseudo-random bytes (xorshift64)
    fn noise(len: usize, mut seed: u64) -> Vec<u8> {
        (0..len)
            .map(|_| {
                seed ^= seed << 13;
                seed ^= seed >> 7;
                seed ^= seed << 17;
                (seed >> 24) as u8
            })
            .collect()
    }

    fn disassembler(mode: Mode, vendor: Vendor, syntax: Syntax) -> Disassembler {
        let mut dis = Disassembler::new();
        dis.set_mode(mode.bits()).unwrap();
        dis.set_vendor(vendor);
        dis.set_syntax(syntax);
        dis
    }

    fn drain(dis: &mut Disassembler) -> Vec<Line> {
        dis.iter().collect()
    }

    #[rstest]
    #[case(16)]
    #[case(32)]
    #[case(64)]
    fn test_valid_modes_round_trip(#[case] bits: u32) {
        let mut dis = Disassembler::new();
        dis.set_mode(bits).unwrap();
        assert_eq!(dis.mode().bits(), bits);

        for bad in [0, 8, 15, 17, 48, 65, 128, u32::MAX] {
            let err = dis.set_mode(bad).unwrap_err();
            assert!(matches!(err, DisassemblyError::InvalidConfiguration(_)));
            assert_eq!(dis.mode().bits(), bits, "mode changed after rejecting {}", bad);
        }
    }

    #[rstest]
    fn test_lengths_cover_input(
        #[values(Mode::Bits16, Mode::Bits32, Mode::Bits64)] mode: Mode,
        #[values(Vendor::Intel, Vendor::Amd)] vendor: Vendor,
        #[values(Syntax::Att, Syntax::Intel)] syntax: Syntax,
    ) {
        let mut data = sample_code(mode);
        data.extend(noise(4096, 0x9e37_79b9_7f4a_7c15 ^ u64::from(mode.bits())));

        let mut dis = disassembler(mode, vendor, syntax);
        dis.attach_buffer(data.clone());

        let start = Instant::now();
        let mut total = 0;
        let mut count = 0;
        loop {
            let n = dis.decode();
            if n == 0 {
                break;
            }
            assert!((1..=MAX_INSTRUCTION_SIZE).contains(&n));
            total += n;
            count += 1;
        }
        println!(
            "{} {} {}: {} instructions over {} bytes in {:?}",
            mode,
            vendor,
            syntax,
            count,
            data.len(),
            start.elapsed()
        );
        assert_eq!(total, data.len());
        assert_eq!(dis.decode(), 0);
    }

    #[rstest]
    fn test_accessors_are_stable(
        #[values(Mode::Bits16, Mode::Bits32, Mode::Bits64)] mode: Mode,
        #[values(Syntax::Att, Syntax::Intel)] syntax: Syntax,
    ) {
        let mut data = sample_code(mode);
        data.extend(noise(512, 0xdead_beef));

        let mut dis = disassembler(mode, Vendor::Intel, syntax);
        dis.attach_buffer(data);

        while dis.decode() > 0 {
            let text = dis.mnemonic();
            let hex = dis.hex();
            let len = dis.instruction_length();

            assert_eq!(hex.len(), 2 * len);
            assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
            assert!(!text.is_empty());

            assert_eq!(dis.mnemonic(), text);
            assert_eq!(dis.hex(), hex);
            assert_eq!(dis.instruction_length(), len);
        }
    }

    #[rstest]
    #[case(0, 0)]
    #[case(0x401000, 0)]
    #[case(0x7c00, 3)]
    #[case(u64::MAX, 5)]
    fn test_offsets_advance_by_length(#[case] pc: u64, #[case] skip: u64) {
        let data = sample_code(Mode::Bits32);
        let mut dis = disassembler(Mode::Bits32, Vendor::Intel, Syntax::Att);
        dis.set_program_counter(pc);
        dis.attach_buffer(data.clone());
        assert_eq!(dis.skip(skip), skip);

        let mut expected = skip.wrapping_sub(pc);
        let mut total = skip as usize;
        loop {
            let n = dis.decode();
            if n == 0 {
                break;
            }
            assert_eq!(dis.offset(), expected);
            expected = expected.wrapping_add(n as u64);
            total += n;
        }
        assert_eq!(total, data.len());
    }

    #[test]
    fn test_nop_nop_ret() {
        let mut dis = disassembler(Mode::Bits32, Vendor::Intel, Syntax::Att);
        dis.attach_buffer(vec![0x90, 0x90, 0xc3]);

        let mut texts = Vec::new();
        for _ in 0..3 {
            assert_eq!(dis.decode(), 1);
            texts.push(dis.mnemonic());
        }
        assert_eq!(dis.decode(), 0);
        assert_eq!(texts, vec!["nop", "nop", "ret"]);
    }

    #[test]
    fn test_missing_file_keeps_source() {
        let mut dis = disassembler(Mode::Bits32, Vendor::Intel, Syntax::Intel);
        dis.attach_buffer(vec![0x90, 0xc3]);
        assert_eq!(dis.decode(), 1);

        let err = dis.attach_file("/nonexistent/streamdis/missing.bin").unwrap_err();
        assert!(matches!(err, DisassemblyError::SourceUnavailable { .. }));

        assert_eq!(dis.decode(), 1);
        assert_eq!(dis.mnemonic(), "ret");
        assert_eq!(dis.decode(), 0);
    }

    #[rstest]
    fn test_sources_agree(#[values(Mode::Bits16, Mode::Bits32, Mode::Bits64)] mode: Mode) {
        let mut data = sample_code(mode);
        data.extend(noise(2048, 42));
        // End on a truncated instruction
        data.extend([0x0f, 0xb6]);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&data).unwrap();
        file.flush().unwrap();

        let mut from_buffer = disassembler(mode, Vendor::Intel, Syntax::Att);
        from_buffer.set_program_counter(0x1000);
        from_buffer.attach_buffer(data.clone());

        let mut from_file = disassembler(mode, Vendor::Intel, Syntax::Att);
        from_file.set_program_counter(0x1000);
        from_file.attach_file(file.path()).unwrap();

        let mut from_reader = disassembler(mode, Vendor::Intel, Syntax::Att);
        from_reader.set_program_counter(0x1000);
        from_reader.attach_reader(Cursor::new(data.clone()));

        let expected = drain(&mut from_buffer);
        assert_eq!(drain(&mut from_file), expected);
        assert_eq!(drain(&mut from_reader), expected);
        assert_eq!(expected.iter().map(|l| l.size).sum::<usize>(), data.len());
    }

    #[test]
    fn test_file_source_refuses_seek() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0x90; 16]).unwrap();
        file.flush().unwrap();

        let mut dis = Disassembler::new();
        dis.attach_file(file.path()).unwrap();
        assert_eq!(dis.skip(4), 4);
        assert!(matches!(dis.seek(0), Err(DisassemblyError::NotSeekable)));
        assert_eq!(dis.iter().count(), 12);
    }

    fn reference_length(mode: Mode, bytes: &[u8]) -> usize {
        let arch_mode = match mode {
            Mode::Bits16 => arch::x86::ArchMode::Mode16,
            Mode::Bits32 => arch::x86::ArchMode::Mode32,
            Mode::Bits64 => arch::x86::ArchMode::Mode64,
        };
        let cs = Capstone::new()
            .x86()
            .mode(arch_mode)
            .build()
            .expect("Failed to create Capstone instance");
        let insns = cs.disasm_count(bytes, 0x1000, 1).expect("capstone failed");
        let insn = insns.iter().next().expect("capstone decoded nothing");
        insn.bytes().len()
    }

    #[rstest]
    #[case(Mode::Bits16, &[0x8b, 0x46, 0xfc])]
    #[case(Mode::Bits16, &[0xb8, 0x34, 0x12])]
    #[case(Mode::Bits16, &[0x66, 0xb8, 0x78, 0x56, 0x34, 0x12])]
    #[case(Mode::Bits16, &[0xe8, 0x10, 0x00])]
    #[case(Mode::Bits16, &[0x8b, 0x1e, 0x34, 0x12])]
    #[case(Mode::Bits32, &[0x8d, 0x04, 0x8d, 0x00, 0x00, 0x00, 0x00])]
    #[case(Mode::Bits32, &[0x66, 0xb8, 0x34, 0x12])]
    #[case(Mode::Bits32, &[0x67, 0x8b, 0x07])]
    #[case(Mode::Bits32, &[0xa1, 0x00, 0x10, 0x00, 0x00])]
    #[case(Mode::Bits32, &[0xea, 0x00, 0x10, 0x00, 0x00, 0x10, 0x00])]
    #[case(Mode::Bits32, &[0xc7, 0x45, 0xfc, 0x01, 0x00, 0x00, 0x00])]
    #[case(Mode::Bits32, &[0x69, 0xc0, 0x10, 0x00, 0x00, 0x00])]
    #[case(Mode::Bits32, &[0x6b, 0xc0, 0x10])]
    #[case(Mode::Bits32, &[0xf0, 0x0f, 0xb1, 0x0a])]
    #[case(Mode::Bits32, &[0xc2, 0x08, 0x00])]
    #[case(Mode::Bits32, &[0xdd, 0x45, 0xf8])]
    #[case(Mode::Bits32, &[0xf2, 0x0f, 0x10, 0x45, 0x08])]
    #[case(Mode::Bits32, &[0x66, 0x0f, 0x3a, 0x0f, 0xc1, 0x08])]
    #[case(Mode::Bits32, &[0x0f, 0x84, 0x00, 0x01, 0x00, 0x00])]
    #[case(Mode::Bits64, &[0x48, 0x89, 0xe5])]
    #[case(Mode::Bits64, &[0x48, 0x8d, 0x05, 0x10, 0x00, 0x00, 0x00])]
    #[case(Mode::Bits64, &[0x48, 0xb8, 0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11])]
    #[case(Mode::Bits64, &[0xa1, 0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11])]
    #[case(Mode::Bits64, &[0x0f, 0x1f, 0x44, 0x00, 0x00])]
    #[case(Mode::Bits64, &[0x66, 0x0f, 0x1f, 0x84, 0x00, 0x00, 0x00, 0x00, 0x00])]
    #[case(Mode::Bits64, &[0xf3, 0x48, 0xab])]
    #[case(Mode::Bits64, &[0x41, 0x57])]
    #[case(Mode::Bits64, &[0x48, 0xc7, 0xc0, 0x01, 0x00, 0x00, 0x00])]
    #[case(Mode::Bits64, &[0x48, 0x81, 0x7c, 0x24, 0x08, 0x00, 0x10, 0x00, 0x00])]
    #[case(Mode::Bits64, &[0x66, 0x48, 0x0f, 0x6e, 0xc0])]
    #[case(Mode::Bits64, &[0xe9, 0x00, 0x00, 0x00, 0x00])]
    fn test_lengths_match_reference_decoder(#[case] mode: Mode, #[case] bytes: &[u8]) {
        let mut dis = disassembler(mode, Vendor::Intel, Syntax::Intel);
        dis.attach_buffer(bytes);
        let ours = dis.decode();
        assert_eq!(ours, reference_length(mode, bytes), "{}", dis.mnemonic());
        assert_eq!(ours, bytes.len());
    }

    #[test]
    fn test_listing_formats_from_live_decode() {
        let mut dis = disassembler(Mode::Bits64, Vendor::Intel, Syntax::Att);
        dis.set_program_counter(0x401000);
        dis.attach_buffer(sample_code(Mode::Bits64));
        let lines = drain(&mut dis);

        let json = OutputFormat::Json
            .get_formatter()
            .format(&lines, dis.config())
            .unwrap();
        let doc: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(doc["config"]["mode"], 64);
        assert_eq!(doc["instructions"][0]["text"], "push %rbp");
        assert_eq!(doc["instructions"][1]["address"], "0x401001");

        let csv = OutputFormat::Csv
            .get_formatter()
            .format(&lines, dis.config())
            .unwrap();
        assert_eq!(csv.lines().count(), lines.len() + 1);

        let jsonl = OutputFormat::JsonLines
            .get_formatter()
            .format(&lines, dis.config())
            .unwrap();
        assert_eq!(jsonl.lines().count(), lines.len());
    }

    #[test]
    fn test_elf_code_region_pipeline() {
        let code = sample_code(Mode::Bits64);
        let image = crate::parser::tests::tiny_elf(goblin::elf::header::EM_X86_64, &code);

        let region = GoblinParser::new().parse(&image).unwrap();
        let mut dis = disassembler(region.mode, Vendor::Intel, Syntax::Intel);
        dis.set_program_counter(region.address);
        dis.attach_buffer(region.bytes(&image).unwrap());

        let lines = drain(&mut dis);
        assert_eq!(lines[0].address, 0x401000);
        assert_eq!(lines[0].text, "push rbp");
        assert_eq!(lines.last().map(|l| l.text.as_str()), Some("ret"));
        assert_eq!(lines.iter().map(|l| l.size).sum::<usize>(), code.len());
    }

    #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
    #[test]
    fn test_own_executable() {
        let path = std::env::current_exe().unwrap();
        let image = std::fs::read(&path).unwrap();
        println!("Loaded {}: {} bytes", path.display(), image.len());

        let start = Instant::now();
        let region = GoblinParser::new().parse(&image).unwrap();
        println!(
            "Code region {} at 0x{:x}: {} bytes (parsed in {:?})",
            region.name,
            region.address,
            region.size,
            start.elapsed()
        );
        assert_eq!(region.mode, Mode::Bits64);

        let code = region.bytes(&image).unwrap();
        let window = &code[..code.len().min(64 * 1024)];

        let mut dis = disassembler(region.mode, Vendor::Intel, Syntax::Att);
        dis.set_program_counter(region.address);
        dis.attach_buffer(window);

        let start = Instant::now();
        let lines = drain(&mut dis);
        println!("Decoded {} instructions in {:?}", lines.len(), start.elapsed());

        assert!(!lines.is_empty());
        assert_eq!(lines.iter().map(|l| l.size).sum::<usize>(), window.len());
        assert!(lines.iter().all(|l| l.hex.len() == 2 * l.size));
        for pair in lines.windows(2) {
            assert_eq!(pair[1].address, pair[0].address + pair[0].size as u64);
        }
    }
}
