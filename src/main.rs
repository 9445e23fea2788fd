//! `streamdis`: disassemble raw x86 code or the code section of a binary.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::Level;

use streamdis::format::OutputFormat;
use streamdis::parser::{BinaryParser, GoblinParser};
use streamdis::{Address, Disassembler, Line, Mode, Syntax, Vendor};

#[derive(Debug, Parser)]
#[command(name = "streamdis", version, about = "Streaming x86 / x86-64 disassembler")]
struct Args {
    /// Input file; reads stdin when absent or "-"
    file: Option<PathBuf>,

    /// Bit-mode: 16, 32 or 64 [default: 16, or detected with --section]
    #[arg(short, long, value_parser = parse_mode)]
    mode: Option<Mode>,

    /// Vendor instruction-set variant
    #[arg(long, value_enum, default_value_t = Vendor::Intel)]
    vendor: Vendor,

    /// Output syntax
    #[arg(short, long, value_enum, default_value_t = Syntax::Att)]
    syntax: Syntax,

    /// Program-counter base (decimal or 0x-prefixed hex)
    #[arg(long, value_parser = parse_address)]
    pc: Option<Address>,

    /// Bytes to discard before decoding
    #[arg(long, default_value_t = 0)]
    skip: u64,

    /// Stop after this many instructions
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Listing format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Treat the input as an ELF, PE or Mach-O image and disassemble its
    /// code section
    #[arg(long)]
    section: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn parse_mode(s: &str) -> Result<Mode, String> {
    let bits: u32 = s.parse().map_err(|_| format!("invalid mode: {}", s))?;
    Mode::try_from(bits).map_err(|e| e.to_string())
}

fn parse_address(s: &str) -> Result<Address, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => Address::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address {}: {}", s, e))
}

fn init_logging(verbose: u8) -> Result<()> {
    let log_level = match verbose {
        0 => Level::Error,
        1 => Level::Warn,
        2 => Level::Info,
        3 => Level::Debug,
        _ => Level::Trace,
    };
    simplelog::TermLogger::init(
        log_level.to_level_filter(),
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )
    .context("failed to initialise logging")
}

fn read_all(file: Option<&PathBuf>) -> Result<Vec<u8>> {
    match file {
        Some(path) => fs::read(path).with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut data = Vec::new();
            io::stdin().read_to_end(&mut data).context("failed to read stdin")?;
            Ok(data)
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let file = args.file.as_ref().filter(|p| p.as_os_str() != "-");

    let mut dis = Disassembler::new();
    dis.set_vendor(args.vendor);
    dis.set_syntax(args.syntax);

    if args.section {
        let image = read_all(file)?;
        let region = GoblinParser::new()
            .parse(&image)
            .context("failed to locate a code section")?;

        dis.set_mode(args.mode.unwrap_or(region.mode).bits())?;
        dis.set_program_counter(args.pc.unwrap_or(region.address));
        dis.attach_buffer(region.bytes(&image)?);
    } else {
        dis.set_mode(args.mode.unwrap_or_default().bits())?;
        dis.set_program_counter(args.pc.unwrap_or(0));
        match file {
            Some(path) => dis
                .attach_file(path)
                .with_context(|| format!("failed to open {}", path.display()))?,
            None => dis.attach_reader(io::stdin()),
        }
    }

    if args.skip > 0 {
        let skipped = dis.skip(args.skip);
        if skipped < args.skip {
            log::warn!("input ended after skipping {} of {} bytes", skipped, args.skip);
        }
    }

    let lines: Vec<Line> = dis.iter().take(args.count.unwrap_or(usize::MAX)).collect();
    log::info!("decoded {} instructions", lines.len());

    let formatter = args.format.get_formatter();
    print!("{}", formatter.format(&lines, dis.config())?);
    Ok(())
}
