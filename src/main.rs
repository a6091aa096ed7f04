use std::io;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use log::{info, warn, LevelFilter};
use simple_logger::SimpleLogger;

use pep8::disassembler::{self, Listing};
use pep8::memory::Memory;
use pep8::processor::{Halt, Processor};
use pep8::symbol::SymbolTable;
use pep8::trace::Console;

#[derive(Parser, Debug)]
#[clap(name = "pep8", version, about = "Disassembler and interpreter for Pep/8 object code")]
struct Args {
    /// Symbol file annotating labels and data regions
    #[arg(short, long)]
    symbols: Option<PathBuf>,

    /// Run the program after printing the listing
    #[arg(short, long)]
    interpret: bool,

    /// Dump the program bytes in decimal before the listing
    #[arg(short, long)]
    decimal: bool,

    /// Log more, repeat for even more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Program image
    input_file: PathBuf,
}

fn level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    color_eyre::install()?;
    SimpleLogger::new()
        .with_level(level(args.verbose))
        .init()
        .wrap_err("failed to initialize logging")?;

    let mut memory = Memory::from_file(&args.input_file)
        .wrap_err_with(|| format!("failed to load {}", args.input_file.display()))?;
    info!("Loaded {} bytes from {}", memory.len(), args.input_file.display());

    if args.decimal {
        println!("{}", memory.decimal_dump());
    }

    let symbols = match &args.symbols {
        Some(path) => SymbolTable::from_file(path)
            .wrap_err_with(|| format!("failed to load symbols from {}", path.display()))?,
        None => SymbolTable::default(),
    };
    info!("Loaded {} symbols", symbols.len());

    let instructions = disassembler::build(&memory, &symbols)?;
    disassembler::validate(&instructions)?;

    println!();
    println!("{}", Listing::new(&instructions, &memory, &symbols));

    if args.interpret {
        let stdout = io::stdout();
        let mut console = Console::new(stdout.lock());
        let mut cpu = Processor::new();

        if cpu.execute_until_stop(&mut memory, &mut console)? == Halt::EndOfMemory {
            warn!("The program ran past the end of memory without reaching STOP");
        }
    }

    Ok(())
}
