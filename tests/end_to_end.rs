use color_eyre::eyre::Result;

use pep8::disassembler::{self, DisassemblyError, Listing, Malformation};
use pep8::instruction::Mnemonic;
use pep8::memory::Memory;
use pep8::processor::{ExecutionError, Halt, Processor};
use pep8::symbol::SymbolTable;
use pep8::trace::{Console, Output, Recorder, DIVIDER};

/// Disassembles, validates and runs `bytes`
fn run(bytes: &[u8], symbols: &str) -> Result<(Processor, Memory, Recorder, Halt)> {
    let mut memory = Memory::new(bytes.to_vec());
    let symbols: SymbolTable = symbols.parse().unwrap();

    let instructions = disassembler::build(&memory, &symbols)?;
    disassembler::validate(&instructions)?;

    let mut cpu = Processor::new();
    let mut recorder = Recorder::default();
    let halt = cpu.execute_until_stop(&mut memory, &mut recorder)?;

    Ok((cpu, memory, recorder, halt))
}

#[test]
fn stop_only() -> Result<()> {
    let memory = Memory::new(vec![0x00]);
    let symbols = SymbolTable::default();
    let instructions = disassembler::build(&memory, &symbols)?;
    assert_eq!(instructions.len(), 1);
    assert_eq!(instructions[0].mnemonic, Mnemonic::STOP);

    let (cpu, _, recorder, halt) = run(&[0x00], "")?;
    assert_eq!(halt, Halt::Stopped);
    assert_eq!((cpu.a, cpu.x, cpu.ir), (0, 0, 0));
    assert!(!(cpu.n || cpu.z || cpu.v || cpu.c));
    assert_eq!(cpu.pc, 1);
    assert_eq!(recorder.snapshots.len(), 1);
    assert!(recorder.outputs.is_empty());

    Ok(())
}

#[test]
fn load_immediate() -> Result<()> {
    let bytes = [0xC0, 0x00, 0x05, 0x00];

    let memory = Memory::new(bytes.to_vec());
    let symbols = SymbolTable::default();
    assert_eq!(disassembler::build(&memory, &symbols)?.len(), 2);

    let (cpu, _, _, halt) = run(&bytes, "")?;
    assert_eq!(halt, Halt::Stopped);
    assert_eq!(cpu.a, 5);
    assert!(!cpu.z);
    assert!(!cpu.n);

    Ok(())
}

#[test]
fn block_is_one_pseudo_op() -> Result<()> {
    let memory = Memory::new(vec![0x00, 0x00, 0x00]);
    let symbols: SymbolTable = "buf block 0 3".parse().unwrap();

    let instructions = disassembler::build(&memory, &symbols)?;

    assert_eq!(instructions.len(), 1);
    assert_eq!(instructions[0].mnemonic, Mnemonic::BLOCK);
    // a program that is only data can't stop
    assert_eq!(
        disassembler::validate(&instructions),
        Err(DisassemblyError::MissingTerminator)
    );

    Ok(())
}

#[test]
fn truncated_operand() {
    let memory = Memory::new(vec![0xC0, 0x00]);

    let err = disassembler::build(&memory, &SymbolTable::default()).unwrap_err();

    assert_eq!(
        err,
        DisassemblyError::MalformedProgram {
            address: 0,
            malformation: Malformation::MissingOperand,
        }
    );
}

#[test]
fn countdown() -> Result<()> {
    let bytes = [
        0xC0, 0x00, 0x03, // LDA 3,i
        0xE1, 0x00, 0x11, // loop: STA num,d
        0x39, 0x00, 0x11, // DECO num,d
        0x80, 0x00, 0x01, // SUBA 1,i
        0x0C, 0x00, 0x03, // BRNE loop,i
        0x00, // STOP
        0x00, // pad
        0x00, 0x00, // num
    ];

    let (cpu, memory, recorder, halt) =
        run(&bytes, "loop line 3\npad block 16 1\nnum word 17")?;

    assert_eq!(halt, Halt::Stopped);
    assert_eq!(cpu.a, 0);
    assert!(cpu.z);
    assert_eq!(recorder.snapshots.len(), 14);
    assert_eq!(
        recorder.outputs,
        vec![Output::Decimal(3), Output::Decimal(2), Output::Decimal(1)]
    );
    assert_eq!(
        recorder.stores,
        vec![
            (0x11, 0x00),
            (0x12, 0x03),
            (0x11, 0x00),
            (0x12, 0x02),
            (0x11, 0x00),
            (0x12, 0x01),
        ]
    );
    assert_eq!(memory.data[0x11..], [0x00, 0x01]);

    Ok(())
}

#[test]
fn countdown_listing() -> Result<()> {
    let memory = Memory::new(vec![
        0xC0, 0x00, 0x03, 0xE1, 0x00, 0x11, 0x39, 0x00, 0x11, 0x80, 0x00, 0x01, 0x0C, 0x00, 0x03,
        0x00, 0x00, 0x00, 0x00,
    ]);
    let symbols: SymbolTable = "loop line 3\npad block 16 1\nnum word 17".parse().unwrap();
    let instructions = disassembler::build(&memory, &symbols)?;

    let listing = Listing::new(&instructions, &memory, &symbols).to_string();
    let rows: Vec<&str> = listing.lines().skip(3).collect();

    assert_eq!(
        rows,
        vec![
            "0000  C00003         LDA       loop,i",
            "0003  E10011 loop:   STA       num,d",
            "0006  390011         DECO      num,d",
            "0009  800001         SUBA      0x0001,i",
            "000C  0C0003         BRNE      loop,i",
            "000F  00             STOP",
            "0010  00     pad:    .BLOCK    1",
            "0011  0000   num:    .WORD     0x0000",
        ]
    );

    Ok(())
}

#[test]
fn console_trace() -> Result<()> {
    // CHARO 'H',i  STOP
    let mut memory = Memory::new(vec![0x50, 0x00, 0x48, 0x00]);
    let mut console = Console::new(Vec::new());

    Processor::new().execute_until_stop(&mut memory, &mut console)?;

    let text = String::from_utf8(console.into_inner())?;
    let expected = [
        DIVIDER,
        "Status bits (NZVC)          0 0 0 0",
        "Accumulator (A)             0x0000",
        "Index Register (X)          0x0000",
        "Program counter (PC)        0x0003",
        "Instruction register (IR)   0x500048",
        DIVIDER,
        "  Output 'H'",
        DIVIDER,
        "Status bits (NZVC)          0 0 0 0",
        "Accumulator (A)             0x0000",
        "Index Register (X)          0x0000",
        "Program counter (PC)        0x0004",
        "Instruction register (IR)   0x000000",
        DIVIDER,
        "",
    ]
    .join("\n");
    assert_eq!(text, expected);

    Ok(())
}

#[test]
fn unsupported_instruction_aborts_run() {
    // ASLA  STOP
    let err = run(&[0x1C, 0x00], "").unwrap_err();

    match err.downcast_ref::<ExecutionError>() {
        Some(ExecutionError::UnsupportedInstruction { mnemonic, address }) => {
            assert_eq!(*mnemonic, Mnemonic::ASLA);
            assert_eq!(*address, 0);
        }
        other => panic!("unexpected {:?}", other),
    }
}
