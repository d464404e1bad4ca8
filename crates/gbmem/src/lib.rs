use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use gbmem_core::{
    BankController, BankSwitch, Bus, CartridgeHeader, IoRegisterFile, MemoryConfig, MemoryState,
    TraceSummary, VramBuffer,
};

/// Bank register the sweep writes to (inside 0x2000-0x3FFF).
const BANK_SELECT: u16 = 0x2100;
/// Largest value the 7-bit bank registers can express.
const MAX_SWEEP: usize = 0x80;

/// One bank register write and what the upper ROM window showed afterwards.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SweepRow {
    pub requested: u8,
    pub outcome: BankSwitch,
    pub current_bank: usize,
    pub first_byte: u8,
}

#[derive(Clone, Debug)]
pub struct Report {
    pub header: CartridgeHeader,
    pub controller: BankController,
    pub rom_size: usize,
    pub rows: Vec<SweepRow>,
    /// Statistics of the saved trace, when one was requested.
    pub trace: Option<TraceSummary>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title:      {}", self.header.title)?;
        writeln!(
            f,
            "Type:       {:#04x} ({:?})",
            self.header.cartridge_type, self.controller
        )?;
        write!(
            f,
            "ROM size:   {} bytes ({} banks",
            self.rom_size,
            self.rom_size / gbmem_core::ROM_BANK_SIZE
        )?;
        match self.header.declared_rom_banks() {
            Some(declared) => writeln!(f, ", header declares {declared})")?,
            None => writeln!(
                f,
                ", unknown header size code {:#04x})",
                self.header.rom_size_code
            )?,
        }
        writeln!(f)?;
        writeln!(f, "write  bank  [0x4000]  outcome")?;
        for row in &self.rows {
            writeln!(
                f,
                "{:#04x}  {:>4}  {:#04x}      {:?}",
                row.requested, row.current_bank, row.first_byte, row.outcome
            )?;
        }
        if let Some(summary) = &self.trace {
            writeln!(f)?;
            write!(f, "{summary}")?;
        }
        Ok(())
    }
}

/// Reset a session on `rom`, then write every bank number the image could
/// hold to the bank register and record what became visible.
///
/// When `trace_path` is given, every access of the sweep is traced and saved
/// there.
pub fn inspect(rom: Vec<u8>, trace_path: Option<&Path>) -> Result<Report> {
    let config = MemoryConfig::builder()
        .trace_on_reset(trace_path.is_some())
        .build();
    let mut memory = MemoryState::init(config);
    memory.load_rom(rom);
    memory.reset().context("failed to reset memory")?;

    let header = memory
        .rom()
        .map(|rom| CartridgeHeader::parse(rom.image()))
        .context("ROM image missing after reset")?;
    let rom_size = memory.rom_size();
    let sweep = (rom_size / gbmem_core::ROM_BANK_SIZE + 1).min(MAX_SWEEP);
    log::info!(
        "Inspecting '{}' ({:?}), sweeping {} bank writes",
        header.title,
        memory.controller(),
        sweep
    );

    let mut video = VramBuffer::default();
    let mut io = IoRegisterFile::default();
    let mut rows = Vec::with_capacity(sweep);
    {
        let mut bus = memory.attach(&mut video, &mut io);
        for requested in 0..sweep as u8 {
            bus.begin_instruction(0x0100);
            bus.write8(BANK_SELECT, requested);
            let outcome = bus
                .memory()
                .last_bank_switch()
                .context("bank register write left no outcome")?;
            let first_byte = bus.read8(0x4000);
            rows.push(SweepRow {
                requested,
                outcome,
                current_bank: bus.memory().current_bank().unwrap_or(0),
                first_byte,
            });
        }
    }

    let trace = match trace_path {
        Some(path) => {
            let summary = TraceSummary::from_bytes(memory.tracer().bytes())
                .context("recorded trace does not decode")?;
            memory.tracer_mut().save(path)?;
            Some(summary)
        }
        None => None,
    };

    Ok(Report {
        header,
        controller: memory.controller(),
        rom_size,
        rows,
        trace,
    })
}

/// Read `rom_path` from disk and inspect it.
pub fn run(rom_path: &Path, trace_path: Option<&Path>) -> Result<Report> {
    let rom = std::fs::read(rom_path)
        .with_context(|| format!("failed to read ROM file '{}'", rom_path.display()))?;
    log::info!("Loaded ROM path: '{}'", rom_path.display());
    inspect(rom, trace_path)
}

/// Load a saved trace and summarize its control flow.
pub fn summarize(trace_path: &Path) -> Result<TraceSummary> {
    let summary = TraceSummary::load(trace_path)?;
    log::info!(
        "Summarized {} events from '{}'",
        summary.event_count,
        trace_path.display()
    );
    Ok(summary)
}
