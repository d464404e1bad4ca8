use crate::cartridge::{BankController, CartridgeHeader, RomBanks};
use crate::trace::TraceRecorder;
use crate::{HIGH_RAM_SIZE, ROM_BANK_SIZE, WORKING_RAM_BANK_SIZE};

use super::{MemoryConfig, MemoryError, MemoryState};

impl MemoryState {
    /// Zeroed session with nothing allocated.
    pub fn init(config: MemoryConfig) -> Self {
        Self {
            config,
            wram: None,
            wram_bank_base: 0,
            rom: None,
            controller: BankController::None,
            last_switch: None,
            hram: [0; HIGH_RAM_SIZE],
            tracer: TraceRecorder::default(),
            pc: 0,
        }
    }

    /// Hand over the cartridge image. Takes effect on the next reset.
    ///
    /// A running session is torn down first, so the new image never runs
    /// under the previous cartridge's controller.
    pub fn load_rom(&mut self, rom: Vec<u8>) {
        if self.is_running() {
            log::debug!("ROM loaded into a running session, deinitializing");
            self.deinit();
        }
        log::debug!("Loaded {} byte ROM image", rom.len());
        self.rom = Some(RomBanks::new(rom));
    }

    pub fn is_running(&self) -> bool {
        self.wram.is_some()
    }

    /// (Re)start the session.
    ///
    /// Releases the previous working RAM, allocates a fresh zeroed one, maps
    /// ROM bank 1 and working RAM bank 1, selects the bank controller from
    /// the header and clears high RAM. On failure everything is torn down
    /// via [`deinit`](MemoryState::deinit).
    pub fn reset(&mut self) -> Result<(), MemoryError> {
        self.wram = None;

        if let Err(err) = self.try_reset() {
            log::error!("Memory reset failed: {err}");
            self.deinit();
            return Err(err);
        }
        Ok(())
    }

    fn try_reset(&mut self) -> Result<(), MemoryError> {
        let banks = self.config.working_ram_banks;
        if banks < 2 {
            return Err(MemoryError::InvalidConfig { banks });
        }

        let rom = self.rom.as_mut().ok_or(MemoryError::RomNotLoaded)?;
        if rom.len() < 2 * ROM_BANK_SIZE {
            return Err(MemoryError::RomTooSmall { size: rom.len() });
        }

        let wram = allocate_working_ram(banks.saturating_mul(WORKING_RAM_BANK_SIZE))?;

        rom.rewind();
        let header = CartridgeHeader::parse(rom.image());
        self.controller = header.controller();
        self.last_switch = None;

        self.wram = Some(wram);
        self.wram_bank_base = WORKING_RAM_BANK_SIZE;
        self.hram = [0; HIGH_RAM_SIZE];
        self.pc = 0;

        if self.config.trace_on_reset && !self.tracer.is_enabled() {
            self.tracer.start();
        }

        log::debug!(
            "Memory reset: '{}' type {:#04x} -> {:?}, {} ROM banks",
            header.title,
            header.cartridge_type,
            self.controller,
            rom.bank_count()
        );
        Ok(())
    }

    /// Release working RAM and the ROM image.
    pub fn deinit(&mut self) {
        self.wram = None;
        self.wram_bank_base = 0;
        self.rom = None;
        self.controller = BankController::None;
        self.last_switch = None;
    }
}

fn allocate_working_ram(size: usize) -> Result<Vec<u8>, MemoryError> {
    let mut wram = Vec::new();
    wram.try_reserve_exact(size)
        .map_err(|source| MemoryError::WorkingRamAllocation { size, source })?;
    wram.resize(size, 0);
    Ok(wram)
}
