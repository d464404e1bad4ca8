mod address_space;
mod init;
mod region;

use std::collections::TryReserveError;

use thiserror::Error;
use typed_builder::TypedBuilder;

use crate::cartridge::{BankController, BankSwitch, IgnoredWrite, RomBanks};
use crate::trace::TraceRecorder;
use crate::{HIGH_RAM_SIZE, WORKING_RAM_BANK_SIZE};

pub use address_space::AddressSpace;
pub use region::Region;

#[derive(TypedBuilder, Clone, Debug, Eq, PartialEq)]
pub struct MemoryConfig {
    /// Working RAM banks of 4 KiB. DMG hardware has two.
    #[builder(default = 2)]
    pub working_ram_banks: usize,
    /// Start the trace recorder as part of every reset.
    #[builder(default = false)]
    pub trace_on_reset: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("no ROM image loaded")]
    RomNotLoaded,
    #[error("ROM image of {size} bytes is smaller than two 16 KiB banks")]
    RomTooSmall { size: usize },
    #[error("need at least 2 working RAM banks, configured {banks}")]
    InvalidConfig { banks: usize },
    #[error("failed to allocate {size} bytes of working RAM")]
    WorkingRamAllocation {
        size: usize,
        #[source]
        source: TryReserveError,
    },
}

/// Addressable storage of one emulated session.
///
/// Construction allocates nothing; working RAM exists only between a
/// successful [`reset`](MemoryState::reset) and the next
/// [`deinit`](MemoryState::deinit).
#[derive(Debug)]
pub struct MemoryState {
    config: MemoryConfig,
    wram: Option<Vec<u8>>,
    /// Offset of the switchable working RAM bank inside `wram`.
    wram_bank_base: usize,
    rom: Option<RomBanks>,
    controller: BankController,
    last_switch: Option<BankSwitch>,
    hram: [u8; HIGH_RAM_SIZE],
    tracer: TraceRecorder,
    /// Program counter of the instruction currently touching memory.
    pc: u16,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self::init(MemoryConfig::default())
    }
}

impl MemoryState {
    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    pub fn controller(&self) -> BankController {
        self.controller
    }

    pub fn rom(&self) -> Option<&RomBanks> {
        self.rom.as_ref()
    }

    pub fn rom_size(&self) -> usize {
        self.rom.as_ref().map_or(0, RomBanks::len)
    }

    pub fn current_bank(&self) -> Option<usize> {
        self.rom.as_ref().map(RomBanks::current_bank)
    }

    pub fn rom_bank_base(&self) -> Option<usize> {
        self.rom.as_ref().map(RomBanks::bank_base)
    }

    /// Outcome of the most recent cartridge register write since reset.
    pub fn last_bank_switch(&self) -> Option<BankSwitch> {
        self.last_switch
    }

    pub fn working_ram(&self) -> Option<&[u8]> {
        self.wram.as_deref()
    }

    pub fn wram_bank_base(&self) -> usize {
        self.wram_bank_base
    }

    pub fn high_ram(&self) -> &[u8; HIGH_RAM_SIZE] {
        &self.hram
    }

    pub fn tracer(&self) -> &TraceRecorder {
        &self.tracer
    }

    pub fn tracer_mut(&mut self) -> &mut TraceRecorder {
        &mut self.tracer
    }

    /// Borrow the collaborators and get a CPU-facing view of the address space.
    pub fn attach<'a, V, I>(
        &'a mut self,
        video: &'a mut V,
        io: &'a mut I,
    ) -> AddressSpace<'a, V, I> {
        AddressSpace::new(self, video, io)
    }

    /// Forward a store in 0x0000-0x7FFF to the active bank controller.
    pub fn write_bank_register(&mut self, address: u16, value: u8) -> BankSwitch {
        let outcome = match self.rom.as_mut() {
            Some(rom) => self.controller.handle_register_write(rom, address, value),
            None => BankSwitch::Ignored(IgnoredWrite::NoController),
        };
        self.last_switch = Some(outcome);
        outcome
    }

    #[inline]
    fn wram_read(&self, base: usize, addr: u16) -> u8 {
        let offset = base + ((addr as usize) & (WORKING_RAM_BANK_SIZE - 1));
        self.wram
            .as_ref()
            .and_then(|wram| wram.get(offset).copied())
            .unwrap_or(0xFF)
    }

    #[inline]
    fn wram_write(&mut self, base: usize, addr: u16, value: u8) {
        let offset = base + ((addr as usize) & (WORKING_RAM_BANK_SIZE - 1));
        if let Some(slot) = self.wram.as_mut().and_then(|wram| wram.get_mut(offset)) {
            *slot = value;
        }
    }
}

#[cfg(test)]
mod tests;
