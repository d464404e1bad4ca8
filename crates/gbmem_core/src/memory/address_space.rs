use crate::bus::Bus;
use crate::peripherals::{IoRegisters, Video, REG_IE};
use crate::{IO_SIZE, VRAM_SIZE};

use super::{MemoryState, Region};

const HIGH_RAM_START: u16 = 0xFF80;

/// CPU-facing view of one session: the memory state plus the video and I/O
/// collaborators it routes to.
pub struct AddressSpace<'a, V, I> {
    memory: &'a mut MemoryState,
    video: &'a mut V,
    io: &'a mut I,
}

impl<'a, V, I> AddressSpace<'a, V, I> {
    pub(super) fn new(memory: &'a mut MemoryState, video: &'a mut V, io: &'a mut I) -> Self {
        Self { memory, video, io }
    }

    pub fn memory(&self) -> &MemoryState {
        &*self.memory
    }

    pub fn memory_mut(&mut self) -> &mut MemoryState {
        &mut *self.memory
    }
}

impl<V: Video, I: IoRegisters> AddressSpace<'_, V, I> {
    pub fn load8(&mut self, addr: u16) -> u8 {
        let region = Region::of(addr);
        match region {
            Region::RomBank0 => self.memory.rom.as_ref().map_or(0xFF, |rom| rom.read_bank0(addr)),
            Region::RomBankN => self.memory.rom.as_ref().map_or(0xFF, |rom| rom.read_banked(addr)),
            Region::VideoRam => {
                let offset = (addr as usize) & (VRAM_SIZE - 1);
                self.video.vram().get(offset).copied().unwrap_or(0xFF)
            }
            Region::ExternalRam | Region::Oam => {
                log::trace!("load from unmodelled {region:?} at {addr:#06x}");
                0
            }
            Region::WorkingRamBank0 | Region::EchoBank0 => self.memory.wram_read(0, addr),
            Region::WorkingRamBankN | Region::EchoBankN => {
                self.memory.wram_read(self.memory.wram_bank_base, addr)
            }
            Region::Unusable => 0,
            Region::Io => self.io.io_read(((addr as usize) & (IO_SIZE - 1)) as u8),
            Region::HighRam => self.memory.hram[(addr - HIGH_RAM_START) as usize],
            Region::InterruptEnable => self.io.io_read(REG_IE),
        }
    }

    pub fn store8(&mut self, addr: u16, value: u8) {
        let region = Region::of(addr);
        match region {
            Region::RomBank0 | Region::RomBankN => {
                self.memory.write_bank_register(addr, value);
            }
            Region::VideoRam => {
                let offset = (addr as usize) & (VRAM_SIZE - 1);
                if let Some(slot) = self.video.vram_mut().get_mut(offset) {
                    *slot = value;
                }
                self.video.notify_vram_write(offset as u16);
            }
            Region::ExternalRam | Region::Oam => {
                log::trace!("store {value:#04x} to unmodelled {region:?} at {addr:#06x}");
            }
            Region::WorkingRamBank0 | Region::EchoBank0 => self.memory.wram_write(0, addr, value),
            Region::WorkingRamBankN | Region::EchoBankN => {
                let base = self.memory.wram_bank_base;
                self.memory.wram_write(base, addr, value);
            }
            Region::Unusable => {}
            Region::Io => self.io.io_write(((addr as usize) & (IO_SIZE - 1)) as u8, value),
            Region::HighRam => self.memory.hram[(addr - HIGH_RAM_START) as usize] = value,
            Region::InterruptEnable => self.io.io_write(REG_IE, value),
        }
    }
}

impl<V: Video, I: IoRegisters> Bus for AddressSpace<'_, V, I> {
    fn read8(&mut self, addr: u16) -> u8 {
        let value = self.load8(addr);
        let pc = self.memory.pc as u32;
        self.memory.tracer.add_read(pc, addr as u32, value as u32, 1);
        value
    }

    fn write8(&mut self, addr: u16, value: u8) {
        let pc = self.memory.pc as u32;
        self.memory.tracer.add_write(pc, addr as u32, value as u32, 1);
        self.store8(addr, value);
    }

    fn begin_instruction(&mut self, pc: u16) {
        self.memory.pc = pc;
    }
}
