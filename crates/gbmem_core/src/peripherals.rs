//! Seams to the subsystems that own memory the decoder only routes to.

use crate::{IO_SIZE, VRAM_SIZE};

/// Register id the I/O subsystem uses for the interrupt-enable register.
pub const REG_IE: u8 = 0xFF;

/// Video subsystem: owns VRAM and renders from it.
pub trait Video {
    fn vram(&self) -> &[u8];
    fn vram_mut(&mut self) -> &mut [u8];
    /// Called after every store into 0x8000-0x9FFF with the VRAM offset.
    fn notify_vram_write(&mut self, offset: u16);
}

/// I/O register subsystem (timers, interrupts, peripherals).
///
/// `register` is `address & 0x7F` for 0xFF00-0xFF7F and [`REG_IE`] for 0xFFFF.
pub trait IoRegisters {
    fn io_read(&mut self, register: u8) -> u8;
    fn io_write(&mut self, register: u8, value: u8);
}

/// Plain VRAM buffer that remembers which offsets were written.
///
/// Stands in for a real PPU in tests and in the inspector.
#[derive(Clone, Debug)]
pub struct VramBuffer {
    vram: Vec<u8>,
    pub writes: Vec<u16>,
}

impl Default for VramBuffer {
    fn default() -> Self {
        Self {
            vram: vec![0; VRAM_SIZE],
            writes: Vec::new(),
        }
    }
}

impl Video for VramBuffer {
    fn vram(&self) -> &[u8] {
        &self.vram
    }

    fn vram_mut(&mut self) -> &mut [u8] {
        &mut self.vram
    }

    fn notify_vram_write(&mut self, offset: u16) {
        self.writes.push(offset);
    }
}

/// Register file with no side effects: reads return what was last written.
#[derive(Clone, Debug)]
pub struct IoRegisterFile {
    registers: [u8; IO_SIZE],
    ie: u8,
}

impl Default for IoRegisterFile {
    fn default() -> Self {
        Self {
            registers: [0; IO_SIZE],
            ie: 0,
        }
    }
}

impl IoRegisterFile {
    pub fn interrupt_enable(&self) -> u8 {
        self.ie
    }
}

impl IoRegisters for IoRegisterFile {
    fn io_read(&mut self, register: u8) -> u8 {
        if register == REG_IE {
            return self.ie;
        }
        self.registers
            .get(register as usize)
            .copied()
            .unwrap_or(0xFF)
    }

    fn io_write(&mut self, register: u8, value: u8) {
        if register == REG_IE {
            self.ie = value;
        } else if let Some(slot) = self.registers.get_mut(register as usize) {
            *slot = value;
        }
    }
}
