pub mod bus;
pub mod cartridge;
pub mod memory;
pub mod peripherals;
pub mod trace;

pub use bus::Bus;
pub use cartridge::{
    BankController, BankSwitch, CartridgeHeader, IgnoredWrite, RomBanks, SwitchRejection,
};
pub use memory::{AddressSpace, MemoryConfig, MemoryError, MemoryState, Region};
pub use peripherals::{IoRegisterFile, IoRegisters, Video, VramBuffer, REG_IE};
pub use trace::{EdgeKind, TraceError, TraceEvent, TraceRecorder, TraceSummary};

/// Size of one switchable cartridge ROM bank (16 KiB).
pub const ROM_BANK_SIZE: usize = 0x4000;
/// Size of one working RAM bank (4 KiB).
pub const WORKING_RAM_BANK_SIZE: usize = 0x1000;
/// Video RAM visible at 0x8000-0x9FFF.
pub const VRAM_SIZE: usize = 0x2000;
/// High RAM at 0xFF80-0xFFFE.
pub const HIGH_RAM_SIZE: usize = 0x7F;
/// I/O register window at 0xFF00-0xFF7F.
pub const IO_SIZE: usize = 0x80;
