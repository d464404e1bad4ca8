use super::{BankSwitch, IgnoredWrite, RomBanks};

/// MBC1 register decode.
///
/// Only the ROM bank register (0x2000-0x3FFF) is modelled. It takes the low
/// 5 bits of the value; 0 selects bank 1 instead, and bits 5-6 of the
/// current bank are carried over so the upper bank bits survive a write to
/// the low register.
pub(super) fn write_register(rom: &mut RomBanks, address: u16, value: u8) -> BankSwitch {
    match address >> 13 {
        0x0 => BankSwitch::Ignored(IgnoredWrite::RamEnable),
        0x1 => {
            let mut bank = (value & 0x1F) as usize;
            if bank == 0 {
                bank = 1;
            }
            rom.try_switch(bank | (rom.current_bank() & 0x60))
        }
        _ => BankSwitch::Ignored(IgnoredWrite::UnmappedRegister),
    }
}
