use super::{BankSwitch, IgnoredWrite, RomBanks};

/// MBC3 register decode.
///
/// The ROM bank register is 7 bits wide and covers the whole bank range,
/// so no bits carry over. Writing 0 still maps bank 1.
pub(super) fn write_register(rom: &mut RomBanks, address: u16, value: u8) -> BankSwitch {
    match address >> 13 {
        0x0 => BankSwitch::Ignored(IgnoredWrite::RamEnable),
        0x1 => {
            let mut bank = (value & 0x7F) as usize;
            if bank == 0 {
                bank = 1;
            }
            rom.try_switch(bank)
        }
        _ => BankSwitch::Ignored(IgnoredWrite::UnmappedRegister),
    }
}
