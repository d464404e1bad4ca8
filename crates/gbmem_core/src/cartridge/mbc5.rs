use super::{BankSwitch, IgnoredWrite, RomBanks};

/// MBC5 register decode.
///
/// Same 7-bit bank register as MBC3, except bank 0 is a legal selection and
/// is mapped as written.
pub(super) fn write_register(rom: &mut RomBanks, address: u16, value: u8) -> BankSwitch {
    match address >> 13 {
        0x0 => BankSwitch::Ignored(IgnoredWrite::RamEnable),
        0x1 => rom.try_switch((value & 0x7F) as usize),
        _ => BankSwitch::Ignored(IgnoredWrite::UnmappedRegister),
    }
}
