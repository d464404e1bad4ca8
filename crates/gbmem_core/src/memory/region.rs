use std::ops::RangeInclusive;

/// Fixed hardware regions of the 16-bit address space.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Region {
    RomBank0,
    RomBankN,
    VideoRam,
    /// Cartridge RAM. Not modelled yet.
    ExternalRam,
    WorkingRamBank0,
    WorkingRamBankN,
    /// 0xE000-0xEFFF mirrors working RAM bank 0.
    EchoBank0,
    /// 0xF000-0xFDFF mirrors the switchable working RAM bank.
    EchoBankN,
    /// Sprite attribute table. Not modelled yet.
    Oam,
    Unusable,
    Io,
    HighRam,
    InterruptEnable,
}

impl Region {
    pub const ALL: [Region; 13] = [
        Region::RomBank0,
        Region::RomBankN,
        Region::VideoRam,
        Region::ExternalRam,
        Region::WorkingRamBank0,
        Region::WorkingRamBankN,
        Region::EchoBank0,
        Region::EchoBankN,
        Region::Oam,
        Region::Unusable,
        Region::Io,
        Region::HighRam,
        Region::InterruptEnable,
    ];

    #[inline]
    pub const fn of(addr: u16) -> Region {
        match addr {
            0x0000..=0x3FFF => Region::RomBank0,
            0x4000..=0x7FFF => Region::RomBankN,
            0x8000..=0x9FFF => Region::VideoRam,
            0xA000..=0xBFFF => Region::ExternalRam,
            0xC000..=0xCFFF => Region::WorkingRamBank0,
            0xD000..=0xDFFF => Region::WorkingRamBankN,
            0xE000..=0xEFFF => Region::EchoBank0,
            0xF000..=0xFDFF => Region::EchoBankN,
            0xFE00..=0xFE9F => Region::Oam,
            0xFEA0..=0xFEFF => Region::Unusable,
            0xFF00..=0xFF7F => Region::Io,
            0xFF80..=0xFFFE => Region::HighRam,
            0xFFFF => Region::InterruptEnable,
        }
    }

    pub const fn range(self) -> RangeInclusive<u16> {
        match self {
            Region::RomBank0 => 0x0000..=0x3FFF,
            Region::RomBankN => 0x4000..=0x7FFF,
            Region::VideoRam => 0x8000..=0x9FFF,
            Region::ExternalRam => 0xA000..=0xBFFF,
            Region::WorkingRamBank0 => 0xC000..=0xCFFF,
            Region::WorkingRamBankN => 0xD000..=0xDFFF,
            Region::EchoBank0 => 0xE000..=0xEFFF,
            Region::EchoBankN => 0xF000..=0xFDFF,
            Region::Oam => 0xFE00..=0xFE9F,
            Region::Unusable => 0xFEA0..=0xFEFF,
            Region::Io => 0xFF00..=0xFF7F,
            Region::HighRam => 0xFF80..=0xFFFE,
            Region::InterruptEnable => 0xFFFF..=0xFFFF,
        }
    }
}
