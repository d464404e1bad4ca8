use super::BankController;

/// Offset of the cartridge type byte inside the ROM image.
pub const CARTRIDGE_TYPE_OFFSET: usize = 0x147;

const TITLE_START: usize = 0x134;
const TITLE_END: usize = 0x143;
const ROM_SIZE_OFFSET: usize = 0x148;
const RAM_SIZE_OFFSET: usize = 0x149;

/// Fields of the cartridge header at 0x0100-0x014F that the memory core
/// cares about. Missing bytes (short images) read as zero.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CartridgeHeader {
    pub title: String,
    pub cartridge_type: u8,
    pub rom_size_code: u8,
    pub ram_size_code: u8,
}

impl CartridgeHeader {
    pub fn parse(rom: &[u8]) -> Self {
        let byte = |offset: usize| rom.get(offset).copied().unwrap_or(0);

        let title_bytes: Vec<u8> = (TITLE_START..=TITLE_END)
            .map(byte)
            .take_while(|&b| b != 0)
            .collect();

        Self {
            title: String::from_utf8_lossy(&title_bytes).into_owned(),
            cartridge_type: byte(CARTRIDGE_TYPE_OFFSET),
            rom_size_code: byte(ROM_SIZE_OFFSET),
            ram_size_code: byte(RAM_SIZE_OFFSET),
        }
    }

    /// Controller declared by the type byte.
    ///
    /// Unknown type bytes fall back to MBC5, the most permissive variant.
    pub fn controller(&self) -> BankController {
        controller_for_type(self.cartridge_type).unwrap_or_else(|| {
            log::warn!(
                "unrecognised cartridge type {:#04x}, falling back to MBC5",
                self.cartridge_type
            );
            BankController::Mbc5
        })
    }

    /// ROM bank count declared by the size code (32 KiB << code).
    pub fn declared_rom_banks(&self) -> Option<usize> {
        match self.rom_size_code {
            code @ 0x00..=0x08 => Some(2usize << code),
            _ => None,
        }
    }
}

/// Exact type byte table. `None` means the byte is not a known type.
pub fn controller_for_type(cartridge_type: u8) -> Option<BankController> {
    match cartridge_type {
        0x00 | 0x08 | 0x09 => Some(BankController::None),
        0x01..=0x03 => Some(BankController::Mbc1),
        0x05 | 0x06 => Some(BankController::Mbc2),
        0x0F..=0x13 => Some(BankController::Mbc3),
        0x15..=0x17 => Some(BankController::Mbc4),
        0x19..=0x1E => Some(BankController::Mbc5),
        _ => None,
    }
}
