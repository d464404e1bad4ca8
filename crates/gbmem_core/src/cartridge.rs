mod header;
mod mbc1;
mod mbc3;
mod mbc5;

pub use header::{controller_for_type, CartridgeHeader, CARTRIDGE_TYPE_OFFSET};

use crate::ROM_BANK_SIZE;

/// Bank controller chip declared by the cartridge header.
///
/// The set is fixed by hardware, so dispatch is a plain `match` rather than a
/// trait object. The variants themselves are stateless; the bank they select
/// lives in [`RomBanks`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum BankController {
    /// ROM only (optionally with plain RAM). Register writes do nothing.
    #[default]
    None,
    Mbc1,
    /// Not modelled yet: every register write is ignored.
    Mbc2,
    Mbc3,
    /// Not modelled yet: every register write is ignored.
    Mbc4,
    Mbc5,
}

/// Outcome of a store into the cartridge register area (0x0000-0x7FFF).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BankSwitch {
    /// The upper ROM window now shows this bank.
    Applied(usize),
    /// The requested bank does not exist in the image; nothing changed.
    Rejected(SwitchRejection),
    /// The write landed on a register the controller does not act on.
    Ignored(IgnoredWrite),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SwitchRejection {
    OutOfRange { bank: usize, rom_size: usize },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum IgnoredWrite {
    /// ROM-only cartridge.
    NoController,
    /// 0x0000-0x1FFF. RAM enable is reserved until external RAM exists.
    RamEnable,
    /// The controller variant has no register model yet.
    Unimplemented(BankController),
    /// Address third the controller does not decode.
    UnmappedRegister,
}

impl BankController {
    /// Decode a cartridge register write and apply it to `rom`.
    ///
    /// Registers are keyed by which 8 KiB third of the address space the
    /// store falls in (`address >> 13`).
    pub fn handle_register_write(self, rom: &mut RomBanks, address: u16, value: u8) -> BankSwitch {
        match self {
            BankController::None => BankSwitch::Ignored(IgnoredWrite::NoController),
            BankController::Mbc1 => mbc1::write_register(rom, address, value),
            BankController::Mbc2 | BankController::Mbc4 => {
                log::trace!("{self:?} register write {address:#06x} <- {value:#04x} not modelled");
                BankSwitch::Ignored(IgnoredWrite::Unimplemented(self))
            }
            BankController::Mbc3 => mbc3::write_register(rom, address, value),
            BankController::Mbc5 => mbc5::write_register(rom, address, value),
        }
    }
}

/// Cartridge ROM image plus the bank currently mapped at 0x4000-0x7FFF.
#[derive(Debug)]
pub struct RomBanks {
    image: Vec<u8>,
    /// Byte offset of the upper window into `image`.
    bank_base: usize,
    current_bank: usize,
}

impl RomBanks {
    pub fn new(image: Vec<u8>) -> Self {
        Self {
            image,
            bank_base: ROM_BANK_SIZE,
            current_bank: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.image.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }

    pub fn image(&self) -> &[u8] {
        &self.image
    }

    pub fn bank_base(&self) -> usize {
        self.bank_base
    }

    pub fn current_bank(&self) -> usize {
        self.current_bank
    }

    /// Number of whole 16 KiB banks in the image.
    pub fn bank_count(&self) -> usize {
        self.image.len() / ROM_BANK_SIZE
    }

    /// Map bank 1 back into the upper window.
    pub(crate) fn rewind(&mut self) {
        self.bank_base = ROM_BANK_SIZE;
        self.current_bank = 1;
    }

    #[inline]
    pub fn read_bank0(&self, addr: u16) -> u8 {
        let offset = (addr as usize) & (ROM_BANK_SIZE - 1);
        self.image.get(offset).copied().unwrap_or(0xFF)
    }

    #[inline]
    pub fn read_banked(&self, addr: u16) -> u8 {
        let offset = (addr as usize) & (ROM_BANK_SIZE - 1);
        self.image.get(self.bank_base + offset).copied().unwrap_or(0xFF)
    }

    /// Map `bank` into the upper window if the image is large enough.
    pub fn try_switch(&mut self, bank: usize) -> BankSwitch {
        let rom_size = self.image.len();
        let in_range = bank
            .checked_mul(ROM_BANK_SIZE)
            .and_then(|start| start.checked_add(ROM_BANK_SIZE))
            .is_some_and(|end| end <= rom_size);
        if !in_range {
            log::warn!("ROM bank {bank} out of range for a {rom_size} byte image, ignoring switch");
            return BankSwitch::Rejected(SwitchRejection::OutOfRange { bank, rom_size });
        }

        self.bank_base = bank * ROM_BANK_SIZE;
        self.current_bank = bank;
        BankSwitch::Applied(bank)
    }
}
