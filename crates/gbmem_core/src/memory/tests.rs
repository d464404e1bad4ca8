use super::*;
use crate::bus::Bus;
use crate::cartridge::tests::banked_rom;
use crate::cartridge::{BankSwitch, IgnoredWrite, SwitchRejection, CARTRIDGE_TYPE_OFFSET};
use crate::peripherals::{IoRegisterFile, IoRegisters, Video, VramBuffer};
use crate::trace::{decode_events, MemoryEvent, TraceEvent};
use crate::ROM_BANK_SIZE;

/// Session running a `banks`-bank image whose header declares `cartridge_type`.
fn running(banks: usize, cartridge_type: u8) -> MemoryState {
    let mut rom = banked_rom(banks);
    rom[CARTRIDGE_TYPE_OFFSET] = cartridge_type;
    let mut memory = MemoryState::default();
    memory.load_rom(rom);
    memory.reset().unwrap();
    memory
}

#[test]
fn init_allocates_nothing() {
    let memory = MemoryState::default();
    assert!(!memory.is_running());
    assert!(memory.working_ram().is_none());
    assert!(memory.rom().is_none());
    assert_eq!(memory.controller(), BankController::None);
    assert_eq!(memory.high_ram(), &[0; HIGH_RAM_SIZE]);
}

#[test]
fn reset_maps_initial_banks_and_selects_controller() {
    let memory = running(4, 0x01);
    assert!(memory.is_running());
    assert_eq!(memory.controller(), BankController::Mbc1);
    assert_eq!(memory.current_bank(), Some(1));
    assert_eq!(memory.rom_bank_base(), Some(ROM_BANK_SIZE));
    assert_eq!(memory.wram_bank_base(), WORKING_RAM_BANK_SIZE);
    assert_eq!(memory.working_ram().map(<[u8]>::len), Some(2 * WORKING_RAM_BANK_SIZE));
}

#[test]
fn reset_without_rom_fails_and_tears_down() {
    let mut memory = MemoryState::default();
    assert!(matches!(memory.reset(), Err(MemoryError::RomNotLoaded)));
    assert!(!memory.is_running());
}

#[test]
fn reset_rejects_single_bank_image() {
    let mut memory = MemoryState::default();
    memory.load_rom(vec![0; ROM_BANK_SIZE]);
    assert!(matches!(
        memory.reset(),
        Err(MemoryError::RomTooSmall { size: ROM_BANK_SIZE })
    ));
    assert!(memory.rom().is_none());
}

#[test]
fn allocation_failure_leaves_no_partial_session() {
    let config = MemoryConfig::builder().working_ram_banks(usize::MAX).build();
    let mut memory = MemoryState::init(config);
    memory.load_rom(banked_rom(2));
    assert!(matches!(
        memory.reset(),
        Err(MemoryError::WorkingRamAllocation { .. })
    ));
    assert!(!memory.is_running());
    assert!(memory.rom().is_none());
    assert_eq!(memory.controller(), BankController::None);
}

#[test]
fn too_few_working_ram_banks_is_a_config_error() {
    let config = MemoryConfig::builder().working_ram_banks(1).build();
    let mut memory = MemoryState::init(config);
    memory.load_rom(banked_rom(2));
    assert!(matches!(memory.reset(), Err(MemoryError::InvalidConfig { banks: 1 })));
}

#[test]
fn second_reset_starts_from_fresh_state() {
    let mut memory = running(4, 0x13);
    let mut video = VramBuffer::default();
    let mut io = IoRegisterFile::default();
    {
        let mut bus = memory.attach(&mut video, &mut io);
        bus.write8(0xFF80, 0xAA);
        bus.write8(0xFFFE, 0xBB);
        bus.write8(0xC000, 0x11);
        bus.write8(0xD000, 0x22);
        bus.write8(0x2000, 0x03);
    }
    assert_eq!(memory.current_bank(), Some(3));

    memory.reset().unwrap();
    assert_eq!(memory.high_ram(), &[0; HIGH_RAM_SIZE]);
    assert!(memory.working_ram().unwrap().iter().all(|&b| b == 0));
    assert_eq!(memory.current_bank(), Some(1));
    assert_eq!(memory.controller(), BankController::Mbc3);
}

#[test]
fn deinit_releases_everything() {
    let mut memory = running(2, 0x00);
    memory.deinit();
    assert!(!memory.is_running());
    assert!(memory.rom().is_none());
    assert_eq!(memory.rom_size(), 0);
}

#[test]
fn loading_rom_into_running_session_drops_old_controller() {
    let mut memory = running(2, 0x01);
    let mut rom = banked_rom(4);
    rom[CARTRIDGE_TYPE_OFFSET] = 0x19;
    memory.load_rom(rom);

    assert!(!memory.is_running());
    assert_ne!(memory.controller(), BankController::Mbc1);
    assert_eq!(
        memory.write_bank_register(0x2000, 0x00),
        BankSwitch::Ignored(IgnoredWrite::NoController)
    );

    memory.reset().unwrap();
    assert_eq!(memory.controller(), BankController::Mbc5);
    assert_eq!(memory.rom_size(), 4 * ROM_BANK_SIZE);
    assert_eq!(memory.write_bank_register(0x2000, 0x00), BankSwitch::Applied(0));
}

#[test]
fn rom_bank0_reads_ignore_bank_state() {
    let mut memory = running(4, 0x19);
    let mut video = VramBuffer::default();
    let mut io = IoRegisterFile::default();
    let mut bus = memory.attach(&mut video, &mut io);

    for bank in [2u8, 0, 3] {
        bus.write8(0x2000, bank);
        for addr in [0x0000u16, 0x0147, 0x1234, 0x3FFF] {
            let expected = if addr == 0x0147 { 0x19 } else { 0 };
            assert_eq!(bus.read8(addr), expected, "bank {bank} addr {addr:#06x}");
        }
        assert_eq!(bus.read8(0x4000), bank);
        assert_eq!(bus.read8(0x7FFF), bank);
    }
}

#[test]
fn two_bank_mbc1_scenario() {
    let mut memory = running(2, 0x01);
    let mut video = VramBuffer::default();
    let mut io = IoRegisterFile::default();
    let mut bus = memory.attach(&mut video, &mut io);

    bus.write8(0x2100, 0x00);
    assert_eq!(bus.memory().current_bank(), Some(1));
    assert_eq!(bus.read8(0x4000), 1);

    bus.write8(0x2100, 0x02);
    assert_eq!(bus.memory().current_bank(), Some(1));
    assert_eq!(bus.memory().rom_bank_base(), Some(ROM_BANK_SIZE));
    assert_eq!(bus.read8(0x4000), 1);
}

#[test]
fn write_bank_register_reports_outcome() {
    let mut memory = running(2, 0x11);
    assert_eq!(memory.write_bank_register(0x2100, 0x01), BankSwitch::Applied(1));
    assert_eq!(
        memory.write_bank_register(0x2100, 0x05),
        BankSwitch::Rejected(SwitchRejection::OutOfRange {
            bank: 5,
            rom_size: 2 * ROM_BANK_SIZE,
        })
    );
}

#[test]
fn unknown_header_type_uses_mbc5_rules() {
    let mut memory = running(4, 0x42);
    assert_eq!(memory.controller(), BankController::Mbc5);
    assert_eq!(memory.write_bank_register(0x2000, 0x00), BankSwitch::Applied(0));
}

#[test]
fn working_ram_echo_mirrors_both_banks() {
    let mut memory = running(2, 0x00);
    let mut video = VramBuffer::default();
    let mut io = IoRegisterFile::default();
    let mut bus = memory.attach(&mut video, &mut io);

    bus.write8(0xC010, 0x5A);
    assert_eq!(bus.read8(0xE010), 0x5A);

    bus.write8(0xD123, 0xA5);
    assert_eq!(bus.read8(0xF123), 0xA5);

    bus.write8(0xFDFF, 0x77);
    assert_eq!(bus.read8(0xDDFF), 0x77);

    bus.write8(0xEFFF, 0x01);
    assert_eq!(bus.read8(0xCFFF), 0x01);
    assert_eq!(bus.read8(0xDFFF), 0x00);
}

#[test]
fn high_ram_is_independent_of_banking() {
    let mut memory = running(4, 0x01);
    let mut video = VramBuffer::default();
    let mut io = IoRegisterFile::default();
    let mut bus = memory.attach(&mut video, &mut io);

    bus.write8(0xFF80, 0x01);
    bus.write8(0xFFFE, 0x7E);
    bus.write8(0x2000, 0x03);
    assert_eq!(bus.read8(0xFF80), 0x01);
    assert_eq!(bus.read8(0xFFFE), 0x7E);
    assert_eq!(bus.memory().high_ram()[0], 0x01);
    assert_eq!(bus.memory().high_ram()[0x7E], 0x7E);
}

#[test]
fn vram_stores_go_to_video_and_notify() {
    let mut memory = running(2, 0x00);
    let mut video = VramBuffer::default();
    let mut io = IoRegisterFile::default();
    {
        let mut bus = memory.attach(&mut video, &mut io);
        bus.write8(0x8000, 0x10);
        bus.write8(0x9FFF, 0x20);
        assert_eq!(bus.read8(0x8000), 0x10);
        assert_eq!(bus.read8(0x9FFF), 0x20);
    }
    assert_eq!(video.writes, vec![0x0000, 0x1FFF]);
    assert_eq!(video.vram()[0x1FFF], 0x20);
}

#[test]
fn io_and_interrupt_enable_are_delegated() {
    let mut memory = running(2, 0x00);
    let mut video = VramBuffer::default();
    let mut io = IoRegisterFile::default();
    {
        let mut bus = memory.attach(&mut video, &mut io);
        bus.write8(0xFF00, 0x30);
        bus.write8(0xFF7F, 0x44);
        bus.write8(0xFFFF, 0x1F);
        assert_eq!(bus.read8(0xFF00), 0x30);
        assert_eq!(bus.read8(0xFF7F), 0x44);
        assert_eq!(bus.read8(0xFFFF), 0x1F);
    }
    assert_eq!(io.interrupt_enable(), 0x1F);
    assert_eq!(io.io_read(0x7F), 0x44);
}

#[test]
fn placeholder_regions_read_zero_and_drop_writes() {
    let mut memory = running(2, 0x00);
    let mut video = VramBuffer::default();
    let mut io = IoRegisterFile::default();
    let mut bus = memory.attach(&mut video, &mut io);

    for addr in [0xA000u16, 0xBFFF, 0xFE00, 0xFE9F, 0xFEA0, 0xFEFF] {
        bus.write8(addr, 0xFF);
        assert_eq!(bus.read8(addr), 0, "{addr:#06x}");
    }
}

#[test]
fn wide_accesses_are_not_modelled() {
    let mut memory = running(2, 0x00);
    let mut video = VramBuffer::default();
    let mut io = IoRegisterFile::default();
    let mut bus = memory.attach(&mut video, &mut io);

    bus.write16(0xC000, 0xBEEF);
    assert_eq!(bus.read8(0xC000), 0);
    assert_eq!(bus.read8(0xC001), 0);
    bus.write8(0xC000, 0x12);
    assert_eq!(bus.read16(0xC000), 0);
}

#[test]
fn inert_session_reads_open_bus() {
    let mut memory = MemoryState::default();
    let mut video = VramBuffer::default();
    let mut io = IoRegisterFile::default();
    let mut bus = memory.attach(&mut video, &mut io);

    bus.write8(0xC000, 0x12);
    bus.write8(0x2000, 0x02);
    assert_eq!(bus.read8(0x0000), 0xFF);
    assert_eq!(bus.read8(0x4000), 0xFF);
    assert_eq!(bus.read8(0xC000), 0xFF);
}

#[test]
fn traced_accesses_are_keyed_by_pc() {
    let config = MemoryConfig::builder().trace_on_reset(true).build();
    let mut memory = MemoryState::init(config);
    memory.load_rom(banked_rom(2));
    memory.reset().unwrap();

    let mut video = VramBuffer::default();
    let mut io = IoRegisterFile::default();
    {
        let mut bus = memory.attach(&mut video, &mut io);
        bus.begin_instruction(0x0150);
        bus.write8(0xC000, 0x42);
        bus.begin_instruction(0x0153);
        let _ = bus.read8(0xC000);
    }

    let events = decode_events(memory.tracer_mut().take_bytes().as_slice()).unwrap();
    assert_eq!(
        events,
        vec![
            TraceEvent::Write(MemoryEvent {
                pc: 0x0150,
                address: 0xC000,
                value: 0x42,
                size: 1,
            }),
            TraceEvent::Read(MemoryEvent {
                pc: 0x0153,
                address: 0xC000,
                value: 0x42,
                size: 1,
            }),
        ]
    );
}

#[test]
fn region_table_covers_every_address_once() {
    for addr in 0..=u16::MAX {
        let region = Region::of(addr);
        assert!(region.range().contains(&addr), "{addr:#06x} -> {region:?}");
    }

    let mut next = 0u32;
    for region in Region::ALL {
        let range = region.range();
        assert_eq!(*range.start() as u32, next, "{region:?}");
        next = *range.end() as u32 + 1;
    }
    assert_eq!(next, 0x1_0000);
}

#[test]
fn region_boundaries() {
    let cases = [
        (0x3FFF, Region::RomBank0),
        (0x4000, Region::RomBankN),
        (0x7FFF, Region::RomBankN),
        (0x8000, Region::VideoRam),
        (0xA000, Region::ExternalRam),
        (0xC000, Region::WorkingRamBank0),
        (0xD000, Region::WorkingRamBankN),
        (0xE000, Region::EchoBank0),
        (0xF000, Region::EchoBankN),
        (0xFDFF, Region::EchoBankN),
        (0xFE00, Region::Oam),
        (0xFE9F, Region::Oam),
        (0xFEA0, Region::Unusable),
        (0xFF00, Region::Io),
        (0xFF7F, Region::Io),
        (0xFF80, Region::HighRam),
        (0xFFFE, Region::HighRam),
        (0xFFFF, Region::InterruptEnable),
    ];
    for (addr, region) in cases {
        assert_eq!(Region::of(addr), region, "{addr:#06x}");
    }
}
