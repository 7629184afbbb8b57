use dotmatrix_core::cartridge::Cartridge;
use dotmatrix_core::mmu::Mmu;
use dotmatrix_core::ppu::{MODE_HBLANK, MODE_OAM, MODE_TRANSFER};

#[test]
fn wram_and_echo_mirror() {
    let mut mmu = Mmu::new();
    mmu.write_byte(0xC000, 0xAA);
    assert_eq!(mmu.read_byte(0xC000), 0xAA);
    assert_eq!(mmu.read_byte(0xE000), 0xAA, "echo reads mirror WRAM");
    mmu.write_byte(0xE123, 0xBB);
    assert_eq!(mmu.read_byte(0xC123), 0xBB, "echo writes mirror WRAM");
}

#[test]
fn unusable_region_reads_ff_and_drops_writes() {
    let mut mmu = Mmu::new();
    for addr in 0xFEA0..=0xFEFFu16 {
        mmu.write_byte(addr, 0x12);
        assert_eq!(mmu.read_byte(addr), 0xFF);
    }
}

#[test]
fn vram_blocked_during_transfer() {
    let mut mmu = Mmu::new();
    mmu.ppu.mode = MODE_TRANSFER;
    mmu.write_byte(0x8000, 0x12);
    assert_eq!(mmu.read_byte(0x8000), 0xFF);
    mmu.ppu.mode = MODE_HBLANK;
    mmu.write_byte(0x8000, 0x34);
    assert_eq!(mmu.read_byte(0x8000), 0x34);
}

#[test]
fn oam_blocked_during_scan_and_transfer() {
    let mut mmu = Mmu::new();
    mmu.ppu.mode = MODE_OAM;
    mmu.write_byte(0xFE00, 0x56);
    assert_eq!(mmu.read_byte(0xFE00), 0xFF);
    mmu.ppu.mode = MODE_TRANSFER;
    assert_eq!(mmu.read_byte(0xFE00), 0xFF);
    mmu.ppu.mode = MODE_HBLANK;
    mmu.write_byte(0xFE00, 0x56);
    assert_eq!(mmu.read_byte(0xFE00), 0x56);
}

#[test]
fn if_upper_bits_read_as_one() {
    let mut mmu = Mmu::new();
    mmu.write_byte(0xFF0F, 0x00);
    assert_eq!(mmu.read_byte(0xFF0F), 0xE0);
    mmu.write_byte(0xFF0F, 0xFF);
    assert_eq!(mmu.read_byte(0xFF0F), 0xFF);
}

#[test]
fn div_write_resets_counter() {
    let mut mmu = Mmu::new();
    mmu.advance(512);
    assert_ne!(mmu.read_byte(0xFF04), 0);
    mmu.write_byte(0xFF04, 0x77);
    assert_eq!(mmu.read_byte(0xFF04), 0, "any DIV write resets the counter");
}

#[test]
fn ly_is_read_only_writes_reset() {
    let mut mmu = Mmu::new();
    // Advance a few scanlines.
    mmu.advance(456 * 3);
    assert_eq!(mmu.read_byte(0xFF44), 3);
    mmu.write_byte(0xFF44, 0x90);
    assert_eq!(mmu.read_byte(0xFF44), 0);
}

#[test]
fn stat_mode_bits_are_read_only() {
    let mut mmu = Mmu::new();
    mmu.ppu.mode = MODE_TRANSFER;
    mmu.write_byte(0xFF41, 0xFF);
    let stat = mmu.read_byte(0xFF41);
    assert_eq!(stat & 0x03, MODE_TRANSFER, "mode bits reflect the PPU");
    assert_eq!(stat & 0x78, 0x78, "enable bits are writable");
    assert_eq!(stat & 0x80, 0x80, "bit 7 reads as one");
}

#[test]
fn stat_write_does_not_clear_pending_if() {
    let mut mmu = Mmu::new();
    mmu.if_reg |= 0x02;
    mmu.write_byte(0xFF41, 0x00);
    assert_eq!(mmu.read_byte(0xFF0F) & 0x02, 0x02);
}

#[test]
fn cartridge_rom_and_ram_are_routed() {
    let mut mmu = Mmu::new();
    mmu.load_cart(Cartridge::from_bytes_with_ram(vec![0x42; 0x8000], 0x2000).unwrap());
    assert_eq!(mmu.read_byte(0x0000), 0x42);
    assert_eq!(mmu.read_byte(0x7FFF), 0x42);
    mmu.write_byte(0xA000, 0x55);
    assert_eq!(mmu.read_byte(0xA000), 0x55);
}

#[test]
fn missing_cartridge_reads_ff() {
    let mut mmu = Mmu::new();
    assert_eq!(mmu.read_byte(0x0000), 0xFF);
    assert_eq!(mmu.read_byte(0x4000), 0xFF);
    assert_eq!(mmu.read_byte(0xA000), 0xFF);
}

#[test]
fn oam_dma_copies_after_start_delay() {
    let mut mmu = Mmu::new();
    for i in 0..0xA0u16 {
        mmu.write_byte(0xC000 + i, i as u8);
    }
    mmu.write_byte(0xFF46, 0xC0);
    assert!(mmu.dma_active());

    // Two M-cycles of start delay: nothing lands yet.
    mmu.dma_step(8);
    assert_eq!(mmu.ppu.oam[0x9F], 0x00);

    // 160 M-cycles move the 160 bytes.
    mmu.dma_step(640);
    assert_eq!(mmu.ppu.oam[0x00], 0x00);
    assert_eq!(mmu.ppu.oam[0x42], 0x42);
    assert_eq!(mmu.ppu.oam[0x9F], 0x9F);
    assert!(!mmu.dma_active());
}

#[test]
fn cpu_bus_is_blocked_during_oam_dma() {
    let mut mmu = Mmu::new();
    mmu.write_byte(0xC000, 0x77);
    mmu.write_byte(0xFF80, 0x11);
    mmu.write_byte(0xFF46, 0xC0);
    mmu.dma_step(12); // past the start delay, transfer running

    assert_eq!(mmu.read_byte(0xC000), 0xFF, "WRAM unreachable during DMA");
    assert_eq!(mmu.read_byte(0x8000), 0xFF, "VRAM unreachable during DMA");
    assert_eq!(mmu.read_byte(0xFF80), 0x11, "HRAM stays reachable");

    mmu.write_byte(0xC001, 0x99);
    mmu.dma_step(640);
    assert_eq!(mmu.read_byte(0xC001), 0x00, "blocked write was dropped");
    assert_eq!(mmu.read_byte(0xC000), 0x77, "memory intact after DMA");
}

#[test]
fn oam_dma_from_high_region_wraps_to_wram() {
    let mut mmu = Mmu::new();
    mmu.write_byte(0xDE00, 0xAB);
    // Source 0xFE00 is wired down to 0xDE00 on DMG.
    mmu.write_byte(0xFF46, 0xFE);
    mmu.dma_step(8 + 640);
    assert_eq!(mmu.ppu.oam[0], 0xAB);
}

#[test]
fn serial_stub_completes_against_open_line() {
    let mut mmu = Mmu::new();
    mmu.write_byte(0xFF01, 0x42);
    assert_eq!(mmu.read_byte(0xFF01), 0x42);
    mmu.write_byte(0xFF02, 0x81);
    assert_eq!(mmu.read_byte(0xFF01), 0xFF, "no partner shifts in ones");
    assert_eq!(mmu.read_byte(0xFF02) & 0x80, 0, "transfer flag clears");
    assert_eq!(mmu.if_reg & 0x08, 0x08, "serial interrupt requested");
}

#[test]
fn joypad_register_via_bus() {
    use dotmatrix_core::input::Button;
    let mut mmu = Mmu::new();
    mmu.write_byte(0xFF00, 0x20); // select direction pad
    let mut if_reg = mmu.if_reg;
    mmu.input.set_button(Button::Left, true, &mut if_reg);
    mmu.if_reg = if_reg;
    assert_eq!(mmu.read_byte(0xFF00) & 0x0F, 0x0D);
    assert_eq!(mmu.if_reg & 0x10, 0x10);
}

#[test]
fn unmapped_io_reads_ff() {
    let mut mmu = Mmu::new();
    for addr in [0xFF03u16, 0xFF08, 0xFF4D, 0xFF50, 0xFF70, 0xFF7F] {
        assert_eq!(mmu.read_byte(addr), 0xFF, "addr {addr:#06X}");
    }
}
