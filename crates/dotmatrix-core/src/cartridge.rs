//! Cartridge mappers (MBC) and ROM/RAM/RTC handling.
//!
//! The ROM image is owned here and never mutated; the active mapper variant
//! carries its own banking state as one arm of [`MbcState`]. Battery-backed
//! RAM persists as a raw `.sav` dump next to the ROM, and the MBC3 real-time
//! clock as a `.sav.rtc` sidecar holding its five registers plus the
//! wall-clock timestamp of the save.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

use thiserror::Error;

/// Minimum image size: the header region must be present in full.
const MIN_ROM_LEN: usize = 0x150;

const ROM_BANK_SIZE: usize = 0x4000;
const RAM_BANK_SIZE: usize = 0x2000;

/// Length of the RTC sidecar: five register bytes plus a 64-bit little-endian
/// UNIX timestamp.
const RTC_SIDECAR_LEN: usize = 13;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("ROM image too small ({0} bytes; header needs 0x150)")]
    RomTooSmall(usize),
    #[error("failed to read ROM: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to write save data: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MbcKind {
    RomOnly,
    Mbc1,
    Mbc2,
    Mbc3,
    Mbc5,
}

#[derive(Debug)]
enum MbcState {
    RomOnly,
    Mbc1 {
        rom_bank: u8,
        ram_bank: u8,
        mode: u8,
        ram_enable: bool,
        multicart: bool,
    },
    Mbc2 {
        rom_bank: u8,
        ram_enable: bool,
    },
    Mbc3 {
        rom_bank: u8,
        ram_bank: u8,
        ram_enable: bool,
        rtc: Option<Rtc>,
    },
    Mbc5 {
        rom_bank: u16,
        ram_bank: u8,
        ram_enable: bool,
        rumble: bool,
    },
}

#[derive(Debug, Clone, Copy, Default)]
struct RtcRegs {
    seconds: u8,
    minutes: u8,
    hours: u8,
    days: u16,
    halt: bool,
    carry: bool,
}

impl RtcRegs {
    fn control_byte(&self) -> u8 {
        let mut out = ((self.days >> 8) as u8) & 0x01;
        if self.halt {
            out |= 0x40;
        }
        if self.carry {
            out |= 0x80;
        }
        out
    }

    fn read(&self, reg: u8) -> u8 {
        match reg {
            0x08 => self.seconds & 0x3F,
            0x09 => self.minutes & 0x3F,
            0x0A => self.hours & 0x1F,
            0x0B => (self.days & 0x00FF) as u8,
            0x0C => self.control_byte(),
            _ => 0xFF,
        }
    }

    fn write(&mut self, reg: u8, val: u8) {
        match reg {
            0x08 => self.seconds = val & 0x3F,
            0x09 => self.minutes = val & 0x3F,
            0x0A => self.hours = val & 0x1F,
            0x0B => self.days = (self.days & 0x0100) | val as u16,
            0x0C => {
                self.days = (self.days & 0x00FF) | (((val & 0x01) as u16) << 8);
                self.halt = val & 0x40 != 0;
                self.carry = val & 0x80 != 0;
            }
            _ => {}
        }
    }

    fn advance_seconds(&mut self, secs: u64) {
        let total_seconds = self.seconds as u64 + secs;
        self.seconds = (total_seconds % 60) as u8;
        let total_minutes = self.minutes as u64 + total_seconds / 60;
        self.minutes = (total_minutes % 60) as u8;
        let total_hours = self.hours as u64 + total_minutes / 60;
        self.hours = (total_hours % 24) as u8;
        let total_days = self.days as u64 + total_hours / 24;
        if total_days > 0x01FF {
            self.carry = true;
        }
        self.days = (total_days & 0x01FF) as u16;
    }
}

/// MBC3 real-time clock.
///
/// In-session progression uses the monotonic clock; the persisted sidecar
/// records wall-clock time so the elapsed delta can be replayed on load.
/// The day counter is its own 9-bit register, never derived from the host
/// calendar.
#[derive(Debug)]
struct Rtc {
    regs: RtcRegs,
    latched: RtcRegs,
    /// A 0x00 write to the latch port was seen; 0x01 completes the edge.
    latch_armed: bool,
    last_tick: Instant,
    subsec: Duration,
}

impl Rtc {
    fn new() -> Self {
        let regs = RtcRegs::default();
        Self {
            regs,
            latched: regs,
            latch_armed: false,
            last_tick: Instant::now(),
            subsec: Duration::ZERO,
        }
    }

    /// Fold elapsed monotonic time into the registers. While halted the
    /// elapsed time is discarded, so clearing halt restarts from "now".
    fn refresh(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick);
        self.last_tick = now;
        if self.regs.halt {
            return;
        }
        let total = self.subsec + elapsed;
        let secs = total.as_secs();
        self.subsec = total - Duration::from_secs(secs);
        if secs > 0 {
            self.regs.advance_seconds(secs);
        }
    }

    /// Latch-port write. Only 0x00 and 0x01 participate in the edge; other
    /// values are ignored outright.
    fn latch_write(&mut self, val: u8) {
        match val {
            0x00 => self.latch_armed = true,
            0x01 => {
                if self.latch_armed {
                    self.refresh();
                    self.latched = self.regs;
                    self.latch_armed = false;
                }
            }
            _ => {}
        }
    }

    fn read_latched(&self, reg: u8) -> u8 {
        self.latched.read(reg)
    }

    fn write_register(&mut self, reg: u8, val: u8) {
        self.refresh();
        self.regs.write(reg, val);
        if reg == 0x08 {
            // A seconds write resets the sub-second phase.
            self.subsec = Duration::ZERO;
        }
        self.latched = self.regs;
    }

    fn serialize(&self) -> [u8; RTC_SIDECAR_LEN] {
        let mut out = [0u8; RTC_SIDECAR_LEN];
        out[0] = self.regs.seconds & 0x3F;
        out[1] = self.regs.minutes & 0x3F;
        out[2] = self.regs.hours & 0x1F;
        out[3] = (self.regs.days & 0x00FF) as u8;
        out[4] = self.regs.control_byte();
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        out[5..13].copy_from_slice(&now.to_le_bytes());
        out
    }

    /// Restore registers from a sidecar and replay the wall-clock delta
    /// since the save. Returns false if the sidecar is malformed.
    fn load_from_bytes(&mut self, data: &[u8]) -> bool {
        if data.len() < RTC_SIDECAR_LEN {
            return false;
        }
        self.regs.seconds = data[0] & 0x3F;
        self.regs.minutes = data[1] & 0x3F;
        self.regs.hours = data[2] & 0x1F;
        self.regs.days = data[3] as u16;
        self.regs.write(0x0C, data[4]);
        let saved = u64::from_le_bytes(data[5..13].try_into().unwrap());
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        if !self.regs.halt {
            self.regs.advance_seconds(now.saturating_sub(saved));
        }
        self.last_tick = Instant::now();
        self.subsec = Duration::ZERO;
        self.latched = self.regs;
        true
    }
}

#[derive(Debug)]
pub struct Cartridge {
    pub rom: Vec<u8>,
    pub ram: Vec<u8>,
    pub mbc: MbcKind,
    pub title: String,
    cart_type: u8,
    save_path: Option<PathBuf>,
    rtc_path: Option<PathBuf>,
    state: MbcState,
}

impl Cartridge {
    /// Parse a raw image. Unknown cartridge type codes fall back to ROM-only
    /// with a warning; a bad header checksum is logged but not fatal.
    pub fn load(data: Vec<u8>) -> Result<Self, LoadError> {
        if data.len() < MIN_ROM_LEN {
            return Err(LoadError::RomTooSmall(data.len()));
        }
        let header = Header::parse(&data);

        let cart_type = header.cart_type();
        let mbc = match header.mbc_kind() {
            Some(kind) => kind,
            None => {
                log::warn!(
                    "unknown cartridge type {cart_type:#04X}, falling back to ROM-only"
                );
                MbcKind::RomOnly
            }
        };
        if !header.checksum_ok() {
            log::warn!("header checksum mismatch (got {:#04X})", header.checksum());
        }

        let ram_size = header.ram_size();
        let title = header.title();
        let state = match mbc {
            MbcKind::RomOnly => MbcState::RomOnly,
            MbcKind::Mbc1 => MbcState::Mbc1 {
                rom_bank: 1,
                ram_bank: 0,
                mode: 0,
                ram_enable: false,
                multicart: detect_mbc1_multicart(&data),
            },
            MbcKind::Mbc2 => MbcState::Mbc2 {
                rom_bank: 1,
                ram_enable: false,
            },
            MbcKind::Mbc3 => MbcState::Mbc3 {
                rom_bank: 1,
                ram_bank: 0,
                ram_enable: false,
                rtc: header.has_rtc().then(Rtc::new),
            },
            MbcKind::Mbc5 => MbcState::Mbc5 {
                rom_bank: 1,
                ram_bank: 0,
                ram_enable: false,
                rumble: matches!(cart_type, 0x1C..=0x1E),
            },
        };

        log::debug!(
            "loaded ROM \"{title}\" ({:?}, {} KiB ROM, {} KiB RAM)",
            mbc,
            data.len() / 1024,
            ram_size / 1024
        );

        Ok(Self {
            rom: data,
            ram: vec![0; ram_size],
            mbc,
            title,
            cart_type,
            save_path: None,
            rtc_path: None,
            state,
        })
    }

    /// Parse a raw image with an explicit RAM size (tests and tooling).
    pub fn from_bytes_with_ram(data: Vec<u8>, ram_size: usize) -> Result<Self, LoadError> {
        let mut cart = Self::load(data)?;
        cart.ram = vec![0; ram_size];
        Ok(cart)
    }

    /// Load a ROM from disk, picking up sibling battery/RTC state if present.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let data = fs::read(&path)?;
        let mut cart = Self::load(data)?;

        if cart.has_battery() {
            let mut save = PathBuf::from(path.as_ref());
            save.set_extension("sav");
            cart.save_path = Some(save.clone());
            if let Ok(bytes) = fs::read(&save) {
                for (dst, src) in cart.ram.iter_mut().zip(bytes.iter()) {
                    *dst = *src;
                }
            }
        }

        if cart.has_rtc() {
            let mut save = PathBuf::from(path.as_ref());
            save.set_extension("sav");
            let rtc_path = sidecar_rtc_path(&save);
            cart.rtc_path = Some(rtc_path.clone());
            if let Some(rtc) = cart.rtc_mut() {
                if let Ok(bytes) = fs::read(&rtc_path) {
                    if !rtc.load_from_bytes(&bytes) {
                        log::warn!("malformed RTC sidecar {}", rtc_path.display());
                    }
                }
            }
        }

        Ok(cart)
    }

    /// Cartridge-space read: 0x0000-0x7FFF ROM, 0xA000-0xBFFF RAM/RTC.
    pub fn read(&mut self, addr: u16) -> u8 {
        let rom_bank_count = (self.rom.len() / ROM_BANK_SIZE).max(1);
        match (&mut self.state, addr) {
            (MbcState::RomOnly, 0x0000..=0x7FFF) => {
                self.rom.get(addr as usize).copied().unwrap_or(0xFF)
            }
            (MbcState::Mbc1 { ram_bank, mode, multicart, .. }, 0x0000..=0x3FFF) => {
                // Simple mode pins the lower window to bank 0; advanced mode
                // lets the upper register select banks 0x20/0x40/0x60.
                let bank = if *mode == 0 {
                    0
                } else if *multicart {
                    (((*ram_bank as usize) & 0x03) << 4) % rom_bank_count
                } else {
                    (((*ram_bank as usize) & 0x03) << 5) % rom_bank_count
                };
                let offset = bank * ROM_BANK_SIZE + addr as usize;
                self.rom.get(offset).copied().unwrap_or(0xFF)
            }
            (MbcState::Mbc1 { rom_bank, ram_bank, multicart, .. }, 0x4000..=0x7FFF) => {
                let bank = if *multicart {
                    let high = ((*ram_bank as usize) & 0x03) << 4;
                    let low = (*rom_bank as usize) & 0x0F;
                    (high | low) % rom_bank_count
                } else {
                    let high = ((*ram_bank as usize) & 0x03) << 5;
                    (high | (*rom_bank as usize & 0x1F)) % rom_bank_count
                };
                let offset = bank * ROM_BANK_SIZE + (addr as usize - 0x4000);
                self.rom.get(offset).copied().unwrap_or(0xFF)
            }
            (MbcState::Mbc2 { .. }, 0x0000..=0x3FFF)
            | (MbcState::Mbc3 { .. }, 0x0000..=0x3FFF)
            | (MbcState::Mbc5 { .. }, 0x0000..=0x3FFF) => {
                self.rom.get(addr as usize).copied().unwrap_or(0xFF)
            }
            (MbcState::Mbc2 { rom_bank, .. }, 0x4000..=0x7FFF) => {
                let bank = (*rom_bank as usize & 0x0F).max(1) % rom_bank_count;
                let offset = bank * ROM_BANK_SIZE + (addr as usize - 0x4000);
                self.rom.get(offset).copied().unwrap_or(0xFF)
            }
            (MbcState::Mbc3 { rom_bank, .. }, 0x4000..=0x7FFF) => {
                let bank = (*rom_bank as usize).max(1) % rom_bank_count;
                let offset = bank * ROM_BANK_SIZE + (addr as usize - 0x4000);
                self.rom.get(offset).copied().unwrap_or(0xFF)
            }
            (MbcState::Mbc5 { rom_bank, .. }, 0x4000..=0x7FFF) => {
                // MBC5 does not remap bank 0.
                let bank = (*rom_bank as usize) % rom_bank_count;
                let offset = bank * ROM_BANK_SIZE + (addr as usize - 0x4000);
                self.rom.get(offset).copied().unwrap_or(0xFF)
            }
            (MbcState::RomOnly, 0xA000..=0xBFFF) => {
                let idx = addr as usize - 0xA000;
                self.ram.get(idx).copied().unwrap_or(0xFF)
            }
            (MbcState::Mbc1 { ram_enable, ram_bank, mode, .. }, 0xA000..=0xBFFF) => {
                if !*ram_enable {
                    return 0xFF;
                }
                let bank = if *mode == 0 { 0 } else { (*ram_bank as usize) & 0x03 };
                let idx = bank * RAM_BANK_SIZE + addr as usize - 0xA000;
                self.ram.get(idx).copied().unwrap_or(0xFF)
            }
            (MbcState::Mbc2 { ram_enable, .. }, 0xA000..=0xBFFF) => {
                if !*ram_enable {
                    return 0xFF;
                }
                // 512x4-bit internal RAM, mirrored across the whole window.
                // Upper bits of each nibble read as 1.
                let idx = (addr as usize - 0xA000) & 0x01FF;
                let nibble = self.ram.get(idx).copied().unwrap_or(0x0F) & 0x0F;
                0xF0 | nibble
            }
            (MbcState::Mbc3 { ram_enable, ram_bank, rtc, .. }, 0xA000..=0xBFFF) => {
                if !*ram_enable {
                    return 0xFF;
                }
                match *ram_bank {
                    0x00..=0x07 => {
                        let idx = (*ram_bank as usize) * RAM_BANK_SIZE + addr as usize - 0xA000;
                        self.ram.get(idx).copied().unwrap_or(0xFF)
                    }
                    0x08..=0x0C => rtc
                        .as_ref()
                        .map(|r| r.read_latched(*ram_bank))
                        .unwrap_or(0xFF),
                    _ => 0xFF,
                }
            }
            (MbcState::Mbc5 { ram_enable, ram_bank, .. }, 0xA000..=0xBFFF) => {
                if !*ram_enable {
                    return 0xFF;
                }
                let idx = (*ram_bank as usize) * RAM_BANK_SIZE + addr as usize - 0xA000;
                self.ram.get(idx).copied().unwrap_or(0xFF)
            }
            _ => 0xFF,
        }
    }

    /// Cartridge-space write: mapper control in 0x0000-0x7FFF, RAM/RTC in
    /// 0xA000-0xBFFF.
    pub fn write(&mut self, addr: u16, val: u8) {
        match (&mut self.state, addr) {
            (MbcState::RomOnly, 0xA000..=0xBFFF) => {
                let idx = addr as usize - 0xA000;
                if let Some(b) = self.ram.get_mut(idx) {
                    *b = val;
                }
            }
            (MbcState::Mbc1 { ram_enable, .. }, 0x0000..=0x1FFF) => {
                *ram_enable = val & 0x0F == 0x0A;
            }
            (MbcState::Mbc1 { rom_bank, multicart, .. }, 0x2000..=0x3FFF) => {
                // Bank 0 is silently remapped to 1, so 0x00/0x20/0x40/0x60
                // become 0x01/0x21/0x41/0x61 once the upper bits are applied.
                let mask = if *multicart { 0x0F } else { 0x1F };
                *rom_bank = val & mask;
                if *rom_bank == 0 {
                    *rom_bank = 1;
                }
            }
            (MbcState::Mbc1 { ram_bank, .. }, 0x4000..=0x5FFF) => {
                *ram_bank = val & 0x03;
            }
            (MbcState::Mbc1 { mode, .. }, 0x6000..=0x7FFF) => {
                *mode = val & 0x01;
            }
            (MbcState::Mbc1 { ram_enable, ram_bank, mode, .. }, 0xA000..=0xBFFF) => {
                if *ram_enable {
                    let bank = if *mode == 0 { 0 } else { (*ram_bank as usize) & 0x03 };
                    let idx = bank * RAM_BANK_SIZE + addr as usize - 0xA000;
                    if let Some(b) = self.ram.get_mut(idx) {
                        *b = val;
                    }
                }
            }
            (MbcState::Mbc2 { rom_bank, ram_enable }, 0x0000..=0x3FFF) => {
                // Address bit 8 selects between the RAM gate and the ROM bank
                // register across the whole range.
                if addr & 0x0100 == 0 {
                    *ram_enable = val & 0x0F == 0x0A;
                } else {
                    *rom_bank = val & 0x0F;
                    if *rom_bank == 0 {
                        *rom_bank = 1;
                    }
                }
            }
            (MbcState::Mbc2 { ram_enable, .. }, 0xA000..=0xBFFF) => {
                if *ram_enable {
                    let idx = (addr as usize - 0xA000) & 0x01FF;
                    if let Some(b) = self.ram.get_mut(idx) {
                        *b = val & 0x0F;
                    }
                }
            }
            (MbcState::Mbc3 { ram_enable, .. }, 0x0000..=0x1FFF) => {
                *ram_enable = val & 0x0F == 0x0A;
            }
            (MbcState::Mbc3 { rom_bank, .. }, 0x2000..=0x3FFF) => {
                *rom_bank = val & 0x7F;
                if *rom_bank == 0 {
                    *rom_bank = 1;
                }
            }
            (MbcState::Mbc3 { ram_bank, .. }, 0x4000..=0x5FFF) => {
                *ram_bank = val;
            }
            (MbcState::Mbc3 { rtc, .. }, 0x6000..=0x7FFF) => {
                if let Some(rtc) = rtc {
                    rtc.latch_write(val);
                }
            }
            (MbcState::Mbc3 { ram_enable, ram_bank, rtc, .. }, 0xA000..=0xBFFF) => {
                if *ram_enable {
                    match *ram_bank {
                        0x00..=0x07 => {
                            let idx =
                                (*ram_bank as usize) * RAM_BANK_SIZE + addr as usize - 0xA000;
                            if let Some(b) = self.ram.get_mut(idx) {
                                *b = val;
                            }
                        }
                        0x08..=0x0C => {
                            if let Some(rtc) = rtc.as_mut() {
                                rtc.write_register(*ram_bank, val);
                            }
                        }
                        _ => {}
                    }
                }
            }
            (MbcState::Mbc5 { ram_enable, .. }, 0x0000..=0x1FFF) => {
                *ram_enable = val & 0x0F == 0x0A;
            }
            (MbcState::Mbc5 { rom_bank, .. }, 0x2000..=0x2FFF) => {
                *rom_bank = (*rom_bank & 0x100) | val as u16;
            }
            (MbcState::Mbc5 { rom_bank, .. }, 0x3000..=0x3FFF) => {
                *rom_bank = (*rom_bank & 0x0FF) | (((val & 0x01) as u16) << 8);
            }
            (MbcState::Mbc5 { ram_bank, rumble, .. }, 0x4000..=0x5FFF) => {
                if *rumble {
                    // Bit 3 drives the rumble motor; only bits 0-2 bank RAM.
                    *ram_bank = val & 0x07;
                } else {
                    *ram_bank = val & 0x0F;
                }
            }
            (MbcState::Mbc5 { ram_enable, ram_bank, .. }, 0xA000..=0xBFFF) => {
                if *ram_enable {
                    let idx = (*ram_bank as usize) * RAM_BANK_SIZE + addr as usize - 0xA000;
                    if let Some(b) = self.ram.get_mut(idx) {
                        *b = val;
                    }
                }
            }
            _ => {}
        }
    }

    pub fn has_battery(&self) -> bool {
        matches!(
            self.cart_type,
            0x03 | 0x06 | 0x0F | 0x10 | 0x13 | 0x1B | 0x1E
        )
    }

    pub fn has_rtc(&self) -> bool {
        matches!(self.cart_type, 0x0F | 0x10)
    }

    fn rtc_mut(&mut self) -> Option<&mut Rtc> {
        match &mut self.state {
            MbcState::Mbc3 { rtc: Some(rtc), .. } => Some(rtc),
            _ => None,
        }
    }

    /// Write battery RAM (and the RTC sidecar, if any) back to disk.
    pub fn save_ram(&mut self) -> Result<(), SaveError> {
        if let (true, Some(path)) = (self.has_battery(), &self.save_path) {
            if !self.ram.is_empty() {
                fs::write(path, &self.ram)?;
            }
        }
        let rtc_path = self.rtc_path.clone();
        if let (Some(path), Some(rtc)) = (rtc_path, self.rtc_mut()) {
            rtc.refresh();
            fs::write(path, rtc.serialize())?;
        }
        Ok(())
    }

    /// Override the persistence paths (tests and frontends that relocate
    /// save data).
    pub fn set_save_paths(&mut self, save: PathBuf) {
        self.rtc_path = self.has_rtc().then(|| sidecar_rtc_path(&save));
        self.save_path = Some(save);
    }

    /// Re-read battery RAM and RTC state from the configured paths.
    pub fn load_saved_state(&mut self) {
        if let Some(path) = self.save_path.clone() {
            if let Ok(bytes) = fs::read(path) {
                for (dst, src) in self.ram.iter_mut().zip(bytes.iter()) {
                    *dst = *src;
                }
            }
        }
        if let Some(path) = self.rtc_path.clone() {
            if let Some(rtc) = self.rtc_mut() {
                if let Ok(bytes) = fs::read(&path) {
                    if !rtc.load_from_bytes(&bytes) {
                        log::warn!("malformed RTC sidecar {}", path.display());
                    }
                }
            }
        }
    }
}

fn sidecar_rtc_path(save: &Path) -> PathBuf {
    let mut p = save.to_path_buf().into_os_string();
    p.push(".rtc");
    PathBuf::from(p)
}

fn detect_mbc1_multicart(rom: &[u8]) -> bool {
    // Multicart wiring can't be identified from the header; use a
    // conservative heuristic. Multicart dumps repeat the header logo at the
    // start of each sub-game's bank group, and the common wiring is 8 Mbit
    // (64 banks).
    let bank_count = rom.len() / ROM_BANK_SIZE;
    if bank_count != 64 {
        return false;
    }

    let logo0 = match rom.get(0x0104..0x0134) {
        Some(s) if !s.iter().all(|&b| b == 0) => s,
        _ => return false,
    };

    for bank in [16usize, 32, 48] {
        let start = bank * ROM_BANK_SIZE + 0x0104;
        match rom.get(start..start + 0x30) {
            Some(s) if s == logo0 => {}
            _ => return false,
        }
    }

    true
}

/// Borrowing view over the cartridge header at 0x0100-0x014F.
pub struct Header<'a> {
    data: &'a [u8],
}

impl<'a> Header<'a> {
    pub fn parse(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// ASCII title, null padding stripped.
    pub fn title(&self) -> String {
        let end = 0x0144.min(self.data.len());
        let mut slice = &self.data[0x0134.min(self.data.len())..end];
        if let Some(pos) = slice.iter().position(|&b| b == 0) {
            slice = &slice[..pos];
        }
        String::from_utf8_lossy(slice).trim().to_string()
    }

    pub fn cart_type(&self) -> u8 {
        self.data.get(0x0147).copied().unwrap_or(0)
    }

    /// Cartridge-type byte to mapper kind. `None` for unknown codes.
    pub fn mbc_kind(&self) -> Option<MbcKind> {
        match self.cart_type() {
            0x00 => Some(MbcKind::RomOnly),
            0x01..=0x03 => Some(MbcKind::Mbc1),
            0x05 | 0x06 => Some(MbcKind::Mbc2),
            0x0F..=0x13 => Some(MbcKind::Mbc3),
            0x19..=0x1E => Some(MbcKind::Mbc5),
            _ => None,
        }
    }

    pub fn has_rtc(&self) -> bool {
        matches!(self.cart_type(), 0x0F | 0x10)
    }

    /// Declared ROM size in bytes (code n means 32 KiB << n).
    pub fn rom_size(&self) -> usize {
        let code = self.data.get(0x0148).copied().unwrap_or(0).min(8);
        0x8000 << code
    }

    /// Declared external RAM size in bytes. MBC2 carts always report their
    /// internal 512-nibble array.
    pub fn ram_size(&self) -> usize {
        if matches!(self.cart_type(), 0x05 | 0x06) {
            return 0x200;
        }
        match self.data.get(0x0149).copied().unwrap_or(0) {
            0x00 => 0,
            0x01 => 0x800,
            0x02 => 0x2000,
            0x03 => 0x8000,
            0x04 => 0x20000,
            0x05 => 0x10000,
            _ => 0x2000,
        }
    }

    pub fn checksum(&self) -> u8 {
        self.data.get(0x014D).copied().unwrap_or(0)
    }

    /// Verify the header checksum: `x = x - rom[i] - 1` over 0x134..=0x14C.
    pub fn checksum_ok(&self) -> bool {
        if self.data.len() < MIN_ROM_LEN {
            return false;
        }
        let mut x = 0u8;
        for i in 0x0134..=0x014C {
            x = x.wrapping_sub(self.data[i]).wrapping_sub(1);
        }
        x == self.checksum()
    }
}
