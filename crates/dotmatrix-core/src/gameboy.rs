//! High-level facade that wires the CPU and memory bus into a single
//! machine and implements the cooperative step order: one CPU instruction,
//! then the timer, PPU and DMA engine advance by the same T-cycle count.

use crate::{
    cartridge::Cartridge,
    cpu::{Cpu, StepError},
    input::Button,
    mmu::Mmu,
};

pub struct GameBoy {
    pub cpu: Cpu,
    pub mmu: Mmu,
}

impl GameBoy {
    /// A machine in the post-boot state with no cartridge.
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            mmu: Mmu::new(),
        }
    }

    pub fn load_cartridge(&mut self, cart: Cartridge) {
        log::debug!("inserting cartridge \"{}\"", cart.title);
        self.mmu.load_cart(cart);
    }

    /// Execute one CPU step and advance the rest of the machine by the
    /// cycles it consumed. Returns the T-cycles elapsed.
    pub fn step(&mut self) -> Result<u64, StepError> {
        let cycles = self.cpu.step(&mut self.mmu)?;
        self.mmu.advance(cycles as u32);
        Ok(cycles)
    }

    /// Run until the PPU finishes the current frame (VBlank entry).
    pub fn run_frame(&mut self) -> Result<(), StepError> {
        loop {
            self.step()?;
            if self.mmu.ppu.take_frame_ready() {
                return Ok(());
            }
        }
    }

    /// The last completed 160x144 ARGB8888 frame, row-major.
    pub fn frame(&self) -> &[u32] {
        &self.mmu.ppu.framebuffer
    }

    /// Driver-side joypad update.
    pub fn set_button(&mut self, button: Button, pressed: bool) {
        self.mmu
            .input
            .set_button(button, pressed, &mut self.mmu.if_reg);
    }

    /// Persist battery RAM and RTC state, if the cartridge has any.
    /// Save failures are logged, never fatal.
    pub fn save_ram(&mut self) {
        self.mmu.save_cart_ram();
    }

    /// Reset to the post-boot state, keeping the loaded cartridge.
    pub fn reset(&mut self) {
        let cart = self.mmu.cart.take();
        self.cpu = Cpu::new();
        self.mmu = Mmu::new();
        if let Some(c) = cart {
            self.mmu.load_cart(c);
        }
    }
}

impl Default for GameBoy {
    fn default() -> Self {
        Self::new()
    }
}
