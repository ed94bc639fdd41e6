use std::fs;
use std::path::Path;

use super::cartridge::Cartridge;
use super::config::GameBoyConfig;
use super::joypad::JoypadState;
use super::pacing::FramePacer;
use super::ppu::FRAME_DOTS;
use super::MemoryBus;
use crate::cpu::Cpu;
use crate::frontend::{Display, Input};
use crate::GbError;

/// High-level Game Boy machine.
///
/// Owns the CPU and the bus (which in turn owns every device). Time only
/// moves inside [`GameBoy::step`]: the CPU runs one instruction, then the
/// devices are advanced by exactly the cycles it reported.
pub struct GameBoy {
    pub cpu: Cpu,
    pub(crate) bus: MemoryBus,
    config: GameBoyConfig,
    cycles_per_frame: u32,
    /// Clocks already spent past the last budget-limited frame.
    overshoot: u32,
}

impl Default for GameBoy {
    fn default() -> Self {
        Self::new()
    }
}

impl GameBoy {
    pub fn new() -> Self {
        Self::with_config(GameBoyConfig::default())
    }

    pub fn with_config(mut config: GameBoyConfig) -> Self {
        if !config.has_valid_frame_rate() {
            log::warn!(
                "invalid frame rate {}, using {:.4}",
                config.frame_rate,
                config.effective_frame_rate()
            );
            config.frame_rate = config.effective_frame_rate();
        }
        let cycles_per_frame = config.cycles_per_frame();
        if cycles_per_frame != FRAME_DOTS {
            log::debug!(
                "LCD-off frames run {cycles_per_frame} cycles, LCD frames are {FRAME_DOTS} dots"
            );
        }
        Self {
            cpu: Cpu::new(),
            bus: MemoryBus::new(),
            config,
            cycles_per_frame,
            overshoot: 0,
        }
    }

    pub fn config(&self) -> &GameBoyConfig {
        &self.config
    }

    /// Power-cycle the machine. The inserted cartridge survives.
    pub fn reset(&mut self) {
        let cartridge = self.bus.cartridge.take();
        self.cpu.reset();
        self.bus = MemoryBus::new();
        self.overshoot = 0;
        if let Some(cartridge) = cartridge {
            self.bus.insert_cartridge(cartridge);
        }
    }

    /// Parse `rom` and insert it, replacing any previous cartridge.
    pub fn load_cartridge(&mut self, rom: &[u8]) -> Result<(), GbError> {
        let cartridge = Cartridge::from_bytes(rom)?;
        self.cpu.reset();
        self.bus = MemoryBus::new();
        self.overshoot = 0;
        self.bus.insert_cartridge(cartridge);
        Ok(())
    }

    pub fn load_cartridge_file(&mut self, path: impl AsRef<Path>) -> Result<(), GbError> {
        let path = path.as_ref();
        let rom = fs::read(path).map_err(|err| {
            GbError::InvalidRom(format!("cannot read {}: {err}", path.display()))
        })?;
        self.load_cartridge(&rom)
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.bus.cartridge()
    }

    /// Execute one instruction (plus any interrupt dispatch it unblocks)
    /// and advance the devices to match. Returns the clocks consumed.
    pub fn step(&mut self) -> Result<u32, GbError> {
        let cycles = self.cpu.step(&mut self.bus)?;
        self.bus.advance(cycles);

        let irq_cycles = self.cpu.handle_interrupts(&mut self.bus);
        if irq_cycles > 0 {
            self.bus.advance(irq_cycles);
        }
        Ok(cycles + irq_cycles)
    }

    /// Run until the LCD wraps from VBlank back to line 0 and return
    /// `true`; the framebuffer then holds exactly one finished frame.
    ///
    /// While the LCD is off no frame ever completes, so the call instead
    /// returns `false` once the configured cycle budget is spent. Clocks
    /// run past that budget are charged to the next call.
    pub fn step_frame(&mut self) -> Result<bool, GbError> {
        let mut elapsed = self.overshoot;
        loop {
            elapsed += self.step()?;
            if self.bus.ppu.take_frame_ready() {
                self.overshoot = 0;
                return Ok(true);
            }
            if elapsed >= self.cycles_per_frame && !self.bus.ppu.lcd_enabled() {
                self.overshoot = (elapsed - self.cycles_per_frame).min(self.cycles_per_frame);
                return Ok(false);
            }
        }
    }

    /// Blocking main loop.
    ///
    /// Polls `input` once per frame, hands every completed frame to
    /// `display` and sleeps to hold the configured frame rate. Returns
    /// when `input` asks to stop, or with the first fatal error.
    pub fn run<D: Display, I: Input>(
        &mut self,
        display: &mut D,
        input: &mut I,
    ) -> Result<(), GbError> {
        if self.bus.cartridge().is_none() {
            return Err(GbError::InvalidRom("no cartridge loaded".to_string()));
        }

        let mut pacer = self
            .config
            .frame_pacing
            .then(|| FramePacer::new(self.config.frame_rate));
        log::info!(
            "running at {:.4} fps, {} cycles per frame",
            self.config.frame_rate,
            self.cycles_per_frame
        );

        loop {
            if input.should_stop() {
                log::info!("stopped after {} frames", self.frame_count());
                return Ok(());
            }
            self.set_joypad(input.poll());

            if self.step_frame()? {
                display.present(self.framebuffer(), &self.config.palette);
            }

            if let Some(pacer) = pacer.as_mut() {
                pacer.wait();
            }
        }
    }

    pub fn set_joypad(&mut self, state: JoypadState) {
        self.bus.set_joypad(state);
    }

    /// Shade indices (0..=3) of the last composed frame, row-major.
    pub fn framebuffer(&self) -> &[u8] {
        self.bus.ppu.framebuffer()
    }

    /// Bytes the game has sent out of the serial port.
    pub fn serial_output(&self) -> &[u8] {
        self.bus.serial.output()
    }

    pub fn frame_count(&self) -> u64 {
        self.bus.ppu.frame_count()
    }

    pub fn bus(&self) -> &MemoryBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut MemoryBus {
        &mut self.bus
    }
}
