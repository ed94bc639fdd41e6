//! Address decoding.
//!
//! The bus owns every device and keeps an ordered dispatch table of
//! device ids. An access goes to the first registered device whose
//! `accepts` predicate claims the address.
//!
//! Unmapped addresses are handled permissively: reads return 0xFF and
//! writes are dropped. Both are logged at trace level.

use super::apu::Apu;
use super::cartridge::Cartridge;
use super::interrupts::{Interrupt, InterruptRegisters};
use super::joypad::{Joypad, JoypadState};
use super::ppu::{Ppu, PpuMode};
use super::ram::Ram;
use super::serial::Serial;
use super::timer::Timer;
use crate::cpu::Bus;

/// A device reachable through the memory map.
pub trait MemoryMapped {
    /// Whether this device decodes `addr`. Must not depend on state.
    fn accepts(&self, addr: u16) -> bool;
    fn read(&self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, value: u8);

    /// Interrupts raised since the last call. The bus latches them into IF.
    fn take_interrupts(&mut self) -> Interrupt {
        Interrupt::empty()
    }
}

/// Identifies a device slot in the bus's dispatch table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceId {
    Cartridge,
    Ppu,
    Ram,
    Joypad,
    Serial,
    Timer,
    Interrupts,
    Apu,
}

/// Registration order of a DMG: earlier devices win contested addresses.
const DMG_MAP: [DeviceId; 8] = [
    DeviceId::Cartridge,
    DeviceId::Ppu,
    DeviceId::Ram,
    DeviceId::Joypad,
    DeviceId::Serial,
    DeviceId::Timer,
    DeviceId::Interrupts,
    DeviceId::Apu,
];

pub struct MemoryBus {
    map: Vec<DeviceId>,
    pub(crate) cartridge: Option<Cartridge>,
    pub(crate) ppu: Ppu,
    pub(crate) ram: Ram,
    pub(crate) joypad: Joypad,
    pub(crate) serial: Serial,
    pub(crate) timer: Timer,
    pub(crate) interrupts: InterruptRegisters,
    pub(crate) apu: Apu,
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus {
    /// A bus with every DMG device registered and no cartridge inserted.
    pub fn new() -> Self {
        let mut bus = Self::unmapped();
        for id in DMG_MAP {
            bus.map(id);
        }
        bus
    }

    /// A bus owning all devices but with an empty dispatch table.
    pub fn unmapped() -> Self {
        Self {
            map: Vec::with_capacity(DMG_MAP.len()),
            cartridge: None,
            ppu: Ppu::new(),
            ram: Ram::new(),
            joypad: Joypad::new(),
            serial: Serial::default(),
            timer: Timer::new(),
            interrupts: InterruptRegisters::new(),
            apu: Apu::new(),
        }
    }

    /// Append a device to the dispatch table.
    pub fn map(&mut self, id: DeviceId) {
        if self.map.contains(&id) {
            log::warn!("{id:?} is already mapped");
            return;
        }
        self.map.push(id);
    }

    pub fn insert_cartridge(&mut self, cartridge: Cartridge) {
        self.cartridge = Some(cartridge);
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    fn device(&self, id: DeviceId) -> Option<&dyn MemoryMapped> {
        let device: &dyn MemoryMapped = match id {
            DeviceId::Cartridge => self.cartridge.as_ref()?,
            DeviceId::Ppu => &self.ppu,
            DeviceId::Ram => &self.ram,
            DeviceId::Joypad => &self.joypad,
            DeviceId::Serial => &self.serial,
            DeviceId::Timer => &self.timer,
            DeviceId::Interrupts => &self.interrupts,
            DeviceId::Apu => &self.apu,
        };
        Some(device)
    }

    fn device_mut(&mut self, id: DeviceId) -> Option<&mut dyn MemoryMapped> {
        let device: &mut dyn MemoryMapped = match id {
            DeviceId::Cartridge => self.cartridge.as_mut()?,
            DeviceId::Ppu => &mut self.ppu,
            DeviceId::Ram => &mut self.ram,
            DeviceId::Joypad => &mut self.joypad,
            DeviceId::Serial => &mut self.serial,
            DeviceId::Timer => &mut self.timer,
            DeviceId::Interrupts => &mut self.interrupts,
            DeviceId::Apu => &mut self.apu,
        };
        Some(device)
    }

    /// First mapped device claiming `addr`.
    fn route(&self, addr: u16) -> Option<DeviceId> {
        self.map
            .iter()
            .copied()
            .find(|&id| self.device(id).is_some_and(|dev| dev.accepts(addr)))
    }

    pub fn read(&self, addr: u16) -> u8 {
        match self.route(addr).and_then(|id| self.device(id)) {
            Some(dev) => dev.read(addr),
            None => {
                log::trace!("unmapped read 0x{addr:04X}");
                0xFF
            }
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        let Some(id) = self.route(addr) else {
            log::trace!("unmapped write 0x{addr:04X} <- 0x{value:02X}");
            return;
        };
        if let Some(dev) = self.device_mut(id) {
            dev.write(addr, value);
        }
        self.latch_interrupts();
    }

    /// Move interrupt requests raised by devices into IF.
    fn latch_interrupts(&mut self) {
        let raised = self.ppu.take_interrupts()
            | self.timer.take_interrupts()
            | self.joypad.take_interrupts();
        if !raised.is_empty() {
            self.interrupts.request(raised);
        }
    }

    /// Feed `cycles` clocks to the PPU, the timer and a running OAM DMA.
    pub fn advance(&mut self, cycles: u32) {
        self.ppu.update(cycles);
        self.timer.update(cycles);
        if self.ppu.dma_active() {
            self.oam_dma_update(cycles);
        }
        self.latch_interrupts();
    }

    /// Copy the OAM bytes an active DMA transfer owes after `cycles`.
    pub fn oam_dma_update(&mut self, cycles: u32) {
        let Some(mut dma) = self.ppu.take_dma() else {
            return;
        };
        for offset in dma.advance(cycles) {
            let byte = self.read(dma.source().wrapping_add(offset));
            self.ppu.dma_write_oam(usize::from(offset), byte);
        }
        if dma.finished() {
            log::trace!("OAM DMA from 0x{:04X} done", dma.source());
        } else {
            self.ppu.resume_dma(dma);
        }
    }

    pub fn set_joypad(&mut self, state: JoypadState) {
        self.joypad.set_state(state);
        self.latch_interrupts();
    }
}

impl Bus for MemoryBus {
    #[inline]
    fn read8(&mut self, addr: u16) -> u8 {
        self.read(addr)
    }

    #[inline]
    fn write8(&mut self, addr: u16, value: u8) {
        self.write(addr, value);
    }

    #[inline]
    fn ppu_mode(&self) -> PpuMode {
        self.ppu.mode()
    }

    #[inline]
    fn dma_active(&self) -> bool {
        self.ppu.dma_active()
    }
}
