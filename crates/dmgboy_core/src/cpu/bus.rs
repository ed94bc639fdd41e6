use std::ops::RangeInclusive;

use super::Cpu;
use crate::machine::PpuMode;

const VRAM: RangeInclusive<u16> = 0x8000..=0x9FFF;
const OAM: RangeInclusive<u16> = 0xFE00..=0xFE9F;
const HRAM: RangeInclusive<u16> = 0xFF80..=0xFFFE;

/// The CPU's view of the address space.
///
/// Besides plain reads and writes the CPU needs two pieces of PPU state to
/// arbitrate its own accesses. Buses without a PPU keep the defaults, which
/// never block anything.
pub trait Bus {
    fn read8(&mut self, addr: u16) -> u8;
    fn write8(&mut self, addr: u16, value: u8);

    /// Current PPU mode, consulted on every VRAM/OAM access.
    fn ppu_mode(&self) -> PpuMode {
        PpuMode::HBlank
    }

    /// True while an OAM DMA transfer owns the bus.
    fn dma_active(&self) -> bool {
        false
    }
}

/// Whether the CPU may currently touch `addr`.
///
/// During OAM DMA only HRAM is reachable. VRAM is locked while the PPU
/// draws, and OAM while it scans or draws.
fn cpu_can_access<B: Bus>(bus: &B, addr: u16) -> bool {
    if bus.dma_active() {
        return HRAM.contains(&addr);
    }
    if VRAM.contains(&addr) {
        return bus.ppu_mode() != PpuMode::Drawing;
    }
    if OAM.contains(&addr) {
        return !matches!(bus.ppu_mode(), PpuMode::OamScan | PpuMode::Drawing);
    }
    true
}

impl Cpu {
    /// Arbitrated read; blocked addresses read as 0xFF.
    #[inline]
    pub(super) fn bus_read<B: Bus>(&self, bus: &mut B, addr: u16) -> u8 {
        if cpu_can_access(bus, addr) {
            bus.read8(addr)
        } else {
            0xFF
        }
    }

    /// Arbitrated write; blocked writes are dropped.
    #[inline]
    pub(super) fn bus_write<B: Bus>(&self, bus: &mut B, addr: u16, value: u8) {
        if cpu_can_access(bus, addr) {
            bus.write8(addr, value);
        } else {
            log::trace!("CPU write to 0x{addr:04X} blocked by PPU/DMA");
        }
    }
}
