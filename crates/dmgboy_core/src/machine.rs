//! The DMG machine: bus, memory-mapped devices and the orchestrator that
//! advances them in lockstep with the CPU.

mod apu;
mod bus;
mod cartridge;
mod config;
mod gameboy;
mod interrupts;
mod joypad;
mod pacing;
mod ppu;
mod ram;
mod serial;
mod timer;

pub use bus::{DeviceId, MemoryBus, MemoryMapped};
pub use cartridge::{Cartridge, CartridgeHeader};
pub use config::GameBoyConfig;
pub use gameboy::GameBoy;
pub use interrupts::{Interrupt, InterruptRegisters, IE_ADDR, IF_ADDR};
pub use joypad::{Button, Joypad, JoypadState};
pub use ppu::{Ppu, PpuMode};
pub use timer::Timer;

#[cfg(test)]
mod tests;
