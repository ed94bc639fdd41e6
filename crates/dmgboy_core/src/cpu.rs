//! Sharp LR35902 instruction engine.
//!
//! `Cpu::step` executes exactly one instruction and reports the clock
//! cycles it took. Interrupt dispatch is a separate call
//! (`Cpu::handle_interrupts`) so the machine can advance its devices in
//! between.

mod alu;
mod bus;
mod cb;
mod exec;
mod helpers;
mod interrupts;
mod regs;

pub use bus::Bus;
pub use regs::{pair, split, Flag, Registers};

use crate::machine::{Interrupt, IF_ADDR};
use crate::GbError;

#[derive(Clone, Debug)]
pub struct Cpu {
    pub regs: Registers,
    pub ime: bool,
    pub halted: bool,
    /// STOP low-power state, left when a joypad interrupt is requested.
    stopped: bool,
    /// Set by HALT when IME is clear and an interrupt is already pending:
    /// the next opcode fetch does not advance PC.
    halt_bug: bool,
    /// EI was executed; IME turns on before the next instruction runs.
    ime_enable_pending: bool,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// CPU in the state the DMG boot ROM leaves it in at 0x0100.
    pub fn new() -> Self {
        Self {
            regs: Registers::post_boot(),
            ime: false,
            halted: false,
            stopped: false,
            halt_bug: false,
            ime_enable_pending: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Execute one instruction and return the clock cycles consumed.
    ///
    /// A halted or stopped CPU idles for 4 cycles per call.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> Result<u32, GbError> {
        if self.stopped {
            if bus.read8(IF_ADDR) & Interrupt::JOYPAD.bits() == 0 {
                return Ok(4);
            }
            log::debug!("leaving STOP on joypad request");
            self.stopped = false;
        }

        if self.halted {
            return Ok(4);
        }

        if self.ime_enable_pending {
            self.ime = true;
            self.ime_enable_pending = false;
        }

        let opcode = self.fetch8(bus);
        self.exec_opcode(bus, opcode)
    }
}
