use super::{Bus, Cpu};
use crate::machine::{IE_ADDR, IF_ADDR};

/// Base of the interrupt vector table; source `i` jumps to 0x40 + i*8.
const VECTOR_BASE: u16 = 0x0040;

impl Cpu {
    /// Service the highest-priority pending interrupt, if any.
    ///
    /// Called once after every instruction. Returns the cycles spent:
    /// 0 when nothing was dispatched, 20 when dispatch also woke the CPU
    /// from HALT, 16 otherwise.
    ///
    /// A pending `IE & IF` bit always ends HALT, even with IME clear; in
    /// that case execution simply resumes after the HALT.
    pub fn handle_interrupts<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let ie = bus.read8(IE_ADDR);
        let iflags = bus.read8(IF_ADDR);
        let pending = ie & iflags & 0x1F;
        if pending == 0 {
            return 0;
        }

        if !self.ime {
            self.halted = false;
            return 0;
        }

        let mut cycles = 16;
        if self.halted {
            self.halted = false;
            cycles += 4;
        }

        // VBlank (bit 0) has the highest priority.
        let index = pending.trailing_zeros() as u16;
        self.ime = false;
        self.ime_enable_pending = false;
        bus.write8(IF_ADDR, iflags & !(1 << index));

        let pc = self.regs.pc;
        self.push_u16(bus, pc);
        self.regs.pc = VECTOR_BASE + index * 8;

        log::trace!(
            "interrupt {index} dispatched from PC=0x{pc:04X} to 0x{:04X}",
            self.regs.pc
        );
        cycles
    }
}
