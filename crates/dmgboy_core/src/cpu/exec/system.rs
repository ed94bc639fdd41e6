use crate::cpu::{Bus, Cpu};
use crate::machine::{IE_ADDR, IF_ADDR};

impl Cpu {
    /// HALT.
    ///
    /// With IME clear and an interrupt already pending the CPU does not
    /// halt; instead the following opcode byte is fetched twice.
    pub(super) fn exec_halt<B: Bus>(&mut self, bus: &mut B) -> u32 {
        if !self.ime {
            let pending = bus.read8(IE_ADDR) & bus.read8(IF_ADDR) & 0x1F;
            if pending != 0 {
                log::trace!("HALT bug at PC=0x{:04X}", self.regs.pc);
                self.halt_bug = true;
                return 4;
            }
        }

        self.halted = true;
        4
    }

    /// STOP is two bytes long; the padding byte is discarded.
    pub(super) fn exec_stop<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let _padding = self.fetch8(bus);
        self.stopped = true;
        self.halted = false;
        4
    }

    pub(super) fn exec_di(&mut self) -> u32 {
        self.ime = false;
        self.ime_enable_pending = false;
        4
    }

    /// IME turns on only after the next instruction has executed.
    pub(super) fn exec_ei(&mut self) -> u32 {
        self.ime_enable_pending = true;
        4
    }
}
