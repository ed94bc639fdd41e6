use super::{Bus, Cpu, Flag};

impl Cpu {
    /// Execute the byte following a 0xCB prefix.
    ///
    /// The opcode splits into x (bits 7-6), y (bits 5-3) and z (bits 2-0):
    /// x=0 rotates/shifts, x=1 BIT, x=2 RES, x=3 SET; y picks the
    /// operation or bit, z the operand.
    pub(super) fn step_cb<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let cb = self.fetch8(bus);
        let x = cb >> 6;
        let y = (cb >> 3) & 0x07;
        let z = cb & 0x07;
        let on_hl = z == 6;
        let value = self.read_reg8(bus, z);

        match x {
            0 => {
                let result = self.rotate_shift(y, value);
                self.write_reg8(bus, z, result);
                if on_hl { 16 } else { 8 }
            }
            1 => {
                let carry = self.get_flag(Flag::C);
                self.clear_flags();
                self.set_flag(Flag::Z, value & (1 << y) == 0);
                self.set_flag(Flag::H, true);
                self.set_flag(Flag::C, carry);
                if on_hl { 12 } else { 8 }
            }
            2 => {
                self.write_reg8(bus, z, value & !(1 << y));
                if on_hl { 16 } else { 8 }
            }
            _ => {
                self.write_reg8(bus, z, value | (1 << y));
                if on_hl { 16 } else { 8 }
            }
        }
    }

    /// RLC, RRC, RL, RR, SLA, SRA, SWAP, SRL selected by `op`.
    ///
    /// All of them set Z from the result and clear N and H.
    fn rotate_shift(&mut self, op: u8, value: u8) -> u8 {
        let carry_in = self.get_flag(Flag::C);
        let (result, carry_out) = match op {
            0 => (value.rotate_left(1), value & 0x80 != 0),
            1 => (value.rotate_right(1), value & 0x01 != 0),
            2 => ((value << 1) | u8::from(carry_in), value & 0x80 != 0),
            3 => ((value >> 1) | (u8::from(carry_in) << 7), value & 0x01 != 0),
            4 => (value << 1, value & 0x80 != 0),
            5 => ((value >> 1) | (value & 0x80), value & 0x01 != 0),
            6 => (value.rotate_left(4), false),
            _ => (value >> 1, value & 0x01 != 0),
        };

        self.clear_flags();
        self.set_flag(Flag::Z, result == 0);
        self.set_flag(Flag::C, carry_out);
        result
    }
}
