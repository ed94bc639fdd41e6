use super::MemoryMapped;

const NR52: u16 = 0xFF26;
const BASE: u16 = 0xFF10;

/// Sound registers 0xFF10-0xFF3F, including wave RAM.
///
/// No audio is produced; registers only store what software writes,
/// with the NR52 power switch gating and clearing the channel registers.
pub struct Apu {
    regs: [u8; 0x30],
}

impl Default for Apu {
    fn default() -> Self {
        Self::new()
    }
}

impl Apu {
    /// Register values after the DMG boot ROM.
    pub fn new() -> Self {
        let mut regs = [0u8; 0x30];
        let boot: [(u16, u8); 20] = [
            (0xFF10, 0x80),
            (0xFF11, 0xBF),
            (0xFF12, 0xF3),
            (0xFF13, 0xFF),
            (0xFF14, 0xBF),
            (0xFF16, 0x3F),
            (0xFF18, 0xFF),
            (0xFF19, 0xBF),
            (0xFF1A, 0x7F),
            (0xFF1B, 0xFF),
            (0xFF1C, 0x9F),
            (0xFF1D, 0xFF),
            (0xFF1E, 0xBF),
            (0xFF20, 0xFF),
            (0xFF23, 0xBF),
            (0xFF24, 0x77),
            (0xFF25, 0xF3),
            (0xFF26, 0xF1),
            (0xFF21, 0x00),
            (0xFF22, 0x00),
        ];
        for (addr, value) in boot {
            regs[(addr - BASE) as usize] = value;
        }
        Self { regs }
    }

    #[inline]
    fn powered(&self) -> bool {
        self.regs[(NR52 - BASE) as usize] & 0x80 != 0
    }

    fn write_nr52(&mut self, value: u8) {
        let index = (NR52 - BASE) as usize;
        if self.powered() && value & 0x80 == 0 {
            log::debug!("APU powered off");
            self.regs[..index].fill(0);
            self.regs[index] = 0;
        }
        // Only the power bit is writable.
        self.regs[index] = (self.regs[index] & 0x7F) | (value & 0x80);
    }
}

impl MemoryMapped for Apu {
    fn accepts(&self, addr: u16) -> bool {
        matches!(addr, 0xFF10..=0xFF3F)
    }

    fn read(&self, addr: u16) -> u8 {
        let value = self.regs[(addr - BASE) as usize];
        if addr == NR52 {
            value | 0x70
        } else {
            value
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            NR52 => self.write_nr52(value),
            // Channel registers are read-only while the APU is off.
            0xFF10..=0xFF25 if !self.powered() => {}
            _ => self.regs[(addr - BASE) as usize] = value,
        }
    }
}
