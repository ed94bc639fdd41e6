use super::MemoryMapped;

bitflags::bitflags! {
    /// Interrupt sources, in bit order. Lower bits have higher priority.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Interrupt: u8 {
        const VBLANK = 1 << 0;
        const STAT   = 1 << 1;
        const TIMER  = 1 << 2;
        const SERIAL = 1 << 3;
        const JOYPAD = 1 << 4;
    }
}

pub const IF_ADDR: u16 = 0xFF0F;
pub const IE_ADDR: u16 = 0xFFFF;

/// IE (0xFFFF) and IF (0xFF0F).
#[derive(Debug, Default)]
pub struct InterruptRegisters {
    enable: u8,
    flags: Interrupt,
}

impl InterruptRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn request(&mut self, irq: Interrupt) {
        self.flags |= irq;
    }

    #[inline]
    pub fn requested(&self) -> Interrupt {
        self.flags
    }

    #[inline]
    pub fn enabled(&self) -> u8 {
        self.enable
    }
}

impl MemoryMapped for InterruptRegisters {
    fn accepts(&self, addr: u16) -> bool {
        addr == IF_ADDR || addr == IE_ADDR
    }

    fn read(&self, addr: u16) -> u8 {
        if addr == IF_ADDR {
            // Bits 7-5 are unused and read as 1.
            self.flags.bits() | 0xE0
        } else {
            self.enable
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        if addr == IF_ADDR {
            self.flags = Interrupt::from_bits_truncate(value);
        } else {
            self.enable = value;
        }
    }
}
