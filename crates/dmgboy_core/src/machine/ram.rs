use super::MemoryMapped;

const WRAM_SIZE: usize = 0x2000;
const HRAM_SIZE: usize = 0x7F;

/// Work RAM (with its echo at 0xE000-0xFDFF) and high RAM.
///
/// Also claims the unusable 0xFEA0-0xFEFF strip so that it never falls
/// through to the unmapped path: reads there give 0xFF, writes vanish.
pub struct Ram {
    wram: Box<[u8; WRAM_SIZE]>,
    hram: [u8; HRAM_SIZE],
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

impl Ram {
    /// Internal RAM with power-on contents.
    ///
    /// Real hardware powers up with garbage in WRAM/HRAM. A fixed-seed
    /// xorshift keeps runs reproducible without handing software zeros.
    pub fn new() -> Self {
        let mut ram = Self {
            wram: Box::new([0; WRAM_SIZE]),
            hram: [0; HRAM_SIZE],
        };

        let mut x: u32 = 0xC0DE_1234;
        let mut next_byte = || {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            x as u8
        };
        ram.wram.iter_mut().for_each(|b| *b = next_byte());
        ram.hram.iter_mut().for_each(|b| *b = next_byte());
        ram
    }

    fn slot(&self, addr: u16) -> Option<(bool, usize)> {
        match addr {
            0xC000..=0xDFFF => Some((false, (addr - 0xC000) as usize)),
            0xE000..=0xFDFF => Some((false, (addr - 0xE000) as usize)),
            0xFF80..=0xFFFE => Some((true, (addr - 0xFF80) as usize)),
            _ => None,
        }
    }
}

impl MemoryMapped for Ram {
    fn accepts(&self, addr: u16) -> bool {
        matches!(addr, 0xC000..=0xFDFF | 0xFEA0..=0xFEFF | 0xFF80..=0xFFFE)
    }

    fn read(&self, addr: u16) -> u8 {
        match self.slot(addr) {
            Some((false, offset)) => self.wram[offset],
            Some((true, offset)) => self.hram[offset],
            None => 0xFF,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match self.slot(addr) {
            Some((false, offset)) => self.wram[offset] = value,
            Some((true, offset)) => self.hram[offset] = value,
            None => {}
        }
    }
}
