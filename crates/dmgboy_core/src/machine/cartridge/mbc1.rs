use crate::GbError;

const ROM_BANK_SIZE: usize = 0x4000;
const RAM_BANK_SIZE: usize = 0x2000;

/// MBC1 bank controller.
///
/// Four write-only registers sit behind the ROM area:
/// - 0x0000-0x1FFF RAM gate, 0xA in the low nibble enables RAM
/// - 0x2000-0x3FFF ROM bank low (5 bits, never zero)
/// - 0x4000-0x5FFF ROM bank high / RAM bank (2 bits)
/// - 0x6000-0x7FFF banking mode (1 bit)
pub(super) struct Mbc1 {
    rom: Vec<u8>,
    ram: Vec<u8>,
    ram_gate: u8,
    bank_low: u8,
    bank_high: u8,
    mode: u8,
}

impl Mbc1 {
    pub(super) fn new(rom: Vec<u8>, ram: Vec<u8>) -> Self {
        Self {
            rom,
            ram,
            ram_gate: 0,
            bank_low: 1,
            bank_high: 0,
            mode: 0,
        }
    }

    /// Mask applied to bank numbers so they wrap inside the ROM.
    fn rom_bank_mask(&self) -> usize {
        (self.rom.len() / ROM_BANK_SIZE).max(1).next_power_of_two() - 1
    }

    fn rom_byte(&self, bank: usize, offset: u16) -> u8 {
        let index = (bank & self.rom_bank_mask()) * ROM_BANK_SIZE + usize::from(offset);
        self.rom.get(index).copied().unwrap_or(0xFF)
    }

    /// Physical RAM index for `addr`, or `None` while RAM is gated off or
    /// absent.
    fn ram_index(&self, addr: u16) -> Option<usize> {
        if self.ram_gate != 0x0A || self.ram.is_empty() {
            return None;
        }
        let mut offset = usize::from(addr - 0xA000);
        if self.mode == 1 {
            offset += usize::from(self.bank_high & 0x03) * RAM_BANK_SIZE;
        }
        Some(offset % self.ram.len())
    }

    pub(super) fn read(&self, addr: u16) -> Result<u8, GbError> {
        let value = match addr {
            // Mode 1 lets the high bits reach the first window too.
            0x0000..=0x3FFF => {
                let bank = if self.mode == 1 {
                    usize::from(self.bank_high) << 5
                } else {
                    0
                };
                self.rom_byte(bank, addr)
            }
            0x4000..=0x7FFF => {
                let bank = usize::from(self.bank_high) << 5 | usize::from(self.bank_low);
                self.rom_byte(bank, addr - 0x4000)
            }
            0xA000..=0xBFFF => self
                .ram_index(addr)
                .map_or(0xFF, |index| self.ram[index]),
            _ => return Err(GbError::BusRouting { address: addr }),
        };
        Ok(value)
    }

    pub(super) fn write(&mut self, addr: u16, value: u8) -> Result<(), GbError> {
        match addr {
            0x0000..=0x1FFF => {
                let gate = value & 0x0F;
                if gate != self.ram_gate {
                    log::debug!(
                        "MBC1 RAM {}",
                        if gate == 0x0A { "enabled" } else { "disabled" }
                    );
                }
                self.ram_gate = gate;
            }
            0x2000..=0x3FFF => {
                let bank = match value & 0x1F {
                    0 => 1,
                    bank => bank,
                };
                if bank != self.bank_low {
                    log::debug!("MBC1 bank low = 0x{bank:02X}");
                }
                self.bank_low = bank;
            }
            0x4000..=0x5FFF => {
                let bank = value & 0x03;
                if bank != self.bank_high {
                    log::debug!("MBC1 bank high = {bank}");
                }
                self.bank_high = bank;
            }
            0x6000..=0x7FFF => {
                let mode = value & 0x01;
                if mode != self.mode {
                    log::debug!("MBC1 banking mode = {mode}");
                }
                self.mode = mode;
            }
            0xA000..=0xBFFF => {
                if let Some(index) = self.ram_index(addr) {
                    self.ram[index] = value;
                }
            }
            _ => return Err(GbError::BusRouting { address: addr }),
        }
        Ok(())
    }

    pub(super) fn ram(&self) -> &[u8] {
        &self.ram
    }
}

#[cfg(test)]
mod tests;
