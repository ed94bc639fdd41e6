use crate::GbError;

/// Plain 32 KiB ROM with optional unbanked RAM.
pub(super) struct NoMbc {
    rom: Vec<u8>,
    ram: Vec<u8>,
}

impl NoMbc {
    pub(super) fn new(rom: Vec<u8>, ram: Vec<u8>) -> Self {
        Self { rom, ram }
    }

    /// Bytes past the end of ROM or RAM read as 0xFF.
    pub(super) fn read(&self, addr: u16) -> Result<u8, GbError> {
        let byte = match addr {
            0x0000..=0x7FFF => self.rom.get(usize::from(addr)),
            0xA000..=0xBFFF => self.ram.get(usize::from(addr - 0xA000)),
            _ => return Err(GbError::BusRouting { address: addr }),
        };
        Ok(byte.copied().unwrap_or(0xFF))
    }

    /// ROM writes have no effect; RAM writes land only where RAM exists.
    pub(super) fn write(&mut self, addr: u16, value: u8) -> Result<(), GbError> {
        match addr {
            0x0000..=0x7FFF => {}
            0xA000..=0xBFFF => {
                if let Some(slot) = self.ram.get_mut(usize::from(addr - 0xA000)) {
                    *slot = value;
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
