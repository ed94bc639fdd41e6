use super::MemoryMapped;

/// SB (0xFF01) and SC (0xFF02).
///
/// No link cable is emulated. Starting a transfer on the internal clock
/// (SC = 0x81) appends SB to `output`, which is how test ROMs print.
#[derive(Default)]
pub struct Serial {
    sb: u8,
    sc: u8,
    output: Vec<u8>,
}

impl Serial {
    pub fn output(&self) -> &[u8] {
        &self.output
    }
}

impl MemoryMapped for Serial {
    fn accepts(&self, addr: u16) -> bool {
        matches!(addr, 0xFF01..=0xFF02)
    }

    fn read(&self, addr: u16) -> u8 {
        if addr == 0xFF01 {
            self.sb
        } else {
            self.sc
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        if addr == 0xFF01 {
            self.sb = value;
            return;
        }
        self.sc = value;
        if value & 0x81 == 0x81 {
            log::debug!("serial out: 0x{:02X}", self.sb);
            self.output.push(self.sb);
        }
    }
}
