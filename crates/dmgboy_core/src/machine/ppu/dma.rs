use std::ops::Range;

use super::OAM_SIZE;

/// In-flight OAM DMA transfer.
///
/// Copies 160 bytes from `page << 8` into OAM, one byte per machine cycle.
#[derive(Clone, Copy, Debug)]
pub(crate) struct OamDma {
    source: u16,
    next: u16,
    clocks: u32,
}

impl OamDma {
    pub(crate) fn new(page: u8) -> Self {
        Self {
            source: u16::from(page) << 8,
            next: 0,
            clocks: 0,
        }
    }

    #[inline]
    pub(crate) fn source(&self) -> u16 {
        self.source
    }

    /// Advance by `cycles` clocks and return the OAM offsets now due.
    pub(crate) fn advance(&mut self, cycles: u32) -> Range<u16> {
        self.clocks += cycles;
        let due = (self.clocks / 4) as u16;
        self.clocks %= 4;

        let start = self.next;
        let end = start.saturating_add(due).min(OAM_SIZE as u16);
        self.next = end;
        start..end
    }

    #[inline]
    pub(crate) fn finished(&self) -> bool {
        self.next as usize >= OAM_SIZE
    }
}
